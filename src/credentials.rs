use log::debug;

use crate::config::Config;
use crate::error::{Error, Result};

/// Pick the caller's key, else the default key, else fail.
///
/// Every call to the transcription or completion backends goes through here.
pub fn resolve_api_key(user_key: Option<&str>, default_key: Option<&str>) -> Result<String> {
    let usable = |key: Option<&str>| key.map(str::trim).filter(|k| !k.is_empty()).map(str::to_string);

    usable(user_key).or_else(|| usable(default_key)).ok_or(Error::MissingCredential)
}

/// The default key this request is allowed to fall back to.
///
/// With `allowed_origin` configured only that origin may use the service key;
/// everyone else has to send their own.
pub fn default_key_for<'a>(config: &'a Config, origin: Option<&str>) -> Option<&'a str> {
    let key = config.default_api_key.as_deref()?;
    match config.allowed_origin.as_deref() {
        None => Some(key),
        Some(allowed) if origin.map(|o| o.trim_end_matches('/')) == Some(allowed.trim_end_matches('/')) => Some(key),
        Some(allowed) => {
            debug!("Origin {origin:?} does not match {allowed}, default key withheld");
            None
        }
    }
}
