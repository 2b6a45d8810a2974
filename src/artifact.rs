use std::io;
use std::path::{Path, PathBuf};

use log::{debug, warn};

/// Random file-name prefix, unique per request
pub fn generate_prefix() -> String {
    format!("recap-{}", uuid::Uuid::new_v4().simple())
}

/// Delete every file in `dir` whose name starts with `prefix`. Returns how many were removed.
///
/// Only an unreadable `dir` is an error. A file that cannot be removed is
/// logged and skipped so the rest of the prefix still goes.
pub fn remove_with_prefix(dir: &Path, prefix: &str) -> io::Result<usize> {
    sweep(dir, prefix, |path| std::fs::remove_file(path))
}

fn sweep<F>(dir: &Path, prefix: &str, mut remove: F) -> io::Result<usize>
where
    F: FnMut(&Path) -> io::Result<()>,
{
    let mut removed = 0;
    for entry in std::fs::read_dir(dir)? {
        let entry = match entry {
            Ok(entry) => entry,
            Err(e) => {
                warn!("Skipping unreadable entry in {}: {e}", dir.display());
                continue;
            }
        };
        if !entry.file_name().to_string_lossy().starts_with(prefix) {
            continue;
        }
        let path = entry.path();
        match entry.file_type() {
            Ok(t) if t.is_file() => {}
            Ok(_) => continue,
            Err(e) => {
                warn!("Cannot stat {}: {e}", path.display());
                continue;
            }
        }
        match remove(&path) {
            Ok(()) => removed += 1,
            Err(e) => warn!("Failed to remove {}: {e}", path.display()),
        }
    }
    Ok(removed)
}

/// A downloaded audio file scoped to one request.
///
/// Dropping the handle removes the file and any siblings sharing its prefix
/// (partial downloads, intermediate formats), whether or not the file itself
/// was ever written.
#[derive(Debug)]
pub struct AudioArtifact {
    dir: PathBuf,
    prefix: String,
    path: PathBuf,
}

impl AudioArtifact {
    /// Reserve a fresh path `<dir>/<prefix>.<extension>`, creating `dir` if needed.
    pub async fn reserve(dir: &Path, extension: &str) -> io::Result<Self> {
        tokio::fs::create_dir_all(dir).await?;
        let prefix = generate_prefix();
        let path = dir.join(format!("{prefix}.{extension}"));
        debug!("Reserved audio artifact {}", path.display());
        Ok(Self {
            dir: dir.to_path_buf(),
            prefix,
            path,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    pub fn exists(&self) -> bool {
        self.path.is_file()
    }

    pub fn file_name(&self) -> String {
        self.path.file_name().unwrap_or_default().to_string_lossy().to_string()
    }

    fn cleanup(&self) {
        match remove_with_prefix(&self.dir, &self.prefix) {
            Ok(n) => debug!("Removed {n} file(s) with prefix {}", self.prefix),
            Err(e) => warn!("Failed to clean up files with prefix {}: {e}", self.prefix),
        }
    }
}

impl Drop for AudioArtifact {
    fn drop(&mut self) {
        self.cleanup();
    }
}
