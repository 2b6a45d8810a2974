use async_trait::async_trait;
use eyre::{Result, bail};
use log::debug;
use regex::Regex;
use serde::Deserialize;

use crate::providers::{TranscriptFetcher, TranscriptItem};

const USER_AGENT: &str =
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/131.0.0.0 Safari/537.36";

#[derive(Debug, Deserialize)]
struct InnerTubePlayerResponse {
    captions: Option<CaptionsData>,
}

#[derive(Debug, Deserialize)]
struct CaptionsData {
    #[serde(rename = "playerCaptionsTracklistRenderer")]
    player_captions_tracklist_renderer: Option<CaptionTracklistRenderer>,
}

#[derive(Debug, Deserialize)]
struct CaptionTracklistRenderer {
    #[serde(rename = "captionTracks")]
    caption_tracks: Option<Vec<CaptionTrack>>,
}

#[derive(Debug, Deserialize)]
struct CaptionTrack {
    #[serde(rename = "baseUrl")]
    base_url: String,
    #[serde(rename = "languageCode")]
    language_code: String,
}

/// Caption-track fetcher backed by YouTube's InnerTube player API
pub struct InnerTube {
    client: reqwest::Client,
    lang: String,
}

impl InnerTube {
    pub fn new(client: reqwest::Client) -> Self {
        Self {
            client,
            lang: "en".to_string(),
        }
    }

    async fn caption_track_url(&self, video_id: &str) -> Result<String> {
        let watch_url = format!("https://www.youtube.com/watch?v={video_id}");
        debug!("Fetching watch page: {watch_url}");

        let page_html = self
            .client
            .get(&watch_url)
            .header("User-Agent", USER_AGENT)
            .send()
            .await?
            .error_for_status()?
            .text()
            .await?;

        let api_key = extract_api_key(&page_html)?;

        let player_url = format!("https://www.youtube.com/youtubei/v1/player?key={api_key}&prettyPrint=false");
        let body = serde_json::json!({
            "context": {
                "client": {
                    "hl": self.lang,
                    "gl": "US",
                    "clientName": "WEB",
                    "clientVersion": "2.20241126.01.00"
                }
            },
            "videoId": video_id
        });

        let resp: InnerTubePlayerResponse = self
            .client
            .post(&player_url)
            .header("User-Agent", USER_AGENT)
            .json(&body)
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;

        let tracks = resp
            .captions
            .and_then(|c| c.player_captions_tracklist_renderer)
            .and_then(|r| r.caption_tracks)
            .unwrap_or_default();

        // Requested language first, otherwise whatever track is there
        let Some(track) = tracks
            .iter()
            .find(|t| t.language_code == self.lang)
            .or_else(|| tracks.first())
        else {
            bail!("no captions available for video {video_id}");
        };

        debug!("Using caption track: lang={}", track.language_code);
        Ok(track.base_url.clone())
    }
}

#[async_trait]
impl TranscriptFetcher for InnerTube {
    async fn fetch(&self, video_id: &str) -> Result<Vec<TranscriptItem>> {
        let track_url = self.caption_track_url(video_id).await?;

        let caption_xml = self
            .client
            .get(&track_url)
            .header("User-Agent", USER_AGENT)
            .send()
            .await?
            .error_for_status()?
            .text()
            .await?;

        parse_caption_xml(&caption_xml)
    }
}

fn extract_api_key(html: &str) -> Result<String> {
    let re = Regex::new(r#""INNERTUBE_API_KEY"\s*:\s*"([^"]+)""#)?;
    if let Some(caps) = re.captures(html) {
        return Ok(caps[1].to_string());
    }

    let re2 = Regex::new(r#"innertubeApiKey\s*[=:]\s*"([^"]+)""#)?;
    if let Some(caps) = re2.captures(html) {
        return Ok(caps[1].to_string());
    }

    bail!("could not extract InnerTube API key from watch page");
}

fn parse_caption_xml(xml: &str) -> Result<Vec<TranscriptItem>> {
    use quick_xml::Reader;
    use quick_xml::events::Event;

    let mut reader = Reader::from_str(xml);
    let mut items = Vec::new();
    let mut in_text = false;

    loop {
        match reader.read_event() {
            Ok(Event::Start(ref e)) if e.name().as_ref() == b"text" => in_text = true,
            Ok(Event::End(ref e)) if e.name().as_ref() == b"text" => in_text = false,
            Ok(Event::Text(ref e)) if in_text => {
                let raw_text = e.unescape().unwrap_or_default().to_string();
                let text = html_escape::decode_html_entities(&raw_text).to_string();
                items.push(TranscriptItem { text });
            }
            Ok(Event::Eof) => break,
            Err(e) => bail!("error parsing caption XML: {e}"),
            _ => {}
        }
    }

    Ok(items)
}
