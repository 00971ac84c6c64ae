use std::sync::LazyLock;

use regex::Regex;
use reqwest::{Client, header};
use serde::Deserialize;
use tracing::debug;

use crate::{
    provider::{CaptionProvider, ProviderError, find_track},
    types::{CaptionSegment, CaptionTrack, FetchedTranscript, TrackMetadata},
};

static API_KEY_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#""INNERTUBE_API_KEY":\s*"([a-zA-Z0-9_-]+)""#).expect("valid api key pattern")
});

static CONSENT_VALUE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"name="v" value="(.*?)""#).expect("valid consent value pattern")
});

const CONSENT_FORM_ACTION: &str = r#"action="https://consent.youtube.com/s""#;
const BOT_CHECK_REASON: &str = "Sign in to confirm you’re not a bot";
const UNAVAILABLE_REASON: &str = "This video is unavailable";

#[derive(Debug, Clone)]
pub struct YoutubeConfig {
    pub base_url: String,
    pub client_name: &'static str,
    pub client_version: &'static str,
    pub accept_language: String,
}

impl Default for YoutubeConfig {
    fn default() -> Self {
        Self {
            base_url: "https://www.youtube.com".to_string(),
            client_name: "ANDROID",
            client_version: "20.10.38",
            accept_language: "en-US".to_string(),
        }
    }
}

impl YoutubeConfig {
    pub const BASE_URL_ENV: &'static str = "POLYCORE_YOUTUBE_URL";
    pub const ACCEPT_LANGUAGE_ENV: &'static str = "POLYCORE_ACCEPT_LANGUAGE";

    /// Defaults with environment overrides applied
    pub fn from_env() -> Self {
        let mut config = Self::default();
        if let Ok(url) = std::env::var(Self::BASE_URL_ENV) {
            config.base_url = url.trim_end_matches('/').to_string();
        }
        if let Ok(lang) = std::env::var(Self::ACCEPT_LANGUAGE_ENV) {
            config.accept_language = lang;
        }
        config
    }

    fn watch_url(&self, video_id: &str) -> String {
        format!("{}/watch?v={}", self.base_url, video_id)
    }

    fn player_url(&self, api_key: &str) -> String {
        format!("{}/youtubei/v1/player?key={}", self.base_url, api_key)
    }
}

/// Caption provider backed by YouTube's innertube player API
pub struct YoutubeClient {
    client: Client,
    config: YoutubeConfig,
}

impl YoutubeClient {
    pub fn new(config: YoutubeConfig) -> Result<Self, ProviderError> {
        let mut headers = header::HeaderMap::new();
        let accept_language = header::HeaderValue::from_str(&config.accept_language).map_err(
            |e| ProviderError::InvalidConfig {
                reason: format!("invalid Accept-Language header: {}", e),
            },
        )?;
        headers.insert(header::ACCEPT_LANGUAGE, accept_language);

        let client = Client::builder().default_headers(headers).build()?;

        Ok(Self { client, config })
    }

    async fn fetch_watch_page(
        &self,
        video_id: &str,
        cookie: Option<&str>,
    ) -> Result<String, ProviderError> {
        let mut request = self.client.get(self.config.watch_url(video_id));
        if let Some(cookie) = cookie {
            request = request.header(header::COOKIE, cookie);
        }
        Ok(request.send().await?.error_for_status()?.text().await?)
    }

    async fn fetch_api_key(&self, video_id: &str) -> Result<String, ProviderError> {
        let mut html = self.fetch_watch_page(video_id, None).await?;

        // EU visitors get a consent interstitial first; accept it once
        if is_consent_page(&html) {
            let consent_required = || ProviderError::ConsentRequired {
                video_id: video_id.to_string(),
            };
            let cookie = consent_cookie(&html).ok_or_else(consent_required)?;
            debug!(video_id, "accepting consent interstitial");

            html = self.fetch_watch_page(video_id, Some(&cookie)).await?;
            if is_consent_page(&html) {
                return Err(consent_required());
            }
        }

        extract_api_key(&html, video_id)
    }

    async fn fetch_player(&self, video_id: &str) -> Result<PlayerResponse, ProviderError> {
        let api_key = self.fetch_api_key(video_id).await?;
        debug!(video_id, "requesting innertube player data");

        let response = self
            .client
            .post(self.config.player_url(&api_key))
            .json(&serde_json::json!({
                "context": {
                    "client": {
                        "clientName": self.config.client_name,
                        "clientVersion": self.config.client_version,
                    }
                },
                "videoId": video_id,
            }))
            .send()
            .await?
            .error_for_status()?
            .text()
            .await?;

        Ok(serde_json::from_str(&response)?)
    }
}

impl CaptionProvider for YoutubeClient {
    fn source(&self) -> &'static str {
        "youtube-innertube"
    }

    async fn fetch(
        &self,
        video_id: &str,
        languages: &[&str],
    ) -> Result<FetchedTranscript, ProviderError> {
        let tracks = self.list(video_id).await?;
        let track =
            find_track(&tracks, languages).ok_or_else(|| ProviderError::NoTranscriptFound {
                video_id: video_id.to_string(),
                requested: languages.iter().map(|l| l.to_string()).collect(),
            })?;
        self.fetch_track(track).await
    }

    async fn list(&self, video_id: &str) -> Result<Vec<CaptionTrack>, ProviderError> {
        let player = self.fetch_player(video_id).await?;
        caption_tracks(player, video_id)
    }

    async fn fetch_track(&self, track: &CaptionTrack) -> Result<FetchedTranscript, ProviderError> {
        debug!(
            video_id = %track.video_id,
            language_code = %track.metadata.language_code,
            "fetching caption track"
        );
        let body = self
            .client
            .get(json3_url(&track.url))
            .send()
            .await?
            .error_for_status()?
            .text()
            .await?;

        let timed_text: TimedText = serde_json::from_str(&body)?;

        Ok(FetchedTranscript {
            video_id: track.video_id.clone(),
            metadata: track.metadata.clone(),
            segments: timed_text.into_segments(),
        })
    }
}

fn is_consent_page(html: &str) -> bool {
    html.contains(CONSENT_FORM_ACTION)
}

fn consent_cookie(html: &str) -> Option<String> {
    CONSENT_VALUE_RE
        .captures(html)
        .map(|caps| format!("CONSENT=YES+{}", &caps[1]))
}

fn extract_api_key(html: &str, video_id: &str) -> Result<String, ProviderError> {
    if let Some(caps) = API_KEY_RE.captures(html) {
        return Ok(caps[1].to_string());
    }
    if html.contains(r#"class="g-recaptcha""#) {
        return Err(ProviderError::RequestBlocked {
            video_id: video_id.to_string(),
        });
    }
    Err(ProviderError::InvalidResponse {
        reason: format!("no innertube API key on watch page for {}", video_id),
    })
}

fn json3_url(base_url: &str) -> String {
    let url = base_url.replace("&fmt=srv3", "");
    format!("{}&fmt=json3", url)
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PlayerResponse {
    #[serde(default)]
    playability_status: Option<PlayabilityStatus>,
    #[serde(default)]
    captions: Option<Captions>,
}

#[derive(Debug, Deserialize)]
struct PlayabilityStatus {
    status: String,
    #[serde(default)]
    reason: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Captions {
    #[serde(default)]
    player_captions_tracklist_renderer: Option<TracklistRenderer>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct TracklistRenderer {
    #[serde(default)]
    caption_tracks: Vec<RawCaptionTrack>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawCaptionTrack {
    base_url: String,
    name: TrackName,
    language_code: String,
    #[serde(default)]
    kind: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct TrackName {
    #[serde(default)]
    runs: Vec<TextRun>,
    #[serde(default)]
    simple_text: Option<String>,
}

#[derive(Debug, Deserialize)]
struct TextRun {
    text: String,
}

impl TrackName {
    fn display(self) -> String {
        self.runs
            .into_iter()
            .next()
            .map(|run| run.text)
            .or(self.simple_text)
            .unwrap_or_default()
    }
}

fn caption_tracks(
    player: PlayerResponse,
    video_id: &str,
) -> Result<Vec<CaptionTrack>, ProviderError> {
    if let Some(status) = player.playability_status {
        if status.status != "OK" {
            let reason = status.reason.unwrap_or_default();
            return Err(match status.status.as_str() {
                "LOGIN_REQUIRED" if reason.starts_with(BOT_CHECK_REASON) => {
                    ProviderError::RequestBlocked {
                        video_id: video_id.to_string(),
                    }
                }
                "ERROR" if reason == UNAVAILABLE_REASON => ProviderError::VideoUnavailable {
                    video_id: video_id.to_string(),
                },
                _ => ProviderError::VideoUnplayable {
                    video_id: video_id.to_string(),
                    reason,
                },
            });
        }
    }

    let renderer = player
        .captions
        .and_then(|c| c.player_captions_tracklist_renderer)
        .ok_or_else(|| ProviderError::TranscriptsDisabled {
            video_id: video_id.to_string(),
        })?;

    Ok(renderer
        .caption_tracks
        .into_iter()
        .map(|raw| CaptionTrack {
            video_id: video_id.to_string(),
            metadata: TrackMetadata {
                language: raw.name.display(),
                language_code: raw.language_code,
                is_generated: raw.kind.as_deref() == Some("asr"),
            },
            url: raw.base_url.replace("&fmt=srv3", ""),
        })
        .collect())
}

#[derive(Debug, Deserialize)]
struct TimedText {
    #[serde(default)]
    events: Vec<TimedTextEvent>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct TimedTextEvent {
    #[serde(default)]
    t_start_ms: u64,
    #[serde(default)]
    d_duration_ms: u64,
    #[serde(default)]
    segs: Option<Vec<TimedTextSeg>>,
}

#[derive(Debug, Deserialize)]
struct TimedTextSeg {
    #[serde(default)]
    utf8: String,
}

impl TimedText {
    fn into_segments(self) -> Vec<CaptionSegment> {
        self.events
            .into_iter()
            .filter_map(|event| {
                let text: String = event.segs?.into_iter().map(|s| s.utf8).collect();
                if text.trim().is_empty() {
                    return None;
                }
                Some(CaptionSegment {
                    text,
                    start: event.t_start_ms as f64 / 1000.0,
                    duration: event.d_duration_ms as f64 / 1000.0,
                })
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn player(json: &str) -> PlayerResponse {
        serde_json::from_str(json).unwrap()
    }

    #[test]
    fn extracts_api_key_from_watch_page() {
        let html = r#"<script>ytcfg.set({"INNERTUBE_API_KEY": "AIzaSy_test-KEY123","X":1})</script>"#;
        assert_eq!(extract_api_key(html, "vid").unwrap(), "AIzaSy_test-KEY123");
    }

    #[test]
    fn recaptcha_page_is_request_blocked() {
        let html = r#"<div class="g-recaptcha" data-sitekey="x"></div>"#;
        assert!(matches!(
            extract_api_key(html, "vid"),
            Err(ProviderError::RequestBlocked { .. })
        ));
        assert!(matches!(
            extract_api_key("<html></html>", "vid"),
            Err(ProviderError::InvalidResponse { .. })
        ));
    }

    #[test]
    fn consent_page_yields_cookie() {
        let html = r#"<form action="https://consent.youtube.com/s" method="POST">
            <input type="hidden" name="gl" value="DE">
            <input type="hidden" name="v" value="cb.20240101-00-p0.de+FX+123">
        </form>"#;
        assert!(is_consent_page(html));
        assert_eq!(
            consent_cookie(html).as_deref(),
            Some("CONSENT=YES+cb.20240101-00-p0.de+FX+123")
        );

        let watch = r#"{"INNERTUBE_API_KEY": "KEY"}"#;
        assert!(!is_consent_page(watch));
        assert!(consent_cookie(watch).is_none());
    }

    #[test]
    fn bad_accept_language_is_config_error() {
        let config = YoutubeConfig {
            accept_language: "en\nUS".to_string(),
            ..YoutubeConfig::default()
        };
        assert!(matches!(
            YoutubeClient::new(config),
            Err(ProviderError::InvalidConfig { .. })
        ));
    }

    #[test]
    fn parses_caption_tracks_in_order() {
        let json = r#"{
            "playabilityStatus": {"status": "OK"},
            "captions": {"playerCaptionsTracklistRenderer": {"captionTracks": [
                {"baseUrl": "https://yt.test/api/timedtext?v=vid&lang=es&fmt=srv3",
                 "name": {"runs": [{"text": "Spanish"}]}, "languageCode": "es"},
                {"baseUrl": "https://yt.test/api/timedtext?v=vid&lang=en&kind=asr",
                 "name": {"simpleText": "English (auto-generated)"},
                 "languageCode": "en", "kind": "asr"}
            ]}}
        }"#;
        let tracks = caption_tracks(player(json), "vid").unwrap();

        assert_eq!(tracks.len(), 2);
        assert_eq!(tracks[0].metadata.language, "Spanish");
        assert_eq!(tracks[0].metadata.language_code, "es");
        assert!(!tracks[0].metadata.is_generated);
        assert_eq!(tracks[0].url, "https://yt.test/api/timedtext?v=vid&lang=es");
        assert_eq!(tracks[1].metadata.language, "English (auto-generated)");
        assert!(tracks[1].metadata.is_generated);
    }

    #[test]
    fn missing_captions_means_disabled() {
        let json = r#"{"playabilityStatus": {"status": "OK"}}"#;
        assert!(matches!(
            caption_tracks(player(json), "vid"),
            Err(ProviderError::TranscriptsDisabled { .. })
        ));
    }

    #[test]
    fn playability_errors_are_classified() {
        let json = r#"{"playabilityStatus": {"status": "ERROR", "reason": "This video is unavailable"}}"#;
        assert!(matches!(
            caption_tracks(player(json), "vid"),
            Err(ProviderError::VideoUnavailable { .. })
        ));

        let json = r#"{"playabilityStatus": {"status": "LOGIN_REQUIRED", "reason": "Sign in to confirm you’re not a bot"}}"#;
        assert!(matches!(
            caption_tracks(player(json), "vid"),
            Err(ProviderError::RequestBlocked { .. })
        ));

        let json = r#"{"playabilityStatus": {"status": "UNPLAYABLE", "reason": "Private video"}}"#;
        match caption_tracks(player(json), "vid") {
            Err(ProviderError::VideoUnplayable { reason, .. }) => assert_eq!(reason, "Private video"),
            other => panic!("unexpected result: {:?}", other),
        }
    }

    #[test]
    fn timed_text_events_become_segments() {
        let json = r#"{"events": [
            {"tStartMs": 0, "dDurationMs": 1500, "segs": [{"utf8": "Hola "}, {"utf8": "mundo"}]},
            {"tStartMs": 1500, "dDurationMs": 10, "aAppend": 1, "segs": [{"utf8": "\n"}]},
            {"tStartMs": 1600, "dDurationMs": 2000},
            {"tStartMs": 2000, "dDurationMs": 2500, "segs": [{"utf8": "¿qué tal?"}]}
        ]}"#;
        let timed: TimedText = serde_json::from_str(json).unwrap();
        let segments = timed.into_segments();

        assert_eq!(segments.len(), 2);
        assert_eq!(segments[0].text, "Hola mundo");
        assert_eq!(segments[0].start, 0.0);
        assert_eq!(segments[0].duration, 1.5);
        assert_eq!(segments[1].text, "¿qué tal?");
        assert_eq!(segments[1].start, 2.0);
    }

    #[test]
    fn json3_url_replaces_srv3_format() {
        assert_eq!(
            json3_url("https://yt.test/api/timedtext?v=a&fmt=srv3"),
            "https://yt.test/api/timedtext?v=a&fmt=json3"
        );
    }

    #[test]
    fn config_urls() {
        let config = YoutubeConfig::default();
        assert_eq!(config.watch_url("abc"), "https://www.youtube.com/watch?v=abc");
        assert_eq!(
            config.player_url("KEY"),
            "https://www.youtube.com/youtubei/v1/player?key=KEY"
        );
    }
}
