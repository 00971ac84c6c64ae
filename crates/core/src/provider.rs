use crate::types::{CaptionTrack, FetchedTranscript};

#[derive(Debug, thiserror::Error)]
pub enum ProviderError {
    #[error("The video {video_id} is no longer available")]
    VideoUnavailable { video_id: String },

    #[error("The video {video_id} is unplayable: {reason}")]
    VideoUnplayable { video_id: String, reason: String },

    #[error("Subtitles are disabled for video {video_id}")]
    TranscriptsDisabled { video_id: String },

    #[error("No transcript for video {video_id} in any of the requested languages {requested:?}")]
    NoTranscriptFound {
        video_id: String,
        requested: Vec<String>,
    },

    #[error("YouTube is blocking requests for video {video_id}")]
    RequestBlocked { video_id: String },

    #[error("YouTube consent page could not be accepted for video {video_id}")]
    ConsentRequired { video_id: String },

    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("JSON parse error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Invalid provider response: {reason}")]
    InvalidResponse { reason: String },

    #[error("Invalid provider configuration: {reason}")]
    InvalidConfig { reason: String },
}

impl ProviderError {
    /// Whether the failure means "nothing can be served here", as opposed to a
    /// provider that answered with something we could not understand.
    pub fn is_unavailable(&self) -> bool {
        !matches!(
            self,
            ProviderError::Json(_)
                | ProviderError::InvalidResponse { .. }
                | ProviderError::InvalidConfig { .. }
        )
    }
}

/// A source of caption tracks for videos
pub trait CaptionProvider {
    /// Name reported in the `source` field of the result
    fn source(&self) -> &'static str;

    /// Fetch the first track matching `languages` in preference order
    async fn fetch(
        &self,
        video_id: &str,
        languages: &[&str],
    ) -> Result<FetchedTranscript, ProviderError>;

    /// List every track in provider order
    async fn list(&self, video_id: &str) -> Result<Vec<CaptionTrack>, ProviderError>;

    async fn fetch_track(&self, track: &CaptionTrack) -> Result<FetchedTranscript, ProviderError>;
}

/// Pick a track for `languages`, preferring manually created captions
pub fn find_track<'a>(tracks: &'a [CaptionTrack], languages: &[&str]) -> Option<&'a CaptionTrack> {
    languages.iter().find_map(|lang| {
        tracks
            .iter()
            .filter(|t| t.metadata.language_code == *lang)
            .min_by_key(|t| t.metadata.is_generated)
    })
}
