use serde::{Deserialize, Serialize};

/// One timed caption record as returned by a provider
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CaptionSegment {
    pub text: String,
    pub start: f64,
    pub duration: f64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrackMetadata {
    pub language: String,
    pub language_code: String,
    pub is_generated: bool,
}

/// A caption track that can be fetched later
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CaptionTrack {
    pub video_id: String,
    pub metadata: TrackMetadata,
    /// Provider specific locator for the track content
    pub url: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct FetchedTranscript {
    pub video_id: String,
    pub metadata: TrackMetadata,
    pub segments: Vec<CaptionSegment>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Difficulty {
    Beginner,
    Intermediate,
    Advanced,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NormalizedSegment {
    pub start: f64,
    pub end: f64,
    pub text: String,
    pub translation: String,
    pub difficulty: Difficulty,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SubtitleReport {
    pub success: bool,
    #[serde(rename = "videoId")]
    pub video_id: String,
    pub transcript: Vec<NormalizedSegment>,
    pub source: String,
    pub language: String,
    pub language_code: String,
    pub is_generated: bool,
    pub note: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FailureReport {
    pub success: bool,
    pub error: String,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub details: Option<String>,
}

impl FailureReport {
    pub fn new(error: impl Into<String>) -> Self {
        Self {
            success: false,
            error: error.into(),
            details: None,
        }
    }

    pub fn with_details(mut self, details: impl Into<String>) -> Self {
        self.details = Some(details.into());
        self
    }
}

/// The single JSON document a run produces
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ResultDocument {
    Success(SubtitleReport),
    Failure(FailureReport),
}

impl ResultDocument {
    pub fn is_success(&self) -> bool {
        matches!(self, ResultDocument::Success(_))
    }
}
