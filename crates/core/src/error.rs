use thiserror::Error;

use crate::provider::ProviderError;

#[derive(Error, Debug)]
pub enum CaptionError {
    #[error("No transcripts found for video {video_id}: {reason}")]
    NoTranscript { video_id: String, reason: String },

    #[error("No transcript data retrieved")]
    EmptyTranscript,

    #[error("{0}")]
    Provider(#[from] ProviderError),

    #[error("JSON serialization error: {0}")]
    JsonError(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, CaptionError>;
