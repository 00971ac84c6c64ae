//! Polycore Core Library
//!
//! Fetches YouTube caption tracks, normalizes them into timed segments and
//! labels each segment with a coarse difficulty level.

pub mod difficulty;
pub mod error;
pub mod format;
pub mod pipeline;
pub mod provider;
pub mod types;
pub mod youtube;

// Re-export commonly used items at crate root
pub use difficulty::{TextStats, classify};
pub use error::{CaptionError, Result};
pub use format::{build_report, format_timestamp, normalize_segment, render_document};
pub use pipeline::{extract_subtitles, fetch_transcript};
pub use provider::{CaptionProvider, ProviderError};
pub use types::{
    CaptionSegment, CaptionTrack, Difficulty, FailureReport, FetchedTranscript,
    NormalizedSegment, ResultDocument, SubtitleReport, TrackMetadata,
};
pub use youtube::{YoutubeClient, YoutubeConfig};
