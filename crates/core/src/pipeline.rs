use tracing::{debug, info, warn};

use crate::{
    error::{CaptionError, Result},
    format::{build_report, format_timestamp},
    provider::CaptionProvider,
    types::{FailureReport, FetchedTranscript, ResultDocument},
};

/// Fetch captions in `preferred_language`, falling back to the first listed track
pub async fn fetch_transcript<P: CaptionProvider>(
    provider: &P,
    video_id: &str,
    preferred_language: &str,
) -> Result<FetchedTranscript> {
    let err = match provider.fetch(video_id, &[preferred_language]).await {
        Ok(transcript) => return Ok(transcript),
        Err(e) if e.is_unavailable() => e,
        Err(e) => return Err(e.into()),
    };

    info!(
        video_id,
        preferred_language,
        reason = %err,
        "preferred language unavailable, trying first listed track"
    );

    let no_transcript = |reason: String| CaptionError::NoTranscript {
        video_id: video_id.to_string(),
        reason,
    };

    let tracks = provider
        .list(video_id)
        .await
        .map_err(|e| no_transcript(e.to_string()))?;
    debug!(video_id, tracks = tracks.len(), "listed caption tracks");

    let track = tracks
        .first()
        .ok_or_else(|| no_transcript("No transcripts available".to_string()))?;

    provider
        .fetch_track(track)
        .await
        .map_err(|e| no_transcript(e.to_string()))
}

async fn extract<P: CaptionProvider>(
    provider: &P,
    video_id: &str,
    preferred_language: &str,
) -> Result<ResultDocument> {
    let transcript = fetch_transcript(provider, video_id, preferred_language).await?;

    let Some(last) = transcript.segments.last() else {
        return Err(CaptionError::EmptyTranscript);
    };
    info!(
        video_id,
        language_code = %transcript.metadata.language_code,
        is_generated = transcript.metadata.is_generated,
        segments = transcript.segments.len(),
        span = %format_timestamp(last.start + last.duration),
        "fetched transcript"
    );

    Ok(build_report(&transcript, provider.source()))
}

/// Run one extraction and fold every outcome into a result document
pub async fn extract_subtitles<P: CaptionProvider>(
    provider: &P,
    video_id: &str,
    preferred_language: &str,
) -> ResultDocument {
    match extract(provider, video_id, preferred_language).await {
        Ok(document) => document,
        Err(e) => {
            warn!(video_id, error = %e, "subtitle extraction failed");
            ResultDocument::Failure(failure_report(e, video_id))
        }
    }
}

fn failure_report(err: CaptionError, video_id: &str) -> FailureReport {
    match err {
        CaptionError::NoTranscript { .. } | CaptionError::EmptyTranscript => {
            FailureReport::new(err.to_string())
        }
        other => FailureReport::new(other.to_string())
            .with_details(format!("Failed to extract subtitles for video {}", video_id)),
    }
}
