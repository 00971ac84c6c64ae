use crate::{
    difficulty::classify,
    error::Result,
    types::{CaptionSegment, FetchedTranscript, NormalizedSegment, ResultDocument, SubtitleReport},
};

/// Format seconds as MM:SS timestamp
pub fn format_timestamp(seconds: f64) -> String {
    let mins = (seconds / 60.0) as u32;
    let secs = (seconds % 60.0) as u32;
    format!("{:02}:{:02}", mins, secs)
}

pub fn normalize_segment(segment: &CaptionSegment) -> NormalizedSegment {
    NormalizedSegment {
        start: segment.start,
        end: segment.start + segment.duration,
        text: segment.text.trim().to_string(),
        // translation is filled in by a later stage, if ever
        translation: String::new(),
        difficulty: classify(&segment.text),
    }
}

/// Build the success document for a fetched transcript
pub fn build_report(transcript: &FetchedTranscript, source: &str) -> ResultDocument {
    ResultDocument::Success(SubtitleReport {
        success: true,
        video_id: transcript.video_id.clone(),
        transcript: transcript.segments.iter().map(normalize_segment).collect(),
        source: source.to_string(),
        language: transcript.metadata.language.clone(),
        language_code: transcript.metadata.language_code.clone(),
        is_generated: transcript.metadata.is_generated,
        note: format!("Real subtitles extracted successfully using {}", source),
    })
}

/// Pretty JSON with two-space indentation, non-ASCII kept literal
pub fn render_document(document: &ResultDocument) -> Result<String> {
    Ok(serde_json::to_string_pretty(document)?)
}
