use crate::SummaryResult;

/// Render the summary, followed by the transcript when asked for
pub fn render_text(result: &SummaryResult, with_transcript: bool) -> String {
    match (&result.transcript, with_transcript) {
        (Some(transcript), true) => format!("{}\n\n--- Transcript ---\n{transcript}", result.summary),
        _ => result.summary.clone(),
    }
}

/// Render the whole result as pretty JSON
pub fn render_json(result: &SummaryResult) -> String {
    serde_json::to_string_pretty(result).unwrap_or_default()
}
