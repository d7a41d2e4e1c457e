use anyhow::{Context, anyhow};
use serde::Deserialize;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
    #[serde(default)]
    prompt_feedback: Option<PromptFeedback>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Candidate {
    #[serde(default)]
    content: Option<CandidateContent>,
    #[serde(default)]
    finish_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<CandidatePart>,
}

#[derive(Debug, Deserialize)]
struct CandidatePart {
    #[serde(default)]
    text: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PromptFeedback {
    #[serde(default)]
    block_reason: Option<String>,
}

/// Extracts the raw model text from a `generateContent` response envelope.
///
/// Text parts of the first candidate are concatenated. The text itself is not
/// interpreted here.
pub fn parse_generate_content(body: &[u8]) -> anyhow::Result<String> {
    let resp: GenerateContentResponse =
        serde_json::from_slice(body).context("decode generateContent JSON")?;

    if let Some(reason) = resp.prompt_feedback.and_then(|f| f.block_reason) {
        return Err(anyhow!("prompt blocked: {reason}"));
    }

    let candidate = resp
        .candidates
        .into_iter()
        .next()
        .ok_or_else(|| anyhow!("no candidates in generateContent response"))?;

    let text: String = candidate
        .content
        .map(|c| c.parts.into_iter().filter_map(|p| p.text).collect())
        .unwrap_or_default();

    if text.trim().is_empty() {
        let reason = candidate.finish_reason.unwrap_or_else(|| "unknown".into());
        return Err(anyhow!("empty candidate text (finishReason={reason})"));
    }
    Ok(text)
}
