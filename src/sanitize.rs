use crate::error::FlowchartError;
use serde::Deserialize;

#[derive(Deserialize)]
struct GenerateResponse {
    candidates: Option<Vec<Candidate>>,
}

#[derive(Deserialize)]
struct Candidate {
    content: Option<CandidateContent>,
    #[serde(rename = "finishReason")]
    finish_reason: Option<String>,
}

// Gemini models return { parts: [{ text }] }; the legacy generateText
// endpoint returned content as a bare string.
#[derive(Deserialize)]
#[serde(untagged)]
enum CandidateContent {
    Structured {
        #[serde(default)]
        parts: Vec<ResponsePart>,
    },
    Legacy(String),
}

#[derive(Deserialize)]
struct ResponsePart {
    text: String,
}

/// Pulls the generated text out of a raw generateContent response body.
pub fn extract_text(body: &str) -> Result<String, FlowchartError> {
    let response: GenerateResponse = serde_json::from_str(body)
        .map_err(|e| FlowchartError::UpstreamFormat(format!("{}. Body: {}", e, body)))?;

    let candidates = response
        .candidates
        .unwrap_or_default();

    let Some(first) = candidates.first() else {
        return Err(FlowchartError::UpstreamFormat(
            "response contained no candidates".to_string(),
        ));
    };

    match &first.content {
        Some(CandidateContent::Structured { parts }) => match parts.first() {
            Some(part) => Ok(part.text.trim().to_string()),
            None => Err(FlowchartError::UpstreamFormat(format!(
                "candidate had no parts. Finish reason: {}",
                first.finish_reason.as_deref().unwrap_or("UNKNOWN")
            ))),
        },
        Some(CandidateContent::Legacy(text)) => Ok(text.trim().to_string()),
        None => Err(FlowchartError::UpstreamFormat(format!(
            "candidate had no content. Finish reason: {}",
            first.finish_reason.as_deref().unwrap_or("UNKNOWN")
        ))),
    }
}

/// Strips a Markdown code fence wrapper from model output, if present.
/// No diagram syntax validation happens here; malformed source passes
/// through unchanged.
pub fn strip_fences(text: &str) -> String {
    let text = text.trim();
    let inner = if let Some(rest) = text.strip_prefix("```mermaid") {
        rest
    } else if let Some(rest) = text.strip_prefix("```") {
        rest
    } else {
        return text.to_string();
    };
    inner.strip_suffix("```").unwrap_or(inner).trim().to_string()
}
