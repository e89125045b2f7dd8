use crate::config::GeminiConfig;
use crate::error::FlowchartError;
use crate::sanitize;
use anyhow::{bail, Result};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::fmt::Debug;

/// Identifiers containing any of these are not general text generation
/// models and are never selected.
const MODEL_DENYLIST: &[&str] = &[
    "embedding", "aqa", "imagen", "tts", "exp", "thinking", "preview", "learnlm",
];

/// Known-stable models, in order of preference.
const PREFERRED_MODELS: &[&str] = &[
    "models/gemini-1.5-pro",
    "models/gemini-1.5-flash",
    "models/gemini-2.5-pro",
    "models/gemini-2.5-flash",
    "models/gemini-2.0-flash",
];

#[async_trait]
pub trait TextGenerator: Send + Sync + Debug {
    /// Lists the model identifiers available to this account.
    async fn list_models(&self) -> Result<Vec<String>, FlowchartError>;

    /// Submits a single-turn prompt and returns the raw model text,
    /// fences and all.
    async fn generate(&self, model: &str, prompt: &str) -> Result<String, FlowchartError>;
}

/// Selects a text generation model from a fresh model listing. Denylisted
/// identifiers are excluded first; preferred stable models win in order,
/// otherwise the first eligible entry in listing order is used.
pub fn pick_text_model(models: &[String]) -> Result<String, FlowchartError> {
    let eligible: Vec<&String> = models
        .iter()
        .filter(|m| {
            let lower = m.to_lowercase();
            !MODEL_DENYLIST.iter().any(|deny| lower.contains(deny))
        })
        .collect();

    if eligible.is_empty() {
        return Err(FlowchartError::NoEligibleModel);
    }

    for preferred in PREFERRED_MODELS {
        if let Some(found) = eligible.iter().find(|m| m.as_str() == *preferred) {
            return Ok((*found).clone());
        }
    }

    Ok(eligible[0].clone())
}

#[derive(Debug)]
pub struct GeminiClient {
    api_key: String,
    base_url: String,
    client: reqwest::Client,
}

impl GeminiClient {
    /// Missing credentials fail here, at construction, so request handlers
    /// only ever see upstream errors.
    pub fn new(config: &GeminiConfig) -> Result<Self> {
        let api_key = if config.api_key.is_empty() {
            std::env::var("GEMINI_API_KEY").unwrap_or_default()
        } else {
            config.api_key.clone()
        };

        if api_key.is_empty() {
            bail!("GEMINI_API_KEY is required (config.yml or environment)");
        }

        Ok(Self {
            api_key,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            client: reqwest::Client::new(),
        })
    }
}

#[derive(Serialize)]
struct GenerateRequest {
    contents: Vec<Content>,
    #[serde(rename = "generationConfig")]
    generation_config: GenerationConfig,
}

#[derive(Serialize)]
struct Content {
    parts: Vec<Part>,
}

#[derive(Serialize)]
struct Part {
    text: String,
}

#[derive(Serialize)]
struct GenerationConfig {
    temperature: f32,
    #[serde(rename = "maxOutputTokens")]
    max_output_tokens: u32,
}

#[derive(Deserialize)]
struct ModelsResponse {
    #[serde(default)]
    models: Vec<ModelEntry>,
}

#[derive(Deserialize)]
struct ModelEntry {
    name: String,
}

#[async_trait]
impl TextGenerator for GeminiClient {
    async fn list_models(&self) -> Result<Vec<String>, FlowchartError> {
        let url = format!("{}/models?key={}", self.base_url, self.api_key);

        let resp = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|e| FlowchartError::UpstreamUnavailable(e.to_string()))?;

        if !resp.status().is_success() {
            let status = resp.status();
            let body = resp.text().await.unwrap_or_default();
            return Err(FlowchartError::UpstreamUnavailable(format!(
                "model listing returned {}: {}",
                status, body
            )));
        }

        let listing: ModelsResponse = resp
            .json()
            .await
            .map_err(|e| FlowchartError::UpstreamFormat(e.to_string()))?;

        Ok(listing.models.into_iter().map(|m| m.name).collect())
    }

    async fn generate(&self, model: &str, prompt: &str) -> Result<String, FlowchartError> {
        // The listing returns "models/<id>" but the URL wants the bare id.
        let model_id = model.strip_prefix("models/").unwrap_or(model);
        let url = format!(
            "{}/models/{}:generateContent?key={}",
            self.base_url, model_id, self.api_key
        );

        let request_body = GenerateRequest {
            contents: vec![Content {
                parts: vec![Part {
                    text: prompt.to_string(),
                }],
            }],
            generation_config: GenerationConfig {
                temperature: 0.2,
                max_output_tokens: 1000,
            },
        };

        let resp = self
            .client
            .post(&url)
            .json(&request_body)
            .send()
            .await
            .map_err(|e| FlowchartError::UpstreamUnavailable(e.to_string()))?;

        if !resp.status().is_success() {
            let status = resp.status();
            let body = resp.text().await.unwrap_or_default();
            return Err(FlowchartError::UpstreamUnavailable(format!(
                "generateContent returned {}: {}",
                status, body
            )));
        }

        let body = resp
            .text()
            .await
            .map_err(|e| FlowchartError::UpstreamUnavailable(e.to_string()))?;

        sanitize::extract_text(&body)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn models(names: &[&str]) -> Vec<String> {
        names.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_pick_never_returns_denylisted() {
        let list = models(&[
            "models/text-embedding-004",
            "models/gemini-2.0-flash-exp",
            "models/gemini-2.5-flash-preview-tts",
            "models/aqa",
            "models/custom-model",
        ]);
        let picked = pick_text_model(&list).unwrap();
        assert_eq!(picked, "models/custom-model");
    }

    #[test]
    fn test_pick_prefers_stable_models_regardless_of_order() {
        let list = models(&[
            "models/gemini-2.0-flash",
            "models/custom-model",
            "models/gemini-1.5-flash",
            "models/gemini-1.5-pro",
        ]);
        // 1.5-pro is highest preference even though it is listed last.
        assert_eq!(pick_text_model(&list).unwrap(), "models/gemini-1.5-pro");
    }

    #[test]
    fn test_pick_falls_back_to_first_eligible() {
        let list = models(&[
            "models/text-embedding-004",
            "models/other-model-b",
            "models/other-model-a",
        ]);
        assert_eq!(pick_text_model(&list).unwrap(), "models/other-model-b");
    }

    #[test]
    fn test_pick_empty_list_fails() {
        assert!(matches!(
            pick_text_model(&[]),
            Err(FlowchartError::NoEligibleModel)
        ));
    }

    #[test]
    fn test_pick_fully_filtered_list_fails() {
        let list = models(&["models/text-embedding-004", "models/imagen-3.0"]);
        assert!(matches!(
            pick_text_model(&list),
            Err(FlowchartError::NoEligibleModel)
        ));
    }

    #[test]
    fn test_denylist_is_case_insensitive() {
        let list = models(&["models/Text-EMBEDDING-004", "models/usable"]);
        assert_eq!(pick_text_model(&list).unwrap(), "models/usable");
    }

    #[test]
    fn test_models_response_parsing() {
        let json = r#"{
            "models": [
                { "name": "models/gemini-1.5-pro", "displayName": "Gemini 1.5 Pro" },
                { "name": "models/text-embedding-004" }
            ]
        }"#;
        let listing: ModelsResponse = serde_json::from_str(json).unwrap();
        let names: Vec<String> = listing.models.into_iter().map(|m| m.name).collect();
        assert_eq!(
            names,
            vec!["models/gemini-1.5-pro", "models/text-embedding-004"]
        );
    }

    #[test]
    fn test_models_response_missing_field_is_empty() {
        let listing: ModelsResponse = serde_json::from_str("{}").unwrap();
        assert!(listing.models.is_empty());
    }

    #[test]
    fn test_generate_request_shape() {
        let request = GenerateRequest {
            contents: vec![Content {
                parts: vec![Part {
                    text: "hello".to_string(),
                }],
            }],
            generation_config: GenerationConfig {
                temperature: 0.2,
                max_output_tokens: 1000,
            },
        };
        let value = serde_json::to_value(&request).unwrap();
        assert_eq!(value["contents"][0]["parts"][0]["text"], "hello");
        assert_eq!(value["generationConfig"]["maxOutputTokens"], 1000);
    }
}
