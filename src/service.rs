use crate::error::FlowchartError;
use crate::gemini::{pick_text_model, TextGenerator};
use crate::prompt;
use crate::render::SvgRenderer;
use crate::sanitize;
use log::info;
use serde::Serialize;
use std::path::PathBuf;

pub const GENERATION_METHOD: &str = "Gemini AI Multi-Flowchart";

const DEFAULT_CHARACTER_NAMES: &[&str] = &["Character A", "Character B", "Character C"];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FlowchartKind {
    Ensemble,
    Character,
}

/// One generated diagram. Immutable once produced.
#[derive(Debug, Clone, Serialize)]
pub struct Flowchart {
    pub title: String,
    pub mermaid_code: String,
    pub description: String,
    #[serde(rename = "type")]
    pub kind: FlowchartKind,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub character_name: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct FlowchartEntry {
    pub key: String,
    #[serde(flatten)]
    pub flowchart: Flowchart,
}

/// One ensemble diagram plus one diagram per character, in input order.
#[derive(Debug, Clone, Serialize)]
pub struct MultiFlowchartResult {
    pub description: String,
    pub character_names: Vec<String>,
    pub flowcharts: Vec<FlowchartEntry>,
    pub total_flowcharts: usize,
    pub generation_method: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct HealthStatus {
    pub available: bool,
    pub model_count: usize,
    pub selected_model: Option<String>,
}

/// Orchestrates prompt construction, model selection, generation and
/// rendering. Explicitly constructed and passed around; holds no global
/// state beyond the injected client.
pub struct FlowchartService {
    generator: Box<dyn TextGenerator>,
    renderer: SvgRenderer,
}

impl FlowchartService {
    pub fn new(generator: Box<dyn TextGenerator>, renderer: SvgRenderer) -> Self {
        Self {
            generator,
            renderer,
        }
    }

    /// One generation round trip: fresh model listing, selection, prompt
    /// submission, fence stripping.
    pub async fn generate_mermaid(&self, prompt_text: &str) -> Result<String, FlowchartError> {
        let models = self.generator.list_models().await?;
        let model = pick_text_model(&models)?;
        let raw = self.generator.generate(&model, prompt_text).await?;
        Ok(sanitize::strip_fences(&raw))
    }

    pub async fn from_description(&self, description: &str) -> Result<String, FlowchartError> {
        self.generate_mermaid(&prompt::description(description)).await
    }

    pub async fn from_story(&self, content: &str, title: &str) -> Result<String, FlowchartError> {
        self.generate_mermaid(&prompt::story(content, title)).await
    }

    /// Generates from a description and renders to an SVG file. The caller
    /// owns deletion of the returned file.
    pub async fn render_svg(&self, description: &str) -> Result<PathBuf, FlowchartError> {
        let mermaid_code = self.from_description(description).await?;
        self.renderer.render(&mermaid_code).await
    }

    pub async fn render_svg_source(&self, mermaid_code: &str) -> Result<PathBuf, FlowchartError> {
        self.renderer.render(mermaid_code).await
    }

    /// Generates one ensemble flowchart plus one per character,
    /// sequentially and in input order. The first failing generation aborts
    /// the whole orchestration; there is no partial result and no retry.
    pub async fn generate_multiple(
        &self,
        description: &str,
        character_names: &[String],
    ) -> Result<MultiFlowchartResult, FlowchartError> {
        let character_names: Vec<String> = if character_names.is_empty() {
            DEFAULT_CHARACTER_NAMES
                .iter()
                .map(|s| s.to_string())
                .collect()
        } else {
            character_names.to_vec()
        };

        let mut flowcharts = Vec::with_capacity(character_names.len() + 1);

        let ensemble_code = self.generate_mermaid(&prompt::ensemble(description)).await?;
        flowcharts.push(FlowchartEntry {
            key: "ensemble".to_string(),
            flowchart: Flowchart {
                title: "Main Story Flow - Ensemble".to_string(),
                mermaid_code: ensemble_code,
                description: "Overall story structure and character interactions".to_string(),
                kind: FlowchartKind::Ensemble,
                character_name: None,
            },
        });

        for (i, name) in character_names.iter().enumerate() {
            let code = self
                .generate_mermaid(&prompt::character(description, name))
                .await?;
            flowcharts.push(FlowchartEntry {
                key: format!("character_{}", i + 1),
                flowchart: Flowchart {
                    title: format!("{} - Character Journey", name),
                    mermaid_code: code,
                    description: format!(
                        "Individual character arc and development for {}",
                        name
                    ),
                    kind: FlowchartKind::Character,
                    character_name: Some(name.clone()),
                },
            });
        }

        info!("Generated {} flowcharts", flowcharts.len());

        Ok(MultiFlowchartResult {
            description: description.to_string(),
            character_names,
            total_flowcharts: flowcharts.len(),
            flowcharts,
            generation_method: GENERATION_METHOD.to_string(),
        })
    }

    /// Lists models and reports whether a usable one exists. A fully
    /// filtered listing is a healthy-but-unavailable state, not an error.
    pub async fn health_check(&self) -> Result<HealthStatus, FlowchartError> {
        let models = self.generator.list_models().await?;
        let selected_model = match pick_text_model(&models) {
            Ok(model) => Some(model),
            Err(FlowchartError::NoEligibleModel) => None,
            Err(e) => return Err(e),
        };

        Ok(HealthStatus {
            available: selected_model.is_some(),
            model_count: models.len(),
            selected_model,
        })
    }
}
