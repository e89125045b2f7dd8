use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

#[derive(Debug, Serialize, Deserialize, Clone, Default)]
pub struct Config {
    #[serde(default)]
    pub gemini: GeminiConfig,

    #[serde(default)]
    pub renderer: RendererConfig,

    #[serde(default)]
    pub trigger: TriggerConfig,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct GeminiConfig {
    /// Falls back to the GEMINI_API_KEY environment variable when empty.
    #[serde(default)]
    pub api_key: String,

    #[serde(default = "default_base_url")]
    pub base_url: String,
}

impl Default for GeminiConfig {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            base_url: default_base_url(),
        }
    }
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct RendererConfig {
    #[serde(default = "default_renderer_command")]
    pub command: String,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct TriggerConfig {
    /// Existing message count at which diagram generation fires. 9 means the
    /// message being added would be the 10th.
    #[serde(default = "default_message_threshold")]
    pub message_threshold: usize,

    #[serde(default = "default_max_characters")]
    pub max_characters: usize,
}

impl Default for RendererConfig {
    fn default() -> Self {
        Self {
            command: default_renderer_command(),
        }
    }
}

impl Default for TriggerConfig {
    fn default() -> Self {
        Self {
            message_threshold: default_message_threshold(),
            max_characters: default_max_characters(),
        }
    }
}

fn default_base_url() -> String {
    "https://generativelanguage.googleapis.com/v1beta".to_string()
}

fn default_renderer_command() -> String {
    "mmdc".to_string()
}

fn default_message_threshold() -> usize {
    9
}

fn default_max_characters() -> usize {
    3
}

impl Config {
    pub fn load() -> Result<Self> {
        let path = Path::new("config.yml");
        if !path.exists() {
            // Everything has a usable default; the API key can still come
            // from the environment.
            return Ok(Config::default());
        }

        let content = fs::read_to_string(path).context("Failed to read config.yml")?;
        let config: Config =
            serde_yaml_ng::from_str(&content).context("Failed to parse config.yml")?;
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_fill_missing_sections() {
        let config: Config = serde_yaml_ng::from_str("gemini:\n  api_key: abc\n").unwrap();
        assert_eq!(config.gemini.api_key, "abc");
        assert_eq!(
            config.gemini.base_url,
            "https://generativelanguage.googleapis.com/v1beta"
        );
        assert_eq!(config.renderer.command, "mmdc");
        assert_eq!(config.trigger.message_threshold, 9);
        assert_eq!(config.trigger.max_characters, 3);
    }

    #[test]
    fn test_explicit_values_win() {
        let yaml = "renderer:\n  command: /usr/local/bin/mmdc\ntrigger:\n  message_threshold: 5\n";
        let config: Config = serde_yaml_ng::from_str(yaml).unwrap();
        assert_eq!(config.renderer.command, "/usr/local/bin/mmdc");
        assert_eq!(config.trigger.message_threshold, 5);
        assert_eq!(config.trigger.max_characters, 3);
    }
}
