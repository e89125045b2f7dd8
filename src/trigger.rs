use crate::config::TriggerConfig;
use crate::service::{FlowchartService, MultiFlowchartResult};
use anyhow::Result;
use async_trait::async_trait;
use log::{debug, error, info, warn};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

const DEFAULT_CHARACTER_HINTS: &[&str] = &["Protagonist", "Supporting Character", "Antagonist"];

/// Keyword table for pulling character hints out of a transcript.
const CHARACTER_KEYWORDS: &[(&[&str], &str)] = &[
    (&["hero", "protagonist"], "Hero/Protagonist"),
    (&["villain", "antagonist"], "Villain/Antagonist"),
    (&["friend", "companion"], "Companion"),
    (&["mentor", "teacher"], "Mentor"),
];

/// One user/assistant turn of a stored conversation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MessageExchange {
    pub user_text: String,
    pub assistant_text: String,
}

/// Domain event emitted by the conversation layer after a message is
/// persisted.
#[derive(Debug, Clone)]
pub struct MessageAdded {
    pub conversation_id: String,
}

/// Read-only view of the conversation store owned by the persistence layer.
#[async_trait]
pub trait TranscriptStore: Send + Sync {
    async fn message_count(&self, conversation_id: &str) -> Result<usize>;
    async fn transcript(&self, conversation_id: &str) -> Result<Vec<MessageExchange>>;
}

/// Extracts up to `max` character name hints from transcript text by
/// keyword matching, padding with generic defaults not already present.
pub fn extract_character_hints(text: &str, max: usize) -> Vec<String> {
    let lower = text.to_lowercase();
    let mut hints: Vec<String> = Vec::new();

    for (keywords, hint) in CHARACTER_KEYWORDS {
        if keywords.iter().any(|k| lower.contains(k)) {
            hints.push(hint.to_string());
        }
    }

    for default in DEFAULT_CHARACTER_HINTS {
        if hints.len() >= max {
            break;
        }
        if !hints.iter().any(|h| h == default) {
            hints.push(default.to_string());
        }
    }

    hints.truncate(max);
    hints
}

/// Turns a transcript into the narrative description fed to diagram
/// generation.
pub fn build_description(exchanges: &[MessageExchange]) -> String {
    let turns: Vec<String> = exchanges
        .iter()
        .enumerate()
        .map(|(i, exchange)| {
            format!(
                "User {n}: {user}\nAssistant {n}: {assistant}",
                n = i + 1,
                user = exchange.user_text,
                assistant = exchange.assistant_text
            )
        })
        .collect();

    format!(
        "This is a conversation-based story development session with the following flow:\n\
        \n\
        {}\n\
        \n\
        Create flowcharts that capture:\n\
        1. The overall narrative arc and story development\n\
        2. Key story elements, characters, and plot points discussed\n\
        3. Creative decisions and story branching points\n\
        4. Character development and interactions mentioned\n\
        5. The progression from initial concept to developed story elements",
        turns.join("\n\n")
    )
}

/// Listens for message-added events and, once a conversation holds enough
/// messages, generates the full flowchart set from its transcript. Fires
/// and forgets: failures are logged, never surfaced to the caller.
pub struct FlowchartTrigger {
    store: Arc<dyn TranscriptStore>,
    service: Arc<FlowchartService>,
    message_threshold: usize,
    max_characters: usize,
}

impl FlowchartTrigger {
    pub fn new(
        store: Arc<dyn TranscriptStore>,
        service: Arc<FlowchartService>,
        config: &TriggerConfig,
    ) -> Self {
        Self {
            store,
            service,
            message_threshold: config.message_threshold,
            max_characters: config.max_characters,
        }
    }

    /// Two requests reading the same count concurrently can both fire;
    /// the read-then-act window is not serialized here.
    pub async fn on_message_added(&self, event: &MessageAdded) -> Option<MultiFlowchartResult> {
        let conversation_id = &event.conversation_id;

        let count = match self.store.message_count(conversation_id).await {
            Ok(count) => count,
            Err(e) => {
                warn!("Conversation {} not readable: {}", conversation_id, e);
                return None;
            }
        };

        debug!(
            "Conversation {} currently has {} messages",
            conversation_id, count
        );

        if count < self.message_threshold {
            return None;
        }

        info!(
            "Triggering flowchart generation for conversation {} (will have {} messages)",
            conversation_id,
            count + 1
        );

        match self.generate(conversation_id).await {
            Ok(result) => {
                info!(
                    "Generated {} flowcharts for conversation {}",
                    result.total_flowcharts, conversation_id
                );
                Some(result)
            }
            Err(e) => {
                error!(
                    "Flowchart generation failed for conversation {}: {}",
                    conversation_id, e
                );
                None
            }
        }
    }

    async fn generate(&self, conversation_id: &str) -> Result<MultiFlowchartResult> {
        let exchanges = self.store.transcript(conversation_id).await?;

        let transcript_text: Vec<String> = exchanges
            .iter()
            .map(|e| format!("{} {}", e.user_text, e.assistant_text))
            .collect();
        let character_names =
            extract_character_hints(&transcript_text.join(" "), self.max_characters);

        let description = build_description(&exchanges);

        let result = self
            .service
            .generate_multiple(&description, &character_names)
            .await?;
        Ok(result)
    }
}
