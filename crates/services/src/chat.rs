use std::fmt::Write as _;
use std::sync::Arc;

use dreppy_core::model::{PersonalRecord, UserId, personal_records_by_name};
use serde::{Deserialize, Serialize};
use storage::repository::HistoryRepository;
use tracing::warn;

use crate::ai::{ChatMessage, CompletionClient, CompletionRequest};
use crate::error::ChatError;

/// Reply used when the model answers with empty content.
pub const EMPTY_REPLY: &str = "Sorry, I could not generate a response.";

/// Completed sets scanned for personal records.
pub const RECENT_SET_WINDOW: u32 = 50;

/// What the user is doing right now, as sent along with a chat message.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ExerciseContext {
    pub name: String,
    pub muscle_group: String,
    pub current_set: u32,
    pub total_sets: u32,
    pub target_reps: Option<u32>,
    pub weight: f64,
}

/// Build the system message for the assistant.
#[must_use]
pub fn build_system_prompt(
    context: Option<&ExerciseContext>,
    records: &[(String, PersonalRecord)],
) -> String {
    let context_block = match context {
        Some(ctx) => format!(
            "Current exercise context:\n- Exercise: {}\n- Muscle group: {}\n- Current set: {} of {}\n- Target reps: {}\n- Weight: {}kg",
            ctx.name,
            ctx.muscle_group,
            ctx.current_set,
            ctx.total_sets,
            ctx.target_reps.map_or_else(String::new, |r| r.to_string()),
            ctx.weight
        ),
        None => "No specific exercise context provided.".to_owned(),
    };

    let mut records_block = String::new();
    if !records.is_empty() {
        records_block.push_str("\n\nUser's Personal Records (PRs):");
        for (name, pr) in records {
            let _ = write!(records_block, "\n- {name}: {}kg x {} reps", pr.weight, pr.reps);
        }
    }

    format!(
        "You are an AI workout coach helping someone during their workout. Be concise, encouraging, and helpful.\n\n{context_block}\n{records_block}\n\nProvide brief, actionable advice. If asked about form, give clear step-by-step instructions. If asked about PRs or history, use the data provided above. Keep responses under 150 words unless detailed explanation is needed."
    )
}

/// In-workout assistant backed by the completion client.
#[derive(Clone)]
pub struct ChatService {
    client: Arc<dyn CompletionClient>,
    history: Arc<dyn HistoryRepository>,
}

impl ChatService {
    #[must_use]
    pub fn new(client: Arc<dyn CompletionClient>, history: Arc<dyn HistoryRepository>) -> Self {
        Self { client, history }
    }

    /// Personal records from the user's most recent sets; history failures
    /// degrade to no records.
    pub async fn records_for(&self, user: UserId) -> Vec<(String, PersonalRecord)> {
        match self.history.recent_sets(user, RECENT_SET_WINDOW).await {
            Ok(sets) => personal_records_by_name(&sets),
            Err(err) => {
                warn!(error = %err, user = %user, "chat history lookup failed");
                Vec::new()
            }
        }
    }

    /// Answer the conversation so far.
    ///
    /// # Errors
    ///
    /// Returns `ChatError::Ai` when the completion call fails.
    pub async fn reply(
        &self,
        messages: &[ChatMessage],
        context: Option<&ExerciseContext>,
        user: Option<UserId>,
    ) -> Result<String, ChatError> {
        let records = match user {
            Some(user) => self.records_for(user).await,
            None => Vec::new(),
        };

        let mut conversation = Vec::with_capacity(messages.len() + 1);
        conversation.push(ChatMessage::system(build_system_prompt(context, &records)));
        conversation.extend_from_slice(messages);

        let content = self
            .client
            .complete(CompletionRequest {
                messages: conversation,
                max_tokens: 500,
                temperature: 0.7,
            })
            .await?;

        if content.trim().is_empty() {
            return Ok(EMPTY_REPLY.to_owned());
        }
        Ok(content)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn system_prompt_embeds_context_and_records() {
        let ctx = ExerciseContext {
            name: "Squat".into(),
            muscle_group: "Legs".into(),
            current_set: 2,
            total_sets: 4,
            target_reps: Some(5),
            weight: 120.0,
        };
        let records = vec![(
            "Squat".to_owned(),
            PersonalRecord {
                weight: 140.0,
                reps: 3,
            },
        )];
        let prompt = build_system_prompt(Some(&ctx), &records);
        assert!(prompt.contains("- Current set: 2 of 4"));
        assert!(prompt.contains("- Weight: 120kg"));
        assert!(prompt.contains("User's Personal Records (PRs):\n- Squat: 140kg x 3 reps"));
    }

    #[test]
    fn system_prompt_without_context_says_so() {
        let prompt = build_system_prompt(None, &[]);
        assert!(prompt.contains("No specific exercise context provided."));
        assert!(!prompt.contains("Personal Records"));
    }
}
