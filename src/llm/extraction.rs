//! Delegated field extraction and confirmation-intent classification

use std::sync::Arc;

use tracing::debug;
use tracing::warn;

use crate::errors::Result;
use crate::llm::prompts;
use crate::llm::ChatClient;
use crate::llm::ChatMessage;
use crate::llm::CompletionRequest;
use crate::models::ProfileField;

/// Strict result of a delegated field extraction.
///
/// The dialogue engine never accepts an unvalidated shape: an `Accepted`
/// value is still re-checked against the field's format rule before it is
/// stored.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Extraction {
    Accepted(String),
    Rejected,
}

/// Classified intent of a confirmation-phase response
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfirmIntent {
    Confirm,
    Edit { field: String, new_value: String },
    /// Not classifiable; the caller re-prompts without mutating anything
    Unclear,
}

/// Wraps the chat collaborator for the two structured dialogue calls:
/// per-field extraction and confirmation analysis.
pub struct FieldExtractor {
    chat: Arc<dyn ChatClient>,
}

impl FieldExtractor {
    pub fn new(chat: Arc<dyn ChatClient>) -> Self {
        Self { chat }
    }

    /// Ask the collaborator to pull a valid field value out of free text.
    ///
    /// A literal `Invalid` reply maps to `Rejected`; anything else is handed
    /// back as `Accepted` for the caller to re-validate. Transport failures
    /// propagate as errors.
    pub async fn extract(&self, field: ProfileField, input: &str) -> Result<Extraction> {
        let request = CompletionRequest::new(prompts::extraction_system_prompt(field))
            .with_message(ChatMessage::user(prompts::extraction_user_message(
                field, input,
            )))
            .with_temperature(0.0)
            .with_max_tokens(50);

        let reply = self.chat.complete(request).await?;
        let reply = reply.trim();
        debug!("Extraction reply for {}: {reply}", field.key());

        if reply.eq_ignore_ascii_case("Invalid") {
            Ok(Extraction::Rejected)
        } else {
            Ok(Extraction::Accepted(reply.to_string()))
        }
    }

    /// Classify a confirmation-phase response as confirm / edit / unclear
    pub async fn classify_confirmation(&self, input: &str) -> Result<ConfirmIntent> {
        let (example_user, example_assistant) = prompts::confirmation_example();
        let request = CompletionRequest::new(prompts::confirmation_system_prompt())
            .with_message(ChatMessage::user(example_user))
            .with_message(ChatMessage::assistant(example_assistant))
            .with_message(ChatMessage::user(input))
            .with_temperature(0.0)
            .with_max_tokens(100);

        let reply = self.chat.complete(request).await?;
        Ok(parse_confirmation_reply(&reply))
    }
}

/// Parse the classifier's raw reply into a strict intent.
///
/// Anything that is neither the literal `confirm` nor a well-formed edit
/// object is `Unclear` - a retry, not a failure.
fn parse_confirmation_reply(reply: &str) -> ConfirmIntent {
    let reply = reply.trim();
    if reply.eq_ignore_ascii_case("confirm") {
        return ConfirmIntent::Confirm;
    }

    match serde_json::from_str::<serde_json::Value>(reply) {
        Ok(value) => {
            let action = value.get("action").and_then(|v| v.as_str());
            let field = value.get("field").and_then(|v| v.as_str());
            let new_value = value.get("new_value").and_then(|v| v.as_str());

            match (action, field, new_value) {
                (Some("edit"), Some(field), Some(new_value)) => ConfirmIntent::Edit {
                    field: field.to_string(),
                    new_value: new_value.to_string(),
                },
                _ => ConfirmIntent::Unclear,
            }
        }
        Err(e) => {
            warn!("Unparseable confirmation reply: {e}");
            ConfirmIntent::Unclear
        }
    }
}
