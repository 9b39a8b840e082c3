//! Slot-filling dialogue state machine

use std::time::SystemTime;

use tracing::debug;
use tracing::info;
use tracing::warn;
use uuid::Uuid;

use crate::dialogue::language;
use crate::dialogue::messages;
use crate::dialogue::messages::MessageKey;
use crate::llm::ConfirmIntent;
use crate::llm::Extraction;
use crate::llm::FieldExtractor;
use crate::models::ConversationTurn;
use crate::models::DialoguePhase;
use crate::models::ProfileField;
use crate::models::UserProfile;
use crate::rag::RetrievalAugmentedAnswerer;

/// All per-session dialogue state: profile, phase, transcript.
///
/// Owned by the caller and passed into every engine operation - there is no
/// ambient session state.
#[derive(Debug, Clone)]
pub struct DialogueSession {
    pub id: String,
    pub phase: DialoguePhase,
    pub profile: UserProfile,
    pub history: Vec<ConversationTurn>,
    pub created_at: u64,
    pub last_activity: u64,
}

impl DialogueSession {
    pub fn new() -> Self {
        let now = unix_now();
        Self {
            id: Uuid::new_v4().to_string(),
            phase: DialoguePhase::Greeting,
            profile: UserProfile::default(),
            history: Vec::new(),
            created_at: now,
            last_activity: now,
        }
    }

    pub fn touch(&mut self) {
        self.last_activity = unix_now();
    }

    pub fn is_expired(&self, timeout_secs: u64) -> bool {
        unix_now().saturating_sub(self.last_activity) > timeout_secs
    }
}

impl Default for DialogueSession {
    fn default() -> Self {
        Self::new()
    }
}

fn unix_now() -> u64 {
    SystemTime::now()
        .duration_since(SystemTime::UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or_default()
}

/// The scripted intake state machine.
///
/// Each phase has its own handler; transitions are strictly forward except
/// the edit loop in `Confirm`, and `QuestionAnswering` is absorbing - once
/// reached, every message goes to the retrieval answerer.
pub struct DialogueEngine {
    extractor: FieldExtractor,
    answerer: RetrievalAugmentedAnswerer,
}

impl DialogueEngine {
    pub fn new(extractor: FieldExtractor, answerer: RetrievalAugmentedAnswerer) -> Self {
        Self { extractor, answerer }
    }

    /// Start a new dialogue session, returning it together with the greeting
    pub fn start(&self) -> (DialogueSession, Vec<String>) {
        let mut session = DialogueSession::new();
        let greeting =
            messages::prompt(MessageKey::Greeting, session.profile.language).to_string();
        session
            .history
            .push(ConversationTurn::assistant(greeting.clone()));

        info!("Started dialogue session {}", session.id);
        (session, vec![greeting])
    }

    /// Process one user message and return the assistant messages to display.
    ///
    /// Validation failures and unclear intents are recovered by re-prompting;
    /// collaborator failures surface as explicit visible messages. This never
    /// returns an error to the host UI.
    pub async fn submit(&self, session: &mut DialogueSession, text: &str) -> Vec<String> {
        session.touch();
        session.history.push(ConversationTurn::user(text));
        debug!("Session {} phase {:?}: processing input", session.id, session.phase);

        let replies = match session.phase {
            DialoguePhase::Greeting => self.handle_greeting(session, text),
            DialoguePhase::Confirm => self.handle_confirm(session, text).await,
            DialoguePhase::QuestionAnswering => self.handle_question(session, text).await,
            phase => {
                // Every Ask* phase collects exactly one profile field
                let field = phase.field().expect("ask phase has a field");
                self.handle_slot(session, field, text).await
            }
        };

        for reply in &replies {
            session
                .history
                .push(ConversationTurn::assistant(reply.clone()));
        }
        replies
    }

    /// Detect the language of the very first message, then move on to the
    /// first profile field unconditionally.
    fn handle_greeting(&self, session: &mut DialogueSession, text: &str) -> Vec<String> {
        let lang = language::detect(text);
        session.profile.language = lang;
        session.phase = DialoguePhase::AskFirstName;

        vec![
            format!("Detected language: {}", lang.code()),
            messages::prompt(MessageKey::AskFirstName, lang).to_string(),
        ]
    }

    /// Shared handler for every Ask* phase: fast local validation first,
    /// delegated extraction as fallback, re-validation of extracted values
    /// before acceptance.
    async fn handle_slot(
        &self,
        session: &mut DialogueSession,
        field: ProfileField,
        text: &str,
    ) -> Vec<String> {
        let input = text.trim();

        if field.validate(input) {
            return self.accept_value(session, field, input.to_string());
        }

        if !field.has_extraction_fallback() {
            return vec![format!("Please enter a valid {}.", field.label())];
        }

        match self.extractor.extract(field, input).await {
            Ok(Extraction::Accepted(value)) if field.validate(&value) => {
                self.accept_value(session, field, value.trim().to_string())
            }
            Ok(Extraction::Accepted(value)) => {
                // The collaborator offered a value that fails the field's own
                // format rule; treat it exactly like a rejection.
                warn!(
                    "Extracted {} value failed re-validation: {value}",
                    field.key()
                );
                vec![invalid_field_message(field)]
            }
            Ok(Extraction::Rejected) => vec![invalid_field_message(field)],
            Err(e) => {
                warn!("Extraction collaborator failed for {}: {e}", field.key());
                vec![format!(
                    "Sorry, the validation service is currently unavailable. Please try again. ({e})"
                )]
            }
        }
    }

    /// Store an accepted value and advance to the next phase's prompt
    fn accept_value(
        &self,
        session: &mut DialogueSession,
        field: ProfileField,
        value: String,
    ) -> Vec<String> {
        let lang = session.profile.language;
        let mut replies = Vec::new();

        // Format fields echo the accepted value so the user sees what was
        // actually stored, whichever path validated it.
        if field.has_extraction_fallback() {
            replies.push(format!("Extracted valid {}: {}", field.label(), value));
        }

        session.profile.set(field, value);
        session.phase = session.phase.next();

        if session.phase == DialoguePhase::Confirm {
            replies.push(messages::prompt(MessageKey::Confirm, lang).to_string());
            replies.push(format!("Your details: {}", session.profile.summary()));
            replies.push(messages::prompt(MessageKey::ConfirmInput, lang).to_string());
        } else {
            replies.push(
                messages::prompt(MessageKey::for_phase(session.phase), lang).to_string(),
            );
        }

        replies
    }

    /// Confirmation phase: a literal confirm enters question answering; a
    /// structured edit overwrites one field in place; anything unclear
    /// re-prompts without mutating the session.
    async fn handle_confirm(&self, session: &mut DialogueSession, text: &str) -> Vec<String> {
        let lang = session.profile.language;
        let confirm_input = messages::prompt(MessageKey::ConfirmInput, lang);

        match self.extractor.classify_confirmation(text).await {
            Ok(ConfirmIntent::Confirm) => {
                // The intake transcript is not carried into question
                // answering.
                session.history.clear();
                session.phase = DialoguePhase::QuestionAnswering;
                info!("Session {} confirmed profile, entering Q&A", session.id);
                vec![messages::prompt(MessageKey::QaPhase, lang).to_string()]
            }
            Ok(ConfirmIntent::Edit { field, new_value }) => {
                let Some(profile_field) = ProfileField::from_key(&field) else {
                    return vec![format!("Could not parse the edit details. {confirm_input}")];
                };

                let value = new_value.trim();
                if !profile_field.validate(value) {
                    return vec![
                        format!("'{value}' is not a valid {}.", profile_field.label()),
                        confirm_input.to_string(),
                    ];
                }

                session.profile.set(profile_field, value.to_string());
                vec![
                    format!("Updated {field} to {value}."),
                    format!("Your updated details: {}", session.profile.summary()),
                    confirm_input.to_string(),
                ]
            }
            Ok(ConfirmIntent::Unclear) => {
                vec![format!("Your response was unclear. {confirm_input}")]
            }
            Err(e) => {
                warn!("Confirmation collaborator failed: {e}");
                vec![format!(
                    "Sorry, I couldn't process your response right now. Please try again. ({e})"
                )]
            }
        }
    }

    /// Absorbing Q&A phase: forward every message to the retrieval answerer
    async fn handle_question(&self, session: &mut DialogueSession, text: &str) -> Vec<String> {
        let question = text.trim();
        if question.is_empty() {
            return vec!["Please enter a valid question.".to_string()];
        }

        match self.answerer.answer(question, &session.profile).await {
            Ok(answer) => vec![answer],
            Err(e) => {
                warn!("Answer synthesis failed: {e}");
                vec![format!(
                    "Sorry, I couldn't generate an answer right now. Please try again. ({e})"
                )]
            }
        }
    }
}

fn invalid_field_message(field: ProfileField) -> String {
    format!(
        "{} is invalid and could not be extracted. Please try again.",
        capitalize(field.label())
    )
}

fn capitalize(text: &str) -> String {
    let mut chars = text.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().collect::<String>() + chars.as_str(),
        None => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::AtomicUsize;
    use std::sync::atomic::Ordering;
    use std::sync::Arc;

    use async_trait::async_trait;

    use super::*;
    use crate::errors::CarelineError;
    use crate::errors::Result;
    use crate::kb::KnowledgeIndex;
    use crate::llm::ChatClient;
    use crate::llm::CompletionRequest;
    use crate::llm::EmbeddingClient;

    /// Chat double returning a fixed reply and counting calls
    struct ScriptedChat {
        reply: String,
        calls: AtomicUsize,
    }

    impl ScriptedChat {
        fn new(reply: &str) -> Arc<Self> {
            Arc::new(Self {
                reply: reply.to_string(),
                calls: AtomicUsize::new(0),
            })
        }

        fn call_count(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl ChatClient for ScriptedChat {
        async fn complete(&self, _request: CompletionRequest) -> Result<String> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(self.reply.clone())
        }
    }

    struct StubEmbedder;

    #[async_trait]
    impl EmbeddingClient for StubEmbedder {
        async fn embed(&self, _text: &str) -> Result<Vec<f32>> {
            Err(CarelineError::Embedding("no embeddings in tests".to_string()))
        }
    }

    async fn engine_with_chat(chat: Arc<ScriptedChat>) -> DialogueEngine {
        let index = KnowledgeIndex::build(Vec::new(), Arc::new(StubEmbedder), 5000).await;
        DialogueEngine::new(
            FieldExtractor::new(chat.clone()),
            RetrievalAugmentedAnswerer::new(Arc::new(index), chat, 4),
        )
    }

    fn session_in_phase(phase: DialoguePhase) -> DialogueSession {
        let mut session = DialogueSession::new();
        session.phase = phase;
        session
    }

    #[tokio::test]
    async fn test_greeting_detects_language_and_advances() {
        let chat = ScriptedChat::new("unused");
        let engine = engine_with_chat(chat.clone()).await;

        let (mut session, greeting) = engine.start();
        assert_eq!(session.phase, DialoguePhase::Greeting);
        assert_eq!(greeting.len(), 1);

        let replies = engine.submit(&mut session, "שלום, מה שלומך?").await;
        assert_eq!(session.phase, DialoguePhase::AskFirstName);
        assert_eq!(session.profile.language, crate::models::Language::He);
        assert!(replies[0].contains("he"));
        assert_eq!(chat.call_count(), 0);
    }

    #[tokio::test]
    async fn test_valid_id_number_takes_fast_path() {
        let chat = ScriptedChat::new("should never be called");
        let engine = engine_with_chat(chat.clone()).await;

        let mut session = session_in_phase(DialoguePhase::AskIdNumber);
        engine.submit(&mut session, "123456789").await;

        assert_eq!(session.phase, DialoguePhase::AskGender);
        assert_eq!(session.profile.id_number.as_deref(), Some("123456789"));
        // Fast-path validation never invokes the extraction collaborator
        assert_eq!(chat.call_count(), 0);
    }

    #[tokio::test]
    async fn test_rejected_extraction_keeps_state() {
        let chat = ScriptedChat::new("Invalid");
        let engine = engine_with_chat(chat.clone()).await;

        let mut session = session_in_phase(DialoguePhase::AskIdNumber);
        let replies = engine.submit(&mut session, "1234567").await;

        assert_eq!(session.phase, DialoguePhase::AskIdNumber);
        assert_eq!(session.profile.id_number, None);
        assert_eq!(chat.call_count(), 1);
        assert!(replies[0].contains("invalid"));
    }

    #[tokio::test]
    async fn test_extracted_value_is_revalidated() {
        // The collaborator claims success but the value breaks the format
        // rule; the engine must not store it.
        let chat = ScriptedChat::new("12345");
        let engine = engine_with_chat(chat.clone()).await;

        let mut session = session_in_phase(DialoguePhase::AskIdNumber);
        engine.submit(&mut session, "my id is 12345").await;

        assert_eq!(session.phase, DialoguePhase::AskIdNumber);
        assert_eq!(session.profile.id_number, None);
    }

    #[tokio::test]
    async fn test_extraction_fallback_accepts_embedded_value() {
        let chat = ScriptedChat::new("987654321");
        let engine = engine_with_chat(chat.clone()).await;

        let mut session = session_in_phase(DialoguePhase::AskIdNumber);
        engine.submit(&mut session, "sure, it's 987654321 thanks").await;

        assert_eq!(session.phase, DialoguePhase::AskGender);
        assert_eq!(session.profile.id_number.as_deref(), Some("987654321"));
    }

    #[tokio::test]
    async fn test_empty_free_text_field_reprompts() {
        let chat = ScriptedChat::new("unused");
        let engine = engine_with_chat(chat.clone()).await;

        let mut session = session_in_phase(DialoguePhase::AskFirstName);
        let replies = engine.submit(&mut session, "   ").await;

        assert_eq!(session.phase, DialoguePhase::AskFirstName);
        assert!(replies[0].contains("first name"));
        assert_eq!(chat.call_count(), 0);
    }

    #[tokio::test]
    async fn test_last_slot_advances_to_confirm_with_summary() {
        let chat = ScriptedChat::new("unused");
        let engine = engine_with_chat(chat.clone()).await;

        let mut session = session_in_phase(DialoguePhase::AskInsuranceTier);
        let replies = engine.submit(&mut session, "זהב").await;

        assert_eq!(session.phase, DialoguePhase::Confirm);
        assert!(replies.iter().any(|r| r.contains("Your details:")));
    }

    #[tokio::test]
    async fn test_confirm_edit_updates_field_in_place() {
        let chat = ScriptedChat::new(r#"{"action": "edit", "field": "age", "new_value": "42"}"#);
        let engine = engine_with_chat(chat.clone()).await;

        let mut session = session_in_phase(DialoguePhase::Confirm);
        session.profile.age = Some("30".to_string());

        let replies = engine.submit(&mut session, "actually I'm 42").await;

        assert_eq!(session.phase, DialoguePhase::Confirm);
        assert_eq!(session.profile.age.as_deref(), Some("42"));
        assert!(replies[0].contains("Updated age to 42"));
    }

    #[tokio::test]
    async fn test_confirm_edit_with_invalid_value_is_rejected() {
        let chat =
            ScriptedChat::new(r#"{"action": "edit", "field": "age", "new_value": "very old"}"#);
        let engine = engine_with_chat(chat.clone()).await;

        let mut session = session_in_phase(DialoguePhase::Confirm);
        session.profile.age = Some("30".to_string());

        engine.submit(&mut session, "change my age").await;

        // The previously accepted value survives an invalid edit
        assert_eq!(session.profile.age.as_deref(), Some("30"));
        assert_eq!(session.phase, DialoguePhase::Confirm);
    }

    #[tokio::test]
    async fn test_confirm_clears_history_and_enters_qa() {
        let chat = ScriptedChat::new("confirm");
        let engine = engine_with_chat(chat.clone()).await;

        let mut session = session_in_phase(DialoguePhase::Confirm);
        session
            .history
            .push(ConversationTurn::assistant("earlier prompt"));

        let replies = engine.submit(&mut session, "confirm").await;

        assert_eq!(session.phase, DialoguePhase::QuestionAnswering);
        // Only the Q&A prompt survives the history reset
        assert_eq!(session.history.len(), replies.len());

        // Question answering is absorbing: later input never re-enters any
        // Ask* phase. The index is empty so the answerer replies with the
        // fixed no-information response without calling the chat
        // collaborator.
        let calls_before = chat.call_count();
        engine.submit(&mut session, "what about dental care?").await;
        assert_eq!(session.phase, DialoguePhase::QuestionAnswering);
        assert_eq!(chat.call_count(), calls_before);
    }

    #[tokio::test]
    async fn test_unclear_confirmation_reprompts_without_mutation() {
        let chat = ScriptedChat::new("hmm not sure what you mean");
        let engine = engine_with_chat(chat.clone()).await;

        let mut session = session_in_phase(DialoguePhase::Confirm);
        session.profile.age = Some("30".to_string());

        let replies = engine.submit(&mut session, "ehh").await;

        assert_eq!(session.phase, DialoguePhase::Confirm);
        assert_eq!(session.profile.age.as_deref(), Some("30"));
        assert!(replies[0].contains("unclear"));
    }
}
