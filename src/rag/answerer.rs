//! Retrieve -> assemble context -> synthesize answer

use std::sync::Arc;

use tracing::debug;
use tracing::info;

use crate::dialogue::messages;
use crate::dialogue::MessageKey;
use crate::errors::Result;
use crate::kb;
use crate::kb::KnowledgeIndex;
use crate::llm::prompts;
use crate::llm::ChatClient;
use crate::llm::ChatMessage;
use crate::llm::CompletionRequest;
use crate::models::UserProfile;

/// Answers questions from the knowledge base, scoped to the user's health
/// fund and insurance tier.
///
/// Each answer is a pure function of (question, retrieved context, profile):
/// prior conversation turns are deliberately excluded from the synthesis
/// prompt to avoid drift and context-window growth.
pub struct RetrievalAugmentedAnswerer {
    index: Arc<KnowledgeIndex>,
    chat: Arc<dyn ChatClient>,
    top_k: usize,
}

impl RetrievalAugmentedAnswerer {
    pub fn new(index: Arc<KnowledgeIndex>, chat: Arc<dyn ChatClient>, top_k: usize) -> Self {
        Self { index, chat, top_k }
    }

    /// Answer one question.
    ///
    /// An empty retrieval yields the fixed no-information response without
    /// contacting the chat collaborator; a collaborator failure propagates as
    /// an explicit error, never an empty string.
    pub async fn answer(&self, question: &str, profile: &UserProfile) -> Result<String> {
        info!("Answering question: {question}");

        let results = self.index.search(question, self.top_k).await;
        if results.is_empty() {
            debug!("No passages matched; returning fixed no-information response");
            return Ok(
                messages::prompt(MessageKey::NoInformationFound, profile.language).to_string(),
            );
        }

        let context = kb::assemble_context(&results);
        let request = CompletionRequest::new(prompts::answer_system_prompt(profile))
            .with_message(ChatMessage::user(prompts::answer_user_message(
                profile, &context, question,
            )))
            .with_temperature(0.3)
            .with_max_tokens(800);

        self.chat.complete(request).await
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::AtomicUsize;
    use std::sync::atomic::Ordering;

    use async_trait::async_trait;

    use super::*;
    use crate::errors::CarelineError;
    use crate::llm::EmbeddingClient;
    use crate::models::Language;
    use crate::models::Passage;

    struct CountingChat {
        calls: AtomicUsize,
    }

    #[async_trait]
    impl ChatClient for CountingChat {
        async fn complete(&self, request: CompletionRequest) -> Result<String> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            // Echo enough of the request to assert prompt scoping
            Ok(format!("answered with system: {}", request.system_prompt))
        }
    }

    struct UnitEmbedder;

    #[async_trait]
    impl EmbeddingClient for UnitEmbedder {
        async fn embed(&self, _text: &str) -> Result<Vec<f32>> {
            Ok(vec![1.0, 0.0])
        }
    }

    struct FailingEmbedder;

    #[async_trait]
    impl EmbeddingClient for FailingEmbedder {
        async fn embed(&self, _text: &str) -> Result<Vec<f32>> {
            Err(CarelineError::Embedding("down".to_string()))
        }
    }

    #[tokio::test]
    async fn test_empty_index_short_circuits_without_chat_call() {
        let chat = Arc::new(CountingChat {
            calls: AtomicUsize::new(0),
        });
        let index =
            Arc::new(KnowledgeIndex::build(Vec::new(), Arc::new(UnitEmbedder), 5000).await);
        let answerer = RetrievalAugmentedAnswerer::new(index, chat.clone(), 4);

        let answer = answerer
            .answer("anything", &UserProfile::default())
            .await
            .unwrap();

        assert_eq!(
            answer,
            messages::prompt(MessageKey::NoInformationFound, Language::En)
        );
        assert_eq!(chat.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_query_embedding_failure_yields_no_information() {
        let chat = Arc::new(CountingChat {
            calls: AtomicUsize::new(0),
        });
        // Index built with a working embedder, searched with a failing one is
        // not possible (same client), so simulate total embedding outage.
        let index =
            Arc::new(KnowledgeIndex::build(
                vec![Passage::new("kb.html", 0, "dental".to_string())],
                Arc::new(FailingEmbedder),
                5000,
            )
            .await);
        let answerer = RetrievalAugmentedAnswerer::new(index, chat.clone(), 4);

        let answer = answerer
            .answer("dental?", &UserProfile::default())
            .await
            .unwrap();

        assert!(answer.contains("couldn't find relevant information"));
        assert_eq!(chat.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_answer_scopes_prompt_to_profile() {
        let chat = Arc::new(CountingChat {
            calls: AtomicUsize::new(0),
        });
        let index = Arc::new(
            KnowledgeIndex::build(
                vec![Passage::new("kb.html", 0, "dental coverage info".to_string())],
                Arc::new(UnitEmbedder),
                5000,
            )
            .await,
        );
        let answerer = RetrievalAugmentedAnswerer::new(index, chat.clone(), 4);

        let profile = UserProfile {
            hmo_name: Some("כללית".to_string()),
            insurance_tier: Some("כסף".to_string()),
            ..UserProfile::default()
        };

        let answer = answerer.answer("dental?", &profile).await.unwrap();

        assert_eq!(chat.calls.load(Ordering::SeqCst), 1);
        assert!(answer.contains("כללית"));
        assert!(answer.contains("כסף"));
    }
}
