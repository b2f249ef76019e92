use std::sync::Arc;

use tracing::info;

use crate::application::{AskQuestionUseCase, CompletionService};
use crate::domain::{Conversation, DomainError, ExtractedReply, Turn};

/// Owns the conversation for one user session.
///
/// Created seeded, reset on demand, and dropped when the session ends.
/// `submit` takes `&mut self`, so a second submission cannot start while
/// one is awaiting its response.
pub struct ChatSession {
    conversation: Conversation,
    ask_question: AskQuestionUseCase,
}

impl ChatSession {
    pub fn new(completion_service: Arc<dyn CompletionService>) -> Self {
        info!(
            "Starting chat session (backend={})",
            completion_service.backend_name()
        );
        Self {
            conversation: Conversation::new(),
            ask_question: AskQuestionUseCase::new(completion_service),
        }
    }

    /// One interaction cycle. On failure the user turn stays recorded and
    /// the error is returned for display.
    pub async fn submit(&mut self, question: &str) -> Result<ExtractedReply, DomainError> {
        self.ask_question
            .execute(&mut self.conversation, question)
            .await
    }

    pub fn reset(&mut self) {
        let discarded = self.conversation.visible_turns().count();
        self.conversation.reset();
        info!("Conversation reset ({} turns discarded)", discarded);
    }

    pub fn visible_turns(&self) -> impl Iterator<Item = &Turn> + '_ {
        self.conversation.visible_turns()
    }

    pub fn conversation(&self) -> &Conversation {
        &self.conversation
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::connector::MockCompletion;
    use crate::domain::{Role, SYSTEM_PROMPT};

    #[tokio::test]
    async fn test_successful_cycles_grow_by_two() {
        let mock = Arc::new(MockCompletion::replying(["a1", "a2", "a3"]));
        let mut session = ChatSession::new(mock);

        for (n, question) in ["q1", "q2", "q3"].into_iter().enumerate() {
            session.submit(question).await.unwrap();
            assert_eq!(session.visible_turns().count(), 2 * (n + 1));
        }

        let first = session.visible_turns().next().unwrap();
        assert_eq!(first.role(), Role::User);
    }

    #[tokio::test]
    async fn test_reset_returns_to_seeded_state() {
        let mock = Arc::new(MockCompletion::replying(["a1", "a2"]));
        let mut session = ChatSession::new(mock);
        session.submit("q1").await.unwrap();
        session.submit("q2").await.unwrap();

        session.reset();

        assert_eq!(session.visible_turns().count(), 0);
        let turns = session.conversation().turns();
        assert_eq!(turns.len(), 1);
        assert_eq!(turns[0].content(), SYSTEM_PROMPT);
    }

    #[tokio::test]
    async fn test_retry_after_failure_keeps_both_user_turns() {
        let mock = Arc::new(MockCompletion::new());
        mock.push_error(DomainError::network("timed out"));
        mock.push_response(Default::default());
        let mut session = ChatSession::new(mock);

        assert!(session.submit("왜 하늘은 파래요?").await.is_err());
        session.submit("왜 하늘은 파래요?").await.unwrap();

        let roles: Vec<Role> = session.visible_turns().map(|t| t.role()).collect();
        assert_eq!(roles, vec![Role::User, Role::User, Role::Assistant]);
    }
}
