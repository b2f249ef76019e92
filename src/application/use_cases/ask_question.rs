use std::sync::Arc;
use std::time::Instant;

use tracing::{debug, info, warn};

use crate::application::CompletionService;
use crate::domain::{
    extract_reply, CompletionRequest, Conversation, DomainError, ExtractedReply, ReplySource,
};

/// Runs one interaction cycle against an explicitly passed conversation.
///
/// The user turn is recorded before the remote call and is never rolled
/// back. An assistant turn is appended only when the call succeeds; a
/// response without usable text still succeeds, with the fallback reply.
pub struct AskQuestionUseCase {
    completion_service: Arc<dyn CompletionService>,
}

impl AskQuestionUseCase {
    pub fn new(completion_service: Arc<dyn CompletionService>) -> Self {
        Self { completion_service }
    }

    pub async fn execute(
        &self,
        conversation: &mut Conversation,
        question: &str,
    ) -> Result<ExtractedReply, DomainError> {
        conversation.append_user(question)?;

        let request = CompletionRequest::for_conversation(conversation);
        debug!(
            "Sending {} turns to {} (model={}, max_tokens={})",
            request.messages().len(),
            self.completion_service.backend_name(),
            request.model(),
            request.max_tokens()
        );

        let start_time = Instant::now();
        let response = match self.completion_service.complete(&request).await {
            Ok(response) => response,
            Err(e) => {
                warn!("Completion request failed: {}", e);
                return Err(e);
            }
        };

        let reply = extract_reply(&response);
        if reply.source == ReplySource::Fallback {
            warn!(
                "Response had no usable text ({} choices); using fallback reply",
                response.choices.len()
            );
        }

        conversation.append_assistant(reply.text.clone());
        info!(
            "Answered in {:?} ({} visible turns)",
            start_time.elapsed(),
            conversation.visible_turns().count()
        );

        Ok(reply)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::connector::MockCompletion;
    use crate::domain::{Role, FALLBACK_REPLY, MAX_TOKENS, MODEL};

    #[tokio::test]
    async fn test_success_appends_user_then_assistant() {
        let mock = Arc::new(MockCompletion::replying(["하늘이 파란 이유는..."]));
        let use_case = AskQuestionUseCase::new(mock.clone());
        let mut conversation = Conversation::new();

        let reply = use_case
            .execute(&mut conversation, "왜 하늘은 파래요?")
            .await
            .unwrap();

        assert_eq!(reply.text, "하늘이 파란 이유는...");
        let visible: Vec<_> = conversation
            .visible_turns()
            .map(|t| (t.role(), t.content().to_string()))
            .collect();
        assert_eq!(
            visible,
            vec![
                (Role::User, "왜 하늘은 파래요?".to_string()),
                (Role::Assistant, "하늘이 파란 이유는...".to_string()),
            ]
        );

        let requests = mock.requests();
        assert_eq!(requests.len(), 1);
        assert_eq!(requests[0].model(), MODEL);
        assert_eq!(requests[0].max_tokens(), MAX_TOKENS);
        assert_eq!(requests[0].messages().len(), 2);
        assert_eq!(requests[0].messages()[0].role(), Role::System);
    }

    #[tokio::test]
    async fn test_failure_keeps_user_turn_and_skips_assistant() {
        let mock = Arc::new(MockCompletion::new());
        mock.push_error(DomainError::network("connection refused"));
        let use_case = AskQuestionUseCase::new(mock);
        let mut conversation = Conversation::new();

        let err = use_case
            .execute(&mut conversation, "전기는 어떻게 만들어져요?")
            .await
            .unwrap_err();

        assert!(err.is_request_failure());
        assert_eq!(conversation.len(), 2);
        assert_eq!(conversation.last().unwrap().role(), Role::User);
    }

    #[tokio::test]
    async fn test_blank_question_never_reaches_the_service() {
        let mock = Arc::new(MockCompletion::new());
        let use_case = AskQuestionUseCase::new(mock.clone());
        let mut conversation = Conversation::new();

        let err = use_case.execute(&mut conversation, "  ").await.unwrap_err();

        assert!(err.is_invalid_input());
        assert!(mock.requests().is_empty());
        assert!(conversation.is_empty());
    }

    #[tokio::test]
    async fn test_empty_response_appends_fallback_reply() {
        let mock = Arc::new(MockCompletion::new());
        mock.push_response(Default::default());
        let use_case = AskQuestionUseCase::new(mock);
        let mut conversation = Conversation::new();

        let reply = use_case.execute(&mut conversation, "왜?").await.unwrap();

        assert_eq!(reply.source, ReplySource::Fallback);
        assert_eq!(conversation.last().unwrap().content(), FALLBACK_REPLY);
    }

    #[tokio::test]
    async fn test_history_is_resent_on_each_turn() {
        let mock = Arc::new(MockCompletion::replying(["one", "two"]));
        let use_case = AskQuestionUseCase::new(mock.clone());
        let mut conversation = Conversation::new();

        use_case.execute(&mut conversation, "first").await.unwrap();
        use_case.execute(&mut conversation, "second").await.unwrap();

        let requests = mock.requests();
        assert_eq!(requests[0].messages().len(), 2);
        assert_eq!(requests[1].messages().len(), 4);
        assert_eq!(requests[1].messages()[2].content(), "one");
    }
}
