use std::collections::VecDeque;
use std::sync::{Mutex, PoisonError};

use async_trait::async_trait;
use tracing::debug;

use crate::application::CompletionService;
use crate::domain::{
    AssistantMessage, Candidate, CandidateMessage, CompletionRequest, CompletionResponse,
    DomainError,
};

/// Offline [`CompletionService`] that plays back queued outcomes in order.
///
/// Every request is recorded. Once the queue runs dry it answers with a
/// canned reply echoing the last question, which keeps `--mock` sessions
/// usable without network access.
pub struct MockCompletion {
    outcomes: Mutex<VecDeque<Result<CompletionResponse, DomainError>>>,
    requests: Mutex<Vec<CompletionRequest>>,
}

impl MockCompletion {
    pub fn new() -> Self {
        Self {
            outcomes: Mutex::new(VecDeque::new()),
            requests: Mutex::new(Vec::new()),
        }
    }

    /// A mock that answers with each of `replies` in turn.
    pub fn replying<I, S>(replies: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mock = Self::new();
        for reply in replies {
            mock.push_response(Self::message_response(reply));
        }
        mock
    }

    pub fn push_response(&self, response: CompletionResponse) {
        self.outcomes
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push_back(Ok(response));
    }

    pub fn push_error(&self, error: DomainError) {
        self.outcomes
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push_back(Err(error));
    }

    /// Requests received so far, oldest first.
    pub fn requests(&self) -> Vec<CompletionRequest> {
        self.requests
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    fn message_response(text: impl Into<String>) -> CompletionResponse {
        CompletionResponse::with_choices(vec![Candidate::from_message(
            CandidateMessage::Object(AssistantMessage::new(text)),
        )])
    }

    fn canned_reply(request: &CompletionRequest) -> CompletionResponse {
        let question = request
            .messages()
            .last()
            .map(|turn| turn.content())
            .unwrap_or_default();
        Self::message_response(format!(
            "(mock) 좋은 질문이에요! \"{question}\"에 대해 함께 알아봐요."
        ))
    }
}

impl Default for MockCompletion {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl CompletionService for MockCompletion {
    async fn complete(&self, request: &CompletionRequest) -> Result<CompletionResponse, DomainError> {
        self.requests
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(request.clone());

        let next = self
            .outcomes
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .pop_front();

        match next {
            Some(outcome) => outcome,
            None => {
                debug!("MockCompletion: queue empty, using canned reply");
                Ok(Self::canned_reply(request))
            }
        }
    }

    fn backend_name(&self) -> &str {
        "mock-completion"
    }
}
