pub mod application;
pub mod cli;
pub mod connector;
pub mod domain;

pub use application::{AskQuestionUseCase, ChatSession, CompletionService};

pub use connector::{ApiCredential, MockCompletion, OpenAiClient, API_KEY_NAME, MISSING_KEY_MESSAGE};

pub use domain::{
    extract_reply, AssistantMessage, Candidate, CandidateMessage, CompletionRequest,
    CompletionResponse, Conversation, DomainError, ExtractedReply, ReplySource, Role, Turn,
    FALLBACK_REPLY, MAX_TOKENS, MODEL, SYSTEM_PROMPT,
};
