use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};

use crate::domain::{Conversation, Role, Turn};

/// Model every request is sent to. Not user-configurable.
pub const MODEL: &str = "gpt-4o-mini";
/// Upper bound on generated tokens per reply.
pub const MAX_TOKENS: u32 = 800;
/// Shown as the assistant's reply when a response carries no usable text.
pub const FALLBACK_REPLY: &str = "죄송합니다. 응답을 가져오지 못했습니다. 다시 시도해주세요.";

/// Body of one chat-completion request.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CompletionRequest {
    model: String,
    messages: Vec<Turn>,
    max_tokens: u32,
}

impl CompletionRequest {
    /// Snapshot of the whole conversation, system turn included, with the
    /// fixed model and token bound.
    pub fn for_conversation(conversation: &Conversation) -> Self {
        Self {
            model: MODEL.to_string(),
            messages: conversation.turns().to_vec(),
            max_tokens: MAX_TOKENS,
        }
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    pub fn messages(&self) -> &[Turn] {
        &self.messages
    }

    pub fn max_tokens(&self) -> u32 {
        self.max_tokens
    }
}

/// Decoded response from the completion service. Only `choices` matters;
/// everything else the server sends is ignored.
///
/// Decoding never fails on the shape of `choices`: a null or non-array
/// value reads as no candidates, and a non-object entry reads as an empty
/// candidate. Extraction then falls back to [`FALLBACK_REPLY`].
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct CompletionResponse {
    #[serde(default, deserialize_with = "lenient_choices")]
    pub choices: Vec<Candidate>,
}

impl CompletionResponse {
    pub fn with_choices(choices: Vec<Candidate>) -> Self {
        Self { choices }
    }
}

/// One candidate reply. Modern servers fill `message`; legacy completion
/// endpoints put plain text in `text`.
///
/// Both fields are read loosely so that a mistyped field never hides a
/// usable one.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct Candidate {
    #[serde(default, deserialize_with = "lenient_message")]
    pub message: Option<CandidateMessage>,
    #[serde(default)]
    pub text: Option<Value>,
}

impl Candidate {
    pub fn from_message(message: CandidateMessage) -> Self {
        Self {
            message: Some(message),
            text: None,
        }
    }

    pub fn from_text(text: impl Into<String>) -> Self {
        Self {
            message: None,
            text: Some(Value::String(text.into())),
        }
    }

    /// The legacy `text` field, when it holds a string.
    pub fn legacy_text(&self) -> Option<&str> {
        self.text.as_ref().and_then(Value::as_str)
    }

    fn from_value(value: Value) -> Self {
        serde_json::from_value(value).unwrap_or_default()
    }
}

fn lenient_choices<'de, D>(deserializer: D) -> Result<Vec<Candidate>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Value::deserialize(deserializer)? {
        Value::Array(items) => items.into_iter().map(Candidate::from_value).collect(),
        _ => Vec::new(),
    })
}

fn lenient_message<'de, D>(deserializer: D) -> Result<Option<CandidateMessage>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Value::deserialize(deserializer)? {
        value @ Value::Object(_) => serde_json::from_value(value).ok(),
        _ => None,
    })
}

/// The two representations a candidate's `message` can take.
///
/// `Object` is a well-formed assistant message with a known role. Anything
/// else that is still a JSON object lands in `KeyValue` and is probed by key.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum CandidateMessage {
    Object(AssistantMessage),
    KeyValue(Map<String, Value>),
}

impl CandidateMessage {
    pub fn content(&self) -> Option<&str> {
        match self {
            CandidateMessage::KeyValue(fields) => fields.get("content").and_then(Value::as_str),
            CandidateMessage::Object(message) => message.content.as_deref(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct AssistantMessage {
    pub role: Role,
    #[serde(default)]
    pub content: Option<String>,
}

impl AssistantMessage {
    pub fn new(content: impl Into<String>) -> Self {
        Self {
            role: Role::Assistant,
            content: Some(content.into()),
        }
    }
}

/// Where the extracted reply text came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReplySource {
    Message,
    LegacyText,
    Fallback,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtractedReply {
    pub text: String,
    pub source: ReplySource,
}

/// Pulls the reply text out of a response.
///
/// Order: first candidate's `message.content`, then its legacy `text`, then
/// [`FALLBACK_REPLY`]. Empty strings count as missing.
pub fn extract_reply(response: &CompletionResponse) -> ExtractedReply {
    let first = response.choices.first();

    let from_message = first
        .and_then(|candidate| candidate.message.as_ref())
        .and_then(CandidateMessage::content)
        .filter(|text| !text.is_empty());
    if let Some(text) = from_message {
        return ExtractedReply {
            text: text.to_string(),
            source: ReplySource::Message,
        };
    }

    let from_legacy = first
        .and_then(Candidate::legacy_text)
        .filter(|text| !text.is_empty());
    if let Some(text) = from_legacy {
        return ExtractedReply {
            text: text.to_string(),
            source: ReplySource::LegacyText,
        };
    }

    ExtractedReply {
        text: FALLBACK_REPLY.to_string(),
        source: ReplySource::Fallback,
    }
}
