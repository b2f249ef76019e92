use crate::domain::{DomainError, Turn};

/// Fixed instruction that always occupies the first slot of a conversation.
pub const SYSTEM_PROMPT: &str = "\
You are a friendly, patient assistant that answers science questions for children in a simple, \
age-appropriate way. Use clear, short sentences and everyday analogies so kids (roughly ages 5-12) \
can understand. Ask one brief follow-up question when the user's question is unclear or could use a \
preference (for example, age or whether they want a short or detailed explanation). \
When explaining, include: a simple definition, a one-sentence example or analogy, and a short fun \
fact or related idea to spark curiosity. \
Do NOT provide step-by-step instructions for dangerous, illegal, or potentially harmful activities \
(e.g., how to make explosives, ingest chemicals, bypass safety). If the user asks for an experiment \
that could be risky, refuse politely and offer a safe, supervised alternative or a demonstration \
that uses household-safe materials under adult supervision. \
Avoid giving medical, legal, or professional diagnostic advice; instead, recommend asking a trusted \
adult or professional. Be encouraging, correct common misconceptions gently, and say when you're \
unsure and suggest checking a trusted source. Keep answers concise but friendly, and continue the \
conversation naturally if the user asks follow-ups.";

/// Ordered chat history for one session.
///
/// Index 0 is always the system turn carrying [`SYSTEM_PROMPT`]. The store
/// only grows by appending; the sole way to shrink it is [`Conversation::reset`],
/// which returns it to the seeded state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Conversation {
    turns: Vec<Turn>,
}

impl Conversation {
    /// Creates a conversation holding only the system turn.
    pub fn new() -> Self {
        Self {
            turns: vec![Turn::system(SYSTEM_PROMPT)],
        }
    }

    /// Appends a user turn. Empty or whitespace-only text is rejected.
    pub fn append_user(&mut self, text: impl Into<String>) -> Result<&Turn, DomainError> {
        let text = text.into();
        if text.trim().is_empty() {
            return Err(DomainError::invalid_input("question must not be empty"));
        }
        Ok(self.push(Turn::user(text)))
    }

    pub fn append_assistant(&mut self, text: impl Into<String>) -> &Turn {
        self.push(Turn::assistant(text))
    }

    /// Every turn except the system one, in insertion order.
    pub fn visible_turns(&self) -> impl Iterator<Item = &Turn> + '_ {
        self.turns.iter().filter(|turn| !turn.is_system())
    }

    /// Drops all user and assistant turns unconditionally.
    pub fn reset(&mut self) {
        self.turns.truncate(1);
    }

    /// All turns including the system turn, in the order sent upstream.
    pub fn turns(&self) -> &[Turn] {
        &self.turns
    }

    pub fn last(&self) -> Option<&Turn> {
        self.turns.last()
    }

    pub fn len(&self) -> usize {
        self.turns.len()
    }

    /// True when nothing beyond the system turn has been recorded.
    pub fn is_empty(&self) -> bool {
        self.turns.len() <= 1
    }

    fn push(&mut self, turn: Turn) -> &Turn {
        self.turns.push(turn);
        &self.turns[self.turns.len() - 1]
    }
}

impl Default for Conversation {
    fn default() -> Self {
        Self::new()
    }
}
