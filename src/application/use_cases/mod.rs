mod ask_question;
mod chat_session;

pub use ask_question::*;
pub use chat_session::*;
