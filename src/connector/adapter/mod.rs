mod mock_completion;
mod openai_client;
mod secrets;

pub use mock_completion::*;
pub use openai_client::*;
pub use secrets::*;
