mod completion;
mod conversation;
mod turn;

pub use completion::*;
pub use conversation::*;
pub use turn::*;
