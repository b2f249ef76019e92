mod repl;

pub use repl::*;

use clap::Subcommand;

#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Commands {
    /// Interactive chat (default). `/clear` resets, `/quit` exits.
    Chat,

    /// Ask a single question and print the answer
    Ask {
        question: String,
    },
}
