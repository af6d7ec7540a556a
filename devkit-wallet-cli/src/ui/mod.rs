//! Terminal interaction for the wallet CLI.

pub mod prompt;

pub use prompt::{ConsolePrompt, Prompt, PromptError};
