#![warn(
    clippy::all,
    clippy::nursery,
    clippy::pedantic,
    clippy::style,
    clippy::complexity,
    clippy::perf,
    clippy::correctness,
    clippy::suspicious,
    clippy::unwrap_used,
    clippy::expect_used
)]
#![allow(
    clippy::similar_names,
    clippy::missing_safety_doc,
    clippy::missing_panics_doc,
    clippy::missing_errors_doc
)]

//! Interactive chat sessions on top of a bounded conversation history.
//!
//! # Key Features
//! - Exit-word detection and empty-input skipping
//! - Whole or streamed replies, chosen when the loop is built
//! - Per-exchange failures reported without ending the session
//! - Prompt-template translation session

mod console;
mod error;
mod interaction;
mod response;
mod translate;

pub use console::Console;
pub use error::ExchangeError;
pub use interaction::{EXIT_COMMANDS, InteractionLoop, LoopState, is_exit_command};
pub use response::{ResponseStrategy, StreamedResponse, WholeResponse};
pub use translate::{TranslationSession, translation_template};
