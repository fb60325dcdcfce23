use std::io::ErrorKind;

use chatrepl_core::TemplateError;
use thiserror::Error;

/// Failure of a single exchange.
///
/// Most failures are reported and the session keeps going. Broken console
/// streams end it, see [`ExchangeError::is_fatal`].
#[derive(Debug, Error)]
pub enum ExchangeError {
    #[error("Failed to read input: {0}")]
    Input(#[source] std::io::Error),

    #[error("Failed to write output: {0}")]
    Output(#[source] std::io::Error),

    #[error("{0:#}")]
    Provider(#[from] anyhow::Error),

    #[error("Prompt template error: {0}")]
    Template(#[from] TemplateError),
}

impl ExchangeError {
    /// Whether the console itself is unusable.
    ///
    /// Any write failure qualifies. A line that is not valid UTF-8 is
    /// consumed by the read, so only that input error is recoverable.
    #[must_use]
    pub fn is_fatal(&self) -> bool {
        match self {
            Self::Output(_) => true,
            Self::Input(e) => e.kind() != ErrorKind::InvalidData,
            Self::Provider(_) | Self::Template(_) => false,
        }
    }
}
