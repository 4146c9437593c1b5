//! Errors that can occur while installing a subscriber.
use std::error::Error as StdError;
use thiserror::Error;

/// Error returned when a devslog subscriber can't be installed.
#[derive(Debug, Error)]
pub enum Error {
    /// A global default subscriber was already set, possibly by another crate.
    #[error("failed to set the global default subscriber")]
    SetGlobalDefault(#[from] tracing::subscriber::SetGlobalDefaultError),

    /// The filter directives in the environment couldn't be parsed.
    #[error("invalid filter directives")]
    InvalidFilter(#[source] Box<dyn StdError + Send + Sync>),
}
