//! Domain errors. Used by ports and use cases.
//!
//! Adapters map infrastructure errors into these. The pure analysis core never
//! returns one.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum DomainError {
    #[error("Journal storage error: {0}")]
    Journal(String),

    /// Input had the wrong shape (e.g. a journal file that is not a list of entries).
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Journal entry not found: {0}")]
    EntryNotFound(String),

    #[error("Nothing to analyze: describe a situation first")]
    EmptyInput,

    #[error("UI error: {0}")]
    Ui(String),

    #[error("Configuration error: {0}")]
    Config(String),
}
