//! Inbound port. UI (adapter) calls into the application.

use crate::domain::DomainError;

/// Input port: terminal UI drives the application use cases.
#[async_trait::async_trait]
pub trait InputPort: Send + Sync {
    /// Run the interactive menu until the user quits.
    async fn run(&self) -> Result<(), DomainError>;
}
