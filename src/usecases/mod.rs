//! Application use cases. Orchestrate domain logic via ports.

pub mod analysis_service;
pub mod journal_service;

pub use analysis_service::{AnalysisService, RecordedAnalysis};
pub use journal_service::{JournalExport, JournalOverview, JournalService};
