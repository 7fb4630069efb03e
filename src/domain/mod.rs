//! Core domain layer. No I/O, no clock, no storage.
//!
//! The analyzer, the journal aggregator and the relative-time formatter are
//! pure functions; "now" is always passed in by the caller.

pub mod analyzer;
pub mod entities;
pub mod errors;
pub mod manual;
pub mod relative_time;
pub mod rules;
pub mod stats;

pub use analyzer::{TensionAnalyzer, TensionThresholds, analyze};
pub use entities::{
    AnalysisResult, EgoFocus, JournalEntry, JournalStats, NeedCategory, ResponseOption,
    TensionBand,
};
pub use errors::DomainError;
pub use manual::{ManualEntry, SOURCE_MANUAL};
pub use relative_time::{format_relative, whole_days_between};
pub use stats::{compute_stats, entries_with_ego};
