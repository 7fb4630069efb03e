//! Analysis service. Runs the tension analyzer and records the result.
//!
//! Coordinates between the pure analyzer, the clock, and the journal.

use crate::domain::{AnalysisResult, DomainError, JournalEntry, TensionAnalyzer};
use crate::ports::{ClockPort, JournalPort};
use std::sync::Arc;
use tracing::info;
use uuid::Uuid;

/// Characters of the analysed text kept as the entry context.
const CONTEXT_CHARS: usize = 100;

const SOURCE_HEURISTIC: &str = "heuristic";

/// An analysis together with the journal entry it was saved as.
#[derive(Debug, Clone)]
pub struct RecordedAnalysis {
    pub result: AnalysisResult,
    pub entry: JournalEntry,
}

pub struct AnalysisService {
    analyzer: TensionAnalyzer,
    journal: Arc<dyn JournalPort>,
    clock: Arc<dyn ClockPort>,
}

impl AnalysisService {
    pub fn new(
        analyzer: TensionAnalyzer,
        journal: Arc<dyn JournalPort>,
        clock: Arc<dyn ClockPort>,
    ) -> Self {
        Self {
            analyzer,
            journal,
            clock,
        }
    }

    /// Analyze `text` and append it to the journal.
    ///
    /// Blank text is refused here, unlike the pure analyzer: there is nothing
    /// worth recording.
    pub async fn analyze_and_record(&self, text: &str) -> Result<RecordedAnalysis, DomainError> {
        let text = text.trim();
        if text.is_empty() {
            return Err(DomainError::EmptyInput);
        }

        let result = self.analyzer.analyze(text);
        info!(
            chars = text.chars().count(),
            band = %result.band,
            score = result.score,
            needs = result.needs.len(),
            "text analyzed"
        );

        let created_at = self.clock.now();
        let entry = JournalEntry {
            id: format!("analysis-{}", Uuid::new_v4()),
            created_at,
            ego_focus: result.likely_ego.map(|ego| ego.label().to_string()),
            context: text.chars().take(CONTEXT_CHARS).collect(),
            summary: result.meta.clone(),
            insights: result.takeaways.clone(),
            source: SOURCE_HEURISTIC.to_string(),
        };
        self.journal.save_entry(&entry).await?;
        info!(id = %entry.id, "analysis saved to journal");

        Ok(RecordedAnalysis { result, entry })
    }
}
