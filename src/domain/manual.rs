//! Guided journal entries, written by hand step by step.
//!
//! Four steps: what happened, which ego took over, the response to try next
//! time, and the follow-up.

use super::entities::{EgoFocus, JournalEntry};
use super::errors::DomainError;
use chrono::{DateTime, Utc};

pub const SOURCE_MANUAL: &str = "manual";

/// Answers collected by the guided flow. Every field but `insight` is required.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ManualEntry {
    pub context: String,
    pub partner_signal: String,
    pub ego_focus: EgoFocus,
    pub trigger_need: String,
    pub alternative_response: String,
    pub validation: String,
    pub action_plan: String,
    pub insight: Option<String>,
}

impl ManualEntry {
    /// Refuses the entry when a required answer is blank, naming the first one.
    pub fn validate(&self) -> Result<(), DomainError> {
        let required = [
            ("contexte", &self.context),
            ("signal perçu", &self.partner_signal),
            ("besoin associé", &self.trigger_need),
            ("réponse MVP", &self.alternative_response),
            ("validation", &self.validation),
            ("plan d'action", &self.action_plan),
        ];
        match required.iter().find(|(_, value)| value.trim().is_empty()) {
            Some((field, _)) => Err(DomainError::InvalidInput(format!(
                "champ requis manquant : {}",
                field
            ))),
            None => Ok(()),
        }
    }

    /// The readable summary stored on the journal entry, one block per answer.
    pub fn summary(&self) -> String {
        let mut lines = vec![
            format!("Contexte : {}", self.context.trim()),
            format!("Signal perçu : {}", self.partner_signal.trim()),
            format!("Ego activé : {}", self.ego_focus),
            format!("Besoin associé : {}", self.trigger_need.trim()),
            format!("Réponse MVP : {}", self.alternative_response.trim()),
            format!("Validation : {}", self.validation.trim()),
            format!("Plan d'action : {}", self.action_plan.trim()),
        ];
        if let Some(insight) = self.insight() {
            lines.push(format!("Insight : {}", insight));
        }
        lines.join("\n\n")
    }

    fn insight(&self) -> Option<&str> {
        self.insight
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
    }

    pub fn into_journal_entry(self, id: impl Into<String>, created_at: DateTime<Utc>) -> JournalEntry {
        let summary = self.summary();
        let insights = self.insight().map(str::to_string).into_iter().collect();
        JournalEntry {
            id: id.into(),
            created_at,
            ego_focus: Some(self.ego_focus.label().to_string()),
            context: self.context.trim().to_string(),
            summary,
            insights,
            source: SOURCE_MANUAL.to_string(),
        }
    }
}
