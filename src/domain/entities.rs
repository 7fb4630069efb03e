//! Domain entities. Pure data structures for the core business.
//!
//! No storage/UI types here. Serialized field names follow the journal file
//! format (camelCase), which is shared with older exports.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Ordered tension scale. `Low < Moderate < High`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TensionBand {
    Low,
    Moderate,
    High,
}

impl TensionBand {
    /// Short label shown as the first words of `AnalysisResult::meta`.
    pub fn label(self) -> &'static str {
        match self {
            TensionBand::Low => "Tension faible",
            TensionBand::Moderate => "Tension modérée",
            TensionBand::High => "Chaleur élevée",
        }
    }

    /// Full meta sentence: label plus the recommended posture.
    pub fn meta(self) -> &'static str {
        match self {
            TensionBand::Low => "Tension faible : opportunité de co-construction.",
            TensionBand::Moderate => {
                "Tension modérée : une validation claire + proposition de plan peut suffire."
            }
            TensionBand::High => {
                "Chaleur élevée : privilégie une réponse courte, validante, avec option pause."
            }
        }
    }
}

impl fmt::Display for TensionBand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Psychological need detected in a message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NeedCategory {
    /// Cessation or imperative language aimed at the other party.
    Boundary,
    /// First-person needs, politeness, requests to be heard.
    Validation,
    /// Unfair share of the load ("c'est toujours moi").
    Recognition,
}

/// Recurring self-protective pattern logged per journal entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EgoFocus {
    Defensive,
    Saviour,
    Martyr,
    LastWord,
    InfluenceRefusal,
}

impl EgoFocus {
    pub const ALL: [EgoFocus; 5] = [
        EgoFocus::Defensive,
        EgoFocus::Saviour,
        EgoFocus::Martyr,
        EgoFocus::LastWord,
        EgoFocus::InfluenceRefusal,
    ];

    pub fn label(self) -> &'static str {
        match self {
            EgoFocus::Defensive => "La Défensive",
            EgoFocus::Saviour => "Le Sauveur",
            EgoFocus::Martyr => "Le Martyr",
            EgoFocus::LastWord => "Le Dernier Mot",
            EgoFocus::InfluenceRefusal => "Le Refus d'influence",
        }
    }

    /// Exact label match. Unknown labels are kept as plain strings by callers.
    pub fn from_label(label: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|ego| ego.label() == label)
    }
}

impl fmt::Display for EgoFocus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

// Stored by label so journal files stay readable and accept app-defined values.
impl Serialize for EgoFocus {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.label())
    }
}

impl<'de> Deserialize<'de> for EgoFocus {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let label = String::deserialize(deserializer)?;
        EgoFocus::from_label(&label)
            .ok_or_else(|| serde::de::Error::custom(format!("unknown ego focus: {label}")))
    }
}

/// Suggested response strategy.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResponseOption {
    /// Strategic goal, e.g. "Poser une limite".
    pub objective: String,
    /// Suggested wording.
    pub script: String,
}

/// Output of the tension analyzer. Always carries exactly three takeaways and
/// three options.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisResult {
    pub meta: String,
    pub band: TensionBand,
    pub score: f32,
    pub needs: Vec<NeedCategory>,
    pub likely_ego: Option<EgoFocus>,
    pub takeaways: Vec<String>,
    pub options: Vec<ResponseOption>,
}

/// A saved analysis. Owned by the surrounding application; the aggregator only
/// reads `ego_focus` and `created_at`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JournalEntry {
    pub id: String,
    pub created_at: DateTime<Utc>,
    #[serde(default)]
    pub ego_focus: Option<String>,
    #[serde(default)]
    pub context: String,
    #[serde(default)]
    pub summary: String,
    #[serde(default)]
    pub insights: Vec<String>,
    #[serde(default)]
    pub source: String,
}

impl JournalEntry {
    /// Minimal entry carrying only what the aggregator reads.
    pub fn new(id: impl Into<String>, ego_focus: Option<&str>, created_at: DateTime<Utc>) -> Self {
        Self {
            id: id.into(),
            created_at,
            ego_focus: ego_focus.map(str::to_string),
            context: String::new(),
            summary: String::new(),
            insights: Vec::new(),
            source: String::new(),
        }
    }
}

/// Summary counters over a journal.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct JournalStats {
    pub total_entries: usize,
    pub top_ego: Option<String>,
    pub top_ego_percentage: u32,
    /// `None` when the journal holds no "La Défensive" entry.
    pub days_since_defensive: Option<i64>,
    /// Up to three entries, newest first.
    pub latest_entries: Vec<JournalEntry>,
}

impl JournalStats {
    pub fn last_entry(&self) -> Option<&JournalEntry> {
        self.latest_entries.first()
    }
}
