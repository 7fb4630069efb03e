//! Heuristic tension analyzer.
//!
//! One scan over the rule tables per concern (tension, needs, ego), then a
//! priority list builds the fixed-size takeaways and options.

use crate::domain::entities::{AnalysisResult, EgoFocus, NeedCategory, ResponseOption, TensionBand};
use crate::domain::errors::DomainError;
use crate::domain::rules::{
    self, CARDINALITY, EGO_RULES, FILLER_OPTIONS, FILLER_TAKEAWAYS, NEED_RULES, TENSION_MARKERS,
};
use std::collections::HashSet;

/// Band boundaries. A score equal to a boundary stays in the lower band.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TensionThresholds {
    moderate_above: f32,
    high_above: f32,
}

impl TensionThresholds {
    pub const DEFAULT_MODERATE_ABOVE: f32 = 1.0;
    pub const DEFAULT_HIGH_ABOVE: f32 = 4.0;

    pub fn new(moderate_above: f32, high_above: f32) -> Result<Self, DomainError> {
        if !moderate_above.is_finite() || !high_above.is_finite() {
            return Err(DomainError::Config(
                "tension thresholds must be finite numbers".to_string(),
            ));
        }
        if moderate_above > high_above {
            return Err(DomainError::Config(format!(
                "moderate threshold ({moderate_above}) is above high threshold ({high_above})"
            )));
        }
        Ok(Self {
            moderate_above,
            high_above,
        })
    }

    pub fn band_for(&self, score: f32) -> TensionBand {
        if score > self.high_above {
            TensionBand::High
        } else if score > self.moderate_above {
            TensionBand::Moderate
        } else {
            TensionBand::Low
        }
    }
}

impl Default for TensionThresholds {
    fn default() -> Self {
        Self {
            moderate_above: Self::DEFAULT_MODERATE_ABOVE,
            high_above: Self::DEFAULT_HIGH_ABOVE,
        }
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct TensionAnalyzer {
    thresholds: TensionThresholds,
}

impl TensionAnalyzer {
    pub fn new(thresholds: TensionThresholds) -> Self {
        Self { thresholds }
    }

    /// Classify `text`. Never fails; blank text yields the low band and the
    /// generic takeaways and options.
    pub fn analyze(&self, text: &str) -> AnalysisResult {
        let normalized = normalize(text);
        let score = tension_score(&normalized);
        let band = self.thresholds.band_for(score);
        let needs = detect_needs(&normalized);
        let likely_ego = detect_ego(&normalized);

        AnalysisResult {
            meta: band.meta().to_string(),
            band,
            score,
            takeaways: build_takeaways(&needs, band),
            options: build_options(&needs, band),
            needs,
            likely_ego,
        }
    }
}

/// Analyze with the default thresholds.
pub fn analyze(text: &str) -> AnalysisResult {
    TensionAnalyzer::default().analyze(text)
}

fn normalize(text: &str) -> String {
    text.replace(['\u{2019}', '\u{2018}'], "'")
        .to_lowercase()
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}

fn tension_score(text: &str) -> f32 {
    let mut score = 0.0_f32;
    let mut escalating_kinds = HashSet::new();
    for marker in TENSION_MARKERS.iter() {
        let contribution = marker.contribution(text);
        if contribution == 0.0 {
            continue;
        }
        if marker.kind.escalates() {
            escalating_kinds.insert(marker.kind);
        }
        score += contribution;
    }
    // Each extra kind of escalation on top of the first adds a point.
    score += escalating_kinds.len().saturating_sub(1) as f32;
    score.max(0.0)
}

fn detect_needs(text: &str) -> Vec<NeedCategory> {
    NEED_RULES
        .iter()
        .filter(|rule| rule.trigger.is_match(text))
        .map(|rule| rule.category)
        .collect()
}

fn detect_ego(text: &str) -> Option<EgoFocus> {
    let mut best: Option<(EgoFocus, usize)> = None;
    for rule in EGO_RULES.iter() {
        let hits = rule.trigger.find_iter(text).count();
        if hits > 0 && best.is_none_or(|(_, top)| hits > top) {
            best = Some((rule.ego, hits));
        }
    }
    best.map(|(ego, _)| ego)
}

fn build_takeaways(needs: &[NeedCategory], band: TensionBand) -> Vec<String> {
    let detected = NEED_RULES
        .iter()
        .filter(|rule| needs.contains(&rule.category))
        .map(|rule| rule.takeaway);
    let candidates = detected
        .chain(std::iter::once(rules::band_takeaway(band)))
        .chain(FILLER_TAKEAWAYS);
    first_distinct(candidates, |t| *t)
        .into_iter()
        .map(str::to_string)
        .collect()
}

fn build_options(needs: &[NeedCategory], band: TensionBand) -> Vec<ResponseOption> {
    let detected = NEED_RULES
        .iter()
        .filter(|rule| needs.contains(&rule.category))
        .map(|rule| rule.option);
    let candidates = detected
        .chain(rules::band_option(band))
        .chain(FILLER_OPTIONS);
    first_distinct(candidates, |o| o.objective)
        .into_iter()
        .map(|template| template.to_option())
        .collect()
}

/// First `CARDINALITY` candidates with distinct keys, in priority order.
fn first_distinct<T, K, F>(candidates: impl IntoIterator<Item = T>, key: F) -> Vec<T>
where
    K: Eq + std::hash::Hash,
    F: Fn(&T) -> K,
{
    let mut seen = HashSet::new();
    candidates
        .into_iter()
        .filter(|c| seen.insert(key(c)))
        .take(CARDINALITY)
        .collect()
}
