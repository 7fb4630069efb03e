//! Implements InputPort. Inquire-based interactive menu.
//!
//! Rendering is split into pure `render_*` functions; printing adds colors.

use crate::adapters::persistence::{read_export, write_export};
use crate::domain::{AnalysisResult, DomainError, EgoFocus, JournalEntry, ManualEntry, TensionBand};
use crate::ports::InputPort;
use crate::usecases::{AnalysisService, JournalOverview, JournalService};
use async_trait::async_trait;
use crossterm::ExecutableCommand;
use crossterm::style::{Color, Print, ResetColor, SetForegroundColor};
use inquire::error::InquireError;
use inquire::ui::{Color as PromptColor, RenderConfig, Styled};
use inquire::{Confirm, Select, Text};
use std::fmt;
use std::io::{Write, stdout};
use std::path::Path;
use std::sync::Arc;
use tracing::warn;

/// Applies the prompt theme for every later inquire prompt.
pub fn apply_theme() {
    let config = RenderConfig::default()
        .with_prompt_prefix(Styled::new("›").with_fg(PromptColor::LightMagenta))
        .with_highlighted_option_prefix(Styled::new("➤").with_fg(PromptColor::LightCyan));
    inquire::set_global_render_config(config);
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum MenuChoice {
    Analyze,
    Guided,
    Journal,
    FilterJournal,
    DeleteEntry,
    Export,
    Import,
    ClearJournal,
    Quit,
}

impl MenuChoice {
    const ALL: [MenuChoice; 9] = [
        MenuChoice::Analyze,
        MenuChoice::Guided,
        MenuChoice::Journal,
        MenuChoice::FilterJournal,
        MenuChoice::DeleteEntry,
        MenuChoice::Export,
        MenuChoice::Import,
        MenuChoice::ClearJournal,
        MenuChoice::Quit,
    ];
}

impl fmt::Display for MenuChoice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            MenuChoice::Analyze => "Analyse rapide",
            MenuChoice::Guided => "Entrée guidée",
            MenuChoice::Journal => "Journal",
            MenuChoice::FilterJournal => "Filtrer par ego",
            MenuChoice::DeleteEntry => "Supprimer une entrée",
            MenuChoice::Export => "Exporter le journal",
            MenuChoice::Import => "Importer un journal",
            MenuChoice::ClearJournal => "Effacer le journal",
            MenuChoice::Quit => "Quitter",
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum EgoFilter {
    All,
    Only(EgoFocus),
}

impl EgoFilter {
    fn choices() -> Vec<EgoFilter> {
        std::iter::once(EgoFilter::All)
            .chain(EgoFocus::ALL.iter().copied().map(EgoFilter::Only))
            .collect()
    }

    fn ego(self) -> Option<EgoFocus> {
        match self {
            EgoFilter::All => None,
            EgoFilter::Only(ego) => Some(ego),
        }
    }
}

impl fmt::Display for EgoFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EgoFilter::All => f.write_str("Tous"),
            EgoFilter::Only(ego) => write!(f, "{}", ego),
        }
    }
}

/// One selectable journal entry; shown as its journal line.
#[derive(Debug, Clone)]
struct EntryChoice {
    id: String,
    line: String,
}

impl fmt::Display for EntryChoice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.line)
    }
}

fn band_color(band: TensionBand) -> Color {
    match band {
        TensionBand::Low => Color::Green,
        TensionBand::Moderate => Color::Yellow,
        TensionBand::High => Color::Red,
    }
}

pub fn render_analysis(result: &AnalysisResult) -> String {
    let mut out = String::new();
    out.push_str("Insights clés :\n");
    for takeaway in &result.takeaways {
        out.push_str(&format!("  ✓ {}\n", takeaway));
    }
    out.push_str("\nRéponses suggérées :\n");
    for (idx, option) in result.options.iter().enumerate() {
        out.push_str(&format!("  {}. {}\n", idx + 1, option.objective));
        out.push_str(&format!("     « {} »\n", option.script));
    }
    if let Some(ego) = result.likely_ego {
        out.push_str(&format!("\nEgo probable : {}\n", ego));
    }
    out
}

pub fn render_overview(overview: &JournalOverview) -> String {
    let stats = &overview.stats;
    if stats.total_entries == 0 {
        return "Ton journal est vide. Lance une analyse rapide pour commencer.\n".to_string();
    }

    let mut out = String::new();
    out.push_str(&format!("Analyses enregistrées : {}\n", stats.total_entries));
    if let Some(top) = &stats.top_ego {
        out.push_str(&format!(
            "Ego dominant : {} ({} %)\n",
            top, stats.top_ego_percentage
        ));
    }
    match stats.days_since_defensive {
        Some(0) => out.push_str("La Défensive s'est manifestée aujourd'hui.\n"),
        Some(days) => out.push_str(&format!("Jours sans La Défensive : {}\n", days)),
        None => out.push_str("La Défensive n'apparaît pas encore dans ton journal.\n"),
    }

    out.push_str("\nDernières entrées :\n");
    for (entry, age) in &overview.latest {
        out.push_str(&format!("  • {}\n", entry_line(entry, age)));
    }
    out
}

/// `age · ego · first summary line`.
fn entry_line(entry: &JournalEntry, age: &str) -> String {
    let ego = entry.ego_focus.as_deref().unwrap_or("Inconnu");
    let summary = entry
        .summary
        .lines()
        .find(|l| !l.trim().is_empty())
        .unwrap_or("Analyse rapide");
    format!("{} · {} · {}", age, ego, summary)
}

fn render_entries(entries: &[(JournalEntry, String)], filter: EgoFilter) -> String {
    if entries.is_empty() {
        return format!(
            "Aucune entrée pour « {} ». Essaie un autre filtre ou « Tous ».\n",
            filter
        );
    }
    let mut out = format!("{} entrée(s) · {}\n", entries.len(), filter);
    for (entry, age) in entries {
        out.push_str(&format!("  • {}\n", entry_line(entry, age)));
    }
    out
}

fn entry_choices(entries: &[(JournalEntry, String)]) -> Vec<EntryChoice> {
    entries
        .iter()
        .map(|(entry, age)| EntryChoice {
            id: entry.id.clone(),
            line: entry_line(entry, age),
        })
        .collect()
}

fn print_colored(color: Color, text: &str) {
    let mut out = stdout();
    let _ = out.execute(SetForegroundColor(color));
    let _ = out.execute(Print(text.replace('\n', "\r\n")));
    let _ = out.execute(ResetColor);
    let _ = out.flush();
}

fn print_plain(text: &str) {
    let mut out = stdout();
    let _ = out.execute(Print(text.replace('\n', "\r\n")));
    let _ = out.flush();
}

/// `None` when the user cancelled the prompt (Esc / Ctrl-C).
fn cancelled_as_none<T>(res: Result<T, InquireError>) -> Result<Option<T>, DomainError> {
    match res {
        Ok(v) => Ok(Some(v)),
        Err(InquireError::OperationCanceled | InquireError::OperationInterrupted) => Ok(None),
        Err(e) => Err(DomainError::Ui(e.to_string())),
    }
}

/// Free-text answer; `None` when cancelled.
fn ask(question: &str, help: &str) -> Result<Option<String>, DomainError> {
    cancelled_as_none(Text::new(question).with_help_message(help).prompt())
}

/// TUI adapter. Inquire prompts.
pub struct TuiInputPort {
    analysis_service: Arc<AnalysisService>,
    journal_service: Arc<JournalService>,
}

impl TuiInputPort {
    pub fn new(analysis_service: Arc<AnalysisService>, journal_service: Arc<JournalService>) -> Self {
        Self {
            analysis_service,
            journal_service,
        }
    }

    async fn quick_analysis(&self) -> Result<(), DomainError> {
        let Some(text) = cancelled_as_none(
            Text::new("Décris rapidement la situation :")
                .with_help_message("ex : « Tu ne fais jamais rien ! Pourquoi c'est toujours moi ? »")
                .prompt(),
        )?
        else {
            return Ok(());
        };

        match self.analysis_service.analyze_and_record(&text).await {
            Ok(recorded) => {
                let result = &recorded.result;
                print_colored(band_color(result.band), &format!("\n{}\n\n", result.meta));
                print_plain(&render_analysis(result));
                print_colored(Color::DarkGrey, "\nAnalyse sauvegardée dans ton journal.\n\n");
                Ok(())
            }
            Err(DomainError::EmptyInput) => {
                print_colored(Color::Yellow, "Décris une situation avant de continuer.\n");
                Ok(())
            }
            Err(e) => Err(e),
        }
    }

    async fn guided_entry(&self) -> Result<(), DomainError> {
        print_colored(Color::Cyan, "\n1. Constat\n");
        let Some(context) = ask(
            "Qu'est-ce qui s'est passé ?",
            "Décris la scène, sans interprétation.",
        )?
        else {
            return Ok(());
        };
        let Some(partner_signal) = ask(
            "Quel a été le signal de ton partenaire ?",
            "Phrase, regard, ton de voix, silence...",
        )?
        else {
            return Ok(());
        };

        print_colored(Color::Cyan, "\n2. Ego Radar\n");
        let Some(ego_focus) = cancelled_as_none(
            Select::new("Quel type d'ego s'est activé ?", EgoFocus::ALL.to_vec()).prompt(),
        )?
        else {
            return Ok(());
        };
        let Some(trigger_need) = ask(
            "Quel besoin personnel n'a pas été nourri ?",
            "Reconnaissance, soutien, sécurité, clarté...",
        )?
        else {
            return Ok(());
        };

        print_colored(Color::Cyan, "\n3. MVP de réponse\n");
        let Some(alternative_response) = ask(
            "Quelle réponse MVP veux-tu tester ?",
            "La réponse idéale : ton, structure, validation, plan.",
        )?
        else {
            return Ok(());
        };
        let Some(validation) = ask(
            "Comment valider sa frustration en une phrase ?",
            "ex : « Je comprends que tu... et c'est logique que ça te... »",
        )?
        else {
            return Ok(());
        };

        print_colored(Color::Cyan, "\n4. Action & Insight\n");
        let Some(action_plan) = ask(
            "Quel est ton plan d'action concret ?",
            "Message à envoyer, rituel à planifier, limite à poser...",
        )?
        else {
            return Ok(());
        };
        let Some(insight) = ask("Insight clé à retenir (optionnel) :", "Entrée pour passer.")? else {
            return Ok(());
        };

        let manual = ManualEntry {
            context,
            partner_signal,
            ego_focus,
            trigger_need,
            alternative_response,
            validation,
            action_plan,
            insight: Some(insight),
        };
        match self.journal_service.record_manual(manual).await {
            Ok(entry) => {
                print_plain(&format!("\n{}\n", entry.summary));
                print_colored(Color::DarkGrey, "\nEntrée sauvegardée dans ton journal.\n\n");
                Ok(())
            }
            Err(DomainError::InvalidInput(msg)) => {
                print_colored(Color::Yellow, &format!("Entrée non sauvegardée : {}\n", msg));
                Ok(())
            }
            Err(e) => Err(e),
        }
    }

    async fn show_journal(&self) -> Result<(), DomainError> {
        let overview = self.journal_service.overview().await?;
        print_plain(&format!("\n{}\n", render_overview(&overview)));
        Ok(())
    }

    async fn filter_journal(&self) -> Result<(), DomainError> {
        let Some(filter) =
            cancelled_as_none(Select::new("Quel ego afficher ?", EgoFilter::choices()).prompt())?
        else {
            return Ok(());
        };
        let entries = self.journal_service.entries(filter.ego()).await?;
        print_plain(&format!("\n{}\n", render_entries(&entries, filter)));
        Ok(())
    }

    async fn delete_entry(&self) -> Result<(), DomainError> {
        let entries = self.journal_service.entries(None).await?;
        if entries.is_empty() {
            print_colored(Color::Yellow, "Ton journal est vide.\n");
            return Ok(());
        }
        let Some(choice) = cancelled_as_none(
            Select::new("Quelle entrée supprimer ?", entry_choices(&entries)).prompt(),
        )?
        else {
            return Ok(());
        };
        let confirmed = cancelled_as_none(
            Confirm::new("Supprimer cette entrée ?")
                .with_default(false)
                .prompt(),
        )?
        .unwrap_or(false);
        if confirmed {
            self.journal_service.delete(&choice.id).await?;
            print_colored(Color::DarkGrey, "Entrée supprimée.\n");
        }
        Ok(())
    }

    async fn export_journal(&self) -> Result<(), DomainError> {
        let export = self.journal_service.export().await?;
        if export.entries.is_empty() {
            print_colored(Color::Yellow, "Rien à exporter.\n");
            return Ok(());
        }
        let default_name = export.file_name();
        let Some(path) = cancelled_as_none(
            Text::new("Fichier d'export :")
                .with_default(&default_name)
                .prompt(),
        )?
        else {
            return Ok(());
        };
        write_export(Path::new(path.trim()), &export.entries).await?;
        print_colored(
            Color::DarkGrey,
            &format!("{} entrée(s) exportée(s) vers {}\n", export.entries.len(), path.trim()),
        );
        Ok(())
    }

    async fn import_journal(&self) -> Result<(), DomainError> {
        let Some(path) = cancelled_as_none(
            Text::new("Fichier à importer :")
                .with_help_message("un export JSON du journal")
                .prompt(),
        )?
        else {
            return Ok(());
        };
        let entries = read_export(Path::new(path.trim())).await?;
        let added = self.journal_service.import(entries).await?;
        print_colored(
            Color::DarkGrey,
            &format!("Import : {} entrée(s) ajoutée(s).\n", added),
        );
        Ok(())
    }

    async fn clear_journal(&self) -> Result<(), DomainError> {
        let confirmed = cancelled_as_none(
            Confirm::new("Effacer toutes les analyses du journal ?")
                .with_default(false)
                .prompt(),
        )?
        .unwrap_or(false);
        if confirmed {
            self.journal_service.clear().await?;
            print_colored(Color::DarkGrey, "Journal effacé.\n");
        }
        Ok(())
    }
}

#[async_trait]
impl InputPort for TuiInputPort {
    async fn run(&self) -> Result<(), DomainError> {
        loop {
            let choice = cancelled_as_none(
                Select::new("Que veux-tu faire ?", MenuChoice::ALL.to_vec()).prompt(),
            )?;
            let outcome = match choice {
                Some(MenuChoice::Analyze) => self.quick_analysis().await,
                Some(MenuChoice::Guided) => self.guided_entry().await,
                Some(MenuChoice::Journal) => self.show_journal().await,
                Some(MenuChoice::FilterJournal) => self.filter_journal().await,
                Some(MenuChoice::DeleteEntry) => self.delete_entry().await,
                Some(MenuChoice::Export) => self.export_journal().await,
                Some(MenuChoice::Import) => self.import_journal().await,
                Some(MenuChoice::ClearJournal) => self.clear_journal().await,
                Some(MenuChoice::Quit) | None => return Ok(()),
            };
            // Storage trouble should not end the session; the next action may succeed.
            if let Err(e) = outcome {
                warn!(error = %e, "menu action failed");
                print_colored(Color::Red, &format!("Erreur : {}\n", e));
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{JournalEntry, analyze, compute_stats, format_relative};
    use chrono::{Duration, TimeZone, Utc};

    #[test]
    fn test_render_analysis_lists_everything() {
        let result = analyze("Je veux que tu arrêtes de me parler comme ça. Stop.");
        let text = render_analysis(&result);
        assert!(text.contains("Poser une limite"));
        assert_eq!(text.matches("  ✓ ").count(), 3);
        assert!(text.contains("  3. "));
    }

    #[test]
    fn test_render_empty_overview() {
        let now = Utc.with_ymd_and_hms(2024, 1, 10, 8, 0, 0).unwrap();
        let overview = JournalOverview {
            stats: compute_stats(&[], now),
            latest: Vec::new(),
        };
        assert!(render_overview(&overview).contains("vide"));
    }

    #[test]
    fn test_render_overview_with_entries() {
        let now = Utc.with_ymd_and_hms(2024, 1, 10, 8, 0, 0).unwrap();
        let entries = vec![JournalEntry::new(
            "1",
            Some("La Défensive"),
            now - Duration::days(2),
        )];
        let stats = compute_stats(&entries, now);
        let latest = stats
            .latest_entries
            .iter()
            .map(|e| (e.clone(), format_relative(e.created_at, now)))
            .collect();
        let text = render_overview(&JournalOverview { stats, latest });
        assert!(text.contains("Ego dominant : La Défensive (100 %)"));
        assert!(text.contains("Jours sans La Défensive : 2"));
        assert!(text.contains("Il y a 2 jours · La Défensive · Analyse rapide"));
    }

    #[test]
    fn test_menu_labels() {
        let labels: Vec<_> = MenuChoice::ALL.iter().map(|c| c.to_string()).collect();
        assert_eq!(labels[0], "Analyse rapide");
        assert_eq!(labels[1], "Entrée guidée");
        assert_eq!(labels.last().map(String::as_str), Some("Quitter"));
    }

    #[test]
    fn test_ego_filter_choices() {
        let choices = EgoFilter::choices();
        assert_eq!(choices.len(), EgoFocus::ALL.len() + 1);
        assert_eq!(choices[0].to_string(), "Tous");
        assert_eq!(choices[0].ego(), None);
        assert_eq!(choices[1].to_string(), "La Défensive");
        assert_eq!(choices[1].ego(), Some(EgoFocus::Defensive));
    }

    #[test]
    fn test_render_filtered_entries() {
        let now = Utc.with_ymd_and_hms(2024, 1, 10, 8, 0, 0).unwrap();
        let mut manual = JournalEntry::new("m", Some("Le Sauveur"), now);
        manual.summary = "Contexte : Repas chez ses parents\n\nSignal perçu : silence".to_string();
        let entries = vec![(manual, "Aujourd'hui".to_string())];

        let filter = EgoFilter::Only(EgoFocus::Saviour);
        let text = render_entries(&entries, filter);
        assert!(text.starts_with("1 entrée(s) · Le Sauveur"));
        assert!(text.contains("Aujourd'hui · Le Sauveur · Contexte : Repas chez ses parents\n"));
        assert!(!text.contains("Signal perçu"));

        assert!(render_entries(&[], filter).contains("Essaie un autre filtre"));
    }

    #[test]
    fn test_entry_choices_keep_ids() {
        let now = Utc.with_ymd_and_hms(2024, 1, 10, 8, 0, 0).unwrap();
        let entries = vec![
            (JournalEntry::new("a", None, now), "Aujourd'hui".to_string()),
            (JournalEntry::new("b", Some("Le Martyr"), now), "Hier".to_string()),
        ];
        let choices = entry_choices(&entries);
        assert_eq!(choices[1].id, "b");
        assert_eq!(choices[1].to_string(), "Hier · Le Martyr · Analyse rapide");
        assert_eq!(choices[0].to_string(), "Aujourd'hui · Inconnu · Analyse rapide");
    }
}
