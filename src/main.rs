//! Wiring & DI. Entry point: bootstrap adapters, inject into services, run UI.
//! No business logic here.

use dotenv::dotenv;
use ego_coach::adapters::clock::SystemClock;
use ego_coach::adapters::persistence::JournalJson;
use ego_coach::adapters::ui::tui::TuiInputPort;
use ego_coach::domain::TensionAnalyzer;
use ego_coach::ports::{ClockPort, InputPort, JournalPort};
use ego_coach::shared::config::AppConfig;
use ego_coach::usecases::{AnalysisService, JournalService};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::info;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cwd = std::env::current_dir().unwrap_or_else(|_| PathBuf::from("."));
    let env_loaded = dotenv();
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .with(tracing_subscriber::fmt::layer())
        .init();

    match &env_loaded {
        Ok(path) => info!(path = %path.display(), "loaded .env"),
        Err(_) => info!(cwd = %cwd.display(), "no .env found (check CWD)"),
    }

    ego_coach::adapters::ui::init_ui();

    let cfg = AppConfig::load().map_err(|e| anyhow::anyhow!("invalid configuration: {}", e))?;
    let thresholds = cfg.thresholds().map_err(|e| anyhow::anyhow!("{}", e))?;
    info!(?thresholds, "tension thresholds");

    // --- Journal: namespaced JSON file per user ---
    let data_dir = PathBuf::from(cfg.data_dir_or_default());
    let user_id = cfg.user_id_or_default();
    let journal_impl =
        JournalJson::for_user(&data_dir, &user_id).map_err(|e| anyhow::anyhow!("{}", e))?;
    journal_impl
        .load()
        .await
        .map_err(|e| anyhow::anyhow!("{}", e))?;
    info!(
        user_id = %user_id,
        path = %journal_impl.path().display(),
        "journal ready"
    );
    let journal: Arc<dyn JournalPort> = Arc::new(journal_impl);
    let clock: Arc<dyn ClockPort> = Arc::new(SystemClock);

    // --- Services ---
    let analysis_service = Arc::new(AnalysisService::new(
        TensionAnalyzer::new(thresholds),
        Arc::clone(&journal),
        Arc::clone(&clock),
    ));
    let journal_service = Arc::new(JournalService::new(
        Arc::clone(&journal),
        Arc::clone(&clock),
    ));

    let input_port: Arc<dyn InputPort> =
        Arc::new(TuiInputPort::new(analysis_service, journal_service));

    // --- Run (main menu loop) ---
    input_port
        .run()
        .await
        .map_err(|e| anyhow::anyhow!("{}", e))?;

    Ok(())
}
