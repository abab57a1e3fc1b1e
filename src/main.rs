//! Wiring & DI. Entry point: bootstrap the store, inject into services, run UI.
//! No business logic here.

use class_registry::adapters::persistence::{MemoryRepo, SqliteRepo};
use class_registry::adapters::ui::tui::TuiInputPort;
use class_registry::ports::{InputPort, RegistrationRepoPort, SettingsPort, SlotRepoPort};
use class_registry::shared::config::{AppConfig, StorageKind};
use class_registry::usecases::{ClassService, RegistrationService, SettingsService};
use dotenv::dotenv;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{info, warn};
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

/// The three storage ports, all backed by one store.
struct Stores {
    slots: Arc<dyn SlotRepoPort>,
    registrations: Arc<dyn RegistrationRepoPort>,
    settings: Arc<dyn SettingsPort>,
}

impl Stores {
    fn from_repo<R>(repo: Arc<R>) -> Self
    where
        R: SlotRepoPort + RegistrationRepoPort + SettingsPort + 'static,
    {
        Self {
            slots: Arc::clone(&repo) as Arc<dyn SlotRepoPort>,
            registrations: Arc::clone(&repo) as Arc<dyn RegistrationRepoPort>,
            settings: repo as Arc<dyn SettingsPort>,
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cwd = std::env::current_dir().unwrap_or_else(|_| PathBuf::from("."));
    let env_loaded = dotenv();
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    match &env_loaded {
        Ok(path) => info!(path = %path.display(), "loaded .env"),
        Err(_) => info!(cwd = %cwd.display(), "no .env found (check CWD)"),
    }

    class_registry::adapters::ui::init_ui();

    let cfg = AppConfig::load().unwrap_or_else(|e| {
        warn!(error = %e, "config load failed, using defaults");
        AppConfig::default()
    });
    let baseline = cfg.baseline_settings();
    info!(
        year = baseline.year,
        fee_per_session = %baseline.fee_per_session,
        "baseline fee settings"
    );

    let stores = match cfg.storage_kind() {
        StorageKind::Sqlite => {
            let data_path = PathBuf::from(cfg.data_dir_or_default());
            let repo = SqliteRepo::connect(&data_path, baseline)
                .await
                .map_err(|e| anyhow::anyhow!("SQLite connect failed: {}", e))?;
            info!(path = %repo.db_path().display(), "using SQLite store");
            Stores::from_repo(Arc::new(repo))
        }
        StorageKind::Memory => {
            warn!("using in-memory store; nothing is saved on exit");
            Stores::from_repo(Arc::new(MemoryRepo::new(baseline)))
        }
    };

    // --- Services ---
    let class_service = Arc::new(ClassService::new(Arc::clone(&stores.slots)));
    let registration_service = Arc::new(RegistrationService::new(
        Arc::clone(&stores.slots),
        Arc::clone(&stores.registrations),
        Arc::clone(&stores.settings),
    ));
    let settings_service = Arc::new(SettingsService::new(Arc::clone(&stores.settings)));

    let input_port: Arc<dyn InputPort> = Arc::new(TuiInputPort::new(
        class_service,
        registration_service,
        settings_service,
    ));

    input_port
        .run()
        .await
        .map_err(|e| anyhow::anyhow!("{}", e))?;

    info!("bye");
    Ok(())
}
