use anyhow::Result;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::interval;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod maintenance;
mod settings;

use maintenance::Maintenance;
use settings::Settings;
use strategos_core::{PlaybookRunner, Storage};
use strategos_db::Database;
use strategos_dispatch::{CommandRunner, JobExecutor, LocalDispatcher};
use strategos_repo::BackendRegistry;

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "strategos_worker=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Load environment variables
    dotenv::dotenv().ok();

    tracing::info!("Starting Strategos worker");

    let settings = Settings::load()?;

    tokio::fs::create_dir_all(&settings.projects_dir).await?;

    // Initialize components
    let database = Database::new(&settings.database_url).await?;
    database.init_schema().await?;
    let storage: Arc<dyn Storage> = Arc::new(database);

    let registry = Arc::new(BackendRegistry::builtin());
    let runner: Arc<dyn PlaybookRunner> = Arc::new(CommandRunner::new());

    let executor = Arc::new(JobExecutor::new(
        storage.clone(),
        registry,
        runner,
        settings.projects_dir.clone(),
    ));
    let dispatcher = Arc::new(LocalDispatcher::new(executor));

    let maintenance = Maintenance::new(
        storage.clone(),
        dispatcher,
        chrono::Duration::seconds(settings.requeue_after_secs),
        chrono::Duration::seconds(settings.stall_timeout_secs),
    );

    // Start worker loop
    let mut ticker = interval(Duration::from_secs(settings.poll_interval_secs));

    loop {
        ticker.tick().await;

        match maintenance.requeue_stranded().await {
            Ok(0) => {}
            Ok(count) => tracing::info!("Requeued {} stranded runs", count),
            Err(e) => tracing::error!("Requeue sweep failed: {}", e),
        }

        match maintenance.fail_stalled().await {
            Ok(0) => {}
            Ok(count) => tracing::info!("Failed {} stalled runs", count),
            Err(e) => tracing::error!("Stall sweep failed: {}", e),
        }
    }
}
