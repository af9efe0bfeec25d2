//! PokeInfo - Desktop viewer for PokeAPI creature records
//!
//! Main entry point for the GUI application.
//!
//! # Overview
//!
//! This binary crate provides the Slint GUI frontend. It initializes:
//! - Configuration ([`ConfigManager`], optional `PokeInfo Data/PokeInfo Config.yaml`)
//! - Logging infrastructure (file rotation + console output)
//! - Tokio async runtime (2 worker threads for HTTP lookups)
//! - View state ([`StateManager`]) and the [`LookupController`]
//! - GUI controller ([`GuiController`] - bridges Slint UI with the lookup cycle)
//!
//! The application uses a hybrid threading model:
//! - **Main thread**: Runs the Slint event loop (blocking, synchronous)
//! - **Tokio workers**: Run API lookups and sprite downloads
//! - **State listener**: Background std::thread for reactive UI updates
//!
//! # Execution Flow
//!
//! 1. Load settings (defaults when the file is absent)
//! 2. Initialize logging → <log dir>/pokeinfo.<date>
//! 3. Create tokio runtime with 2 worker threads
//! 4. Build the HTTP client, sprite loader, and lookup controller
//! 5. Create GuiController and run the Slint event loop (initial lookup for "ditto")
//! 6. Shutdown tokio runtime with 5s timeout and log session metrics

use anyhow::Result;
use camino::Utf8PathBuf;
use pokeinfo::services::SpriteLoader;
use pokeinfo::ui::GuiController;
use pokeinfo::{
    APP_NAME, ConfigManager, LookupController, Metrics, PokeApiClient, StateManager, VERSION,
};
use std::sync::Arc;
use std::time::Duration;

fn main() -> Result<()> {
    // Settings come first so they can shape logging
    let config_manager = ConfigManager::new("PokeInfo Data")?;
    let user_config = config_manager.load_user_config()?;
    let settings = user_config.settings;

    let log_dir = Utf8PathBuf::from(&settings.log_directory);
    let _log_guard = pokeinfo::logging::setup_logging(
        &log_dir,
        APP_NAME,
        settings.debug_mode,
        settings.console_logging,
    )?;

    tracing::info!("Starting {} v{}", APP_NAME, VERSION);
    tracing::info!(
        "Settings - api: {}, initial query: {}, timeout: {:?}",
        settings.api_base_url,
        settings.initial_query,
        settings.request_timeout()
    );

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .worker_threads(2)
        .thread_name("pokeinfo-worker")
        .build()?;

    tracing::info!("Tokio runtime initialized with {} worker threads", 2);

    let metrics = Arc::new(Metrics::new());
    let state_manager = Arc::new(StateManager::new());

    let client = PokeApiClient::new(&settings.api_base_url, settings.request_timeout())?;
    let sprites = Arc::new(SpriteLoader::new(client.http_client().clone()));

    let lookup = Arc::new(
        LookupController::new(Arc::new(client), state_manager, Arc::clone(&metrics))
            .with_initial_query(settings.initial_query.clone()),
    );

    let gui_controller =
        GuiController::new(lookup, sprites, Arc::clone(&metrics), runtime.handle().clone())?;

    tracing::info!("GUI controller initialized, launching window");

    // Blocks until the window is closed
    let result = gui_controller.run();

    tracing::info!("GUI closed, shutting down");

    // Outstanding lookups are simply abandoned
    runtime.shutdown_timeout(Duration::from_secs(5));

    metrics.log_summary();
    tracing::info!("Application shutdown complete");

    result.map_err(|e| {
        tracing::error!("GUI error: {}", e);
        anyhow::anyhow!("GUI error: {}", e)
    })
}
