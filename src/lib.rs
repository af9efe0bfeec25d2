// PokeInfo - Desktop viewer for PokeAPI creature records
//
// This is the library crate containing the lookup logic, view state, and UI wiring.
// The binary crate (main.rs) provides the GUI entry point.

pub mod config;
pub mod logging;
pub mod metrics;
pub mod models;
pub mod services;
pub mod state;
pub mod ui;

// Re-export commonly used types for convenience
pub use config::ConfigManager;
pub use metrics::Metrics;
pub use models::{Pokemon, Query, UserConfig, ViewState};
pub use services::{FetchOutcome, LookupController, PokeApiClient};
pub use state::{Resolution, StateChange, StateManager};

/// Application version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Application name
pub const APP_NAME: &str = env!("CARGO_PKG_NAME");
