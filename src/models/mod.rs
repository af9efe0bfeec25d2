//! Data models for the PokeInfo application.
//!
//! - [`Pokemon`]: One creature record as displayed in the window
//! - [`Query`]: Lookup key (free-text name or numeric identifier)
//! - [`ViewState`]: Everything the window renders, replaced as one value
//! - [`UserConfig`]: User preferences loaded from `PokeInfo Config.yaml`

pub mod config;
pub mod pokemon;
pub mod query;
pub mod view_state;

pub use config::{DEFAULT_API_BASE_URL, DEFAULT_INITIAL_QUERY, LookupSettings, UserConfig};
pub use pokemon::Pokemon;
pub use query::Query;
pub use view_state::{Display, LookupPhase, PendingLookup, ViewState};
