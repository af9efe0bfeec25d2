use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Default PokeAPI endpoint for creature records
pub const DEFAULT_API_BASE_URL: &str = "https://pokeapi.co/api/v2/pokemon/";

/// Record requested when the window first opens
pub const DEFAULT_INITIAL_QUERY: &str = "ditto";

/// User configuration from PokeInfo Config.yaml
///
/// Every field has a default, so an absent or partial file is valid.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UserConfig {
    #[serde(rename = "PokeInfo_Settings", default)]
    pub settings: LookupSettings,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LookupSettings {
    #[serde(rename = "API Base URL", default = "default_api_base_url")]
    pub api_base_url: String,

    #[serde(rename = "Initial Query", default = "default_initial_query")]
    pub initial_query: String,

    /// Request timeout in seconds; 0 leaves the transport default in place
    #[serde(rename = "Request Timeout", default)]
    pub request_timeout: u64,

    #[serde(rename = "Debug Mode", default)]
    pub debug_mode: bool,

    #[serde(rename = "Console Logging", default = "default_console_logging")]
    pub console_logging: bool,

    #[serde(rename = "Log Directory", default = "default_log_directory")]
    pub log_directory: String,
}

impl Default for LookupSettings {
    fn default() -> Self {
        Self {
            api_base_url: default_api_base_url(),
            initial_query: default_initial_query(),
            request_timeout: 0,
            debug_mode: false,
            console_logging: default_console_logging(),
            log_directory: default_log_directory(),
        }
    }
}

impl LookupSettings {
    /// Configured request timeout, if any
    pub fn request_timeout(&self) -> Option<Duration> {
        (self.request_timeout > 0).then(|| Duration::from_secs(self.request_timeout))
    }
}

fn default_api_base_url() -> String {
    DEFAULT_API_BASE_URL.to_string()
}

fn default_initial_query() -> String {
    DEFAULT_INITIAL_QUERY.to_string()
}

fn default_console_logging() -> bool {
    true
}

fn default_log_directory() -> String {
    "logs".to_string()
}
