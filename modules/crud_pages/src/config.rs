//! Configuration for the crud pages module

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

/// Crud pages configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct Config {
    /// Upper bound on every store call
    #[serde(default = "default_request_timeout", with = "humantime_serde")]
    pub request_timeout: Duration,

    /// `created_by` stamp when no user is signed in
    #[serde(default = "default_user")]
    pub default_user: String,

    /// Extra module and page declarations (YAML)
    #[serde(default)]
    pub modules_file: Option<PathBuf>,

    /// Create missing module tables and columns on startup
    #[serde(default = "default_true")]
    pub sync_schema: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            request_timeout: default_request_timeout(),
            default_user: default_user(),
            modules_file: None,
            sync_schema: true,
        }
    }
}

fn default_request_timeout() -> Duration {
    crate::domain::adapter::DEFAULT_TIMEOUT
}

fn default_user() -> String {
    crate::domain::adapter::DEFAULT_USER.to_string()
}

fn default_true() -> bool {
    true
}
