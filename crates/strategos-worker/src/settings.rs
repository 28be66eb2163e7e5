use config::{Config, ConfigError, Environment};
use serde::Deserialize;
use std::path::PathBuf;

fn default_projects_dir() -> PathBuf {
    PathBuf::from("/var/lib/strategos/projects")
}

fn default_poll_interval() -> u64 {
    10
}

fn default_requeue_after() -> i64 {
    60
}

fn default_stall_timeout() -> i64 {
    3600
}

#[derive(Debug, Clone, Deserialize)]
pub struct Settings {
    /// Base directory holding one working directory per project id.
    #[serde(default = "default_projects_dir")]
    pub projects_dir: PathBuf,
    pub database_url: String,
    #[serde(default = "default_poll_interval")]
    pub poll_interval_secs: u64,
    /// Age after which a DELAY record counts as stranded.
    #[serde(default = "default_requeue_after")]
    pub requeue_after_secs: i64,
    /// Age after which a RUN record counts as stalled.
    #[serde(default = "default_stall_timeout")]
    pub stall_timeout_secs: i64,
}

impl Settings {
    /// Optional `strategos.toml` in the working directory, overridden by
    /// `STRATEGOS_*` environment variables.
    pub fn load() -> Result<Self, ConfigError> {
        Config::builder()
            .add_source(config::File::with_name("strategos").required(false))
            .add_source(Environment::with_prefix("STRATEGOS"))
            .build()?
            .try_deserialize()
    }
}
