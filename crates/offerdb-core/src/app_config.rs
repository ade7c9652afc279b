use std::net::SocketAddr;
use std::path::PathBuf;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Environment {
    Development,
    Test,
    Production,
}

impl std::fmt::Display for Environment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Environment::Development => write!(f, "development"),
            Environment::Test => write!(f, "test"),
            Environment::Production => write!(f, "production"),
        }
    }
}

#[derive(Clone)]
pub struct AppConfig {
    pub database_url: String,
    pub env: Environment,
    /// Listen address for the HTTP API.
    pub bind_addr: SocketAddr,
    pub log_level: String,
    /// When set, log output is also appended to this file.
    pub log_file: Option<PathBuf>,
    pub db_max_connections: u32,
    pub db_min_connections: u32,
    pub db_acquire_timeout_secs: u64,
    /// Offers endpoint; the region is appended as the `zipCode` query parameter.
    pub offers_endpoint: String,
    pub user_agent: String,
    pub request_timeout_secs: u64,
    /// Upper bound on regions ingested concurrently.
    pub max_workers: usize,
    /// Deadline for one region's fetch-normalize-write cycle. `0` disables it.
    pub region_timeout_secs: u64,
    /// Six-field cron expression (with seconds) for the scheduled run, in
    /// the host's local time zone.
    pub schedule: String,
}

impl std::fmt::Debug for AppConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppConfig")
            .field("env", &self.env)
            .field("bind_addr", &self.bind_addr)
            .field("log_level", &self.log_level)
            .field("log_file", &self.log_file)
            .field("database_url", &"[redacted]")
            .field("db_max_connections", &self.db_max_connections)
            .field("db_min_connections", &self.db_min_connections)
            .field("db_acquire_timeout_secs", &self.db_acquire_timeout_secs)
            .field("offers_endpoint", &self.offers_endpoint)
            .field("user_agent", &self.user_agent)
            .field("request_timeout_secs", &self.request_timeout_secs)
            .field("max_workers", &self.max_workers)
            .field("region_timeout_secs", &self.region_timeout_secs)
            .field("schedule", &self.schedule)
            .finish()
    }
}
