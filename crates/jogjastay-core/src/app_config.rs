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

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub env: Environment,
    pub bind_addr: SocketAddr,
    pub log_level: String,
    /// Seed catalog location; the server runs the one-time migration from this
    /// file at startup.
    pub hotels_path: PathBuf,
    /// Backing file for the document store. `None` keeps the store in memory
    /// only, which is what the tests use.
    pub store_path: Option<PathBuf>,
    /// Email promoted to the admin role once during startup bootstrap, if a
    /// matching user record exists without an explicit role.
    pub bootstrap_admin_email: Option<String>,
    pub search_radius_km: f64,
    pub review_feed_limit: usize,
}
