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
    /// Display name used in log lines and the CLI banner.
    pub app_name: String,
    pub debug: bool,
    pub log_level: String,
    pub suppliers_path: PathBuf,
    /// Directory the JSON-file sink writes one `<supplier-slug>.json` into.
    pub output_dir: PathBuf,
    /// Per-supplier request timeout. Each fetch is bounded independently.
    pub fetch_timeout_secs: u64,
    pub user_agent: String,
    /// Optional deadline for the whole fetch cycle. When it elapses, every
    /// in-flight fetch is cancelled and reported as a transport failure.
    pub batch_deadline_secs: Option<u64>,
}

impl AppConfig {
    #[must_use]
    pub fn fetch_timeout(&self) -> std::time::Duration {
        std::time::Duration::from_secs(self.fetch_timeout_secs)
    }
}
