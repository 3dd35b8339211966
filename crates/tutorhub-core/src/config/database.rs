//! Database configuration.

use serde::{Deserialize, Serialize};

/// Database connection pool configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    /// PostgreSQL connection URL.
    #[serde(default = "default_url")]
    pub url: String,
    /// Maximum number of connections in the pool.
    #[serde(default = "default_max_connections")]
    pub max_connections: u32,
    /// Minimum number of connections in the pool.
    #[serde(default = "default_min_connections")]
    pub min_connections: u32,
    /// Connection timeout in seconds.
    #[serde(default = "default_connect_timeout")]
    pub connect_timeout_seconds: u64,
    /// Idle connection timeout in seconds.
    #[serde(default = "default_idle_timeout")]
    pub idle_timeout_seconds: u64,
    /// Apply pending migrations when the server starts.
    #[serde(default = "default_run_migrations")]
    pub run_migrations: bool,
    /// Schema every pooled session resolves unqualified names in.
    /// `None` keeps the server's `search_path`.
    #[serde(default)]
    pub schema: Option<String>,
    /// Upper bound for one statement, in milliseconds. 0 disables it.
    #[serde(default = "default_statement_timeout")]
    pub statement_timeout_ms: u64,
    /// How long an access change waits for its tree lock, in milliseconds,
    /// before giving up with a conflict. 0 waits forever.
    #[serde(default = "default_lock_timeout")]
    pub lock_timeout_ms: u64,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            url: default_url(),
            max_connections: default_max_connections(),
            min_connections: default_min_connections(),
            connect_timeout_seconds: default_connect_timeout(),
            idle_timeout_seconds: default_idle_timeout(),
            run_migrations: default_run_migrations(),
            schema: None,
            statement_timeout_ms: default_statement_timeout(),
            lock_timeout_ms: default_lock_timeout(),
        }
    }
}

fn default_url() -> String {
    "postgres://localhost:5432/tutorhub".to_string()
}

fn default_max_connections() -> u32 {
    20
}

fn default_min_connections() -> u32 {
    2
}

fn default_connect_timeout() -> u64 {
    10
}

fn default_idle_timeout() -> u64 {
    300
}

fn default_run_migrations() -> bool {
    true
}

fn default_statement_timeout() -> u64 {
    30_000
}

fn default_lock_timeout() -> u64 {
    10_000
}
