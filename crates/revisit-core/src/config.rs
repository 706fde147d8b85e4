use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};
use serde::{Deserialize, Serialize};

pub const DEFAULT_PORT: u16 = 8000;
pub const DEFAULT_BIND: &str = "127.0.0.1";
pub const DEFAULT_FRONTEND_ORIGIN: &str = "http://localhost:3000";
pub const ENV_PREFIX: &str = "REVISIT_";
pub const DEFAULT_READ_CONNECTIONS: usize = 4;

/// Top-level config (revisit.toml + REVISIT_* env overrides).
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RevisitConfig {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub storage: StorageConfig,
    #[serde(default)]
    pub cors: CorsConfig,
    #[serde(default)]
    pub employees: EmployeesConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_bind")]
    pub bind: String,
    #[serde(default = "default_port")]
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: default_bind(),
            port: default_port(),
        }
    }
}

impl ServerConfig {
    /// `bind:port` string suitable for `SocketAddr` parsing.
    pub fn address(&self) -> String {
        format!("{}:{}", self.bind, self.port)
    }
}

/// Which repository implementation backs both record stores.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum StorageBackend {
    /// Process-local maps; contents are lost on exit.
    #[default]
    Memory,
    /// Single SQLite file at `storage.path`.
    Sqlite,
}

impl std::fmt::Display for StorageBackend {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Memory => write!(f, "memory"),
            Self::Sqlite => write!(f, "sqlite"),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageConfig {
    #[serde(default)]
    pub backend: StorageBackend,
    /// Database file, only read when `backend = "sqlite"`.
    #[serde(default = "default_db_path")]
    pub path: String,
    /// Read-only SQLite connections kept next to the single writer.
    #[serde(default = "default_read_connections")]
    pub read_connections: usize,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            backend: StorageBackend::default(),
            path: default_db_path(),
            read_connections: default_read_connections(),
        }
    }
}

/// Browser origins allowed to call the API (the question-review frontend).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CorsConfig {
    #[serde(default = "default_allowed_origins")]
    pub allowed_origins: Vec<String>,
}

impl Default for CorsConfig {
    fn default() -> Self {
        Self {
            allowed_origins: default_allowed_origins(),
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct EmployeesConfig {
    /// Insert the three sample employees at startup.
    #[serde(default)]
    pub seed_samples: bool,
}

fn default_port() -> u16 {
    DEFAULT_PORT
}
fn default_bind() -> String {
    DEFAULT_BIND.to_string()
}
fn default_read_connections() -> usize {
    DEFAULT_READ_CONNECTIONS
}
fn default_allowed_origins() -> Vec<String> {
    vec![DEFAULT_FRONTEND_ORIGIN.to_string()]
}
fn default_db_path() -> String {
    let home = std::env::var("HOME").unwrap_or_else(|_| ".".to_string());
    format!("{}/.revisit/revisit.db", home)
}

impl RevisitConfig {
    /// Load config from a TOML file with REVISIT_* env var overrides.
    ///
    /// Checks in order:
    ///   1. Explicit path argument
    ///   2. ~/.revisit/revisit.toml
    ///
    /// A missing file is not an error; defaults fill every field.
    pub fn load(config_path: Option<&str>) -> crate::error::Result<Self> {
        let path = config_path
            .map(String::from)
            .unwrap_or_else(default_config_path);

        Self::extract(
            Self::figment()
                .merge(Toml::file(&path))
                .merge(Env::prefixed(ENV_PREFIX).ignore(&["config"]).split("__")),
        )
    }

    /// Base figment seeded with the built-in defaults.
    pub fn figment() -> Figment {
        Figment::new().merge(Serialized::defaults(RevisitConfig::default()))
    }

    /// Extract a config from any provider stack.
    pub fn extract(figment: Figment) -> crate::error::Result<Self> {
        figment
            .extract()
            .map_err(|e| crate::error::CoreError::Config(e.to_string()))
    }
}

fn default_config_path() -> String {
    let home = std::env::var("HOME").unwrap_or_else(|_| ".".to_string());
    format!("{}/.revisit/revisit.toml", home)
}
