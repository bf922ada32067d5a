use serde::Deserialize;
use sqlx::postgres::PgConnectOptions;
use std::{env, fs, path::{Path, PathBuf}, time::Duration};

pub const CONFIG_ENV: &str = "MONITOR_CONFIG";
pub const DEFAULT_CONFIG_PATH: &str = "monitor-config.toml";

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StorageKind {
    #[default]
    Postgres,
    Memory,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct HttpConfig {
    pub bind_addr: String,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            bind_addr: "0.0.0.0:8080".to_string(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct DatabaseConfig {
    pub kind: StorageKind,
    pub host: String,
    pub port: u16,
    pub user: String,
    pub password: String,
    pub name: String,
    pub max_connections: u32,
    /// Run the bundled `CREATE TABLE IF NOT EXISTS` scripts after connecting.
    pub apply_schema: bool,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            kind: StorageKind::Postgres,
            host: "localhost".to_string(),
            port: 5432,
            user: "postgres".to_string(),
            password: String::new(),
            name: "energy".to_string(),
            max_connections: 5,
            apply_schema: false,
        }
    }
}

impl DatabaseConfig {
    pub fn connect_options(&self) -> PgConnectOptions {
        let opts = PgConnectOptions::new()
            .host(&self.host)
            .port(self.port)
            .username(&self.user)
            .database(&self.name);

        if self.password.is_empty() {
            opts
        } else {
            opts.password(&self.password)
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ArchiveConfig {
    pub enabled: bool,
    pub dir: PathBuf,
    pub replay_batch_size: usize,
}

impl Default for ArchiveConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            dir: PathBuf::from("uplinks"),
            replay_batch_size: 500,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct BroadcastConfig {
    pub interval_secs: u64,
}

impl Default for BroadcastConfig {
    fn default() -> Self {
        Self { interval_secs: 5 }
    }
}

impl BroadcastConfig {
    pub fn interval(&self) -> Duration {
        Duration::from_secs(self.interval_secs.max(1))
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct MetricsConfig {
    pub bind_addr: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub http: HttpConfig,
    pub database: DatabaseConfig,
    pub archive: ArchiveConfig,
    pub broadcast: BroadcastConfig,
    pub metrics: Option<MetricsConfig>,
}

impl AppConfig {
    /// Load from `$MONITOR_CONFIG` (or `monitor-config.toml` when present),
    /// then apply `DB_*` environment overrides.
    pub fn load() -> anyhow::Result<Self> {
        let mut cfg = match env::var(CONFIG_ENV) {
            Ok(path) => Self::from_file(path)?,
            Err(_) if Path::new(DEFAULT_CONFIG_PATH).exists() => Self::from_file(DEFAULT_CONFIG_PATH)?,
            Err(_) => Self::default(),
        };
        cfg.apply_env_overrides(|key| env::var(key).ok())?;
        Ok(cfg)
    }

    pub fn from_file<P: AsRef<Path>>(path: P) -> anyhow::Result<Self> {
        let path = path.as_ref();
        let contents = fs::read_to_string(path)
            .map_err(|e| anyhow::anyhow!("failed to read config file {}: {e}", path.display()))?;
        Self::from_toml_str(&contents)
    }

    pub fn from_toml_str(contents: &str) -> anyhow::Result<Self> {
        Ok(toml::from_str(contents)?)
    }

    pub fn apply_env_overrides<F>(&mut self, lookup: F) -> anyhow::Result<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        let db = &mut self.database;
        if let Some(host) = lookup("DB_HOST") {
            db.host = host;
        }
        if let Some(port) = lookup("DB_PORT") {
            db.port = port
                .parse()
                .map_err(|e| anyhow::anyhow!("invalid DB_PORT '{port}': {e}"))?;
        }
        if let Some(user) = lookup("DB_USER") {
            db.user = user;
        }
        if let Some(password) = lookup("DB_PASSWORD") {
            db.password = password;
        }
        if let Some(name) = lookup("DB_NAME") {
            db.name = name;
        }
        Ok(())
    }
}
