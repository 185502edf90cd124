use anyhow::anyhow;
use anyhow::Result;
use serde::Deserialize;

#[derive(Debug, Clone, Deserialize, Default)]
pub struct AppConfig {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub storage: StorageConfig,
    #[serde(default)]
    pub database: DatabaseConfig,
    #[serde(default)]
    pub blobs: BlobConfig,
    #[serde(default)]
    pub auth: AuthSettings,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    #[serde(default)]
    pub worker_threads: Option<usize>,
    /// Optional bind address for the `/healthz` + `/metrics` listener.
    #[serde(default)]
    pub admin_addr: Option<String>,
    /// `compact` (default) or `json`.
    #[serde(default = "default_log_format")]
    pub log_format: String,
    /// Mark the admin session cookie `Secure`; enable behind https.
    #[serde(default)]
    pub secure_cookies: bool,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".into(),
            port: 8080,
            worker_threads: Some(4),
            admin_addr: None,
            log_format: default_log_format(),
            secure_cookies: false,
        }
    }
}

#[derive(Debug, Clone, Copy, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum StorageBackend {
    /// JSON document files under `storage.data_dir`.
    #[default]
    Json,
    /// Postgres through SeaORM, configured by `[database]`.
    Postgres,
}

#[derive(Debug, Clone, Deserialize)]
pub struct StorageConfig {
    #[serde(default)]
    pub backend: StorageBackend,
    #[serde(default = "default_data_dir")]
    pub data_dir: String,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self { backend: StorageBackend::Json, data_dir: default_data_dir() }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseConfig {
    #[serde(default)]
    pub url: String,
    #[serde(default = "default_max_connections")]
    pub max_connections: u32,
    #[serde(default = "default_min_connections")]
    pub min_connections: u32,
    #[serde(default = "default_connect_timeout")]
    pub connect_timeout_secs: u64,
    #[serde(default = "default_idle_timeout")]
    pub idle_timeout_secs: u64,
    #[serde(default = "default_max_lifetime")]
    pub max_lifetime_secs: u64,
    #[serde(default = "default_acquire_timeout")]
    pub acquire_timeout_secs: u64,
    #[serde(default)]
    pub sqlx_logging: bool,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            url: String::new(),
            max_connections: default_max_connections(),
            min_connections: default_min_connections(),
            connect_timeout_secs: default_connect_timeout(),
            idle_timeout_secs: default_idle_timeout(),
            max_lifetime_secs: default_max_lifetime(),
            acquire_timeout_secs: default_acquire_timeout(),
            sqlx_logging: false,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct BlobConfig {
    /// Directory holding uploaded thumbnails and files.
    #[serde(default = "default_blob_root")]
    pub root_dir: String,
    /// Public prefix under which `root_dir` is served.
    #[serde(default = "default_blob_base_url")]
    pub public_base_url: String,
}

impl Default for BlobConfig {
    fn default() -> Self {
        Self { root_dir: default_blob_root(), public_base_url: default_blob_base_url() }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct AuthSettings {
    #[serde(default)]
    pub jwt_secret: String,
    #[serde(default = "default_admin_username")]
    pub admin_username: String,
    /// Only used to seed an empty credential store.
    #[serde(default)]
    pub admin_password: Option<String>,
    #[serde(default = "default_session_ttl_hours")]
    pub session_ttl_hours: i64,
    #[serde(default = "default_subscriber_pass_days")]
    pub subscriber_pass_days: i64,
}

impl Default for AuthSettings {
    fn default() -> Self {
        Self {
            jwt_secret: String::new(),
            admin_username: default_admin_username(),
            admin_password: None,
            session_ttl_hours: default_session_ttl_hours(),
            subscriber_pass_days: default_subscriber_pass_days(),
        }
    }
}

/// One year of admin session.
pub const MAX_SESSION_TTL_HOURS: i64 = 24 * 365;
/// Ten years of subscriber pass.
pub const MAX_SUBSCRIBER_PASS_DAYS: i64 = 3650;

fn default_log_format() -> String { "compact".into() }
fn default_data_dir() -> String { "data".into() }
fn default_blob_root() -> String { "data/blobs".into() }
fn default_blob_base_url() -> String { "/blobs".into() }
fn default_admin_username() -> String { "admin".into() }
fn default_session_ttl_hours() -> i64 { 12 }
fn default_subscriber_pass_days() -> i64 { 30 }
fn default_max_connections() -> u32 { 10 }
fn default_min_connections() -> u32 { 2 }
fn default_connect_timeout() -> u64 { 30 }
fn default_idle_timeout() -> u64 { 600 }
fn default_max_lifetime() -> u64 { 3600 }
fn default_acquire_timeout() -> u64 { 30 }

pub fn config_path() -> String {
    std::env::var("CONFIG_PATH").unwrap_or_else(|_| "config.toml".to_string())
}

pub fn load_from_file(path: &str) -> Result<AppConfig> {
    let content = std::fs::read_to_string(path)?;
    parse(&content)
}

pub fn parse(content: &str) -> Result<AppConfig> {
    let cfg: AppConfig = toml::from_str(content)?;
    Ok(cfg)
}

impl AppConfig {
    /// Read `CONFIG_PATH` (defaults when the file is missing), apply env overrides, validate.
    pub fn load_and_validate() -> Result<Self> {
        let path = config_path();
        let mut cfg = if std::path::Path::new(&path).exists() {
            load_from_file(&path)?
        } else {
            AppConfig::default()
        };
        cfg.apply_env(|key| std::env::var(key).ok());
        cfg.normalize_and_validate()?;
        Ok(cfg)
    }

    /// Overlay environment variables; `lookup` is injectable for tests.
    pub fn apply_env<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(v) = lookup("SERVER_HOST") { self.server.host = v; }
        if let Some(p) = lookup("SERVER_PORT").and_then(|p| p.parse::<u16>().ok()) { self.server.port = p; }
        if let Some(v) = lookup("LOG_FORMAT") { self.server.log_format = v; }
        if let Some(v) = lookup("DATA_DIR") { self.storage.data_dir = v; }
        if let Some(v) = lookup("BLOB_ROOT") { self.blobs.root_dir = v; }
        if let Some(v) = lookup("BLOB_BASE_URL") { self.blobs.public_base_url = v; }
        if let Some(v) = lookup("JWT_SECRET") { self.auth.jwt_secret = v; }
        if let Some(v) = lookup("ADMIN_USERNAME") { self.auth.admin_username = v; }
        if let Some(v) = lookup("ADMIN_PASSWORD") { self.auth.admin_password = Some(v); }
        // DATABASE_URL switches to postgres unless the file pinned a backend explicitly
        if let Some(url) = lookup("DATABASE_URL") {
            if self.database.url.trim().is_empty() {
                self.database.url = url;
                self.storage.backend = StorageBackend::Postgres;
            }
        }
    }

    pub fn normalize_and_validate(&mut self) -> Result<()> {
        self.server.normalize()?;
        if self.storage.data_dir.trim().is_empty() {
            return Err(anyhow!("storage.data_dir must not be empty"));
        }
        if self.storage.backend == StorageBackend::Postgres {
            self.database.validate()?;
        }
        self.blobs.validate()?;
        self.auth.validate()?;
        Ok(())
    }
}

impl ServerConfig {
    fn normalize(&mut self) -> Result<()> {
        if self.host.trim().is_empty() {
            self.host = "127.0.0.1".to_string();
        }
        if self.port == 0 {
            return Err(anyhow!("server.port must be within 1..=65535"));
        }
        match self.worker_threads {
            Some(0) | None => self.worker_threads = Some(4),
            Some(_) => {}
        }
        let fmt = self.log_format.to_ascii_lowercase();
        if fmt != "compact" && fmt != "json" {
            return Err(anyhow!("server.log_format must be `compact` or `json`"));
        }
        self.log_format = fmt;
        Ok(())
    }
}

impl DatabaseConfig {
    pub fn validate(&self) -> Result<()> {
        if self.url.trim().is_empty() {
            return Err(anyhow!("database.url is empty; set it in config.toml or DATABASE_URL"));
        }
        let lower = self.url.to_lowercase();
        if !(lower.starts_with("postgresql://") || lower.starts_with("postgres://")) {
            return Err(anyhow!("database.url must start with postgresql:// or postgres://"));
        }
        if self.min_connections == 0 {
            return Err(anyhow!("database.min_connections must be >= 1"));
        }
        if self.max_connections < self.min_connections {
            return Err(anyhow!("database.max_connections must be >= min_connections"));
        }
        if self.connect_timeout_secs == 0 || self.acquire_timeout_secs == 0 {
            return Err(anyhow!("database timeouts must be positive seconds"));
        }
        Ok(())
    }
}

impl BlobConfig {
    fn validate(&self) -> Result<()> {
        if self.root_dir.trim().is_empty() {
            return Err(anyhow!("blobs.root_dir must not be empty"));
        }
        if self.public_base_url.trim().is_empty() {
            return Err(anyhow!("blobs.public_base_url must not be empty"));
        }
        Ok(())
    }
}

impl AuthSettings {
    fn validate(&self) -> Result<()> {
        if self.jwt_secret.len() < 16 {
            return Err(anyhow!("auth.jwt_secret (or JWT_SECRET) must be at least 16 bytes"));
        }
        if self.admin_username.trim().is_empty() {
            return Err(anyhow!("auth.admin_username must not be empty"));
        }
        if !(1..=MAX_SESSION_TTL_HOURS).contains(&self.session_ttl_hours) {
            return Err(anyhow!("auth.session_ttl_hours must be within 1..={MAX_SESSION_TTL_HOURS}"));
        }
        if !(1..=MAX_SUBSCRIBER_PASS_DAYS).contains(&self.subscriber_pass_days) {
            return Err(anyhow!("auth.subscriber_pass_days must be within 1..={MAX_SUBSCRIBER_PASS_DAYS}"));
        }
        Ok(())
    }
}
