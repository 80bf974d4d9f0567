//! Configuration layer: typed settings with layered precedence (file → env → CLI).

use std::{
    net::SocketAddr,
    num::{NonZeroU32, NonZeroU64, NonZeroUsize},
    path::PathBuf,
    str::FromStr,
    time::Duration,
};

use clap::{Parser, ValueEnum};
use config::{Config, Environment, File};
use serde::Deserialize;
use thiserror::Error;
use tracing::level_filters::LevelFilter;

mod cli;

pub use cli::{
    CliArgs, Command, DatabaseOverride, MigrateArgs, SeedArgs, ServeArgs, ServeOverrides,
};

const DEFAULT_CONFIG_BASENAME: &str = "config/default";
const LOCAL_CONFIG_BASENAME: &str = "menu-catalog";
const ENV_PREFIX: &str = "CATALOG";
const DEFAULT_HOST: &str = "127.0.0.1";
const DEFAULT_PORT: u16 = 8000;
const DEFAULT_GRACEFUL_SHUTDOWN_SECS: u64 = 30;
const DEFAULT_DB_HTTP_MAX_CONNECTIONS: u32 = 8;
const DEFAULT_DB_JOBS_MAX_CONNECTIONS: u32 = 4;
const DEFAULT_STORE_TIMEOUT_MS: u64 = 5_000;
const DEFAULT_CACHE_URL: &str = "redis://127.0.0.1:6379";
const DEFAULT_CACHE_TTL_SECS: u64 = 3_600;
const DEFAULT_CACHE_OP_TIMEOUT_MS: u64 = 250;
const DEFAULT_CACHE_MEMORY_MAX_ENTRIES: usize = 10_000;
const DEFAULT_REPORTS_DIR: &str = "files";
const DEFAULT_REPORT_WORKER_CONCURRENCY: u32 = 1;
const DEFAULT_REPORT_DOWNLOAD_NAME: &str = "Menu.xlsx";
const DEFAULT_SEED_FILE: &str = "data/menu_seed.json";

/// Fully-resolved deployment settings after precedence resolution and validation.
#[derive(Debug, Clone)]
pub struct Settings {
    pub server: ServerSettings,
    pub logging: LoggingSettings,
    pub database: DatabaseSettings,
    pub cache: CacheSettings,
    pub reports: ReportSettings,
    pub seed: SeedSettings,
}

#[derive(Debug, Clone)]
pub struct ServerSettings {
    pub addr: SocketAddr,
    pub graceful_shutdown: Duration,
}

#[derive(Debug, Clone)]
pub struct LoggingSettings {
    pub level: LevelFilter,
    pub format: LogFormat,
}

#[derive(Debug, Clone, Copy)]
pub enum LogFormat {
    Json,
    Compact,
}

#[derive(Debug, Clone)]
pub struct DatabaseSettings {
    pub url: Option<String>,
    pub http_max_connections: NonZeroU32,
    pub jobs_max_connections: NonZeroU32,
    pub store_timeout: Duration,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum CacheBackend {
    Redis,
    Memory,
}

#[derive(Debug, Clone)]
pub struct CacheSettings {
    pub backend: CacheBackend,
    pub url: String,
    pub ttl: Duration,
    pub key_prefix: String,
    pub op_timeout: Duration,
    pub memory_max_entries: NonZeroUsize,
}

#[derive(Debug, Clone)]
pub struct ReportSettings {
    pub directory: PathBuf,
    pub worker_concurrency: NonZeroU32,
    pub download_name: String,
}

#[derive(Debug, Clone)]
pub struct SeedSettings {
    pub file: PathBuf,
}

#[derive(Debug, Error)]
pub enum LoadError {
    #[error("failed to build configuration: {0}")]
    Build(#[from] config::ConfigError),
    #[error("invalid configuration for `{key}`: {reason}")]
    Invalid { key: &'static str, reason: String },
}

impl LoadError {
    fn invalid(key: &'static str, reason: impl Into<String>) -> Self {
        Self::Invalid {
            key,
            reason: reason.into(),
        }
    }
}

/// Load settings using the configured precedence (file → environment → CLI).
pub fn load(cli: &CliArgs) -> Result<Settings, LoadError> {
    let mut builder = Config::builder()
        .add_source(File::with_name(DEFAULT_CONFIG_BASENAME).required(false))
        .add_source(File::with_name(LOCAL_CONFIG_BASENAME).required(false));

    if let Some(path) = cli.config_file.as_ref() {
        builder = builder.add_source(File::from(path.as_path()).required(true));
    }

    builder = builder.add_source(Environment::with_prefix(ENV_PREFIX).separator("__"));

    let mut raw: RawSettings = builder.build()?.try_deserialize()?;

    match cli.command.as_ref() {
        Some(Command::Serve(args)) => raw.apply_serve_overrides(&args.overrides),
        Some(Command::Migrate(args)) => raw.apply_database_override(&args.database),
        Some(Command::Seed(args)) => raw.apply_seed_overrides(args),
        None => raw.apply_serve_overrides(&ServeOverrides::default()),
    }

    Settings::from_raw(raw)
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
struct RawSettings {
    server: RawServerSettings,
    logging: RawLoggingSettings,
    database: RawDatabaseSettings,
    cache: RawCacheSettings,
    reports: RawReportSettings,
    seed: RawSeedSettings,
}

impl RawSettings {
    fn apply_serve_overrides(&mut self, overrides: &ServeOverrides) {
        if let Some(host) = overrides.server_host.as_ref() {
            self.server.host = Some(host.clone());
        }
        if let Some(port) = overrides.server_port {
            self.server.port = Some(port);
        }
        if let Some(seconds) = overrides.server_graceful_shutdown_seconds {
            self.server.graceful_shutdown_seconds = Some(seconds);
        }
        if let Some(level) = overrides.log_level.as_ref() {
            self.logging.level = Some(level.clone());
        }
        if let Some(json) = overrides.log_json {
            self.logging.json = Some(json);
        }
        if let Some(url) = overrides.database_url.as_ref() {
            self.database.url = Some(url.clone());
        }
        if let Some(max) = overrides.database_http_max_connections {
            self.database.http_max_connections = Some(max);
        }
        if let Some(max) = overrides.database_jobs_max_connections {
            self.database.jobs_max_connections = Some(max);
        }
        if let Some(timeout) = overrides.database_store_timeout_ms {
            self.database.store_timeout_ms = Some(timeout);
        }
        if let Some(backend) = overrides.cache_backend {
            self.cache.backend = Some(backend);
        }
        if let Some(url) = overrides.cache_url.as_ref() {
            self.cache.url = Some(url.clone());
        }
        if let Some(ttl) = overrides.cache_ttl_seconds {
            self.cache.ttl_seconds = Some(ttl);
        }
        if let Some(directory) = overrides.reports_directory.as_ref() {
            self.reports.directory = Some(directory.clone());
        }
        if let Some(value) = overrides.reports_worker_concurrency {
            self.reports.worker_concurrency = Some(value);
        }
    }

    fn apply_seed_overrides(&mut self, args: &SeedArgs) {
        self.apply_database_override(&args.database);
        if let Some(backend) = args.cache_backend {
            self.cache.backend = Some(backend);
        }
        if let Some(file) = args.file.as_ref() {
            self.seed.file = Some(file.clone());
        }
    }

    fn apply_database_override(&mut self, overrides: &DatabaseOverride) {
        if let Some(url) = overrides.database_url.as_ref() {
            self.database.url = Some(url.clone());
        }
    }
}

impl Settings {
    fn from_raw(raw: RawSettings) -> Result<Self, LoadError> {
        let RawSettings {
            server,
            logging,
            database,
            cache,
            reports,
            seed,
        } = raw;

        Ok(Self {
            server: build_server_settings(server)?,
            logging: build_logging_settings(logging)?,
            database: build_database_settings(database)?,
            cache: build_cache_settings(cache)?,
            reports: build_report_settings(reports)?,
            seed: build_seed_settings(seed),
        })
    }
}

fn build_server_settings(server: RawServerSettings) -> Result<ServerSettings, LoadError> {
    let host = server.host.unwrap_or_else(|| DEFAULT_HOST.to_string());

    let port = server.port.unwrap_or(DEFAULT_PORT);
    if port == 0 {
        return Err(LoadError::invalid(
            "server.port",
            "port must be greater than zero",
        ));
    }

    let addr = parse_socket_addr(&host, port)
        .map_err(|reason| LoadError::invalid("server.addr", reason))?;

    let graceful_secs = server
        .graceful_shutdown_seconds
        .unwrap_or(DEFAULT_GRACEFUL_SHUTDOWN_SECS);
    if graceful_secs == 0 {
        return Err(LoadError::invalid(
            "server.graceful_shutdown_seconds",
            "must be greater than zero",
        ));
    }

    Ok(ServerSettings {
        addr,
        graceful_shutdown: Duration::from_secs(graceful_secs),
    })
}

fn build_logging_settings(logging: RawLoggingSettings) -> Result<LoggingSettings, LoadError> {
    let level = match logging.level {
        Some(level) => LevelFilter::from_str(level.as_str()).map_err(|err| {
            LoadError::invalid("logging.level", format!("failed to parse: {err}"))
        })?,
        None => LevelFilter::INFO,
    };

    let format = if logging.json.unwrap_or(false) {
        LogFormat::Json
    } else {
        LogFormat::Compact
    };

    Ok(LoggingSettings { level, format })
}

fn build_database_settings(database: RawDatabaseSettings) -> Result<DatabaseSettings, LoadError> {
    let url = database.url.and_then(|value| {
        let trimmed = value.trim();
        (!trimmed.is_empty()).then(|| trimmed.to_string())
    });

    let http_value = database
        .http_max_connections
        .unwrap_or(DEFAULT_DB_HTTP_MAX_CONNECTIONS);
    let jobs_value = database
        .jobs_max_connections
        .unwrap_or(DEFAULT_DB_JOBS_MAX_CONNECTIONS);

    let http_max_connections = non_zero_u32(http_value.into(), "database.http_max_connections")?;
    let jobs_max_connections = non_zero_u32(jobs_value.into(), "database.jobs_max_connections")?;

    let store_timeout = non_zero_millis(
        database
            .store_timeout_ms
            .unwrap_or(DEFAULT_STORE_TIMEOUT_MS),
        "database.store_timeout_ms",
    )?;

    Ok(DatabaseSettings {
        url,
        http_max_connections,
        jobs_max_connections,
        store_timeout,
    })
}

fn build_cache_settings(cache: RawCacheSettings) -> Result<CacheSettings, LoadError> {
    let backend = cache.backend.unwrap_or(CacheBackend::Redis);

    let url = cache
        .url
        .map(|value| value.trim().to_string())
        .unwrap_or_else(|| DEFAULT_CACHE_URL.to_string());
    if backend == CacheBackend::Redis && url.is_empty() {
        return Err(LoadError::invalid(
            "cache.url",
            "url must not be empty for the redis backend",
        ));
    }

    let ttl_seconds = NonZeroU64::new(cache.ttl_seconds.unwrap_or(DEFAULT_CACHE_TTL_SECS))
        .ok_or_else(|| LoadError::invalid("cache.ttl_seconds", "must be greater than zero"))?;

    let op_timeout = non_zero_millis(
        cache.op_timeout_ms.unwrap_or(DEFAULT_CACHE_OP_TIMEOUT_MS),
        "cache.op_timeout_ms",
    )?;

    let memory_max_entries = NonZeroUsize::new(
        cache
            .memory_max_entries
            .unwrap_or(DEFAULT_CACHE_MEMORY_MAX_ENTRIES),
    )
    .ok_or_else(|| LoadError::invalid("cache.memory_max_entries", "must be greater than zero"))?;

    Ok(CacheSettings {
        backend,
        url,
        ttl: Duration::from_secs(ttl_seconds.get()),
        key_prefix: cache.key_prefix.unwrap_or_default(),
        op_timeout,
        memory_max_entries,
    })
}

fn build_report_settings(reports: RawReportSettings) -> Result<ReportSettings, LoadError> {
    let directory = reports
        .directory
        .unwrap_or_else(|| PathBuf::from(DEFAULT_REPORTS_DIR));
    if directory.as_os_str().is_empty() {
        return Err(LoadError::invalid(
            "reports.directory",
            "path must not be empty",
        ));
    }

    let worker_concurrency = non_zero_u32(
        reports
            .worker_concurrency
            .unwrap_or(DEFAULT_REPORT_WORKER_CONCURRENCY)
            .into(),
        "reports.worker_concurrency",
    )?;

    let download_name = reports
        .download_name
        .map(|name| name.trim().to_string())
        .unwrap_or_else(|| DEFAULT_REPORT_DOWNLOAD_NAME.to_string());
    if download_name.is_empty() || download_name.contains(['"', '/', '\\']) {
        return Err(LoadError::invalid(
            "reports.download_name",
            "must be a non-empty plain file name",
        ));
    }

    Ok(ReportSettings {
        directory,
        worker_concurrency,
        download_name,
    })
}

fn build_seed_settings(seed: RawSeedSettings) -> SeedSettings {
    SeedSettings {
        file: seed
            .file
            .unwrap_or_else(|| PathBuf::from(DEFAULT_SEED_FILE)),
    }
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
struct RawServerSettings {
    host: Option<String>,
    port: Option<u16>,
    graceful_shutdown_seconds: Option<u64>,
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
struct RawLoggingSettings {
    level: Option<String>,
    json: Option<bool>,
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
struct RawDatabaseSettings {
    url: Option<String>,
    http_max_connections: Option<u32>,
    jobs_max_connections: Option<u32>,
    store_timeout_ms: Option<u64>,
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
struct RawCacheSettings {
    backend: Option<CacheBackend>,
    url: Option<String>,
    ttl_seconds: Option<u64>,
    key_prefix: Option<String>,
    op_timeout_ms: Option<u64>,
    memory_max_entries: Option<usize>,
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
struct RawReportSettings {
    directory: Option<PathBuf>,
    worker_concurrency: Option<u32>,
    download_name: Option<String>,
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
struct RawSeedSettings {
    file: Option<PathBuf>,
}

fn parse_socket_addr(host: &str, port: u16) -> Result<SocketAddr, String> {
    let candidate = format!("{host}:{port}");
    candidate
        .parse()
        .map_err(|err| format!("invalid address `{candidate}`: {err}"))
}

fn non_zero_u32(value: u64, key: &'static str) -> Result<NonZeroU32, LoadError> {
    if value == 0 {
        return Err(LoadError::invalid(key, "must be greater than zero"));
    }
    let value_u32: u32 = value
        .try_into()
        .map_err(|_| LoadError::invalid(key, "value exceeds supported range for u32"))?;
    NonZeroU32::new(value_u32).ok_or_else(|| LoadError::invalid(key, "must be greater than zero"))
}

fn non_zero_millis(value: u64, key: &'static str) -> Result<Duration, LoadError> {
    if value == 0 {
        return Err(LoadError::invalid(key, "must be greater than zero"));
    }
    Ok(Duration::from_millis(value))
}

/// Resolve configuration using the supplied CLI arguments, returning both for downstream use.
pub fn load_with_cli() -> Result<(CliArgs, Settings), LoadError> {
    let args = CliArgs::parse();
    let settings = load(&args)?;
    Ok((args, settings))
}
