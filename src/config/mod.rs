//! Configuration layer: typed settings with layered precedence (file → env → CLI).

use std::{net::SocketAddr, str::FromStr, time::Duration};

use clap::Parser;
use config::{Config, Environment, File};
use serde::Deserialize;
use thiserror::Error;
use tracing::level_filters::LevelFilter;

mod cli;

pub use cli::{CliArgs, Command, ServeArgs, ServeOverrides, SlugArgs};

const DEFAULT_CONFIG_BASENAME: &str = "config/default";
const LOCAL_CONFIG_BASENAME: &str = "blogcraft";
const DEFAULT_HOST: &str = "127.0.0.1";
const DEFAULT_PORT: u16 = 3000;
const DEFAULT_GRACEFUL_SHUTDOWN_SECS: u64 = 30;
const DEFAULT_STORE_TABLE: &str = "posts";
const DEFAULT_STORE_TIMEOUT_SECS: u64 = 10;
const DEFAULT_COOKIE_NAME: &str = "blogcraft_session";
const DEFAULT_CACHE_TTL_SECS: u64 = 30;
const DEFAULT_EDITOR_IDLE_TIMEOUT_SECS: u64 = 30 * 60;
const DEFAULT_SITE_TITLE: &str = "BlogCraft";

#[derive(Debug, Clone)]
pub struct Settings {
    pub server: ServerSettings,
    pub logging: LoggingSettings,
    pub store: StoreSettings,
    pub auth: AuthSettings,
    pub cache: CacheSettings,
    pub editor: EditorSettings,
    pub site: SiteSettings,
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

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Backend {
    Memory,
    Remote,
}

impl FromStr for Backend {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "memory" => Ok(Self::Memory),
            "remote" => Ok(Self::Remote),
            other => Err(format!("unknown backend `{other}` (expected remote|memory)")),
        }
    }
}

/// Connection details for the hosted backend.
#[derive(Debug, Clone)]
pub struct RemoteSettings {
    pub url: String,
    pub anon_key: String,
    pub timeout: Duration,
}

#[derive(Debug, Clone)]
pub enum StoreSettings {
    Memory,
    Remote { remote: RemoteSettings, table: String },
}

#[derive(Debug, Clone)]
pub struct AuthSettings {
    pub backend: AuthBackend,
    pub cookie_name: String,
    pub cookie_secure: bool,
}

#[derive(Debug, Clone)]
pub enum AuthBackend {
    Memory { users: Vec<MemoryUser> },
    Remote(RemoteSettings),
}

/// Account accepted by the in-process auth backend.
#[derive(Clone, Deserialize)]
pub struct MemoryUser {
    pub email: String,
    pub password: String,
    #[serde(default)]
    pub admin: bool,
}

impl std::fmt::Debug for MemoryUser {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MemoryUser")
            .field("email", &self.email)
            .field("password", &"***")
            .field("admin", &self.admin)
            .finish()
    }
}

#[derive(Debug, Clone, Copy)]
pub struct CacheSettings {
    pub enabled: bool,
    pub ttl: Duration,
}

#[derive(Debug, Clone, Copy)]
pub struct EditorSettings {
    pub idle_timeout: Duration,
}

#[derive(Debug, Clone)]
pub struct SiteSettings {
    pub title: String,
    pub show_login_button: bool,
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

    builder = builder.add_source(Environment::with_prefix("BLOGCRAFT").separator("__"));

    let mut raw: RawSettings = builder.build()?.try_deserialize()?;

    match cli.command.as_ref() {
        Some(Command::Serve(args)) => raw.apply_serve_overrides(&args.overrides),
        Some(Command::Slug(_)) => {}
        None => raw.apply_serve_overrides(&ServeOverrides::default()),
    }

    Settings::from_raw(raw)
}

pub fn load_with_cli() -> Result<(CliArgs, Settings), LoadError> {
    let args = CliArgs::parse();
    let settings = load(&args)?;
    Ok((args, settings))
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
struct RawSettings {
    server: RawServerSettings,
    logging: RawLoggingSettings,
    store: RawStoreSettings,
    auth: RawAuthSettings,
    cache: RawCacheSettings,
    editor: RawEditorSettings,
    site: RawSiteSettings,
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
        if let Some(backend) = overrides.store_backend.as_ref() {
            self.store.backend = Some(backend.clone());
        }
        if let Some(url) = overrides.store_url.as_ref() {
            self.store.url = Some(url.clone());
        }
        if let Some(backend) = overrides.auth_backend.as_ref() {
            self.auth.backend = Some(backend.clone());
        }
        if let Some(enabled) = overrides.cache_enabled {
            self.cache.enabled = Some(enabled);
        }
        if let Some(show) = overrides.site_show_login_button {
            self.site.show_login_button = Some(show);
        }
    }
}

impl Settings {
    fn from_raw(raw: RawSettings) -> Result<Self, LoadError> {
        let RawSettings {
            server,
            logging,
            store,
            auth,
            cache,
            editor,
            site,
        } = raw;

        let server = build_server_settings(server)?;
        let logging = build_logging_settings(logging)?;
        let auth = build_auth_settings(auth, &store)?;
        let store = build_store_settings(store)?;
        let cache = build_cache_settings(cache)?;
        let editor = build_editor_settings(editor)?;
        let site = build_site_settings(site);

        Ok(Self {
            server,
            logging,
            store,
            auth,
            cache,
            editor,
            site,
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

fn build_store_settings(store: RawStoreSettings) -> Result<StoreSettings, LoadError> {
    match parse_backend(store.backend.as_deref(), "store.backend")? {
        Backend::Memory => Ok(StoreSettings::Memory),
        Backend::Remote => {
            let url = non_blank(store.url)
                .ok_or_else(|| LoadError::invalid("store.url", "required for the remote backend"))?;
            let anon_key = non_blank(store.anon_key).ok_or_else(|| {
                LoadError::invalid("store.anon_key", "required for the remote backend")
            })?;
            let table = store
                .table
                .unwrap_or_else(|| DEFAULT_STORE_TABLE.to_string());
            if table.is_empty()
                || !table
                    .chars()
                    .all(|ch| ch.is_ascii_alphanumeric() || ch == '_')
            {
                return Err(LoadError::invalid(
                    "store.table",
                    "must be a non-empty identifier of [A-Za-z0-9_]",
                ));
            }
            let timeout = seconds(
                store.timeout_seconds.unwrap_or(DEFAULT_STORE_TIMEOUT_SECS),
                "store.timeout_seconds",
            )?;

            Ok(StoreSettings::Remote {
                remote: RemoteSettings {
                    url,
                    anon_key,
                    timeout,
                },
                table,
            })
        }
    }
}

/// Remote auth reuses the store's URL and anon key unless overridden.
fn build_auth_settings(
    auth: RawAuthSettings,
    store: &RawStoreSettings,
) -> Result<AuthSettings, LoadError> {
    let backend = match parse_backend(auth.backend.as_deref(), "auth.backend")? {
        Backend::Memory => {
            if let Some(user) = auth
                .memory_users
                .iter()
                .find(|user| user.email.trim().is_empty() || user.password.is_empty())
            {
                return Err(LoadError::invalid(
                    "auth.memory_users",
                    format!(
                        "every user needs an email and a password (offending entry: `{}`)",
                        user.email
                    ),
                ));
            }
            AuthBackend::Memory {
                users: auth.memory_users,
            }
        }
        Backend::Remote => {
            let url = non_blank(auth.url)
                .or_else(|| non_blank(store.url.clone()))
                .ok_or_else(|| LoadError::invalid("auth.url", "required for the remote backend"))?;
            let anon_key = non_blank(auth.anon_key)
                .or_else(|| non_blank(store.anon_key.clone()))
                .ok_or_else(|| {
                    LoadError::invalid("auth.anon_key", "required for the remote backend")
                })?;
            let timeout = seconds(
                store.timeout_seconds.unwrap_or(DEFAULT_STORE_TIMEOUT_SECS),
                "store.timeout_seconds",
            )?;
            AuthBackend::Remote(RemoteSettings {
                url,
                anon_key,
                timeout,
            })
        }
    };

    let cookie_name = auth
        .cookie_name
        .unwrap_or_else(|| DEFAULT_COOKIE_NAME.to_string());
    if cookie_name.is_empty()
        || !cookie_name
            .chars()
            .all(|ch| ch.is_ascii_alphanumeric() || ch == '_' || ch == '-')
    {
        return Err(LoadError::invalid(
            "auth.cookie_name",
            "must be a non-empty token of [A-Za-z0-9_-]",
        ));
    }

    Ok(AuthSettings {
        backend,
        cookie_name,
        cookie_secure: auth.cookie_secure.unwrap_or(false),
    })
}

fn build_cache_settings(cache: RawCacheSettings) -> Result<CacheSettings, LoadError> {
    let enabled = cache.enabled.unwrap_or(true);
    let ttl_secs = cache.ttl_seconds.unwrap_or(DEFAULT_CACHE_TTL_SECS);
    if enabled && ttl_secs == 0 {
        return Err(LoadError::invalid(
            "cache.ttl_seconds",
            "must be greater than zero when the cache is enabled",
        ));
    }
    Ok(CacheSettings {
        enabled,
        ttl: Duration::from_secs(ttl_secs),
    })
}

fn build_editor_settings(editor: RawEditorSettings) -> Result<EditorSettings, LoadError> {
    let idle_timeout = seconds(
        editor
            .idle_timeout_seconds
            .unwrap_or(DEFAULT_EDITOR_IDLE_TIMEOUT_SECS),
        "editor.idle_timeout_seconds",
    )?;
    Ok(EditorSettings { idle_timeout })
}

fn build_site_settings(site: RawSiteSettings) -> SiteSettings {
    SiteSettings {
        title: non_blank(site.title).unwrap_or_else(|| DEFAULT_SITE_TITLE.to_string()),
        show_login_button: site.show_login_button.unwrap_or(true),
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
struct RawStoreSettings {
    backend: Option<String>,
    url: Option<String>,
    anon_key: Option<String>,
    table: Option<String>,
    timeout_seconds: Option<u64>,
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
struct RawAuthSettings {
    backend: Option<String>,
    url: Option<String>,
    anon_key: Option<String>,
    cookie_name: Option<String>,
    cookie_secure: Option<bool>,
    memory_users: Vec<MemoryUser>,
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
struct RawCacheSettings {
    enabled: Option<bool>,
    ttl_seconds: Option<u64>,
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
struct RawEditorSettings {
    idle_timeout_seconds: Option<u64>,
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
struct RawSiteSettings {
    title: Option<String>,
    show_login_button: Option<bool>,
}

fn parse_backend(value: Option<&str>, key: &'static str) -> Result<Backend, LoadError> {
    match value {
        Some(value) => value
            .parse()
            .map_err(|reason: String| LoadError::invalid(key, reason)),
        None => Ok(Backend::Memory),
    }
}

fn parse_socket_addr(host: &str, port: u16) -> Result<SocketAddr, String> {
    let candidate = format!("{host}:{port}");
    candidate
        .parse()
        .map_err(|err| format!("invalid address `{candidate}`: {err}"))
}

fn non_blank(value: Option<String>) -> Option<String> {
    value.and_then(|value| {
        let trimmed = value.trim();
        (!trimmed.is_empty()).then(|| trimmed.to_string())
    })
}

fn seconds(value: u64, key: &'static str) -> Result<Duration, LoadError> {
    if value == 0 {
        return Err(LoadError::invalid(key, "must be greater than zero"));
    }
    Ok(Duration::from_secs(value))
}
