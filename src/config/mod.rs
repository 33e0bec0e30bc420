//! Configuration management.
//!
//! Values are resolved in layers, later layers winning:
//!
//! 1. Built-in defaults
//! 2. TOML config file (`--config`, or the platform default location)
//! 3. `CONTACTS_*` environment variables (after loading `.env`)
//! 4. CLI flags (applied by the binary)

use serde::{Deserialize, Serialize, Serializer};
use std::fmt;
use std::path::{Path, PathBuf};

use crate::{Error, Result};

/// Default HTTP port.
pub const DEFAULT_PORT: u16 = 3000;

/// Default lifetime of an unread flash message.
pub const DEFAULT_FLASH_TTL_SECS: u64 = 60;

/// Default number of sessions tracked by the flash store.
pub const DEFAULT_MAX_SESSIONS: usize = 10_000;

/// Default maximum request body size (form posts are tiny).
pub const DEFAULT_BODY_LIMIT: usize = 64 * 1024;

/// Main configuration for the contacts server.
#[derive(Debug, Clone, Default, Serialize)]
pub struct ContactsConfig {
    /// HTTP listener settings.
    pub server: ServerConfig,
    /// Contact store settings.
    pub storage: StorageConfig,
    /// Form validation settings.
    pub validation: ValidationConfig,
    /// Session and flash settings.
    pub session: SessionConfig,
    /// Logging settings.
    pub logging: LoggingSettings,
}

/// HTTP listener settings.
#[derive(Debug, Clone, Serialize)]
pub struct ServerConfig {
    /// Bind address.
    pub host: String,
    /// Bind port.
    pub port: u16,
    /// Maximum accepted request body, in bytes.
    pub body_limit: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: DEFAULT_PORT,
            body_limit: DEFAULT_BODY_LIMIT,
        }
    }
}

/// Contact store settings.
#[derive(Debug, Clone, Default, Serialize)]
pub struct StorageConfig {
    /// Path to the `SQLite` database. `None` means the platform default.
    pub path: Option<PathBuf>,
    /// Keep contacts in memory only (lost on exit).
    pub in_memory: bool,
}

impl StorageConfig {
    /// Returns the database path to open.
    ///
    /// Uses the configured path, then the platform data directory, then
    /// `./contacts.db`.
    #[must_use]
    pub fn resolved_path(&self) -> PathBuf {
        self.path
            .clone()
            .or_else(|| {
                directories::ProjectDirs::from("", "", "contacts")
                    .map(|dirs| dirs.data_dir().join("contacts.db"))
            })
            .unwrap_or_else(|| PathBuf::from("contacts.db"))
    }
}

/// Form validation settings.
#[derive(Debug, Clone, Default, Serialize)]
pub struct ValidationConfig {
    /// Region whose mobile-number format phones must match.
    pub phone_region: PhoneRegion,
}

/// Session and flash settings.
#[derive(Debug, Clone, Serialize)]
pub struct SessionConfig {
    /// Seconds an unread flash message stays available.
    pub flash_ttl_secs: u64,
    /// Maximum number of sessions holding a pending flash.
    pub max_sessions: usize,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            flash_ttl_secs: DEFAULT_FLASH_TTL_SECS,
            max_sessions: DEFAULT_MAX_SESSIONS,
        }
    }
}

/// Logging settings as written in the config file.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LoggingSettings {
    /// Output format: `pretty` or `json`.
    pub format: Option<String>,
    /// `EnvFilter` directive, e.g. `info,contacts=debug`.
    pub filter: Option<String>,
}

/// Regions with a known mobile phone number format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum PhoneRegion {
    /// Indonesia (`id-ID`).
    #[default]
    Indonesia,
    /// United States (`en-US`).
    UnitedStates,
    /// United Kingdom (`en-GB`).
    UnitedKingdom,
    /// Malaysia (`ms-MY`).
    Malaysia,
    /// Singapore (`en-SG`).
    Singapore,
}

impl PhoneRegion {
    /// Returns the locale tag for this region.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Indonesia => "id-ID",
            Self::UnitedStates => "en-US",
            Self::UnitedKingdom => "en-GB",
            Self::Malaysia => "ms-MY",
            Self::Singapore => "en-SG",
        }
    }

    /// Parses a locale tag. Case and `_`/`-` separators are ignored.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use contacts::PhoneRegion;
    ///
    /// assert_eq!(PhoneRegion::parse("id-ID"), Some(PhoneRegion::Indonesia));
    /// assert_eq!(PhoneRegion::parse("en_gb"), Some(PhoneRegion::UnitedKingdom));
    /// assert_eq!(PhoneRegion::parse("xx-XX"), None);
    /// ```
    #[must_use]
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().replace('_', "-").as_str() {
            "id-id" | "id" => Some(Self::Indonesia),
            "en-us" | "us" => Some(Self::UnitedStates),
            "en-gb" | "gb" | "uk" => Some(Self::UnitedKingdom),
            "ms-my" | "my" => Some(Self::Malaysia),
            "en-sg" | "sg" => Some(Self::Singapore),
            _ => None,
        }
    }
}

impl fmt::Display for PhoneRegion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for PhoneRegion {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

/// Configuration file structure (for TOML parsing).
#[derive(Debug, Deserialize, Default)]
pub struct ConfigFile {
    /// Server section.
    pub server: Option<ConfigFileServer>,
    /// Storage section.
    pub storage: Option<ConfigFileStorage>,
    /// Validation section.
    pub validation: Option<ConfigFileValidation>,
    /// Session section.
    pub session: Option<ConfigFileSession>,
    /// Logging section.
    pub logging: Option<LoggingSettings>,
}

/// Server section in config file.
#[derive(Debug, Deserialize, Default)]
pub struct ConfigFileServer {
    /// Bind address.
    pub host: Option<String>,
    /// Bind port.
    pub port: Option<u16>,
    /// Request body limit in bytes.
    pub body_limit: Option<usize>,
}

/// Storage section in config file.
#[derive(Debug, Deserialize, Default)]
pub struct ConfigFileStorage {
    /// Database path.
    pub path: Option<String>,
    /// In-memory mode.
    pub in_memory: Option<bool>,
}

/// Validation section in config file.
#[derive(Debug, Deserialize, Default)]
pub struct ConfigFileValidation {
    /// Phone region locale tag.
    pub phone_region: Option<String>,
}

/// Session section in config file.
#[derive(Debug, Deserialize, Default)]
pub struct ConfigFileSession {
    /// Flash TTL in seconds.
    pub flash_ttl_secs: Option<u64>,
    /// Flash store capacity.
    pub max_sessions: Option<usize>,
}

impl ContactsConfig {
    /// Creates a new configuration with default values.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Loads configuration from a file path.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn load_from_file(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path).map_err(|e| Error::OperationFailed {
            operation: "read_config_file".to_string(),
            cause: format!("{}: {e}", path.display()),
        })?;

        Self::from_toml_str(&contents)
    }

    /// Parses configuration from TOML text.
    ///
    /// # Errors
    ///
    /// Returns an error if the TOML is malformed or a value is invalid.
    pub fn from_toml_str(contents: &str) -> Result<Self> {
        let file: ConfigFile = toml::from_str(contents).map_err(|e| Error::OperationFailed {
            operation: "parse_config_file".to_string(),
            cause: e.to_string(),
        })?;

        Self::from_config_file(file)
    }

    /// Loads configuration from the default location.
    ///
    /// Checks the platform config dir, then `~/.config/contacts/config.toml`.
    /// Returns defaults if neither exists.
    ///
    /// # Errors
    ///
    /// Returns an error if a config file exists but cannot be parsed.
    pub fn load_default() -> Result<Self> {
        let Some(base_dirs) = directories::BaseDirs::new() else {
            return Ok(Self::default());
        };

        let candidates = [
            base_dirs.config_dir().join("contacts").join("config.toml"),
            base_dirs
                .home_dir()
                .join(".config")
                .join("contacts")
                .join("config.toml"),
        ];

        for path in candidates {
            if path.exists() {
                tracing::debug!(path = %path.display(), "Loading config file");
                return Self::load_from_file(&path);
            }
        }

        Ok(Self::default())
    }

    /// Converts a `ConfigFile` to `ContactsConfig`.
    fn from_config_file(file: ConfigFile) -> Result<Self> {
        let mut config = Self::default();

        if let Some(server) = file.server {
            if let Some(host) = server.host {
                config.server.host = host;
            }
            if let Some(port) = server.port {
                config.server.port = port;
            }
            if let Some(limit) = server.body_limit {
                config.server.body_limit = limit;
            }
        }

        if let Some(storage) = file.storage {
            config.storage.path = storage.path.map(PathBuf::from);
            config.storage.in_memory = storage.in_memory.unwrap_or(false);
        }

        if let Some(region) = file.validation.and_then(|v| v.phone_region) {
            config.validation.phone_region = parse_region(&region)?;
        }

        if let Some(session) = file.session {
            if let Some(ttl) = session.flash_ttl_secs {
                config.session.flash_ttl_secs = ttl;
            }
            if let Some(max) = session.max_sessions {
                config.session.max_sessions = max;
            }
        }

        if let Some(logging) = file.logging {
            config.logging = logging;
        }

        Ok(config)
    }

    /// Applies `CONTACTS_*` overrides from the process environment.
    ///
    /// # Errors
    ///
    /// Returns an error if an override holds an invalid value.
    pub fn apply_env_overrides(&mut self) -> Result<()> {
        self.apply_overrides_from(|key| std::env::var(key).ok())
    }

    /// Applies overrides from an arbitrary key lookup.
    ///
    /// # Errors
    ///
    /// Returns an error if an override holds an invalid value.
    pub fn apply_overrides_from<F>(&mut self, lookup: F) -> Result<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        if let Some(host) = get("CONTACTS_HOST") {
            self.server.host = host;
        }
        if let Some(port) = get("CONTACTS_PORT") {
            self.server.port = port
                .trim()
                .parse()
                .map_err(|_| Error::InvalidInput(format!("CONTACTS_PORT: '{port}' is not a port")))?;
        }
        if let Some(path) = get("CONTACTS_DATABASE") {
            self.storage.path = Some(PathBuf::from(path));
        }
        if let Some(region) = get("CONTACTS_PHONE_REGION") {
            self.validation.phone_region = parse_region(&region)?;
        }
        if let Some(ttl) = get("CONTACTS_FLASH_TTL_SECS") {
            self.session.flash_ttl_secs = ttl.trim().parse().map_err(|_| {
                Error::InvalidInput(format!("CONTACTS_FLASH_TTL_SECS: '{ttl}' is not a number"))
            })?;
        }
        if let Some(format) = get("CONTACTS_LOG_FORMAT") {
            self.logging.format = Some(format);
        }

        Ok(())
    }

    /// Returns the `host:port` string to bind.
    #[must_use]
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }
}

fn parse_region(value: &str) -> Result<PhoneRegion> {
    PhoneRegion::parse(value)
        .ok_or_else(|| Error::InvalidInput(format!("unknown phone region '{value}'")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn test_defaults() {
        let config = ContactsConfig::default();
        assert_eq!(config.server.port, 3000);
        assert_eq!(config.server.host, "0.0.0.0");
        assert_eq!(config.validation.phone_region, PhoneRegion::Indonesia);
        assert_eq!(config.session.flash_ttl_secs, DEFAULT_FLASH_TTL_SECS);
        assert!(!config.storage.in_memory);
        assert_eq!(config.bind_address(), "0.0.0.0:3000");
    }

    #[test]
    fn test_from_toml_str() {
        let config = ContactsConfig::from_toml_str(
            r#"
            [server]
            host = "127.0.0.1"
            port = 8080

            [storage]
            path = "/tmp/contacts-test.db"

            [validation]
            phone_region = "en-GB"

            [session]
            flash_ttl_secs = 5

            [logging]
            format = "json"
            "#,
        )
        .unwrap();

        assert_eq!(config.bind_address(), "127.0.0.1:8080");
        assert_eq!(
            config.storage.resolved_path(),
            PathBuf::from("/tmp/contacts-test.db")
        );
        assert_eq!(config.validation.phone_region, PhoneRegion::UnitedKingdom);
        assert_eq!(config.session.flash_ttl_secs, 5);
        assert_eq!(config.logging.format.as_deref(), Some("json"));
    }

    #[test]
    fn test_unknown_region_is_rejected() {
        let result = ContactsConfig::from_toml_str("[validation]\nphone_region = \"zz-ZZ\"\n");
        assert!(matches!(result, Err(Error::InvalidInput(_))));
    }

    #[test]
    fn test_malformed_toml() {
        let result = ContactsConfig::from_toml_str("[server\nport = ");
        assert!(matches!(result, Err(Error::OperationFailed { .. })));
    }

    #[test]
    fn test_env_overrides() {
        let env: HashMap<&str, &str> = HashMap::from([
            ("CONTACTS_PORT", "4000"),
            ("CONTACTS_PHONE_REGION", "ms_MY"),
            ("CONTACTS_DATABASE", "/var/lib/contacts.db"),
            ("CONTACTS_HOST", "   "),
        ]);
        let mut config = ContactsConfig::default();
        config
            .apply_overrides_from(|key| env.get(key).map(ToString::to_string))
            .unwrap();

        assert_eq!(config.server.port, 4000);
        assert_eq!(config.server.host, "0.0.0.0");
        assert_eq!(config.validation.phone_region, PhoneRegion::Malaysia);
        assert_eq!(
            config.storage.path.as_deref(),
            Some(Path::new("/var/lib/contacts.db"))
        );
    }

    #[test]
    fn test_invalid_port_override() {
        let mut config = ContactsConfig::default();
        let result = config.apply_overrides_from(|key| {
            (key == "CONTACTS_PORT").then(|| "eighty".to_string())
        });
        assert!(matches!(result, Err(Error::InvalidInput(_))));
    }

    #[test]
    fn test_phone_region_roundtrip() {
        for region in [
            PhoneRegion::Indonesia,
            PhoneRegion::UnitedStates,
            PhoneRegion::UnitedKingdom,
            PhoneRegion::Malaysia,
            PhoneRegion::Singapore,
        ] {
            assert_eq!(PhoneRegion::parse(region.as_str()), Some(region));
        }
    }
}
