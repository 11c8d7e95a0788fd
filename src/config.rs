//! Configuration management for the Atlas server
//!
//! Values come from built-in defaults, an optional config file (`~/.atlas.*`,
//! then `atlas.*` or `.atlas.*` in the working directory), `ATLAS_*`
//! environment variables and finally command-line overrides, in increasing
//! order of precedence. The core receives them as plain resolved values.

use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;
use std::path::{Path, PathBuf};

use crate::auth::USERS_FILE_NAME;

/// Complete server configuration
#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    /// IP address to bind the HTTP listener
    pub bind_address: String,

    /// Port for the HTTP listener
    /// Environment: ATLAS_PORT
    pub port: u16,

    /// Directory served as the share root
    /// Environment: ATLAS_DATA_DIR
    pub data_dir: String,

    /// Advertised storage quota such as `2G` or `512M`; empty disables it
    /// Environment: ATLAS_QUOTA
    pub quota: String,

    /// Directory holding `users.json`
    /// Environment: ATLAS_CONFIG_DIR
    pub config_dir: String,

    /// Realm named in authentication challenges
    pub realm: String,

    #[serde(skip)]
    quota_bytes: u64,

    #[serde(skip)]
    config_file: Option<PathBuf>,
}

/// Values supplied on the command line
#[derive(Debug, Default, Clone)]
pub struct ConfigOverrides {
    pub config_file: Option<PathBuf>,
    pub port: Option<u16>,
    pub data_dir: Option<String>,
    pub quota: Option<String>,
}

impl ServerConfig {
    /// Load configuration with environment and command-line overrides
    pub fn load(overrides: &ConfigOverrides) -> Result<Self, ConfigError> {
        let mut builder = Config::builder()
            .set_default("bind_address", "0.0.0.0")?
            .set_default("port", 8080_i64)?
            .set_default("data_dir", "data")?
            .set_default("quota", "")?
            .set_default("config_dir", ".")?
            .set_default("realm", "Atlas Storage")?;

        let config_file = match &overrides.config_file {
            Some(path) => Some(path.clone()),
            None => find_config_file(&config_candidates(dirs::home_dir().as_deref())),
        };
        if let Some(path) = &config_file {
            builder = builder.add_source(File::from(path.as_path()));
        }

        let settings = builder
            .add_source(Environment::with_prefix("ATLAS").try_parsing(true))
            .set_override_option("port", overrides.port.map(i64::from))?
            .set_override_option("data_dir", overrides.data_dir.clone())?
            .set_override_option("quota", overrides.quota.clone())?
            .build()?;

        let mut config: ServerConfig = settings.try_deserialize()?;
        config.quota_bytes = parse_quota_bytes(&config.quota).map_err(ConfigError::Message)?;
        config.config_file = config_file;
        config.validate()?;
        Ok(config)
    }

    /// Validation for all configuration values
    fn validate(&self) -> Result<(), ConfigError> {
        if self.port == 0 {
            return Err(ConfigError::Message("port cannot be 0".into()));
        }

        if self.data_dir.trim().is_empty() {
            return Err(ConfigError::Message("data_dir cannot be empty".into()));
        }

        if self.config_dir.trim().is_empty() {
            return Err(ConfigError::Message("config_dir cannot be empty".into()));
        }

        if self.realm.is_empty() || self.realm.contains('"') || self.realm.chars().any(char::is_control)
        {
            return Err(ConfigError::Message(
                "realm must be non-empty printable text without quotes".into(),
            ));
        }

        Ok(())
    }

    /// Bind address and port as a socket address string
    pub fn socket_addr(&self) -> String {
        format!("{}:{}", self.bind_address, self.port)
    }

    /// Absolute path of the share root
    pub fn data_root(&self) -> PathBuf {
        let dir = Path::new(&self.data_dir);
        std::path::absolute(dir).unwrap_or_else(|_| dir.to_path_buf())
    }

    /// Path of the credential file
    pub fn users_file(&self) -> PathBuf {
        Path::new(&self.config_dir).join(USERS_FILE_NAME)
    }

    /// Quota in bytes; 0 means report the volume instead
    pub fn quota_bytes(&self) -> u64 {
        self.quota_bytes
    }

    /// The config file the values were read from, if any
    pub fn config_file(&self) -> Option<&Path> {
        self.config_file.as_deref()
    }
}

const CONFIG_EXTENSIONS: &[&str] = &["toml", "yaml", "yml", "json", "ini"];

/// Config file stems in lookup order: `~/.atlas`, then `atlas` and `.atlas`
/// in the working directory.
pub fn config_candidates(home: Option<&Path>) -> Vec<PathBuf> {
    let mut stems: Vec<PathBuf> = home.map(|h| h.join(".atlas")).into_iter().collect();
    stems.push(PathBuf::from("atlas"));
    stems.push(PathBuf::from(".atlas"));
    stems
}

/// First existing `<stem>.<ext>` among `stems`.
pub fn find_config_file(stems: &[PathBuf]) -> Option<PathBuf> {
    stems.iter().find_map(|stem| {
        CONFIG_EXTENSIONS
            .iter()
            .map(|ext| stem.with_extension(ext))
            .find(|path| path.is_file())
    })
}

/// Parses a size such as `2G`, `512M`, `64KB` or `1024` into bytes.
///
/// Suffixes are binary multiples and case-insensitive. An empty string is 0.
pub fn parse_quota_bytes(input: &str) -> Result<u64, String> {
    let s = input.trim().to_ascii_uppercase();
    if s.is_empty() {
        return Ok(0);
    }

    let s = match s.strip_suffix('B') {
        Some(rest) if rest.ends_with(['K', 'M', 'G']) => rest,
        _ => s.as_str(),
    };

    let (digits, multiplier) = match s.chars().last() {
        Some('G') => (&s[..s.len() - 1], 1u64 << 30),
        Some('M') => (&s[..s.len() - 1], 1u64 << 20),
        Some('K') => (&s[..s.len() - 1], 1u64 << 10),
        _ => (s, 1),
    };

    digits
        .trim()
        .parse::<u64>()
        .ok()
        .and_then(|n| n.checked_mul(multiplier))
        .ok_or_else(|| format!("invalid quota size: {:?}", input))
}
