//! Configuration file handling.
//!
//! The config lives at `<config dir>/emplocli/config.toml`. On first run a
//! commented template is written there, and a file left at the legacy
//! `~/.emplocli.toml` location is moved into place instead.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::Deserialize;
use thiserror::Error;
use tracing::info;

use crate::constants;

/// Connection settings for the backend.
#[derive(Clone, Deserialize)]
pub struct Config {
    /// Backend address, without a trailing slash.
    pub url: String,
    /// Database name.
    pub db: String,
    pub username: String,
    pub password: String,
    /// Request timeout in seconds.
    #[serde(default)]
    pub timeout_secs: Option<u64>,
}

impl Config {
    /// Whether the address is still the one from the bootstrap template.
    #[must_use]
    pub fn is_template(&self) -> bool {
        self.url == constants::TEMPLATE_URL
    }

    #[must_use]
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs.unwrap_or(constants::HTTP_TIMEOUT_SECS))
    }
}

impl std::fmt::Debug for Config {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Config")
            .field("url", &self.url)
            .field("db", &self.db)
            .field("username", &self.username)
            .field("timeout_secs", &self.timeout_secs)
            .finish_non_exhaustive()
    }
}

/// Errors while locating, creating or reading the config file.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("{}", constants::ERR_NO_CONFIG_DIR)]
    NoConfigDir,

    #[error("Failed to access {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("Failed to parse {}: {source}", .path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
}

/// Result of [`load_or_bootstrap`].
#[derive(Debug)]
pub enum Loaded {
    /// A usable config was read.
    Ready(Config),
    /// No config existed; a template was written at this path.
    Bootstrapped(PathBuf),
}

/// Default config file location.
///
/// # Errors
///
/// Returns [`ConfigError::NoConfigDir`] if the platform has no config directory.
pub fn default_path() -> Result<PathBuf, ConfigError> {
    dirs::config_dir()
        .map(|dir| dir.join(constants::APP_NAME).join(constants::CONFIG_FILE_NAME))
        .ok_or(ConfigError::NoConfigDir)
}

/// Location used by earlier releases, if a home directory is known.
#[must_use]
pub fn legacy_path() -> Option<PathBuf> {
    dirs::home_dir().map(|home| home.join(constants::LEGACY_CONFIG_FILE_NAME))
}

/// Reads the config at `path`, creating it first if needed.
///
/// A missing file is recovered from `legacy` when that file exists;
/// otherwise a template is written and [`Loaded::Bootstrapped`] returned.
///
/// # Errors
///
/// Returns [`ConfigError`] if a file cannot be moved, written, read or parsed.
pub fn load_or_bootstrap(path: &Path, legacy: Option<&Path>) -> Result<Loaded, ConfigError> {
    if !path.exists() {
        match legacy.filter(|legacy| legacy.is_file()) {
            Some(legacy) => relocate(legacy, path)?,
            None => {
                write_template(path)?;
                return Ok(Loaded::Bootstrapped(path.to_path_buf()));
            }
        }
    }

    load(path).map(Loaded::Ready)
}

/// Reads and parses the config at `path`.
///
/// # Errors
///
/// Returns [`ConfigError`] if the file cannot be read or parsed.
pub fn load(path: &Path) -> Result<Config, ConfigError> {
    let content = fs::read_to_string(path).map_err(|source| io_error(path, source))?;
    toml::from_str(&content).map_err(|source| ConfigError::Parse {
        path: path.to_path_buf(),
        source,
    })
}

fn write_template(path: &Path) -> Result<(), ConfigError> {
    create_parent(path)?;
    fs::write(path, constants::CONFIG_TEMPLATE).map_err(|source| io_error(path, source))?;
    secure(path)?;
    info!(path = %path.display(), "wrote config template");
    Ok(())
}

/// Moves the legacy file to `to`, copying across filesystems if needed.
fn relocate(from: &Path, to: &Path) -> Result<(), ConfigError> {
    create_parent(to)?;
    if fs::rename(from, to).is_err() {
        fs::copy(from, to).map_err(|source| io_error(to, source))?;
        fs::remove_file(from).map_err(|source| io_error(from, source))?;
    }
    secure(to)?;
    info!(from = %from.display(), to = %to.display(), "relocated config file");
    Ok(())
}

fn create_parent(path: &Path) -> Result<(), ConfigError> {
    match path.parent() {
        Some(dir) if !dir.as_os_str().is_empty() => {
            fs::create_dir_all(dir).map_err(|source| io_error(dir, source))
        }
        _ => Ok(()),
    }
}

/// Restricts the file to its owner (chmod 600); it holds a password.
#[cfg(unix)]
fn secure(path: &Path) -> Result<(), ConfigError> {
    use std::os::unix::fs::PermissionsExt;

    let mut perms = fs::metadata(path)
        .map_err(|source| io_error(path, source))?
        .permissions();
    perms.set_mode(0o600);
    fs::set_permissions(path, perms).map_err(|source| io_error(path, source))
}

#[cfg(not(unix))]
fn secure(_path: &Path) -> Result<(), ConfigError> {
    Ok(())
}

fn io_error(path: &Path, source: io::Error) -> ConfigError {
    ConfigError::Io {
        path: path.to_path_buf(),
        source,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r#"
url = "https://hr.acme.test"
db = "acme"
username = "jane"
password = "secret"
"#;

    #[test]
    fn test_bootstrap_writes_template() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("emplocli").join("config.toml");

        let loaded = load_or_bootstrap(&path, None).unwrap();
        assert!(matches!(loaded, Loaded::Bootstrapped(ref p) if p == &path));

        let config = load(&path).unwrap();
        assert!(config.is_template());
        assert_eq!(config.timeout(), Duration::from_secs(constants::HTTP_TIMEOUT_SECS));
    }

    #[cfg(unix)]
    #[test]
    fn test_bootstrap_template_is_private() {
        use std::os::unix::fs::PermissionsExt;

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        load_or_bootstrap(&path, None).unwrap();

        let mode = fs::metadata(&path).unwrap().permissions().mode();
        assert_eq!(mode & 0o777, 0o600);
    }

    #[test]
    fn test_existing_config_is_loaded() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(&path, SAMPLE).unwrap();

        let Loaded::Ready(config) = load_or_bootstrap(&path, None).unwrap() else {
            panic!("expected a loaded config");
        };
        assert_eq!(config.url, "https://hr.acme.test");
        assert_eq!(config.db, "acme");
        assert_eq!(config.username, "jane");
        assert_eq!(config.password, "secret");
        assert!(!config.is_template());
    }

    #[test]
    fn test_legacy_config_is_relocated() {
        let dir = tempfile::tempdir().unwrap();
        let legacy = dir.path().join(".emplocli.toml");
        let path = dir.path().join("config").join("config.toml");
        fs::write(&legacy, SAMPLE).unwrap();

        let loaded = load_or_bootstrap(&path, Some(&legacy)).unwrap();
        assert!(matches!(loaded, Loaded::Ready(ref c) if c.db == "acme"));
        assert!(path.is_file());
        assert!(!legacy.exists());
    }

    #[test]
    fn test_legacy_ignored_when_config_exists() {
        let dir = tempfile::tempdir().unwrap();
        let legacy = dir.path().join(".emplocli.toml");
        let path = dir.path().join("config.toml");
        fs::write(&legacy, SAMPLE.replace("acme\"", "legacy\"")).unwrap();
        fs::write(&path, SAMPLE).unwrap();

        let loaded = load_or_bootstrap(&path, Some(&legacy)).unwrap();
        assert!(matches!(loaded, Loaded::Ready(ref c) if c.db == "acme"));
        assert!(legacy.exists());
    }

    #[test]
    fn test_timeout_override() {
        let config: Config = toml::from_str(&format!("{SAMPLE}timeout_secs = 5\n")).unwrap();
        assert_eq!(config.timeout(), Duration::from_secs(5));
    }

    #[test]
    fn test_parse_error_names_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(&path, "url = ").unwrap();

        let err = load(&path).unwrap_err();
        assert!(matches!(err, ConfigError::Parse { .. }));
        assert!(err.to_string().contains("config.toml"));
    }

    #[test]
    fn test_debug_hides_password() {
        let config: Config = toml::from_str(SAMPLE).unwrap();
        assert!(!format!("{config:?}").contains("secret"));
    }
}
