//! Configuration file handling for the work log.
//!
//! The configuration file is stored at `$WORKLOG_HOME/config.json` and contains settings for
//! the application such as the number of backup copies to keep and the location of the
//! key/value storage file.

use crate::backup::Backup;
use crate::storage::{FileStorage, SharedStorage};
use crate::{utils, Result};
use anyhow::{bail, Context};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::sync::Arc;

const APP_NAME: &str = "worklog";
const CONFIG_VERSION: u8 = 1;
const BACKUP_COPIES: u32 = 5;
const BACKUPS: &str = ".backups";
const CONFIG_JSON: &str = "config.json";
const STORAGE_JSON: &str = "storage.json";

/// The `Config` object represents the configuration of the app. You instantiate it by providing
/// the path to `$WORKLOG_HOME` and from there it loads `$WORKLOG_HOME/config.json`. It provides
/// paths to other items that are either configurable or are expected in a certain location within
/// the home directory.
#[derive(Debug, Clone)]
pub struct Config {
    root: PathBuf,
    backups: PathBuf,
    config_path: PathBuf,
    config_file: ConfigFile,
}

impl Config {
    /// Creates the home directory, its backups subdirectory and an initial `config.json` with
    /// default settings. An existing `config.json` is an error.
    ///
    /// # Errors
    /// - Returns an error if any file operations fail.
    pub async fn create(dir: impl Into<PathBuf>) -> Result<Self> {
        // Create the directory if it does not exist
        let maybe_relative = dir.into();
        utils::make_dir(&maybe_relative)
            .await
            .context("Unable to create the worklog home directory")?;

        let root = utils::canonicalize(&maybe_relative).await?;
        let config_path = root.join(CONFIG_JSON);
        if config_path.exists() {
            bail!(
                "A config file already exists at '{}'",
                config_path.display()
            )
        }

        let backups = root.join(BACKUPS);
        utils::make_dir(&backups).await?;

        let config_file = ConfigFile::default();
        config_file.save(&config_path).await?;

        Ok(Self {
            root,
            backups,
            config_path,
            config_file,
        })
    }

    /// This will
    /// - validate that the home directory exists and that the config file exists
    /// - load the config file
    /// - validate that the backups directory exists
    /// - return the loaded configuration object
    pub async fn load(worklog_home: impl Into<PathBuf>) -> Result<Self> {
        let maybe_relative = worklog_home.into();
        let root = utils::canonicalize(&maybe_relative)
            .await
            .context("The worklog home directory is missing, run 'worklog init' first")?;

        let config_path = root.join(CONFIG_JSON);
        if !config_path.is_file() {
            bail!(
                "The config file is missing '{}', run 'worklog init' first",
                config_path.display()
            )
        }
        let config_file = ConfigFile::load(&config_path).await?;

        let config = Self {
            backups: root.join(BACKUPS),
            root,
            config_path,
            config_file,
        };
        if !config.backups.is_dir() {
            bail!(
                "The backups directory is missing '{}'",
                config.backups.display()
            )
        }
        Ok(config)
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn config_path(&self) -> &Path {
        &self.config_path
    }

    pub fn backups(&self) -> &Path {
        &self.backups
    }

    pub fn backup_copies(&self) -> u32 {
        self.config_file.backup_copies
    }

    /// Returns the stored `storage_path` if it is absolute, otherwise resolves it against the
    /// home directory.
    pub fn storage_path(&self) -> PathBuf {
        let p = self.config_file.storage_path();
        if p.is_absolute() {
            return p;
        }
        self.root.join(p)
    }

    /// Opens the key/value storage file.
    pub fn storage(&self) -> SharedStorage {
        Arc::new(FileStorage::new(self.storage_path()))
    }

    /// Creates a new `Backup` instance for managing backup files.
    pub fn backup(&self) -> Backup {
        Backup::new(self)
    }
}

/// Represents the serialization and deserialization format of the configuration file.
///
/// Example configuration:
/// ```json
/// {
///   "app_name": "worklog",
///   "config_version": 1,
///   "backup_copies": 5,
///   "storage_path": "storage.json"
/// }
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, Eq, PartialEq)]
struct ConfigFile {
    /// Application name, should always be "worklog"
    app_name: String,

    /// Configuration file version
    config_version: u8,

    /// Number of pre-import backup copies to keep
    backup_copies: u32,

    /// Path to the key/value storage file (optional, relative to the home directory or absolute)
    /// Defaults to $WORKLOG_HOME/storage.json if not specified
    #[serde(skip_serializing_if = "Option::is_none")]
    storage_path: Option<PathBuf>,
}

impl Default for ConfigFile {
    fn default() -> Self {
        Self {
            app_name: APP_NAME.to_string(),
            config_version: CONFIG_VERSION,
            backup_copies: BACKUP_COPIES,
            storage_path: None,
        }
    }
}

impl ConfigFile {
    /// Loads a ConfigFile asynchronously from the specified path.
    ///
    /// # Errors
    /// Returns an error if the file cannot be read or parsed
    pub async fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = utils::read(path).await?;

        let config: ConfigFile = serde_json::from_str(&content)
            .with_context(|| format!("Failed to parse config file at {}", path.display()))?;

        anyhow::ensure!(
            config.app_name == APP_NAME,
            "Invalid app_name in config file: expected '{}', got '{}'",
            APP_NAME,
            config.app_name
        );

        Ok(config)
    }

    /// Saves the ConfigFile to the specified path.
    pub async fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let p = path.as_ref();
        let data = serde_json::to_string_pretty(self).context("Unable to serialize config")?;
        utils::write(p, data)
            .await
            .context("Unable to write config file")
    }

    #[cfg(test)]
    pub fn new(backup_copies: u32, storage_path: Option<PathBuf>) -> Self {
        Self {
            backup_copies,
            storage_path,
            ..Self::default()
        }
    }

    pub fn storage_path(&self) -> PathBuf {
        self.storage_path
            .clone()
            .unwrap_or_else(|| PathBuf::from(STORAGE_JSON))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_config_create_and_load() {
        let dir = TempDir::new().unwrap();
        let home = dir.path().join("worklog_home");

        let created = Config::create(&home).await.unwrap();
        assert!(created.backups().is_dir());
        assert!(created.config_path().is_file());
        assert_eq!(created.backup_copies(), BACKUP_COPIES);
        assert_eq!(created.storage_path(), created.root().join(STORAGE_JSON));

        let loaded = Config::load(&home).await.unwrap();
        assert_eq!(loaded.root(), created.root());
        assert_eq!(loaded.config_file, created.config_file);
    }

    #[tokio::test]
    async fn test_config_create_twice_fails() {
        let dir = TempDir::new().unwrap();
        Config::create(dir.path()).await.unwrap();
        assert!(Config::create(dir.path()).await.is_err());
    }

    #[tokio::test]
    async fn test_config_load_missing_home() {
        let dir = TempDir::new().unwrap();
        let err = Config::load(dir.path().join("nope")).await.unwrap_err();
        assert!(format!("{err:#}").contains("worklog init"));
    }

    #[tokio::test]
    async fn test_config_load_missing_config_file() {
        let dir = TempDir::new().unwrap();
        let err = Config::load(dir.path()).await.unwrap_err();
        assert!(err.to_string().contains("config file is missing"));
    }

    #[tokio::test]
    async fn test_config_file_save_and_load() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.json");
        let original = ConfigFile::new(7, Some(PathBuf::from("/var/lib/worklog/storage.json")));
        original.save(&path).await.unwrap();
        let loaded = ConfigFile::load(&path).await.unwrap();
        assert_eq!(original, loaded);
    }

    #[tokio::test]
    async fn test_config_file_load_invalid_app_name() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.json");
        let json = r#"{
            "app_name": "ledger",
            "config_version": 1,
            "backup_copies": 5
        }"#;
        utils::write(&path, json).await.unwrap();

        let result = ConfigFile::load(&path).await;
        assert!(result.is_err());
        assert!(result.unwrap_err().to_string().contains("Invalid app_name"));
    }

    #[test]
    fn test_config_file_serialization_omits_none_fields() {
        let config = ConfigFile::new(5, None);
        let json = serde_json::to_string(&config).unwrap();
        assert!(!json.contains("storage_path"));
        assert_eq!(config.storage_path(), PathBuf::from(STORAGE_JSON));
    }

    #[tokio::test]
    async fn test_absolute_storage_path_is_kept() {
        let dir = TempDir::new().unwrap();
        let mut config = Config::create(dir.path()).await.unwrap();
        let elsewhere = dir.path().join("elsewhere.json");
        config.config_file = ConfigFile::new(5, Some(elsewhere.clone()));
        assert_eq!(config.storage_path(), elsewhere);
    }
}
