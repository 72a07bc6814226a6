//! Backup management for local snapshots of the work records.

use crate::model::WorkEntry;
use crate::{utils, Config, Result};
use anyhow::Context;
use chrono::Local;
use std::path::PathBuf;

/// Prefix for the snapshot taken before an import replaces the records.
pub const PRE_IMPORT: &str = "pre-import";

const EXTENSION: &str = "json";

/// Manages backup file creation and rotation.
///
/// The `Backup` struct is immutable and owns copies of the paths and settings it needs.
/// Create a new instance via `Config::backup()` or `Backup::new()`.
#[derive(Debug, Clone)]
pub struct Backup {
    backups_dir: PathBuf,
    backup_copies: u32,
}

impl Backup {
    /// Creates a new `Backup` instance from a `Config`.
    pub fn new(config: &Config) -> Self {
        Self {
            backups_dir: config.backups().to_path_buf(),
            backup_copies: config.backup_copies(),
        }
    }

    /// Saves `entries` as a pretty-printed JSON backup file.
    ///
    /// The filename format is `{prefix}.YYYY-MM-DD-NNN.json` where NNN is a sequence number.
    /// Automatically rotates old backups, keeping only `backup_copies` files.
    ///
    /// Returns the path to the created backup file.
    pub async fn save_json(&self, prefix: &str, entries: &[WorkEntry]) -> Result<PathBuf> {
        let date = today();
        let seq = self.next_sequence_number(prefix, &date).await?;
        let filename = format!("{prefix}.{date}-{seq:03}.{EXTENSION}");
        let path = self.backups_dir.join(&filename);

        let json =
            serde_json::to_string_pretty(entries).context("Failed to serialize work records")?;
        utils::write(&path, json).await?;

        self.rotate(prefix).await?;

        Ok(path)
    }

    /// Scans the backups directory for existing files with the given prefix and date,
    /// and returns the next sequence number.
    async fn next_sequence_number(&self, prefix: &str, date: &str) -> Result<u32> {
        let mut max_seq: u32 = 0;

        let mut dir = utils::read_dir(&self.backups_dir).await?;
        while let Some(entry) = dir
            .next_entry()
            .await
            .context("Failed to read directory entry")?
        {
            let file_name = entry.file_name();
            let name = file_name.to_string_lossy();
            if let Some(seq) = parse_sequence_number(&name, prefix, date) {
                max_seq = max_seq.max(seq);
            }
        }

        Ok(max_seq + 1)
    }

    /// Rotates old backup files, keeping only `backup_copies` files with the given prefix.
    async fn rotate(&self, prefix: &str) -> Result<()> {
        let mut files: Vec<(PathBuf, String)> = Vec::new();

        let mut dir = utils::read_dir(&self.backups_dir).await?;
        while let Some(entry) = dir
            .next_entry()
            .await
            .context("Failed to read directory entry")?
        {
            let name = entry.file_name().to_string_lossy().to_string();
            if is_backup_file(&name, prefix) {
                files.push((entry.path(), name));
            }
        }

        // Sort by filename (which sorts by date and sequence number due to format)
        files.sort_by(|a, b| a.1.cmp(&b.1));

        let to_delete = files.len().saturating_sub(self.backup_copies as usize);
        for (path, _) in files.into_iter().take(to_delete) {
            utils::remove(&path).await?;
        }

        Ok(())
    }
}

/// Returns today's date in YYYY-MM-DD format.
fn today() -> String {
    Local::now().format("%Y-%m-%d").to_string()
}

/// Parses the sequence number from a backup filename.
/// Returns None if the filename doesn't match the expected pattern.
fn parse_sequence_number(filename: &str, prefix: &str, date: &str) -> Option<u32> {
    let remainder = filename.strip_prefix(&format!("{prefix}.{date}-"))?;
    remainder
        .strip_suffix(&format!(".{EXTENSION}"))?
        .parse()
        .ok()
}

/// Checks if a filename is a backup file with the given prefix.
fn is_backup_file(filename: &str, prefix: &str) -> bool {
    filename.starts_with(&format!("{prefix}.")) && filename.ends_with(&format!(".{EXTENSION}"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::NewEntry;
    use tempfile::TempDir;

    #[test]
    fn test_parse_sequence_number() {
        assert_eq!(
            parse_sequence_number("pre-import.2025-12-14-001.json", PRE_IMPORT, "2025-12-14"),
            Some(1)
        );
        assert_eq!(
            parse_sequence_number("pre-import.2025-12-14-042.json", PRE_IMPORT, "2025-12-14"),
            Some(42)
        );
        // Wrong date
        assert_eq!(
            parse_sequence_number("pre-import.2025-12-13-001.json", PRE_IMPORT, "2025-12-14"),
            None
        );
        // Wrong extension
        assert_eq!(
            parse_sequence_number("pre-import.2025-12-14-001.csv", PRE_IMPORT, "2025-12-14"),
            None
        );
    }

    #[test]
    fn test_is_backup_file() {
        assert!(is_backup_file("pre-import.2025-12-14-001.json", PRE_IMPORT));
        assert!(!is_backup_file("other.2025-12-14-001.json", PRE_IMPORT));
        assert!(!is_backup_file("pre-import.2025-12-14-001", PRE_IMPORT));
    }

    #[tokio::test]
    async fn test_save_json_rotates() {
        let dir = TempDir::new().unwrap();
        let config = Config::create(dir.path()).await.unwrap();
        let backup = config.backup();
        let entries = vec![WorkEntry::new(NewEntry::new("Enero", 2024, "Ana", "Aseo"))];

        let mut paths = Vec::new();
        for _ in 0..(config.backup_copies() + 2) {
            paths.push(backup.save_json(PRE_IMPORT, &entries).await.unwrap());
        }

        let mut remaining = Vec::new();
        let mut rd = utils::read_dir(config.backups()).await.unwrap();
        while let Some(entry) = rd.next_entry().await.unwrap() {
            remaining.push(entry.path());
        }
        assert_eq!(remaining.len(), config.backup_copies() as usize);
        // The oldest snapshots are the ones removed.
        assert!(!paths[0].exists());
        assert!(!paths[1].exists());
        assert!(paths.last().unwrap().exists());

        let saved: Vec<WorkEntry> =
            serde_json::from_str(&utils::read(paths.last().unwrap()).await.unwrap()).unwrap();
        assert_eq!(saved, entries);
    }
}
