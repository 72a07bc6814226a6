//! The application state: the record store, the active filters and the theme, owned together
//! and handed to whoever needs them.

use crate::backup::{Backup, PRE_IMPORT};
use crate::codec::{self, Format};
use crate::error::{ErrorType, IntoResult};
use crate::filter::{self, FilterOptions, Filters, Stats};
use crate::import;
use crate::model::{EntryForm, EntryId, Theme, WorkEntry};
use crate::preferences;
use crate::storage::SharedStorage;
use crate::store::RecordStore;
use crate::{Config, Result};
use serde::Serialize;
use std::path::PathBuf;
use tracing::{debug, error, info};

/// What an import did to the store.
#[derive(Debug, Clone, Eq, PartialEq, Serialize)]
pub struct ImportSummary {
    /// The number of data rows read from the file.
    pub input_rows: usize,
    /// The number of rows that became records.
    pub imported: usize,
    /// The number of malformed rows that were dropped.
    pub discarded: usize,
    /// The snapshot of the previous records, when one was taken.
    pub backup: Option<PathBuf>,
}

pub struct App {
    storage: SharedStorage,
    store: RecordStore,
    filters: Filters,
    theme: Theme,
    backup: Option<Backup>,
}

impl std::fmt::Debug for App {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("App")
            .field("store", &self.store)
            .field("filters", &self.filters)
            .field("theme", &self.theme)
            .field("backup", &self.backup)
            .finish_non_exhaustive()
    }
}

impl App {
    /// Opens the storage described by `config` and loads the records and the theme from it.
    pub async fn open(config: &Config) -> Self {
        let mut app = Self::with_storage(config.storage()).await;
        app.backup = Some(config.backup());
        app
    }

    /// Loads an `App` from `storage` without pre-import backups.
    pub async fn with_storage(storage: SharedStorage) -> Self {
        let store = RecordStore::initialize(storage.clone()).await;
        let theme = preferences::load_theme(&storage).await;
        debug!("Loaded {} entries, theme is {theme}", store.len());
        Self {
            storage,
            store,
            filters: Filters::default(),
            theme,
            backup: None,
        }
    }

    pub fn entries(&self) -> &[WorkEntry] {
        self.store.entries()
    }

    pub fn get(&self, id: &EntryId) -> Option<&WorkEntry> {
        self.store.get(id)
    }

    pub fn filters(&self) -> &Filters {
        &self.filters
    }

    pub fn set_filters(&mut self, filters: Filters) {
        self.filters = filters;
    }

    pub fn clear_filters(&mut self) {
        self.filters.clear();
    }

    /// The entries matching the active filters. Empty while no filter is set.
    pub fn visible(&self) -> Vec<&WorkEntry> {
        filter::compute_visible(self.store.entries(), &self.filters)
    }

    pub fn options(&self) -> FilterOptions {
        filter::derive_options(self.store.entries())
    }

    pub fn stats(&self) -> Stats {
        filter::stats(self.store.entries())
    }

    /// Validates `form` against the people already in the store and appends the new entry.
    pub async fn add(&mut self, form: &EntryForm) -> Result<WorkEntry> {
        let people = self.options().people;
        let entry = form.validate(&people)?;
        Ok(self.store.add(entry).await)
    }

    pub async fn delete(&mut self, id: &EntryId) -> Option<WorkEntry> {
        self.store.delete(id).await
    }

    /// Decodes `bytes` as `format` and replaces the whole store with the rows that survive
    /// normalization.
    ///
    /// An input with no data rows changes nothing. When every row is malformed the store is left
    /// untouched and an `ErrorType::Import` error is returned. Otherwise the current records are
    /// snapshotted to the backups directory first, and a failed snapshot aborts the import.
    pub async fn import(&mut self, format: Format, bytes: &[u8]) -> Result<ImportSummary> {
        let rows = codec::decode(format, bytes)?;
        let normalized = import::normalize(&rows);
        let input_rows = normalized.input_rows();
        let discarded = normalized.discarded();
        let entries = normalized.into_entries()?;

        if entries.is_empty() {
            info!("The file has no data rows, nothing to import");
            return Ok(ImportSummary {
                input_rows,
                imported: 0,
                discarded,
                backup: None,
            });
        }

        let backup = match &self.backup {
            Some(backup) => Some(
                backup
                    .save_json(PRE_IMPORT, self.store.entries())
                    .await
                    .pub_result(ErrorType::Storage)?,
            ),
            None => None,
        };

        let imported = entries.len();
        self.store.replace_all(entries).await;
        Ok(ImportSummary {
            input_rows,
            imported,
            discarded,
            backup,
        })
    }

    /// Encodes every record as an export in `format`.
    pub fn export(&self, format: Format) -> Result<Vec<u8>> {
        codec::export(format, self.store.entries())
    }

    pub fn theme(&self) -> Theme {
        self.theme
    }

    /// Switches to `theme` and persists it. A failed write is logged and the new theme is kept.
    pub async fn set_theme(&mut self, theme: Theme) {
        self.theme = theme;
        if let Err(e) = preferences::save_theme(&self.storage, theme).await {
            error!("Error saving the theme preference: {e:#}");
        }
    }

    pub async fn toggle_theme(&mut self) -> Theme {
        let theme = self.theme.toggled();
        self.set_theme(theme).await;
        theme
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::filter::Selector;
    use crate::model::{NewEntry, PersonChoice};
    use crate::storage::MemoryStorage;
    use crate::test::TestEnv;
    use std::sync::Arc;

    async fn memory_app() -> App {
        App::with_storage(Arc::new(MemoryStorage::new())).await
    }

    fn csv(lines: &[&str]) -> Vec<u8> {
        lines.join("\n").into_bytes()
    }

    #[tokio::test]
    async fn test_visible_is_empty_until_filtered() {
        let mut app = memory_app().await;
        assert!(!app.entries().is_empty());
        assert!(app.visible().is_empty());

        let year = app.options().years[0];
        app.set_filters(Filters::new(
            Selector::Specific(year),
            Selector::Any,
            Selector::Any,
        ));
        assert!(!app.visible().is_empty());
        assert!(app.visible().iter().all(|e| e.year() == year));

        app.clear_filters();
        assert!(app.visible().is_empty());
    }

    #[tokio::test]
    async fn test_add_with_existing_and_new_person() {
        let mut app = memory_app().await;
        let existing = app.options().people[0].clone();
        let before = app.entries().len();

        let form = EntryForm {
            year: "2025".to_string(),
            month: "Junio".to_string(),
            person: PersonChoice::Existing(existing.clone()),
            work: "Cambio de ampolletas".to_string(),
        };
        let added = app.add(&form).await.unwrap();
        assert_eq!(added.person(), existing);
        assert_eq!(app.entries().len(), before + 1);
        assert_eq!(app.entries().last(), Some(&added));

        let form = EntryForm {
            person: PersonChoice::New("  Nueva Persona ".to_string()),
            ..form
        };
        app.add(&form).await.unwrap();
        assert!(app.options().people.contains(&"Nueva Persona".to_string()));
    }

    #[tokio::test]
    async fn test_add_unknown_existing_person_is_rejected() {
        let mut app = memory_app().await;
        let before = app.entries().len();
        let form = EntryForm {
            year: "2025".to_string(),
            month: "Junio".to_string(),
            person: PersonChoice::Existing("Nadie".to_string()),
            work: "Aseo".to_string(),
        };
        let err = app.add(&form).await.unwrap_err();
        assert_eq!(err.downcast_ref::<ErrorType>(), Some(&ErrorType::Validation));
        assert_eq!(app.entries().len(), before);
    }

    #[tokio::test]
    async fn test_import_replaces_store() {
        let mut app = memory_app().await;
        let data = csv(&[
            "Año,Mes,Persona,Trabajo Realizado",
            "2023,Enero,Juan,Pintura",
            "2023,Febrero,,Aseo",
        ]);
        let summary = app.import(Format::Csv, &data).await.unwrap();
        assert_eq!(summary.input_rows, 2);
        assert_eq!(summary.imported, 1);
        assert_eq!(summary.discarded, 1);
        assert_eq!(summary.backup, None);
        assert_eq!(app.entries().len(), 1);
        assert_eq!(
            app.entries()[0].content(),
            NewEntry::new("Enero", 2023, "Juan", "Pintura")
        );
    }

    #[tokio::test]
    async fn test_import_all_discarded_leaves_store_untouched() {
        let mut app = memory_app().await;
        let before = app.entries().to_vec();
        let data = csv(&["Year,Month,Who,What", "2023,Enero,Juan,Pintura"]);
        let err = app.import(Format::Csv, &data).await.unwrap_err();
        assert_eq!(err.downcast_ref::<ErrorType>(), Some(&ErrorType::Import));
        assert_eq!(app.entries(), before.as_slice());
    }

    #[tokio::test]
    async fn test_import_header_only_is_a_noop() {
        let mut app = memory_app().await;
        let before = app.entries().to_vec();
        let data = csv(&["Año,Mes,Persona,Trabajo Realizado"]);
        let summary = app.import(Format::Csv, &data).await.unwrap();
        assert_eq!(summary.imported, 0);
        assert_eq!(app.entries(), before.as_slice());
    }

    #[tokio::test]
    async fn test_import_takes_a_backup_first() {
        let env = TestEnv::new().await;
        let mut app = App::open(&env.config()).await;
        let before = app.entries().to_vec();
        let data = csv(&[
            "Año,Mes,Persona,Trabajo Realizado",
            "2023,Enero,Juan,Pintura",
        ]);
        let summary = app.import(Format::Csv, &data).await.unwrap();
        let backup = summary.backup.unwrap();
        assert!(backup.starts_with(env.config().backups()));

        let saved: Vec<WorkEntry> =
            serde_json::from_str(&std::fs::read_to_string(backup).unwrap()).unwrap();
        assert_eq!(saved, before);
    }

    #[tokio::test]
    async fn test_export_then_import_keeps_content() {
        let mut app = memory_app().await;
        let mut before: Vec<NewEntry> = app.entries().iter().map(WorkEntry::content).collect();
        let bytes = app.export(Format::Workbook).unwrap();
        app.import(Format::Workbook, &bytes).await.unwrap();
        let mut after: Vec<NewEntry> = app.entries().iter().map(WorkEntry::content).collect();
        before.sort();
        after.sort();
        assert_eq!(before, after);
    }

    #[tokio::test]
    async fn test_theme_changes_persist() {
        let storage: SharedStorage = Arc::new(MemoryStorage::new());
        let mut app = App::with_storage(storage.clone()).await;
        app.set_theme(Theme::Light).await;
        assert_eq!(app.toggle_theme().await, Theme::Dark);

        let reopened = App::with_storage(storage).await;
        assert_eq!(reopened.theme(), Theme::Dark);
    }

    #[tokio::test]
    async fn test_theme_save_failure_keeps_new_theme() {
        let memory = MemoryStorage::failing_writes();
        let mut app = App::with_storage(Arc::new(memory.clone())).await;
        let before = app.theme();
        let toggled = app.toggle_theme().await;
        assert_eq!(toggled, before.toggled());
        assert_eq!(app.theme(), toggled);
        assert!(memory.snapshot().is_empty());
    }
}
