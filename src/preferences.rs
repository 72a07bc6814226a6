//! The persisted theme preference.

use crate::model::Theme;
use crate::storage::{SharedStorage, THEME};
use crate::Result;
use anyhow::Context;
use tracing::{debug, warn};

/// Reads the stored theme. An unset, unreadable or unrecognized value falls back to the
/// terminal's own preference.
pub async fn load_theme(storage: &SharedStorage) -> Theme {
    match storage.get(THEME).await {
        Ok(Some(stored)) => match stored.parse::<Theme>() {
            Ok(theme) => return theme,
            Err(_) => debug!("Ignoring unrecognized stored theme '{stored}'"),
        },
        Ok(None) => {}
        Err(e) => warn!("Unable to read the theme preference: {e:#}"),
    }
    Theme::system_default()
}

/// Persists `theme` immediately.
pub async fn save_theme(storage: &SharedStorage, theme: Theme) -> Result<()> {
    storage
        .set(THEME, &theme.to_string())
        .await
        .context("Unable to save the theme preference")
}
