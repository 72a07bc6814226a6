use crate::app::App;
use crate::commands::Out;
use crate::error::{ErrorType, IntoResult};
use crate::{Config, Result};
use anyhow::Context;
use std::path::Path;

/// Creates the worklog home directory, its backups subdirectory and an initial `config.json`,
/// then opens the storage once so that it is seeded with the default records.
///
/// # Arguments
/// - `worklog_home` - The directory that will be the root of data directory, e.g.
///   `$HOME/worklog`
///
/// # Errors
/// - Returns an error if any file operations fail or if the directory is already initialized.
pub async fn init(worklog_home: &Path) -> Result<Out<()>> {
    let config = Config::create(worklog_home)
        .await
        .context("Unable to create the data directory and configs")
        .pub_result(ErrorType::Config)?;
    let app = App::open(&config).await;
    Ok(format!(
        "Successfully created the worklog directory at '{}' with {} records",
        config.root().display(),
        app.entries().len()
    )
    .into())
}
