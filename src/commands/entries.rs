//! Handlers that add, delete and list individual work records.

use crate::app::App;
use crate::args::{AddArgs, DeleteArgs, ListArgs};
use crate::commands::{plural, Out};
use crate::model::WorkEntry;
use crate::{Config, Result};
use tracing::debug;

/// Validates the form built from `args` and appends the new record.
///
/// An existing person must be one of the people already in the records; anybody else has to be
/// given with `--new-person`.
pub async fn add(config: Config, args: AddArgs) -> Result<Out<WorkEntry>> {
    let mut app = App::open(&config).await;
    let form = args.form();
    debug!("Adding {form:?}");
    let entry = app.add(&form).await?;
    Ok(Out::new(
        format!("Added record {} for {}", entry.id(), entry.person()),
        entry,
    ))
}

/// Deletes the record with the given ID when `--yes` is passed, otherwise only shows it.
/// An unknown ID changes nothing and is not an error.
pub async fn delete(config: Config, args: DeleteArgs) -> Result<Out<WorkEntry>> {
    let mut app = App::open(&config).await;
    let id = args.id();

    let Some(entry) = app.get(&id).cloned() else {
        return Ok(format!("There is no record with ID {id}, nothing was deleted").into());
    };

    if !args.yes() {
        return Ok(Out::new(
            format!("Record {id} was not deleted, pass --yes to confirm the deletion"),
            entry,
        ));
    }

    let removed = app.delete(&id).await.unwrap_or(entry);
    Ok(Out::new(format!("Deleted record {id}"), removed))
}

/// Lists the records that match the year, month and person given in `args`, in the order they
/// are stored. Nothing is listed when no selector is given.
pub async fn list(config: Config, args: ListArgs) -> Result<Out<Vec<WorkEntry>>> {
    let mut app = App::open(&config).await;
    app.set_filters(args.filters());
    if !app.filters().is_active() {
        return Ok(
            "Select a year, month or person with --year, --month or --person to see records"
                .into(),
        );
    }

    let visible: Vec<WorkEntry> = app.visible().into_iter().cloned().collect();
    Ok(Out::new(
        format!("Found {}", plural(visible.len(), "record", "records")),
        visible,
    ))
}
