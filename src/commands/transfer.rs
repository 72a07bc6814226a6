//! Moving the records in and out of spreadsheet files.

use crate::app::{App, ImportSummary};
use crate::args::{ExportArgs, ImportArgs};
use crate::codec::Format;
use crate::commands::{plural, Out};
use crate::error::{ErrorType, IntoResult};
use crate::{utils, Config, Result};
use std::path::PathBuf;
use tracing::warn;

/// Replaces all records with the well-formed rows of the spreadsheet at `args.file()`.
///
/// The format is chosen by file extension. The previous records are saved to the backups
/// directory before they are replaced.
///
/// # Errors
/// - `ErrorType::Codec` when the file type is not supported or the file cannot be decoded.
/// - `ErrorType::Import` when the file cannot be read or none of its rows are usable.
pub async fn import(config: Config, args: ImportArgs) -> Result<Out<ImportSummary>> {
    let format = Format::from_path(args.file())?;
    let bytes = utils::read_bytes(args.file())
        .await
        .pub_result(ErrorType::Import)?;

    let mut app = App::open(&config).await;
    let summary = app.import(format, &bytes).await?;

    if summary.imported == 0 {
        return Ok(Out::new(
            format!("'{}' has no data rows, nothing was imported", args.file().display()),
            summary,
        ));
    }
    if summary.discarded > 0 {
        warn!(
            "Skipped {} without a year, month, person and work performed",
            plural(summary.discarded, "row", "rows")
        );
    }
    let mut message = format!(
        "Imported {} from '{}', replacing all previous records",
        plural(summary.imported, "record", "records"),
        args.file().display()
    );
    if let Some(backup) = &summary.backup {
        message.push_str(&format!(". The previous records were saved to '{}'", backup.display()));
    }
    Ok(Out::new(message, summary))
}

/// Writes every record to the spreadsheet at `args.output()`, sorted by year and then month.
pub async fn export(config: Config, args: ExportArgs) -> Result<Out<PathBuf>> {
    let path = args.output();
    let format = Format::from_path(&path)?;

    let app = App::open(&config).await;
    let bytes = app.export(format)?;
    utils::write(&path, bytes)
        .await
        .pub_result(ErrorType::Storage)?;

    Ok(Out::new(
        format!(
            "Exported {} to '{}'",
            plural(app.entries().len(), "record", "records"),
            path.display()
        ),
        path,
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{NewEntry, WorkEntry};
    use crate::test::TestEnv;

    fn contents(entries: &[WorkEntry]) -> Vec<NewEntry> {
        let mut contents: Vec<NewEntry> = entries.iter().map(WorkEntry::content).collect();
        contents.sort();
        contents
    }

    #[tokio::test]
    async fn test_export_then_import_round_trip() {
        let env = TestEnv::new().await;
        let before = contents(env.app().await.entries());

        let output = env.path("report.xlsx");
        let out = export(env.config(), ExportArgs::new(Some(output.clone())))
            .await
            .unwrap();
        assert_eq!(out.structure(), Some(&output));
        assert!(output.is_file());

        let out = import(env.config(), ImportArgs::new(&output)).await.unwrap();
        let summary = out.structure().unwrap();
        assert_eq!(summary.imported, before.len());
        assert_eq!(summary.discarded, 0);
        assert!(summary.backup.as_ref().unwrap().is_file());
        assert_eq!(contents(env.app().await.entries()), before);
    }

    #[tokio::test]
    async fn test_import_csv_replaces_records() {
        let env = TestEnv::new().await;
        let file = env.write_file(
            "import.csv",
            "ano,MES, Persona ,Trabajo\n2022,Julio,Ana,Aseo\n2022,Julio,,Pintura\n",
        );
        let out = import(env.config(), ImportArgs::new(&file)).await.unwrap();
        assert_eq!(out.structure().unwrap().imported, 1);
        assert_eq!(out.structure().unwrap().discarded, 1);

        let app = env.app().await;
        assert_eq!(app.entries().len(), 1);
        assert_eq!(
            app.entries()[0].content(),
            NewEntry::new("Julio", 2022, "Ana", "Aseo")
        );
    }

    #[tokio::test]
    async fn test_import_with_no_usable_rows_changes_nothing() {
        let env = TestEnv::new().await;
        let before = env.app().await.entries().to_vec();
        let file = env.write_file("bad.csv", "Nombre,Fecha\nAna,2022\n");
        let err = import(env.config(), ImportArgs::new(&file))
            .await
            .unwrap_err();
        assert_eq!(err.downcast_ref::<ErrorType>(), Some(&ErrorType::Import));
        assert!(format!("{err:#}").contains("Trabajo Realizado"));
        assert_eq!(env.app().await.entries(), before.as_slice());
    }

    #[tokio::test]
    async fn test_unsupported_extension_is_a_codec_error() {
        let env = TestEnv::new().await;
        let file = env.write_file("notes.txt", "hello");
        let err = import(env.config(), ImportArgs::new(&file))
            .await
            .unwrap_err();
        assert_eq!(err.downcast_ref::<ErrorType>(), Some(&ErrorType::Codec));

        let err = export(
            env.config(),
            ExportArgs::new(Some(env.path("report.pdf"))),
        )
        .await
        .unwrap_err();
        assert_eq!(err.downcast_ref::<ErrorType>(), Some(&ErrorType::Codec));
        assert!(!env.path("report.pdf").exists());
    }
}
