//! These structs provide the CLI interface for the worklog CLI.

use crate::codec::EXPORT_FILE_NAME;
use crate::filter::{Filters, Selector};
use crate::model::{EntryForm, EntryId, PersonChoice, Theme, MONTHS_ORDER};
use chrono::{Datelike, Local};
use clap::{Parser, Subcommand};
use std::convert::Infallible;
use std::fmt::{Display, Formatter};
use std::ops::Deref;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use tracing::error;
use tracing_subscriber::filter::LevelFilter;

/// worklog: A command-line tool for keeping the maintenance work records of a condominium.
///
/// Each record says who did what, in which month of which year. Records live in a small
/// key/value file inside the worklog home directory. You can add and delete records, filter
/// them by year, month and person, see summary statistics, and move the whole set in and out
/// of spreadsheets.
///
/// Importing a spreadsheet replaces all existing records. A snapshot of the previous records
/// is saved in the backups directory first.
#[derive(Debug, Parser, Clone)]
pub struct Args {
    #[clap(flatten)]
    common: Common,

    #[command(subcommand)]
    command: Command,
}

impl Args {
    pub fn new(common: Common, command: Command) -> Self {
        Self { common, command }
    }

    pub fn common(&self) -> &Common {
        &self.common
    }

    pub fn command(&self) -> &Command {
        &self.command
    }
}

#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// Create the worklog home directory and its configuration file.
    ///
    /// This is the first command you should run. By default the home directory is
    /// $HOME/worklog, pass --worklog-home or set WORKLOG_HOME to put it somewhere else.
    Init,
    /// Add a work record.
    Add(AddArgs),
    /// Delete a work record by its ID. Nothing is deleted unless --yes is given.
    Delete(DeleteArgs),
    /// List the records matching a year, month and/or person.
    ///
    /// At least one of --year, --month or --person must be given, otherwise nothing is shown.
    List(ListArgs),
    /// Show the values that can be used with `list`.
    Options,
    /// Show the total number of records, people and active months.
    Stats,
    /// Replace all records with the rows of a spreadsheet (.xlsx, .xls, .ods or .csv).
    ///
    /// The first sheet is read and its first row must hold the headers 'Año' (or 'Ano'), 'Mes',
    /// 'Persona' and 'Trabajo Realizado'. Rows missing any of these are skipped.
    Import(ImportArgs),
    /// Write all records to a spreadsheet, sorted by year and month.
    Export(ExportArgs),
    /// Show or change the display theme.
    Theme(ThemeArgs),
}

/// Arguments common to all subcommands.
#[derive(Debug, Parser, Clone)]
pub struct Common {
    /// The logging verbosity. One of, from least to most verbose:
    /// off, error, warn, info, debug, trace
    ///
    /// This can be overridden by RUST_LOG.
    #[arg(long, default_value_t = LevelFilter::INFO)]
    log_level: LevelFilter,

    /// The directory where worklog data and configuration is held. Defaults to ~/worklog
    #[arg(long, env = "WORKLOG_HOME", default_value_t = default_worklog_home())]
    worklog_home: DisplayPath,
}

impl Common {
    pub fn new(log_level: LevelFilter, worklog_home: PathBuf) -> Self {
        Self {
            log_level,
            worklog_home: worklog_home.into(),
        }
    }

    pub fn log_level(&self) -> LevelFilter {
        self.log_level
    }

    pub fn worklog_home(&self) -> &DisplayPath {
        &self.worklog_home
    }
}

/// Args for the `worklog add` command.
#[derive(Debug, Parser, Clone)]
pub struct AddArgs {
    /// The year the work was done. Defaults to the current year.
    #[arg(long)]
    year: Option<String>,

    /// The month the work was done, e.g. Enero. Defaults to Enero.
    #[arg(long)]
    month: Option<String>,

    /// Someone who already appears in the records. See `worklog options` for the list.
    #[arg(long, conflicts_with = "new_person")]
    person: Option<String>,

    /// Someone who does not appear in the records yet.
    #[arg(long)]
    new_person: Option<String>,

    /// A description of the work performed.
    #[arg(long)]
    work: Option<String>,
}

impl AddArgs {
    pub fn new(
        year: Option<String>,
        month: Option<String>,
        person: Option<String>,
        new_person: Option<String>,
        work: Option<String>,
    ) -> Self {
        Self {
            year,
            month,
            person,
            new_person,
            work,
        }
    }

    /// Builds the entry form, filling in the current year and the first month when they were
    /// not given.
    pub fn form(&self) -> EntryForm {
        let person = match (&self.person, &self.new_person) {
            (_, Some(name)) => PersonChoice::New(name.clone()),
            (Some(name), None) => PersonChoice::Existing(name.clone()),
            (None, None) => PersonChoice::Unselected,
        };
        EntryForm {
            year: self
                .year
                .clone()
                .unwrap_or_else(|| Local::now().year().to_string()),
            month: self
                .month
                .clone()
                .unwrap_or_else(|| MONTHS_ORDER[0].to_string()),
            person,
            work: self.work.clone().unwrap_or_default(),
        }
    }
}

/// Args for the `worklog delete` command.
#[derive(Debug, Parser, Clone)]
pub struct DeleteArgs {
    /// The ID of the record to delete.
    id: String,

    /// Confirm the deletion. Without this the record is only shown.
    #[arg(long)]
    yes: bool,
}

impl DeleteArgs {
    pub fn new(id: impl Into<String>, yes: bool) -> Self {
        Self { id: id.into(), yes }
    }

    pub fn id(&self) -> EntryId {
        EntryId::from(self.id.as_str())
    }

    pub fn yes(&self) -> bool {
        self.yes
    }
}

/// Args for the `worklog list` command.
#[derive(Debug, Default, Parser, Clone)]
pub struct ListArgs {
    /// Only records from this year.
    #[arg(long)]
    year: Option<i64>,

    /// Only records from this month, e.g. Marzo.
    #[arg(long)]
    month: Option<String>,

    /// Only records for this person.
    #[arg(long)]
    person: Option<String>,
}

impl ListArgs {
    pub fn new(year: Option<i64>, month: Option<String>, person: Option<String>) -> Self {
        Self {
            year,
            month,
            person,
        }
    }

    pub fn filters(&self) -> Filters {
        Filters::new(
            Selector::from_option(self.year),
            Selector::from_option(self.month.clone()),
            Selector::from_option(self.person.clone()),
        )
    }
}

/// Args for the `worklog import` command.
#[derive(Debug, Parser, Clone)]
pub struct ImportArgs {
    /// The spreadsheet to import.
    file: PathBuf,
}

impl ImportArgs {
    pub fn new(file: impl Into<PathBuf>) -> Self {
        Self { file: file.into() }
    }

    pub fn file(&self) -> &Path {
        &self.file
    }
}

/// Args for the `worklog export` command.
#[derive(Debug, Default, Parser, Clone)]
pub struct ExportArgs {
    /// Where to write the spreadsheet. The extension chooses the format, .xlsx or .csv.
    /// Defaults to Reporte_Trabajos_Realizados.xlsx in the current directory.
    #[arg(long, short)]
    output: Option<PathBuf>,
}

impl ExportArgs {
    pub fn new(output: Option<PathBuf>) -> Self {
        Self { output }
    }

    pub fn output(&self) -> PathBuf {
        self.output
            .clone()
            .unwrap_or_else(|| PathBuf::from(EXPORT_FILE_NAME))
    }
}

/// Args for the `worklog theme` command.
#[derive(Debug, Default, Parser, Clone)]
pub struct ThemeArgs {
    /// Switch between light and dark.
    #[arg(long, conflicts_with = "set")]
    toggle: bool,

    /// Set the theme: light or dark.
    #[arg(long)]
    set: Option<Theme>,
}

impl ThemeArgs {
    pub fn new(toggle: bool, set: Option<Theme>) -> Self {
        Self { toggle, set }
    }

    pub fn toggle(&self) -> bool {
        self.toggle
    }

    pub fn set(&self) -> Option<Theme> {
        self.set
    }
}

fn default_worklog_home() -> DisplayPath {
    DisplayPath(match dirs::home_dir() {
        Some(home) => home.join("worklog"),
        None => {
            error!(
                "There was an error when trying to get your home directory. You can get around \
                this by providing --worklog-home or WORKLOG_HOME instead of relying on the \
                default worklog home directory. If you continue using the program right now, you \
                may have problems!",
            );
            PathBuf::from("worklog")
        }
    })
}

#[derive(Debug, Default, Clone, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub struct DisplayPath(PathBuf);

impl From<PathBuf> for DisplayPath {
    fn from(value: PathBuf) -> Self {
        DisplayPath(value)
    }
}

impl Deref for DisplayPath {
    type Target = Path;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl AsRef<Path> for DisplayPath {
    fn as_ref(&self) -> &Path {
        &self.0
    }
}

impl Display for DisplayPath {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0.to_string_lossy())
    }
}

impl FromStr for DisplayPath {
    type Err = Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self(PathBuf::from(s)))
    }
}

impl DisplayPath {
    pub fn path(&self) -> &Path {
        &self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> Args {
        let mut argv = vec!["worklog", "--worklog-home", "/tmp/wl"];
        argv.extend_from_slice(args);
        Args::try_parse_from(argv).unwrap()
    }

    #[test]
    fn test_add_defaults() {
        let args = parse(&["add", "--person", "Ana", "--work", "Aseo"]);
        let Command::Add(add) = args.command() else {
            panic!("expected add");
        };
        let form = add.form();
        assert_eq!(form.year, Local::now().year().to_string());
        assert_eq!(form.month, "Enero");
        assert_eq!(form.person, PersonChoice::Existing("Ana".to_string()));
        assert_eq!(form.work, "Aseo");
    }

    #[test]
    fn test_add_person_conflicts_with_new_person() {
        let argv = [
            "worklog", "add", "--person", "Ana", "--new-person", "Rosa", "--work", "Aseo",
        ];
        assert!(Args::try_parse_from(argv).is_err());
    }

    #[test]
    fn test_list_filters() {
        let args = parse(&["list", "--year", "2024", "--person", "Ana"]);
        let Command::List(list) = args.command() else {
            panic!("expected list");
        };
        assert_eq!(
            list.filters(),
            Filters::new(
                Selector::Specific(2024),
                Selector::Any,
                Selector::Specific("Ana".to_string())
            )
        );
        assert!(!ListArgs::default().filters().is_active());
    }

    #[test]
    fn test_theme_set_parses() {
        let args = parse(&["theme", "--set", "dark"]);
        let Command::Theme(theme) = args.command() else {
            panic!("expected theme");
        };
        assert_eq!(theme.set(), Some(Theme::Dark));
        assert!(Args::try_parse_from(["worklog", "theme", "--set", "sepia"]).is_err());
    }

    #[test]
    fn test_common() {
        let args = parse(&["--log-level", "debug", "stats"]);
        assert_eq!(args.common().log_level(), LevelFilter::DEBUG);
        assert_eq!(args.common().worklog_home().path(), Path::new("/tmp/wl"));
    }

    #[test]
    fn test_export_default_output() {
        assert_eq!(
            ExportArgs::default().output(),
            PathBuf::from("Reporte_Trabajos_Realizados.xlsx")
        );
    }
}
