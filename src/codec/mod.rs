//! Conversion between tabular rows and spreadsheet files.
//!
//! A codec only moves cells in and out of a file format. It knows nothing about work records;
//! `export_rows` builds the rows for an export and `crate::import` interprets decoded rows.

mod delimited;
mod xlsx;

use crate::error::{ErrorType, IntoResult};
use crate::model::{month_index, WorkEntry};
use crate::Result;
use anyhow::anyhow;
use std::fmt::{Display, Formatter};
use std::path::Path;

pub use delimited::CsvCodec;
pub use xlsx::XlsxCodec;

/// The file name used for exports when none is given.
pub const EXPORT_FILE_NAME: &str = "Reporte_Trabajos_Realizados.xlsx";

/// The name of the single sheet written by an export.
pub const SHEET_NAME: &str = "Trabajos";

/// The exported columns, in order.
pub const EXPORT_HEADERS: [&str; 4] = ["Mes", "Año", "Persona", "Trabajo Realizado"];

/// A single non-empty spreadsheet cell.
#[derive(Debug, Clone, PartialEq)]
pub enum Cell {
    Text(String),
    Number(f64),
    Bool(bool),
}

/// Cells render the way a spreadsheet shows them as text, so whole numbers have no fraction:
/// `Cell::Number(2023.0)` displays as `2023`.
impl Display for Cell {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Cell::Text(s) => f.write_str(s),
            Cell::Number(n) => write!(f, "{n}"),
            Cell::Bool(b) => write!(f, "{b}"),
        }
    }
}

impl From<&str> for Cell {
    fn from(value: &str) -> Self {
        Cell::Text(value.to_string())
    }
}

impl From<String> for Cell {
    fn from(value: String) -> Self {
        Cell::Text(value)
    }
}

impl From<i64> for Cell {
    fn from(value: i64) -> Self {
        // Spreadsheet numbers are f64, so integers beyond 2^53 lose precision.
        Cell::Number(value as f64)
    }
}

/// One data row keyed by column header, in column order. Empty cells are simply absent.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct RawRow(Vec<(String, Cell)>);

impl RawRow {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, header: impl Into<String>, cell: impl Into<Cell>) {
        self.0.push((header.into(), cell.into()));
    }

    /// Returns the first cell under `header`, compared exactly.
    pub fn get(&self, header: &str) -> Option<&Cell> {
        self.0.iter().find(|(h, _)| h == header).map(|(_, c)| c)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Cell)> {
        self.0.iter().map(|(h, c)| (h.as_str(), c))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl FromIterator<(String, Cell)> for RawRow {
    fn from_iter<T: IntoIterator<Item = (String, Cell)>>(iter: T) -> Self {
        Self(iter.into_iter().collect())
    }
}

/// Converts between rows and the bytes of a spreadsheet file.
pub trait SpreadsheetCodec {
    /// Reads the first sheet of `bytes`. The first row is the header row, blank rows are skipped
    /// and empty cells are left out of each `RawRow`.
    fn decode(&self, bytes: &[u8]) -> Result<Vec<RawRow>>;

    /// Writes `rows` to a single sheet named `sheet_name` with `headers` as the first row.
    fn encode(&self, sheet_name: &str, headers: &[&str], rows: &[RawRow]) -> Result<Vec<u8>>;
}

/// The spreadsheet file formats that have a codec.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum Format {
    /// Excel and OpenDocument workbooks. Anything calamine reads can be imported, but exports
    /// are always xlsx.
    Workbook,
    Csv,
}

impl Format {
    /// Chooses the format from the file extension of `path`.
    ///
    /// # Errors
    /// Returns an `ErrorType::Codec` error when no codec handles the extension.
    pub fn from_path(path: &Path) -> Result<Self> {
        let extension = path
            .extension()
            .map(|e| e.to_string_lossy().to_lowercase())
            .unwrap_or_default();
        match extension.as_str() {
            "xlsx" | "xlsm" | "xlsb" | "xls" | "ods" => Ok(Format::Workbook),
            "csv" => Ok(Format::Csv),
            _ => Err(anyhow!(
                "No spreadsheet library is available for '{}'; use an .xlsx or .csv file",
                path.display()
            ))
            .pub_result(ErrorType::Codec),
        }
    }

    pub fn codec(self) -> Box<dyn SpreadsheetCodec> {
        match self {
            Format::Workbook => Box::new(XlsxCodec),
            Format::Csv => Box::new(CsvCodec),
        }
    }
}

/// Builds the export rows for `entries`, sorted by year and then by calendar month. The sort is
/// stable and months that are not canonical sort before `Enero`.
pub fn export_rows(entries: &[WorkEntry]) -> Vec<RawRow> {
    let mut sorted: Vec<&WorkEntry> = entries.iter().collect();
    sorted.sort_by_key(|e| (e.year(), month_index(e.month()).map_or(-1, |ix| ix as i64)));
    sorted
        .into_iter()
        .map(|e| {
            let mut row = RawRow::new();
            row.push(EXPORT_HEADERS[0], e.month());
            row.push(EXPORT_HEADERS[1], e.year());
            row.push(EXPORT_HEADERS[2], e.person());
            row.push(EXPORT_HEADERS[3], e.work());
            row
        })
        .collect()
}

/// Encodes `entries` as an export in `format`.
pub fn export(format: Format, entries: &[WorkEntry]) -> Result<Vec<u8>> {
    format
        .codec()
        .encode(SHEET_NAME, &EXPORT_HEADERS, &export_rows(entries))
        .pub_result(ErrorType::Codec)
}

/// Decodes the rows of an import in `format`.
pub fn decode(format: Format, bytes: &[u8]) -> Result<Vec<RawRow>> {
    format
        .codec()
        .decode(bytes)
        .pub_result(ErrorType::Codec)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::import::normalize;
    use crate::model::NewEntry;
    use std::collections::BTreeSet;
    use std::path::PathBuf;

    fn entries() -> Vec<WorkEntry> {
        vec![
            WorkEntry::new(NewEntry::new("Marzo", 2024, "Ana", "Aseo")),
            WorkEntry::new(NewEntry::new("Enero", 2024, "Juan", "Pintura")),
            WorkEntry::new(NewEntry::new("Diciembre", 2023, "Rosa", "Jardín")),
            WorkEntry::new(NewEntry::new("Enero", 2024, "Ana", "Vidrios")),
        ]
    }

    fn tuples(entries: &[WorkEntry]) -> BTreeSet<NewEntry> {
        entries.iter().map(WorkEntry::content).collect()
    }

    #[test]
    fn test_cell_display() {
        assert_eq!(Cell::Number(2023.0).to_string(), "2023");
        assert_eq!(Cell::Number(2.5).to_string(), "2.5");
        assert_eq!(Cell::Bool(false).to_string(), "false");
        assert_eq!(Cell::from("Enero").to_string(), "Enero");
        assert_eq!(Cell::from(2024_i64), Cell::Number(2024.0));
    }

    #[test]
    fn test_export_rows_sorted_by_year_then_month() {
        let rows = export_rows(&entries());
        let order: Vec<(String, String)> = rows
            .iter()
            .map(|r| {
                (
                    r.get("Año").unwrap().to_string(),
                    r.get("Mes").unwrap().to_string(),
                )
            })
            .collect();
        assert_eq!(
            order,
            vec![
                ("2023".to_string(), "Diciembre".to_string()),
                ("2024".to_string(), "Enero".to_string()),
                ("2024".to_string(), "Enero".to_string()),
                ("2024".to_string(), "Marzo".to_string()),
            ]
        );
        // Stable: the two January 2024 rows keep their relative order.
        assert_eq!(rows[1].get("Persona"), Some(&Cell::from("Juan")));
        assert_eq!(rows[2].get("Persona"), Some(&Cell::from("Ana")));
        let headers: Vec<&str> = rows[0].iter().map(|(h, _)| h).collect();
        assert_eq!(headers, EXPORT_HEADERS.to_vec());
    }

    #[test]
    fn test_non_canonical_month_sorts_first_in_year() {
        let entries = vec![
            WorkEntry::new(NewEntry::new("Enero", 2024, "Ana", "Aseo")),
            WorkEntry::new(NewEntry::new("Sin mes", 2024, "Ana", "Aseo")),
        ];
        let rows = export_rows(&entries);
        assert_eq!(rows[0].get("Mes"), Some(&Cell::from("Sin mes")));
    }

    #[test]
    fn test_format_from_path() {
        assert_eq!(
            Format::from_path(&PathBuf::from("a/Report.XLSX")).unwrap(),
            Format::Workbook
        );
        assert_eq!(
            Format::from_path(&PathBuf::from("data.csv")).unwrap(),
            Format::Csv
        );
        let err = Format::from_path(&PathBuf::from("notes.txt")).unwrap_err();
        assert_eq!(err.downcast_ref::<ErrorType>(), Some(&ErrorType::Codec));
        assert!(Format::from_path(&PathBuf::from("no_extension")).is_err());
    }

    #[test]
    fn test_round_trip_through_each_format() {
        let original = entries();
        for format in [Format::Workbook, Format::Csv] {
            let bytes = export(format, &original).unwrap();
            let rows = decode(format, &bytes).unwrap();
            let imported = normalize(&rows).into_entries().unwrap();
            assert_eq!(tuples(&imported), tuples(&original), "{format:?}");
        }
    }
}
