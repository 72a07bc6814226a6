//! Turns loosely-typed spreadsheet rows into validated work records.
//!
//! Header matching ignores case and surrounding whitespace, and each field accepts a short list
//! of aliases. Rows that are missing a field, or whose year is not an integer, are discarded.

use crate::codec::RawRow;
use crate::error::ErrorType;
use crate::model::{parse_year, NewEntry, WorkEntry};
use crate::Result;
use anyhow::anyhow;
use std::collections::HashMap;
use tracing::{debug, trace};

const YEAR_ALIASES: &[&str] = &["año", "ano"];
const MONTH_ALIASES: &[&str] = &["mes"];
const PERSON_ALIASES: &[&str] = &["persona"];
const WORK_ALIASES: &[&str] = &["trabajo realizado", "trabajo"];

/// The outcome of normalizing a batch of imported rows.
#[derive(Debug, Clone, Default)]
pub struct Normalized {
    entries: Vec<WorkEntry>,
    input_rows: usize,
}

impl Normalized {
    /// The surviving rows, each with a freshly generated id.
    pub fn entries(&self) -> &[WorkEntry] {
        &self.entries
    }

    pub fn input_rows(&self) -> usize {
        self.input_rows
    }

    pub fn discarded(&self) -> usize {
        self.input_rows - self.entries.len()
    }

    /// True when there was input but none of it survived.
    pub fn all_discarded(&self) -> bool {
        self.input_rows > 0 && self.entries.is_empty()
    }

    /// Returns the surviving entries.
    ///
    /// # Errors
    /// Returns an `ErrorType::Import` error naming the expected headers when every row was
    /// discarded. An empty input is not an error and yields an empty list.
    pub fn into_entries(self) -> Result<Vec<WorkEntry>> {
        if self.all_discarded() {
            let err = anyhow!(
                "No data could be imported from {} row{}. Check that the spreadsheet has columns \
                with the headers 'Año' (or 'Ano'), 'Mes', 'Persona' and 'Trabajo Realizado'.",
                self.input_rows,
                if self.input_rows == 1 { "" } else { "s" }
            );
            return Err(err.context(ErrorType::Import));
        }
        Ok(self.entries)
    }
}

/// Normalizes every row in `rows`, dropping the malformed ones. Input order is preserved.
pub fn normalize(rows: &[RawRow]) -> Normalized {
    let entries: Vec<WorkEntry> = rows
        .iter()
        .enumerate()
        .filter_map(|(ix, row)| {
            let entry = normalize_row(row);
            if entry.is_none() {
                trace!("Discarding imported row {}", ix + 1);
            }
            entry
        })
        .map(WorkEntry::new)
        .collect();
    debug!("Normalized {} of {} imported rows", entries.len(), rows.len());
    Normalized {
        entries,
        input_rows: rows.len(),
    }
}

/// Resolves the four fields of a single row. Returns `None` if the row must be discarded.
pub fn normalize_row(row: &RawRow) -> Option<NewEntry> {
    // Later columns overwrite earlier ones that normalize to the same key.
    let mut cells = HashMap::new();
    for (header, cell) in row.iter() {
        cells.insert(header.trim().to_lowercase(), cell);
    }

    let find = |aliases: &[&str]| -> String {
        aliases
            .iter()
            .find_map(|alias| cells.get(*alias))
            .map(|cell| cell.to_string())
            .unwrap_or_default()
    };

    let year = find(YEAR_ALIASES);
    let person = find(PERSON_ALIASES).trim().to_string();
    let month = find(MONTH_ALIASES);
    let work = find(WORK_ALIASES);

    if person.is_empty() || work.is_empty() || month.is_empty() || year.is_empty() {
        return None;
    }
    let year = parse_year(&year)?;

    Some(NewEntry {
        month,
        year,
        person,
        work,
    })
}
