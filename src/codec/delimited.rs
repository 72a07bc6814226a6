//! Plain CSV files, handled with the csv crate. Every cell is read back as text.

use crate::codec::{Cell, RawRow, SpreadsheetCodec};
use crate::Result;
use anyhow::{anyhow, Context};
use std::io::Cursor;

#[derive(Debug, Default, Copy, Clone)]
pub struct CsvCodec;

impl SpreadsheetCodec for CsvCodec {
    fn decode(&self, bytes: &[u8]) -> Result<Vec<RawRow>> {
        let mut rdr = csv::ReaderBuilder::new()
            .has_headers(true)
            .flexible(true)
            .from_reader(Cursor::new(bytes));

        let headers: Vec<String> = rdr
            .headers()
            .context("Unable to read the CSV header row")?
            .iter()
            .enumerate()
            .map(|(ix, h)| {
                if h.is_empty() {
                    format!("__EMPTY_{ix}")
                } else {
                    h.to_string()
                }
            })
            .collect();

        let mut rows = Vec::new();
        for (ix, result) in rdr.records().enumerate() {
            let record = result.with_context(|| format!("Bad CSV record at row {}", ix + 2))?;
            let raw: RawRow = record
                .iter()
                .zip(headers.iter())
                .filter(|(value, _)| !value.is_empty())
                .map(|(value, header)| (header.clone(), Cell::Text(value.to_string())))
                .collect();
            if !raw.is_empty() {
                rows.push(raw);
            }
        }
        Ok(rows)
    }

    /// CSV has no sheets, so `sheet_name` is ignored.
    fn encode(&self, _sheet_name: &str, headers: &[&str], rows: &[RawRow]) -> Result<Vec<u8>> {
        let mut writer = csv::Writer::from_writer(Vec::new());
        writer
            .write_record(headers)
            .context("Unable to write the CSV header row")?;
        for row in rows {
            let values: Vec<String> = headers
                .iter()
                .map(|h| row.get(h).map(Cell::to_string).unwrap_or_default())
                .collect();
            writer
                .write_record(&values)
                .context("Unable to write a CSV record")?;
        }
        writer
            .into_inner()
            .map_err(|e| anyhow!("Unable to finish the CSV output: {}", e.error()))
    }
}
