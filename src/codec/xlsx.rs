//! Workbook import with calamine and xlsx export with rust_xlsxwriter.

use crate::codec::{Cell, RawRow, SpreadsheetCodec};
use crate::Result;
use anyhow::{bail, Context};
use calamine::{open_workbook_auto_from_rs, Data, Reader};
use rust_xlsxwriter::Workbook;
use std::io::Cursor;
use tracing::debug;

#[derive(Debug, Default, Copy, Clone)]
pub struct XlsxCodec;

impl SpreadsheetCodec for XlsxCodec {
    fn decode(&self, bytes: &[u8]) -> Result<Vec<RawRow>> {
        let mut workbook = open_workbook_auto_from_rs(Cursor::new(bytes.to_vec()))
            .context("Unable to open the file as a spreadsheet workbook")?;
        let sheet_name = workbook.sheet_names().first().cloned().unwrap_or_default();
        let range = match workbook.worksheet_range_at(0) {
            Some(range) => {
                range.with_context(|| format!("Unable to read the sheet '{sheet_name}'"))?
            }
            None => bail!("The workbook does not contain any sheets"),
        };

        let mut rows = range.rows();
        let headers: Vec<String> = match rows.next() {
            Some(header_row) => header_row
                .iter()
                .enumerate()
                .map(|(ix, data)| header_name(ix, data))
                .collect(),
            None => return Ok(Vec::new()),
        };

        let mut decoded = Vec::new();
        for row in rows {
            let raw: RawRow = row
                .iter()
                .zip(headers.iter())
                .filter_map(|(data, header)| to_cell(data).map(|cell| (header.clone(), cell)))
                .collect();
            if !raw.is_empty() {
                decoded.push(raw);
            }
        }
        debug!("Decoded {} rows from sheet '{sheet_name}'", decoded.len());
        Ok(decoded)
    }

    fn encode(&self, sheet_name: &str, headers: &[&str], rows: &[RawRow]) -> Result<Vec<u8>> {
        let mut workbook = Workbook::new();
        let worksheet = workbook.add_worksheet();
        worksheet
            .set_name(sheet_name)
            .with_context(|| format!("Invalid sheet name '{sheet_name}'"))?;

        for (col, header) in headers.iter().enumerate() {
            worksheet.write_string(0, column(col)?, *header)?;
        }

        for (ix, row) in rows.iter().enumerate() {
            let r = u32::try_from(ix + 1).context("Too many rows for a worksheet")?;
            for (col, header) in headers.iter().enumerate() {
                let c = column(col)?;
                match row.get(header) {
                    Some(Cell::Text(s)) => {
                        worksheet.write_string(r, c, s)?;
                    }
                    Some(Cell::Number(n)) => {
                        worksheet.write_number(r, c, *n)?;
                    }
                    Some(Cell::Bool(b)) => {
                        worksheet.write_boolean(r, c, *b)?;
                    }
                    None => {}
                }
            }
        }

        workbook
            .save_to_buffer()
            .context("Unable to write the workbook")
    }
}

fn column(ix: usize) -> Result<u16> {
    u16::try_from(ix).context("Too many columns for a worksheet")
}

/// Header cells that are empty get a placeholder name so their column is not lost.
fn header_name(ix: usize, data: &Data) -> String {
    match data {
        Data::Empty => format!("__EMPTY_{ix}"),
        other => other.to_string(),
    }
}

fn to_cell(data: &Data) -> Option<Cell> {
    match data {
        Data::Empty => None,
        Data::String(s) if s.is_empty() => None,
        Data::String(s) => Some(Cell::Text(s.clone())),
        Data::Float(f) => Some(Cell::Number(*f)),
        Data::Int(i) => Some(Cell::Number(*i as f64)),
        Data::Bool(b) => Some(Cell::Bool(*b)),
        Data::DateTime(dt) => Some(Cell::Number(dt.as_f64())),
        other => Some(Cell::Text(other.to_string())),
    }
}
