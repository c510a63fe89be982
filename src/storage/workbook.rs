// src/storage/workbook.rs

//! Workbook rendering: one sheet per field of an author bundle.

use rust_xlsxwriter::{Format, Workbook};
use serde_json::Value;

use crate::error::{AppError, Result};
use crate::models::{AuthorBundle, value_to_text};

/// Render `bundle` as an xlsx file in memory.
pub(crate) fn render_workbook(bundle: &AuthorBundle) -> Result<Vec<u8>> {
    let mut workbook = Workbook::new();
    let header = Format::new().set_bold();

    for (field, record) in &bundle.records {
        let sheet = workbook.add_worksheet();
        sheet.set_name(field.as_str())?;

        let columns = record.columns();
        for (col, name) in columns.iter().enumerate() {
            sheet.write_string_with_format(0, column_index(col)?, name, &header)?;
        }

        for (row, entry) in record.entries().iter().enumerate() {
            let row = u32::try_from(row + 1)
                .map_err(|_| AppError::validation(format!("{field} has too many rows")))?;
            for (col, name) in columns.iter().enumerate() {
                let col = column_index(col)?;
                match entry.get(name) {
                    Some(Value::Number(n)) => {
                        if let Some(n) = n.as_f64() {
                            sheet.write_number(row, col, n)?;
                        }
                    }
                    Some(value) => {
                        sheet.write_string(row, col, value_to_text(value))?;
                    }
                    None => {}
                }
            }
        }
    }

    Ok(workbook.save_to_buffer()?)
}

fn column_index(col: usize) -> Result<u16> {
    u16::try_from(col).map_err(|_| AppError::validation("too many columns for a worksheet"))
}
