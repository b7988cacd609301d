use rust_xlsxwriter::{ColNum, RowNum, Workbook};
use tracing::warn;

use crate::error::{Result, ServiceError};

/// Longest text a single spreadsheet cell can hold, in characters.
pub const MAX_CELL_CHARS: usize = 32_767;

/// Widest column the spreadsheet format allows, in character units.
pub const MAX_COLUMN_WIDTH: usize = 255;

/// Writes a single-sheet workbook: one header row followed by `rows`, every
/// cell as text, with `widths[i]` applied to column `i`.
///
/// Empty cells are left blank rather than written as empty strings. Cells
/// longer than [`MAX_CELL_CHARS`] are cut to that length and widths are
/// capped at [`MAX_COLUMN_WIDTH`].
pub fn write_workbook<R>(
    sheet_name: &str,
    headers: &[&str],
    rows: &[R],
    widths: &[usize],
) -> Result<Vec<u8>>
where
    R: AsRef<[String]>,
{
    let mut workbook = Workbook::new();
    {
        let worksheet = workbook.add_worksheet();
        worksheet.set_name(sheet_name)?;

        for (col, header) in headers.iter().enumerate() {
            worksheet.write_string(0, column(col)?, clip_cell(header))?;
        }

        for (index, cells) in rows.iter().enumerate() {
            let row = RowNum::try_from(index + 1)
                .map_err(|_| ServiceError::Serialization("too many rows for one sheet".into()))?;
            for (col, cell) in cells.as_ref().iter().enumerate() {
                if cell.is_empty() {
                    continue;
                }
                let text = clip_cell(cell);
                if text.len() < cell.len() {
                    warn!(
                        row = index + 1,
                        column = col,
                        chars = cell.chars().count(),
                        "cell truncated to the spreadsheet limit"
                    );
                }
                worksheet.write_string(row, column(col)?, text)?;
            }
        }

        for (col, width) in widths.iter().enumerate() {
            let width = (*width).min(MAX_COLUMN_WIDTH);
            worksheet.set_column_width(column(col)?, width as f64)?;
        }
    }

    Ok(workbook.save_to_buffer()?)
}

/// The longest prefix of `cell` that fits in one spreadsheet cell.
pub fn clip_cell(cell: &str) -> &str {
    match cell.char_indices().nth(MAX_CELL_CHARS) {
        Some((end, _)) => &cell[..end],
        None => cell,
    }
}

fn column(index: usize) -> Result<ColNum> {
    ColNum::try_from(index)
        .map_err(|_| ServiceError::Serialization(format!("column {index} is out of range")))
}
