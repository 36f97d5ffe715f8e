//! XLSX workbook export.

use super::table::TableView;
use crate::analysis::trend::parse_value;
use rust_xlsxwriter::{Format, Workbook, XlsxError};

/// Build a workbook with one worksheet per table, in the order given.
///
/// The first column holds region codes and is always written as text so
/// leading zeros survive. Other cells become numbers when they parse as one.
pub fn build_workbook(tables: &[&TableView]) -> Result<Vec<u8>, XlsxError> {
    let mut workbook = Workbook::new();
    let header_format = Format::new().set_bold();

    for table in tables {
        let worksheet = workbook.add_worksheet();
        worksheet.set_name(table.sheet_name.as_str())?;

        for (col, header) in table.headers.iter().enumerate() {
            worksheet.write_string_with_format(0, col as u16, header.as_str(), &header_format)?;
        }

        for (r, row) in table.rows.iter().enumerate() {
            let row_num = (r + 1) as u32;
            for (col, cell) in row.iter().enumerate() {
                let col_num = col as u16;
                match parse_value(&cell.value) {
                    Some(number) if col > 0 => {
                        worksheet.write_number(row_num, col_num, number)?;
                    }
                    _ => {
                        worksheet.write_string(row_num, col_num, cell.value.as_str())?;
                    }
                }
            }
        }

        worksheet.set_column_width(0, 14)?;
    }

    workbook.save_to_buffer()
}
