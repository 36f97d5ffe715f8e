//! Export generation.
//!
//! Renders [`TableView`]s into the three products handed to callers: the
//! BOM-prefixed delimited text, the workbook, and the annotated preview.
//! Also renders previews as Markdown for terminal output.

use super::table::TableView;
use super::workbook::build_workbook;
use crate::cache::ProcessedDataCache;
use crate::error::PipelineError;
use crate::models::{CategoryResult, ExportArtifact, Preview, SummaryRow};
use std::collections::BTreeMap;

/// UTF-8 byte-order mark so spreadsheet applications detect the encoding.
pub const UTF8_BOM: &[u8] = &[0xEF, 0xBB, 0xBF];

/// Field separator of the delimited text.
pub const DELIMITER: &str = ",";

/// Render a table as BOM-prefixed comma-delimited text.
///
/// Values are written raw: no quoting, and no preview markers.
pub fn generate_delimited(table: &TableView) -> Vec<u8> {
    let mut lines = Vec::with_capacity(table.rows.len() + 1);
    lines.push(table.headers.join(DELIMITER));
    for row in &table.rows {
        let values: Vec<&str> = row.iter().map(|cell| cell.value.as_str()).collect();
        lines.push(values.join(DELIMITER));
    }

    let text = lines.join("\n");
    let mut bytes = Vec::with_capacity(UTF8_BOM.len() + text.len());
    bytes.extend_from_slice(UTF8_BOM);
    bytes.extend_from_slice(text.as_bytes());
    bytes
}

/// Build the preview: labelled rows with peak/decline markers on year cells.
pub fn generate_preview(table: &TableView) -> Preview {
    let rows = table
        .rows
        .iter()
        .map(|row| {
            table
                .headers
                .iter()
                .cloned()
                .zip(row.iter().map(|cell| cell.display()))
                .collect::<BTreeMap<String, String>>()
        })
        .collect();

    Preview {
        headers: table.headers.clone(),
        rows,
    }
}

/// Export one category: a single-sheet workbook.
pub fn export_category(result: &CategoryResult) -> Result<ExportArtifact, PipelineError> {
    let table = TableView::category(result);
    Ok(ExportArtifact {
        delimited_text: generate_delimited(&table),
        spreadsheet: build_workbook(&[&table])?,
        preview: generate_preview(&table),
    })
}

/// Export the summary: the text and preview hold the summary table; the
/// workbook adds one sheet per category rebuilt from the cache.
pub fn export_summary(
    rows: &[SummaryRow],
    cache: &ProcessedDataCache,
) -> Result<ExportArtifact, PipelineError> {
    let (demographic, economic, stock) = cache.require_all()?;
    let summary = TableView::summary(rows);
    let sheets = [
        summary.clone(),
        TableView::category(demographic),
        TableView::category(economic),
        TableView::category(stock),
    ];
    let refs: Vec<&TableView> = sheets.iter().collect();

    Ok(ExportArtifact {
        delimited_text: generate_delimited(&summary),
        spreadsheet: build_workbook(&refs)?,
        preview: generate_preview(&summary),
    })
}

/// Render a preview as a Markdown table, showing at most `max_rows` rows.
pub fn generate_markdown_table(preview: &Preview, max_rows: usize) -> String {
    let mut output = String::new();

    output.push_str(&format!("| {} |\n", preview.headers.join(" | ")));
    output.push_str(&format!(
        "|{}\n",
        preview.headers.iter().map(|_| ":---|").collect::<String>()
    ));

    for row in preview.rows.iter().take(max_rows) {
        let cells: Vec<&str> = preview
            .headers
            .iter()
            .map(|header| row.get(header).map(String::as_str).unwrap_or(""))
            .collect();
        output.push_str(&format!("| {} |\n", cells.join(" | ")));
    }

    if preview.rows.len() > max_rows {
        output.push_str(&format!(
            "\n*{} more rows not shown*\n",
            preview.rows.len() - max_rows
        ));
    }

    output
}
