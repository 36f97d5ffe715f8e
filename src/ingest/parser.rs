//! Record parsing.
//!
//! Input files hold one observation per line, fields separated by a caret:
//! `year^region_code^metric_code^value`.

use crate::models::{InputFile, RawRecord};
use tracing::debug;

/// Field delimiter of the input format.
pub const FIELD_DELIMITER: char = '^';

/// Parse the text of one file into records.
///
/// Blank lines are skipped. Missing trailing fields become empty strings and
/// surplus fields are ignored; malformed lines never abort the parse.
pub fn parse_records(content: &str) -> Vec<RawRecord> {
    content
        .lines()
        .filter(|line| !line.trim().is_empty())
        .map(parse_line)
        .collect()
}

fn parse_line(line: &str) -> RawRecord {
    let mut fields = line.split(FIELD_DELIMITER).map(|field| field.trim().to_string());
    let mut next = || fields.next().unwrap_or_default();

    RawRecord {
        year: next(),
        region_code: next(),
        metric_code: next(),
        value: next(),
    }
}

/// Parse every file in the order supplied and concatenate the records.
pub fn parse_files(files: &[InputFile]) -> Vec<RawRecord> {
    let mut records = Vec::new();

    for file in files {
        let parsed = parse_records(&file.content);
        let short = parsed.iter().filter(|r| r.value.is_empty()).count();
        debug!(
            "Parsed {} records from {} ({} without a value)",
            parsed.len(),
            file.name,
            short
        );
        records.extend(parsed);
    }

    records
}
