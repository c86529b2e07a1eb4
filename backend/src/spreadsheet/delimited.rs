use super::{rows_from_grid, CellValue, RawRow, SpreadsheetError};
use csv::{ReaderBuilder, Trim};

const UTF8_BOM: &[u8] = &[0xEF, 0xBB, 0xBF];

/// Picks the delimiter that occurs most often in the header line, defaulting to
/// a comma when none of the candidates appear.
pub(crate) fn detect_delimiter(header_line: &str) -> u8 {
    let mut best = (b',', 0);
    for candidate in [b',', b';', b'\t', b'|'] {
        let count = header_line.matches(candidate as char).count();
        if count > best.1 {
            best = (candidate, count);
        }
    }
    best.0
}

pub(crate) fn parse(bytes: &[u8]) -> Result<Vec<RawRow>, SpreadsheetError> {
    let bytes = bytes.strip_prefix(UTF8_BOM).unwrap_or(bytes);
    let header_line = bytes.split(|&b| b == b'\n').next().unwrap_or_default();
    let delimiter = detect_delimiter(&String::from_utf8_lossy(header_line));

    let mut reader = ReaderBuilder::new()
        .delimiter(delimiter)
        .flexible(true)
        .trim(Trim::All)
        .from_reader(bytes);

    let headers: Vec<String> = reader.headers()?.iter().map(str::to_string).collect();

    let mut grid = Vec::new();
    for record in reader.records() {
        let record = record?;
        grid.push(record.iter().map(CellValue::from_text).collect());
    }

    Ok(rows_from_grid(headers, grid))
}
