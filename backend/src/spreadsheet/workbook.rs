use super::{rows_from_grid, CellValue, RawRow, SpreadsheetError};
use calamine::{open_workbook_auto_from_rs, Data, Reader};
use std::io::Cursor;

/// Reads the first sheet of an Excel or OpenDocument workbook.
pub(crate) fn parse_first_sheet(bytes: &[u8]) -> Result<Vec<RawRow>, SpreadsheetError> {
    let mut workbook = open_workbook_auto_from_rs(Cursor::new(bytes))
        .map_err(|e| SpreadsheetError::Unreadable(e.to_string()))?;

    let sheet = workbook
        .sheet_names()
        .first()
        .cloned()
        .ok_or(SpreadsheetError::NoSheets)?;

    let range = workbook
        .worksheet_range(&sheet)
        .map_err(|e| SpreadsheetError::Sheet {
            sheet: sheet.clone(),
            reason: e.to_string(),
        })?;

    let mut rows = range.rows();
    let Some(header_row) = rows.next() else {
        return Ok(Vec::new());
    };

    let headers = header_row.iter().map(|cell| cell_value(cell).to_text()).collect();
    let grid = rows
        .map(|row| row.iter().map(cell_value).collect())
        .collect();

    Ok(rows_from_grid(headers, grid))
}

fn cell_value(cell: &Data) -> CellValue {
    match cell {
        Data::Empty => CellValue::Empty,
        Data::String(s) => CellValue::from_text(s),
        Data::Float(f) => CellValue::Number(*f),
        Data::Int(i) => CellValue::Number(*i as f64),
        Data::Bool(b) => CellValue::Bool(*b),
        Data::DateTime(dt) => dt
            .as_datetime()
            .map(CellValue::DateTime)
            .unwrap_or_else(|| CellValue::Number(dt.as_f64())),
        Data::DateTimeIso(s) | Data::DurationIso(s) => CellValue::from_text(s),
        // Formula errors such as #N/A carry no usable value
        Data::Error(_) => CellValue::Empty,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn maps_calamine_cells() {
        assert_eq!(cell_value(&Data::Empty), CellValue::Empty);
        assert_eq!(cell_value(&Data::Int(7)), CellValue::Number(7.0));
        assert_eq!(
            cell_value(&Data::String("C-9".to_string())),
            CellValue::Text("C-9".to_string())
        );
        assert_eq!(cell_value(&Data::String(String::new())), CellValue::Empty);
        assert_eq!(
            cell_value(&Data::DateTimeIso("2024-01-15".to_string())),
            CellValue::Text("2024-01-15".to_string())
        );
    }

    #[test]
    fn rejects_bytes_that_are_not_a_workbook() {
        let err = parse_first_sheet(b"Certificate ID,Name\n1,2\n").unwrap_err();
        assert!(matches!(err, SpreadsheetError::Unreadable(_)));
    }

    /// Two sheets; only the first one holds the batch. Date columns on the first
    /// sheet are serials formatted as dates, the way Excel stores them.
    fn two_sheet_workbook() -> Vec<u8> {
        use rust_xlsxwriter::{Format, Workbook};

        let mut workbook = Workbook::new();
        let date_format = Format::new().set_num_format("yyyy-mm-dd");
        let headers = [
            "Certificate ID",
            "Student Name",
            "Internship Domain",
            "Start Date",
            "End Date",
            "Date of Issue",
        ];

        let sheet = workbook.add_worksheet();
        sheet.set_name("Certificates").unwrap();
        for (col, header) in headers.iter().enumerate() {
            sheet.write_string(0, col as u16, *header).unwrap();
        }
        sheet.write_number(1, 0, 1001).unwrap();
        sheet.write_string(1, 1, "Asha Rao").unwrap();
        sheet.write_string(1, 2, "Web Development").unwrap();
        // 2024-01-15, 2024-03-29, 2024-04-05
        sheet.write_number_with_format(1, 3, 45306, &date_format).unwrap();
        sheet.write_number_with_format(1, 4, 45380, &date_format).unwrap();
        sheet.write_number_with_format(1, 5, 45387, &date_format).unwrap();

        let archive = workbook.add_worksheet();
        archive.set_name("Archive").unwrap();
        for (col, header) in headers.iter().enumerate() {
            archive.write_string(0, col as u16, *header).unwrap();
        }
        archive.write_string(1, 0, "ARCHIVED-1").unwrap();
        archive.write_string(1, 1, "Old Entry").unwrap();

        workbook.save_to_buffer().unwrap()
    }

    #[test]
    fn reads_only_the_first_sheet_with_its_header_row() {
        let rows = parse_first_sheet(&two_sheet_workbook()).unwrap();

        assert_eq!(rows.len(), 1);
        let headers: Vec<&str> = rows[0].headers().collect();
        assert_eq!(headers[0], "Certificate ID");
        assert_eq!(headers[5], "Date of Issue");
        assert_eq!(rows[0].get("Student Name"), Some(&CellValue::Text("Asha Rao".to_string())));
    }

    #[test]
    fn date_cells_and_numeric_ids_validate() {
        use crate::import::{normalize_row, validate_row};
        use chrono::NaiveDate;

        let rows = parse_first_sheet(&two_sheet_workbook()).unwrap();
        assert!(matches!(rows[0].get("Start Date"), Some(CellValue::DateTime(_))));

        let fields = validate_row(&normalize_row(&rows[0])).unwrap();
        assert_eq!(fields.certificate_id, "1001");
        assert_eq!(fields.internship_start, NaiveDate::from_ymd_opt(2024, 1, 15).unwrap());
        assert_eq!(fields.internship_end, NaiveDate::from_ymd_opt(2024, 3, 29).unwrap());
        assert_eq!(fields.issue_date, NaiveDate::from_ymd_opt(2024, 4, 5).unwrap());
    }
}
