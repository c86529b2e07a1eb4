use super::normalize::{CandidateRow, CanonicalField};
use crate::spreadsheet::CellValue;
use certs_common::model::certificate::CertificateFields;
use chrono::{DateTime, Days, NaiveDate, NaiveDateTime, Utc};
use std::fmt;
use thiserror::Error;

/// Largest serial a spreadsheet can hold (9999-12-31).
const MAX_SERIAL: f64 = 2_958_465.0;

const DATETIME_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M",
];

const DATE_FORMATS: &[&str] = &[
    "%Y-%m-%d",
    "%Y/%m/%d",
    "%m/%d/%Y",
    "%d %B %Y",
    "%B %d, %Y",
    "%B %d %Y",
    "%d-%b-%Y",
    "%a %b %d %Y",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Problem {
    Required,
    Empty,
    InvalidDate,
    EndsBeforeStart,
}

impl fmt::Display for Problem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Problem::Required => f.write_str("Required"),
            Problem::Empty => f.write_str("must not be empty"),
            Problem::InvalidDate => f.write_str("Invalid date"),
            Problem::EndsBeforeStart => f.write_str("must not be before internshipStart"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldIssue {
    pub field: CanonicalField,
    pub problem: Problem,
}

impl fmt::Display for FieldIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.field, self.problem)
    }
}

/// Every problem found in one row.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub struct ValidationError {
    pub issues: Vec<FieldIssue>,
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, issue) in self.issues.iter().enumerate() {
            if i > 0 {
                f.write_str("; ")?;
            }
            write!(f, "{}", issue)?;
        }
        Ok(())
    }
}

/// Validates a normalized row and coerces it into certificate fields.
pub fn validate_row(candidate: &CandidateRow) -> Result<CertificateFields, ValidationError> {
    let mut issues = Vec::new();

    let certificate_id = required_text(candidate, CanonicalField::CertificateId, &mut issues);
    let student_name = required_text(candidate, CanonicalField::StudentName, &mut issues);
    let domain = required_text(candidate, CanonicalField::Domain, &mut issues);
    let internship_start = required_date(candidate, CanonicalField::InternshipStart, &mut issues);
    let internship_end = required_date(candidate, CanonicalField::InternshipEnd, &mut issues);
    let issue_date = required_date(candidate, CanonicalField::IssueDate, &mut issues);

    if let (Some(start), Some(end)) = (internship_start, internship_end) {
        if end < start {
            issues.push(FieldIssue {
                field: CanonicalField::InternshipEnd,
                problem: Problem::EndsBeforeStart,
            });
        }
    }

    match (
        certificate_id,
        student_name,
        domain,
        internship_start,
        internship_end,
        issue_date,
    ) {
        (
            Some(certificate_id),
            Some(student_name),
            Some(domain),
            Some(internship_start),
            Some(internship_end),
            Some(issue_date),
        ) if issues.is_empty() => Ok(CertificateFields {
            certificate_id,
            student_name,
            domain,
            internship_start,
            internship_end,
            issue_date,
        }),
        _ => Err(ValidationError { issues }),
    }
}

fn required_text(
    candidate: &CandidateRow,
    field: CanonicalField,
    issues: &mut Vec<FieldIssue>,
) -> Option<String> {
    let problem = match candidate.get(&field) {
        None => Problem::Required,
        Some(value) => {
            let text = value.to_text();
            if !text.is_empty() {
                return Some(text);
            }
            Problem::Empty
        }
    };
    issues.push(FieldIssue { field, problem });
    None
}

fn required_date(
    candidate: &CandidateRow,
    field: CanonicalField,
    issues: &mut Vec<FieldIssue>,
) -> Option<NaiveDate> {
    let problem = match candidate.get(&field) {
        None => Problem::Required,
        Some(value) => match coerce_date(value) {
            Some(date) => return Some(date),
            None => Problem::InvalidDate,
        },
    };
    issues.push(FieldIssue { field, problem });
    None
}

/// Coerces a cell into a calendar date.
///
/// Numbers, and text that parses as a number, are read as spreadsheet serial
/// dates in the 1900 date system. A bare four-digit year in text is January 1 of
/// that year.
pub fn coerce_date(value: &CellValue) -> Option<NaiveDate> {
    match value {
        CellValue::Empty | CellValue::Bool(_) => None,
        CellValue::DateTime(dt) => Some(dt.date()),
        CellValue::Number(serial) => from_serial(*serial),
        CellValue::Text(text) => parse_date_text(text.trim()),
    }
}

fn from_serial(serial: f64) -> Option<NaiveDate> {
    if !serial.is_finite() || !(1.0..=MAX_SERIAL).contains(&serial) {
        return None;
    }
    let mut days = serial.floor() as u64;
    // Serials before 1900-03-01 are offset by the phantom 1900-02-29
    if days < 60 {
        days += 1;
    }
    NaiveDate::from_ymd_opt(1899, 12, 30)?.checked_add_days(Days::new(days))
}

fn parse_date_text(text: &str) -> Option<NaiveDate> {
    if text.is_empty() {
        return None;
    }
    if text.len() == 4 && text.bytes().all(|b| b.is_ascii_digit()) {
        return text
            .parse()
            .ok()
            .and_then(|year| NaiveDate::from_ymd_opt(year, 1, 1));
    }
    if let Ok(serial) = text.parse::<f64>() {
        return from_serial(serial);
    }
    if let Ok(dt) = DateTime::parse_from_rfc3339(text) {
        return Some(dt.with_timezone(&Utc).date_naive());
    }
    DATETIME_FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(text, fmt).ok())
        .map(|dt| dt.date())
        .or_else(|| {
            DATE_FORMATS
                .iter()
                .find_map(|fmt| NaiveDate::parse_from_str(text, fmt).ok())
        })
}
