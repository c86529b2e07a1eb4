use crate::spreadsheet::{CellValue, RawRow};
use std::collections::BTreeMap;
use std::fmt;

/// The fixed set of certificate attributes a spreadsheet column can map to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum CanonicalField {
    CertificateId,
    StudentName,
    Domain,
    InternshipStart,
    InternshipEnd,
    IssueDate,
}

impl CanonicalField {
    pub const ALL: [CanonicalField; 6] = [
        CanonicalField::CertificateId,
        CanonicalField::StudentName,
        CanonicalField::Domain,
        CanonicalField::InternshipStart,
        CanonicalField::InternshipEnd,
        CanonicalField::IssueDate,
    ];

    /// The field name as it appears in JSON and in error messages.
    pub fn name(self) -> &'static str {
        match self {
            CanonicalField::CertificateId => "certificateId",
            CanonicalField::StudentName => "studentName",
            CanonicalField::Domain => "domain",
            CanonicalField::InternshipStart => "internshipStart",
            CanonicalField::InternshipEnd => "internshipEnd",
            CanonicalField::IssueDate => "issueDate",
        }
    }

    /// Resolves a raw spreadsheet header through the alias table.
    pub fn from_header(header: &str) -> Option<Self> {
        match normalize_header(header).as_str() {
            "certificateid" => Some(CanonicalField::CertificateId),
            "studentname" | "name" => Some(CanonicalField::StudentName),
            "domain" | "internshipdomain" => Some(CanonicalField::Domain),
            "internshipstart" | "startdate" => Some(CanonicalField::InternshipStart),
            "internshipend" | "enddate" => Some(CanonicalField::InternshipEnd),
            "issuedate" | "dateofissue" => Some(CanonicalField::IssueDate),
            _ => None,
        }
    }
}

impl fmt::Display for CanonicalField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Cells of one row keyed by the canonical field they were matched to.
pub type CandidateRow = BTreeMap<CanonicalField, CellValue>;

/// Comparison key for a header: whitespace, hyphens and underscores removed,
/// lowercased.
pub fn normalize_header(header: &str) -> String {
    header
        .chars()
        .filter(|c| !c.is_whitespace() && *c != '-' && *c != '_')
        .flat_map(char::to_lowercase)
        .collect()
}

/// Maps a raw row onto canonical fields.
///
/// Headers outside the alias table are dropped. When several headers resolve to
/// the same field, the right-most column wins.
pub fn normalize_row(row: &RawRow) -> CandidateRow {
    let mut candidate = CandidateRow::new();
    for (header, value) in row.iter() {
        if let Some(field) = CanonicalField::from_header(header) {
            candidate.insert(field, value.clone());
        }
    }
    candidate
}

/// Lists canonical fields claimed by more than one header, with those headers in
/// column order.
pub fn colliding_headers<'a>(
    headers: impl IntoIterator<Item = &'a str>,
) -> Vec<(CanonicalField, Vec<&'a str>)> {
    let mut claimed: BTreeMap<CanonicalField, Vec<&'a str>> = BTreeMap::new();
    for header in headers {
        if let Some(field) = CanonicalField::from_header(header) {
            claimed.entry(field).or_default().push(header);
        }
    }
    claimed
        .into_iter()
        .filter(|(_, headers)| headers.len() > 1)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(pairs: &[(&str, &str)]) -> RawRow {
        pairs.iter().map(|(h, v)| (*h, *v)).collect()
    }

    #[test]
    fn header_keys_ignore_case_spacing_and_separators() {
        assert_eq!(normalize_header("  Certificate  ID "), "certificateid");
        assert_eq!(normalize_header("internship_start"), "internshipstart");
        assert_eq!(normalize_header("Date-of-Issue"), "dateofissue");
        assert_eq!(normalize_header("STUDENT\tNAME"), "studentname");
    }

    #[test]
    fn resolves_every_alias() {
        let cases = [
            ("certificateId", CanonicalField::CertificateId),
            ("Certificate ID", CanonicalField::CertificateId),
            ("Student Name", CanonicalField::StudentName),
            ("Name", CanonicalField::StudentName),
            ("Domain", CanonicalField::Domain),
            ("Internship Domain", CanonicalField::Domain),
            ("Internship Start", CanonicalField::InternshipStart),
            ("Start Date", CanonicalField::InternshipStart),
            ("internship-end", CanonicalField::InternshipEnd),
            ("End Date", CanonicalField::InternshipEnd),
            ("Issue Date", CanonicalField::IssueDate),
            ("Date of Issue", CanonicalField::IssueDate),
        ];
        for (header, field) in cases {
            assert_eq!(CanonicalField::from_header(header), Some(field), "{header}");
        }
        assert_eq!(CanonicalField::from_header("Certificate"), None);
        assert_eq!(CanonicalField::from_header("Full Name"), None);
    }

    #[test]
    fn human_headers_match_canonical_headers() {
        let human = row(&[
            ("Certificate ID", "C-1"),
            ("Student Name", "Asha"),
            ("Internship Domain", "Web"),
            ("Start Date", "2024-01-01"),
            ("End Date", "2024-03-01"),
            ("Date of Issue", "2024-03-15"),
        ]);
        let canonical = row(&[
            ("certificateId", "C-1"),
            ("studentName", "Asha"),
            ("domain", "Web"),
            ("internshipStart", "2024-01-01"),
            ("internshipEnd", "2024-03-01"),
            ("issueDate", "2024-03-15"),
        ]);

        let normalized = normalize_row(&human);
        assert_eq!(normalized, normalize_row(&canonical));
        assert_eq!(normalized.len(), CanonicalField::ALL.len());
    }

    #[test]
    fn unmatched_headers_are_dropped() {
        let normalized = normalize_row(&row(&[("Remarks", "great"), ("Name", "Ravi")]));
        assert_eq!(normalized.len(), 1);
        assert_eq!(
            normalized.get(&CanonicalField::StudentName),
            Some(&CellValue::from("Ravi"))
        );
    }

    #[test]
    fn later_duplicate_header_wins() {
        let normalized = normalize_row(&row(&[("Name", "first"), ("Student Name", "second")]));
        assert_eq!(
            normalized.get(&CanonicalField::StudentName),
            Some(&CellValue::from("second"))
        );
    }

    #[test]
    fn reports_colliding_headers() {
        let collisions = colliding_headers(["Name", "Domain", "Student_Name", "Remarks"]);
        assert_eq!(
            collisions,
            vec![(CanonicalField::StudentName, vec!["Name", "Student_Name"])]
        );
        assert!(colliding_headers(["Certificate ID", "Name"]).is_empty());
    }
}
