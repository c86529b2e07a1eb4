use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

/// The six canonical fields of a certificate, as accepted by an upsert.
///
/// Produced by row validation during an import. Every upsert replaces all of
/// these on the stored record; nothing is merged.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CertificateFields {
    /// Natural key, also the public lookup key.
    pub certificate_id: String,
    pub student_name: String,
    /// Training track or subject of the internship.
    pub domain: String,
    pub internship_start: NaiveDate,
    pub internship_end: NaiveDate,
    pub issue_date: NaiveDate,
}

/// A stored certificate record, including the timestamps kept by the store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Certificate {
    pub certificate_id: String,
    pub student_name: String,
    pub domain: String,
    pub internship_start: NaiveDate,
    pub internship_end: NaiveDate,
    pub issue_date: NaiveDate,
    /// Set on the first write of this `certificate_id`, never changed afterwards.
    pub created_at: DateTime<Utc>,
    /// Refreshed on every write.
    pub updated_at: DateTime<Utc>,
}

impl Certificate {
    pub fn fields(&self) -> CertificateFields {
        CertificateFields {
            certificate_id: self.certificate_id.clone(),
            student_name: self.student_name.clone(),
            domain: self.domain.clone(),
            internship_start: self.internship_start,
            internship_end: self.internship_end,
            issue_date: self.issue_date,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn certificate_serializes_with_camel_case_keys() {
        let at = DateTime::parse_from_rfc3339("2024-02-01T09:30:00Z")
            .unwrap()
            .with_timezone(&Utc);
        let certificate = Certificate {
            certificate_id: "INT-001".to_string(),
            student_name: "Asha Rao".to_string(),
            domain: "Web Development".to_string(),
            internship_start: NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
            internship_end: NaiveDate::from_ymd_opt(2024, 3, 31).unwrap(),
            issue_date: NaiveDate::from_ymd_opt(2024, 4, 5).unwrap(),
            created_at: at,
            updated_at: at,
        };

        let json = serde_json::to_value(&certificate).unwrap();
        assert_eq!(json["certificateId"], "INT-001");
        assert_eq!(json["internshipStart"], "2024-01-01");
        assert_eq!(json["issueDate"], "2024-04-05");
        assert!(json.get("createdAt").is_some());
        assert_eq!(certificate.fields().student_name, "Asha Rao");
    }
}
