//! Per-resource signup export as CSV.

use super::domain::Lead;

pub const CSV_HEADER: &str = "firstName,email,timestamp";

#[derive(Debug, Clone, PartialEq)]
pub struct CsvExport {
    pub filename: String,
    pub content: String,
}

/// Build the export for one resource. `None` means there is nothing to export.
pub fn export_signups(resource_title: &str, leads: &[Lead]) -> Option<CsvExport> {
    if leads.is_empty() {
        return None;
    }
    let mut lines = Vec::with_capacity(leads.len() + 1);
    lines.push(CSV_HEADER.to_string());
    for lead in leads {
        lines.push(format!(
            "{},{},{}",
            quote(&lead.first_name),
            quote(&lead.email),
            quote(&lead.timestamp.to_rfc3339())
        ));
    }
    Some(CsvExport {
        filename: format!("signups_{}.csv", safe_title(resource_title)),
        content: lines.join("\n"),
    })
}

fn quote(value: &str) -> String {
    format!("\"{}\"", value.replace('"', "\"\""))
}

/// ASCII alphanumerics kept, everything else becomes `_`, lowercased.
pub fn safe_title(title: &str) -> String {
    title
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() { c.to_ascii_lowercase() } else { '_' })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    fn lead(first_name: &str, email: &str) -> Lead {
        Lead {
            id: "l1".into(),
            first_name: first_name.into(),
            email: email.into(),
            resource_id: "r1".into(),
            resource_title: "Budget Sheet".into(),
            timestamp: Utc.with_ymd_and_hms(2024, 3, 1, 12, 0, 0).unwrap(),
            has_consented: true,
        }
    }

    #[test]
    fn quotes_are_doubled() {
        let out = export_signups("Budget Sheet", &[lead("Jo\"e", "joe@example.com")]).unwrap();
        let mut lines = out.content.lines();
        assert_eq!(lines.next(), Some("firstName,email,timestamp"));
        assert_eq!(lines.next(), Some("\"Jo\"\"e\",\"joe@example.com\",\"2024-03-01T12:00:00+00:00\""));
        assert_eq!(lines.next(), None);
    }

    #[test]
    fn filename_is_slugged() {
        let out = export_signups("Budget Sheet (2024)!", &[lead("A", "a@b.com")]).unwrap();
        assert_eq!(out.filename, "signups_budget_sheet__2024__.csv");
    }

    #[test]
    fn no_leads_no_file() {
        assert!(export_signups("Anything", &[]).is_none());
    }
}
