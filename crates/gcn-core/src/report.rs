use serde::{Deserialize, Serialize};

use crate::error::{FailureKind, GcnError};
use crate::record::LandTitleRecord;
use crate::schema::field;

/// Fixed column order of the rendered table and of the exported spreadsheet.
pub const COLUMN_ORDER: [&str; 12] = [
    field::OWNER,
    field::PARCEL_NUMBER,
    field::MAP_SHEET,
    field::TOTAL_AREA,
    field::RESIDENTIAL_AREA,
    field::PERENNIAL_CROP_AREA,
    field::FORESTRY_RICE_AREA,
    field::REGISTRY_NUMBER,
    field::SERIAL_NUMBER,
    field::ISSUE_DATE,
    field::COMMUNE,
    field::SOURCE_FILE,
];

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Cell {
    Number(f64),
    Text(String),
}

/// A document that did not make it into the report, with a short cause.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocumentFailure {
    pub source_name: String,
    pub kind: FailureKind,
    pub message: String,
}

impl DocumentFailure {
    pub fn new(source_name: impl Into<String>, error: &GcnError) -> Self {
        Self {
            source_name: source_name.into(),
            kind: error.kind(),
            message: error.to_string(),
        }
    }
}

impl std::fmt::Display for DocumentFailure {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} ({}): {}", self.source_name, self.kind.as_str(), self.message)
    }
}

/// Successful results in input order, plus the failures that were skipped.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BatchReport {
    pub records: Vec<LandTitleRecord>,
    pub failures: Vec<DocumentFailure>,
}

impl BatchReport {
    pub fn processed(&self) -> usize {
        self.records.len() + self.failures.len()
    }

    pub fn failure_count(&self) -> usize {
        self.failures.len()
    }

    pub fn table(&self) -> ReportTable {
        ReportTable::from_records(&self.records)
    }
}

/// Header plus rows, shared by the JSON view and the spreadsheet writer so both
/// always agree on column order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReportTable {
    pub columns: Vec<String>,
    pub rows: Vec<Vec<Cell>>,
}

impl ReportTable {
    pub fn from_records(records: &[LandTitleRecord]) -> Self {
        Self {
            columns: COLUMN_ORDER.iter().map(|c| c.to_string()).collect(),
            rows: records.iter().map(LandTitleRecord::cells).collect(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::FIELD_SCHEMA;

    fn record(owner: &str, source: &str) -> LandTitleRecord {
        LandTitleRecord {
            owner: owner.into(),
            parcel_number: "1".into(),
            map_sheet: "2".into(),
            total_area: 100.0,
            residential_area: 100.0,
            perennial_crop_area: 0.0,
            forestry_rice_area: 0.0,
            registry_number: String::new(),
            serial_number: String::new(),
            issue_date: "../../2001".into(),
            commune: "Xã An Bình".into(),
            source_file: source.into(),
        }
    }

    #[test]
    fn test_column_order_extends_schema_with_provenance() {
        let schema_names: Vec<&str> = FIELD_SCHEMA.names().collect();
        assert_eq!(&COLUMN_ORDER[..11], schema_names.as_slice());
        assert_eq!(COLUMN_ORDER[11], field::SOURCE_FILE);
    }

    #[test]
    fn test_table_rows_follow_column_order() {
        let report = BatchReport {
            records: vec![record("A", "a.pdf"), record("B", "b.pdf")],
            failures: vec![],
        };
        let table = report.table();
        assert_eq!(table.columns.len(), 12);
        assert_eq!(table.rows.len(), 2);
        for row in &table.rows {
            assert_eq!(row.len(), table.columns.len());
        }
        assert_eq!(table.rows[0][0], Cell::Text("A".into()));
        assert_eq!(table.rows[0][3], Cell::Number(100.0));
        assert_eq!(table.rows[1][11], Cell::Text("b.pdf".into()));
    }

    #[test]
    fn test_failure_display_names_document() {
        let failure = DocumentFailure::new("b.pdf", &GcnError::api("quota exceeded"));
        assert_eq!(failure.kind, FailureKind::Api);
        assert_eq!(failure.to_string(), "b.pdf (api): API error: quota exceeded");
    }

    #[test]
    fn test_processed_counts_both_outcomes() {
        let report = BatchReport {
            records: vec![record("A", "a.pdf")],
            failures: vec![DocumentFailure::new(
                "b.pdf",
                &GcnError::Normalization("malformed JSON".into()),
            )],
        };
        assert_eq!(report.processed(), 2);
        assert_eq!(report.failure_count(), 1);
    }
}
