use chrono::NaiveDate;
use serde::de::{self, Deserializer};
use serde::ser::{SerializeMap, Serializer};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::{GcnError, Result};
use crate::report::Cell;
use crate::schema::{field, FieldType, FIELD_SCHEMA};

const AREA_TOLERANCE: f64 = 0.01;

/// One successfully extracted certificate, tagged with the file it came from.
///
/// Serialized as a JSON object keyed by the schema's wire names, in report column order.
#[derive(Debug, Clone, PartialEq)]
pub struct LandTitleRecord {
    pub owner: String,
    pub parcel_number: String,
    pub map_sheet: String,
    pub total_area: f64,
    pub residential_area: f64,
    pub perennial_crop_area: f64,
    pub forestry_rice_area: f64,
    pub registry_number: String,
    pub serial_number: String,
    pub issue_date: String,
    pub commune: String,
    pub source_file: String,
}

impl LandTitleRecord {
    /// Builds a record from a model response object.
    ///
    /// Every required field of [`FIELD_SCHEMA`] must be present and non-null, and every
    /// present field must match its declared type. Absent optional numbers become 0 and
    /// absent optional strings become empty.
    pub fn from_object(object: &Map<String, Value>, source_file: impl Into<String>) -> Result<Self> {
        for spec in FIELD_SCHEMA.required() {
            match object.get(spec.name) {
                None | Some(Value::Null) => {
                    return Err(GcnError::Normalization(format!(
                        "missing required field '{}'",
                        spec.name
                    )));
                }
                Some(_) => {}
            }
        }

        for spec in FIELD_SCHEMA.fields {
            let value = match object.get(spec.name) {
                None | Some(Value::Null) => continue,
                Some(v) => v,
            };
            let ok = match spec.field_type {
                FieldType::String => coerce_string(value).is_some(),
                FieldType::Number => coerce_number(value).is_some(),
            };
            if !ok {
                return Err(GcnError::Normalization(format!(
                    "field '{}' is not a valid {}: {}",
                    spec.name,
                    spec.field_type.as_str(),
                    value
                )));
            }
        }

        let text = |name: &str| -> String {
            object
                .get(name)
                .and_then(coerce_string)
                .unwrap_or_default()
        };
        let number = |name: &str| -> f64 {
            object.get(name).and_then(coerce_number).unwrap_or(0.0)
        };

        Ok(Self {
            owner: text(field::OWNER),
            parcel_number: text(field::PARCEL_NUMBER),
            map_sheet: text(field::MAP_SHEET),
            total_area: number(field::TOTAL_AREA),
            residential_area: number(field::RESIDENTIAL_AREA),
            perennial_crop_area: number(field::PERENNIAL_CROP_AREA),
            forestry_rice_area: number(field::FORESTRY_RICE_AREA),
            registry_number: text(field::REGISTRY_NUMBER),
            serial_number: text(field::SERIAL_NUMBER),
            issue_date: text(field::ISSUE_DATE),
            commune: text(field::COMMUNE),
            source_file: source_file.into(),
        })
    }

    /// Row cells in report column order.
    pub fn cells(&self) -> Vec<Cell> {
        vec![
            Cell::Text(self.owner.clone()),
            Cell::Text(self.parcel_number.clone()),
            Cell::Text(self.map_sheet.clone()),
            Cell::Number(self.total_area),
            Cell::Number(self.residential_area),
            Cell::Number(self.perennial_crop_area),
            Cell::Number(self.forestry_rice_area),
            Cell::Text(self.registry_number.clone()),
            Cell::Text(self.serial_number.clone()),
            Cell::Text(self.issue_date.clone()),
            Cell::Text(self.commune.clone()),
            Cell::Text(self.source_file.clone()),
        ]
    }

    /// Sum of the sub-areas minus the total area, when they disagree.
    pub fn area_discrepancy(&self) -> Option<f64> {
        let sum = self.residential_area + self.perennial_crop_area + self.forestry_rice_area;
        let diff = sum - self.total_area;
        (diff.abs() > AREA_TOLERANCE).then_some(diff)
    }

    /// Checks the issue date against `DD/MM/YYYY`, where day or month may be `..`.
    /// An empty date counts as valid since the field is optional.
    pub fn issue_date_is_valid(&self) -> bool {
        is_valid_issue_date(&self.issue_date)
    }
}

fn is_valid_issue_date(raw: &str) -> bool {
    let raw = raw.trim();
    if raw.is_empty() {
        return true;
    }
    let parts: Vec<&str> = raw.split('/').collect();
    let [day, month, year] = parts.as_slice() else {
        return false;
    };
    let Ok(year) = year.parse::<i32>() else {
        return false;
    };
    if year < 1900 || year > 2100 {
        return false;
    }
    let part = |s: &str| -> Option<Option<u32>> {
        if s == ".." {
            Some(None)
        } else if (1..=2).contains(&s.len()) {
            s.parse().ok().map(Some)
        } else {
            None
        }
    };
    match (part(*day), part(*month)) {
        (Some(Some(d)), Some(Some(m))) => NaiveDate::from_ymd_opt(year, m, d).is_some(),
        (Some(None), Some(Some(m))) => (1..=12).contains(&m),
        (Some(Some(d)), Some(None)) => (1..=31).contains(&d),
        (Some(None), Some(None)) => true,
        _ => false,
    }
}

fn coerce_string(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.trim().to_string()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

fn coerce_number(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => parse_localized_number(s),
        _ => None,
    }
}

/// Parses numbers written the Vietnamese way (`1.234,5`) as well as plain `1234.5`.
///
/// In Vietnamese `.` groups thousands, so a lone dot followed by exactly
/// three digits (`1.234`) reads as 1234. Any other lone dot (`75.2`, `0.125`) is a decimal
/// point.
fn parse_localized_number(raw: &str) -> Option<f64> {
    let mut s: String = raw.chars().filter(|c| !c.is_whitespace()).collect();
    for suffix in ["m²", "m2"] {
        if let Some(stripped) = s.strip_suffix(suffix) {
            s = stripped.to_string();
        }
    }
    if s.is_empty() {
        return None;
    }

    let normalized = match (s.rfind(','), s.rfind('.')) {
        (Some(comma), Some(dot)) if comma > dot => s.replace('.', "").replace(',', "."),
        (Some(_), Some(_)) => s.replace(',', ""),
        (Some(_), None) if s.matches(',').count() == 1 => s.replace(',', "."),
        (Some(_), None) => s.replace(',', ""),
        (None, Some(_)) if s.matches('.').count() > 1 => s.replace('.', ""),
        (None, Some(dot)) if is_thousands_group(&s[..dot], &s[dot + 1..]) => s.replace('.', ""),
        _ => s,
    };
    normalized.parse().ok().filter(|n: &f64| n.is_finite())
}

fn is_thousands_group(head: &str, tail: &str) -> bool {
    let digits = |s: &str| !s.is_empty() && s.chars().all(|c| c.is_ascii_digit());
    digits(head) && head.trim_start_matches('0') == head && tail.len() == 3 && digits(tail)
}

impl Serialize for LandTitleRecord {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(12))?;
        map.serialize_entry(field::OWNER, &self.owner)?;
        map.serialize_entry(field::PARCEL_NUMBER, &self.parcel_number)?;
        map.serialize_entry(field::MAP_SHEET, &self.map_sheet)?;
        map.serialize_entry(field::TOTAL_AREA, &self.total_area)?;
        map.serialize_entry(field::RESIDENTIAL_AREA, &self.residential_area)?;
        map.serialize_entry(field::PERENNIAL_CROP_AREA, &self.perennial_crop_area)?;
        map.serialize_entry(field::FORESTRY_RICE_AREA, &self.forestry_rice_area)?;
        map.serialize_entry(field::REGISTRY_NUMBER, &self.registry_number)?;
        map.serialize_entry(field::SERIAL_NUMBER, &self.serial_number)?;
        map.serialize_entry(field::ISSUE_DATE, &self.issue_date)?;
        map.serialize_entry(field::COMMUNE, &self.commune)?;
        map.serialize_entry(field::SOURCE_FILE, &self.source_file)?;
        map.end()
    }
}

impl<'de> Deserialize<'de> for LandTitleRecord {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let mut object = Map::<String, Value>::deserialize(deserializer)?;
        let source_file = match object.remove(field::SOURCE_FILE) {
            Some(Value::String(s)) => s,
            _ => String::new(),
        };
        Self::from_object(&object, source_file).map_err(de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    fn object(value: Value) -> Map<String, Value> {
        value.as_object().cloned().unwrap()
    }

    fn full() -> Value {
        json!({
            "Chủ sử dụng": "Nguyễn Văn A và vợ Trần Thị B",
            "Thửa đất số": "123",
            "Tờ bản đồ": "45",
            "Diện tích tổng (m²)": 500.0,
            "Đất ở (m²)": 200.0,
            "Đất trồng cây lâu năm (m²)": 300.0,
            "Đất rừng SX / Lúa (m²)": 0,
            "Số vào sổ": "CH01234",
            "Số phát hành (Seri)": "BA 123456",
            "Ngày kí": "15/03/2012",
            "Xã/Thị trấn": "Xã Hòa Phú"
        })
    }

    #[test]
    fn test_builds_full_record() {
        let record = LandTitleRecord::from_object(&object(full()), "a.pdf").unwrap();
        assert_eq!(record.owner, "Nguyễn Văn A và vợ Trần Thị B");
        assert_eq!(record.parcel_number, "123");
        assert_eq!(record.total_area, 500.0);
        assert_eq!(record.source_file, "a.pdf");
        assert!(record.area_discrepancy().is_none());
        assert!(record.issue_date_is_valid());
    }

    #[test]
    fn test_missing_required_field_rejected() {
        let mut value = full();
        value.as_object_mut().unwrap().remove("Thửa đất số");
        let err = LandTitleRecord::from_object(&object(value), "a.pdf").unwrap_err();
        assert!(matches!(err, GcnError::Normalization(_)));
        assert!(err.to_string().contains("Thửa đất số"));
    }

    #[test]
    fn test_null_required_field_rejected() {
        let mut value = full();
        value["Diện tích tổng (m²)"] = Value::Null;
        assert!(LandTitleRecord::from_object(&object(value), "a.pdf").is_err());
    }

    #[test]
    fn test_optional_fields_default() {
        let value = json!({
            "Chủ sử dụng": "Lê Văn C",
            "Thửa đất số": "7",
            "Diện tích tổng (m²)": 120.5
        });
        let record = LandTitleRecord::from_object(&object(value), "b.pdf").unwrap();
        assert_eq!(record.residential_area, 0.0);
        assert_eq!(record.forestry_rice_area, 0.0);
        assert_eq!(record.map_sheet, "");
        assert_eq!(record.issue_date, "");
    }

    #[test]
    fn test_wrong_numeric_type_rejected() {
        let mut value = full();
        value["Đất ở (m²)"] = json!("khoảng hai trăm");
        let err = LandTitleRecord::from_object(&object(value), "a.pdf").unwrap_err();
        assert!(err.to_string().contains("Đất ở (m²)"));

        let mut value = full();
        value["Chủ sử dụng"] = json!(["a", "b"]);
        assert!(LandTitleRecord::from_object(&object(value), "a.pdf").is_err());
    }

    #[test]
    fn test_numeric_strings_accepted() {
        let mut value = full();
        value["Diện tích tổng (m²)"] = json!("1.234,5");
        value["Đất ở (m²)"] = json!("200 m²");
        value["Thửa đất số"] = json!(123);
        let record = LandTitleRecord::from_object(&object(value), "a.pdf").unwrap();
        assert_eq!(record.total_area, 1234.5);
        assert_eq!(record.residential_area, 200.0);
        assert_eq!(record.parcel_number, "123");
    }

    #[test]
    fn test_localized_number_parsing() {
        assert_eq!(parse_localized_number("120,5"), Some(120.5));
        assert_eq!(parse_localized_number("1,234.5"), Some(1234.5));
        assert_eq!(parse_localized_number("1.234.567"), Some(1234567.0));
        assert_eq!(parse_localized_number("75.2"), Some(75.2));
        assert_eq!(parse_localized_number("1.234"), Some(1234.0));
        assert_eq!(parse_localized_number("12.500 m²"), Some(12500.0));
        assert_eq!(parse_localized_number("0.125"), Some(0.125));
        assert_eq!(parse_localized_number("120.25"), Some(120.25));
        assert_eq!(parse_localized_number(""), None);
        assert_eq!(parse_localized_number("abc"), None);
    }

    #[test]
    fn test_area_discrepancy_reported() {
        let mut value = full();
        value["Đất ở (m²)"] = json!(100.0);
        let record = LandTitleRecord::from_object(&object(value), "a.pdf").unwrap();
        assert_eq!(record.area_discrepancy(), Some(-100.0));
    }

    #[test]
    fn test_issue_date_formats() {
        assert!(is_valid_issue_date("15/03/2012"));
        assert!(is_valid_issue_date("../03/2012"));
        assert!(is_valid_issue_date("../../2012"));
        assert!(is_valid_issue_date(""));
        assert!(!is_valid_issue_date("31/02/2012"));
        assert!(!is_valid_issue_date("2012-03-15"));
        assert!(!is_valid_issue_date("15/13/2012"));
    }

    #[test]
    fn test_serializes_in_column_order() {
        let record = LandTitleRecord::from_object(&object(full()), "a.pdf").unwrap();
        let json = serde_json::to_string(&record).unwrap();
        let owner = json.find("Chủ sử dụng").unwrap();
        let commune = json.find("Xã/Thị trấn").unwrap();
        let source = json.find("Tên file nguồn").unwrap();
        assert!(owner < commune && commune < source);

        let back: LandTitleRecord = serde_json::from_str(&json).unwrap();
        assert_eq!(back, record);
    }
}
