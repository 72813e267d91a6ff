use serde_json::{Map, Value};

use gcn_core::error::{GcnError, Result};
use gcn_core::record::LandTitleRecord;

/// Parses the model's answer for one document and tags it with the source file name.
///
/// Invalid JSON and schema violations (missing required fields, non-numeric areas) are
/// normalization failures for that document only. Area and date inconsistencies are
/// logged but do not reject the record.
pub fn normalize(raw: &str, source_name: &str) -> Result<LandTitleRecord> {
    let cleaned = strip_code_fences(raw);

    let value: Value = serde_json::from_str(cleaned).map_err(|e| {
        tracing::error!(source = %source_name, raw = %cleaned, error = %e, "Model returned malformed JSON");
        GcnError::Normalization(format!("malformed JSON in response for {source_name}: {e}"))
    })?;

    let object = into_object(value).map_err(|kind| {
        GcnError::Normalization(format!(
            "expected a JSON object in response for {source_name}, got {kind}"
        ))
    })?;

    let record = LandTitleRecord::from_object(&object, source_name).map_err(|e| match e {
        GcnError::Normalization(message) => {
            GcnError::Normalization(format!("{source_name}: {message}"))
        }
        other => other,
    })?;

    if let Some(diff) = record.area_discrepancy() {
        tracing::warn!(
            source = %source_name,
            total_area = record.total_area,
            difference = diff,
            "Sub-areas do not add up to the total area"
        );
    }
    if !record.issue_date_is_valid() {
        tracing::warn!(
            source = %source_name,
            issue_date = %record.issue_date,
            "Issue date is not in DD/MM/YYYY form"
        );
    }

    Ok(record)
}

fn strip_code_fences(raw: &str) -> &str {
    let trimmed = raw.trim();
    if !trimmed.starts_with("```") {
        return trimmed;
    }
    match (trimmed.find('{'), trimmed.rfind('}')) {
        (Some(start), Some(end)) if start < end => &trimmed[start..=end],
        _ => trimmed,
    }
}

/// Occasionally the object comes wrapped in a one-element array.
fn into_object(value: Value) -> std::result::Result<Map<String, Value>, &'static str> {
    match value {
        Value::Object(object) => Ok(object),
        Value::Array(items) if items.len() == 1 => match items.into_iter().next() {
            Some(Value::Object(object)) => Ok(object),
            _ => Err("an array"),
        },
        other => Err(json_kind(&other)),
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const VALID: &str = r#"{
        "Chủ sử dụng": "Phạm Văn D",
        "Thửa đất số": "56",
        "Tờ bản đồ": "12",
        "Diện tích tổng (m²)": 350.5,
        "Đất ở (m²)": 150.5,
        "Đất trồng cây lâu năm (m²)": 200,
        "Đất rừng SX / Lúa (m²)": 0,
        "Số vào sổ": "CS00123",
        "Số phát hành (Seri)": "CĐ 765432",
        "Ngày kí": "../05/2015",
        "Xã/Thị trấn": "Thị trấn Phú Mỹ"
    }"#;

    #[test]
    fn test_attaches_provenance() {
        let record = normalize(VALID, "gcn_56.pdf").unwrap();
        assert_eq!(record.source_file, "gcn_56.pdf");
        assert_eq!(record.owner, "Phạm Văn D");
        assert_eq!(record.total_area, 350.5);
        assert_eq!(record.issue_date, "../05/2015");
    }

    #[test]
    fn test_malformed_json_is_normalization_failure() {
        let err = normalize("Xin lỗi, tôi không đọc được tài liệu.", "bad.pdf").unwrap_err();
        assert!(matches!(err, GcnError::Normalization(_)));
        assert!(err.to_string().contains("malformed JSON"));
        assert!(err.to_string().contains("bad.pdf"));
    }

    #[test]
    fn test_strips_markdown_fences() {
        let fenced = format!("```json\n{VALID}\n```");
        let record = normalize(&fenced, "f.pdf").unwrap();
        assert_eq!(record.parcel_number, "56");
    }

    #[test]
    fn test_accepts_single_element_array() {
        let wrapped = format!("[{VALID}]");
        assert!(normalize(&wrapped, "w.pdf").is_ok());
    }

    #[test]
    fn test_rejects_non_object() {
        let err = normalize("[1, 2]", "n.pdf").unwrap_err();
        assert!(err.to_string().contains("an array"));
        assert!(normalize("42", "n.pdf").is_err());
    }

    #[test]
    fn test_missing_required_field_names_source() {
        let err = normalize(r#"{"Chủ sử dụng": "X", "Thửa đất số": "1"}"#, "m.pdf").unwrap_err();
        assert!(matches!(err, GcnError::Normalization(_)));
        assert!(err.to_string().contains("m.pdf"));
        assert!(err.to_string().contains("Diện tích tổng (m²)"));
    }

    #[test]
    fn test_identical_input_gives_identical_record() {
        assert_eq!(normalize(VALID, "a.pdf").unwrap(), normalize(VALID, "a.pdf").unwrap());
    }
}
