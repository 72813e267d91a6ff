//! The fields extracted from a land-title certificate.
//!
//! [`FIELD_SCHEMA`] is the single description of those fields. The request builder turns it
//! into the remote structured-output constraint, the normalizer checks required fields against
//! it, and [`crate::record::LandTitleRecord`] reads and writes its values by the same names.

use serde::Serialize;
use serde_json::{json, Map, Value};

/// Wire names of the extracted fields, which double as report column labels.
pub mod field {
    pub const OWNER: &str = "Chủ sử dụng";
    pub const PARCEL_NUMBER: &str = "Thửa đất số";
    pub const MAP_SHEET: &str = "Tờ bản đồ";
    pub const TOTAL_AREA: &str = "Diện tích tổng (m²)";
    pub const RESIDENTIAL_AREA: &str = "Đất ở (m²)";
    pub const PERENNIAL_CROP_AREA: &str = "Đất trồng cây lâu năm (m²)";
    pub const FORESTRY_RICE_AREA: &str = "Đất rừng SX / Lúa (m²)";
    pub const REGISTRY_NUMBER: &str = "Số vào sổ";
    pub const SERIAL_NUMBER: &str = "Số phát hành (Seri)";
    pub const ISSUE_DATE: &str = "Ngày kí";
    pub const COMMUNE: &str = "Xã/Thị trấn";
    /// Provenance; attached by the normalizer, never requested from the model.
    pub const SOURCE_FILE: &str = "Tên file nguồn";
}

#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum FieldType {
    String,
    Number,
}

impl FieldType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::String => "string",
            Self::Number => "number",
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize)]
pub struct FieldSpec {
    pub name: &'static str,
    pub field_type: FieldType,
    pub description: Option<&'static str>,
    pub required: bool,
}

#[derive(Debug, Clone, Copy, Serialize)]
pub struct FieldSchema {
    pub fields: &'static [FieldSpec],
}

const fn spec(
    name: &'static str,
    field_type: FieldType,
    description: Option<&'static str>,
    required: bool,
) -> FieldSpec {
    FieldSpec {
        name,
        field_type,
        description,
        required,
    }
}

pub static FIELD_SCHEMA: FieldSchema = FieldSchema {
    fields: &[
        spec(
            field::OWNER,
            FieldType::String,
            Some("Tên (và vợ/chồng) của người sử dụng đất."),
            true,
        ),
        spec(field::PARCEL_NUMBER, FieldType::String, None, true),
        spec(field::MAP_SHEET, FieldType::String, None, false),
        spec(field::TOTAL_AREA, FieldType::Number, None, true),
        spec(
            field::RESIDENTIAL_AREA,
            FieldType::Number,
            Some("Tổng diện tích Đất ở (nông thôn hoặc đô thị)."),
            false,
        ),
        spec(field::PERENNIAL_CROP_AREA, FieldType::Number, None, false),
        spec(
            field::FORESTRY_RICE_AREA,
            FieldType::Number,
            Some("Nếu không có, hãy đặt là 0."),
            false,
        ),
        spec(field::REGISTRY_NUMBER, FieldType::String, None, false),
        spec(field::SERIAL_NUMBER, FieldType::String, None, false),
        spec(
            field::ISSUE_DATE,
            FieldType::String,
            Some("Định dạng DD/MM/YYYY. Nếu thiếu ngày hoặc tháng, điền '..'."),
            false,
        ),
        spec(
            field::COMMUNE,
            FieldType::String,
            Some("Chỉ lấy tên Xã hoặc Thị trấn, không bao gồm Thôn hoặc Huyện."),
            false,
        ),
    ],
};

impl FieldSchema {
    pub fn get(&self, name: &str) -> Option<&FieldSpec> {
        self.fields.iter().find(|f| f.name == name)
    }

    pub fn required(&self) -> impl Iterator<Item = &FieldSpec> {
        self.fields.iter().filter(|f| f.required)
    }

    pub fn names(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.fields.iter().map(|f| f.name)
    }

    /// Plain JSON Schema rendering (lowercase type names), as shown to API clients.
    pub fn to_json_schema(&self) -> Value {
        let mut properties = Map::new();
        for f in self.fields {
            let mut prop = Map::new();
            prop.insert("type".into(), json!(f.field_type.as_str()));
            if let Some(description) = f.description {
                prop.insert("description".into(), json!(description));
            }
            properties.insert(f.name.to_string(), Value::Object(prop));
        }
        let required: Vec<&str> = self.required().map(|f| f.name).collect();
        json!({
            "type": "object",
            "properties": properties,
            "required": required,
        })
    }
}
