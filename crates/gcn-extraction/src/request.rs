use serde_json::{json, Map, Value};

use gcn_core::inference::{ExtractionRequest, RemoteReference};
use gcn_core::schema::{FieldSchema, FieldType};

pub const RESPONSE_MIME_TYPE: &str = "application/json";

/// Fixed instruction sent with every certificate. The last sentence states the area
/// self-consistency rule: the sub-areas must add up to the total area.
pub const INSTRUCTION: &str = "Dựa trên nội dung của Giấy chứng nhận Quyền sử dụng đất (GCN) này, \
hãy trích xuất các trường thông tin sau. Trả lời CHỈ bằng định dạng JSON theo schema đã cung cấp, \
trong một lần trả lời duy nhất, không kèm văn bản nào khác. \
Đảm bảo tổng diện tích đất ở, đất trồng cây lâu năm và đất rừng SX / lúa bằng diện tích tổng.";

pub fn build_request(schema: &FieldSchema, file: &RemoteReference) -> ExtractionRequest {
    ExtractionRequest {
        file: file.clone(),
        instruction: INSTRUCTION.to_string(),
        constraint: response_schema(schema),
        response_mime_type: RESPONSE_MIME_TYPE,
    }
}

/// Renders the schema in the `responseSchema` dialect of `generateContent`.
pub fn response_schema(schema: &FieldSchema) -> Value {
    let mut properties = Map::new();
    for field in schema.fields {
        let mut prop = Map::new();
        let type_name = match field.field_type {
            FieldType::String => "STRING",
            FieldType::Number => "NUMBER",
        };
        prop.insert("type".into(), json!(type_name));
        if let Some(description) = field.description {
            prop.insert("description".into(), json!(description));
        }
        properties.insert(field.name.to_string(), Value::Object(prop));
    }

    let required: Vec<&str> = schema.required().map(|f| f.name).collect();
    let ordering: Vec<&str> = schema.names().collect();

    json!({
        "type": "OBJECT",
        "properties": properties,
        "required": required,
        "propertyOrdering": ordering,
    })
}
