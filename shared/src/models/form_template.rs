//! Form Template Model

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use validator::Validate;

/// Input type of a form field
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
#[cfg_attr(feature = "db", derive(sqlx::Type))]
#[cfg_attr(feature = "db", sqlx(rename_all = "lowercase"))]
pub enum FieldType {
    #[default]
    Text,
    Number,
    Email,
    Password,
    Date,
    Textarea,
    Select,
    Checkbox,
    Radio,
}

/// Form field (independent table, ordered by `order`)
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct FormField {
    pub id: i64,
    pub form_template: i64,
    pub label: String,
    pub field_type: FieldType,
    pub required: bool,
    pub options: Option<Value>,
    pub order: i64,
}

/// Form template entity
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
pub struct FormTemplate {
    pub id: i64,
    pub name: String,
    pub created_by: i64,
    pub created_at: i64,
    pub updated_at: i64,

    // -- Relations (populated by application code, skipped by FromRow) --

    /// Always sorted ascending by `order`
    #[cfg_attr(feature = "db", sqlx(skip))]
    #[serde(default)]
    pub fields: Vec<FormField>,
}

/// Field definition (for template create and `add_field`, without id/template)
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct FieldInput {
    #[validate(length(min = 1, max = 255, message = "label must be 1-255 characters"))]
    pub label: String,
    pub field_type: FieldType,
    #[serde(default)]
    pub required: bool,
    /// Must be a JSON object when present
    #[serde(default)]
    pub options: Option<Value>,
    /// Omitted: position-based default chosen by the store
    #[serde(default)]
    pub order: Option<i64>,
}

/// Create form template payload
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct FormTemplateCreate {
    #[validate(length(min = 1, max = 255, message = "name must be 1-255 characters"))]
    pub name: String,
    #[serde(default)]
    #[validate(nested)]
    pub fields: Vec<FieldInput>,
}

/// Update form template payload
#[derive(Debug, Clone, Serialize, Deserialize, Default, Validate)]
pub struct FormTemplateUpdate {
    #[validate(length(min = 1, max = 255, message = "name must be 1-255 characters"))]
    pub name: Option<String>,
}

/// Create field payload (`POST /fields/`)
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct FormFieldCreate {
    pub form_template: i64,
    #[serde(flatten)]
    #[validate(nested)]
    pub field: FieldInput,
}

/// Update field payload
///
/// `options` distinguishes "absent" (`None`) from an explicit `null`
/// (`Some(None)`, clears the options).
#[derive(Debug, Clone, Serialize, Deserialize, Default, Validate)]
pub struct FormFieldUpdate {
    #[validate(length(min = 1, max = 255, message = "label must be 1-255 characters"))]
    pub label: Option<String>,
    pub field_type: Option<FieldType>,
    pub required: Option<bool>,
    #[serde(default, deserialize_with = "double_option")]
    pub options: Option<Option<Value>>,
    pub order: Option<i64>,
}

fn double_option<'de, D>(deserializer: D) -> Result<Option<Option<Value>>, D::Error>
where
    D: Deserializer<'de>,
{
    Option::<Value>::deserialize(deserializer).map(Some)
}

/// One `{id, order}` pair of a reorder request
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct FieldOrder {
    pub id: i64,
    pub order: i64,
}

/// Reorder payload (`POST /templates/{id}/reorder_fields/`)
#[derive(Debug, Clone, Serialize, Deserialize, Default, Validate)]
pub struct ReorderFieldsRequest {
    #[serde(default)]
    pub field_orders: Vec<FieldOrder>,
}

/// Reorder result; ids that did not belong to the template are not reported
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReorderFieldsResponse {
    pub message: String,
    pub updated: u64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_field_type_wire_names() {
        let t: FieldType = serde_json::from_str("\"textarea\"").unwrap();
        assert_eq!(t, FieldType::Textarea);
        assert_eq!(serde_json::to_string(&FieldType::Radio).unwrap(), "\"radio\"");
        assert!(serde_json::from_str::<FieldType>("\"color\"").is_err());
    }

    #[test]
    fn test_field_input_defaults() {
        let input: FieldInput =
            serde_json::from_str(r#"{"label":"Name","field_type":"text"}"#).unwrap();
        assert!(!input.required);
        assert!(input.options.is_none());
        assert!(input.order.is_none());
    }

    #[test]
    fn test_field_update_distinguishes_null_options() {
        let absent: FormFieldUpdate = serde_json::from_str(r#"{"label":"x"}"#).unwrap();
        assert_eq!(absent.options, None);

        let cleared: FormFieldUpdate = serde_json::from_str(r#"{"options":null}"#).unwrap();
        assert_eq!(cleared.options, Some(None));

        let set: FormFieldUpdate =
            serde_json::from_str(r#"{"options":{"choices":["a"]}}"#).unwrap();
        assert!(matches!(set.options, Some(Some(Value::Object(_)))));
    }

    #[test]
    fn test_field_create_flattens_field_input() {
        let create: FormFieldCreate = serde_json::from_str(
            r#"{"form_template":7,"label":"Dept","field_type":"select","options":{"choices":["HR"]}}"#,
        )
        .unwrap();
        assert_eq!(create.form_template, 7);
        assert_eq!(create.field.field_type, FieldType::Select);
        assert!(create.field.options.is_some());
    }

    #[test]
    fn test_reorder_request_defaults_to_empty() {
        let req: ReorderFieldsRequest = serde_json::from_str("{}").unwrap();
        assert!(req.field_orders.is_empty());
    }

    #[test]
    fn test_template_create_validation() {
        let create = FormTemplateCreate {
            name: String::new(),
            fields: vec![],
        };
        assert!(create.validate().is_err());

        let create = FormTemplateCreate {
            name: "Onboarding".to_string(),
            fields: vec![FieldInput {
                label: "Name".to_string(),
                field_type: FieldType::Text,
                required: true,
                options: None,
                order: Some(0),
            }],
        };
        assert!(create.validate().is_ok());
    }
}
