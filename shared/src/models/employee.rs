//! Employee Record Model
//!
//! A record is a set of label/value pairs captured against a form template.
//! Labels are copied from the template at submission time and are not
//! linked to `form_field` rows.

use serde::{Deserialize, Serialize};
use validator::Validate;

/// One captured label/value pair
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
pub struct EmployeeData {
    pub id: i64,
    #[serde(skip_serializing)]
    #[serde(default)]
    pub employee: i64,
    pub field_label: String,
    pub field_value: String,
}

/// Employee record entity
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
pub struct Employee {
    pub id: i64,
    pub form_template: i64,
    /// Joined from `form_template.name`
    pub form_template_name: String,
    pub created_by: i64,
    pub created_at: i64,
    pub updated_at: i64,

    // -- Relations (populated by application code, skipped by FromRow) --

    #[cfg_attr(feature = "db", sqlx(skip))]
    #[serde(default)]
    pub data: Vec<EmployeeData>,
}

/// New data entry
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct EmployeeDataInput {
    #[validate(length(min = 1, max = 255, message = "field_label must be 1-255 characters"))]
    pub field_label: String,
    #[serde(default)]
    pub field_value: String,
}

/// Create record payload
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct EmployeeCreate {
    pub form_template: i64,
    #[serde(default)]
    #[validate(nested)]
    pub data: Vec<EmployeeDataInput>,
}

/// Data entry in an update
///
/// With `id`: rewrites `field_value` of that entry if it belongs to the
/// record, otherwise the entry is ignored. Without `id`: appended.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct EmployeeDataUpdate {
    pub id: Option<i64>,
    #[validate(length(min = 1, max = 255, message = "field_label must be 1-255 characters"))]
    pub field_label: String,
    #[serde(default)]
    pub field_value: String,
}

/// Update record payload
#[derive(Debug, Clone, Serialize, Deserialize, Default, Validate)]
pub struct EmployeeUpdate {
    pub form_template: Option<i64>,
    #[serde(default)]
    #[validate(nested)]
    pub data: Vec<EmployeeDataUpdate>,
}

/// Query string of `GET /employ/search/`
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct EmployeeSearchQuery {
    #[serde(default)]
    pub q: Option<String>,
}

impl EmployeeSearchQuery {
    /// Query text, `None` when empty or missing
    pub fn term(&self) -> Option<&str> {
        self.q.as_deref().filter(|q| !q.is_empty())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_create_payload_defaults() {
        let create: EmployeeCreate = serde_json::from_str(r#"{"form_template":3}"#).unwrap();
        assert_eq!(create.form_template, 3);
        assert!(create.data.is_empty());

        let create: EmployeeCreate = serde_json::from_str(
            r#"{"form_template":3,"data":[{"field_label":"Name"}]}"#,
        )
        .unwrap();
        assert_eq!(create.data[0].field_value, "");
    }

    #[test]
    fn test_update_entry_id_is_optional() {
        let update: EmployeeUpdate = serde_json::from_str(
            r#"{"data":[{"id":9,"field_label":"Name","field_value":"Bob"},{"field_label":"Dept","field_value":"HR"}]}"#,
        )
        .unwrap();
        assert_eq!(update.form_template, None);
        assert_eq!(update.data[0].id, Some(9));
        assert_eq!(update.data[1].id, None);
    }

    #[test]
    fn test_empty_label_rejected() {
        let create = EmployeeCreate {
            form_template: 1,
            data: vec![EmployeeDataInput {
                field_label: String::new(),
                field_value: "x".to_string(),
            }],
        };
        assert!(create.validate().is_err());
    }

    #[test]
    fn test_search_term() {
        let q = EmployeeSearchQuery {
            q: Some("alice".to_string()),
        };
        assert_eq!(q.term(), Some("alice"));
        assert_eq!(EmployeeSearchQuery { q: Some(String::new()) }.term(), None);
        assert_eq!(EmployeeSearchQuery::default().term(), None);
    }

    #[test]
    fn test_data_serializes_without_owner_column() {
        let data = EmployeeData {
            id: 1,
            employee: 5,
            field_label: "Name".to_string(),
            field_value: "Alice".to_string(),
        };
        let json = serde_json::to_value(&data).unwrap();
        assert!(json.get("employee").is_none());
        assert_eq!(json["field_value"], "Alice");
    }
}
