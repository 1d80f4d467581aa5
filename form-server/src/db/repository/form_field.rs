//! Form Field Repository
//!
//! Fields belong to a template; ownership is always checked through the
//! template's `created_by`. Reading a template's fields always yields them
//! sorted by `order` (ties broken by id).

use super::{Entity, RepoError, RepoResult, form_template};
use serde_json::Value;
use std::collections::BTreeSet;
use shared::ErrorCode;
use shared::models::{FieldInput, FieldOrder, FieldType, FormField, FormFieldCreate, FormFieldUpdate};
use sqlx::{SqliteConnection, SqlitePool};

const FIELD_SELECT: &str =
    r#"SELECT f.id, f.form_template, f.label, f.field_type, f.required, f.options, f."order" FROM form_field f"#;

/// `options` column is JSON text
#[derive(sqlx::FromRow)]
struct FieldRow {
    id: i64,
    form_template: i64,
    label: String,
    field_type: FieldType,
    required: bool,
    options: Option<String>,
    order: i64,
}

impl TryFrom<FieldRow> for FormField {
    type Error = RepoError;

    fn try_from(row: FieldRow) -> Result<Self, Self::Error> {
        let options = row
            .options
            .as_deref()
            .map(serde_json::from_str::<Value>)
            .transpose()
            .map_err(|e| RepoError::Database(format!("Corrupt options on field {}: {e}", row.id)))?;
        Ok(FormField {
            id: row.id,
            form_template: row.form_template,
            label: row.label,
            field_type: row.field_type,
            required: row.required,
            options,
            order: row.order,
        })
    }
}

fn into_fields(rows: Vec<FieldRow>) -> RepoResult<Vec<FormField>> {
    rows.into_iter().map(FormField::try_from).collect()
}

/// `options` must be a JSON object when present
pub fn validate_options(options: Option<&Value>) -> RepoResult<()> {
    match options {
        None | Some(Value::Object(_)) => Ok(()),
        Some(_) => Err(RepoError::Invalid {
            code: ErrorCode::InvalidFieldOptions,
            field: "options",
        }),
    }
}

fn encode_options(options: Option<&Value>) -> Option<String> {
    options.map(Value::to_string)
}

/// Fields of one template, sorted by `order`
pub async fn find_by_template<'e, E>(executor: E, template_id: i64) -> RepoResult<Vec<FormField>>
where
    E: sqlx::SqliteExecutor<'e>,
{
    let rows = sqlx::query_as::<_, FieldRow>(&format!(
        r#"{FIELD_SELECT} WHERE f.form_template = ? ORDER BY f."order", f.id"#
    ))
    .bind(template_id)
    .fetch_all(executor)
    .await?;
    into_fields(rows)
}

/// All fields of the owner's templates
pub async fn list(pool: &SqlitePool, owner_id: i64) -> RepoResult<Vec<FormField>> {
    let rows = sqlx::query_as::<_, FieldRow>(&format!(
        r#"{FIELD_SELECT} JOIN form_template t ON t.id = f.form_template WHERE t.created_by = ? ORDER BY f.form_template, f."order", f.id"#
    ))
    .bind(owner_id)
    .fetch_all(pool)
    .await?;
    into_fields(rows)
}

pub async fn find_by_id(pool: &SqlitePool, id: i64, owner_id: i64) -> RepoResult<Option<FormField>> {
    let row = sqlx::query_as::<_, FieldRow>(&format!(
        "{FIELD_SELECT} JOIN form_template t ON t.id = f.form_template WHERE f.id = ? AND t.created_by = ?"
    ))
    .bind(id)
    .bind(owner_id)
    .fetch_optional(pool)
    .await?;
    row.map(FormField::try_from).transpose()
}

/// Next free position at the end of a template: `max(order) + 1`, or 0
pub(crate) async fn next_order<'e, E>(executor: E, template_id: i64) -> RepoResult<i64>
where
    E: sqlx::SqliteExecutor<'e>,
{
    let next: i64 = sqlx::query_scalar(
        r#"SELECT COALESCE(MAX("order") + 1, 0) FROM form_field WHERE form_template = ?"#,
    )
    .bind(template_id)
    .fetch_one(executor)
    .await?;
    Ok(next)
}

/// Insert one field row. Caller has checked ownership and options.
pub(crate) async fn insert(
    conn: &mut SqliteConnection,
    template_id: i64,
    input: &FieldInput,
    order: i64,
) -> RepoResult<i64> {
    let id = sqlx::query_scalar::<_, i64>(
        r#"INSERT INTO form_field (form_template, label, field_type, required, options, "order") VALUES (?1, ?2, ?3, ?4, ?5, ?6) RETURNING id"#,
    )
    .bind(template_id)
    .bind(&input.label)
    .bind(input.field_type)
    .bind(input.required)
    .bind(encode_options(input.options.as_ref()))
    .bind(order)
    .fetch_one(&mut *conn)
    .await?;
    Ok(id)
}

async fn fetch_one_field(conn: &mut SqliteConnection, id: i64) -> RepoResult<FormField> {
    let row = sqlx::query_as::<_, FieldRow>(&format!("{FIELD_SELECT} WHERE f.id = ?"))
        .bind(id)
        .fetch_optional(&mut *conn)
        .await?
        .ok_or(RepoError::NotFound(Entity::FormField))?;
    FormField::try_from(row)
}

/// Append a field to an owned template.
///
/// Without an explicit `order` the field goes after the current last one.
pub async fn add(
    pool: &SqlitePool,
    template_id: i64,
    owner_id: i64,
    input: &FieldInput,
) -> RepoResult<FormField> {
    validate_options(input.options.as_ref())?;

    let mut tx = pool.begin().await?;
    if !form_template::is_owned(&mut *tx, template_id, owner_id).await? {
        return Err(RepoError::NotFound(Entity::FormTemplate));
    }

    let order = match input.order {
        Some(order) => order,
        None => next_order(&mut *tx, template_id).await?,
    };
    let id = insert(&mut tx, template_id, input, order).await?;
    form_template::touch(&mut *tx, template_id).await?;
    let field = fetch_one_field(&mut tx, id).await?;
    tx.commit().await?;

    Ok(field)
}

/// `POST /fields/` variant of [`add`]
pub async fn create(pool: &SqlitePool, owner_id: i64, data: &FormFieldCreate) -> RepoResult<FormField> {
    add(pool, data.form_template, owner_id, &data.field).await
}

pub async fn update(
    pool: &SqlitePool,
    id: i64,
    owner_id: i64,
    data: &FormFieldUpdate,
) -> RepoResult<FormField> {
    if let Some(options) = &data.options {
        validate_options(options.as_ref())?;
    }

    let mut tx = pool.begin().await?;
    let current = sqlx::query_as::<_, FieldRow>(&format!(
        "{FIELD_SELECT} JOIN form_template t ON t.id = f.form_template WHERE f.id = ? AND t.created_by = ?"
    ))
    .bind(id)
    .bind(owner_id)
    .fetch_optional(&mut *tx)
    .await?
    .ok_or(RepoError::NotFound(Entity::FormField))?;

    let options = match &data.options {
        Some(options) => encode_options(options.as_ref()),
        None => current.options,
    };

    sqlx::query(
        r#"UPDATE form_field SET label = COALESCE(?1, label), field_type = COALESCE(?2, field_type), required = COALESCE(?3, required), options = ?4, "order" = COALESCE(?5, "order") WHERE id = ?6"#,
    )
    .bind(&data.label)
    .bind(data.field_type)
    .bind(data.required)
    .bind(options)
    .bind(data.order)
    .bind(id)
    .execute(&mut *tx)
    .await?;

    form_template::touch(&mut *tx, current.form_template).await?;
    let field = fetch_one_field(&mut tx, id).await?;
    tx.commit().await?;

    Ok(field)
}

/// Delete a field. Captured record data keeps its copied labels.
pub async fn delete(pool: &SqlitePool, id: i64, owner_id: i64) -> RepoResult<()> {
    let mut tx = pool.begin().await?;
    let template_id: Option<i64> = sqlx::query_scalar(
        "DELETE FROM form_field WHERE id = ? AND form_template IN (SELECT id FROM form_template WHERE created_by = ?) RETURNING form_template",
    )
    .bind(id)
    .bind(owner_id)
    .fetch_optional(&mut *tx)
    .await?;

    let template_id = template_id.ok_or(RepoError::NotFound(Entity::FormField))?;
    form_template::touch(&mut *tx, template_id).await?;
    tx.commit().await?;
    Ok(())
}

/// Bulk `order` rewrite for one template, in a single transaction.
///
/// Ids that are not fields of this template are skipped; a repeated id keeps
/// its last `order`. Returns the number of distinct fields updated.
pub async fn reorder(
    pool: &SqlitePool,
    template_id: i64,
    owner_id: i64,
    orders: &[FieldOrder],
) -> RepoResult<u64> {
    let mut tx = pool.begin().await?;
    if !form_template::is_owned(&mut *tx, template_id, owner_id).await? {
        return Err(RepoError::NotFound(Entity::FormTemplate));
    }
    if orders.is_empty() {
        return Err(RepoError::Invalid {
            code: ErrorCode::ReorderEmpty,
            field: "field_orders",
        });
    }

    let mut touched = BTreeSet::new();
    for item in orders {
        let result =
            sqlx::query(r#"UPDATE form_field SET "order" = ? WHERE id = ? AND form_template = ?"#)
                .bind(item.order)
                .bind(item.id)
                .bind(template_id)
                .execute(&mut *tx)
                .await?;
        if result.rows_affected() > 0 {
            touched.insert(item.id);
        }
    }
    let updated = touched.len() as u64;
    if updated > 0 {
        form_template::touch(&mut *tx, template_id).await?;
    }
    tx.commit().await?;

    tracing::debug!(template_id, requested = orders.len(), updated, "Fields reordered");
    Ok(updated)
}
