//! Form Template Repository

use super::{Entity, RepoError, RepoResult, form_field};
use shared::models::{FormTemplate, FormTemplateCreate, FormTemplateUpdate};
use sqlx::{SqliteConnection, SqlitePool};

const TEMPLATE_SELECT: &str =
    "SELECT id, name, created_by, created_at, updated_at FROM form_template";

pub(crate) async fn is_owned<'e, E>(executor: E, id: i64, owner_id: i64) -> RepoResult<bool>
where
    E: sqlx::SqliteExecutor<'e>,
{
    let count: i64 =
        sqlx::query_scalar("SELECT COUNT(*) FROM form_template WHERE id = ? AND created_by = ?")
            .bind(id)
            .bind(owner_id)
            .fetch_one(executor)
            .await?;
    Ok(count > 0)
}

pub(crate) async fn exists<'e, E>(executor: E, id: i64) -> RepoResult<bool>
where
    E: sqlx::SqliteExecutor<'e>,
{
    let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM form_template WHERE id = ?")
        .bind(id)
        .fetch_one(executor)
        .await?;
    Ok(count > 0)
}

/// Bump `updated_at`
pub(crate) async fn touch<'e, E>(executor: E, id: i64) -> RepoResult<()>
where
    E: sqlx::SqliteExecutor<'e>,
{
    sqlx::query("UPDATE form_template SET updated_at = ? WHERE id = ?")
        .bind(shared::util::now_millis())
        .bind(id)
        .execute(executor)
        .await?;
    Ok(())
}

/// Caller's templates, each with its fields in order
pub async fn list(pool: &SqlitePool, owner_id: i64) -> RepoResult<Vec<FormTemplate>> {
    let mut templates = sqlx::query_as::<_, FormTemplate>(&format!(
        "{TEMPLATE_SELECT} WHERE created_by = ? ORDER BY id"
    ))
    .bind(owner_id)
    .fetch_all(pool)
    .await?;

    for t in &mut templates {
        t.fields = form_field::find_by_template(pool, t.id).await?;
    }
    Ok(templates)
}

pub async fn find_by_id(
    pool: &SqlitePool,
    id: i64,
    owner_id: i64,
) -> RepoResult<Option<FormTemplate>> {
    let mut template = sqlx::query_as::<_, FormTemplate>(&format!(
        "{TEMPLATE_SELECT} WHERE id = ? AND created_by = ?"
    ))
    .bind(id)
    .bind(owner_id)
    .fetch_optional(pool)
    .await?;

    if let Some(ref mut t) = template {
        t.fields = form_field::find_by_template(pool, t.id).await?;
    }
    Ok(template)
}

async fn fetch_in_tx(conn: &mut SqliteConnection, id: i64) -> RepoResult<FormTemplate> {
    let mut template =
        sqlx::query_as::<_, FormTemplate>(&format!("{TEMPLATE_SELECT} WHERE id = ?"))
            .bind(id)
            .fetch_optional(&mut *conn)
            .await?
            .ok_or(RepoError::NotFound(Entity::FormTemplate))?;
    template.fields = form_field::find_by_template(&mut *conn, id).await?;
    Ok(template)
}

/// Create a template and its fields atomically.
///
/// A field without `order` gets its position in `data.fields`.
pub async fn create(
    pool: &SqlitePool,
    owner_id: i64,
    data: &FormTemplateCreate,
) -> RepoResult<FormTemplate> {
    for field in &data.fields {
        form_field::validate_options(field.options.as_ref())?;
    }

    let now = shared::util::now_millis();
    let mut tx = pool.begin().await?;

    let id = sqlx::query_scalar::<_, i64>(
        "INSERT INTO form_template (name, created_by, created_at, updated_at) VALUES (?1, ?2, ?3, ?3) RETURNING id",
    )
    .bind(&data.name)
    .bind(owner_id)
    .bind(now)
    .fetch_one(&mut *tx)
    .await?;

    for (index, field) in data.fields.iter().enumerate() {
        let order = field.order.unwrap_or(index as i64);
        form_field::insert(&mut tx, id, field, order).await?;
    }

    let template = fetch_in_tx(&mut tx, id).await?;
    tx.commit().await?;

    tracing::debug!(template_id = id, fields = template.fields.len(), "Form template created");
    Ok(template)
}

/// Rename a template
pub async fn update(
    pool: &SqlitePool,
    id: i64,
    owner_id: i64,
    data: &FormTemplateUpdate,
) -> RepoResult<FormTemplate> {
    let now = shared::util::now_millis();
    let rows = sqlx::query(
        "UPDATE form_template SET name = COALESCE(?1, name), updated_at = ?2 WHERE id = ?3 AND created_by = ?4",
    )
    .bind(&data.name)
    .bind(now)
    .bind(id)
    .bind(owner_id)
    .execute(pool)
    .await?;

    if rows.rows_affected() == 0 {
        return Err(RepoError::NotFound(Entity::FormTemplate));
    }

    find_by_id(pool, id, owner_id)
        .await?
        .ok_or(RepoError::NotFound(Entity::FormTemplate))
}

/// Delete a template. Fields and records built on it cascade via FK.
pub async fn delete(pool: &SqlitePool, id: i64, owner_id: i64) -> RepoResult<()> {
    let result = sqlx::query("DELETE FROM form_template WHERE id = ? AND created_by = ?")
        .bind(id)
        .bind(owner_id)
        .execute(pool)
        .await?;

    if result.rows_affected() == 0 {
        return Err(RepoError::NotFound(Entity::FormTemplate));
    }
    Ok(())
}
