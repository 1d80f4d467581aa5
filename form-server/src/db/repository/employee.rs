//! Employee Record Repository
//!
//! Records and their label/value data. Every query is scoped to the
//! record's `created_by`.

use super::{Entity, RepoError, RepoResult, form_template};
use shared::ErrorCode;
use shared::models::{Employee, EmployeeCreate, EmployeeData, EmployeeUpdate};
use sqlx::{SqliteConnection, SqlitePool};

const EMPLOYEE_SELECT: &str = "SELECT e.id, e.form_template, t.name AS form_template_name, e.created_by, e.created_at, e.updated_at FROM employee e JOIN form_template t ON t.id = e.form_template";

/// Which templates a record may reference
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TemplateAccess {
    /// Any existing template, including other users'
    #[default]
    Any,
    /// Only templates created by the record owner
    OwnedOnly,
}

async fn check_template(
    conn: &mut SqliteConnection,
    template_id: i64,
    owner_id: i64,
    access: TemplateAccess,
) -> RepoResult<()> {
    let ok = match access {
        TemplateAccess::Any => form_template::exists(&mut *conn, template_id).await?,
        TemplateAccess::OwnedOnly => {
            form_template::is_owned(&mut *conn, template_id, owner_id).await?
        }
    };
    if !ok {
        return Err(RepoError::Invalid {
            code: ErrorCode::RecordTemplateInvalid,
            field: "form_template",
        });
    }
    Ok(())
}

async fn find_data<'e, E>(executor: E, employee_id: i64) -> RepoResult<Vec<EmployeeData>>
where
    E: sqlx::SqliteExecutor<'e>,
{
    let data = sqlx::query_as::<_, EmployeeData>(
        "SELECT id, employee, field_label, field_value FROM employee_data WHERE employee = ? ORDER BY id",
    )
    .bind(employee_id)
    .fetch_all(executor)
    .await?;
    Ok(data)
}

async fn with_data(pool: &SqlitePool, mut records: Vec<Employee>) -> RepoResult<Vec<Employee>> {
    for r in &mut records {
        r.data = find_data(pool, r.id).await?;
    }
    Ok(records)
}

async fn fetch_in_tx(conn: &mut SqliteConnection, id: i64) -> RepoResult<Employee> {
    let mut record = sqlx::query_as::<_, Employee>(&format!("{EMPLOYEE_SELECT} WHERE e.id = ?"))
        .bind(id)
        .fetch_optional(&mut *conn)
        .await?
        .ok_or(RepoError::NotFound(Entity::Employee))?;
    record.data = find_data(&mut *conn, id).await?;
    Ok(record)
}

async fn insert_data(
    conn: &mut SqliteConnection,
    employee_id: i64,
    field_label: &str,
    field_value: &str,
) -> RepoResult<i64> {
    let id = sqlx::query_scalar::<_, i64>(
        "INSERT INTO employee_data (employee, field_label, field_value) VALUES (?1, ?2, ?3) RETURNING id",
    )
    .bind(employee_id)
    .bind(field_label)
    .bind(field_value)
    .fetch_one(&mut *conn)
    .await?;
    Ok(id)
}

/// Caller's records
pub async fn list(pool: &SqlitePool, owner_id: i64) -> RepoResult<Vec<Employee>> {
    let records = sqlx::query_as::<_, Employee>(&format!(
        "{EMPLOYEE_SELECT} WHERE e.created_by = ? ORDER BY e.id"
    ))
    .bind(owner_id)
    .fetch_all(pool)
    .await?;
    with_data(pool, records).await
}

/// Caller's records with at least one entry whose label or value contains
/// `query`, ignoring case. `None` lists everything.
///
/// Matching runs on Unicode lowercase in Rust; SQLite `lower()` only folds
/// ASCII. Each record appears once however many entries match.
pub async fn search(
    pool: &SqlitePool,
    owner_id: i64,
    query: Option<&str>,
) -> RepoResult<Vec<Employee>> {
    let records = list(pool, owner_id).await?;
    let Some(query) = query else {
        return Ok(records);
    };

    let needle = query.to_lowercase();
    Ok(records
        .into_iter()
        .filter(|r| r.data.iter().any(|d| entry_matches(d, &needle)))
        .collect())
}

fn entry_matches(entry: &EmployeeData, needle: &str) -> bool {
    entry.field_label.to_lowercase().contains(needle)
        || entry.field_value.to_lowercase().contains(needle)
}

pub async fn find_by_id(pool: &SqlitePool, id: i64, owner_id: i64) -> RepoResult<Option<Employee>> {
    let mut record = sqlx::query_as::<_, Employee>(&format!(
        "{EMPLOYEE_SELECT} WHERE e.id = ? AND e.created_by = ?"
    ))
    .bind(id)
    .bind(owner_id)
    .fetch_optional(pool)
    .await?;

    if let Some(ref mut r) = record {
        r.data = find_data(pool, r.id).await?;
    }
    Ok(record)
}

/// Create a record with all of its data entries in one transaction
pub async fn create(
    pool: &SqlitePool,
    owner_id: i64,
    data: &EmployeeCreate,
    access: TemplateAccess,
) -> RepoResult<Employee> {
    let now = shared::util::now_millis();
    let mut tx = pool.begin().await?;

    check_template(&mut tx, data.form_template, owner_id, access).await?;

    let id = sqlx::query_scalar::<_, i64>(
        "INSERT INTO employee (form_template, created_by, created_at, updated_at) VALUES (?1, ?2, ?3, ?3) RETURNING id",
    )
    .bind(data.form_template)
    .bind(owner_id)
    .bind(now)
    .fetch_one(&mut *tx)
    .await?;

    for entry in &data.data {
        insert_data(&mut tx, id, &entry.field_label, &entry.field_value).await?;
    }

    let record = fetch_in_tx(&mut tx, id).await?;
    tx.commit().await?;

    tracing::debug!(employee_id = id, entries = record.data.len(), "Employee record created");
    Ok(record)
}

/// Update a record in one transaction.
///
/// Entries with an `id` of this record get their value rewritten; entries
/// with an unknown `id` are skipped; entries without `id` are appended.
/// Entries not mentioned are kept.
pub async fn update(
    pool: &SqlitePool,
    id: i64,
    owner_id: i64,
    data: &EmployeeUpdate,
    access: TemplateAccess,
) -> RepoResult<Employee> {
    let now = shared::util::now_millis();
    let mut tx = pool.begin().await?;

    let owned: i64 =
        sqlx::query_scalar("SELECT COUNT(*) FROM employee WHERE id = ? AND created_by = ?")
            .bind(id)
            .bind(owner_id)
            .fetch_one(&mut *tx)
            .await?;
    if owned == 0 {
        return Err(RepoError::NotFound(Entity::Employee));
    }

    if let Some(template_id) = data.form_template {
        check_template(&mut tx, template_id, owner_id, access).await?;
    }

    sqlx::query(
        "UPDATE employee SET form_template = COALESCE(?1, form_template), updated_at = ?2 WHERE id = ?3",
    )
    .bind(data.form_template)
    .bind(now)
    .bind(id)
    .execute(&mut *tx)
    .await?;

    let mut skipped = 0usize;
    for entry in &data.data {
        match entry.id {
            Some(data_id) => {
                let result = sqlx::query(
                    "UPDATE employee_data SET field_value = ? WHERE id = ? AND employee = ?",
                )
                .bind(&entry.field_value)
                .bind(data_id)
                .bind(id)
                .execute(&mut *tx)
                .await?;
                if result.rows_affected() == 0 {
                    skipped += 1;
                }
            }
            None => {
                insert_data(&mut tx, id, &entry.field_label, &entry.field_value).await?;
            }
        }
    }

    let record = fetch_in_tx(&mut tx, id).await?;
    tx.commit().await?;

    if skipped > 0 {
        tracing::debug!(employee_id = id, skipped, "Ignored data entries with unknown id");
    }
    Ok(record)
}

/// Delete a record and its data
pub async fn delete(pool: &SqlitePool, id: i64, owner_id: i64) -> RepoResult<()> {
    let result = sqlx::query("DELETE FROM employee WHERE id = ? AND created_by = ?")
        .bind(id)
        .bind(owner_id)
        .execute(pool)
        .await?;

    if result.rows_affected() == 0 {
        return Err(RepoError::NotFound(Entity::Employee));
    }
    Ok(())
}
