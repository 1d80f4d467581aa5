//! Employee Record API Handlers

use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
};

use crate::auth::CurrentUser;
use crate::core::ServerState;
use crate::db::repository::{Entity, RepoError, employee};
use crate::utils::{AppResult, ValidatedJson};
use shared::models::{Employee, EmployeeCreate, EmployeeSearchQuery, EmployeeUpdate};

/// GET /employ - 当前用户的记录
pub async fn list(
    State(state): State<ServerState>,
    user: CurrentUser,
) -> AppResult<Json<Vec<Employee>>> {
    let records = employee::list(&state.pool, user.id).await?;
    Ok(Json(records))
}

/// GET /employ/search?q= - 按标签或值模糊搜索 (忽略大小写)
pub async fn search(
    State(state): State<ServerState>,
    user: CurrentUser,
    Query(query): Query<EmployeeSearchQuery>,
) -> AppResult<Json<Vec<Employee>>> {
    let records = employee::search(&state.pool, user.id, query.term()).await?;
    Ok(Json(records))
}

/// GET /employ/{id}
pub async fn get_by_id(
    State(state): State<ServerState>,
    user: CurrentUser,
    Path(id): Path<i64>,
) -> AppResult<Json<Employee>> {
    let record = employee::find_by_id(&state.pool, id, user.id)
        .await?
        .ok_or(RepoError::NotFound(Entity::Employee))?;
    Ok(Json(record))
}

/// POST /employ
pub async fn create(
    State(state): State<ServerState>,
    user: CurrentUser,
    ValidatedJson(payload): ValidatedJson<EmployeeCreate>,
) -> AppResult<(StatusCode, Json<Employee>)> {
    let record =
        employee::create(&state.pool, user.id, &payload, state.template_access()).await?;
    tracing::info!(employee_id = record.id, owner = user.id, "Employee record created");
    Ok((StatusCode::CREATED, Json(record)))
}

/// PUT/PATCH /employ/{id} - 不会因为省略而删除数据
pub async fn update(
    State(state): State<ServerState>,
    user: CurrentUser,
    Path(id): Path<i64>,
    ValidatedJson(payload): ValidatedJson<EmployeeUpdate>,
) -> AppResult<Json<Employee>> {
    let record =
        employee::update(&state.pool, id, user.id, &payload, state.template_access()).await?;
    Ok(Json(record))
}

/// DELETE /employ/{id}
pub async fn delete(
    State(state): State<ServerState>,
    user: CurrentUser,
    Path(id): Path<i64>,
) -> AppResult<StatusCode> {
    employee::delete(&state.pool, id, user.id).await?;
    tracing::info!(employee_id = id, owner = user.id, "Employee record deleted");
    Ok(StatusCode::NO_CONTENT)
}
