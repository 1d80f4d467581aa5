//! Form Field API Handlers
//!
//! Fields are visible only through templates owned by the caller.

use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};

use crate::auth::CurrentUser;
use crate::core::ServerState;
use crate::db::repository::{Entity, RepoError, form_field};
use crate::utils::{AppResult, ValidatedJson};
use shared::models::{FormField, FormFieldCreate, FormFieldUpdate};

/// GET /fields - 当前用户所有模板的字段
pub async fn list(
    State(state): State<ServerState>,
    user: CurrentUser,
) -> AppResult<Json<Vec<FormField>>> {
    let fields = form_field::list(&state.pool, user.id).await?;
    Ok(Json(fields))
}

/// GET /fields/{id}
pub async fn get_by_id(
    State(state): State<ServerState>,
    user: CurrentUser,
    Path(id): Path<i64>,
) -> AppResult<Json<FormField>> {
    let field = form_field::find_by_id(&state.pool, id, user.id)
        .await?
        .ok_or(RepoError::NotFound(Entity::FormField))?;
    Ok(Json(field))
}

/// POST /fields - `form_template` 必须属于当前用户
pub async fn create(
    State(state): State<ServerState>,
    user: CurrentUser,
    ValidatedJson(payload): ValidatedJson<FormFieldCreate>,
) -> AppResult<(StatusCode, Json<FormField>)> {
    let field = form_field::create(&state.pool, user.id, &payload).await?;
    Ok((StatusCode::CREATED, Json(field)))
}

/// PUT/PATCH /fields/{id}
pub async fn update(
    State(state): State<ServerState>,
    user: CurrentUser,
    Path(id): Path<i64>,
    ValidatedJson(payload): ValidatedJson<FormFieldUpdate>,
) -> AppResult<Json<FormField>> {
    let field = form_field::update(&state.pool, id, user.id, &payload).await?;
    Ok(Json(field))
}

/// DELETE /fields/{id} - 已提交记录中的同名数据保留
pub async fn delete(
    State(state): State<ServerState>,
    user: CurrentUser,
    Path(id): Path<i64>,
) -> AppResult<StatusCode> {
    form_field::delete(&state.pool, id, user.id).await?;
    Ok(StatusCode::NO_CONTENT)
}
