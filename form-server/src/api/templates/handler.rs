//! Form Template API Handlers

use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};

use crate::auth::CurrentUser;
use crate::core::ServerState;
use crate::db::repository::{Entity, RepoError, form_field, form_template};
use crate::utils::{AppResult, ValidatedJson};
use shared::models::{
    FieldInput, FormField, FormTemplate, FormTemplateCreate, FormTemplateUpdate,
    ReorderFieldsRequest, ReorderFieldsResponse,
};

/// GET /templates - 当前用户的模板
pub async fn list(
    State(state): State<ServerState>,
    user: CurrentUser,
) -> AppResult<Json<Vec<FormTemplate>>> {
    let templates = form_template::list(&state.pool, user.id).await?;
    Ok(Json(templates))
}

/// GET /templates/{id}
pub async fn get_by_id(
    State(state): State<ServerState>,
    user: CurrentUser,
    Path(id): Path<i64>,
) -> AppResult<Json<FormTemplate>> {
    let template = form_template::find_by_id(&state.pool, id, user.id)
        .await?
        .ok_or(RepoError::NotFound(Entity::FormTemplate))?;
    Ok(Json(template))
}

/// POST /templates - 创建模板 (可同时带字段)
pub async fn create(
    State(state): State<ServerState>,
    user: CurrentUser,
    ValidatedJson(payload): ValidatedJson<FormTemplateCreate>,
) -> AppResult<(StatusCode, Json<FormTemplate>)> {
    let template = form_template::create(&state.pool, user.id, &payload).await?;
    tracing::info!(template_id = template.id, owner = user.id, "Form template created");
    Ok((StatusCode::CREATED, Json(template)))
}

/// PUT/PATCH /templates/{id} - 重命名
pub async fn update(
    State(state): State<ServerState>,
    user: CurrentUser,
    Path(id): Path<i64>,
    ValidatedJson(payload): ValidatedJson<FormTemplateUpdate>,
) -> AppResult<Json<FormTemplate>> {
    let template = form_template::update(&state.pool, id, user.id, &payload).await?;
    Ok(Json(template))
}

/// DELETE /templates/{id} - 删除模板 (字段和记录级联删除)
pub async fn delete(
    State(state): State<ServerState>,
    user: CurrentUser,
    Path(id): Path<i64>,
) -> AppResult<StatusCode> {
    form_template::delete(&state.pool, id, user.id).await?;
    tracing::info!(template_id = id, owner = user.id, "Form template deleted");
    Ok(StatusCode::NO_CONTENT)
}

/// POST /templates/{id}/add_field
pub async fn add_field(
    State(state): State<ServerState>,
    user: CurrentUser,
    Path(id): Path<i64>,
    ValidatedJson(payload): ValidatedJson<FieldInput>,
) -> AppResult<(StatusCode, Json<FormField>)> {
    let field = form_field::add(&state.pool, id, user.id, &payload).await?;
    Ok((StatusCode::CREATED, Json(field)))
}

/// POST /templates/{id}/reorder_fields
///
/// Unknown ids are skipped without error.
pub async fn reorder_fields(
    State(state): State<ServerState>,
    user: CurrentUser,
    Path(id): Path<i64>,
    ValidatedJson(payload): ValidatedJson<ReorderFieldsRequest>,
) -> AppResult<Json<ReorderFieldsResponse>> {
    let updated = form_field::reorder(&state.pool, id, user.id, &payload.field_orders).await?;
    Ok(Json(ReorderFieldsResponse {
        message: "Fields reordered successfully".to_string(),
        updated,
    }))
}
