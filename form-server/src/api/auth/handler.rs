//! Authentication Handlers
//!
//! Handles login, registration, token refresh, logout and password change

use axum::{Json, extract::State, http::StatusCode};

use crate::auth::{CurrentUser, hash_password, verify_password};
use crate::core::ServerState;
use crate::db::repository::{refresh_token, user};
use crate::security_log;
use crate::utils::{AppError, AppResult, ErrorCode, ValidatedJson};
use shared::client::{
    AuthResponse, ChangePasswordRequest, LoginRequest, LogoutRequest, MessageResponse,
    RefreshRequest, RegisterRequest, TokenPair, UserInfo,
};
use shared::models::{User, UserCreate};

/// Fixed delay for failed logins (slows down guessing)
const AUTH_FAIL_DELAY_MS: u64 = 500;

/// Issue an access token plus a fresh refresh token
async fn issue_tokens(state: &ServerState, user: &User) -> AppResult<AuthResponse> {
    let access = state
        .get_jwt_service()
        .generate_token(user.id, &user.username)
        .map_err(|e| AppError::internal(format!("Failed to generate token: {}", e)))?;
    let refresh =
        refresh_token::create(&state.pool, user.id, state.config.refresh_token_days).await?;

    Ok(AuthResponse {
        access,
        refresh,
        user: UserInfo::from(user),
    })
}

fn check_new_password(state: &ServerState, password: &str, field: &str) -> AppResult<()> {
    let min = state.config.min_password_length;
    if password.chars().count() < min {
        return Err(AppError::with_message(
            ErrorCode::PasswordTooShort,
            format!("Password must contain at least {min} characters"),
        )
        .with_detail(field, vec![format!("Ensure this field has at least {min} characters")]));
    }
    Ok(())
}

/// POST /auth/login - 用户名密码登录
pub async fn login(
    State(state): State<ServerState>,
    ValidatedJson(req): ValidatedJson<LoginRequest>,
) -> AppResult<Json<AuthResponse>> {
    let username = req.username.trim();
    let found = user::find_by_username(&state.pool, username).await?;

    let user = match found {
        Some(u) if verify_password(&req.password, &u.password_hash) => u,
        _ => {
            security_log!("WARN", "login_failed", username = username.to_string());
            tokio::time::sleep(std::time::Duration::from_millis(AUTH_FAIL_DELAY_MS)).await;
            return Err(AppError::invalid_credentials());
        }
    };

    if !user.is_active {
        security_log!("WARN", "login_disabled", user_id = user.id);
        return Err(AppError::new(ErrorCode::AccountDisabled));
    }

    let response = issue_tokens(&state, &user).await?;
    tracing::info!(user_id = user.id, username = %user.username, "User logged in");
    Ok(Json(response))
}

/// POST /auth/register - 注册并直接登录
pub async fn register(
    State(state): State<ServerState>,
    ValidatedJson(req): ValidatedJson<RegisterRequest>,
) -> AppResult<(StatusCode, Json<AuthResponse>)> {
    check_new_password(&state, &req.password, "password")?;
    if req.password != req.password_confirm {
        return Err(AppError::new(ErrorCode::PasswordMismatch).with_detail(
            "password_confirm",
            vec![ErrorCode::PasswordMismatch.message()],
        ));
    }

    let username = req.username.trim().to_string();
    let email = req.email.trim().to_string();
    if user::username_exists(&state.pool, &username).await? {
        return Err(AppError::new(ErrorCode::UsernameExists)
            .with_detail("username", vec![ErrorCode::UsernameExists.message()]));
    }
    if user::email_exists(&state.pool, &email).await? {
        return Err(AppError::new(ErrorCode::EmailExists)
            .with_detail("email", vec![ErrorCode::EmailExists.message()]));
    }

    let created = user::create(
        &state.pool,
        UserCreate {
            username,
            email,
            password_hash: hash_password(&req.password)?,
            first_name: req.first_name,
            last_name: req.last_name,
        },
    )
    .await?;

    let response = issue_tokens(&state, &created).await?;
    tracing::info!(user_id = created.id, username = %created.username, "User registered");
    Ok((StatusCode::CREATED, Json(response)))
}

/// POST /auth/refresh - 轮换刷新令牌
pub async fn refresh(
    State(state): State<ServerState>,
    ValidatedJson(req): ValidatedJson<RefreshRequest>,
) -> AppResult<Json<TokenPair>> {
    let (user_id, new_refresh) =
        refresh_token::rotate(&state.pool, &req.refresh, state.config.refresh_token_days)
            .await?
            .ok_or_else(|| {
                security_log!("WARN", "refresh_rejected", reason = "invalid_or_expired");
                AppError::new(ErrorCode::RefreshTokenInvalid)
            })?;

    let user = user::find_by_id(&state.pool, user_id)
        .await?
        .filter(|u| u.is_active)
        .ok_or_else(|| AppError::new(ErrorCode::RefreshTokenInvalid))?;

    let access = state
        .get_jwt_service()
        .generate_token(user.id, &user.username)
        .map_err(|e| AppError::internal(format!("Failed to generate token: {}", e)))?;

    Ok(Json(TokenPair {
        access,
        refresh: new_refresh,
    }))
}

/// POST /auth/logout - 吊销刷新令牌 (幂等)
pub async fn logout(
    State(state): State<ServerState>,
    ValidatedJson(req): ValidatedJson<LogoutRequest>,
) -> AppResult<StatusCode> {
    if let Some(token) = req.refresh.as_deref().filter(|t| !t.is_empty()) {
        refresh_token::revoke(&state.pool, token).await?;
    }
    Ok(StatusCode::NO_CONTENT)
}

/// POST /auth/change-password - 修改密码并吊销所有刷新令牌
pub async fn change_password(
    State(state): State<ServerState>,
    current_user: CurrentUser,
    ValidatedJson(req): ValidatedJson<ChangePasswordRequest>,
) -> AppResult<Json<MessageResponse>> {
    let user = user::find_by_id(&state.pool, current_user.id)
        .await?
        .ok_or_else(|| AppError::new(ErrorCode::UserNotFound))?;

    if !verify_password(&req.old_password, &user.password_hash) {
        security_log!("WARN", "change_password_failed", user_id = user.id);
        return Err(AppError::new(ErrorCode::InvalidOldPassword)
            .with_detail("old_password", vec![ErrorCode::InvalidOldPassword.message()]));
    }
    check_new_password(&state, &req.new_password, "new_password")?;

    user::update_password(&state.pool, user.id, &hash_password(&req.new_password)?).await?;
    let revoked = refresh_token::revoke_all(&state.pool, user.id).await?;

    security_log!("INFO", "password_changed", user_id = user.id, revoked_tokens = revoked);
    Ok(Json(MessageResponse::new("Password changed successfully")))
}

/// GET /auth/me - 当前用户信息
pub async fn me(
    State(state): State<ServerState>,
    current_user: CurrentUser,
) -> AppResult<Json<UserInfo>> {
    let user = user::find_by_id(&state.pool, current_user.id)
        .await?
        .ok_or_else(|| AppError::new(ErrorCode::UserNotFound))?;
    Ok(Json(UserInfo::from(&user)))
}
