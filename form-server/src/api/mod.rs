//! API 路由模块
//!
//! # 结构
//!
//! - [`health`] - 健康检查
//! - [`auth`] - 登录、注册、令牌
//! - [`templates`] - 表单模板
//! - [`fields`] - 表单字段
//! - [`employees`] - 员工记录与搜索
//!
//! 除公共路径外，所有路由都经过 [`require_auth`]。

pub mod auth;
pub mod employees;
pub mod fields;
pub mod health;
pub mod templates;

use axum::{Router, middleware};

use crate::auth::require_auth;
use crate::core::ServerState;

/// 全部路由，已绑定状态
pub fn router(state: ServerState) -> Router {
    Router::new()
        .merge(health::router())
        .merge(auth::router())
        .merge(templates::router())
        .merge(fields::router())
        .merge(employees::router())
        .layer(middleware::from_fn_with_state(state.clone(), require_auth))
        .with_state(state)
}
