//! 认证 API 模块
//!
//! | 路径 | 方法 | 认证 |
//! |------|------|------|
//! | /auth/login | POST | 无 |
//! | /auth/register | POST | 无 |
//! | /auth/refresh | POST | 无 |
//! | /auth/logout | POST | 无 |
//! | /auth/change-password | POST | 需要 |
//! | /auth/me | GET | 需要 |

mod handler;

use axum::{
    Router,
    routing::{get, post},
};

use crate::core::ServerState;

pub fn router() -> Router<ServerState> {
    Router::new().nest("/auth", routes())
}

fn routes() -> Router<ServerState> {
    Router::new()
        .route("/login", post(handler::login))
        .route("/register", post(handler::register))
        .route("/refresh", post(handler::refresh))
        .route("/logout", post(handler::logout))
        .route("/change-password", post(handler::change_password))
        .route("/me", get(handler::me))
}
