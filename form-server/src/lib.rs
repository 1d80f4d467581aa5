//! Form Server - 动态表单构建与员工记录存储
//!
//! # 架构概述
//!
//! - **认证** (`auth`): JWT 访问令牌 + 可轮换的刷新令牌, Argon2 密码哈希
//! - **数据库** (`db`): SQLite 连接池与仓储层, 所有查询按所有者过滤
//! - **HTTP API** (`api`): 模板、字段、员工记录与搜索
//!
//! # 模块结构
//!
//! ```text
//! form-server/src/
//! ├── core/          # 配置、状态、服务器
//! ├── auth/          # JWT 认证、密码
//! ├── api/           # HTTP 路由和处理器
//! ├── utils/         # 错误、日志、校验
//! └── db/            # 数据库层
//! ```

pub mod api;
pub mod auth;
pub mod core;
pub mod db;
pub mod utils;

// Re-export 公共类型
pub use auth::{CurrentUser, JwtService};
pub use core::{Config, Server, ServerState, build_app};
pub use db::DbService;
pub use utils::{ApiResponse, AppError, AppResult, ErrorCategory, ErrorCode};

// Re-export logger functions
pub use utils::logger::init_logger_with_file;

// Security logging macro - 支持 tracing 格式说明符
#[macro_export]
macro_rules! security_log {
    ($level:expr, $event:expr, $($key:ident = $value:expr),*) => {
        tracing::info!(
            target: "security",
            level = $level,
            event = $event,
            $($key = $value),*
        );
    };
}

pub fn print_banner() {
    println!(
        r#"
    ______
   / ____/___  _________ ___
  / /_  / __ \/ ___/ __ `__ \
 / __/ / /_/ / /  / / / / / /
/_/    \____/_/  /_/ /_/ /_/
    "#
    );
}
