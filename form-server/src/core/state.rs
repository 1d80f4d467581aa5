//! 服务器状态
//!
//! 所有请求共享的句柄: 配置、连接池、JWT 服务。克隆开销很小。

use std::sync::Arc;

use sqlx::SqlitePool;

use crate::auth::JwtService;
use crate::core::Config;
use crate::db::DbService;
use crate::db::repository::employee::TemplateAccess;
use crate::utils::AppError;

#[derive(Clone, Debug)]
pub struct ServerState {
    pub config: Arc<Config>,
    pub pool: SqlitePool,
    jwt_service: Arc<JwtService>,
}

impl ServerState {
    pub fn new(config: Config, db: DbService) -> Self {
        let jwt_service = Arc::new(JwtService::with_config(config.jwt.clone()));
        Self {
            config: Arc::new(config),
            pool: db.pool,
            jwt_service,
        }
    }

    /// 打开数据库 (执行迁移) 并构造状态
    pub async fn initialize(config: Config) -> Result<Self, AppError> {
        if !config.database_url.contains(":memory:") {
            std::fs::create_dir_all(&config.work_dir).map_err(|e| {
                AppError::internal(format!("Cannot create work dir {}: {e}", config.work_dir))
            })?;
        }
        let db = DbService::new(&config.database_url).await?;
        Ok(Self::new(config, db))
    }

    pub fn get_jwt_service(&self) -> &JwtService {
        &self.jwt_service
    }

    pub fn template_access(&self) -> TemplateAccess {
        self.config.template_access()
    }
}
