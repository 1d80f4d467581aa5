use crate::auth::JwtConfig;
use crate::db::repository::employee::TemplateAccess;
use crate::utils::{AppError, ErrorCode};

/// 服务器配置
///
/// # 环境变量
///
/// | 环境变量 | 默认值 | 说明 |
/// |----------|--------|------|
/// | WORK_DIR | ./data | 工作目录 |
/// | DATABASE_URL | sqlite:{WORK_DIR}/forms.db | SQLite 数据库 |
/// | HTTP_PORT | 8000 | HTTP 服务端口 |
/// | ENVIRONMENT | development | 运行环境 |
/// | LOG_LEVEL | info | 日志级别 |
/// | LOG_DIR | (无) | 日志目录，设置后按天滚动写文件 |
/// | JWT_SECRET | (开发环境自动生成) | 访问令牌签名密钥 |
/// | JWT_EXPIRATION_MINUTES | 60 | 访问令牌有效期 |
/// | JWT_ISSUER / JWT_AUDIENCE | form-server / form-clients | |
/// | REFRESH_TOKEN_DAYS | 7 | 刷新令牌有效期 (天) |
/// | ENFORCE_TEMPLATE_OWNERSHIP | false | 记录只能引用自己的模板 |
/// | MIN_PASSWORD_LENGTH | 8 | 注册/改密最小长度 |
/// | REQUEST_TIMEOUT_MS | 30000 | 请求超时(毫秒) |
#[derive(Debug, Clone)]
pub struct Config {
    /// 工作目录，存放数据库和日志
    pub work_dir: String,
    /// sqlx 连接串
    pub database_url: String,
    /// HTTP API 服务端口
    pub http_port: u16,
    /// 运行环境: development | staging | production
    pub environment: String,
    pub log_level: String,
    pub log_dir: Option<String>,
    /// JWT 认证配置
    pub jwt: JwtConfig,
    pub refresh_token_days: i64,
    /// 创建/更新记录时是否要求模板属于当前用户
    pub enforce_template_ownership: bool,
    pub min_password_length: usize,
    /// 请求超时时间 (毫秒)
    pub request_timeout_ms: u64,
}

fn env_or<T: std::str::FromStr>(key: &str, default: T) -> T {
    std::env::var(key)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}

impl Config {
    /// 从环境变量加载配置
    ///
    /// 如果环境变量未设置，使用默认值
    pub fn from_env() -> Result<Self, AppError> {
        let work_dir = std::env::var("WORK_DIR").unwrap_or_else(|_| "./data".into());
        let database_url = std::env::var("DATABASE_URL")
            .unwrap_or_else(|_| format!("sqlite:{work_dir}/forms.db"));
        let jwt = JwtConfig::from_env()
            .map_err(|e| AppError::with_message(ErrorCode::ConfigError, e.to_string()))?;

        Ok(Self {
            database_url,
            http_port: env_or("HTTP_PORT", 8000),
            environment: std::env::var("ENVIRONMENT").unwrap_or_else(|_| "development".into()),
            log_level: std::env::var("LOG_LEVEL").unwrap_or_else(|_| "info".into()),
            log_dir: std::env::var("LOG_DIR").ok().filter(|d| !d.is_empty()),
            jwt,
            refresh_token_days: env_or("REFRESH_TOKEN_DAYS", 7),
            enforce_template_ownership: env_or("ENFORCE_TEMPLATE_OWNERSHIP", false),
            min_password_length: env_or("MIN_PASSWORD_LENGTH", 8),
            request_timeout_ms: env_or("REQUEST_TIMEOUT_MS", 30000),
            work_dir,
        })
    }

    /// 测试配置: 内存数据库，固定密钥
    pub fn for_tests() -> Self {
        Self {
            work_dir: ".".into(),
            database_url: "sqlite::memory:".into(),
            http_port: 0,
            environment: "test".into(),
            log_level: "warn".into(),
            log_dir: None,
            jwt: JwtConfig {
                secret: "test-secret-with-at-least-thirty-two-chars".into(),
                expiration_minutes: 60,
                issuer: "form-server".into(),
                audience: "form-clients".into(),
            },
            refresh_token_days: 7,
            enforce_template_ownership: false,
            min_password_length: 8,
            request_timeout_ms: 30000,
        }
    }

    pub fn template_access(&self) -> TemplateAccess {
        if self.enforce_template_ownership {
            TemplateAccess::OwnedOnly
        } else {
            TemplateAccess::Any
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_template_access_follows_flag() {
        let mut config = Config::for_tests();
        assert_eq!(config.template_access(), TemplateAccess::Any);
        config.enforce_template_ownership = true;
        assert_eq!(config.template_access(), TemplateAccess::OwnedOnly);
    }

    #[test]
    fn test_env_or_falls_back_on_garbage() {
        assert_eq!(env_or("FORM_SERVER_SURELY_UNSET_VAR", 42u16), 42);
    }
}
