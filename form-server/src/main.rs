use form_server::{Config, Server, init_logger_with_file, print_banner};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // 1. 环境变量 (.env 可选)
    dotenv::dotenv().ok();

    // 2. 加载配置
    let config = Config::from_env()?;

    // 3. 日志
    init_logger_with_file(Some(&config.log_level), config.log_dir.as_deref());
    print_banner();
    tracing::info!(
        environment = %config.environment,
        database = %config.database_url,
        "Form server starting..."
    );

    // 4. 启动 HTTP 服务器
    if let Err(e) = Server::new(config).run().await {
        tracing::error!("Server error: {}", e);
        return Err(e.into());
    }

    Ok(())
}
