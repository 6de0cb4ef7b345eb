use aurum_server::{Config, Server, ServerState, print_banner, setup_environment};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // 1. 设置环境 (dotenv, 日志)
    setup_environment();

    print_banner();

    tracing::info!("AurumLedger server starting...");

    // 2. 加载配置
    let config = Config::from_env()?;
    tracing::info!(
        db = %config.db_path.display(),
        auth_file = %config.auth_file.display(),
        timezone = %config.timezone,
        revenue_guard = config.revenue_guard,
        environment = %config.environment,
        log_level = %config.log_level,
        log_dir = config.log_dir.as_deref().unwrap_or("-"),
        "Configuration loaded"
    );

    // 3. 初始化服务器状态 (恢复 / 备份 / 迁移 / 班别规范化)
    let state = ServerState::initialize(&config).await?;

    // 4. 启动 HTTP 服务器
    let server = Server::with_state(config, state);

    if let Err(e) = server.run().await {
        tracing::error!("Server error: {}", e);
        return Err(e.into());
    }

    Ok(())
}
