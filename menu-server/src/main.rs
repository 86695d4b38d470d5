use anyhow::Context;
use menu_server::{Config, Server, ServerState, print_banner, setup_environment};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // 1. 设置环境 (dotenv, 日志)
    setup_environment()?;

    // 打印横幅
    print_banner();

    tracing::info!("Menu server starting...");

    // 2. 加载配置
    let config = Config::from_env();
    tracing::info!(
        environment = %config.environment,
        port = config.http_port,
        timezone = %config.timezone,
        policy = %config.unresolved_line_policy,
        "Configuration loaded"
    );

    // 3. 初始化服务器状态 (工作目录、数据库迁移)
    let state = ServerState::initialize(&config)
        .await
        .context("Failed to initialize server state")?;

    // 4. 启动 HTTP 服务器
    let server = Server::with_state(config, state);

    if let Err(e) = server.run().await {
        tracing::error!("Server error: {}", e);
        return Err(e.into());
    }

    Ok(())
}
