//! # API Gateway Auth 主程序
//!
//! 加载配置、初始化数据库与认证组件，然后启动 HTTP 服务

use api_gateway_auth::{
    AppContext, GatewayError, Result,
    config::ConfigManager,
    database, lerror, linfo,
    logging::{self, LogComponent, LogStage},
    management::GatewayServer,
};
use clap::Parser;
use std::path::PathBuf;
use std::sync::Arc;

/// 命令行参数
#[derive(Debug, Parser)]
#[command(name = "api-gateway-auth", version, about = "Gateway request authentication service")]
struct Args {
    /// 配置文件路径，缺省时按 RUST_ENV 选择 config/config.{env}.toml
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// 日志级别（RUST_LOG 优先）
    #[arg(long)]
    log_level: Option<String>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();
    logging::init_optimized_logging(args.log_level.as_ref());

    if let Err(e) = run(args).await {
        lerror!(
            "system",
            LogStage::Startup,
            LogComponent::Main,
            "service_start_failed",
            &format!("服务启动失败: {e:?}")
        );
        return Err(e);
    }

    linfo!(
        "system",
        LogStage::Shutdown,
        LogComponent::Main,
        "service_shutdown",
        "服务正常关闭"
    );
    Ok(())
}

async fn run(args: Args) -> Result<()> {
    let manager = match args.config {
        Some(path) => ConfigManager::from_file(&path).await?,
        None => ConfigManager::new().await?,
    };
    let config = Arc::new(manager.get_config().await);

    let db = database::init_database(&config.database).await?;
    database::run_migrations(&db)
        .await
        .map_err(|e| GatewayError::database_with_source("数据库迁移失败", e))?;

    let context = AppContext::from_config(config, Arc::new(db))?;

    linfo!(
        "system",
        LogStage::Startup,
        LogComponent::Main,
        "service_starting",
        "服务启动"
    );
    GatewayServer::new(Arc::new(context)).serve().await
}
