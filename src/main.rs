use anyhow::Context;
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpListener;
use tracing::{info, warn};

use office_platform::infrastructure::config::{init_config, Config};
use office_platform::infrastructure::logger::Logger;
use office_platform::store::{memory::InMemoryStore, PlatformStore};
use office_platform::{build_router, AppState};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = init_config().context("加载配置失败")?;
    let _log_guard = Logger::init(&config.logging)?;

    info!("🚀 启动办公应用平台服务...");

    let store = open_store(config).await?;
    let state = AppState::new(config, store);
    state
        .rbac
        .ensure_defaults()
        .await
        .context("初始化内置角色失败")?;

    let app = build_router(state, Duration::from_secs(config.http.timeout_seconds));

    let addr = format!("{}:{}", config.http.bind_address, config.http.port);
    let listener = TcpListener::bind(&addr)
        .await
        .with_context(|| format!("无法绑定地址 {addr}"))?;
    info!("🌐 服务运行在 http://{}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("服务运行失败")?;

    info!("服务已停止");
    Ok(())
}

#[cfg(feature = "database")]
async fn open_store(config: &Config) -> anyhow::Result<Arc<dyn PlatformStore>> {
    use office_platform::infrastructure::database::DatabaseManager;
    use office_platform::store::postgres::PostgresStore;

    let Some(url) = config.database.url.as_deref() else {
        warn!("未配置 database.url，使用内存存储，重启后数据会丢失");
        return Ok(Arc::new(InMemoryStore::new()));
    };

    let db = DatabaseManager::new(url, &config.database)
        .await
        .context("连接数据库失败")?;
    if config.database.apply_schema {
        db.apply_schema().await.context("初始化表结构失败")?;
    }
    Ok(Arc::new(PostgresStore::new(db.get_pool().clone())))
}

#[cfg(not(feature = "database"))]
async fn open_store(config: &Config) -> anyhow::Result<Arc<dyn PlatformStore>> {
    if config.database.url.is_some() {
        warn!("未启用 database 特性，忽略 database.url");
    }
    warn!("使用内存存储，重启后数据会丢失");
    Ok(Arc::new(InMemoryStore::new()))
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        warn!(error = %err, "监听退出信号失败");
        std::future::pending::<()>().await;
    }
    info!("收到退出信号，正在关闭服务...");
}
