// ==========================================
// 维修门店分析驾驶舱 - HTTP 服务主入口
// ==========================================
// 启动顺序: 日志 -> 配置 -> 语言 -> 连接池/建表 -> 路由 -> 监听
// 退出: Ctrl-C 优雅停机
// ==========================================

use anyhow::Context;
use repair_dashboard::{app::build_router, config::AppConfig, i18n, logging, AppState};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // 初始化日志系统
    logging::init();

    tracing::info!("==================================================");
    tracing::info!("维修门店分析驾驶舱");
    tracing::info!("系统版本: {}", repair_dashboard::VERSION);
    tracing::info!("==================================================");

    let config = AppConfig::from_env().context("加载配置失败")?;
    i18n::set_locale(&config.locale);
    tracing::info!(db_path = %config.db_path, locale = %config.locale, "使用数据库");

    let state = AppState::new(&config)
        .await
        .context("无法初始化AppState")?;
    tracing::info!("AppState初始化成功");

    let app = build_router(state);

    let listener = tokio::net::TcpListener::bind(config.bind_addr)
        .await
        .with_context(|| format!("绑定监听地址失败: {}", config.bind_addr))?;
    tracing::info!("HTTP 服务监听: http://{}", config.bind_addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("HTTP 服务异常退出")?;

    tracing::info!("HTTP 服务已停止");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::warn!(error = %e, "无法监听 Ctrl-C 信号");
        // 无法监听时不触发停机，服务持续运行
        std::future::pending::<()>().await;
    }
    tracing::info!("收到 Ctrl-C，开始优雅停机");
}
