//! HTTP服务器生命周期管理

use super::{
    middleware::{create_middleware_stack, request_logger},
    routes::create_router,
    AppState,
};
use crate::commands::cli::ServeArgs;
use axum::middleware;
use launchpad_core::api::{get_launchpad_data_dir, AppContext, CliError};
use std::fs;
use std::net::SocketAddr;
use std::path::PathBuf;
use tokio::signal;
use tracing::{info, warn};
use uuid::Uuid;

const STATE_FILE: &str = "launchpad.state";

/// HTTP服务器配置
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

/// 获取服务器状态文件目录
fn get_servers_dir() -> Result<PathBuf, CliError> {
    let servers_dir = get_launchpad_data_dir()?.join("servers");
    fs::create_dir_all(&servers_dir)
        .map_err(|e| CliError::Server(format!("Failed to create servers directory: {e}")))?;
    Ok(servers_dir)
}

/// 写入服务器状态文件
fn write_state_file(session_id: &str, port: u16, host: &str) -> Result<(), CliError> {
    let state_file = get_servers_dir()?.join(STATE_FILE);

    let state = serde_json::json!({
        "session_id": session_id,
        "port": port,
        "pid": std::process::id(),
        "url": format!("http://{}:{}", host, port),
        "started_at": chrono::Local::now().to_rfc3339()
    });
    let body = serde_json::to_string_pretty(&state)
        .map_err(|e| CliError::Server(format!("Failed to encode state file: {e}")))?;

    fs::write(&state_file, body)
        .map_err(|e| CliError::Server(format!("Failed to write state file: {e}")))?;

    info!("State file written to: {}", state_file.display());
    Ok(())
}

fn remove_state_file() {
    let path = match get_servers_dir() {
        Ok(dir) => dir.join(STATE_FILE),
        Err(e) => {
            warn!("Failed to locate state file: {}", e);
            return;
        }
    };
    if let Err(e) = fs::remove_file(&path) {
        warn!("Failed to remove state file: {}", e);
    } else {
        info!("State file removed: {}", path.display());
    }
}

/// 处理 serve 命令
pub async fn handle_serve(args: ServeArgs, ctx: &AppContext) -> Result<(), CliError> {
    let session_id = args
        .session_id
        .unwrap_or_else(|| Uuid::new_v4().to_string());

    // CLI 参数优先，配置文件作为默认值
    let mut cfg = ctx.cfg().clone();
    if let Some(host) = args.host {
        cfg.http_server.host = host;
    }
    if let Some(port) = args.port {
        cfg.http_server.port = port;
    }
    if let Some(dir) = args.static_dir {
        cfg.http_server.static_dir = dir;
    }
    let ctx = ctx.with_config(cfg);
    let cfg = ctx.cfg().clone();

    let services = ctx.build_services().await?;
    info!(
        auth = services.auth.name(),
        scoring = services.scoring.name(),
        profiles = services.profiles.is_some(),
        "services ready"
    );

    let state = AppState::from_services(session_id.clone(), services, cfg.clone())?;

    write_state_file(&session_id, cfg.http_server.port, &cfg.http_server.host)?;

    let config = ServerConfig {
        host: cfg.http_server.host.clone(),
        port: cfg.http_server.port,
    };
    let result = start_server(session_id, config, state).await;
    remove_state_file();
    result
}

/// 启动HTTP服务器，直到收到关闭信号
pub async fn start_server(
    session_id: String,
    config: ServerConfig,
    state: AppState,
) -> Result<(), CliError> {
    info!(
        "Starting HTTP server on {}:{} (session: {})",
        config.host, config.port, session_id
    );

    let app = create_router(state)
        .layer(middleware::from_fn(request_logger))
        .layer(create_middleware_stack());

    let addr: SocketAddr = format!("{}:{}", config.host, config.port)
        .parse()
        .map_err(|e| CliError::Server(format!("invalid listen address: {e}")))?;

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    info!("HTTP server listening on http://{}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(async {
            tokio::select! {
                _ = signal::ctrl_c() => {
                    info!("Received Ctrl+C signal");
                }
                _ = wait_for_sigterm() => {
                    info!("Received SIGTERM signal");
                }
            }

            info!("Starting graceful shutdown...");
        })
        .await?;

    info!("Server shutdown complete");
    Ok(())
}

/// 等待 SIGTERM 信号（Unix系统）
#[cfg(unix)]
async fn wait_for_sigterm() {
    use tokio::signal::unix::{signal, SignalKind};

    match signal(SignalKind::terminate()) {
        Ok(mut sigterm) => {
            sigterm.recv().await;
        }
        Err(e) => {
            warn!("Failed to install SIGTERM handler: {}", e);
            std::future::pending::<()>().await
        }
    }
}

/// Windows 系统不支持 SIGTERM，使用空操作
#[cfg(not(unix))]
async fn wait_for_sigterm() {
    std::future::pending::<()>().await
}
