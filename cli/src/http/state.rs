//! HTTP服务器状态管理

use chrono::{DateTime, Local};
use launchpad_core::api::{AccessGate, AppConfig, ConfigError, Identity, Services, SessionRequest};
use std::collections::HashMap;
use std::sync::{Arc, RwLock};

/// 应用状态（在所有handlers间共享）
#[derive(Clone)]
pub struct AppState {
    pub session_id: String,
    pub gate: AccessGate,
    pub services: Arc<Services>,
    pub config: Arc<AppConfig>,
    pub stats: Arc<RwLock<ServerStats>>,
}

impl AppState {
    pub fn new(
        session_id: String,
        gate: AccessGate,
        services: Services,
        config: AppConfig,
    ) -> Self {
        Self {
            session_id,
            gate,
            services: Arc::new(services),
            config: Arc::new(config),
            stats: Arc::new(RwLock::new(ServerStats::new())),
        }
    }

    /// 由配置构建访问控制（路由表校验失败时返回错误）
    pub fn from_services(
        session_id: String,
        services: Services,
        config: AppConfig,
    ) -> Result<Self, ConfigError> {
        let gate = AccessGate::from_config(&config.gate, services.auth.clone())?;
        Ok(Self::new(session_id, gate, services, config))
    }

    pub fn record_request(&self, endpoint: &str) {
        if let Ok(mut stats) = self.stats.write() {
            stats.increment_request(endpoint);
        }
    }

    pub fn record_error(&self) {
        if let Ok(mut stats) = self.stats.write() {
            stats.increment_error();
        }
    }
}

/// 访问控制放行后写入请求扩展的会话信息
///
/// `request` 已应用本次刷新产生的 cookie，下游调用认证服务时使用轮换后的令牌。
#[derive(Debug, Clone)]
pub struct GateSession {
    pub request: SessionRequest,
    pub user: Option<Identity>,
}

/// 服务器统计信息
pub struct ServerStats {
    pub requests_total: u64,
    pub requests_by_endpoint: HashMap<String, u64>,
    pub errors_total: u64,
    pub start_time: DateTime<Local>,
}

impl ServerStats {
    pub fn new() -> Self {
        Self {
            requests_total: 0,
            requests_by_endpoint: HashMap::new(),
            errors_total: 0,
            start_time: Local::now(),
        }
    }

    pub fn increment_request(&mut self, endpoint: &str) {
        self.requests_total += 1;
        *self
            .requests_by_endpoint
            .entry(endpoint.to_string())
            .or_insert(0) += 1;
    }

    pub fn increment_error(&mut self) {
        self.errors_total += 1;
    }

    pub fn uptime_seconds(&self) -> f64 {
        let now = Local::now();
        (now - self.start_time).num_milliseconds() as f64 / 1000.0
    }
}

impl Default for ServerStats {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_server_stats_new() {
        let stats = ServerStats::new();
        assert_eq!(stats.requests_total, 0);
        assert_eq!(stats.errors_total, 0);
        assert!(stats.uptime_seconds() < 1.0);
    }

    #[test]
    fn test_increment_request() {
        let mut stats = ServerStats::new();
        stats.increment_request("/api/score");
        stats.increment_request("/api/score");
        stats.increment_request("/health");

        assert_eq!(stats.requests_total, 3);
        assert_eq!(stats.requests_by_endpoint.get("/api/score"), Some(&2));
        assert_eq!(stats.requests_by_endpoint.get("/health"), Some(&1));
    }

    #[test]
    fn test_increment_error() {
        let mut stats = ServerStats::new();
        stats.increment_error();
        stats.increment_error();
        assert_eq!(stats.errors_total, 2);
    }
}
