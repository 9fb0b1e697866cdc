//! HTTP中间件配置

use axum::{
    body::Body,
    extract::State,
    http::{header, HeaderMap, HeaderValue, Method, Request},
    middleware::Next,
    response::{IntoResponse, Redirect, Response},
};
use launchpad_core::api::{normalize_path, role_redirect, GateDecision, SessionRequest, SetCookie};
use std::collections::HashSet;
use std::time::{Duration, Instant};
use tower_http::{cors::CorsLayer, timeout::TimeoutLayer};
use tracing::{info, warn};

use super::state::{AppState, GateSession};

/// 创建中间件栈
pub fn create_middleware_stack() -> tower::layer::util::Stack<CorsLayer, TimeoutLayer> {
    tower::layer::util::Stack::new(create_cors_layer(), create_timeout_layer())
}

/// 创建CORS中间件 - 仅允许localhost
fn create_cors_layer() -> CorsLayer {
    CorsLayer::new()
        .allow_origin(tower_http::cors::AllowOrigin::predicate(
            |origin: &HeaderValue, _| {
                origin
                    .to_str()
                    .map(|s| {
                        s.starts_with("http://localhost")
                            || s.starts_with("https://localhost")
                            || s.starts_with("http://127.0.0.1")
                            || s.starts_with("https://127.0.0.1")
                    })
                    .unwrap_or(false)
            },
        ))
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION, header::ACCEPT])
        .allow_credentials(true)
        .max_age(Duration::from_secs(3600))
}

/// 创建超时中间件 - 30秒
fn create_timeout_layer() -> TimeoutLayer {
    TimeoutLayer::new(Duration::from_secs(30))
}

/// 访问控制中间件：按路由分类刷新会话，受保护路由无会话时重定向到登录页
///
/// 分类使用规范化后的路径（`//x`、`/a/../x` 与 `/x` 同类）。
pub async fn access_gate(
    State(state): State<AppState>,
    mut req: Request<Body>,
    next: Next,
) -> Response {
    let cookie_header = joined_cookie_header(req.headers());
    let path = normalize_path(req.uri().path());
    let session_req = SessionRequest::from_cookie_header(path, cookie_header.as_deref());

    match state.gate.evaluate(&session_req).await {
        GateDecision::Forward => next.run(req).await,
        GateDecision::ForwardWithSession(refresh) => {
            let session = GateSession {
                request: session_req.with_set_cookies(&refresh.set_cookies),
                user: refresh.user,
            };

            // 轮换后的 cookie 必须随角色跳转一起写回，否则刷新令牌已被消费
            if let Some(location) = role_section_redirect(&state, &session).await {
                let mut response = Redirect::to(&location).into_response();
                append_set_cookies(response.headers_mut(), &refresh.set_cookies);
                return response;
            }

            req.extensions_mut().insert(session);
            let mut response = next.run(req).await;
            append_set_cookies(response.headers_mut(), &refresh.set_cookies);
            response
        }
        GateDecision::Redirect { location } => Redirect::to(&location).into_response(),
    }
}

/// 角色分区检查：角色不符跳转到自己的仪表盘，无档案或查询失败跳转登录页
async fn role_section_redirect(state: &AppState, session: &GateSession) -> Option<String> {
    let path = session.request.path.as_str();
    let allowed = state.gate.required_roles(path)?;
    let login = state.gate.login_path();

    let Some(user) = session.user.as_ref() else {
        return Some(login.to_string());
    };
    let Some(profiles) = state.services.profiles.as_ref() else {
        warn!(
            target: "launchpad.gate",
            path = %path,
            "profile lookup not configured, role section closed"
        );
        return Some(login.to_string());
    };

    let profile = match profiles.profile(&session.request, user).await {
        Ok(profile) => profile,
        Err(e) => {
            state.record_error();
            warn!(
                target: "launchpad.gate",
                user_id = %user.id,
                path = %path,
                error = %e,
                "profile lookup failed, treating as no profile"
            );
            None
        }
    };

    let location = role_redirect(profile.as_ref(), allowed, login)?;
    tracing::debug!(
        target: "launchpad.gate",
        user_id = %user.id,
        path = %path,
        location = location,
        "role section denied"
    );
    Some(location.to_string())
}

/// HTTP/2 客户端可能把 Cookie 拆成多个头
pub(crate) fn joined_cookie_header(headers: &HeaderMap) -> Option<String> {
    let parts: Vec<&str> = headers
        .get_all(header::COOKIE)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .collect();
    if parts.is_empty() {
        None
    } else {
        Some(parts.join("; "))
    }
}

/// Handler 自己写过的同名 cookie 优先（例如 /logout 的清除）。
pub fn append_set_cookies(headers: &mut HeaderMap, cookies: &[SetCookie]) {
    let already_set: HashSet<String> = headers
        .get_all(header::SET_COOKIE)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .filter_map(|v| v.split_once('=').map(|(name, _)| name.trim().to_string()))
        .collect();

    for cookie in cookies {
        if already_set.contains(&cookie.name) {
            continue;
        }
        match HeaderValue::from_str(&cookie.header_value()) {
            Ok(value) => {
                headers.append(header::SET_COOKIE, value);
            }
            Err(e) => {
                warn!(target: "launchpad.gate", cookie = %cookie.name, error = %e, "dropping unrepresentable cookie");
            }
        }
    }
}

/// 请求日志中间件（手动实现，用于记录详细信息）
pub async fn request_logger(req: Request<Body>, next: Next) -> Response {
    let method = req.method().clone();
    let uri = req.uri().clone();
    let start = Instant::now();

    let response = next.run(req).await;

    let duration = start.elapsed();
    let status = response.status();

    if status.is_client_error() || status.is_server_error() {
        warn!(
            method = %method,
            uri = %uri,
            status = %status.as_u16(),
            duration_ms = %duration.as_millis(),
            "Request failed"
        );
    } else {
        info!(
            method = %method,
            uri = %uri,
            status = %status.as_u16(),
            duration_ms = %duration.as_millis(),
            "Request completed"
        );
    }

    response
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_append_set_cookies_keeps_handler_cookies() {
        let mut headers = HeaderMap::new();
        headers.append(
            header::SET_COOKIE,
            HeaderValue::from_static("lp-access-token=; Path=/; Max-Age=0"),
        );

        append_set_cookies(
            &mut headers,
            &[
                SetCookie::new("lp-access-token", "rotated", 60),
                SetCookie::new("lp-refresh-token", "r2", 60),
            ],
        );

        let values: Vec<&str> = headers
            .get_all(header::SET_COOKIE)
            .iter()
            .map(|v| v.to_str().unwrap())
            .collect();
        assert_eq!(values.len(), 2);
        assert!(values[0].starts_with("lp-access-token=;"));
        assert!(values[1].starts_with("lp-refresh-token=r2;"));
    }

    #[test]
    fn test_joined_cookie_header() {
        let mut headers = HeaderMap::new();
        assert_eq!(joined_cookie_header(&headers), None);

        headers.append(header::COOKIE, HeaderValue::from_static("a=1"));
        headers.append(header::COOKIE, HeaderValue::from_static("b=2"));
        assert_eq!(joined_cookie_header(&headers).as_deref(), Some("a=1; b=2"));
    }
}
