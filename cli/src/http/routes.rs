//! HTTP路由handlers

use anyhow::Error;
use axum::{
    extract::{Path, Query, State},
    http::{header, HeaderMap},
    middleware,
    response::{IntoResponse, Redirect, Response},
    routing::{get, post},
    Extension, Json, Router,
};
use chrono::Local;
use launchpad_core::api::{
    match_quality_label, normalize_score, resolve_dashboard, AssessmentAnswers, PortfolioPayload,
    ProjectEntry, SessionRequest, StudentComment, WorkExperience,
};
use launchpad_plugins::http::{HttpCallError, HttpCallErrorKind};
use serde_json::Value;
use std::future::Future;
use tower_http::services::ServeDir;

use crate::http::{
    middleware::{access_gate, append_set_cookies, joined_cookie_header},
    models::*,
    state::{AppState, GateSession},
    validation::{
        validate_answers, validate_comment, validate_project, validate_scores, validate_user_id,
        validate_work_experience,
    },
};

/// 创建所有路由
///
/// `/health` 不经过访问控制，其余路由与静态文件都在访问控制之后。
/// `/api` 前缀默认被访问控制跳过；角色接口自行读取访问令牌。
pub fn create_router(state: AppState) -> Router {
    let gated = Router::new()
        .route("/redirect", get(redirect_handler))
        .route("/logout", post(logout_handler))
        .route("/api/score", post(score_handler))
        .route("/api/portfolio", get(load_portfolio_handler))
        .route("/api/portfolio/generate", post(generate_portfolio_handler))
        .route("/api/portfolio/save", post(save_portfolio_handler))
        .route("/api/school", get(school_handler))
        .route("/api/student/assessment", post(student_assessment_handler))
        .route("/api/student/profile", get(student_profile_handler))
        .route(
            "/api/student/work-experience",
            post(add_work_experience_handler),
        )
        .route("/api/student/project", post(add_project_handler))
        .route("/api/teacher/students", get(teacher_students_handler))
        .route("/api/teacher/student/:id", get(teacher_student_handler))
        .route("/api/teacher/comment", post(add_comment_handler))
        .route("/api/admin/students", get(admin_students_handler))
        .route("/api/admin/student/:id", get(admin_student_handler))
        .route("/api/admin/stats", get(school_stats_handler))
        .fallback_service(ServeDir::new(&state.config.http_server.static_dir))
        .layer(middleware::from_fn_with_state(state.clone(), access_gate));

    Router::new()
        .route("/health", get(health_handler))
        .merge(gated)
        .with_state(state)
}

/// GET /health - 健康检查
async fn health_handler(State(state): State<AppState>) -> Json<HealthResponse> {
    state.record_request("/health");

    let (uptime_seconds, requests_handled, requests_by_endpoint, errors_total) = state
        .stats
        .read()
        .map(|s| {
            (
                s.uptime_seconds(),
                s.requests_total,
                s.requests_by_endpoint.clone(),
                s.errors_total,
            )
        })
        .unwrap_or_default();

    Json(HealthResponse {
        status: "healthy".into(),
        session_id: state.session_id.clone(),
        uptime_seconds,
        requests_handled,
        requests_by_endpoint,
        errors_total,
        auth_provider: state.services.auth.name().to_string(),
        scoring_api: state.services.scoring.name().to_string(),
        timestamp: Local::now().to_rfc3339(),
    })
}

/// GET /redirect - 按角色跳转到对应的仪表盘
async fn redirect_handler(
    State(state): State<AppState>,
    session: Option<Extension<GateSession>>,
) -> Redirect {
    state.record_request("/redirect");
    let login = state.gate.login_path();

    let Some(Extension(session)) = session else {
        return Redirect::to(login);
    };
    let Some(user) = session.user.as_ref() else {
        return Redirect::to(login);
    };
    let Some(profiles) = state.services.profiles.as_ref() else {
        tracing::warn!(target: "launchpad.auth", "profile lookup not configured");
        return Redirect::to(login);
    };

    let profile = match profiles.profile(&session.request, user).await {
        Ok(profile) => profile,
        Err(e) => {
            state.record_error();
            tracing::warn!(
                target: "launchpad.auth",
                user_id = %user.id,
                error = %e,
                "profile lookup failed"
            );
            None
        }
    };

    let target = resolve_dashboard(profile.as_ref(), login);
    tracing::debug!(target: "launchpad.auth", user_id = %user.id, location = target, "dashboard redirect");
    Redirect::to(target)
}

/// POST /logout - 注销并清除会话cookie，跳转到首页
async fn logout_handler(
    State(state): State<AppState>,
    session: Option<Extension<GateSession>>,
    headers: HeaderMap,
) -> Result<Response, HttpServerError> {
    state.record_request("/logout");

    let req = match session {
        Some(Extension(session)) => session.request,
        None => SessionRequest::from_cookie_header(
            "/logout",
            headers.get(header::COOKIE).and_then(|v| v.to_str().ok()),
        ),
    };

    let cookies = state.services.auth.sign_out(&req).await.map_err(|e| {
        state.record_error();
        HttpServerError::AuthService(format_error_chain(&e))
    })?;

    let mut response = Redirect::to("/").into_response();
    append_set_cookies(response.headers_mut(), &cookies);
    Ok(response)
}

/// POST /api/score - 归一化原始匹配分数
async fn score_handler(
    State(state): State<AppState>,
    Json(req): Json<ScoreRequest>,
) -> Result<Json<ScoreResponse>, HttpServerError> {
    state.record_request("/api/score");
    validate_scores(&req.scores)?;

    let data = req
        .scores
        .into_iter()
        .map(|score| {
            let percentage = normalize_score(score);
            ScoreEntry {
                score,
                percentage,
                label: match_quality_label(percentage),
            }
        })
        .collect();

    Ok(Json(ScoreResponse {
        success: true,
        data,
    }))
}

/// POST /api/portfolio/generate - 根据测评答案生成作品集
async fn generate_portfolio_handler(
    State(state): State<AppState>,
    Json(answers): Json<AssessmentAnswers>,
) -> Result<Json<PassthroughResponse>, HttpServerError> {
    state.record_request("/api/portfolio/generate");
    validate_answers(&answers)?;

    state
        .services
        .scoring
        .generate_portfolio(&answers)
        .await
        .map(|data| Json(PassthroughResponse::ok(data)))
        .map_err(|e| scoring_failure(&state, "generate portfolio", e))
}

/// POST /api/portfolio/save - 保存作品集
async fn save_portfolio_handler(
    State(state): State<AppState>,
    Json(payload): Json<PortfolioPayload>,
) -> Result<Json<PassthroughResponse>, HttpServerError> {
    state.record_request("/api/portfolio/save");
    validate_user_id(&payload.user_id)?;

    state
        .services
        .scoring
        .save_portfolio(&payload)
        .await
        .map(|data| Json(PassthroughResponse::ok(data)))
        .map_err(|e| scoring_failure(&state, "save portfolio", e))
}

/// GET /api/portfolio?user_id= - 读取作品集
async fn load_portfolio_handler(
    State(state): State<AppState>,
    Query(query): Query<LoadPortfolioQuery>,
) -> Result<Json<PassthroughResponse>, HttpServerError> {
    state.record_request("/api/portfolio");
    validate_user_id(&query.user_id)?;

    state
        .services
        .scoring
        .load_portfolio(&query.user_id)
        .await
        .map(|data| Json(PassthroughResponse::ok(data)))
        .map_err(|e| scoring_failure(&state, "load portfolio", e))
}

/// 以调用者的访问 cookie 构造会话视图
fn cookie_session(path: &str, headers: &HeaderMap) -> SessionRequest {
    SessionRequest::from_cookie_header(path, joined_cookie_header(headers).as_deref())
}

/// 角色接口使用调用者自己的访问令牌
fn caller_token(state: &AppState, headers: &HeaderMap) -> Result<String, HttpServerError> {
    cookie_session("", headers)
        .cookie(&state.config.auth.access_cookie)
        .map(str::to_string)
        .ok_or(HttpServerError::NotAuthenticated)
}

async fn passthrough<F>(
    state: &AppState,
    action: &str,
    call: F,
) -> Result<Json<PassthroughResponse>, HttpServerError>
where
    F: Future<Output = anyhow::Result<Value>>,
{
    call.await
        .map(|data| Json(PassthroughResponse::ok(data)))
        .map_err(|e| scoring_failure(state, action, e))
}

/// GET /api/school - 当前用户所在学校（无学校时 data 为 null）
async fn school_handler(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<Json<PassthroughResponse>, HttpServerError> {
    state.record_request("/api/school");
    let req = cookie_session("/api/school", &headers);

    let auth_failure = |e: Error| {
        state.record_error();
        HttpServerError::AuthService(format_error_chain(&e))
    };

    let user = state
        .services
        .auth
        .get_session(&req)
        .await
        .map_err(auth_failure)?
        .ok_or(HttpServerError::NotAuthenticated)?;
    let Some(profiles) = state.services.profiles.as_ref() else {
        return Err(HttpServerError::Internal(
            "profile lookup not configured".to_string(),
        ));
    };
    let profile = profiles
        .profile(&req, &user)
        .await
        .map_err(auth_failure)?
        .ok_or(HttpServerError::NotAuthenticated)?;

    let school = match profile.school_id.as_deref() {
        Some(school_id) => profiles.school(&req, school_id).await.map_err(auth_failure)?,
        None => None,
    };
    let data = serde_json::to_value(school)
        .map_err(|e| HttpServerError::Internal(format!("encode school failed: {e}")))?;
    Ok(Json(PassthroughResponse::ok(data)))
}

/// POST /api/student/assessment - 提交并保存测评
async fn student_assessment_handler(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(answers): Json<AssessmentAnswers>,
) -> Result<Json<PassthroughResponse>, HttpServerError> {
    state.record_request("/api/student/assessment");
    let token = caller_token(&state, &headers)?;
    validate_answers(&answers)?;

    let result = state
        .services
        .roles
        .submit_assessment(&token, &answers)
        .await
        .map_err(|e| scoring_failure(&state, "submit assessment", e))?;
    let data = serde_json::to_value(result)
        .map_err(|e| HttpServerError::Internal(format!("encode assessment failed: {e}")))?;
    Ok(Json(PassthroughResponse::ok(data)))
}

async fn student_profile_handler(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<Json<PassthroughResponse>, HttpServerError> {
    state.record_request("/api/student/profile");
    let token = caller_token(&state, &headers)?;
    passthrough(
        &state,
        "load student profile",
        state.services.roles.student_profile(&token),
    )
    .await
}

async fn add_work_experience_handler(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(entry): Json<WorkExperience>,
) -> Result<Json<PassthroughResponse>, HttpServerError> {
    state.record_request("/api/student/work-experience");
    let token = caller_token(&state, &headers)?;
    validate_work_experience(&entry)?;
    passthrough(
        &state,
        "add work experience",
        state.services.roles.add_work_experience(&token, &entry),
    )
    .await
}

async fn add_project_handler(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(project): Json<ProjectEntry>,
) -> Result<Json<PassthroughResponse>, HttpServerError> {
    state.record_request("/api/student/project");
    let token = caller_token(&state, &headers)?;
    validate_project(&project)?;
    passthrough(
        &state,
        "add project",
        state.services.roles.add_project(&token, &project),
    )
    .await
}

async fn teacher_students_handler(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<Json<PassthroughResponse>, HttpServerError> {
    state.record_request("/api/teacher/students");
    let token = caller_token(&state, &headers)?;
    passthrough(
        &state,
        "load students",
        state.services.roles.teacher_students(&token),
    )
    .await
}

async fn teacher_student_handler(
    State(state): State<AppState>,
    Path(student_id): Path<String>,
    headers: HeaderMap,
) -> Result<Json<PassthroughResponse>, HttpServerError> {
    state.record_request("/api/teacher/student");
    let token = caller_token(&state, &headers)?;
    validate_user_id(&student_id)?;
    passthrough(
        &state,
        "load student profile",
        state.services.roles.teacher_student(&token, &student_id),
    )
    .await
}

async fn add_comment_handler(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(comment): Json<StudentComment>,
) -> Result<Json<PassthroughResponse>, HttpServerError> {
    state.record_request("/api/teacher/comment");
    let token = caller_token(&state, &headers)?;
    validate_comment(&comment)?;
    passthrough(
        &state,
        "add comment",
        state.services.roles.add_comment(&token, &comment),
    )
    .await
}

async fn admin_students_handler(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<Json<PassthroughResponse>, HttpServerError> {
    state.record_request("/api/admin/students");
    let token = caller_token(&state, &headers)?;
    passthrough(
        &state,
        "load school students",
        state.services.roles.admin_students(&token),
    )
    .await
}

async fn admin_student_handler(
    State(state): State<AppState>,
    Path(student_id): Path<String>,
    headers: HeaderMap,
) -> Result<Json<PassthroughResponse>, HttpServerError> {
    state.record_request("/api/admin/student");
    let token = caller_token(&state, &headers)?;
    validate_user_id(&student_id)?;
    passthrough(
        &state,
        "load student profile",
        state.services.roles.admin_student(&token, &student_id),
    )
    .await
}

async fn school_stats_handler(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<Json<PassthroughResponse>, HttpServerError> {
    state.record_request("/api/admin/stats");
    let token = caller_token(&state, &headers)?;
    passthrough(
        &state,
        "load school stats",
        state.services.roles.school_stats(&token),
    )
    .await
}

fn scoring_failure(state: &AppState, action: &str, err: Error) -> HttpServerError {
    state.record_error();
    let error_chain = format_error_chain(&err);
    let (error_class, error_status, error_url) = scoring_error_class(&err);
    tracing::warn!(
        target: "launchpad.api",
        error_class = %error_class,
        error_status = ?error_status,
        error_url = ?error_url,
        error_chain = %error_chain,
        "Failed to {action}"
    );

    // 上游拒绝调用者令牌：透传 401/403
    match error_status {
        Some(401) => HttpServerError::NotAuthenticated,
        Some(403) => HttpServerError::Forbidden(error_chain),
        _ if error_class == HttpCallErrorKind::Timeout.as_str() => HttpServerError::Timeout,
        _ => HttpServerError::ScoringService(error_chain),
    }
}

fn scoring_error_class(err: &Error) -> (String, Option<u16>, Option<String>) {
    for cause in err.chain() {
        if let Some(http_err) = cause.downcast_ref::<HttpCallError>() {
            return (
                http_err.kind().to_string(),
                http_err.status(),
                http_err.url().map(|url| url.to_string()),
            );
        }
    }

    ("unknown".to_string(), None, None)
}

fn format_error_chain(err: &Error) -> String {
    err.chain()
        .map(|cause| cause.to_string())
        .collect::<Vec<_>>()
        .join(" -> ")
}
