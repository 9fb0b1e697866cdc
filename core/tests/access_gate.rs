mod common;

use common::{CountingAuth, ACCESS_COOKIE};
use launchpad_core::config::GateConfig;
use launchpad_core::gate::{AccessGate, GateDecision, SessionRequest};

fn gate(auth: std::sync::Arc<CountingAuth>) -> AccessGate {
    AccessGate::from_config(&GateConfig::default(), auth).expect("default gate config is valid")
}

#[tokio::test]
async fn static_asset_is_forwarded_without_auth_call() {
    let auth = CountingAuth::new("good");
    let gate = gate(auth.clone());

    let decision = gate
        .evaluate(&SessionRequest::new("/_next/static/chunk.js"))
        .await;

    assert_eq!(decision, GateDecision::Forward);
    assert_eq!(auth.calls(), 0);
}

#[tokio::test]
async fn skipped_paths_never_reach_the_provider() {
    let auth = CountingAuth::new("good");
    let gate = gate(auth.clone());

    for path in ["/api/portfolio/save", "/favicon.ico", "/_next/image"] {
        let req = SessionRequest::new(path).with_cookie(ACCESS_COOKIE, "good");
        assert_eq!(gate.evaluate(&req).await, GateDecision::Forward, "{path}");
    }
    assert_eq!(auth.calls(), 0);
}

#[tokio::test]
async fn dashboard_with_valid_session_forwards_with_cookies() {
    let auth = CountingAuth::new("good");
    let gate = gate(auth.clone());

    let req = SessionRequest::new("/dashboard").with_cookie(ACCESS_COOKIE, "good");
    let decision = gate.evaluate(&req).await;

    let GateDecision::ForwardWithSession(refresh) = decision else {
        panic!("expected forward with refreshed session");
    };
    assert_eq!(refresh.user.map(|u| u.id).as_deref(), Some("student-1"));
    assert_eq!(refresh.set_cookies.len(), 1);
    assert_eq!(refresh.set_cookies[0].name, ACCESS_COOKIE);
    assert_eq!(auth.calls(), 1);
}

#[tokio::test]
async fn dashboard_without_session_redirects_to_login() {
    let auth = CountingAuth::new("good");
    let gate = gate(auth.clone());

    for req in [
        SessionRequest::new("/dashboard"),
        SessionRequest::new("/dashboard").with_cookie(ACCESS_COOKIE, "expired"),
        SessionRequest::new("/teacher/student/9").with_cookie(ACCESS_COOKIE, "expired"),
    ] {
        assert_eq!(
            gate.evaluate(&req).await,
            GateDecision::Redirect {
                location: "/login".into()
            }
        );
    }
    assert_eq!(auth.calls(), 3);
}

#[tokio::test]
async fn public_routes_forward_regardless_of_session() {
    let auth = CountingAuth::new("good");
    let gate = gate(auth.clone());

    for path in ["/", "/login", "/login/callback"] {
        let anon = gate.evaluate(&SessionRequest::new(path)).await;
        assert!(anon.is_forward(), "{path}: {anon:?}");

        let signed_in = gate
            .evaluate(&SessionRequest::new(path).with_cookie(ACCESS_COOKIE, "good"))
            .await;
        assert!(signed_in.is_forward(), "{path}: {signed_in:?}");
    }
    // Public routes still refresh the session once per request.
    assert_eq!(auth.calls(), 6);
}

#[tokio::test]
async fn same_request_yields_same_decision() {
    let auth = CountingAuth::new("good");
    let gate = gate(auth);

    for req in [
        SessionRequest::new("/student"),
        SessionRequest::new("/student").with_cookie(ACCESS_COOKIE, "good"),
        SessionRequest::new("/login"),
    ] {
        let first = gate.evaluate(&req).await;
        let second = gate.evaluate(&req).await;
        assert_eq!(first, second);
    }
}

#[tokio::test]
async fn doubled_slashes_cannot_borrow_the_public_root() {
    let auth = CountingAuth::new("good");
    let gate = gate(auth.clone());

    for path in ["//dashboard", "//student/portfolio", "/./dashboard", "/login/../admin"] {
        let decision = gate.evaluate(&SessionRequest::new(path)).await;
        assert_eq!(
            decision,
            GateDecision::Redirect {
                location: "/login".into()
            },
            "{path}"
        );
    }
}
