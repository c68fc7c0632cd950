use std::sync::Arc;

use serde_json::json;
use talentrack_auth::storage::{ACCESS_KEY, CONTEXT_KEY, FULL_NAME_KEY, REFRESH_KEY, SESSION_KEYS};
use talentrack_auth::{
    ApiResponse, ClientConfig, LoginError, LoginRequest, ScopeKind, SessionService, StorageScope,
    TransportError,
};
use talentrack_test_support::fixtures::{SessionFixture, Seeded, anonymous, login_body, seeded};
use talentrack_test_support::mocks::ScriptedTransport;

fn service(transport: &Arc<ScriptedTransport>, seeded: &Seeded) -> SessionService<ScriptedTransport> {
    SessionService::new(
        Arc::clone(transport),
        Arc::clone(&seeded.repository),
        &ClientConfig::default(),
    )
}

fn backend(login: ApiResponse, me: ApiResponse) -> Arc<ScriptedTransport> {
    Arc::new(ScriptedTransport::new(move |request| {
        if request.url.ends_with("/api/auth/login/") {
            Ok(login.clone())
        } else if request.url.ends_with("/api/auth/me/") {
            Ok(me.clone())
        } else {
            Ok(ApiResponse::new(404))
        }
    }))
}

fn request(remember: bool) -> LoginRequest {
    LoginRequest {
        email: "  ana@empresa.com ".to_string(),
        password: "s3cret ".to_string(),
        remember,
    }
}

#[tokio::test]
async fn remembered_login_uses_durable_scope_and_clears_the_other() -> anyhow::Result<()> {
    let seeded = seeded(
        ScopeKind::Ephemeral,
        &SessionFixture::logged_in("auditor", "/auditor/inicio"),
    );
    let transport = backend(
        ApiResponse::json_body(200, &login_body("manager", "/manager/inicio")),
        ApiResponse::json_body(200, &json!({ "full_name": "Ana Pérez" })),
    );

    let outcome = service(&transport, &seeded).login(&request(true)).await?;

    assert_eq!(outcome.scope, ScopeKind::Durable);
    assert_eq!(outcome.redirect_to, "/manager/inicio");
    assert_eq!(outcome.display_name.as_deref(), Some("Ana Pérez"));
    assert_eq!(seeded.durable.get(ACCESS_KEY).as_deref(), Some("login-access"));
    assert_eq!(seeded.durable.get(REFRESH_KEY).as_deref(), Some("login-refresh"));
    assert_eq!(seeded.durable.get(FULL_NAME_KEY).as_deref(), Some("Ana Pérez"));
    assert!(seeded.ephemeral.is_empty());
    assert_eq!(seeded.repository.active_kind(), ScopeKind::Durable);

    let stored = seeded.durable.get(CONTEXT_KEY).unwrap_or_default();
    let stored: serde_json::Value = serde_json::from_str(&stored)?;
    assert_eq!(stored["rol"], json!("manager"));
    assert_eq!(stored["empresa_id"], json!(3));
    Ok(())
}

#[tokio::test]
async fn login_sends_trimmed_email_and_bearer_profile_lookup() -> anyhow::Result<()> {
    let seeded = anonymous();
    let transport = backend(
        ApiResponse::json_body(200, &login_body("empleado", "/empleado/inicio")),
        ApiResponse::json_body(200, &json!({ "full_name": "Luis" })),
    );

    service(&transport, &seeded).login(&request(false)).await?;

    let sent = transport.requests();
    assert_eq!(sent.len(), 2);
    let body: serde_json::Value = serde_json::from_slice(sent[0].body.as_deref().unwrap_or_default())?;
    assert_eq!(body, json!({ "email": "ana@empresa.com", "password": "s3cret " }));
    assert!(!sent[0].headers.contains("Authorization"));
    assert_eq!(sent[1].headers.get("authorization"), Some("Bearer login-access"));
    assert!(seeded.durable.is_empty());
    assert_eq!(seeded.ephemeral.get(FULL_NAME_KEY).as_deref(), Some("Luis"));
    Ok(())
}

#[tokio::test]
async fn rejected_login_surfaces_server_detail() {
    let seeded = anonymous();
    let transport = backend(
        ApiResponse::json_body(401, &json!({ "detail": "Credenciales inválidas" })),
        ApiResponse::new(500),
    );

    let result = service(&transport, &seeded).login(&request(true)).await;

    match result {
        Err(LoginError::Rejected { status, detail }) => {
            assert_eq!(status, 401);
            assert_eq!(detail.as_deref(), Some("Credenciales inválidas"));
        }
        other => panic!("unexpected login result: {other:?}"),
    }
    assert_eq!(transport.total(), 1);
    assert!(seeded.durable.is_empty());
}

#[tokio::test]
async fn incomplete_login_response_writes_nothing() {
    let seeded = anonymous();
    let transport = backend(
        ApiResponse::json_body(
            200,
            &json!({ "access": "a", "refresh": "r", "context": { "rol": "rrhh" } }),
        ),
        ApiResponse::new(500),
    );

    let result = service(&transport, &seeded).login(&request(false)).await;

    assert!(matches!(result, Err(LoginError::IncompleteResponse)));
    assert!(seeded.durable.is_empty());
    assert!(seeded.ephemeral.is_empty());
}

#[tokio::test]
async fn profile_failure_does_not_fail_login() -> anyhow::Result<()> {
    let seeded = anonymous();
    let transport = backend(
        ApiResponse::json_body(200, &login_body("rrhh", "/rrhh/inicio")),
        ApiResponse::json_body(500, &json!({ "detail": "boom" })),
    );

    let outcome = service(&transport, &seeded).login(&request(false)).await?;

    assert_eq!(outcome.display_name, None);
    assert_eq!(seeded.ephemeral.get(ACCESS_KEY).as_deref(), Some("login-access"));
    assert_eq!(seeded.ephemeral.get(FULL_NAME_KEY), None);
    Ok(())
}

#[tokio::test]
async fn unreachable_login_endpoint_is_a_transport_error() {
    let seeded = anonymous();
    let transport = Arc::new(ScriptedTransport::new(|_| Err(TransportError::Timeout)));

    let result = service(&transport, &seeded).login(&request(false)).await;

    assert!(matches!(
        result,
        Err(LoginError::Transport(TransportError::Timeout))
    ));
}

#[test]
fn logout_clears_both_scopes() {
    let seeded = seeded(
        ScopeKind::Durable,
        &SessionFixture {
            full_name: Some("Ana"),
            ..SessionFixture::logged_in("manager", "/manager/inicio")
        },
    );
    for key in SESSION_KEYS {
        seeded.ephemeral.set(key, "leftover").unwrap_or_default();
    }
    let transport = Arc::new(ScriptedTransport::new(|_| Ok(ApiResponse::new(200))));
    let service = service(&transport, &seeded);
    assert_eq!(service.display_name().as_deref(), Some("Ana"));

    service.clear_session();

    assert!(seeded.durable.is_empty());
    assert!(seeded.ephemeral.is_empty());
    assert_eq!(service.display_name(), None);
    assert_eq!(transport.total(), 0);
}
