//! Integration tests for the resilient request layer

mod common;

use common::{ok, scripted_client, signed_in, status, Reply, ScriptedTransport};
use peak_partner_client::error::RequestError;
use peak_partner_client::http::BackendReadiness;
use peak_partner_client::services::ProfileApi;
use peak_partner_shared::Role;
use std::time::Duration;

// ===== Retry timing (paused clock) =====

#[tokio::test(start_paused = true)]
async fn test_gateway_errors_then_success_backs_off_2_4_8() {
    let transport = ScriptedTransport::new();
    let (session, profile_id) = signed_in(Role::Trainer);
    transport.route(
        "/profiles/me",
        vec![
            status(503),
            status(503),
            status(503),
            ok(common::profile_json(profile_id, Role::Trainer)),
        ],
    );
    let client = scripted_client(&transport, session);

    let profile = ProfileApi::me(&client).await.unwrap();
    assert_eq!(profile.id, profile_id);

    let calls = transport.calls_to("/profiles/me");
    assert_eq!(calls.len(), 4);
    let waits: Vec<Duration> = calls.windows(2).map(|w| w[1].at - w[0].at).collect();
    assert_eq!(
        waits,
        vec![
            Duration::from_secs(2),
            Duration::from_secs(4),
            Duration::from_secs(8)
        ]
    );
}

#[tokio::test(start_paused = true)]
async fn test_gateway_errors_exhaust_after_three_retries() {
    let transport = ScriptedTransport::new();
    let (session, _) = signed_in(Role::Client);
    transport.route("/profiles/me", vec![status(504)]);
    let client = scripted_client(&transport, session);

    let err = ProfileApi::me(&client).await.unwrap_err();
    assert_eq!(err, RequestError::Gateway { status: 504 });
    assert_eq!(transport.calls_to("/profiles/me").len(), 4);
}

#[tokio::test(start_paused = true)]
async fn test_unauthorized_short_circuits_and_clears_session() {
    let transport = ScriptedTransport::new();
    let (session, _) = signed_in(Role::Trainer);
    transport.route("/profiles/me", vec![status(401)]);
    let client = scripted_client(&transport, session.clone());

    let err = ProfileApi::me(&client).await.unwrap_err();
    assert_eq!(err, RequestError::Auth);
    assert_eq!(transport.calls_to("/profiles/me").len(), 1);
    assert!(!session.is_authenticated());
}

#[tokio::test(start_paused = true)]
async fn test_server_error_is_not_retried() {
    let transport = ScriptedTransport::new();
    let (session, _) = signed_in(Role::Trainer);
    transport.route("/profiles/me", vec![status(500)]);
    let client = scripted_client(&transport, session.clone());

    let err = ProfileApi::me(&client).await.unwrap_err();
    assert!(matches!(err, RequestError::Server { status: 500, .. }));
    assert_eq!(transport.calls_to("/profiles/me").len(), 1);
    assert!(session.is_authenticated());
}

#[tokio::test(start_paused = true)]
async fn test_hung_attempt_times_out_and_is_retried() {
    let transport = ScriptedTransport::new();
    let (session, profile_id) = signed_in(Role::Client);
    transport.route(
        "/profiles/me",
        vec![Reply::Hang, ok(common::profile_json(profile_id, Role::Client))],
    );
    let client = scripted_client(&transport, session);

    ProfileApi::me(&client).await.unwrap();

    let calls = transport.calls_to("/profiles/me");
    assert_eq!(calls.len(), 2);
    // 20s attempt timeout plus the first 2s backoff
    assert_eq!(calls[1].at - calls[0].at, Duration::from_secs(22));
}

#[tokio::test(start_paused = true)]
async fn test_network_failure_is_retried() {
    let transport = ScriptedTransport::new();
    let (session, profile_id) = signed_in(Role::Client);
    transport.route(
        "/profiles/me",
        vec![Reply::Fail, ok(common::profile_json(profile_id, Role::Client))],
    );
    let client = scripted_client(&transport, session);

    assert!(ProfileApi::me(&client).await.is_ok());
    assert_eq!(transport.calls_to("/profiles/me").len(), 2);
}

#[tokio::test(start_paused = true)]
async fn test_bearer_header_comes_from_session() {
    let transport = ScriptedTransport::new();
    let (session, profile_id) = signed_in(Role::Trainer);
    transport.route("/profiles/me", vec![ok(common::profile_json(profile_id, Role::Trainer))]);
    let client = scripted_client(&transport, session.clone());

    ProfileApi::me(&client).await.unwrap();
    session.clear();
    let _ = ProfileApi::me(&client).await;

    let calls = transport.calls_to("/profiles/me");
    assert_eq!(calls[0].bearer.as_deref(), Some("Bearer test-token"));
    assert_eq!(calls[1].bearer, None);
}

// ===== Warm-up =====

#[tokio::test(start_paused = true)]
async fn test_warmup_is_shared_by_concurrent_callers() {
    let transport = ScriptedTransport::new();
    let (session, _) = signed_in(Role::Trainer);
    transport.route("/api-docs", vec![Reply::Fail, status(503), status(404)]);
    let client = scripted_client(&transport, session);

    let (a, b) = tokio::join!(client.ensure_backend_ready(), client.ensure_backend_ready());
    assert_eq!(a, BackendReadiness::Ready { probes: 3 });
    assert_eq!(a, b);

    let again = client.clone().ensure_backend_ready().await;
    assert_eq!(again, a);

    let probes = transport.calls_to("/api-docs");
    assert_eq!(probes.len(), 3);
    assert_eq!(probes[1].at - probes[0].at, Duration::from_secs(3));
}

#[tokio::test(start_paused = true)]
async fn test_warmup_gives_up_quietly() {
    let transport = ScriptedTransport::new();
    let (session, _) = signed_in(Role::Client);
    transport.route("/api-docs", vec![Reply::Fail]);
    let client = scripted_client(&transport, session);

    let readiness = client.ensure_backend_ready().await;
    assert_eq!(readiness, BackendReadiness::Exhausted { probes: 3 });
    assert!(!readiness.is_ready());
    assert_eq!(transport.calls_to("/api-docs").len(), 3);
}

// ===== Real HTTP (wiremock) =====

mod over_http {
    use super::common::{profile_json, signed_in, wiremock_config, TOKEN};
    use peak_partner_client::error::RequestError;
    use peak_partner_client::http::ResilientClient;
    use peak_partner_client::services::{ProfileApi, UploadApi};
    use peak_partner_shared::Role;
    use serde_json::json;
    use uuid::Uuid;
    use wiremock::matchers::{header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[tokio::test]
    async fn test_retries_gateway_over_http() {
        let server = MockServer::start().await;
        let profile_id = Uuid::new_v4();

        Mock::given(method("GET"))
            .and(path("/profiles/me"))
            .respond_with(ResponseTemplate::new(503))
            .up_to_n_times(2)
            .with_priority(1)
            .expect(2)
            .mount(&server)
            .await;

        Mock::given(method("GET"))
            .and(path("/profiles/me"))
            .and(header("authorization", format!("Bearer {TOKEN}").as_str()))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "success": true,
                "data": profile_json(profile_id, Role::Trainer),
            })))
            .expect(1)
            .mount(&server)
            .await;

        let (session, _) = signed_in(Role::Trainer);
        let client = ResilientClient::from_config(&wiremock_config(&server.uri()), session).unwrap();

        let profile = ProfileApi::me(&client).await.unwrap();
        assert_eq!(profile.id, profile_id);
    }

    #[tokio::test]
    async fn test_unauthorized_over_http_is_sent_once() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/profiles/me"))
            .respond_with(ResponseTemplate::new(401).set_body_json(json!({
                "success": false,
                "message": "Unauthorized",
            })))
            .expect(1)
            .mount(&server)
            .await;

        let (session, _) = signed_in(Role::Client);
        let client =
            ResilientClient::from_config(&wiremock_config(&server.uri()), session.clone()).unwrap();

        assert_eq!(ProfileApi::me(&client).await.unwrap_err(), RequestError::Auth);
        assert!(!session.is_authenticated());
    }

    #[tokio::test]
    async fn test_photo_upload_returns_url() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/uploads/photo"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "success": true,
                "data": { "url": "https://cdn.example.com/meal.jpg" },
            })))
            .expect(1)
            .mount(&server)
            .await;

        let (session, _) = signed_in(Role::Client);
        let client = ResilientClient::from_config(&wiremock_config(&server.uri()), session).unwrap();

        let url = UploadApi::photo(&client, "meal.jpg", "image/jpeg", vec![0xFF, 0xD8, 0xFF])
            .await
            .unwrap();
        assert_eq!(url, "https://cdn.example.com/meal.jpg");
    }

    #[tokio::test]
    async fn test_rejected_upload_never_reaches_server() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/uploads/photo"))
            .respond_with(ResponseTemplate::new(200))
            .expect(0)
            .mount(&server)
            .await;

        let (session, _) = signed_in(Role::Client);
        let client = ResilientClient::from_config(&wiremock_config(&server.uri()), session).unwrap();

        let err = UploadApi::photo(&client, "notes.pdf", "application/pdf", vec![1, 2, 3])
            .await
            .unwrap_err();
        assert!(matches!(err, RequestError::Domain(_)));
    }
}
