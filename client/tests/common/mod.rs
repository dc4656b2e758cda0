//! Common test utilities for integration tests
//!
//! `ScriptedTransport` answers from per-path queues without a socket, so
//! retry timing can be checked under a paused tokio clock. Wiremock-backed
//! tests use `wiremock_config` with the real reqwest transport instead.

#![allow(dead_code)]

use async_trait::async_trait;
use fake::faker::internet::en::SafeEmail;
use fake::faker::name::en::Name;
use fake::Fake;
use peak_partner_client::auth::{AuthSession, SessionContext};
use peak_partner_client::config::AppConfig;
use peak_partner_client::http::{ApiRequest, Method, RawResponse, ResilientClient, Transport, TransportError};
use peak_partner_shared::Role;
use serde_json::{json, Value};
use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::time::Instant;
use uuid::Uuid;

pub const TOKEN: &str = "test-token";

/// Scripted outcome of one attempt
#[derive(Debug, Clone)]
pub enum Reply {
    Status(u16, Value),
    /// No response at all
    Fail,
    /// Never answers
    Hang,
    /// Answers 200 with `data` after a delay
    Slow(Duration, Value),
}

/// `{success: true, data}` with status 200
pub fn ok(data: Value) -> Reply {
    Reply::Status(200, json!({ "success": true, "data": data }))
}

pub fn status(code: u16) -> Reply {
    Reply::Status(code, json!({ "success": false, "message": format!("status {code}") }))
}

/// A request the transport received
#[derive(Debug, Clone)]
pub struct Sent {
    pub method: Method,
    pub path: String,
    pub bearer: Option<String>,
    pub at: Instant,
}

/// Transport answering from per-path queues; the last reply of a queue repeats
#[derive(Default)]
pub struct ScriptedTransport {
    routes: Mutex<HashMap<String, VecDeque<Reply>>>,
    sent: Mutex<Vec<Sent>>,
}

impl ScriptedTransport {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// Queue replies for `path`, matched with or without its query string.
    pub fn route(&self, path: &str, replies: Vec<Reply>) {
        self.routes
            .lock()
            .unwrap()
            .insert(path.to_string(), replies.into_iter().collect());
    }

    pub fn sent(&self) -> Vec<Sent> {
        self.sent.lock().unwrap().clone()
    }

    pub fn calls_to(&self, path: &str) -> Vec<Sent> {
        self.sent()
            .into_iter()
            .filter(|s| s.path == path || s.path.split('?').next() == Some(path))
            .collect()
    }

    fn next_reply(&self, path: &str) -> Option<Reply> {
        let mut routes = self.routes.lock().unwrap();
        let bare = path.split('?').next().unwrap_or(path);
        let queue = if routes.contains_key(path) {
            routes.get_mut(path)
        } else {
            routes.get_mut(bare)
        }?;

        if queue.len() > 1 {
            queue.pop_front()
        } else {
            queue.front().cloned()
        }
    }
}

#[async_trait]
impl Transport for ScriptedTransport {
    async fn send(&self, request: &ApiRequest) -> Result<RawResponse, TransportError> {
        self.sent.lock().unwrap().push(Sent {
            method: request.method,
            path: request.path.clone(),
            bearer: request.bearer.clone(),
            at: Instant::now(),
        });

        match self.next_reply(&request.path) {
            Some(Reply::Status(code, body)) => Ok(RawResponse::new(code, body.to_string())),
            Some(Reply::Fail) => Err(TransportError("connection refused".to_string())),
            Some(Reply::Hang) => std::future::pending().await,
            Some(Reply::Slow(delay, data)) => {
                tokio::time::sleep(delay).await;
                Ok(RawResponse::new(
                    200,
                    json!({ "success": true, "data": data }).to_string(),
                ))
            }
            None => Ok(RawResponse::new(
                404,
                json!({ "success": false, "message": "no route" }).to_string(),
            )),
        }
    }
}

/// Default config pointed at `base_url`
pub fn test_config(base_url: &str) -> AppConfig {
    let mut config = AppConfig::default();
    config.api.base_url = base_url.to_string();
    config
}

/// Config for wiremock tests: short backoff so real-time retries stay fast
pub fn wiremock_config(server_uri: &str) -> AppConfig {
    let mut config = test_config(server_uri);
    config.retry.initial_backoff_ms = 10;
    config.warmup.probe_interval_ms = 10;
    config
}

pub fn signed_in(role: Role) -> (SessionContext, Uuid) {
    let profile_id = Uuid::new_v4();
    let session = SessionContext::with_session(AuthSession::new(
        profile_id,
        role,
        Some("someone@example.com".to_string()),
        TOKEN.to_string(),
    ));
    (session, profile_id)
}

pub fn scripted_client(transport: &Arc<ScriptedTransport>, session: SessionContext) -> ResilientClient {
    ResilientClient::new(transport.clone(), session, &test_config("http://scripted"))
}

// ===== Payload builders =====

pub fn profile_json(id: Uuid, role: Role) -> Value {
    let full_name: String = Name().fake();
    let email: String = SafeEmail().fake();
    json!({
        "id": id,
        "email": email,
        "fullName": full_name,
        "role": role.as_str(),
    })
}

pub fn reschedule_json(id: Uuid, session_id: Uuid, requested_by: Uuid, status: &str) -> Value {
    json!({
        "id": id,
        "sessionId": session_id,
        "requestedById": requested_by,
        "proposedDate": "2024-03-08",
        "proposedStartTime": "11:00:00",
        "proposedEndTime": "12:00:00",
        "reason": "Travel",
        "status": status,
    })
}

pub fn session_json(id: Uuid, trainer_id: Uuid, client_id: Uuid, date: &str, status: &str) -> Value {
    json!({
        "id": id,
        "connectionId": Uuid::new_v4(),
        "trainerId": trainer_id,
        "clientId": client_id,
        "sessionDate": date,
        "startTime": "09:00:00",
        "endTime": "10:00:00",
        "sessionType": "IN_PERSON",
        "status": status,
    })
}
