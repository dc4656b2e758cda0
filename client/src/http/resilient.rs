//! Resilient request layer
//!
//! Wraps a [`Transport`] with a per-attempt timeout, exponential backoff for
//! transient faults, envelope decoding and a one-time backend warm-up.
//!
//! Retried: no response, attempt timeout, HTTP 502/503/504.
//! Never retried: every other status. A 401 additionally clears the session.

use super::transport::{ApiRequest, RawResponse, ReqwestTransport, Transport};
use crate::auth::SessionContext;
use crate::config::{AppConfig, RetryConfig, WarmupConfig};
use crate::error::{RequestError, RequestResult};
use peak_partner_shared::{ApiEnvelope, ErrorBody};
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::OnceCell;
use tracing::{debug, error, info, warn};

/// Outcome of the start-up warm-up
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BackendReadiness {
    /// A probe got a non-5xx answer
    Ready { probes: u32 },
    /// Every probe failed; per-request retry takes over from here
    Exhausted { probes: u32 },
}

impl BackendReadiness {
    pub fn is_ready(self) -> bool {
        matches!(self, BackendReadiness::Ready { .. })
    }
}

/// Request layer shared by every service; cheap to clone
#[derive(Clone)]
pub struct ResilientClient {
    transport: Arc<dyn Transport>,
    session: SessionContext,
    retry: RetryConfig,
    warmup: WarmupConfig,
    attempt_timeout: Duration,
    readiness: Arc<OnceCell<BackendReadiness>>,
}

impl ResilientClient {
    pub fn new(transport: Arc<dyn Transport>, session: SessionContext, config: &AppConfig) -> Self {
        Self {
            transport,
            session,
            retry: config.retry.clone(),
            warmup: config.warmup.clone(),
            attempt_timeout: config.request_timeout(),
            readiness: Arc::new(OnceCell::new()),
        }
    }

    /// Client talking to `config.api.base_url` over HTTP.
    pub fn from_config(config: &AppConfig, session: SessionContext) -> RequestResult<Self> {
        let transport = ReqwestTransport::new(config.api.base_url.clone())
            .map_err(|e| RequestError::Network(e.to_string()))?;
        Ok(Self::new(Arc::new(transport), session, config))
    }

    pub fn session(&self) -> &SessionContext {
        &self.session
    }

    // ========================================================================
    // Typed helpers
    // ========================================================================

    /// GET and unwrap the envelope's `data`.
    pub async fn get<T: DeserializeOwned>(&self, path: &str) -> RequestResult<T> {
        self.call(ApiRequest::get(path)).await
    }

    /// POST a JSON body and unwrap the envelope's `data`.
    pub async fn post<B, T>(&self, path: &str, body: &B) -> RequestResult<T>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        self.call(ApiRequest::post(path).json(serde_json::to_value(body)?))
            .await
    }

    /// PUT an optional JSON body and unwrap the envelope's `data`.
    pub async fn put<B, T>(&self, path: &str, body: Option<&B>) -> RequestResult<T>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let mut request = ApiRequest::put(path);
        if let Some(body) = body {
            request = request.json(serde_json::to_value(body)?);
        }
        self.call(request).await
    }

    /// Send any request and unwrap the envelope's `data`.
    pub async fn call<T: DeserializeOwned>(&self, request: ApiRequest) -> RequestResult<T> {
        let value = self.request(request).await?;
        decode_envelope(value)
    }

    // ========================================================================
    // Core request loop
    // ========================================================================

    /// Send with timeout and retry, returning the raw JSON body.
    pub async fn request(&self, mut request: ApiRequest) -> RequestResult<Value> {
        if request.bearer.is_none() {
            request.bearer = self.session.bearer();
        }

        let mut attempt: u32 = 0;
        loop {
            attempt += 1;
            match self.attempt(&request).await {
                Ok(value) => {
                    if attempt > 1 {
                        info!(path = %request.path, attempt, "Request succeeded after retry");
                    }
                    return Ok(value);
                }
                Err(err) if err.is_retryable() && attempt <= self.retry.max_retries => {
                    let delay = self.retry.backoff_for(attempt);
                    warn!(
                        path = %request.path,
                        attempt,
                        max_retries = self.retry.max_retries,
                        delay_ms = delay.as_millis() as u64,
                        error = %err,
                        "Transient failure, retrying"
                    );
                    tokio::time::sleep(delay).await;
                }
                Err(err) => {
                    if err.is_retryable() {
                        error!(
                            path = %request.path,
                            attempts = attempt,
                            error = %err,
                            "Retries exhausted"
                        );
                    }
                    if err.is_auth() {
                        warn!(path = %request.path, "Backend rejected credentials");
                        self.session.clear();
                    }
                    return Err(err);
                }
            }
        }
    }

    async fn attempt(&self, request: &ApiRequest) -> RequestResult<Value> {
        match tokio::time::timeout(self.attempt_timeout, self.transport.send(request)).await {
            Err(_) => Err(RequestError::Timeout(self.attempt_timeout.as_secs())),
            Ok(Err(e)) => Err(RequestError::Network(e.to_string())),
            Ok(Ok(response)) => classify_response(response),
        }
    }

    // ========================================================================
    // Warm-up
    // ========================================================================

    /// Probe the backend once per client; concurrent callers share the result.
    ///
    /// Never fails: an unreachable backend yields `Exhausted` and the caller
    /// carries on.
    pub async fn ensure_backend_ready(&self) -> BackendReadiness {
        *self
            .readiness
            .get_or_init(|| self.probe_backend())
            .await
    }

    async fn probe_backend(&self) -> BackendReadiness {
        let max_probes = self.warmup.max_probes.max(1);
        let interval = Duration::from_millis(self.warmup.probe_interval_ms);
        let probe = ApiRequest::get(self.warmup.probe_path.clone());

        for attempt in 1..=max_probes {
            match tokio::time::timeout(self.attempt_timeout, self.transport.send(&probe)).await {
                Ok(Ok(response)) if response.status < 500 => {
                    info!(probes = attempt, status = response.status, "Backend ready");
                    return BackendReadiness::Ready { probes: attempt };
                }
                Ok(Ok(response)) => {
                    debug!(attempt, status = response.status, "Warm-up probe not ready");
                }
                Ok(Err(e)) => debug!(attempt, error = %e, "Warm-up probe failed"),
                Err(_) => debug!(attempt, "Warm-up probe timed out"),
            }

            if attempt < max_probes {
                tokio::time::sleep(interval).await;
            }
        }

        warn!(probes = max_probes, "Backend not ready after warm-up, continuing");
        BackendReadiness::Exhausted { probes: max_probes }
    }
}

/// Map one raw response onto success JSON or a classified error.
pub fn classify_response(response: RawResponse) -> RequestResult<Value> {
    if (200..300).contains(&response.status) {
        if response.body.trim().is_empty() {
            return Ok(Value::Null);
        }
        return serde_json::from_str(&response.body).map_err(RequestError::from);
    }

    let message = serde_json::from_str::<ErrorBody>(&response.body)
        .ok()
        .and_then(|b| b.message)
        .unwrap_or_else(|| format!("HTTP {}", response.status));
    Err(RequestError::from_status(response.status, message))
}

/// Unwrap `{success, message, data}` into `data`.
pub fn decode_envelope<T: DeserializeOwned>(value: Value) -> RequestResult<T> {
    let envelope: ApiEnvelope<T> = serde_json::from_value(value)?;
    if !envelope.success {
        return Err(RequestError::Rejected(
            envelope
                .message
                .unwrap_or_else(|| "Request was not successful".to_string()),
        ));
    }

    match envelope.data {
        Some(data) => Ok(data),
        // Endpoints without a payload decode into `()` or `Option<_>`
        None => Ok(serde_json::from_value(Value::Null)?),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use tokio_test::{assert_err, assert_ok};

    #[test]
    fn test_classify_success_and_empty_body() {
        let value = assert_ok!(classify_response(RawResponse::new(200, r#"{"success":true}"#)));
        assert_eq!(value["success"], json!(true));
        assert_eq!(assert_ok!(classify_response(RawResponse::new(204, ""))), Value::Null);
    }

    #[test]
    fn test_classify_extracts_error_message() {
        let err = assert_err!(classify_response(RawResponse::new(
            400,
            r#"{"success":false,"message":"Session is not booked"}"#
        )));
        assert_eq!(
            err,
            RequestError::Client {
                status: 400,
                message: "Session is not booked".to_string()
            }
        );

        let err = assert_err!(classify_response(RawResponse::new(500, "<html>oops</html>")));
        assert_eq!(
            err,
            RequestError::Server {
                status: 500,
                message: "HTTP 500".to_string()
            }
        );
    }

    #[test]
    fn test_classify_bad_json_is_decode_error() {
        let err = assert_err!(classify_response(RawResponse::new(200, "not json")));
        assert!(matches!(err, RequestError::Decode(_)));
    }

    #[test]
    fn test_decode_envelope_variants() {
        let count: u64 = assert_ok!(decode_envelope(json!({"success": true, "data": 4})));
        assert_eq!(count, 4);

        let none: Option<u64> =
            assert_ok!(decode_envelope(json!({"success": true, "message": "none", "data": null})));
        assert!(none.is_none());

        let err = assert_err!(decode_envelope::<u64>(
            json!({"success": false, "message": "Not your session"})
        ));
        assert_eq!(err, RequestError::Rejected("Not your session".to_string()));
    }
}
