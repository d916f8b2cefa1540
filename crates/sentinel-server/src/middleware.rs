//! Request correlation and control-endpoint authorization.

use std::collections::HashSet;
use std::sync::Arc;

use axum::{
    extract::{Request, State},
    http::{header::AUTHORIZATION, HeaderMap, HeaderValue},
    middleware::Next,
    response::{IntoResponse, Response},
};
use uuid::Uuid;

use sentinel_core::Environment;

use crate::api::ApiError;

const CONTROL_KEYS_VAR: &str = "SENTINEL_API_KEYS";
const REQUEST_ID_HEADER: &str = "x-request-id";
/// Longest caller-supplied request id echoed back; longer ids are replaced.
const MAX_REQUEST_ID_LEN: usize = 128;

/// Correlation id for one request, available to handlers as an extension.
#[derive(Debug, Clone)]
pub struct RequestId(pub String);

/// Who may call control endpoints such as `processing-done`.
///
/// Read endpoints stay public; only routes that change server state sit
/// behind this check.
#[derive(Debug, Clone)]
pub enum ControlAuth {
    /// Any caller may use control endpoints.
    Open,
    /// Callers must present one of these bearer keys.
    Keys(Arc<HashSet<String>>),
}

impl ControlAuth {
    /// Reads comma-separated keys from `SENTINEL_API_KEYS`.
    ///
    /// # Errors
    ///
    /// Fails outside development when no key is configured.
    pub fn from_env(env: &Environment) -> anyhow::Result<Self> {
        let raw = std::env::var(CONTROL_KEYS_VAR).unwrap_or_default();
        Self::parse(&raw, env)
    }

    pub fn parse(raw: &str, env: &Environment) -> anyhow::Result<Self> {
        let keys: HashSet<String> = raw
            .split(',')
            .map(str::trim)
            .filter(|k| !k.is_empty())
            .map(str::to_owned)
            .collect();

        match (keys.is_empty(), env) {
            (false, _) => Ok(Self::Keys(Arc::new(keys))),
            (true, Environment::Development) => {
                tracing::warn!(
                    var = CONTROL_KEYS_VAR,
                    "no control keys configured; processing-done is open in development"
                );
                Ok(Self::Open)
            }
            (true, env) => anyhow::bail!(
                "{CONTROL_KEYS_VAR} must list at least one key in the {env} environment"
            ),
        }
    }

    fn permits(&self, headers: &HeaderMap) -> bool {
        match self {
            Self::Open => true,
            Self::Keys(keys) => {
                bearer_token(headers.get(AUTHORIZATION)).is_some_and(|t| keys.contains(t))
            }
        }
    }
}

/// Tags the request with the caller's `x-request-id` (if usable) or a fresh
/// `UUIDv4`, and echoes it on the response.
pub async fn request_id(mut req: Request, next: Next) -> Response {
    let id = req
        .headers()
        .get(REQUEST_ID_HEADER)
        .and_then(|v| v.to_str().ok())
        .map(str::trim)
        .filter(|v| !v.is_empty() && v.len() <= MAX_REQUEST_ID_LEN)
        .map_or_else(|| Uuid::new_v4().to_string(), str::to_owned);

    req.extensions_mut().insert(RequestId(id.clone()));
    let mut res = next.run(req).await;
    if let Ok(value) = HeaderValue::from_str(&id) {
        res.headers_mut().insert(REQUEST_ID_HEADER, value);
    }
    res
}

/// Rejects control calls without an accepted bearer key, using the regular
/// error envelope.
pub async fn require_control_key(
    State(auth): State<ControlAuth>,
    req: Request,
    next: Next,
) -> Response {
    if auth.permits(req.headers()) {
        return next.run(req).await;
    }
    let request_id = req
        .extensions()
        .get::<RequestId>()
        .map_or_else(String::new, |id| id.0.clone());
    tracing::warn!(%request_id, path = %req.uri().path(), "control call rejected");
    ApiError::new(request_id, "unauthorized", "missing or invalid bearer token").into_response()
}

fn bearer_token(value: Option<&HeaderValue>) -> Option<&str> {
    let token = value?.to_str().ok()?.strip_prefix("Bearer ")?.trim();
    (!token.is_empty()).then_some(token)
}
