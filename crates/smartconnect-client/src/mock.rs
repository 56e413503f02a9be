//! In-memory transport for tests.

use async_trait::async_trait;
use serde_json::json;
use smartconnect_types::{Result, SmartConnectError};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use crate::endpoint::Endpoint;
use crate::transport::{ApiRequest, Transport};

#[derive(Debug, Clone)]
enum Reply {
    Body(String),
    Fail(String),
}

#[derive(Debug, Default)]
struct MockState {
    replies: HashMap<&'static str, Reply>,
    calls: HashMap<&'static str, usize>,
    requests: HashMap<&'static str, ApiRequest>,
}

/// Canned replies per endpoint, with call counting. Clones share state.
#[derive(Debug, Clone, Default)]
pub(crate) struct MockTransport {
    state: Arc<Mutex<MockState>>,
}

impl MockTransport {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// Answers every call to `endpoint` with `body`.
    pub(crate) fn respond(&self, endpoint: &Endpoint, body: impl Into<String>) {
        self.lock()
            .replies
            .insert(endpoint.path, Reply::Body(body.into()));
    }

    /// Fails every call to `endpoint` at the transport level.
    pub(crate) fn fail(&self, endpoint: &Endpoint, message: impl Into<String>) {
        self.lock()
            .replies
            .insert(endpoint.path, Reply::Fail(message.into()));
    }

    pub(crate) fn calls(&self, endpoint: &Endpoint) -> usize {
        self.lock().calls.get(endpoint.path).copied().unwrap_or(0)
    }

    pub(crate) fn total_calls(&self) -> usize {
        self.lock().calls.values().sum()
    }

    pub(crate) fn last_request(&self, endpoint: &Endpoint) -> Option<ApiRequest> {
        self.lock().requests.get(endpoint.path).cloned()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, MockState> {
        self.state.lock().unwrap()
    }
}

#[async_trait]
impl Transport for MockTransport {
    async fn execute(&self, request: ApiRequest) -> Result<String> {
        let mut state = self.lock();
        let path = request.endpoint.path;
        *state.calls.entry(path).or_default() += 1;
        state.requests.insert(path, request);

        match state.replies.get(path) {
            Some(Reply::Body(body)) => Ok(body.clone()),
            Some(Reply::Fail(message)) => Err(SmartConnectError::Http(message.clone())),
            None => Err(SmartConnectError::Http(format!("no mock reply for {path}"))),
        }
    }
}

pub(crate) fn failure(message: &str, error_code: &str) -> String {
    json!({
        "status": false,
        "message": message,
        "errorcode": error_code,
        "data": "",
    })
    .to_string()
}

pub(crate) fn success(data: serde_json::Value) -> String {
    json!({
        "status": true,
        "message": "SUCCESS",
        "errorcode": "",
        "data": data,
    })
    .to_string()
}

pub(crate) fn login_success(jwt: &str, refresh: &str, feed: &str) -> String {
    success(json!({
        "jwtToken": jwt,
        "refreshToken": refresh,
        "feedToken": feed,
    }))
}

pub(crate) fn profile_success(client_code: &str) -> String {
    success(json!({
        "clientcode": client_code,
        "name": "Test User",
        "email": "",
        "mobileno": "",
        "exchanges": ["NSE", "BSE", "NFO"],
        "products": ["MARGIN", "MIS", "CNC"],
        "lastlogintime": "",
        "brokerid": "B2C",
    }))
}
