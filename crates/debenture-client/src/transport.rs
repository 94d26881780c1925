//! Transport layer for JSON-RPC communication

use crate::error::CallError;
use async_trait::async_trait;
use serde_json::{json, Value};
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tracing::debug;

/// JSON-RPC transport (object-safe)
#[async_trait]
pub trait RpcTransport: Send + Sync {
    /// Send one request and return its `result` member
    async fn request(&self, method: &str, params: Value) -> Result<Value, CallError>;
}

/// HTTP transport speaking JSON-RPC 2.0 to a Soroban RPC node.
///
/// Each call is a single attempt; retries are left to the caller.
#[derive(Debug)]
pub struct HttpTransport {
    pub endpoint: String,
    client: reqwest::Client,
    request_id: AtomicU64,
}

impl HttpTransport {
    pub fn new(endpoint: &str) -> Self {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(30))
            .build()
            .unwrap_or_default();

        Self {
            endpoint: endpoint.to_string(),
            client,
            request_id: AtomicU64::new(1),
        }
    }

    fn next_id(&self) -> u64 {
        self.request_id.fetch_add(1, Ordering::SeqCst)
    }
}

#[async_trait]
impl RpcTransport for HttpTransport {
    async fn request(&self, method: &str, params: Value) -> Result<Value, CallError> {
        let id = self.next_id();
        let request_body = json!({
            "jsonrpc": "2.0",
            "id": id,
            "method": method,
            "params": if params.is_null() { json!({}) } else { params }
        });

        debug!(method, id, endpoint = %self.endpoint, "RPC request");

        let response = self
            .client
            .post(&self.endpoint)
            .header("Content-Type", "application/json")
            .json(&request_body)
            .send()
            .await
            .map_err(|e| CallError::Transport(e.to_string()))?;

        let body = response
            .json::<Value>()
            .await
            .map_err(|e| CallError::Transport(e.to_string()))?;

        extract_result(body)
    }
}

/// Split a JSON-RPC response body into its result or error
pub fn extract_result(body: Value) -> Result<Value, CallError> {
    if let Some(error) = body.get("error") {
        let code = error.get("code").and_then(Value::as_i64).unwrap_or(-32603);
        let message = error
            .get("message")
            .and_then(Value::as_str)
            .map(str::to_string)
            .unwrap_or_else(|| error.to_string());
        return Err(CallError::Rpc { code, message });
    }

    body.get("result").cloned().ok_or(CallError::Rpc {
        code: -32603,
        message: "No result in RPC response".to_string(),
    })
}

/// A request seen by [`MockTransport`]
#[derive(Debug, Clone)]
pub struct RecordedRequest {
    pub method: String,
    pub params: Value,
}

/// Scripted transport for tests.
///
/// Responses are keyed by method name; a queued response is consumed once,
/// a fixed one is returned on every call. Every request is recorded.
#[derive(Default, Clone)]
pub struct MockTransport {
    fixed: Arc<Mutex<HashMap<String, Result<Value, (i64, String)>>>>,
    queued: Arc<Mutex<HashMap<String, Vec<Value>>>>,
    requests: Arc<Mutex<Vec<RecordedRequest>>>,
}

impl MockTransport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Respond to `method` with `result` on every call
    pub fn set_response(&self, method: &str, result: Value) {
        if let Ok(mut fixed) = self.fixed.lock() {
            fixed.insert(method.to_string(), Ok(result));
        }
    }

    /// Respond to `method` with a JSON-RPC error on every call
    pub fn set_error(&self, method: &str, code: i64, message: &str) {
        if let Ok(mut fixed) = self.fixed.lock() {
            fixed.insert(method.to_string(), Err((code, message.to_string())));
        }
    }

    /// Respond to the next call of `method` with `result`, ahead of any fixed response
    pub fn push_response(&self, method: &str, result: Value) {
        if let Ok(mut queued) = self.queued.lock() {
            queued.entry(method.to_string()).or_default().push(result);
        }
    }

    /// All requests received so far, in order
    pub fn requests(&self) -> Vec<RecordedRequest> {
        self.requests.lock().map(|r| r.clone()).unwrap_or_default()
    }

    /// Number of requests received for `method`
    pub fn count(&self, method: &str) -> usize {
        self.requests().iter().filter(|r| r.method == method).count()
    }
}

#[async_trait]
impl RpcTransport for MockTransport {
    async fn request(&self, method: &str, params: Value) -> Result<Value, CallError> {
        self.requests
            .lock()
            .map_err(|_| CallError::Transport("MockTransport mutex poisoned".to_string()))?
            .push(RecordedRequest {
                method: method.to_string(),
                params,
            });

        let next = self
            .queued
            .lock()
            .map_err(|_| CallError::Transport("MockTransport mutex poisoned".to_string()))?
            .get_mut(method)
            .and_then(|q| if q.is_empty() { None } else { Some(q.remove(0)) });
        if let Some(result) = next {
            return Ok(result);
        }

        let fixed = self
            .fixed
            .lock()
            .map_err(|_| CallError::Transport("MockTransport mutex poisoned".to_string()))?
            .get(method)
            .cloned();

        match fixed {
            Some(Ok(result)) => Ok(result),
            Some(Err((code, message))) => Err(CallError::Rpc { code, message }),
            None => Err(CallError::Rpc {
                code: -32601,
                message: format!("Method not found: {}", method),
            }),
        }
    }
}
