//! Scripted transport for tests
//!
//! Responses are registered per (method, path). Every call is recorded so
//! tests can assert on what was sent. Calls with no registered response fail
//! with a 404 `ApiError::Failed`.

use crate::error::{ApiError, Result};
use crate::transport::{Method, Transport};
use async_trait::async_trait;
use serde_json::Value;
use std::collections::{HashMap, VecDeque};
use std::sync::{Mutex, MutexGuard};

/// A call seen by `MockTransport`
#[derive(Debug, Clone, PartialEq)]
pub struct RecordedCall {
    pub method: Method,
    pub path: String,
    pub body: Option<Value>,
}

#[derive(Debug, Clone)]
enum Reply {
    Body(Value),
    Status(u16, String),
}

#[derive(Default)]
pub struct MockTransport {
    replies: Mutex<HashMap<(Method, String), VecDeque<Reply>>>,
    calls: Mutex<Vec<RecordedCall>>,
}

impl MockTransport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue a successful body for `method path`
    ///
    /// Queued replies are consumed in order; the last one keeps answering.
    pub fn respond(&self, method: Method, path: &str, body: Value) {
        self.push(method, path, Reply::Body(body));
    }

    /// Queue a non-2xx answer for `method path`
    pub fn fail(&self, method: Method, path: &str, status: u16, message: &str) {
        self.push(method, path, Reply::Status(status, message.to_string()));
    }

    pub fn calls(&self) -> Vec<RecordedCall> {
        lock(&self.calls).clone()
    }

    pub fn call_count(&self) -> usize {
        lock(&self.calls).len()
    }

    fn push(&self, method: Method, path: &str, reply: Reply) {
        lock(&self.replies)
            .entry((method, path.to_string()))
            .or_default()
            .push_back(reply);
    }

    fn next_reply(&self, method: Method, path: &str) -> Option<Reply> {
        let mut replies = lock(&self.replies);
        let queue = replies.get_mut(&(method, path.to_string()))?;
        if queue.len() > 1 {
            queue.pop_front()
        } else {
            queue.front().cloned()
        }
    }
}

#[async_trait]
impl Transport for MockTransport {
    async fn call(&self, method: Method, path: &str, body: Option<&Value>) -> Result<Value> {
        lock(&self.calls).push(RecordedCall {
            method,
            path: path.to_string(),
            body: body.cloned(),
        });

        match self.next_reply(method, path) {
            Some(Reply::Body(value)) => Ok(value),
            Some(Reply::Status(status, message)) => Err(ApiError::Failed {
                status,
                method,
                path: path.to_string(),
                message,
            }),
            None => Err(ApiError::Failed {
                status: 404,
                method,
                path: path.to_string(),
                message: "no mock response registered".to_string(),
            }),
        }
    }
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}
