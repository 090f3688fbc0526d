//! Test support utilities shared across unit and integration tests.

use std::collections::{BTreeSet, VecDeque};
use std::env;
use std::ffi::OsString;
use std::fmt;
use std::sync::{Arc, Mutex as StdMutex, PoisonError};

use serde::Serialize;
use serde::de::DeserializeOwned;
use tokio::sync::{Mutex, MutexGuard};

use crate::transport::{RawResponse, Transport, TransportError, TransportFuture};

/// Scripted transport that returns pre-seeded outcomes in FIFO order.
///
/// Used to drive deterministic platform responses without opening a socket.
/// Once the queue is empty every further attempt fails as a connection error.
#[derive(Clone, Debug, Default)]
pub struct ScriptedTransport {
    responses: Arc<StdMutex<VecDeque<Result<RawResponse, TransportError>>>>,
    attempts: Arc<StdMutex<Vec<RecordedPost>>>,
}

/// Records a single POST made through [`ScriptedTransport`].
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct RecordedPost {
    /// Full target URL.
    pub url: String,
    /// Request body as sent.
    pub body: Vec<u8>,
}

impl RecordedPost {
    /// Parses the recorded body as JSON for assertions.
    ///
    /// # Errors
    ///
    /// Returns the `serde_json` error when the body is not valid JSON.
    pub fn json(&self) -> Result<serde_json::Value, serde_json::Error> {
        serde_json::from_slice(&self.body)
    }
}

impl ScriptedTransport {
    /// Creates a transport with no queued responses.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns a snapshot of all attempts recorded so far.
    #[must_use]
    pub fn attempts(&self) -> Vec<RecordedPost> {
        self.attempts
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Number of attempts recorded so far.
    #[must_use]
    pub fn attempt_count(&self) -> usize {
        self.attempts
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    fn push(&self, outcome: Result<RawResponse, TransportError>) {
        self.responses
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push_back(outcome);
    }

    /// Pushes a response with the given HTTP status and raw body.
    pub fn push_raw(&self, status: u16, body: impl Into<Vec<u8>>) {
        self.push(Ok(RawResponse {
            status,
            body: body.into(),
        }));
    }

    /// Pushes a `200 OK` response carrying `body` as JSON.
    pub fn push_json(&self, body: &serde_json::Value) {
        self.push_raw(200, body.to_string());
    }

    /// Pushes an empty response with the given HTTP status.
    pub fn push_status(&self, status: u16) {
        self.push_raw(status, Vec::new());
    }

    /// Pushes `count` copies of an empty response with `status`.
    pub fn push_repeated_status(&self, status: u16, count: usize) {
        for _ in 0..count {
            self.push_status(status);
        }
    }

    /// Pushes a connection failure.
    pub fn push_connect_error(&self) {
        self.push(Err(TransportError::Connect(String::from(
            "simulated connection failure",
        ))));
    }

    /// Pushes a failure while reading the response body.
    pub fn push_body_error(&self) {
        self.push(Err(TransportError::Body(String::from(
            "simulated truncated body",
        ))));
    }
}

impl Transport for ScriptedTransport {
    fn post<'a>(&'a self, url: &'a str, body: &'a [u8]) -> TransportFuture<'a> {
        self.attempts
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(RecordedPost {
                url: url.to_owned(),
                body: body.to_vec(),
            });
        let outcome = self
            .responses
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .pop_front()
            .unwrap_or_else(|| {
                Err(TransportError::Connect(String::from(
                    "no scripted response available",
                )))
            });
        Box::pin(async move { outcome })
    }
}

/// Global mutex used to serialise environment mutation in tests.
pub static ENV_LOCK: Mutex<()> = Mutex::const_new(());

/// Guard that holds the env mutex and restores variables on drop.
pub struct EnvGuard {
    previous: Vec<(String, Option<OsString>)>,
    _guard: MutexGuard<'static, ()>,
}

impl EnvGuard {
    /// Sets multiple environment variables while holding a global mutex.
    pub async fn set_vars(pairs: &[(&str, &str)]) -> Self {
        debug_assert!(
            {
                let mut seen = BTreeSet::new();
                pairs.iter().all(|(key, _)| seen.insert(*key))
            },
            "duplicate environment variable keys passed to EnvGuard::set_vars"
        );

        let guard = ENV_LOCK.lock().await;
        let mut previous = Vec::with_capacity(pairs.len());
        for (key, value) in pairs {
            let old = env::var_os(key);
            // SAFETY: Environment mutation is serialised by `ENV_LOCK`, preventing races.
            unsafe { env::set_var(key, value) };
            previous.push(((*key).to_owned(), old));
        }

        Self {
            previous,
            _guard: guard,
        }
    }

    /// Sets `pairs` and removes `cleared` under a single lock, so a test can
    /// pin some variables while hiding ambient overrides of others.
    pub async fn set_vars_clearing(pairs: &[(&str, &str)], cleared: &[&str]) -> Self {
        let guard = ENV_LOCK.lock().await;
        let mut previous = Vec::with_capacity(pairs.len() + cleared.len());
        for key in cleared {
            let old = env::var_os(key);
            // SAFETY: Environment mutation is serialised by `ENV_LOCK`, preventing races.
            unsafe { env::remove_var(key) };
            previous.push(((*key).to_owned(), old));
        }
        for (key, value) in pairs {
            let old = env::var_os(key);
            // SAFETY: Environment mutation is serialised by `ENV_LOCK`, preventing races.
            unsafe { env::set_var(key, value) };
            previous.push(((*key).to_owned(), old));
        }

        Self {
            previous,
            _guard: guard,
        }
    }

    /// Removes the given variables for the guard's lifetime.
    pub async fn unset_vars(keys: &[&str]) -> Self {
        let guard = ENV_LOCK.lock().await;
        let mut previous = Vec::with_capacity(keys.len());
        for key in keys {
            let old = env::var_os(key);
            // SAFETY: Environment mutation is serialised by `ENV_LOCK`, preventing races.
            unsafe { env::remove_var(key) };
            previous.push(((*key).to_owned(), old));
        }

        Self {
            previous,
            _guard: guard,
        }
    }
}

impl Drop for EnvGuard {
    fn drop(&mut self) {
        for (key, old) in &self.previous {
            // SAFETY: Environment mutation is serialised by holding `_guard`.
            unsafe {
                match old {
                    Some(val) => env::set_var(key, val),
                    None => env::remove_var(key),
                }
            }
        }
    }
}

/// Builds a successful platform status body merged with `fields`.
#[must_use]
pub fn ok_body(fields: serde_json::Value) -> serde_json::Value {
    let mut body = serde_json::json!({ "status_code": "200", "description": "ok" });
    if let (Some(target), serde_json::Value::Object(extra)) = (body.as_object_mut(), fields) {
        target.extend(extra);
    }
    body
}

/// Builds a failing platform status body.
#[must_use]
pub fn failure_body(code: &str, description: &str) -> serde_json::Value {
    serde_json::json!({ "status_code": code, "description": description })
}

/// Encodes `value` as JSON, decodes it back and asserts nothing changed.
///
/// # Panics
///
/// Panics when either direction fails or the decoded value differs.
pub fn assert_round_trips<T>(value: &T)
where
    T: Serialize + DeserializeOwned + PartialEq + fmt::Debug,
{
    let encoded = serde_json::to_value(value)
        .unwrap_or_else(|err| panic!("encode {}: {err}", std::any::type_name::<T>()));
    let decoded: T = serde_json::from_value(encoded.clone()).unwrap_or_else(|err| {
        panic!("decode {} from {encoded}: {err}", std::any::type_name::<T>())
    });
    assert_eq!(&decoded, value, "round trip through {encoded}");
}
