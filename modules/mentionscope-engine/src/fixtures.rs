//! Fixture implementations for integration testing.
//!
//! **Sources:**
//! - `FixtureSource`: static canned payload
//! - `FailingSource`: always a transport error
//! - `SlowSource`: sleeps before answering (timeouts and cancellation)
//! - `CountingSource`: static payload that records the queries it saw
//!
//! **Storage:**
//! - `FailingGateway`: every call is a storage error

use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use mentionscope_common::{BatchId, NewBatch, PersistedBatch, SourceName};
use serde_json::Value;

use crate::error::{PersistenceError, SourceError};
use crate::sources::{RawPayload, SourceClient, SourceQuery};
use crate::store::PersistenceGateway;

// --- FixtureSource ---

pub struct FixtureSource {
    pub name: SourceName,
    pub payload: Value,
}

impl FixtureSource {
    pub fn new(name: SourceName, payload: Value) -> Self {
        Self { name, payload }
    }

    /// A source that answers with an empty list.
    pub fn empty(name: SourceName) -> Self {
        Self::new(name, Value::Array(Vec::new()))
    }

    pub fn shared(self) -> Arc<dyn SourceClient> {
        Arc::new(self)
    }
}

#[async_trait]
impl SourceClient for FixtureSource {
    fn name(&self) -> SourceName {
        self.name
    }

    async fn fetch(&self, _query: &SourceQuery) -> Result<RawPayload, SourceError> {
        Ok(self.payload.clone())
    }
}

// --- FailingSource ---

pub struct FailingSource {
    pub name: SourceName,
    pub message: String,
}

impl FailingSource {
    pub fn new(name: SourceName) -> Self {
        Self {
            name,
            message: "HTTP 503: upstream unavailable".to_string(),
        }
    }

    pub fn shared(self) -> Arc<dyn SourceClient> {
        Arc::new(self)
    }
}

#[async_trait]
impl SourceClient for FailingSource {
    fn name(&self) -> SourceName {
        self.name
    }

    async fn fetch(&self, _query: &SourceQuery) -> Result<RawPayload, SourceError> {
        Err(SourceError::Transport(self.message.clone()))
    }
}

// --- SlowSource ---

pub struct SlowSource {
    pub name: SourceName,
    pub delay: Duration,
    pub payload: Value,
}

impl SlowSource {
    pub fn new(name: SourceName, delay: Duration, payload: Value) -> Self {
        Self {
            name,
            delay,
            payload,
        }
    }

    pub fn shared(self) -> Arc<dyn SourceClient> {
        Arc::new(self)
    }
}

#[async_trait]
impl SourceClient for SlowSource {
    fn name(&self) -> SourceName {
        self.name
    }

    async fn fetch(&self, _query: &SourceQuery) -> Result<RawPayload, SourceError> {
        tokio::time::sleep(self.delay).await;
        Ok(self.payload.clone())
    }
}

// --- CountingSource ---

/// Returns its payload and keeps every query it was asked, in order.
pub struct CountingSource {
    pub name: SourceName,
    pub payload: Value,
    seen: Mutex<Vec<SourceQuery>>,
}

impl CountingSource {
    pub fn new(name: SourceName, payload: Value) -> Self {
        Self {
            name,
            payload,
            seen: Mutex::new(Vec::new()),
        }
    }

    pub fn queries(&self) -> Vec<SourceQuery> {
        self.seen.lock().map(|q| q.clone()).unwrap_or_default()
    }
}

#[async_trait]
impl SourceClient for CountingSource {
    fn name(&self) -> SourceName {
        self.name
    }

    async fn fetch(&self, query: &SourceQuery) -> Result<RawPayload, SourceError> {
        if let Ok(mut seen) = self.seen.lock() {
            seen.push(query.clone());
        }
        Ok(self.payload.clone())
    }
}

// --- FailingGateway ---

#[derive(Default)]
pub struct FailingGateway;

#[async_trait]
impl PersistenceGateway for FailingGateway {
    async fn save(&self, _batch: NewBatch<'_>) -> Result<BatchId, PersistenceError> {
        Err(PersistenceError::Unavailable("connection refused".to_string()))
    }

    async fn query_by_term(&self, _term: &str) -> Result<Vec<PersistedBatch>, PersistenceError> {
        Err(PersistenceError::Unavailable("connection refused".to_string()))
    }
}
