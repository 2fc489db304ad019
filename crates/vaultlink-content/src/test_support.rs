//! In-memory hosts for content tests.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use parking_lot::Mutex;
use serde_json::Value;

use vaultlink_protocols::{HostError, KeyValueStore, MessageBus, Request, Response};

use crate::gate::SecurityRisk;
use crate::host::{Clipboard, Confirmer, Notice, Notifier};

type Responder = Box<dyn Fn(&Request) -> Response + Send + Sync>;

/// Bus answering from a closure and recording every request.
pub struct ScriptedBus {
    responder: Responder,
    requests: Mutex<Vec<Request>>,
}

impl ScriptedBus {
    pub fn new(responder: impl Fn(&Request) -> Response + Send + Sync + 'static) -> Arc<Self> {
        Arc::new(Self {
            responder: Box::new(responder),
            requests: Mutex::new(Vec::new()),
        })
    }

    pub fn requests(&self) -> Vec<Request> {
        self.requests.lock().clone()
    }

    pub fn count(&self, kind: &str) -> usize {
        self.requests.lock().iter().filter(|r| r.kind() == kind).count()
    }
}

#[async_trait]
impl MessageBus for ScriptedBus {
    async fn send(&self, request: Request) -> Response {
        let response = (self.responder)(&request);
        self.requests.lock().push(request);
        response
    }
}

pub struct FixedConfirmer {
    answer: bool,
    asked: Mutex<Vec<Vec<SecurityRisk>>>,
}

impl FixedConfirmer {
    pub fn new(answer: bool) -> Arc<Self> {
        Arc::new(Self {
            answer,
            asked: Mutex::new(Vec::new()),
        })
    }

    pub fn asked(&self) -> Vec<Vec<SecurityRisk>> {
        self.asked.lock().clone()
    }
}

#[async_trait]
impl Confirmer for FixedConfirmer {
    async fn confirm(&self, risks: &[SecurityRisk]) -> bool {
        self.asked.lock().push(risks.to_vec());
        self.answer
    }
}

#[derive(Default)]
pub struct RecordingNotifier {
    notices: Mutex<Vec<Notice>>,
}

impl RecordingNotifier {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn notices(&self) -> Vec<Notice> {
        self.notices.lock().clone()
    }
}

#[async_trait]
impl Notifier for RecordingNotifier {
    async fn notify(&self, notice: Notice) {
        self.notices.lock().push(notice);
    }
}

pub struct MemoryClipboard {
    deny: bool,
    text: Mutex<Option<String>>,
}

impl MemoryClipboard {
    pub fn new() -> Arc<Self> {
        Arc::new(Self {
            deny: false,
            text: Mutex::new(None),
        })
    }

    pub fn denying() -> Arc<Self> {
        Arc::new(Self {
            deny: true,
            text: Mutex::new(None),
        })
    }

    pub fn text(&self) -> Option<String> {
        self.text.lock().clone()
    }
}

#[async_trait]
impl Clipboard for MemoryClipboard {
    async fn write_text(&self, text: &str) -> Result<(), HostError> {
        if self.deny {
            return Err(HostError::Clipboard("permission denied".to_string()));
        }
        *self.text.lock() = Some(text.to_string());
        Ok(())
    }
}

#[derive(Default)]
pub struct MemoryStore {
    values: Mutex<HashMap<String, Value>>,
}

impl MemoryStore {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn contains(&self, key: &str) -> bool {
        self.values.lock().contains_key(key)
    }
}

#[async_trait]
impl KeyValueStore for MemoryStore {
    async fn get(&self, key: &str) -> Result<Option<Value>, HostError> {
        Ok(self.values.lock().get(key).cloned())
    }

    async fn set(&self, key: &str, value: Value) -> Result<(), HostError> {
        self.values.lock().insert(key.to_string(), value);
        Ok(())
    }

    async fn remove(&self, key: &str) -> Result<(), HostError> {
        self.values.lock().remove(key);
        Ok(())
    }
}
