// SPDX-FileCopyrightText: 2026 ecoroute Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Mock inference backend for deterministic testing.
//!
//! `MockBackend` implements `InferenceBackend` with scripted replies. A call
//! for a model first consumes that model's queue, then the shared queue, then
//! falls back to the default reply. Failures and delays are scripted the same
//! way. Every call is recorded.

use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;

use ecoroute_core::{ChatMessage, EcorouteError, InferenceBackend};

/// One recorded `generate` call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MockCall {
    pub model: String,
    pub messages: Vec<ChatMessage>,
}

impl MockCall {
    /// Content of the last message, usually the user prompt.
    pub fn last_content(&self) -> &str {
        self.messages.last().map(|m| m.content.as_str()).unwrap_or("")
    }
}

#[derive(Debug, Clone)]
enum Scripted {
    Reply(String),
    Fail(String),
}

#[derive(Debug, Default)]
struct State {
    per_model: HashMap<String, VecDeque<Scripted>>,
    shared: VecDeque<Scripted>,
    delays: HashMap<String, Duration>,
    always_fail: HashMap<String, String>,
    default_reply: Option<String>,
    calls: Vec<MockCall>,
}

/// A scripted inference backend.
///
/// Clones share state, so a test can hand one clone to the code under test
/// and inspect the call log through another.
#[derive(Debug, Clone, Default)]
pub struct MockBackend {
    state: Arc<Mutex<State>>,
}

impl MockBackend {
    /// Create a mock whose every call returns `"mock response"`.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a mock answering calls for any model from `replies` in order.
    pub fn with_replies(replies: Vec<String>) -> Self {
        let mock = Self::new();
        mock.lock()
            .shared
            .extend(replies.into_iter().map(Scripted::Reply));
        mock
    }

    /// Reply returned once all queues are exhausted.
    pub fn with_default_reply(self, reply: impl Into<String>) -> Self {
        self.lock().default_reply = Some(reply.into());
        self
    }

    /// Queue a reply for the next unscripted call to `model`.
    pub fn reply(self, model: &str, reply: impl Into<String>) -> Self {
        self.push(model, Scripted::Reply(reply.into()));
        self
    }

    /// Queue a failure for the next unscripted call to `model`.
    pub fn fail(self, model: &str, message: impl Into<String>) -> Self {
        self.push(model, Scripted::Fail(message.into()));
        self
    }

    /// Make every call to `model` fail with `message`.
    pub fn always_fail(self, model: &str, message: impl Into<String>) -> Self {
        self.lock()
            .always_fail
            .insert(model.to_string(), message.into());
        self
    }

    /// Sleep for `delay` before answering any call to `model`.
    pub fn delay(self, model: &str, delay: Duration) -> Self {
        self.lock().delays.insert(model.to_string(), delay);
        self
    }

    /// All calls recorded so far, in order.
    pub fn calls(&self) -> Vec<MockCall> {
        self.lock().calls.clone()
    }

    pub fn call_count(&self) -> usize {
        self.lock().calls.len()
    }

    /// Number of calls made to `model`.
    pub fn calls_for(&self, model: &str) -> usize {
        self.lock().calls.iter().filter(|c| c.model == model).count()
    }

    /// Models called, in order.
    pub fn called_models(&self) -> Vec<String> {
        self.lock().calls.iter().map(|c| c.model.clone()).collect()
    }

    fn push(&self, model: &str, step: Scripted) {
        self.lock()
            .per_model
            .entry(model.to_string())
            .or_default()
            .push_back(step);
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, State> {
        self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Record the call and pick its scripted outcome.
    fn next(&self, model: &str, messages: &[ChatMessage]) -> (Option<Duration>, Scripted) {
        let mut state = self.lock();
        state.calls.push(MockCall {
            model: model.to_string(),
            messages: messages.to_vec(),
        });
        let delay = state.delays.get(model).copied();
        if let Some(message) = state.always_fail.get(model) {
            return (delay, Scripted::Fail(message.clone()));
        }
        let step = state
            .per_model
            .get_mut(model)
            .and_then(VecDeque::pop_front)
            .or_else(|| state.shared.pop_front())
            .unwrap_or_else(|| {
                Scripted::Reply(
                    state
                        .default_reply
                        .clone()
                        .unwrap_or_else(|| "mock response".to_string()),
                )
            });
        (delay, step)
    }
}

#[async_trait]
impl InferenceBackend for MockBackend {
    fn name(&self) -> &str {
        "mock"
    }

    async fn generate(
        &self,
        model: &str,
        messages: &[ChatMessage],
    ) -> Result<String, EcorouteError> {
        let (delay, step) = self.next(model, messages);
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }
        match step {
            Scripted::Reply(text) => Ok(text),
            Scripted::Fail(message) => Err(EcorouteError::inference(model, message)),
        }
    }
}
