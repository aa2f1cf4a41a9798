// SPDX-FileCopyrightText: 2026 ecoroute Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Deadline-bounded inference calls.

use std::time::Duration;

use async_trait::async_trait;
use ecoroute_core::{ChatMessage, EcorouteError, InferenceBackend};
use tracing::warn;

/// Wraps a backend so every `generate` call is bounded by `timeout`.
///
/// An expired call becomes [`EcorouteError::Timeout`], which the pipeline
/// handles like any other inference failure.
#[derive(Debug, Clone)]
pub struct BoundedBackend<B> {
    inner: B,
    timeout: Duration,
}

impl<B: InferenceBackend> BoundedBackend<B> {
    pub fn new(inner: B, timeout: Duration) -> Self {
        Self { inner, timeout }
    }
}

#[async_trait]
impl<B: InferenceBackend> InferenceBackend for BoundedBackend<B> {
    fn name(&self) -> &str {
        self.inner.name()
    }

    async fn generate(
        &self,
        model: &str,
        messages: &[ChatMessage],
    ) -> Result<String, EcorouteError> {
        match tokio::time::timeout(self.timeout, self.inner.generate(model, messages)).await {
            Ok(result) => result,
            Err(_elapsed) => {
                warn!(
                    model,
                    timeout_secs = self.timeout.as_secs_f64(),
                    "inference call timed out"
                );
                Err(EcorouteError::Timeout {
                    duration: self.timeout,
                })
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use ecoroute_test_utils::MockBackend;
    use tracing_test::traced_test;

    use super::*;

    #[tokio::test(start_paused = true)]
    #[traced_test]
    async fn slow_call_times_out() {
        let mock = MockBackend::new().delay("slow", Duration::from_secs(120));
        let bounded = BoundedBackend::new(mock, Duration::from_secs(10));
        let err = bounded
            .generate("slow", &[ChatMessage::user("hi")])
            .await
            .unwrap_err();
        assert!(matches!(err, EcorouteError::Timeout { duration } if duration == Duration::from_secs(10)));
        assert!(err.is_inference());
        assert!(logs_contain("inference call timed out"));
    }

    #[tokio::test(start_paused = true)]
    async fn fast_call_passes_through() {
        let mock = MockBackend::new()
            .reply("fast", "ok")
            .delay("fast", Duration::from_secs(1));
        let bounded = BoundedBackend::new(mock.clone(), Duration::from_secs(10));
        assert_eq!(
            bounded.generate("fast", &[ChatMessage::user("hi")]).await.unwrap(),
            "ok"
        );
        assert_eq!(bounded.name(), "mock");
        assert_eq!(mock.call_count(), 1);
    }
}
