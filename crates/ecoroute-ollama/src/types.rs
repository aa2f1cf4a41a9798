// SPDX-FileCopyrightText: 2026 ecoroute Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Ollama `/api/chat` request and response types.

use ecoroute_core::ChatMessage;
use serde::{Deserialize, Serialize};

/// Body of a non-streaming chat request.
#[derive(Debug, Clone, Serialize)]
pub struct ChatRequest<'a> {
    pub model: &'a str,
    pub messages: &'a [ChatMessage],
    pub stream: bool,
}

/// The assistant message inside a chat response.
#[derive(Debug, Clone, Deserialize)]
pub struct ResponseMessage {
    #[serde(default)]
    pub role: String,
    pub content: String,
}

/// Body of a non-streaming chat response. Timing fields are optional so
/// older servers still parse.
#[derive(Debug, Clone, Deserialize)]
pub struct ChatResponse {
    pub model: String,
    pub message: ResponseMessage,
    #[serde(default)]
    pub done: bool,
    /// Total server-side time in nanoseconds.
    #[serde(default)]
    pub total_duration: Option<u64>,
    /// Time spent loading the model in nanoseconds.
    #[serde(default)]
    pub load_duration: Option<u64>,
    #[serde(default)]
    pub eval_count: Option<u64>,
}

/// Error body returned by Ollama on non-2xx responses.
#[derive(Debug, Clone, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn request_serializes_messages_and_stream_flag() {
        let messages = [ChatMessage::system("be brief"), ChatMessage::user("hi")];
        let body = serde_json::to_value(ChatRequest {
            model: "gemma3:1b",
            messages: &messages,
            stream: false,
        })
        .unwrap();
        assert_eq!(body["model"], "gemma3:1b");
        assert_eq!(body["stream"], false);
        assert_eq!(body["messages"][0]["role"], "system");
        assert_eq!(body["messages"][1]["content"], "hi");
    }

    #[test]
    fn response_parses_minimal_body() {
        let json = r#"{"model":"m","message":{"role":"assistant","content":"2"}}"#;
        let resp: ChatResponse = serde_json::from_str(json).unwrap();
        assert_eq!(resp.message.content, "2");
        assert!(!resp.done);
        assert!(resp.load_duration.is_none());
    }
}
