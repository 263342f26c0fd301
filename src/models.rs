use serde::{Deserialize, Serialize};
use serde_json::Value;

// Inbound chat request format
// `messages` stays optional so validation can answer a client error instead
// of a deserialization failure when the field is missing
#[derive(Deserialize, Debug)]
pub struct ChatRequest {
    pub messages: Option<Vec<ChatMessage>>,
    pub temperature: Option<f64>,
    pub max_tokens: Option<u32>,
    pub top_p: Option<f64>,
    pub stream: Option<bool>,
}

// A single chat message; content is kept as raw JSON so string and
// multi-part content both pass through unchanged
#[derive(Deserialize, Serialize, Debug, Clone)]
pub struct ChatMessage {
    pub role: String,
    #[serde(default)]
    pub content: Value,
}

// Normalized upstream request with defaults and model applied
#[derive(Serialize, Debug)]
pub struct UpstreamRequest {
    pub model: String,
    pub messages: Vec<ChatMessage>,
    pub temperature: f64,
    pub max_tokens: u32,
    pub top_p: f64,
    pub stream: bool,
}

impl ChatRequest {
    // Pure transformation: None when `messages` is missing.
    // Streaming stays on unless the caller explicitly disabled it.
    pub fn into_upstream(self, model: &str) -> Option<UpstreamRequest> {
        let messages = self.messages?;
        Some(UpstreamRequest {
            model: model.to_string(),
            messages,
            temperature: self.temperature.unwrap_or(0.7),
            max_tokens: self.max_tokens.unwrap_or(2000),
            top_p: self.top_p.unwrap_or(0.9),
            stream: self.stream != Some(false),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn parse(value: Value) -> ChatRequest {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn defaults_applied_when_fields_missing() {
        let req = parse(json!({"messages": [{"role": "user", "content": "hi"}]}));
        let upstream = req.into_upstream("test-model").unwrap();

        assert_eq!(upstream.model, "test-model");
        assert_eq!(upstream.temperature, 0.7);
        assert_eq!(upstream.max_tokens, 2000);
        assert_eq!(upstream.top_p, 0.9);
        assert!(upstream.stream);
    }

    #[test]
    fn explicit_parameters_are_preserved() {
        let req = parse(json!({
            "messages": [{"role": "user", "content": "hi"}],
            "temperature": 0.2,
            "max_tokens": 64,
            "top_p": 0.5,
            "stream": true
        }));
        let upstream = req.into_upstream("m").unwrap();

        assert_eq!(upstream.temperature, 0.2);
        assert_eq!(upstream.max_tokens, 64);
        assert_eq!(upstream.top_p, 0.5);
        assert!(upstream.stream);
    }

    #[test]
    fn stream_false_disables_streaming() {
        let req = parse(json!({
            "messages": [{"role": "user", "content": "hi"}],
            "stream": false
        }));
        assert!(!req.into_upstream("m").unwrap().stream);
    }

    #[test]
    fn missing_messages_is_rejected() {
        let req = parse(json!({"temperature": 0.5}));
        assert!(req.into_upstream("m").is_none());
    }

    #[test]
    fn empty_messages_is_structurally_valid() {
        let req = parse(json!({"messages": []}));
        let upstream = req.into_upstream("m").unwrap();
        assert!(upstream.messages.is_empty());
    }

    #[test]
    fn non_array_messages_fails_to_parse() {
        let result = serde_json::from_value::<ChatRequest>(json!({"messages": "hello"}));
        assert!(result.is_err());
    }

    #[test]
    fn multi_part_content_round_trips() {
        let req = parse(json!({
            "messages": [{"role": "user", "content": [{"type": "text", "text": "hi"}]}]
        }));
        let upstream = req.into_upstream("m").unwrap();
        let body = serde_json::to_value(&upstream).unwrap();
        assert_eq!(body["messages"][0]["content"][0]["text"], "hi");
    }
}
