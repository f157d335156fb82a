//! API Models
//!
//! Request and response bodies for the lesson endpoints, annotated for
//! OpenAPI generation with `utoipa`.

use serde::{Deserialize, Serialize};
use tutor_core::{
    LessonOptions, VisualizationMode,
    pipeline::HistoryMessage,
};
use utoipa::ToSchema;

fn default_stream() -> bool {
    true
}

#[derive(Deserialize, Serialize, ToSchema, Debug, Clone, PartialEq)]
pub struct ChatMessage {
    #[schema(example = "user")]
    pub role: String,
    pub content: String,
}

impl From<ChatMessage> for HistoryMessage {
    fn from(msg: ChatMessage) -> Self {
        HistoryMessage {
            role: msg.role,
            content: msg.content,
        }
    }
}

#[derive(Deserialize, ToSchema, Debug)]
pub struct LessonRequest {
    #[schema(example = "Recursion")]
    pub topic: String,
    /// The pipeline identifier the host routed this request by.
    #[serde(default)]
    pub model_id: Option<String>,
    /// Prior conversation. Accepted but not used when building the lesson.
    #[serde(default)]
    pub history: Vec<ChatMessage>,
    /// Stream blocks as NDJSON (default) or return one aggregated document.
    #[serde(default = "default_stream")]
    pub stream: bool,
    #[serde(default)]
    #[schema(example = 3)]
    pub max_steps: Option<usize>,
    #[serde(default)]
    #[schema(value_type = Option<String>, example = "link")]
    pub visualization_mode: Option<VisualizationMode>,
}

impl LessonRequest {
    pub fn options(&self) -> LessonOptions {
        LessonOptions {
            max_steps: self.max_steps,
            visualization_mode: self.visualization_mode,
            stream: self.stream,
        }
    }
}

/// The aggregated lesson, returned when `stream` is `false`.
#[derive(Serialize, Deserialize, ToSchema, Debug)]
pub struct LessonResponse {
    pub content: String,
}

#[derive(Serialize, ToSchema)]
pub struct ErrorResponse {
    pub message: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lesson_request_defaults() {
        let request: LessonRequest = serde_json::from_str(r#"{"topic": "Recursion"}"#).unwrap();

        assert_eq!(request.topic, "Recursion");
        assert!(request.stream);
        assert!(request.history.is_empty());
        assert_eq!(request.model_id, None);
        assert_eq!(request.options(), LessonOptions::default());
    }

    #[test]
    fn test_lesson_request_overrides() {
        let json = r#"{
            "topic": "Graphs",
            "model_id": "tutor",
            "history": [{"role": "user", "content": "hi"}],
            "stream": false,
            "max_steps": 2,
            "visualization_mode": "inline"
        }"#;
        let request: LessonRequest = serde_json::from_str(json).unwrap();
        let options = request.options();

        assert_eq!(options.max_steps, Some(2));
        assert_eq!(options.visualization_mode, Some(VisualizationMode::Inline));
        assert!(!options.stream);
        let history: HistoryMessage = request.history[0].clone().into();
        assert_eq!(history.content, "hi");
    }

    #[test]
    fn test_lesson_request_rejects_bad_values() {
        assert!(serde_json::from_str::<LessonRequest>(r#"{}"#).is_err());
        assert!(
            serde_json::from_str::<LessonRequest>(r#"{"topic": "x", "max_steps": -1}"#).is_err()
        );
        assert!(
            serde_json::from_str::<LessonRequest>(
                r#"{"topic": "x", "visualization_mode": "hologram"}"#
            )
            .is_err()
        );
    }

    #[test]
    fn test_error_response_serialization() {
        let error = ErrorResponse {
            message: "Lesson not found".to_string(),
        };
        let json = serde_json::to_string(&error).unwrap();
        assert_eq!(json, r#"{"message":"Lesson not found"}"#);
    }
}
