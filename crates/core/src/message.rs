//! Chat message value objects.
//!
//! A message is immutable once appended to a session: turns only ever
//! push new messages, never edit old ones.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// The role of a message sender in a tutoring conversation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// The student
    User,
    /// The AI tutor
    Assistant,
}

/// A single message in a tutoring session.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatMessage {
    /// Unique message ID
    pub id: String,

    /// Who sent this message
    pub role: Role,

    /// The text content
    pub content: String,

    /// Timestamp
    pub timestamp: DateTime<Utc>,

    /// Optional metadata (assessment snapshot, problem reference,
    /// question context)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metadata: Option<serde_json::Value>,
}

impl ChatMessage {
    /// Create a new student message.
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            role: Role::User,
            content: content.into(),
            timestamp: Utc::now(),
            metadata: None,
        }
    }

    /// Create a new tutor message.
    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            role: Role::Assistant,
            content: content.into(),
            timestamp: Utc::now(),
            metadata: None,
        }
    }

    /// Attach metadata to the message.
    pub fn with_metadata(mut self, metadata: serde_json::Value) -> Self {
        self.metadata = Some(metadata);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn create_user_message() {
        let msg = ChatMessage::user("I need help with 15+27");
        assert_eq!(msg.role, Role::User);
        assert_eq!(msg.content, "I need help with 15+27");
        assert!(msg.metadata.is_none());
        assert!(!msg.id.is_empty());
    }

    #[test]
    fn metadata_attaches() {
        let msg = ChatMessage::assistant("What do you think the first step is?")
            .with_metadata(serde_json::json!({"problem": "15+27"}));
        assert_eq!(msg.metadata.unwrap()["problem"], "15+27");
    }

    #[test]
    fn message_serialization_roundtrip() {
        let msg = ChatMessage::user("Test message");
        let json = serde_json::to_string(&msg).unwrap();
        assert!(json.contains("\"role\":\"user\""));
        let deserialized: ChatMessage = serde_json::from_str(&json).unwrap();
        assert_eq!(deserialized.content, "Test message");
        assert_eq!(deserialized.role, Role::User);
    }

    #[test]
    fn metadata_omitted_when_absent() {
        let msg = ChatMessage::assistant("hi");
        let json = serde_json::to_string(&msg).unwrap();
        assert!(!json.contains("metadata"));
    }
}
