//! Session documents — the persisted conversation state.
//!
//! A session is owned exclusively by the store; there is no
//! concurrent-writer coordination and last write wins. The message list
//! is append-only: a turn pushes a user message and then an assistant
//! message, never edits.

use crate::assessment::SkillLevel;
use crate::message::ChatMessage;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A plain tutoring session keyed by an opaque identifier.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Session {
    pub session_id: String,

    /// Ordered, append-only message history.
    #[serde(default)]
    pub messages: Vec<ChatMessage>,

    /// The problem currently being worked on; set verbatim from the
    /// student's text on a new topic, untouched on continuations.
    #[serde(default)]
    pub current_problem: Option<String>,

    /// Overwritten by the latest assessment's skill level.
    #[serde(default)]
    pub student_level: SkillLevel,

    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Session {
    /// Create a new empty session with a fresh identifier.
    pub fn new() -> Self {
        Self::with_id(Uuid::new_v4().to_string())
    }

    /// Create a new empty session with a caller-supplied identifier.
    pub fn with_id(session_id: impl Into<String>) -> Self {
        let now = Utc::now();
        Self {
            session_id: session_id.into(),
            messages: Vec::new(),
            current_problem: None,
            student_level: SkillLevel::default(),
            created_at: now,
            updated_at: now,
        }
    }

    /// Append a message and bump `updated_at`.
    pub fn push(&mut self, message: ChatMessage) {
        self.updated_at = Utc::now();
        self.messages.push(message);
    }
}

impl Default for Session {
    fn default() -> Self {
        Self::new()
    }
}

/// A document-backed tutoring session: a plain session plus the
/// uploaded homework's extracted contents and question bookkeeping.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PdfSession {
    pub session_id: String,

    #[serde(default)]
    pub document_id: Option<String>,

    #[serde(default)]
    pub document_name: Option<String>,

    #[serde(default)]
    pub extracted_text: Option<String>,

    /// Heuristic count from ingestion; 0 until a document is uploaded.
    #[serde(default)]
    pub questions_extracted: u32,

    /// 1-based index of the question being worked on.
    #[serde(default = "default_current_question")]
    pub current_question: u32,

    #[serde(default)]
    pub messages: Vec<ChatMessage>,

    #[serde(default)]
    pub student_level: SkillLevel,

    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

fn default_current_question() -> u32 {
    1
}

impl PdfSession {
    pub fn new() -> Self {
        Self::with_id(Uuid::new_v4().to_string())
    }

    pub fn with_id(session_id: impl Into<String>) -> Self {
        let now = Utc::now();
        Self {
            session_id: session_id.into(),
            document_id: None,
            document_name: None,
            extracted_text: None,
            questions_extracted: 0,
            current_question: 1,
            messages: Vec::new(),
            student_level: SkillLevel::default(),
            created_at: now,
            updated_at: now,
        }
    }

    /// Append a message and bump `updated_at`.
    pub fn push(&mut self, message: ChatMessage) {
        self.updated_at = Utc::now();
        self.messages.push(message);
    }

    /// Whether a document has been attached to this session.
    pub fn has_document(&self) -> bool {
        self.document_id.is_some()
    }
}

impl Default for PdfSession {
    fn default() -> Self {
        Self::new()
    }
}
