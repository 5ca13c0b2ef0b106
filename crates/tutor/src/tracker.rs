//! Conversation state trackers.
//!
//! A tracker owns the load/save cycle for one session family. Loads are
//! forgiving: an unknown id, an expired key, a corrupt document, or an
//! unreachable store all produce a fresh session so the chat can proceed.
//! Saves are logged but never propagated; losing one write costs at most
//! one turn of history. Last-write-wins, no locking.

use chrono::Utc;
use std::sync::Arc;
use std::time::Duration;
use tracing::{error, warn};
use tutoragent_core::{Assessment, ChatMessage, PdfSession, Session, StoreError};
use tutoragent_store::{SessionStore, chat_key, pdf_chat_key};

/// Tracker for plain chat sessions.
pub struct SessionTracker {
    store: Arc<dyn SessionStore>,
    ttl: Duration,
}

impl SessionTracker {
    pub fn new(store: Arc<dyn SessionStore>, ttl: Duration) -> Self {
        Self { store, ttl }
    }

    /// Load the session for `session_id`, or create a fresh one.
    ///
    /// A fresh session is also returned when the stored document cannot
    /// be read, matching the "never error on reads" contract.
    pub async fn get_or_create(&self, session_id: Option<&str>) -> Session {
        let Some(id) = session_id else {
            let mut session = Session::new();
            self.save(&mut session).await;
            return session;
        };

        match self.store.get_json(&chat_key(id)).await {
            Ok(Some(value)) => match serde_json::from_value::<Session>(value) {
                Ok(session) => return session,
                Err(e) => warn!(session_id = id, error = %e, "Corrupt session document, recreating"),
            },
            Ok(None) => {}
            Err(e) => warn!(session_id = id, error = %e, "Failed to load session"),
        }

        let mut session = Session::with_id(id);
        self.save(&mut session).await;
        session
    }

    /// Persist the session with a fresh TTL. Failures are logged, never
    /// surfaced: the in-memory session stays valid for this turn.
    pub async fn save(&self, session: &mut Session) {
        session.updated_at = Utc::now();

        let value = match serde_json::to_value(&*session) {
            Ok(value) => value,
            Err(e) => {
                error!(session_id = %session.session_id, error = %e, "Failed to serialize session");
                return;
            }
        };

        if let Err(e) = self
            .store
            .set_json(&chat_key(&session.session_id), &value, self.ttl)
            .await
        {
            error!(session_id = %session.session_id, error = %e, "Failed to save session");
        }
    }

    /// Push the session's expiry out by a full TTL without rewriting it.
    /// Used on read-only paths; failures are logged like saves.
    pub async fn extend(&self, session_id: &str) {
        if let Err(e) = self.store.expire(&chat_key(session_id), self.ttl).await {
            warn!(session_id, error = %e, "Failed to extend session TTL");
        }
    }

    /// Remove the session. Store errors propagate here: a delete that
    /// cannot be confirmed is a real failure, not something to paper over.
    pub async fn delete(&self, session_id: &str) -> Result<bool, StoreError> {
        self.store.delete(&chat_key(session_id)).await
    }

    /// Whether the incoming message opens a new topic.
    ///
    /// Evaluated before the turn is recorded: the first message of a
    /// session, an explicit "new problem" marker, or the absence of a
    /// current problem all start a new topic. Deliberately a plain
    /// substring check.
    pub fn is_new_topic(session: &Session, message: &str) -> bool {
        session.messages.is_empty()
            || message.to_lowercase().contains("new problem")
            || session.current_problem.is_none()
    }

    /// Append one full turn (user then assistant) and absorb the
    /// assessment's skill level. Append-only: prior messages are never
    /// touched.
    pub fn record_turn(
        session: &mut Session,
        user: ChatMessage,
        assistant: ChatMessage,
        assessment: Option<&Assessment>,
    ) {
        session.push(user);
        session.push(assistant);
        if let Some(assessment) = assessment {
            session.student_level = assessment.skill_level;
        }
    }
}

/// Tracker for document-backed chat sessions. Same contract as
/// [`SessionTracker`], different key namespace and a longer TTL.
pub struct PdfSessionTracker {
    store: Arc<dyn SessionStore>,
    ttl: Duration,
}

impl PdfSessionTracker {
    pub fn new(store: Arc<dyn SessionStore>, ttl: Duration) -> Self {
        Self { store, ttl }
    }

    pub async fn get_or_create(&self, session_id: Option<&str>) -> PdfSession {
        let Some(id) = session_id else {
            let mut session = PdfSession::new();
            self.save(&mut session).await;
            return session;
        };

        match self.store.get_json(&pdf_chat_key(id)).await {
            Ok(Some(value)) => match serde_json::from_value::<PdfSession>(value) {
                Ok(session) => return session,
                Err(e) => warn!(session_id = id, error = %e, "Corrupt PDF session document, recreating"),
            },
            Ok(None) => {}
            Err(e) => warn!(session_id = id, error = %e, "Failed to load PDF session"),
        }

        let mut session = PdfSession::with_id(id);
        self.save(&mut session).await;
        session
    }

    pub async fn save(&self, session: &mut PdfSession) {
        session.updated_at = Utc::now();

        let value = match serde_json::to_value(&*session) {
            Ok(value) => value,
            Err(e) => {
                error!(session_id = %session.session_id, error = %e, "Failed to serialize PDF session");
                return;
            }
        };

        if let Err(e) = self
            .store
            .set_json(&pdf_chat_key(&session.session_id), &value, self.ttl)
            .await
        {
            error!(session_id = %session.session_id, error = %e, "Failed to save PDF session");
        }
    }

    pub async fn extend(&self, session_id: &str) {
        if let Err(e) = self.store.expire(&pdf_chat_key(session_id), self.ttl).await {
            warn!(session_id, error = %e, "Failed to extend PDF session TTL");
        }
    }

    pub async fn delete(&self, session_id: &str) -> Result<bool, StoreError> {
        self.store.delete(&pdf_chat_key(session_id)).await
    }

    /// Append one full turn and absorb the assessment's skill level.
    pub fn record_turn(
        session: &mut PdfSession,
        user: ChatMessage,
        assistant: ChatMessage,
        assessment: Option<&Assessment>,
    ) {
        session.push(user);
        session.push(assistant);
        if let Some(assessment) = assessment {
            session.student_level = assessment.skill_level;
        }
    }
}
