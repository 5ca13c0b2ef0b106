//! Plain chat endpoints.
//!
//! - `POST   /send`                   — one tutoring turn
//! - `POST   /session/new`            — create an empty session
//! - `GET    /session/{id}/history`   — session transcript
//! - `DELETE /session/{id}`           — drop a session

use axum::{
    Router,
    extract::{Path, State},
    response::Json,
    routing::{delete, get, post},
};
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};
use tracing::info;

use crate::SharedState;
use crate::error::ApiError;
use tutoragent_core::{Assessment, ChatMessage, SkillLevel};
use tutoragent_tutor::{SessionTracker, suggestions_for};

pub const MAX_MESSAGE_CHARS: usize = 1000;

pub fn router() -> Router<SharedState> {
    Router::new()
        .route("/send", post(send_handler))
        .route("/session/new", post(new_session_handler))
        .route("/session/{id}/history", get(history_handler))
        .route("/session/{id}", delete(delete_handler))
}

#[derive(Deserialize)]
pub struct ChatRequest {
    pub message: String,
    #[serde(default)]
    pub session_id: Option<String>,
    /// Opaque caller context forwarded into prompts.
    #[serde(default)]
    pub context: Option<Value>,
}

#[derive(Serialize)]
pub struct ChatResponse {
    pub message: ChatMessage,
    pub session_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub assessment: Option<Assessment>,
    pub suggestions: Vec<String>,
}

#[derive(Serialize)]
pub struct HistoryResponse {
    pub session_id: String,
    pub messages: Vec<ChatMessage>,
    pub current_problem: Option<String>,
    pub student_level: SkillLevel,
}

pub(crate) fn validate_message(message: &str) -> Result<(), ApiError> {
    let chars = message.chars().count();
    if chars == 0 || chars > MAX_MESSAGE_CHARS {
        return Err(ApiError::bad_request(format!(
            "message must be between 1 and {MAX_MESSAGE_CHARS} characters"
        )));
    }
    Ok(())
}

async fn send_handler(
    State(state): State<SharedState>,
    Json(request): Json<ChatRequest>,
) -> Result<Json<ChatResponse>, ApiError> {
    validate_message(&request.message)?;

    let mut session = state
        .chat_tracker
        .get_or_create(request.session_id.as_deref())
        .await;

    let context = request.context.clone().unwrap_or_else(|| json!({}));
    let user_message = ChatMessage::user(&request.message).with_metadata(context.clone());

    // A new topic gets a welcoming reply without assessment; a
    // continuation gets the full assess-then-respond cycle.
    let (assistant_content, assessment) =
        if SessionTracker::is_new_topic(&session, &request.message) {
            session.current_problem = Some(request.message.clone());
            let content = state.agent.initial_reply(&request.message).await;
            (content, None)
        } else {
            let problem = session
                .current_problem
                .clone()
                .unwrap_or_else(|| "General math help".into());
            let assessment = state
                .agent
                .assess(&problem, &request.message, &context)
                .await;
            let reply = state
                .agent
                .respond(&problem, &request.message, &assessment, &context)
                .await;
            (reply.message, Some(assessment))
        };

    let assistant_message = ChatMessage::assistant(&assistant_content).with_metadata(json!({
        "assessment": assessment,
        "problem": session.current_problem,
    }));

    SessionTracker::record_turn(
        &mut session,
        user_message,
        assistant_message.clone(),
        assessment.as_ref(),
    );
    state.chat_tracker.save(&mut session).await;

    let suggestions = suggestions_for(assessment.as_ref());

    info!(session_id = %session.session_id, "Chat turn completed");

    Ok(Json(ChatResponse {
        message: assistant_message,
        session_id: session.session_id,
        assessment,
        suggestions,
    }))
}

async fn history_handler(
    State(state): State<SharedState>,
    Path(session_id): Path<String>,
) -> Json<HistoryResponse> {
    // Unknown ids yield a fresh empty session rather than a 404.
    let session = state.chat_tracker.get_or_create(Some(&session_id)).await;
    state.chat_tracker.extend(&session.session_id).await;
    Json(HistoryResponse {
        session_id: session.session_id,
        messages: session.messages,
        current_problem: session.current_problem,
        student_level: session.student_level,
    })
}

async fn new_session_handler(State(state): State<SharedState>) -> Json<Value> {
    let session = state.chat_tracker.get_or_create(None).await;
    Json(json!({
        "session_id": session.session_id,
        "message": "New tutoring session created! What math problem would you like help with?",
    }))
}

async fn delete_handler(
    State(state): State<SharedState>,
    Path(session_id): Path<String>,
) -> Result<Json<Value>, ApiError> {
    state.chat_tracker.delete(&session_id).await?;
    Ok(Json(json!({"message": "Session deleted successfully"})))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_message_rejected() {
        assert!(validate_message("").is_err());
    }

    #[test]
    fn oversized_message_rejected() {
        let long = "x".repeat(MAX_MESSAGE_CHARS + 1);
        assert!(validate_message(&long).is_err());
    }

    #[test]
    fn boundary_lengths_accepted() {
        assert!(validate_message("h").is_ok());
        assert!(validate_message(&"x".repeat(MAX_MESSAGE_CHARS)).is_ok());
    }
}
