//! Document-backed chat endpoints.
//!
//! - `POST   /upload`                 — upload homework, start a session
//! - `POST   /send`                   — one tutoring turn against the document
//! - `GET    /session/{id}/history`   — session transcript
//! - `POST   /session/new`            — create an empty session
//! - `DELETE /session/{id}`           — drop a session

use axum::{
    Router,
    extract::{Multipart, Path, State},
    response::Json,
    routing::{delete, get, post},
};
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};
use tracing::info;
use uuid::Uuid;

use crate::SharedState;
use crate::chat::validate_message;
use crate::error::ApiError;
use tutoragent_core::{Assessment, ChatMessage, IngestError, PdfSession, SkillLevel};
use tutoragent_ingest::{extract_document, validate_upload};
use tutoragent_tutor::{PdfSessionTracker, pdf_suggestions_for};

/// How much of the extracted text is embedded in each prompt context.
const CONTEXT_TEXT_CHARS: usize = 2000;

pub fn router() -> Router<SharedState> {
    Router::new()
        .route("/upload", post(upload_handler))
        .route("/send", post(send_handler))
        .route("/session/new", post(new_session_handler))
        .route("/session/{id}/history", get(history_handler))
        .route("/session/{id}", delete(delete_handler))
}

#[derive(Deserialize)]
pub struct PdfChatRequest {
    pub message: String,
    #[serde(default)]
    pub session_id: Option<String>,
    #[serde(default)]
    pub context: Option<Value>,
}

#[derive(Serialize)]
pub struct PdfUploadResponse {
    pub session_id: String,
    pub document_id: String,
    pub filename: String,
    pub file_size: usize,
    pub questions_extracted: u32,
    pub processing_status: String,
    pub message: String,
}

#[derive(Serialize)]
pub struct PdfChatResponse {
    pub message: ChatMessage,
    pub session_id: String,
    pub document_context: Value,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub assessment: Option<Assessment>,
    pub suggestions: Vec<String>,
}

#[derive(Serialize)]
pub struct PdfHistoryResponse {
    pub session_id: String,
    pub document_name: Option<String>,
    pub questions_extracted: u32,
    pub current_question: u32,
    pub messages: Vec<ChatMessage>,
    pub student_level: SkillLevel,
}

async fn upload_handler(
    State(state): State<SharedState>,
    mut multipart: Multipart,
) -> Result<Json<PdfUploadResponse>, ApiError> {
    let mut payload: Option<(String, Vec<u8>)> = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| ApiError::bad_request(format!("invalid multipart body: {e}")))?
    {
        if field.name() == Some("file") {
            let filename = field
                .file_name()
                .map(str::to_string)
                .ok_or_else(|| ApiError::bad_request("file field is missing a filename"))?;
            let bytes = field
                .bytes()
                .await
                .map_err(|e| ApiError::bad_request(format!("failed to read upload: {e}")))?;
            payload = Some((filename, bytes.to_vec()));
        }
    }

    let Some((filename, content)) = payload else {
        return Err(ApiError::bad_request("no file field in upload"));
    };

    validate_upload(
        &filename,
        content.len(),
        state.upload.max_file_size,
        &state.upload.allowed_extensions,
    )
    .map_err(upload_rejection)?;

    let extraction = extract_document(&content, &filename);

    let mut session = PdfSession::new();
    let document_id = Uuid::new_v4().to_string();
    session.document_id = Some(document_id.clone());
    session.document_name = Some(filename.clone());
    session.extracted_text = Some(extraction.text);
    session.questions_extracted = extraction.questions_found;

    let welcome = format!(
        "Excellent! I've successfully processed \"{filename}\" and found {count} questions. \
         I can see problems covering various Year 7 topics.\n\n\
         I'm here to guide you through each question step by step using the Socratic method. \
         I won't give you direct answers - instead, I'll ask you questions to help you discover \
         the solutions yourself. This builds real understanding!\n\n\
         Let's start with Question 1. Take a look at it and tell me: what type of mathematical \
         problem do you think this is?",
        count = extraction.questions_found,
    );
    session.push(
        ChatMessage::assistant(welcome)
            .with_metadata(json!({"question_context": "Document uploaded - starting session"})),
    );

    state.pdf_tracker.save(&mut session).await;

    info!(
        filename = %filename,
        session_id = %session.session_id,
        questions = extraction.questions_found,
        "PDF uploaded and processed"
    );

    Ok(Json(PdfUploadResponse {
        session_id: session.session_id,
        document_id,
        filename,
        file_size: content.len(),
        questions_extracted: extraction.questions_found,
        processing_status: "completed".into(),
        message: "Document processed successfully! Ready to start tutoring.".into(),
    }))
}

fn upload_rejection(e: IngestError) -> ApiError {
    match e {
        IngestError::UnsupportedType(_) => {
            ApiError::bad_request("Only PDF files are supported for document chat")
        }
        IngestError::TooLarge { max, .. } => ApiError::bad_request(format!(
            "File too large. Maximum size: {}MB",
            max / 1024 / 1024
        )),
    }
}

async fn send_handler(
    State(state): State<SharedState>,
    Json(request): Json<PdfChatRequest>,
) -> Result<Json<PdfChatResponse>, ApiError> {
    validate_message(&request.message)?;

    let mut session = state
        .pdf_tracker
        .get_or_create(request.session_id.as_deref())
        .await;

    if !session.has_document() {
        return Err(ApiError::bad_request(
            "No document uploaded. Please upload a PDF first.",
        ));
    }

    let document_name = session.document_name.clone().unwrap_or_default();
    let excerpt: String = session
        .extracted_text
        .as_deref()
        .unwrap_or_default()
        .chars()
        .take(CONTEXT_TEXT_CHARS)
        .collect();

    let mut document_context = json!({
        "document_name": document_name,
        "extracted_text": excerpt,
        "current_question": session.current_question,
        "total_questions": session.questions_extracted,
        "timestamp": chrono::Utc::now().to_rfc3339(),
    });
    if let (Some(obj), Some(Value::Object(extra))) =
        (document_context.as_object_mut(), request.context.clone())
    {
        for (k, v) in extra {
            obj.insert(k, v);
        }
    }

    let question_label = format!("Question {}", session.current_question);
    let user_message = ChatMessage::user(&request.message)
        .with_metadata(json!({"question_context": question_label}));

    let assessment = state
        .agent
        .assess(
            &format!("{question_label} from {document_name}"),
            &request.message,
            &document_context,
        )
        .await;

    let reply = state
        .agent
        .respond(
            &format!("{question_label} from uploaded homework"),
            &request.message,
            &assessment,
            &document_context,
        )
        .await;

    let assistant_message = ChatMessage::assistant(&reply.message).with_metadata(json!({
        "question_context": question_label,
        "page_reference": 1,
    }));

    PdfSessionTracker::record_turn(
        &mut session,
        user_message,
        assistant_message.clone(),
        Some(&assessment),
    );
    state.pdf_tracker.save(&mut session).await;

    let suggestions = pdf_suggestions_for(
        Some(&assessment),
        session.current_question,
        session.questions_extracted,
    );

    info!(session_id = %session.session_id, "PDF chat turn completed");

    Ok(Json(PdfChatResponse {
        message: assistant_message,
        session_id: session.session_id,
        document_context,
        assessment: Some(assessment),
        suggestions,
    }))
}

async fn history_handler(
    State(state): State<SharedState>,
    Path(session_id): Path<String>,
) -> Json<PdfHistoryResponse> {
    let session = state.pdf_tracker.get_or_create(Some(&session_id)).await;
    state.pdf_tracker.extend(&session.session_id).await;
    Json(PdfHistoryResponse {
        session_id: session.session_id,
        document_name: session.document_name,
        questions_extracted: session.questions_extracted,
        current_question: session.current_question,
        messages: session.messages,
        student_level: session.student_level,
    })
}

async fn new_session_handler(State(state): State<SharedState>) -> Json<Value> {
    let session = state.pdf_tracker.get_or_create(None).await;
    Json(json!({
        "session_id": session.session_id,
        "message": "New PDF chat session created! Upload your homework to get started.",
    }))
}

async fn delete_handler(
    State(state): State<SharedState>,
    Path(session_id): Path<String>,
) -> Result<Json<Value>, ApiError> {
    state.pdf_tracker.delete(&session_id).await?;
    Ok(Json(json!({"message": "PDF session deleted successfully"})))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn wrong_extension_maps_to_400_with_pdf_detail() {
        let api = upload_rejection(IngestError::UnsupportedType("docx".into()));
        assert_eq!(api.status, axum::http::StatusCode::BAD_REQUEST);
        assert!(api.detail.contains("Only PDF files"));
    }

    #[test]
    fn oversized_maps_to_400_with_mb_detail() {
        let api = upload_rejection(IngestError::TooLarge {
            size: 20 * 1024 * 1024,
            max: 10 * 1024 * 1024,
        });
        assert_eq!(api.status, axum::http::StatusCode::BAD_REQUEST);
        assert!(api.detail.contains("10MB"));
    }
}
