//! Assessment and Socratic tutoring engine.
//!
//! One turn of tutoring is two model calls: an assessment of the
//! student's response, then a reply shaped by that assessment. Both calls
//! expect pure JSON back (after fence-stripping) and degrade to fixed
//! fallback payloads when the model or its output cannot be used. No
//! retries anywhere: any response keeps the conversation alive for a
//! student, even a generic one.

pub mod agent;
pub mod prompts;
pub mod suggestions;
pub mod tracker;

pub use agent::{TutorAgent, strip_code_fence};
pub use suggestions::{pdf_suggestions_for, suggestions_for};
pub use tracker::{PdfSessionTracker, SessionTracker};
