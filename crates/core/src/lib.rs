//! # TutorAgent Core
//!
//! Domain types, traits, and error definitions for the TutorAgent
//! tutoring backend. This crate has **zero framework dependencies** — it
//! defines the domain model that all other crates implement against.
//!
//! ## Design Philosophy
//!
//! The two external seams — the LLM backend and the session store — are
//! defined as traits here. Implementations live in their respective
//! crates. This enables:
//! - Swapping implementations via configuration
//! - Easy testing with mock/stub implementations
//! - Clean dependency graph (all crates depend inward on core)

pub mod assessment;
pub mod error;
pub mod message;
pub mod provider;
pub mod session;

// Re-export key types at crate root for ergonomics
pub use assessment::{Assessment, SkillLevel, TutorReply};
pub use error::{IngestError, ProviderError, StoreError};
pub use message::{ChatMessage, Role};
pub use provider::{CompletionRequest, Provider};
pub use session::{PdfSession, Session};
