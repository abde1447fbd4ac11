//! Agent client — REST client for the remote generation API.
//!
//! This module handles all communication with the Gemini endpoint:
//! - Request assembly from the context config and conversation history
//! - The `generateContent` call and response decoding
//! - The secondary analysis (critique) call
//!
//! The client is initialized lazily: the `GEMINI_API_KEY` credential is
//! read on the first call and the HTTP client is reused afterwards.

pub mod analysis;
pub mod client;
pub mod errors;
pub mod types;

// Re-exports for convenience
pub use client::{AgentClient, SendOutcome};
pub use errors::InferenceError;
pub use types::{GenerateContentRequest, GenerateContentResponse, UsageMetadata};
