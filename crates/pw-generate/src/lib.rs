//! # pw-generate
//!
//! Turns a topic prompt into numbered social post variations using an
//! OpenAI-compatible chat completions endpoint.

pub mod client;
pub mod credential;
pub mod error;
pub mod parse;
pub mod pipeline;

pub use client::{CompletionApi, CompletionRequest, OpenAiClient};
pub use credential::{CredentialSource, StaticCredential};
pub use error::GenerationError;
pub use parse::parse_variations;
pub use pipeline::{GenerationPipeline, GenerationSettings};
