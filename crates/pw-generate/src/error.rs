use thiserror::Error;

#[derive(Debug, Error)]
pub enum GenerationError {
    #[error("enter a prompt")]
    EmptyPrompt,

    #[error("variation count must be at least 1")]
    InvalidVariationCount,

    #[error("no generation API key — run `pwt config set-api-key` or set POSTWRIGHT_GENERATION__API_KEY")]
    MissingCredential,

    #[error("generation service returned {status}: {message}")]
    Service { status: u16, message: String },

    #[error("generation request failed: {0}")]
    Transport(String),

    #[error("could not read generation response: {0}")]
    InvalidResponse(String),

    #[error("the model returned no usable variations")]
    EmptyGeneration,
}
