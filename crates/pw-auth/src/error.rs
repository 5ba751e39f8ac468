use thiserror::Error;

#[derive(Debug, Error)]
pub enum AuthError {
    #[error("not authenticated — run `pwt auth login`")]
    NotAuthenticated,

    #[error("token expired — run `pwt auth login` to refresh")]
    TokenExpired,

    #[error("JWKS validation failed: {0}")]
    JwksValidation(String),

    #[error("browser login failed: {0}")]
    BrowserFlowFailed(String),

    #[error("secret key sign-in failed: {0}")]
    ApiKeyFailed(String),

    #[error("token store error: {0}")]
    TokenStoreError(String),

    #[error("clerk API error: {0}")]
    ClerkApiError(String),

    #[error("backend session error: {0}")]
    BackendSession(String),

    #[error("{0}")]
    Other(String),
}
