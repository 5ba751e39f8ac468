//! # pw-auth
//!
//! Identity for Postwright and the bridge that carries it to the data backend.
//!
//! Provides browser sign-in (`tiny_http` + `open`), JWKS JWT validation
//! (`clerk-rs`), OS keychain secret storage (`keyring`), secret-key sign-in
//! for CI, a fixed local identity for offline use, and the [`SessionBridge`]
//! that keeps the backend session in step with whoever is signed in.

pub mod bridge;
pub mod browser_flow;
pub mod claims;
pub mod clerk;
pub mod error;
pub mod jwks;
pub mod local;
pub mod provider;
pub mod refresh;
pub mod token_store;

pub use bridge::{BridgeError, BridgeState, SessionBridge};
pub use claims::IdentityClaims;
pub use clerk::ClerkIdentity;
pub use error::AuthError;
pub use local::{LOCAL_USER_ID, LocalIdentity};
pub use provider::{BackendSessionStore, IdentityProvider, SignedIn};
pub use token_store::{SecretSlot, SecretSource};
