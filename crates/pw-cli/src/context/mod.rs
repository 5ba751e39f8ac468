mod app_context;
mod config_warnings;
mod credential;
mod session_store;

pub use app_context::{AppContext, resolve_data_dir};
pub use config_warnings::warn_unconfigured;
pub use credential::KeychainCredential;
pub use session_store::ServiceSessionStore;
