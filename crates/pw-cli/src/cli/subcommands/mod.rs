pub mod auth;
pub mod config;
pub mod posts;
pub mod tags;

pub use auth::AuthCommands;
pub use config::ConfigCommands;
pub use posts::PostCommands;
pub use tags::TagCommands;
