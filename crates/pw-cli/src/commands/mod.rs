pub mod auth;
pub mod config;
pub mod dispatch;
pub mod generate;
pub mod posts;
pub mod shared;
pub mod stats;
pub mod tags;
