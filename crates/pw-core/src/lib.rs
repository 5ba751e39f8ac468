//! # pw-core
//!
//! Core types, ID prefixes, and error types for Postwright.
//!
//! This crate provides the foundational types shared across all Postwright crates:
//! - Entity structs for persisted and ephemeral objects (posts, tags, usage stats, variations)
//! - The backend session handed from the session bridge to the persistence layer
//! - ID prefix constants
//! - Cross-cutting error types

pub mod entities;
pub mod errors;
pub mod ids;

pub use entities::{
    BackendSession, DailyCount, NewPost, Post, PostVariation, Tag, UsageStats, count_words,
    next_streak,
};
pub use errors::CoreError;
