//! Repository modules implementing the Postwright stores.
//!
//! Each module adds methods to `PwService` via `impl PwService` blocks.

pub mod posts;
pub mod publish;
pub mod stats;
pub mod tags;
