//! ID prefixes for generated entity IDs (`{prefix}-{8 hex chars}`).

pub const PREFIX_POST: &str = "pst";
pub const PREFIX_TAG: &str = "tag";
