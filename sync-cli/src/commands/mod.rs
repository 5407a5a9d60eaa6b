//! CLI command implementations.

pub mod search;
pub mod status;
pub mod sync;
