//! CLI command implementations.

pub mod circuit;
pub mod common;
pub mod translate;
pub mod version;
