//! CLI command implementations.

pub mod generate;
pub mod normalize;
pub mod sources;
pub mod template;
