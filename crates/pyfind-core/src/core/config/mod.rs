//! Environment snapshot, discovery settings, and per-command context.

pub mod context;
pub mod settings;

pub use settings::*;
