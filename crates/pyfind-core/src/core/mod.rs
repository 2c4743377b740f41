pub mod config;
pub mod discovery;
pub mod python;
pub mod runtime;
pub mod tooling;
