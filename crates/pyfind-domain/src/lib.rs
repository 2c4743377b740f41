#![deny(clippy::all)]
#![allow(
    clippy::missing_errors_doc,
    clippy::missing_panics_doc,
    clippy::must_use_candidate
)]

pub mod info;
pub mod spec;

pub use info::{PythonInfo, VersionInfo};
pub use spec::{PythonSpec, SpecError};
