pub mod launcher;
pub mod python_cli;
pub mod python_sys;
