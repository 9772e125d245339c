//! IR Inspector - Command Line Driver
//!
//! Loads modules from JSON (or builds one of the demo modules), installs
//! the inspector plugin into a pass pipeline and writes the report.

pub mod cli;
pub mod commands;
pub mod demos;

pub use commands::{inspect_to, load_module, run};
