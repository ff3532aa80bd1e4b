//! I/O helpers: XML documents, run folders and TOML configuration.

pub mod config;
pub mod document;
pub mod expected;
pub mod reader;
pub mod run_dir;
pub mod writer;
