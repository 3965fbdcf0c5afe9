//! CLI module for the nodetype-cli binary

pub mod commands;
pub mod error;

pub use error::CliError;
