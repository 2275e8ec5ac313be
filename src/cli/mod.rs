//! Command line interface

pub mod commands;
pub mod configure;
pub mod display;
pub mod validate;

pub use commands::{CliArgs, Commands};
