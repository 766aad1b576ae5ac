//! Session timeline viewer CLI library.
//!
//! This crate provides the terminal interface for the timeline viewer.

mod cli;
mod config;
pub mod display;

pub use cli::Cli;
pub use config::Config;
