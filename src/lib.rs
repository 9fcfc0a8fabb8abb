//! Plugin-extensible CLI shell and Cucumber report aggregator.

pub mod cli;
pub mod config;
pub mod error;
pub mod fs;
pub mod handlers;
pub mod plugins;
pub mod report;

pub use error::{Error, Result};
