use anyhow::Context;

pub mod config;
pub mod data;
pub mod error;
pub mod filter;
pub mod schedule;
pub mod snapshot;
pub mod store;

pub use error::{Result, ScheduleError};

/// Like `std::env::var` but reports var name in error
pub fn env_var(name: &str) -> anyhow::Result<String> {
    std::env::var(name).with_context(|| format!("couldn't get `{name}` env var"))
}
