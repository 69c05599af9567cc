//! # omnicode_core
//!
//! Core client logic for Omnicode: credential checks, the session store,
//! the debounced completion trigger, remote operations, usage tracking and
//! the usage dashboard.

pub mod api;
pub mod auth;
pub mod comment;
pub mod commands;
pub mod config;
pub mod dashboard;
pub mod models;
pub mod session;
pub mod trigger;
pub mod usage;

/// Returns the crate version.
pub fn version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn version_is_not_empty() {
        assert!(!version().is_empty());
    }
}
