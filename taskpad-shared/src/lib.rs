//! # Taskpad Shared Library
//!
//! This crate contains the types and data-access logic shared between the
//! Taskpad API server and the client layer.
//!
//! ## Module Organization
//!
//! - `models`: Database models and their CRUD operations
//! - `db`: Connection pool and migration runner
//! - `envelope`: The uniform `{success, data, error}` response wrapper

pub mod db;
pub mod envelope;
pub mod models;

/// Current version of the Taskpad shared library
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version_is_set() {
        assert!(!VERSION.is_empty());
    }
}
