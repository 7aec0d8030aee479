//! # Trellis Shared Library
//!
//! This crate contains the types and business logic shared by the Trellis
//! API server: database models, authentication primitives, access-control
//! predicates, and the kanban ordering engine.
//!
//! ## Module Organization
//!
//! - `models`: Database models and their CRUD operations
//! - `auth`: Password hashing, session tokens, and access control
//! - `ordering`: Order-key reordering for kanban columns and tasks
//! - `db`: Connection pool and migrations

pub mod auth;
pub mod db;
pub mod models;
pub mod ordering;

/// Current version of the Trellis shared library
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version_is_set() {
        assert!(!VERSION.is_empty());
    }
}
