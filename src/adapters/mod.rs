//! Infrastructure adapters. Implement ports.
//!
//! Storage (SQLite, in-memory) and the terminal UI. Map errors to DomainError.

pub mod persistence;
pub mod ui;
