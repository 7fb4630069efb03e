//! Infrastructure adapters. Implement ports.
//!
//! Filesystem journal, clock, terminal UI. Map errors to DomainError.

pub mod clock;
pub mod persistence;
pub mod ui;
