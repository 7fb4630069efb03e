//! ego-coach: local heuristic tension analysis and journal statistics, with Hexagonal Architecture.
//!
//! The three core entry points are pure and re-exported here: [`analyze`],
//! [`compute_stats`] and [`format_relative`].

pub mod adapters;
pub mod domain;
pub mod ports;
pub mod shared;
pub mod usecases;

pub use domain::{analyze, compute_stats, format_relative};
