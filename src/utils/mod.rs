//! Utility modules for the solver.
//!
//! This module contains common utilities used throughout the codebase:
//! - Error types
//! - Exact integer arithmetic
//! - Text layout for printing results

pub mod errors;
pub mod integer;
pub mod pretty;

// Re-exports
pub use errors::*;
pub use pretty::IndentWriter;
