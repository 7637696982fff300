//! Subcommand implementations.

pub mod distance;
pub mod duplicates;
pub mod hash;
pub mod info;
pub mod similar;
