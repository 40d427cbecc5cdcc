//! Core types and utilities for the Wa-Tor predator-prey simulation.

pub mod config;
pub mod error;
pub mod types;

pub use config::*;
pub use error::{Error, Result};
pub use types::*;
