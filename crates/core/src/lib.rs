//! Core domain types, error taxonomy, and configuration for the
//! Retail Intelligence platform.

pub mod config;
pub mod error;
pub mod types;

pub use error::{RetailError, RetailResult};
