//! # fa-core
//!
//! Core types for the FTP attachment adapter.
//!
//! This crate provides the building blocks shared by the storage layer:
//! - Record identifiers (integer keys, 128-bit tokens, string keys)
//! - Storage configuration with fail-fast validation
//! - Configuration error types

pub mod config;
pub mod error;
pub mod identifier;

pub use config::{FtpConfig, Partitioning};
pub use error::ConfigError;
pub use identifier::Identifier;
