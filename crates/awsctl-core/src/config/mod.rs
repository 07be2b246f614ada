//! Configuration and profile management for awsctl
//!
// Allow nested config module - this is intentional for the config subsystem

#![allow(clippy::module_inception)]
//!
//! # Features
//!
//! - Multiple named profiles, each with a region, endpoint override and credentials
//! - Secure credential storage using OS keyring (optional)
//! - Environment variable expansion in config files
//! - Platform-specific config file locations

pub mod config;
pub mod credential;
pub mod error;

pub use config::{Config, Profile};
pub use credential::{CredentialStorage, CredentialStore};
pub use error::{ConfigError, Result};
