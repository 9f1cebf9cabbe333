//! Shared errors and configuration for Fish.
//!
//! This crate provides the pieces every other crate agrees on:
//! - Application-wide error types
//! - Configuration management

pub mod config;
pub mod error;

pub use config::{AppConfig, ExpiryConfig, ServerConfig, StorageSettings};
pub use error::AppError;
