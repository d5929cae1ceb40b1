//! Shared types, errors, and configuration for Chartwell.
//!
//! This crate provides common types used across all other crates:
//! - Money types with decimal precision and currency guards
//! - Typed IDs for type-safe entity references
//! - Application-wide error types
//! - Configuration management

pub mod config;
pub mod error;
pub mod types;

pub use config::{HierarchySettings, HousekeepingSettings, Settings};
pub use error::{AppError, AppResult};
