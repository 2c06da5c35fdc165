//! Mailsheet Domain Layer
//!
//! Core model for turning project-listing emails into spreadsheet rows.
//! This crate has no external dependencies and defines the value objects
//! and trait interfaces the other crates build on.
//!
//! ## Key Concepts
//!
//! - **ProjectRecord**: One extracted project listing with seven text fields
//! - **Sentinel**: The `未記入` placeholder meaning "field not found"
//! - **EmailBlock**: A slice of a message believed to describe one project
//! - **EventGate**: Idempotency check for webhook deliveries

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod block;
pub mod record;
pub mod traits;

// Re-exports for convenience
pub use block::EmailBlock;
pub use record::{is_placeholder, Field, ProjectRecord, SENTINEL, UNKNOWN};
pub use traits::EventGate;
