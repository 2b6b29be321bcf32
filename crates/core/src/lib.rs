//! Ecom Core - Shared types library.
//!
//! This crate provides the types used across all e-commerce API components:
//! - `api` - HTTP server exposing Users, Orders and Products
//! - `cli` - Command-line tools for migrations
//!
//! # Architecture
//!
//! The core crate contains only types and pure functions - no I/O, no database
//! access, no HTTP. This keeps it lightweight and allows it to be used anywhere.
//!
//! # Modules
//!
//! - [`types`] - Newtype wrappers for type-safe entity IDs
//! - [`models`] - Entity records and their loaded relation graphs
//! - [`payload`] - Request bodies and required-field validation
//! - [`view`] - JSON projections with back-references excluded

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod models;
pub mod payload;
pub mod types;
pub mod view;

pub use models::*;
pub use payload::*;
pub use types::*;
pub use view::*;
