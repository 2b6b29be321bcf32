//! Core types for the e-commerce API.
//!
//! This module provides type-safe wrappers for entity identifiers.

pub mod id;

pub use id::*;
