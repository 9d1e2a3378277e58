//! Domain layer
//!
//! Contains pure business logic with no external dependencies.
//! - `values`: Self-validating value objects
//! - `entities`: The `User` and `Group` aggregates
//! - `ports`: Trait definitions for persistence

pub mod entities;
pub mod ports;
pub mod values;
