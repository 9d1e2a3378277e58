//! Test utilities
//!
//! In-memory implementations of the repository ports and test fixtures.
//!
//! The in-memory repositories share one store, including a single
//! association table. Repository writes replace an aggregate's association
//! rows and reads re-derive them. Writes enforce the `users.email` unique
//! index and the `user_groups` foreign keys; the `with_*` builders seed
//! state without those checks.

pub mod fixtures;
pub mod mocks;

pub use fixtures::*;
pub use mocks::*;
