//! SQLite backend for the compatibility store.
//!
//! Wraps [`tokio_rusqlite`] so all database access runs on a dedicated thread
//! without blocking the async runtime. Every multi-step mutation runs inside
//! a single SQLite transaction within one closure, so it either commits as a
//! whole or rolls back.

mod encode;
mod graph;
mod ratings;
mod roster;
mod schema;
mod store;

pub mod error;

pub use error::{Error, Result};
pub use store::SqliteStore;
