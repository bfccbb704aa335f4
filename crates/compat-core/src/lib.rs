//! Core types and trait definitions for the season-scoped compatibility
//! engine.
//!
//! This crate is free of database dependencies. It owns the domain records,
//! the [`store::CompatStore`] abstraction, the weighted score engine and the
//! pure parts of roster assembly. Storage backends implement the trait.

// We intentionally use native `async fn` in traits (stabilised in Rust 1.75).
// Suppress the advisory lint about `Send` bounds on the returned futures.
#![allow(async_fn_in_trait)]

pub mod error;
pub mod person;
pub mod rating;
pub mod relationship;
pub mod roster;
pub mod score;
pub mod season;
pub mod store;

pub use error::{Error, Result};
