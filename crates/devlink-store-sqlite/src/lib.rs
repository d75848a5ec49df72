//! SQLite backend for the Devlink store.
//!
//! Wraps [`tokio_rusqlite`] so all database access runs on a dedicated thread
//! without blocking the async runtime. Users live in ordinary columns;
//! profiles and posts are stored as JSON documents alongside the few columns
//! needed to key and order them.

mod encode;
mod schema;
mod store;

pub mod error;

pub use error::{Error, Result};
pub use store::SqliteStore;

#[cfg(test)]
mod tests;
