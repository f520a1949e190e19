//! SQLite persistence for tasting notes and Gourmet Friend pins.
//!
//! Both stores share one database file. Each call opens its own connection on
//! Tokio's blocking pool, so the stores are cheap to clone and safe to share
//! across tasks.

#![forbid(unsafe_code)]

mod connection;
mod error;
mod notes;
mod pins;

pub use error::SqliteStoreError;
pub use notes::SqliteNoteStore;
pub use pins::SqlitePinStore;
