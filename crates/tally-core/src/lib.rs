//! tally-core library.
//!
//! An ordered collection of named numeric items with a running total, kept in
//! lockstep with a snapshot in a string key-value substrate.
//!
//! - [`store::ItemStore`] owns the live items and the edit selection.
//! - [`persist::PersistenceAdapter`] mirrors the collection into one slot.
//! - [`session::Session`] pairs every store mutation with its persistence call.
//!
//! # Conventions
//!
//! - **Errors**: Each module returns its own `thiserror` enum mapped to an
//!   [`error::ErrorCode`]; configuration loading uses `anyhow::Result`.
//! - **Logging**: Use `tracing` macros (`info!`, `warn!`, `debug!`).

pub mod config;
pub mod error;
pub mod model;
pub mod persist;
pub mod session;
pub mod store;

pub use error::ErrorCode;
pub use model::{Item, ItemId};
pub use persist::{KeyValueStore, PersistenceAdapter};
pub use session::{Change, Session, SessionError};
pub use store::{ItemStore, StoreError};
