//! cardsync-core - Core library for cardsync
//!
//! This crate contains the record model, the record-store client, and the
//! engines that reconcile card reference data between two stores and import
//! cards from the external catalog. The API server and the CLI are thin shells
//! around it.

pub mod catalog;
pub mod config;
pub mod error;
pub mod links;
pub mod models;
pub mod store;
pub mod sync;
pub mod util;

pub use error::{Error, Result};
pub use links::MediaLinks;
pub use models::{ReferenceTier, SyncId};
