//! # Anima Core
//!
//! Transport-free building blocks of the Anima client:
//!
//! - **Errors** — [`AnimaError`], the taxonomy every client failure maps onto
//! - **Event types** — [`EventType`] and [`resolve_event_type`], accepting
//!   canonical dotted tags and legacy uppercase aliases
//! - **Wire types** — animas, events and memory-pack records
//! - **Memory packs** — [`MemoryPack`], a read-only view with prompt accessors
//! - **Configuration** — [`ClientSettings`] resolved into [`ClientConfig`]
//!
//! Nothing in this crate performs I/O apart from reading a settings file.

#![deny(clippy::unwrap_used)]
#![deny(missing_docs)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod config;
pub mod error;
pub mod event_type;
pub mod pack;
pub mod types;

pub use config::{ClientConfig, ClientSettings};
pub use error::{AnimaError, Result};
pub use event_type::{EventType, resolve_event_type};
pub use pack::MemoryPack;
pub use types::*;
