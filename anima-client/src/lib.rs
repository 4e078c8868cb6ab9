//! # anima-client — HTTP client for the Anima memory API
//!
//! Thin, stateless wrapper over the remote API:
//!   - **Animas** — create agent entities
//!   - **Events** — submit interactions for server-side memory synthesis
//!   - **Memory packs** — fetch the latest compiled pack for prompt injection
//!
//! Every call is a single round trip bounded by the configured timeout.
//! There is no caching, batching or retrying; failures surface once as an
//! [`AnimaError`].
//!
//! ```no_run
//! use anima_client::{AnimaClient, EventOptions, PackRequest};
//!
//! # async fn run() -> anima_client::Result<()> {
//! let client = AnimaClient::builder().api_key("ak_...").anima_id("an_123").build()?;
//! client
//!     .submit_event("MESSAGE_IN", "What did we decide yesterday?", EventOptions::default().role("user"))
//!     .await?;
//! if let Some(pack) = client.latest_memory_pack(&PackRequest::default()).await? {
//!     println!("{}", pack.to_prompt());
//! }
//! # Ok(())
//! # }
//! ```

#![deny(clippy::unwrap_used)]
#![deny(missing_docs)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod client;
pub mod shared;
pub mod transport;

pub use anima_core::{
    Anima, AnimaError, ClientConfig, ClientSettings, Event, EventType, MemoryPack,
    MemoryPackContent, MemoryPackRecord, Metadata, NewAnima, Result, ScoredItem,
    resolve_event_type,
};
pub use client::{AnimaClient, AnimaClientBuilder, EventOptions, PackRequest};
pub use transport::Transport;
