//! Blob storage subsystem
//!
//! Components:
//! - `client`: environment-driven connection config, client cache, leases.
//! - `blob_store`: file/folder operations composed with tracing and retry.
//! - `types`: payloads and per-call access options.

pub mod blob_store;
pub mod client;
pub mod types;

pub use blob_store::BlobStore;
pub use types::{AccessOptions, Payload};
