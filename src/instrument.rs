//! Cross-cutting execution pipeline
//!
//! Components:
//! - `call_trace`: scoped call-stack tracking and start/finish/error logging.
//! - `retry`: bounded retry policy with skip/suppress predicates.
//! - `report`: fault rendering with wrapper frames elided.

pub mod call_trace;
pub mod report;
pub mod retry;

pub use call_trace::{traced, traced_async};
pub use retry::RetryPolicy;
