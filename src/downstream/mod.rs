//! Data aggregation service client.
//!
//! # Data Flow
//! ```text
//! Student
//!     → client.rs (serialize, POST to configured endpoint, deadline)
//!     → response status check
//!     → body read (size capped)
//!     → GradesResult::from_json
//! ```
//!
//! # Design Decisions
//! - One attempt per inbound request; failures are returned, never retried
//! - Every call has a deadline (downstream.timeout_secs)
//! - Target settings live behind an ArcSwap so a config reload never blocks callers

pub mod client;
pub mod types;

pub use client::DownstreamClient;
pub use types::DownstreamError;
