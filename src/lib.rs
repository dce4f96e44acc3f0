//! Grade relay library.
//!
//! Accepts a student's grades over HTTP, forwards them to the data
//! aggregation service and replies with a plain-text summary of both.

pub mod config;
pub mod downstream;
pub mod grades;
pub mod http;
pub mod lifecycle;
pub mod observability;

pub use config::RelayConfig;
pub use grades::{GradesResult, Student};
pub use http::HttpServer;
pub use lifecycle::Shutdown;
