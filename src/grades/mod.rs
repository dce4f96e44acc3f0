//! Grade data exchanged with the data aggregation service.
//!
//! # Data Flow
//! ```text
//! POST /student body
//!     → Student (deserialized, no validation)
//!     → forwarded as JSON to the data aggregation service
//!     → GradesResult::from_json (response body)
//!     → Display of both rendered into the reply text
//! ```
//!
//! Both types are request-scoped values; nothing here is persisted.

pub mod types;

pub use types::{GradeMap, GradesResult, Student};
