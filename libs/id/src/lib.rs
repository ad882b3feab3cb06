//! # eventboard-id
//!
//! Typed identifiers for the resources the eventboard client talks about.
//!
//! ## Design Principles
//!
//! - IDs are assigned by the server and treated as opaque strings
//! - IDs are typed so an event ID can never be passed where a user ID is expected
//! - Parsing is strict: an ID is spliced into URL paths, so it may not be empty
//!   and may not contain whitespace or path/query delimiters
//!
//! ## Wire Format
//!
//! IDs serialize as plain JSON strings. The backend currently issues
//! 24-character hex object IDs, e.g. `665f1c2ab8e4d91f3c0a7e21`, but nothing
//! here depends on that.

mod error;
mod macros;
mod types;

pub use error::IdError;
pub use macros::RESERVED_CHARS;
pub use types::*;
