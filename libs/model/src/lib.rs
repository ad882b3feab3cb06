//! # eventboard-model
//!
//! Wire types for the eventboard API.
//!
//! ## Design Principles
//!
//! - Types mirror the JSON the backend speaks (camelCase keys)
//! - Invariants that must hold before a request is sent (required fields,
//!   non-empty titles) are checked here, not by callers
//! - Response shapes that the backend does not tag are classified once, at
//!   decode time, into explicit enums; nothing downstream re-inspects JSON
//!
//! ## Modules
//!
//! - [`event`]: events, creators, the current user, create/update payloads
//! - [`subscription`]: batched subscription status request/response
//! - [`changelog`]: change log entries, per-event groups, and the
//!   "no updates" sentinel

pub mod changelog;
mod error;
pub mod event;
pub mod subscription;

pub use changelog::*;
pub use error::ModelError;
pub use event::*;
pub use subscription::*;
