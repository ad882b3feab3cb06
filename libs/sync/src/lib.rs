//! # eventboard-sync
//!
//! Client-side state for the eventboard API: which events exist, which of
//! them the current user is subscribed to, and what changed since the user
//! last looked.
//!
//! ## Components
//!
//! - [`Directory`]: the "all" and "mine" views of events, title search, and
//!   deletion. Out-of-order search responses are discarded by sequence number.
//! - [`SubscriptionSync`]: per-event subscription booleans, resolved in one
//!   batched call per listing and toggled one event at a time.
//! - [`UpdateFeed`]: the "check updates" call, classified into a sentinel or
//!   a ranked list of change groups.
//! - [`Editor`]: detached edit drafts committed as partial updates.
//! - [`EventBoard`]: wires the four components over one [`EventsApi`].
//!
//! ## Invariants
//!
//! - Each cache is owned by exactly one component and only mutated through
//!   its methods
//! - A failed read leaves cached state as it was
//! - A failed write never leaves a tentative value behind
//! - Nothing retries on its own

mod api;
mod board;
mod directory;
mod editor;
mod error;
mod http;
pub mod mock;
mod session;
mod subscriptions;
mod updates;

pub use api::EventsApi;
pub use board::EventBoard;
pub use directory::{Directory, ListingObserver};
pub use editor::{CommitError, EditDraft, Editor};
pub use error::{FailureKind, SyncError, SyncResult};
pub use http::HttpApi;
pub use session::{Session, DEFAULT_REQUEST_TIMEOUT};
pub use subscriptions::SubscriptionSync;
pub use updates::{rank_groups, Prominence, RankedGroup, UpdateFeed, UpdatesOutcome, HIGHLIGHT_COUNT};

pub use eventboard_id::{EventId, UserId};
pub use eventboard_model as model;
