//! Event directory: the "all" and "mine" views of events.
//!
//! Search runs on every keystroke, so responses can arrive out of order.
//! Every call to [`Directory::list`] takes a sequence number and a response
//! is applied only if no higher-numbered response has been applied already.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use eventboard_id::{EventId, UserId};
use eventboard_model::{Event, NewEvent};
use tokio::sync::RwLock;
use tracing::{debug, info, warn};

use crate::{EventsApi, SyncError, SyncResult};

/// Notified after a listing has been applied to the directory.
#[async_trait]
pub trait ListingObserver: Send + Sync {
    /// `listing_seq` increases with every applied listing; `event_ids` is the
    /// exact id set of that listing, in listing order.
    async fn listing_applied(&self, listing_seq: u64, event_ids: &[EventId]);
}

#[derive(Debug, Default)]
struct DirectoryState {
    /// Sequence number of the listing currently shown.
    applied_seq: u64,
    last_search: String,
    owner: Option<UserId>,
    all: Vec<Event>,
    mine: Vec<Event>,
}

impl DirectoryState {
    fn recompute_mine(&mut self) {
        self.mine = match &self.owner {
            Some(owner) => owned_by(&self.all, owner),
            None => Vec::new(),
        };
    }
}

fn owned_by(events: &[Event], owner: &UserId) -> Vec<Event> {
    events
        .iter()
        .filter(|event| event.is_owned_by(owner))
        .cloned()
        .collect()
}

/// Canonical and filtered views of events.
pub struct Directory {
    api: Arc<dyn EventsApi>,
    observers: Vec<Arc<dyn ListingObserver>>,
    next_seq: AtomicU64,
    state: RwLock<DirectoryState>,
}

impl Directory {
    pub fn new(api: Arc<dyn EventsApi>) -> Self {
        Self {
            api,
            observers: Vec::new(),
            next_seq: AtomicU64::new(0),
            state: RwLock::new(DirectoryState::default()),
        }
    }

    /// Register an observer for applied listings.
    pub fn with_observer(mut self, observer: Arc<dyn ListingObserver>) -> Self {
        self.observers.push(observer);
        self
    }

    /// Fetch events whose title contains `search` (case-insensitive).
    ///
    /// Replaces the "all" view, recomputes "mine", and notifies observers.
    /// Returns [`SyncError::Stale`] if a later search was applied first; the
    /// views are left untouched in that case and on any failure.
    pub async fn list(&self, search: &str) -> SyncResult<Vec<Event>> {
        let seq = self.next_seq.fetch_add(1, Ordering::SeqCst) + 1;
        debug!(seq, search, "Listing events");

        let mut events = match self.api.list_events(search).await {
            Ok(events) => events,
            Err(e) => {
                warn!(seq, search, error = %e, "Failed to list events; keeping current view");
                return Err(e);
            }
        };
        // The server filters too; this keeps the result honest if it doesn't.
        events.retain(|event| event.title_matches(search));

        let event_ids: Vec<EventId> = {
            let mut state = self.state.write().await;
            if seq <= state.applied_seq {
                debug!(seq, latest = state.applied_seq, "Discarding superseded listing");
                return Err(SyncError::Stale {
                    seq,
                    latest: state.applied_seq,
                });
            }

            state.applied_seq = seq;
            state.last_search = search.to_string();
            state.all = events.clone();
            state.recompute_mine();
            info!(
                seq,
                search,
                event_count = state.all.len(),
                mine_count = state.mine.len(),
                "Listing applied"
            );

            events.iter().map(|event| event.id.clone()).collect()
        };

        for observer in &self.observers {
            observer.listing_applied(seq, &event_ids).await;
        }

        Ok(events)
    }

    /// Re-run the last search.
    pub async fn refresh(&self) -> SyncResult<Vec<Event>> {
        let search = self.last_search().await;
        self.list(&search).await
    }

    /// Events in the most recent listing created by `user_id`.
    ///
    /// Computed locally; never touches the network.
    pub async fn filter_by_owner(&self, user_id: &UserId) -> Vec<Event> {
        owned_by(&self.state.read().await.all, user_id)
    }

    /// Set the user whose events make up the "mine" view.
    pub async fn set_owner(&self, user_id: UserId) {
        let mut state = self.state.write().await;
        state.owner = Some(user_id);
        state.recompute_mine();
    }

    pub async fn owner(&self) -> Option<UserId> {
        self.state.read().await.owner.clone()
    }

    pub async fn all(&self) -> Vec<Event> {
        self.state.read().await.all.clone()
    }

    pub async fn mine(&self) -> Vec<Event> {
        self.state.read().await.mine.clone()
    }

    pub async fn last_search(&self) -> String {
        self.state.read().await.last_search.clone()
    }

    /// Look up an event in the current listing.
    pub async fn find(&self, event_id: &EventId) -> Option<Event> {
        self.state
            .read()
            .await
            .all
            .iter()
            .find(|event| &event.id == event_id)
            .cloned()
    }

    /// Delete an event and drop it from both views.
    pub async fn delete(&self, event_id: &EventId) -> SyncResult<()> {
        if let Err(e) = self.api.delete_event(event_id).await {
            warn!(event_id = %event_id, error = %e, "Failed to delete event");
            return Err(e);
        }

        let mut state = self.state.write().await;
        state.all.retain(|event| &event.id != event_id);
        state.mine.retain(|event| &event.id != event_id);
        info!(event_id = %event_id, "Event deleted");

        Ok(())
    }

    /// Validate and create an event, then refresh the listing.
    ///
    /// Nothing is sent if a required field is missing. A failed refresh after
    /// a successful create is logged, not returned.
    pub async fn create(&self, new_event: NewEvent) -> SyncResult<Event> {
        let form = new_event.validate()?;
        let created = self.api.create_event(&form).await.inspect_err(|e| {
            warn!(title = %form.title, error = %e, "Failed to create event");
        })?;
        info!(event_id = %created.id, title = %created.title, "Event created");

        match self.refresh().await {
            Ok(_) => {}
            Err(e) if e.is_stale() => {}
            Err(e) => warn!(error = %e, "Created event but failed to refresh listing"),
        }

        Ok(created)
    }
}
