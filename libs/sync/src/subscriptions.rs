//! Subscription synchronizer.
//!
//! Holds the subscription boolean for every event in the current listing.
//! Statuses are resolved in one batched call per listing; single toggles go
//! through a two-phase update:
//!
//! 1. the id is marked in flight together with its tentative value
//! 2. on success the cache takes the new value, on failure it is left alone
//!
//! At most one toggle per id may be in flight. The in-flight marker is held
//! by a guard, so it is released on every exit path including cancellation.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use async_trait::async_trait;
use eventboard_id::EventId;
use eventboard_model::{resolve_requested, SubscriptionMap};
use tracing::{debug, info, warn};

use crate::{EventsApi, ListingObserver, SyncError, SyncResult};

#[derive(Debug, Default)]
struct SubscriptionState {
    statuses: SubscriptionMap,
    /// Tentative value of every in-flight toggle.
    in_flight: HashMap<EventId, bool>,
    applied_resolve: u64,
    last_listing: u64,
}

/// Per-event subscription state for the current user.
pub struct SubscriptionSync {
    api: Arc<dyn EventsApi>,
    next_resolve: AtomicU64,
    state: Mutex<SubscriptionState>,
}

/// Releases an in-flight toggle on drop.
struct ToggleGuard<'a> {
    sync: &'a SubscriptionSync,
    event_id: EventId,
}

impl Drop for ToggleGuard<'_> {
    fn drop(&mut self) {
        self.sync.state().in_flight.remove(&self.event_id);
    }
}

impl SubscriptionSync {
    pub fn new(api: Arc<dyn EventsApi>) -> Self {
        Self {
            api,
            next_resolve: AtomicU64::new(0),
            state: Mutex::new(SubscriptionState::default()),
        }
    }

    fn state(&self) -> MutexGuard<'_, SubscriptionState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Resolve statuses for `ids` in one round-trip and replace the cache.
    ///
    /// The returned map has exactly the requested ids as keys. An empty
    /// request clears the cache without touching the network. If a later
    /// resolution was applied first, the cache is left alone and
    /// [`SyncError::Stale`] is returned.
    pub async fn resolve_statuses(&self, ids: &[EventId]) -> SyncResult<SubscriptionMap> {
        self.resolve(ids, None).await
    }

    /// Resolution driven by listing `listing_seq`. Besides the resolution
    /// guard, the result is dropped if another listing arrived while the
    /// request was out, even when that listing's own resolution failed.
    async fn resolve(
        &self,
        ids: &[EventId],
        listing_seq: Option<u64>,
    ) -> SyncResult<SubscriptionMap> {
        let seq = self.next_resolve.fetch_add(1, Ordering::SeqCst) + 1;

        let resolved = if ids.is_empty() {
            SubscriptionMap::new()
        } else {
            debug!(seq, count = ids.len(), "Resolving subscription statuses");
            let statuses = self
                .api
                .subscription_statuses(ids)
                .await
                .inspect_err(|e| warn!(seq, error = %e, "Failed to resolve subscription statuses"))?;
            resolve_requested(ids, statuses)
        };

        let mut state = self.state();
        if let Some(listing_seq) = listing_seq.filter(|l| *l != state.last_listing) {
            debug!(
                listing_seq,
                latest = state.last_listing,
                "Discarding resolution for a superseded listing"
            );
            return Err(SyncError::Stale {
                seq: listing_seq,
                latest: state.last_listing,
            });
        }
        if seq <= state.applied_resolve {
            debug!(seq, latest = state.applied_resolve, "Discarding superseded resolution");
            return Err(SyncError::Stale {
                seq,
                latest: state.applied_resolve,
            });
        }

        let mut cache = resolved.clone();
        for (id, value) in cache.iter_mut() {
            if state.in_flight.contains_key(id) {
                if let Some(previous) = state.statuses.get(id) {
                    *value = *previous;
                }
            }
        }
        state.statuses = cache;
        state.applied_resolve = seq;
        debug!(
            seq,
            subscribed = resolved.values().filter(|s| **s).count(),
            "Subscription statuses applied"
        );

        Ok(resolved)
    }

    /// Subscribe if `current_status` is false, else unsubscribe.
    ///
    /// Returns the new status. Fails with [`SyncError::ToggleInFlight`] if a
    /// toggle for the same event has not finished yet.
    pub async fn toggle(&self, event_id: &EventId, current_status: bool) -> SyncResult<bool> {
        let target = !current_status;
        let _guard = self.begin_toggle(event_id, target)?;

        let result = if target {
            self.api.subscribe(event_id).await
        } else {
            self.api.unsubscribe(event_id).await
        };

        match result {
            Ok(()) => {
                self.state().statuses.insert(event_id.clone(), target);
                info!(event_id = %event_id, subscribed = target, "Subscription changed");
                Ok(target)
            }
            Err(e) => {
                warn!(event_id = %event_id, error = %e, "Subscription change failed; reverting");
                Err(e)
            }
        }
    }

    fn begin_toggle(&self, event_id: &EventId, target: bool) -> SyncResult<ToggleGuard<'_>> {
        let mut state = self.state();
        if state.in_flight.contains_key(event_id) {
            debug!(event_id = %event_id, "Rejecting concurrent toggle");
            return Err(SyncError::ToggleInFlight(event_id.clone()));
        }
        state.in_flight.insert(event_id.clone(), target);

        Ok(ToggleGuard {
            sync: self,
            event_id: event_id.clone(),
        })
    }

    /// Confirmed status; unknown events are not subscribed.
    pub fn status(&self, event_id: &EventId) -> bool {
        self.state()
            .statuses
            .get(event_id)
            .copied()
            .unwrap_or(false)
    }

    /// Status to display: the tentative value while a toggle is in flight,
    /// the confirmed one otherwise.
    pub fn effective_status(&self, event_id: &EventId) -> bool {
        let state = self.state();
        state
            .in_flight
            .get(event_id)
            .or_else(|| state.statuses.get(event_id))
            .copied()
            .unwrap_or(false)
    }

    /// Copy of the confirmed statuses.
    pub fn snapshot(&self) -> SubscriptionMap {
        self.state().statuses.clone()
    }

    pub fn is_pending(&self, event_id: &EventId) -> bool {
        self.state().in_flight.contains_key(event_id)
    }

    /// Drop a deleted event from the cache.
    pub fn forget(&self, event_id: &EventId) {
        self.state().statuses.remove(event_id);
    }
}

#[async_trait]
impl ListingObserver for SubscriptionSync {
    async fn listing_applied(&self, listing_seq: u64, event_ids: &[EventId]) {
        {
            let mut state = self.state();
            if listing_seq < state.last_listing {
                return;
            }
            state.last_listing = listing_seq;
        }

        match self.resolve(event_ids, Some(listing_seq)).await {
            Ok(_) => {}
            Err(e) if e.is_stale() => {}
            Err(e) => warn!(listing_seq, error = %e, "Keeping previous subscription statuses"),
        }
    }
}
