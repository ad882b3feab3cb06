//! Batched subscription status.

use std::collections::BTreeMap;

use eventboard_id::EventId;
use serde::{Deserialize, Serialize};

/// Subscription booleans keyed by event.
pub type SubscriptionMap = BTreeMap<EventId, bool>;

/// Body of `POST /subscriptions/status`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StatusRequest {
    pub event_ids: Vec<EventId>,
}

/// One element of the `POST /subscriptions/status` response.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubscriptionStatus {
    pub event_id: EventId,
    pub is_subscribed: bool,
}

/// Fold a status response into a map whose key set is exactly `requested`.
///
/// Requested ids the server did not mention resolve to `false`; entries for
/// ids that were not requested are dropped.
pub fn resolve_requested<'a, I>(requested: I, statuses: Vec<SubscriptionStatus>) -> SubscriptionMap
where
    I: IntoIterator<Item = &'a EventId>,
{
    let mut resolved: SubscriptionMap = requested.into_iter().map(|id| (id.clone(), false)).collect();

    for status in statuses {
        if let Some(slot) = resolved.get_mut(&status.event_id) {
            *slot = status.is_subscribed;
        }
    }

    resolved
}
