//! Change log aggregator.

use std::sync::{Arc, Mutex, PoisonError};

use eventboard_model::{ChangeGroup, UpdatesResponse};
use serde::Serialize;
use tracing::{debug, info, warn};

use crate::{EventsApi, SyncResult};

/// Number of leading groups shown prominently.
pub const HIGHLIGHT_COUNT: usize = 3;

/// How prominently a change group is shown.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Prominence {
    Highlighted,
    Older,
}

/// A change group with its display prominence.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RankedGroup {
    pub prominence: Prominence,
    #[serde(flatten)]
    pub group: ChangeGroup,
}

impl RankedGroup {
    pub fn is_highlighted(&self) -> bool {
        self.prominence == Prominence::Highlighted
    }
}

/// Result of a "check updates" call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum UpdatesOutcome {
    NoUpdates { message: String },
    Updates { groups: Vec<RankedGroup> },
}

/// Rank groups in server order: the first [`HIGHLIGHT_COUNT`] are
/// highlighted, the rest are older. Never re-sorts.
pub fn rank_groups(groups: Vec<ChangeGroup>) -> Vec<RankedGroup> {
    groups
        .into_iter()
        .enumerate()
        .map(|(index, group)| RankedGroup {
            prominence: if index < HIGHLIGHT_COUNT {
                Prominence::Highlighted
            } else {
                Prominence::Older
            },
            group,
        })
        .collect()
}

/// Fetches and ranks change logs for the current user's subscriptions.
pub struct UpdateFeed {
    api: Arc<dyn EventsApi>,
    latest: Mutex<Option<UpdatesOutcome>>,
}

impl UpdateFeed {
    pub fn new(api: Arc<dyn EventsApi>) -> Self {
        Self {
            api,
            latest: Mutex::new(None),
        }
    }

    /// Fetch the change log.
    ///
    /// A failure is returned as an error and leaves [`UpdateFeed::latest`]
    /// as it was.
    pub async fn fetch_updates(&self) -> SyncResult<UpdatesOutcome> {
        debug!("Checking for updates");
        let response = self
            .api
            .check_updates()
            .await
            .inspect_err(|e| warn!(error = %e, "Failed to check for updates"))?;

        let outcome = match response {
            UpdatesResponse::NoUpdates { message } => {
                info!("No updates");
                UpdatesOutcome::NoUpdates { message }
            }
            UpdatesResponse::Groups(groups) => {
                info!(group_count = groups.len(), "Updates received");
                UpdatesOutcome::Updates {
                    groups: rank_groups(groups),
                }
            }
        };

        *self.latest.lock().unwrap_or_else(PoisonError::into_inner) = Some(outcome.clone());
        Ok(outcome)
    }

    /// The last successful outcome, if any.
    pub fn latest(&self) -> Option<UpdatesOutcome> {
        self.latest
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mock::{MockApi, Operation};
    use crate::FailureKind;
    use chrono::{TimeZone, Utc};
    use eventboard_id::EventId;
    use eventboard_model::ChangeLogEntry;

    fn group(n: usize) -> ChangeGroup {
        ChangeGroup {
            event_id: EventId::parse(&format!("e{n}")).unwrap(),
            event_title: format!("Event {n}"),
            updates: vec![ChangeLogEntry {
                changes: vec!["title changed".to_string()],
                updated_by: "ada".to_string(),
                at: Utc.with_ymd_and_hms(2025, 5, 1, 10, 0, 0).unwrap(),
            }],
        }
    }

    #[test]
    fn test_first_three_highlighted_in_server_order() {
        let ranked = rank_groups((1..=5).map(group).collect());

        let prominence: Vec<Prominence> = ranked.iter().map(|g| g.prominence).collect();
        assert_eq!(
            prominence,
            vec![
                Prominence::Highlighted,
                Prominence::Highlighted,
                Prominence::Highlighted,
                Prominence::Older,
                Prominence::Older,
            ]
        );
        let titles: Vec<&str> = ranked.iter().map(|g| g.group.event_title.as_str()).collect();
        assert_eq!(titles, vec!["Event 1", "Event 2", "Event 3", "Event 4", "Event 5"]);
    }

    #[test]
    fn test_few_groups_all_highlighted() {
        let ranked = rank_groups(vec![group(1), group(2)]);
        assert!(ranked.iter().all(RankedGroup::is_highlighted));
        assert!(rank_groups(Vec::new()).is_empty());
    }

    #[test]
    fn test_outcome_serializes_tagged() {
        let json = serde_json::to_value(UpdatesOutcome::Updates {
            groups: rank_groups(vec![group(1)]),
        })
        .unwrap();
        assert_eq!(json["kind"], "updates");
        assert_eq!(json["groups"][0]["prominence"], "highlighted");
        assert_eq!(json["groups"][0]["eventTitle"], "Event 1");
    }

    #[tokio::test]
    async fn test_sentinel_is_distinct_outcome() {
        let api = Arc::new(MockApi::new());
        let feed = UpdateFeed::new(api.clone());

        let outcome = feed.fetch_updates().await.unwrap();
        assert_eq!(
            outcome,
            UpdatesOutcome::NoUpdates {
                message: "No updates".to_string()
            }
        );
    }

    #[tokio::test]
    async fn test_failure_keeps_previous_outcome() {
        let api = Arc::new(MockApi::new());
        api.set_updates(UpdatesResponse::Groups(vec![group(1)]));
        let feed = UpdateFeed::new(api.clone());
        assert!(feed.latest().is_none());

        let first = feed.fetch_updates().await.unwrap();
        api.fail(Operation::CheckUpdates);
        let err = feed.fetch_updates().await.unwrap_err();

        assert_eq!(err.kind(), FailureKind::Transport);
        assert_eq!(feed.latest(), Some(first));
    }

    proptest::proptest! {
        #[test]
        fn prop_ranking_keeps_order_and_count(n in 0usize..12) {
            let ranked = rank_groups((1..=n).map(group).collect());

            proptest::prop_assert_eq!(ranked.len(), n);
            let highlighted = ranked.iter().filter(|g| g.is_highlighted()).count();
            proptest::prop_assert_eq!(highlighted, n.min(HIGHLIGHT_COUNT));
            for (i, g) in ranked.iter().enumerate() {
                proptest::prop_assert_eq!(g.is_highlighted(), i < HIGHLIGHT_COUNT);
                proptest::prop_assert_eq!(&g.group.event_title, &format!("Event {}", i + 1));
            }
        }
    }
}
