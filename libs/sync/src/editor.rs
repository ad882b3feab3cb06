//! Event editor: detached drafts committed as partial updates.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use eventboard_id::EventId;
use eventboard_model::{Event, EventPatch};
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::{Directory, EventsApi, FailureKind, SyncError};

/// An open edit of one event.
///
/// Holds its own copy of the event; nothing in the [`Directory`] changes
/// until the draft is committed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EditDraft {
    original: Event,
    pub title: String,
    pub description: String,
    pub date: Option<DateTime<Utc>>,
}

impl EditDraft {
    fn new(event: &Event) -> Self {
        Self {
            original: event.clone(),
            title: event.title.clone(),
            description: event.description.clone(),
            date: event.date,
        }
    }

    pub fn event_id(&self) -> &EventId {
        &self.original.id
    }

    /// The event as it was when editing began.
    pub fn original(&self) -> &Event {
        &self.original
    }

    /// Fields that differ from the original. A date can be changed but
    /// not cleared.
    pub fn patch(&self) -> EventPatch {
        EventPatch {
            title: (self.title != self.original.title).then(|| self.title.clone()),
            description: (self.description != self.original.description)
                .then(|| self.description.clone()),
            date: self.date.filter(|date| Some(*date) != self.original.date),
        }
    }

    pub fn is_dirty(&self) -> bool {
        !self.patch().is_empty()
    }
}

/// A commit that did not go through. The draft is handed back unchanged.
#[derive(Debug, Error)]
#[error("failed to save changes to event {}", .draft.event_id())]
pub struct CommitError {
    pub draft: EditDraft,
    #[source]
    pub error: SyncError,
}

impl CommitError {
    pub fn kind(&self) -> FailureKind {
        self.error.kind()
    }
}

/// Opens and commits edit drafts.
pub struct Editor {
    api: Arc<dyn EventsApi>,
    directory: Arc<Directory>,
}

impl Editor {
    pub fn new(api: Arc<dyn EventsApi>, directory: Arc<Directory>) -> Self {
        Self { api, directory }
    }

    pub fn begin_edit(&self, event: &Event) -> EditDraft {
        debug!(event_id = %event.id, "Editing event");
        EditDraft::new(event)
    }

    /// Send the draft's changed fields and refresh the directory.
    ///
    /// Last write wins; no version is checked. On failure the draft comes
    /// back inside the error with the user's changes intact.
    pub async fn commit(&self, draft: EditDraft) -> Result<Event, CommitError> {
        let patch = draft.patch();
        if patch.is_empty() {
            debug!(event_id = %draft.event_id(), "Nothing to commit");
            return Ok(draft.original);
        }

        if let Err(e) = patch.validate() {
            return Err(CommitError {
                draft,
                error: e.into(),
            });
        }

        let updated = match self.api.update_event(draft.event_id(), &patch).await {
            Ok(updated) => updated,
            Err(error) => {
                warn!(event_id = %draft.event_id(), error = %error, "Failed to update event");
                return Err(CommitError { draft, error });
            }
        };
        info!(event_id = %updated.id, "Event updated");

        match self.directory.refresh().await {
            Ok(_) => {}
            Err(e) if e.is_stale() => {}
            Err(e) => warn!(error = %e, "Updated event but failed to refresh listing"),
        }

        Ok(updated)
    }
}
