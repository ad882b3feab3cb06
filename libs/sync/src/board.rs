//! Facade wiring the directory, synchronizer, feed and editor together.

use std::sync::Arc;

use eventboard_id::EventId;
use eventboard_model::{CurrentUser, Event, NewEvent, SubscriptionMap};
use tokio::sync::OnceCell;
use tracing::{debug, warn};

use crate::{
    CommitError, Directory, EditDraft, Editor, EventsApi, HttpApi, Session, SubscriptionSync,
    SyncError, SyncResult, UpdateFeed, UpdatesOutcome,
};

/// One user's view of the eventboard.
///
/// Every listing applied by the [`Directory`] is followed by a batched
/// subscription resolution for exactly its event ids.
pub struct EventBoard {
    api: Arc<dyn EventsApi>,
    directory: Arc<Directory>,
    subscriptions: Arc<SubscriptionSync>,
    updates: UpdateFeed,
    editor: Editor,
    user: OnceCell<CurrentUser>,
}

impl EventBoard {
    pub fn new(api: Arc<dyn EventsApi>) -> Self {
        let subscriptions = Arc::new(SubscriptionSync::new(api.clone()));
        let directory =
            Arc::new(Directory::new(api.clone()).with_observer(subscriptions.clone()));

        Self {
            updates: UpdateFeed::new(api.clone()),
            editor: Editor::new(api.clone(), directory.clone()),
            api,
            directory,
            subscriptions,
            user: OnceCell::new(),
        }
    }

    /// Build a board talking HTTP to the session's API.
    pub fn connect(session: &Session) -> SyncResult<Self> {
        let api = HttpApi::new(session)?;
        Ok(Self::new(Arc::new(api)))
    }

    pub fn directory(&self) -> &Directory {
        &self.directory
    }

    pub fn subscriptions(&self) -> &SubscriptionSync {
        &self.subscriptions
    }

    pub fn updates(&self) -> &UpdateFeed {
        &self.updates
    }

    /// The authenticated user, fetched once and then cached. Also sets the
    /// owner of the "mine" view.
    pub async fn current_user(&self) -> SyncResult<CurrentUser> {
        let user = self
            .user
            .get_or_try_init(|| async {
                let user = self.api.current_user().await?;
                debug!(user_id = %user.id, username = %user.username, "Resolved current user");
                self.directory.set_owner(user.id.clone()).await;
                Ok::<_, SyncError>(user)
            })
            .await?;
        Ok(user.clone())
    }

    /// Search events by title.
    ///
    /// Returns `Ok(None)` if a later search overtook this one; the caller
    /// should keep showing whatever the later search produced.
    pub async fn search(&self, query: &str) -> SyncResult<Option<Vec<Event>>> {
        if self.directory.owner().await.is_none() {
            if let Err(e) = self.current_user().await {
                warn!(error = %e, "Could not resolve current user; \"mine\" view stays empty");
            }
        }

        match self.directory.list(query).await {
            Ok(events) => Ok(Some(events)),
            Err(e) if e.is_stale() => Ok(None),
            Err(e) => Err(e),
        }
    }

    /// Events in the current listing created by the current user.
    pub async fn mine(&self) -> Vec<Event> {
        self.directory.mine().await
    }

    /// Resolve statuses for arbitrary events, outside of any listing.
    pub async fn statuses(&self, ids: &[EventId]) -> SyncResult<SubscriptionMap> {
        self.subscriptions.resolve_statuses(ids).await
    }

    /// Flip the subscription of an event in the current listing.
    pub async fn toggle(&self, event_id: &EventId) -> SyncResult<bool> {
        self.require_listed(event_id).await?;
        let current = self.subscriptions.status(event_id);
        self.subscriptions.toggle(event_id, current).await
    }

    /// Bring the subscription of a listed event to `subscribed`, toggling
    /// only if it differs.
    pub async fn set_subscribed(&self, event_id: &EventId, subscribed: bool) -> SyncResult<bool> {
        self.require_listed(event_id).await?;
        let current = self.subscriptions.status(event_id);
        if current == subscribed {
            return Ok(current);
        }
        self.subscriptions.toggle(event_id, current).await
    }

    pub async fn create(&self, new_event: NewEvent) -> SyncResult<Event> {
        self.directory.create(new_event).await
    }

    /// Delete an event and drop its subscription state.
    pub async fn delete(&self, event_id: &EventId) -> SyncResult<()> {
        self.directory.delete(event_id).await?;
        self.subscriptions.forget(event_id);
        Ok(())
    }

    /// Open a draft for a listed event.
    pub async fn begin_edit(&self, event_id: &EventId) -> SyncResult<EditDraft> {
        let event = self.require_listed(event_id).await?;
        Ok(self.editor.begin_edit(&event))
    }

    pub async fn commit(&self, draft: EditDraft) -> Result<Event, CommitError> {
        self.editor.commit(draft).await
    }

    pub async fn fetch_updates(&self) -> SyncResult<UpdatesOutcome> {
        self.updates.fetch_updates().await
    }

    async fn require_listed(&self, event_id: &EventId) -> SyncResult<Event> {
        self.directory
            .find(event_id)
            .await
            .ok_or_else(|| SyncError::UnknownEvent(event_id.clone()))
    }
}
