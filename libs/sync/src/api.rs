//! The API seam every component talks through.

use async_trait::async_trait;
use eventboard_id::EventId;
use eventboard_model::{
    CreateEventForm, CurrentUser, Event, EventPatch, SubscriptionStatus, UpdatesResponse,
};

use crate::SyncResult;

/// Endpoints consumed by the eventboard components.
///
/// [`HttpApi`](crate::HttpApi) is the production implementation;
/// [`MockApi`](crate::mock::MockApi) keeps everything in memory for tests.
#[async_trait]
pub trait EventsApi: Send + Sync {
    /// `GET /auth/me`
    async fn current_user(&self) -> SyncResult<CurrentUser>;

    /// `GET /events?title=`
    async fn list_events(&self, title: &str) -> SyncResult<Vec<Event>>;

    /// `POST /events` (multipart)
    async fn create_event(&self, form: &CreateEventForm) -> SyncResult<Event>;

    /// `PUT /events/:id`
    async fn update_event(&self, id: &EventId, patch: &EventPatch) -> SyncResult<Event>;

    /// `DELETE /events/:id`
    async fn delete_event(&self, id: &EventId) -> SyncResult<()>;

    /// `POST /subscriptions/status`
    async fn subscription_statuses(&self, ids: &[EventId]) -> SyncResult<Vec<SubscriptionStatus>>;

    /// `POST /subscriptions/:eventId`
    async fn subscribe(&self, id: &EventId) -> SyncResult<()>;

    /// `DELETE /subscriptions/:eventId`
    async fn unsubscribe(&self, id: &EventId) -> SyncResult<()>;

    /// `GET /subscriptions/check-logs`
    async fn check_updates(&self) -> SyncResult<UpdatesResponse>;
}
