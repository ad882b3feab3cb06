//! In-memory [`EventsApi`] for tests and offline development.

use std::collections::{BTreeSet, HashMap, HashSet};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use async_trait::async_trait;
use eventboard_id::{EventId, UserId};
use eventboard_model::{
    CreateEventForm, Creator, CurrentUser, Event, EventPatch, Role, SubscriptionStatus,
    UpdatesResponse,
};
use tracing::{debug, info};

use crate::{EventsApi, SyncError, SyncResult};

/// An endpoint of the mock, used to inject failures and delays.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operation {
    CurrentUser,
    ListEvents,
    CreateEvent,
    UpdateEvent,
    DeleteEvent,
    SubscriptionStatuses,
    Subscribe,
    Unsubscribe,
    CheckUpdates,
}

/// A call received by the mock, in arrival order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ApiCall {
    CurrentUser,
    ListEvents(String),
    CreateEvent(String),
    UpdateEvent(EventId, EventPatch),
    DeleteEvent(EventId),
    SubscriptionStatuses(Vec<EventId>),
    Subscribe(EventId),
    Unsubscribe(EventId),
    CheckUpdates,
}

impl ApiCall {
    fn operation(&self) -> Operation {
        match self {
            ApiCall::CurrentUser => Operation::CurrentUser,
            ApiCall::ListEvents(_) => Operation::ListEvents,
            ApiCall::CreateEvent(_) => Operation::CreateEvent,
            ApiCall::UpdateEvent(..) => Operation::UpdateEvent,
            ApiCall::DeleteEvent(_) => Operation::DeleteEvent,
            ApiCall::SubscriptionStatuses(_) => Operation::SubscriptionStatuses,
            ApiCall::Subscribe(_) => Operation::Subscribe,
            ApiCall::Unsubscribe(_) => Operation::Unsubscribe,
            ApiCall::CheckUpdates => Operation::CheckUpdates,
        }
    }
}

struct MockState {
    user: CurrentUser,
    events: Vec<Event>,
    subscribed: BTreeSet<EventId>,
    updates: UpdatesResponse,
    failing: HashSet<Operation>,
    delays: HashMap<Operation, Duration>,
    listing_delays: HashMap<String, Duration>,
    ignore_title_filter: bool,
    calls: Vec<ApiCall>,
}

/// Mock backend that keeps events and subscriptions in memory.
pub struct MockApi {
    id_counter: AtomicU64,
    state: Mutex<MockState>,
}

impl MockApi {
    /// Create an empty backend authenticated as `u1` ("ada", admin).
    pub fn new() -> Self {
        Self {
            id_counter: AtomicU64::new(0),
            state: Mutex::new(MockState {
                user: CurrentUser {
                    id: UserId::parse("u1").expect("u1 is a valid user id"),
                    username: "ada".to_string(),
                    role: Role::Admin,
                },
                events: Vec::new(),
                subscribed: BTreeSet::new(),
                updates: UpdatesResponse::NoUpdates {
                    message: "No updates".to_string(),
                },
                failing: HashSet::new(),
                delays: HashMap::new(),
                listing_delays: HashMap::new(),
                ignore_title_filter: false,
                calls: Vec::new(),
            }),
        }
    }

    fn state(&self) -> MutexGuard<'_, MockState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Add an event, returning it.
    ///
    /// # Panics
    ///
    /// Panics if `id` or `owner` is not a valid ID.
    pub fn add_event(&self, id: &str, title: &str, owner: Option<&str>) -> Event {
        let event = Event {
            id: EventId::parse(id).unwrap_or_else(|e| panic!("invalid mock event id: {e}")),
            title: title.to_string(),
            description: format!("About {title}"),
            image: Some(format!("/uploads/{id}.png")),
            date: None,
            created_by: owner.map(|owner| Creator {
                id: UserId::parse(owner).unwrap_or_else(|e| panic!("invalid mock user id: {e}")),
                username: owner.to_string(),
            }),
        };
        self.state().events.push(event.clone());
        event
    }

    pub fn set_current_user(&self, user: CurrentUser) {
        self.state().user = user;
    }

    pub fn set_subscribed(&self, id: &EventId, subscribed: bool) {
        let mut state = self.state();
        if subscribed {
            state.subscribed.insert(id.clone());
        } else {
            state.subscribed.remove(id);
        }
    }

    pub fn is_subscribed(&self, id: &EventId) -> bool {
        self.state().subscribed.contains(id)
    }

    pub fn set_updates(&self, updates: UpdatesResponse) {
        self.state().updates = updates;
    }

    /// Stored events, in insertion order.
    pub fn events(&self) -> Vec<Event> {
        self.state().events.clone()
    }

    /// Make every call to `operation` fail until [`MockApi::recover`].
    pub fn fail(&self, operation: Operation) {
        self.state().failing.insert(operation);
    }

    pub fn recover(&self, operation: Operation) {
        self.state().failing.remove(&operation);
    }

    /// Hold every call to `operation` for `delay` before answering.
    pub fn delay(&self, operation: Operation, delay: Duration) {
        self.state().delays.insert(operation, delay);
    }

    /// Hold listings for exactly `title` for `delay`, on top of any
    /// per-operation delay.
    pub fn delay_listing(&self, title: &str, delay: Duration) {
        self.state().listing_delays.insert(title.to_string(), delay);
    }

    /// Return every event from `list_events`, regardless of the query.
    pub fn ignore_title_filter(&self) {
        self.state().ignore_title_filter = true;
    }

    /// Calls received so far.
    pub fn calls(&self) -> Vec<ApiCall> {
        self.state().calls.clone()
    }

    /// Record a call, then fail or wait as configured.
    async fn enter(&self, call: ApiCall) -> SyncResult<()> {
        let operation = call.operation();
        let (failing, delay) = {
            let mut state = self.state();
            let listing_delay = match &call {
                ApiCall::ListEvents(title) => state.listing_delays.get(title).copied(),
                _ => None,
            };
            let delay = state
                .delays
                .get(&operation)
                .copied()
                .into_iter()
                .chain(listing_delay)
                .sum::<Duration>();
            debug!(?call, "[MOCK] Call received");
            state.calls.push(call);
            (state.failing.contains(&operation), delay)
        };

        if !delay.is_zero() {
            tokio::time::sleep(delay).await;
        }

        if failing {
            return Err(SyncError::api(503, format!("mock {operation:?} failure")));
        }
        Ok(())
    }

    fn next_event_id(&self) -> SyncResult<EventId> {
        let counter = self.id_counter.fetch_add(1, Ordering::SeqCst);
        Ok(EventId::parse(&format!("mock_{counter:08x}"))?)
    }
}

impl Default for MockApi {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl EventsApi for MockApi {
    async fn current_user(&self) -> SyncResult<CurrentUser> {
        self.enter(ApiCall::CurrentUser).await?;
        Ok(self.state().user.clone())
    }

    async fn list_events(&self, title: &str) -> SyncResult<Vec<Event>> {
        self.enter(ApiCall::ListEvents(title.to_string())).await?;
        let state = self.state();
        Ok(state
            .events
            .iter()
            .filter(|event| state.ignore_title_filter || event.title_matches(title))
            .cloned()
            .collect())
    }

    async fn create_event(&self, form: &CreateEventForm) -> SyncResult<Event> {
        self.enter(ApiCall::CreateEvent(form.title.clone())).await?;
        let id = self.next_event_id()?;

        let mut state = self.state();
        let event = Event {
            image: Some(format!("/uploads/{}", form.image.file_name)),
            title: form.title.clone(),
            description: form.description.clone(),
            date: Some(form.date),
            created_by: Some(Creator {
                id: state.user.id.clone(),
                username: state.user.username.clone(),
            }),
            id,
        };
        info!(event_id = %event.id, "[MOCK] Event created");
        state.events.push(event.clone());
        Ok(event)
    }

    async fn update_event(&self, id: &EventId, patch: &EventPatch) -> SyncResult<Event> {
        self.enter(ApiCall::UpdateEvent(id.clone(), patch.clone()))
            .await?;

        let mut state = self.state();
        let event = state
            .events
            .iter_mut()
            .find(|event| &event.id == id)
            .ok_or_else(|| SyncError::api(404, "Event not found"))?;
        patch.apply_to(event);
        Ok(event.clone())
    }

    async fn delete_event(&self, id: &EventId) -> SyncResult<()> {
        self.enter(ApiCall::DeleteEvent(id.clone())).await?;

        let mut state = self.state();
        let before = state.events.len();
        state.events.retain(|event| &event.id != id);
        if state.events.len() == before {
            return Err(SyncError::api(404, "Event not found"));
        }
        state.subscribed.remove(id);
        Ok(())
    }

    async fn subscription_statuses(&self, ids: &[EventId]) -> SyncResult<Vec<SubscriptionStatus>> {
        self.enter(ApiCall::SubscriptionStatuses(ids.to_vec()))
            .await?;

        let state = self.state();
        Ok(ids
            .iter()
            .map(|id| SubscriptionStatus {
                event_id: id.clone(),
                is_subscribed: state.subscribed.contains(id),
            })
            .collect())
    }

    async fn subscribe(&self, id: &EventId) -> SyncResult<()> {
        self.enter(ApiCall::Subscribe(id.clone())).await?;
        self.state().subscribed.insert(id.clone());
        Ok(())
    }

    async fn unsubscribe(&self, id: &EventId) -> SyncResult<()> {
        self.enter(ApiCall::Unsubscribe(id.clone())).await?;
        self.state().subscribed.remove(id);
        Ok(())
    }

    async fn check_updates(&self) -> SyncResult<UpdatesResponse> {
        self.enter(ApiCall::CheckUpdates).await?;
        Ok(self.state().updates.clone())
    }
}
