//! Fake eventboard backend for integration tests.
//!
//! Serves the eventboard REST API from memory on an ephemeral port and
//! records every request it sees.

#![allow(dead_code)]

use std::collections::{BTreeSet, HashMap};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use axum::extract::{Multipart, Path, Query, Request, State};
use axum::http::{Method, StatusCode};
use axum::middleware::{self, Next};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post, put};
use axum::{Json, Router};
use chrono::{DateTime, Utc};
use eventboard_sync::model::{Creator, Event, EventPatch, StatusRequest, SubscriptionStatus};
use eventboard_sync::{EventId, UserId};
use serde_json::{json, Value};
use tokio::net::TcpListener;

pub const TOKEN: &str = "test-token";

/// A request as the fake backend received it.
#[derive(Debug, Clone)]
pub struct Recorded {
    pub method: Method,
    pub path: String,
    pub query: Option<String>,
    pub authorization: Option<String>,
}

/// A multipart upload to `POST /events`.
#[derive(Debug, Clone, Default)]
pub struct Upload {
    pub fields: HashMap<String, String>,
    pub image_name: Option<String>,
    pub image_len: usize,
}

#[derive(Default)]
struct FakeState {
    events: Vec<Event>,
    subscribed: BTreeSet<EventId>,
    check_logs: Value,
    requests: Vec<Recorded>,
    uploads: Vec<Upload>,
    patches: Vec<Value>,
    next_id: u64,
    delay: Option<Duration>,
}

#[derive(Clone)]
pub struct FakeBackend {
    pub base_url: String,
    state: Arc<Mutex<FakeState>>,
}

pub fn event(id: &str, title: &str, owner: &str) -> Event {
    Event {
        id: EventId::parse(id).unwrap(),
        title: title.to_string(),
        description: format!("About {title}"),
        image: Some(format!("/uploads/{id}.png")),
        date: None,
        created_by: Some(Creator {
            id: UserId::parse(owner).unwrap(),
            username: owner.to_string(),
        }),
    }
}

impl FakeBackend {
    /// Start a backend seeded with "Alpha Con" (u1), "Beta Fair" (u2) and
    /// "Alpha Day" (u1); the current user `u1` is subscribed to `e1`.
    pub async fn start() -> Self {
        let state = Arc::new(Mutex::new(FakeState {
            events: vec![
                event("e1", "Alpha Con", "u1"),
                event("e2", "Beta Fair", "u2"),
                event("e3", "Alpha Day", "u1"),
            ],
            subscribed: [EventId::parse("e1").unwrap()].into_iter().collect(),
            check_logs: json!(["No updates"]),
            ..Default::default()
        }));

        let app = Router::new()
            .route("/auth/me", get(me))
            .route("/events", get(list_events).post(create_event))
            .route("/events/{id}", put(update_event).delete(delete_event))
            .route("/subscriptions/status", post(statuses))
            .route("/subscriptions/check-logs", get(check_logs))
            .route("/subscriptions/{id}", post(subscribe).delete(unsubscribe))
            .layer(middleware::from_fn_with_state(state.clone(), record_and_authorize))
            .with_state(state.clone());

        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();

        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        Self {
            base_url: format!("http://{addr}"),
            state,
        }
    }

    pub fn set_check_logs(&self, body: Value) {
        self.state.lock().unwrap().check_logs = body;
    }

    /// Hold every response for `delay`.
    pub fn set_delay(&self, delay: Duration) {
        self.state.lock().unwrap().delay = Some(delay);
    }

    pub fn requests(&self) -> Vec<Recorded> {
        self.state.lock().unwrap().requests.clone()
    }

    pub fn uploads(&self) -> Vec<Upload> {
        self.state.lock().unwrap().uploads.clone()
    }

    /// JSON bodies received by `PUT /events/{id}`.
    pub fn patches(&self) -> Vec<Value> {
        self.state.lock().unwrap().patches.clone()
    }

    pub fn is_subscribed(&self, id: &str) -> bool {
        self.state
            .lock()
            .unwrap()
            .subscribed
            .contains(&EventId::parse(id).unwrap())
    }

    pub fn count(&self, method: Method, path: &str) -> usize {
        self.requests()
            .iter()
            .filter(|r| r.method == method && r.path == path)
            .count()
    }
}

type Shared = Arc<Mutex<FakeState>>;

fn message(status: StatusCode, text: &str) -> Response {
    (status, Json(json!({ "message": text }))).into_response()
}

async fn record_and_authorize(State(state): State<Shared>, request: Request, next: Next) -> Response {
    let authorization = request
        .headers()
        .get("authorization")
        .and_then(|v| v.to_str().ok())
        .map(str::to_string);
    let delay = {
        let mut state = state.lock().unwrap();
        state.requests.push(Recorded {
            method: request.method().clone(),
            path: request.uri().path().to_string(),
            query: request.uri().query().map(str::to_string),
            authorization: authorization.clone(),
        });
        state.delay
    };

    if let Some(delay) = delay {
        tokio::time::sleep(delay).await;
    }

    let expected = format!("Bearer {TOKEN}");
    if authorization.as_deref() != Some(expected.as_str()) {
        return message(StatusCode::UNAUTHORIZED, "Unauthorized");
    }

    next.run(request).await
}

async fn me() -> Json<Value> {
    Json(json!({ "_id": "u1", "username": "ada", "role": "admin" }))
}

async fn list_events(
    State(state): State<Shared>,
    Query(params): Query<HashMap<String, String>>,
) -> Json<Vec<Event>> {
    let title = params.get("title").cloned().unwrap_or_default();
    let state = state.lock().unwrap();
    Json(
        state
            .events
            .iter()
            .filter(|e| e.title.to_lowercase().contains(&title.to_lowercase()))
            .cloned()
            .collect(),
    )
}

async fn create_event(State(state): State<Shared>, mut multipart: Multipart) -> Response {
    let mut upload = Upload::default();
    while let Ok(Some(field)) = multipart.next_field().await {
        let name = field.name().unwrap_or_default().to_string();
        if name == "image" {
            upload.image_name = field.file_name().map(str::to_string);
            upload.image_len = field.bytes().await.map(|b| b.len()).unwrap_or(0);
        } else {
            let text = field.text().await.unwrap_or_default();
            upload.fields.insert(name, text);
        }
    }

    let date = upload
        .fields
        .get("date")
        .and_then(|d| d.parse::<DateTime<Utc>>().ok());

    let mut state = state.lock().unwrap();
    state.next_id += 1;
    let id = format!("new{}", state.next_id);
    let mut created = event(
        &id,
        upload.fields.get("title").map(String::as_str).unwrap_or(""),
        "u1",
    );
    created.description = upload.fields.get("description").cloned().unwrap_or_default();
    created.date = date;
    state.events.push(created.clone());
    state.uploads.push(upload);

    (StatusCode::CREATED, Json(created)).into_response()
}

async fn update_event(
    State(state): State<Shared>,
    Path(id): Path<String>,
    Json(body): Json<Value>,
) -> Response {
    let mut state = state.lock().unwrap();
    state.patches.push(body.clone());
    let Ok(patch) = serde_json::from_value::<EventPatch>(body) else {
        return message(StatusCode::BAD_REQUEST, "Invalid body");
    };

    match state.events.iter_mut().find(|e| e.id.as_str() == id) {
        Some(event) => {
            patch.apply_to(event);
            Json(event.clone()).into_response()
        }
        None => message(StatusCode::NOT_FOUND, "Event not found"),
    }
}

async fn delete_event(State(state): State<Shared>, Path(id): Path<String>) -> Response {
    let mut state = state.lock().unwrap();
    let before = state.events.len();
    state.events.retain(|e| e.id.as_str() != id);
    if state.events.len() == before {
        return message(StatusCode::NOT_FOUND, "Event not found");
    }
    StatusCode::NO_CONTENT.into_response()
}

async fn statuses(
    State(state): State<Shared>,
    Json(request): Json<StatusRequest>,
) -> Json<Vec<SubscriptionStatus>> {
    let state = state.lock().unwrap();
    let mut out: Vec<SubscriptionStatus> = request
        .event_ids
        .iter()
        // Only subscribed ids are reported; the client fills in the rest.
        .filter(|id| state.subscribed.contains(*id))
        .map(|id| SubscriptionStatus {
            event_id: id.clone(),
            is_subscribed: true,
        })
        .collect();
    // An entry nobody asked for.
    out.push(SubscriptionStatus {
        event_id: EventId::parse("stray").unwrap(),
        is_subscribed: true,
    });
    Json(out)
}

async fn subscribe(State(state): State<Shared>, Path(id): Path<String>) -> Json<Value> {
    state
        .lock()
        .unwrap()
        .subscribed
        .insert(EventId::parse(&id).unwrap());
    Json(json!({ "message": "Subscribed" }))
}

async fn unsubscribe(State(state): State<Shared>, Path(id): Path<String>) -> Json<Value> {
    state
        .lock()
        .unwrap()
        .subscribed
        .remove(&EventId::parse(&id).unwrap());
    Json(json!({ "message": "Unsubscribed" }))
}

async fn check_logs(State(state): State<Shared>) -> Json<Value> {
    Json(state.lock().unwrap().check_logs.clone())
}
