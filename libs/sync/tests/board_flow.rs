//! End-to-end flows through `EventBoard` over HTTP.

mod common;

use axum::http::Method;
use chrono::{TimeZone, Utc};
use common::{FakeBackend, TOKEN};
use eventboard_sync::model::{ImageUpload, NewEvent};
use eventboard_sync::{
    EventBoard, EventId, FailureKind, Prominence, Session, UpdatesOutcome, HIGHLIGHT_COUNT,
};
use serde_json::json;

fn id(s: &str) -> EventId {
    EventId::parse(s).unwrap()
}

async fn connect() -> (FakeBackend, EventBoard) {
    let backend = FakeBackend::start().await;
    let session = Session::new(&backend.base_url).with_token(TOKEN);
    let board = EventBoard::connect(&session).unwrap();
    (backend, board)
}

#[tokio::test]
async fn search_returns_matching_titles_in_order() {
    let (_backend, board) = connect().await;

    let events = board.search("alpha").await.unwrap().unwrap();
    let titles: Vec<&str> = events.iter().map(|e| e.title.as_str()).collect();
    assert_eq!(titles, vec!["Alpha Con", "Alpha Day"]);
}

#[tokio::test]
async fn listing_resolves_statuses_for_exactly_its_ids() {
    let (backend, board) = connect().await;

    board.search("").await.unwrap();
    let statuses = board.subscriptions().snapshot();

    let keys: Vec<&str> = statuses.keys().map(EventId::as_str).collect();
    assert_eq!(keys, vec!["e1", "e2", "e3"]);
    assert_eq!(statuses.get("e1"), Some(&true));
    assert_eq!(statuses.get("e2"), Some(&false));
    assert!(!statuses.contains_key("stray"));
    assert_eq!(backend.count(Method::POST, "/subscriptions/status"), 1);
}

#[tokio::test]
async fn explicit_resolution_fills_missing_with_false() {
    let (_backend, board) = connect().await;

    let resolved = board.statuses(&[id("e1"), id("e2")]).await.unwrap();
    assert_eq!(resolved.len(), 2);
    assert_eq!(resolved.get("e1"), Some(&true));
    assert_eq!(resolved.get("e2"), Some(&false));
}

#[tokio::test]
async fn toggle_subscribes_then_unsubscribes() {
    let (backend, board) = connect().await;
    board.search("").await.unwrap();

    let status = board.subscriptions().toggle(&id("e2"), false).await.unwrap();
    assert!(status);
    assert!(board.subscriptions().status(&id("e2")));
    assert!(backend.is_subscribed("e2"));

    let status = board.subscriptions().toggle(&id("e2"), true).await.unwrap();
    assert!(!status);
    assert!(!backend.is_subscribed("e2"));
    assert_eq!(backend.count(Method::POST, "/subscriptions/e2"), 1);
    assert_eq!(backend.count(Method::DELETE, "/subscriptions/e2"), 1);
}

#[tokio::test]
async fn first_three_update_groups_are_highlighted() {
    let (backend, board) = connect().await;
    let groups: Vec<_> = (1..=5)
        .map(|n| {
            json!({
                "eventId": format!("e{n}"),
                "eventTitle": format!("Event {n}"),
                "updates": [{
                    "changes": ["date changed"],
                    "updatedBy": "grace",
                    "at": "2025-05-01T10:00:00.000Z"
                }]
            })
        })
        .collect();
    backend.set_check_logs(json!(groups));

    let UpdatesOutcome::Updates { groups } = board.fetch_updates().await.unwrap() else {
        panic!("expected updates");
    };
    let ranked: Vec<(&str, Prominence)> = groups
        .iter()
        .map(|g| (g.group.event_title.as_str(), g.prominence))
        .collect();
    assert_eq!(
        ranked,
        vec![
            ("Event 1", Prominence::Highlighted),
            ("Event 2", Prominence::Highlighted),
            ("Event 3", Prominence::Highlighted),
            ("Event 4", Prominence::Older),
            ("Event 5", Prominence::Older),
        ]
    );
    assert_eq!(
        groups.iter().filter(|g| g.is_highlighted()).count(),
        HIGHLIGHT_COUNT
    );
}

#[tokio::test]
async fn no_updates_sentinel_is_not_a_group() {
    let (_backend, board) = connect().await;

    let outcome = board.fetch_updates().await.unwrap();
    assert_eq!(
        outcome,
        UpdatesOutcome::NoUpdates {
            message: "No updates".to_string()
        }
    );
    assert_eq!(board.updates().latest(), Some(outcome));
}

#[tokio::test]
async fn mine_is_filtered_locally() {
    let (backend, board) = connect().await;
    board.search("").await.unwrap();
    let list_calls = backend.count(Method::GET, "/events");

    let mine: Vec<String> = board.mine().await.into_iter().map(|e| e.title).collect();
    assert_eq!(mine, vec!["Alpha Con".to_string(), "Alpha Day".to_string()]);

    let theirs = board.directory().filter_by_owner(&"u2".parse().unwrap()).await;
    assert_eq!(theirs.len(), 1);
    assert_eq!(backend.count(Method::GET, "/events"), list_calls);
}

#[tokio::test]
async fn create_then_edit_then_delete() {
    let (backend, board) = connect().await;
    board.search("gamma").await.unwrap();

    let created = board
        .create(NewEvent {
            title: "Gamma Night".to_string(),
            description: "Late".to_string(),
            image: Some(ImageUpload {
                file_name: "gamma.png".to_string(),
                bytes: vec![1, 2, 3],
                media_type: Some("image/png".to_string()),
            }),
            date: Some(Utc.with_ymd_and_hms(2025, 6, 1, 18, 30, 0).unwrap()),
        })
        .await
        .unwrap();
    assert_eq!(board.directory().all().await, vec![created.clone()]);

    let mut draft = board.begin_edit(&created.id).await.unwrap();
    draft.title = "Gamma Night Live".to_string();
    board.commit(draft).await.unwrap();
    assert_eq!(backend.patches(), vec![json!({ "title": "Gamma Night Live" })]);
    assert_eq!(
        board.directory().find(&created.id).await.unwrap().title,
        "Gamma Night Live"
    );

    board.delete(&created.id).await.unwrap();
    assert!(board.directory().all().await.is_empty());
}

#[tokio::test]
async fn incomplete_event_is_never_sent() {
    let (backend, board) = connect().await;

    let err = board
        .create(NewEvent {
            title: "Gamma".to_string(),
            ..Default::default()
        })
        .await
        .unwrap_err();
    assert_eq!(err.kind(), FailureKind::Validation);
    assert_eq!(err.to_string(), "description is required");
    assert_eq!(backend.count(Method::POST, "/events"), 0);
}

#[tokio::test]
async fn failed_edit_keeps_draft_and_listing() {
    let (backend, board) = connect().await;
    board.search("").await.unwrap();

    // Another client deleted the event after it was listed.
    let mut draft = board.begin_edit(&id("e2")).await.unwrap();
    let other = Session::new(&backend.base_url).with_token(TOKEN);
    EventBoard::connect(&other)
        .unwrap()
        .directory()
        .delete(&id("e2"))
        .await
        .unwrap();

    draft.title = "Beta Fair II".to_string();
    let err = board.commit(draft).await.unwrap_err();
    assert_eq!(err.kind(), FailureKind::Transport);
    assert_eq!(err.draft.title, "Beta Fair II");
    assert_eq!(
        board.directory().find(&id("e2")).await.unwrap().title,
        "Beta Fair"
    );
}
