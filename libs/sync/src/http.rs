//! HTTP implementation of [`EventsApi`].

use std::future::Future;
use std::time::Duration;

use async_trait::async_trait;
use eventboard_id::EventId;
use eventboard_model::{
    CreateEventForm, CurrentUser, Event, EventPatch, StatusRequest, SubscriptionStatus,
    UpdatesResponse,
};
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, AUTHORIZATION};
use reqwest::multipart::{Form, Part};
use reqwest::{RequestBuilder, Response, StatusCode};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use tracing::{debug, warn};

use crate::{EventsApi, Session, SyncError, SyncResult};

/// API client for the eventboard backend.
#[derive(Debug, Clone)]
pub struct HttpApi {
    client: reqwest::Client,
    base_url: String,
    timeout: Duration,
}

impl HttpApi {
    /// Create a client from a session.
    pub fn new(session: &Session) -> SyncResult<Self> {
        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));

        if let Some(bearer) = session.bearer() {
            let value = HeaderValue::from_str(&bearer).map_err(|_| SyncError::InvalidToken)?;
            headers.insert(AUTHORIZATION, value);
        }

        let client = reqwest::Client::builder()
            .user_agent(concat!("eventboard/", env!("CARGO_PKG_VERSION")))
            .default_headers(headers)
            .build()?;

        Ok(Self {
            client,
            base_url: session.api_url().to_string(),
            timeout: session.request_timeout(),
        })
    }

    /// Build a URL for an endpoint.
    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// Run a whole request (send and body read) under the session timeout.
    async fn bounded<T, F>(&self, operation: &'static str, call: F) -> SyncResult<T>
    where
        F: Future<Output = SyncResult<T>>,
    {
        debug!(operation, "Sending request");
        match tokio::time::timeout(self.timeout, call).await {
            Ok(result) => result,
            Err(_) => {
                warn!(operation, timeout = ?self.timeout, "Request timed out");
                Err(SyncError::Timeout {
                    operation,
                    timeout: self.timeout,
                })
            }
        }
    }

    /// Send a request, turning non-success statuses into errors.
    async fn send(&self, request: RequestBuilder) -> SyncResult<Response> {
        let response = request.send().await?;

        if response.status().is_success() {
            Ok(response)
        } else {
            Err(error_from_response(response).await)
        }
    }

    async fn send_json<T: DeserializeOwned>(&self, request: RequestBuilder) -> SyncResult<T> {
        let response = self.send(request).await?;
        Ok(response.json().await?)
    }
}

/// Error body the backend sends alongside non-2xx statuses.
#[derive(Debug, Deserialize)]
struct ApiErrorResponse {
    #[serde(default)]
    message: Option<String>,
}

async fn error_from_response(response: Response) -> SyncError {
    let status = response.status();

    if status == StatusCode::UNAUTHORIZED {
        return SyncError::NotAuthenticated;
    }

    let body = response.text().await.unwrap_or_default();
    let message = serde_json::from_str::<ApiErrorResponse>(&body)
        .ok()
        .and_then(|parsed| parsed.message)
        .unwrap_or_else(|| {
            if body.is_empty() {
                status
                    .canonical_reason()
                    .unwrap_or("Unknown error")
                    .to_string()
            } else {
                body
            }
        });

    warn!(status = status.as_u16(), message = %message, "API request failed");
    SyncError::api(status.as_u16(), message)
}

#[async_trait]
impl EventsApi for HttpApi {
    async fn current_user(&self) -> SyncResult<CurrentUser> {
        self.bounded("current_user", async {
            self.send_json(self.client.get(self.url("/auth/me"))).await
        })
        .await
    }

    async fn list_events(&self, title: &str) -> SyncResult<Vec<Event>> {
        self.bounded("list_events", async {
            let request = self
                .client
                .get(self.url("/events"))
                .query(&[("title", title)]);
            self.send_json(request).await
        })
        .await
    }

    async fn create_event(&self, form: &CreateEventForm) -> SyncResult<Event> {
        self.bounded("create_event", async {
            let mut image = Part::bytes(form.image.bytes.clone())
                .file_name(form.image.file_name.clone());
            if let Some(media_type) = form.image.media_type.as_deref() {
                image = image.mime_str(media_type)?;
            }

            let multipart = Form::new()
                .text("title", form.title.clone())
                .text("description", form.description.clone())
                .text("date", form.date_field())
                .part("image", image);

            let request = self.client.post(self.url("/events")).multipart(multipart);
            self.send_json(request).await
        })
        .await
    }

    async fn update_event(&self, id: &EventId, patch: &EventPatch) -> SyncResult<Event> {
        self.bounded("update_event", async {
            let request = self
                .client
                .put(self.url(&format!("/events/{id}")))
                .json(patch);
            self.send_json(request).await
        })
        .await
    }

    async fn delete_event(&self, id: &EventId) -> SyncResult<()> {
        self.bounded("delete_event", async {
            self.send(self.client.delete(self.url(&format!("/events/{id}"))))
                .await
                .map(|_| ())
        })
        .await
    }

    async fn subscription_statuses(&self, ids: &[EventId]) -> SyncResult<Vec<SubscriptionStatus>> {
        self.bounded("subscription_statuses", async {
            let body = StatusRequest {
                event_ids: ids.to_vec(),
            };
            let request = self
                .client
                .post(self.url("/subscriptions/status"))
                .json(&body);
            self.send_json(request).await
        })
        .await
    }

    async fn subscribe(&self, id: &EventId) -> SyncResult<()> {
        self.bounded("subscribe", async {
            self.send(self.client.post(self.url(&format!("/subscriptions/{id}"))))
                .await
                .map(|_| ())
        })
        .await
    }

    async fn unsubscribe(&self, id: &EventId) -> SyncResult<()> {
        self.bounded("unsubscribe", async {
            self.send(self.client.delete(self.url(&format!("/subscriptions/{id}"))))
                .await
                .map(|_| ())
        })
        .await
    }

    async fn check_updates(&self) -> SyncResult<UpdatesResponse> {
        self.bounded("check_updates", async {
            let response = self
                .send(self.client.get(self.url("/subscriptions/check-logs")))
                .await?;
            let body = response.bytes().await?;
            Ok(UpdatesResponse::from_slice(&body)?)
        })
        .await
    }
}
