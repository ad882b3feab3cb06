//! Events, their creators, the current user, and create/update payloads.

use chrono::{DateTime, SecondsFormat, Utc};
use eventboard_id::{EventId, UserId};
use serde::{Deserialize, Serialize};

use crate::ModelError;

/// The user who created an event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Creator {
    #[serde(alias = "_id")]
    pub id: UserId,

    /// Display name.
    pub username: String,
}

/// An event as returned by `GET /events`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Event {
    #[serde(alias = "_id")]
    pub id: EventId,

    pub title: String,

    pub description: String,

    /// Image URL, set at creation and never changed by the client.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date: Option<DateTime<Utc>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_by: Option<Creator>,
}

impl Event {
    /// Returns true if `query` is a case-insensitive substring of the title.
    ///
    /// The empty query matches every event.
    pub fn title_matches(&self, query: &str) -> bool {
        title_matches(&self.title, query)
    }

    /// Returns true if the event was created by `user_id`.
    pub fn is_owned_by(&self, user_id: &UserId) -> bool {
        self.created_by
            .as_ref()
            .is_some_and(|creator| &creator.id == user_id)
    }
}

/// Case-insensitive substring match used for title search.
pub fn title_matches(title: &str, query: &str) -> bool {
    if query.is_empty() {
        return true;
    }
    title.to_lowercase().contains(&query.to_lowercase())
}

/// Role of the authenticated user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Role {
    Admin,
    User,
    /// A role this client does not know about, kept verbatim.
    Other(String),
}

impl From<String> for Role {
    fn from(s: String) -> Self {
        match s.as_str() {
            "admin" => Role::Admin,
            "user" => Role::User,
            _ => Role::Other(s),
        }
    }
}

impl From<Role> for String {
    fn from(role: Role) -> Self {
        role.to_string()
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Role::Admin => write!(f, "admin"),
            Role::User => write!(f, "user"),
            Role::Other(s) => write!(f, "{}", s),
        }
    }
}

/// Response of `GET /auth/me`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CurrentUser {
    #[serde(alias = "_id")]
    pub id: UserId,

    pub username: String,

    pub role: Role,
}

/// Image file attached to a new event.
#[derive(Clone, PartialEq, Eq)]
pub struct ImageUpload {
    pub file_name: String,
    pub bytes: Vec<u8>,
    /// MIME type, e.g. `image/png`. Left to the server to sniff when unset.
    pub media_type: Option<String>,
}

impl std::fmt::Debug for ImageUpload {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ImageUpload")
            .field("file_name", &self.file_name)
            .field("len", &self.bytes.len())
            .field("media_type", &self.media_type)
            .finish()
    }
}

/// An event being filled in before creation.
///
/// Every field is optional while the user is still typing; [`NewEvent::validate`]
/// turns it into a [`CreateEventForm`] once all required fields are present.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NewEvent {
    pub title: String,
    pub description: String,
    pub image: Option<ImageUpload>,
    pub date: Option<DateTime<Utc>>,
}

impl NewEvent {
    /// Check required fields, in form order.
    pub fn validate(self) -> Result<CreateEventForm, ModelError> {
        if self.title.trim().is_empty() {
            return Err(ModelError::MissingField { field: "title" });
        }
        if self.description.trim().is_empty() {
            return Err(ModelError::MissingField {
                field: "description",
            });
        }
        let Some(image) = self.image else {
            return Err(ModelError::MissingField { field: "image" });
        };
        let Some(date) = self.date else {
            return Err(ModelError::MissingField { field: "date" });
        };

        Ok(CreateEventForm {
            title: self.title,
            description: self.description,
            image,
            date,
        })
    }
}

/// A validated `POST /events` payload, sent as multipart form data.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreateEventForm {
    pub title: String,
    pub description: String,
    pub image: ImageUpload,
    pub date: DateTime<Utc>,
}

impl CreateEventForm {
    /// The `date` form field: ISO 8601 in UTC with millisecond precision.
    pub fn date_field(&self) -> String {
        self.date.to_rfc3339_opts(SecondsFormat::Millis, true)
    }
}

/// Partial update for `PUT /events/:id`.
///
/// Only title, description and date are mutable; image and creator are not
/// representable here. Fields left as `None` are not sent.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventPatch {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date: Option<DateTime<Utc>>,
}

impl EventPatch {
    /// Returns true if the patch changes nothing.
    pub fn is_empty(&self) -> bool {
        self.title.is_none() && self.description.is_none() && self.date.is_none()
    }

    /// Title and description may be changed but never blanked.
    pub fn validate(&self) -> Result<(), ModelError> {
        if self.title.as_deref().is_some_and(|t| t.trim().is_empty()) {
            return Err(ModelError::MissingField { field: "title" });
        }
        if self
            .description
            .as_deref()
            .is_some_and(|d| d.trim().is_empty())
        {
            return Err(ModelError::MissingField {
                field: "description",
            });
        }
        Ok(())
    }

    /// Apply the patch to a local copy of an event.
    pub fn apply_to(&self, event: &mut Event) {
        if let Some(title) = &self.title {
            event.title = title.clone();
        }
        if let Some(description) = &self.description {
            event.description = description.clone();
        }
        if let Some(date) = self.date {
            event.date = Some(date);
        }
    }
}
