use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::calendar::{Category, Event, EventStatus};

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("HTTP request failed: {0}")]
    HttpError(#[from] reqwest::Error),
    #[error("Request error: {0}")]
    RequestError(String),
    #[error("Not found: {0}")]
    NotFound(String),
    #[error("Row already exists")]
    Conflict,
    #[error("Rate limit exceeded")]
    RateLimited,
    #[error("Authentication failed")]
    AuthenticationFailed,
    #[error("Parse error: {0}")]
    ParseError(String),
}

#[derive(Debug, Serialize, Deserialize)]
struct EventRow {
    id: Option<String>,
    title: Option<String>,
    description: Option<String>,
    organizer: Option<String>,
    location: Option<String>,
    start_time: Option<String>,
    end_time: Option<String>,
    status: Option<String>,
    event_type_id: Option<String>,
    source_url: Option<String>,
    livestream_url: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
struct CategoryRow {
    id: Option<String>,
    name: Option<String>,
    color: Option<String>,
}

/// One row of the per-user tracking table. `id` is generated client-side so
/// retried inserts stay idempotent.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TrackedRow {
    pub id: String,
    pub user_id: String,
    pub event_id: String,
    pub status: String,
    pub created_at: DateTime<Utc>,
}

impl TrackedRow {
    pub const BOOKMARKED: &'static str = "bookmarked";
    pub const ATTENDED: &'static str = "attended";
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ProfileRow {
    pub id: String,
    pub full_name: Option<String>,
    pub timezone: Option<String>,
    pub reminder_opt_in: Option<bool>,
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait StoreApi {
    async fn fetch_events(&self) -> Result<Vec<Event>, ApiError>;

    async fn fetch_categories(&self) -> Result<Vec<Category>, ApiError>;

    async fn fetch_tracked(&self, user_id: &str) -> Result<Vec<TrackedRow>, ApiError>;

    async fn insert_tracked(&self, row: &TrackedRow) -> Result<(), ApiError>;

    async fn delete_tracked(&self, user_id: &str, event_id: &str) -> Result<(), ApiError>;

    async fn fetch_profile(&self, user_id: &str) -> Result<Option<ProfileRow>, ApiError>;

    async fn insert_profile(&self, profile: &ProfileRow) -> Result<(), ApiError>;

    async fn update_profile(&self, profile: &ProfileRow) -> Result<(), ApiError>;
}

/// PostgREST-style client for the hosted event store. Requests carry the
/// public key in `apikey` and the user's access token (when signed in) as
/// the bearer, which is what row-level security keys on.
pub struct StoreClient {
    base_url: String,
    anon_key: String,
    access_token: Option<String>,
    client: reqwest::Client,
}

impl StoreClient {
    pub fn new(base_url: String, anon_key: String) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            anon_key,
            access_token: None,
            client: reqwest::Client::new(),
        }
    }

    pub fn with_access_token(mut self, access_token: String) -> Self {
        self.access_token = Some(access_token);
        self
    }

    pub fn set_access_token(&mut self, access_token: Option<String>) {
        self.access_token = access_token;
    }

    fn rest_url(&self, table: &str) -> String {
        format!("{}/rest/v1/{}", self.base_url, table)
    }

    fn bearer(&self) -> &str {
        self.access_token.as_deref().unwrap_or(&self.anon_key)
    }

    fn authorize(&self, request: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        request
            .header("apikey", &self.anon_key)
            .bearer_auth(self.bearer())
    }

    async fn check_status(
        &self,
        response: reqwest::Response,
        subject: &str,
    ) -> Result<reqwest::Response, ApiError> {
        let status = response.status();

        if status == 401 || status == 403 {
            tracing::error!("Authentication failed for {}", subject);
            return Err(ApiError::AuthenticationFailed);
        }

        if status == 404 {
            tracing::error!("Not found: {}", subject);
            return Err(ApiError::NotFound(subject.to_string()));
        }

        if status == 409 {
            return Err(ApiError::Conflict);
        }

        if status == 429 {
            tracing::warn!("Rate limit exceeded for {}", subject);
            return Err(ApiError::RateLimited);
        }

        if !status.is_success() {
            let body = response.text().await?;
            tracing::error!("Request for {} failed. Status: {}, Body: {}", subject, status, body);
            return Err(ApiError::RequestError(format!("Status {}: {}", status, body)));
        }

        Ok(response)
    }

    fn convert_event_row(row: EventRow) -> Result<Event, ApiError> {
        let start_str = row
            .start_time
            .ok_or_else(|| ApiError::ParseError("Missing start_time".to_string()))?;
        let start_time = DateTime::parse_from_rfc3339(&start_str)
            .map_err(|e| ApiError::ParseError(format!("Invalid start_time: {}", e)))?
            .with_timezone(&Utc);

        let end_time = match row.end_time {
            Some(end_str) => Some(
                DateTime::parse_from_rfc3339(&end_str)
                    .map_err(|e| ApiError::ParseError(format!("Invalid end_time: {}", e)))?
                    .with_timezone(&Utc),
            ),
            None => None,
        };

        Ok(Event {
            id: row
                .id
                .ok_or_else(|| ApiError::ParseError("Missing event id".to_string()))?,
            title: row.title.unwrap_or_default(),
            description: row.description.unwrap_or_default(),
            organizer: row.organizer.unwrap_or_default(),
            location: row.location.unwrap_or_default(),
            start_time,
            end_time,
            status: row
                .status
                .as_deref()
                .map(EventStatus::parse)
                .unwrap_or(EventStatus::Confirmed),
            event_type_id: row.event_type_id,
            source_url: row.source_url.unwrap_or_default(),
            livestream_url: row.livestream_url,
        })
    }

    fn convert_category_row(row: CategoryRow) -> Option<Category> {
        Some(Category {
            id: row.id?,
            name: row.name.unwrap_or_default(),
            color: row.color.unwrap_or_default(),
        })
    }
}

#[async_trait]
impl StoreApi for StoreClient {
    async fn fetch_events(&self) -> Result<Vec<Event>, ApiError> {
        let url = self.rest_url("events");

        tracing::info!("Fetching event catalog");

        let response = self
            .authorize(self.client.get(&url))
            .query(&[("select", "*"), ("order", "start_time.asc")])
            .send()
            .await?;
        let response = self.check_status(response, "events").await?;

        let rows: Vec<EventRow> = response.json().await?;
        let events: Vec<Event> = rows
            .into_iter()
            .filter_map(|row| Self::convert_event_row(row).ok())
            .collect();

        tracing::info!("Fetched {} events", events.len());
        Ok(events)
    }

    async fn fetch_categories(&self) -> Result<Vec<Category>, ApiError> {
        let url = self.rest_url("event_types");

        let response = self
            .authorize(self.client.get(&url))
            .query(&[("select", "*")])
            .send()
            .await?;
        let response = self.check_status(response, "event_types").await?;

        let rows: Vec<CategoryRow> = response.json().await?;
        Ok(rows.into_iter().filter_map(Self::convert_category_row).collect())
    }

    async fn fetch_tracked(&self, user_id: &str) -> Result<Vec<TrackedRow>, ApiError> {
        let url = self.rest_url("user_events");

        let response = self
            .authorize(self.client.get(&url))
            .query(&[
                ("select", "*"),
                ("user_id", &format!("eq.{}", user_id)),
            ])
            .send()
            .await?;
        let response = self.check_status(response, "user_events").await?;

        Ok(response.json().await?)
    }

    async fn insert_tracked(&self, row: &TrackedRow) -> Result<(), ApiError> {
        let url = self.rest_url("user_events");

        tracing::info!("Tracking event {}", row.event_id);

        let response = self
            .authorize(self.client.post(&url))
            .header("Prefer", "return=minimal")
            .json(row)
            .send()
            .await?;
        self.check_status(response, "user_events").await?;

        Ok(())
    }

    async fn delete_tracked(&self, user_id: &str, event_id: &str) -> Result<(), ApiError> {
        let url = self.rest_url("user_events");

        tracing::info!("Untracking event {}", event_id);

        let response = self
            .authorize(self.client.delete(&url))
            .query(&[
                ("user_id", &format!("eq.{}", user_id)),
                ("event_id", &format!("eq.{}", event_id)),
            ])
            .send()
            .await?;
        self.check_status(response, "user_events").await?;

        Ok(())
    }

    async fn fetch_profile(&self, user_id: &str) -> Result<Option<ProfileRow>, ApiError> {
        let url = self.rest_url("profiles");

        let response = self
            .authorize(self.client.get(&url))
            .query(&[
                ("select", "*"),
                ("id", &format!("eq.{}", user_id)),
            ])
            .send()
            .await?;
        let response = self.check_status(response, "profiles").await?;

        let mut rows: Vec<ProfileRow> = response.json().await?;
        if rows.is_empty() {
            Ok(None)
        } else {
            Ok(Some(rows.remove(0)))
        }
    }

    async fn insert_profile(&self, profile: &ProfileRow) -> Result<(), ApiError> {
        let url = self.rest_url("profiles");

        tracing::info!("Creating profile for {}", profile.id);

        let response = self
            .authorize(self.client.post(&url))
            .header("Prefer", "return=minimal")
            .json(profile)
            .send()
            .await?;
        self.check_status(response, "profiles").await?;

        Ok(())
    }

    async fn update_profile(&self, profile: &ProfileRow) -> Result<(), ApiError> {
        let url = self.rest_url("profiles");

        let response = self
            .authorize(self.client.patch(&url))
            .query(&[("id", &format!("eq.{}", profile.id))])
            .header("Prefer", "return=minimal")
            .json(profile)
            .send()
            .await?;
        self.check_status(response, "profiles").await?;

        Ok(())
    }
}
