use std::collections::{HashMap, HashSet};
use std::path::PathBuf;

use chrono::Utc;
use thiserror::Error;
use uuid::Uuid;

use crate::backend::auth::{AuthError, Authenticator, Session};
use crate::backend::store_api::{ApiError, ProfileRow, StoreApi, StoreClient, TrackedRow};
use crate::calendar::stats::AttendedEvent;
use crate::calendar::{Category, Event};
use crate::storage::config::BackendConfig;

#[derive(Debug, Error)]
pub enum BackendError {
    #[error("Authentication error: {0}")]
    AuthError(#[from] AuthError),
    #[error("API error: {0}")]
    ApiError(#[from] ApiError),
}

/// Marks an event tracked for the user. Tracking an event that already
/// started records it as attended; future events are bookmarked. A retry
/// that hits the unique constraint means the row is already there, which is
/// the desired state, so a conflict reports success.
pub async fn track(
    api: &dyn StoreApi,
    user_id: &str,
    event_id: &str,
    attended: bool,
) -> Result<(), ApiError> {
    let status = if attended {
        TrackedRow::ATTENDED
    } else {
        TrackedRow::BOOKMARKED
    };
    let row = TrackedRow {
        id: Uuid::new_v4().to_string(),
        user_id: user_id.to_string(),
        event_id: event_id.to_string(),
        status: status.to_string(),
        created_at: Utc::now(),
    };

    match api.insert_tracked(&row).await {
        Ok(()) => Ok(()),
        Err(ApiError::Conflict) => {
            tracing::debug!("Event {} already tracked", event_id);
            Ok(())
        }
        Err(e) => Err(e),
    }
}

/// Creates the user's profile row if it is missing, and backfills the
/// display name when an existing row lacks one. Failures are logged and
/// swallowed; a missing profile never blocks the calendar.
pub async fn ensure_profile(api: &dyn StoreApi, session: &Session) {
    match api.fetch_profile(&session.user_id).await {
        Ok(Some(existing)) => {
            if existing.full_name.is_none() {
                let patched = ProfileRow {
                    full_name: Some(session.display_name()),
                    ..existing
                };
                if let Err(e) = api.update_profile(&patched).await {
                    tracing::warn!("Failed to update profile: {}", e);
                }
            }
        }
        Ok(None) => {
            let profile = ProfileRow {
                id: session.user_id.clone(),
                full_name: Some(session.display_name()),
                timezone: Some("UTC".to_string()),
                reminder_opt_in: Some(true),
            };
            if let Err(e) = api.insert_profile(&profile).await {
                tracing::warn!("Failed to create profile: {}", e);
            }
        }
        Err(e) => {
            tracing::warn!("Failed to check profile: {}", e);
        }
    }
}

/// Joins the user's tracked rows against the catalog and keeps the ones
/// marked attended. The attendance date is the tracking row's creation
/// time, so the dashboard reflects when the user logged the event.
pub fn attended_events(
    tracked: &[TrackedRow],
    events: &[Event],
    categories: &[Category],
) -> Vec<AttendedEvent> {
    let events_by_id: HashMap<&str, &Event> =
        events.iter().map(|e| (e.id.as_str(), e)).collect();
    let names_by_id: HashMap<&str, &str> = categories
        .iter()
        .map(|c| (c.id.as_str(), c.name.as_str()))
        .collect();

    tracked
        .iter()
        .filter(|row| row.status == TrackedRow::ATTENDED)
        .filter_map(|row| {
            let event = events_by_id.get(row.event_id.as_str())?;
            Some(AttendedEvent {
                attended_at: row.created_at,
                category: event
                    .event_type_id
                    .as_deref()
                    .and_then(|id| names_by_id.get(id))
                    .unwrap_or(&"Uncategorized")
                    .to_string(),
            })
        })
        .collect()
}

/// Ties auth and the store together: every call gets a fresh access token
/// from the session (refreshing when needed) before touching the store.
pub struct BackendService {
    backend: BackendConfig,
    auth: Authenticator,
}

impl BackendService {
    pub fn new(backend: BackendConfig, session_path: PathBuf) -> Self {
        let auth = Authenticator::new(backend.clone(), session_path);
        Self { backend, auth }
    }

    pub fn auth(&mut self) -> &mut Authenticator {
        &mut self.auth
    }

    fn anonymous_client(&self) -> StoreClient {
        StoreClient::new(self.backend.base_url.clone(), self.backend.anon_key.clone())
    }

    async fn signed_in_client(&mut self) -> Result<(StoreClient, Session), BackendError> {
        let session = self.auth.get_valid_session().await?;
        let client = self
            .anonymous_client()
            .with_access_token(session.access_token.clone());
        Ok((client, session))
    }

    /// The public catalog. Works without a session; the anon key is enough
    /// to read events and categories.
    pub async fn load_catalog(&mut self) -> Result<(Vec<Event>, Vec<Category>), BackendError> {
        let client = match self.auth.get_valid_session().await {
            Ok(session) => self.anonymous_client().with_access_token(session.access_token),
            Err(_) => self.anonymous_client(),
        };

        let events = client.fetch_events().await?;
        let categories = client.fetch_categories().await?;
        Ok((events, categories))
    }

    pub async fn load_tracked(&mut self) -> Result<HashSet<String>, BackendError> {
        let (client, session) = self.signed_in_client().await?;
        let rows = client.fetch_tracked(&session.user_id).await?;
        Ok(rows.into_iter().map(|row| row.event_id).collect())
    }

    pub async fn track_event(&mut self, event_id: &str, attended: bool) -> Result<(), BackendError> {
        let (client, session) = self.signed_in_client().await?;
        track(&client, &session.user_id, event_id, attended).await?;
        Ok(())
    }

    pub async fn untrack_event(&mut self, event_id: &str) -> Result<(), BackendError> {
        let (client, session) = self.signed_in_client().await?;
        client.delete_tracked(&session.user_id, event_id).await?;
        Ok(())
    }

    pub async fn ensure_profile(&mut self) -> Result<(), BackendError> {
        let (client, session) = self.signed_in_client().await?;
        ensure_profile(&client, &session).await;
        Ok(())
    }

    pub async fn load_dashboard(&mut self) -> Result<Vec<AttendedEvent>, BackendError> {
        let (client, session) = self.signed_in_client().await?;

        let tracked = client.fetch_tracked(&session.user_id).await?;
        let events = client.fetch_events().await?;
        let categories = client.fetch_categories().await?;

        Ok(attended_events(&tracked, &events, &categories))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::store_api::MockStoreApi;
    use crate::calendar::event::test_support::*;

    fn test_session() -> Session {
        Session::new(
            "jwt".to_string(),
            3600,
            "u1".to_string(),
            "ada@example.com".to_string(),
        )
    }

    fn tracked_row(event_id: &str, status: &str) -> TrackedRow {
        TrackedRow {
            id: format!("row-{}", event_id),
            user_id: "u1".to_string(),
            event_id: event_id.to_string(),
            status: status.to_string(),
            created_at: utc(2024, 1, 1, 0, 0),
        }
    }

    #[tokio::test]
    async fn track_bookmarks_future_events() {
        let mut api = MockStoreApi::new();
        api.expect_insert_tracked()
            .withf(|row| {
                row.user_id == "u1"
                    && row.event_id == "e1"
                    && row.status == TrackedRow::BOOKMARKED
            })
            .times(1)
            .returning(|_| Ok(()));

        track(&api, "u1", "e1", false).await.unwrap();
    }

    #[tokio::test]
    async fn track_marks_past_events_attended() {
        let mut api = MockStoreApi::new();
        api.expect_insert_tracked()
            .withf(|row| row.status == TrackedRow::ATTENDED)
            .times(1)
            .returning(|_| Ok(()));

        track(&api, "u1", "e1", true).await.unwrap();
    }

    #[tokio::test]
    async fn track_treats_conflict_as_success() {
        let mut api = MockStoreApi::new();
        api.expect_insert_tracked()
            .returning(|_| Err(ApiError::Conflict));

        assert!(track(&api, "u1", "e1", false).await.is_ok());
    }

    #[tokio::test]
    async fn track_propagates_other_errors() {
        let mut api = MockStoreApi::new();
        api.expect_insert_tracked()
            .returning(|_| Err(ApiError::AuthenticationFailed));

        assert!(track(&api, "u1", "e1", false).await.is_err());
    }

    #[tokio::test]
    async fn ensure_profile_creates_missing_profile() {
        let mut api = MockStoreApi::new();
        api.expect_fetch_profile().returning(|_| Ok(None));
        api.expect_insert_profile()
            .withf(|p| p.id == "u1" && p.full_name.as_deref() == Some("ada"))
            .times(1)
            .returning(|_| Ok(()));

        ensure_profile(&api, &test_session()).await;
    }

    #[tokio::test]
    async fn ensure_profile_leaves_existing_profile_alone() {
        let mut api = MockStoreApi::new();
        api.expect_fetch_profile().returning(|_| {
            Ok(Some(ProfileRow {
                id: "u1".to_string(),
                full_name: Some("Ada".to_string()),
                timezone: Some("UTC".to_string()),
                reminder_opt_in: Some(true),
            }))
        });
        api.expect_insert_profile().times(0);
        api.expect_update_profile().times(0);

        ensure_profile(&api, &test_session()).await;
    }

    #[tokio::test]
    async fn ensure_profile_backfills_missing_name() {
        let mut api = MockStoreApi::new();
        api.expect_fetch_profile().returning(|_| {
            Ok(Some(ProfileRow {
                id: "u1".to_string(),
                full_name: None,
                timezone: Some("UTC".to_string()),
                reminder_opt_in: Some(true),
            }))
        });
        api.expect_update_profile()
            .withf(|p| p.full_name.as_deref() == Some("ada"))
            .times(1)
            .returning(|_| Ok(()));

        ensure_profile(&api, &test_session()).await;
    }

    #[test]
    fn attended_events_keep_attended_rows_only() {
        let events = vec![
            event_at("conf", "RustConf", utc(2024, 3, 1, 9, 0), None),
            event_at("summit", "Next Summit", utc(2024, 9, 1, 9, 0), None),
        ];
        let tracked = vec![
            tracked_row("conf", TrackedRow::ATTENDED),
            tracked_row("summit", TrackedRow::BOOKMARKED),
        ];

        let attended = attended_events(&tracked, &events, &[]);

        assert_eq!(attended.len(), 1);
        assert_eq!(attended[0].attended_at, utc(2024, 1, 1, 0, 0));
    }

    #[test]
    fn attended_events_resolve_category_names() {
        let mut event = event_at("e1", "RustConf", utc(2024, 3, 1, 9, 0), None);
        event.event_type_id = Some("cat1".to_string());
        let categories = vec![category("cat1", "Conferences", "#007AFF")];
        let tracked = [tracked_row("e1", TrackedRow::ATTENDED)];

        let attended = attended_events(&tracked, &[event], &categories);

        assert_eq!(attended[0].category, "Conferences");
    }

    #[test]
    fn attended_events_without_category_are_uncategorized() {
        let event = event_at("e1", "Meetup", utc(2024, 3, 1, 9, 0), None);
        let tracked = [tracked_row("e1", TrackedRow::ATTENDED)];

        let attended = attended_events(&tracked, &[event], &[]);

        assert_eq!(attended[0].category, "Uncategorized");
    }

    #[test]
    fn attended_events_skip_rows_missing_from_catalog() {
        let tracked = [tracked_row("ghost", TrackedRow::ATTENDED)];

        let attended = attended_events(&tracked, &[], &[]);

        assert!(attended.is_empty());
    }
}
