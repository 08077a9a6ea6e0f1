use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use thiserror::Error;

use crate::storage::config::BackendConfig;

#[derive(Debug, Error)]
pub enum AuthError {
    #[error("Failed to read session file: {0}")]
    ReadError(#[from] std::io::Error),
    #[error("Failed to parse session: {0}")]
    ParseError(#[from] serde_json::Error),
    #[error("Session has expired")]
    SessionExpired,
    #[error("No refresh token available")]
    NoRefreshToken,
    #[error("HTTP request failed: {0}")]
    HttpError(#[from] reqwest::Error),
    #[error("Sign-in failed: {0}")]
    SignInFailed(String),
}

/// A signed-in user's credentials plus the identity fields the client
/// displays. Persisted between runs so sign-in survives restarts.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Session {
    pub access_token: String,
    pub refresh_token: Option<String>,
    pub expires_at: DateTime<Utc>,
    pub user_id: String,
    pub email: String,
    pub full_name: Option<String>,
}

impl Session {
    pub fn new(
        access_token: String,
        expires_in_seconds: i64,
        user_id: String,
        email: String,
    ) -> Self {
        Self {
            access_token,
            refresh_token: None,
            expires_at: Utc::now() + chrono::Duration::seconds(expires_in_seconds),
            user_id,
            email,
            full_name: None,
        }
    }

    pub fn with_refresh_token(mut self, refresh_token: String) -> Self {
        self.refresh_token = Some(refresh_token);
        self
    }

    pub fn with_full_name(mut self, full_name: Option<String>) -> Self {
        self.full_name = full_name;
        self
    }

    pub fn is_valid(&self) -> bool {
        self.expires_at > Utc::now()
    }

    /// Fallback display name: the part of the email before the `@`.
    pub fn display_name(&self) -> String {
        match &self.full_name {
            Some(name) if !name.is_empty() => name.clone(),
            _ => self
                .email
                .split('@')
                .next()
                .unwrap_or(&self.email)
                .to_string(),
        }
    }
}

pub struct SessionStorage {
    path: PathBuf,
}

impl SessionStorage {
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }

    pub fn save(&self, session: &Session) -> Result<(), AuthError> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let json = serde_json::to_string_pretty(session)?;
        std::fs::write(&self.path, json)?;
        Ok(())
    }

    pub fn load(&self) -> Result<Session, AuthError> {
        let content = std::fs::read_to_string(&self.path)?;
        let session: Session = serde_json::from_str(&content)?;
        Ok(session)
    }

    pub fn clear(&self) -> Result<(), AuthError> {
        if self.path.exists() {
            std::fs::remove_file(&self.path)?;
        }
        Ok(())
    }

    pub fn needs_refresh(&self, session: &Session) -> bool {
        let buffer = chrono::Duration::minutes(5);
        session.expires_at <= Utc::now() + buffer
    }
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
    expires_in: i64,
    refresh_token: Option<String>,
    user: UserResponse,
}

#[derive(Debug, Deserialize)]
struct UserResponse {
    id: String,
    email: Option<String>,
    user_metadata: Option<UserMetadata>,
}

#[derive(Debug, Deserialize)]
struct UserMetadata {
    full_name: Option<String>,
}

/// Talks to the hosted auth service (GoTrue-style endpoints under
/// `/auth/v1`) and keeps the persisted session fresh.
pub struct Authenticator {
    backend: BackendConfig,
    storage: SessionStorage,
    client: reqwest::Client,
}

impl Authenticator {
    pub fn new(backend: BackendConfig, session_path: PathBuf) -> Self {
        Self {
            backend,
            storage: SessionStorage::new(session_path),
            client: reqwest::Client::new(),
        }
    }

    pub fn storage(&self) -> &SessionStorage {
        &self.storage
    }

    /// Returns the stored session, refreshing it first when it is expired
    /// or about to expire.
    pub async fn get_valid_session(&mut self) -> Result<Session, AuthError> {
        let session = self.storage.load()?;
        if session.is_valid() && !self.storage.needs_refresh(&session) {
            return Ok(session);
        }
        self.refresh_session(&session).await
    }

    pub async fn sign_in_with_password(
        &mut self,
        email: &str,
        password: &str,
    ) -> Result<Session, AuthError> {
        let url = format!("{}/auth/v1/token?grant_type=password", self.backend.base_url);
        let body = serde_json::json!({ "email": email, "password": password });

        tracing::info!("Signing in {}", email);
        let response = self
            .client
            .post(&url)
            .header("apikey", &self.backend.anon_key)
            .json(&body)
            .send()
            .await?;

        self.session_from_response(response).await
    }

    pub async fn sign_up(
        &mut self,
        email: &str,
        password: &str,
        full_name: &str,
    ) -> Result<Session, AuthError> {
        let url = format!("{}/auth/v1/signup", self.backend.base_url);
        let body = serde_json::json!({
            "email": email,
            "password": password,
            "data": { "full_name": full_name },
        });

        tracing::info!("Registering {}", email);
        let response = self
            .client
            .post(&url)
            .header("apikey", &self.backend.anon_key)
            .json(&body)
            .send()
            .await?;

        self.session_from_response(response).await
    }

    pub async fn refresh_session(&mut self, session: &Session) -> Result<Session, AuthError> {
        let refresh_token = session
            .refresh_token
            .as_ref()
            .ok_or(AuthError::NoRefreshToken)?;

        let url = format!(
            "{}/auth/v1/token?grant_type=refresh_token",
            self.backend.base_url
        );
        let body = serde_json::json!({ "refresh_token": refresh_token });

        tracing::info!("Refreshing session for {}", session.email);
        let response = self
            .client
            .post(&url)
            .header("apikey", &self.backend.anon_key)
            .json(&body)
            .send()
            .await?;

        self.session_from_response(response).await
    }

    pub async fn send_recovery_email(&self, email: &str) -> Result<(), AuthError> {
        let url = format!("{}/auth/v1/recover", self.backend.base_url);
        let body = serde_json::json!({ "email": email });

        let response = self
            .client
            .post(&url)
            .header("apikey", &self.backend.anon_key)
            .json(&body)
            .send()
            .await?;

        if !response.status().is_success() {
            let error_text = response.text().await?;
            return Err(AuthError::SignInFailed(error_text));
        }
        Ok(())
    }

    /// Sets a new password using the access token from a recovery link. The
    /// token arrives in the URL fragment of the emailed link and is pasted
    /// back the same way as the OAuth tokens.
    pub async fn update_password(
        &self,
        access_token: &str,
        new_password: &str,
    ) -> Result<(), AuthError> {
        let url = format!("{}/auth/v1/user", self.backend.base_url);
        let body = serde_json::json!({ "password": new_password });

        let response = self
            .client
            .put(&url)
            .header("apikey", &self.backend.anon_key)
            .bearer_auth(access_token)
            .json(&body)
            .send()
            .await?;

        if !response.status().is_success() {
            let error_text = response.text().await?;
            return Err(AuthError::SignInFailed(error_text));
        }
        Ok(())
    }

    /// Browser URL for provider sign-in. The provider redirects with tokens
    /// in the URL fragment, which the user pastes back into the client.
    pub fn oauth_authorize_url(&self, provider: &str) -> String {
        format!(
            "{}/auth/v1/authorize?provider={}",
            self.backend.base_url,
            urlencoding::encode(provider)
        )
    }

    /// Completes the paste-back OAuth flow: validates the pasted tokens by
    /// fetching the user they belong to, then persists the session.
    pub async fn adopt_tokens(
        &mut self,
        access_token: &str,
        refresh_token: Option<&str>,
    ) -> Result<Session, AuthError> {
        let url = format!("{}/auth/v1/user", self.backend.base_url);

        let response = self
            .client
            .get(&url)
            .header("apikey", &self.backend.anon_key)
            .bearer_auth(access_token)
            .send()
            .await?;

        if !response.status().is_success() {
            let error_text = response.text().await?;
            return Err(AuthError::SignInFailed(error_text));
        }

        let user: UserResponse = response.json().await?;
        let mut session = Session::new(
            access_token.to_string(),
            3600,
            user.id,
            user.email.unwrap_or_default(),
        )
        .with_full_name(user.user_metadata.and_then(|m| m.full_name));
        if let Some(rt) = refresh_token {
            session = session.with_refresh_token(rt.to_string());
        }

        self.storage.save(&session)?;
        Ok(session)
    }

    pub fn sign_out(&self) -> Result<(), AuthError> {
        self.storage.clear()
    }

    async fn session_from_response(
        &self,
        response: reqwest::Response,
    ) -> Result<Session, AuthError> {
        if !response.status().is_success() {
            let error_text = response.text().await?;
            tracing::error!("Auth request failed: {}", error_text);
            return Err(AuthError::SignInFailed(error_text));
        }

        let token: TokenResponse = response.json().await?;
        let mut session = Session::new(
            token.access_token,
            token.expires_in,
            token.user.id,
            token.user.email.unwrap_or_default(),
        )
        .with_full_name(token.user.user_metadata.and_then(|m| m.full_name));
        if let Some(rt) = token.refresh_token {
            session = session.with_refresh_token(rt);
        }

        self.storage.save(&session)?;
        Ok(session)
    }
}
