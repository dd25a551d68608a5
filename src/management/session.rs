use reqwest::Client;

use crate::{
    bluesky::{PublishError, auth},
    config::Config,
    info,
    types::Session,
    warning,
};

/// Owns the Bluesky session for the lifetime of the process.
///
/// The session is created lazily on first use. After a failed publish the
/// session is marked stale; the next call to [`get_valid_session`] tries the
/// refresh token first and falls back to a fresh login.
///
/// [`get_valid_session`]: SessionManager::get_valid_session
pub struct SessionManager {
    http: Client,
    service: String,
    handle: String,
    password: String,
    session: Option<Session>,
    stale: bool,
}

impl SessionManager {
    pub fn new(http: Client, config: &Config) -> Self {
        Self {
            http,
            service: config.bluesky_service.trim_end_matches('/').to_string(),
            handle: config.bluesky_handle.clone(),
            password: config.bluesky_password.clone(),
            session: None,
            stale: false,
        }
    }

    pub fn service(&self) -> &str {
        &self.service
    }

    pub fn is_stale(&self) -> bool {
        self.stale
    }

    pub fn invalidate(&mut self) {
        self.stale = true;
    }

    pub async fn get_valid_session(&mut self) -> Result<&Session, PublishError> {
        if self.stale {
            self.stale = false;
            if let Some(current) = self.session.take() {
                match auth::refresh_session(&self.http, &self.service, &current.refresh_jwt).await
                {
                    Ok(refreshed) => {
                        info!("Bluesky session refreshed.");
                        self.session = Some(refreshed);
                    }
                    Err(e) => warning!("Session refresh failed, logging in again: {}", e),
                }
            }
        }

        if self.session.is_none() {
            info!("Logging into Bluesky as {}...", self.handle);
            let session =
                auth::create_session(&self.http, &self.service, &self.handle, &self.password)
                    .await?;
            info!("Bluesky login successful.");
            self.session = Some(session);
        }

        self.session.as_ref().ok_or(PublishError::NoSession)
    }

    pub fn current_session(&self) -> Option<&Session> {
        self.session.as_ref()
    }
}
