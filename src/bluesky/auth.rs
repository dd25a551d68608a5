use reqwest::Client;
use serde_json::json;

use crate::{
    bluesky::{PublishError, check, xrpc_url},
    http,
    types::Session,
};

/// Logs in with handle and (app) password.
///
/// Calls `com.atproto.server.createSession`. Bluesky rate limits this
/// endpoint aggressively, so callers keep the session and refresh it instead
/// of logging in for every post.
///
/// # Arguments
///
/// * `client` - Shared HTTP client
/// * `service` - PDS base URL, e.g. `https://bsky.social`
/// * `identifier` - Handle or DID of the account
/// * `password` - Account or app password
///
/// # Returns
///
/// A [`Session`] holding the access and refresh JWTs and the account DID.
///
/// # Errors
///
/// - [`PublishError::Rejected`] for bad credentials or a rate-limited login
/// - [`PublishError::Http`] for network failures and malformed responses
///
/// # Example
///
/// ```
/// let session = create_session(&client, "https://bsky.social", "bot.bsky.social", &password).await?;
/// println!("logged in as {}", session.did);
/// ```
pub async fn create_session(
    client: &Client,
    service: &str,
    identifier: &str,
    password: &str,
) -> Result<Session, PublishError> {
    let request = client
        .post(xrpc_url(service, "com.atproto.server.createSession"))
        .json(&json!({
            "identifier": identifier,
            "password": password,
        }));

    let response = check("createSession", http::send(request).await?).await?;
    Ok(response.json::<Session>().await?)
}

/// Exchanges the refresh JWT for a new session. The refresh token goes in
/// the `Authorization` header in place of the access token.
///
/// # Errors
///
/// [`PublishError::Rejected`] when the refresh token has expired or was
/// revoked; the caller then logs in again with [`create_session`].
pub async fn refresh_session(
    client: &Client,
    service: &str,
    refresh_jwt: &str,
) -> Result<Session, PublishError> {
    let request = client
        .post(xrpc_url(service, "com.atproto.server.refreshSession"))
        .bearer_auth(refresh_jwt);

    let response = check("refreshSession", http::send(request).await?).await?;
    Ok(response.json::<Session>().await?)
}
