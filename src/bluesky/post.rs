use chrono::{DateTime, SecondsFormat, Utc};
use reqwest::Client;
use serde_json::{Value, json};

use crate::{
    bluesky::{PublishError, check, xrpc_url},
    http,
    types::{CreateRecordResponse, FacetedText, PublishReceipt, Session, UploadBlobResponse},
};

pub const POST_COLLECTION: &str = "app.bsky.feed.post";
const TAG_FEATURE: &str = "app.bsky.richtext.facet#tag";
const IMAGES_EMBED: &str = "app.bsky.embed.images";

/// Uploads JPEG bytes and returns the blob reference for the embed.
///
/// # Arguments
///
/// * `client` - Shared HTTP client
/// * `service` - PDS base URL
/// * `session` - Session whose access JWT authorizes the upload
/// * `bytes` - Normalized JPEG, already within the blob size limit
///
/// # Returns
///
/// The `blob` object from the response, passed unchanged into the image
/// embed of the post record.
///
/// # Errors
///
/// - [`PublishError::Rejected`] when the PDS refuses the blob, e.g. because
///   it is too large or the session expired
/// - [`PublishError::Http`] for network failures
pub async fn upload_blob(
    client: &Client,
    service: &str,
    session: &Session,
    bytes: &[u8],
) -> Result<Value, PublishError> {
    let request = client
        .post(xrpc_url(service, "com.atproto.repo.uploadBlob"))
        .bearer_auth(&session.access_jwt)
        .header(reqwest::header::CONTENT_TYPE, "image/jpeg")
        .body(bytes.to_vec());

    let response = check("uploadBlob", http::send(request).await?).await?;
    Ok(response.json::<UploadBlobResponse>().await?.blob)
}

/// Builds an `app.bsky.feed.post` record.
///
/// Facets are emitted as `#tag` features at the byte offsets computed by
/// [`crate::post::build_facets`]. The image embed is only added when a blob
/// was uploaded.
pub fn build_post_record(
    text: &FacetedText,
    image: Option<(Value, &str)>,
    created_at: DateTime<Utc>,
) -> Value {
    let mut record = json!({
        "$type": POST_COLLECTION,
        "text": text.text,
        "createdAt": created_at.to_rfc3339_opts(SecondsFormat::Millis, true),
    });

    if !text.facets.is_empty() {
        let facets: Vec<Value> = text
            .facets
            .iter()
            .map(|f| {
                json!({
                    "index": { "byteStart": f.byte_start, "byteEnd": f.byte_end },
                    "features": [{ "$type": TAG_FEATURE, "tag": f.tag }],
                })
            })
            .collect();
        record["facets"] = Value::Array(facets);
    }

    if let Some((blob, alt)) = image {
        record["embed"] = json!({
            "$type": IMAGES_EMBED,
            "images": [{ "image": blob, "alt": alt }],
        });
    }

    record
}

/// Creates the post record in the account's repository.
///
/// Calls `com.atproto.repo.createRecord` with `repo` set to the session DID
/// and `collection` set to [`POST_COLLECTION`].
///
/// The request is sent with [`http::send_non_idempotent`]: after a timeout
/// the post may already exist, so it is never sent a second time. The
/// caller sees the error and the track is not recorded as posted.
///
/// # Arguments
///
/// * `client` - Shared HTTP client
/// * `service` - PDS base URL
/// * `session` - Session whose access JWT authorizes the write
/// * `record` - Record built by [`build_post_record`]
///
/// # Returns
///
/// The `at://` URI and CID of the new post.
///
/// # Errors
///
/// - [`PublishError::Rejected`] for any non-success status
/// - [`PublishError::Http`] for timeouts, network failures and malformed
///   responses
///
/// # Example
///
/// ```
/// let record = build_post_record(&text, None, Utc::now());
/// let receipt = create_record(&client, "https://bsky.social", &session, record).await?;
/// println!("posted {}", receipt.uri);
/// ```
pub async fn create_record(
    client: &Client,
    service: &str,
    session: &Session,
    record: Value,
) -> Result<PublishReceipt, PublishError> {
    let request = client
        .post(xrpc_url(service, "com.atproto.repo.createRecord"))
        .bearer_auth(&session.access_jwt)
        .json(&json!({
            "repo": session.did,
            "collection": POST_COLLECTION,
            "record": record,
        }));

    let response = check("createRecord", http::send_non_idempotent(request).await?).await?;
    let created = response.json::<CreateRecordResponse>().await?;
    Ok(PublishReceipt {
        uri: created.uri,
        cid: created.cid,
    })
}
