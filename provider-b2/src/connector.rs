//! Backblaze B2 native API connector.
//!
//! Implements [`ObjectStore`] against the B2 native API: authorize the
//! account, resolve the bucket id, obtain a per-session upload URL,
//! then upload. Session state (tokens, API endpoints, upload target)
//! is cached and re-established lazily when missing.

use async_trait::async_trait;
use bytes::Bytes;
use serde_json::json;
use std::time::Duration;
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

use crate::error::{Result, StorageError};
use crate::store::ObjectStore;
use crate::types::{
    AuthorizeResponse, DownloadAuthResponse, ListBucketsResponse, UploadUrlResponse,
};

/// Account authorization endpoint. Everything after this call goes to
/// the per-account `api_url` returned in the authorize response.
const AUTHORIZE_ENDPOINT: &str = "https://api.backblazeb2.com/b2api/v2/b2_authorize_account";

/// Timeout for control-plane calls.
const API_TIMEOUT: Duration = Duration::from_secs(10);

/// Timeout for file uploads.
const UPLOAD_TIMEOUT: Duration = Duration::from_secs(60);

/// Credentials and bucket selection for a B2 account.
#[derive(Debug, Clone)]
pub struct B2Config {
    /// Full application key id, used only for the authorize handshake
    pub account_id: String,
    /// Application key secret
    pub application_key: String,
    /// Bucket to store objects in
    pub bucket_name: String,
}

/// Established session against the B2 API.
#[derive(Clone)]
struct Session {
    auth_token: String,
    api_url: String,
    download_url: String,
    /// Short account id from the authorize response, required by
    /// `b2_list_buckets` in place of the full key id.
    account_id: String,
}

#[derive(Clone)]
struct UploadTarget {
    url: String,
    auth_token: String,
}

#[derive(Default)]
struct SessionState {
    session: Option<Session>,
    bucket_id: Option<String>,
    upload: Option<UploadTarget>,
}

/// [`ObjectStore`] backed by Backblaze B2.
pub struct B2ObjectStore {
    client: reqwest::Client,
    config: B2Config,
    state: Mutex<SessionState>,
}

impl B2ObjectStore {
    /// Create a store for the given account and bucket. No network
    /// calls happen here; the session is established on first use.
    pub fn new(config: B2Config) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(API_TIMEOUT)
            .build()
            .map_err(|e| StorageError::Network(e.to_string()))?;

        Ok(Self {
            client,
            config,
            state: Mutex::new(SessionState::default()),
        })
    }

    async fn authorize(&self) -> Result<Session> {
        debug!("Authorizing B2 account");

        let response = self
            .client
            .get(AUTHORIZE_ENDPOINT)
            .basic_auth(&self.config.account_id, Some(&self.config.application_key))
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            warn!(status = status.as_u16(), "B2 authorization failed");
            return Err(StorageError::Api {
                status: status.as_u16(),
                message,
            });
        }

        let auth: AuthorizeResponse = response
            .json()
            .await
            .map_err(|e| StorageError::Parse(e.to_string()))?;

        info!(api_url = %auth.api_url, "B2 session established");

        Ok(Session {
            auth_token: auth.authorization_token,
            api_url: auth.api_url,
            download_url: auth.download_url,
            account_id: auth.account_id,
        })
    }

    /// POST a control-plane call under the session token and decode
    /// the JSON response.
    async fn api_call<T: serde::de::DeserializeOwned>(
        &self,
        session: &Session,
        endpoint: &str,
        body: serde_json::Value,
    ) -> Result<T> {
        let url = format!("{}/b2api/v2/{}", session.api_url, endpoint);

        let response = self
            .client
            .post(&url)
            .header("Authorization", &session.auth_token)
            .json(&body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            warn!(status = status.as_u16(), endpoint, "B2 API call failed");
            return Err(StorageError::Api {
                status: status.as_u16(),
                message,
            });
        }

        response
            .json()
            .await
            .map_err(|e| StorageError::Parse(e.to_string()))
    }

    async fn ensure_session(&self, state: &mut SessionState) -> Result<Session> {
        if let Some(session) = &state.session {
            return Ok(session.clone());
        }

        let session = self.authorize().await?;
        state.session = Some(session.clone());
        Ok(session)
    }

    async fn ensure_bucket_id(
        &self,
        state: &mut SessionState,
        session: &Session,
    ) -> Result<String> {
        if let Some(id) = &state.bucket_id {
            return Ok(id.clone());
        }

        let listing: ListBucketsResponse = self
            .api_call(
                session,
                "b2_list_buckets",
                json!({ "accountId": session.account_id }),
            )
            .await?;

        let bucket = listing
            .buckets
            .into_iter()
            .find(|b| b.bucket_name == self.config.bucket_name)
            .ok_or_else(|| StorageError::BucketNotFound(self.config.bucket_name.clone()))?;

        debug!(bucket_id = %bucket.bucket_id, "Resolved bucket");

        state.bucket_id = Some(bucket.bucket_id.clone());
        Ok(bucket.bucket_id)
    }

    async fn ensure_upload_target(
        &self,
        state: &mut SessionState,
        session: &Session,
    ) -> Result<UploadTarget> {
        if let Some(target) = &state.upload {
            return Ok(target.clone());
        }

        let bucket_id = self.ensure_bucket_id(state, session).await?;
        let upload: UploadUrlResponse = self
            .api_call(
                session,
                "b2_get_upload_url",
                json!({ "bucketId": bucket_id }),
            )
            .await?;

        let target = UploadTarget {
            url: upload.upload_url,
            auth_token: upload.authorization_token,
        };
        state.upload = Some(target.clone());
        Ok(target)
    }
}

/// Durable public locator for an uploaded object.
fn public_url(download_url: &str, bucket_name: &str, key: &str) -> String {
    format!("{}/file/{}/{}", download_url, bucket_name, key)
}

/// Public locator with a download authorization token attached.
fn authorized_url(download_url: &str, bucket_name: &str, key: &str, token: &str) -> String {
    format!(
        "{}/file/{}/{}?Authorization={}",
        download_url,
        bucket_name,
        urlencoding::encode(key),
        urlencoding::encode(token)
    )
}

#[async_trait]
impl ObjectStore for B2ObjectStore {
    async fn put_object(&self, key: &str, data: Bytes) -> Result<String> {
        // A B2 upload URL admits one upload at a time, so the whole
        // exchange runs under the session lock.
        let mut state = self.state.lock().await;
        let session = self.ensure_session(&mut state).await?;
        let target = self.ensure_upload_target(&mut state, &session).await?;

        info!(key, size = data.len(), "Uploading object to B2");

        let response = self
            .client
            .post(&target.url)
            .timeout(UPLOAD_TIMEOUT)
            .header("Authorization", &target.auth_token)
            .header("X-Bz-File-Name", urlencoding::encode(key).as_ref())
            .header("Content-Type", "b2/x-auto")
            .header("X-Bz-Content-Sha1", "do_not_verify")
            .body(data)
            .send()
            .await
            .map_err(|e| {
                // The cached upload URL may have expired; drop it so
                // the next call fetches a fresh one.
                state.upload = None;
                StorageError::Network(e.to_string())
            })?;

        let status = response.status();
        if !status.is_success() {
            state.upload = None;
            let message = response.text().await.unwrap_or_default();
            warn!(status = status.as_u16(), key, "B2 upload failed");
            return Err(StorageError::Api {
                status: status.as_u16(),
                message,
            });
        }

        Ok(public_url(&session.download_url, &self.config.bucket_name, key))
    }

    async fn signed_url(&self, key: &str, valid_secs: u32) -> Result<String> {
        let mut state = self.state.lock().await;
        let session = self.ensure_session(&mut state).await?;
        let bucket_id = self.ensure_bucket_id(&mut state, &session).await?;

        let auth: DownloadAuthResponse = self
            .api_call(
                &session,
                "b2_get_download_authorization",
                json!({
                    "bucketId": bucket_id,
                    "fileNamePrefix": key,
                    "validDurationInSeconds": valid_secs,
                }),
            )
            .await?;

        debug!(key, valid_secs, "Issued download authorization");

        Ok(authorized_url(
            &session.download_url,
            &self.config.bucket_name,
            key,
            &auth.authorization_token,
        ))
    }
}
