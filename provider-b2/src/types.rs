//! Wire types for the B2 native API.

use serde::Deserialize;

/// Response of `b2_authorize_account`.
///
/// `account_id` here is the short account id, which differs from the
/// full key id used for the basic-auth handshake. All subsequent API
/// calls must use the short form.
#[derive(Debug, Clone, Deserialize)]
pub struct AuthorizeResponse {
    #[serde(rename = "authorizationToken")]
    pub authorization_token: String,
    #[serde(rename = "apiUrl")]
    pub api_url: String,
    #[serde(rename = "downloadUrl")]
    pub download_url: String,
    #[serde(rename = "accountId")]
    pub account_id: String,
}

#[derive(Debug, Deserialize)]
pub struct Bucket {
    #[serde(rename = "bucketId")]
    pub bucket_id: String,
    #[serde(rename = "bucketName")]
    pub bucket_name: String,
}

#[derive(Debug, Deserialize)]
pub struct ListBucketsResponse {
    pub buckets: Vec<Bucket>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct UploadUrlResponse {
    #[serde(rename = "uploadUrl")]
    pub upload_url: String,
    #[serde(rename = "authorizationToken")]
    pub authorization_token: String,
}

#[derive(Debug, Deserialize)]
pub struct DownloadAuthResponse {
    #[serde(rename = "authorizationToken")]
    pub authorization_token: String,
}
