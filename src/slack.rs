//! Slack file upload integration
//!
//! Files are shared with Slack's external upload flow: reserve an upload URL,
//! send the bytes there, then complete the upload into the target channels.

use crate::error::{Error, Result};
use crate::models::{UploadReceipt, UploadRequest};
use reqwest::Client;
use serde::Deserialize;
use serde::de::DeserializeOwned;
use serde_json::{Value, json};
use tracing::{debug, info};

/// Default Slack Web API base URL
pub const SLACK_API_URL: &str = "https://slack.com/api";

const GET_UPLOAD_URL: &str = "files.getUploadURLExternal";
const COMPLETE_UPLOAD: &str = "files.completeUploadExternal";

/// Trait for uploading a file to a chat platform
#[async_trait::async_trait]
pub trait FileUploader {
    /// Uploads the request's content and shares it to its channels
    async fn upload(&self, token: &str, request: UploadRequest) -> Result<UploadReceipt>;
}

/// Envelope every Slack Web API response shares
#[derive(Debug, Deserialize)]
struct ApiResponse<T> {
    ok: bool,
    #[serde(default)]
    error: Option<String>,
    #[serde(flatten)]
    body: Option<T>,
}

#[derive(Debug, Deserialize)]
struct UploadUrl {
    upload_url: String,
    file_id: String,
}

/// Slack Web API client
#[derive(Clone, Debug)]
pub struct SlackClient {
    http_client: Client,
    base_url: String,
}

impl Default for SlackClient {
    fn default() -> Self {
        Self::new()
    }
}

impl SlackClient {
    /// Creates a client talking to the public Slack API
    pub fn new() -> Self {
        Self {
            http_client: Client::new(),
            base_url: SLACK_API_URL.to_string(),
        }
    }

    /// Creates a new Slack client with a custom base URL (useful for testing)
    pub fn with_base_url(base_url: impl Into<String>) -> Self {
        Self {
            http_client: Client::new(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
        }
    }

    /// Reserves an upload URL for a file of `length` bytes
    async fn get_upload_url(&self, token: &str, filename: &str, length: usize) -> Result<UploadUrl> {
        let length = length.to_string();
        let response = self
            .http_client
            .post(format!("{}/{}", self.base_url, GET_UPLOAD_URL))
            .bearer_auth(token)
            .form(&[("filename", filename), ("length", length.as_str())])
            .send()
            .await?;

        parse_response(GET_UPLOAD_URL, response).await
    }

    /// Sends the file bytes to the reserved URL
    async fn send_content(&self, upload_url: &str, content: Vec<u8>) -> Result<()> {
        let response = self
            .http_client
            .post(upload_url)
            .body(content)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            return Err(Error::slack(
                "upload",
                format!("content upload failed with status {}: {}", status, error_text),
            ));
        }

        Ok(())
    }

    /// Shares an uploaded file into the channels
    async fn complete_upload(
        &self,
        token: &str,
        file_id: &str,
        request: &UploadRequest,
    ) -> Result<()> {
        let body = complete_upload_body(file_id, request);
        let response = self
            .http_client
            .post(format!("{}/{}", self.base_url, COMPLETE_UPLOAD))
            .bearer_auth(token)
            .json(&body)
            .send()
            .await?;

        parse_response::<Value>(COMPLETE_UPLOAD, response).await?;
        Ok(())
    }
}

#[async_trait::async_trait]
impl FileUploader for SlackClient {
    async fn upload(&self, token: &str, mut request: UploadRequest) -> Result<UploadReceipt> {
        let reserved = self
            .get_upload_url(token, &request.filename, request.content.len())
            .await?;
        debug!("Reserved upload URL for file {}", reserved.file_id);

        let content = std::mem::take(&mut request.content);
        self.send_content(&reserved.upload_url, content).await?;
        self.complete_upload(token, &reserved.file_id, &request)
            .await?;

        info!(
            "Shared {} as {} to {}",
            request.filename,
            reserved.file_id,
            request.channels.join(", ")
        );

        Ok(UploadReceipt {
            file_id: reserved.file_id,
            filename: request.filename,
            channels: request.channels,
        })
    }
}

/// JSON body for `files.completeUploadExternal`
fn complete_upload_body(file_id: &str, request: &UploadRequest) -> Value {
    let mut file = json!({ "id": file_id });
    if let Some(title) = &request.title {
        file["title"] = json!(title);
    }

    let mut body = json!({
        "files": [file],
        "channels": request.channels.join(","),
    });
    if let Some(comment) = &request.comment {
        body["initial_comment"] = json!(comment);
    }

    body
}

/// Checks the HTTP status and the `ok` flag, then extracts the body
async fn parse_response<T: DeserializeOwned>(method: &str, response: reqwest::Response) -> Result<T> {
    let status = response.status();
    if !status.is_success() {
        let error_text = response
            .text()
            .await
            .unwrap_or_else(|_| "Unknown error".to_string());
        return Err(Error::slack(
            method,
            format!("request failed with status {}: {}", status, error_text),
        ));
    }

    let text = response.text().await?;
    parse_api_body(method, &text)
}

fn parse_api_body<T: DeserializeOwned>(method: &str, text: &str) -> Result<T> {
    let envelope: ApiResponse<T> = serde_json::from_str(text)?;
    if !envelope.ok {
        return Err(Error::slack(
            method,
            envelope.error.unwrap_or_else(|| "unknown_error".to_string()),
        ));
    }

    envelope
        .body
        .ok_or_else(|| Error::slack(method, "response is missing expected fields"))
}
