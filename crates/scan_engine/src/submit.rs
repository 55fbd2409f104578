use std::time::Duration;

use futures_util::StreamExt;
use reqwest::header::CONTENT_TYPE;
use scan_logging::{scan_debug, scan_info};
use serde_json::Value;

use crate::decode::decode_json;
use crate::{FailureKind, RequestId, ResponseMetadata, ScanOutput, SubmitError};

/// Collaborator used when nothing else is configured.
pub const DEFAULT_SERVICE_URL: &str = "http://localhost:5000";

#[derive(Debug, Clone)]
pub struct SubmitSettings {
    /// Base of the scanning service; requests go to `{service_url}/scan`.
    pub service_url: String,
    pub connect_timeout: Duration,
    pub request_timeout: Duration,
    pub max_bytes: u64,
}

impl Default for SubmitSettings {
    fn default() -> Self {
        Self {
            service_url: DEFAULT_SERVICE_URL.to_string(),
            connect_timeout: Duration::from_secs(10),
            // Scans walk every endpoint server-side, so allow plenty of time.
            request_timeout: Duration::from_secs(300),
            max_bytes: 10 * 1024 * 1024,
        }
    }
}

impl SubmitSettings {
    pub fn scan_url(&self) -> Result<reqwest::Url, SubmitError> {
        let base = self.service_url.trim().trim_end_matches('/');
        reqwest::Url::parse(&format!("{base}/scan"))
            .map_err(|err| SubmitError::new(FailureKind::InvalidServiceUrl, err.to_string()))
    }
}

#[async_trait::async_trait]
pub trait Submitter: Send + Sync {
    /// Sends `body` as one JSON request and returns the decoded response.
    async fn submit(&self, request_id: RequestId, body: &Value) -> Result<ScanOutput, SubmitError>;
}

#[derive(Debug, Clone)]
pub struct ReqwestSubmitter {
    settings: SubmitSettings,
}

impl ReqwestSubmitter {
    pub fn new(settings: SubmitSettings) -> Self {
        Self { settings }
    }

    fn build_client(&self) -> Result<reqwest::Client, SubmitError> {
        reqwest::Client::builder()
            .connect_timeout(self.settings.connect_timeout)
            .timeout(self.settings.request_timeout)
            .build()
            .map_err(|err| SubmitError::new(FailureKind::Network, err.to_string()))
    }

    fn too_large(&self, actual: u64) -> SubmitError {
        SubmitError::new(
            FailureKind::TooLarge {
                max_bytes: self.settings.max_bytes,
                actual: Some(actual),
            },
            "response too large",
        )
    }
}

#[async_trait::async_trait]
impl Submitter for ReqwestSubmitter {
    async fn submit(&self, request_id: RequestId, body: &Value) -> Result<ScanOutput, SubmitError> {
        let scan_url = self.settings.scan_url()?;
        let encoded = serde_json::to_vec(body)
            .map_err(|err| SubmitError::new(FailureKind::Encode, err.to_string()))?;
        let client = self.build_client()?;

        scan_info!(
            "POST {} request_id={} body_len={}",
            scan_url,
            request_id,
            encoded.len()
        );
        let response = client
            .post(scan_url.clone())
            .header(CONTENT_TYPE, "application/json")
            .body(encoded)
            .send()
            .await
            .map_err(map_reqwest_error)?;

        let status = response.status();
        if !status.is_success() {
            return Err(SubmitError::new(
                FailureKind::HttpStatus(status.as_u16()),
                status.to_string(),
            ));
        }

        if let Some(content_len) = response.content_length() {
            if content_len > self.settings.max_bytes {
                return Err(self.too_large(content_len));
            }
        }

        let content_type = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|value| value.to_str().ok())
            .map(|value| value.to_string());

        let mut bytes = Vec::new();
        let mut stream = response.bytes_stream();
        while let Some(chunk) = stream.next().await {
            let chunk = chunk.map_err(map_reqwest_error)?;
            let next_len = bytes.len() as u64 + chunk.len() as u64;
            if next_len > self.settings.max_bytes {
                return Err(self.too_large(next_len));
            }
            bytes.extend_from_slice(&chunk);
        }
        scan_debug!(
            "request_id={} received {} bytes ({:?})",
            request_id,
            bytes.len(),
            content_type
        );

        let decoded = decode_json(&bytes, content_type.as_deref())
            .map_err(|err| SubmitError::new(FailureKind::Decode, err.to_string()))?;

        Ok(ScanOutput {
            payload: decoded.payload,
            metadata: ResponseMetadata {
                scan_url: scan_url.to_string(),
                status: status.as_u16(),
                content_type,
                encoding_label: decoded.encoding_label,
                byte_len: bytes.len() as u64,
            },
        })
    }
}

fn map_reqwest_error(err: reqwest::Error) -> SubmitError {
    if err.is_timeout() {
        return SubmitError::new(FailureKind::Timeout, err.to_string());
    }
    SubmitError::new(FailureKind::Network, err.to_string())
}
