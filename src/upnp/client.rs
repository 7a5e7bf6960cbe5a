use super::soap;
use crate::camera::{BrowseRequest, BrowseResponse, CameraClient};
use crate::error::{ContentDirectoryError, FetchError};
use async_trait::async_trait;
use reqwest::header::CONTENT_TYPE;
use std::time::Duration;
use tokio::io::{AsyncWrite, AsyncWriteExt};
use tokio::time::timeout;
use tracing::{debug, trace};

/// ContentDirectory control plus plain HTTP downloads against one camera
#[derive(Debug, Clone)]
pub struct UpnpCameraClient {
    http: reqwest::Client,
    control_url: String,
    service_type: String,
    request_timeout: Duration,
    chunk_timeout: Duration,
}

impl UpnpCameraClient {
    pub fn new(
        http: reqwest::Client,
        control_url: String,
        service_type: String,
        request_timeout: Duration,
        chunk_timeout: Duration,
    ) -> Self {
        Self {
            http,
            control_url,
            service_type,
            request_timeout,
            chunk_timeout,
        }
    }

    async fn call(
        &self,
        action: &str,
        arguments: &[(&str, String)],
    ) -> Result<String, ContentDirectoryError> {
        let transport = |e: reqwest::Error| ContentDirectoryError::Transport {
            action: action.to_string(),
            details: e.to_string(),
        };

        trace!("SOAP {} -> {}", action, self.control_url);
        let response = self
            .http
            .post(&self.control_url)
            .timeout(self.request_timeout)
            .header(CONTENT_TYPE, "text/xml; charset=\"utf-8\"")
            .header("SOAPACTION", soap::soap_action_header(action, &self.service_type))
            .body(soap::envelope(action, &self.service_type, arguments))
            .send()
            .await
            .map_err(transport)?;

        let status = response.status();
        let body = response.text().await.map_err(transport)?;

        if !status.is_success() {
            return Err(match soap::parse_fault(&body) {
                Some((code, description)) => ContentDirectoryError::Fault {
                    action: action.to_string(),
                    code,
                    description,
                },
                None => ContentDirectoryError::Status {
                    action: action.to_string(),
                    status: status.as_u16(),
                },
            });
        }

        Ok(body)
    }
}

#[async_trait]
impl CameraClient for UpnpCameraClient {
    async fn browse(&self, request: &BrowseRequest) -> Result<BrowseResponse, ContentDirectoryError> {
        let body = self.call("Browse", &soap::browse_arguments(request)).await?;
        soap::parse_browse_response(&body)
    }

    async fn destroy_object(&self, object_id: &str) -> Result<(), ContentDirectoryError> {
        let body = self
            .call("DestroyObject", &[("ObjectID", object_id.to_string())])
            .await?;
        soap::expect_action_response(&body, "DestroyObject")
    }

    async fn download(
        &self,
        url: &str,
        sink: &mut (dyn AsyncWrite + Unpin + Send),
    ) -> Result<u64, FetchError> {
        let transport = |e: reqwest::Error| FetchError::Transport {
            url: url.to_string(),
            details: e.to_string(),
        };
        let stalled = |limit: Duration| FetchError::Timeout {
            url: url.to_string(),
            seconds: limit.as_secs(),
        };

        let mut response = timeout(self.request_timeout, self.http.get(url).send())
            .await
            .map_err(|_| stalled(self.request_timeout))?
            .map_err(transport)?;

        if !response.status().is_success() {
            return Err(FetchError::Status {
                url: url.to_string(),
                status: response.status().as_u16(),
            });
        }

        let mut written = 0u64;
        loop {
            let chunk = timeout(self.chunk_timeout, response.chunk())
                .await
                .map_err(|_| stalled(self.chunk_timeout))?
                .map_err(transport)?;
            let Some(chunk) = chunk else {
                break;
            };
            sink.write_all(&chunk)
                .await
                .map_err(|source| FetchError::Write {
                    url: url.to_string(),
                    source,
                })?;
            written += chunk.len() as u64;
        }

        debug!("Downloaded {} bytes from {}", written, url);
        Ok(written)
    }
}
