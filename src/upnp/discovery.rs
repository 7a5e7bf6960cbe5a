use super::{description, ssdp, UpnpCameraClient, CONTENT_DIRECTORY_SERVICE};
use crate::camera::{Camera, CameraDiscovery, CameraFilter, DeviceInfo};
use crate::config::{DiscoveryConfig, SyncConfig};
use crate::error::DiscoveryError;
use async_trait::async_trait;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, warn};

/// SSDP search followed by a description fetch for every answer
pub struct UpnpDiscovery {
    http: reqwest::Client,
    search_target: String,
    filter: CameraFilter,
    request_timeout: Duration,
    chunk_timeout: Duration,
}

impl UpnpDiscovery {
    pub fn new(discovery: &DiscoveryConfig, sync: &SyncConfig) -> Result<Self, DiscoveryError> {
        let http = reqwest::Client::builder()
            .connect_timeout(sync.request_timeout())
            .build()
            .map_err(|e| DiscoveryError::Description {
                location: "<http client>".to_string(),
                details: e.to_string(),
            })?;

        Ok(Self {
            http,
            search_target: discovery.search_target.clone(),
            filter: CameraFilter::from_config(discovery),
            request_timeout: sync.request_timeout(),
            chunk_timeout: sync.chunk_timeout(),
        })
    }

    async fn describe(&self, location: &str) -> Result<DeviceInfo, DiscoveryError> {
        let failed = |e: reqwest::Error| DiscoveryError::Description {
            location: location.to_string(),
            details: e.to_string(),
        };
        let response = self
            .http
            .get(location)
            .timeout(self.request_timeout)
            .send()
            .await
            .map_err(failed)?
            .error_for_status()
            .map_err(failed)?;
        let document = response.text().await.map_err(failed)?;
        description::parse_description(&document, location)
    }

    fn connect(&self, info: DeviceInfo) -> Option<Camera> {
        let endpoint = info.content_directory.clone()?;
        let service_type = if endpoint.service_type.is_empty() {
            CONTENT_DIRECTORY_SERVICE.to_string()
        } else {
            endpoint.service_type
        };
        let client = UpnpCameraClient::new(
            self.http.clone(),
            endpoint.control_url,
            service_type,
            self.request_timeout,
            self.chunk_timeout,
        );
        Some(Camera::new(info, Arc::new(client)))
    }
}

#[async_trait]
impl CameraDiscovery for UpnpDiscovery {
    async fn discover(&self, timeout: Duration) -> Vec<Camera> {
        let responses = match ssdp::search(&self.search_target, timeout).await {
            Ok(responses) => responses,
            Err(e) => {
                warn!("Discovery unavailable, will retry: {}", e);
                return Vec::new();
            }
        };
        debug!("{} SSDP answer(s)", responses.len());

        let mut cameras = Vec::new();
        for response in responses {
            match self.describe(&response.location).await {
                Ok(info) if self.filter.matches(&info) => {
                    if let Some(camera) = self.connect(info) {
                        cameras.push(camera);
                    }
                }
                Ok(info) => debug!(
                    "Ignoring {} ({} {})",
                    info.friendly_name, info.manufacturer, info.model_name
                ),
                Err(e) => debug!("Skipping device: {}", e),
            }
        }

        if !cameras.is_empty() {
            info!("Discovered {} camera(s)", cameras.len());
        }
        cameras
    }
}
