use super::CameraClient;
use std::fmt;
use std::sync::Arc;

/// Stable identity of a camera within one run
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CameraId {
    pub friendly_name: String,
    pub location: String,
}

impl fmt::Display for CameraId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.friendly_name, self.location)
    }
}

/// A UPnP service advertised in a device description
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServiceEndpoint {
    pub service_type: String,
    pub control_url: String,
}

/// Fields of a UPnP device description we care about
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeviceInfo {
    pub friendly_name: String,
    pub location: String,
    pub manufacturer: String,
    pub device_type: String,
    pub model_name: String,
    pub udn: Option<String>,
    pub content_directory: Option<ServiceEndpoint>,
}

impl DeviceInfo {
    pub fn id(&self) -> CameraId {
        CameraId {
            friendly_name: self.friendly_name.clone(),
            location: self.location.clone(),
        }
    }
}

/// A discovered camera together with the client used to talk to it
#[derive(Clone)]
pub struct Camera {
    info: DeviceInfo,
    client: Arc<dyn CameraClient>,
}

impl Camera {
    pub fn new(info: DeviceInfo, client: Arc<dyn CameraClient>) -> Self {
        Self { info, client }
    }

    pub fn id(&self) -> CameraId {
        self.info.id()
    }

    pub fn name(&self) -> &str {
        &self.info.friendly_name
    }

    pub fn info(&self) -> &DeviceInfo {
        &self.info
    }

    pub fn client(&self) -> &dyn CameraClient {
        self.client.as_ref()
    }
}

impl fmt::Debug for Camera {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Camera").field("info", &self.info).finish()
    }
}
