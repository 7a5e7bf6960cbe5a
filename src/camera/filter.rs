use super::DeviceInfo;
use crate::config::DiscoveryConfig;

/// Decides which media servers are cameras we should empty
#[derive(Debug, Clone)]
pub struct CameraFilter {
    manufacturer: Option<String>,
    model_contains: Option<String>,
    device_type_contains: String,
}

impl CameraFilter {
    pub fn from_config(config: &DiscoveryConfig) -> Self {
        let non_empty = |value: &str| {
            let value = value.trim();
            (!value.is_empty()).then(|| value.to_string())
        };
        Self {
            manufacturer: non_empty(&config.manufacturer),
            model_contains: non_empty(&config.model_contains).map(|m| m.to_lowercase()),
            device_type_contains: config.device_type_contains.trim().to_string(),
        }
    }

    /// Accept every device that exposes a ContentDirectory
    pub fn any_media_server() -> Self {
        Self {
            manufacturer: None,
            model_contains: None,
            device_type_contains: String::new(),
        }
    }

    pub fn matches(&self, device: &DeviceInfo) -> bool {
        if device.content_directory.is_none() {
            return false;
        }
        if !device.device_type.contains(&self.device_type_contains) {
            return false;
        }
        if let Some(manufacturer) = &self.manufacturer {
            if &device.manufacturer != manufacturer {
                return false;
            }
        }
        if let Some(model) = &self.model_contains {
            if !device.model_name.to_lowercase().contains(model) {
                return false;
            }
        }
        true
    }
}
