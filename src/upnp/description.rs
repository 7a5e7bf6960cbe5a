//! UPnP device description documents.

use super::xml::{self, XmlNode};
use crate::camera::{DeviceInfo, ServiceEndpoint};
use crate::error::DiscoveryError;
use reqwest::Url;

/// Parse a description fetched from `location`.
///
/// The device carrying a ContentDirectory service wins; embedded devices are
/// searched when the root device has none.
pub fn parse_description(document: &str, location: &str) -> Result<DeviceInfo, DiscoveryError> {
    let malformed = |details: String| DiscoveryError::MalformedDescription {
        location: location.to_string(),
        details,
    };

    let root = xml::parse(document).map_err(malformed)?;
    let root_element = root
        .find("root")
        .ok_or_else(|| malformed("missing root element".to_string()))?;
    let root_device = root_element
        .child("device")
        .ok_or_else(|| malformed("missing device element".to_string()))?;

    let base = root_element
        .child_text("URLBase")
        .filter(|base| !base.is_empty())
        .unwrap_or(location);

    let device = find_content_directory_device(root_device).unwrap_or(root_device);
    let content_directory = content_directory_service(device)
        .map(|service| -> Result<ServiceEndpoint, DiscoveryError> {
            let control = service.child_text("controlURL").unwrap_or_default();
            Ok(ServiceEndpoint {
                service_type: service.child_text("serviceType").unwrap_or_default().to_string(),
                control_url: resolve_url(base, control).map_err(malformed)?,
            })
        })
        .transpose()?;

    let text = |name: &str| device.child_text(name).unwrap_or_default().to_string();
    Ok(DeviceInfo {
        friendly_name: text("friendlyName"),
        location: location.to_string(),
        manufacturer: text("manufacturer"),
        device_type: text("deviceType"),
        model_name: text("modelName"),
        udn: device.child_text("UDN").map(str::to_string),
        content_directory,
    })
}

fn content_directory_service(device: &XmlNode) -> Option<&XmlNode> {
    device.child("serviceList")?.children_named("service").find(|service| {
        service
            .child_text("serviceType")
            .map_or(false, |kind| kind.contains(":service:ContentDirectory:"))
    })
}

fn find_content_directory_device(device: &XmlNode) -> Option<&XmlNode> {
    if content_directory_service(device).is_some() {
        return Some(device);
    }
    device
        .child("deviceList")?
        .children_named("device")
        .find_map(find_content_directory_device)
}

/// Resolve a possibly relative URL against the description base
pub fn resolve_url(base: &str, relative: &str) -> Result<String, String> {
    let base = Url::parse(base).map_err(|e| format!("invalid base URL '{}': {}", base, e))?;
    base.join(relative)
        .map(|url| url.to_string())
        .map_err(|e| format!("invalid URL '{}': {}", relative, e))
}
