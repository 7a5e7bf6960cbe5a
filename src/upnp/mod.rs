//! Minimal UPnP plumbing for talking to camera media servers.
//!
//! - `ssdp` - M-SEARCH multicast discovery
//! - `description` - device description parsing
//! - `soap` - ContentDirectory envelopes and replies
//! - `didl` - DIDL-Lite listings
//! - `xml` - small element tree over quick-xml shared by the above
//! - `client` / `discovery` - reqwest-backed implementations of the camera traits

mod client;
pub mod description;
pub mod didl;
mod discovery;
pub mod soap;
pub mod ssdp;
mod xml;

pub use client::UpnpCameraClient;
pub use discovery::UpnpDiscovery;

/// Service type of the ContentDirectory we drive
pub const CONTENT_DIRECTORY_SERVICE: &str = "urn:schemas-upnp-org:service:ContentDirectory:1";
