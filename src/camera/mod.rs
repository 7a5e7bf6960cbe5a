mod filter;
mod traits;
mod types;

pub use filter::CameraFilter;
pub use traits::{BrowseRequest, BrowseResponse, CameraClient, CameraDiscovery};
pub use types::{Camera, CameraId, DeviceInfo, ServiceEndpoint};
