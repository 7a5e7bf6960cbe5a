use super::Camera;
use crate::error::{ContentDirectoryError, FetchError};
use async_trait::async_trait;
use std::time::Duration;
use tokio::io::AsyncWrite;

/// Arguments of a ContentDirectory `Browse` action. Only direct children
/// are ever listed, so `BrowseFlag` is fixed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BrowseRequest {
    pub object_id: String,
    pub filter: String,
    pub starting_index: u32,
    pub requested_count: u32,
    pub sort_criteria: String,
}

impl BrowseRequest {
    /// List the children of `object_id`, all properties, device order
    pub fn direct_children<S: Into<String>>(
        object_id: S,
        starting_index: u32,
        requested_count: u32,
    ) -> Self {
        Self {
            object_id: object_id.into(),
            filter: "*".to_string(),
            starting_index,
            requested_count,
            sort_criteria: String::new(),
        }
    }
}

/// Typed `Browse` reply
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BrowseResponse {
    /// DIDL-Lite document listing the returned objects
    pub result: String,
    pub number_returned: u32,
    pub total_matches: u32,
    pub update_id: Option<u32>,
}

/// Control surface of one camera's media server
#[async_trait]
pub trait CameraClient: Send + Sync {
    async fn browse(&self, request: &BrowseRequest) -> Result<BrowseResponse, ContentDirectoryError>;

    async fn destroy_object(&self, object_id: &str) -> Result<(), ContentDirectoryError>;

    /// Stream the resource at `url` into `sink`, returning the byte count
    async fn download(
        &self,
        url: &str,
        sink: &mut (dyn AsyncWrite + Unpin + Send),
    ) -> Result<u64, FetchError>;
}

/// Source of cameras currently reachable on the network
#[async_trait]
pub trait CameraDiscovery: Send + Sync {
    /// Never fails: an unreachable network yields an empty list
    async fn discover(&self, timeout: Duration) -> Vec<Camera>;
}
