//! Deletion-aware paging over a camera's ContentDirectory.
//!
//! Deleting an object shifts every later object down by one index, so the
//! next page starts at `consumed - deleted` rather than `consumed`.


use crate::camera::{BrowseRequest, CameraClient};
use crate::error::ContentDirectoryError;
use crate::media::{group_page, LogicalMediaItem};
use crate::upnp::didl::parse_didl;
use tracing::{debug, trace};

pub struct ContentEnumerator<'a> {
    client: &'a dyn CameraClient,
    root_object_id: String,
    page_size: u32,
    consumed: u32,
    deleted: u32,
    total: Option<u32>,
    exhausted: bool,
}

impl<'a> ContentEnumerator<'a> {
    pub fn new<S: Into<String>>(client: &'a dyn CameraClient, root_object_id: S, page_size: u32) -> Self {
        Self {
            client,
            root_object_id: root_object_id.into(),
            page_size: page_size.max(1),
            consumed: 0,
            deleted: 0,
            total: None,
            exhausted: false,
        }
    }

    /// `TotalMatches` of the first page, if one was read
    pub fn total(&self) -> Option<u32> {
        self.total
    }

    /// Index of the next page's first object
    pub fn next_index(&self) -> u32 {
        self.consumed.saturating_sub(self.deleted)
    }

    /// Record objects removed from the listing since the last page
    pub fn note_deleted(&mut self, count: u32) {
        self.deleted = self.deleted.saturating_add(count);
    }

    /// Fetch and group the next page; `Ok(None)` once the listing is exhausted
    pub async fn next_page(
        &mut self,
    ) -> Result<Option<Vec<LogicalMediaItem>>, ContentDirectoryError> {
        if self.exhausted {
            return Ok(None);
        }

        let start = self.next_index();
        let request = BrowseRequest::direct_children(&self.root_object_id, start, self.page_size);
        let response = self.client.browse(&request).await?;

        if self.total.is_none() {
            self.total = Some(response.total_matches);
        }

        let objects = parse_didl(&response.result)
            .map_err(|e| ContentDirectoryError::malformed("Browse", e))?;
        let returned = response.number_returned;
        trace!(
            "Browse {}+{} returned {} of {} ({} media objects)",
            start,
            self.page_size,
            returned,
            response.total_matches,
            objects.len()
        );

        self.consumed = self.consumed.saturating_add(returned);
        if returned == 0
            || returned < self.page_size
            || start.saturating_add(returned) >= response.total_matches
        {
            debug!("Listing exhausted at index {}", start.saturating_add(returned));
            self.exhausted = true;
        }

        if returned == 0 {
            return Ok(None);
        }
        Ok(Some(group_page(objects)))
    }
}
