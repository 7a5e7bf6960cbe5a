//! Removes fetched media from the camera.

use crate::camera::Camera;
use crate::events::{EventBus, SyncEvent};
use crate::fetcher::FetchReceipt;
use crate::media::LogicalMediaItem;
use tracing::debug;

/// Outcome of deleting one item's remote objects
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DeletionReport {
    pub deleted: Vec<String>,
    pub failed: Vec<String>,
}

impl DeletionReport {
    pub fn deleted_count(&self) -> u32 {
        self.deleted.len() as u32
    }

    pub fn is_complete(&self) -> bool {
        self.failed.is_empty()
    }
}

pub struct DeletionCoordinator {
    event_bus: EventBus,
}

impl DeletionCoordinator {
    pub fn new(event_bus: EventBus) -> Self {
        Self { event_bus }
    }

    /// Issue one DestroyObject per constituent. Requires the receipt of a
    /// completed fetch; failures are reported and never retried here.
    pub async fn delete(
        &self,
        camera: &Camera,
        item: &LogicalMediaItem,
        receipt: &FetchReceipt,
    ) -> DeletionReport {
        debug!(
            "Deleting {} from {} ({} local file(s))",
            item,
            camera.name(),
            receipt.files().len()
        );

        let mut report = DeletionReport::default();
        for object_id in item.object_ids() {
            match camera.client().destroy_object(object_id).await {
                Ok(()) => report.deleted.push(object_id.to_string()),
                Err(e) => {
                    self.event_bus.publish(SyncEvent::DeleteFailed {
                        camera: camera.name().to_string(),
                        object_id: object_id.to_string(),
                        error: e.to_string(),
                    });
                    report.failed.push(object_id.to_string());
                }
            }
        }

        if !report.deleted.is_empty() {
            self.event_bus.publish(SyncEvent::MediaDeleted {
                camera: camera.name().to_string(),
                item: item.to_string(),
                objects: report.deleted.len(),
            });
        }
        report
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fetcher::MediaFetcher;
    use crate::media::group_page;
    use crate::testing::{camera, jpeg, rw2, FakeCamera};
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_deletes_every_constituent() {
        let dir = TempDir::new().unwrap();
        let fake = FakeCamera::new();
        fake.add(jpeg("1", "P1"), b"jpeg");
        fake.add(rw2("2", "P1"), b"raw");
        let cam = camera("GX800", fake.clone());
        let item = group_page(vec![jpeg("1", "P1"), rw2("2", "P1")]).remove(0);
        let receipt = MediaFetcher::new(dir.path(), None, false)
            .fetch(&cam, &item)
            .await
            .unwrap();

        let bus = EventBus::new(16);
        let mut events = bus.subscribe();
        let report = DeletionCoordinator::new(bus).delete(&cam, &item, &receipt).await;

        assert_eq!(report.deleted, vec!["1", "2"]);
        assert!(report.is_complete());
        assert_eq!(fake.destroyed(), vec!["1", "2"]);
        assert!(fake.remaining().is_empty());
        assert!(matches!(
            events.try_recv().unwrap(),
            SyncEvent::MediaDeleted { objects: 2, .. }
        ));
    }

    #[tokio::test]
    async fn test_failed_delete_is_reported_not_fatal() {
        let dir = TempDir::new().unwrap();
        let fake = FakeCamera::new();
        fake.add(jpeg("1", "P1"), b"jpeg");
        fake.add(rw2("2", "P1"), b"raw");
        fake.fail_delete("1");
        let cam = camera("GX800", fake.clone());
        let item = group_page(vec![jpeg("1", "P1"), rw2("2", "P1")]).remove(0);
        let receipt = MediaFetcher::new(dir.path(), None, false)
            .fetch(&cam, &item)
            .await
            .unwrap();

        let bus = EventBus::new(16);
        let mut events = bus.subscribe();
        let report = DeletionCoordinator::new(bus).delete(&cam, &item, &receipt).await;

        assert_eq!(report.failed, vec!["1"]);
        assert_eq!(report.deleted_count(), 1);
        assert_eq!(fake.remaining(), vec!["1"]);
        assert!(matches!(
            events.try_recv().unwrap(),
            SyncEvent::DeleteFailed { ref object_id, .. } if object_id == "1"
        ));
    }
}
