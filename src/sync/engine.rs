use crate::camera::{Camera, CameraDiscovery, CameraId};
use crate::config::CamdumpConfig;
use crate::deletion::DeletionCoordinator;
use crate::enumerator::ContentEnumerator;
use crate::events::{EventBus, SyncEvent};
use crate::fetcher::{FetchReceipt, MediaFetcher};
use crate::media::LogicalMediaItem;
use crate::notifier::CompletionNotifier;
use crate::session::{FinishReason, ItemStatus, SessionTracker};
use std::sync::Arc;
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

/// Loop timing and Browse parameters
#[derive(Debug, Clone)]
pub struct SyncSettings {
    pub discovery_timeout: Duration,
    pub poll_interval: Duration,
    pub page_size: u32,
    pub root_object_id: String,
}

impl SyncSettings {
    pub fn from_config(config: &CamdumpConfig) -> Self {
        Self {
            discovery_timeout: config.discovery.timeout(),
            poll_interval: config.discovery.poll_interval(),
            page_size: config.sync.page_size,
            root_object_id: config.sync.root_object_id.clone(),
        }
    }
}

impl Default for SyncSettings {
    fn default() -> Self {
        Self {
            discovery_timeout: Duration::from_secs(1),
            poll_interval: Duration::from_secs(1),
            page_size: 50,
            root_object_id: "0".to_string(),
        }
    }
}

/// How one sweep over a camera's listing ended
enum Sweep {
    /// Unseen items were handled; the listing is worth another look
    Progress,
    Finished(FinishReason),
}

/// Drives discovery and per-camera fetch/delete/notify until cancelled
pub struct SyncEngine {
    discovery: Arc<dyn CameraDiscovery>,
    fetcher: MediaFetcher,
    deleter: DeletionCoordinator,
    sessions: SessionTracker,
    notifier: CompletionNotifier,
    event_bus: EventBus,
    settings: SyncSettings,
}

impl SyncEngine {
    pub fn new(
        discovery: Arc<dyn CameraDiscovery>,
        fetcher: MediaFetcher,
        notifier: CompletionNotifier,
        event_bus: EventBus,
        settings: SyncSettings,
    ) -> Self {
        Self {
            discovery,
            fetcher,
            deleter: DeletionCoordinator::new(event_bus.clone()),
            sessions: SessionTracker::new(),
            notifier,
            event_bus,
            settings,
        }
    }

    pub fn sessions(&self) -> &SessionTracker {
        &self.sessions
    }

    pub fn event_bus(&self) -> &EventBus {
        &self.event_bus
    }

    /// Poll until `cancel` fires. The item being transferred when the
    /// token is cancelled is finished first.
    pub async fn run(&self, cancel: CancellationToken) {
        info!(
            "Sync loop started (poll every {:?}, output {})",
            self.settings.poll_interval,
            self.fetcher.output_dir().display()
        );

        loop {
            self.run_pass(&cancel).await;

            tokio::select! {
                _ = cancel.cancelled() => break,
                _ = tokio::time::sleep(self.settings.poll_interval) => {}
            }
        }

        info!("Sync loop stopped");
    }

    /// One discovery pass followed by servicing every camera found
    pub async fn run_pass(&self, cancel: &CancellationToken) {
        let cameras = tokio::select! {
            biased;
            _ = cancel.cancelled() => return,
            cameras = self.discovery.discover(self.settings.discovery_timeout) => cameras,
        };
        self.event_bus.publish(SyncEvent::DiscoveryCompleted {
            cameras: cameras.len(),
        });

        let ids: Vec<CameraId> = cameras.iter().map(Camera::id).collect();
        let presence = self.sessions.reconcile(&ids);
        for id in presence.appeared {
            self.event_bus.publish(SyncEvent::CameraDiscovered {
                camera: id.friendly_name,
                location: id.location,
            });
        }
        for id in presence.lost {
            self.event_bus.publish(SyncEvent::CameraLost {
                camera: id.friendly_name,
            });
        }

        for camera in &cameras {
            if cancel.is_cancelled() {
                info!("Interrupted, leaving remaining cameras for later");
                return;
            }
            self.service_camera(camera, cancel).await;
        }
    }

    /// Sweep the camera's listing until nothing new turns up, then raise
    /// the session's finish event if this round produced one
    async fn service_camera(&self, camera: &Camera, cancel: &CancellationToken) {
        let id = camera.id();
        debug!("Servicing {}", id);
        self.sessions.begin_pass(&id);

        let reason = loop {
            match self.sweep(camera, &id, cancel).await {
                Sweep::Progress => continue,
                Sweep::Finished(reason) => break reason,
            }
        };

        if let Some(event) = self.sessions.end_pass(&id, reason) {
            self.event_bus.publish(SyncEvent::SessionFinished {
                camera: event.camera.clone(),
                fetched: event.fetched,
                total: event.total,
                reason: event.reason,
            });
            self.notifier
                .notify(&event.camera, event.fetched, event.total)
                .await;
            self.sessions.mark_done(&id);
        }
    }

    async fn sweep(&self, camera: &Camera, id: &CameraId, cancel: &CancellationToken) -> Sweep {
        let mut enumerator = ContentEnumerator::new(
            camera.client(),
            self.settings.root_object_id.as_str(),
            self.settings.page_size,
        );
        let mut announced = false;
        let mut unseen = 0usize;

        loop {
            if cancel.is_cancelled() {
                return Sweep::Finished(FinishReason::Interrupted);
            }

            let page = enumerator.next_page().await;
            if !announced {
                if let Some(total) = enumerator.total() {
                    self.sessions.record_total(id, total);
                    self.event_bus.publish(SyncEvent::EnumerationStarted {
                        camera: camera.name().to_string(),
                        total: Some(total),
                    });
                    announced = true;
                }
            }

            let items = match page {
                Ok(Some(items)) => items,
                Ok(None) => break,
                Err(e) => {
                    self.event_bus.publish(SyncEvent::EnumerationFailed {
                        camera: camera.name().to_string(),
                        error: e.to_string(),
                    });
                    return Sweep::Finished(FinishReason::EnumerationFailed);
                }
            };

            for item in items {
                if cancel.is_cancelled() {
                    return Sweep::Finished(FinishReason::Interrupted);
                }
                match self.sessions.classify(id, &item) {
                    ItemStatus::Persisted(receipt) => {
                        debug!("{} already saved, retrying delete", item);
                        self.delete(camera, id, &item, &receipt, &mut enumerator).await;
                    }
                    ItemStatus::Failed => {
                        self.transfer(camera, id, &item, &mut enumerator).await;
                    }
                    ItemStatus::Unseen => {
                        unseen += 1;
                        self.transfer(camera, id, &item, &mut enumerator).await;
                    }
                }
            }
        }

        if unseen > 0 {
            Sweep::Progress
        } else {
            Sweep::Finished(FinishReason::Idle)
        }
    }

    /// Fetch then delete one item. Delete only ever follows a successful fetch.
    async fn transfer(
        &self,
        camera: &Camera,
        id: &CameraId,
        item: &LogicalMediaItem,
        enumerator: &mut ContentEnumerator<'_>,
    ) {
        match self.fetcher.fetch(camera, item).await {
            Ok(receipt) => {
                self.event_bus.publish(SyncEvent::MediaFetched {
                    camera: camera.name().to_string(),
                    item: item.to_string(),
                    files: receipt.files().to_vec(),
                    bytes: receipt.bytes(),
                });
                self.sessions.record_fetched(id, item, receipt.clone());
                self.delete(camera, id, item, &receipt, enumerator).await;
            }
            Err(e) => {
                self.sessions.record_failed(id, item);
                self.event_bus.publish(SyncEvent::FetchFailed {
                    camera: camera.name().to_string(),
                    item: item.to_string(),
                    error: e.to_string(),
                });
            }
        }
    }

    async fn delete(
        &self,
        camera: &Camera,
        id: &CameraId,
        item: &LogicalMediaItem,
        receipt: &FetchReceipt,
        enumerator: &mut ContentEnumerator<'_>,
    ) {
        let report = self.deleter.delete(camera, item, receipt).await;
        self.sessions.record_deleted(id, &report.deleted);
        enumerator.note_deleted(report.deleted_count());
    }
}
