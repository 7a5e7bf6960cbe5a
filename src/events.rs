use crate::error::EventBusError;
use crate::session::FinishReason;
use std::path::PathBuf;
use std::time::SystemTime;
use tokio::sync::broadcast;
use tracing::{debug, info, warn};

/// Progress and failure events emitted by the synchronization engine
#[derive(Debug, Clone)]
pub enum SyncEvent {
    /// A discovery pass completed
    DiscoveryCompleted { cameras: usize },
    /// A camera appeared on the network
    CameraDiscovered { camera: String, location: String },
    /// A camera is no longer answering discovery
    CameraLost { camera: String },
    /// The first Browse page of a pass came back
    EnumerationStarted { camera: String, total: Option<u32> },
    /// Browsing the content directory failed
    EnumerationFailed { camera: String, error: String },
    /// A logical media item was written to the output directory
    MediaFetched {
        camera: String,
        item: String,
        files: Vec<PathBuf>,
        bytes: u64,
    },
    /// A logical media item could not be downloaded
    FetchFailed {
        camera: String,
        item: String,
        error: String,
    },
    /// Remote objects of an item were destroyed on the camera
    MediaDeleted {
        camera: String,
        item: String,
        objects: usize,
    },
    /// DestroyObject failed for one remote object
    DeleteFailed {
        camera: String,
        object_id: String,
        error: String,
    },
    /// A camera session reached a finish event
    SessionFinished {
        camera: String,
        fetched: u32,
        total: Option<u32>,
        reason: FinishReason,
    },
    /// The completion command could not run or exited non-zero
    CommandFailed { camera: String, error: String },
    /// The loop was asked to stop
    ShutdownRequested { reason: String },
}

impl SyncEvent {
    /// Get a human-readable description of the event
    pub fn description(&self) -> String {
        match self {
            SyncEvent::DiscoveryCompleted { cameras } => {
                format!("Discovery found {} camera(s)", cameras)
            }
            SyncEvent::CameraDiscovered { camera, location } => {
                format!("Detected camera {} at {}", camera, location)
            }
            SyncEvent::CameraLost { camera } => format!("Camera {} disappeared", camera),
            SyncEvent::EnumerationStarted { camera, total } => match total {
                Some(total) => format!("{} reports {} media objects", camera, total),
                None => format!("{} did not report a media total", camera),
            },
            SyncEvent::EnumerationFailed { camera, error } => {
                format!("Browsing {} failed: {}", camera, error)
            }
            SyncEvent::MediaFetched {
                camera,
                item,
                files,
                bytes,
            } => format!(
                "Downloaded {} from {} ({} file(s), {} bytes)",
                item,
                camera,
                files.len(),
                bytes
            ),
            SyncEvent::FetchFailed {
                camera,
                item,
                error,
            } => format!("Could not download {} from {}: {}", item, camera, error),
            SyncEvent::MediaDeleted {
                camera,
                item,
                objects,
            } => format!("Deleted {} from {} ({} object(s))", item, camera, objects),
            SyncEvent::DeleteFailed {
                camera,
                object_id,
                error,
            } => format!(
                "Could not delete object {} on {}: {}",
                object_id, camera, error
            ),
            SyncEvent::SessionFinished {
                camera,
                fetched,
                total,
                reason,
            } => format!(
                "Session for {} finished ({:?}): {}/{}",
                camera,
                reason,
                fetched,
                total.map_or_else(|| "-".to_string(), |t| t.to_string())
            ),
            SyncEvent::CommandFailed { camera, error } => {
                format!("Completion command for {} failed: {}", camera, error)
            }
            SyncEvent::ShutdownRequested { reason } => format!("Shutdown requested: {}", reason),
        }
    }

    /// Get the event type as a string for filtering
    pub fn event_type(&self) -> &'static str {
        match self {
            SyncEvent::DiscoveryCompleted { .. } => "discovery_completed",
            SyncEvent::CameraDiscovered { .. } => "camera_discovered",
            SyncEvent::CameraLost { .. } => "camera_lost",
            SyncEvent::EnumerationStarted { .. } => "enumeration_started",
            SyncEvent::EnumerationFailed { .. } => "enumeration_failed",
            SyncEvent::MediaFetched { .. } => "media_fetched",
            SyncEvent::FetchFailed { .. } => "fetch_failed",
            SyncEvent::MediaDeleted { .. } => "media_deleted",
            SyncEvent::DeleteFailed { .. } => "delete_failed",
            SyncEvent::SessionFinished { .. } => "session_finished",
            SyncEvent::CommandFailed { .. } => "command_failed",
            SyncEvent::ShutdownRequested { .. } => "shutdown_requested",
        }
    }

    pub fn is_failure(&self) -> bool {
        matches!(
            self,
            SyncEvent::EnumerationFailed { .. }
                | SyncEvent::FetchFailed { .. }
                | SyncEvent::DeleteFailed { .. }
                | SyncEvent::CommandFailed { .. }
        )
    }
}

/// Broadcast sink for sync events; every published event is also logged
pub struct EventBus {
    sender: broadcast::Sender<SyncEvent>,
}

impl EventBus {
    /// Create a new event bus with the specified channel capacity
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity);
        Self { sender }
    }

    /// Subscribe to events and get a receiver
    pub fn subscribe(&self) -> broadcast::Receiver<SyncEvent> {
        self.sender.subscribe()
    }

    /// Publish an event, returning how many subscribers saw it
    pub fn publish(&self, event: SyncEvent) -> usize {
        match &event {
            SyncEvent::DiscoveryCompleted { .. } | SyncEvent::EnumerationStarted { .. } => {
                debug!("{}", event.description());
            }
            SyncEvent::CameraLost { .. } => warn!("{}", event.description()),
            event if event.is_failure() => warn!("{}", event.description()),
            event => info!("{}", event.description()),
        }

        // No subscribers is fine, the log line above is the default sink
        self.sender.send(event).unwrap_or(0)
    }

    /// Get the number of active subscribers
    pub fn subscriber_count(&self) -> usize {
        self.sender.receiver_count()
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new(256)
    }
}

impl Clone for EventBus {
    fn clone(&self) -> Self {
        Self {
            sender: self.sender.clone(),
        }
    }
}

/// Event filter for selective event handling
#[derive(Debug, Clone)]
pub enum EventFilter {
    /// Accept all events
    All,
    /// Accept only specific event types
    EventTypes(Vec<&'static str>),
    /// Accept events concerning one camera
    Camera(String),
}

impl EventFilter {
    /// Check if an event passes this filter
    pub fn matches(&self, event: &SyncEvent) -> bool {
        match self {
            EventFilter::All => true,
            EventFilter::EventTypes(types) => types.contains(&event.event_type()),
            EventFilter::Camera(name) => event_camera(event) == Some(name.as_str()),
        }
    }
}

fn event_camera(event: &SyncEvent) -> Option<&str> {
    match event {
        SyncEvent::CameraDiscovered { camera, .. }
        | SyncEvent::CameraLost { camera }
        | SyncEvent::EnumerationStarted { camera, .. }
        | SyncEvent::EnumerationFailed { camera, .. }
        | SyncEvent::MediaFetched { camera, .. }
        | SyncEvent::FetchFailed { camera, .. }
        | SyncEvent::MediaDeleted { camera, .. }
        | SyncEvent::DeleteFailed { camera, .. }
        | SyncEvent::SessionFinished { camera, .. }
        | SyncEvent::CommandFailed { camera, .. } => Some(camera),
        SyncEvent::DiscoveryCompleted { .. } | SyncEvent::ShutdownRequested { .. } => None,
    }
}

/// Event receiver with filtering
pub struct EventReceiver {
    receiver: broadcast::Receiver<SyncEvent>,
    filter: EventFilter,
    name: String,
}

impl EventReceiver {
    pub fn new(receiver: broadcast::Receiver<SyncEvent>, filter: EventFilter, name: String) -> Self {
        Self {
            receiver,
            filter,
            name,
        }
    }

    /// Receive the next filtered event
    pub async fn recv(&mut self) -> Result<SyncEvent, EventBusError> {
        loop {
            match self.receiver.recv().await {
                Ok(event) => {
                    if self.filter.matches(&event) {
                        return Ok(event);
                    }
                }
                Err(broadcast::error::RecvError::Lagged(n)) => {
                    warn!("Receiver '{}' lagged behind by {} events", self.name, n);
                    return Err(EventBusError::PublishFailed {
                        details: format!("Receiver lagged behind by {} events", n),
                    });
                }
                Err(broadcast::error::RecvError::Closed) => {
                    debug!("Event bus closed for receiver '{}'", self.name);
                    return Err(EventBusError::ChannelClosed);
                }
            }
        }
    }

    /// Drain every event already queued that passes the filter
    pub fn drain(&mut self) -> Vec<SyncEvent> {
        let mut events = Vec::new();
        loop {
            match self.receiver.try_recv() {
                Ok(event) if self.filter.matches(&event) => events.push(event),
                Ok(_) => {}
                Err(broadcast::error::TryRecvError::Lagged(n)) => {
                    warn!("Receiver '{}' lagged behind by {} events", self.name, n);
                }
                Err(_) => return events,
            }
        }
    }
}

/// Running counters over the event stream, reported at shutdown
#[derive(Debug, Default, Clone)]
pub struct EventMetrics {
    pub total_events: u64,
    pub events_by_type: std::collections::HashMap<&'static str, u64>,
    pub failures: u64,
    pub bytes_fetched: u64,
    pub last_event_time: Option<SystemTime>,
}

impl EventMetrics {
    /// Record an event
    pub fn record_event(&mut self, event: &SyncEvent) {
        self.total_events += 1;
        *self.events_by_type.entry(event.event_type()).or_insert(0) += 1;
        if event.is_failure() {
            self.failures += 1;
        }
        if let SyncEvent::MediaFetched { bytes, .. } = event {
            self.bytes_fetched += bytes;
        }
        self.last_event_time = Some(SystemTime::now());
    }

    pub fn count(&self, event_type: &str) -> u64 {
        self.events_by_type.get(event_type).copied().unwrap_or(0)
    }
}
