pub mod app;
pub mod camera;
pub mod config;
pub mod deletion;
pub mod enumerator;
pub mod error;
pub mod events;
pub mod fetcher;
pub mod media;
pub mod notifier;
pub mod session;
pub mod sync;
pub mod upnp;

#[cfg(test)]
mod testing;

pub use app::{CamdumpOrchestrator, ComponentState, ShutdownReason};
pub use camera::{Camera, CameraClient, CameraDiscovery, CameraId};
pub use config::CamdumpConfig;
pub use error::{CamdumpError, Result};
pub use events::{EventBus, EventFilter, EventMetrics, EventReceiver, SyncEvent};
pub use fetcher::{FetchReceipt, MediaFetcher};
pub use media::{LogicalMediaItem, MediaKind, RemoteObject};
pub use notifier::{CommandExecutor, CompletionNotifier, ShellExecutor};
pub use session::{SessionState, SessionTracker};
pub use sync::{SyncEngine, SyncSettings};
pub use upnp::{UpnpCameraClient, UpnpDiscovery};
