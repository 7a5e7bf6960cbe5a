use super::types::{ComponentState, ShutdownReason};
use crate::config::CamdumpConfig;
use crate::error::Result;
use crate::events::{EventBus, EventMetrics};
use crate::fetcher::MediaFetcher;
use crate::notifier::{CompletionNotifier, ShellExecutor};
use crate::sync::{SyncEngine, SyncSettings};
use crate::upnp::UpnpDiscovery;
use parking_lot::Mutex as SyncMutex;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::{oneshot, Mutex};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::debug;

const EVENT_BUS_CAPACITY: usize = 1024;

/// Owns the sync engine and the background tasks around it
pub struct CamdumpOrchestrator {
    pub(super) config: CamdumpConfig,
    pub(super) event_bus: EventBus,
    pub(super) engine: Arc<SyncEngine>,

    // Background tasks
    pub(super) sync_task: Option<JoinHandle<()>>,
    pub(super) metrics_task: Option<JoinHandle<EventMetrics>>,
    pub(super) final_metrics: Option<EventMetrics>,

    // Lifecycle management
    pub(super) component_states: Arc<SyncMutex<HashMap<&'static str, ComponentState>>>,
    pub(super) shutdown_sender: Arc<Mutex<Option<oneshot::Sender<ShutdownReason>>>>,
    pub(super) shutdown_receiver: Option<oneshot::Receiver<ShutdownReason>>,
    pub(super) cancellation_token: CancellationToken,
    pub(super) sync_token: CancellationToken,
}

impl CamdumpOrchestrator {
    /// Build the UPnP discovery, fetcher and notifier described by `config`
    pub fn new(config: CamdumpConfig) -> Result<Self> {
        let event_bus = EventBus::new(EVENT_BUS_CAPACITY);

        let discovery = UpnpDiscovery::new(&config.discovery, &config.sync)?;
        let notifier = CompletionNotifier::new(
            config.notify.command_after_finish.clone(),
            Arc::new(ShellExecutor::new(config.notify.command_timeout())),
            event_bus.clone(),
        );
        let engine = SyncEngine::new(
            Arc::new(discovery),
            MediaFetcher::from_config(&config),
            notifier,
            event_bus.clone(),
            SyncSettings::from_config(&config),
        );

        Ok(Self::with_engine(config, engine))
    }

    /// Wrap an already assembled engine. The engine must publish on the bus
    /// it was built with; that bus is reused here.
    pub fn with_engine(config: CamdumpConfig, engine: SyncEngine) -> Self {
        let event_bus = engine.event_bus().clone();
        let (shutdown_sender, shutdown_receiver) = oneshot::channel();
        let cancellation_token = CancellationToken::new();
        let sync_token = cancellation_token.child_token();

        Self {
            config,
            event_bus,
            engine: Arc::new(engine),
            sync_task: None,
            metrics_task: None,
            final_metrics: None,
            component_states: Arc::new(SyncMutex::new(HashMap::new())),
            shutdown_sender: Arc::new(Mutex::new(Some(shutdown_sender))),
            shutdown_receiver: Some(shutdown_receiver),
            cancellation_token,
            sync_token,
        }
    }

    pub fn event_bus(&self) -> &EventBus {
        &self.event_bus
    }

    pub fn engine(&self) -> &SyncEngine {
        &self.engine
    }

    /// Counters collected over the run, available after shutdown
    pub fn metrics(&self) -> Option<&EventMetrics> {
        self.final_metrics.as_ref()
    }

    /// Ask a running orchestrator to stop. Only the first request counts.
    pub async fn request_shutdown(&self, reason: ShutdownReason) -> bool {
        match self.shutdown_sender.lock().await.take() {
            Some(sender) => sender.send(reason).is_ok(),
            None => false,
        }
    }

    pub(super) fn set_component_state(&self, component: &'static str, state: ComponentState) {
        self.component_states.lock().insert(component, state);
        debug!("Component '{}' state changed to: {:?}", component, state);
    }

    pub fn component_state(&self, component: &str) -> Option<ComponentState> {
        self.component_states.lock().get(component).copied()
    }

    pub fn component_states(&self) -> HashMap<&'static str, ComponentState> {
        self.component_states.lock().clone()
    }
}
