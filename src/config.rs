use config::{Config, ConfigError, Environment, File};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{debug, info};

/// Largest Browse page we ever request from a camera
pub const MAX_PAGE_SIZE: u32 = 200;

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct CamdumpConfig {
    pub output: OutputConfig,
    pub discovery: DiscoveryConfig,
    pub sync: SyncConfig,
    pub notify: NotifyConfig,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct OutputConfig {
    /// Directory where downloaded media is written
    #[serde(default = "default_output_dir")]
    pub dir: String,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct DiscoveryConfig {
    /// How long each SSDP search waits for answers
    #[serde(default = "default_discovery_timeout_ms")]
    pub timeout_ms: u64,

    /// Pause between two discovery passes
    #[serde(default = "default_poll_interval_ms")]
    pub poll_interval_ms: u64,

    /// SSDP search target sent in M-SEARCH
    #[serde(default = "default_search_target")]
    pub search_target: String,

    /// Required manufacturer (empty accepts any)
    #[serde(default = "default_manufacturer")]
    pub manufacturer: String,

    /// Case-insensitive model name fragment (empty accepts any)
    #[serde(default = "default_model_contains")]
    pub model_contains: String,

    /// Device type fragment, e.g. MediaServer
    #[serde(default = "default_device_type_contains")]
    pub device_type_contains: String,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct SyncConfig {
    /// Objects requested per Browse call
    #[serde(default = "default_page_size")]
    pub page_size: u32,

    /// Container browsed for media
    #[serde(default = "default_root_object_id")]
    pub root_object_id: String,

    /// Extension probed for unlisted RAW siblings of JPEGs (empty disables)
    #[serde(default = "default_raw_sibling_extension")]
    pub raw_sibling_extension: String,

    /// Decode downloaded files before committing them
    #[serde(default = "default_verify_downloads")]
    pub verify_downloads: bool,

    /// Timeout for a single SOAP or description request
    #[serde(default = "default_request_timeout_seconds")]
    pub request_timeout_seconds: u64,

    /// Maximum wait for the next chunk of a download body
    #[serde(default = "default_chunk_timeout_seconds")]
    pub chunk_timeout_seconds: u64,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct NotifyConfig {
    /// Shell command run when a camera session finishes.
    /// `${camera}`, `${n}` and `${total}` are substituted.
    #[serde(default)]
    pub command_after_finish: Option<String>,

    /// Kill the command if it runs longer than this
    #[serde(default = "default_command_timeout_seconds")]
    pub command_timeout_seconds: u64,
}

impl CamdumpConfig {
    /// Load configuration from a specific file path
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let path_str = path.as_ref().to_string_lossy();
        debug!("Loading configuration from: {}", path_str);

        let settings = Config::builder()
            .set_default("output.dir", default_output_dir())?
            .set_default("discovery.timeout_ms", default_discovery_timeout_ms())?
            .set_default("discovery.poll_interval_ms", default_poll_interval_ms())?
            .set_default("discovery.search_target", default_search_target())?
            .set_default("discovery.manufacturer", default_manufacturer())?
            .set_default("discovery.model_contains", default_model_contains())?
            .set_default(
                "discovery.device_type_contains",
                default_device_type_contains(),
            )?
            .set_default("sync.page_size", default_page_size())?
            .set_default("sync.root_object_id", default_root_object_id())?
            .set_default(
                "sync.raw_sibling_extension",
                default_raw_sibling_extension(),
            )?
            .set_default("sync.verify_downloads", default_verify_downloads())?
            .set_default(
                "sync.request_timeout_seconds",
                default_request_timeout_seconds(),
            )?
            .set_default(
                "sync.chunk_timeout_seconds",
                default_chunk_timeout_seconds(),
            )?
            .set_default(
                "notify.command_timeout_seconds",
                default_command_timeout_seconds(),
            )?
            .add_source(File::with_name(&path_str).required(false))
            // CAMDUMP_SYNC__PAGE_SIZE=20 style overrides
            .add_source(Environment::with_prefix("CAMDUMP").separator("__"))
            .build()?;

        let config: CamdumpConfig = settings.try_deserialize()?;

        info!("Configuration loaded successfully");
        debug!("Final configuration: {:#?}", config);

        Ok(config)
    }

    /// Validate configuration values
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.output.dir.trim().is_empty() {
            return Err(ConfigError::Message(
                "Output directory must be set".to_string(),
            ));
        }

        if self.discovery.timeout_ms == 0 {
            return Err(ConfigError::Message(
                "Discovery timeout must be greater than 0".to_string(),
            ));
        }

        if self.sync.page_size == 0 || self.sync.page_size > MAX_PAGE_SIZE {
            return Err(ConfigError::Message(format!(
                "Page size must be between 1 and {}",
                MAX_PAGE_SIZE
            )));
        }

        if self.sync.request_timeout_seconds == 0 || self.sync.chunk_timeout_seconds == 0 {
            return Err(ConfigError::Message(
                "Request and chunk timeouts must be greater than 0".to_string(),
            ));
        }

        if self.notify.command_timeout_seconds == 0 {
            return Err(ConfigError::Message(
                "Command timeout must be greater than 0".to_string(),
            ));
        }

        Ok(())
    }

    pub fn output_dir(&self) -> PathBuf {
        PathBuf::from(&self.output.dir)
    }
}

impl DiscoveryConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }
}

impl SyncConfig {
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_seconds)
    }

    pub fn chunk_timeout(&self) -> Duration {
        Duration::from_secs(self.chunk_timeout_seconds)
    }

    /// RAW sibling extension, `None` when probing is disabled
    pub fn raw_sibling_extension(&self) -> Option<&str> {
        let ext = self.raw_sibling_extension.trim().trim_start_matches('.');
        (!ext.is_empty()).then_some(ext)
    }
}

impl NotifyConfig {
    pub fn command_timeout(&self) -> Duration {
        Duration::from_secs(self.command_timeout_seconds)
    }
}

impl Default for CamdumpConfig {
    fn default() -> Self {
        Self {
            output: OutputConfig {
                dir: default_output_dir(),
            },
            discovery: DiscoveryConfig {
                timeout_ms: default_discovery_timeout_ms(),
                poll_interval_ms: default_poll_interval_ms(),
                search_target: default_search_target(),
                manufacturer: default_manufacturer(),
                model_contains: default_model_contains(),
                device_type_contains: default_device_type_contains(),
            },
            sync: SyncConfig {
                page_size: default_page_size(),
                root_object_id: default_root_object_id(),
                raw_sibling_extension: default_raw_sibling_extension(),
                verify_downloads: default_verify_downloads(),
                request_timeout_seconds: default_request_timeout_seconds(),
                chunk_timeout_seconds: default_chunk_timeout_seconds(),
            },
            notify: NotifyConfig {
                command_after_finish: None,
                command_timeout_seconds: default_command_timeout_seconds(),
            },
        }
    }
}

// Default value functions
fn default_output_dir() -> String {
    String::new()
}

fn default_discovery_timeout_ms() -> u64 {
    1000
}
fn default_poll_interval_ms() -> u64 {
    1000
}
fn default_search_target() -> String {
    "urn:schemas-upnp-org:service:ContentDirectory:1".to_string()
}
fn default_manufacturer() -> String {
    "Panasonic".to_string()
}
fn default_model_contains() -> String {
    "lumix".to_string()
}
fn default_device_type_contains() -> String {
    "MediaServer".to_string()
}

fn default_page_size() -> u32 {
    50
}
fn default_root_object_id() -> String {
    "0".to_string()
}
fn default_raw_sibling_extension() -> String {
    "RW2".to_string()
}
fn default_verify_downloads() -> bool {
    true
}
fn default_request_timeout_seconds() -> u64 {
    10
}
fn default_chunk_timeout_seconds() -> u64 {
    30
}

fn default_command_timeout_seconds() -> u64 {
    300
}
