use thiserror::Error;

#[derive(Error, Debug)]
pub enum CamdumpError {
    #[error("Configuration error: {0}")]
    Config(#[from] config::ConfigError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] toml::ser::Error),

    #[error("Discovery error: {0}")]
    Discovery(#[from] DiscoveryError),

    #[error("Content directory error: {0}")]
    ContentDirectory(#[from] ContentDirectoryError),

    #[error("Fetch error: {0}")]
    Fetch(#[from] FetchError),

    #[error("System error: {message}")]
    System { message: String },
}

impl CamdumpError {
    pub fn system<S: Into<String>>(message: S) -> Self {
        Self::System {
            message: message.into(),
        }
    }
}

/// Errors raised while searching the network for devices
#[derive(Error, Debug)]
pub enum DiscoveryError {
    #[error("Network unavailable: {0}")]
    Network(#[from] std::io::Error),

    #[error("Failed to fetch device description from {location}: {details}")]
    Description { location: String, details: String },

    #[error("Malformed device description at {location}: {details}")]
    MalformedDescription { location: String, details: String },
}

/// Errors raised by ContentDirectory SOAP actions
#[derive(Error, Debug)]
pub enum ContentDirectoryError {
    #[error("Transport failure calling {action}: {details}")]
    Transport { action: String, details: String },

    #[error("{action} returned HTTP {status}")]
    Status { action: String, status: u16 },

    #[error("{action} failed with UPnP error {code}: {description}")]
    Fault {
        action: String,
        code: u32,
        description: String,
    },

    #[error("Malformed {action} response: {details}")]
    Malformed { action: String, details: String },
}

impl ContentDirectoryError {
    pub fn malformed<A: Into<String>, D: Into<String>>(action: A, details: D) -> Self {
        Self::Malformed {
            action: action.into(),
            details: details.into(),
        }
    }
}

/// Errors raised while transferring a media item to the output directory
#[derive(Error, Debug)]
pub enum FetchError {
    #[error("Transport failure downloading {url}: {details}")]
    Transport { url: String, details: String },

    #[error("Download of {url} returned HTTP {status}")]
    Status { url: String, status: u16 },

    #[error("Download of {url} stalled for {seconds}s")]
    Timeout { url: String, seconds: u64 },

    #[error("Failed writing {url} to its staging file: {source}")]
    Write {
        url: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Filesystem error on {path}: {source}")]
    Filesystem {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Verification failed for {file}: {details}")]
    Verification { file: String, details: String },

    #[error("Media object {object_id} has no downloadable resource")]
    NoResource { object_id: String },
}

impl FetchError {
    pub fn filesystem<P: AsRef<std::path::Path>>(path: P, source: std::io::Error) -> Self {
        Self::Filesystem {
            path: path.as_ref().display().to_string(),
            source,
        }
    }

    /// True for errors where the server answered but refused the resource
    pub fn is_status(&self) -> bool {
        matches!(self, Self::Status { .. })
    }
}

#[derive(Error, Debug)]
pub enum EventBusError {
    #[error("Failed to publish event: {details}")]
    PublishFailed { details: String },

    #[error("Event bus channel closed")]
    ChannelClosed,
}

pub type Result<T> = std::result::Result<T, CamdumpError>;
