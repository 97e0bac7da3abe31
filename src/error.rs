use thiserror::Error as ThisError;

/// Errors raised while turning a sensor endpoint into characteristic values.
#[derive(ThisError, Debug)]
pub enum SensorError {
    #[error("HTTP request failed: {0}")]
    Network(#[from] reqwest::Error),

    #[error("sensor endpoint returned HTTP {status}")]
    Status { status: u16 },

    #[error("sensor endpoint returned invalid JSON: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("cannot resolve `{path}`: {reason}")]
    Extraction { path: String, reason: String },

    #[error("characteristic {0} is not exposed by this accessory")]
    UnknownCharacteristic(String),
}

impl SensorError {
    /// Whether this error came from fetching the document (as opposed to
    /// reading a value out of it).
    pub fn is_fetch_error(&self) -> bool {
        matches!(
            self,
            SensorError::Network(_) | SensorError::Status { .. } | SensorError::Parse(_)
        )
    }
}

/// Errors raised while loading configuration and assembling the bridge.
#[derive(ThisError, Debug)]
pub enum BridgeError {
    #[error("Failed to read config {path}: {source}")]
    ConfigRead {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid config: {0}")]
    ConfigFormat(#[from] serde_json::Error),

    #[error("Invalid sensor URL for accessory {name}: {url}")]
    InvalidUrl { name: String, url: String },

    #[error("No accessories configured")]
    NoAccessories,

    #[error("No config path given and no platform config directory available")]
    NoConfigDir,

    #[error(transparent)]
    Http(#[from] reqwest::Error),
}

pub type Result<T> = std::result::Result<T, SensorError>;
