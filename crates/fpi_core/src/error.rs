use thiserror::Error;

/// Fatal initialization failures. The `Display` text is the human-readable
/// error string exposed through `Device::error`.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum InitError {
    #[error("Failed to register window class: {0}")]
    WindowClassRegistration(String),

    #[error("Failed to create window: {0}")]
    WindowCreation(String),

    #[error("Failed to register input device: {0}")]
    InputDeviceRegistration(String),

    #[error("Failed to create graphics context: {0}")]
    GraphicsContext(String),

    #[error("Device was already initialized")]
    AlreadyInitialized,
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file {path}: {source}")]
    Read {
        path: String,
        source: std::io::Error,
    },

    #[error("Failed to parse config file {path}: {source}")]
    Parse {
        path: String,
        source: serde_json::Error,
    },

    #[error("Config validation failed: {0}")]
    Invalid(String),
}

pub const NOT_INITIALIZED: &str = "Device was not initialized.";
