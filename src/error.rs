use crate::types::DeviceId;
use bytes::Bytes;
use thiserror::Error;

/// Result type for Roku operations
pub type Result<T> = std::result::Result<T, RokuError>;

/// Errors that can occur when talking to a Roku device
#[derive(Error, Debug)]
pub enum RokuError {
    /// Unknown command or sensor name, a key the device does not support,
    /// or arguments that do not fit the command
    #[error("Unsupported command: {0}")]
    UnsupportedCommand(String),

    /// Device answered with a status other than 200
    #[error("Protocol error: HTTP {status}: {}", String::from_utf8_lossy(.body))]
    Protocol {
        /// HTTP status code returned by the device
        status: u16,
        /// Raw response body
        body: Bytes,
    },

    /// Argument outside of the accepted set (touch op, TV input)
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// Application was reported by a different device
    #[error("Application {app} belongs to {owner}, not {device}")]
    CrossDevice {
        /// Application id
        app: String,
        /// Device that reported the application
        owner: DeviceId,
        /// Device the operation was attempted on
        device: DeviceId,
    },

    /// HTTP transport error
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// XML deserialization error
    #[error("XML error: {0}")]
    Xml(#[from] quick_xml::de::DeError),

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Response was well-formed but lacked an expected field
    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    /// Device location could not be parsed
    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),
}
