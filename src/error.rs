use std::fmt::{self, Debug, Display};
use std::io;

/// Provides `GeoSpreadError` and maps other errors to
/// convert to a `GeoSpreadError`
#[derive(Debug)]
#[allow(clippy::module_name_repetitions)]
pub enum GeoSpreadError {
    IoError(io::Error),
    JsonError(serde_json::Error),
    InvalidArgument(String),
    GeoSpreadError(String),
}

impl From<io::Error> for GeoSpreadError {
    fn from(error: io::Error) -> Self {
        GeoSpreadError::IoError(error)
    }
}

impl From<serde_json::Error> for GeoSpreadError {
    fn from(error: serde_json::Error) -> Self {
        GeoSpreadError::JsonError(error)
    }
}

impl From<String> for GeoSpreadError {
    fn from(error: String) -> Self {
        GeoSpreadError::GeoSpreadError(error)
    }
}

impl From<&str> for GeoSpreadError {
    fn from(error: &str) -> Self {
        GeoSpreadError::GeoSpreadError(error.to_string())
    }
}

impl std::error::Error for GeoSpreadError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            GeoSpreadError::IoError(error) => Some(error),
            GeoSpreadError::JsonError(error) => Some(error),
            _ => None,
        }
    }
}

impl Display for GeoSpreadError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            GeoSpreadError::IoError(error) => write!(f, "Error: {error}"),
            GeoSpreadError::JsonError(error) => write!(f, "Error: invalid config: {error}"),
            GeoSpreadError::InvalidArgument(message) | GeoSpreadError::GeoSpreadError(message) => {
                write!(f, "Error: {message}")
            }
        }
    }
}
