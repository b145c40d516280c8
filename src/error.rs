// SPDX-License-Identifier: MPL-2.0
use std::fmt;

/// Application-level errors.
///
/// Classifier-specific failures (model download, session init, inference)
/// live in [`crate::classifier::ClassifyError`]; this enum covers the
/// surrounding I/O, configuration, and image decoding concerns.
#[derive(Debug, Clone)]
pub enum Error {
    Io(String),
    Config(String),
    /// Input bytes could not be decoded into an image.
    Decode(String),
    /// Camera frame capture failed (device missing, no frame, not built in).
    Capture(String),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::Io(e) => write!(f, "I/O Error: {}", e),
            Error::Config(e) => write!(f, "Config Error: {}", e),
            Error::Decode(e) => write!(f, "Decode Error: {}", e),
            Error::Capture(e) => write!(f, "Capture Error: {}", e),
        }
    }
}

impl std::error::Error for Error {}

impl From<std::io::Error> for Error {
    fn from(err: std::io::Error) -> Self {
        Error::Io(err.to_string())
    }
}

impl From<toml::de::Error> for Error {
    fn from(err: toml::de::Error) -> Self {
        Error::Config(err.to_string())
    }
}

impl From<toml::ser::Error> for Error {
    fn from(err: toml::ser::Error) -> Self {
        Error::Config(err.to_string())
    }
}

impl From<image_rs::ImageError> for Error {
    fn from(err: image_rs::ImageError) -> Self {
        Error::Decode(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_formats_io_error() {
        let err = Error::Io("disk failure".to_string());
        assert_eq!(format!("{}", err), "I/O Error: disk failure");
    }

    #[test]
    fn from_io_error_produces_io_variant() {
        let io_error = std::io::Error::other("boom");
        let err: Error = io_error.into();
        match err {
            Error::Io(message) => assert!(message.contains("boom")),
            _ => panic!("expected Io variant"),
        }
    }

    #[test]
    fn from_image_error_produces_decode_variant() {
        let img_error = image_rs::ImageError::IoError(std::io::Error::other("bad header"));
        let err: Error = img_error.into();
        match err {
            Error::Decode(message) => assert!(message.contains("bad header")),
            _ => panic!("expected Decode variant"),
        }
    }

    #[test]
    fn config_error_formats_properly() {
        let err = Error::Config("bad field".into());
        assert_eq!(format!("{}", err), "Config Error: bad field");
    }

    #[test]
    fn capture_error_formats_properly() {
        let err = Error::Capture("no device".into());
        assert_eq!(format!("{}", err), "Capture Error: no device");
    }
}
