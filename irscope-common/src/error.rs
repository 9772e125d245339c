//! Error handling for the IR inspector infrastructure
//! 
//! The inspector core itself never fails; these errors belong to the
//! pieces around it (layout parsing, IR construction, module loading).

use thiserror::Error;

/// Error type shared by the IR model and the driver
#[derive(Error, Debug, Clone, PartialEq)]
pub enum IrError {
    #[error("Invalid data layout '{spec}': {message}")]
    InvalidLayout {
        spec: String,
        message: String,
    },

    #[error("IR builder error: {message}")]
    Builder { message: String },

    #[error("Plugin error: {message}")]
    Plugin { message: String },

    #[error("IO error: {message}")]
    IoError { message: String },

    #[error("Internal error: {message}")]
    InternalError { message: String },
}

impl IrError {
    /// Create a data layout error for the given layout string
    pub fn invalid_layout(spec: &str, message: impl Into<String>) -> Self {
        IrError::InvalidLayout {
            spec: spec.to_string(),
            message: message.into(),
        }
    }

    /// Create a builder error
    pub fn builder(message: impl Into<String>) -> Self {
        IrError::Builder { message: message.into() }
    }
}

/// Convert from std::io::Error
impl From<std::io::Error> for IrError {
    fn from(err: std::io::Error) -> Self {
        IrError::IoError {
            message: err.to_string(),
        }
    }
}

/// Convert from String (for simple error cases)
impl From<String> for IrError {
    fn from(message: String) -> Self {
        IrError::InternalError { message }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_layout_error_message() {
        let err = IrError::invalid_layout("e-q", "unknown specifier 'q'");
        assert_eq!(
            err.to_string(),
            "Invalid data layout 'e-q': unknown specifier 'q'"
        );
    }

    #[test]
    fn test_from_io_error() {
        let io = std::io::Error::new(std::io::ErrorKind::NotFound, "missing.json");
        let err: IrError = io.into();
        assert!(matches!(err, IrError::IoError { ref message } if message.contains("missing.json")));
    }

    #[test]
    fn test_from_string() {
        let err: IrError = "boom".to_string().into();
        assert_eq!(err.to_string(), "Internal error: boom");
    }
}
