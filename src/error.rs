use std::path::PathBuf;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, ConnectionManagerError>;

#[derive(Debug, Error)]
pub enum ConnectionManagerError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Config error in {}: {source}", path.display())]
    Config {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Script error on line {line}: {message}")]
    Script { line: usize, message: String },

    #[error("Error: {0}")]
    Generic(String),
}

impl From<String> for ConnectionManagerError {
    fn from(error: String) -> Self {
        ConnectionManagerError::Generic(error)
    }
}

impl From<&str> for ConnectionManagerError {
    fn from(error: &str) -> Self {
        ConnectionManagerError::Generic(error.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generic_from_str() {
        let err: ConnectionManagerError = "boom".into();
        assert_eq!(err.to_string(), "Error: boom");
    }

    #[test]
    fn test_script_error_display() {
        let err = ConnectionManagerError::Script {
            line: 3,
            message: "Unknown key: f13".to_string(),
        };
        assert_eq!(err.to_string(), "Script error on line 3: Unknown key: f13");
    }

    #[test]
    fn test_io_error_conversion() {
        let io = std::io::Error::new(std::io::ErrorKind::NotFound, "missing");
        let err = ConnectionManagerError::from(io);
        assert!(matches!(err, ConnectionManagerError::Io(_)));
        assert!(err.to_string().starts_with("IO error"));
    }
}
