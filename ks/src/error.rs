//! KvStore error types

use thiserror::Error;

/// Errors from document store operations
#[derive(Debug, Error)]
pub enum KvError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to serialize document '{key}': {source}")]
    Serialize {
        key: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("Failed to parse document '{key}': {source}")]
    Deserialize {
        key: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("Invalid key '{0}': only ASCII letters, digits, '-' and '_' are allowed")]
    InvalidKey(String),
}

pub type KvResult<T> = Result<T, KvError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invalid_key_message() {
        let err = KvError::InvalidKey("../etc".to_string());
        let msg = err.to_string();
        assert!(msg.contains("../etc"));
        assert!(msg.contains("ASCII"));
    }

    #[test]
    fn test_deserialize_message_names_key() {
        let source = serde_json::from_str::<Vec<u8>>("not json").unwrap_err();
        let err = KvError::Deserialize {
            key: "requests".to_string(),
            source,
        };
        assert!(err.to_string().contains("'requests'"));
    }
}
