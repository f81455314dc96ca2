//! Error types shared across the workspace

use thiserror::Error;

/// Result type alias for shared operations
pub type Result<T> = std::result::Result<T, SumoError>;

/// Main error type for shared sumomine code
#[derive(Error, Debug)]
pub enum SumoError {
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Invalid basho id '{0}': expected YYYYMM")]
    InvalidBashoId(String),

    #[error("Unknown division: {0}")]
    InvalidDivision(String),

    #[error("Unknown banzuke side: {0}")]
    InvalidSide(String),
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    #[test]
    fn test_serde_error_converts() {
        let err: SumoError = serde_json::from_str::<serde_json::Value>("{").unwrap_err().into();
        assert!(matches!(err, SumoError::Serialization(_)));
        assert!(err.to_string().starts_with("Serialization error"));
    }

    #[test]
    fn test_invalid_basho_message() {
        let err = SumoError::InvalidBashoId("202513".to_string());
        assert_eq!(err.to_string(), "Invalid basho id '202513': expected YYYYMM");
    }
}
