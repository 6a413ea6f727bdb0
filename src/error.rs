use thiserror::Error;

/// Shown whenever no usable storage connection string could be found.
pub const MISSING_CONNECTION_STRING_MESSAGE: &str =
    "A connection string has not been defined in the system environment variables. \
     Add a environment variable named 'storageconnectionstring' with your storage \
     connection string as a value.";

/// Main error type for quickblob operations
#[derive(Debug, Error)]
pub enum QuickblobError {
    #[error("{}", MISSING_CONNECTION_STRING_MESSAGE)]
    MissingConnectionString,

    #[error("{} ({detail})", MISSING_CONNECTION_STRING_MESSAGE)]
    InvalidConnectionString { detail: String },

    #[error("Error returned from the service: {0}")]
    ServiceError(String),

    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("Failed to get user input: {0}")]
    InputError(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),

    #[error("Regex error: {0}")]
    RegexError(#[from] regex::Error),

    #[error("Unknown error: {0}")]
    Unknown(String),
}

impl QuickblobError {
    pub fn invalid_connection_string<S: Into<String>>(detail: S) -> Self {
        Self::InvalidConnectionString {
            detail: detail.into(),
        }
    }

    pub fn service<S: Into<String>>(msg: S) -> Self {
        Self::ServiceError(msg.into())
    }

    pub fn config<S: Into<String>>(msg: S) -> Self {
        Self::ConfigError(msg.into())
    }

    pub fn invalid_argument<S: Into<String>>(msg: S) -> Self {
        Self::InvalidArgument(msg.into())
    }

    pub fn input<S: Into<String>>(msg: S) -> Self {
        Self::InputError(msg.into())
    }

    pub fn unknown<S: Into<String>>(msg: S) -> Self {
        Self::Unknown(msg.into())
    }

    /// Errors reported by the storage service. The quickstart run catches
    /// these and carries on with cleanup; everything else propagates.
    pub fn is_service_error(&self) -> bool {
        matches!(self, Self::ServiceError(_))
    }

    /// Missing or unparsable connection string.
    pub fn is_connection_string_error(&self) -> bool {
        matches!(
            self,
            Self::MissingConnectionString | Self::InvalidConnectionString { .. }
        )
    }
}

/// Result type alias for quickblob operations
pub type Result<T> = std::result::Result<T, QuickblobError>;

/// Convert Azure Core errors to QuickblobError
impl From<azure_core::Error> for QuickblobError {
    fn from(error: azure_core::Error) -> Self {
        Self::ServiceError(error.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_service_error_classification() {
        assert!(QuickblobError::service("409 Conflict").is_service_error());
        assert!(!QuickblobError::config("bad prefix").is_service_error());

        let io = QuickblobError::from(std::io::Error::new(
            std::io::ErrorKind::PermissionDenied,
            "denied",
        ));
        assert!(!io.is_service_error());
    }

    #[test]
    fn test_connection_string_messages() {
        let missing = QuickblobError::MissingConnectionString;
        assert!(missing.is_connection_string_error());
        assert!(missing.to_string().contains("'storageconnectionstring'"));

        let invalid = QuickblobError::invalid_connection_string("AccountKey is not valid base64");
        assert!(invalid.is_connection_string_error());
        assert!(invalid.to_string().starts_with("A connection string has not been defined"));
        assert!(invalid.to_string().ends_with("(AccountKey is not valid base64)"));
    }

    #[test]
    fn test_service_error_display() {
        let err = QuickblobError::service("The specified container already exists.");
        assert_eq!(
            err.to_string(),
            "Error returned from the service: The specified container already exists."
        );
    }
}
