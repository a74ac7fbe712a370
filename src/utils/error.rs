use thiserror::Error;

#[derive(Error, Debug)]
pub enum WageClockError {
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("TOML parsing error: {0}")]
    TomlError(#[from] toml::de::Error),

    #[error("Configuration error: {message}")]
    ConfigError { message: String },

    #[error("Invalid value for '{field}': {value} ({reason})")]
    InvalidConfigValueError {
        field: String,
        value: String,
        reason: String,
    },

    #[error("Settings store error: {message}")]
    StoreError { message: String },

    #[error("Validation error: {message}")]
    ValidationError { message: String },

    #[error("Runtime error: {message}")]
    RuntimeError { message: String },
}

impl WageClockError {
    pub fn user_friendly_message(&self) -> String {
        match self {
            WageClockError::IoError(e) => format!("Could not access a file: {}", e),
            WageClockError::SerializationError(_) => {
                "The settings file is not valid JSON".to_string()
            }
            WageClockError::TomlError(_) => "The configuration file is not valid TOML".to_string(),
            WageClockError::InvalidConfigValueError { field, reason, .. } => {
                format!("'{}' is invalid: {}", field, reason)
            }
            WageClockError::ValidationError { message } => message.clone(),
            other => other.to_string(),
        }
    }

    pub fn recovery_suggestion(&self) -> &'static str {
        match self {
            WageClockError::IoError(_) => "Check that the path exists and is writable",
            WageClockError::SerializationError(_) => {
                "Delete the settings file and run `configure` again"
            }
            WageClockError::TomlError(_) | WageClockError::ConfigError { .. } => {
                "Compare the configuration file with the documented defaults"
            }
            WageClockError::InvalidConfigValueError { .. }
            | WageClockError::ValidationError { .. } => "Correct the value and try again",
            WageClockError::StoreError { .. } => "Retry once the settings store is reachable",
            WageClockError::RuntimeError { .. } => "Run again with --verbose for details",
        }
    }
}

pub type Result<T> = std::result::Result<T, WageClockError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validation_message_is_passed_through() {
        let err = WageClockError::ValidationError {
            message: "Enter a valid amount.".to_string(),
        };
        assert_eq!(err.user_friendly_message(), "Enter a valid amount.");
        assert_eq!(err.recovery_suggestion(), "Correct the value and try again");
    }

    #[test]
    fn test_invalid_value_display() {
        let err = WageClockError::InvalidConfigValueError {
            field: "loop.frame_interval_ms".to_string(),
            value: "0".to_string(),
            reason: "Value must be between 1 and 1000".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "Invalid value for 'loop.frame_interval_ms': 0 (Value must be between 1 and 1000)"
        );
    }
}
