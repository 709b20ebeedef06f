use thiserror::Error;

#[derive(Error, Debug)]
pub enum GradeError {
    #[error("Invalid input for {field}: {reason}")]
    InvalidInput { field: String, reason: String },

    #[error("Validation error: {message}")]
    ValidationError { message: String },

    #[error("{entity} {id} not found")]
    NotFound { entity: &'static str, id: u64 },

    #[error("Not signed in")]
    Unauthorized,

    #[error("Configuration error: {message}")]
    ConfigError { message: String },

    #[error("Configuration validation failed for {field}: {message}")]
    ConfigValidationError { field: String, message: String },

    #[error("Invalid value '{value}' for {field}: {reason}")]
    InvalidConfigValueError {
        field: String,
        value: String,
        reason: String,
    },

    #[error("Missing required configuration: {field}")]
    MissingConfigError { field: String },

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("CSV processing error: {0}")]
    CsvError(#[from] csv::Error),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorSeverity {
    Low,
    Medium,
    High,
    Critical,
}

impl GradeError {
    pub fn invalid_input(field: &str, reason: impl Into<String>) -> Self {
        GradeError::InvalidInput {
            field: field.to_string(),
            reason: reason.into(),
        }
    }

    pub fn severity(&self) -> ErrorSeverity {
        match self {
            GradeError::NotFound { .. } => ErrorSeverity::Low,
            GradeError::InvalidInput { .. } | GradeError::ValidationError { .. } => {
                ErrorSeverity::Medium
            }
            GradeError::Unauthorized
            | GradeError::ConfigError { .. }
            | GradeError::ConfigValidationError { .. }
            | GradeError::InvalidConfigValueError { .. }
            | GradeError::MissingConfigError { .. } => ErrorSeverity::High,
            GradeError::IoError(_)
            | GradeError::CsvError(_)
            | GradeError::SerializationError(_) => ErrorSeverity::Critical,
        }
    }

    pub fn user_friendly_message(&self) -> String {
        match self {
            GradeError::InvalidInput { field, reason } => {
                format!("The value given for '{}' is not usable: {}", field, reason)
            }
            GradeError::ValidationError { message } => message.clone(),
            GradeError::NotFound { entity, id } => {
                format!("No {} with id {} exists in your gradebook", entity, id)
            }
            GradeError::Unauthorized => "Please sign in first".to_string(),
            GradeError::ConfigError { message } => message.clone(),
            GradeError::ConfigValidationError { field, message } => {
                format!("Gradebook file problem at '{}': {}", field, message)
            }
            GradeError::InvalidConfigValueError {
                field,
                value,
                reason,
            } => format!("'{}' is not valid for '{}': {}", value, field, reason),
            GradeError::MissingConfigError { field } => {
                format!("'{}' must be provided", field)
            }
            GradeError::IoError(e) => format!("Could not access a file: {}", e),
            GradeError::CsvError(e) => format!("Could not write CSV output: {}", e),
            GradeError::SerializationError(e) => format!("Could not write JSON output: {}", e),
        }
    }

    pub fn recovery_suggestion(&self) -> &'static str {
        match self.severity() {
            ErrorSeverity::Low => "Check the id and list the gradebook again",
            ErrorSeverity::Medium => "Grades must lie between 1.0 and 6.0 with a positive weight",
            ErrorSeverity::High => "Check the gradebook file and the command line flags",
            ErrorSeverity::Critical => "Check file permissions and free disk space",
        }
    }
}

pub type Result<T> = std::result::Result<T, GradeError>;
