use thiserror::Error;

#[derive(Error, Debug)]
pub enum DeployError {
    #[error("Cluster API request failed: {0}")]
    ApiError(#[from] reqwest::Error),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("Configuration error in {field}: {message}")]
    ConfigValidationError { field: String, message: String },

    #[error("Invalid value '{value}' for {field}: {reason}")]
    InvalidConfigValueError {
        field: String,
        value: String,
        reason: String,
    },

    #[error("Invalid deployment spec: {message}")]
    SpecError { message: String },

    #[error("Planning failed: {message}")]
    PlanError { message: String },

    #[error("Cluster state error: {message}")]
    ClusterError { message: String },

    #[error("timed out")]
    TimeoutError,
}

pub type Result<T> = std::result::Result<T, DeployError>;
