use kube::error::ErrorResponse;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Error)]
pub enum Error {
    #[error("Resource not found: {resource} {name} in namespace {namespace}")]
    NotFound {
        resource: String,
        name: String,
        namespace: String,
    },

    #[error("Resource already exists: {resource} {name} in namespace {namespace}")]
    AlreadyExists {
        resource: String,
        name: String,
        namespace: String,
    },

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Cannot resolve resource: {0}")]
    Resolution(String),

    #[error("Conversion failed: {0}")]
    Conversion(String),

    #[error("Unsupported operation: {operation}")]
    UnsupportedOperation { operation: String },

    #[error("Injected error: {0}")]
    Injected(String),

    #[error("Request failed: {0}")]
    Failure(String),

    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("JSON patch error: {0}")]
    PatchError(#[from] json_patch::PatchError),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl Error {
    /// Error a reactor returns to simulate a backend failure
    pub fn injected(message: impl Into<String>) -> Self {
        Error::Injected(message.into())
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, Error::NotFound { .. })
    }

    /// True for both duplicate creates and stale resource versions
    pub fn is_conflict(&self) -> bool {
        matches!(self, Error::AlreadyExists { .. } | Error::Conflict(_))
    }

    pub fn is_unsupported(&self) -> bool {
        matches!(self, Error::UnsupportedOperation { .. })
    }

    /// HTTP status code the API server would answer with
    pub fn code(&self) -> u16 {
        match self {
            Error::NotFound { .. } => 404,
            Error::AlreadyExists { .. } | Error::Conflict(_) => 409,
            Error::InvalidRequest(_) | Error::PatchError(_) => 422,
            Error::SerializationError(_) | Error::Conversion(_) | Error::Resolution(_) => 400,
            Error::UnsupportedOperation { .. } => 501,
            Error::Injected(_) | Error::Failure(_) | Error::Internal(_) => 500,
        }
    }

    fn reason(&self) -> &'static str {
        match self {
            Error::NotFound { .. } => "NotFound",
            Error::AlreadyExists { .. } => "AlreadyExists",
            Error::Conflict(_) => "Conflict",
            Error::InvalidRequest(_) | Error::PatchError(_) => "Invalid",
            Error::SerializationError(_) | Error::Conversion(_) | Error::Resolution(_) => {
                "BadRequest"
            }
            Error::UnsupportedOperation { .. } => "NotImplemented",
            Error::Injected(_) | Error::Failure(_) | Error::Internal(_) => "InternalError",
        }
    }

    /// Convert into the `kube::Error` a real client would have returned
    pub fn into_kube_err(self) -> kube::Error {
        kube::Error::Api(ErrorResponse {
            status: "Failure".to_string(),
            message: self.to_string(),
            reason: self.reason().to_string(),
            code: self.code(),
        })
    }
}
