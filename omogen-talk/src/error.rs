//! Error types for the Omogen translation layer

use thiserror::Error;

pub type Result<T> = std::result::Result<T, OmogenError>;

#[derive(Error, Debug)]
pub enum OmogenError {
    #[error("Authentication needed: {0}")]
    AuthNeeded(String),

    #[error("Authentication impossible: {0}")]
    AuthImpossible(String),

    #[error("Authentication requested: {0}")]
    AuthRequested(String),

    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Impossible action: {0}")]
    ImpossibleAction(String),

    #[error("General error: {0}")]
    GeneralError(String),

    #[error("No {class_name} found for '{id}'")]
    NotFound { class_name: String, id: String },

    #[error("Remote store answered code {code}: {text}")]
    Remote { code: String, text: String },

    #[error("Response carried no recognised status: {0}")]
    Indeterminate(String),

    #[error("No entity registered for '{0}'")]
    UnknownEntity(String),

    #[error("{0} has no identifier")]
    MissingIdentifier(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Failed to decode response: {0}")]
    Decode(#[from] serde_json::Error),

    #[error("HTTP transport error: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl OmogenError {
    /// HTTP-equivalent status of this failure
    pub fn status_code(&self) -> u16 {
        match self {
            Self::AuthNeeded(_) | Self::AuthImpossible(_) => 401,
            Self::AuthRequested(_) => 403,
            Self::BadRequest(_) | Self::ImpossibleAction(_) => 400,
            Self::NotFound { .. } => 404,
            _ => 500,
        }
    }

    /// Whether the remote store rejected the session
    pub fn is_auth_failure(&self) -> bool {
        matches!(
            self,
            Self::AuthNeeded(_) | Self::AuthImpossible(_) | Self::AuthRequested(_)
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_codes() {
        assert_eq!(OmogenError::AuthNeeded("22".into()).status_code(), 401);
        assert_eq!(OmogenError::AuthImpossible("21".into()).status_code(), 401);
        assert_eq!(OmogenError::BadRequest(String::new()).status_code(), 400);
        assert_eq!(OmogenError::ImpossibleAction("nope".into()).status_code(), 400);
        assert_eq!(OmogenError::GeneralError(String::new()).status_code(), 500);
        assert_eq!(
            OmogenError::NotFound {
                class_name: "Patient".into(),
                id: "X1".into()
            }
            .status_code(),
            404
        );
    }

    #[test]
    fn test_auth_failures() {
        assert!(OmogenError::AuthRequested("32".into()).is_auth_failure());
        assert!(!OmogenError::GeneralError(String::new()).is_auth_failure());
    }
}
