//! Resource proxy error types

use clc_api::ApiError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ClcError {
    /// Transport failure, passed through untouched
    #[error(transparent)]
    Api(#[from] ApiError),

    #[error("'{type_name}' instance has no attribute '{attribute}'")]
    MissingAttribute {
        type_name: &'static str,
        attribute: String,
    },

    #[error("Not implemented: {0}")]
    NotImplemented(&'static str),

    #[error("Unexpected response: {0}")]
    Json(#[from] serde_json::Error),
}

impl ClcError {
    pub(crate) fn missing(type_name: &'static str, attribute: impl Into<String>) -> Self {
        ClcError::MissingAttribute {
            type_name,
            attribute: attribute.into(),
        }
    }

    /// HTTP status of the underlying transport failure, if any
    pub fn status(&self) -> Option<u16> {
        match self {
            ClcError::Api(e) => e.status(),
            _ => None,
        }
    }

    pub fn is_not_found(&self) -> bool {
        self.status() == Some(404)
    }
}

pub type Result<T> = std::result::Result<T, ClcError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_attribute_display() {
        let err = ClcError::missing("Server", "foo");
        assert_eq!(err.to_string(), "'Server' instance has no attribute 'foo'");
        assert_eq!(err.status(), None);
    }

    #[test]
    fn test_api_error_is_transparent() {
        let err = ClcError::from(ApiError::Failed {
            status: 404,
            method: clc_api::Method::Get,
            path: "servers/BTDI/x".to_string(),
            message: "Not Found".to_string(),
        });
        assert_eq!(err.to_string(), "Response code 404. Not Found GET servers/BTDI/x");
        assert!(err.is_not_found());
    }
}
