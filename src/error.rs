use thiserror::Error;

pub type Result<T> = std::result::Result<T, ApiError>;

/// Failures coming back from the activity API.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ApiError {
    /// No response was received.
    #[error("network error: {0}")]
    Network(String),
    /// The server answered with a non-2xx status.
    #[error("server returned {status}{}", suffix(.detail))]
    Status { status: u16, detail: Option<String> },
    /// A response arrived but its body could not be decoded.
    #[error("invalid response: {0}")]
    Decode(String),
}

impl ApiError {
    pub fn is_unauthorized(&self) -> bool {
        matches!(self, ApiError::Status { status: 401, .. })
    }

    /// True for failures where the server never gave us something to show.
    pub fn is_transport(&self) -> bool {
        matches!(self, ApiError::Network(_) | ApiError::Decode(_))
    }

    /// The server-provided message, or `fallback` when there is none.
    pub fn detail_or<'a>(&'a self, fallback: &'a str) -> &'a str {
        match self {
            ApiError::Status {
                detail: Some(detail),
                ..
            } => detail,
            _ => fallback,
        }
    }
}

fn suffix(detail: &Option<String>) -> String {
    detail
        .as_deref()
        .map(|d| format!(": {d}"))
        .unwrap_or_default()
}

impl From<serde_json::Error> for ApiError {
    fn from(e: serde_json::Error) -> Self {
        ApiError::Decode(e.to_string())
    }
}

#[cfg(feature = "hydrate")]
impl From<gloo_net::Error> for ApiError {
    fn from(e: gloo_net::Error) -> Self {
        match e {
            gloo_net::Error::SerdeError(e) => ApiError::Decode(e.to_string()),
            other => ApiError::Network(other.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classification() {
        let expired = ApiError::Status {
            status: 401,
            detail: Some("Authentication required".to_string()),
        };
        assert!(expired.is_unauthorized());
        assert!(!expired.is_transport());

        let missing = ApiError::Status {
            status: 404,
            detail: None,
        };
        assert!(!missing.is_unauthorized());
        assert_eq!(missing.detail_or("An error occurred"), "An error occurred");
        assert_eq!(expired.detail_or("x"), "Authentication required");

        assert!(ApiError::Network("offline".to_string()).is_transport());
        assert!(ApiError::Decode("eof".to_string()).is_transport());
    }

    #[test]
    fn test_display() {
        let e = ApiError::Status {
            status: 400,
            detail: Some("Student is already signed up".to_string()),
        };
        assert_eq!(e.to_string(), "server returned 400: Student is already signed up");
        let e = ApiError::Status {
            status: 500,
            detail: None,
        };
        assert_eq!(e.to_string(), "server returned 500");
    }
}
