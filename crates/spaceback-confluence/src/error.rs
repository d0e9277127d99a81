//! Error types for Confluence API operations.

/// Error from Confluence API operations.
#[derive(Debug, thiserror::Error)]
pub enum ConfluenceError {
    /// HTTP request failed (network error, timeout, etc).
    #[error("HTTP request failed: {0}")]
    HttpRequest(#[from] ureq::Error),

    /// HTTP response error (server returned error status).
    #[error("HTTP error: {status} - {body}")]
    HttpResponse {
        /// HTTP status code.
        status: u16,
        /// Response body (may contain error details).
        body: String,
    },

    /// The server accepted the request but did not authenticate the caller.
    #[error("not authenticated: {0}")]
    Unauthenticated(String),

    /// JSON-RPC call returned an error object.
    #[error("remote call {method} failed: {message}")]
    Rpc {
        /// RPC method name.
        method: String,
        /// Error message reported by the server.
        message: String,
    },

    /// Response was well-formed but not what the endpoint promises.
    #[error("unexpected response: {0}")]
    UnexpectedResponse(String),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization/deserialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl ConfluenceError {
    /// HTTP status of a failed response, if the server answered at all.
    #[must_use]
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::HttpResponse { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// Bad credentials or insufficient permission.
    #[must_use]
    pub fn is_auth_failure(&self) -> bool {
        matches!(self, Self::Unauthenticated(_)) || matches!(self.status(), Some(401 | 403))
    }

    /// The requested content, space or attachment does not exist.
    #[must_use]
    pub fn is_not_found(&self) -> bool {
        self.status() == Some(404)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn response(status: u16) -> ConfluenceError {
        ConfluenceError::HttpResponse {
            status,
            body: String::new(),
        }
    }

    #[test]
    fn test_auth_failure_statuses() {
        assert!(response(401).is_auth_failure());
        assert!(response(403).is_auth_failure());
        assert!(ConfluenceError::Unauthenticated("anonymous".to_owned()).is_auth_failure());
        assert!(!response(500).is_auth_failure());
    }

    #[test]
    fn test_not_found_status() {
        assert!(response(404).is_not_found());
        assert!(!response(403).is_not_found());
        assert!(
            !ConfluenceError::UnexpectedResponse("empty".to_owned()).is_not_found()
        );
    }

    #[test]
    fn test_status_only_for_responses() {
        assert_eq!(response(502).status(), Some(502));
        let rpc = ConfluenceError::Rpc {
            method: "addSpace".to_owned(),
            message: "denied".to_owned(),
        };
        assert_eq!(rpc.status(), None);
    }
}
