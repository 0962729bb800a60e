use thiserror::Error;

#[derive(Debug, Error)]
pub enum ApiError {
    /// Rejected before any network I/O (empty payloads, missing ids).
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    #[error("Trakt returned {status} for {endpoint}: {body}")]
    Http {
        endpoint: String,
        status: u16,
        body: String,
    },

    #[error("request to Trakt failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("failed to decode Trakt response from {endpoint}: {source}")]
    Decode {
        endpoint: String,
        #[source]
        source: serde_json::Error,
    },
}

impl ApiError {
    /// Stable category name used to group failures in log summaries.
    pub fn category(&self) -> &'static str {
        match self {
            ApiError::InvalidArgument(_) => "invalid_argument",
            ApiError::Http { status, .. } if *status == 401 || *status == 403 => "unauthorized",
            ApiError::Http { status, .. } if *status == 429 => "rate_limited",
            ApiError::Http { .. } => "http",
            ApiError::Transport(_) => "transport",
            ApiError::Decode { .. } => "decode",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_categories() {
        let unauthorized = ApiError::Http {
            endpoint: "/sync/history".to_string(),
            status: 401,
            body: String::new(),
        };
        assert_eq!(unauthorized.category(), "unauthorized");

        let server = ApiError::Http {
            endpoint: "/sync/history".to_string(),
            status: 502,
            body: "bad gateway".to_string(),
        };
        assert_eq!(server.category(), "http");
        assert!(server.to_string().contains("502"));

        let invalid = ApiError::InvalidArgument("empty request".to_string());
        assert_eq!(invalid.category(), "invalid_argument");
    }
}
