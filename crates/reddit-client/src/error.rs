//! Error types for the Reddit client

use std::fmt;

/// Errors that can occur when talking to the Reddit API
#[derive(Debug)]
pub enum RedditError {
    /// Required credential environment variables are unset or empty
    MissingCredentials(Vec<String>),
    /// HTTP request failed
    Http(reqwest::Error),
    /// Failed to parse JSON response
    Json(serde_json::Error),
    /// Token endpoint refused the credentials
    Auth(String),
    /// Non-success HTTP status
    Api { status: u16, body: String },
}

impl fmt::Display for RedditError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MissingCredentials(vars) => {
                write!(f, "Missing required environment variables: {}", vars.join(", "))
            }
            Self::Http(e) => write!(f, "Reddit HTTP error: {}", e),
            Self::Json(e) => write!(f, "Reddit JSON parse error: {}", e),
            Self::Auth(msg) => write!(f, "Reddit authentication failed: {}", msg),
            Self::Api { status, body } => write!(f, "Reddit returned status {}: {}", status, body),
        }
    }
}

impl std::error::Error for RedditError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Http(e) => Some(e),
            Self::Json(e) => Some(e),
            _ => None,
        }
    }
}

impl From<reqwest::Error> for RedditError {
    fn from(e: reqwest::Error) -> Self {
        Self::Http(e)
    }
}

impl From<serde_json::Error> for RedditError {
    fn from(e: serde_json::Error) -> Self {
        Self::Json(e)
    }
}

/// Result type for Reddit API operations
pub type Result<T> = std::result::Result<T, RedditError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_credentials_display() {
        let err = RedditError::MissingCredentials(vec![
            "REDDIT_CLIENT_ID".to_string(),
            "REDDIT_USER_AGENT".to_string(),
        ]);
        assert_eq!(
            format!("{}", err),
            "Missing required environment variables: REDDIT_CLIENT_ID, REDDIT_USER_AGENT"
        );
    }

    #[test]
    fn test_api_error_display() {
        let err = RedditError::Api {
            status: 403,
            body: "Forbidden".to_string(),
        };
        assert_eq!(format!("{}", err), "Reddit returned status 403: Forbidden");
    }

    #[test]
    fn test_json_error_has_source() {
        use std::error::Error;

        let err: RedditError = serde_json::from_str::<u32>("nope").unwrap_err().into();
        assert!(err.source().is_some());
        assert!(format!("{}", err).starts_with("Reddit JSON parse error"));
    }
}
