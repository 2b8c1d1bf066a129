use thiserror::Error;

use crate::traits::ServiceError;

/// Errors from the AniList API client.
#[derive(Debug, Error)]
pub enum AniListError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("auth error: {0}")]
    Auth(String),

    #[error("API error (status {status}): {message}")]
    Api { status: u16, message: String },

    /// A GraphQL `errors` array, possibly inside a 200 response.
    #[error("GraphQL error: {message}")]
    GraphQl { status: Option<u16>, message: String },

    #[error("parse error: {0}")]
    Parse(String),
}

fn transient_status(status: u16) -> bool {
    status >= 500 || status == 429
}

impl ServiceError for AniListError {
    fn is_transient(&self) -> bool {
        match self {
            Self::Http(e) => {
                e.is_timeout()
                    || e.is_connect()
                    || e.is_request()
                    || e.status().is_some_and(|s| transient_status(s.as_u16()))
            }
            Self::Api { status, .. } => transient_status(*status),
            Self::GraphQl { status, .. } => status.is_some_and(transient_status),
            Self::Auth(_) | Self::Parse(_) => false,
        }
    }
}
