use shinchoku_api::ServiceError;
use shinchoku_parse::ParseError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum CoreError {
    #[error("{0}")]
    Parse(#[from] ParseError),

    #[error("Multiple matches for \"{query}\": {}", candidates.join(", "))]
    MatchAmbiguous {
        query: String,
        candidates: Vec<String>,
    },

    #[error("Couldn't find \"{title}\" on your list")]
    NotInList { title: String },

    #[error("Couldn't find an anime titled \"{title}\"")]
    NotFound { title: String },

    #[error("AniList request failed{}: {message}", if *transient { " (try again later)" } else { "" })]
    Api { transient: bool, message: String },

    #[error("cache error: {0}")]
    Cache(String),

    #[error("config error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl CoreError {
    /// Wrap a catalogue failure, keeping only its message and whether a
    /// retry may help.
    pub fn api<E: ServiceError>(err: &E) -> Self {
        Self::Api {
            transient: err.is_transient(),
            message: err.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_messages() {
        let err = CoreError::MatchAmbiguous {
            query: "Hunter x Hunter".into(),
            candidates: vec!["Hunter x Hunter (1999)".into(), "Hunter x Hunter (2011)".into()],
        };
        assert_eq!(
            err.to_string(),
            "Multiple matches for \"Hunter x Hunter\": Hunter x Hunter (1999), Hunter x Hunter (2011)"
        );

        let err = CoreError::Api {
            transient: true,
            message: "timed out".into(),
        };
        assert_eq!(err.to_string(), "AniList request failed (try again later): timed out");

        let err = CoreError::from(ParseError::Empty);
        assert_eq!(err.to_string(), "empty path");
    }
}
