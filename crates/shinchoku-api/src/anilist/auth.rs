use std::fmt;
use std::fs;
use std::io::ErrorKind;
use std::path::Path;

use super::error::AniListError;

/// An AniList bearer token. `Debug` never prints it.
#[derive(Clone, PartialEq, Eq)]
pub struct AccessToken(String);

impl AccessToken {
    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into())
    }

    pub fn secret(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for AccessToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("AccessToken(<redacted>)")
    }
}

/// Read the token file.
///
/// A missing or empty file yields `Ok(None)`. Older files stored
/// `user_id:token` on the first line and `;;`-separated cache lines below
/// it; those are reduced to the bare token and the file is rewritten.
pub fn load_token(path: &Path) -> Result<Option<AccessToken>, AniListError> {
    let contents = match fs::read_to_string(path) {
        Ok(contents) => contents,
        Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
        Err(e) => {
            return Err(AniListError::Auth(format!(
                "failed to read token file {}: {e}",
                path.display()
            )))
        }
    };

    let lines: Vec<&str> = contents.lines().collect();
    let Some(header) = lines.first() else {
        return Ok(None);
    };

    let legacy_user_id = header
        .split_once(':')
        .is_some_and(|(id, _)| !id.is_empty() && id.chars().all(|c| c.is_ascii_digit()));
    let legacy_cache = lines.iter().any(|l| l.contains(";;"));

    let token = if legacy_user_id {
        header.split_once(':').map_or(*header, |(_, t)| t).trim()
    } else {
        header.trim()
    };

    if legacy_user_id || legacy_cache {
        let rewritten = if token.is_empty() {
            String::new()
        } else {
            format!("{token}\n")
        };
        match fs::write(path, rewritten) {
            Ok(()) => tracing::info!(
                legacy_user_id,
                legacy_cache,
                "Cleaned up legacy token file format"
            ),
            Err(e) => tracing::warn!(error = %e, "Legacy token file cleanup failed"),
        }
    }

    Ok((!token.is_empty()).then(|| AccessToken::new(token)))
}
