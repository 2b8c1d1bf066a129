use std::path::{Path, PathBuf};
use std::time::Duration;

use directories::ProjectDirs;
use serde::{Deserialize, Serialize};

use crate::error::CoreError;

const DEFAULT_CONFIG: &str = include_str!("../../../config/default.toml");

/// Top-level application configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    pub anilist: AnilistConfig,
    pub cache: CacheConfig,
    pub resolver: ResolverConfig,
    pub session: SessionConfig,
    #[serde(default)]
    pub paths: PathsConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnilistConfig {
    pub api_url: String,
    pub site_url: String,
    pub timeout_secs: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CacheConfig {
    pub ttl_hours: u32,
    pub max_entries: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResolverConfig {
    pub default_season_length: u32,
    pub min_episode_duration: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionConfig {
    pub cooldown_secs: u64,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PathsConfig {
    pub token_file: Option<PathBuf>,
    pub cache_file: Option<PathBuf>,
}

impl AppConfig {
    /// Load config: user file (if it exists) merged over built-in defaults.
    /// An explicit `path` must exist.
    pub fn load(path: Option<&Path>) -> Result<Self, CoreError> {
        match path {
            Some(path) => Self::load_from(path),
            None => {
                let user_path = Self::config_path();
                if user_path.exists() {
                    Self::load_from(&user_path)
                } else {
                    Self::from_toml("")
                }
            }
        }
    }

    pub fn load_from(path: &Path) -> Result<Self, CoreError> {
        let user_str = std::fs::read_to_string(path)
            .map_err(|e| CoreError::Config(format!("{}: {e}", path.display())))?;
        tracing::debug!(path = %path.display(), "Loading user config");
        Self::from_toml(&user_str)
    }

    /// Parse `user` and lay it over the defaults, key by key.
    pub fn from_toml(user: &str) -> Result<Self, CoreError> {
        let mut merged: toml::Value =
            toml::from_str(DEFAULT_CONFIG).map_err(|e| CoreError::Config(e.to_string()))?;
        let user: toml::Value = toml::from_str(user).map_err(|e| CoreError::Config(e.to_string()))?;
        overlay(&mut merged, user);
        merged
            .try_into()
            .map_err(|e: toml::de::Error| CoreError::Config(e.to_string()))
    }

    /// Path to user config file (XDG on Linux, AppData on Windows).
    pub fn config_path() -> PathBuf {
        Self::project_dirs()
            .map(|d| d.config_dir().join("config.toml"))
            .unwrap_or_else(|| PathBuf::from("config.toml"))
    }

    /// Path to the AniList token file.
    pub fn token_path(&self) -> PathBuf {
        self.paths
            .token_file
            .clone()
            .unwrap_or_else(|| Self::data_file("anilistToken.txt"))
    }

    /// Path to the progress cache.
    pub fn cache_path(&self) -> PathBuf {
        self.paths
            .cache_file
            .clone()
            .unwrap_or_else(|| Self::data_file("cache.json"))
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.anilist.timeout_secs)
    }

    pub fn session_cooldown(&self) -> Duration {
        Duration::from_secs(self.session.cooldown_secs)
    }

    fn data_file(name: &str) -> PathBuf {
        Self::project_dirs()
            .map(|d| d.data_dir().join(name))
            .unwrap_or_else(|| PathBuf::from(name))
    }

    fn project_dirs() -> Option<ProjectDirs> {
        ProjectDirs::from("", "", "shinchoku")
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        toml::from_str(DEFAULT_CONFIG).expect("built-in default config is valid TOML")
    }
}

impl Default for ResolverConfig {
    fn default() -> Self {
        AppConfig::default().resolver
    }
}

fn overlay(base: &mut toml::Value, over: toml::Value) {
    match (base, over) {
        (toml::Value::Table(base), toml::Value::Table(over)) => {
            for (key, value) in over {
                match base.get_mut(&key) {
                    Some(existing) => overlay(existing, value),
                    None => {
                        base.insert(key, value);
                    }
                }
            }
        }
        (base, over) => *base = over,
    }
}

/// How the updater treats list statuses. Read from the JSON options object
/// the player script passes; unknown keys are ignored.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE", default)]
pub struct UpdatePolicy {
    /// Episode 1 of a completed show starts a rewatch.
    pub set_completed_to_rewatching_on_first_episode: bool,
    pub update_progress_when_rewatching: bool,
    pub set_to_completed_after_last_episode_current: bool,
    pub set_to_completed_after_last_episode_rewatching: bool,
    /// Add shows that are not on the list yet, and start planned ones.
    pub add_entry_if_missing: bool,
}

impl Default for UpdatePolicy {
    fn default() -> Self {
        Self {
            set_completed_to_rewatching_on_first_episode: false,
            update_progress_when_rewatching: true,
            set_to_completed_after_last_episode_current: false,
            set_to_completed_after_last_episode_rewatching: true,
            add_entry_if_missing: false,
        }
    }
}

impl UpdatePolicy {
    pub fn from_json(json: &str) -> Result<Self, CoreError> {
        if json.trim().is_empty() {
            return Ok(Self::default());
        }
        serde_json::from_str(json).map_err(|e| CoreError::Config(format!("invalid options: {e}")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_parses() {
        let config = AppConfig::default();
        assert_eq!(config.anilist.api_url, "https://graphql.anilist.co");
        assert_eq!(config.cache.ttl_hours, 24);
        assert_eq!(config.cache.max_entries, 256);
        assert_eq!(config.resolver.default_season_length, 12);
        assert_eq!(config.resolver.min_episode_duration, 21);
        assert!(config.paths.token_file.is_none());
    }

    #[test]
    fn test_partial_user_config_keeps_defaults() {
        let config = AppConfig::from_toml(
            r#"
            [cache]
            ttl_hours = 6

            [paths]
            token_file = "/tmp/token.txt"
            "#,
        )
        .unwrap();
        assert_eq!(config.cache.ttl_hours, 6);
        assert_eq!(config.cache.max_entries, 256);
        assert_eq!(config.anilist.timeout_secs, 10);
        assert_eq!(config.token_path(), PathBuf::from("/tmp/token.txt"));
    }

    #[test]
    fn test_bad_user_config_is_config_error() {
        let err = AppConfig::from_toml("[cache]\nttl_hours = \"soon\"").unwrap_err();
        assert!(matches!(err, CoreError::Config(_)));
    }

    #[test]
    fn test_load_from_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let err = AppConfig::load(Some(&dir.path().join("nope.toml"))).unwrap_err();
        assert!(matches!(err, CoreError::Config(_)));
    }

    #[test]
    fn test_policy_defaults() {
        let policy = UpdatePolicy::from_json("").unwrap();
        assert_eq!(policy, UpdatePolicy::default());
        assert!(!policy.set_completed_to_rewatching_on_first_episode);
        assert!(policy.update_progress_when_rewatching);
        assert!(!policy.add_entry_if_missing);
    }

    #[test]
    fn test_policy_from_options_json() {
        let policy = UpdatePolicy::from_json(
            r#"{"ADD_ENTRY_IF_MISSING": true, "UPDATE_PROGRESS_WHEN_REWATCHING": false, "DIRECTORIES": ["/anime"]}"#,
        )
        .unwrap();
        assert!(policy.add_entry_if_missing);
        assert!(!policy.update_progress_when_rewatching);
        // Untouched keys keep their defaults.
        assert!(policy.set_to_completed_after_last_episode_rewatching);
        assert!(!policy.set_to_completed_after_last_episode_current);
    }

    #[test]
    fn test_policy_rejects_garbage() {
        assert!(matches!(
            UpdatePolicy::from_json("{not json"),
            Err(CoreError::Config(_))
        ));
    }
}
