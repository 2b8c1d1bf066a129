//! Trait and domain types for the remote catalogue.
//!
//! The updater only ever needs two operations: a title search that also
//! reports the caller's list state, and a progress write. Anything that
//! implements [`CatalogueService`] can stand in for AniList (tests use an
//! in-memory fake).

use std::fmt;
use std::future::Future;

use serde::{Deserialize, Serialize};

/// Errors a catalogue can report, split by whether a later retry may help.
pub trait ServiceError: std::error::Error + Send + Sync + 'static {
    /// Timeouts, connection failures, 5xx and rate limiting.
    fn is_transient(&self) -> bool;
}

/// A remote anime catalogue with per-user list state.
pub trait CatalogueService: Send + Sync {
    type Error: ServiceError;

    /// Search by title. Results come back in the service's relevance order.
    fn search(
        &self,
        query: &SearchQuery,
    ) -> impl Future<Output = Result<Vec<CatalogueEntry>, Self::Error>> + Send;

    /// Save progress (and optionally status) for one entry. Nothing else on
    /// the entry is touched.
    fn mutate(
        &self,
        media_id: u64,
        progress: u32,
        status: Option<ListStatus>,
    ) -> impl Future<Output = Result<SavedEntry, Self::Error>> + Send;
}

/// Parameters of a title search.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchQuery {
    pub search: String,
    /// Only entries that started in or after this year.
    pub year: Option<u32>,
    /// Restrict to these formats. Empty means any.
    pub formats: Vec<MediaFormat>,
    /// `Some(true)` searches only the caller's list, `Some(false)` only
    /// entries outside it.
    pub on_list: Option<bool>,
}

impl SearchQuery {
    pub fn new(search: impl Into<String>) -> Self {
        Self {
            search: search.into(),
            year: None,
            formats: Vec::new(),
            on_list: None,
        }
    }

    pub fn year(mut self, year: Option<u32>) -> Self {
        self.year = year;
        self
    }

    pub fn formats(mut self, formats: Vec<MediaFormat>) -> Self {
        self.formats = formats;
        self
    }

    pub fn on_list(mut self, on_list: bool) -> Self {
        self.on_list = Some(on_list);
        self
    }
}

/// One search result, with the caller's list state and the TV series it
/// belongs to.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CatalogueEntry {
    pub media_id: u64,
    pub title: String,
    pub format: MediaFormat,
    pub episodes: Option<u32>,
    /// Minutes per episode.
    pub duration: Option<u32>,
    /// Airing status as reported by the service ("RELEASING", "FINISHED").
    pub release_status: Option<String>,
    pub season: Option<String>,
    pub season_year: Option<u32>,
    pub on_list: bool,
    pub list_status: ListStatus,
    pub list_progress: u32,
    /// The TV seasons of this series in airing order, used for absolute
    /// episode numbers. May be empty.
    pub seasons: Vec<SeasonSlot>,
}

impl CatalogueEntry {
    /// Episode count of each season in order; `None` where unknown.
    pub fn episode_counts_by_season(&self) -> Vec<Option<u32>> {
        self.seasons.iter().map(|s| s.episodes).collect()
    }

    /// This entry seen as a season of its own.
    pub fn as_slot(&self) -> SeasonSlot {
        SeasonSlot {
            media_id: self.media_id,
            title: self.title.clone(),
            episodes: self.episodes,
            on_list: self.on_list,
            list_status: self.list_status,
            list_progress: self.list_progress,
        }
    }
}

/// One season of a series.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SeasonSlot {
    pub media_id: u64,
    pub title: String,
    pub episodes: Option<u32>,
    pub on_list: bool,
    pub list_status: ListStatus,
    pub list_progress: u32,
}

/// Result of a progress write, as confirmed by the service.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SavedEntry {
    pub id: u64,
    pub media_id: u64,
    pub status: ListStatus,
    pub progress: u32,
}

/// Status of an entry on the caller's list. `None` means not on the list.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ListStatus {
    Current,
    Planning,
    Repeating,
    Completed,
    Paused,
    Dropped,
    #[default]
    None,
}

impl ListStatus {
    /// Parse an AniList `MediaListStatus`. Unknown or missing is `None`.
    pub fn from_anilist(s: Option<&str>) -> Self {
        match s {
            Some("CURRENT") => Self::Current,
            Some("PLANNING") => Self::Planning,
            Some("REPEATING") => Self::Repeating,
            Some("COMPLETED") => Self::Completed,
            Some("PAUSED") => Self::Paused,
            Some("DROPPED") => Self::Dropped,
            _ => Self::None,
        }
    }

    /// AniList `MediaListStatus` value; `None` has no wire form.
    pub fn as_anilist(self) -> Option<&'static str> {
        match self {
            Self::Current => Some("CURRENT"),
            Self::Planning => Some("PLANNING"),
            Self::Repeating => Some("REPEATING"),
            Self::Completed => Some("COMPLETED"),
            Self::Paused => Some("PAUSED"),
            Self::Dropped => Some("DROPPED"),
            Self::None => None,
        }
    }
}

impl fmt::Display for ListStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_anilist().unwrap_or("NONE"))
    }
}

/// AniList `MediaFormat`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum MediaFormat {
    Tv,
    TvShort,
    Movie,
    Special,
    Ova,
    Ona,
    Music,
    #[default]
    #[serde(other)]
    Unknown,
}

impl MediaFormat {
    pub fn as_anilist(self) -> &'static str {
        match self {
            Self::Tv => "TV",
            Self::TvShort => "TV_SHORT",
            Self::Movie => "MOVIE",
            Self::Special => "SPECIAL",
            Self::Ova => "OVA",
            Self::Ona => "ONA",
            Self::Music => "MUSIC",
            Self::Unknown => "UNKNOWN",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_list_status_round_trip() {
        for status in [
            ListStatus::Current,
            ListStatus::Planning,
            ListStatus::Repeating,
            ListStatus::Completed,
            ListStatus::Paused,
            ListStatus::Dropped,
        ] {
            assert_eq!(ListStatus::from_anilist(status.as_anilist()), status);
        }
        assert_eq!(ListStatus::from_anilist(None), ListStatus::None);
        assert_eq!(ListStatus::from_anilist(Some("WHATEVER")), ListStatus::None);
        assert_eq!(ListStatus::None.to_string(), "NONE");
    }

    #[test]
    fn test_media_format_unknown_variant() {
        let f: MediaFormat = serde_json::from_str(r#""TV_SHORT""#).unwrap();
        assert_eq!(f, MediaFormat::TvShort);
        let f: MediaFormat = serde_json::from_str(r#""MANGA""#).unwrap();
        assert_eq!(f, MediaFormat::Unknown);
    }

    #[test]
    fn test_search_query_builder() {
        let q = SearchQuery::new("Frieren").year(Some(2023)).on_list(true);
        assert_eq!(q.search, "Frieren");
        assert_eq!(q.year, Some(2023));
        assert_eq!(q.on_list, Some(true));
        assert!(q.formats.is_empty());
    }

    #[test]
    fn test_episode_counts_by_season() {
        let slot = |id, episodes| SeasonSlot {
            media_id: id,
            title: format!("S{id}"),
            episodes,
            on_list: false,
            list_status: ListStatus::None,
            list_progress: 0,
        };
        let entry = CatalogueEntry {
            media_id: 1,
            title: "Show".into(),
            format: MediaFormat::Tv,
            episodes: Some(12),
            duration: Some(24),
            release_status: None,
            season: None,
            season_year: None,
            on_list: true,
            list_status: ListStatus::Current,
            list_progress: 3,
            seasons: vec![slot(1, Some(12)), slot(2, None)],
        };
        assert_eq!(entry.episode_counts_by_season(), vec![Some(12), None]);
        assert_eq!(entry.as_slot().list_progress, 3);
    }
}
