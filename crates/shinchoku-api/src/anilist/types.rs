use std::cmp::Ordering;

use serde::Deserialize;

use crate::traits::{CatalogueEntry, ListStatus, MediaFormat, SavedEntry, SeasonSlot};

// ── GraphQL response wrappers ────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct GraphQLResponse<T> {
    pub data: Option<T>,
    #[serde(default)]
    pub errors: Vec<GraphQLError>,
}

#[derive(Debug, Deserialize)]
pub struct GraphQLError {
    pub message: String,
    pub status: Option<u16>,
}

// ── Search query ─────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct PageResponse {
    #[serde(rename = "Page")]
    pub page: PageData,
}

#[derive(Debug, Deserialize)]
pub struct PageData {
    #[serde(default)]
    pub media: Vec<AniListMedia>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AniListMedia {
    pub id: u64,
    pub title: Option<AniListTitle>,
    pub episodes: Option<u32>,
    pub duration: Option<u32>,
    #[serde(default)]
    pub format: Option<MediaFormat>,
    pub status: Option<String>,
    pub season: Option<String>,
    #[serde(rename = "seasonYear")]
    pub season_year: Option<u32>,
    #[serde(rename = "mediaListEntry")]
    pub media_list_entry: Option<MediaListEntry>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AniListTitle {
    pub romaji: Option<String>,
    pub english: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct MediaListEntry {
    pub status: Option<String>,
    pub progress: Option<u32>,
}

// ── Save mutation ────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct SaveResponse {
    #[serde(rename = "SaveMediaListEntry")]
    pub save_media_list_entry: SavedMediaListEntry,
}

#[derive(Debug, Deserialize)]
pub struct SavedMediaListEntry {
    pub id: u64,
    #[serde(rename = "mediaId")]
    pub media_id: u64,
    pub status: Option<String>,
    pub progress: Option<u32>,
}

// ── Conversions ──────────────────────────────────────────────────

impl AniListMedia {
    fn display_title(&self) -> String {
        self.title
            .as_ref()
            .and_then(|t| t.romaji.clone().or_else(|| t.english.clone()))
            .unwrap_or_default()
    }

    fn list_state(&self) -> (bool, ListStatus, u32) {
        match &self.media_list_entry {
            Some(entry) => (
                true,
                ListStatus::from_anilist(entry.status.as_deref()),
                entry.progress.unwrap_or(0),
            ),
            None => (false, ListStatus::None, 0),
        }
    }

    fn to_slot(&self) -> SeasonSlot {
        let (on_list, list_status, list_progress) = self.list_state();
        SeasonSlot {
            media_id: self.id,
            title: self.display_title(),
            episodes: self.episodes,
            on_list,
            list_status,
            list_progress,
        }
    }

    /// Whether this entry counts as a full-length TV season. New entries
    /// often have no duration yet, so a releasing show with none passes.
    fn is_series_season(&self, min_episode_duration: u32) -> bool {
        if self.format != Some(MediaFormat::Tv) {
            return false;
        }
        match self.duration {
            Some(minutes) => minutes > min_episode_duration,
            None => self.status.as_deref() == Some("RELEASING"),
        }
    }

    pub fn into_entry(self, seasons: Vec<SeasonSlot>) -> CatalogueEntry {
        let title = self.display_title();
        let (on_list, list_status, list_progress) = self.list_state();
        CatalogueEntry {
            media_id: self.id,
            title,
            format: self.format.unwrap_or_default(),
            episodes: self.episodes,
            duration: self.duration,
            release_status: self.status,
            season: self.season,
            season_year: self.season_year,
            on_list,
            list_status,
            list_progress,
            seasons,
        }
    }
}

impl SavedMediaListEntry {
    pub fn into_saved_entry(self) -> SavedEntry {
        SavedEntry {
            id: self.id,
            media_id: self.media_id,
            status: ListStatus::from_anilist(self.status.as_deref()),
            progress: self.progress.unwrap_or(0),
        }
    }
}

/// Airing quarter order; unknown sorts last.
fn season_order(season: Option<&str>) -> u8 {
    match season {
        Some("WINTER") => 1,
        Some("SPRING") => 2,
        Some("SUMMER") => 3,
        Some("FALL") => 4,
        _ => 5,
    }
}

/// Derive the ordered TV series from one search page: full-length TV
/// entries sorted by season year, then quarter.
pub fn derive_series(media: &[AniListMedia], min_episode_duration: u32) -> Vec<SeasonSlot> {
    let mut seasons: Vec<&AniListMedia> = media
        .iter()
        .filter(|m| m.is_series_season(min_episode_duration))
        .collect();

    seasons.sort_by(|a, b| {
        let year = match (a.season_year, b.season_year) {
            (Some(x), Some(y)) => x.cmp(&y),
            (Some(_), None) => Ordering::Less,
            (None, Some(_)) => Ordering::Greater,
            (None, None) => Ordering::Equal,
        };
        year.then_with(|| {
            season_order(a.season.as_deref()).cmp(&season_order(b.season.as_deref()))
        })
    });

    seasons.into_iter().map(AniListMedia::to_slot).collect()
}

/// Convert a search page into catalogue entries, each carrying the series
/// derived from the whole page.
pub fn page_into_entries(media: Vec<AniListMedia>, min_episode_duration: u32) -> Vec<CatalogueEntry> {
    let series = derive_series(&media, min_episode_duration);
    media
        .into_iter()
        .map(|m| m.into_entry(series.clone()))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    const SEARCH_JSON: &str = r#"{
        "data": {
            "Page": {
                "media": [
                    {
                        "id": 166873,
                        "title": { "romaji": "Mushoku no Tensei: Isekai Ittara Honki Dasu Season 2 Part 2" },
                        "season": "SPRING",
                        "seasonYear": 2024,
                        "episodes": 12,
                        "duration": 24,
                        "format": "TV",
                        "status": "FINISHED",
                        "mediaListEntry": { "status": "CURRENT", "progress": 4 }
                    },
                    {
                        "id": 108465,
                        "title": { "romaji": "Mushoku Tensei: Isekai Ittara Honki Dasu" },
                        "season": "WINTER",
                        "seasonYear": 2021,
                        "episodes": 11,
                        "duration": 24,
                        "format": "TV",
                        "status": "FINISHED",
                        "mediaListEntry": { "status": "COMPLETED", "progress": 11 }
                    },
                    {
                        "id": 127720,
                        "title": { "romaji": "Mushoku Tensei: Isekai Ittara Honki Dasu Part 2" },
                        "season": "FALL",
                        "seasonYear": 2021,
                        "episodes": 12,
                        "duration": 24,
                        "format": "TV",
                        "status": "FINISHED",
                        "mediaListEntry": null
                    },
                    {
                        "id": 141534,
                        "title": { "romaji": "Mushoku Tensei: Isekai Ittara Honki Dasu - Eris no Goblin Toubatsu" },
                        "season": "SPRING",
                        "seasonYear": 2023,
                        "episodes": 1,
                        "duration": 23,
                        "format": "OVA",
                        "status": "FINISHED",
                        "mediaListEntry": null
                    },
                    {
                        "id": 999001,
                        "title": { "romaji": "Mushoku Tensei Mini Anime" },
                        "season": "WINTER",
                        "seasonYear": 2021,
                        "episodes": 24,
                        "duration": 3,
                        "format": "TV",
                        "status": "FINISHED",
                        "mediaListEntry": null
                    },
                    {
                        "id": 999002,
                        "title": { "romaji": "Mushoku Tensei III" },
                        "season": null,
                        "seasonYear": null,
                        "episodes": null,
                        "duration": null,
                        "format": "TV",
                        "status": "RELEASING",
                        "mediaListEntry": null
                    }
                ]
            }
        }
    }"#;

    fn search_page() -> Vec<AniListMedia> {
        let resp: GraphQLResponse<PageResponse> = serde_json::from_str(SEARCH_JSON).unwrap();
        resp.data.unwrap().page.media
    }

    #[test]
    fn test_deserialize_search_response() {
        let entries = page_into_entries(search_page(), 21);
        assert_eq!(entries.len(), 6);

        let first = &entries[0];
        assert_eq!(first.media_id, 166873);
        assert_eq!(first.format, MediaFormat::Tv);
        assert!(first.on_list);
        assert_eq!(first.list_status, ListStatus::Current);
        assert_eq!(first.list_progress, 4);

        let off_list = &entries[2];
        assert!(!off_list.on_list);
        assert_eq!(off_list.list_status, ListStatus::None);
        assert_eq!(entries[3].format, MediaFormat::Ova);
    }

    #[test]
    fn test_series_filter_and_order() {
        let series = derive_series(&search_page(), 21);
        let ids: Vec<u64> = series.iter().map(|s| s.media_id).collect();
        // OVA and the 3-minute shorts are dropped; the releasing season
        // with no year yet sorts last.
        assert_eq!(ids, vec![108465, 127720, 166873, 999002]);
        assert_eq!(series[0].list_status, ListStatus::Completed);
        assert_eq!(series[3].episodes, None);
    }

    #[test]
    fn test_every_entry_carries_series() {
        let entries = page_into_entries(search_page(), 21);
        let counts = entries[0].episode_counts_by_season();
        assert_eq!(counts, vec![Some(11), Some(12), Some(12), None]);
        assert_eq!(entries[3].seasons.len(), 4);
    }

    #[test]
    fn test_deserialize_save_response() {
        let json = r#"{
            "data": {
                "SaveMediaListEntry": { "status": "REPEATING", "id": 4242, "progress": 1, "mediaId": 108465 }
            }
        }"#;
        let resp: GraphQLResponse<SaveResponse> = serde_json::from_str(json).unwrap();
        let saved = resp.data.unwrap().save_media_list_entry.into_saved_entry();
        assert_eq!(saved.id, 4242);
        assert_eq!(saved.media_id, 108465);
        assert_eq!(saved.status, ListStatus::Repeating);
        assert_eq!(saved.progress, 1);
    }

    #[test]
    fn test_deserialize_error_body() {
        let json = r#"{
            "errors": [{ "message": "Invalid token", "status": 400, "locations": [{ "line": 2, "column": 3 }] }],
            "data": null
        }"#;
        let resp: GraphQLResponse<PageResponse> = serde_json::from_str(json).unwrap();
        assert!(resp.data.is_none());
        assert_eq!(resp.errors.len(), 1);
        assert_eq!(resp.errors[0].message, "Invalid token");
        assert_eq!(resp.errors[0].status, Some(400));
    }

    #[test]
    fn test_missing_romaji_falls_back_to_english() {
        let json = r#"{ "id": 1, "title": { "romaji": null, "english": "Frieren" } }"#;
        let media: AniListMedia = serde_json::from_str(json).unwrap();
        let entry = media.into_entry(Vec::new());
        assert_eq!(entry.title, "Frieren");
        assert_eq!(entry.format, MediaFormat::Unknown);
        assert!(!entry.on_list);
    }
}
