//! Map a file's episode number onto the season entry it belongs to.
//!
//! Fansubs often number later seasons continuously ("Show - 15" for the
//! third episode of season 2). When no season was written in the name and
//! the episode is past the matched entry's length, the number is walked
//! through the series' seasons in airing order.

use shinchoku_api::{CatalogueEntry, SeasonSlot};
use shinchoku_parse::ParsedFilename;

use crate::config::ResolverConfig;
use crate::error::CoreError;
use crate::models::{Confidence, ResolvedTarget};

pub fn resolve(
    parsed: &ParsedFilename,
    entry: &CatalogueEntry,
    config: &ResolverConfig,
) -> Result<ResolvedTarget, CoreError> {
    let episode = parsed.episode_or_first();

    if let Some(season) = parsed.season {
        // The name says which season; its episode is already relative.
        return Ok(relative_target(entry.as_slot(), season, episode));
    }

    let within_entry = entry.episodes.map_or(true, |count| episode <= count);
    if within_entry {
        let season = entry
            .seasons
            .iter()
            .position(|s| s.media_id == entry.media_id)
            .map_or(1, |i| i as u32 + 1);
        return Ok(relative_target(entry.as_slot(), season, episode));
    }

    walk_seasons(&entry.seasons, episode, config.default_season_length).ok_or_else(|| {
        CoreError::MatchAmbiguous {
            query: parsed.search_title(),
            candidates: vec![entry.title.clone()],
        }
    })
}

fn relative_target(slot: SeasonSlot, season: u32, episode: u32) -> ResolvedTarget {
    ResolvedTarget {
        media_id: slot.media_id,
        title: slot.title,
        season,
        episode_in_season: episode,
        absolute_episode: episode,
        used_absolute_numbering: false,
        confidence: Confidence::High,
        season_episodes: slot.episodes,
        list_status: slot.list_status,
        list_progress: slot.list_progress,
    }
}

/// Find the season holding absolute episode `episode`. Unknown season
/// lengths count as `default_length`. Past the last season the overflow is
/// attributed to it. `None` only when there are no seasons.
fn walk_seasons(seasons: &[SeasonSlot], episode: u32, default_length: u32) -> Option<ResolvedTarget> {
    let last_index = seasons.len().checked_sub(1)?;
    let mut before = 0u32;
    let mut assumed = false;

    for (i, slot) in seasons.iter().enumerate() {
        let count = slot.episodes.unwrap_or_else(|| {
            assumed = true;
            default_length
        });
        let fits = episode <= before + count;
        if fits || i == last_index {
            let confidence = if assumed || !fits {
                Confidence::Low
            } else {
                Confidence::High
            };
            tracing::debug!(
                episode,
                season = i + 1,
                relative = episode - before,
                ?confidence,
                "Absolute episode mapped"
            );
            return Some(ResolvedTarget {
                media_id: slot.media_id,
                title: slot.title.clone(),
                season: i as u32 + 1,
                episode_in_season: episode - before,
                absolute_episode: episode,
                used_absolute_numbering: true,
                confidence,
                season_episodes: slot.episodes,
                list_status: slot.list_status,
                list_progress: slot.list_progress,
            });
        }
        before += count;
    }
    None
}

#[cfg(test)]
mod tests {
    use shinchoku_api::{ListStatus, MediaFormat};
    use shinchoku_parse::{parse_path, parse_with_override};

    use super::*;

    fn slot(id: u64, episodes: Option<u32>, status: ListStatus, progress: u32) -> SeasonSlot {
        SeasonSlot {
            media_id: id,
            title: format!("Show {id}"),
            episodes,
            on_list: status != ListStatus::None,
            list_status: status,
            list_progress: progress,
        }
    }

    fn entry_for(matched: &SeasonSlot, seasons: Vec<SeasonSlot>) -> CatalogueEntry {
        CatalogueEntry {
            media_id: matched.media_id,
            title: matched.title.clone(),
            format: MediaFormat::Tv,
            episodes: matched.episodes,
            duration: Some(24),
            release_status: None,
            season: None,
            season_year: None,
            on_list: matched.on_list,
            list_status: matched.list_status,
            list_progress: matched.list_progress,
            seasons,
        }
    }

    fn two_seasons() -> Vec<SeasonSlot> {
        vec![
            slot(1, Some(12), ListStatus::Completed, 12),
            slot(2, Some(13), ListStatus::Current, 2),
        ]
    }

    #[test]
    fn test_absolute_episode_maps_to_second_season() {
        let seasons = two_seasons();
        let entry = entry_for(&seasons[0], seasons.clone());
        let parsed = parse_path("/anime/Show/[Grp] Show - 15.mkv").unwrap();

        let target = resolve(&parsed, &entry, &ResolverConfig::default()).unwrap();
        assert_eq!(target.media_id, 2);
        assert_eq!(target.season, 2);
        assert_eq!(target.episode_in_season, 3);
        assert_eq!(target.absolute_episode, 15);
        assert_eq!(target.episode_offset(), 12);
        assert!(target.used_absolute_numbering);
        assert_eq!(target.confidence, Confidence::High);
        assert_eq!(target.list_status, ListStatus::Current);
        assert_eq!(target.list_progress, 2);
    }

    #[test]
    fn test_episode_within_entry_is_relative() {
        let seasons = two_seasons();
        let entry = entry_for(&seasons[1], seasons.clone());
        let parsed = parse_path("/anime/[Grp] Show - 05.mkv").unwrap();

        let target = resolve(&parsed, &entry, &ResolverConfig::default()).unwrap();
        assert_eq!(target.media_id, 2);
        assert_eq!(target.season, 2);
        assert_eq!(target.episode_in_season, 5);
        assert!(!target.used_absolute_numbering);
    }

    #[test]
    fn test_explicit_season_is_never_remapped() {
        let seasons = two_seasons();
        let entry = entry_for(&seasons[0], seasons.clone());
        let parsed = parse_path("/anime/Show S01E15.mkv").unwrap();

        let target = resolve(&parsed, &entry, &ResolverConfig::default()).unwrap();
        assert_eq!(target.media_id, 1);
        assert_eq!(target.season, 1);
        assert_eq!(target.episode_in_season, 15);
        assert!(!target.used_absolute_numbering);
    }

    #[test]
    fn test_unknown_season_length_uses_default() {
        let seasons = vec![
            slot(1, None, ListStatus::Completed, 10),
            slot(2, Some(12), ListStatus::Current, 0),
        ];
        let matched = slot(1, Some(10), ListStatus::Completed, 10);
        let entry = entry_for(&matched, seasons);
        let parsed = parse_path("/anime/[Grp] Show - 14.mkv").unwrap();

        let target = resolve(&parsed, &entry, &ResolverConfig::default()).unwrap();
        assert_eq!(target.media_id, 2);
        assert_eq!(target.episode_in_season, 2);
        assert_eq!(target.confidence, Confidence::Low);
    }

    #[test]
    fn test_overflow_goes_to_last_season() {
        let seasons = two_seasons();
        let entry = entry_for(&seasons[0], seasons.clone());
        let parsed = parse_path("/anime/[Grp] Show - 30.mkv").unwrap();

        let target = resolve(&parsed, &entry, &ResolverConfig::default()).unwrap();
        assert_eq!(target.media_id, 2);
        assert_eq!(target.season, 2);
        assert_eq!(target.episode_in_season, 18);
        assert_eq!(target.confidence, Confidence::Low);
    }

    #[test]
    fn test_no_series_to_walk_is_ambiguous() {
        let matched = slot(7, Some(12), ListStatus::Current, 3);
        let entry = entry_for(&matched, Vec::new());
        let parsed = parse_path("/anime/[Grp] Show - 20.mkv").unwrap();

        assert!(matches!(
            resolve(&parsed, &entry, &ResolverConfig::default()),
            Err(CoreError::MatchAmbiguous { .. })
        ));
    }

    #[test]
    fn test_missing_episode_means_first() {
        let seasons = two_seasons();
        let entry = entry_for(&seasons[0], seasons.clone());
        let parsed = parse_with_override("https://example.com/v", Some("Show 1")).unwrap();

        let target = resolve(&parsed, &entry, &ResolverConfig::default()).unwrap();
        assert_eq!(target.media_id, 1);
        assert_eq!(target.episode_in_season, 1);
    }
}
