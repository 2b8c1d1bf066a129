use serde::{Deserialize, Serialize};
use shinchoku_api::ListStatus;

/// How much the season/episode mapping can be trusted.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Confidence {
    #[default]
    High,
    /// A season length was assumed, or the episode ran past the last
    /// known season.
    Low,
}

/// The list entry a played file maps to, with the caller's state on it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResolvedTarget {
    pub media_id: u64,
    pub title: String,
    /// 1-based season within the series.
    pub season: u32,
    pub episode_in_season: u32,
    /// Episode number as found in the file.
    pub absolute_episode: u32,
    pub used_absolute_numbering: bool,
    pub confidence: Confidence,
    /// Episode count of the target season, if known.
    pub season_episodes: Option<u32>,
    pub list_status: ListStatus,
    pub list_progress: u32,
}

impl ResolvedTarget {
    /// Difference between the file's numbering and the season's.
    pub fn episode_offset(&self) -> u32 {
        self.absolute_episode.saturating_sub(self.episode_in_season)
    }
}
