use serde::{Deserialize, Serialize};

/// What kind of release a filename describes.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum MediaKind {
    Tv,
    Movie,
    Ova,
    Special,
    #[default]
    Unknown,
}

impl MediaKind {
    /// Map an anime-type keyword ("Movie", "OVA", "SP", ...) to a kind.
    pub fn from_keyword(s: &str) -> Option<Self> {
        match s.to_uppercase().as_str() {
            "MOVIE" | "GEKIJOUBAN" | "FILM" => Some(Self::Movie),
            "OVA" | "OAD" | "OAV" | "ONA" => Some(Self::Ova),
            "SPECIAL" | "SPECIALS" | "SP" => Some(Self::Special),
            "TV" => Some(Self::Tv),
            _ => None,
        }
    }
}

/// Parsed elements extracted from a single file or folder name.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Elements {
    /// The anime title.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    /// Episode number as written (e.g. "05", "12.5", "05v2", "01-03").
    #[serde(skip_serializing_if = "Option::is_none")]
    pub episode: Option<String>,
    /// Episode number; fractional for recap episodes, last one for ranges.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub episode_number: Option<f32>,
    /// Season number.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub season_number: Option<u32>,
    /// Part number (e.g. "Part 2").
    #[serde(skip_serializing_if = "Option::is_none")]
    pub part_number: Option<u32>,
    /// Year of release, taken only from unbracketed text.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub year: Option<u32>,
    /// Release group name (e.g. "SubsPlease").
    #[serde(skip_serializing_if = "Option::is_none")]
    pub release_group: Option<String>,
    /// Video resolution (e.g. "1080p").
    #[serde(skip_serializing_if = "Option::is_none")]
    pub resolution: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub video_codec: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub audio_codec: Option<String>,
    /// Source (e.g. "BD", "WEB").
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,
    /// CRC32 checksum (e.g. "ABCD1234").
    #[serde(skip_serializing_if = "Option::is_none")]
    pub checksum: Option<String>,
    /// Release version (e.g. "v2").
    #[serde(skip_serializing_if = "Option::is_none")]
    pub release_version: Option<String>,
    /// Anime type keyword, if any.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub anime_type: Option<MediaKind>,
    /// File extension (e.g. "mkv").
    #[serde(skip_serializing_if = "Option::is_none")]
    pub file_extension: Option<String>,
}

impl Elements {
    /// Best guess at the release kind.
    ///
    /// An explicit type keyword wins; otherwise an episode number implies TV.
    pub fn media_kind(&self) -> MediaKind {
        match self.anime_type {
            Some(kind) => kind,
            None if self.episode_number.is_some() || self.season_number.is_some() => MediaKind::Tv,
            None => MediaKind::Unknown,
        }
    }
}
