use serde::{Deserialize, Serialize};

use crate::elements::{Elements, MediaKind};
use crate::error::ParseError;
use crate::parser::{parse, parse_folder};

/// File stems players and browsers give to saved streams. They say nothing
/// about the show.
const PLACEHOLDER_STEMS: &[&str] = &[
    "videoplayback",
    "watch",
    "index",
    "playlist",
    "master",
    "stream",
    "video",
];

/// How many folders above the file are tried for a title.
const FOLDER_DEPTH: usize = 2;

/// The show guess for one played file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParsedFilename {
    pub raw_path: String,
    pub title: String,
    /// Explicit season. `None` means the episode may be absolute.
    pub season: Option<u32>,
    /// Episode number, possibly fractional or absolute.
    pub episode: Option<f32>,
    pub year: Option<u32>,
    pub media_kind: MediaKind,
    pub part: Option<u32>,
    /// The title came from a parent folder rather than the filename.
    pub from_folder: bool,
    /// The title was supplied by the caller, no tokenization happened.
    pub from_override: bool,
}

impl ParsedFilename {
    /// Title used for the catalogue search: "Title Season 2 Part 1".
    pub fn search_title(&self) -> String {
        let mut name = self.title.clone();
        if let Some(season) = self.season {
            if season > 1 || self.part.is_some() {
                name.push_str(&format!(" Season {season}"));
            }
        }
        if let Some(part) = self.part {
            name.push_str(&format!(" Part {part}"));
        }
        name
    }

    /// Whole episode number, 1 when none was found.
    pub fn episode_or_first(&self) -> u32 {
        self.episode.map_or(1, |ep| ep.trunc().max(0.0) as u32)
    }
}

/// Parse a played path, using `title` instead when the caller has one
/// (the player's media title for streams).
pub fn parse_with_override(path: &str, title: Option<&str>) -> Result<ParsedFilename, ParseError> {
    match title.map(str::trim).filter(|t| !t.is_empty()) {
        Some(title) => Ok(ParsedFilename {
            raw_path: path.to_string(),
            title: title.to_string(),
            season: None,
            episode: None,
            year: None,
            media_kind: MediaKind::Unknown,
            part: None,
            from_folder: false,
            from_override: true,
        }),
        None => parse_path(path),
    }
}

/// Parse a played path.
///
/// The filename is tried first; when it carries no usable title the parent
/// and grandparent folders are tried in turn. Season, part and year found
/// along the way fill whatever the filename left empty.
pub fn parse_path(path: &str) -> Result<ParsedFilename, ParseError> {
    let trimmed = path.trim();
    if trimmed.is_empty() {
        return Err(ParseError::Empty);
    }
    if is_stream_url(trimmed) {
        return Err(ParseError::StreamWithoutTitle(trimmed.to_string()));
    }

    let normalized = trimmed.replace('\\', "/");
    let parts: Vec<&str> = normalized.split('/').filter(|p| !p.is_empty()).collect();
    let Some((filename, folders)) = parts.split_last() else {
        return Err(ParseError::Empty);
    };

    if is_placeholder(filename) {
        return Err(ParseError::Placeholder(filename.to_string()));
    }

    let file = parse(filename);
    let mut merged = Merged::from_file(&file);

    if let Some(title) = confident_title(&file) {
        return Ok(merged.finish(path, title, false));
    }

    for folder in folders.iter().rev().take(FOLDER_DEPTH) {
        let elements = parse_folder(folder);
        tracing::debug!(folder, title = ?elements.title, "Trying folder name");
        merged.fill_from(&elements);
        if let Some(title) = confident_title(&elements) {
            return Ok(merged.finish(path, title, true));
        }
    }

    Err(ParseError::NoTitle(filename.to_string()))
}

/// Fields gathered from the filename and, if needed, its folders.
struct Merged {
    season: Option<u32>,
    episode: Option<f32>,
    year: Option<u32>,
    part: Option<u32>,
    media_kind: MediaKind,
}

impl Merged {
    fn from_file(file: &Elements) -> Self {
        Self {
            season: file.season_number,
            episode: file.episode_number,
            year: file.year,
            part: file.part_number,
            media_kind: file.media_kind(),
        }
    }

    fn fill_from(&mut self, folder: &Elements) {
        self.season = self.season.or(folder.season_number);
        self.year = self.year.or(folder.year);
        self.part = self.part.or(folder.part_number);
        if self.media_kind == MediaKind::Unknown {
            self.media_kind = folder.anime_type.unwrap_or(MediaKind::Unknown);
        }
    }

    fn finish(self, path: &str, title: String, from_folder: bool) -> ParsedFilename {
        ParsedFilename {
            raw_path: path.to_string(),
            title,
            season: self.season,
            episode: self.episode,
            year: self.year,
            media_kind: self.media_kind,
            part: self.part,
            from_folder,
            from_override: false,
        }
    }
}

/// A title made only of digits and punctuation ("05", "01 - 02") is not
/// trusted.
fn confident_title(elements: &Elements) -> Option<String> {
    elements
        .title
        .as_ref()
        .filter(|t| t.chars().any(char::is_alphabetic))
        .cloned()
}

fn is_stream_url(path: &str) -> bool {
    let lower = path.to_ascii_lowercase();
    lower.starts_with("http://") || lower.starts_with("https://")
}

fn is_placeholder(filename: &str) -> bool {
    let stem = filename
        .rsplit_once('.')
        .map_or(filename, |(stem, _)| stem)
        .to_ascii_lowercase();
    PLACEHOLDER_STEMS.contains(&stem.as_str())
}
