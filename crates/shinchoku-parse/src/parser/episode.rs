use regex::Regex;
use std::sync::LazyLock;

/// Result of a successful episode extraction from one token.
#[derive(Debug, Clone, PartialEq)]
pub struct EpisodeMatch {
    /// Raw episode string (e.g. "05", "12.5", "S01E05").
    pub raw: String,
    /// Episode number. Ranges yield their last episode.
    pub number: f32,
    /// Season from a combined pattern (S01E05 → 1).
    pub season: Option<u32>,
    /// Release version (05v2 → "v2").
    pub version: Option<String>,
}

impl EpisodeMatch {
    fn plain(raw: &str, number: f32) -> Self {
        Self {
            raw: raw.to_string(),
            number,
            season: None,
            version: None,
        }
    }
}

/// Episode numbers above this are treated as something else (ids, sizes).
const MAX_EPISODE: u32 = 1999;

// ── Regex patterns (compiled once) ──────────────────────────────

static RE_COMBINED: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)^S(\d{1,2})E(\d{1,4})(?:v(\d))?(?:-?E?(\d{1,4}))?$").unwrap()
});

static RE_COMBINED_X: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(\d{1,2})[xX](\d{1,4})$").unwrap());

static RE_KEYWORD_PREFIX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)^(?:EP\.?|E|EPS|EPISODE|#)(\d{1,4})(?:v(\d))?$").unwrap()
});

static RE_VERSION_SUFFIX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(\d{1,4})[vV](\d)$").unwrap());

static RE_FRACTIONAL: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(\d{1,4})\.(\d)$").unwrap());

static RE_RANGE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(\d{1,4})\s*[-~]\s*(\d{1,4})$").unwrap());

static RE_JAPANESE_COUNTER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^第(\d{1,4})[話集]$").unwrap());

static RE_PLAIN: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^\d{1,4}$").unwrap());

/// Words that announce an episode number in the following token.
const EPISODE_WORDS: &[&str] = &["ep", "ep.", "eps", "episode", "episodio", "folge"];

/// Whether `text` announces an episode number in the next token ("Episode 5").
pub fn is_episode_word(text: &str) -> bool {
    EPISODE_WORDS.contains(&text.to_lowercase().as_str())
}

/// Parse a 4-digit year in the accepted range (1900–2100).
pub fn parse_year(text: &str) -> Option<u32> {
    if text.len() != 4 || !text.chars().all(|c| c.is_ascii_digit()) {
        return None;
    }
    let year: u32 = text.parse().ok()?;
    (1900..=2100).contains(&year).then_some(year)
}

/// Try every episode pattern against one token, most specific first.
pub fn try_extract(text: &str) -> Option<EpisodeMatch> {
    let text = text.trim();
    if text.is_empty() || parse_year(text).is_some() {
        return None;
    }

    try_combined(text)
        .or_else(|| try_keyword_prefix(text))
        .or_else(|| try_version_suffix(text))
        .or_else(|| try_fractional(text))
        .or_else(|| try_range(text))
        .or_else(|| try_japanese_counter(text))
        .or_else(|| try_plain_number(text))
}

/// Only the patterns that mark themselves as an episode (S01E05, EP05,
/// 第05話). Safe to apply anywhere in a name.
pub fn try_marked(text: &str) -> Option<EpisodeMatch> {
    let text = text.trim();
    try_combined(text)
        .or_else(|| try_keyword_prefix(text))
        .or_else(|| try_japanese_counter(text))
}

/// Combined season/episode: S01E05, S01E05v2, S01E05-E06, 1x05.
fn try_combined(text: &str) -> Option<EpisodeMatch> {
    if let Some(caps) = RE_COMBINED.captures(text) {
        let season: u32 = caps[1].parse().ok()?;
        let first: u32 = caps[2].parse().ok()?;
        let last = match caps.get(4) {
            Some(m) => m.as_str().parse::<u32>().ok()?.max(first),
            None => first,
        };
        return Some(EpisodeMatch {
            raw: text.to_string(),
            number: last as f32,
            season: Some(season),
            version: caps.get(3).map(|m| format!("v{}", m.as_str())),
        });
    }
    let caps = RE_COMBINED_X.captures(text)?;
    let season: u32 = caps[1].parse().ok()?;
    let episode: u32 = caps[2].parse().ok()?;
    Some(EpisodeMatch {
        raw: text.to_string(),
        number: episode as f32,
        season: Some(season),
        version: None,
    })
}

/// EP05, E05, #05.
fn try_keyword_prefix(text: &str) -> Option<EpisodeMatch> {
    let caps = RE_KEYWORD_PREFIX.captures(text)?;
    let number: u32 = caps[1].parse().ok()?;
    if number > MAX_EPISODE {
        return None;
    }
    Some(EpisodeMatch {
        version: caps.get(2).map(|m| format!("v{}", m.as_str())),
        ..EpisodeMatch::plain(text, number as f32)
    })
}

/// 05v2 → episode 5, version "v2".
fn try_version_suffix(text: &str) -> Option<EpisodeMatch> {
    let caps = RE_VERSION_SUFFIX.captures(text)?;
    let number: u32 = caps[1].parse().ok()?;
    Some(EpisodeMatch {
        version: Some(format!("v{}", &caps[2])),
        ..EpisodeMatch::plain(text, number as f32)
    })
}

/// 12.5 (recap / half episodes).
fn try_fractional(text: &str) -> Option<EpisodeMatch> {
    let caps = RE_FRACTIONAL.captures(text)?;
    let whole: u32 = caps[1].parse().ok()?;
    let tenths: u32 = caps[2].parse().ok()?;
    Some(EpisodeMatch::plain(
        text,
        whole as f32 + tenths as f32 / 10.0,
    ))
}

/// 01-03 or 01~03 inside a single token; the last episode wins.
fn try_range(text: &str) -> Option<EpisodeMatch> {
    let caps = RE_RANGE.captures(text)?;
    let first: u32 = caps[1].parse().ok()?;
    let last: u32 = caps[2].parse().ok()?;
    if last < first || last > MAX_EPISODE {
        return None;
    }
    Some(EpisodeMatch::plain(text, last as f32))
}

/// 第05話, 第05集.
fn try_japanese_counter(text: &str) -> Option<EpisodeMatch> {
    let caps = RE_JAPANESE_COUNTER.captures(text)?;
    let number: u32 = caps[1].parse().ok()?;
    Some(EpisodeMatch::plain(text, number as f32))
}

fn try_plain_number(text: &str) -> Option<EpisodeMatch> {
    if !RE_PLAIN.is_match(text) {
        return None;
    }
    let number: u32 = text.parse().ok()?;
    if number > MAX_EPISODE {
        return None;
    }
    Some(EpisodeMatch::plain(text, number as f32))
}
