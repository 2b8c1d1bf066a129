use regex::Regex;
use std::sync::LazyLock;

/// Result of a successful season (or part) extraction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SeasonMatch {
    pub raw: String,
    pub number: u32,
}

// ── Regex patterns ──────────────────────────────────────────────

/// "S2", "S01".
static RE_S_PREFIX: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?i)^S(\d{1,2})$").unwrap());

/// "2nd", "3rd", "4th" as the first half of "2nd Season".
static RE_ORDINAL: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)^(\d{1,2})(?:st|nd|rd|th)$").unwrap());

/// "第2期", "2期".
static RE_JAPANESE_SEASON: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(?:第)?(\d{1,2})期$").unwrap());

const SEASON_WORDS: &[&str] = &["season", "saison", "series"];
const PART_WORDS: &[&str] = &["part", "cour"];

/// Single-token season markers: "S2", "第2期".
pub fn try_extract(text: &str) -> Option<SeasonMatch> {
    let text = text.trim();
    if text.is_empty() {
        return None;
    }
    try_s_prefix(text).or_else(|| try_japanese_season(text))
}

/// Two-token season markers: "Season 2", "Season II", "2nd Season".
pub fn try_pair(first: &str, second: &str) -> Option<SeasonMatch> {
    let raw = format!("{first} {second}");
    let number = if is_word(first, SEASON_WORDS) {
        parse_number_or_roman(second)?
    } else if is_word(second, SEASON_WORDS) {
        RE_ORDINAL.captures(first)?[1].parse().ok()?
    } else {
        return None;
    };
    (number > 0).then_some(SeasonMatch { raw, number })
}

/// "Part 2", "Part II", "Cour 2".
pub fn try_part(first: &str, second: &str) -> Option<SeasonMatch> {
    if !is_word(first, PART_WORDS) {
        return None;
    }
    let number = parse_number_or_roman(second)?;
    (number > 0).then_some(SeasonMatch {
        raw: format!("{first} {second}"),
        number,
    })
}

fn is_word(text: &str, words: &[&str]) -> bool {
    words.contains(&text.to_lowercase().as_str())
}

fn try_s_prefix(text: &str) -> Option<SeasonMatch> {
    let caps = RE_S_PREFIX.captures(text)?;
    let number: u32 = caps[1].parse().ok()?;
    Some(SeasonMatch {
        raw: text.to_string(),
        number,
    })
}

fn try_japanese_season(text: &str) -> Option<SeasonMatch> {
    let caps = RE_JAPANESE_SEASON.captures(text)?;
    let number: u32 = caps[1].parse().ok()?;
    Some(SeasonMatch {
        raw: text.to_string(),
        number,
    })
}

/// Parse a number that might be Arabic or Roman numerals.
fn parse_number_or_roman(s: &str) -> Option<u32> {
    if let Ok(n) = s.parse::<u32>() {
        return (n < 100).then_some(n);
    }
    roman_to_u32(s)
}

/// Roman numerals up to L.
fn roman_to_u32(s: &str) -> Option<u32> {
    let mut total: i32 = 0;
    let mut prev = 0i32;

    for c in s.to_uppercase().chars().rev() {
        let value = match c {
            'I' => 1,
            'V' => 5,
            'X' => 10,
            'L' => 50,
            _ => return None,
        };
        if value < prev {
            total -= value;
        } else {
            total += value;
        }
        prev = value;
    }

    (total > 0).then_some(total as u32)
}
