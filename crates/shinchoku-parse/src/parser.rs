pub mod episode;
pub mod season;
pub mod title;

use std::sync::LazyLock;

use regex::Regex;

use crate::elements::{Elements, MediaKind};
use crate::keyword::{self, KeywordKind};
use crate::tokenizer::{self, Token, TokenKind};

use episode::EpisodeMatch;

/// Whether a name is a file or a folder. Folder names never yield an
/// episode from bare numbers ("Mob Psycho 100").
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum NameKind {
    File,
    Folder,
}

static RE_RESOLUTION: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)^(?:\d{3,4}[pi]|\d{3,4}[x×](\d{3,4}))$").unwrap());

static RE_VERSION: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?i)^v(\d)$").unwrap());

/// Parse an anime filename into its component elements.
///
/// # Example
/// ```
/// let result = shinchoku_parse::parse("[SubsPlease] Sousou no Frieren - 05 (1080p) [ABCD1234].mkv");
/// assert_eq!(result.title.as_deref(), Some("Sousou no Frieren"));
/// assert_eq!(result.episode_number, Some(5.0));
/// assert_eq!(result.release_group.as_deref(), Some("SubsPlease"));
/// assert_eq!(result.resolution.as_deref(), Some("1080p"));
/// assert_eq!(result.checksum.as_deref(), Some("ABCD1234"));
/// ```
pub fn parse(filename: &str) -> Elements {
    parse_name(filename, NameKind::File)
}

/// Parse a folder name. Only title, season, part and year are meaningful;
/// explicitly marked episodes (S01E05) are still picked up.
pub fn parse_folder(name: &str) -> Elements {
    parse_name(name, NameKind::Folder)
}

fn parse_name(name: &str, kind: NameKind) -> Elements {
    let (tokens, extension) = tokenizer::tokenize(name);
    let mut elements = Elements {
        file_extension: extension,
        ..Default::default()
    };
    let mut identified = vec![false; tokens.len()];

    // Pass 1: bracketed keywords ("[1080p]", "(BD HEVC FLAC)").
    identify_bracketed_keywords(&tokens, &mut elements, &mut identified);

    // Pass 2: release group (first bracketed token before any text).
    extract_release_group(&tokens, &mut elements, &mut identified);

    // Pass 3: CRC32 checksum.
    extract_checksum(&tokens, &mut elements, &mut identified);

    // Pass 4: keywords in free text.
    identify_free_keywords(&tokens, &mut elements, &mut identified);

    // Pass 5: season and part markers.
    extract_season(&tokens, &mut elements, &mut identified);

    // Pass 6: year outside brackets.
    let year_index = extract_year(&tokens, &mut elements, &mut identified);

    // Pass 7: episode number.
    extract_episode(&tokens, &mut elements, &mut identified, kind);

    // Pass 8: title from what is left.
    elements.title = title::extract_title(&tokens, &identified);

    // "1917.mkv": the year was the whole title.
    if elements.title.is_none() {
        if let Some(i) = year_index {
            identified[i] = false;
            elements.year = None;
            elements.title = title::extract_title(&tokens, &identified);
        }
    }

    elements
}

/// Pass 1: bracketed tokens that are a keyword, or made only of keywords.
fn identify_bracketed_keywords(tokens: &[Token], elements: &mut Elements, identified: &mut [bool]) {
    for (i, token) in tokens.iter().enumerate() {
        if !token.is_enclosed() {
            continue;
        }
        if let Some(kind) = keyword::lookup(&token.text, true) {
            apply_keyword(kind, &token.text, elements);
            identified[i] = true;
            continue;
        }

        let words: Vec<&str> = token
            .text
            .split(|c: char| c.is_whitespace() || c == '_' || c == ',')
            .filter(|w| !w.is_empty())
            .collect();
        let all_known = !words.is_empty()
            && words.iter().all(|w| {
                keyword::lookup(w, true).is_some()
                    || parse_resolution(w).is_some()
                    || is_checksum(w)
                    || RE_VERSION.is_match(w)
            });
        if !all_known {
            continue;
        }
        for word in words {
            if let Some(kind) = keyword::lookup(word, true) {
                apply_keyword(kind, word, elements);
            } else if let Some(res) = parse_resolution(word) {
                elements.resolution.get_or_insert(res);
            } else if is_checksum(word) {
                elements.checksum.get_or_insert_with(|| word.to_string());
            }
        }
        identified[i] = true;
    }
}

/// Pass 2: the first bracketed token before any text is the release group.
fn extract_release_group(tokens: &[Token], elements: &mut Elements, identified: &mut [bool]) {
    for (i, token) in tokens.iter().enumerate() {
        if identified[i] {
            continue;
        }
        match token.kind {
            TokenKind::Bracketed => {
                let numeric = token.text.chars().all(|c| c.is_ascii_digit());
                if !numeric && !is_checksum(&token.text) {
                    elements.release_group = Some(token.text.clone());
                    identified[i] = true;
                }
                return;
            }
            TokenKind::Text => return,
            _ => {}
        }
    }
}

/// Pass 3: an 8-character hex string in brackets is a CRC32 checksum.
fn extract_checksum(tokens: &[Token], elements: &mut Elements, identified: &mut [bool]) {
    if elements.checksum.is_some() {
        return;
    }
    for (i, token) in tokens.iter().enumerate() {
        if token.is_enclosed() && !identified[i] && is_checksum(&token.text) {
            elements.checksum = Some(token.text.clone());
            identified[i] = true;
            return;
        }
    }
}

fn is_checksum(s: &str) -> bool {
    s.len() == 8
        && s.chars().all(|c| c.is_ascii_hexdigit())
        && s.chars().any(|c| c.is_ascii_alphabetic())
}

/// Pass 4: unambiguous keywords, resolutions and "v2" in free text.
fn identify_free_keywords(tokens: &[Token], elements: &mut Elements, identified: &mut [bool]) {
    for (i, token) in tokens.iter().enumerate() {
        if token.kind != TokenKind::Text || identified[i] {
            continue;
        }
        if let Some(kind) = keyword::lookup(&token.text, false) {
            apply_keyword(kind, &token.text, elements);
            identified[i] = true;
        } else if let Some(res) = parse_resolution(&token.text) {
            elements.resolution.get_or_insert(res);
            identified[i] = true;
        } else if RE_VERSION.is_match(&token.text) {
            elements
                .release_version
                .get_or_insert_with(|| token.text.to_lowercase());
            identified[i] = true;
        }
    }
}

/// Pass 5: "S2", "第2期", "Season 2", "2nd Season", "Part 2".
fn extract_season(tokens: &[Token], elements: &mut Elements, identified: &mut [bool]) {
    let texts = unidentified_texts(tokens, identified);

    for (pos, &i) in texts.iter().enumerate() {
        if identified[i] {
            continue;
        }
        if elements.season_number.is_none() {
            if let Some(m) = season::try_extract(&tokens[i].text) {
                elements.season_number = Some(m.number);
                identified[i] = true;
                continue;
            }
        }

        let Some(&next) = texts.get(pos + 1) else {
            continue;
        };
        if !adjacent(tokens, i, next) {
            continue;
        }
        let (first, second) = (&tokens[i].text, &tokens[next].text);

        if elements.season_number.is_none() {
            if let Some(m) = season::try_pair(first, second) {
                elements.season_number = Some(m.number);
                identified[i] = true;
                identified[next] = true;
                continue;
            }
        }
        if elements.part_number.is_none() {
            if let Some(m) = season::try_part(first, second) {
                elements.part_number = Some(m.number);
                identified[i] = true;
                identified[next] = true;
            }
        }
    }
}

/// Pass 6: the first unbracketed 4-digit year that is not the first word.
///
/// Returns the token index so the caller can give it back to the title.
fn extract_year(tokens: &[Token], elements: &mut Elements, identified: &mut [bool]) -> Option<usize> {
    let texts = unidentified_texts(tokens, identified);
    for &i in texts.iter().skip(1) {
        if let Some(year) = episode::parse_year(&tokens[i].text) {
            elements.year = Some(year);
            identified[i] = true;
            return Some(i);
        }
    }
    None
}

/// Pass 7: episode number, most explicit pattern first.
fn extract_episode(
    tokens: &[Token],
    elements: &mut Elements,
    identified: &mut [bool],
    kind: NameKind,
) {
    let found = find_marked(tokens, identified).or_else(|| match kind {
        NameKind::File => find_after_episode_word(tokens, identified)
            .or_else(|| find_after_dash(tokens, identified))
            .or_else(|| find_trailing_number(tokens, identified))
            .or_else(|| find_bracketed(tokens, identified)),
        NameKind::Folder => None,
    });

    let Some((index, m)) = found else {
        return;
    };
    identified[index] = true;
    let m = extend_range(tokens, identified, index, m);

    if elements.season_number.is_none() {
        elements.season_number = m.season;
    }
    if m.version.is_some() {
        elements.release_version = m.version;
    }
    elements.episode = Some(m.raw);
    elements.episode_number = Some(m.number);
}

/// "S01E05", "EP05", "第05話" anywhere in the name.
fn find_marked(tokens: &[Token], identified: &[bool]) -> Option<(usize, EpisodeMatch)> {
    tokens.iter().enumerate().find_map(|(i, t)| {
        (t.kind == TokenKind::Text && !identified[i])
            .then(|| episode::try_marked(&t.text))
            .flatten()
            .map(|m| (i, m))
    })
}

/// "Episode 5", "Ep 05".
fn find_after_episode_word(
    tokens: &[Token],
    identified: &mut [bool],
) -> Option<(usize, EpisodeMatch)> {
    let texts = unidentified_texts(tokens, identified);
    for pair in texts.windows(2) {
        let (word, number) = (pair[0], pair[1]);
        if episode::is_episode_word(&tokens[word].text) && adjacent(tokens, word, number) {
            if let Some(m) = episode::try_extract(&tokens[number].text) {
                identified[word] = true;
                return Some((number, m));
            }
        }
    }
    None
}

/// "Title - 05".
fn find_after_dash(tokens: &[Token], identified: &[bool]) -> Option<(usize, EpisodeMatch)> {
    for (i, token) in tokens.iter().enumerate() {
        if token.kind != TokenKind::Dash {
            continue;
        }
        // Something has to come before the dash for it to separate a title.
        if !tokens[..i].iter().any(|t| t.kind == TokenKind::Text) {
            continue;
        }
        let Some(next) = next_significant(tokens, i) else {
            continue;
        };
        if tokens[next].kind != TokenKind::Text || identified[next] {
            continue;
        }
        if let Some(m) = episode::try_extract(&tokens[next].text) {
            return Some((next, m));
        }
    }
    None
}

/// The last bare number after some title text ("Title 05 1080p"), or a
/// name that is nothing but a number ("05.mkv").
fn find_trailing_number(tokens: &[Token], identified: &[bool]) -> Option<(usize, EpisodeMatch)> {
    let texts = unidentified_texts(tokens, identified);
    let skip = usize::from(texts.len() > 1);
    texts
        .iter()
        .skip(skip)
        .rev()
        .find_map(|&i| episode::try_extract(&tokens[i].text).map(|m| (i, m)))
}

/// "[05]".
fn find_bracketed(tokens: &[Token], identified: &[bool]) -> Option<(usize, EpisodeMatch)> {
    tokens.iter().enumerate().find_map(|(i, t)| {
        (t.is_enclosed() && !identified[i])
            .then(|| episode::try_extract(&t.text))
            .flatten()
            .map(|m| (i, m))
    })
}

/// "01 - 03" or "S01E05-E06": a dash and a higher number right after the
/// match turn it into a range, and the last episode wins.
fn extend_range(
    tokens: &[Token],
    identified: &mut [bool],
    index: usize,
    m: EpisodeMatch,
) -> EpisodeMatch {
    let Some(dash) = next_significant(tokens, index) else {
        return m;
    };
    if tokens[dash].kind != TokenKind::Dash {
        return m;
    }
    let Some(end) = next_significant(tokens, dash) else {
        return m;
    };
    if tokens[end].kind != TokenKind::Text || identified[end] {
        return m;
    }
    let upper = tokens[end].text.trim_start_matches(['E', 'e']);
    match episode::try_extract(upper) {
        Some(last) if last.number > m.number && last.season.is_none() => {
            identified[end] = true;
            EpisodeMatch {
                raw: format!("{}-{}", m.raw, tokens[end].text),
                number: last.number,
                ..m
            }
        }
        _ => m,
    }
}

fn unidentified_texts(tokens: &[Token], identified: &[bool]) -> Vec<usize> {
    tokens
        .iter()
        .enumerate()
        .filter(|(i, t)| t.kind == TokenKind::Text && !identified[*i])
        .map(|(i, _)| i)
        .collect()
}

/// Index of the next token after `from` that is not a soft delimiter.
fn next_significant(tokens: &[Token], from: usize) -> Option<usize> {
    (from + 1..tokens.len()).find(|&j| tokens[j].kind != TokenKind::Delimiter)
}

/// Two text tokens separated only by delimiters.
fn adjacent(tokens: &[Token], a: usize, b: usize) -> bool {
    b > a && tokens[a + 1..b].iter().all(|t| t.kind == TokenKind::Delimiter)
}

/// "1920x1080" → "1080p"; "1080p" as-is.
fn parse_resolution(s: &str) -> Option<String> {
    let caps = RE_RESOLUTION.captures(s)?;
    Some(match caps.get(1) {
        Some(height) => format!("{}p", height.as_str()),
        None => s.to_lowercase(),
    })
}

fn apply_keyword(kind: KeywordKind, text: &str, elements: &mut Elements) {
    let slot = match kind {
        KeywordKind::VideoCodec => &mut elements.video_codec,
        KeywordKind::AudioCodec => &mut elements.audio_codec,
        KeywordKind::Resolution => &mut elements.resolution,
        KeywordKind::Source => &mut elements.source,
        KeywordKind::AnimeType => {
            if elements.anime_type.is_none() {
                elements.anime_type = MediaKind::from_keyword(text);
            }
            return;
        }
        _ => return,
    };
    slot.get_or_insert_with(|| text.to_string());
}
