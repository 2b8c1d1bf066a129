//! Title normalization for comparing catalogue titles.
//!
//! Only folds what differs between equal titles on AniList: width and case,
//! typographic punctuation, and spacing. Roman numerals and ordinals are
//! kept since "II" and "2nd Season" name different entries there.

use unicode_normalization::UnicodeNormalization;

/// Comparison key for a title.
///
/// 1. Unicode NFKC + case folding
/// 2. Character transliteration
/// 3. Punctuation erasure
/// 4. Whitespace collapse
pub fn title_key(s: &str) -> String {
    let s = unicode_normalize(s);
    let s = transliterate(&s);
    let s = erase_punctuation(&s);
    collapse_whitespace(&s)
}

// ── Level 1: Unicode NFKC + case folding ──────────────────────────────

fn unicode_normalize(s: &str) -> String {
    s.nfkc().collect::<String>().to_lowercase()
}

// ── Level 2: Character transliteration ────────────────────────────────

fn transliterate(s: &str) -> String {
    let mut result = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '\u{00D7}' | '\u{2715}' | '\u{2716}' => result.push('x'), // ×, ✕, ✖
            '\u{2019}' | '\u{2018}' | '\u{02BC}' => result.push('\''),
            '\u{2013}' | '\u{2014}' => result.push('-'),
            '\u{00E6}' => result.push_str("ae"),
            '\u{00DF}' => result.push_str("ss"),
            c => result.push(c),
        }
    }
    result
}

// ── Level 3: Punctuation erasure ──────────────────────────────────────

/// Punctuation becomes a space, apostrophes vanish ("Kaguya-sama" and
/// "Kaguya sama" compare equal, "Hell's" and "Hells" too).
fn erase_punctuation(s: &str) -> String {
    s.chars()
        .filter(|&c| c != '\'')
        .map(|c| if c.is_alphanumeric() { c } else { ' ' })
        .collect()
}

// ── Level 4: Whitespace collapse ──────────────────────────────────────

fn collapse_whitespace(s: &str) -> String {
    s.split_whitespace().collect::<Vec<_>>().join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_case_and_width() {
        assert_eq!(title_key("ＦＲＩＥＲＥＮ"), "frieren");
        assert_eq!(title_key("Sousou no Frieren"), title_key("SOUSOU NO FRIEREN"));
    }

    #[test]
    fn test_punctuation_and_spacing() {
        assert_eq!(title_key("Re:Zero  -  Starting Life"), "re zero starting life");
        assert_eq!(title_key("Kaguya-sama"), title_key("Kaguya sama"));
        assert_eq!(title_key("Hell’s Paradise"), "hells paradise");
    }

    #[test]
    fn test_multiplication_sign() {
        assert_eq!(title_key("HUNTER×HUNTER"), "hunterxhunter");
    }

    #[test]
    fn test_numerals_are_kept() {
        assert_ne!(title_key("Overlord II"), title_key("Overlord"));
        assert_eq!(title_key("Overlord II"), "overlord ii");
    }
}
