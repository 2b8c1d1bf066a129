/// Token types produced by the tokenizer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenKind {
    /// Text enclosed in brackets: `[SubGroup]`, `(720p)`.
    Bracketed,
    /// A word between delimiters.
    Text,
    /// A dash-family separator (hyphen, en dash, em dash), kept so `Title - 05` can be spotted.
    Dash,
    /// A run of soft delimiters (space, underscore, dot).
    Delimiter,
}

/// A single token from a file or folder name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    pub kind: TokenKind,
    pub text: String,
}

impl Token {
    fn new(kind: TokenKind, text: impl Into<String>) -> Self {
        Self {
            kind,
            text: text.into(),
        }
    }

    pub fn is_enclosed(&self) -> bool {
        self.kind == TokenKind::Bracketed
    }
}

/// Opening/closing bracket pairs, including CJK brackets.
const BRACKETS: &[(char, char)] = &[
    ('[', ']'),
    ('(', ')'),
    ('{', '}'),
    ('\u{300C}', '\u{300D}'), // 「」
    ('\u{300E}', '\u{300F}'), // 『』
    ('\u{3010}', '\u{3011}'), // 【】
];

const VIDEO_EXTENSIONS: &[&str] = &[
    "mkv", "mp4", "avi", "ogm", "wmv", "mpg", "flv", "webm", "m4v", "ts", "mov", "3gp", "rm",
    "rmvb", "m2ts",
];

fn is_soft_delimiter(c: char) -> bool {
    matches!(c, ' ' | '_' | '.' | '+' | '\u{3000}')
}

fn is_dash(c: char) -> bool {
    matches!(c, '-' | '\u{2013}' | '\u{2014}')
}

fn closing_bracket(c: char) -> Option<char> {
    BRACKETS
        .iter()
        .find(|(open, _)| *open == c)
        .map(|(_, close)| *close)
}

/// Tokenize a file or folder name.
///
/// Returns the tokens and the stripped video file extension, if any.
/// A dot inside a purely numeric word stays in it, so "12.5" survives as
/// one token while "S02E05.1080p" splits.
pub fn tokenize(input: &str) -> (Vec<Token>, Option<String>) {
    let (input, extension) = strip_extension(input);
    let chars: Vec<char> = input.chars().collect();
    let mut tokens = Vec::new();
    let mut i = 0;

    while i < chars.len() {
        let c = chars[i];

        if let Some(close) = closing_bracket(c) {
            i += 1;
            let start = i;
            while i < chars.len() && chars[i] != close {
                i += 1;
            }
            let text: String = chars[start..i].iter().collect();
            let text = text.trim();
            if !text.is_empty() {
                tokens.push(Token::new(TokenKind::Bracketed, text));
            }
            // Skip the closing bracket (an unclosed one swallows the rest).
            i += 1;
            continue;
        }

        if is_dash(c) {
            tokens.push(Token::new(TokenKind::Dash, "-"));
            i += 1;
            continue;
        }

        if is_soft_delimiter(c) {
            while i < chars.len() && is_soft_delimiter(chars[i]) {
                i += 1;
            }
            tokens.push(Token::new(TokenKind::Delimiter, " "));
            continue;
        }

        let start = i;
        while i < chars.len() && !is_dash(chars[i]) && closing_bracket(chars[i]).is_none() {
            if is_soft_delimiter(chars[i]) {
                let decimal_point = chars[i] == '.'
                    && i > start
                    && i + 1 < chars.len()
                    && chars[start..i].iter().all(|c| c.is_ascii_digit())
                    && chars[i + 1].is_ascii_digit();
                if !decimal_point {
                    break;
                }
            }
            i += 1;
        }
        let text: String = chars[start..i].iter().collect();
        if !text.is_empty() {
            tokens.push(Token::new(TokenKind::Text, text));
        }
    }

    (tokens, extension)
}

/// Strip a known video extension (case-insensitive).
fn strip_extension(input: &str) -> (&str, Option<String>) {
    if let Some((stem, ext)) = input.rsplit_once('.') {
        let lower = ext.to_ascii_lowercase();
        if !stem.is_empty() && VIDEO_EXTENSIONS.contains(&lower.as_str()) {
            return (stem, Some(lower));
        }
    }
    (input, None)
}
