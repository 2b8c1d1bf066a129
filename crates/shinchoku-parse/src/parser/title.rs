use crate::tokenizer::{Token, TokenKind};

/// Extract the anime title from remaining unidentified text tokens.
///
/// The title is the first run of unidentified text. Dashes inside the run
/// are kept ("Re:Zero - Starting Life") unless an identified token or
/// bracket ends it.
pub fn extract_title(tokens: &[Token], identified: &[bool]) -> Option<String> {
    let mut parts: Vec<&str> = Vec::new();
    let mut started = false;

    for (i, token) in tokens.iter().enumerate() {
        if identified[i] {
            if started {
                break;
            }
            continue;
        }

        match token.kind {
            TokenKind::Text => {
                started = true;
                parts.push(&token.text);
            }
            TokenKind::Delimiter if started => parts.push(" "),
            TokenKind::Dash if started => {
                // A dash only belongs to the title if more title follows.
                if continues_title(tokens, identified, i) {
                    parts.push("-");
                } else {
                    break;
                }
            }
            TokenKind::Bracketed if started => break,
            _ => {}
        }
    }

    let title = normalize_spacing(&parts.join(""));
    (!title.is_empty()).then_some(title)
}

/// Whether the next non-delimiter token after `dash` is unidentified text.
fn continues_title(tokens: &[Token], identified: &[bool], dash: usize) -> bool {
    tokens
        .iter()
        .enumerate()
        .skip(dash + 1)
        .find(|(_, t)| t.kind != TokenKind::Delimiter)
        .is_some_and(|(j, t)| t.kind == TokenKind::Text && !identified[j])
}

fn normalize_spacing(s: &str) -> String {
    s.split_whitespace().collect::<Vec<_>>().join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tokenizer::tokenize;

    fn title_of(input: &str, mark: &[usize]) -> Option<String> {
        let (tokens, _) = tokenize(input);
        let mut identified = vec![false; tokens.len()];
        for &i in mark {
            identified[i] = true;
        }
        extract_title(&tokens, &identified)
    }

    #[test]
    fn test_simple_title() {
        assert_eq!(title_of("Sousou no Frieren", &[]).as_deref(), Some("Sousou no Frieren"));
    }

    #[test]
    fn test_skips_leading_identified() {
        // [Group] is token 0.
        assert_eq!(title_of("[Group] Frieren", &[0]).as_deref(), Some("Frieren"));
    }

    #[test]
    fn test_dash_before_identified_ends_title() {
        let (tokens, _) = tokenize("Frieren - 05");
        let ep = tokens.iter().position(|t| t.text == "05").unwrap();
        assert_eq!(title_of("Frieren - 05", &[ep]).as_deref(), Some("Frieren"));
    }

    #[test]
    fn test_dash_inside_title_kept() {
        assert_eq!(
            title_of("Kaguya-sama Love is War", &[]).as_deref(),
            Some("Kaguya-sama Love is War")
        );
    }

    #[test]
    fn test_spaced_dash_inside_title_kept() {
        assert_eq!(
            title_of("Re:Zero - Starting Life", &[]).as_deref(),
            Some("Re:Zero - Starting Life")
        );
    }

    #[test]
    fn test_empty() {
        assert_eq!(title_of("", &[]), None);
    }
}
