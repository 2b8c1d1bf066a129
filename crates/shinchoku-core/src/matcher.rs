use shinchoku_api::CatalogueEntry;

use crate::error::CoreError;
use crate::normalize::title_key;

/// Pick the entry a search meant.
///
/// The service ranks by relevance, so the first result wins unless other
/// results carry the same title. Those ties are narrowed by release year
/// when one is known; anything still tied is ambiguous.
pub fn pick_match(
    results: Vec<CatalogueEntry>,
    query: &str,
    year: Option<u32>,
) -> Result<CatalogueEntry, CoreError> {
    let Some(first) = results.first() else {
        return Err(CoreError::NotFound {
            title: query.to_string(),
        });
    };

    let key = title_key(&first.title);
    let mut ties: Vec<CatalogueEntry> = results
        .into_iter()
        .filter(|entry| title_key(&entry.title) == key)
        .collect();

    if ties.len() > 1 {
        if let Some(year) = year {
            let same_year: Vec<CatalogueEntry> = ties
                .iter()
                .filter(|entry| entry.season_year == Some(year))
                .cloned()
                .collect();
            if !same_year.is_empty() {
                ties = same_year;
            }
        }
    }

    if ties.len() == 1 {
        return Ok(ties.remove(0));
    }

    tracing::debug!(query, candidates = ties.len(), "Ambiguous search result");
    Err(CoreError::MatchAmbiguous {
        query: query.to_string(),
        candidates: ties.iter().map(describe).collect(),
    })
}

fn describe(entry: &CatalogueEntry) -> String {
    match entry.season_year {
        Some(year) => format!("{} ({year})", entry.title),
        None => entry.title.clone(),
    }
}

#[cfg(test)]
mod tests {
    use shinchoku_api::{ListStatus, MediaFormat};

    use super::*;

    fn entry(id: u64, title: &str, year: Option<u32>) -> CatalogueEntry {
        CatalogueEntry {
            media_id: id,
            title: title.into(),
            format: MediaFormat::Tv,
            episodes: Some(12),
            duration: Some(24),
            release_status: Some("FINISHED".into()),
            season: None,
            season_year: year,
            on_list: true,
            list_status: ListStatus::Current,
            list_progress: 0,
            seasons: Vec::new(),
        }
    }

    #[test]
    fn test_no_results_is_not_found() {
        let err = pick_match(Vec::new(), "Frieren", None).unwrap_err();
        assert!(matches!(err, CoreError::NotFound { title } if title == "Frieren"));
    }

    #[test]
    fn test_first_result_wins_without_ties() {
        let results = vec![
            entry(1, "Sousou no Frieren", Some(2023)),
            entry(2, "Sousou no Frieren: Marumaru no Mahou", Some(2024)),
        ];
        assert_eq!(pick_match(results, "Frieren", None).unwrap().media_id, 1);
    }

    #[test]
    fn test_year_breaks_title_tie() {
        let results = vec![
            entry(10, "Hunter x Hunter", Some(1999)),
            entry(11, "HUNTER X HUNTER", Some(2011)),
        ];
        assert_eq!(
            pick_match(results, "Hunter x Hunter", Some(2011)).unwrap().media_id,
            11
        );
    }

    #[test]
    fn test_tie_without_year_is_ambiguous() {
        let results = vec![
            entry(10, "Hunter x Hunter", Some(1999)),
            entry(11, "Hunter x Hunter", Some(2011)),
        ];
        match pick_match(results, "Hunter x Hunter", None) {
            Err(CoreError::MatchAmbiguous { query, candidates }) => {
                assert_eq!(query, "Hunter x Hunter");
                assert_eq!(
                    candidates,
                    vec!["Hunter x Hunter (1999)", "Hunter x Hunter (2011)"]
                );
            }
            other => panic!("Expected MatchAmbiguous, got {other:?}"),
        }
    }

    #[test]
    fn test_year_matching_nothing_keeps_ambiguity() {
        let results = vec![
            entry(10, "Hunter x Hunter", Some(1999)),
            entry(11, "Hunter x Hunter", Some(2011)),
        ];
        assert!(matches!(
            pick_match(results, "Hunter x Hunter", Some(2020)),
            Err(CoreError::MatchAmbiguous { .. })
        ));
    }
}
