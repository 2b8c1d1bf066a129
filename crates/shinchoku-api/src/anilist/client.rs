use std::fmt;
use std::time::Duration;

use reqwest::Client;

use super::auth::AccessToken;
use super::error::AniListError;
use super::types::{page_into_entries, GraphQLResponse, PageResponse, SaveResponse};
use crate::traits::{CatalogueEntry, CatalogueService, ListStatus, SavedEntry, SearchQuery};

pub const DEFAULT_API_URL: &str = "https://graphql.anilist.co";

const SEARCH_QUERY: &str = r#"
query ($search: String, $year: FuzzyDateInt, $formatIn: [MediaFormat], $page: Int, $onList: Boolean) {
    Page(page: $page, perPage: 50) {
        media(search: $search, type: ANIME, startDate_greater: $year, format_in: $formatIn, onList: $onList) {
            id
            title { romaji english }
            season
            seasonYear
            episodes
            duration
            format
            status
            mediaListEntry {
                status
                progress
            }
        }
    }
}
"#;

const SAVE_MEDIA_LIST_ENTRY_MUTATION: &str = r#"
mutation ($mediaId: Int, $progress: Int, $status: MediaListStatus) {
    SaveMediaListEntry(mediaId: $mediaId, progress: $progress, status: $status) {
        id
        mediaId
        status
        progress
    }
}
"#;

/// Connection settings for [`AniListClient`].
#[derive(Debug, Clone)]
pub struct ClientOptions {
    pub api_url: String,
    pub timeout: Duration,
    /// Episodes this short or shorter (minutes) never count as a series
    /// season.
    pub min_episode_duration: u32,
}

impl Default for ClientOptions {
    fn default() -> Self {
        Self {
            api_url: DEFAULT_API_URL.into(),
            timeout: Duration::from_secs(10),
            min_episode_duration: 21,
        }
    }
}

/// AniList GraphQL API client.
pub struct AniListClient {
    access_token: Option<AccessToken>,
    http: Client,
    options: ClientOptions,
}

impl fmt::Debug for AniListClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AniListClient")
            .field("access_token", &self.access_token)
            .field("api_url", &self.options.api_url)
            .finish()
    }
}

impl AniListClient {
    /// Build a client. Without a token, searches still work but list state
    /// is missing and writes are rejected by the service.
    pub fn new(access_token: Option<AccessToken>, options: ClientOptions) -> Result<Self, AniListError> {
        let http = Client::builder().timeout(options.timeout).build()?;
        Ok(Self {
            access_token,
            http,
            options,
        })
    }

    async fn graphql_request<T: serde::de::DeserializeOwned>(
        &self,
        operation: &str,
        query: &str,
        variables: serde_json::Value,
    ) -> Result<T, AniListError> {
        tracing::debug!(operation, %variables, "AniList GraphQL request");

        let mut request = self
            .http
            .post(&self.options.api_url)
            .header("Content-Type", "application/json")
            .header("Accept", "application/json")
            .json(&serde_json::json!({
                "query": query,
                "variables": variables,
            }));
        if let Some(token) = &self.access_token {
            request = request.bearer_auth(token.secret());
        }

        let resp = request.send().await?;

        let status = resp.status();
        if !status.is_success() {
            let status_code = status.as_u16();
            let body = resp.text().await.unwrap_or_default();
            tracing::warn!(operation, status = status_code, "AniList API error");
            return Err(AniListError::Api {
                status: status_code,
                message: error_message(&body),
            });
        }

        tracing::debug!(operation, status = %status, "AniList response received");
        let body: GraphQLResponse<T> = resp
            .json()
            .await
            .map_err(|e| AniListError::Parse(e.to_string()))?;

        if let Some(first) = body.errors.into_iter().next() {
            tracing::warn!(operation, message = %first.message, "AniList GraphQL error");
            return Err(AniListError::GraphQl {
                status: first.status,
                message: first.message,
            });
        }

        body.data
            .ok_or_else(|| AniListError::Parse(format!("{operation}: response has no data")))
    }
}

/// Pull the first GraphQL error message out of an error body, falling back
/// to the raw text.
fn error_message(body: &str) -> String {
    serde_json::from_str::<GraphQLResponse<serde_json::Value>>(body)
        .ok()
        .and_then(|r| r.errors.into_iter().next())
        .map(|e| e.message)
        .unwrap_or_else(|| body.trim().to_string())
}

impl CatalogueService for AniListClient {
    type Error = AniListError;

    async fn search(&self, query: &SearchQuery) -> Result<Vec<CatalogueEntry>, AniListError> {
        let formats: Option<Vec<&str>> = (!query.formats.is_empty())
            .then(|| query.formats.iter().map(|f| f.as_anilist()).collect());
        // FuzzyDateInt is YYYYMMDD; "greater than YYYY0000" keeps the year itself.
        let year = query.year.map(|y| y * 10_000);

        let resp: PageResponse = self
            .graphql_request(
                "Search",
                SEARCH_QUERY,
                serde_json::json!({
                    "search": query.search,
                    "year": year,
                    "formatIn": formats,
                    "page": 1,
                    "onList": query.on_list,
                }),
            )
            .await?;

        let entries = page_into_entries(resp.page.media, self.options.min_episode_duration);
        tracing::debug!(search = %query.search, results = entries.len(), "AniList search done");
        Ok(entries)
    }

    async fn mutate(
        &self,
        media_id: u64,
        progress: u32,
        status: Option<ListStatus>,
    ) -> Result<SavedEntry, AniListError> {
        // AniList ignores null variables, so an absent status is left as is.
        let mut vars = serde_json::json!({
            "mediaId": media_id,
            "progress": progress,
        });
        if let Some(status) = status.and_then(ListStatus::as_anilist) {
            vars["status"] = serde_json::json!(status);
        }

        let resp: SaveResponse = self
            .graphql_request("SaveMediaListEntry", SAVE_MEDIA_LIST_ENTRY_MUTATION, vars)
            .await?;
        Ok(resp.save_media_list_entry.into_saved_entry())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_message_from_graphql_body() {
        let body = r#"{"errors":[{"message":"Invalid token","status":400}],"data":null}"#;
        assert_eq!(error_message(body), "Invalid token");
    }

    #[test]
    fn test_error_message_falls_back_to_text() {
        assert_eq!(error_message("  Bad Gateway \n"), "Bad Gateway");
    }

    #[test]
    fn test_debug_redacts_token() {
        let client = AniListClient::new(
            Some(AccessToken::new("very-secret-token")),
            ClientOptions::default(),
        )
        .unwrap();
        let printed = format!("{client:?}");
        assert!(!printed.contains("very-secret-token"));
        assert!(printed.contains("graphql.anilist.co"));
    }
}
