//! Google Custom Search JSON API adapter

use crate::planner::SearchTask;
use crate::search::error::SearchError;
use crate::search::{SearchProvider, SearchResult};
use reqwest::{Client as ReqwestClient, StatusCode};
use serde::Deserialize;
use serde_json::{Map, Value};
use std::time::Duration;
use tracing::{debug, error, instrument};

/// Largest page the API will return
pub const MAX_PAGE_SIZE: u32 = 10;

const DEFAULT_BASE_URL: &str = "https://www.googleapis.com";
const SEARCH_PATH: &str = "customsearch/v1";

const PUBLISHED_TIME_TAGS: &[&str] = &[
    "article:published_time",
    "og:published_time",
    "datepublished",
    "pubdate",
];
const AUTHOR_TAGS: &[&str] = &["author", "article:author", "og:article:author"];

#[derive(Debug, Deserialize)]
struct SearchResponse {
    #[serde(default)]
    items: Vec<SearchItem>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SearchItem {
    #[serde(default)]
    title: String,
    #[serde(default)]
    link: String,
    #[serde(default)]
    snippet: String,
    display_link: Option<String>,
    pagemap: Option<PageMap>,
}

#[derive(Debug, Deserialize)]
struct PageMap {
    #[serde(default)]
    metatags: Vec<Map<String, Value>>,
}

/// Client for the Google Custom Search JSON API
#[derive(Clone)]
pub struct GoogleSearchClient {
    client: ReqwestClient,
    base_url: String,
    api_key: String,
    engine_id: String,
}

impl GoogleSearchClient {
    /// Create a new client with the given credentials and request timeout
    pub fn new(
        api_key: impl Into<String>,
        engine_id: impl Into<String>,
        timeout: Duration,
    ) -> Result<Self, SearchError> {
        let client = ReqwestClient::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| SearchError::InvalidRequest(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            client,
            base_url: DEFAULT_BASE_URL.to_string(),
            api_key: api_key.into(),
            engine_id: engine_id.into(),
        })
    }

    /// Point the client at another host, e.g. a mock server
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    /// Fetch one page of results, where `page` starts at 0
    #[instrument(skip(self), level = "debug")]
    pub async fn search_page(
        &self,
        query: &str,
        page_size: u32,
        page: u32,
    ) -> Result<Vec<SearchResult>, SearchError> {
        if query.trim().is_empty() {
            return Err(SearchError::InvalidRequest("Empty query".to_string()));
        }

        let num = page_size.clamp(1, MAX_PAGE_SIZE);
        let start = page * num + 1;
        let url = format!("{}/{}", self.base_url, SEARCH_PATH);

        debug!("Sending search request for '{}'", query);
        let response = self
            .client
            .get(url)
            .query(&[
                ("key", self.api_key.as_str()),
                ("cx", self.engine_id.as_str()),
                ("q", query),
            ])
            .query(&[("num", num), ("start", start)])
            .send()
            .await?;

        let status = response.status();
        let retry_after = response
            .headers()
            .get("retry-after")
            .and_then(|h| h.to_str().ok())
            .and_then(|s| s.trim().parse::<u64>().ok());
        let body = response.text().await?;

        if status.is_success() {
            let parsed: SearchResponse = serde_json::from_str(&body).map_err(|e| {
                error!("Failed to parse search response: {}", e);
                SearchError::UnexpectedResponse(format!("Failed to parse response: {}", e))
            })?;
            return Ok(parsed
                .items
                .into_iter()
                .filter(|item| !item.link.is_empty())
                .map(SearchResult::from)
                .collect());
        }

        error!("Search API error: {} - {}", status, body);
        Err(classify_error(status, retry_after, body))
    }
}

impl SearchProvider for GoogleSearchClient {
    async fn search(
        &self,
        task: &SearchTask,
        page_size: u32,
    ) -> Result<Vec<SearchResult>, SearchError> {
        self.search_page(&task.query, page_size, 0).await
    }
}

/// Map a failed HTTP status onto the search error taxonomy
fn classify_error(status: StatusCode, retry_after_secs: Option<u64>, body: String) -> SearchError {
    let quota_reason = {
        let lower = body.to_ascii_lowercase();
        lower.contains("ratelimitexceeded")
            || lower.contains("quota")
            || lower.contains("dailylimitexceeded")
    };

    if status == StatusCode::TOO_MANY_REQUESTS
        || (status == StatusCode::FORBIDDEN && quota_reason)
    {
        SearchError::QuotaExceeded {
            message: body,
            retry_after_secs,
        }
    } else if status.is_server_error() || status == StatusCode::REQUEST_TIMEOUT {
        SearchError::Transient(format!("{} - {}", status, body))
    } else {
        SearchError::InvalidRequest(format!("{} - {}", status, body))
    }
}

fn first_tag(metatags: &[Map<String, Value>], names: &[&str]) -> Option<String> {
    metatags.iter().find_map(|tags| {
        names.iter().find_map(|name| {
            tags.get(*name)
                .and_then(Value::as_str)
                .map(str::trim)
                .filter(|v| !v.is_empty())
                .map(str::to_string)
        })
    })
}

impl From<SearchItem> for SearchResult {
    fn from(item: SearchItem) -> Self {
        let metatags = item.pagemap.map(|p| p.metatags).unwrap_or_default();
        SearchResult {
            title: item.title,
            url: item.link,
            snippet: item.snippet,
            display_link: item.display_link,
            published_time: first_tag(&metatags, PUBLISHED_TIME_TAGS),
            author: first_tag(&metatags, AUTHOR_TAGS),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mockito::{Matcher, Server};

    fn client(server: &Server) -> GoogleSearchClient {
        GoogleSearchClient::new("test-key", "engine", Duration::from_secs(5))
            .unwrap()
            .with_base_url(server.url())
    }

    fn task(query: &str) -> SearchTask {
        SearchTask {
            subject: "hair dryer".to_string(),
            modifier: "market report".to_string(),
            query: query.to_string(),
            priority: 1,
            sub_category: "hair dryer".to_string(),
            kind: "industry report".to_string(),
        }
    }

    #[tokio::test]
    async fn test_search_success_maps_items() {
        let mut server = Server::new_async().await;
        let mock = server
            .mock("GET", "/customsearch/v1")
            .match_query(Matcher::AllOf(vec![
                Matcher::UrlEncoded("key".into(), "test-key".into()),
                Matcher::UrlEncoded("cx".into(), "engine".into()),
                Matcher::UrlEncoded("q".into(), "hair dryer market report".into()),
                Matcher::UrlEncoded("num".into(), "5".into()),
                Matcher::UrlEncoded("start".into(), "1".into()),
            ]))
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(
                r#"{
                    "items": [
                        {
                            "title": "X",
                            "link": "http://a.test/1",
                            "snippet": "about dryers",
                            "displayLink": "a.test",
                            "pagemap": {
                                "metatags": [
                                    {"article:published_time": "2024-05-02T08:00:00Z", "author": "Jane Doe"}
                                ]
                            }
                        },
                        {"title": "no link"}
                    ]
                }"#,
            )
            .expect(1)
            .create_async()
            .await;

        let results = client(&server)
            .search(&task("hair dryer market report"), 5)
            .await
            .unwrap();

        assert_eq!(results.len(), 1);
        assert_eq!(results[0].title, "X");
        assert_eq!(results[0].url, "http://a.test/1");
        assert_eq!(results[0].display_link.as_deref(), Some("a.test"));
        assert_eq!(
            results[0].published_time.as_deref(),
            Some("2024-05-02T08:00:00Z")
        );
        assert_eq!(results[0].author.as_deref(), Some("Jane Doe"));

        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_missing_items_is_empty() {
        let mut server = Server::new_async().await;
        let _mock = server
            .mock("GET", "/customsearch/v1")
            .match_query(Matcher::Any)
            .with_status(200)
            .with_body(r#"{"searchInformation": {"totalResults": "0"}}"#)
            .create_async()
            .await;

        let results = client(&server).search(&task("nothing"), 5).await.unwrap();
        assert!(results.is_empty());
    }

    #[tokio::test]
    async fn test_page_size_is_clamped() {
        let mut server = Server::new_async().await;
        let mock = server
            .mock("GET", "/customsearch/v1")
            .match_query(Matcher::AllOf(vec![
                Matcher::UrlEncoded("num".into(), "10".into()),
                Matcher::UrlEncoded("start".into(), "11".into()),
            ]))
            .with_status(200)
            .with_body(r#"{"items": []}"#)
            .expect(1)
            .create_async()
            .await;

        client(&server)
            .search_page("hair dryer", 50, 1)
            .await
            .unwrap();
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_rate_limit_is_quota_exceeded() {
        let mut server = Server::new_async().await;
        let _mock = server
            .mock("GET", "/customsearch/v1")
            .match_query(Matcher::Any)
            .with_status(429)
            .with_header("retry-after", "7")
            .with_body("Too Many Requests")
            .create_async()
            .await;

        let result = client(&server).search(&task("q"), 5).await;
        assert!(matches!(
            result,
            Err(SearchError::QuotaExceeded {
                retry_after_secs: Some(7),
                ..
            })
        ));
    }

    #[tokio::test]
    async fn test_forbidden_quota_is_quota_exceeded() {
        let mut server = Server::new_async().await;
        let _mock = server
            .mock("GET", "/customsearch/v1")
            .match_query(Matcher::Any)
            .with_status(403)
            .with_body(r#"{"error": {"errors": [{"reason": "dailyLimitExceeded"}]}}"#)
            .create_async()
            .await;

        let result = client(&server).search(&task("q"), 5).await;
        assert!(matches!(result, Err(SearchError::QuotaExceeded { .. })));
    }

    #[tokio::test]
    async fn test_server_error_is_transient() {
        let mut server = Server::new_async().await;
        let _mock = server
            .mock("GET", "/customsearch/v1")
            .match_query(Matcher::Any)
            .with_status(503)
            .with_body("unavailable")
            .create_async()
            .await;

        let result = client(&server).search(&task("q"), 5).await;
        assert!(matches!(result, Err(SearchError::Transient(_))));
    }

    #[tokio::test]
    async fn test_bad_request_is_invalid() {
        let mut server = Server::new_async().await;
        let _mock = server
            .mock("GET", "/customsearch/v1")
            .match_query(Matcher::Any)
            .with_status(400)
            .with_body("Invalid Value")
            .create_async()
            .await;

        let result = client(&server).search(&task("q"), 5).await;
        assert!(matches!(result, Err(SearchError::InvalidRequest(_))));
    }

    #[tokio::test]
    async fn test_empty_query_is_rejected_locally() {
        let server = Server::new_async().await;
        let result = client(&server).search(&task("   "), 5).await;
        assert!(matches!(result, Err(SearchError::InvalidRequest(_))));
    }

    #[tokio::test]
    async fn test_malformed_body_is_unexpected_response() {
        let mut server = Server::new_async().await;
        let _mock = server
            .mock("GET", "/customsearch/v1")
            .match_query(Matcher::Any)
            .with_status(200)
            .with_body("<html>not json</html>")
            .create_async()
            .await;

        let result = client(&server).search(&task("q"), 5).await;
        assert!(matches!(result, Err(SearchError::UnexpectedResponse(_))));
    }
}
