//! HTTP implementation of the page fetcher

use crate::fetch::config::FetcherConfig;
use crate::fetch::content_extraction::{extract_metadata, extract_text};
use crate::fetch::error::FetchError;
use crate::fetch::{FetchedPage, PageFetcher};
use reqwest::Client as ReqwestClient;
use reqwest::header::{ACCEPT, ACCEPT_LANGUAGE, CONTENT_TYPE, HeaderMap, HeaderValue};
use reqwest::redirect::Policy;
use tracing::{debug, instrument, warn};

/// Downloads pages over HTTP with a per-request timeout
#[derive(Debug, Clone)]
pub struct HttpPageFetcher {
    client: ReqwestClient,
    config: FetcherConfig,
}

impl HttpPageFetcher {
    /// Create a fetcher from the given configuration
    pub fn new(config: FetcherConfig) -> Result<Self, FetchError> {
        let mut headers = HeaderMap::new();
        headers.insert(
            ACCEPT,
            HeaderValue::from_static("text/html,application/xhtml+xml;q=0.9,*/*;q=0.8"),
        );
        headers.insert(
            ACCEPT_LANGUAGE,
            HeaderValue::from_static("en-US,en;q=0.9,zh-CN;q=0.8"),
        );

        let client = ReqwestClient::builder()
            .timeout(config.timeout)
            .user_agent(config.user_agent.clone())
            .redirect(Policy::limited(config.max_redirects))
            .default_headers(headers)
            .build()?;

        Ok(Self { client, config })
    }

    /// Configuration in use
    pub fn config(&self) -> &FetcherConfig {
        &self.config
    }
}

impl PageFetcher for HttpPageFetcher {
    #[instrument(skip(self), level = "debug")]
    async fn fetch(&self, url: &str) -> Result<FetchedPage, FetchError> {
        let response = self.client.get(url).send().await?;

        let status = response.status();
        if !status.is_success() {
            warn!("Fetching {} returned {}", url, status);
            return Err(FetchError::Status {
                status: status.as_u16(),
                url: url.to_string(),
            });
        }

        let content_type = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(str::to_ascii_lowercase);
        if let Some(content_type) = content_type {
            if !content_type.contains("html") && !content_type.starts_with("text/") {
                return Err(FetchError::UnsupportedContent(content_type));
            }
        }

        let final_url = response.url().to_string();
        let html = response.text().await?;
        debug!("Downloaded {} bytes from {}", html.len(), final_url);

        let text = extract_text(&html, &self.config.exclude_selectors)?;
        let metadata = extract_metadata(&final_url, &html)?;

        Ok(FetchedPage {
            url: final_url,
            text,
            metadata,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use mockito::Server;
    use std::time::Duration;

    fn fetcher() -> HttpPageFetcher {
        HttpPageFetcher::new(
            FetcherConfig::builder()
                .timeout(Duration::from_secs(2))
                .build(),
        )
        .unwrap()
    }

    #[tokio::test]
    async fn test_fetch_extracts_text_and_metadata() {
        let mut server = Server::new_async().await;
        let mock = server
            .mock("GET", "/news/dryer")
            .with_status(200)
            .with_header("content-type", "text/html; charset=utf-8")
            .with_body(
                r#"<html><head>
                    <meta name="author" content="Jane Doe">
                    <meta property="article:published_time" content="2024-05-02T08:00:00Z">
                   </head><body>
                    <header>Site header</header>
                    <article><h1>Dryer</h1><p>Body text.</p></article>
                   </body></html>"#,
            )
            .expect(1)
            .create_async()
            .await;

        let url = format!("{}/news/dryer", server.url());
        let page = fetcher().fetch(&url).await.unwrap();

        assert_eq!(page.url, url);
        assert_eq!(page.text, "Dryer\n\nBody text.");
        assert_eq!(page.metadata.author.as_deref(), Some("Jane Doe"));
        assert_eq!(
            page.metadata.publication_date,
            NaiveDate::from_ymd_opt(2024, 5, 2)
        );
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_fetch_non_success_status() {
        let mut server = Server::new_async().await;
        let _mock = server
            .mock("GET", "/missing")
            .with_status(404)
            .create_async()
            .await;

        let result = fetcher().fetch(&format!("{}/missing", server.url())).await;
        assert!(matches!(
            result,
            Err(FetchError::Status { status: 404, .. })
        ));
    }

    #[tokio::test]
    async fn test_fetch_rejects_binary_content() {
        let mut server = Server::new_async().await;
        let _mock = server
            .mock("GET", "/report.pdf")
            .with_status(200)
            .with_header("content-type", "application/pdf")
            .with_body("%PDF-1.4")
            .create_async()
            .await;

        let result = fetcher()
            .fetch(&format!("{}/report.pdf", server.url()))
            .await;
        assert!(matches!(result, Err(FetchError::UnsupportedContent(_))));
    }

    #[tokio::test]
    async fn test_fetch_invalid_url() {
        let result = fetcher().fetch("not a url").await;
        assert!(matches!(result, Err(FetchError::Http(_))));
    }
}
