use crate::error::SourceError;
use crate::traits::ReviewPageSource;
use async_trait::async_trait;
use review_sync_config::SourceConfig;
use review_sync_models::{parse_listing_date, Review};
use serde::Deserialize;
use std::time::Duration;
use tracing::debug;

/// Client for the extractor endpoint that serves a seller profile's
/// feedback listing as JSON. The endpoint owns browser automation and
/// HTML parsing; this client only speaks its paged JSON contract:
///
/// - `GET /sellers/{profile}/feedback` -> `{"total_pages": N}`
/// - `GET /sellers/{profile}/feedback/page/{n}` -> array of raw rows
pub struct FeedbackClient {
    client: reqwest::Client,
    base_url: String,
    profile: String,
}

#[derive(Debug, Deserialize)]
struct FeedbackMeta {
    total_pages: u32,
}

/// Raw row as the extractor emits it. Every field optional: extraction
/// failures on the remote side surface as missing fields, not errors.
#[derive(Debug, Deserialize)]
struct FeedbackRow {
    rating: Option<u32>,
    name: Option<String>,
    message: Option<String>,
    date: Option<String>,
}

impl FeedbackRow {
    fn into_review(self) -> Review {
        Review {
            rating: self.rating,
            name: self.name,
            message: self.message,
            date: self.date.as_deref().and_then(parse_listing_date),
        }
    }
}

impl FeedbackClient {
    pub fn new(config: &SourceConfig) -> Result<Self, SourceError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;
        Ok(Self {
            client,
            base_url: config.endpoint.trim_end_matches('/').to_string(),
            profile: urlencoding::encode(&config.profile).into_owned(),
        })
    }

    async fn get_body(&self, url: &str) -> Result<String, SourceError> {
        let response = self
            .client
            .get(url)
            .header("Accept", "application/json")
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let body = response.text().await.unwrap_or_default();
            return Err(SourceError::UnexpectedStatus {
                status,
                url: url.to_string(),
                body,
            });
        }

        Ok(response.text().await?)
    }
}

#[async_trait]
impl ReviewPageSource for FeedbackClient {
    async fn total_pages(&self) -> Result<u32, SourceError> {
        let url = format!("{}/sellers/{}/feedback", self.base_url, self.profile);
        let body = self.get_body(&url).await?;
        let meta: FeedbackMeta = serde_json::from_str(&body)
            .map_err(|e| SourceError::Malformed(format!("feedback meta: {}", e)))?;
        debug!(
            operation = "listing_meta",
            total_pages = meta.total_pages,
            "Fetched listing metadata"
        );
        Ok(meta.total_pages)
    }

    async fn fetch_page(&self, page: u32) -> Result<Vec<Review>, SourceError> {
        let url = format!(
            "{}/sellers/{}/feedback/page/{}",
            self.base_url, self.profile, page
        );
        let body = self.get_body(&url).await?;
        let rows: Vec<FeedbackRow> = serde_json::from_str(&body)
            .map_err(|e| SourceError::Malformed(format!("feedback page {}: {}", page, e)))?;
        debug!(
            operation = "fetch_page",
            page,
            rows = rows.len(),
            "Fetched feedback page"
        );
        Ok(rows.into_iter().map(FeedbackRow::into_review).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use serde_json::json;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn create_config(endpoint: String) -> SourceConfig {
        SourceConfig {
            endpoint,
            profile: "acme-tools".to_string(),
            timeout_secs: 5,
        }
    }

    #[tokio::test]
    async fn test_total_pages_reads_meta() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/sellers/acme-tools/feedback"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"total_pages": 7})))
            .mount(&server)
            .await;

        let client = FeedbackClient::new(&create_config(server.uri())).unwrap();
        assert_eq!(client.total_pages().await.unwrap(), 7);
    }

    #[tokio::test]
    async fn test_fetch_page_maps_rows() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/sellers/acme-tools/feedback/page/2"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([
                {"rating": 5, "name": "alice", "message": "great product", "date": "2024.01.15"},
                {},
                {"name": "bob", "message": "works", "date": "last week"}
            ])))
            .mount(&server)
            .await;

        let client = FeedbackClient::new(&create_config(server.uri())).unwrap();
        let reviews = client.fetch_page(2).await.unwrap();

        assert_eq!(reviews.len(), 3);
        assert_eq!(reviews[0].rating, Some(5));
        assert_eq!(reviews[0].date, NaiveDate::from_ymd_opt(2024, 1, 15));

        // Row with nothing extracted still comes through as a record
        assert_eq!(reviews[1].name, None);
        assert_eq!(reviews[1].date, None);

        // An unparseable date drops to None without losing the record
        assert_eq!(reviews[2].name.as_deref(), Some("bob"));
        assert_eq!(reviews[2].date, None);
    }

    #[tokio::test]
    async fn test_error_status_surfaces() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/sellers/acme-tools/feedback/page/1"))
            .respond_with(ResponseTemplate::new(503).set_body_string("upstream down"))
            .mount(&server)
            .await;

        let client = FeedbackClient::new(&create_config(server.uri())).unwrap();
        match client.fetch_page(1).await {
            Err(SourceError::UnexpectedStatus { status, url, body }) => {
                assert_eq!(status, 503);
                assert!(url.ends_with("/sellers/acme-tools/feedback/page/1"));
                assert_eq!(body, "upstream down");
            }
            other => panic!("expected UnexpectedStatus, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_error_status_names_failing_page() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/sellers/acme-tools/feedback/page/7"))
            .respond_with(ResponseTemplate::new(503).set_body_string("upstream down"))
            .mount(&server)
            .await;

        let client = FeedbackClient::new(&create_config(server.uri())).unwrap();
        let error = client.fetch_page(7).await.unwrap_err();

        // An operator reading the failure has to see which page broke
        let rendered = error.to_string();
        assert!(rendered.contains("/feedback/page/7"), "got: {}", rendered);
        assert!(rendered.contains("upstream down"), "got: {}", rendered);
    }

    #[tokio::test]
    async fn test_malformed_payload_rejected() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/sellers/acme-tools/feedback"))
            .respond_with(ResponseTemplate::new(200).set_body_string("<html>not json</html>"))
            .mount(&server)
            .await;

        let client = FeedbackClient::new(&create_config(server.uri())).unwrap();
        assert!(matches!(
            client.total_pages().await,
            Err(SourceError::Malformed(_))
        ));
    }
}
