use async_trait::async_trait;
use reqwest::Url;
use tracing::debug;

use crate::config::FeedConfig;
use crate::error::FeedError;
use crate::filter::FilterSelection;
use crate::protocol::{FeatureBatch, parse_feature_collection};

/// Source of feed documents. The HTTP implementation is [`HttpFeedClient`];
/// tests script their own.
#[async_trait]
pub trait FeedClient: Send + Sync {
    async fn fetch(&self, filter: FilterSelection) -> Result<FeatureBatch, FeedError>;

    /// Fetches the per-event detail document referenced by a feature's
    /// `detail` URL.
    async fn fetch_detail(&self, url: &str) -> Result<serde_json::Value, FeedError>;
}

#[derive(Debug, Clone)]
pub struct HttpFeedClient {
    http: reqwest::Client,
    config: FeedConfig,
}

impl HttpFeedClient {
    pub fn new(config: FeedConfig) -> Result<Self, FeedError> {
        let http = reqwest::Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| FeedError::Transport(e.to_string()))?;
        Ok(Self { http, config })
    }

    pub fn config(&self) -> &FeedConfig {
        &self.config
    }

    pub fn feed_url(&self, filter: FilterSelection) -> Result<Url, FeedError> {
        let raw = format!(
            "{}/{}",
            self.config.base_url.trim_end_matches('/'),
            filter.feed_path()
        );
        Url::parse(&raw).map_err(|e| FeedError::InvalidUrl(format!("{raw}: {e}")))
    }

    async fn get_bytes(&self, url: Url) -> Result<Vec<u8>, FeedError> {
        let timeout = self.config.timeout;
        let response = self
            .http
            .get(url.clone())
            .send()
            .await
            .map_err(|e| FeedError::from_reqwest(e, timeout))?;

        let status = response.status();
        if !status.is_success() {
            debug!(%url, status = status.as_u16(), "feed returned error status");
            return Err(FeedError::Status {
                status: status.as_u16(),
            });
        }
        let body = response
            .bytes()
            .await
            .map_err(|e| FeedError::from_reqwest(e, timeout))?;
        Ok(body.to_vec())
    }
}

#[async_trait]
impl FeedClient for HttpFeedClient {
    async fn fetch(&self, filter: FilterSelection) -> Result<FeatureBatch, FeedError> {
        let url = self.feed_url(filter)?;
        debug!(%url, "fetching earthquake feed");
        let body = self.get_bytes(url).await?;
        parse_feature_collection(&body)
    }

    async fn fetch_detail(&self, url: &str) -> Result<serde_json::Value, FeedError> {
        let url = Url::parse(url).map_err(|e| FeedError::InvalidUrl(format!("{url}: {e}")))?;
        let body = self.get_bytes(url).await?;
        serde_json::from_slice(&body).map_err(|e| FeedError::Malformed(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::{FeedClient, HttpFeedClient};
    use crate::config::FeedConfig;
    use crate::error::FeedError;
    use crate::filter::{FilterSelection, MagnitudeThreshold, TimeRange};
    use std::time::Duration;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn client_for(server: &MockServer) -> HttpFeedClient {
        HttpFeedClient::new(FeedConfig {
            base_url: format!("{}/summary/", server.uri()),
            timeout: Duration::from_secs(2),
            ..FeedConfig::default()
        })
        .expect("client")
    }

    #[test]
    fn builds_usgs_urls() {
        let client = HttpFeedClient::new(FeedConfig::default()).expect("client");
        let url = client
            .feed_url(FilterSelection::new(TimeRange::Week, MagnitudeThreshold::M2_5))
            .expect("url");
        assert_eq!(
            url.as_str(),
            "https://earthquake.usgs.gov/earthquakes/feed/v1.0/summary/2.5_week.geojson"
        );
    }

    #[test]
    fn bad_base_url_is_reported() {
        let client = HttpFeedClient::new(FeedConfig {
            base_url: "not a url".into(),
            ..FeedConfig::default()
        })
        .expect("client");
        assert!(matches!(
            client.feed_url(FilterSelection::default()),
            Err(FeedError::InvalidUrl(_))
        ));
    }

    #[tokio::test]
    async fn fetches_and_parses_summary() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/summary/4.5_hour.geojson"))
            .respond_with(ResponseTemplate::new(200).set_body_string(
                r#"{"features":[{"id":"x1","properties":{"mag":4.9},"geometry":{"coordinates":[10.0,20.0,5.0]}}]}"#,
            ))
            .mount(&server)
            .await;

        let batch = client_for(&server)
            .fetch(FilterSelection::new(TimeRange::Hour, MagnitudeThreshold::M4_5))
            .await
            .expect("fetch");
        assert_eq!(batch.features.len(), 1);
        assert_eq!(batch.features[0].magnitude, Some(4.9));
    }

    #[tokio::test]
    async fn server_error_maps_to_status() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(500))
            .mount(&server)
            .await;

        let err = client_for(&server)
            .fetch(FilterSelection::default())
            .await
            .unwrap_err();
        assert_eq!(err, FeedError::Status { status: 500 });
    }

    #[tokio::test]
    async fn detail_document_is_returned_raw() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/detail/x1.geojson"))
            .respond_with(
                ResponseTemplate::new(200).set_body_string(r#"{"id":"x1","properties":{"felt":12}}"#),
            )
            .mount(&server)
            .await;

        let doc = client_for(&server)
            .fetch_detail(&format!("{}/detail/x1.geojson", server.uri()))
            .await
            .expect("detail");
        assert_eq!(doc["properties"]["felt"], 12);
    }
}
