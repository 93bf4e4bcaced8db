use async_trait::async_trait;

use super::HandoverProvider;
use crate::error::{Error, Result};
use crate::fetch::{HttpClient, get_text};

pub const DEFAULT_BASE_URL: &str = "http://192.168.0.100:100/api/basestation";

/// Reads `GET {base_url}/{station_id}`, whose body is a bare number.
pub struct ApiHandoverProvider<C> {
    client: C,
    base_url: String,
}

impl<C: HttpClient> ApiHandoverProvider<C> {
    pub fn new(client: C, base_url: impl Into<String>) -> Self {
        Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn station_url(&self, station_id: &str) -> String {
        format!("{}/{}", self.base_url, station_id)
    }
}

#[async_trait]
impl<C: HttpClient> HandoverProvider for ApiHandoverProvider<C> {
    async fn handover_avg(&self, station_id: &str) -> Result<Option<f64>> {
        let url = self.station_url(station_id);

        let Some(body) = get_text(&self.client, &url).await? else {
            return Ok(None);
        };

        let text = body.trim();
        text.replace(',', ".")
            .parse::<f64>()
            .ok()
            .filter(|v| v.is_finite())
            .map(Some)
            .ok_or_else(|| Error::InvalidResponse {
                url,
                reason: format!("expected a number, got '{text}'"),
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fetch::BasicClient;
    use httpmock::prelude::*;
    use std::time::Duration;

    fn provider(server: &MockServer) -> ApiHandoverProvider<BasicClient> {
        let client = BasicClient::new(Duration::from_secs(2)).unwrap();
        ApiHandoverProvider::new(client, server.url("/api/basestation/"))
    }

    #[test]
    fn test_default_base_url() {
        let client = BasicClient::new(Duration::from_secs(2)).unwrap();
        let provider = ApiHandoverProvider::new(client, DEFAULT_BASE_URL);
        assert_eq!(provider.station_url("1"), "http://192.168.0.100:100/api/basestation/1");
    }

    #[tokio::test]
    async fn test_returns_value_on_success() {
        let server = MockServer::start_async().await;
        let mock = server
            .mock_async(|when, then| {
                when.method(GET).path("/api/basestation/1");
                then.status(200).body(" 15.5\n");
            })
            .await;

        let avg = provider(&server).handover_avg("1").await.unwrap();

        mock.assert_async().await;
        assert_eq!(avg, Some(15.5));
    }

    #[tokio::test]
    async fn test_returns_none_on_not_found() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(GET).path("/api/basestation/999");
                then.status(404);
            })
            .await;

        let avg = provider(&server).handover_avg("999").await.unwrap();

        assert_eq!(avg, None);
    }

    #[tokio::test]
    async fn test_server_error_is_http_status() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(GET).path("/api/basestation/2");
                then.status(500);
            })
            .await;

        let result = provider(&server).handover_avg("2").await;

        match result {
            Err(Error::HttpStatus { status, .. }) => assert_eq!(status.as_u16(), 500),
            other => panic!("unexpected result: {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_non_numeric_body_is_invalid_response() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(GET).path("/api/basestation/3");
                then.status(200).body("n/a");
            })
            .await;

        let result = provider(&server).handover_avg("3").await;

        assert!(matches!(result, Err(Error::InvalidResponse { .. })));
    }

    #[tokio::test]
    async fn test_slow_server_is_network_error() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(GET).path("/api/basestation/4");
                then.status(200).body("1").delay(Duration::from_millis(500));
            })
            .await;
        let client = BasicClient::new(Duration::from_millis(50)).unwrap();
        let provider = ApiHandoverProvider::new(client, server.url("/api/basestation"));

        let result = provider.handover_avg("4").await;

        assert!(matches!(result, Err(Error::Network(_))));
    }
}
