use crate::validate::{
    ValidationError, validate_quiz_basho_data, validate_quiz_index, validate_torikumi_data,
    validate_torikumi_index,
};
use crate::{QuizBashoData, QuizIndex, TorikumiData, TorikumiIndex};
use reqwest::{Client, StatusCode};
use serde_json::Value;
use std::fmt;
use std::time::Duration;

pub type ApiResult<T> = Result<T, ApiError>;

pub const DEFAULT_BASE_URL: &str = "http://127.0.0.1:5173/";

/// Client for the static torikumi/quiz JSON files.
#[derive(Debug, Clone)]
pub struct TorikumiApi {
    client: Client,
    base_url: String,
    timeout: Duration,
}

impl Default for TorikumiApi {
    fn default() -> Self {
        Self::with_base_url(DEFAULT_BASE_URL)
    }
}

#[derive(Debug)]
pub enum ApiError {
    Network(reqwest::Error, String),
    Api(reqwest::Error, String),
    Parsing(reqwest::Error, String),
    Validation(ValidationError, String),
    NotFound(String),
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ApiError::Network(e, url) => write!(f, "Network error for {url}: {e}"),
            ApiError::Api(e, url) => write!(f, "API error for {url}: {e}"),
            ApiError::Parsing(e, url) => write!(f, "Parse error for {url}: {e}"),
            ApiError::Validation(e, url) => write!(f, "{e} ({url})"),
            ApiError::NotFound(url) => write!(f, "Not found: {url}"),
        }
    }
}

impl std::error::Error for ApiError {}

impl TorikumiApi {
    /// `base_url` is the directory holding `data/`; a trailing slash is optional.
    pub fn with_base_url(base_url: &str) -> Self {
        let mut base_url = base_url.trim().to_string();
        if !base_url.ends_with('/') {
            base_url.push('/');
        }
        Self {
            client: Client::builder()
                .user_agent("sumo-yoso/0.1 (terminal prediction memo)")
                .build()
                .unwrap_or_default(),
            base_url,
            timeout: Duration::from_secs(10),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Browsable basho and the latest published day.
    pub async fn fetch_index(&self) -> ApiResult<TorikumiIndex> {
        let url = format!("{}data/torikumi/index.json", self.base_url);
        let raw = self.get(&url).await?;
        validate_torikumi_index(&raw).map_err(|e| ApiError::Validation(e, url))
    }

    /// The most recently published day, whatever basho it belongs to.
    pub async fn fetch_latest(&self) -> ApiResult<TorikumiData> {
        let url = format!("{}data/torikumi/latest.json", self.base_url);
        let raw = self.get(&url).await?;
        validate_torikumi_data(&raw).map_err(|e| ApiError::Validation(e, url))
    }

    pub async fn fetch_torikumi(&self, basho_id: &str, day: u8) -> ApiResult<TorikumiData> {
        let url = format!("{}data/torikumi/{basho_id}/{day}.json", self.base_url);
        let raw = self.get(&url).await?;
        validate_torikumi_data(&raw).map_err(|e| ApiError::Validation(e, url))
    }

    pub async fn fetch_quiz_index(&self) -> ApiResult<QuizIndex> {
        let url = format!("{}data/quiz/index.json", self.base_url);
        let raw = self.get(&url).await?;
        validate_quiz_index(&raw).map_err(|e| ApiError::Validation(e, url))
    }

    pub async fn fetch_quiz_basho(&self, basho_id: &str) -> ApiResult<QuizBashoData> {
        let url = format!("{}data/quiz/{basho_id}.json", self.base_url);
        let raw = self.get(&url).await?;
        validate_quiz_basho_data(&raw).map_err(|e| ApiError::Validation(e, url))
    }

    async fn get(&self, url: &str) -> ApiResult<Value> {
        let response = self
            .client
            .get(url)
            .timeout(self.timeout)
            .send()
            .await
            .map_err(|e| ApiError::Network(e, url.to_owned()))?;

        if response.status() == StatusCode::NOT_FOUND {
            return Err(ApiError::NotFound(url.to_owned()));
        }

        match response.error_for_status() {
            Ok(res) => res
                .json::<Value>()
                .await
                .map_err(|e| ApiError::Parsing(e, url.to_owned())),
            Err(e) => Err(ApiError::Api(e, url.to_owned())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Side;

    const DAY_JSON: &str = r#"{
        "source": "https://sports.yahoo.co.jp/sumo/torikumi/202601/12",
        "basho": { "id": "202601", "label": "2026年1月場所" },
        "day": 12,
        "updatedAt": "2026-01-22T09:00:00Z",
        "division": "makuuchi",
        "matches": [{ "east": "高安", "west": "大の里" }]
    }"#;

    #[test]
    fn base_url_gets_trailing_slash() {
        let api = TorikumiApi::with_base_url("https://example.com/sumo");
        assert_eq!(api.base_url(), "https://example.com/sumo/");
        let api = TorikumiApi::with_base_url("https://example.com/sumo/");
        assert_eq!(api.base_url(), "https://example.com/sumo/");
    }

    #[tokio::test]
    async fn fetches_and_validates_a_day() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("GET", "/data/torikumi/202601/12.json")
            .with_header("content-type", "application/json")
            .with_body(DAY_JSON)
            .create_async()
            .await;

        let api = TorikumiApi::with_base_url(&server.url());
        let data = api.fetch_torikumi("202601", 12).await.unwrap();
        mock.assert_async().await;
        assert_eq!(data.day, 12);
        assert_eq!(data.matches[0].east, "高安");
    }

    #[tokio::test]
    async fn latest_uses_latest_json() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("GET", "/data/torikumi/latest.json")
            .with_body(DAY_JSON)
            .create_async()
            .await;

        let api = TorikumiApi::with_base_url(&server.url());
        let data = api.fetch_latest().await.unwrap();
        assert_eq!(data.basho.id, "202601");
    }

    #[tokio::test]
    async fn malformed_payload_is_a_validation_failure() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("GET", "/data/torikumi/202601/16.json")
            .with_body(r#"{"basho":{"id":"202601","label":"x"},"day":16,"matches":[]}"#)
            .create_async()
            .await;

        let api = TorikumiApi::with_base_url(&server.url());
        let err = api.fetch_torikumi("202601", 16).await.unwrap_err();
        assert!(matches!(err, ApiError::Validation(_, _)));
        assert!(err.to_string().contains("day out of range (16)"));
    }

    #[tokio::test]
    async fn missing_file_is_not_found() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("GET", "/data/torikumi/202601/3.json")
            .with_status(404)
            .create_async()
            .await;

        let api = TorikumiApi::with_base_url(&server.url());
        let err = api.fetch_torikumi("202601", 3).await.unwrap_err();
        assert!(matches!(err, ApiError::NotFound(_)));
    }

    #[tokio::test]
    async fn server_error_is_an_api_error() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("GET", "/data/torikumi/index.json")
            .with_status(503)
            .create_async()
            .await;

        let api = TorikumiApi::with_base_url(&server.url());
        let err = api.fetch_index().await.unwrap_err();
        assert!(matches!(err, ApiError::Api(_, _)));
    }

    #[tokio::test]
    async fn non_json_body_is_a_parse_error() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("GET", "/data/quiz/index.json")
            .with_body("<html>oops</html>")
            .create_async()
            .await;

        let api = TorikumiApi::with_base_url(&server.url());
        let err = api.fetch_quiz_index().await.unwrap_err();
        assert!(matches!(err, ApiError::Parsing(_, _)));
    }

    #[tokio::test]
    async fn fetches_quiz_basho() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("GET", "/data/quiz/202511.json")
            .with_body(
                r#"{"basho":{"id":"202511","label":"2025年11月場所"},
                    "days":{"1":[{"east":"豊昇龍","west":"若元春","winner":"E","kimarite":"寄り切り"}]}}"#,
            )
            .create_async()
            .await;

        let api = TorikumiApi::with_base_url(&server.url());
        let data = api.fetch_quiz_basho("202511").await.unwrap();
        assert_eq!(data.days["1"][0].winner, Side::East);
    }
}
