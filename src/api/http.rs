use super::SearchApi;
use crate::config::Config;
use crate::error::{ApiError, ApiResult};
use crate::types::{ItemDetail, ItemResponse, SearchResponse};
use anyhow::{bail, Context};
use async_trait::async_trait;
use log::{debug, warn};
use reqwest::header::{HeaderMap, HeaderValue, CONTENT_TYPE};
use reqwest::{StatusCode, Url};

/// `SearchApi` over the backend's REST endpoints
#[derive(Debug, Clone)]
pub struct HttpSearchApi {
    client: reqwest::Client,
    base_url: Url,
}

impl HttpSearchApi {
    pub fn new(config: &Config) -> anyhow::Result<Self> {
        let base_url = Url::parse(&config.api_base_url)
            .with_context(|| format!("Invalid backend URL: {}", config.api_base_url))?;
        if base_url.cannot_be_a_base() {
            bail!("Backend URL cannot be used as a base: {}", config.api_base_url);
        }

        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));

        let client = reqwest::Client::builder()
            .default_headers(headers)
            .timeout(config.request_timeout)
            .build()
            .context("Failed to build HTTP client")?;

        Ok(Self { client, base_url })
    }

    fn endpoint(&self, segments: &[&str]) -> Url {
        let mut url = self.base_url.clone();
        if let Ok(mut path) = url.path_segments_mut() {
            path.pop_if_empty().extend(segments);
        }
        url
    }

    async fn get(&self, url: Url, query: &[(&str, String)]) -> ApiResult<(StatusCode, Vec<u8>)> {
        debug!("GET {}", url);
        let response = self.client.get(url).query(query).send().await?;
        let status = response.status();
        let body = response.bytes().await?;
        Ok((status, body.to_vec()))
    }
}

#[async_trait]
impl SearchApi for HttpSearchApi {
    async fn search(&self, query: &str, limit: usize) -> ApiResult<SearchResponse> {
        let url = self.endpoint(&["search"]);
        let (status, body) = self
            .get(
                url.clone(),
                &[("q", query.to_string()), ("limit", limit.to_string())],
            )
            .await?;

        if !status.is_success() {
            warn!("Search error: {} for '{}'", status, query);
            return Err(ApiError::Status {
                status: status.as_u16(),
                url: url.to_string(),
            });
        }
        Ok(serde_json::from_slice(&body)?)
    }

    async fn fetch_by_id(&self, id: &str) -> ApiResult<ItemDetail> {
        let url = self.endpoint(&["search", "item", id]);
        let (status, body) = self.get(url.clone(), &[]).await?;

        if status == StatusCode::NOT_FOUND {
            return Err(ApiError::NotFound(id.to_string()));
        }
        if !status.is_success() {
            warn!("Get item error: {} for '{}'", status, id);
            return Err(ApiError::Status {
                status: status.as_u16(),
                url: url.to_string(),
            });
        }

        let response: ItemResponse = serde_json::from_slice(&body)?;
        response.item.ok_or_else(|| ApiError::NotFound(id.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn api(base: &str) -> HttpSearchApi {
        HttpSearchApi::new(&Config::default().with_api_base_url(base)).unwrap()
    }

    #[test]
    fn test_endpoint_paths() {
        let api = api("http://localhost:5001/api");
        assert_eq!(
            api.endpoint(&["search"]).as_str(),
            "http://localhost:5001/api/search"
        );
        assert_eq!(
            api.endpoint(&["search", "item", "65f1"]).as_str(),
            "http://localhost:5001/api/search/item/65f1"
        );
    }

    #[test]
    fn test_endpoint_escapes_identifier() {
        let api = api("http://localhost:5001/api");
        assert_eq!(
            api.endpoint(&["search", "item", "a/b c"]).as_str(),
            "http://localhost:5001/api/search/item/a%2Fb%20c"
        );
    }

    #[test]
    fn test_rejects_invalid_base() {
        let config = Config::default().with_api_base_url("not a url");
        assert!(HttpSearchApi::new(&config).is_err());
    }
}
