//! Backend client over HTTP (blocking reqwest).

use std::time::Duration;

use reqwest::blocking::{Client, Response};
use reqwest::StatusCode;
use serde::de::DeserializeOwned;
use tracing::{debug, instrument};
use url::Url;

use crate::application::ApplicationError;
use crate::config::Settings;
use crate::domain::Node;
use crate::infrastructure::api::{
    ApiError, ApiResult, ApiVersion, Envelope, FilterResults, Hello, NodeDetail, SearchHit,
    SearchResults, TreeData,
};
use crate::infrastructure::traits::ApiClient;
use crate::infrastructure::{InfraError, InfraResult};

pub struct HttpApiClient {
    client: Client,
    base: Url,
    version: ApiVersion,
    source: Option<String>,
}

impl HttpApiClient {
    pub fn new(settings: &Settings) -> InfraResult<Self> {
        let base = parse_base_url(&settings.api_url)?;
        let client = Client::builder()
            .user_agent(concat!("dskview/", env!("CARGO_PKG_VERSION")))
            .timeout(Duration::from_secs(settings.timeout_secs))
            .build()
            .map_err(|e| config_error(format!("cannot build http client: {e}")))?;

        Ok(Self {
            client,
            base,
            version: settings.api_version,
            source: settings.source.clone(),
        })
    }

    pub fn base_url(&self) -> &Url {
        &self.base
    }

    /// `<base>/api/<version>/<segments..>`, plus `v=<source>` on v2.
    fn endpoint(&self, segments: &[&str]) -> ApiResult<Url> {
        let mut url = self.base.clone();
        url.path_segments_mut()
            .map_err(|_| ApiError::Network {
                url: self.base.to_string(),
                message: "base url cannot carry a path".to_string(),
            })?
            .pop_if_empty()
            .extend(["api", self.version.as_str()])
            .extend(segments.iter().filter(|s| !s.is_empty()));

        if let (ApiVersion::V2, Some(source)) = (self.version, &self.source) {
            url.query_pairs_mut().append_pair("v", source);
        }
        Ok(url)
    }

    fn node_endpoint(&self, node_url: &str) -> ApiResult<Url> {
        let mut segments = vec!["tree"];
        segments.extend(node_url.split('/'));
        self.endpoint(&segments)
    }

    fn query_endpoint(&self, path: &str, query: &str) -> ApiResult<Url> {
        let mut url = self.endpoint(&[path])?;
        url.query_pairs_mut().append_pair("q", query);
        Ok(url)
    }

    fn send(&self, request: reqwest::blocking::RequestBuilder, url: &Url) -> ApiResult<Response> {
        request.send().map_err(|e| ApiError::Network {
            url: url.to_string(),
            message: e.to_string(),
        })
    }

    #[instrument(level = "debug", skip(self), fields(url = %url))]
    fn get_data<T: DeserializeOwned>(&self, url: Url) -> ApiResult<T> {
        let response = self.send(self.client.get(url.clone()), &url)?;
        check_status(&response, &url)?;

        let body = response.text().map_err(|e| ApiError::Network {
            url: url.to_string(),
            message: e.to_string(),
        })?;
        let envelope: Envelope<T> = serde_json::from_str(&body).map_err(|e| ApiError::Decode {
            url: url.to_string(),
            message: e.to_string(),
        })?;
        Ok(envelope.data)
    }
}

impl ApiClient for HttpApiClient {
    fn hello(&self) -> ApiResult<Hello> {
        self.get_data(self.endpoint(&["hello"])?)
    }

    fn tree(&self) -> ApiResult<Node> {
        let data: TreeData = self.get_data(self.endpoint(&["tree"])?)?;
        debug!("tree {} with {} nodes", data.hash, data.total);
        Ok(data.root)
    }

    fn node(&self, url: &str) -> ApiResult<NodeDetail> {
        self.get_data(self.node_endpoint(url)?)
    }

    fn has(&self, url: &str) -> ApiResult<bool> {
        let endpoint = self.node_endpoint(url)?;
        let response = self.send(self.client.head(endpoint.clone()), &endpoint)?;
        if response.status() == StatusCode::NOT_FOUND {
            return Ok(false);
        }
        check_status(&response, &endpoint)?;
        Ok(true)
    }

    fn filter(&self, query: &str) -> ApiResult<Vec<String>> {
        let path = match self.version {
            ApiVersion::V1 => "search",
            ApiVersion::V2 => "filter",
        };
        let results: FilterResults = self.get_data(self.query_endpoint(path, query)?)?;
        Ok(results.into_urls())
    }

    fn search(&self, query: &str) -> ApiResult<Vec<SearchHit>> {
        let endpoint = self.query_endpoint("search", query)?;
        match self.version {
            ApiVersion::V2 => {
                let results: SearchResults = self.get_data(endpoint)?;
                Ok(results.hits)
            }
            // v1 search only knows urls
            ApiVersion::V1 => {
                let results: FilterResults = self.get_data(endpoint)?;
                Ok(results
                    .into_urls()
                    .into_iter()
                    .map(|url| SearchHit {
                        url,
                        ..SearchHit::default()
                    })
                    .collect())
            }
        }
    }
}

/// Statuses outside 2xx and 3xx are failures.
fn check_status(response: &Response, url: &Url) -> ApiResult<()> {
    let status = response.status();
    if status.is_success() || status.is_redirection() {
        Ok(())
    } else {
        Err(ApiError::Status {
            url: url.to_string(),
            status: status.as_u16(),
        })
    }
}

fn parse_base_url(api_url: &str) -> InfraResult<Url> {
    let base = Url::parse(api_url).map_err(|e| config_error(format!("invalid api_url {api_url:?}: {e}")))?;
    if base.cannot_be_a_base() || !matches!(base.scheme(), "http" | "https") {
        return Err(config_error(format!("api_url must be an http(s) url: {api_url}")));
    }
    Ok(base)
}

fn config_error(message: String) -> InfraError {
    InfraError::Application(ApplicationError::Config { message })
}
