use reqwest::{header, Client, Method, RequestBuilder};

/// Base address plus credential shared by probes, diagnostics and data calls.
#[derive(Debug, Clone)]
pub struct Endpoint {
    http: Client,
    base_url: String,
    api_key: String,
}

impl Endpoint {
    pub fn new(http: Client, base_url: impl Into<String>, api_key: impl Into<String>) -> Self {
        Self {
            http,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            api_key: api_key.into(),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn has_credentials(&self) -> bool {
        !self.base_url.is_empty() && !self.api_key.is_empty()
    }

    pub fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }

    /// Request with the bearer credential and JSON content type attached.
    pub fn request(&self, method: Method, path: &str) -> RequestBuilder {
        self.http
            .request(method, self.url(path))
            .bearer_auth(&self.api_key)
            .header(header::CONTENT_TYPE, "application/json")
    }
}
