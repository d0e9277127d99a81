//! Confluence REST API client.
//!
//! Sync HTTP client for Confluence Server/Data Center with HTTP basic
//! authentication. Every call carries the `Authorization` header; there is no
//! session to open or close.

mod attachments;
mod comments;
mod content;
mod labels;
mod rpc;
mod spaces;
mod users;

pub use attachments::encode_path_segment;
pub use content::{ContentUpdate, NewContent};

use std::time::Duration;

use base64::Engine as _;
use base64::engine::general_purpose::STANDARD;
use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::debug;
use ureq::Agent;
use ureq::http::Response;

use crate::error::ConfluenceError;
use crate::types::ResultsPage;

/// Page size requested from paginated endpoints.
const PAGE_LIMIT: usize = 100;

/// Login name and password for HTTP basic authentication.
#[derive(Clone)]
pub struct Credentials {
    /// Login name.
    pub username: String,
    /// Password.
    pub password: String,
}

impl Credentials {
    /// Create credentials from a user name and password.
    #[must_use]
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            password: password.into(),
        }
    }

    fn header_value(&self) -> String {
        let token = STANDARD.encode(format!("{}:{}", self.username, self.password));
        format!("Basic {token}")
    }
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("username", &self.username)
            .field("password", &"***")
            .finish()
    }
}

/// Confluence REST API client.
pub struct ConfluenceClient {
    agent: Agent,
    base_url: String,
    authorization: String,
}

impl ConfluenceClient {
    /// Create a client for the server at `base_url`.
    ///
    /// A trailing slash on `base_url` is ignored. `timeout` bounds every
    /// request as a whole.
    #[must_use]
    pub fn new(base_url: &str, credentials: &Credentials, timeout: Duration) -> Self {
        let agent = Agent::config_builder()
            .timeout_global(Some(timeout))
            .http_status_as_error(false)
            .build()
            .into();

        Self {
            agent,
            base_url: base_url.trim_end_matches('/').to_owned(),
            authorization: credentials.header_value(),
        }
    }

    /// Server base URL without trailing slash.
    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Get the API base URL.
    fn api_url(&self) -> String {
        format!("{}/rest/api", self.base_url)
    }

    /// GET `url` and decode the JSON response.
    fn get_json<T: DeserializeOwned>(&self, url: &str) -> Result<T, ConfluenceError> {
        debug!("GET {}", url);
        let response = self
            .agent
            .get(url)
            .header("Authorization", &self.authorization)
            .header("Accept", "application/json")
            .call()?;
        Ok(Self::check_status(response)?.into_body().read_json()?)
    }

    /// GET `url` and return the raw response bytes.
    fn get_bytes(&self, url: &str) -> Result<Vec<u8>, ConfluenceError> {
        debug!("GET {}", url);
        let response = self
            .agent
            .get(url)
            .header("Authorization", &self.authorization)
            .call()?;
        let mut data = Vec::new();
        std::io::Read::read_to_end(
            &mut Self::check_status(response)?.into_body().into_reader(),
            &mut data,
        )?;
        Ok(data)
    }

    /// POST a JSON payload and decode the JSON response.
    fn post_json<B, T>(&self, url: &str, payload: &B) -> Result<T, ConfluenceError>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        debug!("POST {}", url);
        let payload_bytes = serde_json::to_vec(payload)?;
        let response = self
            .agent
            .post(url)
            .header("Authorization", &self.authorization)
            .header("Content-Type", "application/json")
            .header("Accept", "application/json")
            .send(&payload_bytes[..])?;
        Ok(Self::check_status(response)?.into_body().read_json()?)
    }

    /// PUT a JSON payload and decode the JSON response.
    fn put_json<B, T>(&self, url: &str, payload: &B) -> Result<T, ConfluenceError>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        debug!("PUT {}", url);
        let payload_bytes = serde_json::to_vec(payload)?;
        let response = self
            .agent
            .put(url)
            .header("Authorization", &self.authorization)
            .header("Content-Type", "application/json")
            .header("Accept", "application/json")
            .send(&payload_bytes[..])?;
        Ok(Self::check_status(response)?.into_body().read_json()?)
    }

    /// Turn an error status into [`ConfluenceError::HttpResponse`].
    fn check_status(
        response: Response<ureq::Body>,
    ) -> Result<Response<ureq::Body>, ConfluenceError> {
        let status = response.status().as_u16();
        if status < 400 {
            return Ok(response);
        }
        let error_body = response
            .into_body()
            .read_to_string()
            .unwrap_or_else(|_| "(unable to read error body)".to_owned());
        Err(ConfluenceError::HttpResponse {
            status,
            body: error_body,
        })
    }

    /// Fetch every entry of a paginated listing.
    ///
    /// Follows `start` offsets for as long as the server advertises a `next`
    /// link. The server may cap `limit` below what was requested, so a short
    /// page alone does not end the listing.
    fn collect_results<T: DeserializeOwned>(&self, url: &str) -> Result<Vec<T>, ConfluenceError> {
        let mut results = Vec::new();
        loop {
            let page: ResultsPage<T> = self.get_json(&with_paging(url, results.len()))?;
            let more = page.has_next() && !page.results.is_empty();
            results.extend(page.results);
            if !more {
                return Ok(results);
            }
        }
    }
}

/// Append `start`/`limit` query parameters to `url`.
fn with_paging(url: &str, start: usize) -> String {
    let separator = if url.contains('?') { '&' } else { '?' };
    format!("{url}{separator}start={start}&limit={PAGE_LIMIT}")
}

/// Append `expand=a,b` to `url` when `expand` is non-empty.
fn with_expand(mut url: String, expand: &[&str]) -> String {
    if !expand.is_empty() {
        url.push(if url.contains('?') { '&' } else { '?' });
        url.push_str("expand=");
        url.push_str(&expand.join(","));
    }
    url
}
