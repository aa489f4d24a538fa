//! HTTP transport for the GitLab REST API.

use color_eyre::{eyre::eyre, Result};
use reqwest::header::{self, HeaderMap, HeaderValue, LINK};
use reqwest::{Client, StatusCode};
use std::future::Future;
use std::time::Duration;
use url::Url;

use crate::error::FetchError;

/// One response of a paginated listing.
#[derive(Debug, Clone)]
pub struct Page {
  pub url: Url,
  pub status: StatusCode,
  /// Undecoded body, a JSON list on success
  pub body: String,
  /// Target of the `rel="next"` link, if the server sent one
  pub next: Option<Url>,
}

/// Performs a single authenticated GET.
///
/// A response with any status is a `Page`; only failures to obtain a response
/// at all are errors.
pub trait Transport {
  fn get(&self, url: &Url) -> impl Future<Output = std::result::Result<Page, FetchError>> + Send;
}

/// Settings for [`HttpTransport`]
#[derive(Debug, Clone, Default)]
pub struct HttpTransportConfig {
  pub token: Option<String>,
  pub timeout: Option<Duration>,
  pub accept_invalid_certs: bool,
}

/// `reqwest` backed transport sending the `PRIVATE-TOKEN` header on every request
#[derive(Clone)]
pub struct HttpTransport {
  client: Client,
}

impl HttpTransport {
  pub fn new(config: &HttpTransportConfig) -> Result<Self> {
    let mut headers = HeaderMap::new();
    if let Some(token) = &config.token {
      let mut value = HeaderValue::from_str(token)
        .map_err(|_| eyre!("Access token contains characters not allowed in a header"))?;
      value.set_sensitive(true);
      headers.insert("PRIVATE-TOKEN", value);
    }
    headers.insert(header::ACCEPT, HeaderValue::from_static("application/json"));

    let mut builder = Client::builder()
      .default_headers(headers)
      .danger_accept_invalid_certs(config.accept_invalid_certs);
    if let Some(timeout) = config.timeout {
      builder = builder.timeout(timeout);
    }

    let client = builder
      .build()
      .map_err(|e| eyre!("Failed to build HTTP client: {}", e))?;

    Ok(Self { client })
  }
}

impl Transport for HttpTransport {
  async fn get(&self, url: &Url) -> std::result::Result<Page, FetchError> {
    let response = self
      .client
      .get(url.clone())
      .send()
      .await
      .map_err(|e| FetchError::transport(url, e))?;

    let status = response.status();
    let next = response
      .headers()
      .get_all(LINK)
      .iter()
      .filter_map(|value| value.to_str().ok())
      .find_map(|value| next_link(value, url));

    let body = response
      .text()
      .await
      .map_err(|e| FetchError::transport(url, e))?;

    Ok(Page {
      url: url.clone(),
      status,
      body,
      next,
    })
  }
}

/// Extract the `rel="next"` target from a `Link` header value.
///
/// Relative targets resolve against `base`. An empty or unparsable target
/// counts as no link.
pub fn next_link(header: &str, base: &Url) -> Option<Url> {
  header.split(',').find_map(|entry| {
    let mut parts = entry.split(';');
    let target = parts
      .next()?
      .trim()
      .strip_prefix('<')?
      .strip_suffix('>')?
      .trim();

    let is_next = parts.any(|param| {
      let Some((name, value)) = param.split_once('=') else {
        return false;
      };
      name.trim().eq_ignore_ascii_case("rel")
        && value
          .trim()
          .trim_matches('"')
          .split_ascii_whitespace()
          .any(|rel| rel.eq_ignore_ascii_case("next"))
    });

    if !is_next || target.is_empty() {
      return None;
    }
    base.join(target).ok()
  })
}
