//! Scripted in-memory transport for tests.

use reqwest::StatusCode;
use serde_json::Value;
use std::collections::HashMap;
use std::sync::Mutex;
use url::Url;

use super::transport::{Page, Transport};
use crate::error::FetchError;

enum Scripted {
  Page(Page),
  Fail(String),
}

/// Answers GETs from a fixed table and records every requested URL.
///
/// A URL missing from the table fails like a refused connection.
#[derive(Default)]
pub struct MockTransport {
  responses: HashMap<Url, Scripted>,
  requests: Mutex<Vec<Url>>,
}

impl MockTransport {
  pub fn new() -> Self {
    Self::default()
  }

  /// Successful page with a JSON list body.
  pub fn page(self, url: Url, body: Value, next: Option<Url>) -> Self {
    self.raw(url, StatusCode::OK, &body.to_string(), next)
  }

  /// Page answered with `status`.
  pub fn status(self, url: Url, status: StatusCode, body: &str) -> Self {
    self.raw(url, status, body, None)
  }

  pub fn raw(mut self, url: Url, status: StatusCode, body: &str, next: Option<Url>) -> Self {
    let page = Page {
      url: url.clone(),
      status,
      body: body.to_string(),
      next,
    };
    self.responses.insert(url, Scripted::Page(page));
    self
  }

  /// Request that fails before any response arrives.
  pub fn fail(mut self, url: Url, message: &str) -> Self {
    self.responses.insert(url, Scripted::Fail(message.to_string()));
    self
  }

  pub fn requested(&self) -> Vec<Url> {
    self.requests.lock().unwrap().clone()
  }

  pub fn request_count(&self) -> usize {
    self.requests.lock().unwrap().len()
  }
}

impl Transport for MockTransport {
  async fn get(&self, url: &Url) -> Result<Page, FetchError> {
    self.requests.lock().unwrap().push(url.clone());
    match self.responses.get(url) {
      Some(Scripted::Page(page)) => Ok(page.clone()),
      Some(Scripted::Fail(message)) => Err(FetchError::transport(url, message.clone())),
      None => Err(FetchError::transport(url, format!("no scripted response for {}", url))),
    }
  }
}
