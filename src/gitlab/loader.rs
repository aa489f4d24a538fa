//! Paginated fetching over a [`Transport`].
//!
//! GitLab splits list endpoints into pages chained by `Link: <...>; rel="next"`.
//! The loader follows that chain and offers two ways to consume it:
//!
//! - [`PaginatedLoader::fetch_all`] drains every page and returns a
//!   materialized [`Fetched`] list together with how the traversal ended.
//!   This is the only form the caches store.
//! - [`PaginatedLoader::stream`] yields items as pages arrive. It never feeds
//!   a cache, so partially consuming it cannot leave a half-filled entry.
//!
//! A non-success status stops the traversal and keeps what was loaded so far.
//! A transport or decode failure aborts it with an error.

use futures::{stream, Stream, TryStreamExt};
use serde::de::DeserializeOwned;
use tracing::{debug, error, Instrument, Span};
use url::Url;

use super::transport::{Page, Transport};
use crate::cache::Fetched;
use crate::error::FetchError;

/// Outcome of loading a single page
enum PageOutcome<T> {
  Loaded { items: Vec<T>, next: Option<Url> },
  Rejected(Page),
}

pub struct PaginatedLoader<T> {
  transport: T,
  per_page: Option<u32>,
  span: Span,
}

impl<T: Transport> PaginatedLoader<T> {
  /// Create a loader recording its events inside `span`.
  pub fn new(transport: T, span: Span) -> Self {
    Self {
      transport,
      per_page: None,
      span,
    }
  }

  /// Ask the server for `per_page` items per page.
  pub fn with_per_page(mut self, per_page: Option<u32>) -> Self {
    self.per_page = per_page;
    self
  }

  #[cfg(test)]
  pub fn transport(&self) -> &T {
    &self.transport
  }

  /// Load every page starting at `url` into one list.
  pub async fn fetch_all<I: DeserializeOwned>(&self, url: Url) -> Result<Fetched<I>, FetchError> {
    async move {
      let mut items = Vec::new();
      let mut next = Some(self.first_page(url));

      while let Some(url) = next.take() {
        match self.load_page(&url).await? {
          PageOutcome::Loaded {
            items: page_items,
            next: next_url,
          } => {
            items.extend(page_items);
            next = next_url;
          }
          PageOutcome::Rejected(page) => {
            return Ok(Fetched::truncated(items, page.url, page.status, page.body));
          }
        }
      }

      debug!(count = items.len(), "traversal complete");
      Ok(Fetched::complete(items))
    }
    .instrument(self.span.clone())
    .await
  }

  /// Yield items page by page starting at `url`.
  ///
  /// The stream is single pass: consuming it again issues the requests again.
  #[allow(dead_code)]
  pub fn stream<I>(&self, url: Url) -> impl Stream<Item = Result<I, FetchError>> + '_
  where
    I: DeserializeOwned + 'static,
  {
    let first = self.first_page(url);
    stream::try_unfold(Some(first), move |next| async move {
      let Some(url) = next else {
        return Ok::<_, FetchError>(None);
      };
      match self.load_page(&url).instrument(self.span.clone()).await? {
        PageOutcome::Loaded { items, next } => {
          Ok(Some((stream::iter(items.into_iter().map(Ok::<I, FetchError>)), next)))
        }
        PageOutcome::Rejected(_) => Ok(None),
      }
    })
    .try_flatten()
  }

  fn first_page(&self, mut url: Url) -> Url {
    if let Some(per_page) = self.per_page {
      url
        .query_pairs_mut()
        .append_pair("per_page", &per_page.to_string());
    }
    url
  }

  async fn load_page<I: DeserializeOwned>(&self, url: &Url) -> Result<PageOutcome<I>, FetchError> {
    debug!(%url, "GET");

    let page = match self.transport.get(url).await {
      Ok(page) => page,
      Err(e) => {
        error!(%url, error = %e, "request failed");
        return Err(e);
      }
    };

    if !page.status.is_success() {
      error!(
        url = %page.url,
        status = page.status.as_u16(),
        body = %page.body,
        "request returned an error status, keeping items loaded so far"
      );
      return Ok(PageOutcome::Rejected(page));
    }

    let items: Vec<I> = match serde_json::from_str(&page.body) {
      Ok(items) => items,
      Err(source) => {
        error!(%url, error = %source, "malformed response body");
        return Err(FetchError::Decode {
          url: page.url,
          source,
        });
      }
    };

    Ok(PageOutcome::Loaded {
      items,
      next: page.next,
    })
  }
}
