use color_eyre::{eyre::eyre, Result};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, info_span, warn, Span};
use url::Url;

use crate::cache::{CacheResult, CacheSource, CacheStore, Completion, Fetched};
use crate::config::{Config, GitLabConfig};
use crate::error::{FetchError, ReportError};
use crate::report::SummaryPrinter;

use super::cache::GitLabQueryKey;
use super::loader::PaginatedLoader;
use super::transport::{HttpTransport, HttpTransportConfig, Transport};
use super::types::{MergeRequest, Project, StateFilter, Summary};

/// Cached merge requests seen through a state filter.
#[derive(Debug, Clone)]
pub struct MergeRequestList {
  list: Arc<Fetched<MergeRequest>>,
  filter: StateFilter,
}

impl MergeRequestList {
  pub fn iter(&self) -> impl Iterator<Item = &MergeRequest> + '_ {
    let filter = self.filter;
    self
      .list
      .items()
      .iter()
      .filter(move |mr| filter.matches(mr.state))
  }

  pub fn count(&self) -> usize {
    self.iter().count()
  }

  /// How the underlying traversal ended
  pub fn completion(&self) -> &Completion {
    self.list.completion()
  }
}

/// GitLab API client with per-process caching.
///
/// Every listing is fetched from the network at most once per key and then
/// served from memory. There is no refresh: a client reflects the server as
/// it was when each list was first requested.
pub struct GitLabClient<T = HttpTransport> {
  api: Url,
  group: Option<String>,
  loader: PaginatedLoader<T>,
  projects: CacheStore<GitLabQueryKey, Fetched<Project>>,
  merge_requests: CacheStore<GitLabQueryKey, Fetched<MergeRequest>>,
  project_merge_requests: CacheStore<u64, Fetched<MergeRequest>>,
  summaries: CacheStore<u64, Summary>,
  span: Span,
}

impl GitLabClient<HttpTransport> {
  /// Build a client from configuration. `token` overrides the token from the environment.
  pub fn from_config(config: &Config, token: Option<String>) -> Result<Self> {
    let GitLabConfig {
      api,
      group,
      timeout_secs,
      accept_invalid_certs,
      per_page,
    } = &config.gitlab;

    let api = Url::parse(api).map_err(|e| eyre!("Invalid GitLab API URL {}: {}", api, e))?;

    let token = token.or_else(Config::get_api_token);
    if token.is_none() {
      warn!("No GitLab access token configured, sending anonymous requests");
    }

    let transport = HttpTransport::new(&HttpTransportConfig {
      token,
      timeout: timeout_secs.map(Duration::from_secs),
      accept_invalid_certs: *accept_invalid_certs,
    })?;

    let span = info_span!("gitlab", api = %api, group = group.as_deref().unwrap_or("-"));

    Ok(Self::new(api, group.clone(), transport, span).with_per_page(*per_page))
  }
}

impl<T: Transport> GitLabClient<T> {
  /// Create a client for the API rooted at `api` (e.g. `https://host/api/v4`).
  ///
  /// Events are recorded inside `span`.
  pub fn new(api: Url, group: Option<String>, transport: T, span: Span) -> Self {
    Self {
      api,
      group,
      loader: PaginatedLoader::new(transport, span.clone()),
      projects: CacheStore::new(),
      merge_requests: CacheStore::new(),
      project_merge_requests: CacheStore::new(),
      summaries: CacheStore::new(),
      span,
    }
  }

  pub fn with_per_page(mut self, per_page: Option<u32>) -> Self {
    self.loader = self.loader.with_per_page(per_page);
    self
  }

  #[cfg(test)]
  pub fn transport(&self) -> &T {
    self.loader.transport()
  }

  /// List the projects of the configured group, or every visible project.
  pub async fn list_projects(&mut self) -> Result<Arc<Fetched<Project>>, FetchError> {
    let key = GitLabQueryKey::Projects {
      group: self.group.clone(),
    };
    let url = key.url(&self.api)?;
    let loader = &self.loader;

    let result = self
      .projects
      .get_or_fetch(key.clone(), move || loader.fetch_all(url))
      .await?;
    self.log_listing(&key, &result);

    Ok(result.data)
  }

  /// List every merge request visible to the token, filtered by state.
  #[allow(dead_code)]
  pub async fn list_merge_requests(
    &mut self,
    filter: StateFilter,
  ) -> Result<MergeRequestList, FetchError> {
    let key = GitLabQueryKey::MergeRequests;
    let url = key.url(&self.api)?;
    let loader = &self.loader;

    let result = self
      .merge_requests
      .get_or_fetch(key.clone(), move || loader.fetch_all(url))
      .await?;
    self.log_listing(&key, &result);

    Ok(MergeRequestList {
      list: result.data,
      filter,
    })
  }

  /// List the merge requests of one project, filtered by state.
  ///
  /// The server is always asked for every state; the filter applies to the
  /// cached list, so later calls with other filters need no requests.
  pub async fn get_project_mr(
    &mut self,
    project_id: u64,
    filter: StateFilter,
  ) -> Result<MergeRequestList, FetchError> {
    let key = GitLabQueryKey::ProjectMergeRequests { project_id };
    let url = key.url(&self.api)?;
    let loader = &self.loader;

    let result = self
      .project_merge_requests
      .get_or_fetch(project_id, move || loader.fetch_all(url))
      .await?;
    self.log_listing(&key, &result);

    Ok(MergeRequestList {
      list: result.data,
      filter,
    })
  }

  /// Summary computed earlier for `project_id`, if any.
  pub fn summary(&self, project_id: u64) -> Option<Arc<Summary>> {
    self.summaries.get(&project_id)
  }

  /// Tally the merge requests of `project` by state.
  ///
  /// Computed once per project id; later calls return the stored summary.
  pub async fn get_project_summary(&mut self, project: &Project) -> Result<Arc<Summary>, FetchError> {
    if let Some(summary) = self.summary(project.id) {
      return Ok(summary);
    }

    let merge_requests = self.get_project_mr(project.id, StateFilter::All).await?;
    let summary = Summary::tally(project, merge_requests.iter());

    if let Completion::Truncated { status, .. } = merge_requests.completion() {
      warn!(
        parent: &self.span,
        project = %project.name,
        status = status.as_u16(),
        "summary built from an incomplete merge request list"
      );
    }

    Ok(self.summaries.insert(project.id, summary))
  }

  /// Print a header and one summary row per project.
  ///
  /// A fetch failure aborts the report; rows already printed stay printed.
  pub async fn print_project_summary<P: SummaryPrinter>(
    &mut self,
    printer: &mut P,
  ) -> Result<(), ReportError> {
    printer.header()?;

    let projects = self.list_projects().await?;
    for project in projects.items() {
      let summary = match self.summary(project.id) {
        Some(summary) => summary,
        None => self.get_project_summary(project).await?,
      };
      printer.row(&summary)?;
    }

    Ok(())
  }

  fn log_listing<V>(&self, key: &GitLabQueryKey, result: &CacheResult<Arc<Fetched<V>>>) {
    match result.source {
      CacheSource::Network => info!(
        parent: &self.span,
        listing = %key.description(),
        count = result.data.len(),
        complete = result.data.completion().is_complete(),
        "fetched"
      ),
      CacheSource::Cache => debug!(
        parent: &self.span,
        listing = %key.description(),
        fetched_at = %result.data.fetched_at(),
        "served from cache"
      ),
    }
  }
}
