//! Cache keys for GitLab listings.

use url::Url;

use crate::error::FetchError;

/// Query key types for GitLab API listings.
///
/// Each key names one cached list and knows the endpoint it is loaded from.
/// Merge request listings always request `state=all`; filtering by state
/// happens on the cached superset.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum GitLabQueryKey {
  /// Projects of a group, or every visible project without a group
  Projects { group: Option<String> },
  /// Every merge request visible to the token
  MergeRequests,
  /// Merge requests of one project
  ProjectMergeRequests { project_id: u64 },
}

impl GitLabQueryKey {
  /// Endpoint URL under the API base (e.g. `https://host/api/v4`).
  ///
  /// Group paths such as `team/sub` are sent as a single encoded segment.
  pub fn url(&self, api: &Url) -> Result<Url, FetchError> {
    let mut url = api.clone();
    url.set_query(None);

    {
      let mut segments = url.path_segments_mut().map_err(|_| FetchError::InvalidUrl {
        url: api.to_string(),
        source: url::ParseError::RelativeUrlWithCannotBeABaseBase,
      })?;
      segments.pop_if_empty();

      match self {
        Self::Projects { group: Some(group) } => {
          segments.extend(["groups", group.as_str(), "projects"]);
        }
        Self::Projects { group: None } => {
          segments.push("projects");
        }
        Self::MergeRequests => {
          segments.push("merge_requests");
        }
        Self::ProjectMergeRequests { project_id } => {
          segments.extend(["projects", &project_id.to_string(), "merge_requests"]);
        }
      }
    }

    if self.is_merge_request_listing() {
      url.set_query(Some("state=all"));
    }
    Ok(url)
  }

  fn is_merge_request_listing(&self) -> bool {
    matches!(self, Self::MergeRequests | Self::ProjectMergeRequests { .. })
  }

  pub fn description(&self) -> String {
    match self {
      Self::Projects { group } => {
        if let Some(g) = group {
          format!("projects of group {}", g)
        } else {
          "all projects".to_string()
        }
      }
      Self::MergeRequests => "all merge requests".to_string(),
      Self::ProjectMergeRequests { project_id } => {
        format!("merge requests of project {}", project_id)
      }
    }
  }
}
