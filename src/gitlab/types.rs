use serde::Deserialize;
use serde_json::{Map, Value};
use std::fmt;
use std::str::FromStr;

/// Project as listed by the projects endpoints
#[derive(Debug, Clone, Deserialize)]
#[allow(dead_code)]
pub struct Project {
  pub id: u64,
  pub name: String,
  /// Fields not used by the report
  #[serde(flatten)]
  pub extra: Map<String, Value>,
}

/// Lifecycle state of a merge request
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MergeRequestState {
  Opened,
  Closed,
  Merged,
  Locked,
}

impl MergeRequestState {
  pub const ALL: [MergeRequestState; 4] = [
    MergeRequestState::Opened,
    MergeRequestState::Closed,
    MergeRequestState::Merged,
    MergeRequestState::Locked,
  ];

  pub fn as_str(self) -> &'static str {
    match self {
      Self::Opened => "opened",
      Self::Closed => "closed",
      Self::Merged => "merged",
      Self::Locked => "locked",
    }
  }
}

impl fmt::Display for MergeRequestState {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(self.as_str())
  }
}

impl FromStr for MergeRequestState {
  type Err = String;

  fn from_str(s: &str) -> Result<Self, Self::Err> {
    Self::ALL
      .into_iter()
      .find(|state| state.as_str() == s.to_lowercase())
      .ok_or_else(|| format!("unknown merge request state: {}", s))
  }
}

/// Merge request as listed by the merge request endpoints
#[derive(Debug, Clone, Deserialize)]
#[allow(dead_code)]
pub struct MergeRequest {
  pub id: u64,
  #[serde(default)]
  pub iid: Option<u64>,
  /// Owning project. Implicit for per-project listings.
  #[serde(default)]
  pub project_id: Option<u64>,
  pub state: MergeRequestState,
  #[serde(default)]
  pub title: String,
  #[serde(flatten)]
  pub extra: Map<String, Value>,
}

/// Which merge requests a listing yields
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum StateFilter {
  #[default]
  All,
  Only(MergeRequestState),
}

impl StateFilter {
  pub fn matches(self, state: MergeRequestState) -> bool {
    match self {
      Self::All => true,
      Self::Only(wanted) => wanted == state,
    }
  }
}

impl From<MergeRequestState> for StateFilter {
  fn from(state: MergeRequestState) -> Self {
    Self::Only(state)
  }
}

impl FromStr for StateFilter {
  type Err = String;

  fn from_str(s: &str) -> Result<Self, Self::Err> {
    if s.eq_ignore_ascii_case("all") {
      return Ok(Self::All);
    }
    s.parse().map(Self::Only)
  }
}

/// Merge request counts per state
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StateCounts {
  pub opened: u64,
  pub closed: u64,
  pub merged: u64,
  pub locked: u64,
}

impl StateCounts {
  pub fn increment(&mut self, state: MergeRequestState) {
    let counter = match state {
      MergeRequestState::Opened => &mut self.opened,
      MergeRequestState::Closed => &mut self.closed,
      MergeRequestState::Merged => &mut self.merged,
      MergeRequestState::Locked => &mut self.locked,
    };
    *counter += 1;
  }

  pub fn sum(&self) -> u64 {
    self.opened + self.closed + self.merged + self.locked
  }
}

/// Per-project tally of merge requests
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Summary {
  pub project_id: u64,
  pub name: String,
  pub counts: StateCounts,
  pub total: u64,
}

impl Summary {
  /// Count `merge_requests` for `project`. Every item adds one to `total`
  /// and one to the counter of its state, so `total == counts.sum()`.
  pub fn tally<'a>(project: &Project, merge_requests: impl IntoIterator<Item = &'a MergeRequest>) -> Self {
    let mut counts = StateCounts::default();
    let mut total = 0;
    for mr in merge_requests {
      total += 1;
      counts.increment(mr.state);
    }
    debug_assert_eq!(total, counts.sum());

    Self {
      project_id: project.id,
      name: project.name.clone(),
      counts,
      total,
    }
  }
}
