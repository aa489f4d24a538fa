mod cache;
mod config;
mod error;
mod gitlab;
mod logging;
mod report;

use clap::Parser;
use color_eyre::Result;
use std::path::PathBuf;
use tracing::info;

use crate::gitlab::client::GitLabClient;
use crate::gitlab::transport::HttpTransport;
use crate::report::TablePrinter;

#[derive(Parser, Debug)]
#[command(name = "mrstat")]
#[command(about = "Merge request counts by state for every project in a GitLab group")]
#[command(version)]
struct Args {
  /// Path to config file (default: ./mrstat.yaml or $XDG_CONFIG_HOME/mrstat/config.yaml)
  #[arg(short, long)]
  config: Option<PathBuf>,

  /// GitLab API endpoint [default: https://gitlab.com/api/v4]
  #[arg(short, long)]
  api: Option<String>,

  /// GitLab API access token (default: $MRSTAT_GITLAB_TOKEN or $GITLAB_TOKEN)
  #[arg(short, long)]
  token: Option<String>,

  /// GitLab project group id or path (default: all visible projects)
  #[arg(short, long)]
  group: Option<String>,

  /// Write logs to this file instead of stderr
  #[arg(long)]
  log_file: Option<PathBuf>,

  /// Increase log verbosity (-v debug, -vv trace)
  #[arg(short, long, action = clap::ArgAction::Count)]
  verbose: u8,
}

#[tokio::main]
async fn main() -> Result<()> {
  color_eyre::install()?;

  let args = Args::parse();

  let _log_guard = logging::init(args.verbose, args.log_file.as_deref())?;

  // Load configuration
  let mut config = config::Config::load(args.config.as_deref())?;

  // Command line flags override the config file
  if let Some(api) = args.api {
    config.gitlab.api = api;
  }
  if let Some(group) = args.group {
    config.gitlab.group = Some(group).filter(|g| !g.trim().is_empty());
  }

  let mut client = GitLabClient::<HttpTransport>::from_config(&config, args.token)?;
  info!(api = %config.gitlab.api, group = ?config.gitlab.group, "building merge request summary");

  let mut printer = TablePrinter::new(std::io::stdout().lock());
  client.print_project_summary(&mut printer).await?;

  Ok(())
}
