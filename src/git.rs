use std::path::Path;
use std::time::Duration;

use tracing::debug;

use crate::tools::{self, ToolError};

const RECENT_COMMITS: usize = 3;
const MAX_LINES: usize = 200;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GitSummary {
    pub branch: Option<String>,
    pub recent_commits: Vec<String>,
    pub staged: Vec<String>,
    pub unstaged: Vec<String>,
    pub untracked: Vec<String>,
}

impl GitSummary {
    pub fn is_empty(&self) -> bool {
        self.branch.is_none()
            && self.recent_commits.is_empty()
            && self.staged.is_empty()
            && self.unstaged.is_empty()
            && self.untracked.is_empty()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GitStatus {
    NotARepo,
    Summary(GitSummary),
    Failed(ToolError),
}

impl GitStatus {
    pub fn is_repo(&self) -> bool {
        !matches!(self, GitStatus::NotARepo)
    }
}

pub fn summary_for(path: &Path, timeout: Duration) -> GitStatus {
    let repo_dir = if path.is_dir() {
        path
    } else {
        match path.parent() {
            Some(parent) => parent,
            None => return GitStatus::NotARepo,
        }
    };

    match run_git(repo_dir, &["rev-parse", "--is-inside-work-tree"], timeout) {
        Ok(inside) if inside.trim() == "true" => {}
        Ok(_) | Err(ToolError::Exit { .. }) => return GitStatus::NotARepo,
        Err(ToolError::Spawn { reason, .. }) => {
            debug!(reason = %reason, "git unavailable");
            return GitStatus::NotARepo;
        }
        Err(err) => return GitStatus::Failed(err),
    }

    let mut summary = GitSummary::default();
    match run_git(repo_dir, &["status", "-sb"], timeout) {
        Ok(output) => summary.branch = parse_branch(&output),
        Err(err @ ToolError::Timeout { .. }) => return GitStatus::Failed(err),
        Err(_) => {}
    }
    let log_format = format!("-{}", RECENT_COMMITS);
    match run_git(
        repo_dir,
        &["log", &log_format, "--pretty=format:%s (%cr)"],
        timeout,
    ) {
        Ok(output) => summary.recent_commits = output_lines(&output),
        // A fresh repository has no commits yet.
        Err(ToolError::Exit { .. }) => {}
        Err(err) => return GitStatus::Failed(err),
    }
    if let Ok(output) = run_git(repo_dir, &["diff", "--stat", "--cached"], timeout) {
        summary.staged = output_lines(&output);
    }
    if let Ok(output) = run_git(repo_dir, &["diff", "--stat"], timeout) {
        summary.unstaged = output_lines(&output);
    }
    if let Ok(output) = run_git(
        repo_dir,
        &["ls-files", "--others", "--exclude-standard"],
        timeout,
    ) {
        summary.untracked = output_lines(&output);
    }
    GitStatus::Summary(summary)
}

fn run_git(repo_dir: &Path, args: &[&str], timeout: Duration) -> Result<String, ToolError> {
    let mut full_args = vec![
        "-C".to_string(),
        repo_dir.to_string_lossy().to_string(),
        "-c".to_string(),
        "color.ui=never".to_string(),
    ];
    full_args.extend(args.iter().map(|arg| arg.to_string()));
    tools::run("git", &full_args, None, &[("NO_COLOR", "1")], timeout)
}

/// Branch line of `git status -sb`, without the leading `## `.
pub fn parse_branch(status_output: &str) -> Option<String> {
    let first_line = status_output.lines().next()?;
    let branch = first_line.trim_start_matches("## ").trim();
    (!branch.is_empty()).then(|| branch.to_string())
}

fn output_lines(output: &str) -> Vec<String> {
    output
        .lines()
        .filter(|line| !line.trim().is_empty())
        .take(MAX_LINES)
        .map(str::to_string)
        .collect()
}
