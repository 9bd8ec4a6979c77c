use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use tracing::warn;

use crate::git::{self, GitStatus};
use crate::tools::{self, ToolError};

const TREE_TOOL: &str = "erd";
const TREE_CONFIG: &str = ".erdtreerc";

#[derive(Debug, Clone)]
pub struct PreviewOptions {
    pub timeout: Duration,
    pub home: Option<PathBuf>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TreeOutput {
    Rendered(String),
    NotADirectory,
    Failed(ToolError),
}

/// Everything the side panels show for one path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PreviewResult {
    pub path: String,
    pub tree: TreeOutput,
    pub git: GitStatus,
}

pub fn collect(path: &str, options: &PreviewOptions) -> PreviewResult {
    let dir = Path::new(path);
    let tree = if dir.is_dir() {
        match render_tree(dir, options) {
            Ok(output) => TreeOutput::Rendered(output),
            Err(err) => {
                warn!(path, error = %err, "tree preview failed");
                TreeOutput::Failed(err)
            }
        }
    } else {
        TreeOutput::NotADirectory
    };
    let git = git::summary_for(dir, options.timeout);
    PreviewResult {
        path: path.to_string(),
        tree,
        git,
    }
}

/// Runs the tree renderer with the user's `~/.erdtreerc` options, falling
/// back to the built-in options when those fail.
pub fn render_tree(path: &Path, options: &PreviewOptions) -> Result<String, ToolError> {
    let path_arg = path.to_string_lossy().to_string();
    let user_args = options
        .home
        .as_deref()
        .and_then(|home| fs::read_to_string(home.join(TREE_CONFIG)).ok())
        .map(|contents| parse_tree_config(&contents))
        .filter(|args| !args.is_empty());

    if let Some(mut args) = user_args {
        args.push(path_arg.clone());
        match tools::run(TREE_TOOL, &args, None, &[], options.timeout) {
            Ok(output) => return Ok(output),
            Err(err @ ToolError::Timeout { .. }) | Err(err @ ToolError::Spawn { .. }) => {
                return Err(err)
            }
            Err(err) => warn!(error = %err, "erd rejected ~/.erdtreerc options, using defaults"),
        }
    }

    let mut args = default_tree_args();
    args.push(path_arg);
    tools::run(TREE_TOOL, &args, None, &[], options.timeout)
}

pub fn parse_tree_config(contents: &str) -> Vec<String> {
    contents
        .lines()
        .map(|line| line.split('#').next().unwrap_or("").trim())
        .filter(|line| !line.is_empty())
        .flat_map(|line| line.split_whitespace().map(str::to_string))
        .collect()
}

pub fn default_tree_args() -> Vec<String> {
    [
        "--dir-order=first",
        "--icons",
        "--sort=name",
        "--level=4",
        "--color",
        "force",
        "--layout=inverted",
        "--human",
        "--suppress-size",
    ]
    .iter()
    .map(|arg| arg.to_string())
    .collect()
}
