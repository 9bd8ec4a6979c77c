use std::collections::HashSet;
use std::env;
use std::path::{Path, PathBuf};
use std::time::Duration;

use figment::providers::{Format, Toml};
use figment::Figment;
use schemars::JsonSchema;
use serde::Deserialize;
use tracing::debug;

use crate::error::{Error, Result};

pub const DEFAULT_MAX_DEPTH: usize = 1;
pub const MAX_DEPTH_LIMIT: usize = 16;
const DEFAULT_PREVIEW_TIMEOUT_MS: u64 = 2000;
const DEFAULT_PREVIEW_MAX_LINES: usize = 200;
const DEFAULT_EXCLUDES: &[&str] = &[".git"];

/// On-disk format of a navgator config file. Every section is optional so
/// several files can be layered.
#[derive(Debug, Default, Deserialize, JsonSchema)]
pub struct ConfigFile {
    #[serde(default)]
    pub paths: Option<ConfigPaths>,
    #[serde(default)]
    pub index: Option<IndexSection>,
    #[serde(default)]
    pub preview: Option<PreviewSection>,
    #[serde(default)]
    pub metadata: Option<MetadataSection>,
    #[serde(default)]
    pub contexts: Option<ContextsSection>,
}

#[derive(Debug, Default, Deserialize, JsonSchema)]
pub struct ConfigPaths {
    /// Folders whose subdirectories are indexed.
    #[serde(default)]
    pub index_folders: Vec<String>,
    /// Paths listed verbatim, never recursed into.
    #[serde(default)]
    pub static_items: Vec<String>,
}

#[derive(Debug, Default, Deserialize, JsonSchema)]
pub struct IndexSection {
    /// How many directory levels below each index folder are visited.
    #[serde(default)]
    pub max_depth: Option<usize>,
    /// Directory names that are never descended into.
    #[serde(default)]
    pub exclude: Vec<String>,
    #[serde(default)]
    pub follow_symlinks: Option<bool>,
}

#[derive(Debug, Default, Deserialize, JsonSchema)]
pub struct PreviewSection {
    /// Timeout for each external tool invocation, in milliseconds.
    #[serde(default)]
    pub timeout_ms: Option<u64>,
    #[serde(default)]
    pub max_lines: Option<usize>,
}

#[derive(Debug, Default, Deserialize, JsonSchema)]
pub struct MetadataSection {
    /// Fetch timestamps for the whole index when the picker opens.
    #[serde(default)]
    pub refresh_on_start: Option<bool>,
}

#[derive(Debug, Default, Deserialize, JsonSchema)]
pub struct ContextsSection {
    /// Directory new contexts are created in.
    #[serde(default)]
    pub root: Option<String>,
    /// Directory holding one subdirectory per template.
    #[serde(default)]
    pub templates: Option<String>,
}

/// Immutable configuration snapshot merged from every config file found.
#[derive(Debug, Clone)]
pub struct Config {
    pub index_folders: Vec<PathBuf>,
    pub static_items: Vec<PathBuf>,
    pub max_depth: usize,
    pub exclude: Vec<String>,
    pub follow_symlinks: bool,
    pub preview_timeout: Duration,
    pub preview_max_lines: usize,
    pub refresh_on_start: bool,
    pub contexts_root: Option<PathBuf>,
    pub templates_dir: Option<PathBuf>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            index_folders: Vec::new(),
            static_items: Vec::new(),
            max_depth: DEFAULT_MAX_DEPTH,
            exclude: DEFAULT_EXCLUDES.iter().map(|name| name.to_string()).collect(),
            follow_symlinks: true,
            preview_timeout: Duration::from_millis(DEFAULT_PREVIEW_TIMEOUT_MS),
            preview_max_lines: DEFAULT_PREVIEW_MAX_LINES,
            refresh_on_start: true,
            contexts_root: None,
            templates_dir: None,
        }
    }
}

impl Config {
    /// Folders walked by the index builder. The contexts root is indexed as
    /// well so that created contexts show up in the picker.
    pub fn index_roots(&self) -> Vec<PathBuf> {
        let mut roots = self.index_folders.clone();
        if let Some(root) = &self.contexts_root {
            if root.is_dir() && !roots.contains(root) {
                roots.push(root.clone());
            }
        }
        roots
    }
}

/// Where config files are looked up, in merge order.
#[derive(Debug, Clone)]
pub struct ConfigSources {
    pub home: PathBuf,
    pub candidates: Vec<PathBuf>,
}

impl ConfigSources {
    pub fn discover() -> Result<Self> {
        let home = home_dir()?;
        let candidates = config_paths(&home);
        Ok(Self { home, candidates })
    }
}

pub fn home_dir() -> Result<PathBuf> {
    if let Some(value) = env::var_os("HOME").filter(|value| !value.is_empty()) {
        return Ok(PathBuf::from(value));
    }
    dirs::home_dir().ok_or(Error::HomeMissing)
}

pub fn load() -> Result<Config> {
    load_from(&ConfigSources::discover()?)
}

pub fn load_from(sources: &ConfigSources) -> Result<Config> {
    let home = &sources.home;
    let mut config = Config::default();
    let mut seen_index = HashSet::new();
    let mut seen_static = HashSet::new();
    let mut seen_exclude: HashSet<String> = config.exclude.iter().cloned().collect();
    let mut found_config = false;

    for path in &sources.candidates {
        if !path.is_file() {
            continue;
        }
        found_config = true;
        debug!(path = %path.display(), "reading config");
        let base_dir = path.parent().unwrap_or(home);
        let file: ConfigFile = Figment::from(Toml::file(path))
            .extract()
            .map_err(|err| Error::ConfigParse {
                path: path.clone(),
                source: Box::new(err),
            })?;

        if let Some(paths) = file.paths {
            merge_paths(
                &paths.index_folders,
                base_dir,
                home,
                &mut config.index_folders,
                &mut seen_index,
            );
            merge_paths(
                &paths.static_items,
                base_dir,
                home,
                &mut config.static_items,
                &mut seen_static,
            );
        }
        if let Some(index) = file.index {
            if let Some(depth) = index.max_depth {
                config.max_depth = depth.clamp(1, MAX_DEPTH_LIMIT);
            }
            for name in index.exclude {
                let name = name.trim().to_string();
                if !name.is_empty() && seen_exclude.insert(name.clone()) {
                    config.exclude.push(name);
                }
            }
            if let Some(follow) = index.follow_symlinks {
                config.follow_symlinks = follow;
            }
        }
        if let Some(preview) = file.preview {
            if let Some(timeout) = preview.timeout_ms {
                config.preview_timeout = Duration::from_millis(timeout.max(1));
            }
            if let Some(max_lines) = preview.max_lines {
                config.preview_max_lines = max_lines;
            }
        }
        if let Some(metadata) = file.metadata {
            if let Some(refresh) = metadata.refresh_on_start {
                config.refresh_on_start = refresh;
            }
        }
        if let Some(contexts) = file.contexts {
            if let Some(root) = contexts.root.as_deref() {
                config.contexts_root = expand_path(root, base_dir, home);
            }
            if let Some(templates) = contexts.templates.as_deref() {
                config.templates_dir = expand_path(templates, base_dir, home);
            }
        }
    }

    if !found_config {
        return Err(Error::ConfigurationMissing {
            searched: sources.candidates.clone(),
        });
    }

    Ok(config)
}

pub const CONFIG_ENV: &str = "NAVGATOR_CONFIG";
const SYSTEM_CONFIG: &str = "/etc/navgator/config.toml";

fn non_blank_env(name: &str) -> Option<String> {
    env::var(name).ok().filter(|value| !value.trim().is_empty())
}

/// Every place a config file may live, in merge order and without
/// duplicates. Later files override earlier ones.
pub fn config_paths(home: &Path) -> Vec<PathBuf> {
    let config_home = non_blank_env("XDG_CONFIG_HOME")
        .map(PathBuf::from)
        .unwrap_or_else(|| home.join(".config"));
    let cwd = env::current_dir().ok();

    let candidates = non_blank_env(CONFIG_ENV)
        .map(PathBuf::from)
        .into_iter()
        .chain([
            PathBuf::from(SYSTEM_CONFIG),
            config_home.join("navgator").join("config.toml"),
            home.join(".config").join("navgator").join("config.toml"),
            home.join(".navgator.toml"),
        ])
        .chain(cwd.iter().flat_map(|dir| {
            [
                dir.join(".navgator.toml"),
                dir.join(".navgator").join("config.toml"),
            ]
        }));

    let mut seen = HashSet::new();
    candidates.filter(|path| seen.insert(path.clone())).collect()
}

fn merge_paths(
    raw_paths: &[String],
    base_dir: &Path,
    home: &Path,
    target: &mut Vec<PathBuf>,
    seen: &mut HashSet<PathBuf>,
) {
    for raw in raw_paths {
        if let Some(path) = normalize_path(raw, base_dir, home) {
            if seen.insert(path.clone()) {
                target.push(path);
            }
        }
    }
}

/// Expands `~/` and `$HOME` and anchors relative paths at `base_dir`.
pub fn expand_path(raw: &str, base_dir: &Path, home: &Path) -> Option<PathBuf> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return None;
    }
    let home_text = home.to_string_lossy();
    let mut value = trimmed.to_string();
    if value == "~" {
        value = home_text.to_string();
    } else if value.starts_with("~/") {
        value = value.replacen('~', &home_text, 1);
    }
    if value.contains("$HOME") {
        value = value.replace("$HOME", &home_text);
    }
    let path = PathBuf::from(value);
    if path.is_relative() {
        Some(base_dir.join(path))
    } else {
        Some(path)
    }
}

fn normalize_path(raw: &str, base_dir: &Path, home: &Path) -> Option<PathBuf> {
    let path = expand_path(raw, base_dir, home)?;
    if path.exists() {
        Some(path)
    } else {
        debug!(path = %path.display(), "configured path does not exist, skipping");
        None
    }
}
