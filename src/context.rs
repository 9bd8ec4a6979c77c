//! Named contexts: tagged directories looked up by the `context` key of
//! their marker file, created on demand under `contexts.root`.

use std::fs;
use std::path::{Path, PathBuf};

use serde::Serialize;
use tracing::{debug, info, warn};
use walkdir::WalkDir;

use crate::config::Config;
use crate::error::{Error, Result};
use crate::index;
use crate::tags;

/// Tag carried by every created context.
pub const CONTEXT_TAG: &str = "context";

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum CreatePolicy {
    Create,
    NoCreate,
    #[default]
    Unspecified,
}

#[derive(Debug, Clone, Default)]
pub struct ContextRequest {
    pub name: String,
    pub policy: CreatePolicy,
    pub template: Option<String>,
    pub description: Option<String>,
    pub tags: Vec<String>,
}

impl ContextRequest {
    pub fn new(name: impl Into<String>, policy: CreatePolicy) -> Self {
        Self {
            name: name.into(),
            policy,
            ..Self::default()
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ContextEntry {
    pub name: String,
    pub path: PathBuf,
    pub template: Option<String>,
    pub description: Option<String>,
    pub tags: Vec<String>,
    /// False when an existing context was returned.
    pub created: bool,
}

/// Returns the context called `request.name`, creating it when the policy
/// allows. An existing context is returned as-is; the template, description
/// and tags of the request only apply to a new one.
pub fn resolve(config: &Config, request: &ContextRequest) -> Result<ContextEntry> {
    let name = request.name.trim();
    if name.is_empty() {
        return Err(Error::InvalidContextName(request.name.clone()));
    }
    if let Some(existing) = find(config, name) {
        debug!(name, path = %existing.path.display(), "context found");
        return Ok(existing);
    }
    match request.policy {
        CreatePolicy::Create => create(config, request),
        CreatePolicy::NoCreate => Err(Error::ContextNotFound(name.to_string())),
        CreatePolicy::Unspecified => Err(Error::ContextPolicyUnspecified(name.to_string())),
    }
}

/// First indexed directory, in path order, whose marker names `name`.
pub fn find(config: &Config, name: &str) -> Option<ContextEntry> {
    let (index, _) = index::build(config);
    let mut paths: Vec<&str> = index
        .candidates()
        .iter()
        .map(|candidate| candidate.path.as_str())
        .collect();
    paths.sort_unstable();
    paths.into_iter().find_map(|path| entry_at(Path::new(path), name))
}

fn entry_at(dir: &Path, name: &str) -> Option<ContextEntry> {
    let marker = tags::read_marker(dir);
    if marker.context.as_deref() != Some(name) {
        return None;
    }
    Some(ContextEntry {
        name: name.to_string(),
        path: dir.to_path_buf(),
        template: marker.template,
        description: marker.description,
        tags: marker.tags,
        created: false,
    })
}

pub fn create(config: &Config, request: &ContextRequest) -> Result<ContextEntry> {
    let name = request.name.trim();
    let slug = slugify(name);
    if slug.is_empty() {
        return Err(Error::InvalidContextName(request.name.clone()));
    }
    let root = config.contexts_root.as_ref().ok_or(Error::ContextRootMissing)?;
    let template_dir = match &request.template {
        Some(id) => Some(template_path(config, id)?),
        None => None,
    };

    fs::create_dir_all(root)?;
    let target = root.join(&slug);
    if target.exists() {
        return Err(Error::ContextAlreadyExists {
            name: name.to_string(),
            path: target,
        });
    }
    fs::create_dir(&target)?;

    let populated = populate(&target, name, request, template_dir.as_deref());
    if let Err(err) = populated {
        if let Err(cleanup) = fs::remove_dir_all(&target) {
            warn!(path = %target.display(), error = %cleanup, "could not remove partial context");
        }
        return Err(err);
    }

    let marker = tags::read_marker(&target);
    info!(name, path = %target.display(), "context created");
    Ok(ContextEntry {
        name: name.to_string(),
        path: target,
        template: request.template.clone(),
        description: request.description.clone(),
        tags: marker.tags,
        created: true,
    })
}

fn populate(
    target: &Path,
    name: &str,
    request: &ContextRequest,
    template_dir: Option<&Path>,
) -> Result<()> {
    let mut context_tags = vec![CONTEXT_TAG.to_string()];
    context_tags.extend(request.tags.iter().cloned());
    if let Some(template_dir) = template_dir {
        copy_template(template_dir, target)?;
        context_tags.extend(tags::tags_for(template_dir));
    }
    let context_tags = tags::clean_tags(context_tags);
    tags::write_context_marker(
        target,
        name,
        request.description.as_deref(),
        request.template.as_deref(),
        &context_tags,
    )
}

fn template_path(config: &Config, id: &str) -> Result<PathBuf> {
    let valid_id = !id.is_empty()
        && Path::new(id)
            .components()
            .all(|part| matches!(part, std::path::Component::Normal(_)));
    let path = config
        .templates_dir
        .as_ref()
        .filter(|_| valid_id)
        .map(|dir| dir.join(id))
        .filter(|path| path.is_dir());
    path.ok_or_else(|| Error::TemplateNotFound(id.to_string()))
}

fn copy_template(from: &Path, to: &Path) -> Result<()> {
    for entry in WalkDir::new(from).min_depth(1).follow_links(false) {
        let entry = entry.map_err(|err| {
            err.into_io_error()
                .unwrap_or_else(|| std::io::Error::other("symlink loop in template"))
        })?;
        let relative = entry
            .path()
            .strip_prefix(from)
            .map_err(std::io::Error::other)?;
        let destination = to.join(relative);
        let file_type = entry.file_type();
        if file_type.is_dir() {
            fs::create_dir_all(&destination)?;
        } else if file_type.is_file() {
            fs::copy(entry.path(), &destination)?;
        } else {
            debug!(path = %entry.path().display(), "skipping special template entry");
        }
    }
    Ok(())
}

/// Directory name for a context: lowercase, with runs of anything other
/// than ASCII letters, digits, `.` and `_` collapsed into `-`.
pub fn slugify(name: &str) -> String {
    let mut slug = String::with_capacity(name.len());
    let mut pending_dash = false;
    for ch in name.chars() {
        if ch.is_ascii_alphanumeric() || ch == '_' || ch == '.' {
            if pending_dash && !slug.is_empty() {
                slug.push('-');
            }
            pending_dash = false;
            slug.push(ch.to_ascii_lowercase());
        } else {
            pending_dash = true;
        }
    }
    let slug = slug.trim_matches('.').to_string();
    if slug.is_empty() || slug == "." || slug == ".." {
        String::new()
    } else {
        slug
    }
}
