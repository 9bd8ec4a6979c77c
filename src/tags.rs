//! Per-directory marker files.
//!
//! A directory carries tags (and, for contexts, a name and description) in a
//! small `.navgator.toml` file at its root. Reading never fails: a missing or
//! broken marker simply yields no tags. Writing rewrites only the keys it
//! owns and keeps every other line of the file intact.

use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};

use figment::providers::{Format, Toml};
use figment::Figment;
use serde::Deserialize;
use tracing::warn;

use crate::error::Result;

pub const MARKER_FILE: &str = ".navgator.toml";

#[derive(Debug, Default, Clone, PartialEq, Eq, Deserialize)]
pub struct Marker {
    #[serde(default)]
    pub tags: Vec<String>,
    /// Context name, set when the directory was created as a context.
    #[serde(default)]
    pub context: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub template: Option<String>,
}

pub fn marker_path(dir: &Path) -> PathBuf {
    dir.join(MARKER_FILE)
}

pub fn read_marker(dir: &Path) -> Marker {
    let path = marker_path(dir);
    if !path.is_file() {
        return Marker::default();
    }
    let contents = match fs::read_to_string(&path) {
        Ok(value) => value,
        Err(err) => {
            warn!(path = %path.display(), error = %err, "unreadable marker file");
            return Marker::default();
        }
    };
    parse_marker(&contents, &path)
}

pub fn tags_for(dir: &Path) -> Vec<String> {
    read_marker(dir).tags
}

fn parse_marker(contents: &str, path: &Path) -> Marker {
    let mut marker = match Figment::from(Toml::string(contents)).extract::<Marker>() {
        Ok(marker) => marker,
        Err(err) => {
            warn!(path = %path.display(), error = %err, "malformed marker file, scanning for tags");
            Marker {
                tags: parse_tags_leniently(contents),
                ..Marker::default()
            }
        }
    };
    marker.tags = clean_tags(marker.tags);
    marker
}

pub fn clean_tags(tags: Vec<String>) -> Vec<String> {
    let mut seen = HashSet::new();
    tags.into_iter()
        .map(|tag| tag.trim().to_string())
        .filter(|tag| !tag.is_empty() && seen.insert(tag.clone()))
        .collect()
}

/// Pulls the quoted strings out of a `tags = [...]` assignment without a
/// full TOML parse, for files the parser rejects.
fn parse_tags_leniently(contents: &str) -> Vec<String> {
    let mut lines = contents.lines().map(|line| strip_comment(line).trim());
    let Some(first) = lines.by_ref().find_map(|line| {
        let (key, value) = line.split_once('=')?;
        (key.trim() == "tags").then(|| value.trim())
    }) else {
        return Vec::new();
    };

    let mut value = first.to_string();
    if value.contains('[') && !value.contains(']') {
        for line in lines {
            value.push(' ');
            value.push_str(line);
            if line.contains(']') {
                break;
            }
        }
    }
    quoted_strings(&value)
}

fn quoted_strings(value: &str) -> Vec<String> {
    value
        .split('"')
        .skip(1)
        .step_by(2)
        .filter(|text| !text.is_empty())
        .map(str::to_string)
        .collect()
}

/// Cuts a trailing `#` comment, ignoring `#` inside double-quoted strings.
fn strip_comment(line: &str) -> &str {
    let mut in_string = false;
    let mut escaped = false;
    for (idx, ch) in line.char_indices() {
        match ch {
            '\\' if in_string => escaped = !escaped,
            '"' if !escaped => in_string = !in_string,
            '#' if !in_string => return &line[..idx],
            _ => escaped = false,
        }
        if ch != '\\' {
            escaped = false;
        }
    }
    line
}

pub fn save_tags(dir: &Path, tags: &[String]) -> Result<()> {
    update_marker(dir, &[("tags", format_tags(tags))])
}

/// Writes the marker of a freshly created context directory.
pub fn write_context_marker(
    dir: &Path,
    name: &str,
    description: Option<&str>,
    template: Option<&str>,
    tags: &[String],
) -> Result<()> {
    let mut entries = vec![("context", toml_string(name))];
    if let Some(description) = description {
        entries.push(("description", toml_string(description)));
    }
    if let Some(template) = template {
        entries.push(("template", toml_string(template)));
    }
    entries.push(("tags", format_tags(tags)));
    update_marker(dir, &entries)
}

fn update_marker(dir: &Path, entries: &[(&str, String)]) -> Result<()> {
    let path = marker_path(dir);
    let mut contents = if path.exists() {
        fs::read_to_string(&path)?
    } else {
        String::new()
    };
    for (key, literal) in entries {
        contents = upsert_root_key(&contents, key, literal);
    }
    fs::write(path, contents)?;
    Ok(())
}

/// Replaces `key = ...` in the root table of `contents`, or inserts it ahead of
/// the first table header when absent.
fn upsert_root_key(contents: &str, key: &str, literal: &str) -> String {
    let line = format!("{} = {}", key, literal);
    if contents.trim().is_empty() {
        return format!("{}\n", line);
    }

    let mut lines: Vec<String> = contents.lines().map(str::to_string).collect();
    let mut start = None;
    let mut end = None;
    let mut first_table = None;
    let mut in_other_array = false;
    for (idx, raw) in lines.iter().enumerate() {
        let cleaned = strip_comment(raw);
        if start.is_some() {
            if cleaned.contains(']') {
                end = Some(idx);
                break;
            }
            continue;
        }
        if in_other_array {
            in_other_array = !cleaned.contains(']');
            continue;
        }
        let trimmed = cleaned.trim();
        if trimmed.starts_with('[') {
            first_table = Some(idx);
            break;
        }
        let Some(eq) = cleaned.find('=') else {
            continue;
        };
        let value = cleaned[eq + 1..].trim();
        let opens_array = value.starts_with('[') && !value.contains(']');
        if cleaned[..eq].trim() == key {
            start = Some(idx);
            if !opens_array {
                end = Some(idx);
                break;
            }
        } else {
            in_other_array = opens_array;
        }
    }

    match (start, first_table) {
        (Some(start), _) => {
            let end = end.unwrap_or(start);
            lines.splice(start..=end, [line]);
        }
        (None, Some(table)) => {
            lines.insert(table, line);
        }
        (None, None) => {
            while lines.last().is_some_and(|last| last.trim().is_empty()) {
                lines.pop();
            }
            lines.push(line);
        }
    }
    let mut out = lines.join("\n");
    out.push('\n');
    out
}

fn format_tags(tags: &[String]) -> String {
    let items = tags
        .iter()
        .map(|tag| toml_string(tag))
        .collect::<Vec<String>>()
        .join(", ");
    format!("[{}]", items)
}

fn toml_string(value: &str) -> String {
    let escaped = value
        .replace('\\', "\\\\")
        .replace('"', "\\\"")
        .replace('\n', "\\n");
    format!("\"{}\"", escaped)
}
