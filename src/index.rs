//! Candidate index.
//!
//! An [`Index`] is one generation of candidates. It is rebuilt wholesale by
//! [`build`] and only ever enriched in place with timestamps; anything else
//! (tag edits, rebuilds) produces a new generation.

use std::collections::{HashMap, HashSet};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{SystemTime, UNIX_EPOCH};

use tracing::{debug, info};
use walkdir::{DirEntry, WalkDir};

use crate::config::Config;
use crate::tags;

pub type Generation = u64;

static NEXT_GENERATION: AtomicU64 = AtomicU64::new(1);

fn next_generation() -> Generation {
    NEXT_GENERATION.fetch_add(1, Ordering::Relaxed)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Source {
    IndexedFolder,
    StaticItem,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Candidate {
    pub path: String,
    pub source: Source,
    pub tags: Vec<String>,
    pub created_at: Option<i64>,
    pub modified_at: Option<i64>,
}

impl Candidate {
    pub fn new(path: impl Into<String>, source: Source, tags: Vec<String>) -> Self {
        Self {
            path: path.into(),
            source,
            tags,
            created_at: None,
            modified_at: None,
        }
    }

    /// Last path component, or the whole path for roots.
    pub fn name(&self) -> &str {
        entry_name(&self.path)
    }
}

pub fn entry_name(path: &str) -> &str {
    Path::new(path)
        .file_name()
        .and_then(|part| part.to_str())
        .unwrap_or(path)
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Timestamps {
    pub created: Option<i64>,
    pub modified: Option<i64>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MetadataEntry {
    pub path: String,
    pub timestamps: Timestamps,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EnrichOutcome {
    Applied(usize),
    /// The entries belong to another generation and were dropped.
    Stale,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BuildReport {
    pub generation: Generation,
    pub candidates: usize,
    /// Entries that could not be read, plus symlink loops.
    pub skipped: usize,
}

impl BuildReport {
    pub fn is_partial(&self) -> bool {
        self.skipped > 0
    }
}

#[derive(Debug, Clone)]
pub struct Index {
    generation: Generation,
    candidates: Vec<Candidate>,
    positions: HashMap<String, usize>,
}

impl Index {
    /// Builds a new generation from `candidates`. Duplicate paths collapse
    /// onto the first occurrence; an indexed-folder origin wins over a
    /// static one.
    pub fn from_candidates(candidates: impl IntoIterator<Item = Candidate>) -> Self {
        let mut unique: Vec<Candidate> = Vec::new();
        let mut positions = HashMap::new();
        for candidate in candidates {
            let existing_position = positions.get(&candidate.path).copied();
            match existing_position {
                Some(position) => {
                    let existing: &mut Candidate = &mut unique[position];
                    if candidate.source == Source::IndexedFolder {
                        existing.source = Source::IndexedFolder;
                    }
                }
                None => {
                    positions.insert(candidate.path.clone(), unique.len());
                    unique.push(candidate);
                }
            }
        }
        Self {
            generation: next_generation(),
            candidates: unique,
            positions,
        }
    }

    pub fn generation(&self) -> Generation {
        self.generation
    }

    pub fn len(&self) -> usize {
        self.candidates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.candidates.is_empty()
    }

    pub fn candidates(&self) -> &[Candidate] {
        &self.candidates
    }

    pub fn get(&self, position: usize) -> Option<&Candidate> {
        self.candidates.get(position)
    }

    pub fn position(&self, path: &str) -> Option<usize> {
        self.positions.get(path).copied()
    }

    pub fn find(&self, path: &str) -> Option<&Candidate> {
        self.position(path).and_then(|position| self.get(position))
    }

    /// Merges fetched timestamps into this generation. Known values are never
    /// cleared.
    pub fn enrich(&mut self, generation: Generation, entries: &[MetadataEntry]) -> EnrichOutcome {
        if generation != self.generation {
            return EnrichOutcome::Stale;
        }
        let mut applied = 0;
        for entry in entries {
            let Some(position) = self.position(&entry.path) else {
                continue;
            };
            let candidate = &mut self.candidates[position];
            if let Some(created) = entry.timestamps.created {
                candidate.created_at = Some(created);
            }
            if let Some(modified) = entry.timestamps.modified {
                candidate.modified_at = Some(modified);
            }
            applied += 1;
        }
        EnrichOutcome::Applied(applied)
    }

    /// Paths lacking either timestamp, in index order.
    pub fn missing_timestamps(&self) -> Vec<String> {
        self.candidates
            .iter()
            .filter(|candidate| candidate.created_at.is_none() || candidate.modified_at.is_none())
            .map(|candidate| candidate.path.clone())
            .collect()
    }

    /// Copy of this index under a new generation with `path` retagged.
    pub fn with_tags(&self, path: &str, tags: Vec<String>) -> Index {
        let mut candidates = self.candidates.clone();
        if let Some(position) = self.position(path) {
            candidates[position].tags = tags;
        }
        Index {
            generation: next_generation(),
            candidates,
            positions: self.positions.clone(),
        }
    }

    /// Every distinct tag in the index, sorted.
    pub fn all_tags(&self) -> Vec<String> {
        let mut set: Vec<String> = self
            .candidates
            .iter()
            .flat_map(|candidate| candidate.tags.iter().cloned())
            .collect::<HashSet<_>>()
            .into_iter()
            .collect();
        set.sort();
        set
    }
}

pub fn build(config: &Config) -> (Index, BuildReport) {
    let mut candidates: Vec<Candidate> = config
        .static_items
        .iter()
        .map(|path| {
            Candidate::new(
                path.to_string_lossy().to_string(),
                Source::StaticItem,
                tags::tags_for(path),
            )
        })
        .collect();

    let mut skipped = 0usize;
    for root in config.index_roots() {
        skipped += walk_root(&root, config, &mut candidates);
    }

    let index = Index::from_candidates(candidates);
    let report = BuildReport {
        generation: index.generation(),
        candidates: index.len(),
        skipped,
    };
    info!(
        generation = report.generation,
        candidates = report.candidates,
        skipped = report.skipped,
        "index built"
    );
    (index, report)
}

/// Collects `root` and its subdirectories down to `config.max_depth`.
/// Returns how many entries were skipped.
fn walk_root(root: &Path, config: &Config, out: &mut Vec<Candidate>) -> usize {
    let mut skipped = 0usize;
    let mut visited: HashSet<PathBuf> = HashSet::new();
    let mut walker = WalkDir::new(root)
        .max_depth(config.max_depth)
        .follow_links(config.follow_symlinks)
        .sort_by_file_name()
        .into_iter();

    while let Some(next) = walker.next() {
        let entry = match next {
            Ok(entry) => entry,
            Err(err) => {
                skipped += 1;
                debug!(error = %err, "skipping unreadable entry");
                continue;
            }
        };
        if !entry.file_type().is_dir() {
            continue;
        }
        if entry.depth() > 0 && is_excluded(&entry, &config.exclude) {
            walker.skip_current_dir();
            continue;
        }
        let canonical = match fs::canonicalize(entry.path()) {
            Ok(path) => path,
            Err(err) => {
                skipped += 1;
                debug!(path = %entry.path().display(), error = %err, "cannot resolve path");
                walker.skip_current_dir();
                continue;
            }
        };
        if !visited.insert(canonical) {
            debug!(path = %entry.path().display(), "already visited, skipping");
            walker.skip_current_dir();
            continue;
        }
        out.push(Candidate::new(
            entry.path().to_string_lossy().to_string(),
            Source::IndexedFolder,
            tags::tags_for(entry.path()),
        ));
    }
    skipped
}

fn is_excluded(entry: &DirEntry, exclude: &[String]) -> bool {
    entry
        .file_name()
        .to_str()
        .map(|name| exclude.iter().any(|pattern| pattern == name))
        .unwrap_or(false)
}

pub fn read_timestamps(path: &Path) -> Timestamps {
    let Ok(meta) = fs::metadata(path) else {
        return Timestamps::default();
    };
    Timestamps {
        created: meta.created().ok().and_then(epoch_seconds),
        modified: meta.modified().ok().and_then(epoch_seconds),
    }
}

/// Whole seconds relative to the Unix epoch; negative before 1970.
fn epoch_seconds(time: SystemTime) -> Option<i64> {
    match time.duration_since(UNIX_EPOCH) {
        Ok(after) => i64::try_from(after.as_secs()).ok(),
        Err(before) => i64::try_from(before.duration().as_secs())
            .ok()
            .map(|seconds| -seconds),
    }
}
