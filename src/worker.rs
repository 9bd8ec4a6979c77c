//! Background work for the picker: timestamp refreshes, index rebuilds and
//! preview collection. Every job runs on its own thread and reports back
//! through one channel that the UI drains at the start of each turn.

use std::path::Path;
use std::sync::mpsc::{self, Receiver, RecvTimeoutError, Sender};
use std::sync::Arc;
use std::thread;
use std::time::Duration;

use tracing::debug;

use crate::config::Config;
use crate::index::{self, BuildReport, Generation, Index, MetadataEntry};
use crate::preview::{self, PreviewOptions, PreviewResult};
use crate::sort::RefreshRequest;

const METADATA_BATCH: usize = 64;

pub enum WorkerMessage {
    /// Timestamps for part of a refresh pass. `done` marks the last batch.
    Metadata {
        generation: Generation,
        entries: Vec<MetadataEntry>,
        done: bool,
    },
    Rebuilt {
        index: Index,
        report: BuildReport,
    },
    Preview(PreviewResult),
}

pub struct Worker {
    tx: Sender<WorkerMessage>,
    rx: Receiver<WorkerMessage>,
    rebuilding: bool,
}

impl Default for Worker {
    fn default() -> Self {
        Self::new()
    }
}

impl Worker {
    pub fn new() -> Self {
        let (tx, rx) = mpsc::channel();
        Self {
            tx,
            rx,
            rebuilding: false,
        }
    }

    /// Everything that arrived since the last call, without blocking.
    pub fn drain(&self) -> Vec<WorkerMessage> {
        let mut messages = Vec::new();
        while let Ok(message) = self.rx.try_recv() {
            messages.push(message);
        }
        messages
    }

    #[cfg(test)]
    pub(crate) fn sender(&self) -> Sender<WorkerMessage> {
        self.tx.clone()
    }

    pub fn recv_timeout(&self, timeout: Duration) -> Option<WorkerMessage> {
        match self.rx.recv_timeout(timeout) {
            Ok(message) => Some(message),
            Err(RecvTimeoutError::Timeout) | Err(RecvTimeoutError::Disconnected) => None,
        }
    }

    pub fn spawn_refresh(&self, request: RefreshRequest) {
        let tx = self.tx.clone();
        debug!(
            generation = request.generation,
            paths = request.paths.len(),
            "starting metadata refresh"
        );
        thread::spawn(move || {
            let RefreshRequest { generation, paths } = request;
            if paths.is_empty() {
                let _ = tx.send(WorkerMessage::Metadata {
                    generation,
                    entries: Vec::new(),
                    done: true,
                });
                return;
            }
            let batches = paths.chunks(METADATA_BATCH).count();
            for (number, batch) in paths.chunks(METADATA_BATCH).enumerate() {
                let entries = batch
                    .iter()
                    .map(|path| MetadataEntry {
                        path: path.clone(),
                        timestamps: index::read_timestamps(Path::new(path)),
                    })
                    .collect();
                let message = WorkerMessage::Metadata {
                    generation,
                    entries,
                    done: number + 1 == batches,
                };
                if tx.send(message).is_err() {
                    return;
                }
            }
        });
    }

    /// Starts a rebuild unless one is already running. Returns whether a new
    /// rebuild was started.
    pub fn spawn_rebuild(&mut self, config: Arc<Config>) -> bool {
        if self.rebuilding {
            return false;
        }
        self.rebuilding = true;
        let tx = self.tx.clone();
        thread::spawn(move || {
            let (index, report) = index::build(&config);
            let _ = tx.send(WorkerMessage::Rebuilt { index, report });
        });
        true
    }

    pub fn rebuild_finished(&mut self) {
        self.rebuilding = false;
    }

    pub fn is_rebuilding(&self) -> bool {
        self.rebuilding
    }

    pub fn spawn_preview(&self, path: String, options: PreviewOptions) {
        let tx = self.tx.clone();
        thread::spawn(move || {
            let result = preview::collect(&path, &options);
            let _ = tx.send(WorkerMessage::Preview(result));
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::index::{Candidate, Source};
    use std::path::PathBuf;
    use tempfile::TempDir;

    const WAIT: Duration = Duration::from_secs(10);

    #[test]
    fn refresh_reports_every_path_then_finishes() {
        let dir = TempDir::new().unwrap();
        let paths: Vec<String> = (0..70)
            .map(|n| {
                let path = dir.path().join(format!("d{n}"));
                std::fs::create_dir(&path).unwrap();
                path.to_string_lossy().to_string()
            })
            .collect();

        let worker = Worker::new();
        worker.spawn_refresh(RefreshRequest {
            generation: 42,
            paths: paths.clone(),
        });

        let mut seen = Vec::new();
        loop {
            match worker.recv_timeout(WAIT) {
                Some(WorkerMessage::Metadata {
                    generation,
                    entries,
                    done,
                }) => {
                    assert_eq!(generation, 42);
                    assert!(entries.len() <= METADATA_BATCH);
                    seen.extend(entries.into_iter().map(|entry| entry.path));
                    if done {
                        break;
                    }
                }
                Some(_) => panic!("unexpected message"),
                None => panic!("refresh never finished"),
            }
        }
        assert_eq!(seen, paths);
    }

    #[test]
    fn empty_refresh_still_finishes() {
        let worker = Worker::new();
        worker.spawn_refresh(RefreshRequest {
            generation: 7,
            paths: Vec::new(),
        });
        assert!(matches!(
            worker.recv_timeout(WAIT),
            Some(WorkerMessage::Metadata { done: true, .. })
        ));
    }

    #[test]
    fn rebuilds_are_coalesced() {
        let dir = TempDir::new().unwrap();
        let config = Arc::new(Config {
            static_items: vec![PathBuf::from(dir.path())],
            ..Config::default()
        });
        let mut worker = Worker::new();
        assert!(worker.spawn_rebuild(config.clone()));
        assert!(!worker.spawn_rebuild(config.clone()));

        match worker.recv_timeout(WAIT) {
            Some(WorkerMessage::Rebuilt { index, report }) => {
                assert_eq!(report.generation, index.generation());
                assert_eq!(index.len(), 1);
            }
            _ => panic!("expected a rebuilt index"),
        }
        worker.rebuild_finished();
        assert!(worker.spawn_rebuild(config));
    }

    #[test]
    fn rebuilt_generations_are_new() {
        let old = Index::from_candidates(vec![Candidate::new("/a", Source::StaticItem, vec![])]);
        let mut worker = Worker::new();
        worker.spawn_rebuild(Arc::new(Config::default()));
        match worker.recv_timeout(WAIT) {
            Some(WorkerMessage::Rebuilt { index, .. }) => {
                assert_ne!(index.generation(), old.generation());
            }
            _ => panic!("expected a rebuilt index"),
        }
    }
}
