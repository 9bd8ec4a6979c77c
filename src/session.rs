//! State of one interactive picker session and its input handling.
//!
//! The session never blocks: index rebuilds, timestamp refreshes and
//! previews run on the [`Worker`] and are folded in by [`Session::drain_worker`]
//! at the start of every UI turn.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Instant;

use crossterm::event::{
    Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers, MouseButton, MouseEvent, MouseEventKind,
};
use ratatui::text::Text;
use tracing::{debug, info, warn};
use tui_input::backend::crossterm::EventHandler;
use tui_input::{Input, InputRequest};

use crate::config::{self, Config};
use crate::index::{BuildReport, Candidate, EnrichOutcome, Index};
use crate::panel::{Panel, PanelState, PointerKind};
use crate::preview::PreviewOptions;
use crate::query::Query;
use crate::rank::{self, MatchResult};
use crate::sort::{RefreshRequest, SortController, SortMode};
use crate::tags;
use crate::ui::layout::UiLayout;
use crate::ui::render::{self, PreviewData, Theme};
use crate::worker::{Worker, WorkerMessage};

/// Tags under this prefix are never offered as completions.
const HIDDEN_SUGGESTION_PREFIX: &str = "org/";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    Continue,
    Select(String),
    Cancel,
}

pub struct TagEditor {
    pub path: String,
    pub tags: Vec<String>,
    pub input: Input,
    suggestions: Vec<String>,
}

impl TagEditor {
    fn new(path: String, tags: Vec<String>, suggestions: Vec<String>) -> Self {
        Self {
            path,
            tags,
            input: Input::default(),
            suggestions,
        }
    }

    /// Moves the typed text into the tag list, completing it to the first
    /// known tag with the same (case-insensitive) prefix.
    pub fn commit_input(&mut self) {
        let raw = self.input.value().trim();
        if raw.is_empty() {
            return;
        }
        let lower = raw.to_lowercase();
        let chosen = self
            .suggestions
            .iter()
            .find(|tag| tag.to_lowercase().starts_with(&lower))
            .cloned()
            .unwrap_or_else(|| raw.to_string());
        if !self.tags.contains(&chosen) {
            self.tags.push(chosen);
        }
        self.input.reset();
    }

    pub fn has_input(&self) -> bool {
        !self.input.value().trim().is_empty()
    }
}

pub struct Session {
    config: Arc<Config>,
    index: Index,
    input: Input,
    query: Query,
    results: Vec<MatchResult>,
    selected: usize,
    sort: SortController,
    panels: PanelState,
    worker: Worker,
    previews: HashMap<String, PreviewData>,
    preview_options: PreviewOptions,
    preview_path: Option<String>,
    preview_in_flight: Option<String>,
    preview_text: Text<'static>,
    git_text: Option<Text<'static>>,
    tag_editor: Option<TagEditor>,
    status: Option<String>,
    started: Instant,
    theme: Theme,
}

impl Session {
    pub fn new(config: Arc<Config>, index: Index, report: BuildReport) -> Self {
        let theme = Theme::default();
        let preview_options = PreviewOptions {
            timeout: config.preview_timeout,
            home: config::home_dir().ok(),
        };
        let mut session = Self {
            preview_text: render::placeholder_text(None, &theme, "No selection"),
            config,
            index,
            input: Input::default(),
            query: Query::default(),
            results: Vec::new(),
            selected: 0,
            sort: SortController::new(),
            panels: PanelState::new(),
            worker: Worker::new(),
            previews: HashMap::new(),
            preview_options,
            preview_path: None,
            preview_in_flight: None,
            git_text: None,
            tag_editor: None,
            status: partial_build_status(&report),
            started: Instant::now(),
            theme,
        };
        session.rerank(false);
        if session.config.refresh_on_start {
            let request = session.sort.request_refresh(&session.index, None);
            session.schedule_refresh(request);
        }
        session
    }

    pub fn index(&self) -> &Index {
        &self.index
    }

    pub fn results(&self) -> &[MatchResult] {
        &self.results
    }

    pub fn selected(&self) -> usize {
        self.selected
    }

    pub fn input(&self) -> &Input {
        &self.input
    }

    pub fn query(&self) -> &Query {
        &self.query
    }

    pub fn sort_mode(&self) -> SortMode {
        self.sort.mode()
    }

    pub fn panels(&self) -> &PanelState {
        &self.panels
    }

    pub fn panels_mut(&mut self) -> &mut PanelState {
        &mut self.panels
    }

    pub fn preview_text(&self) -> &Text<'static> {
        &self.preview_text
    }

    pub fn git_text(&self) -> Option<&Text<'static>> {
        self.git_text.as_ref()
    }

    pub fn tag_editor(&self) -> Option<&TagEditor> {
        self.tag_editor.as_ref()
    }

    pub fn status(&self) -> Option<&str> {
        self.status.as_deref()
    }

    pub fn theme(&self) -> &Theme {
        &self.theme
    }

    pub fn elapsed_ms(&self) -> u64 {
        self.started.elapsed().as_millis() as u64
    }

    pub fn max_preview_lines(&self) -> usize {
        self.config.preview_max_lines
    }

    pub fn current(&self) -> Option<&Candidate> {
        self.results
            .get(self.selected)
            .and_then(|result| result.candidate(&self.index))
    }

    pub fn current_path(&self) -> Option<String> {
        self.current().map(|candidate| candidate.path.clone())
    }

    /// Folds in everything the worker produced since the last turn.
    pub fn drain_worker(&mut self) {
        let mut resort = false;
        for message in self.worker.drain() {
            match message {
                WorkerMessage::Metadata {
                    generation,
                    entries,
                    done,
                } => {
                    match self.index.enrich(generation, &entries) {
                        EnrichOutcome::Applied(count) => {
                            resort |= count > 0 && self.sort.mode().uses_time();
                        }
                        EnrichOutcome::Stale => {
                            debug!(generation, "dropping stale metadata");
                        }
                    }
                    if done {
                        self.sort.refresh_finished(generation);
                    }
                }
                WorkerMessage::Rebuilt { index, report } => {
                    self.worker.rebuild_finished();
                    info!(
                        generation = report.generation,
                        candidates = report.candidates,
                        "index replaced"
                    );
                    self.index = index;
                    // Cached previews predate the rebuild.
                    self.previews.clear();
                    self.preview_path = None;
                    self.preview_in_flight = None;
                    self.status = partial_build_status(&report)
                        .or_else(|| Some(format!("Rebuilt: {} entries", report.candidates)));
                    self.rerank(true);
                    let request = if self.config.refresh_on_start {
                        self.sort.request_refresh(&self.index, None)
                    } else {
                        self.sort.on_new_generation(&self.index)
                    };
                    self.schedule_refresh(request);
                }
                WorkerMessage::Preview(result) => {
                    let data = render::preview_data(&result, &self.theme, self.config.preview_max_lines);
                    if self.preview_in_flight.as_deref() == Some(result.path.as_str()) {
                        self.preview_in_flight = None;
                    }
                    if self.current().map(|candidate| candidate.path.as_str())
                        == Some(result.path.as_str())
                    {
                        self.preview_text = data.preview.clone();
                        self.git_text = data.git.clone();
                        self.preview_path = Some(result.path.clone());
                    }
                    self.previews.insert(result.path, data);
                }
            }
        }
        if resort {
            self.rerank(true);
        }
    }

    /// Points the side panels at the highlighted candidate, starting a
    /// preview job when nothing is cached for it.
    pub fn sync_preview(&mut self) {
        match self.current_path() {
            None => {
                if self.preview_path.is_some() || self.preview_in_flight.is_some() {
                    self.preview_text = render::placeholder_text(None, &self.theme, "No selection");
                    self.git_text = None;
                    self.preview_path = None;
                    self.preview_in_flight = None;
                    self.panels.reset_content_offsets();
                }
            }
            Some(path) => {
                if self.preview_path.as_deref() != Some(path.as_str()) {
                    self.panels.reset_content_offsets();
                    if let Some(data) = self.previews.get(&path) {
                        self.preview_text = data.preview.clone();
                        self.git_text = data.git.clone();
                    } else {
                        self.preview_text =
                            render::placeholder_text(Some(&path), &self.theme, "Loading preview...");
                        self.git_text = Some(render::placeholder_text(
                            Some(&path),
                            &self.theme,
                            "Loading git info...",
                        ));
                        if self.preview_in_flight.as_deref() != Some(path.as_str()) {
                            self.preview_in_flight = Some(path.clone());
                            self.worker
                                .spawn_preview(path.clone(), self.preview_options.clone());
                        }
                    }
                    self.preview_path = Some(path);
                }
            }
        }
        self.panels.set_git_visible(self.git_text.is_some());
    }

    pub fn handle_event(&mut self, event: Event, layout: &UiLayout) -> Outcome {
        match event {
            Event::Key(key) => self.handle_key(key),
            Event::Mouse(mouse) => {
                self.handle_mouse(mouse, layout);
                Outcome::Continue
            }
            _ => Outcome::Continue,
        }
    }

    pub fn handle_key(&mut self, key: KeyEvent) -> Outcome {
        if key.kind != KeyEventKind::Press {
            return Outcome::Continue;
        }
        let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);

        if ctrl && key.code == KeyCode::Char('c') {
            return Outcome::Cancel;
        }
        if key.code == KeyCode::Esc {
            if self.tag_editor.take().is_some() {
                return Outcome::Continue;
            }
            return Outcome::Cancel;
        }
        if self.tag_editor.is_some() {
            self.handle_tag_key(key);
            return Outcome::Continue;
        }

        if ctrl {
            match key.code {
                KeyCode::Char('t') => {
                    self.open_tag_editor();
                    return Outcome::Continue;
                }
                KeyCode::Char('s') => {
                    self.advance_sort();
                    return Outcome::Continue;
                }
                KeyCode::Char('r') => {
                    self.rebuild();
                    return Outcome::Continue;
                }
                KeyCode::Char('u') => {
                    let _ = self.input.handle(InputRequest::DeleteLine);
                    self.query_changed();
                    return Outcome::Continue;
                }
                _ => {}
            }
        }

        match key.code {
            KeyCode::Enter => {
                if let Some(path) = self.current_path() {
                    return Outcome::Select(path);
                }
                return Outcome::Continue;
            }
            KeyCode::Tab => {
                self.panels.next();
                return Outcome::Continue;
            }
            KeyCode::BackTab => {
                self.panels.previous();
                return Outcome::Continue;
            }
            _ => {}
        }

        match self.panels.focus() {
            Panel::Search => self.handle_search_key(key),
            Panel::Preview | Panel::Git => self.handle_side_key(key),
        }
        Outcome::Continue
    }

    fn handle_search_key(&mut self, key: KeyEvent) {
        let plain = !key
            .modifiers
            .intersects(KeyModifiers::CONTROL | KeyModifiers::ALT | KeyModifiers::SUPER);
        match key.code {
            KeyCode::Up => self.move_selection(-1),
            KeyCode::Down => self.move_selection(1),
            KeyCode::PageUp => self.move_selection(-self.page_step()),
            KeyCode::PageDown => self.move_selection(self.page_step()),
            KeyCode::Right if plain && input_at_end(&self.input) => {
                self.panels.focus_panel(Panel::Preview);
            }
            _ => {
                let before = self.input.value().to_string();
                if key.modifiers.contains(KeyModifiers::SUPER) && key.code == KeyCode::Left {
                    let _ = self.input.handle(InputRequest::GoToStart);
                } else if key.modifiers.contains(KeyModifiers::SUPER) && key.code == KeyCode::Right
                {
                    let _ = self.input.handle(InputRequest::GoToEnd);
                } else {
                    let _ = self.input.handle_event(&Event::Key(key));
                }
                if self.input.value() != before {
                    self.query_changed();
                }
            }
        }
    }

    fn handle_side_key(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Left => self.panels.left(),
            KeyCode::Right => self.panels.right(),
            KeyCode::Up => self.panels.line_up(),
            KeyCode::Down => self.panels.line_down(),
            KeyCode::PageUp => self.panels.page(false),
            KeyCode::PageDown => self.panels.page(true),
            KeyCode::Home => self.panels.scroll_to_start(),
            KeyCode::End => self.panels.scroll_to_end(),
            _ => {}
        }
    }

    fn handle_tag_key(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Enter => self.finish_tag_edit(),
            KeyCode::Tab => {
                if let Some(editor) = self.tag_editor.as_mut() {
                    editor.commit_input();
                }
            }
            KeyCode::Backspace => {
                if let Some(editor) = self.tag_editor.as_mut() {
                    if editor.input.value().is_empty() {
                        editor.tags.pop();
                    } else {
                        let _ = editor.input.handle_event(&Event::Key(key));
                    }
                }
            }
            _ => {
                if let Some(editor) = self.tag_editor.as_mut() {
                    let _ = editor.input.handle_event(&Event::Key(key));
                }
            }
        }
    }

    pub fn handle_mouse(&mut self, mouse: MouseEvent, layout: &UiLayout) {
        if self.tag_editor.is_some() {
            return;
        }
        let kind = match mouse.kind {
            MouseEventKind::Down(MouseButton::Left) => PointerKind::Click,
            MouseEventKind::ScrollUp => PointerKind::WheelUp,
            MouseEventKind::ScrollDown => PointerKind::WheelDown,
            _ => return,
        };
        let Some(panel) = layout.panel_at(mouse.column, mouse.row) else {
            return;
        };
        match (panel, kind) {
            (Panel::Search, PointerKind::WheelUp) => {
                self.panels.focus_panel(Panel::Search);
                self.move_selection(-1);
            }
            (Panel::Search, PointerKind::WheelDown) => {
                self.panels.focus_panel(Panel::Search);
                self.move_selection(1);
            }
            _ => {
                self.panels.pointer(panel, kind);
            }
        }
    }

    fn page_step(&self) -> isize {
        self.panels.viewport(Panel::Search).max(1) as isize
    }

    fn move_selection(&mut self, delta: isize) {
        if self.results.is_empty() {
            self.selected = 0;
            return;
        }
        let last = self.results.len() - 1;
        self.selected = if delta < 0 {
            self.selected.saturating_sub(delta.unsigned_abs())
        } else {
            self.selected.saturating_add(delta as usize).min(last)
        };
    }

    fn query_changed(&mut self) {
        self.query = Query::parse(self.input.value());
        self.rerank(false);
    }

    fn advance_sort(&mut self) {
        let request = self.sort.advance(&self.index);
        self.schedule_refresh(request);
        self.rerank(false);
    }

    fn rebuild(&mut self) {
        if self.worker.spawn_rebuild(Arc::clone(&self.config)) {
            self.status = Some("Rebuilding index...".to_string());
        }
    }

    fn schedule_refresh(&self, request: Option<RefreshRequest>) {
        if let Some(request) = request {
            self.worker.spawn_refresh(request);
        }
    }

    /// Recomputes the result list. With `keep_selection` the highlighted path
    /// stays highlighted when it is still listed.
    fn rerank(&mut self, keep_selection: bool) {
        let previous = if keep_selection {
            self.current_path()
        } else {
            None
        };
        self.results = rank::rank(&self.index, &self.query, self.sort.mode());
        let kept = previous.and_then(|path| {
            let position = self.index.position(&path)?;
            self.results
                .iter()
                .position(|result| result.position == position)
        });
        self.selected = match kept {
            Some(selected) => selected,
            None if keep_selection => self.selected.min(self.results.len().saturating_sub(1)),
            None => 0,
        };
    }

    fn open_tag_editor(&mut self) {
        let Some(path) = self.current_path() else {
            return;
        };
        let current_tags = tags::tags_for(Path::new(&path));
        let suggestions = self
            .index
            .all_tags()
            .into_iter()
            .filter(|tag| !tag.starts_with(HIDDEN_SUGGESTION_PREFIX))
            .collect();
        self.tag_editor = Some(TagEditor::new(path, current_tags, suggestions));
        self.panels.focus_panel(Panel::Preview);
        self.panels.scroll_to_start();
    }

    fn finish_tag_edit(&mut self) {
        let Some(mut editor) = self.tag_editor.take() else {
            return;
        };
        editor.commit_input();
        let dir = PathBuf::from(&editor.path);
        match tags::save_tags(&dir, &editor.tags) {
            Ok(()) => {
                let saved = tags::clean_tags(editor.tags);
                self.index = self.index.with_tags(&editor.path, saved);
                self.rerank(true);
                let request = self.sort.on_new_generation(&self.index);
                self.schedule_refresh(request);
                self.status = None;
            }
            Err(err) => {
                warn!(path = %editor.path, error = %err, "could not save tags");
                self.status = Some(format!("Could not save tags: {err}"));
            }
        }
        self.panels.focus_panel(Panel::Preview);
    }
}

fn partial_build_status(report: &BuildReport) -> Option<String> {
    report
        .is_partial()
        .then(|| format!("Skipped {} unreadable entries", report.skipped))
}

pub fn input_at_end(input: &Input) -> bool {
    input.cursor() >= input.value().chars().count()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::git::GitStatus;
    use crate::index::{MetadataEntry, Source, Timestamps};
    use crate::preview::{PreviewResult, TreeOutput};
    use pretty_assertions::assert_eq;
    use std::fs;
    use tempfile::TempDir;

    fn quiet_config() -> Arc<Config> {
        Arc::new(Config {
            refresh_on_start: false,
            ..Config::default()
        })
    }

    fn session_for(candidates: Vec<Candidate>) -> Session {
        let index = Index::from_candidates(candidates);
        let report = BuildReport {
            generation: index.generation(),
            candidates: index.len(),
            skipped: 0,
        };
        Session::new(quiet_config(), index, report)
    }

    fn candidate(path: &str, tags: &[&str]) -> Candidate {
        Candidate::new(
            path,
            Source::IndexedFolder,
            tags.iter().map(|tag| tag.to_string()).collect(),
        )
    }

    fn press(session: &mut Session, code: KeyCode) -> Outcome {
        session.handle_key(KeyEvent::new(code, KeyModifiers::NONE))
    }

    fn ctrl(session: &mut Session, ch: char) -> Outcome {
        session.handle_key(KeyEvent::new(KeyCode::Char(ch), KeyModifiers::CONTROL))
    }

    fn type_text(session: &mut Session, text: &str) {
        for ch in text.chars() {
            press(session, KeyCode::Char(ch));
        }
    }

    fn listed(session: &Session) -> Vec<String> {
        session
            .results()
            .iter()
            .filter_map(|result| result.candidate(session.index()))
            .map(|candidate| candidate.path.clone())
            .collect()
    }

    #[test]
    fn typing_filters_and_enter_selects() {
        let mut session = session_for(vec![
            candidate("/a/create-mods", &["mods"]),
            candidate("/a/other", &["minecraft"]),
        ]);
        assert_eq!(listed(&session).len(), 2);

        type_text(&mut session, "#mine");
        assert_eq!(listed(&session), vec!["/a/other".to_string()]);
        assert_eq!(session.panels().focus(), Panel::Search);

        assert_eq!(
            press(&mut session, KeyCode::Enter),
            Outcome::Select("/a/other".to_string())
        );
    }

    #[test]
    fn ctrl_u_clears_the_query() {
        let mut session = session_for(vec![candidate("/x", &[]), candidate("/y", &[])]);
        type_text(&mut session, "x");
        assert_eq!(listed(&session).len(), 1);
        ctrl(&mut session, 'u');
        assert_eq!(session.input().value(), "");
        assert_eq!(listed(&session).len(), 2);
    }

    #[test]
    fn escape_and_ctrl_c_cancel() {
        let mut session = session_for(vec![candidate("/x", &[])]);
        assert_eq!(press(&mut session, KeyCode::Esc), Outcome::Cancel);
        assert_eq!(ctrl(&mut session, 'c'), Outcome::Cancel);
    }

    #[test]
    fn enter_without_results_keeps_running() {
        let mut session = session_for(vec![candidate("/x", &[])]);
        type_text(&mut session, "zzz");
        assert!(session.results().is_empty());
        assert_eq!(press(&mut session, KeyCode::Enter), Outcome::Continue);
    }

    #[test]
    fn arrows_move_the_selection_within_bounds() {
        let mut session = session_for(vec![candidate("/a", &[]), candidate("/b", &[])]);
        press(&mut session, KeyCode::Up);
        assert_eq!(session.selected(), 0);
        press(&mut session, KeyCode::Down);
        press(&mut session, KeyCode::Down);
        assert_eq!(session.current_path().as_deref(), Some("/b"));
    }

    #[test]
    fn tab_cycles_focus_without_touching_the_query() {
        let mut session = session_for(vec![candidate("/a", &[])]);
        type_text(&mut session, "a");
        press(&mut session, KeyCode::Tab);
        assert_eq!(session.panels().focus(), Panel::Preview);
        press(&mut session, KeyCode::Tab);
        assert_eq!(session.panels().focus(), Panel::Search);
        assert_eq!(session.input().value(), "a");
    }

    #[test]
    fn ctrl_s_cycles_sort_modes() {
        let mut session = session_for(vec![candidate("/b/zeta", &[]), candidate("/a/alpha", &[])]);
        ctrl(&mut session, 's');
        assert_eq!(session.sort_mode(), SortMode::AlphaAsc);
        assert_eq!(
            listed(&session),
            vec!["/a/alpha".to_string(), "/b/zeta".to_string()]
        );
        for _ in 0..6 {
            ctrl(&mut session, 's');
        }
        assert_eq!(session.sort_mode(), SortMode::Match);
    }

    #[test]
    fn tag_editor_saves_and_retags() {
        let dir = TempDir::new().unwrap();
        let project = dir.path().join("project");
        fs::create_dir(&project).unwrap();
        let path = project.to_string_lossy().to_string();
        let mut session = session_for(vec![
            candidate(&path, &[]),
            candidate("/elsewhere", &["rust"]),
        ]);
        type_text(&mut session, "project");
        let generation = session.index().generation();

        ctrl(&mut session, 't');
        assert!(session.tag_editor().is_some());
        type_text(&mut session, "ru");
        press(&mut session, KeyCode::Tab);
        type_text(&mut session, "cli");
        press(&mut session, KeyCode::Enter);

        assert!(session.tag_editor().is_none());
        assert_eq!(
            tags::tags_for(&project),
            vec!["rust".to_string(), "cli".to_string()]
        );
        assert!(session.index().generation() > generation);
        assert_eq!(
            session.index().find(&path).unwrap().tags,
            vec!["rust".to_string(), "cli".to_string()]
        );
        assert_eq!(session.current_path(), Some(path));
    }

    #[test]
    fn escape_closes_the_tag_editor_without_saving() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().to_string_lossy().to_string();
        let mut session = session_for(vec![candidate(&path, &[])]);
        ctrl(&mut session, 't');
        type_text(&mut session, "draft");
        assert_eq!(press(&mut session, KeyCode::Esc), Outcome::Continue);
        assert!(session.tag_editor().is_none());
        assert!(tags::tags_for(dir.path()).is_empty());
    }

    #[test]
    fn backspace_on_empty_input_drops_the_last_tag() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join(".navgator.toml"), "tags = [\"a\", \"b\"]\n").unwrap();
        let path = dir.path().to_string_lossy().to_string();
        let mut session = session_for(vec![candidate(&path, &["a", "b"])]);
        ctrl(&mut session, 't');
        press(&mut session, KeyCode::Backspace);
        assert_eq!(session.tag_editor().unwrap().tags, vec!["a".to_string()]);
    }

    #[test]
    fn stale_metadata_is_dropped() {
        let mut session = session_for(vec![candidate("/a", &[])]);
        let old_generation = session.index().generation();
        session.index = session.index.with_tags("/a", vec!["x".to_string()]);
        session.worker.spawn_refresh(RefreshRequest {
            generation: old_generation,
            paths: vec!["/a".to_string()],
        });
        let message = session
            .worker
            .recv_timeout(std::time::Duration::from_secs(10))
            .unwrap();
        let WorkerMessage::Metadata {
            generation,
            entries,
            ..
        } = message
        else {
            panic!("expected metadata");
        };
        assert_eq!(session.index.enrich(generation, &entries), EnrichOutcome::Stale);
    }

    fn stamped(path: &str, modified: i64) -> MetadataEntry {
        MetadataEntry {
            path: path.to_string(),
            timestamps: Timestamps {
                created: Some(modified),
                modified: Some(modified),
            },
        }
    }

    #[test]
    fn arriving_timestamps_resort_time_modes() {
        let mut session = session_for(vec![candidate("/a/older", &[]), candidate("/b/newer", &[])]);
        for _ in 0..6 {
            ctrl(&mut session, 's');
        }
        assert_eq!(session.sort_mode(), SortMode::ModifiedDesc);
        assert_eq!(
            listed(&session),
            vec!["/a/older".to_string(), "/b/newer".to_string()]
        );

        let sender = session.worker.sender();
        sender
            .send(WorkerMessage::Metadata {
                generation: session.index().generation(),
                entries: vec![stamped("/a/older", 100), stamped("/b/newer", 200)],
                done: true,
            })
            .unwrap();
        session.drain_worker();

        assert_eq!(
            listed(&session),
            vec!["/b/newer".to_string(), "/a/older".to_string()]
        );
        assert_eq!(session.index().find("/b/newer").unwrap().modified_at, Some(200));
    }

    #[test]
    fn rebuilt_index_keeps_the_highlight_and_drops_cached_previews() {
        let mut session = session_for(vec![candidate("/a", &[]), candidate("/b", &[])]);
        press(&mut session, KeyCode::Down);
        assert_eq!(session.current_path().as_deref(), Some("/b"));

        let sender = session.worker.sender();
        sender
            .send(WorkerMessage::Preview(PreviewResult {
                path: "/b".to_string(),
                tree: TreeOutput::Rendered("old tree".to_string()),
                git: GitStatus::NotARepo,
            }))
            .unwrap();
        session.drain_worker();
        assert!(session.previews.contains_key("/b"));

        let rebuilt = Index::from_candidates(vec![
            candidate("/0", &[]),
            candidate("/a", &[]),
            candidate("/b", &[]),
        ]);
        let report = BuildReport {
            generation: rebuilt.generation(),
            candidates: rebuilt.len(),
            skipped: 0,
        };
        let old_generation = session.index().generation();
        sender
            .send(WorkerMessage::Rebuilt {
                index: rebuilt,
                report,
            })
            .unwrap();
        session.drain_worker();

        assert_ne!(session.index().generation(), old_generation);
        assert_eq!(session.index().len(), 3);
        assert_eq!(session.current_path().as_deref(), Some("/b"));
        assert!(session.previews.is_empty());
        assert_eq!(session.preview_path, None);
    }

    #[test]
    fn stale_metadata_changes_nothing_when_drained() {
        let mut session = session_for(vec![candidate("/a", &[]), candidate("/b", &[])]);
        let old_generation = session.index().generation();
        session.index = session.index.with_tags("/a", vec!["x".to_string()]);
        let before = listed(&session);

        session
            .worker
            .sender()
            .send(WorkerMessage::Metadata {
                generation: old_generation,
                entries: vec![stamped("/a", 100)],
                done: true,
            })
            .unwrap();
        session.drain_worker();

        assert_eq!(session.index().find("/a").unwrap().modified_at, None);
        assert_eq!(listed(&session), before);
    }
}
