use std::collections::HashSet;

use ansi_to_tui::IntoText;
use chrono::{DateTime, Local};
use ratatui::layout::{Alignment, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span, Text};
use ratatui::widgets::{Block, BorderType, Borders, List, ListItem, ListState, Paragraph, Wrap};
use ratatui::Frame;
use tui_input::Input;

use crate::color;
use crate::git::{GitStatus, GitSummary};
use crate::index::Candidate;
use crate::panel::Panel;
use crate::preview::{PreviewResult, TreeOutput};
use crate::query::{fuzzy_match, Query};
use crate::session::{input_at_end, Session};
use crate::sort::SortMode;
use crate::ui::layout::UiLayout;

pub const DATE_WIDTH: usize = 16;
pub const DATE_PLACEHOLDER: &str = "---- -- -- --:--";
const DATE_FORMAT: &str = "%Y-%m-%d %H:%M";
const MORE_TAGS: &str = "[...]";
const TAG_SCROLL_STEP_MS: u64 = 200;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Theme {
    pub accent: Color,
    pub warm: Color,
    pub key: Color,
    pub text: Color,
    pub muted: Color,
}

impl Default for Theme {
    fn default() -> Self {
        let text = Color::Black;
        Self {
            accent: Color::Rgb(72, 166, 255),
            warm: Color::Rgb(255, 181, 92),
            key: Color::Rgb(150, 150, 150),
            text,
            muted: text,
        }
    }
}

/// Rendered side panel contents for one path. `git` is `None` outside a
/// repository.
#[derive(Debug, Clone)]
pub struct PreviewData {
    pub preview: Text<'static>,
    pub git: Option<Text<'static>>,
}

pub fn draw(frame: &mut Frame, session: &mut Session, layout: &UiLayout) {
    let theme = *session.theme();
    let focus = session.panels().focus();
    let editing = session.tag_editor().is_some();

    draw_results(frame, session, layout, &theme, focus == Panel::Search && !editing);
    draw_side_panels(frame, session, layout, &theme);

    let show_git = layout.git_area.is_some();
    let help_line = build_help_line(session, focus, show_git, &theme);
    let title = match session.status() {
        Some(status) => format!("Keys | {}", status),
        None => "Keys".to_string(),
    };
    let help = Paragraph::new(Text::from(help_line))
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title(title)
                .border_style(Style::default().fg(theme.muted))
                .border_type(BorderType::Rounded),
        )
        .alignment(Alignment::Left)
        .wrap(Wrap { trim: true });
    frame.render_widget(help, layout.help_area);
}

fn draw_results(
    frame: &mut Frame,
    session: &mut Session,
    layout: &UiLayout,
    theme: &Theme,
    search_focused: bool,
) {
    let list_title = format!(
        "Results {}/{}",
        session.results().len(),
        session.index().len()
    );
    let left_title = if search_focused {
        format!("* {}", list_title)
    } else {
        list_title
    };
    let border_color = if search_focused { theme.accent } else { theme.muted };
    let left_block = Block::default()
        .borders(Borders::ALL)
        .title(left_title)
        .border_style(Style::default().fg(border_color))
        .border_type(BorderType::Rounded);
    frame.render_widget(left_block, layout.list_area);

    let search_area = layout.search_area;
    let input = session.input();
    let search_width = search_area.width.saturating_sub(1) as usize;
    let scroll = if search_width > 0 {
        input.visual_scroll(search_width)
    } else {
        0
    };
    let search = Paragraph::new(input.value().to_string())
        .scroll((0, scroll as u16))
        .alignment(Alignment::Left);
    frame.render_widget(search, search_area);
    if search_focused && search_area.width > 0 && search_area.height > 0 {
        let cursor_x = input.visual_cursor().max(scroll).saturating_sub(scroll);
        frame.set_cursor_position((search_area.x + cursor_x as u16, search_area.y));
    }

    let results_area = layout.results_area;
    let height = results_area.height as usize;
    let total = session.results().len();
    let selected = session.selected();
    session.panels_mut().follow_selection(selected, total, height);
    let offset = session.panels().offset(Panel::Search);

    let scrollbar_space = if total > 0 { 1 } else { 0 };
    let width = results_area.width.saturating_sub(scrollbar_space) as usize;
    let (items, list_selected) = build_visible_list_items(session, offset, height, width, theme);
    let list = List::new(items).highlight_style(
        Style::default()
            .fg(Color::Black)
            .bg(theme.warm)
            .add_modifier(Modifier::BOLD),
    );
    let mut state = ListState::default();
    state.select(list_selected);
    frame.render_stateful_widget(list, results_area, &mut state);
}

fn build_visible_list_items(
    session: &Session,
    offset: usize,
    height: usize,
    inner_width: usize,
    theme: &Theme,
) -> (Vec<ListItem<'static>>, Option<usize>) {
    let results = session.results();
    if results.is_empty() || height == 0 {
        let item = ListItem::new(Line::from(Span::styled(
            "No matches",
            Style::default().fg(theme.muted),
        )));
        return (vec![item], None);
    }

    let end = (offset + height).min(results.len());
    let mut list_items = Vec::with_capacity(end.saturating_sub(offset));
    for result in &results[offset..end] {
        let Some(candidate) = result.candidate(session.index()) else {
            continue;
        };
        let row = ListRow {
            candidate,
            name_positions: result.name_positions(),
            query: session.query(),
            elapsed_ms: session.elapsed_ms(),
        };
        list_items.push(ListItem::new(row.render(inner_width, theme)));
    }

    (list_items, session.selected().checked_sub(offset))
}

struct ListRow<'a> {
    candidate: &'a Candidate,
    name_positions: Vec<usize>,
    query: &'a Query,
    elapsed_ms: u64,
}

impl ListRow<'_> {
    /// `name  [tag] [tag]  YYYY-MM-DD HH:MM`, padded to `inner_width`.
    fn render(&self, inner_width: usize, theme: &Theme) -> Line<'static> {
        let name = self.candidate.name();
        let date_display = format_date_display(self.candidate.modified_at);
        let date_len = date_display.chars().count();

        let max_entry = inner_width.saturating_sub(date_len + 1);
        let entry_display = truncate_with_ellipsis(name, max_entry);
        let entry_len = entry_display.chars().count();
        let highlight_limit = if entry_len < name.chars().count() {
            entry_len.saturating_sub(3)
        } else {
            entry_len
        };

        let remaining = inner_width.saturating_sub(entry_len + date_len);
        let tag_space = remaining.saturating_sub(2);
        let (tag_spans, tag_len) = if tag_space > 0 {
            build_tag_spans(
                &self.candidate.tags,
                self.query,
                tag_space,
                self.elapsed_ms,
                theme.text,
            )
        } else {
            (Vec::new(), 0)
        };
        let tag_block_len = if tag_len > 0 { tag_len + 1 } else { 0 };
        let padding = inner_width.saturating_sub(entry_len + date_len + tag_block_len + 1);

        let mut spans = highlight_name(
            &entry_display,
            &self.name_positions,
            highlight_limit,
            Style::default().fg(theme.text),
            Style::default()
                .fg(theme.accent)
                .add_modifier(Modifier::BOLD | Modifier::UNDERLINED),
        );
        spans.push(Span::raw(" ".repeat(padding)));
        if tag_len > 0 {
            spans.push(Span::raw(" "));
            spans.extend(tag_spans);
        }
        spans.push(Span::raw(" "));
        spans.push(Span::styled(date_display, Style::default().fg(theme.muted)));
        Line::from(spans)
    }
}

/// Splits `text` into runs of matched and unmatched characters. Positions at
/// or beyond `limit` are not highlighted.
fn highlight_name(
    text: &str,
    positions: &[usize],
    limit: usize,
    normal: Style,
    matched: Style,
) -> Vec<Span<'static>> {
    let marked: HashSet<usize> = positions.iter().copied().filter(|pos| *pos < limit).collect();
    let mut spans = Vec::new();
    let mut run = String::new();
    let mut run_matched = false;
    for (idx, ch) in text.chars().enumerate() {
        let is_match = marked.contains(&idx);
        if is_match != run_matched && !run.is_empty() {
            let style = if run_matched { matched } else { normal };
            spans.push(Span::styled(std::mem::take(&mut run), style));
        }
        run_matched = is_match;
        run.push(ch);
    }
    if !run.is_empty() {
        let style = if run_matched { matched } else { normal };
        spans.push(Span::styled(run, style));
    }
    spans
}

pub fn format_date(epoch: Option<i64>) -> String {
    epoch
        .and_then(|seconds| DateTime::from_timestamp(seconds, 0))
        .map(|utc| utc.with_timezone(&Local).format(DATE_FORMAT).to_string())
        .unwrap_or_else(|| DATE_PLACEHOLDER.to_string())
}

/// The date column: always exactly `DATE_WIDTH` characters, right aligned.
fn format_date_display(epoch: Option<i64>) -> String {
    let date: String = format_date(epoch).chars().take(DATE_WIDTH).collect();
    format!("{:>width$}", date, width = DATE_WIDTH)
}

/// `value` cut to `max` characters, ending in `...` when shortened.
pub fn truncate_with_ellipsis(value: &str, max: usize) -> String {
    match value.chars().nth(max) {
        None => value.to_string(),
        Some(_) if max <= 3 => value.chars().take(max).collect(),
        Some(_) => {
            let kept: String = value.chars().take(max - 3).collect();
            kept + "..."
        }
    }
}

/// Tag pills for one list row. Tags matching a `#` term come first; when
/// there is no tag filter and the pills overflow, they scroll with time.
fn build_tag_spans(
    tags: &[String],
    query: &Query,
    max_width: usize,
    elapsed_ms: u64,
    text: Color,
) -> (Vec<Span<'static>>, usize) {
    if tags.is_empty() || max_width == 0 {
        return (Vec::new(), 0);
    }

    let tag_terms: Vec<&str> = query.tag_terms().collect();
    let (matching, other): (Vec<&String>, Vec<&String>) = tags
        .iter()
        .partition(|tag| tag_terms.iter().any(|term| fuzzy_match(term, tag)));
    let strip = TagStrip::new(matching.into_iter().chain(other), text);
    let total = strip.width();

    if total <= max_width {
        return strip.window(0, total);
    }
    if tag_terms.is_empty() {
        let overflow = total - max_width;
        let start = (elapsed_ms / TAG_SCROLL_STEP_MS) as usize % (overflow + 1);
        return strip.window(start, max_width);
    }

    let marker_width = MORE_TAGS.len();
    if max_width < marker_width {
        return strip.window(0, max_width);
    }
    let (mut spans, mut used) = strip.whole_pills(max_width.saturating_sub(marker_width + 1));
    if !spans.is_empty() {
        spans.push(Span::raw(" "));
        used += 1;
    }
    spans.push(Span::styled(
        MORE_TAGS,
        Style::default().fg(text).add_modifier(Modifier::ITALIC),
    ));
    (spans, used + marker_width)
}

struct Piece {
    text: String,
    style: Style,
    gap: bool,
}

impl Piece {
    fn width(&self) -> usize {
        self.text.chars().count()
    }
}

/// Tags laid out as `[a] [b] [c]`: colored pills with one-column gaps.
struct TagStrip {
    pieces: Vec<Piece>,
}

impl TagStrip {
    fn new<'a>(tags: impl IntoIterator<Item = &'a String>, text: Color) -> Self {
        let mut pieces = Vec::new();
        for tag in tags {
            if !pieces.is_empty() {
                pieces.push(Piece {
                    text: " ".to_string(),
                    style: Style::default().fg(text),
                    gap: true,
                });
            }
            pieces.push(Piece {
                text: format!("[{tag}]"),
                style: Style::default()
                    .fg(color::color_for(tag))
                    .add_modifier(Modifier::ITALIC),
                gap: false,
            });
        }
        Self { pieces }
    }

    fn width(&self) -> usize {
        self.pieces.iter().map(Piece::width).sum()
    }

    /// Columns `start..start + width` of the strip, with the number of
    /// columns actually covered.
    fn window(&self, start: usize, width: usize) -> (Vec<Span<'static>>, usize) {
        let end = start + width;
        let mut spans = Vec::new();
        let mut column = 0usize;
        for piece in &self.pieces {
            if column >= end {
                break;
            }
            let piece_end = column + piece.width();
            let from = start.max(column);
            let to = end.min(piece_end);
            if from < to {
                let visible: String = piece.text.chars().skip(from - column).take(to - from).collect();
                spans.push(Span::styled(visible, piece.style));
            }
            column = piece_end;
        }
        (spans, end.min(self.width()).saturating_sub(start))
    }

    /// Leading pills that fit entirely in `room` columns.
    fn whole_pills(&self, room: usize) -> (Vec<Span<'static>>, usize) {
        let mut spans = Vec::new();
        let mut used = 0usize;
        for piece in &self.pieces {
            if used + piece.width() > room {
                break;
            }
            used += piece.width();
            spans.push(Span::styled(piece.text.clone(), piece.style));
        }
        let last = spans.len().checked_sub(1).and_then(|slot| self.pieces.get(slot));
        if last.is_some_and(|piece| piece.gap) {
            spans.pop();
            used -= 1;
        }
        (spans, used)
    }

    /// The strip broken into lines of at most `width` columns. Gaps never
    /// start a line; a pill wider than a line is split.
    fn wrap(&self, width: usize) -> Vec<Line<'static>> {
        let mut lines = Vec::new();
        if width == 0 {
            return lines;
        }
        let mut line: Vec<Span<'static>> = Vec::new();
        let mut filled = 0usize;

        for piece in &self.pieces {
            let piece_width = piece.width();
            if filled > 0 && filled + piece_width > width && piece_width <= width {
                lines.push(Line::from(std::mem::take(&mut line)));
                filled = 0;
            }
            if piece.gap && filled == 0 {
                continue;
            }
            let chars: Vec<char> = piece.text.chars().collect();
            let mut rest = chars.as_slice();
            while !rest.is_empty() {
                let (head, tail) = rest.split_at(rest.len().min(width - filled));
                line.push(Span::styled(head.iter().collect::<String>(), piece.style));
                filled += head.len();
                rest = tail;
                if filled == width {
                    lines.push(Line::from(std::mem::take(&mut line)));
                    filled = 0;
                }
            }
        }
        if !line.is_empty() {
            lines.push(Line::from(line));
        }
        lines
    }
}

fn compose_preview_text(
    base: &Text<'static>,
    tags: &[String],
    width: usize,
    text: Color,
) -> Text<'static> {
    let tag_lines = TagStrip::new(tags, text).wrap(width);
    if tag_lines.is_empty() {
        return base.clone();
    }
    let mut lines = tag_lines;
    lines.push(Line::from(""));
    lines.extend(base.lines.iter().cloned());
    Text::from(lines)
}

/// Preview with the tag editor on top. Also returns the (row, column) of
/// the input cursor inside the composed text.
fn compose_preview_text_with_input(
    base: &Text<'static>,
    tags: &[String],
    input: &Input,
    width: usize,
    text: Color,
) -> (Text<'static>, (usize, usize)) {
    let mut lines = TagStrip::new(tags, text).wrap(width);
    let input_row = lines.len();
    let scroll = input.visual_scroll(width.max(1));
    let visible_input: String = input.value().chars().skip(scroll).take(width.max(1)).collect();
    lines.push(Line::from(Span::styled(
        visible_input,
        Style::default().fg(text).add_modifier(Modifier::UNDERLINED),
    )));
    lines.push(Line::from(""));
    lines.extend(base.lines.iter().cloned());
    let cursor_col = input.visual_cursor().max(scroll).saturating_sub(scroll);
    (Text::from(lines), (input_row, cursor_col))
}

fn draw_side_panels(frame: &mut Frame, session: &mut Session, layout: &UiLayout, theme: &Theme) {
    let focus = session.panels().focus();
    let preview_area = layout.preview_area;
    let preview_height = preview_area.height.saturating_sub(2) as usize;
    let preview_width = preview_area.width.saturating_sub(2) as usize;

    let title = session
        .current()
        .map(|candidate| candidate.name().to_string())
        .unwrap_or_else(|| "Preview".to_string());

    let (preview, cursor) = match session.tag_editor() {
        Some(editor) => {
            let (composed, cursor) = compose_preview_text_with_input(
                session.preview_text(),
                &editor.tags,
                &editor.input,
                preview_width,
                theme.text,
            );
            (composed, Some(cursor))
        }
        None => {
            let tags = session
                .current()
                .map(|candidate| candidate.tags.clone())
                .unwrap_or_default();
            (
                compose_preview_text(session.preview_text(), &tags, preview_width, theme.text),
                None,
            )
        }
    };

    let panels = session.panels_mut();
    panels.set_extent(Panel::Preview, preview.lines.len(), preview_height);
    if let Some((row, _)) = cursor {
        let offset = panels.offset(Panel::Preview);
        if row < offset {
            panels.set_offset(Panel::Preview, row);
        } else if row >= offset + preview_height {
            panels.set_offset(Panel::Preview, row + 1 - preview_height.max(1));
        }
    }
    let preview_offset = panels.offset(Panel::Preview);

    let preview_focused = focus == Panel::Preview;
    render_panel(
        frame,
        preview_area,
        preview,
        Line::from(Span::styled(
            focused_title(&title, preview_focused),
            Style::default().fg(theme.text),
        )),
        preview_focused,
        preview_offset,
        theme,
    );

    if let Some((row, col)) = cursor {
        let visible_row = row.saturating_sub(preview_offset);
        if row >= preview_offset && visible_row < preview_height {
            let x = preview_area.x + 1 + col as u16;
            let y = preview_area.y + 1 + visible_row as u16;
            frame.set_cursor_position((x, y));
        }
    }

    if let (Some(git_area), Some(git)) = (layout.git_area, session.git_text().cloned()) {
        let git_height = git_area.height.saturating_sub(2) as usize;
        let panels = session.panels_mut();
        panels.set_extent(Panel::Git, git.lines.len(), git_height);
        let git_offset = panels.offset(Panel::Git);
        let git_focused = focus == Panel::Git;
        render_panel(
            frame,
            git_area,
            git,
            Line::from(Span::styled(
                focused_title("Git", git_focused),
                Style::default().fg(theme.text),
            )),
            git_focused,
            git_offset,
            theme,
        );
    }
}

fn focused_title(title: &str, focused: bool) -> String {
    if focused {
        format!("* {}", title)
    } else {
        title.to_string()
    }
}

fn render_panel(
    frame: &mut Frame,
    area: Rect,
    content: Text<'static>,
    title: Line<'static>,
    focused: bool,
    offset: usize,
    theme: &Theme,
) {
    let border = if focused { theme.accent } else { theme.text };
    let paragraph = Paragraph::new(content)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title(title)
                .border_style(Style::default().fg(border))
                .border_type(BorderType::Rounded),
        )
        .style(Style::default().fg(theme.text))
        .alignment(Alignment::Left)
        .scroll((offset.min(u16::MAX as usize) as u16, 0));
    frame.render_widget(paragraph, area);
}

fn build_help_line(session: &Session, focus: Panel, show_git: bool, theme: &Theme) -> Line<'static> {
    let key_style = Style::default().fg(theme.key).add_modifier(Modifier::BOLD);
    let label_style = Style::default().fg(theme.accent).add_modifier(Modifier::BOLD);
    let regular = Style::default().fg(theme.text);
    let mut spans: Vec<Span<'static>> = Vec::new();
    let key = |spans: &mut Vec<Span<'static>>, name: &'static str, action: String| {
        spans.push(Span::styled(name, key_style));
        spans.push(Span::styled(format!(" {}  ", action), regular));
    };

    if let Some(editor) = session.tag_editor() {
        spans.push(Span::styled("Tag  ", label_style));
        key(&mut spans, "Tab", "add".to_string());
        let done = if editor.has_input() { "add+done" } else { "done" };
        key(&mut spans, "Enter", done.to_string());
        key(&mut spans, "Esc", "discard".to_string());
        return Line::from(spans);
    }

    let sort_label = sort_hint(session.sort_mode());
    let panels = session.panels();
    match focus {
        Panel::Search => {
            spans.push(Span::styled("Search  ", label_style));
            if input_at_end(session.input()) {
                key(&mut spans, "Right", "preview".to_string());
            }
            key(&mut spans, "Ctrl+T", "tag".to_string());
            key(&mut spans, "Ctrl+S", sort_label);
            key(&mut spans, "Ctrl+U", "clear".to_string());
            key(&mut spans, "Ctrl+R", "rebuild".to_string());
        }
        Panel::Preview => {
            spans.push(Span::styled("Preview  ", label_style));
            key(&mut spans, "Left", "search".to_string());
            if show_git {
                key(&mut spans, "Right", "git".to_string());
            }
            key(&mut spans, "Ctrl+T", "tag".to_string());
            if panels.offset(Panel::Preview) == 0 {
                key(&mut spans, "Up", "search".to_string());
            }
            if show_git && panels.offset(Panel::Preview) >= panels.max_offset(Panel::Preview) {
                key(&mut spans, "Down", "git".to_string());
            }
            key(&mut spans, "Ctrl+S", sort_label);
        }
        Panel::Git => {
            spans.push(Span::styled("Git  ", label_style));
            key(&mut spans, "Left", "search".to_string());
            key(&mut spans, "Right", "preview".to_string());
            key(&mut spans, "Ctrl+T", "tag".to_string());
            if panels.offset(Panel::Git) == 0 {
                key(&mut spans, "Up", "preview".to_string());
            }
            key(&mut spans, "Ctrl+S", sort_label);
        }
    }
    Line::from(spans)
}

fn sort_hint(mode: SortMode) -> String {
    mode.label().to_string()
}

pub fn placeholder_text(path: Option<&str>, theme: &Theme, message: &str) -> Text<'static> {
    let message_style = if message.starts_with("Loading") {
        Style::default().fg(theme.accent).add_modifier(Modifier::BOLD)
    } else {
        Style::default().fg(theme.muted)
    };
    let mut lines = Vec::new();
    if let Some(path) = path {
        lines.push(Line::from(Span::styled(
            path.to_string(),
            Style::default().fg(theme.text),
        )));
        lines.push(Line::from(""));
    }
    lines.push(Line::from(Span::styled(message.to_string(), message_style)));
    Text::from(lines)
}

/// Turns a collected preview into panel text. Tool failures become
/// placeholder lines in their own panel.
pub fn preview_data(result: &PreviewResult, theme: &Theme, max_lines: usize) -> PreviewData {
    let value = Style::default().fg(theme.text);
    let heading = Style::default().fg(theme.accent).add_modifier(Modifier::BOLD);
    let subtle = Style::default().fg(theme.muted);

    let mut lines = vec![Line::from(Span::styled(result.path.clone(), value)), Line::from("")];
    match &result.tree {
        TreeOutput::Rendered(output) => {
            lines.push(Line::from(Span::styled("Contents", heading)));
            lines.extend(lines_from_ansi_output(output, value, max_lines));
        }
        TreeOutput::NotADirectory => {
            lines.push(Line::from(Span::styled("Not a directory", subtle)));
        }
        TreeOutput::Failed(err) => {
            lines.push(Line::from(Span::styled("Contents", heading)));
            lines.push(Line::from(Span::styled(
                format!("erd output not available ({})", err),
                subtle,
            )));
        }
    }

    let git = match &result.git {
        GitStatus::NotARepo => None,
        GitStatus::Summary(summary) => Some(git_text(summary, theme, max_lines)),
        GitStatus::Failed(err) => Some(placeholder_text(
            None,
            theme,
            &format!("git details not available ({})", err),
        )),
    };

    PreviewData {
        preview: Text::from(lines),
        git,
    }
}

fn git_text(summary: &GitSummary, theme: &Theme, max_lines: usize) -> Text<'static> {
    let heading = Style::default().fg(theme.accent).add_modifier(Modifier::BOLD);
    let value = Style::default().fg(theme.text);
    let mut lines: Vec<Line<'static>> = Vec::new();

    if let Some(branch) = &summary.branch {
        lines.push(Line::from(Span::styled(format!("Branch: {}", branch), heading)));
    }
    let sections = [
        ("Recent commits", &summary.recent_commits),
        ("Staged changes", &summary.staged),
        ("Unstaged changes", &summary.unstaged),
        ("Untracked", &summary.untracked),
    ];
    for (title, entries) in sections {
        if entries.is_empty() {
            continue;
        }
        if !lines.is_empty() {
            lines.push(Line::from(""));
        }
        lines.push(Line::from(Span::styled(title, heading)));
        lines.extend(
            entries
                .iter()
                .take(max_lines)
                .map(|entry| Line::from(Span::styled(entry.clone(), value))),
        );
    }
    if lines.is_empty() {
        return placeholder_text(None, theme, "Nothing to report");
    }
    Text::from(lines)
}

fn lines_from_output(output: &str, style: Style, max_lines: usize) -> Vec<Line<'static>> {
    output
        .lines()
        .take(max_lines)
        .map(|line| Line::from(Span::styled(line.to_string(), style)))
        .collect()
}

fn lines_from_ansi_output(output: &str, style: Style, max_lines: usize) -> Vec<Line<'static>> {
    let Ok(text) = output.as_bytes().to_vec().into_text() else {
        return lines_from_output(output, style, max_lines);
    };
    text.lines
        .into_iter()
        .take(max_lines)
        .map(|line| line.style(style))
        .collect()
}
