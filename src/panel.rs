//! Focus and scroll state of the three picker panels.
//!
//! Each panel keeps its own offset, so moving focus never loses a position.
//! Offsets stay within `0..=content - viewport` of their panel.

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Panel {
    Search,
    Preview,
    Git,
}

impl Panel {
    fn slot(self) -> usize {
        match self {
            Panel::Search => 0,
            Panel::Preview => 1,
            Panel::Git => 2,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PointerKind {
    Click,
    WheelUp,
    WheelDown,
}

#[derive(Debug, Clone)]
pub struct PanelState {
    focus: Panel,
    offsets: [usize; 3],
    content: [usize; 3],
    viewport: [usize; 3],
    git_visible: bool,
}

impl Default for PanelState {
    fn default() -> Self {
        Self::new()
    }
}

impl PanelState {
    pub fn new() -> Self {
        Self {
            focus: Panel::Search,
            offsets: [0; 3],
            content: [0; 3],
            viewport: [0; 3],
            git_visible: false,
        }
    }

    pub fn focus(&self) -> Panel {
        self.focus
    }

    pub fn offset(&self, panel: Panel) -> usize {
        self.offsets[panel.slot()]
    }

    pub fn git_visible(&self) -> bool {
        self.git_visible
    }

    /// Hiding the Git panel moves its focus to Preview.
    pub fn set_git_visible(&mut self, visible: bool) {
        self.git_visible = visible;
        if !visible && self.focus == Panel::Git {
            self.focus = Panel::Preview;
        }
    }

    pub fn focus_panel(&mut self, panel: Panel) {
        if panel == Panel::Git && !self.git_visible {
            return;
        }
        self.focus = panel;
    }

    pub fn next(&mut self) {
        self.focus = match self.focus {
            Panel::Search => Panel::Preview,
            Panel::Preview if self.git_visible => Panel::Git,
            Panel::Preview | Panel::Git => Panel::Search,
        };
    }

    pub fn previous(&mut self) {
        self.focus = match self.focus {
            Panel::Search if self.git_visible => Panel::Git,
            Panel::Search => Panel::Preview,
            Panel::Preview => Panel::Search,
            Panel::Git => Panel::Preview,
        };
    }

    pub fn left(&mut self) {
        if self.focus != Panel::Search {
            self.focus = Panel::Search;
        }
    }

    pub fn right(&mut self) {
        self.focus = match self.focus {
            Panel::Search => Panel::Preview,
            Panel::Preview if self.git_visible => Panel::Git,
            Panel::Preview => Panel::Preview,
            Panel::Git => Panel::Preview,
        };
    }

    /// Records how many lines `panel` holds and how many fit on screen,
    /// then pulls its offset back into range.
    pub fn set_extent(&mut self, panel: Panel, content: usize, viewport: usize) {
        let slot = panel.slot();
        self.content[slot] = content;
        self.viewport[slot] = viewport;
        self.offsets[slot] = self.offsets[slot].min(self.max_offset(panel));
    }

    pub fn max_offset(&self, panel: Panel) -> usize {
        let slot = panel.slot();
        self.content[slot].saturating_sub(self.viewport[slot])
    }

    pub fn viewport(&self, panel: Panel) -> usize {
        self.viewport[panel.slot()]
    }

    pub fn scroll_by(&mut self, delta: isize) {
        self.scroll_panel(self.focus, delta);
    }

    pub fn scroll_panel(&mut self, panel: Panel, delta: isize) {
        let current = self.offset(panel);
        let target = if delta < 0 {
            current.saturating_sub(delta.unsigned_abs())
        } else {
            current.saturating_add(delta as usize)
        };
        self.set_offset(panel, target);
    }

    pub fn page(&mut self, down: bool) {
        let step = self.viewport(self.focus).max(1) as isize;
        self.scroll_by(if down { step } else { -step });
    }

    pub fn scroll_to_start(&mut self) {
        self.set_offset(self.focus, 0);
    }

    pub fn scroll_to_end(&mut self) {
        self.set_offset(self.focus, self.max_offset(self.focus));
    }

    /// Up arrow inside a side panel: scroll, or leave the panel once at the
    /// top (Preview goes to Search, Git to Preview).
    pub fn line_up(&mut self) {
        match self.focus {
            Panel::Search => {}
            Panel::Preview if self.offset(Panel::Preview) == 0 => self.focus = Panel::Search,
            Panel::Git if self.offset(Panel::Git) == 0 => self.focus = Panel::Preview,
            panel => self.scroll_panel(panel, -1),
        }
    }

    /// Down arrow inside a side panel: scroll, or drop from the bottom of
    /// Preview into Git when it is shown.
    pub fn line_down(&mut self) {
        match self.focus {
            Panel::Search => {}
            Panel::Preview => {
                if self.offset(Panel::Preview) < self.max_offset(Panel::Preview) {
                    self.scroll_panel(Panel::Preview, 1);
                } else if self.git_visible {
                    self.focus = Panel::Git;
                }
            }
            Panel::Git => self.scroll_panel(Panel::Git, 1),
        }
    }

    /// Focuses the panel under the pointer and, for the wheel, scrolls only
    /// that panel. Returns false when the event was ignored.
    pub fn pointer(&mut self, panel: Panel, kind: PointerKind) -> bool {
        if panel == Panel::Git && !self.git_visible {
            return false;
        }
        self.focus = panel;
        match kind {
            PointerKind::Click => {}
            PointerKind::WheelUp => self.scroll_panel(panel, -1),
            PointerKind::WheelDown => self.scroll_panel(panel, 1),
        }
        true
    }

    /// The highlighted candidate changed; side panels start from the top.
    pub fn reset_content_offsets(&mut self) {
        self.offsets[Panel::Preview.slot()] = 0;
        self.offsets[Panel::Git.slot()] = 0;
    }

    pub fn set_offset(&mut self, panel: Panel, offset: usize) {
        let max = self.max_offset(panel);
        self.offsets[panel.slot()] = offset.min(max);
    }

    /// Keeps the selected result row inside the results viewport.
    pub fn follow_selection(&mut self, selected: usize, total: usize, height: usize) {
        let slot = Panel::Search.slot();
        self.content[slot] = total;
        self.viewport[slot] = height;
        self.offsets[slot] = list_window_offset(selected, self.offsets[slot], height, total);
    }
}

/// First visible row of a list of `total` rows shown `height` at a time so
/// that `selected` stays visible while moving the window as little as
/// possible.
pub fn list_window_offset(selected: usize, current: usize, height: usize, total: usize) -> usize {
    if total == 0 || height == 0 {
        return 0;
    }

    let mut offset = current.min(total.saturating_sub(1));
    if selected < offset {
        offset = selected;
    } else if selected >= offset + height {
        offset = selected + 1 - height;
    }
    offset.min(total.saturating_sub(height))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn with_content() -> PanelState {
        let mut state = PanelState::new();
        state.set_git_visible(true);
        state.set_extent(Panel::Preview, 50, 10);
        state.set_extent(Panel::Git, 30, 10);
        state
    }

    #[test]
    fn focus_cycles_and_wraps_from_git() {
        let mut state = with_content();
        assert_eq!(state.focus(), Panel::Search);
        state.next();
        assert_eq!(state.focus(), Panel::Preview);
        state.next();
        assert_eq!(state.focus(), Panel::Git);
        state.next();
        assert_eq!(state.focus(), Panel::Search);
        state.previous();
        assert_eq!(state.focus(), Panel::Git);
    }

    #[test]
    fn hidden_git_is_skipped_and_unfocusable() {
        let mut state = with_content();
        state.focus_panel(Panel::Git);
        state.set_git_visible(false);
        assert_eq!(state.focus(), Panel::Preview);

        state.next();
        assert_eq!(state.focus(), Panel::Search);
        state.focus_panel(Panel::Git);
        assert_eq!(state.focus(), Panel::Search);
        assert!(!state.pointer(Panel::Git, PointerKind::Click));
    }

    #[test]
    fn offsets_survive_focus_changes() {
        let mut state = with_content();
        state.focus_panel(Panel::Preview);
        state.scroll_by(7);
        state.next();
        state.scroll_by(3);
        state.next();
        state.next();
        assert_eq!(state.focus(), Panel::Preview);
        assert_eq!(state.offset(Panel::Preview), 7);
        assert_eq!(state.offset(Panel::Git), 3);
    }

    #[test]
    fn scrolling_is_clamped() {
        let mut state = with_content();
        state.focus_panel(Panel::Preview);
        state.scroll_by(-5);
        assert_eq!(state.offset(Panel::Preview), 0);
        state.scroll_by(500);
        assert_eq!(state.offset(Panel::Preview), 40);
        state.set_extent(Panel::Preview, 12, 10);
        assert_eq!(state.offset(Panel::Preview), 2);
        state.scroll_to_start();
        state.page(true);
        assert_eq!(state.offset(Panel::Preview), 2);
    }

    #[test]
    fn wheel_scrolls_only_the_panel_under_the_pointer() {
        let mut state = with_content();
        state.focus_panel(Panel::Preview);
        state.scroll_by(4);
        assert!(state.pointer(Panel::Git, PointerKind::WheelDown));
        assert_eq!(state.focus(), Panel::Git);
        assert_eq!(state.offset(Panel::Git), 1);
        assert_eq!(state.offset(Panel::Preview), 4);
    }

    #[test]
    fn arrows_leave_panels_at_their_edges() {
        let mut state = with_content();
        state.focus_panel(Panel::Preview);
        state.line_up();
        assert_eq!(state.focus(), Panel::Search);

        state.focus_panel(Panel::Preview);
        state.scroll_to_end();
        state.line_down();
        assert_eq!(state.focus(), Panel::Git);
        state.line_up();
        assert_eq!(state.focus(), Panel::Preview);
    }

    #[test]
    fn list_window_follows_selection() {
        assert_eq!(list_window_offset(0, 0, 5, 0), 0);
        assert_eq!(list_window_offset(7, 0, 5, 20), 3);
        assert_eq!(list_window_offset(2, 3, 5, 20), 2);
        assert_eq!(list_window_offset(19, 18, 5, 20), 15);
        assert_eq!(list_window_offset(4, 10, 5, 6), 1);
    }
}
