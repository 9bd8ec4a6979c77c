use ratatui::layout::{Constraint, Layout, Margin, Position, Rect};

use crate::panel::Panel;

const HELP_HEIGHT: u16 = 3;
const MIN_BODY_HEIGHT: u16 = 8;

/// Screen areas of one frame. Mouse events are mapped back to panels with
/// [`UiLayout::panel_at`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UiLayout {
    pub list_area: Rect,
    pub search_area: Rect,
    pub results_area: Rect,
    pub preview_area: Rect,
    pub git_area: Option<Rect>,
    pub help_area: Rect,
}

impl UiLayout {
    pub fn panel_at(&self, col: u16, row: u16) -> Option<Panel> {
        let cell = Position::new(col, row);
        if self.list_area.contains(cell) {
            Some(Panel::Search)
        } else if self.git_area.is_some_and(|area| area.contains(cell)) {
            Some(Panel::Git)
        } else if self.preview_area.contains(cell) {
            Some(Panel::Preview)
        } else {
            None
        }
    }
}

/// Results on the left (60%), preview over git on the right, key help
/// along the bottom.
pub fn compute_ui_layout(size: Rect, show_git: bool) -> UiLayout {
    let [body, help_area] =
        Layout::vertical([Constraint::Min(MIN_BODY_HEIGHT), Constraint::Length(HELP_HEIGHT)])
            .areas(size);
    let [list_area, side] =
        Layout::horizontal([Constraint::Percentage(60), Constraint::Percentage(40)]).areas(body);

    // Search line and results share the bordered list block.
    let [search_area, results_area] =
        Layout::vertical([Constraint::Length(1), Constraint::Min(1)])
            .areas(list_area.inner(Margin::new(1, 1)));

    let (preview_area, git_area) = if show_git {
        let [preview, git] =
            Layout::vertical([Constraint::Percentage(60), Constraint::Percentage(40)]).areas(side);
        (preview, Some(git))
    } else {
        (side, None)
    };

    UiLayout {
        list_area,
        search_area,
        results_area,
        preview_area,
        git_area,
        help_area,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn git_panel_only_when_shown() {
        let size = Rect::new(0, 0, 100, 40);
        assert!(compute_ui_layout(size, false).git_area.is_none());
        let layout = compute_ui_layout(size, true);
        let git = layout.git_area.unwrap();
        assert!(git.y > layout.preview_area.y);
        assert_eq!(layout.help_area.height, 3);
    }

    #[test]
    fn cells_map_to_panels() {
        let layout = compute_ui_layout(Rect::new(0, 0, 100, 40), true);
        assert_eq!(layout.panel_at(1, 1), Some(Panel::Search));
        let preview = layout.preview_area;
        assert_eq!(layout.panel_at(preview.x + 1, preview.y + 1), Some(Panel::Preview));
        let git = layout.git_area.unwrap();
        assert_eq!(layout.panel_at(git.x + 1, git.y + 1), Some(Panel::Git));
        assert_eq!(layout.panel_at(1, 39), None);
    }
}
