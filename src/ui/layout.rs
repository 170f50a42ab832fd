use ratatui::layout::{Constraint, Direction, Layout, Rect};

pub struct AppLayout {
    pub titlebar: Rect,
    /// Everything between the titlebar and the statusbar.
    pub middle: Rect,
    pub sidebar: Rect,
    pub main: Rect,
    pub statusbar: Rect,
    pub keybar: Rect,
}

pub fn compute_layout(area: Rect) -> AppLayout {
    let vertical = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1), // titlebar
            Constraint::Min(5),    // middle (sidebar + main)
            Constraint::Length(1), // statusbar
            Constraint::Length(1), // keybar
        ])
        .split(area);

    let middle = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Length(22), // sidebar (marker + indicator + number)
            Constraint::Min(20),    // question
        ])
        .split(vertical[1]);

    AppLayout {
        titlebar: vertical[0],
        middle: vertical[1],
        sidebar: middle[0],
        main: middle[1],
        statusbar: vertical[2],
        keybar: vertical[3],
    }
}

/// Index of the sidebar row under `(x, y)`, relative to the first question row.
pub fn sidebar_row(layout: &AppLayout, x: u16, y: u16) -> Option<usize> {
    let s = layout.sidebar;
    let inside = x >= s.x && x < s.x + s.width && y > s.y && y < s.y + s.height;
    inside.then(|| (y - s.y - 1) as usize)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sidebar_row_skips_title_line() {
        let layout = compute_layout(Rect::new(0, 0, 100, 30));
        assert_eq!(sidebar_row(&layout, 3, 1), None);
        assert_eq!(sidebar_row(&layout, 3, 2), Some(0));
        assert_eq!(sidebar_row(&layout, 60, 5), None);
    }
}
