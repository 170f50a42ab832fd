pub mod dialog;
pub mod keybar;
pub mod layout;
pub mod list;
pub mod markdown;
pub mod preamble;
pub mod question;
pub mod result;
pub mod sidebar;
pub mod statusbar;
pub mod titlebar;

use ratatui::layout::Rect;
use ratatui::Frame;

use crate::state::{AppState, Screen};

pub fn draw(f: &mut Frame, state: &AppState) {
    let area = f.area();

    match &state.screen {
        Screen::Loading(what) => {
            result::draw_loading(f, area, what);
        }
        Screen::AssessmentList => {
            draw_framed(f, area, state, list::draw_assessments);
        }
        Screen::Preamble => {
            draw_framed(f, area, state, preamble::draw_preamble);
        }
        Screen::Working => {
            draw_working(f, area, state);
        }
        Screen::Submitting => {
            result::draw_submitting(f, area, state);
        }
        Screen::Results => {
            draw_framed(f, area, state, list::draw_results);
        }
        Screen::PageError => {
            result::draw_page_error(f, area, state);
        }
    }
}

/// Titlebar, content, statusbar and keybar, without the question sidebar.
fn draw_framed(
    f: &mut Frame,
    area: Rect,
    state: &AppState,
    content: fn(&mut Frame, Rect, &AppState),
) {
    let layout = layout::compute_layout(area);
    titlebar::draw_titlebar(f, layout.titlebar, state);
    content(f, layout.middle, state);
    statusbar::draw_statusbar(f, layout.statusbar, state);
    keybar::draw_keybar(f, layout.keybar, state);
}

fn draw_working(f: &mut Frame, area: Rect, state: &AppState) {
    let layout = layout::compute_layout(area);

    titlebar::draw_titlebar(f, layout.titlebar, state);
    sidebar::draw_sidebar(f, layout.sidebar, state);
    question::draw_question(f, layout.main, state);
    statusbar::draw_statusbar(f, layout.statusbar, state);
    keybar::draw_keybar(f, layout.keybar, state);

    if state.has_dialog() {
        dialog::draw_dialog(f, area, state);
    }
}
