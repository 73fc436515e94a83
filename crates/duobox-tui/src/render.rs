use ratatui::{
    layout::{Constraint, Direction, Layout},
    Frame,
};
use duobox_core::nav::Side;

use crate::app::{App, AppMode};
use crate::ui::header::render_header;
use crate::ui::panel::render_panel;
use crate::ui::popup::render_help_popup;
use crate::ui::statusbar::render_statusbar;

/// Rows taken by everything except panel entries: header, status bar,
/// the two panel borders and the panel footer.
const CHROME_ROWS: u16 = 5;

/// Number of entry rows each panel shows in a terminal `height` rows tall.
pub fn panel_rows(height: u16) -> usize {
    usize::from(height.saturating_sub(CHROME_ROWS).max(1))
}

/// Main render function: composes the full UI layout each frame.
pub fn render(f: &mut Frame, app: &App) {
    let theme = app.theme();
    let snapshot = app.snapshot();

    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1),
            Constraint::Min(3),
            Constraint::Length(1),
        ])
        .split(f.area());

    render_header(f, rows[0], app.title(), app.remote_label(), theme);

    let columns = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(50), Constraint::Percentage(50)])
        .split(rows[1]);

    for (side, area) in [(Side::Left, columns[0]), (Side::Right, columns[1])] {
        render_panel(f, area, snapshot.panel(side), theme, app.loading_message());
    }

    render_statusbar(f, rows[2], snapshot.focused_panel(), theme);

    match app.mode() {
        AppMode::Help => render_help_popup(f, app.action_registry(), app.keymap(), theme),
        AppMode::Normal => {}
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use duobox_core::archive::{DirectoryEntry, RemotePath};
    use duobox_core::config::keymap::Keymap;
    use duobox_core::config::settings::Config;
    use duobox_core::config::theme::Theme;
    use duobox_core::nav::{NavigationController, NavigationOptions};
    use duobox_core::remote::MemoryArchive;
    use ratatui::{backend::TestBackend, Terminal};
    use tokio::sync::mpsc;

    fn screen(terminal: &Terminal<TestBackend>) -> String {
        let buffer = terminal.backend().buffer();
        buffer.content().iter().map(|cell| cell.symbol()).collect()
    }

    #[test]
    fn panel_rows_subtracts_chrome() {
        assert_eq!(panel_rows(24), 19);
        assert_eq!(panel_rows(3), 1);
    }

    #[tokio::test]
    async fn draws_both_panels_and_help() {
        let archive = MemoryArchive::new(10).with_folder(
            "/",
            vec![DirectoryEntry::folder("Rehearsals", "id:r").unwrap()],
        );
        let (tx, mut rx) = mpsc::unbounded_channel();
        let mut controller =
            NavigationController::new(Arc::new(archive), tx, NavigationOptions::default());
        controller.start(RemotePath::root(), RemotePath::parse("/Rehearsals"));
        while controller.cache().has_pending() {
            controller.handle_event(rx.recv().await.unwrap());
        }
        let app = App::new(controller, &Config::default(), Keymap::default(), Theme::default());

        let mut terminal = Terminal::new(TestBackend::new(80, 20)).unwrap();
        terminal.draw(|f| render(f, &app)).unwrap();
        let text = screen(&terminal);
        assert!(text.contains("duobox"));
        assert!(text.contains("Rehearsals/"));
        assert!(text.contains("error"), "right panel shows its failure");

        let app = app.with_mode(AppMode::Help);
        terminal.draw(|f| render(f, &app)).unwrap();
        assert!(screen(&terminal).contains("Help"));
    }
}
