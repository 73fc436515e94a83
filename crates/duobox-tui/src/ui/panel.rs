//! Listing panel rendering.
//!
//! Draws one [`PanelView`] as a bordered list. The title carries the path,
//! the entry count (`+` while more pages remain) and the load status; the
//! bottom row of the panel shows errors, notices and the loading message.

use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, List, ListItem, ListState, Paragraph},
    Frame,
};
use duobox_core::config::theme::{parse_color, Theme};
use duobox_core::render_model::{EntryView, PanelView};

/// Renders one panel into `area`.
pub fn render_panel(f: &mut Frame, area: Rect, view: &PanelView, theme: &Theme, loading: &str) {
    let border_color = if view.focused {
        parse_color(&theme.panel.focused_border_fg)
    } else {
        parse_color(&theme.panel.border_fg)
    };

    let block = Block::default()
        .borders(Borders::ALL)
        .title(panel_title(view))
        .border_style(Style::default().fg(border_color));
    let inner = block.inner(area);
    f.render_widget(block, area);

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Min(0), Constraint::Length(1)])
        .split(inner);

    let rows = chunks[0].height as usize;
    let start = view.scroll_offset.min(view.visible_entries.len());
    let end = (start + rows).min(view.visible_entries.len());

    let items: Vec<ListItem> = view.visible_entries[start..end]
        .iter()
        .map(|entry| ListItem::new(entry_line(entry, theme)))
        .collect();

    let list = List::new(items)
        .highlight_style(
            Style::default()
                .add_modifier(Modifier::REVERSED)
                .fg(parse_color(&theme.panel.selected_fg)),
        )
        .highlight_symbol("> ");

    let mut state = ListState::default();
    if view.focused {
        state.select(
            view.selected_index
                .filter(|&i| i >= start && i < end)
                .map(|i| i - start),
        );
    }
    f.render_stateful_widget(list, chunks[0], &mut state);

    if let Some(footer) = footer_line(view, theme, loading) {
        f.render_widget(Paragraph::new(footer), chunks[1]);
    }
}

fn panel_title(view: &PanelView) -> String {
    format!(" {} [{}] {} ", view.path, view.count_label(), view.status.label())
}

fn entry_line(entry: &EntryView, theme: &Theme) -> Line<'static> {
    let mark = if entry.marked {
        Span::styled("* ", Style::default().fg(parse_color(&theme.panel.marked_fg)))
    } else {
        Span::raw("  ")
    };
    let name = if entry.is_folder() {
        format!("{}/", entry.display_name)
    } else {
        entry.display_name.clone()
    };
    Line::from(vec![mark, Span::styled(name, entry_style(entry, theme))])
}

fn entry_style(entry: &EntryView, theme: &Theme) -> Style {
    if entry.is_folder() {
        Style::default()
            .fg(parse_color(&theme.panel.folder_fg))
            .add_modifier(Modifier::BOLD)
    } else if entry.hidden {
        Style::default().fg(parse_color(&theme.panel.hidden_fg))
    } else {
        Style::default()
    }
}

/// Error first, then a pagination notice, then the loading message.
fn footer_line(view: &PanelView, theme: &Theme, loading: &str) -> Option<Line<'static>> {
    let error_style = Style::default().fg(parse_color(&theme.panel.error_fg));
    if let Some(message) = view.error() {
        return Some(Line::from(Span::styled(
            format!("error: {message}"),
            error_style.add_modifier(Modifier::BOLD),
        )));
    }
    if let Some(notice) = &view.notice {
        return Some(Line::from(Span::styled(
            notice.clone(),
            error_style.add_modifier(Modifier::ITALIC),
        )));
    }
    if view.status.is_busy() {
        return Some(Line::from(Span::styled(
            loading.to_string(),
            Style::default().fg(parse_color(&theme.panel.loading_fg)),
        )));
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use duobox_core::archive::EntryKind;
    use duobox_core::PanelStatus;
    use ratatui::style::Color;

    fn entry(name: &str, kind: EntryKind) -> EntryView {
        EntryView {
            name: name.to_string(),
            display_name: name.to_string(),
            kind,
            size: 0,
            modified_at: None,
            hidden: name.starts_with('.'),
            marked: false,
        }
    }

    fn view(status: PanelStatus) -> PanelView {
        PanelView {
            path: "/Archive".to_string(),
            visible_entries: vec![entry("2024", EntryKind::Folder)],
            selected_index: Some(0),
            scroll_offset: 0,
            status,
            loaded: 1,
            complete: false,
            notice: None,
            focused: true,
            detail: None,
            marked_count: 0,
        }
    }

    fn text(line: &Line<'_>) -> String {
        line.spans.iter().map(|s| s.content.as_ref()).collect()
    }

    #[test]
    fn title_shows_path_count_and_status() {
        assert_eq!(panel_title(&view(PanelStatus::Loaded)), " /Archive [1+] loaded ");
    }

    #[test]
    fn folders_get_a_trailing_slash_and_folder_color() {
        let theme = Theme::default();
        let line = entry_line(&entry("2024", EntryKind::Folder), &theme);
        assert_eq!(text(&line), "  2024/");
        assert_eq!(line.spans[1].style.fg, Some(Color::Blue));
    }

    #[test]
    fn hidden_files_are_dimmed() {
        let theme = Theme::default();
        let line = entry_line(&entry(".index", EntryKind::File), &theme);
        assert_eq!(line.spans[1].style.fg, Some(Color::DarkGray));
    }

    #[test]
    fn marked_entries_get_a_marker() {
        let theme = Theme::default();
        let mut marked = entry("setlist.pdf", EntryKind::File);
        marked.marked = true;
        assert_eq!(text(&entry_line(&marked, &theme)), "* setlist.pdf");
    }

    #[test]
    fn footer_prefers_error_over_notice() {
        let theme = Theme::default();
        let mut v = view(PanelStatus::Error("not found: /Archive".to_string()));
        v.notice = Some("more entries unavailable".to_string());
        let footer = footer_line(&v, &theme, "Loading...").unwrap();
        assert_eq!(text(&footer), "error: not found: /Archive");
        assert_eq!(footer.spans[0].style.fg, Some(Color::Red));
    }

    #[test]
    fn footer_shows_loading_while_busy() {
        let theme = Theme::default();
        let footer = footer_line(&view(PanelStatus::Stale), &theme, "Fetching...").unwrap();
        assert_eq!(text(&footer), "Fetching...");
        assert!(footer_line(&view(PanelStatus::Loaded), &theme, "Fetching...").is_none());
    }
}
