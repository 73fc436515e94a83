//! Status bar rendering.
//!
//! The status bar occupies a single row at the bottom of the terminal and
//! shows the cursor position, selected or inspected entry info, the mark
//! count, and the focused panel's notice.

use chrono::{DateTime, Local, Utc};
use ratatui::{
    layout::Rect,
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::Paragraph,
    Frame,
};
use duobox_core::config::theme::{parse_color, Theme};
use duobox_core::render_model::{EntryView, PanelView};

/// Renders the bottom status bar for the focused panel.
pub fn render_statusbar(f: &mut Frame, area: Rect, view: &PanelView, theme: &Theme) {
    let bg = parse_color(&theme.statusbar.bg);
    let position_fg = parse_color(&theme.statusbar.position_fg);
    let status_fg = parse_color(&theme.statusbar.status_fg);
    let message_fg = parse_color(&theme.statusbar.message_fg);

    let marks = if view.marked_count > 0 {
        format!("  [{} marked]", view.marked_count)
    } else {
        String::new()
    };

    let notice_span = view
        .notice
        .as_deref()
        .map(|msg| {
            Span::styled(
                format!("  {msg}"),
                Style::default()
                    .fg(message_fg)
                    .bg(bg)
                    .add_modifier(Modifier::ITALIC),
            )
        })
        .unwrap_or_default();

    let line = Line::from(vec![
        Span::styled(
            position(view),
            Style::default()
                .fg(position_fg)
                .bg(bg)
                .add_modifier(Modifier::BOLD),
        ),
        Span::styled(entry_info(view), Style::default().fg(position_fg).bg(bg)),
        Span::styled(
            marks,
            Style::default()
                .fg(status_fg)
                .bg(bg)
                .add_modifier(Modifier::BOLD),
        ),
        notice_span,
    ]);

    let bar = Paragraph::new(line).style(Style::default().bg(bg));
    f.render_widget(bar, area);
}

fn position(view: &PanelView) -> String {
    match view.selected_index {
        Some(index) => format!(" {}/{}", index + 1, view.count_label()),
        None => format!(" 0/{}", view.count_label()),
    }
}

/// Inspected metadata wins over the plain selection.
fn entry_info(view: &PanelView) -> String {
    match (&view.detail, view.selected()) {
        (Some(detail), _) => format!("  {}", describe(detail)),
        (None, Some(entry)) => format!("  {}", describe(entry)),
        (None, None) => String::new(),
    }
}

fn describe(entry: &EntryView) -> String {
    if entry.is_folder() {
        return format!("[DIR] {}", entry.name);
    }
    match entry.modified_at {
        Some(at) => format!("{} ({}, {})", entry.name, format_size(entry.size), format_date(at)),
        None => format!("{} ({})", entry.name, format_size(entry.size)),
    }
}

fn format_date(at: DateTime<Utc>) -> String {
    at.with_timezone(&Local).format("%Y-%m-%d %H:%M").to_string()
}

fn format_size(bytes: u64) -> String {
    const KB: u64 = 1024;
    const MB: u64 = KB * 1024;
    const GB: u64 = MB * 1024;

    if bytes >= GB {
        format!("{:.1} GB", bytes as f64 / GB as f64)
    } else if bytes >= MB {
        format!("{:.1} MB", bytes as f64 / MB as f64)
    } else if bytes >= KB {
        format!("{:.1} KB", bytes as f64 / KB as f64)
    } else {
        format!("{bytes} B")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use duobox_core::archive::EntryKind;
    use duobox_core::PanelStatus;

    fn file(name: &str, size: u64) -> EntryView {
        EntryView {
            name: name.to_string(),
            display_name: name.to_string(),
            kind: EntryKind::File,
            size,
            modified_at: None,
            hidden: false,
            marked: false,
        }
    }

    fn view(entries: Vec<EntryView>, selected: Option<usize>) -> PanelView {
        PanelView {
            path: "/".to_string(),
            visible_entries: entries,
            selected_index: selected,
            scroll_offset: 0,
            status: PanelStatus::Loaded,
            loaded: 0,
            complete: true,
            notice: None,
            focused: true,
            detail: None,
            marked_count: 0,
        }
    }

    // --- format_size tests ---

    #[test]
    fn format_size_bytes() {
        assert_eq!(format_size(0), "0 B");
        assert_eq!(format_size(1023), "1023 B");
    }

    #[test]
    fn format_size_kilobytes() {
        assert_eq!(format_size(1024), "1.0 KB");
        assert_eq!(format_size(1536), "1.5 KB");
    }

    #[test]
    fn format_size_megabytes() {
        assert_eq!(format_size(1024 * 1024), "1.0 MB");
    }

    #[test]
    fn format_size_gigabytes() {
        assert_eq!(format_size(1024 * 1024 * 1024), "1.0 GB");
    }

    // --- position / entry info ---

    #[test]
    fn position_counts_from_one() {
        let v = view(vec![file("a", 1), file("b", 2)], Some(1));
        assert_eq!(position(&v), " 2/2");
    }

    #[test]
    fn position_on_empty_panel() {
        let mut v = view(Vec::new(), None);
        v.complete = false;
        assert_eq!(position(&v), " 0/0+");
    }

    #[test]
    fn entry_info_describes_selection() {
        let v = view(vec![file("setlist.pdf", 2048)], Some(0));
        assert_eq!(entry_info(&v), "  setlist.pdf (2.0 KB)");
    }

    #[test]
    fn entry_info_prefers_inspected_detail() {
        let mut v = view(vec![file("setlist.pdf", 2048)], Some(0));
        v.detail = Some(file("setlist.pdf", 4096));
        assert_eq!(entry_info(&v), "  setlist.pdf (4.0 KB)");
    }

    #[test]
    fn folders_are_tagged() {
        let mut folder = file("2024", 0);
        folder.kind = EntryKind::Folder;
        assert_eq!(describe(&folder), "[DIR] 2024");
    }
}
