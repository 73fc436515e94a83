use ratatui::{
    layout::Rect,
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::Paragraph,
    Frame,
};
use duobox_core::config::theme::{parse_color, Theme};

/// Renders the top row: application title followed by the remote label.
/// Example: " duobox  Dropbox (Jo Rivera)"
pub fn render_header(f: &mut Frame, area: Rect, title: &str, remote: &str, theme: &Theme) {
    let bg = parse_color(&theme.header.bg);
    f.render_widget(
        Paragraph::new(header_line(title, remote, theme)).style(Style::default().bg(bg)),
        area,
    );
}

fn header_line(title: &str, remote: &str, theme: &Theme) -> Line<'static> {
    let bg = parse_color(&theme.header.bg);
    Line::from(vec![
        Span::styled(
            format!(" {title}"),
            Style::default()
                .fg(parse_color(&theme.header.title_fg))
                .bg(bg)
                .add_modifier(Modifier::BOLD),
        ),
        Span::styled(
            format!("  {remote}"),
            Style::default().fg(parse_color(&theme.header.remote_fg)).bg(bg),
        ),
    ])
}

#[cfg(test)]
mod tests {
    use super::*;
    use ratatui::style::Color;

    #[test]
    fn header_shows_title_then_remote() {
        let line = header_line("duobox", "demo archive", &Theme::default());
        let text: String = line.spans.iter().map(|s| s.content.as_ref()).collect();
        assert_eq!(text, " duobox  demo archive");
        assert_eq!(line.spans[0].style.fg, Some(Color::Cyan));
    }
}
