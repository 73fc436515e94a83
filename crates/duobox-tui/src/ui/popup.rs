use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph},
    Frame,
};
use duobox_core::action::{ActionCategory, ActionRegistry};
use duobox_core::config::keymap::Keymap;
use duobox_core::config::theme::{parse_color, Theme};

const CATEGORIES: [ActionCategory; 4] = [
    ActionCategory::Navigation,
    ActionCategory::Panel,
    ActionCategory::View,
    ActionCategory::System,
];

/// Renders the key binding reference, grouped by category.
pub fn render_help_popup(f: &mut Frame, registry: &ActionRegistry, keymap: &Keymap, theme: &Theme) {
    let area = centered_rect(60, 70, f.area());
    let border_fg = parse_color(&theme.popup.border_fg);

    f.render_widget(Clear, area);

    let popup = Paragraph::new(help_lines(registry, keymap, theme)).block(
        Block::default()
            .borders(Borders::ALL)
            .title(" Help (Esc to close) ")
            .border_style(Style::default().fg(border_fg)),
    );

    f.render_widget(popup, area);
}

fn help_lines(registry: &ActionRegistry, keymap: &Keymap, theme: &Theme) -> Vec<Line<'static>> {
    let key_style = Style::default().fg(parse_color(&theme.popup.key_fg));
    let mut lines = Vec::new();
    for category in CATEGORIES {
        lines.push(Line::from(Span::styled(
            category.label().to_string(),
            Style::default().add_modifier(Modifier::BOLD),
        )));
        for descriptor in registry.all().iter().filter(|d| d.category == category) {
            let keys = keymap
                .keys_for_action(descriptor.action)
                .map(|keys| keys.join(", "))
                .unwrap_or_else(|| "-".to_string());
            lines.push(Line::from(vec![
                Span::styled(format!("  {keys:<20}"), key_style),
                Span::raw(descriptor.description.to_string()),
            ]));
        }
        lines.push(Line::default());
    }
    lines
}

/// Calculates a centered rectangle of the given percentage size within the parent area.
fn centered_rect(percent_x: u16, percent_y: u16, area: Rect) -> Rect {
    let vertical = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage((100 - percent_y) / 2),
            Constraint::Percentage(percent_y),
            Constraint::Percentage((100 - percent_y) / 2),
        ])
        .split(area);

    Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage((100 - percent_x) / 2),
            Constraint::Percentage(percent_x),
            Constraint::Percentage((100 - percent_x) / 2),
        ])
        .split(vertical[1])[1]
}
