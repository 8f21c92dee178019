use crate::session::{PendingSwitch, SwitchResolution};
use crossterm::event::{KeyCode, KeyEvent};
use ratatui::{
    layout::Rect,
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph, Wrap},
    Frame,
};

/// Map a key in the confirmation popup to a resolution
pub fn resolution_for_key(key: KeyEvent) -> Option<SwitchResolution> {
    match key.code {
        KeyCode::Char('b') | KeyCode::Char('B') => Some(SwitchResolution::Bring),
        KeyCode::Char('l') | KeyCode::Char('L') => Some(SwitchResolution::Leave),
        KeyCode::Esc => Some(SwitchResolution::Cancel),
        _ => None,
    }
}

/// Popup asking what to do with uncommitted work before a checkout
pub fn render(frame: &mut Frame, area: Rect, switch: &PendingSwitch) {
    let branch = Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD);
    let key = Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD);

    let lines = vec![
        Line::from(vec![
            Span::raw("You have local changes on "),
            Span::styled(switch.from.as_str(), branch),
            Span::raw("."),
        ]),
        Line::from(""),
        Line::from(vec![
            Span::styled("  b ", key),
            Span::raw("Bring changes to "),
            Span::styled(switch.to.as_str(), branch),
        ]),
        Line::from(vec![
            Span::styled("  l ", key),
            Span::raw("Leave changes on "),
            Span::styled(switch.from.as_str(), branch),
            Span::raw(" (restored when you come back)"),
        ]),
        Line::from(vec![Span::styled("  Esc ", key), Span::raw("Cancel")]),
    ];

    let block = Block::default()
        .title(" Switch branch ")
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Yellow));

    frame.render_widget(Clear, area);
    frame.render_widget(
        Paragraph::new(lines).block(block).wrap(Wrap { trim: false }),
        area,
    );
}
