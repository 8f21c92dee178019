use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph, Wrap},
    Frame,
};

const MAIN_KEYS: &[(&str, &str)] = &[
    ("Tab", "Cycle focus: branches, summary, description"),
    ("↑/↓", "Move through the branch list"),
    ("Enter", "Check out the highlighted branch"),
    ("g", "Get changes (stages everything)"),
    ("c", "Commit & push to the selected branch"),
    ("f", "Fetch & pull the selected branch"),
    ("r", "Refresh the branch list from GitHub"),
    ("b", "Add or remove a branch"),
    ("PgUp/PgDn", "Scroll the output"),
    ("Esc", "Cancel the running operation / back to branches"),
    ("?", "Show/hide this help"),
    ("q", "Quit"),
];

const SWITCH_KEYS: &[(&str, &str)] = &[
    ("b", "Bring changes to the new branch"),
    ("l", "Leave changes parked on the current branch"),
    ("Esc", "Stay on the current branch"),
];

fn key_lines(keys: &[(&'static str, &'static str)]) -> Vec<Line<'static>> {
    keys.iter()
        .map(|(key, action)| {
            Line::from(vec![
                Span::styled(format!("  {:<11}", key), Style::default().fg(Color::Cyan)),
                Span::raw(*action),
            ])
        })
        .collect()
}

fn heading(text: &'static str) -> Line<'static> {
    Line::from(Span::styled(
        text,
        Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD),
    ))
}

pub struct HelpScreen {
    pub visible: bool,
}

impl HelpScreen {
    pub fn new() -> Self {
        HelpScreen { visible: false }
    }

    pub fn toggle(&mut self) {
        self.visible = !self.visible;
    }

    pub fn hide(&mut self) {
        self.visible = false;
    }

    pub fn render(&self, frame: &mut Frame, area: Rect) {
        let block = Block::default()
            .title(" gitpanel help ")
            .title_alignment(Alignment::Center)
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::Cyan))
            .style(Style::default().bg(Color::Black));

        let inner = block.inner(area);
        frame.render_widget(Clear, area);
        frame.render_widget(block, area);

        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .margin(1)
            .constraints([
                Constraint::Length(MAIN_KEYS.len() as u16 + 2),
                Constraint::Length(SWITCH_KEYS.len() as u16 + 2),
                Constraint::Min(0),
            ])
            .split(inner);

        let mut main = vec![heading("Main panel:"), Line::from("")];
        main.extend(key_lines(MAIN_KEYS));
        frame.render_widget(Paragraph::new(main).wrap(Wrap { trim: false }), chunks[0]);

        let mut switch = vec![heading("Switching with local changes:"), Line::from("")];
        switch.extend(key_lines(SWITCH_KEYS));
        frame.render_widget(Paragraph::new(switch).wrap(Wrap { trim: false }), chunks[1]);

        let files = vec![
            heading("Files:"),
            Line::from(vec![
                Span::styled("  Config file:  ", Style::default().fg(Color::Cyan)),
                Span::raw("~/.config/gitpanel/config.toml"),
            ]),
            Line::from(vec![
                Span::styled("  History:      ", Style::default().fg(Color::Cyan)),
                Span::raw("~/.config/gitpanel/history.log"),
            ]),
            Line::from(vec![
                Span::styled("  Log:          ", Style::default().fg(Color::Cyan)),
                Span::raw("~/.config/gitpanel/gitpanel.log"),
            ]),
            Line::from(""),
            Line::from(Span::styled(
                "Press '?' or Esc to close this help screen",
                Style::default().fg(Color::DarkGray).add_modifier(Modifier::ITALIC),
            )),
        ];
        frame.render_widget(Paragraph::new(files).wrap(Wrap { trim: false }), chunks[2]);
    }
}

impl Default for HelpScreen {
    fn default() -> Self {
        Self::new()
    }
}
