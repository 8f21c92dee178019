use crate::git::{ChangeKind, ChangeSet};
use ratatui::{
    buffer::Buffer,
    layout::Rect,
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph, Widget},
};

/// Added / modified / deleted lists from the last "get changes"
pub struct ChangesPanel<'a> {
    changes: &'a ChangeSet,
    max_per_kind: usize,
}

impl<'a> ChangesPanel<'a> {
    pub fn new(changes: &'a ChangeSet, max_per_kind: usize) -> Self {
        Self {
            changes,
            max_per_kind,
        }
    }

    fn kind_style(kind: ChangeKind) -> (&'static str, Color) {
        match kind {
            ChangeKind::Added => ("new file:  ", Color::Green),
            ChangeKind::Modified => ("modified:  ", Color::Yellow),
            ChangeKind::Deleted => ("deleted:   ", Color::Red),
        }
    }

    /// Build the content lines for the panel
    fn build_content(&self) -> Vec<Line<'a>> {
        let mut lines = Vec::new();

        if self.changes.is_empty() {
            lines.push(Line::from(Span::styled(
                "No changes recorded. Press g to get changes.",
                Style::default().fg(Color::DarkGray),
            )));
            return lines;
        }

        for kind in [ChangeKind::Added, ChangeKind::Modified, ChangeKind::Deleted] {
            let files = self.changes.bucket(kind);
            if files.is_empty() {
                continue;
            }
            self.add_section(&mut lines, kind, files);
            lines.push(Line::from(""));
        }

        lines
    }

    fn add_section(&self, lines: &mut Vec<Line<'a>>, kind: ChangeKind, files: &'a [String]) {
        let (status_text, color) = Self::kind_style(kind);
        let count = files.len();

        lines.push(Line::from(Span::styled(
            format!("{} ({})", kind.label(), count),
            Style::default().fg(color).add_modifier(Modifier::BOLD),
        )));

        for file in files.iter().take(self.max_per_kind) {
            lines.push(Line::from(vec![
                Span::raw("  "),
                Span::styled(status_text, Style::default().fg(color)),
                Span::raw(file.as_str()),
            ]));
        }

        if count > self.max_per_kind {
            lines.push(Line::from(Span::styled(
                format!("  ... and {} more", count - self.max_per_kind),
                Style::default().fg(Color::DarkGray),
            )));
        }
    }
}

impl Widget for ChangesPanel<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let title = format!("Local changes ({})", self.changes.len());
        let block = Block::default().borders(Borders::ALL).title(title);

        Paragraph::new(self.build_content()).block(block).render(area, buf);
    }
}
