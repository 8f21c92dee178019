use crate::error_translation::{ErrorTranslator, UserFriendlyError};
use crate::git::PipelineReport;
use ratatui::{
    buffer::Buffer,
    layout::Rect,
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph, Widget, Wrap},
};

/// Output pane showing the reports of the last operation
pub struct OutputDisplay {
    reports: Vec<PipelineReport>,
    error: Option<UserFriendlyError>,
    scroll: usize,
}

impl OutputDisplay {
    pub fn new() -> Self {
        Self {
            reports: Vec::new(),
            error: None,
            scroll: 0,
        }
    }

    /// Replace the shown output with the reports of a finished operation
    pub fn set_reports(&mut self, reports: Vec<PipelineReport>) {
        self.reports = reports;
        self.error = None;
        self.scroll = 0;
    }

    /// Show an operation that failed before or while running
    pub fn set_error(&mut self, error: UserFriendlyError) {
        self.reports.clear();
        self.error = Some(error);
        self.scroll = 0;
    }

    pub fn clear(&mut self) {
        self.reports.clear();
        self.error = None;
        self.scroll = 0;
    }

    pub fn is_empty(&self) -> bool {
        self.reports.is_empty() && self.error.is_none()
    }

    pub fn scroll_up(&mut self) {
        self.scroll = self.scroll.saturating_sub(1);
    }

    pub fn scroll_down(&mut self) {
        self.scroll += 1;
    }

    fn succeeded(&self) -> bool {
        self.error.is_none() && self.reports.iter().all(PipelineReport::succeeded)
    }

    fn build_lines(&self) -> Vec<Line<'_>> {
        let mut lines = Vec::new();

        if let Some(ref error) = self.error {
            lines.push(Line::from(Span::styled(
                error.simple_message.as_str(),
                Style::default().fg(Color::Red).add_modifier(Modifier::BOLD),
            )));
            if let Some(ref suggestion) = error.suggestion {
                lines.push(Line::from(vec![
                    Span::styled("hint: ", Style::default().fg(Color::Cyan)),
                    Span::raw(suggestion.as_str()),
                ]));
            }
            if error.raw_error != error.simple_message {
                lines.push(Line::from(Span::styled(
                    error.raw_error.as_str(),
                    Style::default().fg(Color::DarkGray),
                )));
            }
            return lines;
        }

        for report in &self.reports {
            let (status, status_style) = if report.succeeded() {
                ("✓", Style::default().fg(Color::Green).add_modifier(Modifier::BOLD))
            } else {
                ("✗", Style::default().fg(Color::Red).add_modifier(Modifier::BOLD))
            };
            lines.push(Line::from(vec![
                Span::styled(status, status_style),
                Span::raw(" "),
                Span::styled(report.name.as_str(), Style::default().fg(Color::Cyan)),
            ]));

            for outcome in &report.outcomes {
                let command_style = if outcome.output.success {
                    Style::default().fg(Color::White)
                } else {
                    Style::default().fg(Color::Red)
                };
                lines.push(Line::from(vec![
                    Span::styled("$ ", Style::default().fg(Color::DarkGray)),
                    Span::styled(outcome.command.as_str(), command_style),
                ]));

                for line in outcome.output.stdout.lines() {
                    lines.push(Line::from(format!("  {}", line)));
                }
                for line in outcome.output.stderr.lines() {
                    lines.push(Line::from(Span::styled(
                        format!("  {}", line),
                        Style::default().fg(Color::Yellow),
                    )));
                }
            }

            for skipped in &report.skipped {
                lines.push(Line::from(Span::styled(
                    format!("skipped: {}", skipped),
                    Style::default().fg(Color::DarkGray),
                )));
            }

            for diagnosis in ErrorTranslator::diagnose(report) {
                lines.push(Line::from(Span::styled(
                    format!("! {}", diagnosis.simple_message),
                    Style::default().fg(Color::Red),
                )));
                if let Some(suggestion) = diagnosis.suggestion {
                    lines.push(Line::from(vec![
                        Span::styled("  hint: ", Style::default().fg(Color::Cyan)),
                        Span::raw(suggestion),
                    ]));
                }
            }

            lines.push(Line::from(""));
        }

        lines
    }
}

impl Default for OutputDisplay {
    fn default() -> Self {
        Self::new()
    }
}

impl Widget for &OutputDisplay {
    fn render(self, area: Rect, buf: &mut Buffer) {
        if self.is_empty() {
            let block = Block::default()
                .borders(Borders::ALL)
                .border_style(Style::default().fg(Color::DarkGray))
                .title("Output");

            Paragraph::new("No operation run yet")
                .style(Style::default().fg(Color::DarkGray))
                .block(block)
                .render(area, buf);
            return;
        }

        let border = if self.succeeded() { Color::Green } else { Color::Red };
        let block = Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(border))
            .title("Output (PgUp/PgDn to scroll)");

        let visible: Vec<_> = self.build_lines().into_iter().skip(self.scroll).collect();

        Paragraph::new(visible)
            .block(block)
            .wrap(Wrap { trim: false })
            .render(area, buf);
    }
}
