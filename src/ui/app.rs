use crate::config::UIConfig;
use crate::error::AppError;
use crate::error_translation::ErrorTranslator;
use crate::git::{CommitMessage, PipelineReport};
use crate::session::{Action, Session, Task, TaskOutput};
use crate::ui::branch_list::{BranchCursor, BranchList};
use crate::ui::branches_panel::{BranchAction, BranchesPanel, PanelCommand};
use crate::ui::changes_panel::ChangesPanel;
use crate::ui::help::HelpScreen;
use crate::ui::input::InputWidget;
use crate::ui::output::OutputDisplay;
use crate::ui::switch_confirm;
use crate::worker::{TaskEvent, Worker};
use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind};
use ratatui::{
    backend::Backend,
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Style},
    widgets::{Block, Borders, Paragraph},
    Frame, Terminal,
};
use std::io;
use std::time::Duration;

/// Which main-panel element receives keys
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Focus {
    Branches,
    Summary,
    Description,
}

impl Focus {
    fn next(self) -> Self {
        match self {
            Focus::Branches => Focus::Summary,
            Focus::Summary => Focus::Description,
            Focus::Description => Focus::Branches,
        }
    }
}

/// Main application state
pub struct App {
    session: Session,
    worker: Worker,
    should_quit: bool,
    focus: Focus,

    // Widgets
    summary: InputWidget,
    description: InputWidget,
    output: OutputDisplay,
    cursor: BranchCursor,
    branches_panel: BranchesPanel,
    help: HelpScreen,

    status: Option<String>,
    tick_rate: Duration,
    max_files_display: usize,
}

impl App {
    pub fn new(session: Session, ui: &UIConfig) -> Self {
        let worker = Worker::new(session.context().clone());

        Self {
            session,
            worker,
            should_quit: false,
            focus: Focus::Branches,
            summary: InputWidget::new("Summary"),
            description: InputWidget::new("Description").multiline(),
            output: OutputDisplay::new(),
            cursor: BranchCursor::default(),
            branches_panel: BranchesPanel::new(),
            help: HelpScreen::new(),
            status: None,
            tick_rate: Duration::from_millis(ui.tick_rate_ms),
            max_files_display: ui.max_files_display,
        }
    }

    /// Run the application event loop
    pub async fn run<B: Backend>(&mut self, terminal: &mut Terminal<B>) -> io::Result<()> {
        self.start(self.session.plan_refresh());

        loop {
            while let Some(event) = self.worker.try_recv() {
                self.handle_task_event(event);
            }

            terminal.draw(|f| self.render(f))?;

            if event::poll(self.tick_rate)?
                && let Event::Key(key) = event::read()?
            {
                self.handle_key_event(key);
            }

            if self.should_quit {
                self.worker.cancel();
                break;
            }
        }

        Ok(())
    }

    /// Check if the app should quit
    pub fn should_quit(&self) -> bool {
        self.should_quit
    }

    fn set_focus(&mut self, focus: Focus) {
        self.focus = focus;
        self.summary.set_active(focus == Focus::Summary);
        self.description.set_active(focus == Focus::Description);
    }

    fn start(&mut self, task: Task) {
        let label = task.label();
        if self.worker.spawn(task) {
            self.status = None;
        } else {
            self.status = Some(format!("Busy, '{}' was not started", label));
        }
    }

    fn start_planned<E: Into<AppError>>(&mut self, planned: Result<Task, E>) {
        match planned {
            Ok(task) => self.start(task),
            Err(e) => self.show_error(&e.into()),
        }
    }

    fn show_error(&mut self, error: &AppError) {
        let friendly = ErrorTranslator::translate_app_error(error);
        self.status = Some(friendly.simple_message.clone());
        self.output.set_error(friendly);
    }

    fn handle_task_event(&mut self, event: TaskEvent) {
        let TaskEvent::Finished { label, result } = event;

        match result {
            Ok(output) => {
                let committed = matches!(
                    output,
                    TaskOutput::Completed {
                        action: Action::CommitAndPush,
                        ..
                    }
                );

                let already_on = match output {
                    TaskOutput::AlreadyOn(ref branch) => Some(branch.clone()),
                    _ => None,
                };

                let reports = self.session.apply(output);
                let succeeded = reports.iter().all(PipelineReport::succeeded);
                if !reports.is_empty() {
                    self.output.set_reports(reports);
                }
                if committed && succeeded {
                    self.summary.clear();
                    self.description.clear();
                }

                self.cursor
                    .sync(self.session.branches(), self.session.selected());
                self.status = Some(match (self.session.pending_switch(), already_on) {
                    (Some(switch), _) => format!("Local changes on {}: bring or leave them?", switch.from),
                    (None, Some(branch)) => format!("Already on {}", branch),
                    (None, None) => format!("{}: done", label),
                });
            }
            Err(e) => self.show_error(&e),
        }
    }

    /// Handle keyboard events
    fn handle_key_event(&mut self, key: KeyEvent) {
        // Only handle key press events (not release or repeat)
        if key.kind != KeyEventKind::Press {
            return;
        }

        if self.help.visible {
            if matches!(key.code, KeyCode::Char('?') | KeyCode::Esc) {
                self.help.hide();
            }
            return;
        }

        if self.session.pending_switch().is_some() {
            self.handle_switch_key(key);
            return;
        }

        if self.branches_panel.visible {
            self.handle_branches_panel_key(key);
            return;
        }

        match key.code {
            KeyCode::Esc => {
                if !self.worker.cancel() {
                    self.set_focus(Focus::Branches);
                }
            }
            KeyCode::Tab => self.set_focus(self.focus.next()),
            KeyCode::PageUp => self.output.scroll_up(),
            KeyCode::PageDown => self.output.scroll_down(),
            _ => match self.focus {
                Focus::Branches => self.handle_branch_list_key(key),
                Focus::Summary => {
                    self.summary.handle_key(key);
                }
                Focus::Description => {
                    self.description.handle_key(key);
                }
            },
        }
    }

    fn handle_switch_key(&mut self, key: KeyEvent) {
        if self.worker.is_busy() {
            return;
        }
        if let Some(resolution) = switch_confirm::resolution_for_key(key) {
            match self.session.plan_resolution(resolution) {
                Ok(Some(task)) => self.start(task),
                Ok(None) => self.status = Some("Switch cancelled".to_string()),
                Err(e) => self.show_error(&e.into()),
            }
        }
    }

    fn handle_branches_panel_key(&mut self, key: KeyEvent) {
        if let PanelCommand::Submit { action, name } = self.branches_panel.handle_key(key) {
            let planned = match action {
                BranchAction::Add => self.session.plan_add_branch(&name),
                BranchAction::Remove => self.session.plan_remove_branch(&name),
            };
            self.start_planned(planned);
        }
    }

    fn handle_branch_list_key(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Char('q') | KeyCode::Char('Q') => self.should_quit = true,
            KeyCode::Char('?') => self.help.toggle(),
            KeyCode::Up | KeyCode::Char('k') => self.cursor.up(),
            KeyCode::Down | KeyCode::Char('j') => self.cursor.down(self.session.branches().len()),
            KeyCode::Char('b') => self.branches_panel.open(BranchAction::Add),
            KeyCode::Char('r') => self.start(self.session.plan_refresh()),
            KeyCode::Char('g') => self.start(self.session.plan_get_changes()),
            KeyCode::Char('f') => self.start_planned(self.session.plan_fetch_and_pull()),
            KeyCode::Char('c') => {
                let message = CommitMessage::new(self.summary.get_input(), self.description.get_input());
                self.start_planned(self.session.plan_commit(&message));
            }
            KeyCode::Enter => {
                let Some(target) = self.cursor.current(self.session.branches()).map(str::to_string) else {
                    return;
                };
                self.start_planned(self.session.plan_checkout(&target));
            }
            _ => {}
        }
    }

    /// Render the UI
    fn render(&self, frame: &mut Frame) {
        let size = frame.area();

        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(3),  // Title
                Constraint::Min(10),    // Branches + commit form + changes
                Constraint::Length(12), // Output
                Constraint::Length(1),  // Status
            ])
            .split(size);

        let title = format!(
            "gitpanel - {} - on {}",
            self.session.repo().path().display(),
            self.session.selected().unwrap_or("(no branch)")
        );
        frame.render_widget(Block::default().title(title).borders(Borders::ALL), chunks[0]);

        let body = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Percentage(30), Constraint::Percentage(70)])
            .split(chunks[1]);

        BranchList::new(
            self.session.branches(),
            self.session.selected(),
            self.cursor.index(),
            self.focus == Focus::Branches,
        )
        .render(body[0], frame.buffer_mut());

        let form = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(3),
                Constraint::Length(6),
                Constraint::Min(3),
            ])
            .split(body[1]);

        frame.render_widget(&self.summary, form[0]);
        frame.render_widget(&self.description, form[1]);

        frame.render_widget(
            ChangesPanel::new(self.session.changes(), self.max_files_display),
            form[2],
        );

        frame.render_widget(&self.output, chunks[2]);

        let (status_text, status_style) = if let Some(label) = self.worker.current_label() {
            (format!("⏳ {}... | Esc: cancel", label), Style::default().fg(Color::Yellow))
        } else if let Some(ref status) = self.status {
            (status.clone(), Style::default().fg(Color::Cyan))
        } else {
            (
                "Enter: checkout | c: commit & push | f: fetch & pull | g: get changes | r: refresh | b: branches | ?: help | q: quit"
                    .to_string(),
                Style::default(),
            )
        };
        frame.render_widget(Paragraph::new(status_text).style(status_style), chunks[3]);

        if self.branches_panel.visible {
            self.branches_panel.render(frame, centered_rect(60, 9, size));
        }

        if let Some(switch) = self.session.pending_switch() {
            switch_confirm::render(frame, centered_rect(70, 9, size), switch);
        }

        if self.help.visible {
            self.help.render(frame, centered_rect(80, 30, size));
        }
    }
}

/// A `percent_x` wide, `height` tall rectangle centered in `area`
fn centered_rect(percent_x: u16, height: u16, area: Rect) -> Rect {
    let height = height.min(area.height);
    let vertical = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length((area.height - height) / 2),
            Constraint::Length(height),
            Constraint::Min(0),
        ])
        .split(area);

    Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage((100 - percent_x) / 2),
            Constraint::Percentage(percent_x),
            Constraint::Min(0),
        ])
        .split(vertical[1])[1]
}
