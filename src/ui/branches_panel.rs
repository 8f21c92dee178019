use crate::ui::input::InputWidget;
use crossterm::event::{KeyCode, KeyEvent};
use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph},
    Frame,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BranchAction {
    Add,
    Remove,
}

impl BranchAction {
    fn toggled(self) -> Self {
        match self {
            BranchAction::Add => BranchAction::Remove,
            BranchAction::Remove => BranchAction::Add,
        }
    }
}

/// What the app should do after a key in the branch panel
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PanelCommand {
    None,
    Close,
    Submit { action: BranchAction, name: String },
}

/// Popup for creating or deleting a branch
pub struct BranchesPanel {
    pub visible: bool,
    action: BranchAction,
    name: InputWidget,
}

impl BranchesPanel {
    pub fn new() -> Self {
        let mut name = InputWidget::new("Branch name");
        name.set_active(true);
        Self {
            visible: false,
            action: BranchAction::Add,
            name,
        }
    }

    /// Show the panel with an empty name field
    pub fn open(&mut self, action: BranchAction) {
        self.visible = true;
        self.action = action;
        self.name.clear();
    }

    pub fn close(&mut self) {
        self.visible = false;
        self.name.clear();
    }

    pub fn action(&self) -> BranchAction {
        self.action
    }

    pub fn handle_key(&mut self, key: KeyEvent) -> PanelCommand {
        match key.code {
            KeyCode::Esc => {
                self.close();
                PanelCommand::Close
            }
            KeyCode::Tab => {
                self.action = self.action.toggled();
                PanelCommand::None
            }
            KeyCode::Enter => {
                let name = self.name.get_input().trim().to_string();
                if name.is_empty() {
                    return PanelCommand::None;
                }
                self.close();
                PanelCommand::Submit {
                    action: self.action,
                    name,
                }
            }
            _ => {
                self.name.handle_key(key);
                PanelCommand::None
            }
        }
    }

    pub fn render(&self, frame: &mut Frame, area: Rect) {
        let (title, color) = match self.action {
            BranchAction::Add => (" Add branch ", Color::Green),
            BranchAction::Remove => (" Remove branch ", Color::Red),
        };

        let block = Block::default()
            .title(title)
            .borders(Borders::ALL)
            .border_style(Style::default().fg(color));
        let inner = block.inner(area);

        frame.render_widget(Clear, area);
        frame.render_widget(block, area);

        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(1),
                Constraint::Length(3),
                Constraint::Min(1),
            ])
            .split(inner);

        let tab = |action: BranchAction, label: &'static str| {
            if action == self.action {
                Span::styled(
                    format!("[{}]", label),
                    Style::default().fg(color).add_modifier(Modifier::BOLD),
                )
            } else {
                Span::styled(format!(" {} ", label), Style::default().fg(Color::DarkGray))
            }
        };
        let tabs = Line::from(vec![
            tab(BranchAction::Add, "Add"),
            Span::raw(" "),
            tab(BranchAction::Remove, "Remove"),
        ]);
        frame.render_widget(Paragraph::new(tabs), chunks[0]);

        frame.render_widget(&self.name, chunks[1]);

        let hint = match self.action {
            BranchAction::Add => "Enter: create and push | Tab: switch to remove | Esc: close",
            BranchAction::Remove => "Enter: delete locally, then on remote | Tab: switch to add | Esc: close",
        };
        frame.render_widget(
            Paragraph::new(hint).style(Style::default().fg(Color::DarkGray)),
            chunks[2],
        );
    }
}

impl Default for BranchesPanel {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crossterm::event::KeyModifiers;

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    #[test]
    fn test_tab_toggles_action() {
        let mut panel = BranchesPanel::new();
        panel.open(BranchAction::Add);

        assert_eq!(panel.handle_key(key(KeyCode::Tab)), PanelCommand::None);
        assert_eq!(panel.action(), BranchAction::Remove);
        panel.handle_key(key(KeyCode::Tab));
        assert_eq!(panel.action(), BranchAction::Add);
    }

    #[test]
    fn test_submit_trims_and_closes() {
        let mut panel = BranchesPanel::new();
        panel.open(BranchAction::Remove);
        for c in " old ".chars() {
            panel.handle_key(key(KeyCode::Char(c)));
        }

        assert_eq!(
            panel.handle_key(key(KeyCode::Enter)),
            PanelCommand::Submit {
                action: BranchAction::Remove,
                name: "old".to_string()
            }
        );
        assert!(!panel.visible);
    }

    #[test]
    fn test_empty_name_not_submitted() {
        let mut panel = BranchesPanel::new();
        panel.open(BranchAction::Add);

        assert_eq!(panel.handle_key(key(KeyCode::Enter)), PanelCommand::None);
        assert!(panel.visible);
    }

    #[test]
    fn test_escape_closes() {
        let mut panel = BranchesPanel::new();
        panel.open(BranchAction::Add);

        assert_eq!(panel.handle_key(key(KeyCode::Esc)), PanelCommand::Close);
        assert!(!panel.visible);
    }
}
