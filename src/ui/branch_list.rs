use ratatui::{
    buffer::Buffer,
    layout::Rect,
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, List, ListItem, ListState, StatefulWidget},
};

/// Cursor over the remote branch list, independent of the checked-out branch
#[derive(Debug, Default)]
pub struct BranchCursor {
    index: usize,
}

impl BranchCursor {
    pub fn index(&self) -> usize {
        self.index
    }

    pub fn up(&mut self) {
        self.index = self.index.saturating_sub(1);
    }

    pub fn down(&mut self, len: usize) {
        if self.index + 1 < len {
            self.index += 1;
        }
    }

    /// Keep the cursor inside a list of `len`, moving it to `selected` when given
    pub fn sync(&mut self, branches: &[String], selected: Option<&str>) {
        if let Some(pos) = selected.and_then(|s| branches.iter().position(|b| b == s)) {
            self.index = pos;
        } else if self.index >= branches.len() {
            self.index = branches.len().saturating_sub(1);
        }
    }

    pub fn current<'a>(&self, branches: &'a [String]) -> Option<&'a str> {
        branches.get(self.index).map(String::as_str)
    }
}

/// Branch list widget; the checked-out branch is marked with `*`
pub struct BranchList<'a> {
    branches: &'a [String],
    selected: Option<&'a str>,
    cursor: usize,
    focused: bool,
}

impl<'a> BranchList<'a> {
    pub fn new(branches: &'a [String], selected: Option<&'a str>, cursor: usize, focused: bool) -> Self {
        Self {
            branches,
            selected,
            cursor,
            focused,
        }
    }

    pub fn render(self, area: Rect, buf: &mut Buffer) {
        let items: Vec<ListItem> = self
            .branches
            .iter()
            .map(|branch| {
                let is_selected = self.selected == Some(branch.as_str());
                let (marker, style) = if is_selected {
                    ("* ", Style::default().fg(Color::Green).add_modifier(Modifier::BOLD))
                } else {
                    ("  ", Style::default())
                };
                ListItem::new(Line::from(vec![
                    Span::styled(marker, style),
                    Span::styled(branch.as_str(), style),
                ]))
            })
            .collect();

        let border = if self.focused { Color::Yellow } else { Color::DarkGray };
        let title = format!("Branches ({})", self.branches.len());
        let list = List::new(items)
            .block(
                Block::default()
                    .borders(Borders::ALL)
                    .title(title)
                    .border_style(Style::default().fg(border)),
            )
            .highlight_style(Style::default().add_modifier(Modifier::REVERSED));

        let mut state = ListState::default();
        if !self.branches.is_empty() {
            state.select(Some(self.cursor));
        }
        StatefulWidget::render(list, area, buf, &mut state);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn names(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_cursor_bounds() {
        let mut cursor = BranchCursor::default();
        cursor.up();
        assert_eq!(cursor.index(), 0);

        cursor.down(2);
        cursor.down(2);
        assert_eq!(cursor.index(), 1);
    }

    #[test]
    fn test_sync_follows_selection() {
        let branches = names(&["develop", "main", "feature"]);
        let mut cursor = BranchCursor::default();

        cursor.sync(&branches, Some("feature"));
        assert_eq!(cursor.current(&branches), Some("feature"));
    }

    #[test]
    fn test_sync_clamps_after_shrink() {
        let mut cursor = BranchCursor::default();
        cursor.sync(&names(&["a", "b", "c"]), Some("c"));
        assert_eq!(cursor.index(), 2);

        let shorter = names(&["a"]);
        cursor.sync(&shorter, None);
        assert_eq!(cursor.current(&shorter), Some("a"));

        cursor.sync(&[], None);
        assert_eq!(cursor.current(&[]), None);
    }
}
