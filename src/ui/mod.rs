pub mod app;
pub mod branch_list;
pub mod branches_panel;
pub mod changes_panel;
pub mod help;
pub mod input;
pub mod output;
pub mod switch_confirm;

pub use app::App;
pub use branch_list::{BranchCursor, BranchList};
pub use branches_panel::{BranchAction, BranchesPanel, PanelCommand};
pub use changes_panel::ChangesPanel;
pub use help::HelpScreen;
pub use input::InputWidget;
pub use output::OutputDisplay;
