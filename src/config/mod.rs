pub mod settings;

pub use settings::{BehaviorConfig, Config, ConfigError, GitConfig, GitHubConfig, UIConfig};
