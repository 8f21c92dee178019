pub mod translator;

pub use translator::{ErrorTranslator, UserFriendlyError};
