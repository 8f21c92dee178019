pub mod validator;

pub use validator::{ValidationError, validate_branch_name};
