use thiserror::Error;

/// Characters git refuses anywhere in a ref name
const FORBIDDEN_CHARS: &[char] = &[' ', '~', '^', ':', '?', '*', '[', '\\'];

#[derive(Debug, Error, PartialEq)]
pub enum ValidationError {
    #[error("Branch name is empty")]
    EmptyBranchName,

    #[error("Branch name must not start with '-': {0}")]
    LeadingDash(String),

    #[error("Branch name contains forbidden character {found:?}: {name}")]
    ForbiddenCharacter { name: String, found: char },

    #[error("Branch name contains forbidden sequence {found:?}: {name}")]
    ForbiddenSequence { name: String, found: &'static str },

    #[error("Branch name has an invalid component: {0}")]
    InvalidComponent(String),

    #[error("Branch name has an invalid ending: {0}")]
    InvalidEnding(String),
}

/// Check a branch name against git's ref naming rules before it reaches argv.
///
/// Mirrors `git check-ref-format --branch`, plus rejecting a leading `-`
/// so a name can never be read as an option.
pub fn validate_branch_name(name: &str) -> Result<(), ValidationError> {
    if name.is_empty() {
        return Err(ValidationError::EmptyBranchName);
    }

    if name.starts_with('-') {
        return Err(ValidationError::LeadingDash(name.to_string()));
    }

    if name == "@" {
        return Err(ValidationError::InvalidComponent(name.to_string()));
    }

    if let Some(found) = name
        .chars()
        .find(|c| c.is_control() || FORBIDDEN_CHARS.contains(c))
    {
        return Err(ValidationError::ForbiddenCharacter {
            name: name.to_string(),
            found,
        });
    }

    for seq in ["..", "@{", "//"] {
        if name.contains(seq) {
            return Err(ValidationError::ForbiddenSequence {
                name: name.to_string(),
                found: seq,
            });
        }
    }

    if name.starts_with('/') || name.split('/').any(|c| c.starts_with('.') || c.ends_with(".lock")) {
        return Err(ValidationError::InvalidComponent(name.to_string()));
    }

    if name.ends_with('/') || name.ends_with('.') {
        return Err(ValidationError::InvalidEnding(name.to_string()));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_valid_names() {
        for name in [
            "main",
            "feature/inventory",
            "fix-123",
            "release/2024.1",
            "user/alex/experiment",
            "$(whoami)",
        ] {
            assert!(validate_branch_name(name).is_ok(), "should accept {}", name);
        }
    }

    #[test]
    fn test_empty_name() {
        assert_eq!(
            validate_branch_name(""),
            Err(ValidationError::EmptyBranchName)
        );
    }

    #[test]
    fn test_leading_dash() {
        assert!(matches!(
            validate_branch_name("--force"),
            Err(ValidationError::LeadingDash(_))
        ));
        assert!(matches!(
            validate_branch_name("-d"),
            Err(ValidationError::LeadingDash(_))
        ));
    }

    #[test]
    fn test_forbidden_characters() {
        for (name, ch) in [
            ("my branch", ' '),
            ("head~1", '~'),
            ("a^b", '^'),
            ("a:b", ':'),
            ("wh?", '?'),
            ("glob*", '*'),
            ("br[x]", '['),
            ("back\\slash", '\\'),
            ("tab\there", '\t'),
        ] {
            assert_eq!(
                validate_branch_name(name),
                Err(ValidationError::ForbiddenCharacter {
                    name: name.to_string(),
                    found: ch
                })
            );
        }
    }

    #[test]
    fn test_forbidden_sequences() {
        assert!(matches!(
            validate_branch_name("a..b"),
            Err(ValidationError::ForbiddenSequence { found: "..", .. })
        ));
        assert!(matches!(
            validate_branch_name("a@{1}"),
            Err(ValidationError::ForbiddenSequence { found: "@{", .. })
        ));
        assert!(matches!(
            validate_branch_name("a//b"),
            Err(ValidationError::ForbiddenSequence { found: "//", .. })
        ));
    }

    #[test]
    fn test_invalid_components_and_endings() {
        assert!(matches!(
            validate_branch_name("@"),
            Err(ValidationError::InvalidComponent(_))
        ));
        assert!(matches!(
            validate_branch_name(".hidden"),
            Err(ValidationError::InvalidComponent(_))
        ));
        assert!(matches!(
            validate_branch_name("feature/.x"),
            Err(ValidationError::InvalidComponent(_))
        ));
        assert!(matches!(
            validate_branch_name("topic.lock"),
            Err(ValidationError::InvalidComponent(_))
        ));
        assert!(matches!(
            validate_branch_name("/rooted"),
            Err(ValidationError::InvalidComponent(_))
        ));
        assert!(matches!(
            validate_branch_name("feature/"),
            Err(ValidationError::InvalidEnding(_))
        ));
        assert!(matches!(
            validate_branch_name("dot."),
            Err(ValidationError::InvalidEnding(_))
        ));
    }
}
