use crate::github::types::RepoCoordinates;

/// Parse owner and repository name out of a remote URL.
///
/// Accepts `https://host/owner/repo(.git)`, `ssh://git@host/owner/repo(.git)`
/// and the scp-like `git@host:owner/repo(.git)`. Returns `None` for local
/// paths and anything without both segments.
pub fn parse_github_remote(url: &str) -> Option<RepoCoordinates> {
    let url = url.trim();

    let path = if let Some((scheme, rest)) = url.split_once("://") {
        if scheme.eq_ignore_ascii_case("file") {
            return None;
        }
        // Drop the authority (user@host:port)
        rest.split_once('/')?.1
    } else if let Some((authority, rest)) = url.split_once(':') {
        // scp-like syntax needs a host before the colon and no slash in it
        if authority.is_empty() || authority.contains('/') {
            return None;
        }
        rest
    } else {
        return None;
    };

    let mut segments = path.trim_matches('/').rsplit('/');
    let repo = segments.next()?;
    let owner = segments.next()?;

    let repo = repo.strip_suffix(".git").unwrap_or(repo);
    if owner.is_empty() || repo.is_empty() {
        return None;
    }

    Some(RepoCoordinates::new(owner, repo))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn coords(url: &str) -> Option<(String, String)> {
        parse_github_remote(url).map(|c| (c.owner, c.repo))
    }

    #[test]
    fn test_https_remote() {
        assert_eq!(
            coords("https://github.com/acme/game.git"),
            Some(("acme".to_string(), "game".to_string()))
        );
        assert_eq!(
            coords("https://github.com/acme/game"),
            Some(("acme".to_string(), "game".to_string()))
        );
        assert_eq!(
            coords("https://token@github.com/acme/game.git\n"),
            Some(("acme".to_string(), "game".to_string()))
        );
    }

    #[test]
    fn test_ssh_remotes() {
        assert_eq!(
            coords("git@github.com:acme/game.git"),
            Some(("acme".to_string(), "game".to_string()))
        );
        assert_eq!(
            coords("ssh://git@github.com:22/acme/game.git"),
            Some(("acme".to_string(), "game".to_string()))
        );
    }

    #[test]
    fn test_enterprise_host() {
        assert_eq!(
            coords("https://git.example.com/studio/tools.git"),
            Some(("studio".to_string(), "tools".to_string()))
        );
    }

    #[test]
    fn test_unparseable_remotes() {
        assert_eq!(coords("/srv/git/game.git"), None);
        assert_eq!(coords("../origin.git"), None);
        assert_eq!(coords("https://github.com/"), None);
        assert_eq!(coords("git@github.com:game.git"), None);
        assert_eq!(coords(""), None);
    }
}
