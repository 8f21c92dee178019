use crate::git::operations::PARK_MARKER;

/// Parse `git diff --name-status` output into added/modified/deleted buckets.
///
/// Classification uses the first character of each line; the status letter
/// and the separator after it are stripped. Other status letters (renames,
/// copies, type changes, unmerged) are dropped.
pub fn parse_name_status(output: &str) -> ChangeSet {
    let mut changes = ChangeSet::default();

    for line in output.lines() {
        let mut chars = line.chars();
        let kind = match chars.next() {
            Some('A') => ChangeKind::Added,
            Some('M') => ChangeKind::Modified,
            Some('D') => ChangeKind::Deleted,
            _ => continue,
        };

        let path = chars.as_str().trim_start_matches(['\t', ' ']);
        if path.is_empty() {
            continue;
        }

        changes.push(ChangeEntry {
            kind,
            path: path.to_string(),
        });
    }

    changes
}

/// Parse git stash list output with format %gd%x00%s
pub fn parse_stash_list(output: &str) -> Vec<StashEntry> {
    let mut stashes = Vec::new();

    for line in output.lines() {
        if line.is_empty() {
            continue;
        }

        let parts: Vec<&str> = line.splitn(2, '\0').collect();
        if parts.len() == 2 {
            stashes.push(StashEntry {
                index: parts[0].to_string(),
                message: parts[1].to_string(),
            });
        }
    }

    stashes
}

/// Change kinds the panel tracks
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ChangeKind {
    Added,
    Modified,
    Deleted,
}

impl ChangeKind {
    pub fn label(self) -> &'static str {
        match self {
            ChangeKind::Added => "Added",
            ChangeKind::Modified => "Modified",
            ChangeKind::Deleted => "Deleted",
        }
    }
}

/// A file path tagged with how it changed
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChangeEntry {
    pub kind: ChangeKind,
    pub path: String,
}

/// Local changes grouped by kind, each bucket in report order
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ChangeSet {
    pub added: Vec<String>,
    pub modified: Vec<String>,
    pub deleted: Vec<String>,
}

impl ChangeSet {
    pub fn push(&mut self, entry: ChangeEntry) {
        match entry.kind {
            ChangeKind::Added => self.added.push(entry.path),
            ChangeKind::Modified => self.modified.push(entry.path),
            ChangeKind::Deleted => self.deleted.push(entry.path),
        }
    }

    pub fn bucket(&self, kind: ChangeKind) -> &[String] {
        match kind {
            ChangeKind::Added => &self.added,
            ChangeKind::Modified => &self.modified,
            ChangeKind::Deleted => &self.deleted,
        }
    }

    pub fn len(&self) -> usize {
        self.added.len() + self.modified.len() + self.deleted.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Represents a stash entry
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StashEntry {
    pub index: String,
    pub message: String,
}

impl StashEntry {
    /// True if this stash holds work parked on `branch`
    pub fn is_parked_for(&self, branch: &str) -> bool {
        self.message
            .strip_suffix(branch)
            .is_some_and(|rest| rest.ends_with(PARK_MARKER))
    }
}
