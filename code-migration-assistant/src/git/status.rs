//! Working tree status counting.

use serde::Serialize;

/// Category of working tree entries to count.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FileStatus {
    /// Changes recorded in the index.
    Staged,
    /// Tracked files changed in the working tree but not staged.
    Modified,
    /// Files git does not track.
    Untracked,
    /// Modified plus untracked.
    Unstaged,
}

/// Entry counts parsed from `git status --porcelain`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StatusCounts {
    pub staged: usize,
    pub modified: usize,
    pub untracked: usize,
}

impl StatusCounts {
    /// Parses porcelain v1 output.
    ///
    /// An entry changed both in the index and in the working tree counts as
    /// staged and as modified.
    #[must_use]
    pub fn parse(porcelain: &str) -> Self {
        let mut counts = Self::default();

        for line in porcelain.lines() {
            let mut codes = line.chars();
            let (Some(index), Some(worktree)) = (codes.next(), codes.next()) else {
                continue;
            };

            match (index, worktree) {
                ('?', '?') => counts.untracked += 1,
                ('!', '!') => {}
                _ => {
                    if index != ' ' {
                        counts.staged += 1;
                    }
                    if worktree != ' ' {
                        counts.modified += 1;
                    }
                }
            }
        }

        counts
    }

    /// Returns the number of entries in the given category.
    #[must_use]
    pub fn count(&self, status: FileStatus) -> usize {
        match status {
            FileStatus::Staged => self.staged,
            FileStatus::Modified => self.modified,
            FileStatus::Untracked => self.untracked,
            FileStatus::Unstaged => self.modified + self.untracked,
        }
    }
}
