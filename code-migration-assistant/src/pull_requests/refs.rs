//! Branch reference normalization.

const HEADS_PREFIX: &str = "refs/heads/";

/// Returns the fully qualified form of a branch name.
///
/// Already qualified names are returned unchanged.
#[must_use]
pub fn normalize_branch_ref(branch: &str) -> String {
    let branch = branch.trim();
    if branch.starts_with(HEADS_PREFIX) {
        branch.to_string()
    } else {
        format!("{HEADS_PREFIX}{branch}")
    }
}

/// Returns the branch name without its `refs/heads/` prefix.
#[must_use]
pub fn short_branch_name(branch: &str) -> &str {
    let branch = branch.trim();
    branch.strip_prefix(HEADS_PREFIX).unwrap_or(branch)
}

/// Whether two branch references name the same branch.
#[must_use]
pub fn same_branch(a: &str, b: &str) -> bool {
    normalize_branch_ref(a) == normalize_branch_ref(b)
}
