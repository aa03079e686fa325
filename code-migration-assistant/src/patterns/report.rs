//! Match reporting.

use indexmap::IndexMap;
use serde::Serialize;
use std::collections::{BTreeMap, BTreeSet};

/// Matches of one pattern across a repository.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct PatternMatches {
    /// Total matches over all files.
    pub count: usize,
    /// Per-file match counts, keyed by path relative to the repository root.
    #[serde(rename = "match")]
    pub files: BTreeMap<String, usize>,
}

/// Matches of every configured pattern in one repository.
///
/// Serializes as `{pattern: {count, match: {file: n}}}` in pattern order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct MatchReport {
    #[serde(flatten)]
    patterns: IndexMap<String, PatternMatches>,
    #[serde(skip)]
    changed_files: BTreeSet<String>,
}

impl MatchReport {
    /// Creates a report with a zero entry for every pattern.
    pub fn new<'a>(patterns: impl IntoIterator<Item = &'a String>) -> Self {
        Self {
            patterns: patterns
                .into_iter()
                .map(|pattern| (pattern.clone(), PatternMatches::default()))
                .collect(),
            changed_files: BTreeSet::new(),
        }
    }

    /// Adds `count` matches of `pattern` in `file`.
    pub fn record(&mut self, pattern: &str, file: &str, count: usize) {
        if count == 0 {
            return;
        }
        let entry = self.patterns.entry(pattern.to_string()).or_default();
        entry.count += count;
        *entry.files.entry(file.to_string()).or_default() += count;
    }

    /// Notes that `file` was (or in a dry run would be) rewritten.
    pub fn record_changed(&mut self, file: &str) {
        self.changed_files.insert(file.to_string());
    }

    /// Matches of one pattern.
    #[must_use]
    pub fn get(&self, pattern: &str) -> Option<&PatternMatches> {
        self.patterns.get(pattern)
    }

    /// Iterates patterns in configuration order.
    pub fn iter(&self) -> impl Iterator<Item = (&String, &PatternMatches)> {
        self.patterns.iter()
    }

    /// Sum of all pattern counts.
    #[must_use]
    pub fn total(&self) -> usize {
        self.patterns.values().map(|m| m.count).sum()
    }

    /// Files whose content differs after substitution.
    #[must_use]
    pub fn changed_files(&self) -> &BTreeSet<String> {
        &self.changed_files
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn records_counts_per_file() {
        let patterns = vec!["foo".to_string(), "bar".to_string()];
        let mut report = MatchReport::new(&patterns);
        report.record("foo", "a.txt", 2);
        report.record("foo", "b/c.txt", 1);
        report.record("foo", "a.txt", 1);
        report.record("bar", "a.txt", 0);

        let foo = report.get("foo").unwrap();
        assert_eq!(foo.count, 4);
        assert_eq!(foo.files.get("a.txt"), Some(&3));
        assert_eq!(report.get("bar").unwrap().count, 0);
        assert!(report.get("bar").unwrap().files.is_empty());
        assert_eq!(report.total(), 4);
    }

    #[test]
    fn serializes_in_pattern_order() {
        let patterns = vec!["zeta".to_string(), "alpha".to_string()];
        let mut report = MatchReport::new(&patterns);
        report.record("alpha", "x.txt", 1);
        report.record_changed("x.txt");

        let json = serde_json::to_string(&report).unwrap();
        assert_eq!(
            json,
            r#"{"zeta":{"count":0,"match":{}},"alpha":{"count":1,"match":{"x.txt":1}}}"#
        );
    }
}
