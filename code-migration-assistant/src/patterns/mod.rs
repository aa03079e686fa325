//! Regex search and replace over a working tree.
//!
//! Every regular file under the root is decoded permissively, each pattern's
//! matches are counted on the original content, and the substitutions are
//! applied in configuration order on the running result. Only files whose
//! content actually changed are written back.
//!
//! Replacement strings follow [`regex::Regex::replace_all`] syntax, so `$1`
//! and `${name}` expand capture groups and a literal `$` is written `$$`.

mod error;
mod report;

pub use error::ScanError;
pub use report::{MatchReport, PatternMatches};

use indexmap::IndexMap;
use regex::Regex;
use std::borrow::Cow;
use std::collections::HashSet;
use std::fs;
use std::path::Path;
use tracing::{debug, error, info, warn};
use walkdir::{DirEntry, WalkDir};

/// Ordered mapping of regex pattern to replacement text.
pub type PatternSet = IndexMap<String, String>;

/// Options of a scan.
#[derive(Debug, Clone, Copy, Default)]
pub struct ScanOptions<'a> {
    /// Paths of the form `<repository folder>/<relative path>` to leave alone.
    pub excluded_paths: &'a [String],
    /// Descend into directories whose name starts with a dot.
    pub include_hidden_dirs: bool,
    /// Count and compute replacements without writing files.
    pub dry_run: bool,
}

struct CompiledPattern<'a> {
    source: &'a str,
    regex: Regex,
    replacement: &'a str,
}

/// Counts matches of every pattern under `root` and rewrites changed files.
///
/// `root` is resolved to an absolute path first; its last component is the
/// folder that prefixes [`ScanOptions::excluded_paths`].
///
/// A pattern that fails to compile is logged and reported with zero matches;
/// the others still run. Unreadable or unwritable files are logged and
/// skipped.
///
/// # Errors
///
/// Returns an error only when `root` itself cannot be traversed.
pub fn scan_and_replace(
    root: &Path,
    patterns: &PatternSet,
    options: &ScanOptions<'_>,
) -> Result<MatchReport, ScanError> {
    let resolved = fs::canonicalize(root).map_err(|source| ScanError::Root {
        path: root.display().to_string(),
        source,
    })?;
    let root = resolved.as_path();
    if !root.is_dir() {
        return Err(ScanError::NotADirectory {
            path: root.display().to_string(),
        });
    }

    let compiled = compile_patterns(patterns);
    let mut report = MatchReport::new(patterns.keys());
    if compiled.is_empty() {
        return Ok(report);
    }

    let folder = root
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_default();
    let excluded: HashSet<&str> = options.excluded_paths.iter().map(String::as_str).collect();

    let walker = WalkDir::new(root)
        .follow_links(false)
        .sort_by_file_name()
        .into_iter()
        .filter_entry(|entry| options.include_hidden_dirs || !is_hidden_dir(entry));

    for entry in walker {
        let entry = match entry {
            Ok(entry) => entry,
            Err(e) if e.depth() == 0 => {
                return Err(ScanError::Walk {
                    path: root.display().to_string(),
                    source: e,
                });
            }
            Err(e) => {
                warn!(error = %e, "Skipping unreadable path");
                continue;
            }
        };

        if !entry.file_type().is_file() {
            continue;
        }

        let relative = relative_path(root, entry.path());
        if excluded.contains(format!("{folder}/{relative}").as_str()) {
            debug!(file = %relative, "Excluded from search");
            continue;
        }

        scan_file(entry.path(), &relative, &compiled, options.dry_run, &mut report);
    }

    Ok(report)
}

fn compile_patterns(patterns: &PatternSet) -> Vec<CompiledPattern<'_>> {
    patterns
        .iter()
        .filter_map(|(pattern, replacement)| match Regex::new(pattern) {
            Ok(regex) => Some(CompiledPattern {
                source: pattern,
                regex,
                replacement,
            }),
            Err(e) => {
                error!(pattern = %pattern, error = %e, "Invalid pattern, skipping it");
                None
            }
        })
        .collect()
}

fn scan_file(
    path: &Path,
    relative: &str,
    patterns: &[CompiledPattern<'_>],
    dry_run: bool,
    report: &mut MatchReport,
) {
    let bytes = match fs::read(path) {
        Ok(bytes) => bytes,
        Err(e) => {
            error!(file = %relative, error = %e, "Error reading file");
            return;
        }
    };

    let content = decode_permissive(&bytes);
    let mut updated = content.clone();

    for pattern in patterns {
        let count = pattern.regex.find_iter(&content).count();
        if count > 0 {
            info!(pattern = %pattern.source, count, file = %relative, "Pattern matched");
            report.record(pattern.source, relative, count);
        }

        if let Cow::Owned(replaced) = pattern.regex.replace_all(&updated, pattern.replacement) {
            updated = replaced;
        }
    }

    if updated == content {
        return;
    }

    if dry_run {
        report.record_changed(relative);
        return;
    }

    match fs::write(path, updated.as_bytes()) {
        Ok(()) => {
            debug!(file = %relative, "File updated");
            report.record_changed(relative);
        }
        Err(e) => error!(file = %relative, error = %e, "Error writing file"),
    }
}

/// Decodes bytes as UTF-8, dropping invalid sequences.
fn decode_permissive(bytes: &[u8]) -> String {
    let mut decoded = String::with_capacity(bytes.len());
    for chunk in bstr::ByteSlice::utf8_chunks(bytes) {
        decoded.push_str(chunk.valid());
    }
    decoded
}

fn is_hidden_dir(entry: &DirEntry) -> bool {
    entry.depth() > 0
        && entry.file_type().is_dir()
        && entry.file_name().to_string_lossy().starts_with('.')
}

fn relative_path(root: &Path, path: &Path) -> String {
    let relative = path.strip_prefix(root).unwrap_or(path);
    relative
        .components()
        .map(|component| component.as_os_str().to_string_lossy())
        .collect::<Vec<_>>()
        .join("/")
}
