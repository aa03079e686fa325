//! Report rendering for the command line.

use super::RunSummary;
use comfy_table::{presets::UTF8_FULL, Cell, Table};
use indexmap::IndexMap;

const NOT_AVAILABLE: &str = "N/A";

/// Renders match counts as a table with one row per configured pattern.
///
/// Patterns without matches show `N/A` as their matched files. Repositories
/// that never reached the scan get a single `N/A` row.
#[must_use]
pub fn render_table(summary: &RunSummary) -> String {
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .set_header(vec!["Repository", "Pattern", "Count", "Matched Files"]);

    for report in &summary.reports {
        let Some(matches) = &report.matches else {
            table.add_row(vec![
                Cell::new(&report.repository),
                Cell::new(NOT_AVAILABLE),
                Cell::new(NOT_AVAILABLE),
                Cell::new(NOT_AVAILABLE),
            ]);
            continue;
        };

        for (pattern, pattern_matches) in matches.iter() {
            let files = if pattern_matches.count == 0 {
                NOT_AVAILABLE.to_string()
            } else {
                pattern_matches
                    .files
                    .iter()
                    .map(|(file, count)| format!("{file} ({count})"))
                    .collect::<Vec<_>>()
                    .join("\n")
            };
            table.add_row(vec![
                Cell::new(&report.repository),
                Cell::new(pattern),
                Cell::new(pattern_matches.count),
                Cell::new(files),
            ]);
        }
    }

    table.to_string()
}

/// Renders match reports as `{repository: {pattern: {count, match}}}`.
pub fn render_json(summary: &RunSummary) -> Result<String, serde_json::Error> {
    let reports: IndexMap<&str, _> = summary
        .reports
        .iter()
        .filter_map(|report| {
            report
                .matches
                .as_ref()
                .map(|matches| (report.repository.as_str(), matches))
        })
        .collect();
    serde_json::to_string_pretty(&reports)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Mode;
    use crate::patterns::MatchReport;
    use crate::pipeline::{PipelineFlags, RepositoryOutcome, RepositoryReport};

    fn summary_with(matches: Option<MatchReport>) -> RunSummary {
        let mut summary = RunSummary::new(Mode::Dev, 1);
        summary.record_result(RepositoryReport {
            repository: "service-a".to_string(),
            outcome: RepositoryOutcome::Completed { pull_request: None },
            matches,
            flags: PipelineFlags::for_mode(Mode::Dev),
        });
        summary
    }

    fn sample_matches() -> MatchReport {
        let pattern = "old\\.registry".to_string();
        let mut matches = MatchReport::new([&pattern]);
        matches.record(&pattern, "service-a/Dockerfile", 2);
        matches.record(&pattern, "service-a/ci.yml", 1);
        matches
    }

    #[test]
    fn table_lists_matched_files() {
        let table = render_table(&summary_with(Some(sample_matches())));

        assert!(table.contains("Repository"));
        assert!(table.contains("service-a"));
        assert!(table.contains("old\\.registry"));
        assert!(table.contains("service-a/Dockerfile (2)"));
        assert!(table.contains("service-a/ci.yml (1)"));
    }

    #[test]
    fn table_marks_repositories_without_matches() {
        let pattern = "nothing".to_string();
        let table = render_table(&summary_with(Some(MatchReport::new([&pattern]))));

        assert!(table.contains("service-a"));
        assert!(table.contains("nothing"));
        assert!(table.contains(NOT_AVAILABLE));
    }

    #[test]
    fn table_keeps_a_row_for_every_pattern() {
        let (hit, miss) = ("foo".to_string(), "zzz".to_string());
        let mut matches = MatchReport::new([&hit, &miss]);
        matches.record(&hit, "a.txt", 1);

        let table = render_table(&summary_with(Some(matches)));
        let rows: Vec<_> = table.lines().filter(|line| line.contains("service-a")).collect();

        assert_eq!(rows.len(), 2);
        assert!(rows[0].contains("foo") && rows[0].contains("a.txt (1)"));
        assert!(rows[1].contains("zzz") && rows[1].contains('0'));
        assert!(rows[1].contains(NOT_AVAILABLE));
    }

    #[test]
    fn table_marks_repositories_that_never_scanned() {
        let table = render_table(&summary_with(None));
        let row = table.lines().find(|line| line.contains("service-a")).unwrap();

        assert_eq!(row.matches(NOT_AVAILABLE).count(), 3);
    }

    #[test]
    fn json_is_keyed_by_repository_then_pattern() {
        let json = render_json(&summary_with(Some(sample_matches()))).unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();

        let entry = &value["service-a"]["old\\.registry"];
        assert_eq!(entry["count"], 3);
        assert_eq!(entry["match"]["service-a/Dockerfile"], 2);
        assert_eq!(entry["match"]["service-a/ci.yml"], 1);
    }

    #[test]
    fn json_omits_repositories_that_never_scanned() {
        let json = render_json(&summary_with(None)).unwrap();
        assert_eq!(json.trim(), "{}");
    }
}
