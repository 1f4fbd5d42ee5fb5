use colored::Colorize;
use dawvc_diff::{ChangeKind, ChangeRecord, ChangeSet};
use dawvc_types::StateValue;
use serde::Serialize;

/// Short text form of a value: scalars as-is, containers as compact JSON.
pub fn value_text(value: &StateValue) -> String {
    match value.as_scalar() {
        Some(scalar) => scalar.to_string(),
        None => serde_json::to_string(value).unwrap_or_else(|_| format!("<{}>", value.kind())),
    }
}

fn record_line(record: &ChangeRecord) -> String {
    let empty = StateValue::null();
    let old = record.old.as_ref().unwrap_or(&empty);
    let new = record.new.as_ref().unwrap_or(&empty);
    match record.kind {
        ChangeKind::Added => format!("+ {}: {}", record.path, value_text(new)).green().to_string(),
        ChangeKind::Removed => format!("- {}: {}", record.path, value_text(old)).red().to_string(),
        ChangeKind::Modified => format!(
            "~ {}: {} -> {}",
            record.path,
            value_text(old),
            value_text(new)
        )
        .yellow()
        .to_string(),
    }
}

/// One line per leaf change, in document order.
pub fn change_lines(set: &ChangeSet) -> Vec<String> {
    set.records().iter().map(record_line).collect()
}

/// One-line count of additions, removals and modifications.
pub fn summary(set: &ChangeSet) -> String {
    format!(
        "{} added, {} removed, {} modified",
        set.additions(),
        set.removals(),
        set.modifications()
    )
}

/// Print every change line under `indent`, then the summary.
pub fn print_changes(set: &ChangeSet, indent: &str) {
    if set.is_empty() {
        println!("{indent}No changes.");
        return;
    }
    for line in change_lines(set) {
        println!("{indent}{line}");
    }
    println!("{indent}{}", summary(set).dimmed());
}

/// Print `value` as pretty JSON on stdout.
pub fn print_json<T: Serialize + ?Sized>(value: &T) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

/// Machine-readable view of a change set: flattened records plus counts.
#[derive(Serialize)]
pub struct ChangeReport {
    pub changed: bool,
    pub added: usize,
    pub removed: usize,
    pub modified: usize,
    pub records: Vec<ChangeRecord>,
}

impl From<&ChangeSet> for ChangeReport {
    fn from(set: &ChangeSet) -> Self {
        Self {
            changed: !set.is_empty(),
            added: set.additions(),
            removed: set.removals(),
            modified: set.modifications(),
            records: set.records(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use dawvc_diff::diff;

    #[test]
    fn lines_mark_each_kind() {
        let old = StateValue::mapping([
            ("tempo", StateValue::from(120.0)),
            ("title", StateValue::from("Demo")),
        ]);
        let new = StateValue::mapping([
            ("tempo", StateValue::from(128.0)),
            ("genre", StateValue::from("House")),
        ]);
        let lines = change_lines(&diff(&old, &new));
        assert_eq!(lines.len(), 3);
        assert!(lines[0].contains("~ tempo: 120 -> 128"));
        assert!(lines[1].contains("- title: \"Demo\""));
        assert!(lines[2].contains("+ genre: \"House\""));
    }

    #[test]
    fn containers_render_as_json() {
        let value = StateValue::mapping([("name", StateValue::from("Kick"))]);
        assert_eq!(value_text(&value), r#"{"name":"Kick"}"#);
    }

    #[test]
    fn report_counts_match_change_set() {
        let old = StateValue::mapping([("a", StateValue::from(1i64))]);
        let new = StateValue::mapping([("a", StateValue::from(2i64)), ("b", StateValue::from(true))]);
        let set = diff(&old, &new);
        let report = ChangeReport::from(&set);
        assert!(report.changed);
        assert_eq!((report.added, report.removed, report.modified), (1, 0, 1));
        assert_eq!(summary(&set), "1 added, 0 removed, 1 modified");
    }
}
