use crate::document::testlog::path_segments;
use crate::package::{PackageCache, Record, SourceKind, value_text};
use serde::Deserialize;
use serde_json::Value;
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

/// On-disk layout of `<data-dir>/<package>.json`.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct PackageData {
    /// Function summary table; row 0 holds the column keys.
    pub summary: Vec<Vec<Value>>,
    /// Source path → model-derived flag (`null` when the scan failed).
    pub simulink: BTreeMap<String, Option<bool>>,
    /// Ticket key → ticket title.
    pub jira: BTreeMap<String, String>,
}

/// Package cache backed by a JSON file fetched ahead of time.
#[derive(Debug, Clone)]
pub struct JsonPackage {
    name: String,
    data: PackageData,
}

impl JsonPackage {
    pub fn path(data_dir: &Path, name: &str) -> PathBuf {
        data_dir.join(format!("{name}.json"))
    }

    pub fn load(data_dir: &Path, name: &str) -> Result<Self, String> {
        let path = Self::path(data_dir, name);
        let content = fs::read_to_string(&path)
            .map_err(|error| format!("failed to read package '{}': {error}", path.display()))?;
        let data = serde_json::from_str(&content)
            .map_err(|error| format!("failed to parse package '{}': {error}", path.display()))?;
        Ok(Self::new(name, data))
    }

    pub fn new(name: &str, data: PackageData) -> Self {
        Self {
            name: name.to_owned(),
            data,
        }
    }

    /// Summary row for `func` whose source path best matches `src_rel`.
    ///
    /// Candidates must share the file name; while several remain they are
    /// narrowed by ever longer path suffixes.
    pub fn fuzzy_find(&self, func: &str, src_rel: &str) -> Option<Record> {
        let (header, rows) = self.data.summary.split_first()?;
        let keys: Vec<String> = header.iter().map(value_text).collect();
        let target = path_segments(src_rel);

        let source_of = |record: &Record| {
            path_segments(&record.get("src_rel").map(value_text).unwrap_or_default())
        };
        let mut candidates: Vec<Record> = rows
            .iter()
            .map(|row| keys.iter().cloned().zip(row.iter().cloned()).collect::<Record>())
            .filter(|record| record.get("func").is_some_and(|value| value_text(value) == func))
            .filter(|record| suffix(&source_of(record), 1) == suffix(&target, 1))
            .collect();

        let limit = candidates
            .iter()
            .map(|record| source_of(record).len())
            .chain([target.len()])
            .max()
            .unwrap_or(0);
        let mut depth = 2;
        while candidates.len() > 1 && depth <= limit {
            candidates.retain(|record| suffix(&source_of(record), depth) == suffix(&target, depth));
            depth += 1;
        }
        candidates.into_iter().next()
    }

    /// `(ticket, title)` whose title starts with `Group{group}_{src_name}_{pic}`.
    pub fn find_ticket(&self, record: &Record) -> Option<(String, String)> {
        let group = record.get("group").map(value_text)?;
        let pic = record.get("pic").map(value_text)?;
        let src_name = record.get("src_name").map(value_text)?;
        let prefix = format!("Group{group}_{src_name}_{pic}");
        self.data
            .jira
            .iter()
            .find(|(_, title)| title.starts_with(&prefix))
            .map(|(ticket, title)| (ticket.clone(), title.clone()))
    }
}

impl PackageCache for JsonPackage {
    fn name(&self) -> Option<&str> {
        Some(&self.name)
    }

    fn source_kind(&self, src_full: &str) -> SourceKind {
        let target = path_segments(src_full);
        let mut candidates: Vec<(Vec<String>, Option<bool>)> = self
            .data
            .simulink
            .iter()
            .map(|(path, flag)| (path_segments(path), *flag))
            .filter(|(segments, _)| suffix(segments, 1) == suffix(&target, 1))
            .collect();

        let Some((_, first)) = candidates.first() else {
            return SourceKind::Unknown;
        };
        let first = *first;
        if candidates.iter().all(|(_, flag)| *flag == first) {
            return SourceKind::from(first);
        }

        let limit = candidates
            .iter()
            .map(|(segments, _)| segments.len())
            .chain([target.len()])
            .max()
            .unwrap_or(0);
        let mut depth = 2;
        while candidates.len() > 1 && depth <= limit {
            candidates.retain(|(segments, _)| suffix(segments, depth) == suffix(&target, depth));
            depth += 1;
        }
        match candidates.as_slice() {
            [(_, flag)] => SourceKind::from(*flag),
            _ => SourceKind::Unknown,
        }
    }

    fn function_record(&self, func: &str, src_full: &str) -> Option<Record> {
        let mut record = self.fuzzy_find(func, src_full)?;
        let src_rel = record.get("src_rel").map(value_text).unwrap_or_default();
        let src_name = path_segments(&src_rel).pop().unwrap_or_default();
        record.insert("src_name".to_owned(), Value::from(src_name));

        if let Some((ticket, title)) = self.find_ticket(&record)
            && let Some(number) = ticket.rsplit('-').next().and_then(|n| n.parse::<u64>().ok())
        {
            let task_title = format!("Task{number:05}_{title}");
            record.insert("jira".to_owned(), Value::from(ticket));
            record.insert("jira_title".to_owned(), Value::from(title));
            record.insert("task_title".to_owned(), Value::from(task_title));
        }
        Some(record)
    }
}

/// Last `depth` segments joined with `/`.
fn suffix(segments: &[String], depth: usize) -> String {
    segments[segments.len().saturating_sub(depth)..].join("/")
}

#[cfg(test)]
mod tests {
    use super::{JsonPackage, PackageData};
    use crate::package::{PackageCache, SourceKind};
    use serde_json::json;
    use std::fs;
    use tempfile::TempDir;

    fn package() -> JsonPackage {
        let data: PackageData = serde_json::from_value(json!({
            "summary": [
                ["func_no", "func", "src_rel", "group", "pic", "c0"],
                [1, "Motor_Step", "src/motor/ctrl.c", "A", "dev", 1.0],
                [2, "Motor_Step", "src/pump/ctrl.c", "B", "dev", 0.5],
                [3, "Pump_Run", "src/pump/run.c", "B", "dev", 1.0]
            ],
            "simulink": {
                "C:/work/src/motor/ctrl.c": true,
                "C:/work/src/pump/ctrl.c": false,
                "C:/work/src/pump/run.c": false,
                "C:/work/src/gen/model.c": true,
                "D:/other/gen/model.c": true
            },
            "jira": {
                "PRJ-12": "GroupA_ctrl.c_dev unit tests",
                "PRJ-13": "GroupB_run.c_dev unit tests"
            }
        }))
        .expect("package data");
        JsonPackage::new("pkg", data)
    }

    #[test]
    fn fuzzy_find_narrows_by_path_suffix() {
        let package = package();
        let record = package
            .fuzzy_find("Motor_Step", "C:\\work\\src\\pump\\ctrl.c")
            .expect("pump row");
        assert_eq!(record.get("func_no"), Some(&json!(2)));

        let record = package
            .fuzzy_find("Motor_Step", "/x/src/motor/ctrl.c")
            .expect("motor row");
        assert_eq!(record.get("group"), Some(&json!("A")));
    }

    #[test]
    fn fuzzy_find_requires_matching_file_name() {
        let package = package();
        assert!(package.fuzzy_find("Motor_Step", "src/motor/other.c").is_none());
        assert!(package.fuzzy_find("Missing", "src/motor/ctrl.c").is_none());
    }

    #[test]
    fn fuzzy_find_terminates_on_duplicate_rows() {
        let data: PackageData = serde_json::from_value(json!({
            "summary": [
                ["func", "src_rel"],
                ["f", "a/b.c"],
                ["f", "a/b.c"]
            ]
        }))
        .expect("package data");
        let record = JsonPackage::new("dup", data).fuzzy_find("f", "a/b.c");
        assert!(record.is_some());
    }

    #[test]
    fn source_kind_uses_unanimous_file_name_matches() {
        let package = package();
        assert_eq!(package.source_kind("E:/gen/model.c"), SourceKind::ModelDerived);
        assert_eq!(package.source_kind("src/pump/run.c"), SourceKind::Handwritten);
        assert_eq!(package.source_kind("src/none.c"), SourceKind::Unknown);
    }

    #[test]
    fn source_kind_breaks_ties_by_suffix() {
        let package = package();
        assert_eq!(
            package.source_kind("/y/src/motor/ctrl.c"),
            SourceKind::ModelDerived
        );
        assert_eq!(package.source_kind("/y/pump/ctrl.c"), SourceKind::Handwritten);
        assert_eq!(package.source_kind("/y/other/ctrl.c"), SourceKind::Unknown);
    }

    #[test]
    fn function_record_adds_ticket_details() {
        let package = package();
        let record = package
            .function_record("Motor_Step", "src/motor/ctrl.c")
            .expect("record");
        assert_eq!(record.get("src_name"), Some(&json!("ctrl.c")));
        assert_eq!(record.get("jira"), Some(&json!("PRJ-12")));
        assert_eq!(
            record.get("task_title"),
            Some(&json!("Task00012_GroupA_ctrl.c_dev unit tests"))
        );

        let record = package
            .function_record("Motor_Step", "src/pump/ctrl.c")
            .expect("record");
        assert!(!record.contains_key("jira"));
    }

    #[test]
    fn loads_from_data_directory() {
        let dir = TempDir::new().expect("create temp dir");
        fs::write(
            JsonPackage::path(dir.path(), "pkg"),
            r#"{"simulink": {"a/b.c": true}}"#,
        )
        .expect("write package");

        let package = JsonPackage::load(dir.path(), "pkg").expect("load package");
        assert_eq!(package.name(), Some("pkg"));
        assert_eq!(package.source_kind("x/b.c"), SourceKind::ModelDerived);
        assert!(JsonPackage::load(dir.path(), "missing").is_err());
    }
}
