use crate::config::settings::Settings;
use crate::package::PackageCache;
use crate::progress::reporter::{ProgressEvent, report_progress, report_warning};
use crate::report::Report;
use regex::Regex;
use serde::Serialize;
use std::ffi::OsStr;
use std::path::{Path, PathBuf};
use std::time::Instant;

/// Summary line for one testlog in a workspace.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BatchEntry {
    pub testlog: String,
    pub func: Option<String>,
    /// `OK`, `NG`, or `NC` when the report could not be built.
    pub status: &'static str,
    pub entries: usize,
    pub issues: usize,
    /// Test time from the testlog header, ISO 8601 when it parses.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tested_at: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl BatchEntry {
    pub fn is_ok(&self) -> bool {
        self.status == "OK"
    }
}

/// Compile a `--filter` pattern matched against testlog file names.
pub fn compile_filter(pattern: &str) -> Result<Regex, String> {
    Regex::new(pattern).map_err(|error| format!("invalid filter regex: {error}"))
}

/// Every `*.txt` below `dir` whose file name matches `filter`, sorted.
pub fn collect_testlogs(dir: &Path, filter: Option<&Regex>) -> Result<Vec<PathBuf>, String> {
    if !dir.is_dir() {
        return Err(format!("'{}' is not a directory", dir.display()));
    }
    let mut testlogs = Vec::new();
    collect_recursive(dir, &mut testlogs)?;
    if let Some(filter) = filter {
        testlogs.retain(|path| {
            path.file_name()
                .and_then(OsStr::to_str)
                .is_some_and(|name| filter.is_match(name))
        });
    }
    testlogs.sort();
    Ok(testlogs)
}

fn collect_recursive(dir: &Path, testlogs: &mut Vec<PathBuf>) -> Result<(), String> {
    for entry in std::fs::read_dir(dir)
        .map_err(|error| format!("failed to read directory '{}': {error}", dir.display()))?
    {
        let entry = entry.map_err(|error| format!("failed to read directory entry: {error}"))?;
        let path = entry.path();
        if path.is_dir() {
            collect_recursive(&path, testlogs)?;
            continue;
        }
        let is_txt = path
            .extension()
            .and_then(OsStr::to_str)
            .is_some_and(|extension| extension.eq_ignore_ascii_case("txt"));
        if is_txt {
            testlogs.push(path);
        }
    }
    Ok(())
}

/// Check one testlog and condense its checklist.
pub fn check_testlog(testlog: &Path, settings: &Settings, package: &dyn PackageCache) -> BatchEntry {
    let name = testlog.display().to_string();
    match Report::open(testlog, settings) {
        Ok(mut report) => {
            report.run(package);
            let status = report.status();
            BatchEntry {
                testlog: name,
                func: report.info().map(|info| info.func.clone()),
                status: if status.is_ok() { "OK" } else { "NG" },
                entries: status.entries,
                issues: status.issues,
                tested_at: report
                    .info()
                    .and_then(|info| info.tested_at())
                    .map(|time| time.format("%Y-%m-%dT%H:%M:%S").to_string()),
                error: None,
            }
        }
        Err(error) => {
            report_warning(&name, &error);
            BatchEntry {
                testlog: name,
                func: None,
                status: "NC",
                entries: 0,
                issues: 0,
                tested_at: None,
                error: Some(error),
            }
        }
    }
}

/// Check every testlog below `dir`, emitting progress after each one.
pub fn run_batch(
    dir: &Path,
    settings: &Settings,
    package: &dyn PackageCache,
    filter: Option<&Regex>,
    progress: bool,
) -> Result<Vec<BatchEntry>, String> {
    let testlogs = collect_testlogs(dir, filter)?;
    let total = testlogs.len() as u64;
    let started = Instant::now();

    let mut entries = Vec::with_capacity(testlogs.len());
    for (index, testlog) in testlogs.iter().enumerate() {
        entries.push(check_testlog(testlog, settings, package));
        if progress {
            report_progress(&ProgressEvent::new(index as u64 + 1, total, started));
        }
    }
    Ok(entries)
}

#[cfg(test)]
mod tests {
    use super::{collect_testlogs, compile_filter, run_batch};
    use crate::config::settings::Settings;
    use crate::package::NoPackage;
    use crate::report::tests::{testlog_text, workspace};
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn collects_text_files_recursively_in_order() {
        let dir = TempDir::new().expect("create dir");
        fs::create_dir_all(dir.path().join("b/nested")).expect("create dirs");
        fs::write(dir.path().join("b/nested/z.txt"), "").expect("write");
        fs::write(dir.path().join("a.TXT"), "").expect("write");
        fs::write(dir.path().join("b/ignored.csv"), "").expect("write");

        let testlogs = collect_testlogs(dir.path(), None).expect("collect");
        assert_eq!(
            testlogs,
            vec![dir.path().join("a.TXT"), dir.path().join("b/nested/z.txt")]
        );

        let filter = compile_filter("^z").expect("filter");
        let testlogs = collect_testlogs(dir.path(), Some(&filter)).expect("collect");
        assert_eq!(testlogs, vec![dir.path().join("b/nested/z.txt")]);
    }

    #[test]
    fn invalid_filter_is_reported() {
        let error = compile_filter("(").expect_err("unbalanced group");
        assert!(error.starts_with("invalid filter regex"));
    }

    #[test]
    fn rejects_non_directories() {
        let error = collect_testlogs(std::path::Path::new("/nonexistent/workspace"), None)
            .expect_err("missing dir");
        assert!(error.contains("is not a directory"));
    }

    #[test]
    fn summarizes_each_testlog() {
        let workspace = workspace();
        let source = workspace.path("src/motor/ctrl.c");
        workspace.write("loose/Motor_Step.txt", &testlog_text(&source));

        let entries = run_batch(
            &workspace.path("func"),
            &Settings::default(),
            &NoPackage,
            None,
            false,
        )
        .expect("batch");
        assert_eq!(entries.len(), 1);
        assert!(entries[0].is_ok(), "{:?}", entries[0]);
        assert_eq!(entries[0].func.as_deref(), Some("Motor_Step"));
        assert_eq!(entries[0].tested_at.as_deref(), Some("2024-01-05T10:11:12"));
        assert!(entries[0].entries > 0);

        let entries = run_batch(workspace.root.path(), &Settings::default(), &NoPackage, None, true)
            .expect("batch");
        assert_eq!(entries.len(), 2);
        let loose = entries
            .iter()
            .find(|entry| entry.testlog.contains("loose"))
            .expect("loose testlog");
        assert_eq!(loose.status, "NG");
        assert!(loose.issues > 0);
    }
}
