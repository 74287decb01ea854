use crate::check::{CheckError, CheckResult, Explanation, code};
use crate::document::testlog::canonical_percent;
use crate::document::{FunctionInfo, ReportTable};

/// 12_entire: the report's entire-information tables agree with the testlog.
pub fn check_12_entire(report: &ReportTable, info: &FunctionInfo) -> CheckResult {
    let summary = report.summary.as_ref().map_err(|_| {
        let name = report
            .path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_default();
        CheckError::Indeterminate(format!("Unable to get info from {name}"))
    })?;

    let csv = info.csv_name();
    let mut explanation = Explanation::new();
    for (key, label, actual) in summary.fields() {
        let expected = match key {
            "csv" => csv.as_str(),
            "c0" => info.c0.as_str(),
            "c1" => info.c1.as_str(),
            _ => info.mcdc.as_str(),
        };
        let differs = match key {
            "csv" => expected != actual,
            _ => canonical_percent(expected) != canonical_percent(actual),
        };
        if differs {
            explanation.fail(format!("{label}: {}", code(format!("{expected} != {actual}"))));
        }
    }
    Ok(explanation.finish(Some("Testlog vs TestReport.html")))
}
