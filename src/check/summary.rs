use crate::check::sheet::float_text;
use crate::check::{CheckError, CheckResult, Explanation, code};
use crate::config::settings::Dictionary;
use crate::document::testlog::{canonical_percent, path_segments};
use crate::document::{FunctionInfo, SpecWorkbook};
use crate::package::{Record, value_text};
use serde_json::Value;

/// `(summary key, expected value)` pairs compared against table 1.1.
pub type Expectations = Vec<(&'static str, String)>;

const SUMMARY_KEYS: [&str; 8] = [
    "c0",
    "c1",
    "mcdc",
    "result",
    "issue",
    "src_rel_dir",
    "src_name",
    "func",
];

/// Table 1.1 values implied by the package summary row (22_result_summary).
pub fn summary_expectations(record: &Record) -> Result<Expectations, CheckError> {
    if !record.contains_key("func_no") {
        return Err(CheckError::Indeterminate(
            "Unable to get function info from summary".to_owned(),
        ));
    }

    let mut expectations = Vec::with_capacity(SUMMARY_KEYS.len());
    for key in SUMMARY_KEYS {
        let value = match key {
            "src_rel_dir" => {
                let src_rel = record.get("src_rel").map(value_text).unwrap_or_default();
                let mut segments = path_segments(&src_rel);
                segments.pop();
                segments.join("/")
            }
            "c0" | "c1" | "mcdc" => match record.get(key) {
                Some(Value::Number(number)) => {
                    let ratio = number.as_f64().unwrap_or_default();
                    format!("{}%", (ratio * 100.0) as i64)
                }
                Some(value) => value_text(value),
                None => "0".to_owned(),
            },
            _ => record.get(key).map(value_text).ok_or_else(|| {
                CheckError::Indeterminate(format!("Summary has no '{key}'"))
            })?,
        };
        expectations.push((key, value));
    }
    Ok(expectations)
}

/// Number of issues the function should report: the package count, or one
/// when coverage is incomplete or a test case faulted.
pub fn issue_count(record: &Record, info: &FunctionInfo, has_fault: bool) -> u64 {
    let declared = match record.get("issue_num") {
        None | Some(Value::Null) => Ok(0),
        Some(Value::Number(number)) => number
            .as_u64()
            .or_else(|| number.as_f64().filter(|n| *n >= 0.0).map(|n| n as u64))
            .ok_or(()),
        Some(Value::String(text)) if text.trim().is_empty() => Ok(0),
        Some(Value::String(text)) => text.trim().parse::<u64>().map_err(|_| ()),
        Some(_) => Err(()),
    };
    match declared {
        Ok(0) if !info.fully_covered() || has_fault => 1,
        Ok(count) => count,
        Err(()) => 1,
    }
}

/// Table 1.1 values implied by the testlog (23_result_testlog).
pub fn testlog_expectations(
    info: &FunctionInfo,
    record: &Record,
    has_fault: bool,
    dictionary: &Dictionary,
) -> Expectations {
    let issues = issue_count(record, info, has_fault);
    let (result, issue) = if issues > 0 {
        let func_no = record
            .get("func_no")
            .map(value_text)
            .unwrap_or_else(|| "0".to_owned());
        let numbers: Vec<String> = (1..=issues).map(|n| format!("{func_no}.{n}")).collect();
        let package = record.get("package").map(value_text).unwrap_or_default();
        (
            "NG".to_owned(),
            format!(
                "{package}_{}No{}",
                dictionary.issue_prefix,
                numbers.join(", ")
            ),
        )
    } else {
        ("OK".to_owned(), dictionary.no_issue.clone())
    };

    vec![
        ("c0", canonical_percent(&info.c0)),
        ("c1", canonical_percent(&info.c1)),
        ("mcdc", canonical_percent(&info.mcdc)),
        ("result", result),
        ("issue", issue),
        ("src_name", info.src_name.clone()),
        ("func", info.func.clone()),
        ("csv", info.csv_name()),
    ]
}

/// 22/23: table 1.1 of the specification sheet agrees with `expected`.
///
/// `source` names where the expectations came from in the explanation.
pub fn check_test_result(
    workbook: &SpecWorkbook,
    spec_sheet: &str,
    expected: &[(&str, String)],
    source: &str,
    no_issue: &str,
) -> CheckResult {
    let summary = workbook.summary.as_ref().ok_or_else(|| {
        CheckError::Indeterminate("Unable to parse table 1.1 to get info".to_owned())
    })?;
    if !workbook.has_sheet(spec_sheet) {
        return Err(CheckError::FieldMissing(format!(
            "Not found sheet {}",
            code(spec_sheet)
        )));
    }

    let mut explanation = Explanation::new();
    for (key, value) in expected {
        let value = if *key == "issue" && value.trim().is_empty() {
            no_issue
        } else {
            value.as_str()
        };
        let actual = summary.get(key).unwrap_or_default();
        if coerce(value) != coerce(actual) {
            explanation.fail(format!(
                "{}: {}",
                field_label(key),
                code(format!("{value} != {actual}"))
            ));
        }
    }
    Ok(explanation.finish(Some(&format!("{source} vs XLSX"))))
}

fn coerce(value: &str) -> String {
    let canonical = canonical_percent(value);
    match canonical.parse::<f64>() {
        Ok(number) => float_text(number),
        Err(_) => canonical,
    }
}

/// `src_rel_dir` → `Src_Rel_Dir`; MC/DC keeps its conventional spelling.
fn field_label(key: &str) -> String {
    if key == "mcdc" {
        return "MC/DC".to_owned();
    }
    let mut label = String::with_capacity(key.len());
    let mut after_letter = false;
    for character in key.chars() {
        if after_letter {
            label.extend(character.to_lowercase());
        } else {
            label.extend(character.to_uppercase());
        }
        after_letter = character.is_alphabetic();
    }
    label
}
