use crate::check::{CheckError, CheckOutcome, CheckResult, code};
use crate::document::TestlogDocument;
use crate::document::testlog::{HEADER_LINES, parse_percent};

const OPERATORS: [&str; 4] = ["+", "-", "/", "="];

/// 13_parse: header lines parse and every coverage value is `<int>%`.
pub fn check_13_parse(testlog: &TestlogDocument) -> CheckResult {
    let info = testlog.info.as_ref().map_err(|_| {
        CheckError::FieldMissing("Unable to parse testlog to get info".to_owned())
    })?;
    for (_, value) in info.coverages() {
        parse_percent(value).map_err(CheckError::FieldMissing)?;
    }
    Ok(CheckOutcome::pass())
}

/// 14_func: the listing contains the definition of the function under test.
///
/// A definition line holds ` func` or `*func` followed by `(`, and no
/// arithmetic or assignment token precedes the name.
pub fn check_14_func(testlog: &TestlogDocument) -> CheckResult {
    let info = testlog.info().ok_or_else(|| {
        CheckError::Indeterminate("Unable to parse testlog to get info".to_owned())
    })?;
    let spaced = format!(" {}", info.func);
    let starred = format!("*{}", info.func);

    for line in testlog.lines.iter().skip(HEADER_LINES) {
        let token = if line.contains(&starred) {
            &starred
        } else if line.contains(&spaced) {
            &spaced
        } else {
            continue;
        };

        let mut parts = line.split(token.as_str());
        let before = parts.next().unwrap_or_default();
        let after = parts.next().unwrap_or_default().trim();
        if !after.starts_with('(') {
            continue;
        }
        let is_expression = before
            .split(' ')
            .map(str::trim)
            .any(|word| OPERATORS.contains(&word));
        if !is_expression {
            return Ok(CheckOutcome::pass());
        }
    }

    Err(CheckError::FieldMissing(code("Missing function in testlog")))
}
