use crate::check::ranges::collapse;
use crate::check::vars::compare_lists;
use crate::check::{CheckError, CheckOutcome, CheckResult, Explanation, code, unreadable};
use crate::config::settings::HeaderRole;
use crate::document::{AnalysisTable, CaseTable, VariableList};

const CONFIRMED: [&str; 2] = ["OK", "Fault"];

/// 7_title: the table names `<func>.csv` in its first link.
pub fn check_7_title(table: &CaseTable, func: &str) -> CheckResult {
    let expected = format!("{func}.csv");
    let actual = table.title.as_deref().unwrap_or_default();
    if actual != expected {
        return Err(CheckError::ValueMismatch(format!(
            "Title diff {}",
            code(format!("{expected} != {actual}"))
        )));
    }
    Ok(CheckOutcome::pass())
}

/// 8_index: numbering starts at 1 and increases by one, commented rows
/// included.
pub fn check_8_index(table: &CaseTable) -> CheckResult {
    let numbers: Vec<u64> = table
        .numbered_rows()
        .map_err(unreadable)?
        .iter()
        .map(|case| case.number)
        .collect();
    let Some(&first) = numbers.first() else {
        return Err(CheckError::Indeterminate(
            "No numbered test case in table".to_owned(),
        ));
    };

    if first != 1 {
        return Err(CheckError::ValueMismatch(format!(
            "Index start at {}",
            code(format!("No.{first}"))
        )));
    }
    if let Some(pair) = numbers.windows(2).find(|pair| pair[1] != pair[0] + 1) {
        return Err(CheckError::ValueMismatch(format!(
            "Index hopping {}",
            code(format!("No.{}->{}", pair[0], pair[1]))
        )));
    }
    Ok(CheckOutcome::pass())
}

/// 9_confirm: every live test case is confirmed `OK` or `Fault`.
pub fn check_9_confirm(table: &CaseTable) -> CheckResult {
    let unconfirmed: Vec<u64> = table
        .confirmations()
        .map_err(unreadable)?
        .into_iter()
        .filter(|(_, value)| !CONFIRMED.contains(&value.as_str()))
        .map(|(number, _)| number)
        .collect();
    if !unconfirmed.is_empty() {
        return Err(CheckError::ValueMismatch(format!(
            "Missing confirmation {}",
            code(format!("No.{}", collapse(&unconfirmed)))
        )));
    }
    Ok(CheckOutcome::pass())
}

/// 10_header: the header row contains one complete alternative header set.
///
/// When none is complete, the alternative missing the fewest columns is
/// reported.
pub fn check_10_header(table: &CaseTable, header_sets: &[Vec<String>]) -> CheckResult {
    let mut closest: Option<Vec<&str>> = None;
    for expected in header_sets {
        let mut missing: Vec<&str> = Vec::new();
        for column in expected {
            if !table.header.contains(column) && !missing.contains(&column.as_str()) {
                missing.push(column);
            }
        }
        if missing.is_empty() {
            return Ok(CheckOutcome::pass());
        }
        if closest.as_ref().is_none_or(|best| missing.len() < best.len()) {
            closest = Some(missing);
        }
    }

    match closest {
        Some(missing) => Err(CheckError::FieldMissing(format!(
            "Missing column:<br>{}",
            code(missing.join("<br>"))
        ))),
        None => Ok(CheckOutcome::pass()),
    }
}

/// 11_analysis: item ID and comment of every numbered row agree with the
/// analysis table.
///
/// The comment is authoritative on the first row of a merged item cell and
/// must be empty on the rows below it.
pub fn check_11_analysis(table: &CaseTable, analysis: &AnalysisTable) -> CheckResult {
    let item_col = table.column(HeaderRole::Item).map_err(unreadable)?;
    let mut explanation = Explanation::new();

    for case in table.numbered_rows().map_err(unreadable)? {
        let item = table.text(case.row, HeaderRole::Item).map_err(unreadable)?;
        let id = table.text(case.row, HeaderRole::Id).map_err(unreadable)?;
        let comment = table.text(case.row, HeaderRole::Comment).map_err(unreadable)?;
        let number = case.number;

        let Some(record) = analysis.item(item) else {
            if !analysis.is_condition_family(item) {
                explanation.fail(format!("Not found test analysis item {}", code(item)));
            }
            continue;
        };

        if id != record.id {
            explanation.fail(format!(
                "No.{number} ID diff {}",
                code(format!("{} != {id}", record.id))
            ));
        }

        if table.table.is_origin_row(case.row, item_col) {
            if comment != record.comment {
                explanation.fail(format!(
                    "No.{number} Comment diff {}",
                    code(format!("{} != {comment}", record.comment))
                ));
            }
        } else if !comment.is_empty() {
            explanation.fail(format!("No.{number}. Comment should be empty"));
        }
    }

    Ok(explanation.finish(None))
}

/// 15_io_var: variables in the table header agree with the CSV declaration.
pub fn check_15_io_var(table: &CaseTable, csv: &VariableList) -> CheckResult {
    let io = table.variables();
    let mut explanation = Explanation::new();
    compare_lists(&mut explanation, "Input", &io.input, &csv.input);
    compare_lists(&mut explanation, "Output", &io.output, &csv.output);
    Ok(explanation.finish(Some("_Table.html vs CSV")))
}

#[cfg(test)]
mod tests {
    use super::{
        check_7_title, check_8_index, check_9_confirm, check_10_header, check_11_analysis,
        check_15_io_var,
    };
    use crate::check::{CheckOutcome, Verdict, settle};
    use crate::config::settings::Settings;
    use crate::document::VariableList;
    use crate::document::analysis::tests::analysis_table;
    use crate::document::case_table::tests::case_table;
    use crate::document::table::HtmlPage;
    use crate::document::CaseTable;
    use std::path::Path;

    const LIVE: &str = "data-no";
    const COMMENTED: &str = "data-commentout-center-left-right";

    fn numbered(numbers: &[&str]) -> CaseTable {
        let rows: Vec<(&str, &str, &str, &str, &str, &str)> = numbers
            .iter()
            .map(|number| (LIVE, *number, "speed", "Variable", "OK", ""))
            .collect();
        case_table(&rows)
    }

    #[test]
    fn title_names_the_csv() {
        let table = numbered(&["1"]);
        assert_eq!(check_7_title(&table, "Motor_Step"), Ok(CheckOutcome::pass()));
        assert_eq!(
            settle(check_7_title(&table, "Pump")),
            CheckOutcome::fail("Title diff <code>Pump.csv != Motor_Step.csv</code>")
        );
    }

    #[test]
    fn contiguous_numbering_passes() {
        assert_eq!(check_8_index(&numbered(&["1", "2", "3"])), Ok(CheckOutcome::pass()));
    }

    #[test]
    fn numbering_gap_names_both_numbers() {
        let outcome = settle(check_8_index(&numbered(&["1", "2", "3", "5"])));
        assert_eq!(outcome, CheckOutcome::fail("Index hopping <code>No.3->5</code>"));
    }

    #[test]
    fn numbering_must_start_at_one() {
        let outcome = settle(check_8_index(&numbered(&["2", "3", "4"])));
        assert_eq!(outcome, CheckOutcome::fail("Index start at <code>No.2</code>"));
    }

    #[test]
    fn numbering_counts_commented_rows() {
        let table = case_table(&[
            (LIVE, "1", "speed", "Variable", "OK", ""),
            (COMMENTED, "2", "speed", "Variable", "", ""),
            (LIVE, "3", "speed", "Variable", "OK", ""),
        ]);
        assert_eq!(check_8_index(&table), Ok(CheckOutcome::pass()));
        assert_eq!(check_9_confirm(&table), Ok(CheckOutcome::pass()));
    }

    #[test]
    fn empty_numbering_is_inconclusive() {
        let outcome = settle(check_8_index(&numbered(&[])));
        assert_eq!(outcome.verdict, Verdict::Inconclusive);
    }

    #[test]
    fn unconfirmed_rows_are_collapsed() {
        let table = case_table(&[
            (LIVE, "1", "speed", "Variable", "", ""),
            (LIVE, "2", "speed", "Variable", "NG", ""),
            (LIVE, "3", "speed", "Variable", "", ""),
            (LIVE, "4", "speed", "Variable", "Fault", ""),
            (LIVE, "5", "speed", "Variable", "", ""),
        ]);
        assert_eq!(
            settle(check_9_confirm(&table)),
            CheckOutcome::fail("Missing confirmation <code>No.1~3, 5</code>")
        );
    }

    #[test]
    fn header_accepts_any_complete_alternative() {
        let settings = Settings::default();
        let table = numbered(&["1"]);
        assert_eq!(
            check_10_header(&table, &settings.table_header_sets),
            Ok(CheckOutcome::pass())
        );
    }

    #[test]
    fn header_reports_the_closest_alternative() {
        let table = numbered(&["1"]);
        let sets = vec![
            vec!["No.".to_owned(), "Verdict".to_owned(), "Note".to_owned()],
            vec!["No.".to_owned(), "ID".to_owned(), "Expected".to_owned()],
        ];
        assert_eq!(
            settle(check_10_header(&table, &sets)),
            CheckOutcome::fail("Missing column:<br><code>Expected</code>")
        );
    }

    fn merged_table(comment_below: &str) -> CaseTable {
        let html = format!(
            "<html><body><a>Motor_Step.csv</a><table>\
             <tr><td>No.</td><td>Test Analysis Item</td><td>ID</td><td>Confirmation</td><td>Comment</td></tr>\
             <tr><td></td><td></td><td></td><td></td><td></td></tr>\
             <tr><td class=\"data-no\">1</td><td rowspan=\"2\">speed</td><td>Variable</td><td>OK</td><td>range</td></tr>\
             <tr><td class=\"data-no\">2</td><td>Variable</td><td>OK</td><td>{comment_below}</td></tr>\
             <tr><td class=\"data-no\">3</td><td>limit-1</td><td>Boundary</td><td>OK</td><td></td></tr>\
             </table></body></html>"
        );
        let page = HtmlPage::parse(Path::new("Motor_Step_Table.html"), &html);
        CaseTable::from_page(&page, &Settings::default()).expect("case table")
    }

    #[test]
    fn analysis_items_match_on_origin_rows() {
        let analysis = analysis_table(
            &[("speed", "Variable", "range"), ("limit-1", "Boundary", "")],
            &Settings::default(),
        );
        assert_eq!(
            check_11_analysis(&merged_table(""), &analysis),
            Ok(CheckOutcome::pass())
        );
    }

    #[test]
    fn comment_below_origin_must_be_empty() {
        let analysis = analysis_table(
            &[("speed", "Variable", "range"), ("limit-1", "Boundary", "")],
            &Settings::default(),
        );
        let outcome = settle(check_11_analysis(&merged_table("stray"), &analysis));
        assert_eq!(outcome, CheckOutcome::fail("No.2. Comment should be empty"));
    }

    #[test]
    fn analysis_differences_are_listed() {
        let analysis = analysis_table(&[("speed", "Range", "other")], &Settings::default());
        let table = case_table(&[
            (LIVE, "1", "speed", "Variable", "OK", "range"),
            (LIVE, "2", "ghost", "Variable", "OK", ""),
        ]);
        let outcome = settle(check_11_analysis(&table, &analysis));
        assert_eq!(
            outcome.explanation,
            "No.1 ID diff <code>Range != Variable</code><br>\
             No.1 Comment diff <code>other != range</code><br>\
             Not found test analysis item <code>ghost</code>"
        );
    }

    #[test]
    fn condition_family_parents_are_exempt() {
        let analysis = analysis_table(&[("limit-1", "Boundary", "")], &Settings::default());
        let table = case_table(&[(LIVE, "1", "limit", "Boundary", "OK", "")]);
        assert_eq!(check_11_analysis(&table, &analysis), Ok(CheckOutcome::pass()));
    }

    #[test]
    fn table_variables_match_csv() {
        let table = numbered(&["1"]);
        let csv = VariableList {
            input: vec!["@speed".to_owned()],
            output: vec!["out".to_owned()],
        };
        assert_eq!(check_15_io_var(&table, &csv), Ok(CheckOutcome::pass()));

        let csv = VariableList {
            input: vec!["@speed".to_owned(), "gain".to_owned()],
            output: vec!["result".to_owned()],
        };
        assert_eq!(
            settle(check_15_io_var(&table, &csv)),
            CheckOutcome::fail(
                "_Table.html vs CSV<br>Input length: <code>1 != 2</code><br>\
                 Output index.0 <code>out != result</code>"
            )
        );
    }
}
