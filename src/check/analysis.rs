use crate::check::vars::is_same_var;
use crate::check::{CheckResult, Explanation, code};
use crate::document::AnalysisTable;

/// 5_input_var: input variables of the analysis table match the CSV inputs.
pub fn check_5_input_var(analysis: &AnalysisTable, csv_inputs: &[String]) -> CheckResult {
    let names = analysis.input_names();
    let mut explanation = Explanation::new();

    if names.len() != csv_inputs.len() {
        explanation.fail(format!(
            "Length diff {}",
            code(format!("{} != {}", names.len(), csv_inputs.len()))
        ));
    }
    for (index, (name, input)) in names.iter().zip(csv_inputs).enumerate() {
        if !is_same_var(name, input) {
            explanation.fail(format!(
                "Index.{} diff {}",
                index + 1,
                code(format!("{name} != {input}"))
            ));
        }
    }

    Ok(explanation.finish(None))
}

/// 6_label: every label token belongs to the document's canonical label set.
pub fn check_6_label(analysis: &AnalysisTable) -> CheckResult {
    let mut explanation = Explanation::new();
    for item in &analysis.items {
        for label in item.labels() {
            if !analysis.label_set.contains(&label) {
                explanation.fail(format!("{} in item {}", code(&label), code(&item.item)));
            }
        }
    }
    Ok(explanation.finish(Some("Unknown labels:")))
}
