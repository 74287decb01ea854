use crate::check::{CheckError, CheckOutcome, CheckResult, Explanation, code};
use crate::document::CsvDefinition;
use crate::document::testlog::path_segments;
use crate::document::text::{decode_text, split_lines};
use crate::package::{PackageCache, SourceKind};
use std::fs;
use std::path::Path;

/// Lines of the source file searched for the model-derived phrase.
const SOURCE_SCAN_LINES: usize = 100;

/// Classify `src_full` by scanning its head for `phrase`; the package cache
/// answers only when the source cannot be read.
pub fn classify_source(src_full: &str, phrase: &str, package: &dyn PackageCache) -> SourceKind {
    match fs::read(Path::new(src_full)) {
        Ok(bytes) => {
            let text = decode_text(&bytes);
            let found = split_lines(&text)
                .iter()
                .take(SOURCE_SCAN_LINES)
                .any(|line| line.contains(phrase));
            if found {
                SourceKind::ModelDerived
            } else {
                SourceKind::Handwritten
            }
        }
        Err(_) => package.source_kind(src_full),
    }
}

/// 2_desc: the description names the function, or the model phrase for
/// model-derived sources.
pub fn check_2_desc(csv: &CsvDefinition, kind: SourceKind, model_phrase: &str) -> CheckResult {
    let func = path_segments(&csv.func_full).pop().unwrap_or_default();
    let description = csv.description.as_str();

    if description.trim().is_empty() {
        return Err(CheckError::FieldMissing(code("Missing description")));
    }

    let mismatch = |expected: &str| {
        CheckError::ValueMismatch(format!(
            "Actual vs Expected<br>{}",
            code(format!("{description} != {expected}"))
        ))
    };
    match kind {
        SourceKind::ModelDerived if description != model_phrase => Err(mismatch(model_phrase)),
        SourceKind::Handwritten if description != func => Err(mismatch(&func)),
        SourceKind::Unknown if description != func && description != model_phrase => {
            Err(CheckError::ValueMismatch(format!(
                "{} not in [{func}, {model_phrase}]",
                code(description)
            )))
        }
        SourceKind::Unknown => Err(CheckError::Indeterminate(code("Not found simulink info"))),
        _ => Ok(CheckOutcome::pass()),
    }
}

/// 3_init_opt: variables are re-initialized on every call.
pub fn check_3_init_opt(csv: &CsvDefinition) -> CheckResult {
    if csv.init_flag() != "1" {
        return Err(CheckError::ValueMismatch(code("InitWheneverCall is False")));
    }
    Ok(CheckOutcome::pass())
}

/// 4_init_var: inputs are never initialized; outputs always are.
pub fn check_4_init_var(csv: &CsvDefinition) -> CheckResult {
    let inputs = &csv.variables.input;
    let mut explanation = Explanation::new();

    let initialized_inputs: Vec<&str> = csv
        .init
        .iter()
        .map(|(name, _)| name.as_str())
        .filter(|name| inputs.iter().any(|input| input == name))
        .collect();
    if !initialized_inputs.is_empty() {
        explanation.fail("Initial input variables:");
        explanation.fail(code(initialized_inputs.join("<br>")));
    }

    let missing_outputs: Vec<&str> = csv
        .variables
        .output
        .iter()
        .filter(|output| !inputs.contains(output))
        .filter(|output| !output.contains("@@"))
        .filter(|output| !csv.is_initialized(output))
        .map(String::as_str)
        .collect();
    if !missing_outputs.is_empty() {
        explanation.fail("Missing init output variables:");
        explanation.fail(code(missing_outputs.join("<br>")));
    }

    Ok(explanation.finish(None))
}
