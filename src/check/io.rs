use crate::check::vars::compare_lists;
use crate::check::{CheckResult, Explanation};
use crate::document::{IoTable, VariableList};

/// 16_io_var: variables of the IO table agree with the test-case table header.
pub fn check_16_io_var(io: &IoTable, table: &VariableList) -> CheckResult {
    let names = io.variable_names();
    let mut explanation = Explanation::new();
    compare_lists(&mut explanation, "Input", &names.input, &table.input);
    compare_lists(&mut explanation, "Output", &names.output, &table.output);
    Ok(explanation.finish(Some("_IO.html vs _Table.html")))
}
