use crate::check::{Explanation, code};

/// Cross-format variable name equivalence.
///
/// `@name` on the left matches any right-hand name ending with it. When both
/// sides start with `$`, one level is stripped from the left and two from the
/// right before comparing again.
pub fn is_same_var(left: &str, right: &str) -> bool {
    if left == right {
        return true;
    }
    if left.starts_with('@') && right.ends_with(left) {
        return true;
    }
    if left.starts_with('$') && right.starts_with('$') {
        let left_rest: String = left.chars().skip(1).collect();
        let right_rest: String = right.chars().skip(2).collect();
        return is_same_var(&left_rest, &right_rest);
    }
    false
}

/// Positional comparison of two variable lists under [`is_same_var`].
///
/// A length difference and per-index differences (over the shared prefix)
/// are both recorded when both occur. Indices are 0-based.
pub fn compare_lists(
    explanation: &mut Explanation,
    label: &str,
    expected: &[String],
    actual: &[String],
) {
    if expected.len() != actual.len() {
        explanation.fail(format!(
            "{label} length: {}",
            code(format!("{} != {}", expected.len(), actual.len()))
        ));
    }
    for (index, (left, right)) in expected.iter().zip(actual).enumerate() {
        if !is_same_var(left, right) {
            explanation.fail(format!(
                "{label} index.{index} {}",
                code(format!("{left} != {right}"))
            ));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{compare_lists, is_same_var};
    use crate::check::{CheckOutcome, Explanation, Verdict};

    fn names(values: &[&str]) -> Vec<String> {
        values.iter().map(|value| (*value).to_owned()).collect()
    }

    #[test]
    fn exact_names_match() {
        assert!(is_same_var("speed", "speed"));
        assert!(!is_same_var("speed", "Speed"));
    }

    #[test]
    fn argument_alias_matches_suffix() {
        assert!(is_same_var("@foo", "x@foo"));
        assert!(is_same_var("@foo", "Motor_Step@foo"));
        assert!(!is_same_var("x@foo", "@foo"));
        assert!(!is_same_var("@foo", "foo"));
    }

    #[test]
    fn pointer_levels_strip_asymmetrically() {
        // "$$a" -> "$a" vs "$$$$a" -> "$$a"; then "a" vs "a".
        assert!(is_same_var("$$a", "$$$$a"));
        // "$a" -> "a" vs "$$a" -> "a".
        assert!(is_same_var("$a", "$$a"));
        // "$a" -> "a" vs "$b$a" -> "$a".
        assert!(!is_same_var("$a", "$b$a"));
        assert!(!is_same_var("$$a", "$$a$"));
    }

    #[test]
    fn pointer_stripping_reaches_argument_rule() {
        // "$@p" -> "@p" vs "$$x@p" -> "x@p".
        assert!(is_same_var("$@p", "$$x@p"));
    }

    #[test]
    fn reports_length_and_element_differences_together() {
        let mut explanation = Explanation::new();
        compare_lists(
            &mut explanation,
            "Input",
            &names(&["a", "b", "c"]),
            &names(&["a", "x"]),
        );
        let outcome = explanation.finish(None);
        assert_eq!(outcome.verdict, Verdict::Fail);
        assert_eq!(
            outcome.explanation,
            "Input length: <code>3 != 2</code><br>Input index.1 <code>b != x</code>"
        );
    }

    #[test]
    fn first_element_is_index_zero() {
        let mut explanation = Explanation::new();
        compare_lists(&mut explanation, "Output", &names(&["a"]), &names(&["b"]));
        assert_eq!(
            explanation.finish(None).explanation,
            "Output index.0 <code>a != b</code>"
        );
    }

    #[test]
    fn equal_lists_pass() {
        let mut explanation = Explanation::new();
        compare_lists(
            &mut explanation,
            "Output",
            &names(&["@speed", "$$p"]),
            &names(&["Motor@speed", "$$$$p"]),
        );
        assert_eq!(explanation.finish(None), CheckOutcome::pass());
    }
}
