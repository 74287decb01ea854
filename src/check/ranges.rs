/// Render integers as comma-separated runs, e.g. `1~3, 5~6, 9`.
///
/// The gap test starts at the third element, so the first two numbers always
/// share a run: `[1, 3, 4]` renders as `1~4`. Existing reports depend on this.
pub fn collapse(numbers: &[u64]) -> String {
    let mut sorted = numbers.to_vec();
    sorted.sort_unstable();
    let Some(&last) = sorted.last() else {
        return String::new();
    };

    let render = |first: u64, last: u64| {
        if first == last {
            first.to_string()
        } else {
            format!("{first}~{last}")
        }
    };

    let mut runs = Vec::new();
    let mut start = 0;
    for index in 2..sorted.len() {
        if sorted[index] - sorted[index - 1] > 1 {
            runs.push(render(sorted[start], sorted[index - 1]));
            start = index;
        }
    }
    runs.push(render(sorted[start], last));
    runs.join(", ")
}
