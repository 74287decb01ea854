use crate::check::Verdict;

/// Run outcome determining the exit code.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    /// Every checklist entry passed (exit 0).
    AllPassed,
    /// At least one entry failed or was inconclusive (exit 1).
    Issues,
    /// Input or settings refused (exit 2).
    Refusal,
}

impl Outcome {
    pub fn exit_code(self) -> u8 {
        match self {
            Outcome::AllPassed => 0,
            Outcome::Issues => 1,
            Outcome::Refusal => 2,
        }
    }

    pub fn from_verdicts(verdicts: impl IntoIterator<Item = Verdict>) -> Self {
        if verdicts.into_iter().all(|verdict| verdict == Verdict::Pass) {
            Outcome::AllPassed
        } else {
            Outcome::Issues
        }
    }
}
