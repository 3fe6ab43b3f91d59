use serde::Serialize;

/// Advisory cut-off shown next to the score; submission is never blocked on it.
pub const PASS_THRESHOLD: u8 = 70;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum AdmissionVerdict {
    Passed,
    NeedsReview,
}

impl AdmissionVerdict {
    pub const fn for_score(score: u8) -> Self {
        if score >= PASS_THRESHOLD {
            AdmissionVerdict::Passed
        } else {
            AdmissionVerdict::NeedsReview
        }
    }

    pub const fn label(self) -> &'static str {
        match self {
            AdmissionVerdict::Passed => "Passed",
            AdmissionVerdict::NeedsReview => "Needs Review",
        }
    }
}
