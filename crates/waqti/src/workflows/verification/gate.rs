use serde::Serialize;

use super::domain::{AccountData, AdmissionTestData, BusinessGallery, ProfileData, VerificationSteps};
use super::steps::WizardStep;

pub const MIN_USERNAME_CHARS: usize = 3;
pub const MIN_JOB_TITLE_CHARS: usize = 3;
pub const MIN_INTRODUCTION_CHARS: usize = 50;
pub const MIN_SKILLS: usize = 3;

pub const BLOCKED_MESSAGE: &str = "Please complete all required fields before proceeding.";

/// A single unmet requirement for a wizard step.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Requirement {
    UsernameTooShort,
    TermsNotAccepted,
    PrivacyNotAccepted,
    JobTitleTooShort,
    SpecializationMissing,
    IntroductionTooShort,
    NotEnoughSkills,
    NoShowcasePortfolioItem,
    AdmissionTestIncomplete,
}

impl Requirement {
    pub fn message(self) -> String {
        match self {
            Requirement::UsernameTooShort => {
                format!("username must be at least {MIN_USERNAME_CHARS} characters")
            }
            Requirement::TermsNotAccepted => "terms of service must be accepted".to_string(),
            Requirement::PrivacyNotAccepted => "privacy policy must be accepted".to_string(),
            Requirement::JobTitleTooShort => {
                format!("job title must be at least {MIN_JOB_TITLE_CHARS} characters")
            }
            Requirement::SpecializationMissing => "choose a specialization".to_string(),
            Requirement::IntroductionTooShort => {
                format!("introduction must be at least {MIN_INTRODUCTION_CHARS} characters")
            }
            Requirement::NotEnoughSkills => format!("add at least {MIN_SKILLS} skills"),
            Requirement::NoShowcasePortfolioItem => {
                "complete at least one portfolio item with title, description and thumbnail"
                    .to_string()
            }
            Requirement::AdmissionTestIncomplete => "complete the admission test".to_string(),
        }
    }
}

/// Read-only verdict on whether a step may be left in the forward direction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum GateOutcome {
    Open,
    Blocked {
        step: WizardStep,
        missing: Vec<Requirement>,
    },
}

impl GateOutcome {
    pub fn is_open(&self) -> bool {
        matches!(self, GateOutcome::Open)
    }

    fn from_missing(step: WizardStep, missing: Vec<Requirement>) -> Self {
        if missing.is_empty() {
            GateOutcome::Open
        } else {
            GateOutcome::Blocked { step, missing }
        }
    }
}

/// Stateless validity predicates, one per step.
#[derive(Debug, Clone, Copy, Default)]
pub struct SubmissionGate;

impl SubmissionGate {
    pub fn check(&self, step: WizardStep, steps: &VerificationSteps) -> GateOutcome {
        let missing = match step {
            WizardStep::AccountData => account_requirements(&steps.account_data),
            WizardStep::Profile => profile_requirements(&steps.profile),
            WizardStep::BusinessGallery => gallery_requirements(&steps.business_gallery),
            WizardStep::AdmissionTest => admission_requirements(&steps.admission_test),
        };
        GateOutcome::from_missing(step, missing)
    }

    pub fn is_valid(&self, step: WizardStep, steps: &VerificationSteps) -> bool {
        self.check(step, steps).is_open()
    }

    /// Final submission requires every step to hold, not just the active one.
    pub fn check_all(&self, steps: &VerificationSteps) -> GateOutcome {
        WizardStep::ALL
            .iter()
            .map(|&step| self.check(step, steps))
            .find(|outcome| !outcome.is_open())
            .unwrap_or(GateOutcome::Open)
    }
}

fn char_len(value: &str) -> usize {
    value.chars().count()
}

fn account_requirements(account: &AccountData) -> Vec<Requirement> {
    let mut missing = Vec::new();
    if char_len(&account.username) < MIN_USERNAME_CHARS {
        missing.push(Requirement::UsernameTooShort);
    }
    if !account.terms_accepted {
        missing.push(Requirement::TermsNotAccepted);
    }
    if !account.privacy_accepted {
        missing.push(Requirement::PrivacyNotAccepted);
    }
    missing
}

fn profile_requirements(profile: &ProfileData) -> Vec<Requirement> {
    let mut missing = Vec::new();
    if char_len(&profile.job_title) < MIN_JOB_TITLE_CHARS {
        missing.push(Requirement::JobTitleTooShort);
    }
    if profile.specialization.is_empty() {
        missing.push(Requirement::SpecializationMissing);
    }
    if char_len(&profile.introduction) < MIN_INTRODUCTION_CHARS {
        missing.push(Requirement::IntroductionTooShort);
    }
    if profile.skills.len() < MIN_SKILLS {
        missing.push(Requirement::NotEnoughSkills);
    }
    missing
}

fn gallery_requirements(gallery: &BusinessGallery) -> Vec<Requirement> {
    if gallery.showcase_ready_count() == 0 {
        vec![Requirement::NoShowcasePortfolioItem]
    } else {
        Vec::new()
    }
}

fn admission_requirements(test: &AdmissionTestData) -> Vec<Requirement> {
    if test.completed {
        Vec::new()
    } else {
        vec![Requirement::AdmissionTestIncomplete]
    }
}
