//! The four wizard steps and the transition function between them.
//!
//! Progression is linear: account data -> profile -> business gallery -> admission test.
//! Moving forward from the last step submits the record instead of opening a fifth step,
//! and moving back from the first step leaves the wizard.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WizardStep {
    AccountData,
    Profile,
    BusinessGallery,
    AdmissionTest,
}

impl WizardStep {
    pub const ALL: [WizardStep; 4] = [
        WizardStep::AccountData,
        WizardStep::Profile,
        WizardStep::BusinessGallery,
        WizardStep::AdmissionTest,
    ];
    pub const FIRST: WizardStep = WizardStep::AccountData;
    pub const LAST: WizardStep = WizardStep::AdmissionTest;

    /// One-based position shown in the progress bar.
    pub const fn number(self) -> u8 {
        match self {
            WizardStep::AccountData => 1,
            WizardStep::Profile => 2,
            WizardStep::BusinessGallery => 3,
            WizardStep::AdmissionTest => 4,
        }
    }

    pub const fn from_number(number: u8) -> Option<Self> {
        match number {
            1 => Some(WizardStep::AccountData),
            2 => Some(WizardStep::Profile),
            3 => Some(WizardStep::BusinessGallery),
            4 => Some(WizardStep::AdmissionTest),
            _ => None,
        }
    }

    pub const fn label(self) -> &'static str {
        match self {
            WizardStep::AccountData => "Account data",
            WizardStep::Profile => "Profile",
            WizardStep::BusinessGallery => "Business Gallery",
            WizardStep::AdmissionTest => "Admission test",
        }
    }

    pub const fn next(self) -> Option<Self> {
        Self::from_number(self.number() + 1)
    }

    pub const fn previous(self) -> Option<Self> {
        Self::from_number(self.number() - 1)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Forward,
    Backward,
}

/// Where a navigation request leads from a given step.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transition {
    MoveTo(WizardStep),
    Submit,
    Exit,
}

pub fn transition(from: WizardStep, direction: Direction) -> Transition {
    match direction {
        Direction::Forward => from.next().map_or(Transition::Submit, Transition::MoveTo),
        Direction::Backward => from.previous().map_or(Transition::Exit, Transition::MoveTo),
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum StepState {
    Completed,
    Current,
    Upcoming,
}

/// Progress bar entry for one step.
#[derive(Debug, Clone, Serialize)]
pub struct StepProgress {
    pub step: WizardStep,
    pub number: u8,
    pub label: &'static str,
    pub state: StepState,
}

pub fn progress(current: WizardStep) -> Vec<StepProgress> {
    WizardStep::ALL
        .iter()
        .map(|&step| StepProgress {
            step,
            number: step.number(),
            label: step.label(),
            state: match step.cmp(&current) {
                std::cmp::Ordering::Less => StepState::Completed,
                std::cmp::Ordering::Equal => StepState::Current,
                std::cmp::Ordering::Greater => StepState::Upcoming,
            },
        })
        .collect()
}
