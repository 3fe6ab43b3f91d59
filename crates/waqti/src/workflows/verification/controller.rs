use std::collections::{BTreeMap, BTreeSet};
use std::sync::Arc;

use serde::Deserialize;
use tracing::{error, info, warn};

use crate::access::{CurrentUser, Navigator, Page};

use super::admission::{AdmissionOutcome, AdmissionScoringEngine};
use super::attachments::{Attachment, AttachmentKind};
use super::domain::{
    is_username_char, AccountType, AnswerValue, Availability, LanguageSkill, Testimonial,
    UserId, VerificationRecord, VerificationStatus, MAX_TESTIMONIAL_RATING,
    MIN_TESTIMONIAL_RATING, SPECIALIZATIONS,
};
use super::gate::{GateOutcome, SubmissionGate, BLOCKED_MESSAGE};
use super::repository::{
    FileStorage, RepositoryError, StorageError, StoredFile, SubmissionReceipt,
    VerificationSubmission, VerificationSubmitter,
};
use super::steps::{transition, Direction, Transition, WizardStep};

pub const SUBMISSION_FAILED_MESSAGE: &str = "Failed to submit verification. Please try again.";

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct AccountPatch {
    pub username: Option<String>,
    pub account_type: Option<AccountType>,
    pub terms_accepted: Option<bool>,
    pub privacy_accepted: Option<bool>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct ProfilePatch {
    pub job_title: Option<String>,
    pub specialization: Option<String>,
    pub introduction: Option<String>,
    pub skills: Option<Vec<String>>,
    pub hourly_rate: Option<f64>,
    pub availability: Option<Availability>,
    pub languages: Option<Vec<LanguageSkill>>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct PortfolioPatch {
    pub slot: usize,
    pub title: Option<String>,
    pub description: Option<String>,
    pub project_url: Option<String>,
    pub skills: Option<Vec<String>>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct GalleryPatch {
    #[serde(default)]
    pub portfolio: Vec<PortfolioPatch>,
    pub testimonials: Option<Vec<Testimonial>>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct AdmissionPatch {
    #[serde(default)]
    pub answers: BTreeMap<String, AnswerValue>,
}

/// Field changes for exactly one step.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(tag = "step", rename_all = "snake_case")]
pub enum StepPatch {
    AccountData(AccountPatch),
    Profile(ProfilePatch),
    BusinessGallery(GalleryPatch),
    AdmissionTest(AdmissionPatch),
}

impl StepPatch {
    pub fn step(&self) -> WizardStep {
        match self {
            StepPatch::AccountData(_) => WizardStep::AccountData,
            StepPatch::Profile(_) => WizardStep::Profile,
            StepPatch::BusinessGallery(_) => WizardStep::BusinessGallery,
            StepPatch::AdmissionTest(_) => WizardStep::AdmissionTest,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum AdvanceOutcome {
    Moved(WizardStep),
    Blocked(GateOutcome),
    Submitted(SubmissionReceipt),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RetreatOutcome {
    Moved(WizardStep),
    /// Backing out of the first step hands control back to navigation.
    Exited,
}

#[derive(Debug, thiserror::Error)]
pub enum WizardError {
    #[error("verification is {} and can no longer be edited", .0.label())]
    Frozen(VerificationStatus),
    #[error("step {0} does not exist; steps run from 1 to 4")]
    StepOutOfRange(u8),
    #[error("username cannot be changed after the account step is completed")]
    UsernameLocked,
    #[error("username '{0}' may only contain letters, digits and underscores")]
    InvalidUsername(String),
    #[error("unknown specialization '{0}'")]
    UnknownSpecialization(String),
    #[error("skill '{0}' is listed more than once")]
    DuplicateSkill(String),
    #[error("hourly rate must be a positive number")]
    InvalidHourlyRate,
    #[error("portfolio slot {0} does not exist")]
    UnknownPortfolioSlot(usize),
    #[error("testimonial rating {0} is outside 1-5")]
    InvalidRating(u8),
    #[error("unknown admission question '{0}'")]
    UnknownQuestion(String),
    #[error("option is not offered by admission question '{0}'")]
    UnknownOption(String),
    #[error("admission test already completed")]
    AdmissionLocked,
    #[error("admission test has unanswered questions: {}", .0.join(", "))]
    AdmissionIncomplete(Vec<&'static str>),
    #[error("expected a {expected:?} attachment, got {found:?}")]
    WrongAttachmentKind {
        expected: AttachmentKind,
        found: AttachmentKind,
    },
    #[error(transparent)]
    Storage(#[from] StorageError),
    #[error(transparent)]
    Submission(#[from] RepositoryError),
}

/// Step state controller owning one in-memory verification record.
pub struct VerificationWizard<S, F, N> {
    record: VerificationRecord,
    dirty: BTreeSet<WizardStep>,
    username_locked: bool,
    last_error: Option<String>,
    gate: SubmissionGate,
    engine: AdmissionScoringEngine,
    submitter: Arc<S>,
    storage: Arc<F>,
    navigator: Arc<N>,
}

impl<S, F, N> VerificationWizard<S, F, N>
where
    S: VerificationSubmitter,
    F: FileStorage,
    N: Navigator,
{
    pub fn open(user: &CurrentUser, submitter: Arc<S>, storage: Arc<F>, navigator: Arc<N>) -> Self {
        Self::with_engine(
            user,
            AdmissionScoringEngine::default(),
            submitter,
            storage,
            navigator,
        )
    }

    pub fn with_engine(
        user: &CurrentUser,
        engine: AdmissionScoringEngine,
        submitter: Arc<S>,
        storage: Arc<F>,
        navigator: Arc<N>,
    ) -> Self {
        Self {
            record: VerificationRecord::new(UserId(user.id.clone()), &user.name),
            dirty: BTreeSet::new(),
            username_locked: false,
            last_error: None,
            gate: SubmissionGate,
            engine,
            submitter,
            storage,
            navigator,
        }
    }

    pub fn record(&self) -> &VerificationRecord {
        &self.record
    }

    pub fn current_step(&self) -> WizardStep {
        self.record.current_step
    }

    pub fn engine(&self) -> &AdmissionScoringEngine {
        &self.engine
    }

    pub fn gate(&self) -> GateOutcome {
        self.gate.check(self.record.current_step, &self.record.steps)
    }

    pub fn is_step_valid(&self, step: WizardStep) -> bool {
        self.gate.is_valid(step, &self.record.steps)
    }

    pub fn is_username_locked(&self) -> bool {
        self.username_locked
    }

    pub fn last_error(&self) -> Option<&str> {
        self.last_error.as_deref()
    }

    pub fn dismiss_error(&mut self) {
        self.last_error = None;
    }

    pub fn is_dirty(&self, step: WizardStep) -> bool {
        self.dirty.contains(&step)
    }

    /// Hand the dirty steps to the view layer and reset the markers.
    pub fn take_dirty(&mut self) -> Vec<WizardStep> {
        std::mem::take(&mut self.dirty).into_iter().collect()
    }

    pub fn update_step(&mut self, patch: StepPatch) -> Result<(), WizardError> {
        self.ensure_editable()?;
        let step = patch.step();

        match patch {
            StepPatch::AccountData(patch) => self.apply_account(patch)?,
            StepPatch::Profile(patch) => self.apply_profile(patch)?,
            StepPatch::BusinessGallery(patch) => self.apply_gallery(patch)?,
            StepPatch::AdmissionTest(patch) => self.apply_admission(patch)?,
        }

        self.touch(step);
        Ok(())
    }

    fn apply_account(&mut self, patch: AccountPatch) -> Result<(), WizardError> {
        let mut account = self.record.steps.account_data.clone();

        if let Some(username) = patch.username {
            if username != account.username {
                if self.username_locked {
                    return Err(WizardError::UsernameLocked);
                }
                if !username.chars().all(is_username_char) {
                    return Err(WizardError::InvalidUsername(username));
                }
                account.username = username;
            }
        }
        if let Some(account_type) = patch.account_type {
            account.account_type = account_type;
        }
        if let Some(accepted) = patch.terms_accepted {
            account.terms_accepted = accepted;
        }
        if let Some(accepted) = patch.privacy_accepted {
            account.privacy_accepted = accepted;
        }

        self.record.steps.account_data = account;
        Ok(())
    }

    fn apply_profile(&mut self, patch: ProfilePatch) -> Result<(), WizardError> {
        let mut profile = self.record.steps.profile.clone();

        if let Some(job_title) = patch.job_title {
            profile.job_title = job_title;
        }
        if let Some(specialization) = patch.specialization {
            if !specialization.is_empty() && !SPECIALIZATIONS.contains(&specialization.as_str()) {
                return Err(WizardError::UnknownSpecialization(specialization));
            }
            profile.specialization = specialization;
        }
        if let Some(introduction) = patch.introduction {
            profile.introduction = introduction;
        }
        if let Some(skills) = patch.skills {
            profile.skills.clear();
            for skill in &skills {
                if !profile.add_skill(skill) && !skill.trim().is_empty() {
                    return Err(WizardError::DuplicateSkill(skill.trim().to_string()));
                }
            }
        }
        if let Some(rate) = patch.hourly_rate {
            if !rate.is_finite() || rate <= 0.0 {
                return Err(WizardError::InvalidHourlyRate);
            }
            profile.hourly_rate = rate;
        }
        if let Some(availability) = patch.availability {
            profile.availability = availability;
        }
        if let Some(languages) = patch.languages {
            profile.languages = languages;
        }

        self.record.steps.profile = profile;
        Ok(())
    }

    fn apply_gallery(&mut self, patch: GalleryPatch) -> Result<(), WizardError> {
        let mut items = self.record.steps.business_gallery.portfolio_items.clone();

        for item_patch in patch.portfolio {
            let item = items
                .get_mut(item_patch.slot)
                .ok_or(WizardError::UnknownPortfolioSlot(item_patch.slot))?;
            if let Some(title) = item_patch.title {
                item.title = title;
            }
            if let Some(description) = item_patch.description {
                item.description = description;
            }
            if let Some(url) = item_patch.project_url {
                item.project_url = if url.trim().is_empty() { None } else { Some(url) };
            }
            if let Some(skills) = item_patch.skills {
                item.skills = skills;
            }
        }

        if let Some(testimonials) = &patch.testimonials {
            validate_testimonials(testimonials)?;
        }

        let gallery = &mut self.record.steps.business_gallery;
        gallery.portfolio_items = items;
        if let Some(testimonials) = patch.testimonials {
            gallery.testimonials = testimonials;
        }
        Ok(())
    }

    fn apply_admission(&mut self, patch: AdmissionPatch) -> Result<(), WizardError> {
        if self.record.steps.admission_test.completed {
            return Err(WizardError::AdmissionLocked);
        }

        for (question_id, answer) in &patch.answers {
            let question = self
                .engine
                .question(question_id)
                .ok_or_else(|| WizardError::UnknownQuestion(question_id.clone()))?;
            let offered = |value: &String| question.options.iter().any(|option| option == value);
            let valid = match answer {
                AnswerValue::Single(value) => value.is_empty() || offered(value),
                AnswerValue::Multiple(values) => values.iter().all(offered),
            };
            if !valid {
                return Err(WizardError::UnknownOption(question_id.clone()));
            }
        }

        self.record.steps.admission_test.answers.extend(patch.answers);
        Ok(())
    }

    pub fn add_skill(&mut self, skill: &str) -> Result<bool, WizardError> {
        self.ensure_editable()?;
        let added = self.record.steps.profile.add_skill(skill);
        if added {
            self.touch(WizardStep::Profile);
        }
        Ok(added)
    }

    pub fn remove_skill(&mut self, skill: &str) -> Result<bool, WizardError> {
        self.ensure_editable()?;
        let removed = self.record.steps.profile.remove_skill(skill);
        if removed {
            self.touch(WizardStep::Profile);
        }
        Ok(removed)
    }

    /// Toggle one option of a multi-choice answer, the way a checkbox does.
    pub fn toggle_choice(
        &mut self,
        question_id: &str,
        option: &str,
        checked: bool,
    ) -> Result<(), WizardError> {
        self.ensure_editable()?;
        let mut selected = match self.record.steps.admission_test.answers.get(question_id) {
            Some(AnswerValue::Multiple(values)) => values.clone(),
            _ => BTreeSet::new(),
        };
        if checked {
            selected.insert(option.to_string());
        } else {
            selected.remove(option);
        }

        let mut answers = BTreeMap::new();
        answers.insert(question_id.to_string(), AnswerValue::Multiple(selected));
        self.update_step(StepPatch::AdmissionTest(AdmissionPatch { answers }))
    }

    /// Place a thumbnail in a portfolio slot, returning the attachment it replaced.
    pub fn attach_thumbnail(
        &mut self,
        slot: usize,
        attachment: Attachment,
    ) -> Result<Option<Attachment>, WizardError> {
        self.ensure_editable()?;
        expect_kind(&attachment, AttachmentKind::Thumbnail)?;
        let item = self
            .record
            .steps
            .business_gallery
            .portfolio_items
            .get_mut(slot)
            .ok_or(WizardError::UnknownPortfolioSlot(slot))?;

        let mut replaced = item.thumbnail.replace(attachment);
        if let Some(previous) = replaced.as_mut() {
            previous.release_preview();
        }
        self.touch(WizardStep::BusinessGallery);
        Ok(replaced)
    }

    pub fn add_portfolio_image(
        &mut self,
        slot: usize,
        attachment: Attachment,
    ) -> Result<(), WizardError> {
        self.ensure_editable()?;
        expect_kind(&attachment, AttachmentKind::PortfolioImage)?;
        self.record
            .steps
            .business_gallery
            .portfolio_items
            .get_mut(slot)
            .ok_or(WizardError::UnknownPortfolioSlot(slot))?
            .images
            .push(attachment);
        self.touch(WizardStep::BusinessGallery);
        Ok(())
    }

    pub fn add_certificate(&mut self, attachment: Attachment) -> Result<(), WizardError> {
        self.ensure_editable()?;
        expect_kind(&attachment, AttachmentKind::Certificate)?;
        self.record
            .steps
            .business_gallery
            .certificates
            .push(attachment);
        self.touch(WizardStep::BusinessGallery);
        Ok(())
    }

    pub fn add_testimonial(&mut self, testimonial: Testimonial) -> Result<(), WizardError> {
        self.ensure_editable()?;
        validate_testimonials(std::slice::from_ref(&testimonial))?;
        self.record
            .steps
            .business_gallery
            .testimonials
            .push(testimonial);
        self.touch(WizardStep::BusinessGallery);
        Ok(())
    }

    pub fn thumbnail_preview(&mut self, slot: usize) -> Option<String> {
        self.record
            .steps
            .business_gallery
            .portfolio_items
            .get_mut(slot)?
            .thumbnail
            .as_mut()
            .map(|thumbnail| thumbnail.preview_url().to_string())
    }

    /// Score the quiz once; afterwards answers and score are fixed.
    pub fn complete_admission_test(&mut self) -> Result<AdmissionOutcome, WizardError> {
        self.ensure_editable()?;
        let test = &self.record.steps.admission_test;
        if test.completed {
            return Err(WizardError::AdmissionLocked);
        }
        if !self.engine.is_complete(&test.answers) {
            return Err(WizardError::AdmissionIncomplete(
                self.engine.unanswered(&test.answers),
            ));
        }

        let outcome = self.engine.score(&test.answers);
        let test = &mut self.record.steps.admission_test;
        test.completed = true;
        test.score = Some(outcome.score);
        self.touch(WizardStep::AdmissionTest);

        info!(
            user_id = %self.record.user_id.0,
            score = outcome.score,
            verdict = outcome.verdict.label(),
            "admission test scored"
        );
        Ok(outcome)
    }

    /// Open the terms of service from the account step. The draft stays in memory.
    pub fn view_terms(&self) {
        self.navigator.set_active_page(Page::Terms);
    }

    pub fn view_privacy_policy(&self) {
        self.navigator.set_active_page(Page::Privacy);
    }

    /// Jump to a step by number. Prerequisites are the caller's concern.
    pub fn go_to_step(&mut self, number: u8) -> Result<WizardStep, WizardError> {
        self.ensure_editable()?;
        let step = WizardStep::from_number(number).ok_or(WizardError::StepOutOfRange(number))?;
        self.move_to(step);
        Ok(step)
    }

    pub fn advance(&mut self) -> Result<AdvanceOutcome, WizardError> {
        self.ensure_editable()?;
        let current = self.record.current_step;

        let outcome = self.gate.check(current, &self.record.steps);
        if !outcome.is_open() {
            warn!(user_id = %self.record.user_id.0, step = current.number(), "advance blocked by gate");
            self.last_error = Some(BLOCKED_MESSAGE.to_string());
            return Ok(AdvanceOutcome::Blocked(outcome));
        }
        self.last_error = None;

        let next = match transition(current, Direction::Forward) {
            Transition::MoveTo(next) => next,
            Transition::Submit | Transition::Exit => return self.submit(),
        };

        self.move_to(next);
        Ok(AdvanceOutcome::Moved(next))
    }

    pub fn retreat(&mut self) -> Result<RetreatOutcome, WizardError> {
        self.ensure_editable()?;
        match transition(self.record.current_step, Direction::Backward) {
            Transition::MoveTo(previous) => {
                self.move_to(previous);
                Ok(RetreatOutcome::Moved(previous))
            }
            Transition::Exit | Transition::Submit => {
                self.navigator.set_active_page(Page::Dashboard);
                Ok(RetreatOutcome::Exited)
            }
        }
    }

    /// Leave the wizard without submitting. Returns how many previews were released.
    pub fn discard(mut self) -> usize {
        let released = self.release_previews();
        info!(user_id = %self.record.user_id.0, released, "verification draft discarded");
        released
    }

    fn submit(&mut self) -> Result<AdvanceOutcome, WizardError> {
        let all = self.gate.check_all(&self.record.steps);
        if !all.is_open() {
            warn!(user_id = %self.record.user_id.0, "submission blocked by an incomplete earlier step");
            self.last_error = Some(BLOCKED_MESSAGE.to_string());
            return Ok(AdvanceOutcome::Blocked(all));
        }

        let files = match self.upload_attachments() {
            Ok(files) => files,
            Err(err) => {
                error!(user_id = %self.record.user_id.0, error = %err, "attachment upload failed");
                self.last_error = Some(SUBMISSION_FAILED_MESSAGE.to_string());
                return Err(err.into());
            }
        };

        let submission = VerificationSubmission {
            record: self.record.clone(),
            files,
        };
        let receipt = match self.submitter.submit(&submission) {
            Ok(receipt) => receipt,
            Err(err) => {
                error!(user_id = %self.record.user_id.0, error = %err, "verification submission failed");
                self.last_error = Some(SUBMISSION_FAILED_MESSAGE.to_string());
                return Err(err.into());
            }
        };

        self.record.status = VerificationStatus::UnderReview;
        self.record.submitted_at = Some(receipt.submitted_at);
        self.last_error = None;
        self.release_previews();
        self.navigator.set_active_page(Page::Dashboard);

        info!(
            user_id = %self.record.user_id.0,
            verification_id = %receipt.verification_id,
            "verification submitted for review"
        );
        Ok(AdvanceOutcome::Submitted(receipt))
    }

    fn upload_attachments(&self) -> Result<Vec<StoredFile>, StorageError> {
        self.record
            .steps
            .business_gallery
            .attachments()
            .map(|attachment| self.storage.store(attachment))
            .collect()
    }

    fn release_previews(&mut self) -> usize {
        self.record
            .steps
            .business_gallery
            .attachments_mut()
            .filter_map(|attachment| attachment.release_preview().then_some(()))
            .count()
    }

    fn ensure_editable(&self) -> Result<(), WizardError> {
        if self.record.status.is_editable() {
            Ok(())
        } else {
            Err(WizardError::Frozen(self.record.status))
        }
    }

    /// Leaving a valid account step forward, by any route, fixes the username.
    fn move_to(&mut self, step: WizardStep) {
        let leaving_account = self.record.current_step == WizardStep::AccountData
            && step > WizardStep::AccountData;
        if leaving_account
            && !self.username_locked
            && self.gate.is_valid(WizardStep::AccountData, &self.record.steps)
        {
            info!(user_id = %self.record.user_id.0, "username locked");
            self.username_locked = true;
        }
        self.record.current_step = step;
        if self.record.status == VerificationStatus::Pending {
            self.record.status = VerificationStatus::InProgress;
        }
    }

    fn touch(&mut self, step: WizardStep) {
        self.dirty.insert(step);
        if self.record.status == VerificationStatus::Pending {
            self.record.status = VerificationStatus::InProgress;
        }
    }
}

fn expect_kind(attachment: &Attachment, expected: AttachmentKind) -> Result<(), WizardError> {
    if attachment.kind() == expected {
        Ok(())
    } else {
        Err(WizardError::WrongAttachmentKind {
            expected,
            found: attachment.kind(),
        })
    }
}

fn validate_testimonials(testimonials: &[Testimonial]) -> Result<(), WizardError> {
    match testimonials.iter().find(|testimonial| {
        !(MIN_TESTIMONIAL_RATING..=MAX_TESTIMONIAL_RATING).contains(&testimonial.rating)
    }) {
        Some(testimonial) => Err(WizardError::InvalidRating(testimonial.rating)),
        None => Ok(()),
    }
}
