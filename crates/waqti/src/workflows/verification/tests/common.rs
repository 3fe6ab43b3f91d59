use std::collections::{BTreeMap, BTreeSet};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};

use axum::response::Response;
use chrono::{DateTime, TimeZone, Utc};
use serde_json::Value;

use crate::access::{AccessPolicy, CurrentUser, Navigator, Page};
use crate::workflows::verification::admission::ADMISSION_QUESTIONS;
use crate::workflows::verification::attachments::{Attachment, AttachmentKind};
use crate::workflows::verification::controller::{
    AccountPatch, AdmissionPatch, AdvanceOutcome, GalleryPatch, PortfolioPatch, ProfilePatch,
    StepPatch, VerificationWizard,
};
use crate::workflows::verification::domain::AnswerValue;
use crate::workflows::verification::repository::{
    FileStorage, RepositoryError, StorageError, StoredFile, SubmissionReceipt,
    VerificationSubmission, VerificationSubmitter,
};
use crate::workflows::verification::service::VerificationService;
use crate::workflows::verification::steps::WizardStep;

pub(super) const INTRODUCTION: &str =
    "I design clear product interfaces and have shipped dashboards for regional startups.";

pub(super) fn user() -> CurrentUser {
    CurrentUser {
        id: "user-42".to_string(),
        name: "Ahmad Dev".to_string(),
        email: "ahmad@example.com".to_string(),
    }
}

pub(super) fn submitted_at() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2025, 3, 14, 9, 30, 0)
        .single()
        .expect("valid timestamp")
}

#[derive(Default)]
pub(super) struct MemorySubmitter {
    submissions: Mutex<Vec<VerificationSubmission>>,
    sequence: AtomicU64,
}

impl MemorySubmitter {
    pub(super) fn submissions(&self) -> Vec<VerificationSubmission> {
        self.submissions
            .lock()
            .expect("submitter mutex poisoned")
            .clone()
    }
}

impl VerificationSubmitter for MemorySubmitter {
    fn submit(
        &self,
        submission: &VerificationSubmission,
    ) -> Result<SubmissionReceipt, RepositoryError> {
        let id = self.sequence.fetch_add(1, Ordering::Relaxed) + 1;
        self.submissions
            .lock()
            .expect("submitter mutex poisoned")
            .push(submission.clone());
        Ok(SubmissionReceipt {
            verification_id: format!("ver-{id:06}"),
            submitted_at: submitted_at(),
        })
    }
}

pub(super) struct UnavailableSubmitter;

impl VerificationSubmitter for UnavailableSubmitter {
    fn submit(
        &self,
        _submission: &VerificationSubmission,
    ) -> Result<SubmissionReceipt, RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }
}

#[derive(Default)]
pub(super) struct MemoryStorage {
    stored: Mutex<Vec<StoredFile>>,
}

impl MemoryStorage {
    pub(super) fn stored(&self) -> Vec<StoredFile> {
        self.stored.lock().expect("storage mutex poisoned").clone()
    }
}

impl FileStorage for MemoryStorage {
    fn store(&self, attachment: &Attachment) -> Result<StoredFile, StorageError> {
        let file = StoredFile {
            attachment_id: attachment.id().clone(),
            kind: attachment.kind(),
            storage_key: format!("verification/{}/{}", attachment.id().0, attachment.file_name()),
        };
        self.stored
            .lock()
            .expect("storage mutex poisoned")
            .push(file.clone());
        Ok(file)
    }
}

pub(super) struct RejectingStorage;

impl FileStorage for RejectingStorage {
    fn store(&self, attachment: &Attachment) -> Result<StoredFile, StorageError> {
        Err(StorageError::Rejected {
            file_name: attachment.file_name().to_string(),
            reason: "quota exceeded".to_string(),
        })
    }
}

#[derive(Default)]
pub(super) struct RecordingNavigator {
    pages: Mutex<Vec<Page>>,
}

impl RecordingNavigator {
    pub(super) fn pages(&self) -> Vec<Page> {
        self.pages.lock().expect("navigator mutex poisoned").clone()
    }
}

impl Navigator for RecordingNavigator {
    fn set_active_page(&self, page: Page) {
        self.pages
            .lock()
            .expect("navigator mutex poisoned")
            .push(page);
    }
}

pub(super) type TestWizard = VerificationWizard<MemorySubmitter, MemoryStorage, RecordingNavigator>;

pub(super) fn build_wizard() -> (
    TestWizard,
    Arc<MemorySubmitter>,
    Arc<MemoryStorage>,
    Arc<RecordingNavigator>,
) {
    let submitter = Arc::new(MemorySubmitter::default());
    let storage = Arc::new(MemoryStorage::default());
    let navigator = Arc::new(RecordingNavigator::default());
    let wizard = VerificationWizard::open(
        &user(),
        submitter.clone(),
        storage.clone(),
        navigator.clone(),
    );
    (wizard, submitter, storage, navigator)
}

pub(super) fn build_service() -> (
    VerificationService<MemorySubmitter, MemoryStorage>,
    Arc<MemorySubmitter>,
    Arc<MemoryStorage>,
) {
    let submitter = Arc::new(MemorySubmitter::default());
    let storage = Arc::new(MemoryStorage::default());
    let service =
        VerificationService::new(submitter.clone(), storage.clone(), AccessPolicy::default());
    (service, submitter, storage)
}

pub(super) fn thumbnail(name: &str) -> Attachment {
    Attachment::new(AttachmentKind::Thumbnail, name, mime::IMAGE_PNG, vec![0x89, 0x50, 0x4e])
        .expect("png thumbnail accepted")
}

pub(super) fn account_patch() -> StepPatch {
    StepPatch::AccountData(AccountPatch {
        terms_accepted: Some(true),
        privacy_accepted: Some(true),
        ..AccountPatch::default()
    })
}

pub(super) fn profile_patch() -> StepPatch {
    StepPatch::Profile(ProfilePatch {
        job_title: Some("Designer".to_string()),
        specialization: Some("UI/UX Design".to_string()),
        introduction: Some(INTRODUCTION.to_string()),
        skills: Some(vec![
            "Figma".to_string(),
            "Sketch".to_string(),
            "CSS".to_string(),
        ]),
        ..ProfilePatch::default()
    })
}

pub(super) fn gallery_patch() -> StepPatch {
    StepPatch::BusinessGallery(GalleryPatch {
        portfolio: vec![PortfolioPatch {
            slot: 0,
            title: Some("Banking dashboard".to_string()),
            description: Some("Redesigned the retail banking dashboard".to_string()),
            ..PortfolioPatch::default()
        }],
        testimonials: None,
    })
}

fn single(value: &str) -> AnswerValue {
    AnswerValue::Single(value.to_string())
}

fn multiple(values: &[&str]) -> AnswerValue {
    AnswerValue::Multiple(values.iter().map(|value| value.to_string()).collect::<BTreeSet<_>>())
}

pub(super) fn correct_answer(index: usize) -> AnswerValue {
    let question = &ADMISSION_QUESTIONS[index];
    let correct = question.correct_options();
    if question.is_multiple_choice() {
        multiple(&correct)
    } else {
        single(correct[0])
    }
}

pub(super) fn wrong_single_answer(index: usize) -> AnswerValue {
    let question = &ADMISSION_QUESTIONS[index];
    let correct = question.correct_options();
    let wrong = question
        .options
        .iter()
        .find(|option| !correct.contains(option))
        .expect("question has a distractor");
    single(wrong)
}

pub(super) fn perfect_answers() -> BTreeMap<String, AnswerValue> {
    ADMISSION_QUESTIONS
        .iter()
        .enumerate()
        .map(|(index, question)| (question.id.to_string(), correct_answer(index)))
        .collect()
}

/// One single-choice miss and everything else right: 3 of 4 points.
pub(super) fn three_quarter_answers() -> BTreeMap<String, AnswerValue> {
    let mut answers = perfect_answers();
    answers.insert(ADMISSION_QUESTIONS[0].id.to_string(), wrong_single_answer(0));
    answers
}

pub(super) fn multi_choice(selected: &[&str]) -> AnswerValue {
    multiple(selected)
}

pub(super) fn admission_patch(answers: BTreeMap<String, AnswerValue>) -> StepPatch {
    StepPatch::AdmissionTest(AdmissionPatch { answers })
}

/// Walk a fresh wizard through the first three steps.
pub(super) fn fill_to_admission(wizard: &mut TestWizard) {
    wizard.update_step(account_patch()).expect("account patch");
    assert_eq!(
        wizard.advance().expect("leave account step"),
        AdvanceOutcome::Moved(WizardStep::Profile)
    );
    wizard.update_step(profile_patch()).expect("profile patch");
    assert_eq!(
        wizard.advance().expect("leave profile step"),
        AdvanceOutcome::Moved(WizardStep::BusinessGallery)
    );
    wizard.update_step(gallery_patch()).expect("gallery patch");
    wizard
        .attach_thumbnail(0, thumbnail("dashboard.png"))
        .expect("thumbnail attached");
    assert_eq!(
        wizard.advance().expect("leave gallery step"),
        AdvanceOutcome::Moved(WizardStep::AdmissionTest)
    );
}

pub(super) async fn read_json_body(response: Response) -> Value {
    let body = axum::body::to_bytes(response.into_body(), 64 * 1024)
        .await
        .expect("read body");
    serde_json::from_slice(&body).expect("json payload")
}
