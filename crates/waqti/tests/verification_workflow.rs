//! Integration scenarios for the freelancer verification wizard.
//!
//! Scenarios drive the public wizard and HTTP router end to end with in-memory collaborators,
//! covering gating, admission scoring and the single write at submission.

mod common {
    use std::collections::{BTreeMap, BTreeSet};
    use std::sync::{Arc, Mutex};

    use chrono::{TimeZone, Utc};

    use waqti::access::{CurrentUser, Navigator, Page};
    use waqti::workflows::verification::{
        AccountPatch, AdmissionPatch, AdvanceOutcome, AnswerValue, Attachment, AttachmentKind,
        FileStorage, GalleryPatch, PortfolioPatch, ProfilePatch, RepositoryError, StepPatch,
        StorageError, StoredFile, SubmissionReceipt, VerificationSubmission, VerificationSubmitter,
        VerificationWizard, WizardStep, ADMISSION_QUESTIONS,
    };

    pub(super) fn freelancer() -> CurrentUser {
        CurrentUser {
            id: "user-42".to_string(),
            name: "Ahmad Dev".to_string(),
            email: "ahmad@example.com".to_string(),
        }
    }

    #[derive(Default)]
    pub(super) struct RecordingSubmitter {
        submissions: Mutex<Vec<VerificationSubmission>>,
        pub(super) offline: bool,
    }

    impl RecordingSubmitter {
        pub(super) fn offline() -> Self {
            Self {
                offline: true,
                ..Self::default()
            }
        }

        pub(super) fn submissions(&self) -> Vec<VerificationSubmission> {
            self.submissions
                .lock()
                .expect("submitter mutex poisoned")
                .clone()
        }
    }

    impl VerificationSubmitter for RecordingSubmitter {
        fn submit(
            &self,
            submission: &VerificationSubmission,
        ) -> Result<SubmissionReceipt, RepositoryError> {
            if self.offline {
                return Err(RepositoryError::Unavailable("connection reset".to_string()));
            }
            self.submissions
                .lock()
                .expect("submitter mutex poisoned")
                .push(submission.clone());
            Ok(SubmissionReceipt {
                verification_id: "ver-000001".to_string(),
                submitted_at: Utc
                    .with_ymd_and_hms(2025, 3, 14, 9, 30, 0)
                    .single()
                    .expect("valid timestamp"),
            })
        }
    }

    #[derive(Default)]
    pub(super) struct BucketStorage {
        files: Mutex<Vec<StoredFile>>,
    }

    impl BucketStorage {
        pub(super) fn files(&self) -> Vec<StoredFile> {
            self.files.lock().expect("storage mutex poisoned").clone()
        }
    }

    impl FileStorage for BucketStorage {
        fn store(&self, attachment: &Attachment) -> Result<StoredFile, StorageError> {
            let file = StoredFile {
                attachment_id: attachment.id().clone(),
                kind: attachment.kind(),
                storage_key: format!("bucket/{}", attachment.file_name()),
            };
            self.files
                .lock()
                .expect("storage mutex poisoned")
                .push(file.clone());
            Ok(file)
        }
    }

    #[derive(Default)]
    pub(super) struct PageLog {
        pages: Mutex<Vec<Page>>,
    }

    impl PageLog {
        pub(super) fn last(&self) -> Option<Page> {
            self.pages
                .lock()
                .expect("page log mutex poisoned")
                .last()
                .copied()
        }
    }

    impl Navigator for PageLog {
        fn set_active_page(&self, page: Page) {
            self.pages
                .lock()
                .expect("page log mutex poisoned")
                .push(page);
        }
    }

    pub(super) type Wizard = VerificationWizard<RecordingSubmitter, BucketStorage, PageLog>;

    pub(super) fn wizard_with(
        submitter: RecordingSubmitter,
    ) -> (Wizard, Arc<RecordingSubmitter>, Arc<BucketStorage>, Arc<PageLog>) {
        let submitter = Arc::new(submitter);
        let storage = Arc::new(BucketStorage::default());
        let pages = Arc::new(PageLog::default());
        let wizard =
            VerificationWizard::open(&freelancer(), submitter.clone(), storage.clone(), pages.clone());
        (wizard, submitter, storage, pages)
    }

    pub(super) fn complete_first_three_steps(wizard: &mut Wizard) {
        wizard
            .update_step(StepPatch::AccountData(AccountPatch {
                terms_accepted: Some(true),
                privacy_accepted: Some(true),
                ..AccountPatch::default()
            }))
            .expect("account data accepted");
        assert_eq!(
            wizard.advance().expect("account step left"),
            AdvanceOutcome::Moved(WizardStep::Profile)
        );

        wizard
            .update_step(StepPatch::Profile(ProfilePatch {
                job_title: Some("Designer".to_string()),
                specialization: Some("UI/UX Design".to_string()),
                introduction: Some(
                    "I design clear product interfaces and have shipped dashboards for startups."
                        .to_string(),
                ),
                skills: Some(vec![
                    "Figma".to_string(),
                    "Sketch".to_string(),
                    "CSS".to_string(),
                ]),
                ..ProfilePatch::default()
            }))
            .expect("profile accepted");
        assert_eq!(
            wizard.advance().expect("profile step left"),
            AdvanceOutcome::Moved(WizardStep::BusinessGallery)
        );

        wizard
            .update_step(StepPatch::BusinessGallery(GalleryPatch {
                portfolio: vec![PortfolioPatch {
                    slot: 0,
                    title: Some("Banking dashboard".to_string()),
                    description: Some("Redesigned a retail banking dashboard".to_string()),
                    ..PortfolioPatch::default()
                }],
                testimonials: None,
            }))
            .expect("gallery accepted");
        let thumbnail = Attachment::new(
            AttachmentKind::Thumbnail,
            "dashboard.png",
            mime::IMAGE_PNG,
            vec![0x89, 0x50, 0x4e, 0x47],
        )
        .expect("png thumbnail");
        wizard
            .attach_thumbnail(0, thumbnail)
            .expect("thumbnail attached");
        assert_eq!(
            wizard.advance().expect("gallery step left"),
            AdvanceOutcome::Moved(WizardStep::AdmissionTest)
        );
    }

    /// Misses the first single-choice question and answers the rest correctly.
    pub(super) fn three_of_four_answers() -> StepPatch {
        let answers: BTreeMap<String, AnswerValue> = ADMISSION_QUESTIONS
            .iter()
            .enumerate()
            .map(|(index, question)| {
                let correct = question.correct_options();
                let answer = if question.is_multiple_choice() {
                    AnswerValue::Multiple(
                        correct.iter().map(|option| option.to_string()).collect::<BTreeSet<_>>(),
                    )
                } else if index == 0 {
                    let wrong = question
                        .options
                        .iter()
                        .find(|option| !correct.contains(option))
                        .expect("question has a distractor");
                    AnswerValue::Single(wrong.to_string())
                } else {
                    AnswerValue::Single(correct[0].to_string())
                };
                (question.id.to_string(), answer)
            })
            .collect();
        StepPatch::AdmissionTest(AdmissionPatch { answers })
    }
}

use common::*;
use waqti::access::Page;
use waqti::workflows::verification::{
    AdvanceOutcome, AdmissionVerdict, AttachmentKind, GateOutcome, VerificationStatus, WizardError,
    WizardStep,
};

#[test]
fn full_submission_reaches_under_review_with_score_75() {
    let (mut wizard, submitter, storage, pages) = wizard_with(RecordingSubmitter::default());

    complete_first_three_steps(&mut wizard);
    assert_eq!(wizard.current_step(), WizardStep::AdmissionTest);

    wizard
        .update_step(three_of_four_answers())
        .expect("answers recorded");
    let outcome = wizard.complete_admission_test().expect("test completes");
    assert_eq!(outcome.score, 75);
    assert_eq!(outcome.verdict, AdmissionVerdict::Passed);

    match wizard.advance().expect("submission runs") {
        AdvanceOutcome::Submitted(receipt) => assert_eq!(receipt.verification_id, "ver-000001"),
        other => panic!("expected submission, got {other:?}"),
    }

    let record = wizard.record();
    assert_eq!(record.status, VerificationStatus::UnderReview);
    assert!(record.submitted_at.is_some());
    assert_eq!(record.steps.admission_test.score, Some(75));
    assert_eq!(pages.last(), Some(Page::Dashboard));

    let submissions = submitter.submissions();
    assert_eq!(submissions.len(), 1);
    assert_eq!(submissions[0].files.len(), 1);
    assert_eq!(storage.files()[0].kind, AttachmentKind::Thumbnail);
}

#[test]
fn gate_blocks_until_account_terms_are_accepted() {
    let (mut wizard, _, _, _) = wizard_with(RecordingSubmitter::default());
    let before = wizard.record().clone();

    match wizard.advance().expect("advance evaluates") {
        AdvanceOutcome::Blocked(GateOutcome::Blocked { step, missing }) => {
            assert_eq!(step, WizardStep::AccountData);
            assert!(!missing.is_empty());
        }
        other => panic!("expected gate block, got {other:?}"),
    }
    assert_eq!(wizard.current_step(), WizardStep::AccountData);
    assert_eq!(wizard.record().steps, before.steps);
}

#[test]
fn failed_submission_keeps_the_record_editable() {
    let (mut wizard, submitter, _, pages) = wizard_with(RecordingSubmitter::offline());

    complete_first_three_steps(&mut wizard);
    wizard
        .update_step(three_of_four_answers())
        .expect("answers recorded");
    wizard.complete_admission_test().expect("test completes");

    let error = wizard.advance().expect_err("submission fails");
    assert!(matches!(error, WizardError::Submission(_)));
    assert_eq!(wizard.current_step(), WizardStep::AdmissionTest);
    assert!(wizard.record().status.is_editable());
    assert_eq!(wizard.record().submitted_at, None);
    assert!(wizard.last_error().is_some());
    assert!(submitter.submissions().is_empty());
    assert_ne!(pages.last(), Some(Page::Dashboard));
}
