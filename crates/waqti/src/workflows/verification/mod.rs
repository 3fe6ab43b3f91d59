//! Freelancer verification wizard.
//!
//! Four linear steps collect account data, a professional profile, a business gallery and
//! an admission quiz. The wizard keeps one in-memory record per user, gates forward moves on
//! per-step predicates, and hands the finished record to the data store exactly once.

pub mod admission;
pub mod attachments;
pub mod controller;
pub mod domain;
pub mod gate;
pub mod repository;
pub mod router;
pub mod service;
pub mod steps;

#[cfg(test)]
mod tests;

pub use admission::{
    AdmissionOutcome, AdmissionQuestion, AdmissionScoringEngine, AdmissionVerdict, QuestionKind,
    QuestionScore, ADMISSION_QUESTIONS, PASS_THRESHOLD,
};
pub use attachments::{Attachment, AttachmentError, AttachmentId, AttachmentKind};
pub use controller::{
    AccountPatch, AdmissionPatch, AdvanceOutcome, GalleryPatch, PortfolioPatch, ProfilePatch,
    RetreatOutcome, StepPatch, VerificationWizard, WizardError, SUBMISSION_FAILED_MESSAGE,
};
pub use domain::{
    AccountData, AccountType, AdmissionTestData, AnswerValue, Availability, BusinessGallery,
    LanguageSkill, PortfolioItem, Proficiency, ProfileData, Testimonial, UserId,
    VerificationRecord, VerificationStatus, VerificationSteps,
};
pub use gate::{GateOutcome, Requirement, SubmissionGate, BLOCKED_MESSAGE};
pub use repository::{
    FileStorage, RepositoryError, StorageError, StoredFile, SubmissionReceipt,
    VerificationSubmission, VerificationSubmitter,
};
pub use router::verification_router;
pub use service::{NavigationOutcome, VerificationService, VerificationServiceError, WizardView};
pub use steps::{progress, transition, Direction, StepProgress, StepState, Transition, WizardStep};
