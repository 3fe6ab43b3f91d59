use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};

use mime::Mime;
use serde::Serialize;
use tracing::info;

use crate::access::{AccessPolicy, CurrentUser, Page, PendingNavigation};

use super::admission::AdmissionVerdict;
use super::attachments::{Attachment, AttachmentError, AttachmentKind};
use super::controller::{AdvanceOutcome, RetreatOutcome, StepPatch, VerificationWizard, WizardError};
use super::domain::{Testimonial, UserId, VerificationRecord};
use super::gate::GateOutcome;
use super::repository::{FileStorage, SubmissionReceipt, VerificationSubmitter};
use super::steps::{progress, StepProgress, WizardStep};

type Wizard<S, F> = VerificationWizard<S, F, PendingNavigation>;

struct Session<S, F> {
    wizard: Wizard<S, F>,
    navigation: Arc<PendingNavigation>,
}

/// Result of a navigation request, reported next to the refreshed view.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum NavigationOutcome {
    Moved { step: WizardStep },
    Blocked,
    Submitted { receipt: SubmissionReceipt },
    Exited,
}

/// Snapshot of one wizard session for the HTTP layer.
#[derive(Debug, Clone, Serialize)]
pub struct WizardView {
    pub record: VerificationRecord,
    pub current_step: u8,
    pub progress: Vec<StepProgress>,
    pub gate: GateOutcome,
    pub username_locked: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub verdict: Option<AdmissionVerdict>,
    pub changed_steps: Vec<WizardStep>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub navigation: Option<NavigationOutcome>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub redirect: Option<Page>,
}

/// Holds one wizard per signed-in user and shares the storage collaborators between them.
pub struct VerificationService<S, F> {
    sessions: Mutex<HashMap<UserId, Session<S, F>>>,
    submitter: Arc<S>,
    storage: Arc<F>,
    policy: AccessPolicy,
}

impl<S, F> VerificationService<S, F>
where
    S: VerificationSubmitter + 'static,
    F: FileStorage + 'static,
{
    pub fn new(submitter: Arc<S>, storage: Arc<F>, policy: AccessPolicy) -> Self {
        Self {
            sessions: Mutex::new(HashMap::new()),
            submitter,
            storage,
            policy,
        }
    }

    pub fn policy(&self) -> &AccessPolicy {
        &self.policy
    }

    /// Resume the caller's wizard or start a fresh one.
    pub fn open(&self, user: &CurrentUser) -> Result<WizardView, VerificationServiceError> {
        let mut sessions = self.lock()?;
        let session = sessions
            .entry(UserId(user.id.clone()))
            .or_insert_with(|| {
                info!(user_id = %user.id, "verification wizard opened");
                let navigation = Arc::new(PendingNavigation::default());
                Session {
                    wizard: VerificationWizard::open(
                        user,
                        self.submitter.clone(),
                        self.storage.clone(),
                        navigation.clone(),
                    ),
                    navigation,
                }
            });
        Ok(view_of(session, None))
    }

    pub fn view(&self, user_id: &UserId) -> Result<WizardView, VerificationServiceError> {
        self.with_session(user_id, |_| Ok(None))
    }

    pub fn update(
        &self,
        user_id: &UserId,
        patch: StepPatch,
    ) -> Result<WizardView, VerificationServiceError> {
        self.with_session(user_id, |wizard| {
            wizard.update_step(patch)?;
            Ok(None)
        })
    }

    pub fn add_skill(
        &self,
        user_id: &UserId,
        skill: &str,
    ) -> Result<WizardView, VerificationServiceError> {
        self.with_session(user_id, |wizard| {
            wizard.add_skill(skill)?;
            Ok(None)
        })
    }

    pub fn remove_skill(
        &self,
        user_id: &UserId,
        skill: &str,
    ) -> Result<WizardView, VerificationServiceError> {
        self.with_session(user_id, |wizard| {
            wizard.remove_skill(skill)?;
            Ok(None)
        })
    }

    pub fn add_testimonial(
        &self,
        user_id: &UserId,
        testimonial: Testimonial,
    ) -> Result<WizardView, VerificationServiceError> {
        self.with_session(user_id, |wizard| {
            wizard.add_testimonial(testimonial)?;
            Ok(None)
        })
    }

    pub fn attach_thumbnail(
        &self,
        user_id: &UserId,
        slot: usize,
        file_name: &str,
        content_type: Mime,
        bytes: Vec<u8>,
    ) -> Result<WizardView, VerificationServiceError> {
        let attachment = Attachment::new(AttachmentKind::Thumbnail, file_name, content_type, bytes)?;
        self.with_session(user_id, |wizard| {
            wizard.attach_thumbnail(slot, attachment)?;
            // Minted here so the serialized record carries the preview_url.
            wizard.thumbnail_preview(slot);
            Ok(None)
        })
    }

    pub fn add_portfolio_image(
        &self,
        user_id: &UserId,
        slot: usize,
        file_name: &str,
        content_type: Mime,
        bytes: Vec<u8>,
    ) -> Result<WizardView, VerificationServiceError> {
        let attachment =
            Attachment::new(AttachmentKind::PortfolioImage, file_name, content_type, bytes)?;
        self.with_session(user_id, |wizard| {
            wizard.add_portfolio_image(slot, attachment)?;
            Ok(None)
        })
    }

    pub fn add_certificate(
        &self,
        user_id: &UserId,
        file_name: &str,
        content_type: Mime,
        bytes: Vec<u8>,
    ) -> Result<WizardView, VerificationServiceError> {
        let attachment =
            Attachment::new(AttachmentKind::Certificate, file_name, content_type, bytes)?;
        self.with_session(user_id, |wizard| {
            wizard.add_certificate(attachment)?;
            Ok(None)
        })
    }

    pub fn complete_admission(
        &self,
        user_id: &UserId,
    ) -> Result<WizardView, VerificationServiceError> {
        self.with_session(user_id, |wizard| {
            wizard.complete_admission_test()?;
            Ok(None)
        })
    }

    pub fn go_to_step(
        &self,
        user_id: &UserId,
        number: u8,
    ) -> Result<WizardView, VerificationServiceError> {
        self.with_session(user_id, |wizard| {
            let step = wizard.go_to_step(number)?;
            Ok(Some(NavigationOutcome::Moved { step }))
        })
    }

    /// Move forward, or submit from the last step. A failed submission still refreshes the
    /// view so the caller sees the retained record and its error banner.
    pub fn advance(&self, user_id: &UserId) -> Result<WizardView, VerificationServiceError> {
        self.with_session(user_id, |wizard| {
            let outcome = match wizard.advance()? {
                AdvanceOutcome::Moved(step) => NavigationOutcome::Moved { step },
                AdvanceOutcome::Blocked(_) => NavigationOutcome::Blocked,
                AdvanceOutcome::Submitted(receipt) => NavigationOutcome::Submitted { receipt },
            };
            Ok(Some(outcome))
        })
    }

    pub fn retreat(&self, user_id: &UserId) -> Result<WizardView, VerificationServiceError> {
        self.with_session(user_id, |wizard| {
            let outcome = match wizard.retreat()? {
                RetreatOutcome::Moved(step) => NavigationOutcome::Moved { step },
                RetreatOutcome::Exited => NavigationOutcome::Exited,
            };
            Ok(Some(outcome))
        })
    }

    pub fn dismiss_error(&self, user_id: &UserId) -> Result<WizardView, VerificationServiceError> {
        self.with_session(user_id, |wizard| {
            wizard.dismiss_error();
            Ok(None)
        })
    }

    /// Drop the caller's wizard. Returns the number of previews released.
    pub fn discard(&self, user_id: &UserId) -> Result<usize, VerificationServiceError> {
        let session = self
            .lock()?
            .remove(user_id)
            .ok_or_else(|| VerificationServiceError::NoSession(user_id.0.clone()))?;
        Ok(session.wizard.discard())
    }

    fn with_session<T>(
        &self,
        user_id: &UserId,
        action: T,
    ) -> Result<WizardView, VerificationServiceError>
    where
        T: FnOnce(&mut Wizard<S, F>) -> Result<Option<NavigationOutcome>, WizardError>,
    {
        let mut sessions = self.lock()?;
        let session = sessions
            .get_mut(user_id)
            .ok_or_else(|| VerificationServiceError::NoSession(user_id.0.clone()))?;
        let navigation = action(&mut session.wizard)?;
        Ok(view_of(session, navigation))
    }

    fn lock(&self) -> Result<MutexGuard<'_, HashMap<UserId, Session<S, F>>>, VerificationServiceError> {
        self.sessions
            .lock()
            .map_err(|_| VerificationServiceError::SessionsUnavailable)
    }
}

fn view_of<S, F>(session: &mut Session<S, F>, navigation: Option<NavigationOutcome>) -> WizardView
where
    S: VerificationSubmitter,
    F: FileStorage,
{
    let wizard = &mut session.wizard;
    let current = wizard.current_step();
    let test = &wizard.record().steps.admission_test;
    let verdict = test
        .completed
        .then_some(test.score)
        .flatten()
        .map(AdmissionVerdict::for_score);

    WizardView {
        current_step: current.number(),
        progress: progress(current),
        gate: wizard.gate(),
        username_locked: wizard.is_username_locked(),
        error: wizard.last_error().map(str::to_string),
        verdict,
        changed_steps: wizard.take_dirty(),
        record: wizard.record().clone(),
        navigation,
        redirect: session.navigation.take(),
    }
}

#[derive(Debug, thiserror::Error)]
pub enum VerificationServiceError {
    #[error("no verification in progress for user {0}")]
    NoSession(String),
    #[error(transparent)]
    Wizard(#[from] WizardError),
    #[error(transparent)]
    Attachment(#[from] AttachmentError),
    #[error("verification sessions are unavailable")]
    SessionsUnavailable,
}
