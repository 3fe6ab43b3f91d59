use std::sync::Arc;

use serde::Serialize;
use tracing::{error, info};

use crate::access::{Navigator, Page};

use super::OnboardingError;

pub const RESEND_COOLDOWN_TICKS: u32 = 60;

/// Mail collaborator behind the verification screen.
pub trait EmailVerificationProvider: Send + Sync {
    fn resend(&self, email: &str) -> Result<(), EmailProviderError>;
    fn is_verified(&self, email: &str) -> Result<bool, EmailProviderError>;
}

#[derive(Debug, thiserror::Error)]
pub enum EmailProviderError {
    #[error("email provider unavailable: {0}")]
    Unavailable(String),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EmailVerificationView {
    pub email: String,
    pub verified: bool,
    pub resend_cooldown: u32,
    pub can_resend: bool,
}

pub struct EmailVerification<P, N> {
    email: String,
    cooldown: u32,
    verified: bool,
    provider: Arc<P>,
    navigator: Arc<N>,
}

impl<P, N> EmailVerification<P, N>
where
    P: EmailVerificationProvider,
    N: Navigator,
{
    pub fn new(email: impl Into<String>, provider: Arc<P>, navigator: Arc<N>) -> Self {
        Self {
            email: email.into(),
            cooldown: 0,
            verified: false,
            provider,
            navigator,
        }
    }

    pub fn cooldown(&self) -> u32 {
        self.cooldown
    }

    pub fn is_verified(&self) -> bool {
        self.verified
    }

    pub fn view(&self) -> EmailVerificationView {
        EmailVerificationView {
            email: self.email.clone(),
            verified: self.verified,
            resend_cooldown: self.cooldown,
            can_resend: self.cooldown == 0,
        }
    }

    /// Request another verification mail. The cooldown only starts once the provider accepts.
    pub fn resend(&mut self) -> Result<(), OnboardingError> {
        if self.cooldown > 0 {
            return Err(OnboardingError::ResendCoolingDown(self.cooldown));
        }
        self.provider.resend(&self.email).map_err(|source| {
            error!(error = %source, "verification email resend failed");
            OnboardingError::Provider(source)
        })?;
        self.cooldown = RESEND_COOLDOWN_TICKS;
        info!(email = %self.email, "verification email resent");
        Ok(())
    }

    /// One second of the resend countdown.
    pub fn tick(&mut self) {
        self.cooldown = self.cooldown.saturating_sub(1);
    }

    pub fn check(&mut self) -> Result<bool, OnboardingError> {
        if !self.verified {
            self.verified = self.provider.is_verified(&self.email)?;
            if self.verified {
                self.navigator.set_active_page(Page::Dashboard);
            }
        }
        Ok(self.verified)
    }

    pub fn back_to_login(&self) {
        self.navigator.set_active_page(Page::Login);
    }
}
