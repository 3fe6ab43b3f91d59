//! First-run flows: the welcome walkthrough, role selection and email confirmation.

pub mod email;
pub mod role;
pub mod walkthrough;

pub use email::{
    EmailProviderError, EmailVerification, EmailVerificationProvider, EmailVerificationView,
    RESEND_COOLDOWN_TICKS,
};
pub use role::{Role, RoleSelection};
pub use walkthrough::{Slide, Walkthrough, WalkthroughProgress, WalkthroughState, SLIDES};

#[derive(Debug, thiserror::Error)]
pub enum OnboardingError {
    #[error("choose a role before continuing")]
    NoRoleSelected,
    #[error("verification email can be resent in {0} seconds")]
    ResendCoolingDown(u32),
    #[error(transparent)]
    Provider(#[from] EmailProviderError),
}
