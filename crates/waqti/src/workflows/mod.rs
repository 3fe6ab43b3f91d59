pub mod admin;
pub mod escrow;
pub mod onboarding;
pub mod saved_searches;
pub mod verification;
