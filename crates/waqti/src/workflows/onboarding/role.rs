use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::access::{Navigator, Page};

use super::OnboardingError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    Freelancer,
    Client,
}

impl Role {
    /// Freelancers go through verification first; clients land on the dashboard.
    pub const fn landing_page(self) -> Page {
        match self {
            Role::Freelancer => Page::FreelancerVerification,
            Role::Client => Page::Dashboard,
        }
    }
}

pub struct RoleSelection<N> {
    selected: Option<Role>,
    navigator: Arc<N>,
}

impl<N> RoleSelection<N>
where
    N: Navigator,
{
    pub fn new(navigator: Arc<N>) -> Self {
        Self {
            selected: None,
            navigator,
        }
    }

    pub fn select(&mut self, role: Role) {
        self.selected = Some(role);
    }

    pub fn selected(&self) -> Option<Role> {
        self.selected
    }

    pub fn can_continue(&self) -> bool {
        self.selected.is_some()
    }

    pub fn continue_with_selection(&self) -> Result<Page, OnboardingError> {
        let role = self.selected.ok_or(OnboardingError::NoRoleSelected)?;
        let page = role.landing_page();
        info!(?role, page = page.name(), "role selected");
        self.navigator.set_active_page(page);
        Ok(page)
    }
}
