//! Identity, authorization and page navigation collaborators.
//!
//! Every workflow receives these explicitly instead of reaching for ambient state, so the
//! wizard, dashboard and escrow screens stay testable without a session provider.

use std::sync::Mutex;

use axum::http::request::Parts;
use axum::http::{HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use serde::{Deserialize, Serialize};
use serde_json::json;

use crate::config::AdminConfig;

pub const USER_ID_HEADER: &str = "x-user-id";
pub const USER_NAME_HEADER: &str = "x-user-name";
pub const USER_EMAIL_HEADER: &str = "x-user-email";

/// Account currently signed in, as reported by the session provider.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CurrentUser {
    pub id: String,
    pub name: String,
    pub email: String,
}

/// Readiness of the session provider.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "state", content = "user", rename_all = "snake_case")]
pub enum AuthState {
    Loading,
    Anonymous,
    Authenticated(CurrentUser),
}

impl AuthState {
    pub fn user(&self) -> Option<&CurrentUser> {
        match self {
            AuthState::Authenticated(user) => Some(user),
            AuthState::Loading | AuthState::Anonymous => None,
        }
    }

    /// Resolve the caller from the identity headers forwarded by the session gateway.
    pub fn from_headers(headers: &HeaderMap) -> Self {
        let read = |name: &str| {
            headers
                .get(name)
                .and_then(|value| value.to_str().ok())
                .map(str::trim)
                .filter(|value| !value.is_empty())
                .map(str::to_string)
        };

        match read(USER_ID_HEADER) {
            Some(id) => AuthState::Authenticated(CurrentUser {
                name: read(USER_NAME_HEADER).unwrap_or_default(),
                email: read(USER_EMAIL_HEADER).unwrap_or_default(),
                id,
            }),
            None => AuthState::Anonymous,
        }
    }
}

#[axum::async_trait]
impl<S> axum::extract::FromRequestParts<S> for AuthState
where
    S: Send + Sync,
{
    type Rejection = std::convert::Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        Ok(AuthState::from_headers(&parts.headers))
    }
}

/// Named pages the navigation collaborator can switch to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Page {
    Dashboard,
    Login,
    FreelancerVerification,
    Services,
    Projects,
    Freelancers,
    Admin,
    Escrow,
    Terms,
    Privacy,
}

impl Page {
    pub const fn name(self) -> &'static str {
        match self {
            Page::Dashboard => "dashboard",
            Page::Login => "login",
            Page::FreelancerVerification => "freelancer-verification",
            Page::Services => "services",
            Page::Projects => "projects",
            Page::Freelancers => "freelancers",
            Page::Admin => "admin",
            Page::Escrow => "escrow",
            Page::Terms => "terms",
            Page::Privacy => "privacy",
        }
    }
}

/// Opaque page switch; workflows request a page and never route themselves.
pub trait Navigator: Send + Sync {
    fn set_active_page(&self, page: Page);
}

/// Navigator that parks the most recent request until the caller collects it.
#[derive(Debug, Default)]
pub struct PendingNavigation {
    requested: Mutex<Option<Page>>,
}

impl PendingNavigation {
    pub fn take(&self) -> Option<Page> {
        match self.requested.lock() {
            Ok(mut guard) => guard.take(),
            Err(poisoned) => poisoned.into_inner().take(),
        }
    }
}

impl Navigator for PendingNavigation {
    fn set_active_page(&self, page: Page) {
        match self.requested.lock() {
            Ok(mut guard) => *guard = Some(page),
            Err(poisoned) => *poisoned.into_inner() = Some(page),
        }
    }
}

/// Result of gating a page on the session state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AccessDecision {
    /// The session provider has not finished loading; render nothing yet.
    Pending,
    Granted(CurrentUser),
    Redirect(Page),
}

impl AccessDecision {
    /// The granted user, or the response a refused caller receives.
    pub fn into_response_result(self) -> Result<CurrentUser, Response> {
        match self {
            AccessDecision::Granted(user) => Ok(user),
            AccessDecision::Redirect(page) => {
                let status = if page == Page::Login {
                    StatusCode::UNAUTHORIZED
                } else {
                    StatusCode::FORBIDDEN
                };
                let payload = json!({
                    "error": "access denied",
                    "redirect": page.name(),
                });
                Err((status, axum::Json(payload)).into_response())
            }
            AccessDecision::Pending => {
                let payload = json!({ "error": "session is still loading" });
                Err((StatusCode::SERVICE_UNAVAILABLE, axum::Json(payload)).into_response())
            }
        }
    }
}

/// One configured operator account holds admin rights.
#[derive(Debug, Clone, Default)]
pub struct AccessPolicy {
    admin: AdminConfig,
}

impl AccessPolicy {
    pub fn new(admin: AdminConfig) -> Self {
        Self { admin }
    }

    pub fn is_admin(&self, user: &CurrentUser) -> bool {
        user.email == self.admin.email || user.id == self.admin.user_id
    }

    pub fn admin_gate(&self, auth: &AuthState) -> AccessDecision {
        match auth {
            AuthState::Loading => AccessDecision::Pending,
            AuthState::Anonymous => AccessDecision::Redirect(Page::Login),
            AuthState::Authenticated(user) if self.is_admin(user) => {
                AccessDecision::Granted(user.clone())
            }
            AuthState::Authenticated(_) => AccessDecision::Redirect(Page::Dashboard),
        }
    }

    pub fn member_gate(&self, auth: &AuthState) -> AccessDecision {
        match auth {
            AuthState::Loading => AccessDecision::Pending,
            AuthState::Anonymous => AccessDecision::Redirect(Page::Login),
            AuthState::Authenticated(user) => AccessDecision::Granted(user.clone()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    fn member() -> CurrentUser {
        CurrentUser {
            id: "user-7".to_string(),
            name: "Sara Ali".to_string(),
            email: "sara@example.com".to_string(),
        }
    }

    #[test]
    fn admin_gate_matches_email_or_id() {
        let policy = AccessPolicy::default();

        let by_email = CurrentUser {
            email: "admin@waqti.com".to_string(),
            ..member()
        };
        let by_id = CurrentUser {
            id: "admin".to_string(),
            ..member()
        };

        assert_eq!(
            policy.admin_gate(&AuthState::Authenticated(by_email.clone())),
            AccessDecision::Granted(by_email)
        );
        assert_eq!(
            policy.admin_gate(&AuthState::Authenticated(by_id.clone())),
            AccessDecision::Granted(by_id)
        );
    }

    #[test]
    fn admin_gate_redirects_members_and_anonymous_callers() {
        let policy = AccessPolicy::default();

        assert_eq!(
            policy.admin_gate(&AuthState::Authenticated(member())),
            AccessDecision::Redirect(Page::Dashboard)
        );
        assert_eq!(
            policy.admin_gate(&AuthState::Anonymous),
            AccessDecision::Redirect(Page::Login)
        );
        assert_eq!(
            policy.admin_gate(&AuthState::Loading),
            AccessDecision::Pending
        );
    }

    #[test]
    fn headers_resolve_identity() {
        let mut headers = HeaderMap::new();
        headers.insert(USER_ID_HEADER, HeaderValue::from_static("user-7"));
        headers.insert(USER_EMAIL_HEADER, HeaderValue::from_static("sara@example.com"));

        let auth = AuthState::from_headers(&headers);
        let user = auth.user().expect("authenticated");
        assert_eq!(user.id, "user-7");
        assert_eq!(user.email, "sara@example.com");
        assert!(user.name.is_empty());

        assert_eq!(
            AuthState::from_headers(&HeaderMap::new()),
            AuthState::Anonymous
        );
    }

    #[test]
    fn pending_navigation_yields_last_request_once() {
        let navigation = PendingNavigation::default();
        navigation.set_active_page(Page::Login);
        navigation.set_active_page(Page::Dashboard);

        assert_eq!(navigation.take(), Some(Page::Dashboard));
        assert_eq!(navigation.take(), None);
        assert_eq!(Page::FreelancerVerification.name(), "freelancer-verification");
        assert_eq!(Page::Terms.name(), "terms");
        assert_eq!(Page::Privacy.name(), "privacy");
    }
}
