//! Per-navigation identity and onboarding checks.

use std::sync::{Arc, RwLock};

use crate::auth::models::SessionInfo;
use crate::auth::AuthProvider;
use crate::error::ClientResult;
use crate::store::TenantStore;
use crate::switcher::OrganizationSwitcher;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Route {
    SignIn,
    SignUp,
    CreateOrganization,
    SelectOrganization,
    JoinOrganization,
    AcceptInvitation(String),
    Dashboard,
    DashboardTable,
    DashboardTeam,
}

impl Route {
    pub fn path(&self) -> String {
        match self {
            Route::SignIn => "/sign-in".to_string(),
            Route::SignUp => "/sign-up".to_string(),
            Route::CreateOrganization => "/create-organization".to_string(),
            Route::SelectOrganization => "/select-organization".to_string(),
            Route::JoinOrganization => "/join-organization".to_string(),
            Route::AcceptInvitation(id) => format!("/accept-invitation/{}", id),
            Route::Dashboard => "/dashboard".to_string(),
            Route::DashboardTable => "/dashboard/table".to_string(),
            Route::DashboardTeam => "/dashboard/team".to_string(),
        }
    }

    pub fn from_path(path: &str) -> Option<Route> {
        let path = path.trim_end_matches('/');
        let route = match path {
            "/sign-in" => Route::SignIn,
            "/sign-up" => Route::SignUp,
            "/create-organization" => Route::CreateOrganization,
            "/select-organization" => Route::SelectOrganization,
            "/join-organization" => Route::JoinOrganization,
            "/dashboard" | "" => Route::Dashboard,
            "/dashboard/table" => Route::DashboardTable,
            "/dashboard/team" => Route::DashboardTeam,
            _ => {
                let id = path.strip_prefix("/accept-invitation/")?;
                if id.is_empty() || id.contains('/') {
                    return None;
                }
                Route::AcceptInvitation(id.to_string())
            }
        };
        Some(route)
    }

    /// Sign-in and sign-up are reachable without a session
    pub fn is_public(&self) -> bool {
        matches!(self, Route::SignIn | Route::SignUp)
    }

    /// Needs an active organization
    pub fn is_tenant_scoped(&self) -> bool {
        matches!(self, Route::Dashboard | Route::DashboardTable | Route::DashboardTeam)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum GateState {
    Unknown,
    Anonymous,
    Authenticated(SessionInfo),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GateDecision {
    /// Identity not resolved yet: show nothing, redirect nowhere
    Suspend,
    Render,
    Redirect(Route),
}

pub fn decide(route: &Route, state: &GateState, active_tenant: Option<&str>) -> GateDecision {
    match state {
        GateState::Unknown => GateDecision::Suspend,
        GateState::Anonymous if route.is_public() => GateDecision::Render,
        GateState::Anonymous => GateDecision::Redirect(Route::SignIn),
        GateState::Authenticated(_) if route.is_public() => GateDecision::Redirect(Route::Dashboard),
        GateState::Authenticated(_) if route.is_tenant_scoped() && active_tenant.is_none() => {
            GateDecision::Redirect(Route::SelectOrganization)
        }
        GateState::Authenticated(_) => GateDecision::Render,
    }
}

pub struct SessionGate {
    auth: Arc<dyn AuthProvider>,
    tenants: TenantStore,
    switcher: Arc<OrganizationSwitcher>,
    state: RwLock<GateState>,
}

impl SessionGate {
    pub fn new(auth: Arc<dyn AuthProvider>, switcher: Arc<OrganizationSwitcher>) -> Self {
        Self {
            auth,
            tenants: switcher.tenants().clone(),
            switcher,
            state: RwLock::new(GateState::Unknown),
        }
    }

    pub fn state(&self) -> GateState {
        self.state.read().map(|s| s.clone()).unwrap_or(GateState::Unknown)
    }

    /// Decision for the current state, without resolving identity again
    pub fn current_decision(&self, route: &Route) -> GateDecision {
        decide(route, &self.state(), self.tenants.get().as_deref())
    }

    /// Resolve identity for this navigation, then decide.
    ///
    /// The state drops back to `Unknown` first. Nothing is reused from the
    /// last navigation. A tenant-scoped route also re-checks the stored
    /// organization against the user's list; a stale one is cleared and the
    /// user lands on selection.
    pub async fn navigate(&self, route: &Route) -> ClientResult<GateDecision> {
        self.set_state(GateState::Unknown);

        let resolved = match self.auth.get_session().await {
            Ok(Some(session)) => GateState::Authenticated(session),
            Ok(None) => GateState::Anonymous,
            Err(e) if e.is_identity() => GateState::Anonymous,
            Err(e) => return Err(e),
        };

        if matches!(resolved, GateState::Authenticated(_))
            && route.is_tenant_scoped()
            && self.tenants.get().is_some()
        {
            self.switcher.resolve_active().await?;
        }
        self.set_state(resolved);

        let decision = self.current_decision(route);
        tracing::debug!("navigate {} -> {:?}", route.path(), decision);
        Ok(decision)
    }

    pub(crate) fn reset(&self) {
        self.set_state(GateState::Unknown);
    }

    fn set_state(&self, state: GateState) {
        if let Ok(mut current) = self.state.write() {
            *current = state;
        }
    }
}
