//! Wires the client pieces together around one tenant store.

use std::sync::Arc;

use crate::auth::models::User;
use crate::auth::{AuthProvider, HttpAuthProvider, SignIn, SignUp};
use crate::client::{ApiClient, HttpTransport, SessionCredentials, Transport};
use crate::config::AppConfig;
use crate::error::{ClientError, ClientResult};
use crate::gate::{Route, SessionGate};
use crate::invitations::Invitations;
use crate::notify::{Notice, Notifier};
use crate::outline::OutlineApi;
use crate::store::{JsonFileStorage, SessionStorage, TenantStorage, TenantStore};
use crate::switcher::OrganizationSwitcher;
use crate::team::Team;
use crate::view::{OutlineView, TenantScoped};

pub struct Workspace {
    client: ApiClient,
    auth: Arc<dyn AuthProvider>,
    gate: SessionGate,
    switcher: Arc<OrganizationSwitcher>,
    outlines: Arc<OutlineView>,
    team: Team,
    invitations: Invitations,
    notifier: Arc<dyn Notifier>,
}

impl Workspace {
    /// HTTP transport and JSON files under the configured directory
    pub fn open(config: &AppConfig, notifier: Arc<dyn Notifier>) -> anyhow::Result<Self> {
        let dir = config.storage.resolve_dir()?;
        tracing::debug!("Workspace state directory: {}", dir.display());

        let storage = Arc::new(JsonFileStorage::new(dir));
        let transport = Arc::new(HttpTransport::new(&config.api)?);

        Ok(Self::with_transport(transport, storage.clone(), storage, config, notifier))
    }

    pub fn with_transport(
        transport: Arc<dyn Transport>,
        tenant_storage: Arc<dyn TenantStorage>,
        session_storage: Arc<dyn SessionStorage>,
        config: &AppConfig,
        notifier: Arc<dyn Notifier>,
    ) -> Self {
        // Rehydrated before the client exists, so no request can go out without it
        let tenants = TenantStore::open(tenant_storage);
        let session = Arc::new(SessionCredentials::persisted(
            config.auth.session_cookie.clone(),
            session_storage,
        ));
        let client = ApiClient::new(transport, tenants.clone(), session, config.api.organization_header.clone());

        let auth: Arc<dyn AuthProvider> =
            Arc::new(HttpAuthProvider::new(client.clone(), config.auth.base_path.clone()));
        let switcher = Arc::new(OrganizationSwitcher::new(auth.clone(), tenants.clone(), notifier.clone()));
        let gate = SessionGate::new(auth.clone(), switcher.clone());

        let outlines = Arc::new(OutlineView::new(
            OutlineApi::new(client.clone()),
            tenants.clone(),
            notifier.clone(),
            config.view.default_page_size,
        ));
        let scoped: Arc<dyn TenantScoped> = outlines.clone();
        switcher.mount(&scoped);

        let team = Team::new(auth.clone(), tenants, notifier.clone());
        let invitations = Invitations::new(auth.clone(), switcher.clone(), notifier.clone());

        Self {
            client,
            auth,
            gate,
            switcher,
            outlines,
            team,
            invitations,
            notifier,
        }
    }

    pub fn client(&self) -> &ApiClient {
        &self.client
    }

    pub fn tenants(&self) -> &TenantStore {
        self.client.tenants()
    }

    pub fn auth(&self) -> &Arc<dyn AuthProvider> {
        &self.auth
    }

    pub fn gate(&self) -> &SessionGate {
        &self.gate
    }

    pub fn switcher(&self) -> &OrganizationSwitcher {
        &self.switcher
    }

    pub fn outlines(&self) -> &OutlineView {
        &self.outlines
    }

    pub fn team(&self) -> &Team {
        &self.team
    }

    pub fn invitations(&self) -> &Invitations {
        &self.invitations
    }

    pub async fn sign_up(&self, request: &SignUp) -> ClientResult<User> {
        self.auth.sign_up(request).await
    }

    /// The gate resolves the new identity on the next navigation
    pub async fn sign_in(&self, request: &SignIn) -> ClientResult<User> {
        let user = self.auth.sign_in(request).await?;
        self.gate.reset();
        Ok(user)
    }

    /// Sign out remotely, then forget the session, the organization and the data view
    pub async fn logout(&self) -> ClientResult<()> {
        // Local state is cleared even when the provider call fails
        let remote = self.auth.sign_out().await;
        if let Err(e) = &remote {
            tracing::warn!("Sign-out request failed, clearing local session anyway: {}", e);
        }

        self.client.session().clear();
        self.tenants().clear();
        self.gate.reset();
        self.outlines.switch_tenant(None).await?;

        self.notifier.notify(Notice::info("Signed out"));
        tracing::info!("Signed out");
        remote
    }

    /// Where an error should send the user, if anywhere. Identity errors always go to sign-in.
    pub fn route_for_error(&self, error: &ClientError) -> Option<Route> {
        if error.is_identity() {
            self.gate.reset();
            return Some(Route::SignIn);
        }
        None
    }
}
