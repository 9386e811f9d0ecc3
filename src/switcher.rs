//! Selecting, creating and updating the active organization.

use std::sync::{Arc, Mutex, Weak};

use futures::future::join_all;

use crate::auth::models::{Membership, NewOrganization, Organization, OrganizationUpdate};
use crate::auth::{can, Action, AuthProvider};
use crate::error::{ClientError, ClientResult, ValidationError};
use crate::notify::{Notice, Notifier};
use crate::store::TenantStore;
use crate::view::TenantScoped;

/// Where the user should land after sign-in
#[derive(Debug, Clone, PartialEq)]
pub enum Resolution {
    Active(Organization),
    SelectOrganization(Vec<Organization>),
    CreateOrganization,
}

pub struct OrganizationSwitcher {
    auth: Arc<dyn AuthProvider>,
    tenants: TenantStore,
    notifier: Arc<dyn Notifier>,
    views: Mutex<Vec<Weak<dyn TenantScoped>>>,
}

impl OrganizationSwitcher {
    pub fn new(auth: Arc<dyn AuthProvider>, tenants: TenantStore, notifier: Arc<dyn Notifier>) -> Self {
        Self {
            auth,
            tenants,
            notifier,
            views: Mutex::new(Vec::new()),
        }
    }

    pub fn tenants(&self) -> &TenantStore {
        &self.tenants
    }

    /// Register a view to be re-fetched on every switch. Held weakly.
    pub fn mount(&self, view: &Arc<dyn TenantScoped>) {
        if let Ok(mut views) = self.views.lock() {
            views.retain(|v| v.strong_count() > 0);
            views.push(Arc::downgrade(view));
        }
    }

    fn mounted(&self) -> Vec<Arc<dyn TenantScoped>> {
        match self.views.lock() {
            Ok(mut views) => {
                views.retain(|v| v.strong_count() > 0);
                views.iter().filter_map(Weak::upgrade).collect()
            }
            Err(_) => Vec::new(),
        }
    }

    pub async fn list_organizations(&self) -> ClientResult<Vec<Organization>> {
        self.auth.list_organizations().await
    }

    /// Activate `organization` on the server, then locally, then re-fetch views.
    ///
    /// The store is written only after the server accepted the switch, so a
    /// rejected switch leaves the previous organization fully in effect.
    pub async fn select_organization(&self, organization: &Organization) -> ClientResult<()> {
        if let Err(e) = self.auth.set_active_organization(organization).await {
            tracing::warn!("Server rejected switch to {}: {}", organization.id, e);
            self.notifier.notify(Notice::error(format!(
                "Failed to switch to {}: {}",
                organization.name, e
            )));
            return Err(ClientError::TenantSwitch(Box::new(e)));
        }

        self.tenants.set(organization.id.clone());
        tracing::info!("Active organization is now {} ({})", organization.slug, organization.id);

        let tenant = Some(organization.id.clone());
        let views = self.mounted();
        let results = join_all(views.iter().map(|view| view.tenant_changed(tenant.clone()))).await;
        for result in results {
            // Fetch failures were already reported by the view
            if let Err(e) = result {
                tracing::debug!("View refresh after switch failed: {}", e);
            }
        }

        Ok(())
    }

    /// Decide between the stored organization, the selection list and onboarding.
    ///
    /// A stored id that is no longer in the user's list is cleared.
    pub async fn resolve_active(&self) -> ClientResult<Resolution> {
        let organizations = self.auth.list_organizations().await?;

        if let Some(stored) = self.tenants.get() {
            match organizations.iter().find(|o| o.id == stored) {
                Some(organization) => return Ok(Resolution::Active(organization.clone())),
                None => {
                    tracing::info!("Stored organization {} is no longer available", stored);
                    self.tenants.clear();
                }
            }
        }

        if organizations.is_empty() {
            Ok(Resolution::CreateOrganization)
        } else {
            Ok(Resolution::SelectOrganization(organizations))
        }
    }

    pub async fn create_organization(&self, organization: &NewOrganization) -> ClientResult<Organization> {
        organization.validate()?;
        if !self.auth.check_slug(&organization.slug).await? {
            return Err(ValidationError::SlugTaken(organization.slug.clone()).into());
        }

        let created = self.auth.create_organization(organization).await?;
        tracing::info!("Created organization {} ({})", created.slug, created.id);
        self.notifier.notify(Notice::success(format!("Organization {} created", created.name)));

        self.select_organization(&created).await?;
        Ok(created)
    }

    /// Owner-only. The slug is checked only when it actually changes.
    pub async fn update_organization(
        &self,
        current: &Organization,
        update: &OrganizationUpdate,
    ) -> ClientResult<Organization> {
        update.validate()?;
        if update.is_empty() {
            return Ok(current.clone());
        }

        let membership = self.active_membership().await?;
        if !can(Action::UpdateOrganization, &membership) {
            return Err(ClientError::Forbidden(Action::UpdateOrganization.describe().to_string()));
        }

        if let Some(slug) = update.slug.as_deref().filter(|s| *s != current.slug) {
            if !self.auth.check_slug(slug).await? {
                self.notifier.notify(Notice::error("Slug already exists"));
                return Err(ValidationError::SlugTaken(slug.to_string()).into());
            }
        }

        match self.auth.update_organization(&current.id, update).await {
            Ok(updated) => {
                self.notifier.notify(Notice::success("Organization updated"));
                Ok(updated)
            }
            Err(e) => {
                self.notifier.notify(Notice::error(format!("Failed to update organization: {}", e)));
                Err(e)
            }
        }
    }

    /// Read fresh from the provider on every call
    pub async fn active_membership(&self) -> ClientResult<Membership> {
        if self.tenants.get().is_none() {
            return Err(ClientError::NoActiveTenant);
        }
        self.auth.get_active_member().await
    }
}
