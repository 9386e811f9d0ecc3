//! Members and invitations of the active organization.
//!
//! Every operation re-reads the caller's membership from the provider and asks
//! [`can`] before doing anything.

use std::sync::Arc;

use crate::auth::models::{Invitation, Member, Membership, Role};
use crate::auth::{can, Action, AuthProvider};
use crate::error::{ClientError, ClientResult, ValidationError};
use crate::notify::{Notice, Notifier};
use crate::store::TenantStore;

pub struct Team {
    auth: Arc<dyn AuthProvider>,
    tenants: TenantStore,
    notifier: Arc<dyn Notifier>,
}

impl Team {
    pub fn new(auth: Arc<dyn AuthProvider>, tenants: TenantStore, notifier: Arc<dyn Notifier>) -> Self {
        Self { auth, tenants, notifier }
    }

    async fn require(&self, action: Action) -> ClientResult<Membership> {
        if self.tenants.get().is_none() {
            return Err(ClientError::NoActiveTenant);
        }
        let membership = self.auth.get_active_member().await?;
        if !can(action, &membership) {
            tracing::debug!("{:?} denied for role {}", action, membership.role.as_str());
            return Err(ClientError::Forbidden(action.describe().to_string()));
        }
        Ok(membership)
    }

    pub async fn members(&self) -> ClientResult<Vec<Member>> {
        if self.tenants.get().is_none() {
            return Err(ClientError::NoActiveTenant);
        }
        self.auth.list_members().await
    }

    pub async fn invitations(&self) -> ClientResult<Vec<Invitation>> {
        if self.tenants.get().is_none() {
            return Err(ClientError::NoActiveTenant);
        }
        self.auth.list_invitations().await
    }

    pub async fn invite(&self, email: &str, role: Role) -> ClientResult<Invitation> {
        let email = email.trim();
        if email.is_empty() {
            return Err(ValidationError::Required { field: "email" }.into());
        }
        if !email.contains('@') {
            return Err(ValidationError::InvalidValue { field: "email", value: email.to_string() }.into());
        }
        if role == Role::Owner {
            return Err(ValidationError::InvalidValue { field: "role", value: role.as_str().to_string() }.into());
        }

        self.require(Action::InviteMember).await?;
        let invitation = self.report(
            self.auth.invite_member(email, role, false).await,
            format!("Invitation sent to {}", email),
            "Failed to send invitation",
        )?;
        tracing::info!("Invited {} as {}", email, role.as_str());
        Ok(invitation)
    }

    pub async fn cancel(&self, invitation_id: &str) -> ClientResult<Invitation> {
        self.require(Action::CancelInvitation).await?;
        self.report(
            self.auth.cancel_invitation(invitation_id).await,
            "Invitation canceled".to_string(),
            "Failed to cancel invitation",
        )
    }

    /// Send a pending invitation again with its original email and role
    pub async fn resend(&self, invitation_id: &str) -> ClientResult<Invitation> {
        self.require(Action::ResendInvitation).await?;

        let invitation = self
            .auth
            .list_invitations()
            .await?
            .into_iter()
            .find(|i| i.id == invitation_id)
            .ok_or_else(|| ValidationError::InvalidValue {
                field: "invitation",
                value: invitation_id.to_string(),
            })?;

        self.report(
            self.auth.invite_member(&invitation.email, invitation.role, true).await,
            format!("Invitation resent to {}", invitation.email),
            "Failed to resend invitation",
        )
    }

    /// An organization always keeps at least one member
    pub async fn remove(&self, member_id: &str) -> ClientResult<()> {
        self.require(Action::RemoveMember).await?;

        let members = self.auth.list_members().await?;
        if members.len() <= 1 {
            self.notifier.notify(Notice::error("Cannot remove the last member"));
            return Err(ClientError::Forbidden("remove the last member".to_string()));
        }

        self.report(
            self.auth.remove_member(member_id).await,
            "Member removed".to_string(),
            "Failed to remove member",
        )
    }

    fn report<T>(&self, result: ClientResult<T>, success: String, failure: &str) -> ClientResult<T> {
        match &result {
            Ok(_) => self.notifier.notify(Notice::success(success)),
            Err(e) => self.notifier.notify(Notice::error(format!("{}: {}", failure, e))),
        }
        result
    }
}
