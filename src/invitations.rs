use std::sync::Arc;

use crate::auth::models::{Invitation, Organization};
use crate::auth::AuthProvider;
use crate::error::ClientResult;
use crate::notify::{Notice, Notifier};
use crate::switcher::OrganizationSwitcher;

/// The invitee's side: look at, accept or reject an invitation
pub struct Invitations {
    auth: Arc<dyn AuthProvider>,
    switcher: Arc<OrganizationSwitcher>,
    notifier: Arc<dyn Notifier>,
}

impl Invitations {
    pub fn new(
        auth: Arc<dyn AuthProvider>,
        switcher: Arc<OrganizationSwitcher>,
        notifier: Arc<dyn Notifier>,
    ) -> Self {
        Self { auth, switcher, notifier }
    }

    pub async fn get(&self, invitation_id: &str) -> ClientResult<Invitation> {
        self.auth.get_invitation(invitation_id).await
    }

    /// Accept, then make the joined organization the active one.
    ///
    /// Returns the organization that was selected, if it shows up in the user's list.
    pub async fn accept(&self, invitation_id: &str) -> ClientResult<Option<Organization>> {
        let invitation = match self.auth.accept_invitation(invitation_id).await {
            Ok(invitation) => invitation,
            Err(e) => {
                self.notifier.notify(Notice::error(format!("Failed to accept invitation: {}", e)));
                return Err(e);
            }
        };
        self.notifier.notify(Notice::success("Invitation accepted"));

        let joined = self
            .switcher
            .list_organizations()
            .await?
            .into_iter()
            .find(|o| o.id == invitation.organization_id);

        match &joined {
            Some(organization) => self.switcher.select_organization(organization).await?,
            None => tracing::warn!(
                "Accepted invitation {} but organization {} is not listed",
                invitation.id,
                invitation.organization_id
            ),
        }
        Ok(joined)
    }

    pub async fn reject(&self, invitation_id: &str) -> ClientResult<Invitation> {
        match self.auth.reject_invitation(invitation_id).await {
            Ok(invitation) => {
                self.notifier.notify(Notice::info("Invitation rejected"));
                Ok(invitation)
            }
            Err(e) => {
                self.notifier.notify(Notice::error(format!("Failed to reject invitation: {}", e)));
                Err(e)
            }
        }
    }
}
