//! Role-based capability checks.
//!
//! Every role-gated branch asks [`can`] instead of comparing role strings.

use super::models::{Membership, Role};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    InviteMember,
    CancelInvitation,
    ResendInvitation,
    RemoveMember,
    UpdateOrganization,
    ManageRecords,
}

impl Action {
    pub fn describe(&self) -> &'static str {
        match self {
            Action::InviteMember => "invite members",
            Action::CancelInvitation => "cancel invitations",
            Action::ResendInvitation => "resend invitations",
            Action::RemoveMember => "remove members",
            Action::UpdateOrganization => "update the organization",
            Action::ManageRecords => "manage records",
        }
    }
}

pub fn can(action: Action, membership: &Membership) -> bool {
    match membership.role {
        Role::Owner => true,
        Role::Admin => !matches!(action, Action::UpdateOrganization),
        Role::Member => matches!(action, Action::ManageRecords),
    }
}
