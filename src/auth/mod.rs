pub mod access;
pub mod http;
pub mod models;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::ClientResult;
use models::{
    Invitation, Member, Membership, NewOrganization, Organization, OrganizationUpdate, Role,
    SessionInfo, User,
};

pub use access::{can, Action};
pub use http::HttpAuthProvider;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SignUp {
    pub name: String,
    pub email: String,
    pub password: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SignIn {
    pub email: String,
    pub password: String,
}

/// Capabilities of the external auth provider. This crate only calls them.
#[async_trait]
pub trait AuthProvider: Send + Sync {
    async fn sign_up(&self, request: &SignUp) -> ClientResult<User>;
    async fn sign_in(&self, request: &SignIn) -> ClientResult<User>;
    async fn sign_out(&self) -> ClientResult<()>;

    /// `None` when the provider does not recognize the current session
    async fn get_session(&self) -> ClientResult<Option<SessionInfo>>;

    async fn list_organizations(&self) -> ClientResult<Vec<Organization>>;
    async fn set_active_organization(&self, organization: &Organization) -> ClientResult<()>;
    async fn create_organization(&self, organization: &NewOrganization) -> ClientResult<Organization>;
    async fn update_organization(
        &self,
        organization_id: &str,
        update: &OrganizationUpdate,
    ) -> ClientResult<Organization>;
    /// `true` when the slug is free to use
    async fn check_slug(&self, slug: &str) -> ClientResult<bool>;

    async fn get_active_member(&self) -> ClientResult<Membership>;
    async fn list_members(&self) -> ClientResult<Vec<Member>>;
    async fn remove_member(&self, member_id: &str) -> ClientResult<()>;

    async fn list_invitations(&self) -> ClientResult<Vec<Invitation>>;
    async fn invite_member(&self, email: &str, role: Role, resend: bool) -> ClientResult<Invitation>;
    async fn cancel_invitation(&self, invitation_id: &str) -> ClientResult<Invitation>;
    async fn get_invitation(&self, invitation_id: &str) -> ClientResult<Invitation>;
    async fn accept_invitation(&self, invitation_id: &str) -> ClientResult<Invitation>;
    async fn reject_invitation(&self, invitation_id: &str) -> ClientResult<Invitation>;
}
