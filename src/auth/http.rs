use async_trait::async_trait;
use serde::Deserialize;
use serde_json::{json, Value};

use super::models::{
    Invitation, Member, Membership, NewOrganization, Organization, OrganizationUpdate, Role,
    SessionInfo, User,
};
use super::{AuthProvider, SignIn, SignUp};
use crate::client::{ApiClient, ApiRequest};
use crate::error::{ClientError, ClientResult};

/// better-auth compatible endpoints, reached through the shared [`ApiClient`]
/// so they carry the same cookie and organization header as data calls.
#[derive(Clone)]
pub struct HttpAuthProvider {
    api: ApiClient,
    base_path: String,
}

#[derive(Deserialize)]
struct UserEnvelope {
    user: User,
}

#[derive(Deserialize)]
struct MembersEnvelope {
    members: Vec<Member>,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum MembersResponse {
    Wrapped(MembersEnvelope),
    Bare(Vec<Member>),
}

#[derive(Deserialize)]
struct InvitationEnvelope {
    invitation: Invitation,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum InvitationResponse {
    Wrapped(InvitationEnvelope),
    Bare(Invitation),
}

impl InvitationResponse {
    fn into_invitation(self) -> Invitation {
        match self {
            InvitationResponse::Wrapped(envelope) => envelope.invitation,
            InvitationResponse::Bare(invitation) => invitation,
        }
    }
}

impl HttpAuthProvider {
    pub fn new(api: ApiClient, base_path: impl Into<String>) -> Self {
        Self {
            api,
            base_path: base_path.into().trim_end_matches('/').to_string(),
        }
    }

    fn path(&self, endpoint: &str) -> String {
        format!("{}/{}", self.base_path, endpoint)
    }

    async fn post_json<T: serde::de::DeserializeOwned>(&self, endpoint: &str, body: Value) -> ClientResult<T> {
        self.api.send_json(ApiRequest::post(self.path(endpoint), body)).await
    }

    async fn post_invitation(&self, endpoint: &str, invitation_id: &str) -> ClientResult<Invitation> {
        let response: InvitationResponse = self
            .post_json(endpoint, json!({ "invitationId": invitation_id }))
            .await?;
        Ok(response.into_invitation())
    }
}

#[async_trait]
impl AuthProvider for HttpAuthProvider {
    /// POST {base}/sign-up/email
    async fn sign_up(&self, request: &SignUp) -> ClientResult<User> {
        let envelope: UserEnvelope = self.post_json("sign-up/email", json!(request)).await?;
        tracing::info!("Signed up {}", envelope.user.email);
        Ok(envelope.user)
    }

    /// POST {base}/sign-in/email
    ///
    /// The session cookie arrives as `set-cookie` and is captured by the client.
    async fn sign_in(&self, request: &SignIn) -> ClientResult<User> {
        let envelope: UserEnvelope = self.post_json("sign-in/email", json!(request)).await?;
        tracing::info!("Signed in {}", envelope.user.email);
        Ok(envelope.user)
    }

    async fn sign_out(&self) -> ClientResult<()> {
        let result = self.api.send(ApiRequest::post(self.path("sign-out"), json!({}))).await;
        // The local credential goes regardless of what the server said
        self.api.session().clear();
        result.map(|_| ())
    }

    /// GET {base}/get-session
    ///
    /// Expected Output when signed in:
    /// ```json
    /// {
    ///   "session": { "id": "...", "userId": "...", "activeOrganizationId": "..." },
    ///   "user": { "id": "...", "name": "...", "email": "..." }
    /// }
    /// ```
    /// and `null` otherwise.
    async fn get_session(&self) -> ClientResult<Option<SessionInfo>> {
        match self.api.send(ApiRequest::get(self.path("get-session"))).await {
            Ok(response) if response.body.is_null() => Ok(None),
            Ok(response) => Ok(Some(serde_json::from_value(response.body)?)),
            Err(e) if e.is_identity() => Ok(None),
            Err(e) => Err(e),
        }
    }

    async fn list_organizations(&self) -> ClientResult<Vec<Organization>> {
        let response = self.api.send(ApiRequest::get(self.path("organization/list"))).await?;
        if response.body.is_null() {
            return Ok(Vec::new());
        }
        Ok(serde_json::from_value(response.body)?)
    }

    async fn set_active_organization(&self, organization: &Organization) -> ClientResult<()> {
        self.api
            .send(ApiRequest::post(
                self.path("organization/set-active"),
                json!({
                    "organizationId": organization.id,
                    "organizationSlug": organization.slug,
                }),
            ))
            .await?;
        Ok(())
    }

    async fn create_organization(&self, organization: &NewOrganization) -> ClientResult<Organization> {
        self.post_json("organization/create", json!(organization)).await
    }

    async fn update_organization(
        &self,
        organization_id: &str,
        update: &OrganizationUpdate,
    ) -> ClientResult<Organization> {
        self.post_json(
            "organization/update",
            json!({ "organizationId": organization_id, "data": update }),
        )
        .await
    }

    /// POST {base}/organization/check-slug
    ///
    /// Answers `{ "status": true }` when the slug is free; a taken slug comes back as a 4xx.
    async fn check_slug(&self, slug: &str) -> ClientResult<bool> {
        let request = ApiRequest::post(self.path("organization/check-slug"), json!({ "slug": slug }));
        match self.api.send(request).await {
            Ok(response) => Ok(response.body.get("status").and_then(Value::as_bool).unwrap_or(true)),
            Err(ClientError::Http { status: 400 | 409 | 422, .. }) => Ok(false),
            Err(e) => Err(e),
        }
    }

    async fn get_active_member(&self) -> ClientResult<Membership> {
        let response = self
            .api
            .send(ApiRequest::get(self.path("organization/get-active-member")))
            .await?;
        if response.body.is_null() {
            return Err(ClientError::NoActiveTenant);
        }
        Ok(serde_json::from_value(response.body)?)
    }

    async fn list_members(&self) -> ClientResult<Vec<Member>> {
        let response: MembersResponse = self
            .api
            .send_json(ApiRequest::get(self.path("organization/list-members")))
            .await?;
        Ok(match response {
            MembersResponse::Wrapped(envelope) => envelope.members,
            MembersResponse::Bare(members) => members,
        })
    }

    async fn remove_member(&self, member_id: &str) -> ClientResult<()> {
        self.api
            .send(ApiRequest::post(
                self.path("organization/remove-member"),
                json!({ "memberIdOrEmail": member_id }),
            ))
            .await?;
        Ok(())
    }

    async fn list_invitations(&self) -> ClientResult<Vec<Invitation>> {
        self.api
            .send_json(ApiRequest::get(self.path("organization/list-invitations")))
            .await
    }

    async fn invite_member(&self, email: &str, role: Role, resend: bool) -> ClientResult<Invitation> {
        let mut body = json!({ "email": email, "role": role.as_str() });
        if resend {
            body["resend"] = json!(true);
        }
        self.post_json("organization/invite-member", body).await
    }

    async fn cancel_invitation(&self, invitation_id: &str) -> ClientResult<Invitation> {
        self.post_invitation("organization/cancel-invitation", invitation_id).await
    }

    async fn get_invitation(&self, invitation_id: &str) -> ClientResult<Invitation> {
        self.api
            .send_json(ApiRequest::get(self.path("organization/get-invitation")).with_query("id", invitation_id))
            .await
    }

    async fn accept_invitation(&self, invitation_id: &str) -> ClientResult<Invitation> {
        self.post_invitation("organization/accept-invitation", invitation_id).await
    }

    async fn reject_invitation(&self, invitation_id: &str) -> ClientResult<Invitation> {
        self.post_invitation("organization/reject-invitation", invitation_id).await
    }
}
