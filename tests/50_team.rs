mod common;

use anyhow::Result;
use serde_json::{json, Value};

use common::{auth_path, member, Harness, ORG_HEADER};
use outline_workspace::auth::models::{InvitationStatus, Role};
use outline_workspace::client::{ApiResponse, Method};
use outline_workspace::error::{ClientError, ErrorClass};

fn invitation(id: &str, email: &str, role: &str, status: &str) -> Value {
    json!({
        "id": id,
        "email": email,
        "role": role,
        "status": status,
        "organizationId": "A",
        "expiresAt": "2030-01-01T00:00:00Z"
    })
}

fn with_role(h: &Harness, role: &'static str) {
    h.backend.on(Method::Get, &auth_path("organization/get-active-member"), move |request| {
        let organization_id = request.header(ORG_HEADER).unwrap_or_default().to_string();
        ApiResponse::ok(member("m_me", &organization_id, role))
    });
}

fn echo_invite(h: &Harness) {
    h.backend.on(Method::Post, &auth_path("organization/invite-member"), |request| {
        let body = request.body.clone().unwrap_or_default();
        let email = body["email"].as_str().unwrap_or_default().to_string();
        let role = body["role"].as_str().unwrap_or_default().to_string();
        ApiResponse::ok(invitation("inv_new", &email, &role, "pending"))
    });
}

#[tokio::test]
async fn admin_can_invite_members() -> Result<()> {
    let h = Harness::with_stored_tenant("A").signed_in();
    with_role(&h, "admin");
    echo_invite(&h);

    let invitation = h.workspace.team().invite("grace@example.com", Role::Admin).await?;
    assert_eq!(invitation.email, "grace@example.com");
    assert_eq!(invitation.status, InvitationStatus::Pending);

    let sent = h.backend.requests_to(&auth_path("organization/invite-member")).pop().unwrap();
    assert_eq!(sent.body, Some(json!({ "email": "grace@example.com", "role": "admin" })));
    assert_eq!(sent.header(ORG_HEADER), Some("A"));
    Ok(())
}

#[tokio::test]
async fn member_cannot_invite() -> Result<()> {
    let h = Harness::with_stored_tenant("A").signed_in();
    with_role(&h, "member");
    echo_invite(&h);

    let err = h.workspace.team().invite("grace@example.com", Role::Member).await.unwrap_err();
    assert!(matches!(err, ClientError::Forbidden(_)));
    assert_eq!(err.class(), ErrorClass::Validation);
    assert!(h.backend.requests_to(&auth_path("organization/invite-member")).is_empty());
    Ok(())
}

#[tokio::test]
async fn owner_role_cannot_be_invited() -> Result<()> {
    let h = Harness::with_stored_tenant("A").signed_in();

    let err = h.workspace.team().invite("grace@example.com", Role::Owner).await.unwrap_err();
    assert!(matches!(err, ClientError::Validation(_)));
    assert!(h.backend.requests().is_empty());
    Ok(())
}

#[tokio::test]
async fn role_is_read_fresh_for_every_action() -> Result<()> {
    let h = Harness::with_stored_tenant("A").signed_in();
    h.backend.on_json(
        Method::Post,
        &auth_path("organization/cancel-invitation"),
        json!({ "invitation": invitation("inv_1", "grace@example.com", "member", "canceled") }),
    );

    with_role(&h, "admin");
    let canceled = h.workspace.team().cancel("inv_1").await?;
    assert_eq!(canceled.status, InvitationStatus::Canceled);

    // Demoted server-side between two actions
    with_role(&h, "member");
    let err = h.workspace.team().cancel("inv_1").await.unwrap_err();
    assert!(matches!(err, ClientError::Forbidden(_)));

    assert_eq!(h.backend.requests_to(&auth_path("organization/get-active-member")).len(), 2);
    assert_eq!(h.backend.requests_to(&auth_path("organization/cancel-invitation")).len(), 1);
    Ok(())
}

#[tokio::test]
async fn resend_reuses_email_and_role() -> Result<()> {
    let h = Harness::with_stored_tenant("A").signed_in();
    echo_invite(&h);
    h.backend.on_json(
        Method::Get,
        &auth_path("organization/list-invitations"),
        json!([
            invitation("inv_1", "grace@example.com", "admin", "pending"),
            invitation("inv_2", "alan@example.com", "member", "canceled"),
        ]),
    );

    h.workspace.team().resend("inv_1").await?;

    let sent = h.backend.requests_to(&auth_path("organization/invite-member")).pop().unwrap();
    assert_eq!(
        sent.body,
        Some(json!({ "email": "grace@example.com", "role": "admin", "resend": true }))
    );

    let err = h.workspace.team().resend("inv_missing").await.unwrap_err();
    assert!(matches!(err, ClientError::Validation(_)));
    Ok(())
}

#[tokio::test]
async fn last_member_cannot_be_removed() -> Result<()> {
    let h = Harness::with_stored_tenant("A").signed_in();
    h.backend.on_json(Method::Post, &auth_path("organization/remove-member"), json!({ "success": true }));
    h.backend.on_json(
        Method::Get,
        &auth_path("organization/list-members"),
        json!({ "members": [member("m_owner", "A", "owner")] }),
    );

    let err = h.workspace.team().remove("m_owner").await.unwrap_err();
    assert!(matches!(err, ClientError::Forbidden(_)));
    assert!(h.backend.requests_to(&auth_path("organization/remove-member")).is_empty());

    h.backend.on_json(
        Method::Get,
        &auth_path("organization/list-members"),
        json!([member("m_owner", "A", "owner"), member("m_2", "A", "member")]),
    );
    h.workspace.team().remove("m_2").await?;

    let sent = h.backend.requests_to(&auth_path("organization/remove-member")).pop().unwrap();
    assert_eq!(sent.body, Some(json!({ "memberIdOrEmail": "m_2" })));
    Ok(())
}

#[tokio::test]
async fn team_actions_need_an_active_organization() -> Result<()> {
    let h = Harness::empty().signed_in();

    assert!(matches!(h.workspace.team().members().await, Err(ClientError::NoActiveTenant)));
    assert!(matches!(
        h.workspace.team().invite("grace@example.com", Role::Member).await,
        Err(ClientError::NoActiveTenant)
    ));
    assert!(h.backend.requests().is_empty());
    Ok(())
}

#[tokio::test]
async fn accepting_an_invitation_switches_to_its_organization() -> Result<()> {
    let h = Harness::with_stored_tenant("A").signed_in().serving_outline();
    h.backend.on_json(
        Method::Post,
        &auth_path("organization/accept-invitation"),
        json!({
            "invitation": {
                "id": "inv_9",
                "email": "ada@example.com",
                "role": "member",
                "status": "accepted",
                "organizationId": "B"
            }
        }),
    );

    let joined = h.workspace.invitations().accept("inv_9").await?;

    assert_eq!(joined.map(|o| o.id).as_deref(), Some("B"));
    assert_eq!(h.workspace.tenants().get().as_deref(), Some("B"));
    let fetch = h.backend.requests_to("/outline").pop().unwrap();
    assert_eq!(fetch.header(ORG_HEADER), Some("B"));
    Ok(())
}

#[tokio::test]
async fn rejecting_an_invitation_keeps_the_current_organization() -> Result<()> {
    let h = Harness::with_stored_tenant("A").signed_in();
    h.backend.on_json(
        Method::Post,
        &auth_path("organization/reject-invitation"),
        invitation("inv_9", "ada@example.com", "member", "rejected"),
    );
    h.backend.on_json(
        Method::Get,
        &auth_path("organization/get-invitation"),
        json!({
            "id": "inv_9",
            "email": "ada@example.com",
            "role": "member",
            "status": "pending",
            "organizationId": "B",
            "organizationName": "Org B",
            "inviterEmail": "owner@example.com"
        }),
    );

    let shown = h.workspace.invitations().get("inv_9").await?;
    assert_eq!(shown.organization_name.as_deref(), Some("Org B"));
    let get = h.backend.requests_to(&auth_path("organization/get-invitation")).pop().unwrap();
    assert_eq!(get.query_value("id"), Some("inv_9"));

    let rejected = h.workspace.invitations().reject("inv_9").await?;
    assert_eq!(rejected.status, InvitationStatus::Rejected);
    assert_eq!(h.workspace.tenants().get().as_deref(), Some("A"));
    Ok(())
}
