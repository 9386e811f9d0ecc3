mod common;

use anyhow::Result;
use serde_json::json;

use common::{auth_path, Harness};
use outline_workspace::auth::SignIn;
use outline_workspace::cli::utils::{error_code, redirect_error};
use outline_workspace::client::{ApiResponse, Method};
use outline_workspace::gate::{GateDecision, GateState, Route};
use outline_workspace::store::{SessionStorage, TenantStorage};
use outline_workspace::view::Rendered;

#[tokio::test]
async fn unresolved_identity_suspends_every_route() -> Result<()> {
    let h = Harness::with_stored_tenant("A").signed_in();
    let gate = h.workspace.gate();

    // Resolve once so the next navigation starts from a known identity
    assert_eq!(gate.navigate(&Route::DashboardTable).await?, GateDecision::Render);

    let release = h.backend.hold(|r| r.path == auth_path("get-session"));
    h.backend.clear_requests();

    let (decision, during) = tokio::join!(gate.navigate(&Route::DashboardTable), async {
        h.backend.wait_for(|r| r.path == auth_path("get-session")).await?;
        let during = (
            gate.state(),
            gate.current_decision(&Route::DashboardTable),
            gate.current_decision(&Route::SignIn),
        );
        release.notify_one();
        anyhow::Ok(during)
    });

    let (state, protected, public) = during?;
    assert_eq!(state, GateState::Unknown);
    assert_eq!(protected, GateDecision::Suspend);
    assert_eq!(public, GateDecision::Suspend);
    assert_eq!(decision?, GateDecision::Render);
    Ok(())
}

#[tokio::test]
async fn anonymous_user_is_sent_to_sign_in() -> Result<()> {
    let h = Harness::with_stored_tenant("A");
    h.backend.on_json(Method::Get, &auth_path("get-session"), json!(null));
    let gate = h.workspace.gate();

    assert_eq!(
        gate.navigate(&Route::DashboardTable).await?,
        GateDecision::Redirect(Route::SignIn)
    );
    assert_eq!(
        gate.navigate(&Route::SelectOrganization).await?,
        GateDecision::Redirect(Route::SignIn)
    );
    assert_eq!(gate.navigate(&Route::SignUp).await?, GateDecision::Render);
    assert_eq!(gate.state(), GateState::Anonymous);
    Ok(())
}

#[tokio::test]
async fn expired_session_resolves_to_anonymous() -> Result<()> {
    let h = Harness::empty();
    h.backend.on_status(Method::Get, &auth_path("get-session"), 401, "Unauthorized");

    assert_eq!(
        h.workspace.gate().navigate(&Route::Dashboard).await?,
        GateDecision::Redirect(Route::SignIn)
    );
    Ok(())
}

#[tokio::test]
async fn provider_outage_is_not_mistaken_for_sign_out() -> Result<()> {
    let h = Harness::empty();
    h.backend.on_status(Method::Get, &auth_path("get-session"), 503, "Service unavailable");

    let err = h.workspace.gate().navigate(&Route::Dashboard).await.unwrap_err();
    assert_eq!(err.status_code(), Some(503));
    Ok(())
}

#[tokio::test]
async fn signed_in_routes() -> Result<()> {
    let h = Harness::empty().signed_in();
    let gate = h.workspace.gate();

    assert_eq!(gate.navigate(&Route::SignIn).await?, GateDecision::Redirect(Route::Dashboard));
    assert_eq!(
        gate.navigate(&Route::DashboardTeam).await?,
        GateDecision::Redirect(Route::SelectOrganization)
    );
    assert_eq!(gate.navigate(&Route::CreateOrganization).await?, GateDecision::Render);
    assert_eq!(
        gate.navigate(&Route::AcceptInvitation("inv_1".to_string())).await?,
        GateDecision::Render
    );

    h.workspace.switcher().select_organization(&h.organization("A")).await?;
    assert_eq!(gate.navigate(&Route::DashboardTeam).await?, GateDecision::Render);

    // Identity is resolved on every navigation
    assert_eq!(h.backend.requests_to(&auth_path("get-session")).len(), 5);
    Ok(())
}

#[tokio::test]
async fn sign_in_captures_and_sends_session_cookie() -> Result<()> {
    let h = Harness::empty().signed_in();
    h.backend.on(Method::Post, &auth_path("sign-in/email"), |_| {
        ApiResponse::ok(json!({
            "user": { "id": "user_1", "name": "Ada Lovelace", "email": "ada@example.com" }
        }))
        .with_header("set-cookie", "better-auth.session_token=tok123; Path=/; HttpOnly")
    });

    let user = h
        .workspace
        .sign_in(&SignIn { email: "ada@example.com".to_string(), password: "secret".to_string() })
        .await?;
    assert_eq!(user.id, "user_1");
    assert_eq!(h.storage.load_token()?, Some("tok123".to_string()));

    h.workspace.gate().navigate(&Route::Dashboard).await?;
    let request = h.backend.requests_to(&auth_path("get-session")).pop().unwrap();
    assert_eq!(request.header("cookie"), Some("better-auth.session_token=tok123"));
    Ok(())
}

#[tokio::test]
async fn identity_error_on_fetch_routes_to_sign_in_without_notice() -> Result<()> {
    let h = Harness::with_stored_tenant("A").signed_in();
    h.backend.on_status(Method::Get, "/outline", 401, "Unauthorized");

    let err = h.workspace.outlines().refresh().await.unwrap_err();
    assert!(err.is_identity());
    assert_eq!(h.workspace.outlines().render(), Rendered::Loading);
    assert_eq!(h.workspace.route_for_error(&err), Some(Route::SignIn));
    assert_eq!(h.workspace.gate().state(), GateState::Unknown);
    assert!(h.notifier.notices().is_empty());
    Ok(())
}

#[tokio::test]
async fn identity_error_in_a_command_points_to_sign_in() -> Result<()> {
    let h = Harness::with_stored_tenant("A").signed_in();
    h.backend.on_status(Method::Get, "/outline", 401, "Unauthorized");
    assert_eq!(h.workspace.gate().navigate(&Route::DashboardTable).await?, GateDecision::Render);

    let failed = h.workspace.outlines().refresh().await.map_err(anyhow::Error::from);
    let err = redirect_error(&h.workspace, failed.unwrap_err());

    assert!(err.to_string().contains("workspace auth login"));
    assert_eq!(error_code(&err).as_deref(), Some("identity"));
    assert_eq!(h.workspace.gate().state(), GateState::Unknown);

    // Anything else passes through untouched
    h.backend.on_status(Method::Get, "/outline", 500, "Boom");
    let failed = h.workspace.outlines().refresh().await.map_err(anyhow::Error::from);
    let err = redirect_error(&h.workspace, failed.unwrap_err());
    assert!(!err.to_string().contains("auth login"));
    Ok(())
}

#[tokio::test]
async fn stale_stored_tenant_is_never_trusted_by_the_gate() -> Result<()> {
    let h = Harness::with_stored_tenant("Z").signed_in().serving_outline();

    assert_eq!(
        h.workspace.gate().navigate(&Route::DashboardTable).await?,
        GateDecision::Redirect(Route::SelectOrganization)
    );
    assert_eq!(h.workspace.tenants().get(), None);
    assert_eq!(h.storage.load_tenant()?, None);

    h.workspace.outlines().refresh().await?;
    assert!(h.backend.requests_to("/outline").is_empty());
    assert_eq!(h.workspace.outlines().render(), Rendered::Idle);
    Ok(())
}

#[tokio::test]
async fn gate_skips_the_organization_check_off_tenant_routes() -> Result<()> {
    let h = Harness::with_stored_tenant("Z").signed_in();

    assert_eq!(h.workspace.gate().navigate(&Route::CreateOrganization).await?, GateDecision::Render);
    assert!(h.backend.requests_to(&auth_path("organization/list")).is_empty());
    assert_eq!(h.workspace.tenants().get().as_deref(), Some("Z"));
    Ok(())
}
