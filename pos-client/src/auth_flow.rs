//! Login and branch re-selection.
//!
//! Both flows obtain their token from the backend; the client never mints or
//! re-signs a token itself.

use tracing::{info, warn};

use crate::api::{ApiClient, LoginRequest};
use crate::error::{ClientError, ClientResult};
use crate::routes::{Navigation, Route, Router};

pub async fn login(
    api: &ApiClient,
    router: &Router,
    email: &str,
    password: &str,
) -> ClientResult<Navigation> {
    let email = email.trim();
    if email.is_empty() || password.is_empty() {
        return Err(ClientError::Validation("email and password are required"));
    }

    let token = api
        .login(&LoginRequest {
            email: email.to_string(),
            password: password.to_string(),
            branch_id: None,
        })
        .await?;
    let next = accept_token(router, token)?;
    info!(email, next = next.path(), "login succeeded");
    Ok(router.go(next))
}

/// Ask the backend for a token bound to `branch_id`, re-confirming the
/// password of the current session's user.
pub async fn select_branch(
    api: &ApiClient,
    router: &Router,
    branch_id: &str,
    password: &str,
) -> ClientResult<Navigation> {
    let branch_id = branch_id.trim();
    if branch_id.is_empty() {
        return Err(ClientError::Validation("select a branch first"));
    }
    if password.is_empty() {
        return Err(ClientError::Validation("password confirmation is required"));
    }

    let session = router.session();
    session.sync_from_store();
    let Some(email) = session.claims().and_then(|claims| claims.email) else {
        warn!("branch selection attempted without a session");
        session.logout();
        return Err(ClientError::NoSession);
    };

    let token = api
        .login(&LoginRequest {
            email,
            password: password.to_string(),
            branch_id: Some(branch_id.to_string()),
        })
        .await?;
    accept_token(router, token)?;
    info!(branch_id, "operating branch selected");
    Ok(router.go(Route::Dashboard))
}

fn accept_token(router: &Router, token: String) -> ClientResult<Route> {
    let session = router.session();
    session.set_token(token);
    let snapshot = session.snapshot();
    match snapshot.decoded() {
        Ok(claims) if claims.needs_branch_selection() => Ok(Route::SelectBranch),
        Ok(_) => Ok(Route::Dashboard),
        Err(err) => {
            let err = err.clone();
            session.logout();
            Err(ClientError::Auth(err))
        }
    }
}
