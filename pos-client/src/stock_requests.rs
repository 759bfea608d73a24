//! Inter-branch stock requests raised from the inventory views.
//!
//! A request always asks stock to be moved into the session's own branch.
//! Writes are not coordinated with the polling loops; the next poll simply
//! picks the new request up.

use common_auth::Claims;
use tracing::{info, warn};

use crate::api::ApiClient;
use crate::error::{ClientError, ClientResult};
use crate::models::{NewStockRequest, StockRequest, REQUEST_COMPLETE, REQUEST_PENDING};
use crate::session::SessionContext;

/// Ask `from_branch_id` to ship `quantity` of `product_id` to this branch.
pub async fn request_stock(
    api: &ApiClient,
    session: &SessionContext,
    product_id: &str,
    from_branch_id: &str,
    quantity: i64,
) -> ClientResult<StockRequest> {
    let product_id = product_id.trim();
    let from_branch_id = from_branch_id.trim();
    if product_id.is_empty() {
        return Err(ClientError::Validation("select a product first"));
    }
    if from_branch_id.is_empty() {
        return Err(ClientError::Validation("select the branch to request from"));
    }
    if quantity <= 0 {
        return Err(ClientError::Validation("quantity must be positive"));
    }

    let (token, claims) = current_session(session)?;
    let to_branch_id = claims.branch_id.ok_or(ClientError::NoBranch)?;
    if to_branch_id == from_branch_id {
        return Err(ClientError::Validation("a branch cannot request stock from itself"));
    }

    let body = NewStockRequest {
        from_branch_id: from_branch_id.to_string(),
        to_branch_id,
        product_id: product_id.to_string(),
        quantity,
        status: REQUEST_PENDING.to_string(),
    };
    let created = end_on_session_error(session, api.create_request(&token, &body).await)?;
    info!(
        request_id = %created.request_id,
        from = %body.from_branch_id,
        to = %body.to_branch_id,
        quantity,
        "stock request submitted"
    );
    Ok(created)
}

/// Mark a request as received; the backend moves the stock.
pub async fn complete_request(
    api: &ApiClient,
    session: &SessionContext,
    request_id: &str,
) -> ClientResult<()> {
    let request_id = request_id.trim();
    if request_id.is_empty() {
        return Err(ClientError::Validation("request id is required"));
    }

    let (token, _) = current_session(session)?;
    end_on_session_error(
        session,
        api.update_request_status(&token, request_id, REQUEST_COMPLETE)
            .await,
    )?;
    info!(request_id, "stock request completed");
    Ok(())
}

fn current_session(session: &SessionContext) -> ClientResult<(String, Claims)> {
    session.sync_from_store();
    let snapshot = session.snapshot();
    let result = match (&snapshot.token, snapshot.decoded()) {
        (Some(token), Ok(claims)) => Ok((token.clone(), claims.clone())),
        (None, _) => Err(ClientError::NoSession),
        (Some(_), Err(err)) => Err(ClientError::Auth(err.clone())),
    };
    end_on_session_error(session, result)
}

fn end_on_session_error<T>(session: &SessionContext, result: ClientResult<T>) -> ClientResult<T> {
    if let Err(err) = &result {
        if err.ends_session() {
            warn!(error = %err, "session ended during stock request");
            session.logout();
        }
    }
    result
}
