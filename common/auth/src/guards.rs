//! Route gating based on decoded session claims.
//!
//! Decisions made here only decide which view to show. They are not an
//! authorization boundary: every backend endpoint re-checks the bearer token.

use tracing::debug;

use crate::claims::Claims;
use crate::decoder::decode_claims;
use crate::error::{AuthError, AuthResult, MalformedToken};
use crate::roles::Role;

/// Where a denied navigation is sent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Redirect {
    Login,
    SelectBranch,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DenyReason {
    MissingToken,
    MalformedToken(MalformedToken),
    RoleNotAllowed { role: Option<Role> },
    BranchNotSelected,
}

impl DenyReason {
    pub fn as_str(&self) -> &'static str {
        match self {
            DenyReason::MissingToken => "missing_token",
            DenyReason::MalformedToken(_) => "malformed_token",
            DenyReason::RoleNotAllowed { .. } => "role_not_allowed",
            DenyReason::BranchNotSelected => "branch_not_selected",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum GuardDecision {
    Allow(Claims),
    Redirect { to: Redirect, reason: DenyReason },
}

impl GuardDecision {
    pub fn is_allowed(&self) -> bool {
        matches!(self, GuardDecision::Allow(_))
    }

    pub fn redirect(&self) -> Option<Redirect> {
        match self {
            GuardDecision::Allow(_) => None,
            GuardDecision::Redirect { to, .. } => Some(*to),
        }
    }
}

/// Access rules attached to one protected route.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RoutePolicy {
    allowed_roles: Option<Vec<Role>>,
    requires_branch: bool,
}

impl RoutePolicy {
    /// Any authenticated session may enter.
    pub fn any_authenticated() -> Self {
        Self::default()
    }

    /// Only sessions whose role is in `roles` may enter.
    pub fn allow<I, R>(roles: I) -> Self
    where
        I: IntoIterator<Item = R>,
        R: Into<Role>,
    {
        Self {
            allowed_roles: Some(roles.into_iter().map(Into::into).collect()),
            requires_branch: false,
        }
    }

    /// Send super admins without an operating branch to branch selection.
    pub fn requiring_branch(mut self) -> Self {
        self.requires_branch = true;
        self
    }

    pub fn allowed_roles(&self) -> Option<&[Role]> {
        self.allowed_roles.as_deref()
    }

    pub fn requires_branch(&self) -> bool {
        self.requires_branch
    }
}

impl From<Role> for RoutePolicy {
    fn from(role: Role) -> Self {
        RoutePolicy::allow([role])
    }
}

pub fn ensure_role(claims: &Claims, allowed: &[Role]) -> AuthResult<()> {
    match &claims.role {
        Some(role) if allowed.contains(role) => Ok(()),
        role => Err(AuthError::Forbidden {
            role: role.as_ref().map(|value| value.to_string()),
            required: allowed.iter().map(|value| value.to_string()).collect(),
        }),
    }
}

/// Evaluate a policy against claims that were already decoded.
pub fn check_route(decoded: Result<&Claims, &AuthError>, policy: &RoutePolicy) -> GuardDecision {
    let claims = match decoded {
        Ok(claims) => claims,
        Err(AuthError::MalformedToken(reason)) => {
            return deny_to_login(DenyReason::MalformedToken(reason.clone()))
        }
        Err(_) => return deny_to_login(DenyReason::MissingToken),
    };

    if let Some(allowed) = policy.allowed_roles() {
        if ensure_role(claims, allowed).is_err() {
            return deny_to_login(DenyReason::RoleNotAllowed {
                role: claims.role.clone(),
            });
        }
    }

    if policy.requires_branch() && claims.needs_branch_selection() {
        debug!("super admin has no operating branch yet");
        return GuardDecision::Redirect {
            to: Redirect::SelectBranch,
            reason: DenyReason::BranchNotSelected,
        };
    }

    GuardDecision::Allow(claims.clone())
}

/// Decode `token` and evaluate the policy in one step.
pub fn guard_token(token: Option<&str>, policy: &RoutePolicy) -> GuardDecision {
    let decoded = token.ok_or(AuthError::MissingToken).and_then(decode_claims);
    check_route(decoded.as_ref(), policy)
}

fn deny_to_login(reason: DenyReason) -> GuardDecision {
    debug!(reason = reason.as_str(), "route guard denied navigation");
    GuardDecision::Redirect {
        to: Redirect::Login,
        reason,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::roles::{ROLE_CASHIER, ROLE_MANAGER, ROLE_SUPER_ADMIN};
    use base64::engine::general_purpose::URL_SAFE_NO_PAD;
    use base64::Engine;

    fn token(payload: &str) -> String {
        format!(
            "eyJhbGciOiJIUzI1NiJ9.{}.sig",
            URL_SAFE_NO_PAD.encode(payload)
        )
    }

    #[test]
    fn cashier_token_matches_cashier_allow_list() {
        let token = token(r#"{"role":"Cashier","branchid":"B1"}"#);
        let tills = RoutePolicy::allow([ROLE_CASHIER, ROLE_MANAGER, ROLE_SUPER_ADMIN]);
        let admin_only = RoutePolicy::allow([ROLE_SUPER_ADMIN]);

        let allowed = guard_token(Some(&token), &tills);
        match allowed {
            GuardDecision::Allow(claims) => assert_eq!(claims.branch_id.as_deref(), Some("B1")),
            other => panic!("expected allow, got {other:?}"),
        }

        let denied = guard_token(Some(&token), &admin_only);
        assert_eq!(
            denied,
            GuardDecision::Redirect {
                to: Redirect::Login,
                reason: DenyReason::RoleNotAllowed {
                    role: Some(Role::Cashier)
                },
            }
        );
    }

    #[test]
    fn missing_token_always_redirects_to_login() {
        for policy in [
            RoutePolicy::any_authenticated(),
            RoutePolicy::allow([ROLE_CASHIER]),
            RoutePolicy::any_authenticated().requiring_branch(),
        ] {
            assert_eq!(
                guard_token(None, &policy),
                GuardDecision::Redirect {
                    to: Redirect::Login,
                    reason: DenyReason::MissingToken,
                }
            );
        }
    }

    #[test]
    fn malformed_tokens_redirect_to_login() {
        for bad in ["garbage", "a.b", "a.!!!.c", "a.e30.c.d"] {
            let decision = guard_token(Some(bad), &RoutePolicy::any_authenticated());
            assert_eq!(decision.redirect(), Some(Redirect::Login), "token {bad}");
        }
    }

    #[test]
    fn no_allow_list_admits_any_role_including_missing() {
        let decision = guard_token(Some(&token(r#"{"name":"x"}"#)), &RoutePolicy::default());
        assert!(decision.is_allowed());
    }

    #[test]
    fn allow_list_rejects_missing_role() {
        let decision = guard_token(
            Some(&token(r#"{"branchid":"B1"}"#)),
            &RoutePolicy::allow([ROLE_CASHIER]),
        );
        assert_eq!(decision.redirect(), Some(Redirect::Login));
    }

    #[test]
    fn super_admin_without_branch_is_sent_to_branch_selection() {
        let token = token(r#"{"role":"Super Admin"}"#);
        let dashboard = RoutePolicy::any_authenticated().requiring_branch();
        let selection = RoutePolicy::allow([ROLE_SUPER_ADMIN]);

        assert_eq!(
            guard_token(Some(&token), &dashboard).redirect(),
            Some(Redirect::SelectBranch)
        );
        assert!(guard_token(Some(&token), &selection).is_allowed());
    }

    #[test]
    fn role_check_runs_before_branch_check() {
        let token = token(r#"{"role":"Super Admin"}"#);
        let policy = RoutePolicy::allow([ROLE_CASHIER]).requiring_branch();
        assert_eq!(guard_token(Some(&token), &policy).redirect(), Some(Redirect::Login));
    }

    #[test]
    fn ensure_role_reports_required_roles() {
        let claims = crate::decoder::decode_claims(&token(r#"{"role":"Audit"}"#)).expect("claims");
        let err = ensure_role(&claims, &[Role::Manager]).expect_err("audit is not manager");
        assert_eq!(
            err,
            AuthError::Forbidden {
                role: Some("Audit".into()),
                required: vec!["Manager".into()],
            }
        );
    }
}
