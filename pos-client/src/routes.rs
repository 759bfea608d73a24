//! Route table and navigation.
//!
//! The role lists below are where each protected page is opened to a set of
//! roles. They are this client's own policy: earlier versions of the web front
//! end gated only on being logged in. They only decide what the client shows;
//! the backend applies its own per-endpoint checks to every request.

use std::sync::Arc;

use common_auth::{
    check_route, Claims, DenyReason, GuardDecision, Redirect, Role, RoutePolicy,
};
use tokio::sync::watch;
use tracing::{info, warn};

use crate::session::SessionContext;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Route {
    Login,
    SelectBranch,
    Dashboard,
    Sales,
    SalesHistory,
    Product,
    Inventory,
    Reports,
    DetailReport,
    CustomerRank,
    CashFlow,
    UserManagement,
    EmployeeTransfer,
    Payment,
    Receipts,
}

impl Route {
    pub const ALL: &'static [Route] = &[
        Route::Login,
        Route::SelectBranch,
        Route::Dashboard,
        Route::Sales,
        Route::SalesHistory,
        Route::Product,
        Route::Inventory,
        Route::Reports,
        Route::DetailReport,
        Route::CustomerRank,
        Route::CashFlow,
        Route::UserManagement,
        Route::EmployeeTransfer,
        Route::Payment,
        Route::Receipts,
    ];

    pub fn path(self) -> &'static str {
        match self {
            Route::Login => "/login",
            Route::SelectBranch => "/select-branch",
            Route::Dashboard => "/",
            Route::Sales => "/sales",
            Route::SalesHistory => "/salesHistory",
            Route::Product => "/product",
            Route::Inventory => "/inventory",
            Route::Reports => "/reports",
            Route::DetailReport => "/detailReport",
            Route::CustomerRank => "/customerRank",
            Route::CashFlow => "/cashFlow",
            Route::UserManagement => "/userManagement",
            Route::EmployeeTransfer => "/employeeTransfer",
            Route::Payment => "/payment",
            Route::Receipts => "/receipts",
        }
    }

    /// Resolve a location such as `/inventory?tab=low` to a route.
    pub fn from_path(path: &str) -> Option<Route> {
        let path = path.split(['?', '#']).next().unwrap_or_default().trim();
        let path = match path.trim_end_matches('/') {
            "" => "/",
            trimmed => trimmed,
        };
        Route::ALL.iter().copied().find(|route| route.path() == path)
    }

    pub fn is_public(self) -> bool {
        matches!(self, Route::Login)
    }

    pub fn policy(self) -> RoutePolicy {
        use Role::*;
        match self {
            Route::Login => RoutePolicy::any_authenticated(),
            Route::SelectBranch => RoutePolicy::allow([SuperAdmin]),
            Route::Dashboard => RoutePolicy::any_authenticated().requiring_branch(),
            Route::Sales | Route::Payment => {
                RoutePolicy::allow([Cashier, Manager, SuperAdmin]).requiring_branch()
            }
            Route::Inventory | Route::Product => {
                RoutePolicy::any_authenticated().requiring_branch()
            }
            Route::Reports | Route::DetailReport | Route::CashFlow | Route::CustomerRank => {
                RoutePolicy::allow([SuperAdmin, Manager, Audit])
            }
            Route::UserManagement | Route::EmployeeTransfer => {
                RoutePolicy::allow([SuperAdmin, Manager])
            }
            Route::SalesHistory | Route::Receipts => RoutePolicy::any_authenticated(),
        }
    }
}

impl From<Redirect> for Route {
    fn from(value: Redirect) -> Self {
        match value {
            Redirect::Login => Route::Login,
            Redirect::SelectBranch => Route::SelectBranch,
        }
    }
}

/// Holds the active route; the analogue of the browser location.
#[derive(Clone)]
pub struct Navigator {
    current: Arc<watch::Sender<Route>>,
}

impl Navigator {
    pub fn new(initial: Route) -> Self {
        let (current, _) = watch::channel(initial);
        Self {
            current: Arc::new(current),
        }
    }

    pub fn current(&self) -> Route {
        *self.current.borrow()
    }

    pub fn navigate(&self, route: Route) {
        let previous = self.current.send_replace(route);
        if previous != route {
            info!(from = previous.path(), to = route.path(), "navigated");
        }
    }

    pub fn subscribe(&self) -> watch::Receiver<Route> {
        self.current.subscribe()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Navigation {
    Rendered {
        route: Route,
        claims: Option<Claims>,
    },
    Redirected {
        from: Route,
        to: Route,
        reason: DenyReason,
    },
    NotFound {
        path: String,
    },
}

impl Navigation {
    /// The route that ended up active, if any.
    pub fn landed_on(&self) -> Option<Route> {
        match self {
            Navigation::Rendered { route, .. } => Some(*route),
            Navigation::Redirected { to, .. } => Some(*to),
            Navigation::NotFound { .. } => None,
        }
    }
}

/// Runs the route guard on every navigation. Results are never cached.
#[derive(Clone)]
pub struct Router {
    session: SessionContext,
}

impl Router {
    pub fn new(session: SessionContext) -> Self {
        Self { session }
    }

    pub fn session(&self) -> &SessionContext {
        &self.session
    }

    pub fn visit(&self, path: &str) -> Navigation {
        let Some(route) = Route::from_path(path) else {
            warn!(path, "no route for path");
            return Navigation::NotFound {
                path: path.to_string(),
            };
        };

        let navigator = self.session.navigator();
        if route.is_public() {
            navigator.navigate(route);
            return Navigation::Rendered {
                route,
                claims: None,
            };
        }

        self.session.sync_from_store();
        let snapshot = self.session.snapshot();
        let metrics = self.session.metrics();

        match check_route(snapshot.decoded(), &route.policy()) {
            GuardDecision::Allow(claims) => {
                metrics.record_guard("allow");
                navigator.navigate(route);
                Navigation::Rendered {
                    route,
                    claims: Some(claims),
                }
            }
            GuardDecision::Redirect { to, reason } => {
                let target = Route::from(to);
                metrics.record_guard(reason.as_str());
                info!(
                    route = route.path(),
                    redirect = target.path(),
                    reason = reason.as_str(),
                    "route guard redirected"
                );
                navigator.navigate(target);
                Navigation::Redirected {
                    from: route,
                    to: target,
                    reason,
                }
            }
        }
    }

    pub fn go(&self, route: Route) -> Navigation {
        self.visit(route.path())
    }
}
