pub mod claims;
pub mod decoder;
pub mod error;
pub mod guards;
pub mod roles;

pub use claims::Claims;
pub use decoder::decode_claims;
pub use error::{AuthError, AuthResult, MalformedToken};
pub use guards::{
    check_route, ensure_role, guard_token, DenyReason, GuardDecision, Redirect, RoutePolicy,
};
pub use roles::{Role, ROLE_AUDIT, ROLE_CASHIER, ROLE_HIERARCHY, ROLE_MANAGER, ROLE_SUPER_ADMIN};
