use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

pub const ROLE_SUPER_ADMIN: &str = "Super Admin";
pub const ROLE_MANAGER: &str = "Manager";
pub const ROLE_CASHIER: &str = "Cashier";
pub const ROLE_AUDIT: &str = "Audit";

pub const ROLE_HIERARCHY: &[&str] = &[ROLE_SUPER_ADMIN, ROLE_MANAGER, ROLE_CASHIER, ROLE_AUDIT];

/// Role carried in the `role` claim of a session token.
///
/// Role strings are compared exactly as the backend issues them. Anything the
/// backend sends that is not one of the four known roles is kept verbatim so
/// that allow-lists never accidentally match it.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Role {
    SuperAdmin,
    Manager,
    Cashier,
    Audit,
    Unknown(String),
}

impl Role {
    pub fn as_str(&self) -> &str {
        match self {
            Role::SuperAdmin => ROLE_SUPER_ADMIN,
            Role::Manager => ROLE_MANAGER,
            Role::Cashier => ROLE_CASHIER,
            Role::Audit => ROLE_AUDIT,
            Role::Unknown(other) => other,
        }
    }

    /// Roles allowed to switch a view into "all branches" mode.
    pub fn can_view_all_branches(&self) -> bool {
        matches!(self, Role::SuperAdmin | Role::Manager)
    }
}

impl From<&str> for Role {
    fn from(value: &str) -> Self {
        match value {
            ROLE_SUPER_ADMIN => Role::SuperAdmin,
            ROLE_MANAGER => Role::Manager,
            ROLE_CASHIER => Role::Cashier,
            ROLE_AUDIT => Role::Audit,
            other => Role::Unknown(other.to_string()),
        }
    }
}

impl FromStr for Role {
    type Err = std::convert::Infallible;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        Ok(Role::from(value))
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for Role {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for Role {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let value = String::deserialize(deserializer)?;
        Ok(Role::from(value.as_str()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn known_roles_round_trip_through_strings() {
        for name in ROLE_HIERARCHY {
            let role = Role::from(*name);
            assert!(!matches!(role, Role::Unknown(_)), "{name} should be known");
            assert_eq!(role.as_str(), *name);
        }
    }

    #[test]
    fn role_matching_is_case_sensitive() {
        assert_eq!(Role::from("cashier"), Role::Unknown("cashier".into()));
        assert_eq!(Role::from("SuperAdmin"), Role::Unknown("SuperAdmin".into()));
    }

    #[test]
    fn only_super_admin_and_manager_view_all_branches() {
        assert!(Role::SuperAdmin.can_view_all_branches());
        assert!(Role::Manager.can_view_all_branches());
        assert!(!Role::Cashier.can_view_all_branches());
        assert!(!Role::Audit.can_view_all_branches());
    }
}
