use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;

// --- User Role Definition ---

/// UserRole enum for authorization in the application
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UserRole {
    /// Township-level administrator; manages accounts and every report
    Admin,
    /// Village-tract manager; reviews death and disability registers
    Manager,
    /// Data-entry staff for a village
    Staff,
    /// Signed-in account without dashboard access
    Viewer,
}

/// Set of roles a route or report requires (any one of them grants access)
pub type RoleSet = HashSet<UserRole>;

/// Routes restricted to administrators
pub static ADMIN_ONLY: Lazy<RoleSet> = Lazy::new(|| [UserRole::Admin].into_iter().collect());

/// Routes open to administrators and managers
pub static MANAGEMENT: Lazy<RoleSet> =
    Lazy::new(|| [UserRole::Admin, UserRole::Manager].into_iter().collect());

/// Routes open to every role that works with records
pub static STAFF: Lazy<RoleSet> = Lazy::new(|| {
    [UserRole::Admin, UserRole::Manager, UserRole::Staff]
        .into_iter()
        .collect()
});

impl UserRole {
    pub fn as_str(&self) -> &'static str {
        match self {
            UserRole::Admin => "admin",
            UserRole::Manager => "manager",
            UserRole::Staff => "staff",
            UserRole::Viewer => "viewer",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "admin" => Some(UserRole::Admin),
            "manager" => Some(UserRole::Manager),
            "staff" => Some(UserRole::Staff),
            "viewer" | "user" => Some(UserRole::Viewer),
            _ => None,
        }
    }
}

impl fmt::Display for UserRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Single access policy shared by every guarded route.
///
/// A missing role (no session, or a role string the backend returned that we do
/// not recognise) never has access. An empty requirement set denies everyone, so
/// a misconfigured route fails closed.
pub fn has_access(role: Option<UserRole>, required_roles: &RoleSet) -> bool {
    match role {
        Some(role) => required_roles.contains(&role),
        None => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_role_sets_are_nested() {
        assert!(ADMIN_ONLY.is_subset(&MANAGEMENT));
        assert!(MANAGEMENT.is_subset(&STAFF));
        assert!(!STAFF.contains(&UserRole::Viewer));
    }

    #[test]
    fn test_has_access() {
        assert!(has_access(Some(UserRole::Admin), &ADMIN_ONLY));
        assert!(!has_access(Some(UserRole::Manager), &ADMIN_ONLY));
        assert!(has_access(Some(UserRole::Manager), &MANAGEMENT));
        assert!(has_access(Some(UserRole::Staff), &STAFF));
        assert!(!has_access(Some(UserRole::Viewer), &STAFF));
        assert!(!has_access(None, &STAFF));
        assert!(!has_access(Some(UserRole::Admin), &RoleSet::new()));
    }

    #[test]
    fn test_role_string_round_trip() {
        for role in [UserRole::Admin, UserRole::Manager, UserRole::Staff, UserRole::Viewer] {
            assert_eq!(UserRole::from_str(role.as_str()), Some(role));
        }
        assert_eq!(UserRole::from_str(" Admin "), Some(UserRole::Admin));
        assert_eq!(UserRole::from_str("user"), Some(UserRole::Viewer));
        assert_eq!(UserRole::from_str("superuser"), None);
    }
}
