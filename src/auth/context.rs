use uuid::Uuid;
use crate::domains::permission::{has_access, RoleSet};
use crate::types::UserRole;
use crate::errors::ServiceError;

/// Represents the authentication context for the current report request
#[derive(Debug, Clone)]
pub struct AuthContext {
    /// The ID of the signed-in user
    pub user_id: Uuid,

    /// The role the backend returned for the user, if it resolved
    pub role: Option<UserRole>,
}

impl AuthContext {
    /// Create a new authentication context
    pub fn new(user_id: Uuid, role: UserRole) -> Self {
        Self {
            user_id,
            role: Some(role),
        }
    }

    /// Context for a signed-in user whose role lookup returned nothing usable
    pub fn without_role(user_id: Uuid) -> Self {
        Self { user_id, role: None }
    }

    /// Create a new authentication context for internal system operations
    pub fn internal_system_context() -> Self {
        Self {
            user_id: Uuid::nil(),
            role: Some(UserRole::Admin),
        }
    }

    /// Check if the user's role is in the required set
    pub fn has_access(&self, required_roles: &RoleSet) -> bool {
        has_access(self.role, required_roles)
    }

    /// Authorize against a role set, returning an error if not allowed
    pub fn authorize(&self, required_roles: &RoleSet) -> Result<(), ServiceError> {
        if self.has_access(required_roles) {
            Ok(())
        } else {
            let role = self.role.map(|r| r.as_str()).unwrap_or("none");
            Err(ServiceError::PermissionDenied(format!(
                "Role '{}' cannot access this report",
                role
            )))
        }
    }
}
