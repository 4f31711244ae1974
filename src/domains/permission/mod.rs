mod has_permission;

pub use has_permission::{has_access, RoleSet, UserRole, ADMIN_ONLY, MANAGEMENT, STAFF};
