pub mod context;
pub mod guard;
pub mod repository;

// Re-export public items
pub use context::AuthContext;
pub use guard::{GuardDecision, RouteGuard};
pub use repository::{InMemoryRoleSource, RoleSource};
