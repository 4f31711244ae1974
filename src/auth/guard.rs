use std::sync::Arc;
use uuid::Uuid;

use super::context::AuthContext;
use super::repository::RoleSource;
use crate::domains::permission::RoleSet;

pub const DEFAULT_LOGIN_PATH: &str = "/login";
pub const DEFAULT_DENIED_PATH: &str = "/";

/// Outcome of a route guard check
#[derive(Debug, Clone)]
pub enum GuardDecision {
    /// Render the route with this context
    Allow(AuthContext),
    /// Navigate away
    Redirect(String),
}

impl GuardDecision {
    pub fn is_allowed(&self) -> bool {
        matches!(self, GuardDecision::Allow(_))
    }
}

/// Generic route guard. Every protected dashboard passes its own role set;
/// the guard re-reads the user's role on every check so a role change in the
/// backend takes effect on the next navigation.
#[derive(Clone)]
pub struct RouteGuard {
    role_source: Arc<dyn RoleSource>,
    login_path: String,
    denied_path: String,
}

impl RouteGuard {
    pub fn new(role_source: Arc<dyn RoleSource>) -> Self {
        Self {
            role_source,
            login_path: DEFAULT_LOGIN_PATH.to_string(),
            denied_path: DEFAULT_DENIED_PATH.to_string(),
        }
    }

    pub fn with_paths(mut self, login_path: &str, denied_path: &str) -> Self {
        self.login_path = login_path.to_string();
        self.denied_path = denied_path.to_string();
        self
    }

    pub async fn check(&self, user_id: Option<Uuid>, required_roles: &RoleSet) -> GuardDecision {
        let Some(user_id) = user_id else {
            return GuardDecision::Redirect(self.login_path.clone());
        };

        let role = match self.role_source.find_role(user_id).await {
            Ok(role) => role,
            Err(e) => {
                log::warn!("Role lookup failed for user {}: {}", user_id, e);
                return GuardDecision::Redirect(self.login_path.clone());
            }
        };

        let context = match role {
            Some(role) => AuthContext::new(user_id, role),
            None => AuthContext::without_role(user_id),
        };

        if context.has_access(required_roles) {
            GuardDecision::Allow(context)
        } else {
            log::warn!(
                "User {} with role {:?} denied; redirecting to {}",
                user_id, context.role, self.denied_path
            );
            GuardDecision::Redirect(self.denied_path.clone())
        }
    }
}
