use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::RwLock;
use uuid::Uuid;

use crate::errors::{SourceError, SourceResult};
use crate::types::UserRole;

/// Looks up the role recorded for a user in the backend's profile table
#[async_trait]
pub trait RoleSource: Send + Sync {
    /// `Ok(None)` means the user exists but carries no role we recognise
    async fn find_role(&self, user_id: Uuid) -> SourceResult<Option<UserRole>>;
}

/// Role lookup backed by an in-process map
#[derive(Debug, Default)]
pub struct InMemoryRoleSource {
    roles: RwLock<HashMap<Uuid, String>>,
}

impl InMemoryRoleSource {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store the raw role string as the backend would
    pub fn set_role(&self, user_id: Uuid, role: &str) -> SourceResult<()> {
        let mut roles = self
            .roles
            .write()
            .map_err(|_| SourceError::Other("role table lock poisoned".to_string()))?;
        roles.insert(user_id, role.to_string());
        Ok(())
    }
}

#[async_trait]
impl RoleSource for InMemoryRoleSource {
    async fn find_role(&self, user_id: Uuid) -> SourceResult<Option<UserRole>> {
        let roles = self
            .roles
            .read()
            .map_err(|_| SourceError::Other("role table lock poisoned".to_string()))?;
        match roles.get(&user_id) {
            Some(raw) => Ok(UserRole::from_str(raw)),
            None => Err(SourceError::NotFound("User".to_string(), user_id.to_string())),
        }
    }
}
