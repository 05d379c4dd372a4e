//! User registry store.

use std::sync::Arc;

use auditros_core::Result;
use auditros_core::clock;
use auditros_core::storage::KeyValueStore;
use auditros_core::user::{AuthUser, UserRepository};

use crate::storage::collection::{load_list, load_value, store_value, update_list};
use crate::storage::keys;

/// Registry of users keyed by email, plus the current-user pointer.
#[derive(Clone)]
pub struct UserRegistryStore {
    store: Arc<dyn KeyValueStore>,
}

impl UserRegistryStore {
    pub fn new(store: Arc<dyn KeyValueStore>) -> Self {
        Self { store }
    }
}

impl UserRepository for UserRegistryStore {
    fn get_registry(&self) -> Vec<AuthUser> {
        load_list(self.store.as_ref(), keys::USER_REGISTRY)
    }

    fn save_user(&self, user: AuthUser) -> Result<AuthUser> {
        let updated = AuthUser {
            last_login: clock::now_millis(),
            ..user
        };

        update_list(
            self.store.as_ref(),
            keys::USER_REGISTRY,
            |registry: &mut Vec<AuthUser>| {
                match registry.iter_mut().find(|u| u.email == updated.email) {
                    Some(existing) => *existing = updated.clone(),
                    None => registry.push(updated.clone()),
                }
            },
        )?;
        store_value(self.store.as_ref(), keys::CURRENT_USER, &updated)?;

        tracing::info!("[UserRegistry] Signed in {}", updated.email);
        Ok(updated)
    }

    fn get_current_user(&self) -> Option<AuthUser> {
        load_value(self.store.as_ref(), keys::CURRENT_USER)
    }

    fn logout(&self) -> Result<()> {
        self.store.remove(keys::CURRENT_USER)
    }
}
