//! Application state.

use std::sync::Arc;

use aquafarm_core::{User, UserId};
use aquafarm_store::{RocksStore, Store};

use crate::config::ServiceConfig;
use crate::error::ApiError;

/// Application state shared across handlers.
#[derive(Clone)]
pub struct AppState {
    /// The storage backend.
    pub store: Arc<RocksStore>,

    /// Service configuration.
    pub config: ServiceConfig,
}

impl AppState {
    /// Create a new application state.
    #[must_use]
    pub fn new(store: Arc<RocksStore>, config: ServiceConfig) -> Self {
        Self { store, config }
    }

    /// Fetch the user document, lazily creating it on first access.
    ///
    /// User identities come from the identity provider; the backing document
    /// (cart, owned products, role) is provisioned here the first time an
    /// authenticated request touches it.
    ///
    /// # Errors
    ///
    /// Returns an error if the store fails.
    pub fn ensure_user(&self, user_id: &UserId) -> Result<User, ApiError> {
        if let Some(user) = self.store.get_user(user_id)? {
            return Ok(user);
        }

        // If another request provisioned the document between the read and
        // this point, the stored one (possibly with cart lines already on
        // it) wins and is returned instead.
        let user = self.store.put_user_if_absent(&User::new(*user_id))?;
        tracing::info!(user_id = %user_id, "Provisioned user document on first access");
        Ok(user)
    }
}
