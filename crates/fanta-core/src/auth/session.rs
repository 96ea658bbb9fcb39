use std::sync::Arc;

use anyhow::Result;
use tracing::debug;

use super::store::{TokenStore, ACCESS_TOKEN_KEY, REFRESH_TOKEN_KEY};

/// Access/refresh token pair over a shared [`TokenStore`].
///
/// Clone is cheap; every clone reads and writes the same store.
#[derive(Clone)]
pub struct Session {
    store: Arc<dyn TokenStore>,
}

impl Session {
    pub fn new(store: Arc<dyn TokenStore>) -> Self {
        Self { store }
    }

    /// Persist both tokens after a successful login
    pub fn save_tokens(&self, access: &str, refresh: &str) -> Result<()> {
        self.store.set(ACCESS_TOKEN_KEY, access)?;
        self.store.set(REFRESH_TOKEN_KEY, refresh)?;
        debug!("Session tokens saved");
        Ok(())
    }

    /// Overwrite the access token, leaving the refresh token untouched
    pub fn set_access_token(&self, access: &str) -> Result<()> {
        self.store.set(ACCESS_TOKEN_KEY, access)
    }

    /// Stored access token; an empty string counts as absent
    pub fn access_token(&self) -> Result<Option<String>> {
        Ok(self.store.get(ACCESS_TOKEN_KEY)?.filter(|t| !t.is_empty()))
    }

    /// Stored refresh token; an empty string counts as absent
    pub fn refresh_token(&self) -> Result<Option<String>> {
        Ok(self.store.get(REFRESH_TOKEN_KEY)?.filter(|t| !t.is_empty()))
    }

    /// True when an access token is stored. Gates the protected views.
    pub fn is_authenticated(&self) -> Result<bool> {
        Ok(self.access_token()?.is_some())
    }

    /// Erase both tokens. Both removals are attempted; the first error wins.
    pub fn clear(&self) -> Result<()> {
        let access = self.store.remove(ACCESS_TOKEN_KEY);
        let refresh = self.store.remove(REFRESH_TOKEN_KEY);
        access.and(refresh)?;
        debug!("Session tokens cleared");
        Ok(())
    }
}
