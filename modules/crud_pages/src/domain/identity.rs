//! Current-user provider abstraction
//!
//! Attribution on insert comes from an injected provider so the adapter can be
//! exercised without a real session store.

use parking_lot::RwLock;

/// Synchronous lookup of the acting user
pub trait CurrentUserProvider: Send + Sync {
    /// `None` when no session exists
    fn current_user(&self) -> Option<String>;
}

/// Provider returning a fixed identity
#[derive(Debug, Clone, Default)]
pub struct StaticUserProvider {
    user: Option<String>,
}

impl StaticUserProvider {
    pub fn new(user: impl Into<String>) -> Self {
        Self {
            user: Some(user.into()),
        }
    }

    /// Provider with no session
    pub fn anonymous() -> Self {
        Self::default()
    }
}

impl CurrentUserProvider for StaticUserProvider {
    fn current_user(&self) -> Option<String> {
        self.user.clone()
    }
}

/// Process-wide session that can be signed in and out
#[derive(Debug, Default)]
pub struct SessionUserProvider {
    user: RwLock<Option<String>>,
}

impl SessionUserProvider {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn sign_in(&self, user: impl Into<String>) {
        *self.user.write() = Some(user.into());
    }

    pub fn sign_out(&self) {
        *self.user.write() = None;
    }
}

impl CurrentUserProvider for SessionUserProvider {
    fn current_user(&self) -> Option<String> {
        self.user.read().clone()
    }
}
