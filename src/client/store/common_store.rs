use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Mutex, MutexGuard, PoisonError};

use crate::client::error::ServerErrorDetail;

/// Session-wide state shared by the agent and every store.
#[derive(Debug, Default)]
pub struct CommonStore {
    token: Mutex<Option<String>>,
    server_error: Mutex<Option<ServerErrorDetail>>,
    app_loaded: AtomicBool,
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

impl CommonStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn token(&self) -> Option<String> {
        lock(&self.token).clone()
    }

    pub fn set_token(&self, token: Option<String>) {
        *lock(&self.token) = token;
    }

    pub fn server_error(&self) -> Option<ServerErrorDetail> {
        lock(&self.server_error).clone()
    }

    pub fn set_server_error(&self, detail: ServerErrorDetail) {
        *lock(&self.server_error) = Some(detail);
    }

    pub fn clear_server_error(&self) {
        *lock(&self.server_error) = None;
    }

    pub fn is_app_loaded(&self) -> bool {
        self.app_loaded.load(Ordering::Acquire)
    }

    pub fn set_app_loaded(&self) {
        self.app_loaded.store(true, Ordering::Release);
    }

    /// Forgets the session, as on logout.
    pub fn reset(&self) {
        self.set_token(None);
        self.clear_server_error();
        self.app_loaded.store(false, Ordering::Release);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reset_clears_session() {
        let store = CommonStore::new();
        store.set_token(Some("jwt".into()));
        store.set_app_loaded();
        store.set_server_error(ServerErrorDetail {
            status_code: 500,
            message: "boom".into(),
            details: None,
        });

        assert_eq!(store.token().as_deref(), Some("jwt"));
        store.reset();
        assert!(store.token().is_none());
        assert!(store.server_error().is_none());
        assert!(!store.is_app_loaded());
    }
}
