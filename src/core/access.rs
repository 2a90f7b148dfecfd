// src/core/access.rs
//! Access gate in front of every other operation.
//!
//! A stored credential unlocks the gate immediately without asking the
//! service; the first authenticated call is what actually checks it.

use std::sync::{Arc, Mutex};
use tracing::{info, warn};

use crate::core::credential_store::CredentialStore;
use crate::error::{ClientError, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AccessState {
    Locked,
    Unlocked,
}

pub struct AccessController {
    store: Arc<dyn CredentialStore>,
    state: Mutex<AccessState>,
}

impl AccessController {
    pub fn new(store: Arc<dyn CredentialStore>) -> Self {
        let state = if store.get().is_some() {
            info!("Found stored access code, unlocking");
            AccessState::Unlocked
        } else {
            AccessState::Locked
        };

        Self {
            store,
            state: Mutex::new(state),
        }
    }

    pub fn state(&self) -> AccessState {
        self.state
            .lock()
            .map(|s| *s)
            .unwrap_or(AccessState::Locked)
    }

    pub fn is_unlocked(&self) -> bool {
        self.state() == AccessState::Unlocked
    }

    /// Accept any non-blank code; the service decides later if it is valid.
    pub fn unlock(&self, code: &str) -> Result<()> {
        let code = code.trim();
        if code.is_empty() {
            return Err(ClientError::Validation("Please enter a code".to_string()));
        }

        self.store.set(code)?;
        self.set_state(AccessState::Unlocked);
        info!("Access unlocked");
        Ok(())
    }

    /// User-initiated sign out.
    pub fn logout(&self) -> Result<()> {
        self.store.clear()?;
        self.set_state(AccessState::Locked);
        info!("Access locked by user");
        Ok(())
    }

    /// The service rejected the credential.
    pub fn revoke(&self) {
        if let Err(e) = self.store.clear() {
            warn!("Failed to clear rejected access code: {}", e);
        }
        self.set_state(AccessState::Locked);
        warn!("Access code rejected by service, locking");
    }

    /// Pass a result through, re-gating first if it is an auth failure.
    pub fn observe<T>(&self, result: Result<T>) -> Result<T> {
        if let Err(e) = &result {
            if e.is_auth() {
                self.revoke();
            }
        }
        result
    }

    fn set_state(&self, next: AccessState) {
        if let Ok(mut state) = self.state.lock() {
            *state = next;
        }
    }
}
