//! Purchase gate: re-validate the session before sending a member to checkout.

use std::collections::HashSet;
use std::sync::{Arc, Mutex};

use crate::error::BackendError;

/// Where the purchase link sends the browser.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GateOutcome {
    /// Session missing or rejected by the backend.
    Login,
    Checkout { path: String },
}

pub fn checkout_path(package_id: u64) -> String {
    format!("/payments/checkout/{}", package_id)
}

/// Decide from the token check. Any failure counts as "not logged in".
pub fn decide(package_id: u64, accepted: Result<(), BackendError>) -> GateOutcome {
    match accepted {
        Ok(_) => GateOutcome::Checkout {
            path: checkout_path(package_id),
        },
        Err(_) => GateOutcome::Login,
    }
}

/// Keys with a check currently in flight.
///
/// A key is released when its [`InFlightGuard`] drops, so a cancelled
/// request frees it too.
#[derive(Debug, Clone, Default)]
pub struct InFlightRegistry {
    keys: Arc<Mutex<HashSet<String>>>,
}

impl InFlightRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns `None` when the key is already being checked.
    pub fn try_acquire(&self, key: &str) -> Option<InFlightGuard> {
        let mut keys = self.keys.lock().unwrap_or_else(|e| e.into_inner());
        if !keys.insert(key.to_string()) {
            return None;
        }
        Some(InFlightGuard {
            keys: Arc::clone(&self.keys),
            key: key.to_string(),
        })
    }

    pub fn is_checking(&self, key: &str) -> bool {
        self.keys
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .contains(key)
    }
}

#[derive(Debug)]
pub struct InFlightGuard {
    keys: Arc<Mutex<HashSet<String>>>,
    key: String,
}

impl Drop for InFlightGuard {
    fn drop(&mut self) {
        self.keys
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .remove(&self.key);
    }
}
