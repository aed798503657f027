//! Per-target exclusivity for mutating operations and poll loops.

use std::collections::HashSet;
use std::sync::{Arc, Mutex, PoisonError};

use crate::error::{ClientError, ClientResult};

/// Names of targets with an operation in flight.
#[derive(Debug, Clone, Default)]
pub(crate) struct InFlight {
    names: Arc<Mutex<HashSet<String>>>,
}

impl InFlight {
    pub(crate) fn contains(&self, name: &str) -> bool {
        self.names
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .contains(name)
    }

    /// Marks `name` busy, failing with [`ClientError::Busy`] if it already is.
    pub(crate) fn acquire(&self, name: &str) -> ClientResult<BusyGuard> {
        let mut names = self.names.lock().unwrap_or_else(PoisonError::into_inner);
        if !names.insert(name.to_string()) {
            return Err(ClientError::Busy(name.to_string()));
        }
        Ok(BusyGuard {
            name: name.to_string(),
            in_flight: self.clone(),
        })
    }

    #[cfg(test)]
    pub(crate) fn is_empty(&self) -> bool {
        self.names
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .is_empty()
    }
}

/// Keeps a target busy for as long as it lives.
#[derive(Debug)]
pub(crate) struct BusyGuard {
    name: String,
    in_flight: InFlight,
}

impl Drop for BusyGuard {
    fn drop(&mut self) {
        self.in_flight
            .names
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(&self.name);
    }
}
