//! Ledger view: read-only transaction listings.
//!
//! Transactions are created by processes outside the registry (e.g. as a
//! side effect of consent activation elsewhere); this service only queries
//! them.

use std::sync::Arc;

use crate::error::{RegistryError, RegistryResult};
use crate::model::Transaction;
use crate::store::DataStore;

#[derive(Clone)]
pub struct LedgerService {
    store: Arc<dyn DataStore>,
}

impl LedgerService {
    pub fn new(store: Arc<dyn DataStore>) -> Self {
        Self { store }
    }

    /// The most recent `limit` transactions, newest first. With an address,
    /// only transactions where it is the sender or the recipient are
    /// included (compared case-insensitively); without one, the listing is
    /// system-wide.
    ///
    /// # Errors
    ///
    /// [`RegistryError::InvalidArgument`] if `limit` is zero.
    pub fn list_transactions(
        &self,
        address: Option<&str>,
        limit: usize,
    ) -> RegistryResult<Vec<Transaction>> {
        if limit == 0 {
            return Err(RegistryError::InvalidArgument(
                "limit must be positive".into(),
            ));
        }
        Ok(self.store.transactions(address, limit)?)
    }
}
