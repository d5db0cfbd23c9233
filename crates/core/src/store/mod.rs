//! Data store abstraction.
//!
//! The services depend on this trait, never on a concrete collection, so the
//! backing storage can be swapped (in-memory, relational, document) without
//! touching service logic. List operations return results already in their
//! contract order; the count aggregate observes a single consistent snapshot.

pub mod memory;

pub use memory::{MemoryStore, SeedData};

use crate::error::StoreError;
use crate::model::{Consent, ConsentStatus, MedicalRecord, Page, Patient, Transaction};

pub type StoreResult<T> = std::result::Result<T, StoreError>;

/// Filter for consent listings. Absent fields match everything.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ConsentFilter {
    pub patient_id: Option<String>,
    pub status: Option<ConsentStatus>,
}

/// A page request over the patient collection.
#[derive(Debug, Clone, PartialEq)]
pub struct PatientQuery {
    /// 1-indexed page number.
    pub page: u32,
    pub page_size: u32,
    /// Case-insensitive substring matched against patient name or email.
    pub search: Option<String>,
}

/// Outcome of a compare-and-set consent status transition.
#[derive(Debug, Clone, PartialEq)]
pub enum TransitionOutcome {
    /// The consent matched the expected status and was updated.
    Updated(Consent),
    /// No consent with the given id exists.
    Missing,
    /// The consent exists but its status, observed at commit time, did not
    /// match the expected one.
    Conflict(ConsentStatus),
}

/// Entity counts taken from one consistent snapshot of the store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct EntityCounts {
    pub patients: u64,
    pub records: u64,
    pub consents: u64,
    pub active_consents: u64,
    pub pending_consents: u64,
    pub transactions: u64,
}

/// Storage for registry entities, queried by the core services.
///
/// All consent mutation flows through [`DataStore::insert_consent`] and
/// [`DataStore::transition_consent`]; patients, medical records, and
/// transactions are read-only through this interface.
pub trait DataStore: Send + Sync {
    /// Exact patient lookup.
    fn patient(&self, id: &str) -> StoreResult<Option<Patient>>;

    /// One page of patients, ordered by id ascending so adjacent pages never
    /// duplicate or skip entries. Pages past the end are empty.
    fn patients(&self, query: &PatientQuery) -> StoreResult<Page<Patient>>;

    /// All records for a patient, ordered by date descending. A patient with
    /// no records yields an empty list; existence checks are the caller's.
    fn records_for_patient(&self, patient_id: &str) -> StoreResult<Vec<MedicalRecord>>;

    /// Persist a new consent.
    fn insert_consent(&self, consent: &Consent) -> StoreResult<()>;

    /// Consents matching the filter, ordered by creation time descending,
    /// then id ascending on equal timestamps.
    fn consents(&self, filter: &ConsentFilter) -> StoreResult<Vec<Consent>>;

    /// Atomically move the consent `id` from `expected` to `next`, setting
    /// the transaction hash. The expected status is checked at commit time
    /// under the store's own synchronisation, so of any number of racing
    /// transitions exactly one can succeed.
    fn transition_consent(
        &self,
        id: &str,
        expected: ConsentStatus,
        next: ConsentStatus,
        blockchain_tx_hash: Option<String>,
    ) -> StoreResult<TransitionOutcome>;

    /// The most recent `limit` transactions, newest first, optionally
    /// restricted to those where `address` is sender or recipient
    /// (case-insensitive).
    fn transactions(&self, address: Option<&str>, limit: usize) -> StoreResult<Vec<Transaction>>;

    /// Entity counts from a single point-in-time view.
    fn counts(&self) -> StoreResult<EntityCounts>;
}
