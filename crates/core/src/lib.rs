//! # PCR Core
//!
//! Core business logic for the patient consent registry:
//!
//! - Consent lifecycle: signed creation and the single pending→active
//!   transition ([`consent::ConsentService`])
//! - Patient directory queries with search and pagination
//!   ([`directory::DirectoryService`])
//! - Ledger views over externally created transactions
//!   ([`ledger::LedgerService`])
//! - Aggregate statistics from one consistent snapshot
//!   ([`stats::StatsService`])
//!
//! Services operate over an injected [`store::DataStore`] and treat the
//! signing wallet as an opaque [`oracle::IdentityOracle`].
//!
//! **No API concerns**: HTTP servers, DTOs, and status-code mapping belong
//! in `api-rest`.

pub mod config;
pub mod consent;
pub mod directory;
pub mod error;
pub mod ledger;
pub mod model;
pub mod oracle;
pub mod stats;
pub mod store;

pub use config::CoreConfig;
pub use consent::{canonical_message, ConsentService};
pub use directory::DirectoryService;
pub use error::{RegistryError, RegistryResult, StoreError};
pub use ledger::LedgerService;
pub use model::{
    Consent, ConsentPurpose, ConsentStatus, MedicalRecord, Page, PageInfo, Patient,
    StatsSnapshot, Transaction,
};
pub use oracle::{IdentityOracle, LocalKeySigner, OracleError};
pub use stats::StatsService;
pub use store::{DataStore, MemoryStore, SeedData};

pub use pcr_types::{NonEmptyText, TextError, WalletAddress};
