//! In-memory data store.
//!
//! All collections live behind one `RwLock`, so every operation, including
//! the count aggregate, observes a single consistent snapshot, and the
//! consent status transition is an atomic compare-and-set.

use std::path::Path;
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use serde::Deserialize;

use crate::error::StoreError;
use crate::model::{
    Consent, ConsentStatus, MedicalRecord, Page, PageInfo, Patient, Transaction,
};

use super::{
    ConsentFilter, DataStore, EntityCounts, PatientQuery, StoreResult, TransitionOutcome,
};

/// Initial dataset for a [`MemoryStore`], loadable from JSON.
///
/// Unknown top-level keys are rejected so a misspelled collection name fails
/// loudly instead of silently dropping its entries.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct SeedData {
    #[serde(default)]
    pub patients: Vec<Patient>,
    #[serde(default)]
    pub records: Vec<MedicalRecord>,
    #[serde(default)]
    pub consents: Vec<Consent>,
    #[serde(default)]
    pub transactions: Vec<Transaction>,
}

#[derive(Debug, Default)]
struct Collections {
    patients: Vec<Patient>,
    records: Vec<MedicalRecord>,
    consents: Vec<Consent>,
    transactions: Vec<Transaction>,
}

/// In-process [`DataStore`] backed by plain vectors.
#[derive(Debug)]
pub struct MemoryStore {
    inner: RwLock<Collections>,
}

impl MemoryStore {
    /// Creates an empty store.
    pub fn new() -> Self {
        Self {
            inner: RwLock::new(Collections::default()),
        }
    }

    /// Creates a store pre-populated with `seed`.
    pub fn from_seed(seed: SeedData) -> Self {
        Self {
            inner: RwLock::new(Collections {
                patients: seed.patients,
                records: seed.records,
                consents: seed.consents,
                transactions: seed.transactions,
            }),
        }
    }

    /// Loads a JSON seed file. A malformed file is an error, never a partial
    /// load.
    pub fn from_seed_file(path: &Path) -> StoreResult<Self> {
        let raw = std::fs::read_to_string(path).map_err(StoreError::SeedRead)?;
        let seed: SeedData = serde_json::from_str(&raw).map_err(StoreError::SeedParse)?;
        Ok(Self::from_seed(seed))
    }

    fn read(&self) -> StoreResult<RwLockReadGuard<'_, Collections>> {
        self.inner.read().map_err(|_| StoreError::Poisoned)
    }

    fn write(&self) -> StoreResult<RwLockWriteGuard<'_, Collections>> {
        self.inner.write().map_err(|_| StoreError::Poisoned)
    }
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

impl DataStore for MemoryStore {
    fn patient(&self, id: &str) -> StoreResult<Option<Patient>> {
        Ok(self.read()?.patients.iter().find(|p| p.id == id).cloned())
    }

    fn patients(&self, query: &PatientQuery) -> StoreResult<Page<Patient>> {
        let guard = self.read()?;
        let needle = query.search.as_deref().map(str::to_lowercase);

        let mut matched: Vec<&Patient> = guard
            .patients
            .iter()
            .filter(|p| match &needle {
                Some(term) => {
                    p.name.to_lowercase().contains(term) || p.email.to_lowercase().contains(term)
                }
                None => true,
            })
            .collect();
        matched.sort_by(|a, b| a.id.cmp(&b.id));

        let total_items = matched.len() as u64;
        let offset = (query.page.saturating_sub(1) as usize).saturating_mul(query.page_size as usize);
        let items = matched
            .into_iter()
            .skip(offset)
            .take(query.page_size as usize)
            .cloned()
            .collect();

        Ok(Page {
            items,
            info: PageInfo::new(query.page, query.page_size, total_items),
        })
    }

    fn records_for_patient(&self, patient_id: &str) -> StoreResult<Vec<MedicalRecord>> {
        let guard = self.read()?;
        let mut records: Vec<MedicalRecord> = guard
            .records
            .iter()
            .filter(|r| r.patient_id == patient_id)
            .cloned()
            .collect();
        records.sort_by(|a, b| b.date.cmp(&a.date));
        Ok(records)
    }

    fn insert_consent(&self, consent: &Consent) -> StoreResult<()> {
        self.write()?.consents.push(consent.clone());
        Ok(())
    }

    fn consents(&self, filter: &ConsentFilter) -> StoreResult<Vec<Consent>> {
        let guard = self.read()?;
        let mut consents: Vec<Consent> = guard
            .consents
            .iter()
            .filter(|c| {
                filter
                    .patient_id
                    .as_deref()
                    .is_none_or(|id| c.patient_id == id)
            })
            .filter(|c| filter.status.is_none_or(|s| c.status == s))
            .cloned()
            .collect();
        consents.sort_by(|a, b| {
            b.created_at
                .cmp(&a.created_at)
                .then_with(|| a.id.cmp(&b.id))
        });
        Ok(consents)
    }

    fn transition_consent(
        &self,
        id: &str,
        expected: ConsentStatus,
        next: ConsentStatus,
        blockchain_tx_hash: Option<String>,
    ) -> StoreResult<TransitionOutcome> {
        let mut guard = self.write()?;
        let Some(consent) = guard.consents.iter_mut().find(|c| c.id == id) else {
            return Ok(TransitionOutcome::Missing);
        };
        if consent.status != expected {
            return Ok(TransitionOutcome::Conflict(consent.status));
        }
        consent.status = next;
        consent.blockchain_tx_hash = blockchain_tx_hash;
        Ok(TransitionOutcome::Updated(consent.clone()))
    }

    fn transactions(&self, address: Option<&str>, limit: usize) -> StoreResult<Vec<Transaction>> {
        let guard = self.read()?;
        let mut transactions: Vec<Transaction> = guard
            .transactions
            .iter()
            .filter(|t| address.is_none_or(|a| t.involves(a)))
            .cloned()
            .collect();
        transactions.sort_by(|a, b| b.timestamp.cmp(&a.timestamp));
        transactions.truncate(limit);
        Ok(transactions)
    }

    fn counts(&self) -> StoreResult<EntityCounts> {
        let guard = self.read()?;
        let active = guard
            .consents
            .iter()
            .filter(|c| c.status == ConsentStatus::Active)
            .count() as u64;
        let pending = guard
            .consents
            .iter()
            .filter(|c| c.status == ConsentStatus::Pending)
            .count() as u64;
        Ok(EntityCounts {
            patients: guard.patients.len() as u64,
            records: guard.records.len() as u64,
            consents: guard.consents.len() as u64,
            active_consents: active,
            pending_consents: pending,
            transactions: guard.transactions.len() as u64,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{NaiveDate, TimeZone, Utc};
    use pcr_types::{NonEmptyText, WalletAddress};
    use std::io::Write as _;

    use crate::model::ConsentPurpose;

    fn patient(id: &str, name: &str, email: &str) -> Patient {
        Patient {
            id: id.to_owned(),
            name: name.to_owned(),
            email: email.to_owned(),
            date_of_birth: NaiveDate::from_ymd_opt(1990, 1, 15).expect("valid date"),
            gender: "female".to_owned(),
            phone: None,
            address: None,
            wallet_address: None,
        }
    }

    fn pending_consent(id: &str, patient_id: &str) -> Consent {
        Consent {
            id: id.to_owned(),
            patient_id: patient_id.to_owned(),
            purpose: ConsentPurpose::ResearchStudyParticipation,
            wallet_address: WalletAddress::new("0xabc").expect("valid address"),
            signature: NonEmptyText::new("sig").expect("valid signature"),
            status: ConsentStatus::Pending,
            created_at: Utc.with_ymd_and_hms(2024, 3, 1, 12, 0, 0).unwrap(),
            blockchain_tx_hash: None,
        }
    }

    #[test]
    fn test_transition_consent_updates_pending_consent() {
        let store = MemoryStore::from_seed(SeedData {
            consents: vec![pending_consent("c1", "patient-001")],
            ..SeedData::default()
        });

        let outcome = store
            .transition_consent(
                "c1",
                ConsentStatus::Pending,
                ConsentStatus::Active,
                Some("0xfeed".to_owned()),
            )
            .expect("transition should succeed");

        match outcome {
            TransitionOutcome::Updated(consent) => {
                assert_eq!(consent.status, ConsentStatus::Active);
                assert_eq!(consent.blockchain_tx_hash.as_deref(), Some("0xfeed"));
            }
            other => panic!("expected Updated, got {other:?}"),
        }
    }

    #[test]
    fn test_transition_consent_reports_missing_id() {
        let store = MemoryStore::new();
        let outcome = store
            .transition_consent("nope", ConsentStatus::Pending, ConsentStatus::Active, None)
            .expect("transition should succeed");
        assert_eq!(outcome, TransitionOutcome::Missing);
    }

    #[test]
    fn test_transition_consent_conflicts_on_second_activation() {
        let store = MemoryStore::from_seed(SeedData {
            consents: vec![pending_consent("c1", "patient-001")],
            ..SeedData::default()
        });

        store
            .transition_consent("c1", ConsentStatus::Pending, ConsentStatus::Active, None)
            .expect("first transition should succeed");
        let outcome = store
            .transition_consent("c1", ConsentStatus::Pending, ConsentStatus::Active, None)
            .expect("second transition should not error");

        assert_eq!(outcome, TransitionOutcome::Conflict(ConsentStatus::Active));
    }

    #[test]
    fn test_patients_page_past_the_end_is_empty() {
        let seed = SeedData {
            patients: (1..=5)
                .map(|n| patient(&format!("patient-{n:03}"), "Name", "n@example.com"))
                .collect(),
            ..SeedData::default()
        };
        let store = MemoryStore::from_seed(seed);

        let page = store
            .patients(&PatientQuery {
                page: 4,
                page_size: 2,
                search: None,
            })
            .expect("paging should succeed");

        assert!(page.items.is_empty());
        assert_eq!(page.info.total_items, 5);
        assert_eq!(page.info.total_pages, 3);
    }

    #[test]
    fn test_patients_search_matches_name_or_email() {
        let store = MemoryStore::from_seed(SeedData {
            patients: vec![
                patient("patient-001", "Alice Smith", "alice@example.com"),
                patient("patient-002", "Bob Jones", "bob@clinic.org"),
                patient("patient-003", "Carol Smith", "carol@example.com"),
            ],
            ..SeedData::default()
        });

        let by_name = store
            .patients(&PatientQuery {
                page: 1,
                page_size: 10,
                search: Some("SMITH".to_owned()),
            })
            .expect("search should succeed");
        assert_eq!(by_name.items.len(), 2);

        let by_email = store
            .patients(&PatientQuery {
                page: 1,
                page_size: 10,
                search: Some("clinic".to_owned()),
            })
            .expect("search should succeed");
        assert_eq!(by_email.items.len(), 1);
        assert_eq!(by_email.items[0].id, "patient-002");
    }

    #[test]
    fn test_transactions_filters_by_address_and_truncates() {
        let base = Utc.with_ymd_and_hms(2024, 3, 1, 0, 0, 0).unwrap();
        let tx = |id: &str, from: &str, to: &str, minutes: i64| Transaction {
            id: id.to_owned(),
            kind: "consent_fee".to_owned(),
            from: from.to_owned(),
            to: to.to_owned(),
            amount: 0.1,
            currency: "ETH".to_owned(),
            status: "confirmed".to_owned(),
            timestamp: base + chrono::Duration::minutes(minutes),
            blockchain_tx_hash: None,
        };
        let store = MemoryStore::from_seed(SeedData {
            transactions: vec![
                tx("tx-1", "0xABC", "0x111", 1),
                tx("tx-2", "0x222", "0xabc", 2),
                tx("tx-3", "0x333", "0x444", 3),
                tx("tx-4", "0xabc", "0x555", 4),
            ],
            ..SeedData::default()
        });

        let listed = store
            .transactions(Some("0xAbC"), 2)
            .expect("listing should succeed");

        assert_eq!(listed.len(), 2);
        assert_eq!(listed[0].id, "tx-4");
        assert_eq!(listed[1].id, "tx-2");
    }

    #[test]
    fn test_from_seed_file_loads_dataset() {
        let mut file = tempfile::NamedTempFile::new().expect("should create temp file");
        write!(
            file,
            r#"{{
                "patients": [{{
                    "id": "patient-001",
                    "name": "Alice Smith",
                    "email": "alice@example.com",
                    "dateOfBirth": "1990-01-15",
                    "gender": "female",
                    "walletAddress": "0xAbC123"
                }}],
                "transactions": [{{
                    "id": "tx-1",
                    "type": "consent_fee",
                    "from": "0xabc",
                    "to": "0xdef",
                    "amount": 0.5,
                    "status": "confirmed",
                    "timestamp": "2024-03-01T12:00:00Z"
                }}]
            }}"#
        )
        .expect("should write seed file");

        let store = MemoryStore::from_seed_file(file.path()).expect("seed file should load");
        let counts = store.counts().expect("counts should succeed");

        assert_eq!(counts.patients, 1);
        assert_eq!(counts.transactions, 1);

        // walletAddress normalises on load
        let alice = store
            .patient("patient-001")
            .expect("lookup should succeed")
            .expect("patient should exist");
        assert_eq!(
            alice.wallet_address.map(|w| w.to_string()).as_deref(),
            Some("0xabc123")
        );
    }

    #[test]
    fn test_from_seed_file_rejects_malformed_json() {
        let mut file = tempfile::NamedTempFile::new().expect("should create temp file");
        write!(file, "{{ not json").expect("should write file");

        let err = MemoryStore::from_seed_file(file.path())
            .expect_err("malformed seed file should fail");
        assert!(matches!(err, StoreError::SeedParse(_)));
    }

    #[test]
    fn test_from_seed_file_rejects_unknown_collection() {
        let mut file = tempfile::NamedTempFile::new().expect("should create temp file");
        write!(file, r#"{{ "patiens": [] }}"#).expect("should write file");

        let err = MemoryStore::from_seed_file(file.path())
            .expect_err("misspelled collection should fail");
        assert!(matches!(err, StoreError::SeedParse(_)));
    }
}
