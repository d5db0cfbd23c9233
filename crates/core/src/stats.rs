//! On-demand aggregate counts over the registry collections.

use std::sync::Arc;

use crate::error::RegistryResult;
use crate::model::StatsSnapshot;
use crate::store::DataStore;

#[derive(Clone)]
pub struct StatsService {
    store: Arc<dyn DataStore>,
}

impl StatsService {
    pub fn new(store: Arc<dyn DataStore>) -> Self {
        Self { store }
    }

    /// Counts every collection from one consistent point-in-time view, so
    /// the consent status breakdown always sums within the consent total
    /// even while other callers are mutating.
    pub fn get_stats(&self) -> RegistryResult<StatsSnapshot> {
        let counts = self.store.counts()?;
        Ok(StatsSnapshot {
            total_patients: counts.patients,
            total_records: counts.records,
            total_consents: counts.consents,
            active_consents: counts.active_consents,
            pending_consents: counts.pending_consents,
            total_transactions: counts.transactions,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{NaiveDate, TimeZone, Utc};
    use pcr_types::{NonEmptyText, WalletAddress};

    use crate::model::{Consent, ConsentPurpose, ConsentStatus, Patient};
    use crate::store::{MemoryStore, SeedData};

    fn patient(id: &str) -> Patient {
        Patient {
            id: id.to_owned(),
            name: "Alice Smith".to_owned(),
            email: "alice@example.com".to_owned(),
            date_of_birth: NaiveDate::from_ymd_opt(1990, 1, 15).expect("valid date"),
            gender: "female".to_owned(),
            phone: None,
            address: None,
            wallet_address: None,
        }
    }

    fn consent(id: &str, status: ConsentStatus) -> Consent {
        Consent {
            id: id.to_owned(),
            patient_id: "patient-001".to_owned(),
            purpose: ConsentPurpose::ThirdPartyAnalyticsAccess,
            wallet_address: WalletAddress::new("0xabc").expect("valid address"),
            signature: NonEmptyText::new("sig").expect("valid signature"),
            status,
            created_at: Utc.with_ymd_and_hms(2024, 3, 1, 12, 0, 0).unwrap(),
            blockchain_tx_hash: None,
        }
    }

    #[test]
    fn test_get_stats_counts_each_collection() {
        let service = StatsService::new(Arc::new(MemoryStore::from_seed(SeedData {
            patients: vec![patient("patient-001"), patient("patient-002")],
            consents: vec![
                consent("c1", ConsentStatus::Active),
                consent("c2", ConsentStatus::Pending),
                consent("c3", ConsentStatus::Pending),
            ],
            ..SeedData::default()
        })));

        let stats = service.get_stats().expect("stats should succeed");

        assert_eq!(stats.total_patients, 2);
        assert_eq!(stats.total_records, 0);
        assert_eq!(stats.total_consents, 3);
        assert_eq!(stats.active_consents, 1);
        assert_eq!(stats.pending_consents, 2);
        assert_eq!(stats.total_transactions, 0);
    }

    #[test]
    fn test_get_stats_status_breakdown_sums_within_total() {
        let service = StatsService::new(Arc::new(MemoryStore::from_seed(SeedData {
            consents: vec![
                consent("c1", ConsentStatus::Active),
                consent("c2", ConsentStatus::Pending),
            ],
            ..SeedData::default()
        })));

        let stats = service.get_stats().expect("stats should succeed");
        assert!(stats.active_consents + stats.pending_consents <= stats.total_consents);
    }

    #[test]
    fn test_get_stats_on_empty_store_is_all_zeroes() {
        let service = StatsService::new(Arc::new(MemoryStore::new()));
        let stats = service.get_stats().expect("stats should succeed");
        assert_eq!(stats.total_consents, 0);
        assert_eq!(stats.total_patients, 0);
    }
}
