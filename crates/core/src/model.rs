//! Domain entities for the consent registry.
//!
//! Fields serialise in camelCase because the seed datasets and every client
//! of the registry exchange JSON in that shape. Optional attributes are
//! omitted from output when absent rather than serialised as `null`.

use chrono::{DateTime, NaiveDate, Utc};
use pcr_types::{NonEmptyText, WalletAddress};
use serde::{Deserialize, Serialize};

use crate::error::RegistryError;

/// A registered patient. Owned by the data store; consents and medical
/// records reference it by `id`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Patient {
    pub id: String,
    pub name: String,
    pub email: String,
    pub date_of_birth: NaiveDate,
    pub gender: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub wallet_address: Option<WalletAddress>,
}

/// One clinical event. Read-only from the registry's perspective;
/// `blockchain_hash` is set once a record is anchored externally.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MedicalRecord {
    pub id: String,
    pub patient_id: String,
    #[serde(rename = "type")]
    pub kind: String,
    pub title: String,
    pub date: NaiveDate,
    pub doctor: String,
    pub hospital: String,
    pub status: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub blockchain_hash: Option<String>,
}

/// Lifecycle status of a consent.
///
/// The only defined transition is `Pending` → `Active`; there is no edge out
/// of `Active`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ConsentStatus {
    Pending,
    Active,
}

impl ConsentStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Active => "active",
        }
    }
}

impl std::fmt::Display for ConsentStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for ConsentStatus {
    type Err = RegistryError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(Self::Pending),
            "active" => Ok(Self::Active),
            other => Err(RegistryError::InvalidArgument(format!(
                "unknown consent status: {other}"
            ))),
        }
    }
}

/// The closed set of data-use purposes a patient can authorise.
///
/// The wire strings are part of the signing contract (they appear verbatim
/// inside the canonical consent message), so the `Display`/`serde` forms must
/// never drift.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ConsentPurpose {
    #[serde(rename = "Research Study Participation")]
    ResearchStudyParticipation,
    #[serde(rename = "Data Sharing with Research Institution")]
    DataSharingWithResearchInstitution,
    #[serde(rename = "Third-Party Analytics Access")]
    ThirdPartyAnalyticsAccess,
    #[serde(rename = "Insurance Provider Access")]
    InsuranceProviderAccess,
}

impl ConsentPurpose {
    /// Every permitted purpose, in presentation order.
    pub const ALL: [ConsentPurpose; 4] = [
        Self::ResearchStudyParticipation,
        Self::DataSharingWithResearchInstitution,
        Self::ThirdPartyAnalyticsAccess,
        Self::InsuranceProviderAccess,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::ResearchStudyParticipation => "Research Study Participation",
            Self::DataSharingWithResearchInstitution => "Data Sharing with Research Institution",
            Self::ThirdPartyAnalyticsAccess => "Third-Party Analytics Access",
            Self::InsuranceProviderAccess => "Insurance Provider Access",
        }
    }
}

impl std::fmt::Display for ConsentPurpose {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for ConsentPurpose {
    type Err = RegistryError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|purpose| purpose.as_str() == s)
            .ok_or_else(|| RegistryError::InvalidArgument(format!("unknown consent purpose: {s}")))
    }
}

/// A patient's signed authorisation for one data-use purpose.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Consent {
    pub id: String,
    pub patient_id: String,
    pub purpose: ConsentPurpose,
    /// The address whose key produced `signature`.
    pub wallet_address: WalletAddress,
    /// Opaque signature over the canonical consent message; never
    /// interpreted, guaranteed non-empty.
    pub signature: NonEmptyText,
    pub status: ConsentStatus,
    pub created_at: DateTime<Utc>,
    /// External settlement reference; absent while the consent is pending.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub blockchain_tx_hash: Option<String>,
}

/// A ledger-relevant action. Created outside the registry; read-only here.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Transaction {
    pub id: String,
    #[serde(rename = "type")]
    pub kind: String,
    pub from: String,
    pub to: String,
    pub amount: f64,
    #[serde(default = "default_currency")]
    pub currency: String,
    pub status: String,
    pub timestamp: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub blockchain_tx_hash: Option<String>,
}

fn default_currency() -> String {
    "ETH".to_owned()
}

impl Transaction {
    /// Whether `address` is the sender or the recipient, compared
    /// case-insensitively.
    pub fn involves(&self, address: &str) -> bool {
        self.from.eq_ignore_ascii_case(address) || self.to.eq_ignore_ascii_case(address)
    }
}

/// Point-in-time aggregate counts over the entity collections. Derived on
/// demand, never stored.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StatsSnapshot {
    pub total_patients: u64,
    pub total_records: u64,
    pub total_consents: u64,
    pub active_consents: u64,
    pub pending_consents: u64,
    pub total_transactions: u64,
}

/// Pagination metadata returned alongside a page of results.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PageInfo {
    /// 1-indexed page number of this page.
    pub page: u32,
    pub page_size: u32,
    pub total_items: u64,
    pub total_pages: u32,
}

impl PageInfo {
    /// Metadata for `total_items` entries split into `page_size`-sized pages.
    /// `total_pages` rounds up.
    pub fn new(page: u32, page_size: u32, total_items: u64) -> Self {
        let total_pages = total_items.div_ceil(u64::from(page_size.max(1))) as u32;
        Self {
            page,
            page_size,
            total_items,
            total_pages,
        }
    }
}

/// One page of results plus its [`PageInfo`].
#[derive(Debug, Clone, PartialEq)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub info: PageInfo,
}
