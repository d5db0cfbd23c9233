//! Wire types for the REST API.
//!
//! Shapes mirror the JSON the registry's clients exchange: camelCase fields,
//! list envelopes (`{ "consents": [...] }`, `{ "patients": [...], "pagination":
//! {...} }`), and a flat stats object. Dates travel as strings: `YYYY-MM-DD`
//! for calendar dates, RFC 3339 for timestamps.

use pcr_core::{
    Consent, MedicalRecord, PageInfo, Patient, StatsSnapshot, Transaction,
};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(Debug, Serialize, ToSchema)]
pub struct HealthRes {
    pub ok: bool,
    pub message: String,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PatientDto {
    pub id: String,
    pub name: String,
    pub email: String,
    pub date_of_birth: String,
    pub gender: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub wallet_address: Option<String>,
}

impl From<Patient> for PatientDto {
    fn from(patient: Patient) -> Self {
        Self {
            id: patient.id,
            name: patient.name,
            email: patient.email,
            date_of_birth: patient.date_of_birth.to_string(),
            gender: patient.gender,
            phone: patient.phone,
            address: patient.address,
            wallet_address: patient.wallet_address.map(|w| w.to_string()),
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct MedicalRecordDto {
    pub id: String,
    pub patient_id: String,
    #[serde(rename = "type")]
    pub kind: String,
    pub title: String,
    pub date: String,
    pub doctor: String,
    pub hospital: String,
    pub status: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub blockchain_hash: Option<String>,
}

impl From<MedicalRecord> for MedicalRecordDto {
    fn from(record: MedicalRecord) -> Self {
        Self {
            id: record.id,
            patient_id: record.patient_id,
            kind: record.kind,
            title: record.title,
            date: record.date.to_string(),
            doctor: record.doctor,
            hospital: record.hospital,
            status: record.status,
            blockchain_hash: record.blockchain_hash,
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ConsentDto {
    pub id: String,
    pub patient_id: String,
    pub purpose: String,
    pub wallet_address: String,
    pub signature: String,
    pub status: String,
    pub created_at: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub blockchain_tx_hash: Option<String>,
}

impl From<Consent> for ConsentDto {
    fn from(consent: Consent) -> Self {
        Self {
            id: consent.id,
            patient_id: consent.patient_id,
            purpose: consent.purpose.to_string(),
            wallet_address: consent.wallet_address.to_string(),
            signature: consent.signature.to_string(),
            status: consent.status.to_string(),
            created_at: consent.created_at.to_rfc3339(),
            blockchain_tx_hash: consent.blockchain_tx_hash,
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct TransactionDto {
    pub id: String,
    #[serde(rename = "type")]
    pub kind: String,
    pub from: String,
    pub to: String,
    pub amount: f64,
    pub currency: String,
    pub status: String,
    pub timestamp: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub blockchain_tx_hash: Option<String>,
}

impl From<Transaction> for TransactionDto {
    fn from(tx: Transaction) -> Self {
        Self {
            id: tx.id,
            kind: tx.kind,
            from: tx.from,
            to: tx.to,
            amount: tx.amount,
            currency: tx.currency,
            status: tx.status,
            timestamp: tx.timestamp.to_rfc3339(),
            blockchain_tx_hash: tx.blockchain_tx_hash,
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct StatsRes {
    pub total_patients: u64,
    pub total_records: u64,
    pub total_consents: u64,
    pub active_consents: u64,
    pub pending_consents: u64,
    pub total_transactions: u64,
}

impl From<StatsSnapshot> for StatsRes {
    fn from(stats: StatsSnapshot) -> Self {
        Self {
            total_patients: stats.total_patients,
            total_records: stats.total_records,
            total_consents: stats.total_consents,
            active_consents: stats.active_consents,
            pending_consents: stats.pending_consents,
            total_transactions: stats.total_transactions,
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PageInfoDto {
    pub page: u32,
    pub page_size: u32,
    pub total_items: u64,
    pub total_pages: u32,
}

impl From<PageInfo> for PageInfoDto {
    fn from(info: PageInfo) -> Self {
        Self {
            page: info.page,
            page_size: info.page_size,
            total_items: info.total_items,
            total_pages: info.total_pages,
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub struct ListPatientsRes {
    pub patients: Vec<PatientDto>,
    pub pagination: PageInfoDto,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct PatientRecordsRes {
    pub records: Vec<MedicalRecordDto>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct ListConsentsRes {
    pub consents: Vec<ConsentDto>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct ListTransactionsRes {
    pub transactions: Vec<TransactionDto>,
}

#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateConsentReq {
    pub patient_id: String,
    pub purpose: String,
    pub wallet_address: String,
}

#[derive(Debug, Default, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ActivateConsentReq {
    /// External settlement reference; stored as supplied, absent stays absent.
    #[serde(default)]
    pub blockchain_tx_hash: Option<String>,
}
