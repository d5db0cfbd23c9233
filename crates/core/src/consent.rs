//! Consent lifecycle: creation, activation, and listing.
//!
//! A consent comes into existence by signing a canonical message and
//! persisting the result as `pending`. Activation is the single status
//! mutator: it moves a consent to `active` exactly once, attaching an
//! optional external settlement reference.

use std::sync::Arc;

use chrono::Utc;
use pcr_types::{NonEmptyText, WalletAddress};
use uuid::Uuid;

use crate::error::{RegistryError, RegistryResult};
use crate::model::{Consent, ConsentPurpose, ConsentStatus};
use crate::oracle::IdentityOracle;
use crate::store::{ConsentFilter, DataStore, TransitionOutcome};

/// Builds the exact message a wallet must sign to authorise a consent.
///
/// Later verification has to reproduce this text verbatim, so it is
/// constructed in exactly one place.
pub fn canonical_message(purpose: ConsentPurpose, patient_id: &str) -> String {
    format!("I consent to: {purpose} for patient: {patient_id}")
}

/// Owns the consent entity lifecycle.
#[derive(Clone)]
pub struct ConsentService {
    store: Arc<dyn DataStore>,
    oracle: Arc<dyn IdentityOracle>,
}

impl ConsentService {
    pub fn new(store: Arc<dyn DataStore>, oracle: Arc<dyn IdentityOracle>) -> Self {
        Self { store, oracle }
    }

    /// Lists consents, optionally restricted to one patient and/or one
    /// status, newest first (stable by id on equal timestamps).
    ///
    /// `status: None` means "no filter"; there is no sentinel value at this
    /// layer.
    pub fn list_consents(
        &self,
        patient_id: Option<&str>,
        status: Option<ConsentStatus>,
    ) -> RegistryResult<Vec<Consent>> {
        let filter = ConsentFilter {
            patient_id: patient_id.map(str::to_owned),
            status,
        };
        Ok(self.store.consents(&filter)?)
    }

    /// Creates a new pending consent for `patient_id`.
    ///
    /// The purpose is validated against the permitted set, the canonical
    /// message is signed by the identity oracle for `wallet_address`, and the
    /// signed consent is persisted with status `pending` and no settlement
    /// reference. Persisting is the sole commit point: an abandoned or
    /// failed signing request leaves no trace in the store.
    ///
    /// # Errors
    ///
    /// - [`RegistryError::NotFound`] if no such patient exists.
    /// - [`RegistryError::InvalidArgument`] if the purpose is not one of the
    ///   permitted purposes or the wallet address is malformed. Checked
    ///   before any signing request is made.
    /// - [`RegistryError::AuthorizationFailed`] if the oracle declines, is
    ///   unavailable, times out, or returns an empty signature.
    /// - [`RegistryError::StoreUnavailable`] if the store fails.
    pub fn create_consent(
        &self,
        patient_id: &str,
        purpose: &str,
        wallet_address: &str,
    ) -> RegistryResult<Consent> {
        if self.store.patient(patient_id)?.is_none() {
            return Err(RegistryError::not_found("patient", patient_id));
        }
        let purpose: ConsentPurpose = purpose.parse()?;
        let wallet_address = WalletAddress::new(wallet_address)?;

        let message = canonical_message(purpose, patient_id);
        let signature = self
            .oracle
            .sign(&message, &wallet_address)
            .map_err(|e| RegistryError::AuthorizationFailed(e.to_string()))?;
        let signature = NonEmptyText::new(signature).map_err(|_| {
            RegistryError::AuthorizationFailed("signer returned an empty signature".into())
        })?;

        let consent = Consent {
            id: Uuid::new_v4().simple().to_string(),
            patient_id: patient_id.to_owned(),
            purpose,
            wallet_address,
            signature,
            status: ConsentStatus::Pending,
            created_at: Utc::now(),
            blockchain_tx_hash: None,
        };
        self.store.insert_consent(&consent)?;
        tracing::info!(consent_id = %consent.id, patient_id, %purpose, "consent created");
        Ok(consent)
    }

    /// Moves a pending consent to active, recording the caller-supplied
    /// settlement reference (stored unvalidated).
    ///
    /// This is the sole mutator of consent status. The pending check happens
    /// at commit time inside the store, so concurrent activations of the same
    /// consent resolve to exactly one success.
    ///
    /// # Errors
    ///
    /// - [`RegistryError::NotFound`] if no such consent exists.
    /// - [`RegistryError::InvalidState`] if the consent is not pending;
    ///   repeated activation is rejected, not silently accepted.
    /// - [`RegistryError::StoreUnavailable`] if the store fails.
    pub fn activate_consent(
        &self,
        consent_id: &str,
        blockchain_tx_hash: Option<String>,
    ) -> RegistryResult<Consent> {
        match self.store.transition_consent(
            consent_id,
            ConsentStatus::Pending,
            ConsentStatus::Active,
            blockchain_tx_hash,
        )? {
            TransitionOutcome::Updated(consent) => {
                tracing::info!(consent_id, "consent activated");
                Ok(consent)
            }
            TransitionOutcome::Missing => Err(RegistryError::not_found("consent", consent_id)),
            TransitionOutcome::Conflict(observed) => Err(RegistryError::InvalidState(format!(
                "consent {consent_id} is {observed}; only pending consents can be activated"
            ))),
        }
    }
}
