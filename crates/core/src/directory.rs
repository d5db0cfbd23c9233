//! Patient directory: lookup, paginated listing, and record retrieval.

use std::sync::Arc;

use crate::error::{RegistryError, RegistryResult};
use crate::model::{MedicalRecord, Page, Patient};
use crate::store::{DataStore, PatientQuery};

/// Read side of the patient directory.
#[derive(Clone)]
pub struct DirectoryService {
    store: Arc<dyn DataStore>,
}

impl DirectoryService {
    pub fn new(store: Arc<dyn DataStore>) -> Self {
        Self { store }
    }

    /// Exact patient lookup.
    ///
    /// # Errors
    ///
    /// [`RegistryError::NotFound`] if no patient has this id.
    pub fn get_patient(&self, patient_id: &str) -> RegistryResult<Patient> {
        self.store
            .patient(patient_id)?
            .ok_or_else(|| RegistryError::not_found("patient", patient_id))
    }

    /// One page of patients ordered by id, optionally narrowed by a
    /// case-insensitive search over name and email.
    ///
    /// `page` is 1-indexed. A page past the end is empty, not an error, and
    /// repeated calls over a static data set return consistent pages with no
    /// duplicated or skipped entries.
    ///
    /// # Errors
    ///
    /// [`RegistryError::InvalidArgument`] if `page` or `page_size` is zero.
    pub fn list_patients(
        &self,
        page: u32,
        page_size: u32,
        search: Option<&str>,
    ) -> RegistryResult<Page<Patient>> {
        if page == 0 {
            return Err(RegistryError::InvalidArgument(
                "page numbers start at 1".into(),
            ));
        }
        if page_size == 0 {
            return Err(RegistryError::InvalidArgument(
                "page size must be positive".into(),
            ));
        }

        let search = search
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_owned);
        Ok(self.store.patients(&PatientQuery {
            page,
            page_size,
            search,
        })?)
    }

    /// All records for a patient, newest first.
    ///
    /// A known patient with zero records yields an empty list; only an
    /// unknown patient is an error.
    ///
    /// # Errors
    ///
    /// [`RegistryError::NotFound`] if no patient has this id.
    pub fn list_patient_records(&self, patient_id: &str) -> RegistryResult<Vec<MedicalRecord>> {
        if self.store.patient(patient_id)?.is_none() {
            return Err(RegistryError::not_found("patient", patient_id));
        }
        Ok(self.store.records_for_patient(patient_id)?)
    }
}
