//! # API REST
//!
//! REST boundary for the patient consent registry.
//!
//! Handles:
//! - HTTP endpoints with axum
//! - OpenAPI/Swagger documentation
//! - REST-specific concerns (JSON wire shapes, CORS, status-code mapping)
//!
//! This layer is thin glue: it translates requests into core service calls
//! and maps [`RegistryError`] kinds to status codes. The `status=all` filter
//! sentinel is resolved here; the services only ever see a concrete status
//! or no filter at all.

pub mod dto;

use std::sync::Arc;

use axum::{
    extract::{Path as AxumPath, Query, State},
    http::StatusCode,
    response::Json,
    routing::{get, post},
    Router,
};
use serde::Deserialize;
use tower_http::cors::CorsLayer;
use utoipa::{IntoParams, OpenApi};
use utoipa_swagger_ui::SwaggerUi;

use pcr_core::{
    ConsentService, ConsentStatus, DataStore, DirectoryService, IdentityOracle, LedgerService,
    RegistryError, StatsService,
};

use dto::{
    ActivateConsentReq, ConsentDto, CreateConsentReq, HealthRes, ListConsentsRes,
    ListPatientsRes, ListTransactionsRes, PatientDto, PatientRecordsRes, StatsRes,
};

/// Default page size for patient listings.
const DEFAULT_PAGE_SIZE: u32 = 10;
/// Default number of transactions returned by the ledger view.
const DEFAULT_TX_LIMIT: usize = 20;

/// Application state shared across REST API handlers.
///
/// Holds the four core services, all wired over one data store and one
/// identity oracle.
#[derive(Clone)]
pub struct AppState {
    pub consents: ConsentService,
    pub directory: DirectoryService,
    pub ledger: LedgerService,
    pub stats: StatsService,
}

impl AppState {
    /// Wires the core services over `store` and `oracle`.
    pub fn new(store: Arc<dyn DataStore>, oracle: Arc<dyn IdentityOracle>) -> Self {
        Self {
            consents: ConsentService::new(store.clone(), oracle),
            directory: DirectoryService::new(store.clone()),
            ledger: LedgerService::new(store.clone()),
            stats: StatsService::new(store),
        }
    }
}

#[derive(OpenApi)]
#[openapi(
    paths(
        health,
        list_patients,
        get_patient,
        list_patient_records,
        list_consents,
        create_consent,
        activate_consent,
        list_transactions,
        get_stats,
    ),
    components(schemas(
        dto::HealthRes,
        dto::PatientDto,
        dto::MedicalRecordDto,
        dto::ConsentDto,
        dto::TransactionDto,
        dto::StatsRes,
        dto::PageInfoDto,
        dto::ListPatientsRes,
        dto::PatientRecordsRes,
        dto::ListConsentsRes,
        dto::ListTransactionsRes,
        dto::CreateConsentReq,
        dto::ActivateConsentReq,
    ))
)]
struct ApiDoc;

/// Builds the API router with CORS and Swagger UI attached.
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/patients", get(list_patients))
        .route("/patients/:id", get(get_patient))
        .route("/patients/:id/records", get(list_patient_records))
        .route("/consents", get(list_consents))
        .route("/consents", post(create_consent))
        .route("/consents/:id/activate", post(activate_consent))
        .route("/transactions", get(list_transactions))
        .route("/stats", get(get_stats))
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
        .layer(CorsLayer::permissive())
        .with_state(state)
}

/// Logs a failed operation and maps its error kind to a status code.
fn fail(err: &RegistryError, context: &str) -> (StatusCode, &'static str) {
    tracing::error!("{context}: {err:?}");
    match err {
        RegistryError::NotFound { .. } => (StatusCode::NOT_FOUND, "Not found"),
        RegistryError::InvalidArgument(_) => (StatusCode::BAD_REQUEST, "Invalid request"),
        RegistryError::AuthorizationFailed(_) => (StatusCode::FORBIDDEN, "Authorization failed"),
        RegistryError::InvalidState(_) => (StatusCode::CONFLICT, "Invalid state"),
        RegistryError::StoreUnavailable(_) => {
            (StatusCode::SERVICE_UNAVAILABLE, "Store unavailable")
        }
    }
}

#[utoipa::path(
    get,
    path = "/health",
    responses(
        (status = 200, description = "Health check response", body = HealthRes)
    )
)]
/// Health check endpoint used for monitoring and load balancer checks.
#[axum::debug_handler]
async fn health(State(_state): State<AppState>) -> Json<HealthRes> {
    Json(HealthRes {
        ok: true,
        message: "PCR REST API is alive".into(),
    })
}

#[derive(Debug, Deserialize, IntoParams)]
struct PatientListParams {
    /// 1-indexed page number (default 1)
    page: Option<u32>,
    /// Page size (default 10)
    limit: Option<u32>,
    /// Case-insensitive substring matched against patient name or email
    search: Option<String>,
}

#[utoipa::path(
    get,
    path = "/patients",
    params(PatientListParams),
    responses(
        (status = 200, description = "One page of patients", body = ListPatientsRes),
        (status = 400, description = "Bad request"),
        (status = 503, description = "Store unavailable")
    )
)]
/// Lists patients, paginated and optionally filtered by a search term.
#[axum::debug_handler]
async fn list_patients(
    State(state): State<AppState>,
    Query(params): Query<PatientListParams>,
) -> Result<Json<ListPatientsRes>, (StatusCode, &'static str)> {
    let page = params.page.unwrap_or(1);
    let page_size = params.limit.unwrap_or(DEFAULT_PAGE_SIZE);

    match state
        .directory
        .list_patients(page, page_size, params.search.as_deref())
    {
        Ok(patients) => Ok(Json(ListPatientsRes {
            pagination: patients.info.into(),
            patients: patients.items.into_iter().map(Into::into).collect(),
        })),
        Err(e) => Err(fail(&e, "List patients error")),
    }
}

#[utoipa::path(
    get,
    path = "/patients/{id}",
    params(("id" = String, Path, description = "Patient id")),
    responses(
        (status = 200, description = "Patient detail", body = PatientDto),
        (status = 404, description = "Patient not found"),
        (status = 503, description = "Store unavailable")
    )
)]
/// Fetches a single patient by id.
#[axum::debug_handler]
async fn get_patient(
    State(state): State<AppState>,
    AxumPath(id): AxumPath<String>,
) -> Result<Json<PatientDto>, (StatusCode, &'static str)> {
    match state.directory.get_patient(&id) {
        Ok(patient) => Ok(Json(patient.into())),
        Err(e) => Err(fail(&e, "Get patient error")),
    }
}

#[utoipa::path(
    get,
    path = "/patients/{id}/records",
    params(("id" = String, Path, description = "Patient id")),
    responses(
        (status = 200, description = "Medical records for the patient, newest first", body = PatientRecordsRes),
        (status = 404, description = "Patient not found"),
        (status = 503, description = "Store unavailable")
    )
)]
/// Lists a patient's medical records, newest first.
///
/// A known patient with no records yields an empty list; only an unknown
/// patient id is a 404.
#[axum::debug_handler]
async fn list_patient_records(
    State(state): State<AppState>,
    AxumPath(id): AxumPath<String>,
) -> Result<Json<PatientRecordsRes>, (StatusCode, &'static str)> {
    match state.directory.list_patient_records(&id) {
        Ok(records) => Ok(Json(PatientRecordsRes {
            records: records.into_iter().map(Into::into).collect(),
        })),
        Err(e) => Err(fail(&e, "List patient records error")),
    }
}

#[derive(Debug, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
struct ConsentListParams {
    /// Restrict to consents of one patient
    patient_id: Option<String>,
    /// `all`, `active`, or `pending`; `all` and absent mean "no filter"
    status: Option<String>,
}

#[utoipa::path(
    get,
    path = "/consents",
    params(ConsentListParams),
    responses(
        (status = 200, description = "Consents, newest first", body = ListConsentsRes),
        (status = 400, description = "Unknown status filter"),
        (status = 503, description = "Store unavailable")
    )
)]
/// Lists consents, newest first, with optional patient and status filters.
#[axum::debug_handler]
async fn list_consents(
    State(state): State<AppState>,
    Query(params): Query<ConsentListParams>,
) -> Result<Json<ListConsentsRes>, (StatusCode, &'static str)> {
    // Boundary translation: "all" is a UI sentinel, not a status the core
    // understands.
    let status = match params.status.as_deref() {
        None | Some("all") => None,
        Some(raw) => Some(
            raw.parse::<ConsentStatus>()
                .map_err(|e| fail(&e, "List consents error"))?,
        ),
    };

    match state
        .consents
        .list_consents(params.patient_id.as_deref(), status)
    {
        Ok(consents) => Ok(Json(ListConsentsRes {
            consents: consents.into_iter().map(Into::into).collect(),
        })),
        Err(e) => Err(fail(&e, "List consents error")),
    }
}

#[utoipa::path(
    post,
    path = "/consents",
    request_body = CreateConsentReq,
    responses(
        (status = 201, description = "Consent created as pending", body = ConsentDto),
        (status = 400, description = "Unknown purpose or malformed wallet address"),
        (status = 403, description = "Signing declined or unavailable"),
        (status = 404, description = "Patient not found"),
        (status = 503, description = "Store unavailable")
    )
)]
/// Creates a consent: signs the canonical message for the given wallet and
/// persists the result as `pending`.
#[axum::debug_handler]
async fn create_consent(
    State(state): State<AppState>,
    Json(req): Json<CreateConsentReq>,
) -> Result<(StatusCode, Json<ConsentDto>), (StatusCode, &'static str)> {
    match state
        .consents
        .create_consent(&req.patient_id, &req.purpose, &req.wallet_address)
    {
        Ok(consent) => Ok((StatusCode::CREATED, Json(consent.into()))),
        Err(e) => Err(fail(&e, "Create consent error")),
    }
}

#[utoipa::path(
    post,
    path = "/consents/{id}/activate",
    params(("id" = String, Path, description = "Consent id")),
    request_body = ActivateConsentReq,
    responses(
        (status = 200, description = "Consent activated", body = ConsentDto),
        (status = 404, description = "Consent not found"),
        (status = 409, description = "Consent is not pending"),
        (status = 503, description = "Store unavailable")
    )
)]
/// Activates a pending consent, attaching an optional settlement reference.
///
/// Re-activating an already active consent is a conflict, not a no-op.
#[axum::debug_handler]
async fn activate_consent(
    State(state): State<AppState>,
    AxumPath(id): AxumPath<String>,
    Json(req): Json<ActivateConsentReq>,
) -> Result<Json<ConsentDto>, (StatusCode, &'static str)> {
    match state
        .consents
        .activate_consent(&id, req.blockchain_tx_hash)
    {
        Ok(consent) => Ok(Json(consent.into())),
        Err(e) => Err(fail(&e, "Activate consent error")),
    }
}

#[derive(Debug, Deserialize, IntoParams)]
struct TransactionListParams {
    /// Include only transactions where this address is sender or recipient
    address: Option<String>,
    /// Maximum number of transactions returned (default 20)
    limit: Option<usize>,
}

#[utoipa::path(
    get,
    path = "/transactions",
    params(TransactionListParams),
    responses(
        (status = 200, description = "Transactions, newest first", body = ListTransactionsRes),
        (status = 400, description = "Bad request"),
        (status = 503, description = "Store unavailable")
    )
)]
/// Lists the most recent transactions, optionally for one address.
#[axum::debug_handler]
async fn list_transactions(
    State(state): State<AppState>,
    Query(params): Query<TransactionListParams>,
) -> Result<Json<ListTransactionsRes>, (StatusCode, &'static str)> {
    let limit = params.limit.unwrap_or(DEFAULT_TX_LIMIT);
    match state.ledger.list_transactions(params.address.as_deref(), limit) {
        Ok(transactions) => Ok(Json(ListTransactionsRes {
            transactions: transactions.into_iter().map(Into::into).collect(),
        })),
        Err(e) => Err(fail(&e, "List transactions error")),
    }
}

#[utoipa::path(
    get,
    path = "/stats",
    responses(
        (status = 200, description = "Aggregate entity counts", body = StatsRes),
        (status = 503, description = "Store unavailable")
    )
)]
/// Returns aggregate counts over every entity collection.
#[axum::debug_handler]
async fn get_stats(
    State(state): State<AppState>,
) -> Result<Json<StatsRes>, (StatusCode, &'static str)> {
    match state.stats.get_stats() {
        Ok(stats) => Ok(Json(stats.into())),
        Err(e) => Err(fail(&e, "Get stats error")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::{header, Request};
    use http_body_util::BodyExt;
    use pcr_core::{LocalKeySigner, MemoryStore, SeedData, WalletAddress};
    use tower::ServiceExt;

    fn seeded_router() -> Router {
        let seed: SeedData = serde_json::from_str(
            r#"{
                "patients": [{
                    "id": "patient-001",
                    "name": "Alice Smith",
                    "email": "alice@example.com",
                    "dateOfBirth": "1990-01-15",
                    "gender": "female"
                }],
                "consents": [{
                    "id": "c1",
                    "patientId": "patient-001",
                    "purpose": "Research Study Participation",
                    "walletAddress": "0xabc",
                    "signature": "seed-sig",
                    "status": "pending",
                    "createdAt": "2024-03-01T12:00:00Z"
                }]
            }"#,
        )
        .expect("seed should parse");

        let store = Arc::new(MemoryStore::from_seed(seed));
        let signer = Arc::new(LocalKeySigner::new(
            WalletAddress::new("0xabc").expect("valid address"),
        ));
        router(AppState::new(store, signer))
    }

    async fn body_json(response: axum::response::Response) -> serde_json::Value {
        let bytes = response
            .into_body()
            .collect()
            .await
            .expect("body should collect")
            .to_bytes();
        serde_json::from_slice(&bytes).expect("body should be JSON")
    }

    fn get_request(uri: &str) -> Request<Body> {
        Request::builder()
            .uri(uri)
            .body(Body::empty())
            .expect("request should build")
    }

    fn post_json(uri: &str, body: serde_json::Value) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri(uri)
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .expect("request should build")
    }

    #[tokio::test]
    async fn test_health_reports_alive() {
        let response = seeded_router()
            .oneshot(get_request("/health"))
            .await
            .expect("request should succeed");
        assert_eq!(response.status(), StatusCode::OK);
        let body = body_json(response).await;
        assert_eq!(body["ok"], true);
    }

    #[tokio::test]
    async fn test_create_consent_returns_created_pending_consent() {
        let response = seeded_router()
            .oneshot(post_json(
                "/consents",
                serde_json::json!({
                    "patientId": "patient-001",
                    "purpose": "Research Study Participation",
                    "walletAddress": "0xabc"
                }),
            ))
            .await
            .expect("request should succeed");

        assert_eq!(response.status(), StatusCode::CREATED);
        let body = body_json(response).await;
        assert_eq!(body["patientId"], "patient-001");
        assert_eq!(body["status"], "pending");
        assert!(body.get("blockchainTxHash").is_none());
        assert!(!body["signature"].as_str().unwrap_or_default().is_empty());
    }

    #[tokio::test]
    async fn test_create_consent_for_unbound_wallet_is_forbidden() {
        let response = seeded_router()
            .oneshot(post_json(
                "/consents",
                serde_json::json!({
                    "patientId": "patient-001",
                    "purpose": "Research Study Participation",
                    "walletAddress": "0xdef"
                }),
            ))
            .await
            .expect("request should succeed");
        assert_eq!(response.status(), StatusCode::FORBIDDEN);
    }

    #[tokio::test]
    async fn test_status_all_is_translated_to_no_filter() {
        let response = seeded_router()
            .oneshot(get_request("/consents?status=all"))
            .await
            .expect("request should succeed");
        assert_eq!(response.status(), StatusCode::OK);
        let body = body_json(response).await;
        assert_eq!(body["consents"].as_array().map(Vec::len), Some(1));
    }

    #[tokio::test]
    async fn test_unknown_status_filter_is_bad_request() {
        let response = seeded_router()
            .oneshot(get_request("/consents?status=bogus"))
            .await
            .expect("request should succeed");
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_activate_consent_then_conflict_on_repeat() {
        let router = seeded_router();

        let first = router
            .clone()
            .oneshot(post_json(
                "/consents/c1/activate",
                serde_json::json!({ "blockchainTxHash": "0xfeed" }),
            ))
            .await
            .expect("request should succeed");
        assert_eq!(first.status(), StatusCode::OK);
        let body = body_json(first).await;
        assert_eq!(body["status"], "active");
        assert_eq!(body["blockchainTxHash"], "0xfeed");

        let second = router
            .oneshot(post_json(
                "/consents/c1/activate",
                serde_json::json!({}),
            ))
            .await
            .expect("request should succeed");
        assert_eq!(second.status(), StatusCode::CONFLICT);
    }

    #[tokio::test]
    async fn test_get_patient_unknown_id_is_not_found() {
        let response = seeded_router()
            .oneshot(get_request("/patients/patient-999"))
            .await
            .expect("request should succeed");
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_list_patients_reports_pagination() {
        let response = seeded_router()
            .oneshot(get_request("/patients?page=1&limit=10"))
            .await
            .expect("request should succeed");
        assert_eq!(response.status(), StatusCode::OK);
        let body = body_json(response).await;
        assert_eq!(body["pagination"]["page"], 1);
        assert_eq!(body["pagination"]["totalItems"], 1);
        assert_eq!(body["patients"][0]["id"], "patient-001");
    }

    #[tokio::test]
    async fn test_stats_has_all_six_counts() {
        let response = seeded_router()
            .oneshot(get_request("/stats"))
            .await
            .expect("request should succeed");
        assert_eq!(response.status(), StatusCode::OK);
        let body = body_json(response).await;
        assert_eq!(body["totalPatients"], 1);
        assert_eq!(body["totalConsents"], 1);
        assert_eq!(body["pendingConsents"], 1);
        assert_eq!(body["activeConsents"], 0);
        assert_eq!(body["totalRecords"], 0);
        assert_eq!(body["totalTransactions"], 0);
    }
}
