//! HTTP request handlers.

use crate::codec;
use crate::envelope;
use crate::metrics::METRICS;
use crate::pinning::UploadFile;
use crate::response::{ApiResponse, HealthResponse, UploadResponse};
use crate::state::AppState;
use crate::Error;
use axum::extract::{Multipart, Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use serde::Deserialize;
use serde_json::json;
use std::sync::atomic::Ordering;
use std::sync::Arc;
use tracing::{info, warn};

const DEFAULT_GROUP_NAME: &str = "untitled-collection";

/// Health check with node connectivity status.
pub async fn health(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let status = state
        .rpc
        .health()
        .await
        .unwrap_or_else(|_| "unavailable".into());
    Json(HealthResponse {
        status,
        contract_id: state.config.contract_id.clone(),
        rpc_url: state.config.rpc_url.clone(),
        uptime_secs: state.start_time.elapsed().as_secs(),
        requests: state.request_count.load(Ordering::Relaxed),
    })
}

/// Prometheus metrics in text exposition format.
pub async fn metrics() -> impl IntoResponse {
    (
        [(
            axum::http::header::CONTENT_TYPE,
            "text/plain; version=0.0.4",
        )],
        METRICS.render(),
    )
}

/// Pin uploaded files under a named group. `POST /api/files`
///
/// Multipart fields: `files` (one or more), `collectionName` (optional).
/// Files are uploaded one by one in request order; the response carries one
/// descriptor per file in the same order.
pub async fn upload_files(
    State(state): State<Arc<AppState>>,
    mut multipart: Multipart,
) -> Result<Json<UploadResponse>, Error> {
    count_request(&state);

    let mut files: Vec<UploadFile> = Vec::new();
    let mut collection_name: Option<String> = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| Error::Validation(format!("malformed multipart body: {e}")))?
    {
        match field.name() {
            Some("files") => {
                let name = field
                    .file_name()
                    .map(str::to_string)
                    .unwrap_or_else(|| format!("file-{}", files.len()));
                let content_type = field.content_type().map(str::to_string);
                let bytes = field
                    .bytes()
                    .await
                    .map_err(|e| Error::Validation(format!("failed to read file field: {e}")))?;
                files.push(UploadFile {
                    name,
                    content_type,
                    bytes: bytes.to_vec(),
                });
            }
            Some("collectionName") => {
                let value = field
                    .text()
                    .await
                    .map_err(|e| Error::Validation(format!("failed to read field: {e}")))?;
                if !value.is_empty() {
                    collection_name = Some(value);
                }
            }
            // Unknown fields are ignored, matching the original route.
            _ => {}
        }
    }

    if files.is_empty() {
        warn!("upload rejected: no files");
        return Err(Error::Validation("no files uploaded".into()));
    }
    if !state.pinata.is_configured() {
        METRICS.upload_errors.fetch_add(1, Ordering::Relaxed);
        return Err(Error::Pinning("pinning service JWT is not configured".into()));
    }

    let group_name = collection_name.as_deref().unwrap_or(DEFAULT_GROUP_NAME);
    let group = match state.pinata.create_group(group_name).await {
        Ok(g) => g,
        Err(e) => {
            METRICS.upload_errors.fetch_add(1, Ordering::Relaxed);
            return Err(e);
        }
    };

    let mut uploaded = Vec::with_capacity(files.len());
    for file in files {
        match state.pinata.upload_file(&group.id, file).await {
            Ok(pinned) => {
                METRICS.uploads_total.fetch_add(1, Ordering::Relaxed);
                uploaded.push(pinned);
            }
            Err(e) => {
                METRICS.upload_errors.fetch_add(1, Ordering::Relaxed);
                return Err(e);
            }
        }
    }

    info!(group_id = %group.id, files = uploaded.len(), "upload pinned");
    Ok(Json(UploadResponse {
        group,
        files: uploaded,
    }))
}

#[derive(Deserialize)]
pub struct CreateCollectionRequest {
    pub creator: String,
    pub name: String,
    pub symbol: String,
    #[serde(default)]
    pub base_uri: Option<String>,
}

/// Build a prepared, unsigned `create_collection` envelope.
/// `POST /api/collections`
pub async fn build_create_collection(
    State(state): State<Arc<AppState>>,
    Json(request): Json<CreateCollectionRequest>,
) -> Result<Json<ApiResponse>, Error> {
    count_request(&state);
    let (tx, preview) = state
        .contract
        .build_create_collection(
            &request.creator,
            &request.name,
            &request.symbol,
            request.base_uri.as_deref(),
        )
        .await?;
    let (prepared, _) = state.contract.prepare(tx).await?;
    Ok(Json(ApiResponse::ok(json!({
        "xdr": envelope::unsigned_envelope_base64(&prepared)?,
        "expected_collection_id": preview.expected_collection_id,
    }))))
}

#[derive(Deserialize)]
pub struct MintRequest {
    pub minter: String,
    pub to: String,
    #[serde(default)]
    pub metadata_uri: Option<String>,
}

/// Build a prepared, unsigned `mint_nft` envelope.
/// `POST /api/collections/{id}/mint`
pub async fn build_mint(
    State(state): State<Arc<AppState>>,
    Path(collection_id): Path<u32>,
    Json(request): Json<MintRequest>,
) -> Result<Json<ApiResponse>, Error> {
    count_request(&state);
    let (tx, preview) = state
        .contract
        .build_mint(
            &request.minter,
            collection_id,
            &request.to,
            request.metadata_uri.as_deref(),
        )
        .await?;
    let (prepared, _) = state.contract.prepare(tx).await?;
    Ok(Json(ApiResponse::ok(json!({
        "xdr": envelope::unsigned_envelope_base64(&prepared)?,
        "expected_token_id": preview.expected_token_id,
        "expected_uri": preview.expected_uri,
    }))))
}

#[derive(Deserialize)]
pub struct TransferRequest {
    pub from: String,
    pub to: String,
    pub collection_id: u32,
    pub token_id: u32,
}

/// Build a prepared, unsigned `transfer` envelope. `POST /api/transfers`
pub async fn build_transfer(
    State(state): State<Arc<AppState>>,
    Json(request): Json<TransferRequest>,
) -> Result<Json<ApiResponse>, Error> {
    count_request(&state);
    let tx = state
        .contract
        .build_transfer(
            &request.from,
            &request.to,
            request.collection_id,
            request.token_id,
        )
        .await?;
    let (prepared, _) = state.contract.prepare(tx).await?;
    Ok(Json(ApiResponse::ok(json!({
        "xdr": envelope::unsigned_envelope_base64(&prepared)?,
    }))))
}

#[derive(Deserialize)]
pub struct SubmitRequest {
    pub signed_xdr: String,
}

/// Submit a wallet-signed envelope and wait for a terminal status.
/// `POST /api/transactions`
pub async fn submit_transaction(
    State(state): State<Arc<AppState>>,
    Json(request): Json<SubmitRequest>,
) -> Result<Json<ApiResponse>, Error> {
    count_request(&state);
    METRICS.tx_submitted.fetch_add(1, Ordering::Relaxed);

    match state.contract.submit_signed_envelope(&request.signed_xdr).await {
        Ok(confirmation) => {
            METRICS.tx_success.fetch_add(1, Ordering::Relaxed);
            let result = confirmation
                .return_value
                .as_ref()
                .map(codec::scval_to_json);
            Ok(Json(ApiResponse::confirmed(result, confirmation.tx_hash)))
        }
        Err(e) => {
            METRICS.tx_error.fetch_add(1, Ordering::Relaxed);
            Err(e)
        }
    }
}

/// `GET /api/collections/total`
pub async fn total_collections(
    State(state): State<Arc<AppState>>,
) -> Result<Json<ApiResponse>, Error> {
    count_request(&state);
    let total = state.contract.query().total_collections().await?;
    Ok(Json(ApiResponse::ok(json!({ "total_collections": total }))))
}

/// `GET /api/collections/{id}`
pub async fn get_collection(
    State(state): State<Arc<AppState>>,
    Path(collection_id): Path<u32>,
) -> Result<(StatusCode, Json<ApiResponse>), Error> {
    count_request(&state);
    match state.contract.query().get_collection(collection_id).await? {
        Some(collection) => Ok((StatusCode::OK, Json(ApiResponse::ok(json!(collection))))),
        None => Ok((
            StatusCode::NOT_FOUND,
            Json(ApiResponse::err(format!("collection {collection_id} not found"))),
        )),
    }
}

/// `GET /api/collections/{id}/tokens/total`
pub async fn total_tokens(
    State(state): State<Arc<AppState>>,
    Path(collection_id): Path<u32>,
) -> Result<Json<ApiResponse>, Error> {
    count_request(&state);
    let total = state
        .contract
        .query()
        .total_tokens_in_collection(collection_id)
        .await?;
    Ok(Json(ApiResponse::ok(json!({ "total_tokens": total }))))
}

/// `GET /api/collections/{id}/tokens/{token_id}`
pub async fn get_token(
    State(state): State<Arc<AppState>>,
    Path((collection_id, token_id)): Path<(u32, u32)>,
) -> Result<(StatusCode, Json<ApiResponse>), Error> {
    count_request(&state);
    match state
        .contract
        .query()
        .get_token(collection_id, token_id)
        .await?
    {
        Some(token) => Ok((StatusCode::OK, Json(ApiResponse::ok(json!(token))))),
        None => Ok((
            StatusCode::NOT_FOUND,
            Json(ApiResponse::err(format!(
                "token {collection_id}/{token_id} not found"
            ))),
        )),
    }
}

/// `GET /api/collections/{id}/tokens/{token_id}/owner`
pub async fn owner_of(
    State(state): State<Arc<AppState>>,
    Path((collection_id, token_id)): Path<(u32, u32)>,
) -> Result<(StatusCode, Json<ApiResponse>), Error> {
    count_request(&state);
    match state
        .contract
        .query()
        .owner_of(collection_id, token_id)
        .await?
    {
        Some(owner) => Ok((StatusCode::OK, Json(ApiResponse::ok(json!({ "owner": owner }))))),
        None => Ok((
            StatusCode::NOT_FOUND,
            Json(ApiResponse::err(format!(
                "token {collection_id}/{token_id} has no owner"
            ))),
        )),
    }
}

/// `GET /api/accounts/{address}/tokens`
pub async fn tokens_of(
    State(state): State<Arc<AppState>>,
    Path(address): Path<String>,
) -> Result<Json<ApiResponse>, Error> {
    count_request(&state);
    let tokens = state.contract.query().tokens_of(&address).await?;
    Ok(Json(ApiResponse::ok(json!({ "tokens": tokens }))))
}

fn count_request(state: &AppState) {
    state.request_count.fetch_add(1, Ordering::Relaxed);
    METRICS.requests_total.fetch_add(1, Ordering::Relaxed);
}
