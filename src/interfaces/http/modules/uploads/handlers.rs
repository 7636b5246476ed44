//! Upload handlers
//!
//! Multipart parts are validated one by one against the policy the `kind`
//! query parameter selects; every part gets its own verdict and accepted
//! parts are stored even when siblings fail. Stored assets are listed
//! through the same filter/sort engine the collections endpoint uses.

use std::sync::Arc;

use axum::{
    body::Bytes,
    extract::{Multipart, Path, Query, State},
    http::StatusCode,
    Json,
};
use sha2::{Digest, Sha256};

use super::dto::{
    FileAssetDto, ListAssetsParams, RejectedFileDto, UploadForm, UploadOutcome, UploadParams,
};
use crate::config::PaginationConfig;
use crate::core::table::{filter_rows, sort_rows};
use crate::core::upload::{FileAsset, UploadCandidate, UploadError, UploadPolicy};
use crate::core::{SortOrder, SortSpec};
use crate::infrastructure::Store;
use crate::interfaces::http::common::{domain_error_response, ApiResponse, ListResponse};

/// Uploads handler state
#[derive(Clone)]
pub struct UploadsHandlerState {
    pub store: Arc<dyn Store>,
    pub document_policy: UploadPolicy,
    pub image_policy: UploadPolicy,
    pub max_batch_files: usize,
    pub pagination: PaginationConfig,
}

#[utoipa::path(
    post,
    path = "/api/v1/uploads",
    tag = "Uploads",
    security(("bearer_auth" = [])),
    params(UploadParams),
    request_body(content = UploadForm, content_type = "multipart/form-data"),
    responses(
        (status = 200, description = "Per-file verdicts; success=false when any part was rejected", body = ApiResponse<UploadOutcome>),
        (status = 400, description = "No file parts, or unknown kind")
    )
)]
pub async fn upload_files(
    State(state): State<UploadsHandlerState>,
    Query(params): Query<UploadParams>,
    mut multipart: Multipart,
) -> Result<Json<ApiResponse<UploadOutcome>>, (StatusCode, Json<ApiResponse<UploadOutcome>>)> {
    let policy = match params.kind.as_deref() {
        None | Some("document") => &state.document_policy,
        Some("image") => &state.image_policy,
        Some(other) => {
            return Err((
                StatusCode::BAD_REQUEST,
                Json(ApiResponse::error(format!("Unknown upload kind '{other}'"))),
            ));
        }
    };

    // Drain the stream first so a bad part cannot cut off the ones after it
    let mut parts: Vec<(UploadCandidate, Bytes)> = Vec::new();
    loop {
        let field = multipart.next_field().await.map_err(|e| {
            (
                StatusCode::BAD_REQUEST,
                Json(ApiResponse::error(format!("Invalid multipart payload: {e}"))),
            )
        })?;
        let Some(field) = field else { break };
        let Some(file_name) = field.file_name().map(String::from) else {
            continue;
        };
        let data = field.bytes().await.map_err(|e| {
            (
                StatusCode::BAD_REQUEST,
                Json(ApiResponse::error(format!("Invalid multipart payload: {e}"))),
            )
        })?;
        parts.push((UploadCandidate::new(file_name, data.len() as u64), data));
    }

    if parts.is_empty() {
        return Err((
            StatusCode::BAD_REQUEST,
            Json(ApiResponse::error(UploadError::Missing.to_string())),
        ));
    }

    let mut outcome = UploadOutcome {
        accepted: Vec::new(),
        rejected: Vec::new(),
    };

    for (index, (candidate, data)) in parts.iter().enumerate() {
        if index >= state.max_batch_files {
            outcome.rejected.push(RejectedFileDto {
                name: candidate.name.clone(),
                reason: UploadError::TooManyFiles {
                    max: state.max_batch_files,
                }
                .to_string(),
            });
            continue;
        }

        match FileAsset::validated(policy, candidate) {
            Ok(asset) => {
                let asset = asset.with_checksum(hex::encode(Sha256::digest(data)));
                state.store.save_asset(asset.clone()).await.map_err(|e| {
                    (
                        StatusCode::INTERNAL_SERVER_ERROR,
                        Json(ApiResponse::error(e.to_string())),
                    )
                })?;
                outcome.accepted.push(FileAssetDto::from(asset));
            }
            Err(error) => outcome.rejected.push(RejectedFileDto {
                name: candidate.name.clone(),
                reason: error.to_string(),
            }),
        }
    }

    let success = outcome.rejected.is_empty();
    Ok(Json(ApiResponse {
        success,
        data: Some(outcome),
        error: None,
    }))
}

#[utoipa::path(
    get,
    path = "/api/v1/uploads",
    tag = "Uploads",
    security(("bearer_auth" = [])),
    params(ListAssetsParams),
    responses(
        (status = 200, description = "Stored assets", body = ListResponse<FileAssetDto>)
    )
)]
pub async fn list_assets(
    State(state): State<UploadsHandlerState>,
    Query(params): Query<ListAssetsParams>,
) -> Result<Json<ListResponse<FileAssetDto>>, (StatusCode, Json<ApiResponse<()>>)> {
    let assets = state
        .store
        .list_assets()
        .await
        .map_err(domain_error_response)?;

    let q = params.q.unwrap_or_default();
    let keys = vec!["name".to_string()];
    let mut visible = filter_rows(&assets, &q, &keys);

    let sort = match params.sort_by {
        Some(key) => SortSpec::by(
            key,
            params
                .sort_order
                .and_then(|v| v.parse::<SortOrder>().ok())
                .unwrap_or_default(),
        ),
        None => SortSpec::none(),
    };
    sort_rows(&mut visible, &sort);

    let total = visible.len() as u64;
    let offset = params.offset.unwrap_or(0);
    let limit = state
        .pagination
        .clamp_limit(params.limit.unwrap_or(state.pagination.default_limit));
    let start = (offset as usize).min(visible.len());
    let end = start.saturating_add(limit as usize).min(visible.len());
    let items: Vec<FileAssetDto> = visible[start..end]
        .iter()
        .map(|asset| FileAssetDto::from((*asset).clone()))
        .collect();

    Ok(Json(ListResponse { items, total }))
}

#[utoipa::path(
    get,
    path = "/api/v1/uploads/{id}",
    tag = "Uploads",
    security(("bearer_auth" = [])),
    params(("id" = String, Path, description = "Asset id")),
    responses(
        (status = 200, description = "Asset", body = ApiResponse<FileAssetDto>),
        (status = 404, description = "Not found")
    )
)]
pub async fn get_asset(
    State(state): State<UploadsHandlerState>,
    Path(id): Path<String>,
) -> Result<Json<ApiResponse<FileAssetDto>>, (StatusCode, Json<ApiResponse<FileAssetDto>>)> {
    let asset = state
        .store
        .get_asset(&id)
        .await
        .map_err(domain_error_response)?;

    match asset {
        Some(asset) => Ok(Json(ApiResponse::success(FileAssetDto::from(asset)))),
        None => Err((
            StatusCode::NOT_FOUND,
            Json(ApiResponse::error("Asset not found")),
        )),
    }
}

#[utoipa::path(
    delete,
    path = "/api/v1/uploads/{id}",
    tag = "Uploads",
    security(("bearer_auth" = [])),
    params(("id" = String, Path, description = "Asset id")),
    responses(
        (status = 200, description = "Asset deleted"),
        (status = 404, description = "Not found")
    )
)]
pub async fn delete_asset(
    State(state): State<UploadsHandlerState>,
    Path(id): Path<String>,
) -> Result<Json<ApiResponse<()>>, (StatusCode, Json<ApiResponse<()>>)> {
    state
        .store
        .delete_asset(&id)
        .await
        .map_err(domain_error_response)?;
    Ok(Json(ApiResponse::success(())))
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::extract::FromRequest;
    use axum::http::Request;
    use crate::infrastructure::InMemoryStore;

    const BOUNDARY: &str = "test-boundary-7MA4YWxkTrZu0gW";

    fn state() -> UploadsHandlerState {
        UploadsHandlerState {
            store: Arc::new(InMemoryStore::new()),
            document_policy: UploadPolicy::document(),
            image_policy: UploadPolicy::image(),
            max_batch_files: 10,
            pagination: PaginationConfig::default(),
        }
    }

    fn multipart_body(files: &[(&str, &str)]) -> String {
        let mut body = String::new();
        for (name, data) in files {
            body.push_str(&format!("--{BOUNDARY}\r\n"));
            body.push_str(&format!(
                "Content-Disposition: form-data; name=\"files\"; filename=\"{name}\"\r\n"
            ));
            body.push_str("Content-Type: application/octet-stream\r\n\r\n");
            body.push_str(data);
            body.push_str("\r\n");
        }
        body.push_str(&format!("--{BOUNDARY}--\r\n"));
        body
    }

    async fn multipart(files: &[(&str, &str)]) -> Multipart {
        let req = Request::builder()
            .header(
                "content-type",
                format!("multipart/form-data; boundary={BOUNDARY}"),
            )
            .body(Body::from(multipart_body(files)))
            .unwrap();
        Multipart::from_request(req, &()).await.unwrap()
    }

    fn image_query() -> Query<UploadParams> {
        Query(UploadParams {
            kind: Some("image".to_string()),
        })
    }

    #[tokio::test]
    async fn mixed_batch_is_judged_per_file() {
        let state = state();
        let parts = multipart(&[("photo.png", "png-bytes"), ("movie.mp4", "mp4-bytes")]).await;

        let response = upload_files(State(state.clone()), image_query(), parts)
            .await
            .unwrap();
        let envelope = response.0;
        assert!(!envelope.success);

        let outcome = envelope.data.unwrap();
        assert_eq!(outcome.accepted.len(), 1);
        assert_eq!(outcome.accepted[0].name, "photo.png");
        assert_eq!(outcome.accepted[0].kind, "image");
        assert_eq!(outcome.accepted[0].size, 9);
        assert_eq!(outcome.accepted[0].checksum.as_ref().unwrap().len(), 64);
        assert_eq!(outcome.rejected.len(), 1);
        assert!(outcome.rejected[0].reason.contains("not allowed"));

        // The accepted part was stored despite its rejected sibling
        let stored = state.store.list_assets().await.unwrap();
        assert_eq!(stored.len(), 1);
    }

    #[tokio::test]
    async fn clean_batch_reports_success() {
        let state = state();
        let parts = multipart(&[("a.png", "a"), ("b.jpg", "b")]).await;
        let envelope = upload_files(State(state), image_query(), parts)
            .await
            .unwrap()
            .0;
        assert!(envelope.success);
        assert_eq!(envelope.data.unwrap().accepted.len(), 2);
    }

    #[tokio::test]
    async fn empty_request_is_rejected() {
        let state = state();
        let parts = multipart(&[]).await;
        let (status, body) = upload_files(State(state), image_query(), parts)
            .await
            .unwrap_err();
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body.0.error.as_deref(), Some("No file selected"));
    }

    #[tokio::test]
    async fn unknown_kind_is_rejected() {
        let state = state();
        let parts = multipart(&[("a.png", "a")]).await;
        let (status, _) = upload_files(
            State(state),
            Query(UploadParams {
                kind: Some("archive".to_string()),
            }),
            parts,
        )
        .await
        .unwrap_err();
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn overflow_is_rejected_per_file_but_earlier_parts_stand() {
        let mut state = state();
        state.max_batch_files = 2;
        let parts = multipart(&[("a.png", "a"), ("b.png", "b"), ("c.png", "c")]).await;

        let envelope = upload_files(State(state), image_query(), parts)
            .await
            .unwrap()
            .0;
        let outcome = envelope.data.unwrap();
        assert_eq!(outcome.accepted.len(), 2);
        assert_eq!(outcome.rejected.len(), 1);
        assert_eq!(outcome.rejected[0].name, "c.png");
        assert_eq!(outcome.rejected[0].reason, "Maximum 2 files allowed");
    }

    #[tokio::test]
    async fn assets_list_filters_sorts_and_slices() {
        let state = state();
        for (name, size) in [("alpha.png", 100), ("beta.jpg", 300), ("gamma.png", 200)] {
            let asset = FileAsset::validated(
                &state.image_policy,
                &UploadCandidate::new(name, size),
            )
            .unwrap();
            state.store.save_asset(asset).await.unwrap();
        }

        let by_size = list_assets(
            State(state.clone()),
            Query(ListAssetsParams {
                sort_by: Some("size".to_string()),
                sort_order: Some("desc".to_string()),
                ..Default::default()
            }),
        )
        .await
        .unwrap()
        .0;
        assert_eq!(by_size.total, 3);
        assert_eq!(by_size.items[0].name, "beta.jpg");

        let searched = list_assets(
            State(state),
            Query(ListAssetsParams {
                q: Some("GAMMA".to_string()),
                ..Default::default()
            }),
        )
        .await
        .unwrap()
        .0;
        assert_eq!(searched.total, 1);
        assert_eq!(searched.items[0].name, "gamma.png");
    }

    #[tokio::test]
    async fn asset_get_and_delete_round_trip() {
        let state = state();
        let asset = FileAsset::validated(
            &state.image_policy,
            &UploadCandidate::new("keep.png", 42),
        )
        .unwrap();
        let id = asset.id.clone();
        state.store.save_asset(asset).await.unwrap();

        let fetched = get_asset(State(state.clone()), Path(id.clone()))
            .await
            .unwrap();
        assert_eq!(fetched.0.data.unwrap().name, "keep.png");

        delete_asset(State(state.clone()), Path(id.clone()))
            .await
            .unwrap();
        let (status, _) = get_asset(State(state), Path(id)).await.unwrap_err();
        assert_eq!(status, StatusCode::NOT_FOUND);
    }
}
