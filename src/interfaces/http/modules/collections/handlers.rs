//! Collection browsing and editing handlers
//!
//! `GET /api/v1/collections/{name}` serves the dataset contract the admin
//! table consumes: `offset`, `limit`, `sortBy`, `sortOrder` and `q` are
//! interpreted here; every other query parameter is treated as an
//! exact-match filter on the named row field. The response is always
//! `{"items": [...], "total": N}` where `total` counts matches before
//! slicing.

use std::collections::HashMap;
use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use serde_json::Value;

use crate::config::PaginationConfig;
use crate::core::table::{filter_rows, sort_rows};
use crate::core::{SortOrder, SortSpec, TableRow};
use crate::infrastructure::Store;
use crate::interfaces::http::common::{domain_error_response, ApiResponse, ListResponse};

/// Collections handler state
#[derive(Clone)]
pub struct CollectionsHandlerState {
    pub store: Arc<dyn Store>,
    pub pagination: PaginationConfig,
}

/// Union of field names across all rows, in first-seen order.
fn searchable_keys(rows: &[Value]) -> Vec<String> {
    let mut keys = Vec::new();
    for row in rows {
        if let Some(object) = row.as_object() {
            for key in object.keys() {
                if !keys.iter().any(|k| k == key) {
                    keys.push(key.clone());
                }
            }
        }
    }
    keys
}

#[utoipa::path(
    get,
    path = "/api/v1/collections",
    tag = "Collections",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Collection names", body = ApiResponse<Vec<String>>)
    )
)]
pub async fn list_collections(
    State(state): State<CollectionsHandlerState>,
) -> Result<Json<ApiResponse<Vec<String>>>, (StatusCode, Json<ApiResponse<Vec<String>>>)> {
    let names = state
        .store
        .collection_names()
        .await
        .map_err(domain_error_response)?;
    Ok(Json(ApiResponse::success(names)))
}

#[utoipa::path(
    get,
    path = "/api/v1/collections/{name}",
    tag = "Collections",
    security(("bearer_auth" = [])),
    params(
        ("name" = String, Path, description = "Collection name"),
        ("offset" = Option<u64>, Query, description = "Rows to skip before the page"),
        ("limit" = Option<u32>, Query, description = "Page size, clamped to the configured maximum"),
        ("sortBy" = Option<String>, Query, description = "Field to sort on"),
        ("sortOrder" = Option<String>, Query, description = "asc or desc, defaults to asc"),
        ("q" = Option<String>, Query, description = "Case-insensitive substring search across all fields")
    ),
    responses(
        (status = 200, description = "Matching rows and pre-slice total", body = ListResponse<serde_json::Value>),
        (status = 404, description = "Unknown collection")
    )
)]
pub async fn list_rows(
    State(state): State<CollectionsHandlerState>,
    Path(name): Path<String>,
    Query(mut params): Query<HashMap<String, String>>,
) -> Result<Json<ListResponse<Value>>, (StatusCode, Json<ApiResponse<()>>)> {
    let rows = state
        .store
        .list_rows(&name)
        .await
        .map_err(domain_error_response)?;

    // Contract parameters; anything unparsable falls back to the default
    let offset = params
        .remove("offset")
        .and_then(|v| v.parse::<u64>().ok())
        .unwrap_or(0);
    let limit = params
        .remove("limit")
        .and_then(|v| v.parse::<u32>().ok())
        .unwrap_or(state.pagination.default_limit);
    let limit = state.pagination.clamp_limit(limit);
    let sort_key = params.remove("sortBy");
    let sort_order = params
        .remove("sortOrder")
        .and_then(|v| v.parse::<SortOrder>().ok())
        .unwrap_or_default();
    let q = params.remove("q").unwrap_or_default();

    let keys = searchable_keys(&rows);
    let mut visible = filter_rows(&rows, &q, &keys);

    // Leftover parameters are exact-match field filters
    if !params.is_empty() {
        visible.retain(|row| {
            params
                .iter()
                .all(|(key, expected)| row.cell(key).display() == *expected)
        });
    }

    let sort = match sort_key {
        Some(key) => SortSpec::by(key, sort_order),
        None => SortSpec::none(),
    };
    sort_rows(&mut visible, &sort);

    let total = visible.len() as u64;
    let start = (offset as usize).min(visible.len());
    let end = start.saturating_add(limit as usize).min(visible.len());
    let items: Vec<Value> = visible[start..end].iter().map(|row| (*row).clone()).collect();

    Ok(Json(ListResponse { items, total }))
}

#[utoipa::path(
    get,
    path = "/api/v1/collections/{name}/{id}",
    tag = "Collections",
    security(("bearer_auth" = [])),
    params(
        ("name" = String, Path, description = "Collection name"),
        ("id" = i64, Path, description = "Row id")
    ),
    responses(
        (status = 200, description = "Row", body = ApiResponse<serde_json::Value>),
        (status = 404, description = "Unknown collection or row")
    )
)]
pub async fn get_row(
    State(state): State<CollectionsHandlerState>,
    Path((name, id)): Path<(String, i64)>,
) -> Result<Json<ApiResponse<Value>>, (StatusCode, Json<ApiResponse<Value>>)> {
    let row = state
        .store
        .get_row(&name, id)
        .await
        .map_err(domain_error_response)?;

    match row {
        Some(row) => Ok(Json(ApiResponse::success(row))),
        None => Err((
            StatusCode::NOT_FOUND,
            Json(ApiResponse::error("Row not found")),
        )),
    }
}

#[utoipa::path(
    post,
    path = "/api/v1/collections/{name}",
    tag = "Collections",
    security(("bearer_auth" = [])),
    params(("name" = String, Path, description = "Collection name")),
    request_body = serde_json::Value,
    responses(
        (status = 201, description = "Row created with a server-assigned id", body = ApiResponse<serde_json::Value>),
        (status = 400, description = "Row is not a JSON object")
    )
)]
pub async fn create_row(
    State(state): State<CollectionsHandlerState>,
    Path(name): Path<String>,
    Json(row): Json<Value>,
) -> Result<(StatusCode, Json<ApiResponse<Value>>), (StatusCode, Json<ApiResponse<Value>>)> {
    let created = state
        .store
        .insert_row(&name, row)
        .await
        .map_err(domain_error_response)?;
    Ok((StatusCode::CREATED, Json(ApiResponse::success(created))))
}

#[utoipa::path(
    put,
    path = "/api/v1/collections/{name}/{id}",
    tag = "Collections",
    security(("bearer_auth" = [])),
    params(
        ("name" = String, Path, description = "Collection name"),
        ("id" = i64, Path, description = "Row id")
    ),
    request_body = serde_json::Value,
    responses(
        (status = 200, description = "Row replaced", body = ApiResponse<serde_json::Value>),
        (status = 404, description = "Unknown collection or row")
    )
)]
pub async fn update_row(
    State(state): State<CollectionsHandlerState>,
    Path((name, id)): Path<(String, i64)>,
    Json(row): Json<Value>,
) -> Result<Json<ApiResponse<Value>>, (StatusCode, Json<ApiResponse<Value>>)> {
    let updated = state
        .store
        .update_row(&name, id, row)
        .await
        .map_err(domain_error_response)?;
    Ok(Json(ApiResponse::success(updated)))
}

#[utoipa::path(
    delete,
    path = "/api/v1/collections/{name}/{id}",
    tag = "Collections",
    security(("bearer_auth" = [])),
    params(
        ("name" = String, Path, description = "Collection name"),
        ("id" = i64, Path, description = "Row id")
    ),
    responses(
        (status = 200, description = "Row deleted"),
        (status = 404, description = "Unknown collection or row")
    )
)]
pub async fn delete_row(
    State(state): State<CollectionsHandlerState>,
    Path((name, id)): Path<(String, i64)>,
) -> Result<Json<ApiResponse<()>>, (StatusCode, Json<ApiResponse<()>>)> {
    state
        .store
        .delete_row(&name, id)
        .await
        .map_err(domain_error_response)?;
    Ok(Json(ApiResponse::success(())))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::InMemoryStore;
    use serde_json::json;

    fn state() -> CollectionsHandlerState {
        CollectionsHandlerState {
            store: Arc::new(InMemoryStore::with_demo_data()),
            pagination: PaginationConfig::default(),
        }
    }

    fn query(pairs: &[(&str, &str)]) -> Query<HashMap<String, String>> {
        Query(
            pairs
                .iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect(),
        )
    }

    async fn fetch(
        state: &CollectionsHandlerState,
        pairs: &[(&str, &str)],
    ) -> ListResponse<Value> {
        let response = list_rows(
            State(state.clone()),
            Path("users".to_string()),
            query(pairs),
        )
        .await
        .unwrap();
        response.0
    }

    #[tokio::test]
    async fn second_page_of_twenty_rows() {
        let state = state();
        let page = fetch(&state, &[("offset", "10"), ("limit", "10")]).await;
        assert_eq!(page.total, 20);
        assert_eq!(page.items.len(), 10);
        assert_eq!(page.items[0]["id"], 11);
        assert_eq!(page.items[9]["id"], 20);
    }

    #[tokio::test]
    async fn garbage_offset_and_limit_fall_back_to_defaults() {
        let state = state();
        let page = fetch(&state, &[("offset", "abc"), ("limit", "-5")]).await;
        assert_eq!(page.total, 20);
        assert_eq!(page.items.len(), 10);
        assert_eq!(page.items[0]["id"], 1);
    }

    #[tokio::test]
    async fn oversized_limit_is_clamped() {
        let state = state();
        let page = fetch(&state, &[("limit", "10000")]).await;
        // max_limit 100 still covers all 20 demo rows
        assert_eq!(page.items.len(), 20);
    }

    #[tokio::test]
    async fn q_searches_every_field_case_insensitively() {
        let state = state();
        let page = fetch(&state, &[("q", "MARTIN")]).await;
        assert_eq!(page.total, 2);
        let names: Vec<&str> = page
            .items
            .iter()
            .map(|r| r["name"].as_str().unwrap())
            .collect();
        assert!(names.contains(&"Chris Martin"));
        assert!(names.contains(&"Olivia Martin"));
    }

    #[tokio::test]
    async fn sorts_by_name_in_both_directions() {
        let state = state();
        let asc = fetch(&state, &[("sortBy", "name"), ("sortOrder", "asc")]).await;
        assert_eq!(asc.items[0]["name"], "Alex Rodriguez");

        let desc = fetch(&state, &[("sortBy", "name"), ("sortOrder", "desc")]).await;
        assert_eq!(desc.items[0]["name"], "Tom Brown");
    }

    #[tokio::test]
    async fn invalid_sort_order_falls_back_to_ascending() {
        let state = state();
        let page = fetch(&state, &[("sortBy", "name"), ("sortOrder", "sideways")]).await;
        assert_eq!(page.items[0]["name"], "Alex Rodriguez");
    }

    #[tokio::test]
    async fn extra_params_filter_by_field_equality() {
        let state = state();
        let page = fetch(&state, &[("role", "Admin")]).await;
        assert_eq!(page.total, 4);
        assert!(page.items.iter().all(|r| r["role"] == "Admin"));

        let combined = fetch(&state, &[("role", "Admin"), ("status", "Active")]).await;
        assert_eq!(combined.total, 4);
    }

    #[tokio::test]
    async fn filters_apply_before_the_slice() {
        let state = state();
        let page = fetch(&state, &[("role", "User"), ("limit", "3")]).await;
        assert_eq!(page.total, 7);
        assert_eq!(page.items.len(), 3);
    }

    #[tokio::test]
    async fn unknown_collection_is_404() {
        let state = state();
        let err = list_rows(
            State(state.clone()),
            Path("ghosts".to_string()),
            query(&[]),
        )
        .await
        .unwrap_err();
        assert_eq!(err.0, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn row_crud_round_trip() {
        let state = state();

        let (status, created) = create_row(
            State(state.clone()),
            Path("users".to_string()),
            Json(json!({"name": "New Person", "email": "new@example.com", "role": "User", "status": "Active"})),
        )
        .await
        .unwrap();
        assert_eq!(status, StatusCode::CREATED);
        let id = created.0.data.as_ref().unwrap()["id"].as_i64().unwrap();
        assert_eq!(id, 21);

        let fetched = get_row(State(state.clone()), Path(("users".to_string(), id)))
            .await
            .unwrap();
        assert_eq!(fetched.0.data.as_ref().unwrap()["name"], "New Person");

        let updated = update_row(
            State(state.clone()),
            Path(("users".to_string(), id)),
            Json(json!({"name": "Renamed Person", "email": "new@example.com"})),
        )
        .await
        .unwrap();
        assert_eq!(updated.0.data.as_ref().unwrap()["name"], "Renamed Person");

        delete_row(State(state.clone()), Path(("users".to_string(), id)))
            .await
            .unwrap();
        let gone = get_row(State(state.clone()), Path(("users".to_string(), id)))
            .await
            .unwrap_err();
        assert_eq!(gone.0, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn non_object_row_is_rejected() {
        let state = state();
        let err = create_row(
            State(state.clone()),
            Path("users".to_string()),
            Json(json!([1, 2, 3])),
        )
        .await
        .unwrap_err();
        assert_eq!(err.0, StatusCode::BAD_REQUEST);
    }
}
