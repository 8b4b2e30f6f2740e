//! Page listing and page view endpoints

use std::sync::Arc;

use axum::extract::{Path, State};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::Serialize;
use utoipa::ToSchema;

use crate::api::types::ApiError;
use crate::data::duckdb::DuckdbService;
use crate::domain::pages::PageCatalog;
use crate::domain::pages::view::{PageViewRequest, PageViewResponse, render_page_view};

#[derive(Clone)]
pub struct PagesApiState {
    pub db: Arc<DuckdbService>,
    pub catalog: Arc<PageCatalog>,
}

pub fn routes(db: Arc<DuckdbService>, catalog: Arc<PageCatalog>) -> Router<()> {
    Router::new()
        .route("/", get(list_pages))
        .route("/{page_id}/view", post(page_view))
        .with_state(PagesApiState { db, catalog })
}

/// One catalog entry as listed to the UI
#[derive(Serialize, ToSchema)]
pub struct PageSummary {
    pub identifier: String,
    pub title: String,
    pub subtitle: String,
}

/// List every page in the catalog, in declaration order
#[utoipa::path(
    get,
    path = "/api/v1/pages",
    tag = "pages",
    responses(
        (status = 200, description = "Catalog pages", body = [PageSummary])
    )
)]
pub async fn list_pages(State(state): State<PagesApiState>) -> Json<Vec<PageSummary>> {
    let pages = state
        .catalog
        .pages
        .iter()
        .map(|p| PageSummary {
            identifier: p.page_identifier.clone(),
            title: p.title.clone(),
            subtitle: p.subtitle.clone(),
        })
        .collect();
    Json(pages)
}

/// Render one page view: rows, filter configuration, and pagination
#[utoipa::path(
    post,
    path = "/api/v1/pages/{page_id}/view",
    tag = "pages",
    params(
        ("page_id" = String, Path, description = "Page identifier")
    ),
    request_body = PageViewRequest,
    responses(
        (status = 200, description = "Page view", body = PageViewResponse),
        (status = 400, description = "Invalid filter literal"),
        (status = 404, description = "Unknown page or saved filter"),
        (status = 503, description = "Store unavailable")
    )
)]
pub async fn page_view(
    State(state): State<PagesApiState>,
    Path(page_id): Path<String>,
    Json(request): Json<PageViewRequest>,
) -> Result<Json<PageViewResponse>, ApiError> {
    let response = render_page_view(&state.db, &state.catalog, &page_id, request).await?;
    Ok(Json(response))
}
