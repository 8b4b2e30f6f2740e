//! OpenAPI specification

use axum::http::header;
use axum::response::{IntoResponse, Json};
use utoipa::OpenApi;

use crate::api::routes::{health, pages};
use crate::data::duckdb::filters::discover::FilterConfigEntry;
use crate::data::duckdb::filters::types::{FilterArchetype, FilterInput, ModalityInput};
use crate::domain::pages::view::{
    PageDetails, PageViewRequest, PageViewResponse, PaginationMeta, PaginationRequest,
    SavedFilterSummary, TableHeader,
};
use crate::domain::pages::{PageConfig, SavedFilter};

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Datapage API",
        version = env!("CARGO_PKG_VERSION"),
        description = "Filterable paginated pages over DuckDB tables"
    ),
    tags(
        (name = "health", description = "Health check endpoint"),
        (name = "pages", description = "Page catalog and page views")
    ),
    paths(
        health::health,
        pages::list_pages,
        pages::page_view,
    ),
    components(schemas(
        health::HealthResponse,
        pages::PageSummary,
        PageViewRequest,
        PageViewResponse,
        PaginationRequest,
        PaginationMeta,
        PageDetails,
        TableHeader,
        SavedFilterSummary,
        FilterConfigEntry,
        FilterArchetype,
        FilterInput,
        ModalityInput,
        PageConfig,
        SavedFilter,
    ))
)]
struct ApiDoc;

/// Serve the OpenAPI specification as JSON
pub async fn openapi_json() -> impl IntoResponse {
    (
        [(header::CONTENT_TYPE, "application/json")],
        Json(ApiDoc::openapi()),
    )
}
