//! Page view orchestration
//!
//! Ties the whole request together: resolve the page, read its schema,
//! compile saved plus user filter definitions into one predicate, then run
//! option discovery and the paginated row fetch concurrently.

use std::collections::BTreeMap;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::data::duckdb::filters::types::FilterError;
use crate::data::duckdb::filters::{
    FilterConfigEntry, FilterInput, compile_filter_set, discover_filter_config,
};
use crate::data::duckdb::repositories::{clamp_page, clamp_page_size, fetch_page};
use crate::data::duckdb::schema::{ColumnDescriptor, read_columns};
use crate::data::duckdb::{DuckdbError, DuckdbService};
use crate::utils::string::humanize_column;

use super::{PageCatalog, SavedFilter};

#[derive(Debug, Clone, Default, Deserialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PageViewRequest {
    #[serde(default)]
    pub saved_filter_identifier: Option<String>,
    #[serde(default)]
    pub user_filters: BTreeMap<String, FilterInput>,
    #[serde(default)]
    pub pagination: PaginationRequest,
}

#[derive(Debug, Clone, Copy, Default, Deserialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PaginationRequest {
    /// 1-based page number; zero and negative clamp to 1
    #[serde(default)]
    pub page: Option<i64>,
    #[serde(default)]
    pub page_size: Option<i64>,
}

#[derive(Debug, Clone, Serialize, utoipa::ToSchema)]
pub struct PageDetails {
    pub title: String,
    pub subtitle: String,
}

#[derive(Debug, Clone, Serialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct TableHeader {
    pub key: String,
    pub display_name: String,
}

#[derive(Debug, Clone, Serialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SavedFilterSummary {
    pub identifier: String,
    pub display_name: String,
}

#[derive(Debug, Clone, Copy, Serialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PaginationMeta {
    pub current_page: u32,
    pub page_size: u32,
    pub total_records: u64,
    pub total_pages: u64,
}

#[derive(Debug, Serialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PageViewResponse {
    pub page_details: PageDetails,
    pub table_headers: Vec<TableHeader>,
    #[schema(value_type = Vec<Object>)]
    pub data: Vec<serde_json::Map<String, serde_json::Value>>,
    pub filter_config: Vec<FilterConfigEntry>,
    pub saved_filters: Vec<SavedFilterSummary>,
    pub pagination: PaginationMeta,
    pub applied_saved_filter: Option<SavedFilter>,
}

#[derive(Error, Debug)]
pub enum ViewError {
    #[error("Unknown page: {0}")]
    UnknownPage(String),
    #[error("Unknown saved filter: {0}")]
    UnknownSavedFilter(String),
    #[error("Table not found: {0}")]
    MissingTable(String),
    #[error(transparent)]
    Filter(#[from] FilterError),
    #[error(transparent)]
    Store(#[from] DuckdbError),
}

/// Render one page view end to end.
///
/// The page and saved filter resolve against the catalog before any store
/// work happens. Option discovery and the row fetch then run concurrently;
/// discovery failures degrade per column while a row-query failure fails
/// the request.
pub async fn render_page_view(
    db: &Arc<DuckdbService>,
    catalog: &PageCatalog,
    page_identifier: &str,
    request: PageViewRequest,
) -> Result<PageViewResponse, ViewError> {
    let page = catalog
        .page(page_identifier)
        .ok_or_else(|| ViewError::UnknownPage(page_identifier.to_string()))?;

    let applied = match &request.saved_filter_identifier {
        Some(id) => Some(
            page.saved_filter(id)
                .ok_or_else(|| ViewError::UnknownSavedFilter(id.clone()))?,
        ),
        None => None,
    };

    let table = page.table_reference.clone();
    let columns = {
        let table = table.clone();
        db.run_query(move |conn| read_columns(conn, &table)).await?
    };
    if columns.is_empty() {
        return Err(ViewError::MissingTable(table));
    }

    let today = chrono::Local::now().date_naive();
    let predicate = compile_filter_set(
        &columns,
        applied.map(|f| &f.filter_definition),
        &request.user_filters,
        today,
    )?;

    let current_page = clamp_page(request.pagination.page);
    let page_size = clamp_page_size(request.pagination.page_size);

    let fetch = {
        let table = table.clone();
        let columns = columns.clone();
        let predicate = predicate.clone();
        db.run_query(move |conn| {
            fetch_page(conn, &table, &columns, predicate.as_ref(), current_page, page_size)
        })
    };
    let (filter_config, fetched) = tokio::join!(
        discover_filter_config(db, &table, &columns),
        fetch
    );
    let fetched = fetched?;

    Ok(PageViewResponse {
        page_details: PageDetails {
            title: page.title.clone(),
            subtitle: page.subtitle.clone(),
        },
        table_headers: table_headers(&columns),
        data: fetched.rows,
        filter_config,
        saved_filters: page
            .saved_filters
            .iter()
            .map(|f| SavedFilterSummary {
                identifier: f.identifier.clone(),
                display_name: f.display_name.clone(),
            })
            .collect(),
        pagination: PaginationMeta {
            current_page: fetched.current_page,
            page_size: fetched.page_size,
            total_records: fetched.total_records,
            total_pages: fetched.total_pages,
        },
        applied_saved_filter: applied.cloned(),
    })
}

fn table_headers(columns: &[ColumnDescriptor]) -> Vec<TableHeader> {
    columns
        .iter()
        .filter(|c| c.primitive_type.is_filterable())
        .map(|c| TableHeader {
            key: c.name.clone(),
            display_name: humanize_column(&c.name),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::pages::PageConfig;
    use serde_json::json;

    async fn seeded_db() -> Arc<DuckdbService> {
        let db = Arc::new(DuckdbService::init_in_memory().unwrap());
        db.run_query(|conn| {
            conn.execute_batch(
                "CREATE TABLE leads (full_name VARCHAR, status VARCHAR, score DOUBLE);
                 INSERT INTO leads VALUES
                     ('Akira Tanaka', 'active', 9.5),
                     ('Mary Drake', 'active', 4.0),
                     ('Jon Snow', 'pending', 2.0);",
            )
            .map_err(Into::into)
        })
        .await
        .unwrap();
        db
    }

    fn catalog() -> PageCatalog {
        let saved = SavedFilter {
            identifier: "contains_ak".to_string(),
            display_name: "Name contains ak".to_string(),
            filter_definition: BTreeMap::from([(
                "full_name".to_string(),
                FilterInput {
                    modality: Some(crate::data::duckdb::filters::types::ModalityInput::One(
                        "contains".to_string(),
                    )),
                    values: vec![json!("ak")],
                    ..Default::default()
                },
            )]),
        };
        PageCatalog {
            pages: vec![PageConfig {
                page_identifier: "leads".to_string(),
                title: "Leads".to_string(),
                subtitle: "All inbound leads".to_string(),
                table_reference: "leads".to_string(),
                saved_filters: vec![saved],
            }],
        }
    }

    #[tokio::test]
    async fn renders_unfiltered_view() {
        let db = seeded_db().await;
        let response = render_page_view(&db, &catalog(), "leads", PageViewRequest::default())
            .await
            .unwrap();

        assert_eq!(response.page_details.title, "Leads");
        assert_eq!(response.data.len(), 3);
        assert_eq!(response.pagination.total_records, 3);
        assert_eq!(response.pagination.total_pages, 1);
        assert_eq!(response.table_headers[0].key, "full_name");
        assert_eq!(response.table_headers[0].display_name, "Full Name");
        assert_eq!(response.saved_filters[0].identifier, "contains_ak");
        assert!(response.applied_saved_filter.is_none());
        assert_eq!(response.filter_config.len(), 3);
        db.close().await.unwrap();
    }

    #[tokio::test]
    async fn applies_saved_filter_by_identifier() {
        let db = seeded_db().await;
        let request = PageViewRequest {
            saved_filter_identifier: Some("contains_ak".to_string()),
            ..Default::default()
        };
        let response = render_page_view(&db, &catalog(), "leads", request).await.unwrap();

        assert_eq!(response.data.len(), 2);
        assert!(response.data.iter().all(|r| {
            r["full_name"].as_str().unwrap().to_lowercase().contains("ak")
        }));
        let applied = response.applied_saved_filter.unwrap();
        assert_eq!(applied.identifier, "contains_ak");
        db.close().await.unwrap();
    }

    #[tokio::test]
    async fn saved_and_user_filters_combine() {
        let db = seeded_db().await;
        let request = PageViewRequest {
            saved_filter_identifier: Some("contains_ak".to_string()),
            user_filters: BTreeMap::from([(
                "status".to_string(),
                FilterInput {
                    archetype: Some(crate::data::duckdb::filters::FilterArchetype::List),
                    values: vec![json!("pending")],
                    ..Default::default()
                },
            )]),
            ..Default::default()
        };
        let response = render_page_view(&db, &catalog(), "leads", request).await.unwrap();
        // 'contains ak' AND status=pending matches nobody
        assert!(response.data.is_empty());
        assert_eq!(response.pagination.total_pages, 1);
        db.close().await.unwrap();
    }

    #[tokio::test]
    async fn unknown_page_resolves_before_store_access() {
        let db = Arc::new(DuckdbService::init_in_memory().unwrap());
        let err = render_page_view(&db, &catalog(), "missing", PageViewRequest::default())
            .await
            .unwrap_err();
        assert!(matches!(err, ViewError::UnknownPage(_)));
        db.close().await.unwrap();
    }

    #[tokio::test]
    async fn unknown_saved_filter_is_an_error() {
        let db = seeded_db().await;
        let request = PageViewRequest {
            saved_filter_identifier: Some("nope".to_string()),
            ..Default::default()
        };
        let err = render_page_view(&db, &catalog(), "leads", request).await.unwrap_err();
        assert!(matches!(err, ViewError::UnknownSavedFilter(_)));
        db.close().await.unwrap();
    }

    #[tokio::test]
    async fn bad_user_numeric_literal_is_a_filter_error() {
        let db = seeded_db().await;
        let request = PageViewRequest {
            user_filters: BTreeMap::from([(
                "score".to_string(),
                FilterInput { values: vec![json!("plenty")], ..Default::default() },
            )]),
            ..Default::default()
        };
        let err = render_page_view(&db, &catalog(), "leads", request).await.unwrap_err();
        assert!(matches!(err, ViewError::Filter(_)));
        db.close().await.unwrap();
    }

    #[tokio::test]
    async fn missing_table_is_reported() {
        let db = Arc::new(DuckdbService::init_in_memory().unwrap());
        let mut broken = catalog();
        broken.pages[0].table_reference = "nowhere".to_string();
        let err = render_page_view(&db, &broken, "leads", PageViewRequest::default())
            .await
            .unwrap_err();
        assert!(matches!(err, ViewError::MissingTable(_)));
        db.close().await.unwrap();
    }

    #[tokio::test]
    async fn pagination_is_clamped() {
        let db = seeded_db().await;
        let request = PageViewRequest {
            pagination: PaginationRequest { page: Some(0), page_size: Some(2) },
            ..Default::default()
        };
        let response = render_page_view(&db, &catalog(), "leads", request).await.unwrap();
        assert_eq!(response.pagination.current_page, 1);
        assert_eq!(response.data.len(), 2);
        assert_eq!(response.pagination.total_pages, 2);
        db.close().await.unwrap();
    }
}
