//! Filter configuration discovery
//!
//! Builds the per-column filter configuration a page advertises: one entry
//! per filterable column, with an archetype and the option vocabulary the
//! client renders. Text columns require a data probe; every other type has
//! a fixed vocabulary.

use std::sync::Arc;

use futures::future::join_all;
use serde::Serialize;

use crate::data::duckdb::DuckdbService;
use crate::data::duckdb::repositories::discovery::text_column_options;
use crate::data::duckdb::schema::{ColumnDescriptor, PrimitiveType};

use super::types::FilterArchetype;

pub const NUMERIC_OPTIONS: [&str; 2] = ["Top 10%", "Bottom 10%"];

pub const DATE_OPTIONS: [&str; 8] = [
    "Today",
    "Yesterday",
    "Tomorrow",
    "Last 7 days",
    "Next 7 days",
    "This month",
    "Last month",
    "Next month",
];

pub const BOOLEAN_OPTIONS: [&str; 2] = ["True", "False"];

pub const EMPTY_FALLBACK_OPTIONS: [&str; 2] = ["Empty", "Not Empty"];

/// One column's advertised filter configuration.
#[derive(Debug, Clone, Serialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct FilterConfigEntry {
    pub column_name: String,
    pub filter_type: FilterArchetype,
    pub options: Vec<String>,
}

/// Discover the filter configuration for every filterable column.
///
/// Text columns are probed concurrently; a probe failure degrades that one
/// column to `FreeText` with no suggestions instead of failing the page.
/// Output order follows the schema's column order.
pub async fn discover_filter_config(
    db: &Arc<DuckdbService>,
    table: &str,
    columns: &[ColumnDescriptor],
) -> Vec<FilterConfigEntry> {
    let entries = columns
        .iter()
        .filter(|c| c.primitive_type.is_filterable())
        .map(|c| column_entry(db, table, c));
    join_all(entries).await
}

async fn column_entry(
    db: &Arc<DuckdbService>,
    table: &str,
    column: &ColumnDescriptor,
) -> FilterConfigEntry {
    let (filter_type, options) = match column.primitive_type {
        PrimitiveType::Text => text_entry(db, table, &column.name).await,
        PrimitiveType::Integer | PrimitiveType::Float => {
            (FilterArchetype::Numeric, to_vec(&NUMERIC_OPTIONS))
        }
        PrimitiveType::DateTime => (FilterArchetype::Date, to_vec(&DATE_OPTIONS)),
        PrimitiveType::Boolean => (FilterArchetype::Boolean, to_vec(&BOOLEAN_OPTIONS)),
        // filtered out by the caller
        PrimitiveType::Record => (FilterArchetype::FreeText, vec![]),
    };

    let options = if options.is_empty() {
        to_vec(&EMPTY_FALLBACK_OPTIONS)
    } else {
        options
    };

    FilterConfigEntry {
        column_name: column.name.clone(),
        filter_type,
        options,
    }
}

async fn text_entry(
    db: &Arc<DuckdbService>,
    table: &str,
    column: &str,
) -> (FilterArchetype, Vec<String>) {
    let table = table.to_string();
    let column_owned = column.to_string();
    let probed = db
        .run_query(move |conn| text_column_options(conn, &table, &column_owned))
        .await;
    match probed {
        Ok(result) => result,
        Err(e) => {
            tracing::warn!(column, error = %e, "Filter option probe failed, degrading to free text");
            (FilterArchetype::FreeText, vec![])
        }
    }
}

fn to_vec(options: &[&str]) -> Vec<String> {
    options.iter().map(|s| s.to_string()).collect()
}
