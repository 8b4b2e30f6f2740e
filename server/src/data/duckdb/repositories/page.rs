//! Paginated row retrieval

use duckdb::Connection;
use serde_json::Value;

use crate::core::constants::{DEFAULT_PAGE_SIZE, MAX_PAGE_SIZE};
use crate::data::duckdb::DuckdbError;
use crate::data::duckdb::filters::predicate::{Predicate, SqlParams};
use crate::data::duckdb::rows::value_to_json;
use crate::data::duckdb::schema::ColumnDescriptor;
use crate::utils::sql::quote_ident;

/// One page of rows plus its pagination metadata.
#[derive(Debug)]
pub struct FetchedPage {
    pub rows: Vec<serde_json::Map<String, Value>>,
    pub total_records: u64,
    pub total_pages: u64,
    pub current_page: u32,
    pub page_size: u32,
}

/// Clamp a requested page number to valid range. Zero and negative mean
/// page one.
pub fn clamp_page(page: Option<i64>) -> u32 {
    page.unwrap_or(1).clamp(1, i64::from(u32::MAX)) as u32
}

/// Clamp a requested page size into `[1, MAX_PAGE_SIZE]`.
pub fn clamp_page_size(page_size: Option<i64>) -> u32 {
    page_size
        .unwrap_or(i64::from(DEFAULT_PAGE_SIZE))
        .clamp(1, i64::from(MAX_PAGE_SIZE)) as u32
}

/// Fetch one page of filterable columns, applying the combined predicate.
///
/// The count query runs alongside the row query; when it fails the total
/// degrades to the number of rows actually returned rather than failing
/// the whole request. A row query failure is fatal.
pub fn fetch_page(
    conn: &Connection,
    table: &str,
    columns: &[ColumnDescriptor],
    predicate: Option<&Predicate>,
    page: u32,
    page_size: u32,
) -> Result<FetchedPage, DuckdbError> {
    let selected: Vec<&ColumnDescriptor> = columns
        .iter()
        .filter(|c| c.primitive_type.is_filterable())
        .collect();
    let select_list = selected
        .iter()
        .map(|c| quote_ident(&c.name))
        .collect::<Vec<_>>()
        .join(", ");

    let mut params = SqlParams::default();
    let where_clause = match predicate {
        Some(p) => format!(" WHERE {}", p.to_sql(table, &mut params)),
        None => String::new(),
    };

    let tbl = quote_ident(table);
    let offset = u64::from(page - 1) * u64::from(page_size);
    let row_sql = format!(
        "SELECT {select_list} FROM {tbl}{where_clause} LIMIT {page_size} OFFSET {offset}"
    );

    let mut stmt = conn.prepare(&row_sql)?;
    let mut duck_rows = stmt.query(duckdb::params_from_iter(params.values.iter()))?;
    let mut rows = vec![];
    while let Some(row) = duck_rows.next()? {
        let mut object = serde_json::Map::new();
        for (idx, descriptor) in selected.iter().enumerate() {
            let value: duckdb::types::Value = row.get(idx)?;
            object.insert(descriptor.name.clone(), value_to_json(value));
        }
        rows.push(object);
    }

    let count_sql = format!("SELECT COUNT(*) FROM {tbl}{where_clause}");
    let total_records = match conn.query_row(
        &count_sql,
        duckdb::params_from_iter(params.values.iter()),
        |row| row.get::<_, u64>(0),
    ) {
        Ok(count) => count,
        Err(e) => {
            tracing::warn!(table, error = %e, "Count query failed, degrading total to fetched rows");
            rows.len() as u64
        }
    };

    let total_pages = total_records.div_ceil(u64::from(page_size)).max(1);

    Ok(FetchedPage {
        rows,
        total_records,
        total_pages,
        current_page: page,
        page_size,
    })
}
