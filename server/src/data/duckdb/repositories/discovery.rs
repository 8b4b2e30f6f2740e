//! Text column probing for filter option discovery

use duckdb::Connection;

use crate::core::constants::{FILTER_LIST_MAX_OPTIONS, FILTER_TOP_VALUES};
use crate::data::duckdb::DuckdbError;
use crate::data::duckdb::filters::types::FilterArchetype;
use crate::utils::sql::quote_ident;

/// Probe a text column and classify it.
///
/// Low-cardinality columns (at most [`FILTER_LIST_MAX_OPTIONS`] distinct
/// non-empty values by `approx_count_distinct`) become `List` with every
/// distinct value sorted ascending. Anything wider becomes `FreeText`
/// carrying the [`FILTER_TOP_VALUES`] most frequent values as suggestions.
pub fn text_column_options(
    conn: &Connection,
    table: &str,
    column: &str,
) -> Result<(FilterArchetype, Vec<String>), DuckdbError> {
    let col = quote_ident(column);
    let tbl = quote_ident(table);

    let approx: u64 = conn.query_row(
        &format!(
            "SELECT approx_count_distinct({col}) FROM {tbl} \
             WHERE {col} IS NOT NULL AND CAST({col} AS VARCHAR) != ''"
        ),
        [],
        |row| row.get(0),
    )?;

    if approx <= FILTER_LIST_MAX_OPTIONS {
        let options = collect_strings(
            conn,
            &format!(
                "SELECT DISTINCT CAST({col} AS VARCHAR) AS v FROM {tbl} \
                 WHERE {col} IS NOT NULL AND CAST({col} AS VARCHAR) != '' \
                 ORDER BY v LIMIT {FILTER_LIST_MAX_OPTIONS}"
            ),
        )?;
        Ok((FilterArchetype::List, options))
    } else {
        let options = collect_strings(
            conn,
            &format!(
                "SELECT CAST({col} AS VARCHAR) AS v FROM {tbl} \
                 WHERE {col} IS NOT NULL AND CAST({col} AS VARCHAR) != '' \
                 GROUP BY v ORDER BY COUNT(*) DESC, v LIMIT {FILTER_TOP_VALUES}"
            ),
        )?;
        Ok((FilterArchetype::FreeText, options))
    }
}

fn collect_strings(conn: &Connection, sql: &str) -> Result<Vec<String>, DuckdbError> {
    let mut stmt = conn.prepare(sql)?;
    let rows = stmt.query_map([], |row| row.get::<_, String>(0))?;
    let mut out = vec![];
    for row in rows {
        out.push(row?);
    }
    Ok(out)
}
