//! Warehouse schema reader
//!
//! Resolves the ordered column list of a page's table reference, mapping
//! DuckDB type names to the primitive types the filter layer understands.

use duckdb::Connection;
use serde::Serialize;

use super::DuckdbError;

/// Primitive column type as seen by the filter layer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PrimitiveType {
    Text,
    Integer,
    Float,
    Boolean,
    DateTime,
    /// Nested or binary types; excluded from filtering and display
    Record,
}

impl PrimitiveType {
    /// Map a DuckDB declared type name (e.g. `VARCHAR`, `DECIMAL(18,3)`)
    /// to a primitive type.
    pub fn from_duckdb(type_name: &str) -> Self {
        let upper = type_name.trim().to_ascii_uppercase();
        let base = upper.split('(').next().unwrap_or("").trim();
        match base {
            "VARCHAR" | "TEXT" | "STRING" | "CHAR" | "BPCHAR" | "ENUM" | "UUID" => Self::Text,
            "TINYINT" | "SMALLINT" | "INTEGER" | "INT" | "BIGINT" | "HUGEINT" | "UTINYINT"
            | "USMALLINT" | "UINTEGER" | "UBIGINT" | "UHUGEINT" => Self::Integer,
            "FLOAT" | "REAL" | "DOUBLE" | "DECIMAL" | "NUMERIC" => Self::Float,
            "BOOLEAN" | "BOOL" => Self::Boolean,
            "DATE" | "TIME" | "TIMESTAMP" | "TIMESTAMPTZ" | "TIMESTAMP WITH TIME ZONE"
            | "DATETIME" => Self::DateTime,
            _ => Self::Record,
        }
    }

    /// Whether columns of this type participate in filtering and display
    pub fn is_filterable(&self) -> bool {
        !matches!(self, Self::Record)
    }
}

/// One column of a page's table, in declaration order
#[derive(Debug, Clone, Serialize)]
pub struct ColumnDescriptor {
    pub name: String,
    pub primitive_type: PrimitiveType,
}

/// Read the ordered column list for a table or view.
///
/// Returns every column including Record ones; callers filter with
/// [`PrimitiveType::is_filterable`]. An empty result means the table does
/// not exist.
pub fn read_columns(conn: &Connection, table: &str) -> Result<Vec<ColumnDescriptor>, DuckdbError> {
    let mut stmt = conn.prepare(
        "SELECT column_name, data_type
         FROM information_schema.columns
         WHERE table_name = ?
         ORDER BY ordinal_position",
    )?;
    let mut rows = stmt.query([table])?;

    let mut columns = vec![];
    while let Some(row) = rows.next()? {
        let name: String = row.get(0)?;
        let type_name: String = row.get(1)?;
        columns.push(ColumnDescriptor {
            name,
            primitive_type: PrimitiveType::from_duckdb(&type_name),
        });
    }

    Ok(columns)
}
