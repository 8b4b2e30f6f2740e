//! Predicate fragments
//!
//! A compiled filter is a small expression tree, not a SQL string. The
//! tree renders to DuckDB syntax with `?` placeholders only at the query
//! executor boundary; every literal travels through [`SqlParams`] as a
//! bound parameter.

use chrono::NaiveDate;

use crate::utils::sql::{escape_like_pattern, quote_ident};

use super::types::TextMatch;

/// Collects SQL parameters during query building (maintains insertion order)
#[derive(Debug, Default)]
pub struct SqlParams {
    pub values: Vec<String>,
}

/// Scalar comparison operator
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CmpOp {
    Eq,
    Lt,
    Gt,
}

impl CmpOp {
    fn sql(self) -> &'static str {
        match self {
            Self::Eq => "=",
            Self::Lt => "<",
            Self::Gt => ">",
        }
    }
}

/// One boolean condition over a single column, or an AND of several
#[derive(Debug, Clone, PartialEq)]
pub enum Predicate {
    /// Column is null or blank when cast to text
    IsEmpty { column: String },
    /// Negation of [`Predicate::IsEmpty`]
    NotEmpty { column: String },
    /// Membership test over opaque literals
    In { column: String, values: Vec<String> },
    BoolEq { column: String, value: bool },
    NumberCmp { column: String, op: CmpOp, value: f64 },
    NumberBetween { column: String, lo: f64, hi: f64 },
    /// Comparison on the date-truncated column; time-of-day is ignored
    DateCmp { column: String, op: CmpOp, value: NaiveDate },
    DateBetween { column: String, lo: NaiveDate, hi: NaiveDate },
    /// Case-insensitive text comparison
    TextEq { column: String, value: String },
    /// Case-insensitive LIKE with escaped metacharacters
    Like { column: String, matcher: TextMatch, value: String },
    /// Percentile-rank comparison against the whole table
    Percentile { column: String, top: bool },
    And(Vec<Predicate>),
}

impl Predicate {
    /// AND-combine fragments; empty input yields no predicate
    pub fn and(mut fragments: Vec<Predicate>) -> Option<Predicate> {
        match fragments.len() {
            0 => None,
            1 => fragments.pop(),
            _ => Some(Predicate::And(fragments)),
        }
    }

    /// Render to a DuckDB WHERE fragment with `?` placeholders.
    ///
    /// `table` is only consulted by percentile predicates, which embed a
    /// scalar subquery over the same table.
    pub fn to_sql(&self, table: &str, params: &mut SqlParams) -> String {
        match self {
            Self::IsEmpty { column } => {
                let col = quote_ident(column);
                format!("({col} IS NULL OR CAST({col} AS VARCHAR) = '')")
            }
            Self::NotEmpty { column } => {
                let col = quote_ident(column);
                format!("({col} IS NOT NULL AND CAST({col} AS VARCHAR) != '')")
            }
            Self::In { column, values } => {
                if values.is_empty() {
                    return "1=1".to_string();
                }
                let placeholders: Vec<&str> = values.iter().map(|_| "?").collect();
                params.values.extend(values.iter().cloned());
                format!(
                    "CAST({} AS VARCHAR) IN ({})",
                    quote_ident(column),
                    placeholders.join(", ")
                )
            }
            Self::BoolEq { column, value } => {
                let sql_bool = if *value { "TRUE" } else { "FALSE" };
                format!("{} = {}", quote_ident(column), sql_bool)
            }
            Self::NumberCmp { column, op, value } => {
                params.values.push(value.to_string());
                format!("{} {} ?", quote_ident(column), op.sql())
            }
            Self::NumberBetween { column, lo, hi } => {
                params.values.push(lo.to_string());
                params.values.push(hi.to_string());
                format!("{} BETWEEN ? AND ?", quote_ident(column))
            }
            Self::DateCmp { column, op, value } => {
                params.values.push(value.to_string());
                format!(
                    "CAST({} AS DATE) {} CAST(? AS DATE)",
                    quote_ident(column),
                    op.sql()
                )
            }
            Self::DateBetween { column, lo, hi } => {
                params.values.push(lo.to_string());
                params.values.push(hi.to_string());
                format!(
                    "CAST({} AS DATE) BETWEEN CAST(? AS DATE) AND CAST(? AS DATE)",
                    quote_ident(column)
                )
            }
            Self::TextEq { column, value } => {
                params.values.push(value.clone());
                format!("LOWER(CAST({} AS VARCHAR)) = LOWER(?)", quote_ident(column))
            }
            Self::Like { column, matcher, value } => {
                let escaped = escape_like_pattern(&value.to_lowercase());
                let pattern = match matcher {
                    TextMatch::Exact => escaped,
                    TextMatch::StartsWith => format!("{}%", escaped),
                    TextMatch::Contains => format!("%{}%", escaped),
                };
                params.values.push(pattern);
                format!(
                    "LOWER(CAST({} AS VARCHAR)) LIKE ? ESCAPE '\\'",
                    quote_ident(column)
                )
            }
            Self::Percentile { column, top } => {
                let col = quote_ident(column);
                let table = quote_ident(table);
                if *top {
                    format!("{col} >= (SELECT QUANTILE_CONT({col}, 0.90) FROM {table})")
                } else {
                    format!("{col} <= (SELECT QUANTILE_CONT({col}, 0.10) FROM {table})")
                }
            }
            Self::And(children) => children
                .iter()
                .map(|c| c.to_sql(table, params))
                .collect::<Vec<_>>()
                .join(" AND "),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn render(p: &Predicate) -> (String, Vec<String>) {
        let mut params = SqlParams::default();
        let sql = p.to_sql("leads", &mut params);
        (sql, params.values)
    }

    #[test]
    fn is_empty_fragment() {
        let (sql, params) = render(&Predicate::IsEmpty { column: "name".into() });
        assert_eq!(sql, "(\"name\" IS NULL OR CAST(\"name\" AS VARCHAR) = '')");
        assert!(params.is_empty());
    }

    #[test]
    fn in_fragment_binds_values() {
        let (sql, params) = render(&Predicate::In {
            column: "status".into(),
            values: vec!["active".into(), "pending".into()],
        });
        assert_eq!(sql, "CAST(\"status\" AS VARCHAR) IN (?, ?)");
        assert_eq!(params, vec!["active", "pending"]);
    }

    #[test]
    fn bool_eq_inlines_truth_literal() {
        let (sql, params) = render(&Predicate::BoolEq { column: "is_active".into(), value: false });
        assert_eq!(sql, "\"is_active\" = FALSE");
        assert!(params.is_empty());
    }

    #[test]
    fn number_cmp_binds_literal() {
        let (sql, params) = render(&Predicate::NumberCmp {
            column: "score".into(),
            op: CmpOp::Gt,
            value: 12.5,
        });
        assert_eq!(sql, "\"score\" > ?");
        assert_eq!(params, vec!["12.5"]);
    }

    #[test]
    fn number_between_inclusive() {
        let (sql, params) = render(&Predicate::NumberBetween {
            column: "score".into(),
            lo: 1.0,
            hi: 2.0,
        });
        assert_eq!(sql, "\"score\" BETWEEN ? AND ?");
        assert_eq!(params, vec!["1", "2"]);
    }

    #[test]
    fn date_cmp_truncates_column() {
        let d = chrono::NaiveDate::from_ymd_opt(2024, 3, 1).unwrap();
        let (sql, params) = render(&Predicate::DateCmp {
            column: "created_at".into(),
            op: CmpOp::Eq,
            value: d,
        });
        assert_eq!(sql, "CAST(\"created_at\" AS DATE) = CAST(? AS DATE)");
        assert_eq!(params, vec!["2024-03-01"]);
    }

    #[test]
    fn like_fragment_lowercases_and_escapes() {
        let (sql, params) = render(&Predicate::Like {
            column: "name".into(),
            matcher: TextMatch::Contains,
            value: "A_K".into(),
        });
        assert_eq!(sql, "LOWER(CAST(\"name\" AS VARCHAR)) LIKE ? ESCAPE '\\'");
        assert_eq!(params, vec!["%a\\_k%"]);
    }

    #[test]
    fn starts_with_pattern() {
        let (_, params) = render(&Predicate::Like {
            column: "name".into(),
            matcher: TextMatch::StartsWith,
            value: "Ak".into(),
        });
        assert_eq!(params, vec!["ak%"]);
    }

    #[test]
    fn percentile_embeds_subquery() {
        let (sql, params) = render(&Predicate::Percentile { column: "score".into(), top: true });
        assert_eq!(
            sql,
            "\"score\" >= (SELECT QUANTILE_CONT(\"score\", 0.90) FROM \"leads\")"
        );
        assert!(params.is_empty());
    }

    #[test]
    fn and_chain_orders_params() {
        let p = Predicate::And(vec![
            Predicate::In { column: "status".into(), values: vec!["active".into()] },
            Predicate::NumberCmp { column: "score".into(), op: CmpOp::Lt, value: 10.0 },
        ]);
        let (sql, params) = render(&p);
        assert_eq!(sql, "CAST(\"status\" AS VARCHAR) IN (?) AND \"score\" < ?");
        assert_eq!(params, vec!["active", "10"]);
    }

    #[test]
    fn and_helper_flattens_trivial_cases() {
        assert_eq!(Predicate::and(vec![]), None);
        let single = Predicate::BoolEq { column: "b".into(), value: true };
        assert_eq!(Predicate::and(vec![single.clone()]), Some(single));
    }
}
