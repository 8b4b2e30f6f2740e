//! Predicate compilation
//!
//! Turns normalized filter definitions into predicate fragments and
//! AND-combines a whole request's worth of them (saved filter plus user
//! filters). Pure apart from `today`, which is injected so relative date
//! tokens compile deterministically under test.

use std::collections::BTreeMap;

use chrono::NaiveDate;

use crate::data::duckdb::schema::ColumnDescriptor;
use crate::utils::time::{days_back, days_forward, month_start, next_month_range, prev_month_range};

use super::predicate::{CmpOp, Predicate};
use super::types::{
    Constraint, DateConstraint, DateToken, FilterDefinition, FilterError, FilterInput, Provenance,
    TextMatch,
};

/// Compile one definition into a predicate fragment.
///
/// Returns `None` when the definition carries no actionable constraint;
/// callers omit it from the AND chain.
pub fn compile(def: &FilterDefinition, today: NaiveDate) -> Option<Predicate> {
    let column = def.column.clone();
    match &def.constraint {
        Constraint::None => None,
        Constraint::Empty => Some(Predicate::IsEmpty { column }),
        Constraint::NotEmpty => Some(Predicate::NotEmpty { column }),
        Constraint::List(values) => Some(Predicate::In {
            column,
            values: values.clone(),
        }),
        Constraint::Boolean(value) => Some(Predicate::BoolEq { column, value: *value }),
        Constraint::Number(n) => Some(compile_number(column, n)),
        Constraint::Percentile { top } => Some(Predicate::Percentile { column, top: *top }),
        Constraint::Date(d) => Some(compile_date(column, d, today)),
        Constraint::Text { matcher, value } => Some(match matcher {
            TextMatch::Exact => Predicate::TextEq { column, value: value.clone() },
            matcher => Predicate::Like {
                column,
                matcher: *matcher,
                value: value.clone(),
            },
        }),
    }
}

fn compile_number(column: String, n: &super::types::NumberConstraint) -> Predicate {
    use super::types::NumberConstraint::*;
    match *n {
        Eq(v) => Predicate::NumberCmp { column, op: CmpOp::Eq, value: v },
        Gt(v) => Predicate::NumberCmp { column, op: CmpOp::Gt, value: v },
        Lt(v) => Predicate::NumberCmp { column, op: CmpOp::Lt, value: v },
        Between(lo, hi) => Predicate::NumberBetween { column, lo, hi },
    }
}

fn compile_date(column: String, d: &DateConstraint, today: NaiveDate) -> Predicate {
    match *d {
        DateConstraint::Eq(v) => Predicate::DateCmp { column, op: CmpOp::Eq, value: v },
        DateConstraint::Before(v) => Predicate::DateCmp { column, op: CmpOp::Lt, value: v },
        DateConstraint::After(v) => Predicate::DateCmp { column, op: CmpOp::Gt, value: v },
        DateConstraint::Between(lo, hi) => Predicate::DateBetween { column, lo, hi },
        DateConstraint::Token(token) => compile_date_token(column, token, today),
    }
}

fn compile_date_token(column: String, token: DateToken, today: NaiveDate) -> Predicate {
    match token {
        DateToken::Today => Predicate::DateCmp { column, op: CmpOp::Eq, value: today },
        DateToken::Yesterday => Predicate::DateCmp {
            column,
            op: CmpOp::Eq,
            value: days_back(today, 1),
        },
        DateToken::Tomorrow => Predicate::DateCmp {
            column,
            op: CmpOp::Eq,
            value: days_forward(today, 1),
        },
        DateToken::Last7Days => Predicate::DateBetween {
            column,
            lo: days_back(today, 7),
            hi: today,
        },
        DateToken::Next7Days => Predicate::DateBetween {
            column,
            lo: today,
            hi: days_forward(today, 7),
        },
        DateToken::ThisMonth => Predicate::DateBetween {
            column,
            lo: month_start(today),
            hi: today,
        },
        DateToken::LastMonth => {
            let (lo, hi) = prev_month_range(today);
            Predicate::DateBetween { column, lo, hi }
        }
        DateToken::NextMonth => {
            let (lo, hi) = next_month_range(today);
            Predicate::DateBetween { column, lo, hi }
        }
    }
}

/// Compile a request's saved and user filter definitions into one combined
/// predicate.
///
/// Definitions referencing columns absent from the schema are skipped with
/// a warning. Saved definitions that fail normalization are skipped too
/// (an operator typo must not take the page down); user failures bubble up.
/// Saved and user definitions on the same column both survive and are
/// ANDed, never merged or overridden.
pub fn compile_filter_set(
    columns: &[ColumnDescriptor],
    saved: Option<&BTreeMap<String, FilterInput>>,
    user: &BTreeMap<String, FilterInput>,
    today: NaiveDate,
) -> Result<Option<Predicate>, FilterError> {
    let mut fragments = vec![];

    let sources: [(Provenance, Option<&BTreeMap<String, FilterInput>>); 2] =
        [(Provenance::Saved, saved), (Provenance::User, Some(user))];

    for (provenance, defs) in sources {
        let Some(defs) = defs else { continue };
        for (column, input) in defs {
            let Some(descriptor) = columns.iter().find(|c| c.name == *column) else {
                tracing::warn!(column, "Filter references unknown column, skipping");
                continue;
            };
            if !descriptor.primitive_type.is_filterable() {
                tracing::warn!(column, "Filter references non-filterable column, skipping");
                continue;
            }

            let def = match FilterDefinition::normalize(
                column,
                descriptor.primitive_type,
                input,
                provenance,
            ) {
                Ok(def) => def,
                Err(e) if provenance == Provenance::Saved => {
                    tracing::warn!(column, error = %e, "Saved filter failed to normalize, skipping");
                    continue;
                }
                Err(e) => return Err(e),
            };

            if let Some(fragment) = compile(&def, today) {
                fragments.push(fragment);
            }
        }
    }

    Ok(Predicate::and(fragments))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::duckdb::filters::predicate::SqlParams;
    use crate::data::duckdb::filters::types::{FilterArchetype, ModalityInput, TextMatch};
    use crate::data::duckdb::schema::PrimitiveType;
    use serde_json::json;

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 3, 15).unwrap()
    }

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    fn def(column: &str, constraint: Constraint) -> FilterDefinition {
        FilterDefinition { column: column.to_string(), constraint }
    }

    #[test]
    fn none_compiles_to_nothing() {
        assert_eq!(compile(&def("c", Constraint::None), today()), None);
    }

    #[test]
    fn compile_is_idempotent() {
        let definition = def(
            "created_at",
            Constraint::Date(DateConstraint::Token(DateToken::Last7Days)),
        );
        let first = compile(&definition, today());
        let second = compile(&definition, today());
        assert_eq!(first, second);
    }

    #[test]
    fn relative_tokens_resolve_against_today() {
        let cases = [
            (DateToken::Today, Predicate::DateCmp {
                column: "c".into(),
                op: CmpOp::Eq,
                value: d(2024, 3, 15),
            }),
            (DateToken::Yesterday, Predicate::DateCmp {
                column: "c".into(),
                op: CmpOp::Eq,
                value: d(2024, 3, 14),
            }),
            (DateToken::Last7Days, Predicate::DateBetween {
                column: "c".into(),
                lo: d(2024, 3, 8),
                hi: d(2024, 3, 15),
            }),
            (DateToken::ThisMonth, Predicate::DateBetween {
                column: "c".into(),
                lo: d(2024, 3, 1),
                hi: d(2024, 3, 15),
            }),
            (DateToken::LastMonth, Predicate::DateBetween {
                column: "c".into(),
                lo: d(2024, 2, 1),
                hi: d(2024, 2, 29),
            }),
            (DateToken::NextMonth, Predicate::DateBetween {
                column: "c".into(),
                lo: d(2024, 4, 1),
                hi: d(2024, 4, 30),
            }),
        ];
        for (token, expected) in cases {
            let got = compile(
                &def("c", Constraint::Date(DateConstraint::Token(token))),
                today(),
            );
            assert_eq!(got, Some(expected));
        }
    }

    #[test]
    fn text_constraint_compiles_to_like() {
        let got = compile(
            &def("name", Constraint::Text { matcher: TextMatch::Contains, value: "ak".into() }),
            today(),
        );
        assert_eq!(
            got,
            Some(Predicate::Like {
                column: "name".into(),
                matcher: TextMatch::Contains,
                value: "ak".into()
            })
        );
    }

    fn columns() -> Vec<ColumnDescriptor> {
        vec![
            ColumnDescriptor { name: "status".into(), primitive_type: PrimitiveType::Text },
            ColumnDescriptor { name: "score".into(), primitive_type: PrimitiveType::Float },
            ColumnDescriptor { name: "payload".into(), primitive_type: PrimitiveType::Record },
        ]
    }

    fn list_input(values: &[&str]) -> FilterInput {
        FilterInput {
            archetype: Some(FilterArchetype::List),
            modality: None,
            values: values.iter().map(|v| json!(v)).collect(),
        }
    }

    #[test]
    fn saved_and_user_on_same_column_are_anded() {
        let mut saved = BTreeMap::new();
        saved.insert("status".to_string(), list_input(&["active"]));
        let mut user = BTreeMap::new();
        user.insert("status".to_string(), list_input(&["pending"]));

        let predicate = compile_filter_set(&columns(), Some(&saved), &user, today())
            .unwrap()
            .expect("both definitions must survive");

        let mut params = SqlParams::default();
        let sql = predicate.to_sql("leads", &mut params);
        assert_eq!(
            sql,
            "CAST(\"status\" AS VARCHAR) IN (?) AND CAST(\"status\" AS VARCHAR) IN (?)"
        );
        assert_eq!(params.values, vec!["active", "pending"]);
    }

    #[test]
    fn unknown_column_is_skipped() {
        let mut user = BTreeMap::new();
        user.insert("ghost".to_string(), list_input(&["x"]));
        user.insert("status".to_string(), list_input(&["active"]));

        let predicate = compile_filter_set(&columns(), None, &user, today()).unwrap();
        let mut params = SqlParams::default();
        let sql = predicate.unwrap().to_sql("leads", &mut params);
        assert_eq!(sql, "CAST(\"status\" AS VARCHAR) IN (?)");
    }

    #[test]
    fn record_column_is_skipped() {
        let mut user = BTreeMap::new();
        user.insert("payload".to_string(), list_input(&["x"]));
        assert_eq!(compile_filter_set(&columns(), None, &user, today()).unwrap(), None);
    }

    #[test]
    fn saved_coercion_failure_degrades() {
        let mut saved = BTreeMap::new();
        saved.insert(
            "score".to_string(),
            FilterInput { archetype: None, modality: None, values: vec![json!("plenty")] },
        );
        assert_eq!(compile_filter_set(&columns(), Some(&saved), &BTreeMap::new(), today()).unwrap(), None);
    }

    #[test]
    fn user_coercion_failure_is_an_error() {
        let mut user = BTreeMap::new();
        user.insert(
            "score".to_string(),
            FilterInput { archetype: None, modality: None, values: vec![json!("plenty")] },
        );
        assert!(compile_filter_set(&columns(), None, &user, today()).is_err());
    }

    #[test]
    fn no_definitions_yield_no_predicate() {
        assert_eq!(compile_filter_set(&columns(), None, &BTreeMap::new(), today()).unwrap(), None);
    }

    #[test]
    fn user_modality_list_shape_round_trips() {
        let mut user = BTreeMap::new();
        user.insert(
            "status".to_string(),
            FilterInput {
                archetype: None,
                modality: Some(ModalityInput::Many(vec!["is not empty".into()])),
                values: vec![],
            },
        );
        let predicate = compile_filter_set(&columns(), None, &user, today()).unwrap().unwrap();
        assert_eq!(predicate, Predicate::NotEmpty { column: "status".into() });
    }
}
