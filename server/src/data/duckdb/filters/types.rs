//! Filter type definitions
//!
//! Defines the filter archetypes, the lenient wire shape for filter
//! definitions, and the normalized constraint union the compiler works on.
//! All normalization happens here, at the construction boundary: the
//! compiler never sees a loose bag of `{type, modality, values}`.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::data::duckdb::schema::PrimitiveType;

/// Filter behavior family assigned to a column
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, utoipa::ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum FilterArchetype {
    FreeText,
    Numeric,
    Date,
    List,
    Boolean,
}

/// Where a filter definition came from.
///
/// Saved definitions are operator-authored page configuration; user
/// definitions arrive with the request. The two compile identically except
/// for the literal empty-token shortcut (user only) and error policy
/// (operator typos degrade, user typos surface).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Provenance {
    Saved,
    User,
}

/// Modality as it arrives on the wire: a bare string or a one-element list
#[derive(Debug, Clone, Serialize, Deserialize, utoipa::ToSchema)]
#[serde(untagged)]
pub enum ModalityInput {
    One(String),
    Many(Vec<String>),
}

impl ModalityInput {
    /// Normalize to a lowercase trimmed string
    pub fn normalized(&self) -> Option<String> {
        let raw = match self {
            Self::One(s) => Some(s.as_str()),
            Self::Many(v) => v.first().map(String::as_str),
        };
        raw.map(|s| s.trim().to_lowercase()).filter(|s| !s.is_empty())
    }
}

/// One column's filter choice as authored by an operator or sent by the UI
#[derive(Debug, Clone, Default, Serialize, Deserialize, utoipa::ToSchema)]
pub struct FilterInput {
    /// Archetype hint; defaults from the column's declared type when absent
    #[serde(default, alias = "type", alias = "filterType", skip_serializing_if = "Option::is_none")]
    pub archetype: Option<FilterArchetype>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub modality: Option<ModalityInput>,
    #[serde(default)]
    pub values: Vec<serde_json::Value>,
}

/// Text match operator within the FreeText archetype
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TextMatch {
    Exact,
    StartsWith,
    Contains,
}

/// Relative date vocabulary offered as Date quick-pick options
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DateToken {
    Today,
    Yesterday,
    Tomorrow,
    Last7Days,
    Next7Days,
    ThisMonth,
    LastMonth,
    NextMonth,
}

impl DateToken {
    /// Parse a quick-pick token, case-insensitively
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "today" => Some(Self::Today),
            "yesterday" => Some(Self::Yesterday),
            "tomorrow" => Some(Self::Tomorrow),
            "last 7 days" => Some(Self::Last7Days),
            "next 7 days" => Some(Self::Next7Days),
            "this month" => Some(Self::ThisMonth),
            "last month" => Some(Self::LastMonth),
            "next month" => Some(Self::NextMonth),
            _ => None,
        }
    }
}

/// Numeric comparison within the Numeric archetype
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum NumberConstraint {
    Eq(f64),
    Gt(f64),
    Lt(f64),
    Between(f64, f64),
}

/// Date comparison within the Date archetype
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DateConstraint {
    Eq(NaiveDate),
    Before(NaiveDate),
    After(NaiveDate),
    Between(NaiveDate, NaiveDate),
    Token(DateToken),
}

/// Normalized filter constraint; one variant per compiled shape
#[derive(Debug, Clone, PartialEq)]
pub enum Constraint {
    /// No actionable constraint; compiles to nothing
    None,
    Empty,
    NotEmpty,
    /// Membership test over opaque literals
    List(Vec<String>),
    Boolean(bool),
    Number(NumberConstraint),
    /// Percentile-rank token (`top 10%` / `bottom 10%`)
    Percentile { top: bool },
    Date(DateConstraint),
    Text { matcher: TextMatch, value: String },
}

/// A normalized filter definition ready for compilation
#[derive(Debug, Clone, PartialEq)]
pub struct FilterDefinition {
    pub column: String,
    pub constraint: Constraint,
}

/// Errors raised while normalizing a filter definition
#[derive(Error, Debug)]
pub enum FilterError {
    #[error("column {column}: non-numeric literal {literal:?} for numeric filter")]
    BadNumericLiteral { column: String, literal: String },

    #[error("column {column}: numeric 'between' requires two values, got {got}")]
    BadNumericArity { column: String, got: usize },
}

/// Render a JSON literal from a values list as a plain string
fn literal_to_string(v: &serde_json::Value) -> Option<String> {
    match v {
        serde_json::Value::String(s) => Some(s.clone()),
        serde_json::Value::Number(n) => Some(n.to_string()),
        serde_json::Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

fn parse_bool_literal(s: &str) -> Option<bool> {
    match s.trim().to_lowercase().as_str() {
        "true" | "1" => Some(true),
        "false" | "0" => Some(false),
        _ => None,
    }
}

fn parse_number_literal(column: &str, s: &str) -> Result<f64, FilterError> {
    s.trim().parse::<f64>().map_err(|_| FilterError::BadNumericLiteral {
        column: column.to_string(),
        literal: s.to_string(),
    })
}

/// Parse a date literal, accepting `YYYY-MM-DD` or any ISO timestamp whose
/// first ten characters are a date.
fn parse_date_literal(s: &str) -> Option<NaiveDate> {
    let trimmed = s.trim();
    let head: String = trimmed.chars().take(10).collect();
    NaiveDate::parse_from_str(&head, "%Y-%m-%d").ok()
}

/// Case-insensitive match for the literal Empty / Not Empty pseudo-options
fn as_empty_token(s: &str) -> Option<Constraint> {
    match s.trim().to_lowercase().as_str() {
        "empty" => Some(Constraint::Empty),
        "not empty" => Some(Constraint::NotEmpty),
        _ => None,
    }
}

impl FilterDefinition {
    /// Normalize one wire definition into a typed constraint.
    ///
    /// Resolution order, first match wins:
    /// 1. literal Empty / Not Empty value (user provenance only)
    /// 2. empty / not-empty modality (any declared type except DateTime)
    /// 3. List archetype membership
    /// 4. Boolean equality
    /// 5. Numeric comparison (percentile tokens, then modality-driven ops)
    /// 6. Date comparison (literal bounds or relative tokens)
    /// 7. FreeText match
    ///
    /// Definitions that carry no actionable constraint normalize to
    /// `Constraint::None`; only numeric coercion failures are errors.
    pub fn normalize(
        column: &str,
        declared: PrimitiveType,
        input: &FilterInput,
        provenance: Provenance,
    ) -> Result<Self, FilterError> {
        let constraint = Self::normalize_constraint(column, declared, input, provenance)?;
        Ok(Self {
            column: column.to_string(),
            constraint,
        })
    }

    fn normalize_constraint(
        column: &str,
        declared: PrimitiveType,
        input: &FilterInput,
        provenance: Provenance,
    ) -> Result<Constraint, FilterError> {
        let values: Vec<String> = input.values.iter().filter_map(literal_to_string).collect();
        let modality = input.modality.as_ref().and_then(ModalityInput::normalized);

        // 1. Literal empty-token shortcut, regardless of declared type
        if provenance == Provenance::User
            && values.len() == 1
            && let Some(c) = as_empty_token(&values[0])
        {
            return Ok(c);
        }

        // 2. Modality-driven empty / not-empty (dates keep their own path)
        if declared != PrimitiveType::DateTime
            && let Some(m) = modality.as_deref()
        {
            match m {
                "is_null" | "empty" | "is empty" => return Ok(Constraint::Empty),
                "is_not_null" | "not_empty" | "is not empty" => return Ok(Constraint::NotEmpty),
                _ => {}
            }
        }

        // 3. List membership over opaque literals
        if input.archetype == Some(FilterArchetype::List) {
            return Ok(if values.is_empty() {
                Constraint::None
            } else {
                Constraint::List(values)
            });
        }

        match declared {
            // 4. Boolean equality, exactly one value
            PrimitiveType::Boolean => Ok(values
                .first()
                .filter(|_| values.len() == 1)
                .and_then(|v| parse_bool_literal(v))
                .map(Constraint::Boolean)
                .unwrap_or(Constraint::None)),

            // 5. Numeric comparison
            PrimitiveType::Integer | PrimitiveType::Float => {
                Self::normalize_numeric(column, &values, modality.as_deref())
            }

            // 6. Date comparison
            PrimitiveType::DateTime => {
                Ok(Self::normalize_date(column, &values, modality.as_deref()))
            }

            // 7. FreeText fallback
            _ => Ok(Self::normalize_text(&values, modality.as_deref())),
        }
    }

    fn normalize_numeric(
        column: &str,
        values: &[String],
        modality: Option<&str>,
    ) -> Result<Constraint, FilterError> {
        let Some(first) = values.first() else {
            return Ok(Constraint::None);
        };

        // Percentile quick-pick tokens take priority over coercion
        match first.trim().to_lowercase().as_str() {
            "top 10%" => return Ok(Constraint::Percentile { top: true }),
            "bottom 10%" => return Ok(Constraint::Percentile { top: false }),
            _ => {}
        }

        let n0 = parse_number_literal(column, first)?;
        let constraint = match modality {
            Some("greater than" | "greater_than" | ">") => NumberConstraint::Gt(n0),
            Some("less than" | "less_than" | "<") => NumberConstraint::Lt(n0),
            Some("between") => {
                let Some(second) = values.get(1) else {
                    return Err(FilterError::BadNumericArity {
                        column: column.to_string(),
                        got: values.len(),
                    });
                };
                NumberConstraint::Between(n0, parse_number_literal(column, second)?)
            }
            _ => NumberConstraint::Eq(n0),
        };
        Ok(Constraint::Number(constraint))
    }

    fn normalize_date(column: &str, values: &[String], modality: Option<&str>) -> Constraint {
        let Some(first) = values.first() else {
            return Constraint::None;
        };

        match modality {
            Some("before") => match parse_date_literal(first) {
                Some(d) => Constraint::Date(DateConstraint::Before(d)),
                None => Self::unparseable_date(column, first),
            },
            Some("after") => match parse_date_literal(first) {
                Some(d) => Constraint::Date(DateConstraint::After(d)),
                None => Self::unparseable_date(column, first),
            },
            Some("between") => {
                let second = values.get(1).map(String::as_str).unwrap_or_default();
                match (parse_date_literal(first), parse_date_literal(second)) {
                    (Some(lo), Some(hi)) => Constraint::Date(DateConstraint::Between(lo, hi)),
                    (None, _) => Self::unparseable_date(column, first),
                    (_, None) => Self::unparseable_date(column, second),
                }
            }
            _ => {
                // No range modality: try the relative vocabulary first,
                // then a literal date; anything else is silently omitted.
                if let Some(token) = DateToken::parse(first) {
                    Constraint::Date(DateConstraint::Token(token))
                } else if let Some(d) = parse_date_literal(first) {
                    Constraint::Date(DateConstraint::Eq(d))
                } else {
                    tracing::warn!(column, value = %first, "Unrecognized date filter value, skipping");
                    Constraint::None
                }
            }
        }
    }

    fn unparseable_date(column: &str, value: &str) -> Constraint {
        tracing::warn!(column, value, "Unparseable date literal, skipping filter");
        Constraint::None
    }

    fn normalize_text(values: &[String], modality: Option<&str>) -> Constraint {
        let Some(first) = values.first() else {
            return Constraint::None;
        };
        let matcher = match modality {
            Some("exact") => TextMatch::Exact,
            Some("starts with" | "starts_with") => TextMatch::StartsWith,
            _ => TextMatch::Contains,
        };
        Constraint::Text {
            matcher,
            value: first.clone(),
        }
    }
}
