//! # Listing Filters
//!
//! Builds the `WHERE` and `ORDER BY` clauses for document listings.
//!
//! ## Query Shape
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  Filter::new()                                                          │
//! │      .eq("$.species", "dog")         json_extract(doc,'$.species') = ?  │
//! │      .contains("$.breed", "lab")     instr(lower(...), lower(?)) > 0    │
//! │      .gte("$.age", 2)                json_extract(doc,'$.age') >= ?     │
//! │                                                                         │
//! │  Sort::Field { path: "$.age", desc: true }                              │
//! │                                      ORDER BY json_extract(...) DESC,   │
//! │                                               created_at DESC           │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! JSON paths are always `&'static str` chosen by repository code and are
//! pushed into the SQL verbatim. Every user-supplied value goes through
//! `push_bind`.

use serde::Serialize;
use sqlx::{QueryBuilder, Sqlite};

use pawmart_core::types::Pagination;

// =============================================================================
// Values
// =============================================================================

/// A bindable filter value.
#[derive(Debug, Clone, PartialEq)]
pub enum FilterValue {
    Text(String),
    Int(i64),
    /// Stored by SQLite's JSON functions as 0/1.
    Bool(bool),
}

impl From<&str> for FilterValue {
    fn from(value: &str) -> Self {
        FilterValue::Text(value.to_string())
    }
}

impl From<String> for FilterValue {
    fn from(value: String) -> Self {
        FilterValue::Text(value)
    }
}

impl From<i64> for FilterValue {
    fn from(value: i64) -> Self {
        FilterValue::Int(value)
    }
}

impl From<u32> for FilterValue {
    fn from(value: u32) -> Self {
        FilterValue::Int(value as i64)
    }
}

impl From<bool> for FilterValue {
    fn from(value: bool) -> Self {
        FilterValue::Bool(value)
    }
}

impl FilterValue {
    fn push_bind(&self, qb: &mut QueryBuilder<'_, Sqlite>) {
        match self {
            FilterValue::Text(s) => qb.push_bind(s.clone()),
            FilterValue::Int(i) => qb.push_bind(*i),
            FilterValue::Bool(b) => qb.push_bind(*b as i64),
        };
    }
}

// =============================================================================
// Conditions
// =============================================================================

#[derive(Debug, Clone, PartialEq)]
pub enum Condition {
    Eq(&'static str, FilterValue),
    Gt(&'static str, FilterValue),
    Gte(&'static str, FilterValue),
    Lte(&'static str, FilterValue),
    /// Case-insensitive substring match on a text field.
    Contains(&'static str, String),
    In(&'static str, Vec<FilterValue>),
}

/// A conjunction of conditions. An empty filter matches everything.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Filter {
    conditions: Vec<Condition>,
}

impl Filter {
    pub fn new() -> Self {
        Filter::default()
    }

    pub fn eq(mut self, path: &'static str, value: impl Into<FilterValue>) -> Self {
        self.conditions.push(Condition::Eq(path, value.into()));
        self
    }

    /// Adds an equality condition when `value` is present.
    pub fn eq_opt<V: Into<FilterValue>>(self, path: &'static str, value: Option<V>) -> Self {
        match value {
            Some(v) => self.eq(path, v),
            None => self,
        }
    }

    pub fn gt(mut self, path: &'static str, value: impl Into<FilterValue>) -> Self {
        self.conditions.push(Condition::Gt(path, value.into()));
        self
    }

    pub fn gte_opt<V: Into<FilterValue>>(mut self, path: &'static str, value: Option<V>) -> Self {
        if let Some(v) = value {
            self.conditions.push(Condition::Gte(path, v.into()));
        }
        self
    }

    pub fn lte_opt<V: Into<FilterValue>>(mut self, path: &'static str, value: Option<V>) -> Self {
        if let Some(v) = value {
            self.conditions.push(Condition::Lte(path, v.into()));
        }
        self
    }

    /// Adds a substring condition when `needle` is present and non-blank.
    pub fn contains_opt(mut self, path: &'static str, needle: Option<&str>) -> Self {
        if let Some(n) = needle.map(str::trim).filter(|n| !n.is_empty()) {
            self.conditions.push(Condition::Contains(path, n.to_string()));
        }
        self
    }

    pub fn one_of(mut self, path: &'static str, values: Vec<FilterValue>) -> Self {
        self.conditions.push(Condition::In(path, values));
        self
    }

    pub fn is_empty(&self) -> bool {
        self.conditions.is_empty()
    }

    pub fn conditions(&self) -> &[Condition] {
        &self.conditions
    }

    /// Appends ` WHERE …` (or nothing for an empty filter).
    pub fn push_where(&self, qb: &mut QueryBuilder<'_, Sqlite>) {
        for (i, condition) in self.conditions.iter().enumerate() {
            qb.push(if i == 0 { " WHERE " } else { " AND " });

            match condition {
                Condition::Eq(path, v) => {
                    push_extract(qb, path);
                    qb.push(" = ");
                    v.push_bind(qb);
                }
                Condition::Gt(path, v) => {
                    push_extract(qb, path);
                    qb.push(" > ");
                    v.push_bind(qb);
                }
                Condition::Gte(path, v) => {
                    push_extract(qb, path);
                    qb.push(" >= ");
                    v.push_bind(qb);
                }
                Condition::Lte(path, v) => {
                    push_extract(qb, path);
                    qb.push(" <= ");
                    v.push_bind(qb);
                }
                Condition::Contains(path, needle) => {
                    qb.push("instr(lower(");
                    push_extract(qb, path);
                    qb.push("), lower(");
                    qb.push_bind(needle.clone());
                    qb.push(")) > 0");
                }
                Condition::In(path, values) => {
                    if values.is_empty() {
                        qb.push("0");
                        continue;
                    }
                    push_extract(qb, path);
                    qb.push(" IN (");
                    for (j, v) in values.iter().enumerate() {
                        if j > 0 {
                            qb.push(", ");
                        }
                        v.push_bind(qb);
                    }
                    qb.push(")");
                }
            }
        }
    }
}

fn push_extract(qb: &mut QueryBuilder<'_, Sqlite>, path: &'static str) {
    qb.push("json_extract(doc, '").push(path).push("')");
}

// =============================================================================
// Sorting
// =============================================================================

/// Listing order. Ties always fall back to newest first.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Sort {
    #[default]
    Newest,
    Oldest,
    Field { path: &'static str, desc: bool },
}

impl Sort {
    pub fn asc(path: &'static str) -> Self {
        Sort::Field { path, desc: false }
    }

    pub fn desc(path: &'static str) -> Self {
        Sort::Field { path, desc: true }
    }

    pub fn push_order_by(&self, qb: &mut QueryBuilder<'_, Sqlite>) {
        match self {
            Sort::Newest => {
                qb.push(" ORDER BY created_at DESC, rowid DESC");
            }
            Sort::Oldest => {
                qb.push(" ORDER BY created_at ASC, rowid ASC");
            }
            Sort::Field { path, desc } => {
                qb.push(" ORDER BY ");
                push_extract(qb, path);
                qb.push(if *desc { " DESC" } else { " ASC" });
                qb.push(", created_at DESC, rowid DESC");
            }
        }
    }
}

// =============================================================================
// Page
// =============================================================================

/// One page of a listing.
#[derive(Debug, Clone, Serialize)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub pagination: Pagination,
}

impl<T> Page<T> {
    pub fn map<U>(self, f: impl FnMut(T) -> U) -> Page<U> {
        Page {
            items: self.items.into_iter().map(f).collect(),
            pagination: self.pagination,
        }
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
