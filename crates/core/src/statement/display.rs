//! Flattening of statement trees into table rows.

use std::collections::HashSet;

use rust_decimal::Decimal;
use serde::Serialize;

use super::types::BudgetRow;

/// Which rows of a statement table are expanded.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExpansionState {
    expanded: HashSet<String>,
}

impl ExpansionState {
    /// Creates a state with every row collapsed.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a state with every row that has children expanded.
    #[must_use]
    pub fn expand_all(rows: &[BudgetRow]) -> Self {
        fn collect(rows: &[BudgetRow], expanded: &mut HashSet<String>) {
            for row in rows.iter().filter(|row| row.has_children()) {
                expanded.insert(row.id.clone());
                collect(&row.children, expanded);
            }
        }

        let mut expanded = HashSet::new();
        collect(rows, &mut expanded);
        Self { expanded }
    }

    /// Expands a row.
    pub fn expand(&mut self, id: &str) {
        self.expanded.insert(id.to_string());
    }

    /// Collapses a row.
    pub fn collapse(&mut self, id: &str) {
        self.expanded.remove(id);
    }

    /// Flips a row and returns whether it is now expanded.
    pub fn toggle(&mut self, id: &str) -> bool {
        if self.expanded.remove(id) {
            false
        } else {
            self.expanded.insert(id.to_string());
            true
        }
    }

    /// Whether a row is expanded.
    #[must_use]
    pub fn is_expanded(&self, id: &str) -> bool {
        self.expanded.contains(id)
    }
}

/// A display-ready statement row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FlatRow {
    /// Row id.
    pub id: String,
    /// Display label.
    pub title: String,
    /// Nesting depth, 0 for top-level sections.
    pub depth: usize,
    /// Whether the row has children (shows an expand control).
    pub has_children: bool,
    /// Whether the row's children are shown.
    pub is_expanded: bool,
    /// First quarter figure.
    #[serde(with = "rust_decimal::serde::float_option")]
    pub q1: Option<Decimal>,
    /// Second quarter figure.
    #[serde(with = "rust_decimal::serde::float_option")]
    pub q2: Option<Decimal>,
    /// Third quarter figure.
    #[serde(with = "rust_decimal::serde::float_option")]
    pub q3: Option<Decimal>,
    /// Fourth quarter figure.
    #[serde(with = "rust_decimal::serde::float_option")]
    pub q4: Option<Decimal>,
    /// Cumulative balance.
    #[serde(with = "rust_decimal::serde::float_option")]
    pub cumulative_balance: Option<Decimal>,
    /// Category row.
    pub is_category: bool,
    /// Accepts direct entry.
    pub is_editable: bool,
    /// Notes.
    pub comments: Option<String>,
}

/// Flattens a statement depth-first, omitting children of collapsed rows.
#[must_use]
pub fn flatten(rows: &[BudgetRow], state: &ExpansionState) -> Vec<FlatRow> {
    let mut flat = Vec::new();
    push_rows(rows, 0, state, &mut flat);
    flat
}

fn push_rows(rows: &[BudgetRow], depth: usize, state: &ExpansionState, flat: &mut Vec<FlatRow>) {
    for row in rows {
        let is_expanded = row.has_children() && state.is_expanded(&row.id);
        flat.push(FlatRow {
            id: row.id.clone(),
            title: row.title.clone(),
            depth,
            has_children: row.has_children(),
            is_expanded,
            q1: row.q1,
            q2: row.q2,
            q3: row.q3,
            q4: row.q4,
            cumulative_balance: row.cumulative_balance,
            is_category: row.is_category,
            is_editable: row.is_editable,
            comments: row.comments.clone(),
        });
        if is_expanded {
            push_rows(&row.children, depth + 1, state, flat);
        }
    }
}
