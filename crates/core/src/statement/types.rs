//! Statement data types.

use fundline_shared::types::{FacilityId, StatementId, sum_present};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::anchor::Anchor;

/// A reporting quarter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Quarter {
    /// First quarter.
    Q1,
    /// Second quarter.
    Q2,
    /// Third quarter.
    Q3,
    /// Fourth quarter.
    Q4,
}

impl Quarter {
    /// All quarters in order.
    pub const ALL: [Self; 4] = [Self::Q1, Self::Q2, Self::Q3, Self::Q4];
}

/// A node in a budget statement tree.
///
/// `q1..q4` of a category row and `cumulative_balance` of every row are
/// derived figures: they are recomputed by the totals engine and never
/// trusted from input.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BudgetRow {
    /// Stable identifier, unique within the statement.
    pub id: String,
    /// Display label.
    pub title: String,
    /// First quarter figure.
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        with = "rust_decimal::serde::float_option"
    )]
    pub q1: Option<Decimal>,
    /// Second quarter figure.
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        with = "rust_decimal::serde::float_option"
    )]
    pub q2: Option<Decimal>,
    /// Third quarter figure.
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        with = "rust_decimal::serde::float_option"
    )]
    pub q3: Option<Decimal>,
    /// Fourth quarter figure.
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        with = "rust_decimal::serde::float_option"
    )]
    pub q4: Option<Decimal>,
    /// Sum of the row's four quarters.
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        with = "rust_decimal::serde::float_option"
    )]
    pub cumulative_balance: Option<Decimal>,
    /// Quarters are the sum of the children's quarters.
    #[serde(default)]
    pub is_category: bool,
    /// Quarters may be entered by a person.
    #[serde(default = "default_editable")]
    pub is_editable: bool,
    /// Child rows, in display order.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<BudgetRow>,
    /// Free-text notes.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub comments: Option<String>,
}

fn default_editable() -> bool {
    true
}

impl BudgetRow {
    /// Creates an editable leaf row with no figures.
    pub fn line_item(id: impl Into<String>, title: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            q1: None,
            q2: None,
            q3: None,
            q4: None,
            cumulative_balance: None,
            is_category: false,
            is_editable: true,
            children: Vec::new(),
            comments: None,
        }
    }

    /// Creates a category row whose figures roll up from `children`.
    pub fn category(
        id: impl Into<String>,
        title: impl Into<String>,
        children: Vec<BudgetRow>,
    ) -> Self {
        Self {
            is_category: true,
            is_editable: false,
            children,
            ..Self::line_item(id, title)
        }
    }

    /// Creates a read-only row filled in by a cross-row formula.
    #[must_use]
    pub fn computed(anchor: Anchor) -> Self {
        Self {
            is_editable: false,
            ..Self::line_item(anchor.id(), anchor.title())
        }
    }

    /// Replaces the children.
    #[must_use]
    pub fn with_children(mut self, children: Vec<BudgetRow>) -> Self {
        self.children = children;
        self
    }

    /// Sets one quarter figure.
    #[must_use]
    pub fn with_quarter(mut self, quarter: Quarter, value: impl Into<Option<Decimal>>) -> Self {
        self.set_quarter(quarter, value.into());
        self
    }

    /// Returns the figure for a quarter.
    #[must_use]
    pub const fn quarter(&self, quarter: Quarter) -> Option<Decimal> {
        match quarter {
            Quarter::Q1 => self.q1,
            Quarter::Q2 => self.q2,
            Quarter::Q3 => self.q3,
            Quarter::Q4 => self.q4,
        }
    }

    /// Sets the figure for a quarter.
    pub fn set_quarter(&mut self, quarter: Quarter, value: Option<Decimal>) {
        match quarter {
            Quarter::Q1 => self.q1 = value,
            Quarter::Q2 => self.q2 = value,
            Quarter::Q3 => self.q3 = value,
            Quarter::Q4 => self.q4 = value,
        }
    }

    /// Returns the four quarter figures in order.
    #[must_use]
    pub const fn quarters(&self) -> [Option<Decimal>; 4] {
        [self.q1, self.q2, self.q3, self.q4]
    }

    /// Sums the four quarters, counting missing ones as zero.
    #[must_use]
    pub fn quarter_total(&self) -> Decimal {
        sum_present(self.quarters())
    }

    /// Whether the row has children.
    #[must_use]
    pub fn has_children(&self) -> bool {
        !self.children.is_empty()
    }

    /// Finds a row by id in this subtree, including the row itself.
    #[must_use]
    pub fn find(&self, id: &str) -> Option<&BudgetRow> {
        if self.id == id {
            return Some(self);
        }
        self.children.iter().find_map(|child| child.find(id))
    }

    /// Mutable variant of [`BudgetRow::find`].
    pub fn find_mut(&mut self, id: &str) -> Option<&mut BudgetRow> {
        if self.id == id {
            return Some(self);
        }
        self.children.iter_mut().find_map(|child| child.find_mut(id))
    }
}

/// Finds a row by id anywhere in a forest.
#[must_use]
pub fn find_row<'a>(rows: &'a [BudgetRow], id: &str) -> Option<&'a BudgetRow> {
    rows.iter().find_map(|row| row.find(id))
}

/// Finds a top-level section row by anchor.
#[must_use]
pub fn top_level(rows: &[BudgetRow], anchor: Anchor) -> Option<&BudgetRow> {
    rows.iter().find(|row| row.id == anchor.id())
}

/// One facility's budget statement for a fiscal year.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Statement {
    /// Statement ID.
    pub id: StatementId,
    /// Reporting facility.
    pub facility_id: FacilityId,
    /// Facility display name.
    pub facility_name: String,
    /// Fiscal year label, e.g. "2025/2026".
    pub fiscal_year: String,
    /// Statement rows.
    pub rows: Vec<BudgetRow>,
}

/// Headline figures of a computed statement.
///
/// Each figure is the cumulative balance of the matching section, zero when
/// the section has no value or is missing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StatementSummary {
    /// Total receipts.
    #[serde(with = "rust_decimal::serde::float")]
    pub receipts: Decimal,
    /// Total expenditures.
    #[serde(with = "rust_decimal::serde::float")]
    pub expenditures: Decimal,
    /// Surplus/deficit (floored at zero).
    #[serde(with = "rust_decimal::serde::float")]
    pub surplus_deficit: Decimal,
    /// Net financial assets (floored at zero).
    #[serde(with = "rust_decimal::serde::float")]
    pub net_financial_assets: Decimal,
    /// Closing balance, may be negative.
    #[serde(with = "rust_decimal::serde::float")]
    pub closing_balance: Decimal,
}

impl StatementSummary {
    /// Reads the headline figures from an already computed forest.
    #[must_use]
    pub fn from_rows(rows: &[BudgetRow]) -> Self {
        let balance = |anchor: Anchor| {
            top_level(rows, anchor)
                .and_then(|row| row.cumulative_balance)
                .unwrap_or(Decimal::ZERO)
        };

        Self {
            receipts: balance(Anchor::Receipts),
            expenditures: balance(Anchor::Expenditures),
            surplus_deficit: balance(Anchor::SurplusDeficit),
            net_financial_assets: balance(Anchor::NetFinancialAssets),
            closing_balance: balance(Anchor::ClosingBalance),
        }
    }
}
