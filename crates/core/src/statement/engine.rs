//! Totals engine for budget statements.
//!
//! Recomputation runs in two passes over a freshly built copy of the input:
//!
//! 1. A post-order roll-up: category rows take the sum of their children per
//!    quarter, and every row gets a cumulative balance.
//! 2. Cross-row formulas on the top-level sections: Surplus/Deficit (`c`),
//!    Net Financial Assets (`f`), then Closing Balance (`g`), which reads the
//!    already updated `c`.
//!
//! The caller's rows are never modified.

use fundline_shared::types::{clamp_non_positive_to_zero, sum_present, zero_to_absent};
use rust_decimal::Decimal;
use tracing::{debug, trace};

use super::anchor::Anchor;
use super::types::{BudgetRow, Quarter, top_level};

/// Engine that recomputes every derived figure of a statement.
pub struct TotalsEngine;

impl TotalsEngine {
    /// Recomputes category totals, cumulative balances, and the
    /// Surplus/Deficit, Net Financial Assets, and Closing Balance sections.
    ///
    /// Missing sections are tolerated: a formula whose target row is absent
    /// is skipped, and an absent source section counts as zero.
    #[must_use]
    pub fn compute(rows: &[BudgetRow]) -> Vec<BudgetRow> {
        let mut computed: Vec<BudgetRow> = rows.iter().map(Self::roll_up).collect();

        Self::apply_difference(
            &mut computed,
            Anchor::SurplusDeficit,
            Anchor::Receipts,
            Anchor::Expenditures,
        );
        Self::apply_difference(
            &mut computed,
            Anchor::NetFinancialAssets,
            Anchor::FinancialAssets,
            Anchor::FinancialLiabilities,
        );
        Self::apply_closing_balance(&mut computed);

        debug!(sections = computed.len(), "Statement totals computed");
        computed
    }

    /// Builds a new row with children rolled up first.
    fn roll_up(row: &BudgetRow) -> BudgetRow {
        let children: Vec<BudgetRow> = row.children.iter().map(Self::roll_up).collect();

        let mut rolled = BudgetRow {
            id: row.id.clone(),
            title: row.title.clone(),
            q1: row.q1,
            q2: row.q2,
            q3: row.q3,
            q4: row.q4,
            cumulative_balance: None,
            is_category: row.is_category,
            is_editable: row.is_editable,
            children,
            comments: row.comments.clone(),
        };

        if rolled.is_category && rolled.has_children() {
            for quarter in Quarter::ALL {
                let total = sum_present(rolled.children.iter().map(|c| c.quarter(quarter)));
                rolled.set_quarter(quarter, zero_to_absent(total));
            }
        }

        rolled.cumulative_balance = zero_to_absent(rolled.quarter_total());
        rolled
    }

    /// `target = minuend - subtrahend` per quarter, cumulative floored at zero.
    /// The difference saturates rather than overflowing.
    fn apply_difference(
        rows: &mut [BudgetRow],
        target: Anchor,
        minuend: Anchor,
        subtrahend: Anchor,
    ) {
        let plus = section_quarters(rows, minuend);
        let minus = section_quarters(rows, subtrahend);

        let Some(row) = top_level_mut(rows, target) else {
            trace!(anchor = %target, "Section missing, formula skipped");
            return;
        };

        for (i, quarter) in Quarter::ALL.into_iter().enumerate() {
            let value = plus[i]
                .unwrap_or_default()
                .saturating_sub(minus[i].unwrap_or_default());
            row.set_quarter(quarter, Some(value));
        }
        row.cumulative_balance = Some(clamp_non_positive_to_zero(row.quarter_total()));
    }

    /// Mirrors `c` into `g3`, then `g = g1 + g2 + g3`. Not floored.
    fn apply_closing_balance(rows: &mut [BudgetRow]) {
        let surplus = top_level(rows, Anchor::SurplusDeficit)
            .map(|row| (row.quarters(), row.cumulative_balance));

        let Some(closing) = top_level_mut(rows, Anchor::ClosingBalance) else {
            trace!(anchor = %Anchor::ClosingBalance, "Section missing, formula skipped");
            return;
        };

        if let Some(period) = child_mut(closing, Anchor::PeriodSurplus) {
            let (quarters, cumulative) = surplus.unwrap_or(([None; 4], None));
            for (i, quarter) in Quarter::ALL.into_iter().enumerate() {
                period.set_quarter(quarter, quarters[i]);
            }
            period.cumulative_balance = cumulative;
        }

        let components = [
            Anchor::AccumulatedSurplus,
            Anchor::PriorYearAdjustment,
            Anchor::PeriodSurplus,
        ];
        for quarter in Quarter::ALL {
            let total = sum_present(components.iter().map(|&anchor| {
                closing
                    .children
                    .iter()
                    .find(|child| child.id == anchor.id())
                    .and_then(|child| child.quarter(quarter))
            }));
            closing.set_quarter(quarter, Some(total));
        }
        closing.cumulative_balance = Some(closing.quarter_total());
    }
}

/// Recomputes every derived figure of a statement forest.
///
/// See [`TotalsEngine::compute`].
#[must_use]
pub fn compute_totals(rows: &[BudgetRow]) -> Vec<BudgetRow> {
    TotalsEngine::compute(rows)
}

fn section_quarters(rows: &[BudgetRow], anchor: Anchor) -> [Option<Decimal>; 4] {
    top_level(rows, anchor).map_or([None; 4], BudgetRow::quarters)
}

fn top_level_mut(rows: &mut [BudgetRow], anchor: Anchor) -> Option<&mut BudgetRow> {
    rows.iter_mut().find(|row| row.id == anchor.id())
}

fn child_mut(row: &mut BudgetRow, anchor: Anchor) -> Option<&mut BudgetRow> {
    row.children.iter_mut().find(|child| child.id == anchor.id())
}
