//! Canonical empty statement skeleton.

use super::anchor::Anchor;
use super::types::BudgetRow;

fn items(entries: &[(&str, &str)]) -> Vec<BudgetRow> {
    entries
        .iter()
        .map(|&(id, title)| BudgetRow::line_item(id, title))
        .collect()
}

fn section(anchor: Anchor, children: Vec<BudgetRow>) -> BudgetRow {
    BudgetRow::category(anchor.id(), anchor.title(), children)
}

/// Builds the canonical statement forest with every figure absent.
///
/// Sections `a`..`g` are top-level rows; `g1` and `g2` are the only editable
/// rows outside the line items, and `c`, `f`, `g`, `g3` are filled in by the
/// totals engine.
#[must_use]
pub fn build_empty_template() -> Vec<BudgetRow> {
    vec![
        section(
            Anchor::Receipts,
            items(&[("a1", "Other Incomes"), ("a2", "Transfers from SPIU/RBC")]),
        ),
        section(
            Anchor::Expenditures,
            vec![
                BudgetRow::category(
                    "b01",
                    "Human Resources + BONUS",
                    items(&[
                        ("b01-1", "Laboratory Technician A0"),
                        ("b01-2", "Nurse A1"),
                    ]),
                ),
                BudgetRow::category(
                    "b02",
                    "Monitoring & Evaluation",
                    items(&[
                        ("b02-1", "Supervision CHWs"),
                        ("b02-2", "Support group meetings"),
                    ]),
                ),
                BudgetRow::category(
                    "b03",
                    "Living Support to Clients/Target Populations",
                    items(&[
                        ("b03-1", "Sample transport"),
                        ("b03-2", "Home visit lost to follow up"),
                        ("b03-3", "Transport and travel for survey/surveillance"),
                    ]),
                ),
                BudgetRow::category(
                    "b04",
                    "Overheads (22 - Use of goods & services)",
                    items(&[
                        ("b04-1", "Infrastructure support"),
                        ("b04-2", "Office supplies"),
                        ("b04-3", "Transport and travel (reporting)"),
                        ("b04-4", "Bank charges"),
                    ]),
                ),
                BudgetRow::category(
                    "b05",
                    "Transfer to other reporting entities",
                    items(&[("b05-1", "Transfer to RBC")]),
                ),
            ],
        ),
        BudgetRow::computed(Anchor::SurplusDeficit),
        section(
            Anchor::FinancialAssets,
            items(&[
                ("d1", "Cash at bank"),
                ("d2", "Petty cash"),
                ("d3", "Receivables (VAT refund)"),
                ("d4", "Other Receivables"),
            ]),
        ),
        section(
            Anchor::FinancialLiabilities,
            items(&[
                ("e1", "Salaries on borrowed funds (BONUS)"),
                ("e2", "Payable - Maintenance & Repairs"),
                ("e3", "Payable - Office suppliers"),
                ("e4", "Payable - Transportation fees"),
                ("e5", "VAT refund to RBC"),
            ]),
        ),
        BudgetRow::computed(Anchor::NetFinancialAssets),
        BudgetRow::computed(Anchor::ClosingBalance).with_children(vec![
            BudgetRow::line_item(
                Anchor::AccumulatedSurplus.id(),
                Anchor::AccumulatedSurplus.title(),
            ),
            BudgetRow::line_item(
                Anchor::PriorYearAdjustment.id(),
                Anchor::PriorYearAdjustment.title(),
            ),
            BudgetRow::computed(Anchor::PeriodSurplus),
        ]),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::statement::engine::compute_totals;
    use crate::statement::types::{find_row, top_level};
    use std::collections::HashSet;

    fn collect_ids<'a>(rows: &'a [BudgetRow], ids: &mut Vec<&'a str>) {
        for row in rows {
            ids.push(&row.id);
            collect_ids(&row.children, ids);
        }
    }

    #[test]
    fn test_top_level_sections_in_order() {
        let template = build_empty_template();
        let ids: Vec<_> = template.iter().map(|r| r.id.as_str()).collect();
        assert_eq!(ids, vec!["a", "b", "c", "d", "e", "f", "g"]);
    }

    #[test]
    fn test_every_anchor_present() {
        let template = build_empty_template();
        for anchor in Anchor::ALL {
            match anchor.parent() {
                None => assert!(top_level(&template, anchor).is_some(), "{anchor}"),
                Some(parent) => {
                    let parent_row = top_level(&template, parent).unwrap();
                    assert!(parent_row.children.iter().any(|c| c.id == anchor.id()));
                }
            }
        }
    }

    #[test]
    fn test_ids_unique() {
        let template = build_empty_template();
        let mut ids = Vec::new();
        collect_ids(&template, &mut ids);
        let unique: HashSet<_> = ids.iter().collect();
        assert_eq!(unique.len(), ids.len());
    }

    #[test]
    fn test_editability() {
        let template = build_empty_template();
        for anchor in Anchor::ALL {
            let row = find_row(&template, anchor.id()).unwrap();
            if anchor.is_computed() {
                assert!(!row.is_editable, "{anchor} should be read-only");
            }
        }
        assert!(find_row(&template, "g1").unwrap().is_editable);
        assert!(find_row(&template, "g2").unwrap().is_editable);
        assert!(find_row(&template, "b04-2").unwrap().is_editable);
        assert!(!find_row(&template, "b04").unwrap().is_editable);
        assert!(find_row(&template, "b04").unwrap().is_category);
    }

    #[test]
    fn test_all_figures_absent() {
        let template = build_empty_template();
        let mut ids = Vec::new();
        collect_ids(&template, &mut ids);
        for id in ids {
            let row = find_row(&template, id).unwrap();
            assert_eq!(row.quarters(), [None; 4], "{id}");
            assert_eq!(row.cumulative_balance, None, "{id}");
        }
    }

    #[test]
    fn test_empty_template_computes() {
        let computed = compute_totals(&build_empty_template());

        let c = top_level(&computed, Anchor::SurplusDeficit).unwrap();
        assert_eq!(c.cumulative_balance, Some(rust_decimal::Decimal::ZERO));
        let b = top_level(&computed, Anchor::Expenditures).unwrap();
        assert_eq!(b.cumulative_balance, None);
    }
}
