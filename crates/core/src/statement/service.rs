//! Statement service for creating and recomputing facility statements.

use fundline_shared::types::{FacilityId, StatementId};
use rayon::prelude::*;
use tracing::{debug, info};

use super::engine::compute_totals;
use super::error::StatementError;
use super::template::build_empty_template;
use super::types::{Statement, StatementSummary};
use super::validation::validate_forest;

/// Statement service for business logic.
pub struct StatementService;

impl StatementService {
    /// Creates an empty statement for a facility from the canonical template.
    pub fn create(
        facility_id: FacilityId,
        facility_name: impl Into<String>,
        fiscal_year: impl Into<String>,
    ) -> Statement {
        Statement {
            id: StatementId::new(),
            facility_id,
            facility_name: facility_name.into(),
            fiscal_year: fiscal_year.into(),
            rows: build_empty_template(),
        }
    }

    /// Returns a copy of the statement with every derived figure recomputed.
    #[must_use]
    pub fn recompute(statement: &Statement) -> Statement {
        Statement {
            rows: compute_totals(&statement.rows),
            ..statement.clone()
        }
    }

    /// Validates the layout, then recomputes.
    ///
    /// # Errors
    ///
    /// Returns the first structural problem found by
    /// [`validate_forest`](super::validation::validate_forest).
    pub fn recompute_checked(statement: &Statement) -> Result<Statement, StatementError> {
        validate_forest(&statement.rows)?;
        Ok(Self::recompute(statement))
    }

    /// Recomputes many facilities' statements in parallel.
    ///
    /// Statements are independent, so each one is computed on its own
    /// worker. Output order matches input order.
    #[must_use]
    pub fn recompute_all(statements: &[Statement]) -> Vec<Statement> {
        let computed: Vec<Statement> = statements.par_iter().map(Self::recompute).collect();
        info!(statements = computed.len(), "Recomputed facility statements");
        computed
    }

    /// Reads the headline figures of a statement, recomputing first.
    #[must_use]
    pub fn summarize(statement: &Statement) -> StatementSummary {
        let rows = compute_totals(&statement.rows);
        let summary = StatementSummary::from_rows(&rows);
        debug!(
            facility = %statement.facility_id,
            closing_balance = %summary.closing_balance,
            "Statement summarized"
        );
        summary
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::statement::edit::{RowUpdate, apply_updates};
    use crate::statement::types::{Quarter, find_row};
    use rust_decimal::Decimal;
    use rust_decimal_macros::dec;

    fn funded(name: &str, receipts: Decimal, spent: Decimal) -> Statement {
        let mut statement = StatementService::create(FacilityId::new(), name, "2025/2026");
        statement.rows = apply_updates(
            &statement.rows,
            &[
                RowUpdate::new("a2").with_quarter(Quarter::Q1, Some(receipts)),
                RowUpdate::new("b04-2").with_quarter(Quarter::Q1, Some(spent)),
            ],
        )
        .unwrap();
        statement
    }

    #[test]
    fn test_create_uses_template() {
        let statement = StatementService::create(FacilityId::new(), "Kigali HC", "2025/2026");
        assert_eq!(statement.facility_name, "Kigali HC");
        assert_eq!(statement.rows.len(), 7);
        assert!(find_row(&statement.rows, "b05-1").is_some());
    }

    #[test]
    fn test_recompute_keeps_metadata() {
        let statement = funded("Nyanza Hospital", dec!(900), dec!(100));
        let recomputed = StatementService::recompute(&statement);

        assert_eq!(recomputed.id, statement.id);
        assert_eq!(recomputed.facility_id, statement.facility_id);
        assert_eq!(recomputed.rows, statement.rows);
    }

    #[test]
    fn test_recompute_checked_rejects_duplicates() {
        let mut statement = funded("Butare HC", dec!(1), dec!(1));
        statement.rows[0].children[1].id = "a1".to_string();

        assert_eq!(
            StatementService::recompute_checked(&statement),
            Err(StatementError::DuplicateId("a1".into()))
        );
    }

    #[test]
    fn test_recompute_all_preserves_order() {
        let statements: Vec<Statement> = (1..=8i64)
            .map(|i| funded(&format!("Facility {i}"), Decimal::from(i * 100), dec!(50)))
            .collect();

        let computed = StatementService::recompute_all(&statements);

        assert_eq!(computed.len(), statements.len());
        for (i, statement) in computed.iter().enumerate() {
            assert_eq!(statement.id, statements[i].id);
            let expected = Decimal::from(i + 1) * dec!(100) - dec!(50);
            assert_eq!(find_row(&statement.rows, "c").unwrap().q1, Some(expected));
        }
    }

    #[test]
    fn test_summarize() {
        let statement = funded("Muhima HC", dec!(1500), dec!(2000));
        let summary = StatementService::summarize(&statement);

        assert_eq!(summary.receipts, dec!(1500));
        assert_eq!(summary.expenditures, dec!(2000));
        assert_eq!(summary.surplus_deficit, Decimal::ZERO);
        assert_eq!(summary.net_financial_assets, Decimal::ZERO);
        assert_eq!(summary.closing_balance, dec!(-500));
    }
}
