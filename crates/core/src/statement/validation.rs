//! Structural checks for statements read from storage or transport.
//!
//! The totals engine accepts any forest. These checks are for callers that
//! want to reject layouts the engine would silently misread: a duplicated id
//! makes anchor lookups pick the first match, and an anchor nested in the
//! wrong place is never found by the cross-row formulas.

use std::collections::HashSet;

use super::anchor::Anchor;
use super::error::StatementError;
use super::types::BudgetRow;

/// Validates id uniqueness and anchor placement across a forest.
///
/// # Errors
///
/// Returns `StatementError::DuplicateId` for the first repeated id and
/// `StatementError::MisplacedAnchor` for a reserved id outside its place.
pub fn validate_forest(rows: &[BudgetRow]) -> Result<(), StatementError> {
    let mut seen = HashSet::new();
    for row in rows {
        visit(row, None, &mut seen)?;
    }
    Ok(())
}

fn visit<'a>(
    row: &'a BudgetRow,
    parent: Option<&str>,
    seen: &mut HashSet<&'a str>,
) -> Result<(), StatementError> {
    if !seen.insert(row.id.as_str()) {
        return Err(StatementError::DuplicateId(row.id.clone()));
    }

    if let Some(anchor) = Anchor::from_id(&row.id) {
        let expected = anchor.parent().map(Anchor::id);
        if parent != expected {
            return Err(StatementError::MisplacedAnchor(anchor));
        }
    }

    for child in &row.children {
        visit(child, Some(row.id.as_str()), seen)?;
    }
    Ok(())
}
