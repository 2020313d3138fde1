//! Partial row edits followed by recomputation.

use rust_decimal::Decimal;
use serde::{Deserialize, Deserializer};
use tracing::debug;

use super::engine::compute_totals;
use super::error::StatementError;
use super::types::{BudgetRow, Quarter};

/// A partial edit of one row.
///
/// For each quarter, `None` leaves the figure alone, `Some(None)` clears it
/// and `Some(Some(v))` sets it.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RowUpdate {
    /// Target row id.
    pub id: String,
    /// First quarter change.
    #[serde(default, deserialize_with = "present")]
    pub q1: Option<Option<Decimal>>,
    /// Second quarter change.
    #[serde(default, deserialize_with = "present")]
    pub q2: Option<Option<Decimal>>,
    /// Third quarter change.
    #[serde(default, deserialize_with = "present")]
    pub q3: Option<Option<Decimal>>,
    /// Fourth quarter change.
    #[serde(default, deserialize_with = "present")]
    pub q4: Option<Option<Decimal>>,
    /// Comment change.
    #[serde(default, deserialize_with = "present")]
    pub comments: Option<Option<String>>,
}

// A key that is present (even as null) is an edit.
fn present<'de, D, T>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}

impl RowUpdate {
    /// Creates an update that changes nothing yet.
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            ..Self::default()
        }
    }

    /// Sets or clears one quarter.
    #[must_use]
    pub fn with_quarter(mut self, quarter: Quarter, value: Option<Decimal>) -> Self {
        let slot = match quarter {
            Quarter::Q1 => &mut self.q1,
            Quarter::Q2 => &mut self.q2,
            Quarter::Q3 => &mut self.q3,
            Quarter::Q4 => &mut self.q4,
        };
        *slot = Some(value);
        self
    }

    /// Sets or clears the comment.
    #[must_use]
    pub fn with_comments(mut self, comments: Option<String>) -> Self {
        self.comments = Some(comments);
        self
    }

    fn quarter_changes(&self) -> impl Iterator<Item = (Quarter, Option<Decimal>)> + '_ {
        Quarter::ALL
            .into_iter()
            .zip([self.q1, self.q2, self.q3, self.q4])
            .filter_map(|(quarter, change)| change.map(|value| (quarter, value)))
    }

    fn touches_figures(&self) -> bool {
        self.quarter_changes().next().is_some()
    }
}

/// Applies a batch of edits and recomputes the statement.
///
/// The batch is all-or-nothing: the input is never modified, and no output
/// is produced if any edit is rejected. Figures may only be entered on
/// editable rows that are not rolled-up categories; comments may be set on
/// any row.
///
/// # Errors
///
/// Returns `StatementError::RowNotFound` for an unknown id and
/// `StatementError::RowNotEditable` for a figure change on a computed row.
pub fn apply_updates(
    rows: &[BudgetRow],
    updates: &[RowUpdate],
) -> Result<Vec<BudgetRow>, StatementError> {
    let mut edited = rows.to_vec();

    for update in updates {
        let row = edited
            .iter_mut()
            .find_map(|row| row.find_mut(&update.id))
            .ok_or_else(|| StatementError::RowNotFound(update.id.clone()))?;

        if update.touches_figures() && !accepts_figures(row) {
            return Err(StatementError::RowNotEditable(update.id.clone()));
        }

        for (quarter, value) in update.quarter_changes() {
            row.set_quarter(quarter, value);
        }
        if let Some(comments) = &update.comments {
            row.comments.clone_from(comments);
        }
    }

    debug!(updates = updates.len(), "Applied row updates");
    Ok(compute_totals(&edited))
}

fn accepts_figures(row: &BudgetRow) -> bool {
    row.is_editable && !(row.is_category && row.has_children())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::statement::template::build_empty_template;
    use crate::statement::types::find_row;
    use rstest::rstest;
    use rust_decimal_macros::dec;

    #[test]
    fn test_edit_leaf_recomputes() {
        let template = build_empty_template();
        let updates = [
            RowUpdate::new("a1").with_quarter(Quarter::Q1, Some(dec!(1000))),
            RowUpdate::new("a2").with_quarter(Quarter::Q1, Some(dec!(500))),
            RowUpdate::new("b01-1").with_quarter(Quarter::Q1, Some(dec!(400))),
        ];

        let out = apply_updates(&template, &updates).unwrap();

        assert_eq!(find_row(&out, "a").unwrap().q1, Some(dec!(1500)));
        assert_eq!(find_row(&out, "b").unwrap().q1, Some(dec!(400)));
        assert_eq!(find_row(&out, "c").unwrap().q1, Some(dec!(1100)));
        assert_eq!(find_row(&out, "g3").unwrap().q1, Some(dec!(1100)));
        assert_eq!(find_row(&out, "g").unwrap().cumulative_balance, Some(dec!(1100)));
    }

    #[test]
    fn test_edit_closing_components() {
        let updates = [
            RowUpdate::new("g1").with_quarter(Quarter::Q1, Some(dec!(100))),
            RowUpdate::new("g2").with_quarter(Quarter::Q1, Some(dec!(50))),
        ];

        let out = apply_updates(&build_empty_template(), &updates).unwrap();

        assert_eq!(find_row(&out, "g").unwrap().q1, Some(dec!(150)));
    }

    #[test]
    fn test_clear_quarter() {
        let first = apply_updates(
            &build_empty_template(),
            &[RowUpdate::new("d1").with_quarter(Quarter::Q2, Some(dec!(30)))],
        )
        .unwrap();
        assert_eq!(find_row(&first, "d").unwrap().q2, Some(dec!(30)));

        let second =
            apply_updates(&first, &[RowUpdate::new("d1").with_quarter(Quarter::Q2, None)]).unwrap();
        assert_eq!(find_row(&second, "d1").unwrap().q2, None);
        assert_eq!(find_row(&second, "d").unwrap().q2, None);
    }

    #[rstest]
    #[case::receipts("a")]
    #[case::subcategory("b01")]
    #[case::surplus("c")]
    #[case::net_assets("f")]
    #[case::closing_balance("g")]
    #[case::period_surplus("g3")]
    fn test_computed_rows_rejected(#[case] id: &str) {
        let result = apply_updates(
            &build_empty_template(),
            &[RowUpdate::new(id).with_quarter(Quarter::Q1, Some(dec!(1)))],
        );
        assert_eq!(result, Err(StatementError::RowNotEditable(id.into())));
    }

    #[test]
    fn test_unknown_row_rejected() {
        let result = apply_updates(
            &build_empty_template(),
            &[RowUpdate::new("z9").with_quarter(Quarter::Q1, Some(dec!(1)))],
        );
        assert_eq!(result, Err(StatementError::RowNotFound("z9".into())));
    }

    #[test]
    fn test_comments_allowed_on_computed_row() {
        let out = apply_updates(
            &build_empty_template(),
            &[RowUpdate::new("c").with_comments(Some("Reviewed".into()))],
        )
        .unwrap();
        assert_eq!(find_row(&out, "c").unwrap().comments.as_deref(), Some("Reviewed"));
    }

    #[test]
    fn test_batch_is_all_or_nothing() {
        let template = build_empty_template();
        let updates = [
            RowUpdate::new("a1").with_quarter(Quarter::Q1, Some(dec!(10))),
            RowUpdate::new("c").with_quarter(Quarter::Q1, Some(dec!(10))),
        ];

        assert!(apply_updates(&template, &updates).is_err());
        assert_eq!(find_row(&template, "a1").unwrap().q1, None);
    }

    #[test]
    fn test_deserialize_distinguishes_null_from_missing() {
        let update: RowUpdate =
            serde_json::from_str(r#"{"id":"a1","q1":250.5,"q2":null,"comments":"ok"}"#).unwrap();

        assert_eq!(update.q1, Some(Some(dec!(250.5))));
        assert_eq!(update.q2, Some(None));
        assert_eq!(update.q3, None);
        assert_eq!(update.comments, Some(Some("ok".to_string())));
    }
}
