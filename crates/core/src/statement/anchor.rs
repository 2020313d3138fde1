//! Reserved row identifiers shared by the template builder and the engine.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// A row whose id is reserved for a statement section or a cross-row formula.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum Anchor {
    /// `a` - Receipts.
    Receipts,
    /// `b` - Expenditures.
    Expenditures,
    /// `c` - Surplus/Deficit, computed as Receipts minus Expenditures.
    SurplusDeficit,
    /// `d` - Financial Assets.
    FinancialAssets,
    /// `e` - Financial Liabilities.
    FinancialLiabilities,
    /// `f` - Net Financial Assets, computed as Assets minus Liabilities.
    NetFinancialAssets,
    /// `g` - Closing Balance, computed from its three children.
    ClosingBalance,
    /// `g1` - Accumulated Surplus/Deficit carried in.
    AccumulatedSurplus,
    /// `g2` - Prior year adjustment.
    PriorYearAdjustment,
    /// `g3` - Surplus/Deficit of the period, mirrored from `c`.
    PeriodSurplus,
}

impl Anchor {
    /// Every reserved anchor, in statement order.
    pub const ALL: [Self; 10] = [
        Self::Receipts,
        Self::Expenditures,
        Self::SurplusDeficit,
        Self::FinancialAssets,
        Self::FinancialLiabilities,
        Self::NetFinancialAssets,
        Self::ClosingBalance,
        Self::AccumulatedSurplus,
        Self::PriorYearAdjustment,
        Self::PeriodSurplus,
    ];

    /// Returns the reserved row id.
    #[must_use]
    pub const fn id(self) -> &'static str {
        match self {
            Self::Receipts => "a",
            Self::Expenditures => "b",
            Self::SurplusDeficit => "c",
            Self::FinancialAssets => "d",
            Self::FinancialLiabilities => "e",
            Self::NetFinancialAssets => "f",
            Self::ClosingBalance => "g",
            Self::AccumulatedSurplus => "g1",
            Self::PriorYearAdjustment => "g2",
            Self::PeriodSurplus => "g3",
        }
    }

    /// Looks up the anchor reserved for a row id.
    #[must_use]
    pub fn from_id(id: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|anchor| anchor.id() == id)
    }

    /// Returns the section title used by the canonical template.
    #[must_use]
    pub const fn title(self) -> &'static str {
        match self {
            Self::Receipts => "A. Receipts",
            Self::Expenditures => "B. Expenditures",
            Self::SurplusDeficit => "C. SURPLUS / DEFICIT",
            Self::FinancialAssets => "D. Financial Assets",
            Self::FinancialLiabilities => "E. Financial Liabilities",
            Self::NetFinancialAssets => "F. Net Financial Assets (D - E)",
            Self::ClosingBalance => "G. Closing Balance",
            Self::AccumulatedSurplus => "Accumulated Surplus/Deficit",
            Self::PriorYearAdjustment => "Prior Year Adjustment",
            Self::PeriodSurplus => "Surplus/Deficit of the Period",
        }
    }

    /// Whether the row's figures are produced by a cross-row formula.
    #[must_use]
    pub const fn is_computed(self) -> bool {
        matches!(
            self,
            Self::SurplusDeficit | Self::NetFinancialAssets | Self::ClosingBalance | Self::PeriodSurplus
        )
    }

    /// The parent anchor for the closing balance components, `None` for
    /// top-level sections.
    #[must_use]
    pub const fn parent(self) -> Option<Self> {
        match self {
            Self::AccumulatedSurplus | Self::PriorYearAdjustment | Self::PeriodSurplus => {
                Some(Self::ClosingBalance)
            }
            _ => None,
        }
    }
}

impl fmt::Display for Anchor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.id())
    }
}

impl FromStr for Anchor {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_id(s).ok_or_else(|| format!("Unknown anchor id: {s}"))
    }
}

impl TryFrom<String> for Anchor {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<Anchor> for String {
    fn from(anchor: Anchor) -> Self {
        anchor.id().to_string()
    }
}
