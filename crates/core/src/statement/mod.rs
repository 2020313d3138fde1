//! Facility budget statements and their totals engine.

pub mod anchor;
pub mod display;
pub mod edit;
pub mod engine;
pub mod error;
pub mod service;
pub mod template;
pub mod types;
pub mod validation;


pub use anchor::Anchor;
pub use display::{ExpansionState, FlatRow, flatten};
pub use edit::{RowUpdate, apply_updates};
pub use engine::{TotalsEngine, compute_totals};
pub use error::StatementError;
pub use service::StatementService;
pub use template::build_empty_template;
pub use types::{BudgetRow, Quarter, Statement, StatementSummary, find_row, top_level};
pub use validation::validate_forest;
