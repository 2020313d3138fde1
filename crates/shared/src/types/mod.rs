//! Common types used across the application.

pub mod amount;
pub mod id;

pub use amount::{clamp_non_positive_to_zero, sum_present, zero_to_absent};
pub use id::*;
