//! Core business logic for Fundline.
//!
//! This crate contains pure business logic with ZERO web or database dependencies.
//! All statement types, roll-up rules, and cross-section formulas live here.
//!
//! # Modules
//!
//! - `statement` - Facility budget statements: template, totals engine,
//!   table flattening, and row edits

pub mod statement;
