//! In-memory aggregates whose invariants span more than one table.

pub mod cart;
