//! # Locumdesk Core
//!
//! Domain types and pure business rules for the locumdesk clinic-staffing
//! marketplace. This crate has no I/O: the availability overlap math, the
//! trust-score rules, and the payroll arithmetic all live here so they can be
//! exercised without a database or a running server.

/// Domain error taxonomy shared by every crate
pub mod errors;
/// Request/response and entity models
pub mod models;
/// Payroll arithmetic (gross, statutory clamps, net pay)
pub mod payroll;
/// Trust-score rules: deltas, counters, flags and badges
pub mod scoring;
/// Time-slot helpers: HH:mm serialization and interval overlap
pub mod slots;
