//! Core data types for audit reports.
//!
//! - [`Severity`] - The ordered severity scale
//! - [`Vulnerability`] - One vulnerable package and its advisories
//! - [`AuditReport`] - The canonical, ordered vulnerability collection
//! - [`OutdatedMap`] - Packages with a newer version available
//!
//! # Example
//!
//! ```
//! use dep_audit::{AuditReport, Severity, Vulnerability};
//!
//! let report: AuditReport = vec![
//!     Vulnerability::new("lodash", Severity::High),
//!     Vulnerability::new("minimist", Severity::Low),
//! ]
//! .into_iter()
//! .collect();
//!
//! assert_eq!(Severity::max_of(report.iter().map(|v| v.severity)), Severity::High);
//! ```

mod report;
mod severity;
mod vulnerability;

pub use report::*;
pub use severity::*;
pub use vulnerability::*;
