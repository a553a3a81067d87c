pub mod cache;
pub mod checker;
pub mod config;
pub mod engine;
pub mod error;
pub mod filter;
pub mod model;
pub mod normalize;
pub mod output;

pub use cache::Cache;
pub use config::Config;
pub use engine::{aggregate, run, AggregateOptions, AuditOutcome, AuditRun};
pub use filter::ExclusionSet;
pub use model::{Advisory, AuditReport, FixAvailable, OutdatedMap, Severity, Vulnerability};
pub use normalize::normalize;
