//! Relink Services
//!
//! Business logic on top of the document store and the URL resolvers. The only
//! service is the migration sweep that replaces legacy `gs://` references with
//! resolved URLs.

pub mod sweep;

pub use sweep::{
    error_chain, FailurePolicy, RecordOutcome, RecordReport, SkipReason, Sweep, SweepError,
    SweepOptions, SweepReport,
};
