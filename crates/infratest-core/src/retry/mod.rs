//! Retry engine.
//!
//! This module runs caller-supplied fallible actions under a fixed-interval
//! retry budget and decides, per failure, whether the error is transient
//! (retry) or permanent (fail now) by matching its rendered text against
//! error catalogs. Unknown errors are always fatal.

mod catalog;
mod classify;
mod observer;
mod outcome;
mod poll;
mod policy;
mod run;
mod sleep;

pub use catalog::{CatalogEntry, CatalogError, ErrorCatalog, Matcher};
pub use classify::{classify, Classification, Classifier};
pub use observer::{AttemptReport, RecordingObserver, RetryObserver, TracingObserver};
pub use outcome::{RetryError, RunOutcome};
pub use poll::{condition_catalog, poll_until, NotReady, Poller, Readiness, CONDITION_PENDING};
pub use policy::RetryPolicy;
pub use run::{run_with_retry, Runner};
pub use sleep::{RecordingSleeper, Sleeper, ThreadSleeper};
