//! Adaptive time-bucket aggregation for a stream of timestamped activity.
//!
//! A [`Session`] turns an initial historical batch plus a live feed of events
//! into a bounded, sliding window of per-period counts and keeps a
//! [`RenderSink`] in sync with it. [`runtime::run_session`] wires a session to
//! an [`EventSource`] on tokio.

pub mod advance;
pub mod classifier;
pub mod clock;
pub mod coalescer;
pub mod config;
pub mod error;
pub mod label;
pub mod ledger;
pub mod placement;
pub mod resolution;
pub mod runtime;
pub mod session;
pub mod sink;
pub mod source;
pub mod visibility;

pub use classifier::{ClassifiedEntry, RawEvent};
pub use config::{Presentation, SessionConfig, Visualization};
pub use error::{LedgerError, SessionError, SourceError};
pub use ledger::{BucketLedger, Period};
pub use resolution::{Resolution, ResolutionKind};
pub use session::{Session, SessionEvent};
pub use sink::{RenderSink, Series, StyleConfig};
pub use source::{Batch, EventSource, RequestType};
