//! Discovery of installed Java runtimes.
//!
//! The pipeline is [`Collector`] → [`Probe`] → [`Scanner`]: collect candidate
//! launcher paths, run each one to read its system properties, and assemble
//! the ordered [`Report`].

pub mod candidate;
pub mod collector;
pub mod host;
pub mod keys;
pub mod probe;
pub mod report;

pub use crate::candidate::{Candidate, CandidateError, CandidateSet};
pub use crate::collector::{Collector, Source};
pub use crate::host::HostProperties;
pub use crate::keys::{DEFAULT_PROPERTIES, PATH_KEY, PropertyKeys};
pub use crate::probe::{Probe, ProbeError, ProbedProperties};
pub use crate::report::{Report, RuntimeRecord, ScanError, Scanner};
