//! The Tally score-submission pipeline.
//!
//! [`Submitter::submit`] takes one encrypted submission and the session it
//! arrived on, and drives it through decoding, integrity checks, admission,
//! rating, status resolution, placement, the aggregate commit and the
//! post-commit side effects. Storage and the external collaborators are
//! reached only through the `tally-core` traits.

pub mod achievements;
pub mod admission;
pub mod aggregate;
pub mod config;
pub mod error;
pub mod integrity;
pub mod outcome;
pub mod placement;
pub mod request;
pub mod status;

mod pipeline;

pub use config::{IntegrityConfig, IntegrityPolicy, SubmitConfig};
pub use error::{Result, SubmitError};
pub use outcome::{Accepted, Outcome, PrevBest, RejectReason};
pub use pipeline::Submitter;
pub use request::SubmissionRequest;
