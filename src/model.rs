//! Core data model for patrol inspection.
//!
//! Routes and checkpoints are reference data read from storage. Verdicts
//! are produced once per verification attempt and never persisted; only an
//! inspection built from a verified visit is.

mod checkpoint;
mod inspection;
mod route;
mod verdict;

pub use checkpoint::{
    Checkpoint, DEFAULT_RADIUS_METERS, effective_radius, generate_token, token_fingerprint,
};
pub use inspection::{Inspection, InspectionStatus};
pub use route::Route;
pub use verdict::{Verdict, Verification, VerifiedVisit};
