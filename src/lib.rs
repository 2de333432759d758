//! Patrol inspection core.
//!
//! An inspector proves presence at a checkpoint by scanning its code and
//! reporting a position fix close enough to the checkpoint's coordinates.
//!
//! - [`scan`] drives a camera and hands out decoded text.
//! - [`verify`] turns decoded text plus one position fix into a [`model::Verdict`].
//! - [`storage`] keeps checkpoints and inspection records on local disk.

pub mod cancel;
pub mod config;
pub mod geo;
pub mod geolocation;
pub mod inspector;
pub mod model;
pub mod scan;
pub mod storage;
pub mod verify;
