//! Camera scanning: acquire a camera, decode codes from its stream,
//! and hand decoded text to the caller.
//!
//! Platform collaborators sit behind the traits in [`camera`]. A
//! [`ScanSession`] owns one decoder and guarantees at most one active stream.

mod camera;
mod session;
mod stdin;

pub use camera::{
    CameraDescriptor, CameraError, CameraProvider, CameraTarget, CodeDecoder, DecodeSink,
    FacingMode, ScanHints, StreamSettings,
};
pub use session::{ScanError, ScanSession, ScanStatus};
pub use stdin::{STDIN_CAMERA_ID, StdinCamera, StdinDecoder};
