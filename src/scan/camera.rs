//! Camera and decoder contracts.

use std::sync::{
    Arc,
    atomic::{AtomicU64, Ordering},
};

use async_trait::async_trait;
use tokio::sync::mpsc;

use crate::cancel::CancelToken;

/// Display width assumed when the host cannot report one.
pub const DEFAULT_DISPLAY_WIDTH: u32 = 300;

/// Horizontal space reserved around the decode region.
pub const SCAN_BOX_MARGIN: u32 = 40;

/// A capture device as reported by the platform.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CameraDescriptor {
    pub id: String,
    pub label: String,
}

impl CameraDescriptor {
    #[must_use]
    pub fn new(id: impl Into<String>, label: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            label: label.into(),
        }
    }

    /// Label for pickers. Unlabeled devices show a prefix of their id.
    #[must_use]
    pub fn display_label(&self) -> String {
        if self.label.is_empty() {
            let short: String = self.id.chars().take(8).collect();
            format!("Camera {short}")
        } else {
            self.label.clone()
        }
    }
}

/// Which way a camera faces.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FacingMode {
    /// Front-facing, toward the user.
    User,
    /// Rear-facing.
    Environment,
}

/// What to ask the platform for when opening a stream.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CameraTarget {
    /// A specific device by id.
    Device(String),
    /// Any device with the given capability.
    Facing(FacingMode),
}

/// Platform-level camera faults.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CameraError {
    #[error("camera permission denied")]
    PermissionDenied,

    #[error("camera not found")]
    NotFound,

    #[error("camera is in use by another consumer")]
    Busy,

    #[error("{0}")]
    Platform(String),
}

/// Caller preferences for a stream.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScanHints {
    pub frame_rate: u32,

    /// Requested side length of the square decode region, in pixels.
    pub scan_box: u32,

    /// Width available for the preview, if the host knows it.
    pub display_width: Option<u32>,
}

impl Default for ScanHints {
    fn default() -> Self {
        Self {
            frame_rate: 10,
            scan_box: 250,
            display_width: None,
        }
    }
}

impl ScanHints {
    /// Resolve hints into the settings handed to the decoder.
    ///
    /// The decode region never exceeds the display width minus margins.
    #[must_use]
    pub fn settings(&self) -> StreamSettings {
        let width = self
            .display_width
            .filter(|w| *w > 0)
            .unwrap_or(DEFAULT_DISPLAY_WIDTH);
        StreamSettings {
            frame_rate: self.frame_rate,
            scan_box: self.scan_box.min(width.saturating_sub(SCAN_BOX_MARGIN)),
        }
    }
}

/// Settings for one stream.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StreamSettings {
    pub frame_rate: u32,
    pub scan_box: u32,
}

/// One decoded frame, numbered in delivery order within its attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct Decoded {
    pub(crate) seq: u64,
    pub(crate) text: String,
}

/// Where a decoder delivers text for one scan attempt.
///
/// Deliveries after the attempt is cancelled are dropped.
#[derive(Debug, Clone)]
pub struct DecodeSink {
    tx: mpsc::UnboundedSender<Decoded>,
    delivered: Arc<AtomicU64>,
    cancel: CancelToken,
}

impl DecodeSink {
    pub(crate) fn new(
        tx: mpsc::UnboundedSender<Decoded>,
        delivered: Arc<AtomicU64>,
        cancel: CancelToken,
    ) -> Self {
        Self {
            tx,
            delivered,
            cancel,
        }
    }

    /// Deliver one decoded frame.
    ///
    /// Returns `false` once the attempt is over; decoders should stop producing.
    pub fn deliver(&self, text: String) -> bool {
        if self.cancel.is_cancelled() {
            return false;
        }
        let seq = self.delivered.fetch_add(1, Ordering::SeqCst);
        self.tx.send(Decoded { seq, text }).is_ok()
    }
}

/// Lists capture devices.
#[async_trait]
pub trait CameraProvider: Send + Sync {
    /// # Errors
    ///
    /// [`CameraError::NotFound`] when the platform has no capture devices;
    /// any other variant when enumeration is refused or fails.
    async fn list_cameras(&self) -> Result<Vec<CameraDescriptor>, CameraError>;
}

/// Decodes codes from a live stream.
///
/// A failed `start` must leave the decoder idle.
#[async_trait]
pub trait CodeDecoder: Send {
    /// Open `target` and begin decoding; each recognized code goes to `sink`.
    ///
    /// # Errors
    ///
    /// The platform fault that kept the stream from opening.
    async fn start(
        &mut self,
        target: &CameraTarget,
        settings: &StreamSettings,
        sink: DecodeSink,
    ) -> Result<(), CameraError>;

    /// Release the stream.
    ///
    /// # Errors
    ///
    /// The platform fault reported while releasing. Callers may ignore it.
    async fn stop(&mut self) -> Result<(), CameraError>;

    fn is_scanning(&self) -> bool;
}
