//! Scan session: one decoder, at most one live stream, explicit teardown.
//!
//! ```text
//! Initializing → EnumeratingCameras → Scanning | Error
//! Scanning --stop--> Released
//! Error --retry--> EnumeratingCameras | Scanning
//! ```
//!
//! Decoded text is only handed out while `Scanning`. Each start creates a
//! fresh attempt with its own cancellation token, so decodes from a stream
//! that has since been stopped are never delivered.

use std::collections::VecDeque;
use std::sync::{
    Arc,
    atomic::{AtomicU64, Ordering},
};

use tokio::sync::mpsc;
use tracing::{debug, error, info, warn};

use crate::cancel::CancelToken;

use super::camera::{
    CameraDescriptor, CameraError, CameraProvider, CameraTarget, CodeDecoder, DecodeSink,
    Decoded, FacingMode, ScanHints,
};

/// User-facing scan failures.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ScanError {
    #[error("camera permission denied")]
    PermissionDenied,

    #[error("no cameras found")]
    NoCameraFound,

    #[error("failed to start camera {camera_id}: {cause}")]
    CameraStartFailed {
        camera_id: String,
        cause: CameraError,
    },

    #[error("unknown camera: {0}")]
    UnknownCamera(String),
}

/// Where a session is in its lifecycle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScanStatus {
    /// Created, or a stream is being started.
    Initializing,

    /// Waiting on the platform's device list.
    EnumeratingCameras,

    /// A stream is live. The only state in which decodes are delivered.
    Scanning,

    /// The last operation failed. `retry` is available.
    Error(ScanError),

    /// The stream was stopped.
    Released,
}

/// One start of a stream.
struct Attempt {
    cancel: CancelToken,
    decoded: mpsc::UnboundedReceiver<Decoded>,

    /// Deliveries so far, shared with the sink.
    delivered: Arc<AtomicU64>,

    /// Delivery count when the last decode was handed out.
    handed_out_at: u64,

    /// Decodes that were already queued at hand-out, kept across a discard.
    held: VecDeque<Decoded>,
}

/// An owned scanning session.
///
/// Call [`stop`](Self::stop) or [`close`](Self::close) on every exit path.
/// Dropping a session cancels delivery but cannot await the decoder.
pub struct ScanSession<P: CameraProvider, D: CodeDecoder> {
    provider: P,
    decoder: D,
    status: ScanStatus,
    cameras: Vec<CameraDescriptor>,
    selected: Option<String>,
    active: Option<CameraTarget>,
    hints: ScanHints,
    attempt: Option<Attempt>,
}

impl<P: CameraProvider, D: CodeDecoder> ScanSession<P, D> {
    #[must_use]
    pub fn new(provider: P, decoder: D, hints: ScanHints) -> Self {
        Self {
            provider,
            decoder,
            status: ScanStatus::Initializing,
            cameras: Vec::new(),
            selected: None,
            active: None,
            hints,
            attempt: None,
        }
    }

    #[must_use]
    pub fn status(&self) -> &ScanStatus {
        &self.status
    }

    #[must_use]
    pub fn cameras(&self) -> &[CameraDescriptor] {
        &self.cameras
    }

    /// The camera id the next start or retry will use.
    #[must_use]
    pub fn selected_camera(&self) -> Option<&str> {
        self.selected.as_deref()
    }

    /// What is currently supplying frames, if anything.
    #[must_use]
    pub fn active_camera(&self) -> Option<&CameraTarget> {
        self.active.as_ref()
    }

    #[must_use]
    pub fn hints(&self) -> ScanHints {
        self.hints
    }

    /// A handle that cancels the current attempt from elsewhere.
    #[must_use]
    pub fn cancel_handle(&self) -> Option<CancelToken> {
        self.attempt.as_ref().map(|a| a.cancel.clone())
    }

    /// Ask the platform for capture devices and select the first one.
    ///
    /// # Errors
    ///
    /// [`ScanError::NoCameraFound`] if the platform reports no devices, and
    /// [`ScanError::PermissionDenied`] for any other refusal. The session moves
    /// to [`ScanStatus::Error`] either way.
    pub async fn enumerate_cameras(&mut self) -> Result<&[CameraDescriptor], ScanError> {
        self.status = ScanStatus::EnumeratingCameras;

        let cameras = match self.provider.list_cameras().await {
            Ok(cameras) => cameras,
            Err(CameraError::NotFound) => return self.fail(ScanError::NoCameraFound),
            Err(err) => {
                warn!(error = %err, "camera enumeration refused");
                return self.fail(ScanError::PermissionDenied);
            }
        };

        let Some(first) = cameras.first() else {
            return self.fail(ScanError::NoCameraFound);
        };

        debug!(count = cameras.len(), default = %first.id, "cameras enumerated");
        self.selected = Some(first.id.clone());
        self.cameras = cameras;
        Ok(&self.cameras)
    }

    /// Start decoding from `camera_id`.
    ///
    /// Any live stream is stopped first. If the device cannot be opened,
    /// one fallback attempt is made against a front-facing camera before
    /// the failure is reported.
    ///
    /// # Errors
    ///
    /// [`ScanError::PermissionDenied`] if the fallback is refused permission,
    /// otherwise [`ScanError::CameraStartFailed`] carrying the fallback's cause.
    pub async fn start(&mut self, camera_id: &str, hints: ScanHints) -> Result<(), ScanError> {
        self.release_stream().await;

        self.status = ScanStatus::Initializing;
        self.selected = Some(camera_id.to_string());
        self.hints = hints;

        let settings = hints.settings();
        let cancel = CancelToken::new();
        let (tx, rx) = mpsc::unbounded_channel();
        let delivered = Arc::new(AtomicU64::new(0));
        let sink = DecodeSink::new(tx, Arc::clone(&delivered), cancel.clone());

        let primary = CameraTarget::Device(camera_id.to_string());
        let target = match self.decoder.start(&primary, &settings, sink.clone()).await {
            Ok(()) => primary,
            Err(err) => {
                warn!(camera = camera_id, error = %err, "camera start failed, trying front-facing camera");
                let fallback = CameraTarget::Facing(FacingMode::User);
                if let Err(cause) = self.decoder.start(&fallback, &settings, sink).await {
                    error!(camera = camera_id, error = %cause, "front-facing fallback failed");
                    cancel.cancel();
                    let err = match cause {
                        CameraError::PermissionDenied => ScanError::PermissionDenied,
                        cause => ScanError::CameraStartFailed {
                            camera_id: camera_id.to_string(),
                            cause,
                        },
                    };
                    return self.fail(err);
                }
                fallback
            }
        };

        info!(
            camera = ?target,
            frame_rate = settings.frame_rate,
            scan_box = settings.scan_box,
            "scanning"
        );
        self.active = Some(target);
        self.attempt = Some(Attempt {
            cancel,
            decoded: rx,
            delivered,
            handed_out_at: 0,
            held: VecDeque::new(),
        });
        self.status = ScanStatus::Scanning;
        Ok(())
    }

    /// Release the live stream, if any. Never fails.
    pub async fn stop(&mut self) {
        self.release_stream().await;
        if !matches!(self.status, ScanStatus::Error(_)) {
            self.status = ScanStatus::Released;
        }
    }

    /// Stop, then start against another enumerated camera.
    ///
    /// # Errors
    ///
    /// [`ScanError::UnknownCamera`] if `camera_id` was not enumerated, leaving
    /// the current stream untouched. Otherwise as for [`start`](Self::start).
    pub async fn switch_camera(&mut self, camera_id: &str) -> Result<(), ScanError> {
        if !self.cameras.iter().any(|c| c.id == camera_id) {
            return Err(ScanError::UnknownCamera(camera_id.to_string()));
        }
        let hints = self.hints;
        self.start(camera_id, hints).await
    }

    /// Start the selected camera again after a failure.
    ///
    /// Cameras are only re-enumerated if none were found before.
    ///
    /// # Errors
    ///
    /// As for [`enumerate_cameras`](Self::enumerate_cameras) and
    /// [`start`](Self::start).
    pub async fn retry(&mut self) -> Result<(), ScanError> {
        if self.cameras.is_empty() {
            self.enumerate_cameras().await?;
        }
        let Some(camera_id) = self.selected.clone() else {
            return self.fail(ScanError::NoCameraFound);
        };
        let hints = self.hints;
        self.start(&camera_id, hints).await
    }

    /// Wait for the next decoded code.
    ///
    /// Returns `None` when not scanning, when the attempt is cancelled, or
    /// when the decoder ends its stream.
    pub async fn next_decoded(&mut self) -> Option<String> {
        if self.status != ScanStatus::Scanning {
            return None;
        }
        let attempt = self.attempt.as_mut()?;
        let cancel = attempt.cancel.clone();
        if cancel.is_cancelled() {
            return None;
        }

        let decoded = match attempt.held.pop_front() {
            Some(decoded) => Some(decoded),
            None => tokio::select! {
                biased;
                () = cancel.cancelled() => None,
                decoded = attempt.decoded.recv() => decoded.filter(|_| !cancel.is_cancelled()),
            },
        };

        let Some(decoded) = decoded else {
            if !cancel.is_cancelled() {
                debug!("decode stream ended");
            }
            return None;
        };
        attempt.handed_out_at = attempt.delivered.load(Ordering::SeqCst);
        Some(decoded.text)
    }

    /// Drop decodes that arrived after the last one was handed out, i.e.
    /// while the caller was busy verifying it.
    ///
    /// Decodes already queued at hand-out are kept for the next call to
    /// [`next_decoded`](Self::next_decoded). Returns how many were discarded.
    pub fn discard_pending(&mut self) -> usize {
        let Some(attempt) = self.attempt.as_mut() else {
            return 0;
        };
        let mut discarded = 0;
        while let Ok(decoded) = attempt.decoded.try_recv() {
            if decoded.seq < attempt.handed_out_at {
                attempt.held.push_back(decoded);
            } else {
                discarded += 1;
            }
        }
        if discarded > 0 {
            debug!(discarded, "discarded stale decodes");
        }
        discarded
    }

    /// Stop and consume the session.
    pub async fn close(mut self) {
        self.stop().await;
    }

    async fn release_stream(&mut self) {
        if let Some(attempt) = self.attempt.take() {
            attempt.cancel.cancel();
        }
        self.active = None;
        if self.decoder.is_scanning()
            && let Err(err) = self.decoder.stop().await
        {
            debug!(error = %err, "ignoring camera stop failure");
        }
    }

    fn fail<T>(&mut self, err: ScanError) -> Result<T, ScanError> {
        self.status = ScanStatus::Error(err.clone());
        Err(err)
    }
}

impl<P: CameraProvider, D: CodeDecoder> Drop for ScanSession<P, D> {
    fn drop(&mut self) {
        if let Some(attempt) = self.attempt.take() {
            attempt.cancel.cancel();
        }
        if self.decoder.is_scanning() {
            warn!("scan session dropped with a live camera stream");
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::{
        Arc, Mutex,
        atomic::{AtomicUsize, Ordering},
    };
    use std::time::Duration;

    use async_trait::async_trait;

    use super::*;
    use crate::scan::StreamSettings;

    #[derive(Debug, Clone, PartialEq)]
    enum Call {
        Start(CameraTarget),
        Stop,
    }

    #[derive(Default)]
    struct DecoderState {
        calls: Vec<Call>,
        scanning: bool,
        sink: Option<DecodeSink>,
        settings: Option<StreamSettings>,
        fail_device: Option<CameraError>,
        fail_fallback: Option<CameraError>,
        fail_stop: bool,
    }

    /// Decoder double. Clones share state so tests can inspect it after the
    /// session takes ownership.
    #[derive(Clone, Default)]
    struct MockDecoder(Arc<Mutex<DecoderState>>);

    impl MockDecoder {
        fn failing_device(err: CameraError) -> Self {
            let decoder = Self::default();
            decoder.0.lock().unwrap().fail_device = Some(err);
            decoder
        }

        fn calls(&self) -> Vec<Call> {
            self.0.lock().unwrap().calls.clone()
        }

        fn sink(&self) -> DecodeSink {
            self.0.lock().unwrap().sink.clone().unwrap()
        }

        fn emit(&self, text: &str) -> bool {
            self.sink().deliver(text.to_string())
        }
    }

    #[async_trait]
    impl CodeDecoder for MockDecoder {
        async fn start(
            &mut self,
            target: &CameraTarget,
            settings: &StreamSettings,
            sink: DecodeSink,
        ) -> Result<(), CameraError> {
            let mut state = self.0.lock().unwrap();
            assert!(!state.scanning, "start called while a stream is live");
            state.calls.push(Call::Start(target.clone()));
            let failure = match target {
                CameraTarget::Device(_) => state.fail_device.clone(),
                CameraTarget::Facing(_) => state.fail_fallback.clone(),
            };
            if let Some(err) = failure {
                return Err(err);
            }
            state.scanning = true;
            state.settings = Some(*settings);
            state.sink = Some(sink);
            Ok(())
        }

        async fn stop(&mut self) -> Result<(), CameraError> {
            let mut state = self.0.lock().unwrap();
            state.calls.push(Call::Stop);
            state.scanning = false;
            if state.fail_stop {
                return Err(CameraError::Platform("stream already closed".into()));
            }
            Ok(())
        }

        fn is_scanning(&self) -> bool {
            self.0.lock().unwrap().scanning
        }
    }

    /// Camera list double with a swappable answer and a call counter.
    #[derive(Clone)]
    struct MockCameras {
        answer: Arc<Mutex<Result<Vec<CameraDescriptor>, CameraError>>>,
        calls: Arc<AtomicUsize>,
    }

    impl MockCameras {
        fn answering(answer: Result<Vec<CameraDescriptor>, CameraError>) -> Self {
            Self {
                answer: Arc::new(Mutex::new(answer)),
                calls: Arc::new(AtomicUsize::new(0)),
            }
        }

        fn two() -> Self {
            Self::answering(Ok(vec![
                CameraDescriptor::new("back", "Back camera"),
                CameraDescriptor::new("front", "Front camera"),
            ]))
        }

        fn set(&self, answer: Result<Vec<CameraDescriptor>, CameraError>) {
            *self.answer.lock().unwrap() = answer;
        }

        fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl CameraProvider for MockCameras {
        async fn list_cameras(&self) -> Result<Vec<CameraDescriptor>, CameraError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.answer.lock().unwrap().clone()
        }
    }

    fn session(
        cameras: MockCameras,
        decoder: MockDecoder,
    ) -> ScanSession<MockCameras, MockDecoder> {
        ScanSession::new(cameras, decoder, ScanHints::default())
    }

    fn device(id: &str) -> CameraTarget {
        CameraTarget::Device(id.to_string())
    }

    #[tokio::test]
    async fn enumeration_selects_first_camera() {
        let mut s = session(MockCameras::two(), MockDecoder::default());

        let cameras = s.enumerate_cameras().await.unwrap();

        assert_eq!(cameras.len(), 2);
        assert_eq!(s.selected_camera(), Some("back"));
        assert_eq!(s.status(), &ScanStatus::EnumeratingCameras);
    }

    #[tokio::test]
    async fn empty_device_list_is_no_camera_found() {
        let mut s = session(MockCameras::answering(Ok(vec![])), MockDecoder::default());

        let err = s.enumerate_cameras().await.unwrap_err();

        assert_eq!(err, ScanError::NoCameraFound);
        assert_eq!(s.status(), &ScanStatus::Error(ScanError::NoCameraFound));
    }

    #[tokio::test]
    async fn refused_enumeration_is_permission_denied() {
        let cameras = MockCameras::answering(Err(CameraError::PermissionDenied));
        let mut s = session(cameras, MockDecoder::default());

        let err = s.enumerate_cameras().await.unwrap_err();

        assert_eq!(err, ScanError::PermissionDenied);
        assert_eq!(s.status(), &ScanStatus::Error(ScanError::PermissionDenied));
    }

    #[tokio::test]
    async fn decodes_arrive_in_order_while_scanning() {
        let decoder = MockDecoder::default();
        let mut s = session(MockCameras::two(), decoder.clone());
        s.enumerate_cameras().await.unwrap();
        s.start("back", ScanHints::default()).await.unwrap();

        assert_eq!(s.status(), &ScanStatus::Scanning);
        assert_eq!(s.active_camera(), Some(&device("back")));
        assert!(decoder.emit("one"));
        assert!(decoder.emit("two"));

        assert_eq!(s.next_decoded().await.as_deref(), Some("one"));
        assert_eq!(s.next_decoded().await.as_deref(), Some("two"));
        s.stop().await;
    }

    #[tokio::test]
    async fn stop_is_idempotent_and_safe_before_start() {
        let decoder = MockDecoder::default();
        let mut s = session(MockCameras::two(), decoder.clone());

        s.stop().await;
        s.stop().await;
        assert_eq!(s.status(), &ScanStatus::Released);
        assert!(decoder.calls().is_empty());

        s.start("back", ScanHints::default()).await.unwrap();
        s.stop().await;
        s.stop().await;
        assert_eq!(decoder.calls(), vec![Call::Start(device("back")), Call::Stop]);
        assert_eq!(s.active_camera(), None);
    }

    #[tokio::test]
    async fn stop_swallows_decoder_errors() {
        let decoder = MockDecoder::default();
        decoder.0.lock().unwrap().fail_stop = true;
        let mut s = session(MockCameras::two(), decoder.clone());
        s.start("back", ScanHints::default()).await.unwrap();

        s.stop().await;

        assert_eq!(s.status(), &ScanStatus::Released);
        assert!(!decoder.is_scanning());
    }

    #[tokio::test]
    async fn restart_stops_previous_stream_first() {
        let decoder = MockDecoder::default();
        let mut s = session(MockCameras::two(), decoder.clone());
        s.start("back", ScanHints::default()).await.unwrap();

        s.start("front", ScanHints::default()).await.unwrap();

        assert_eq!(
            decoder.calls(),
            vec![
                Call::Start(device("back")),
                Call::Stop,
                Call::Start(device("front")),
            ]
        );
        assert_eq!(s.active_camera(), Some(&device("front")));
        s.stop().await;
    }

    #[tokio::test]
    async fn failed_device_falls_back_to_front_camera() {
        let decoder = MockDecoder::failing_device(CameraError::Busy);
        let mut s = session(MockCameras::two(), decoder.clone());

        s.start("back", ScanHints::default()).await.unwrap();

        assert_eq!(s.status(), &ScanStatus::Scanning);
        assert_eq!(
            s.active_camera(),
            Some(&CameraTarget::Facing(FacingMode::User))
        );
        assert_eq!(
            decoder.calls(),
            vec![
                Call::Start(device("back")),
                Call::Start(CameraTarget::Facing(FacingMode::User)),
            ]
        );
        s.stop().await;
    }

    #[tokio::test]
    async fn failed_fallback_is_reported_with_its_cause() {
        let decoder = MockDecoder::failing_device(CameraError::Busy);
        decoder.0.lock().unwrap().fail_fallback = Some(CameraError::NotFound);
        let mut s = session(MockCameras::two(), decoder.clone());

        let err = s.start("back", ScanHints::default()).await.unwrap_err();

        let expected = ScanError::CameraStartFailed {
            camera_id: "back".into(),
            cause: CameraError::NotFound,
        };
        assert_eq!(err, expected);
        assert_eq!(s.status(), &ScanStatus::Error(expected));
        assert!(!decoder.is_scanning());
        assert_eq!(s.next_decoded().await, None);
    }

    #[tokio::test]
    async fn denied_fallback_is_permission_denied() {
        let decoder = MockDecoder::failing_device(CameraError::PermissionDenied);
        decoder.0.lock().unwrap().fail_fallback = Some(CameraError::PermissionDenied);
        let mut s = session(MockCameras::two(), decoder);

        let err = s.start("back", ScanHints::default()).await.unwrap_err();

        assert_eq!(err, ScanError::PermissionDenied);
    }

    #[tokio::test]
    async fn decode_after_stop_is_never_delivered() {
        let decoder = MockDecoder::default();
        let mut s = session(MockCameras::two(), decoder.clone());
        s.start("back", ScanHints::default()).await.unwrap();
        let stale = decoder.sink();

        s.stop().await;

        assert!(!stale.deliver("late".into()));
        assert_eq!(s.next_decoded().await, None);
    }

    #[tokio::test]
    async fn decode_from_replaced_stream_is_never_delivered() {
        let decoder = MockDecoder::default();
        let mut s = session(MockCameras::two(), decoder.clone());
        s.start("back", ScanHints::default()).await.unwrap();
        let old = decoder.sink();

        s.start("front", ScanHints::default()).await.unwrap();
        assert!(!old.deliver("from back".into()));
        assert!(decoder.emit("from front"));

        assert_eq!(s.next_decoded().await.as_deref(), Some("from front"));
        s.stop().await;
    }

    #[tokio::test]
    async fn external_cancel_ends_the_wait() {
        let decoder = MockDecoder::default();
        let mut s = session(MockCameras::two(), decoder);
        s.start("back", ScanHints::default()).await.unwrap();
        let cancel = s.cancel_handle().unwrap();

        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(10)).await;
            cancel.cancel();
        });

        let next = tokio::time::timeout(Duration::from_secs(1), s.next_decoded())
            .await
            .unwrap();
        assert_eq!(next, None);
        s.stop().await;
    }

    #[tokio::test]
    async fn switching_to_unknown_camera_keeps_current_stream() {
        let decoder = MockDecoder::default();
        let mut s = session(MockCameras::two(), decoder.clone());
        s.enumerate_cameras().await.unwrap();
        s.start("back", ScanHints::default()).await.unwrap();

        let err = s.switch_camera("usb").await.unwrap_err();

        assert_eq!(err, ScanError::UnknownCamera("usb".into()));
        assert_eq!(s.status(), &ScanStatus::Scanning);
        assert!(decoder.emit("still here"));
        assert_eq!(s.next_decoded().await.as_deref(), Some("still here"));
        s.stop().await;
    }

    #[tokio::test]
    async fn switch_camera_stops_then_starts() {
        let decoder = MockDecoder::default();
        let mut s = session(MockCameras::two(), decoder.clone());
        s.enumerate_cameras().await.unwrap();
        s.start("back", ScanHints::default()).await.unwrap();

        s.switch_camera("front").await.unwrap();

        assert_eq!(s.selected_camera(), Some("front"));
        assert_eq!(
            decoder.calls(),
            vec![
                Call::Start(device("back")),
                Call::Stop,
                Call::Start(device("front")),
            ]
        );
        s.stop().await;
    }

    #[tokio::test]
    async fn retry_after_no_camera_re_enumerates() {
        let cameras = MockCameras::answering(Ok(vec![]));
        let decoder = MockDecoder::default();
        let mut s = session(cameras.clone(), decoder.clone());
        assert!(s.enumerate_cameras().await.is_err());

        cameras.set(Ok(vec![CameraDescriptor::new("usb", "")]));
        s.retry().await.unwrap();

        assert_eq!(cameras.calls(), 2);
        assert_eq!(s.status(), &ScanStatus::Scanning);
        assert_eq!(decoder.calls(), vec![Call::Start(device("usb"))]);
        s.stop().await;
    }

    #[tokio::test]
    async fn retry_after_start_failure_reuses_selected_camera() {
        let cameras = MockCameras::two();
        let decoder = MockDecoder::failing_device(CameraError::Busy);
        decoder.0.lock().unwrap().fail_fallback = Some(CameraError::Busy);
        let mut s = session(cameras.clone(), decoder.clone());
        s.enumerate_cameras().await.unwrap();
        assert!(s.start("front", ScanHints::default()).await.is_err());

        {
            let mut state = decoder.0.lock().unwrap();
            state.fail_device = None;
            state.fail_fallback = None;
        }
        s.retry().await.unwrap();

        assert_eq!(cameras.calls(), 1);
        assert_eq!(s.active_camera(), Some(&device("front")));
        s.stop().await;
    }

    #[tokio::test]
    async fn discard_pending_drops_decodes_that_arrived_during_verification() {
        let decoder = MockDecoder::default();
        let mut s = session(MockCameras::two(), decoder.clone());
        s.start("back", ScanHints::default()).await.unwrap();
        decoder.emit("checked");
        assert_eq!(s.next_decoded().await.as_deref(), Some("checked"));

        decoder.emit("stale 1");
        decoder.emit("stale 2");

        assert_eq!(s.discard_pending(), 2);
        decoder.emit("fresh");
        assert_eq!(s.next_decoded().await.as_deref(), Some("fresh"));
        s.stop().await;
    }

    #[tokio::test]
    async fn discard_pending_keeps_decodes_queued_before_hand_out() {
        let decoder = MockDecoder::default();
        let mut s = session(MockCameras::two(), decoder.clone());
        s.start("back", ScanHints::default()).await.unwrap();
        decoder.emit("wrong");
        decoder.emit("right");
        assert_eq!(s.next_decoded().await.as_deref(), Some("wrong"));

        decoder.emit("during");

        assert_eq!(s.discard_pending(), 1);
        assert_eq!(s.next_decoded().await.as_deref(), Some("right"));
        decoder.emit("after");
        assert_eq!(s.next_decoded().await.as_deref(), Some("after"));
        s.stop().await;
    }

    #[tokio::test]
    async fn held_decodes_are_dropped_with_their_attempt() {
        let decoder = MockDecoder::default();
        let mut s = session(MockCameras::two(), decoder.clone());
        s.start("back", ScanHints::default()).await.unwrap();
        decoder.emit("one");
        decoder.emit("two");
        assert_eq!(s.next_decoded().await.as_deref(), Some("one"));
        s.discard_pending();

        s.start("front", ScanHints::default()).await.unwrap();
        decoder.emit("fresh");

        assert_eq!(s.next_decoded().await.as_deref(), Some("fresh"));
        s.stop().await;
    }

    #[tokio::test]
    async fn decoder_receives_clamped_settings() {
        let decoder = MockDecoder::default();
        let mut s = session(MockCameras::two(), decoder.clone());
        let hints = ScanHints {
            frame_rate: 12,
            scan_box: 250,
            display_width: Some(220),
        };

        s.start("back", hints).await.unwrap();

        let settings = decoder.0.lock().unwrap().settings.unwrap();
        assert_eq!(settings.frame_rate, 12);
        assert_eq!(settings.scan_box, 180);
        s.close().await;
        assert!(!decoder.is_scanning());
    }
}
