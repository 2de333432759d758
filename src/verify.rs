//! Checkpoint verification: token identity, then spatial proximity.
//!
//! The engine holds no mutable state. Each call is a function of its inputs
//! plus at most one position fix from the geolocation provider.

use tokio::time;
use tracing::{debug, info, warn};

use crate::cancel::CancelToken;
use crate::geo::haversine_distance;
use crate::geolocation::{GeolocationError, GeolocationProvider, PositionOptions};
use crate::model::{Checkpoint, Verdict, Verification, VerifiedVisit, token_fingerprint};

/// Verification engine.
#[derive(Debug, Clone, Copy, Default)]
pub struct Verifier {
    options: PositionOptions,
}

impl Verifier {
    #[must_use]
    pub fn new(options: PositionOptions) -> Self {
        Self { options }
    }

    /// Decide whether `decoded` plus one position fix prove presence at `checkpoint`.
    ///
    /// A token mismatch returns before the provider is consulted. The fix is
    /// requested once, bounded by the configured timeout; no retries.
    pub async fn verify(
        &self,
        decoded: &str,
        checkpoint: &Checkpoint,
        provider: &dyn GeolocationProvider,
    ) -> Verification {
        let radius_meters = checkpoint.radius();

        if !checkpoint.matches_token(decoded) {
            info!(
                checkpoint = %checkpoint.id,
                scanned = %token_fingerprint(decoded),
                "scanned token does not match checkpoint"
            );
            return Verification {
                verdict: Verdict::TokenMismatch,
                radius_meters,
            };
        }

        debug!(checkpoint = %checkpoint.id, "token valid, requesting position fix");

        let fix = time::timeout(self.options.timeout, provider.current_position(&self.options))
            .await
            .unwrap_or(Err(GeolocationError::Timeout));

        let reading = match fix {
            Ok(reading) => reading,
            Err(cause) => {
                warn!(checkpoint = %checkpoint.id, error = %cause, "location unavailable");
                return Verification {
                    verdict: Verdict::LocationUnavailable { cause },
                    radius_meters,
                };
            }
        };

        let distance_meters = haversine_distance(reading, checkpoint.position());

        let verdict = if distance_meters <= radius_meters {
            Verdict::Verified(VerifiedVisit::new(checkpoint.id, reading, distance_meters))
        } else {
            Verdict::OutOfRange { distance_meters }
        };

        info!(
            checkpoint = %checkpoint.id,
            distance_meters,
            radius_meters,
            verified = matches!(verdict, Verdict::Verified(_)),
            "location checked"
        );

        Verification {
            verdict,
            radius_meters,
        }
    }

    /// Like [`verify`](Self::verify), but yields `None` if `cancel` fires first.
    ///
    /// A fix that arrives after cancellation is discarded.
    pub async fn verify_until_cancelled(
        &self,
        decoded: &str,
        checkpoint: &Checkpoint,
        provider: &dyn GeolocationProvider,
        cancel: &CancelToken,
    ) -> Option<Verification> {
        tokio::select! {
            biased;
            () = cancel.cancelled() => None,
            verification = self.verify(decoded, checkpoint, provider) => {
                (!cancel.is_cancelled()).then_some(verification)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    use async_trait::async_trait;
    use uuid::Uuid;

    use super::*;
    use crate::geo::GeoReading;

    /// Records how many fixes were requested and answers with a canned result.
    struct MockGeolocation {
        calls: AtomicUsize,
        answer: Result<GeoReading, GeolocationError>,
        delay: Duration,
    }

    impl MockGeolocation {
        fn at(latitude: f64, longitude: f64) -> Self {
            Self::answering(Ok(GeoReading::new(latitude, longitude)))
        }

        fn answering(answer: Result<GeoReading, GeolocationError>) -> Self {
            Self {
                calls: AtomicUsize::new(0),
                answer,
                delay: Duration::ZERO,
            }
        }

        fn slow(mut self, delay: Duration) -> Self {
            self.delay = delay;
            self
        }

        fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl GeolocationProvider for MockGeolocation {
        async fn current_position(
            &self,
            _options: &PositionOptions,
        ) -> Result<GeoReading, GeolocationError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if !self.delay.is_zero() {
                time::sleep(self.delay).await;
            }
            self.answer.clone()
        }
    }

    fn checkpoint(radius_meters: Option<f64>) -> Checkpoint {
        Checkpoint {
            id: Uuid::new_v4(),
            route_id: Uuid::new_v4(),
            name: "Loading dock".into(),
            sequence_order: 1,
            qr_code_value: "ABC123".into(),
            latitude: 40.0,
            longitude: -74.0,
            radius_meters,
        }
    }

    #[tokio::test]
    async fn verified_at_the_checkpoint() {
        let cp = checkpoint(Some(20.0));
        let geo = MockGeolocation::at(40.0, -74.0);

        let result = Verifier::default().verify("ABC123", &cp, &geo).await;

        assert!(result.is_verified());
        assert_eq!(result.distance_meters(), Some(0.0));
        assert_eq!(result.radius_meters, 20.0);
        let visit = result.visit().unwrap();
        assert_eq!(visit.checkpoint_id(), cp.id);
        assert_eq!(visit.reading(), GeoReading::new(40.0, -74.0));
    }

    #[tokio::test]
    async fn mismatch_never_requests_location() {
        let cp = checkpoint(Some(20.0));
        let geo = MockGeolocation::at(40.0, -74.0);

        let result = Verifier::default().verify("WRONG", &cp, &geo).await;

        assert_eq!(result.verdict, Verdict::TokenMismatch);
        assert_eq!(result.distance_meters(), None);
        assert_eq!(geo.calls(), 0);
    }

    #[tokio::test]
    async fn mismatch_regardless_of_provider_behavior() {
        let cp = checkpoint(Some(20.0));
        let geo = MockGeolocation::answering(Err(GeolocationError::Unsupported));

        let result = Verifier::default().verify("abc123", &cp, &geo).await;

        assert_eq!(result.verdict, Verdict::TokenMismatch);
        assert_eq!(geo.calls(), 0);
    }

    #[tokio::test]
    async fn out_of_range_reports_distance() {
        let cp = checkpoint(Some(20.0));
        let geo = MockGeolocation::at(40.001, -74.0);

        let result = Verifier::default().verify("ABC123", &cp, &geo).await;

        let Verdict::OutOfRange { distance_meters } = result.verdict else {
            panic!("expected out of range, got {:?}", result.verdict);
        };
        assert!((distance_meters - 111.2).abs() < 0.1, "got {distance_meters}");
        assert_eq!(result.radius_meters, 20.0);
        assert_eq!(geo.calls(), 1);
    }

    #[tokio::test]
    async fn boundary_distance_verifies() {
        let mut cp = checkpoint(None);
        let reading = GeoReading::new(40.0, -73.9995);
        cp.radius_meters = Some(haversine_distance(reading, cp.position()));
        let geo = MockGeolocation::answering(Ok(reading));

        let result = Verifier::default().verify("ABC123", &cp, &geo).await;

        assert!(result.is_verified(), "got {:?}", result.verdict);
    }

    #[tokio::test]
    async fn just_past_the_boundary_is_out_of_range() {
        let mut cp = checkpoint(None);
        let reading = GeoReading::new(40.0, -73.9995);
        cp.radius_meters = Some(haversine_distance(reading, cp.position()) - 0.01);
        let geo = MockGeolocation::answering(Ok(reading));

        let result = Verifier::default().verify("ABC123", &cp, &geo).await;

        assert!(matches!(result.verdict, Verdict::OutOfRange { .. }));
    }

    #[tokio::test]
    async fn zero_radius_behaves_like_twenty() {
        // 15 m north of the checkpoint: inside 20 m, outside anything "exact".
        let reading = GeoReading::new(40.000_135, -74.0);
        let zero = checkpoint(Some(0.0));
        let twenty = checkpoint(Some(20.0));

        let a = Verifier::default()
            .verify("ABC123", &zero, &MockGeolocation::answering(Ok(reading)))
            .await;
        let b = Verifier::default()
            .verify("ABC123", &twenty, &MockGeolocation::answering(Ok(reading)))
            .await;

        assert!(a.is_verified());
        assert!(b.is_verified());
        assert_eq!(a.radius_meters, b.radius_meters);
        assert_eq!(a.distance_meters(), b.distance_meters());
    }

    #[tokio::test]
    async fn provider_errors_are_location_unavailable() {
        let cp = checkpoint(Some(20.0));
        for cause in [
            GeolocationError::Unsupported,
            GeolocationError::PermissionDenied,
            GeolocationError::Unavailable("no satellites".into()),
        ] {
            let geo = MockGeolocation::answering(Err(cause.clone()));
            let result = Verifier::default().verify("ABC123", &cp, &geo).await;
            assert_eq!(result.verdict, Verdict::LocationUnavailable { cause });
            assert_eq!(result.distance_meters(), None);
            assert_eq!(geo.calls(), 1);
        }
    }

    #[tokio::test]
    async fn slow_provider_times_out() {
        let cp = checkpoint(Some(20.0));
        let geo = MockGeolocation::at(40.0, -74.0).slow(Duration::from_secs(30));
        let verifier = Verifier::new(PositionOptions {
            high_accuracy: true,
            timeout: Duration::from_millis(20),
        });

        let result = verifier.verify("ABC123", &cp, &geo).await;

        assert_eq!(
            result.verdict,
            Verdict::LocationUnavailable {
                cause: GeolocationError::Timeout
            }
        );
        assert_eq!(geo.calls(), 1);
    }

    #[tokio::test]
    async fn cancelled_attempt_discards_late_fix() {
        let cp = checkpoint(Some(20.0));
        let geo = MockGeolocation::at(40.0, -74.0).slow(Duration::from_millis(200));
        let cancel = CancelToken::new();

        let canceller = cancel.clone();
        tokio::spawn(async move {
            time::sleep(Duration::from_millis(10)).await;
            canceller.cancel();
        });

        let result = Verifier::default()
            .verify_until_cancelled("ABC123", &cp, &geo, &cancel)
            .await;

        assert!(result.is_none());
    }

    #[tokio::test]
    async fn uncancelled_attempt_yields_verdict() {
        let cp = checkpoint(Some(20.0));
        let geo = MockGeolocation::at(40.0, -74.0);

        let result = Verifier::default()
            .verify_until_cancelled("ABC123", &cp, &geo, &CancelToken::new())
            .await;

        assert!(result.is_some_and(|v| v.is_verified()));
    }
}
