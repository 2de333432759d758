//! Visit commands: verify a scanned token, record the inspection.

use patrol::config::Config;
use patrol::geo::GeoReading;
use patrol::geolocation::{FixedPosition, GeolocationProvider};
use patrol::inspector::resolve_inspector;
use patrol::model::{Checkpoint, Inspection, VerifiedVisit};
use patrol::scan::{CameraProvider, CodeDecoder, ScanSession, StdinCamera, StdinDecoder};
use patrol::storage::Storage;
use patrol::verify::Verifier;
use tracing::debug;

use super::{SubmitArgs, format::format_verdict, short_id};

pub(super) async fn cmd_verify(
    config: &Config,
    storage: &Storage,
    checkpoint: &Checkpoint,
    token: &str,
    position: Option<GeoReading>,
    submit: &SubmitArgs,
) -> Result<(), String> {
    // Resolve up front so a verified visit is never lost to a missing name.
    let inspector = resolve_inspector(submit.inspector.as_deref(), config)?;

    let verifier = Verifier::new(config.position_options());
    let verification = verifier
        .verify(token, checkpoint, &FixedPosition::new(position))
        .await;

    let message = format_verdict(checkpoint, &verification);
    let Some(visit) = verification.visit() else {
        return Err(message);
    };

    eprintln!("{message}");
    record(storage, visit, &inspector, submit)
}

pub(super) async fn cmd_scan(
    config: &Config,
    storage: &Storage,
    checkpoint: &Checkpoint,
    position: Option<GeoReading>,
    submit: &SubmitArgs,
) -> Result<(), String> {
    let inspector = resolve_inspector(submit.inspector.as_deref(), config)?;

    let mut session = ScanSession::new(StdinCamera, StdinDecoder::default(), config.scan_hints());
    let verifier = Verifier::new(config.position_options());
    let provider = FixedPosition::new(position);

    let outcome = scan_until_verified(&mut session, &verifier, checkpoint, &provider).await;
    session.close().await;

    record(storage, &outcome?, &inspector, submit)
}

/// Feed decoded codes to the verifier until one proves presence.
///
/// Failed attempts are reported and the scanner keeps running.
async fn scan_until_verified<P: CameraProvider, D: CodeDecoder>(
    session: &mut ScanSession<P, D>,
    verifier: &Verifier,
    checkpoint: &Checkpoint,
    provider: &dyn GeolocationProvider,
) -> Result<VerifiedVisit, String> {
    let cameras = session.enumerate_cameras().await.map_err(|e| e.to_string())?;
    for camera in cameras {
        eprintln!("Camera: {}", camera.display_label());
    }

    let camera_id = session
        .selected_camera()
        .map(str::to_string)
        .ok_or("no camera selected")?;
    if let Err(e) = session.start(&camera_id, session.hints()).await {
        debug!(error = %e, "first start failed, retrying");
        session.retry().await.map_err(|e| e.to_string())?;
    }

    eprintln!("Scan the code at {}.", checkpoint.name);

    while let Some(decoded) = session.next_decoded().await {
        let Some(cancel) = session.cancel_handle() else {
            break;
        };
        let Some(verification) = verifier
            .verify_until_cancelled(&decoded, checkpoint, provider, &cancel)
            .await
        else {
            break;
        };

        let message = format_verdict(checkpoint, &verification);
        if let Some(visit) = verification.visit() {
            eprintln!("{message}");
            return Ok(visit.clone());
        }

        eprintln!("{message}");
        session.discard_pending();
    }

    Err("scanner closed before the checkpoint was verified".to_string())
}

fn record(
    storage: &Storage,
    visit: &VerifiedVisit,
    inspector: &str,
    submit: &SubmitArgs,
) -> Result<(), String> {
    let inspection = Inspection::new(visit, inspector, submit.status(), submit.notes.clone());
    storage
        .append_inspection(&inspection)
        .map_err(|e| format!("failed to record inspection: {e}"))?;

    eprintln!(
        "Inspection {} recorded for checkpoint {}",
        short_id(inspection.id),
        short_id(inspection.checkpoint_id)
    );
    println!("{}", inspection.id);
    Ok(())
}
