//! A text "camera" that treats each line on standard input as one decoded frame.
//!
//! Lets the scan flow run from a terminal or a pipe, e.g. a hardware
//! barcode wedge or `echo TOKEN | patrol scan ...`.

use async_trait::async_trait;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::task::JoinHandle;
use tracing::debug;

use super::camera::{
    CameraDescriptor, CameraError, CameraProvider, CameraTarget, CodeDecoder, DecodeSink,
    StreamSettings,
};

pub const STDIN_CAMERA_ID: &str = "stdin";

/// Lists the single standard-input device.
#[derive(Debug, Clone, Copy, Default)]
pub struct StdinCamera;

#[async_trait]
impl CameraProvider for StdinCamera {
    async fn list_cameras(&self) -> Result<Vec<CameraDescriptor>, CameraError> {
        Ok(vec![CameraDescriptor::new(STDIN_CAMERA_ID, "Standard input")])
    }
}

/// Reads lines from standard input on a background task.
#[derive(Debug, Default)]
pub struct StdinDecoder {
    reader: Option<JoinHandle<()>>,
}

#[async_trait]
impl CodeDecoder for StdinDecoder {
    async fn start(
        &mut self,
        target: &CameraTarget,
        _settings: &StreamSettings,
        sink: DecodeSink,
    ) -> Result<(), CameraError> {
        if let CameraTarget::Device(id) = target
            && id != STDIN_CAMERA_ID
        {
            return Err(CameraError::NotFound);
        }
        if self.is_scanning() {
            return Err(CameraError::Busy);
        }

        self.reader = Some(tokio::spawn(async move {
            let mut lines = BufReader::new(tokio::io::stdin()).lines();
            while let Ok(Some(line)) = lines.next_line().await {
                let text = line.trim();
                if text.is_empty() {
                    continue;
                }
                if !sink.deliver(text.to_string()) {
                    break;
                }
            }
            debug!("standard input closed");
        }));
        Ok(())
    }

    async fn stop(&mut self) -> Result<(), CameraError> {
        if let Some(reader) = self.reader.take() {
            reader.abort();
        }
        Ok(())
    }

    fn is_scanning(&self) -> bool {
        self.reader.as_ref().is_some_and(|r| !r.is_finished())
    }
}
