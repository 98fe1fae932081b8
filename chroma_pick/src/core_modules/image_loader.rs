// THEORY:
// Image decoding is the only asynchronous step in the engine. The loader validates
// an upload, then decodes it on tokio's blocking pool so the event loop stays free
// for other gestures while a large image is being decoded.
//
// A decode is always tied to the `LoadTicket` the raster handed out when the upload
// began; the ticket travels with the result so the session can tell a current decode
// from one that a newer upload has already superseded.

use crate::core_modules::raster::raster::LoadTicket;
use crate::error::{PickerError, Result};
use image::{ImageFormat, RgbaImage};
use std::path::Path;
use tokio::runtime::Handle;
use tokio::task::JoinHandle;
use tracing::debug;

const FALLBACK_MIME: &str = "application/octet-stream";

/// A user-selected or dropped file.
#[derive(Debug, Clone)]
pub struct Upload {
    pub name: String,
    pub mime: String,
    pub bytes: Vec<u8>,
}

impl Upload {
    pub fn new(name: impl Into<String>, mime: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self {
            name: name.into(),
            mime: mime.into(),
            bytes,
        }
    }

    /// Reads a file, deriving its MIME type from the extension.
    pub async fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let bytes = tokio::fs::read(path).await?;
        let mime = ImageFormat::from_path(path)
            .map(|format| format.to_mime_type())
            .unwrap_or(FALLBACK_MIME);
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        Ok(Self::new(name, mime, bytes))
    }
}

/// Only `image/*` uploads may be sampled.
pub fn validate_mime(mime: &str) -> Result<()> {
    let is_image = mime
        .split_once('/')
        .is_some_and(|(kind, subtype)| kind.eq_ignore_ascii_case("image") && !subtype.is_empty());
    if is_image {
        Ok(())
    } else {
        Err(PickerError::InvalidFileType { mime: mime.to_string() })
    }
}

/// Decodes any format the `image` crate recognises into RGBA8.
pub fn decode(bytes: &[u8]) -> Result<RgbaImage> {
    let image = image::load_from_memory(bytes)?;
    Ok(image.to_rgba8())
}

/// A decode running on the blocking pool.
#[derive(Debug)]
pub struct PendingLoad {
    ticket: LoadTicket,
    handle: JoinHandle<Result<RgbaImage>>,
}

/// The finished decode and the ticket it belongs to.
pub struct DecodedImage {
    pub ticket: LoadTicket,
    pub image: Result<RgbaImage>,
}

/// The tokio runtime the calling thread is inside of, if any.
pub fn current_runtime() -> Result<Handle> {
    Handle::try_current().map_err(|_| PickerError::RuntimeUnavailable)
}

impl PendingLoad {
    /// Starts decoding `bytes` on `runtime`'s blocking pool.
    pub fn spawn(runtime: &Handle, ticket: LoadTicket, bytes: Vec<u8>) -> Self {
        let handle = runtime.spawn_blocking(move || decode(&bytes));
        Self { ticket, handle }
    }

    pub fn ticket(&self) -> LoadTicket {
        self.ticket
    }

    pub async fn wait(self) -> DecodedImage {
        let image = match self.handle.await {
            Ok(result) => result,
            Err(join_error) => Err(PickerError::ImageDecodeFailure(image::ImageError::IoError(
                std::io::Error::other(join_error),
            ))),
        };
        debug!(generation = self.ticket.generation, ok = image.is_ok(), "decode finished");
        DecodedImage {
            ticket: self.ticket,
            image,
        }
    }
}
