// THEORY:
// Every failure the engine can report lives in a single taxonomy. None of them
// is fatal: each one is recovered at the call site by the shell, shown to the
// user as a transient message, and the session keeps whatever valid state it
// held before the failing call (current color, history, raster).

use thiserror::Error;

/// Errors surfaced by the picker engine.
#[derive(Debug, Error)]
pub enum PickerError {
    /// A file that is not `image/*` was offered as an upload.
    #[error("unsupported file type `{mime}`: only image/* files can be sampled")]
    InvalidFileType { mime: String },

    /// The image bytes could not be decoded.
    #[error("failed to decode image: {0}")]
    ImageDecodeFailure(#[from] image::ImageError),

    /// A sample landed outside the painted raster.
    #[error("sample at ({x}, {y}) is outside the {width}x{height} raster")]
    SampleOutOfBounds { x: i64, y: i64, width: u32, height: u32 },

    /// A sample was requested before the current image finished painting.
    #[error("no image has been painted onto the raster yet")]
    RasterNotReady,

    /// A history import did not contain a JSON array of `#rrggbb` strings.
    #[error("could not import color history: {0}")]
    ImportParseFailure(String),

    /// The clipboard refused the write.
    #[error("could not copy to clipboard: {0}")]
    ClipboardWriteFailure(String),

    /// A channel value outside `[0, 255]` was handed to `rgb_to_hex`.
    #[error("{channel} channel value {value} is outside [0, 255]")]
    ChannelOutOfRange { channel: &'static str, value: i32 },

    /// A string that is not a `#rrggbb` color.
    #[error("`{0}` is not a #rrggbb hex color")]
    InvalidHex(String),

    /// Decoding needs a tokio runtime and none is running on this thread.
    #[error("no async runtime is available to decode the image")]
    RuntimeUnavailable,

    #[error("storage error: {0}")]
    Storage(#[from] std::io::Error),

    #[error("invalid configuration: {0}")]
    Config(String),
}

pub type Result<T> = std::result::Result<T, PickerError>;
