// THEORY:
// Exports turn in-memory colors into the two downloadable artifacts: the history
// as `color-history.json` and the visible swatch strip as `color-palette.png`.
// Both are written into a caller-chosen directory under their fixed file names.

use crate::core_modules::color::color::Color;
use crate::core_modules::history::ColorHistory;
use crate::error::{PickerError, Result};
use image::{ImageEncoder, Rgba, RgbaImage, codecs::png::PngEncoder};
use std::fs::File;
use std::io::BufWriter;
use std::path::{Path, PathBuf};
use tracing::info;

pub const HISTORY_EXPORT_FILE: &str = "color-history.json";
pub const PALETTE_EXPORT_FILE: &str = "color-palette.png";

/// Edge length of one swatch in the exported strip.
pub const SWATCH_SIZE: u32 = 100;

/// One `swatch_size` square per color, left to right, fully opaque.
pub fn render_swatch_strip(colors: &[Color], swatch_size: u32) -> RgbaImage {
    let width = swatch_size * colors.len() as u32;
    RgbaImage::from_fn(width, swatch_size, |x, _| {
        let color = colors[(x / swatch_size) as usize];
        Rgba([color.red, color.green, color.blue, 255])
    })
}

pub fn save_png(path: &Path, image: &RgbaImage) -> Result<()> {
    let output = BufWriter::new(File::create(path)?);
    let encoder = PngEncoder::new(output);
    encoder
        .write_image(image.as_raw(), image.width(), image.height(), image::ExtendedColorType::Rgba8)
        .map_err(|e| PickerError::Storage(std::io::Error::other(e)))
}

/// Writes `color-palette.png` into `dir`. An empty strip still produces a file
/// holding a single transparent pixel, since PNG cannot be zero-sized.
pub fn write_palette_png(dir: &Path, colors: &[Color]) -> Result<PathBuf> {
    let path = dir.join(PALETTE_EXPORT_FILE);
    let image = if colors.is_empty() {
        RgbaImage::new(1, 1)
    } else {
        render_swatch_strip(colors, SWATCH_SIZE)
    };
    save_png(&path, &image)?;
    info!(path = %path.display(), swatches = colors.len(), "palette image exported");
    Ok(path)
}

/// Writes `color-history.json` into `dir`.
pub fn write_history_json(dir: &Path, history: &ColorHistory, pretty: bool) -> Result<PathBuf> {
    let path = dir.join(HISTORY_EXPORT_FILE);
    std::fs::write(&path, history.to_json(pretty)?)?;
    info!(path = %path.display(), colors = history.len(), "color history exported");
    Ok(path)
}
