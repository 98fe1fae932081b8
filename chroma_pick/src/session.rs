// THEORY:
// The `session` module is the top-level API of the picker engine. A
// `PickerSession` is the single mutable owner of everything a picker UI shows:
// the raster, the display layout and view, the current color and the history.
// The shell forwards each user gesture to one method and re-renders from the
// accessors afterwards.
//
// Key architectural principles:
// 1.  **Derivations stay pure**: palettes, contrast grades and history updates
//     are computed by the `core_modules` functions from plain values. The
//     session only decides which value is current.
// 2.  **Failures change nothing**: every method either completes or returns an
//     error with the current color, history and raster exactly as they were.
//     History is persisted before it is swapped in, so a failed write cannot
//     leave the shown history ahead of the stored one.
// 3.  **Uploads are split in two**: `begin_upload` synchronously supersedes the
//     current image and starts the decode; `finish_upload` applies the result.
//     Between the two the raster is `Unready`, and any number of newer uploads
//     may begin. Only the newest one is ever painted.

use crate::config::SessionConfig;
use crate::core_modules::clipboard::ClipboardSink;
use crate::core_modules::color::color::Color;
use crate::core_modules::contrast::ContrastResult;
use crate::core_modules::coordinate_mapper::{
    BoundsPolicy, CanvasTransform, DisplayLayout, ViewState, to_raster_index, viewport_to_canvas,
};
use crate::core_modules::export;
use crate::core_modules::history::{ColorHistory, parse_history_json};
use crate::core_modules::image_loader::{DecodedImage, PendingLoad, Upload, current_runtime, validate_mime};
use crate::core_modules::palette::{PaletteSet, build_palette_set};
use crate::core_modules::raster::raster::Raster;
use crate::core_modules::storage::KeyValueStore;
use crate::error::{PickerError, Result};
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

/// What happened to a finished decode.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadOutcome {
    /// The image is on the raster and can be sampled.
    Painted,
    /// A newer upload began in the meantime; this image was discarded.
    Superseded,
}

pub struct PickerSession {
    config: SessionConfig,
    store: Box<dyn KeyValueStore>,
    raster: Raster,
    /// Explicit intrinsic canvas size. When unset, each image sizes the canvas.
    canvas_size: Option<(u32, u32)>,
    layout: Option<DisplayLayout>,
    view: ViewState,
    transform: CanvasTransform,
    current: Option<Color>,
    history: ColorHistory,
    dragging: bool,
    /// Current color before the active drag began; restored if the drag is abandoned.
    pre_drag: Option<Color>,
    background: Color,
}

impl PickerSession {
    /// Opens a session, restoring history from the persisted slot.
    pub fn new(config: SessionConfig, store: impl KeyValueStore + 'static) -> Result<Self> {
        config.validate()?;
        let history = match store.get(&config.storage_key)? {
            None => ColorHistory::new(),
            Some(json) => match parse_history_json(&json) {
                Ok(colors) => ColorHistory::from_colors(colors, config.history_policy()),
                Err(e) => {
                    warn!(key = %config.storage_key, error = %e, "ignoring corrupt persisted history");
                    ColorHistory::new()
                }
            },
        };
        info!(key = %config.storage_key, colors = history.len(), "picker session opened");

        Ok(Self {
            config,
            store: Box::new(store),
            raster: Raster::new(0, 0),
            canvas_size: None,
            layout: None,
            view: ViewState::default(),
            transform: CanvasTransform::default(),
            current: None,
            history,
            dragging: false,
            pre_drag: None,
            background: Color::WHITE,
        })
    }

    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    pub fn raster(&self) -> &Raster {
        &self.raster
    }

    pub fn store(&self) -> &dyn KeyValueStore {
        self.store.as_ref()
    }

    pub fn is_ready(&self) -> bool {
        self.raster.is_ready()
    }

    pub fn transform(&self) -> CanvasTransform {
        self.transform
    }

    pub fn current_color(&self) -> Option<Color> {
        self.current
    }

    pub fn history(&self) -> &ColorHistory {
        &self.history
    }

    pub fn background(&self) -> Color {
        self.background
    }

    pub fn set_background(&mut self, background: Color) {
        self.background = background;
    }

    // --- Image loading ---

    /// Supersedes the current image and starts decoding `upload` off-thread.
    /// Outside a tokio runtime this fails with `RuntimeUnavailable` and nothing
    /// changes. A drag in progress is abandoned, not committed.
    pub fn begin_upload(&mut self, upload: Upload) -> Result<PendingLoad> {
        if let Err(e) = validate_mime(&upload.mime) {
            warn!(name = %upload.name, mime = %upload.mime, "rejected upload");
            return Err(e);
        }
        let runtime = current_runtime()?;
        let ticket = self.raster.begin_load();
        self.cancel_drag();
        info!(
            name = %upload.name,
            bytes = upload.bytes.len(),
            generation = ticket.generation,
            "image upload started"
        );
        Ok(PendingLoad::spawn(&runtime, ticket, upload.bytes))
    }

    /// Applies a finished decode. Stale decodes are dropped without touching
    /// anything, including stale failures.
    pub fn finish_upload(&mut self, decoded: DecodedImage) -> Result<LoadOutcome> {
        let DecodedImage { ticket, image } = decoded;
        if ticket.generation != self.raster.generation() {
            warn!(
                stale = ticket.generation,
                current = self.raster.generation(),
                "discarding superseded decode"
            );
            return Ok(LoadOutcome::Superseded);
        }

        let image = match image {
            Ok(image) => image,
            Err(e) => {
                self.raster.fail_load(ticket);
                warn!(generation = ticket.generation, error = %e, "image decode failed");
                return Err(e);
            }
        };

        let (width, height) = image.dimensions();
        if self.canvas_size.is_none() {
            self.raster.resize(width, height);
        }
        if !self.raster.complete_load(ticket, image) {
            return Ok(LoadOutcome::Superseded);
        }
        self.refresh_transform();
        info!(
            generation = ticket.generation,
            width,
            height,
            canvas_width = self.raster.width(),
            canvas_height = self.raster.height(),
            "image loaded"
        );
        Ok(LoadOutcome::Painted)
    }

    /// `begin_upload`, wait for the decode, then `finish_upload`.
    pub async fn load_image(&mut self, upload: Upload) -> Result<LoadOutcome> {
        let pending = self.begin_upload(upload)?;
        let decoded = pending.wait().await;
        self.finish_upload(decoded)
    }

    // --- Layout and view ---

    /// Records where the canvas is displayed. A change of intrinsic size
    /// resizes and repaints the raster.
    pub fn set_layout(&mut self, layout: DisplayLayout) {
        self.layout = Some(layout);
        let size = (layout.intrinsic_width, layout.intrinsic_height);
        if self.canvas_size == Some(size) {
            self.refresh_transform();
        } else {
            self.resize_canvas(size.0, size.1);
        }
    }

    /// Zoom and pan only move the displayed canvas; the raster is unaffected.
    pub fn set_view(&mut self, view: ViewState) {
        self.view = view;
        self.refresh_transform();
    }

    pub fn resize_canvas(&mut self, width: u32, height: u32) {
        self.canvas_size = Some((width, height));
        if let Some(layout) = self.layout.as_mut() {
            layout.intrinsic_width = width;
            layout.intrinsic_height = height;
        }
        self.raster.resize(width, height);
        self.refresh_transform();
        debug!(width, height, ready = self.raster.is_ready(), "canvas resized");
    }

    fn refresh_transform(&mut self) {
        let layout = self
            .layout
            .unwrap_or_else(|| DisplayLayout::unscaled(self.raster.width(), self.raster.height()));
        self.transform = CanvasTransform::new(&layout, &self.view);
    }

    // --- Sampling ---

    fn sample(&self, pointer_x: f64, pointer_y: f64) -> Result<Color> {
        if !self.raster.is_ready() {
            warn!(pointer_x, pointer_y, "sample requested before the image was painted");
            return Err(PickerError::RasterNotReady);
        }
        let canvas = viewport_to_canvas(pointer_x, pointer_y, &self.transform);
        let result = to_raster_index(canvas, self.raster.width(), self.raster.height(), self.config.bounds_policy)
            .map(|(x, y)| match (self.config.bounds_policy, self.raster.placement()) {
                // Clamp onto the painted image, not onto letterbox margins.
                (BoundsPolicy::Clamp, Some(placement)) => {
                    let region = placement.region;
                    (
                        x.clamp(region.x, region.x + region.width - 1),
                        y.clamp(region.y, region.y + region.height - 1),
                    )
                }
                _ => (x, y),
            })
            .and_then(|(x, y)| self.raster.sample_pixel(x, y).map(|color| (x, y, color)));

        match result {
            Ok((x, y, color)) => {
                debug!(pointer_x, pointer_y, x, y, color = %color, "sampled pixel");
                Ok(color)
            }
            Err(e) => {
                warn!(pointer_x, pointer_y, error = %e, "sample rejected");
                Err(e)
            }
        }
    }

    /// A click: samples the pixel under the pointer, makes it current and
    /// records it in history.
    pub fn pick_at(&mut self, pointer_x: f64, pointer_y: f64) -> Result<Color> {
        let color = self.sample(pointer_x, pointer_y)?;
        self.commit(color)?;
        Ok(color)
    }

    /// Starts a drag. The color under the pointer becomes current but is not
    /// recorded until `pointer_up`.
    pub fn pointer_down(&mut self, pointer_x: f64, pointer_y: f64) -> Result<Color> {
        let color = self.sample(pointer_x, pointer_y)?;
        if !self.dragging {
            self.pre_drag = self.current;
        }
        self.current = Some(color);
        self.dragging = true;
        Ok(color)
    }

    /// Live preview while dragging. Returns `None` when no drag is active.
    pub fn pointer_move(&mut self, pointer_x: f64, pointer_y: f64) -> Result<Option<Color>> {
        if !self.dragging {
            return Ok(None);
        }
        let color = self.sample(pointer_x, pointer_y)?;
        self.current = Some(color);
        Ok(Some(color))
    }

    /// Ends a drag, recording the last previewed color once.
    pub fn pointer_up(&mut self) -> Result<Option<Color>> {
        if !self.dragging {
            return Ok(None);
        }
        self.dragging = false;
        self.pre_drag = None;
        match self.current {
            Some(color) => {
                self.commit(color)?;
                Ok(Some(color))
            }
            None => Ok(None),
        }
    }

    fn cancel_drag(&mut self) {
        if self.dragging {
            self.dragging = false;
            self.current = self.pre_drag.take();
            debug!(restored = ?self.current.map(|c| c.to_hex()), "drag abandoned");
        }
    }

    /// Makes a swatch color current without sampling and records it.
    pub fn select_color(&mut self, color: Color) -> Result<()> {
        self.commit(color)
    }

    fn commit(&mut self, color: Color) -> Result<()> {
        let history = self.history.pushed(color, self.config.history_policy());
        self.replace_history(history)?;
        self.current = Some(color);
        Ok(())
    }

    fn replace_history(&mut self, history: ColorHistory) -> Result<()> {
        let json = history.to_json(false)?;
        self.store.set(&self.config.storage_key, &json)?;
        debug!(colors = history.len(), latest = ?history.latest().map(|c| c.to_hex()), "history updated");
        self.history = history;
        Ok(())
    }

    // --- Derived values ---

    pub fn palette(&self) -> Option<PaletteSet> {
        self.current.map(|color| build_palette_set(color, self.config.ramp_steps))
    }

    /// Contrast of the current color against the session background.
    pub fn contrast(&self) -> Option<ContrastResult> {
        self.contrast_with(self.background)
    }

    pub fn contrast_with(&self, background: Color) -> Option<ContrastResult> {
        self.current
            .map(|color| ContrastResult::between(&color, &background, self.config.tier_policy))
    }

    // --- Reset ---

    pub fn reset_history(&mut self) -> Result<()> {
        self.replace_history(ColorHistory::new())?;
        info!("color history cleared");
        Ok(())
    }

    /// Clears history, the current color and the loaded image.
    pub fn reset(&mut self) -> Result<()> {
        self.reset_history()?;
        self.raster.clear();
        self.current = None;
        self.dragging = false;
        self.pre_drag = None;
        Ok(())
    }

    // --- Import / export ---

    pub fn export_history_json(&self) -> Result<String> {
        self.history.to_json(self.config.pretty_export)
    }

    /// Writes `color-history.json` into `dir`.
    pub fn write_history_export(&self, dir: &Path) -> Result<PathBuf> {
        export::write_history_json(dir, &self.history, self.config.pretty_export)
    }

    /// Replaces history with the imported colors. Any invalid entry rejects the
    /// whole document and history is left as it was.
    pub fn import_history_json(&mut self, json: &str) -> Result<usize> {
        let colors = match parse_history_json(json) {
            Ok(colors) => colors,
            Err(e) => {
                warn!(error = %e, "history import rejected");
                return Err(e);
            }
        };
        let imported = colors.len();
        self.replace_history(ColorHistory::from_colors(colors, self.config.history_policy()))?;
        info!(imported, kept = self.history.len(), "color history imported");
        Ok(self.history.len())
    }

    /// Reads and imports a history file. Unreadable files are `Storage` errors;
    /// content that is not UTF-8 JSON is an `ImportParseFailure`.
    pub async fn import_history_file(&mut self, path: impl AsRef<Path>) -> Result<usize> {
        let bytes = tokio::fs::read(path.as_ref()).await?;
        let json = String::from_utf8(bytes).map_err(|e| {
            let e = PickerError::ImportParseFailure(format!("file is not UTF-8 text: {e}"));
            warn!(error = %e, "history import rejected");
            e
        })?;
        self.import_history_json(&json)
    }

    /// Writes `color-palette.png` with one swatch per color into `dir`.
    pub fn write_palette_png(&self, dir: &Path, colors: &[Color]) -> Result<PathBuf> {
        export::write_palette_png(dir, colors)
    }

    /// Copies the current color's hex string. Returns what was copied.
    pub fn copy_current(&self, clipboard: &mut dyn ClipboardSink) -> Result<String> {
        let hex = self
            .current
            .map(|color| color.to_hex())
            .ok_or_else(|| PickerError::ClipboardWriteFailure("no color is selected".into()))?;
        clipboard.write_text(&hex).map_err(|reason| {
            warn!(%reason, "clipboard write refused");
            PickerError::ClipboardWriteFailure(reason)
        })?;
        debug!(%hex, "copied to clipboard");
        Ok(hex)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core_modules::clipboard::MemoryClipboard;
    use crate::core_modules::contrast::AccessibilityTier;
    use crate::core_modules::storage::{FileStore, MemoryStore};
    use image::{ImageEncoder, Rgba, RgbaImage, codecs::png::PngEncoder};

    const RED: Color = Color::new(255, 0, 0);
    const BLUE: Color = Color::new(0, 0, 255);

    fn png(image: &RgbaImage) -> Upload {
        let mut bytes = Vec::new();
        PngEncoder::new(&mut bytes)
            .write_image(image.as_raw(), image.width(), image.height(), image::ExtendedColorType::Rgba8)
            .expect("encode png");
        Upload::new("test.png", "image/png", bytes)
    }

    fn solid(width: u32, height: u32, color: Color) -> Upload {
        png(&RgbaImage::from_pixel(width, height, Rgba([color.red, color.green, color.blue, 255])))
    }

    fn session() -> PickerSession {
        PickerSession::new(SessionConfig::default(), MemoryStore::new()).unwrap()
    }

    #[tokio::test]
    async fn click_on_solid_red_picks_red() {
        let mut session = session();
        assert_eq!(session.load_image(solid(32, 32, RED)).await.unwrap(), LoadOutcome::Painted);
        assert_eq!(session.pick_at(10.0, 10.0).unwrap().to_hex(), "#ff0000");
        assert_eq!(session.current_color(), Some(RED));
        assert_eq!(session.history().to_vec(), vec![RED]);
        assert_eq!(
            session.store().get("colorHistory").unwrap().as_deref(),
            Some(r##"["#ff0000"]"##)
        );
    }

    #[tokio::test]
    async fn css_scaled_click_maps_to_intrinsic_pixel() {
        let mut image = RgbaImage::from_pixel(200, 100, Rgba([0, 0, 0, 255]));
        image.put_pixel(100, 50, Rgba([0, 0, 255, 255]));
        let mut session = session();
        session.set_layout(DisplayLayout {
            left: 0.0,
            top: 0.0,
            displayed_width: 100.0,
            displayed_height: 50.0,
            intrinsic_width: 200,
            intrinsic_height: 100,
        });
        session.load_image(png(&image)).await.unwrap();
        assert_eq!(session.pick_at(50.0, 25.0).unwrap(), BLUE);
    }

    #[tokio::test]
    async fn zoom_is_inverted_before_sampling() {
        let mut image = RgbaImage::from_pixel(4, 4, Rgba([0, 0, 0, 255]));
        image.put_pixel(1, 1, Rgba([255, 0, 0, 255]));
        let mut session = session();
        session.load_image(png(&image)).await.unwrap();
        session.set_view(ViewState { zoom: 2.0, pan_x: 0.0, pan_y: 0.0 });
        assert!(session.is_ready());
        assert_eq!(session.pick_at(3.0, 3.0).unwrap(), RED);
    }

    #[test]
    fn sampling_before_load_is_rejected() {
        let mut session = session();
        assert!(matches!(session.pick_at(1.0, 1.0), Err(PickerError::RasterNotReady)));
        assert!(session.history().is_empty());
        assert_eq!(session.current_color(), None);
    }

    #[tokio::test]
    async fn stale_decode_never_overwrites_newer_image() {
        let mut session = session();
        let first = session.begin_upload(solid(8, 8, RED)).unwrap();
        let second = session.begin_upload(solid(8, 8, BLUE)).unwrap();

        let newer = second.wait().await;
        assert_eq!(session.finish_upload(newer).unwrap(), LoadOutcome::Painted);
        let older = first.wait().await;
        assert_eq!(session.finish_upload(older).unwrap(), LoadOutcome::Superseded);

        assert_eq!(session.pick_at(4.0, 4.0).unwrap(), BLUE);
    }

    #[tokio::test]
    async fn sampling_waits_for_the_pending_decode() {
        let mut session = session();
        session.load_image(solid(8, 8, RED)).await.unwrap();
        let pending = session.begin_upload(solid(8, 8, BLUE)).unwrap();
        assert!(matches!(session.pick_at(1.0, 1.0), Err(PickerError::RasterNotReady)));
        session.finish_upload(pending.wait().await).unwrap();
        assert_eq!(session.pick_at(1.0, 1.0).unwrap(), BLUE);
    }

    #[tokio::test]
    async fn non_image_upload_changes_nothing() {
        let mut session = session();
        session.load_image(solid(4, 4, RED)).await.unwrap();
        session.pick_at(0.0, 0.0).unwrap();
        let err = session
            .load_image(Upload::new("notes.txt", "text/plain", b"hello".to_vec()))
            .await
            .unwrap_err();
        assert!(matches!(err, PickerError::InvalidFileType { ref mime } if mime == "text/plain"));
        assert!(session.is_ready());
        assert_eq!(session.pick_at(1.0, 1.0).unwrap(), RED);
    }

    #[tokio::test]
    async fn corrupt_image_keeps_color_and_history() {
        let mut session = session();
        session.load_image(solid(4, 4, RED)).await.unwrap();
        session.pick_at(0.0, 0.0).unwrap();

        let corrupt = Upload::new("broken.png", "image/png", b"not really a png".to_vec());
        assert!(matches!(
            session.load_image(corrupt).await,
            Err(PickerError::ImageDecodeFailure(_))
        ));
        assert_eq!(session.current_color(), Some(RED));
        assert_eq!(session.history().to_vec(), vec![RED]);
        assert!(matches!(session.pick_at(0.0, 0.0), Err(PickerError::RasterNotReady)));
    }

    #[tokio::test]
    async fn bounds_policy_decides_off_image_clicks() {
        let mut image = RgbaImage::from_pixel(4, 4, Rgba([0, 0, 0, 255]));
        image.put_pixel(3, 3, Rgba([0, 0, 255, 255]));

        let mut clamping = session();
        clamping.load_image(png(&image)).await.unwrap();
        assert_eq!(clamping.pick_at(100.0, 100.0).unwrap(), BLUE);

        let config = SessionConfig { bounds_policy: BoundsPolicy::Reject, ..SessionConfig::default() };
        let mut rejecting = PickerSession::new(config, MemoryStore::new()).unwrap();
        rejecting.load_image(png(&image)).await.unwrap();
        assert!(matches!(rejecting.pick_at(-5.0, 2.0), Err(PickerError::SampleOutOfBounds { .. })));
        assert!(rejecting.history().is_empty());
    }

    #[tokio::test]
    async fn clamping_stays_inside_the_letterboxed_image() {
        let mut session = session();
        session.resize_canvas(20, 10);
        session.load_image(solid(10, 10, RED)).await.unwrap();
        assert_eq!(session.pick_at(0.0, 5.0).unwrap(), RED);
    }

    #[tokio::test]
    async fn canvas_resize_repaints() {
        let mut session = session();
        session.load_image(solid(10, 10, RED)).await.unwrap();
        session.resize_canvas(40, 40);
        assert!(session.is_ready());
        assert_eq!(session.pick_at(39.0, 39.0).unwrap(), RED);
    }

    #[tokio::test]
    async fn drag_previews_and_commits_once() {
        let mut image = RgbaImage::from_pixel(2, 1, Rgba([255, 0, 0, 255]));
        image.put_pixel(1, 0, Rgba([0, 0, 255, 255]));
        let mut session = session();
        session.load_image(png(&image)).await.unwrap();

        assert_eq!(session.pointer_move(0.0, 0.0).unwrap(), None);
        assert_eq!(session.pointer_down(0.0, 0.0).unwrap(), RED);
        assert_eq!(session.pointer_move(1.0, 0.0).unwrap(), Some(BLUE));
        assert_eq!(session.current_color(), Some(BLUE));
        assert!(session.history().is_empty());

        assert_eq!(session.pointer_up().unwrap(), Some(BLUE));
        assert_eq!(session.history().to_vec(), vec![BLUE]);
        assert_eq!(session.pointer_up().unwrap(), None);
        assert_eq!(session.history().len(), 1);
    }

    #[test]
    fn upload_outside_a_runtime_changes_nothing() {
        let mut session = session();
        let err = session.begin_upload(solid(4, 4, RED)).unwrap_err();
        assert!(matches!(err, PickerError::RuntimeUnavailable));
        assert_eq!(session.raster().generation(), 0);
    }

    #[tokio::test]
    async fn upload_during_drag_restores_committed_color() {
        let mut image = RgbaImage::from_pixel(2, 1, Rgba([255, 0, 0, 255]));
        image.put_pixel(1, 0, Rgba([0, 0, 255, 255]));
        let mut session = session();
        session.load_image(png(&image)).await.unwrap();
        session.pick_at(0.0, 0.0).unwrap();

        session.pointer_down(1.0, 0.0).unwrap();
        assert_eq!(session.current_color(), Some(BLUE));
        let pending = session.begin_upload(solid(2, 1, RED)).unwrap();

        assert_eq!(session.current_color(), Some(RED));
        assert_eq!(session.history().to_vec(), vec![RED]);
        assert_eq!(session.pointer_up().unwrap(), None);
        session.finish_upload(pending.wait().await).unwrap();
        assert_eq!(session.history().to_vec(), vec![RED]);
    }

    #[test]
    fn selected_color_drives_palette_and_contrast() {
        let mut session = session();
        assert!(session.palette().is_none());
        assert!(session.contrast().is_none());

        session.select_color(Color::BLACK).unwrap();
        let contrast = session.contrast().unwrap();
        assert!((contrast.ratio - 21.0).abs() < 1e-6);
        assert_eq!(contrast.accessibility_tier, AccessibilityTier::AAA);
        assert_eq!(session.contrast_with(Color::BLACK).unwrap().accessibility_tier, AccessibilityTier::Fail);

        session.set_background(Color::BLACK);
        assert!((session.contrast().unwrap().ratio - 1.0).abs() < 1e-9);

        let palette = session.palette().unwrap();
        assert_eq!(palette.shades.len(), session.config().ramp_steps);
        assert_eq!(palette.shades.first(), Some(&Color::BLACK));
        assert_eq!(palette.tints.last(), Some(&Color::WHITE));
        assert_eq!(session.history().to_vec(), vec![Color::BLACK]);
    }

    #[test]
    fn strict_import_preserves_history_on_failure() {
        let mut session = session();
        session.select_color(RED).unwrap();
        let err = session.import_history_json(r##"["#00ff00", "green"]"##).unwrap_err();
        assert!(matches!(err, PickerError::ImportParseFailure(_)));
        assert_eq!(session.history().to_vec(), vec![RED]);
        assert!(session.import_history_json("{ not json").is_err());
        assert_eq!(session.history().to_vec(), vec![RED]);
    }

    #[test]
    fn import_replaces_history_under_policy() {
        let config = SessionConfig { history_max_len: 2, ..SessionConfig::default() };
        let mut session = PickerSession::new(config, MemoryStore::new()).unwrap();
        session.select_color(RED).unwrap();
        let kept = session
            .import_history_json(r##"["#0000FF", "#0000ff", "#00ff00", "#ffffff"]"##)
            .unwrap();
        assert_eq!(kept, 2);
        assert_eq!(session.history().to_vec(), vec![BLUE, Color::new(0, 255, 0)]);
        assert_eq!(
            session.store().get("colorHistory").unwrap().as_deref(),
            Some(r##"["#0000ff","#00ff00"]"##)
        );
    }

    #[tokio::test]
    async fn history_file_round_trips_through_export() {
        let dir = tempfile::tempdir().unwrap();
        let mut source = session();
        source.select_color(RED).unwrap();
        source.select_color(BLUE).unwrap();
        let path = source.write_history_export(dir.path()).unwrap();

        let mut target = session();
        assert_eq!(target.import_history_file(&path).await.unwrap(), 2);
        assert_eq!(target.history(), source.history());
        assert!(source.export_history_json().unwrap().contains("\"#0000ff\""));
    }

    #[tokio::test]
    async fn non_utf8_history_file_is_an_import_failure() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("color-history.json");
        std::fs::write(&path, [0xff, 0xfe, b'[', b']']).unwrap();

        let mut session = session();
        session.select_color(RED).unwrap();
        assert!(matches!(
            session.import_history_file(&path).await,
            Err(PickerError::ImportParseFailure(_))
        ));
        assert_eq!(session.history().to_vec(), vec![RED]);

        let missing = dir.path().join("missing.json");
        assert!(matches!(
            session.import_history_file(&missing).await,
            Err(PickerError::Storage(_))
        ));
    }

    #[test]
    fn history_survives_a_restart() {
        let dir = tempfile::tempdir().unwrap();
        {
            let mut session = PickerSession::new(SessionConfig::default(), FileStore::open(dir.path()).unwrap()).unwrap();
            session.select_color(RED).unwrap();
            session.select_color(BLUE).unwrap();
        }
        let reopened = PickerSession::new(SessionConfig::default(), FileStore::open(dir.path()).unwrap()).unwrap();
        assert_eq!(reopened.history().to_vec(), vec![BLUE, RED]);
    }

    #[test]
    fn corrupt_persisted_history_starts_empty() {
        let mut store = MemoryStore::new();
        store.set("colorHistory", "[\"#ff0000\", 12]").unwrap();
        let session = PickerSession::new(SessionConfig::default(), store).unwrap();
        assert!(session.history().is_empty());
    }

    #[test]
    fn invalid_config_is_rejected() {
        let config = SessionConfig { history_max_len: 0, ..SessionConfig::default() };
        assert!(matches!(
            PickerSession::new(config, MemoryStore::new()),
            Err(PickerError::Config(_))
        ));
    }

    #[test]
    fn clipboard_receives_hex_or_reports_denial() {
        let mut session = session();
        let mut clipboard = MemoryClipboard::new();
        assert!(matches!(
            session.copy_current(&mut clipboard),
            Err(PickerError::ClipboardWriteFailure(_))
        ));

        session.select_color(RED).unwrap();
        assert_eq!(session.copy_current(&mut clipboard).unwrap(), "#ff0000");
        assert_eq!(clipboard.contents(), Some("#ff0000"));

        let mut denied = MemoryClipboard::denied();
        assert!(matches!(
            session.copy_current(&mut denied),
            Err(PickerError::ClipboardWriteFailure(_))
        ));
        assert_eq!(session.current_color(), Some(RED));
    }

    #[tokio::test]
    async fn reset_clears_everything() {
        let mut session = session();
        session.load_image(solid(4, 4, RED)).await.unwrap();
        session.pick_at(1.0, 1.0).unwrap();

        session.reset_history().unwrap();
        assert!(session.history().is_empty());
        assert_eq!(session.current_color(), Some(RED));
        assert_eq!(session.store().get("colorHistory").unwrap().as_deref(), Some("[]"));

        session.pick_at(1.0, 1.0).unwrap();
        session.reset().unwrap();
        assert!(session.history().is_empty());
        assert_eq!(session.current_color(), None);
        assert!(matches!(session.pick_at(1.0, 1.0), Err(PickerError::RasterNotReady)));
    }

    #[test]
    fn palette_png_lands_in_the_chosen_directory() {
        let dir = tempfile::tempdir().unwrap();
        let mut session = session();
        session.select_color(RED).unwrap();
        let strip = session.palette().unwrap().strip();
        let path = session.write_palette_png(dir.path(), &strip).unwrap();
        assert_eq!(path, dir.path().join("color-palette.png"));
        assert!(path.exists());
    }
}
