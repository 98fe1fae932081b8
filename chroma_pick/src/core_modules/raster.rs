// THEORY:
// The `Raster` is the canvas the picker samples from: an RGBA buffer the size of
// the canvas' intrinsic resolution, onto which the uploaded image is painted at a
// fit-to-canvas scale and offset. Sampling reads that buffer, never the source
// image, so what the user clicked on is exactly what gets read.
//
// Key architectural principles:
// 1.  **Two-state lifecycle**: the raster is either `Unready` or `Ready`. Samples
//     are only served while `Ready`. Starting a new load, resizing the canvas or
//     losing the image all drop it back to `Unready` before anything else happens,
//     so a sample can never observe a half-painted or stale buffer.
// 2.  **Load generations**: each `begin_load` hands out a `LoadTicket` carrying a
//     monotonically increasing generation. Decodes finish asynchronously and in any
//     order; `complete_load` only paints when the ticket is still the newest one and
//     discards everything else. A slow decode of an old upload therefore can never
//     overwrite a newer image.
// 3.  **Repaint discipline**: painting is always clear-then-draw over the whole
//     buffer, and the painted region is remembered so clicks on the letterbox
//     margins are reported as out of bounds instead of returning background pixels.

pub mod raster {
    use crate::core_modules::color::color::Color;
    use crate::error::{PickerError, Result};
    use image::{RgbaImage, imageops};
    use tracing::{debug, warn};

    pub type LoadGeneration = u64;

    const CHANNELS: usize = 4;

    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub enum RasterState {
        /// Nothing sampleable: no image yet, or a load/repaint is pending.
        Unready,
        /// The buffer holds the current image at the current placement.
        Ready,
    }

    /// Proof that a load was started; redeemed by `complete_load`/`fail_load`.
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct LoadTicket {
        pub generation: LoadGeneration,
    }

    /// Axis-aligned rectangle of canvas pixels.
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct Region {
        pub x: u32,
        pub y: u32,
        pub width: u32,
        pub height: u32,
    }

    impl Region {
        pub fn contains(&self, x: u32, y: u32) -> bool {
            x >= self.x && y >= self.y && x - self.x < self.width && y - self.y < self.height
        }
    }

    /// Scale and offset an image is drawn at.
    #[derive(Debug, Clone, Copy, PartialEq)]
    pub struct Placement {
        pub scale: f64,
        pub region: Region,
    }

    impl Placement {
        /// Largest uniform scale that fits `source` inside `canvas`, centered.
        pub fn fit(source: (u32, u32), canvas: (u32, u32)) -> Self {
            let (sw, sh) = source;
            let (cw, ch) = canvas;
            if sw == 0 || sh == 0 || cw == 0 || ch == 0 {
                return Self {
                    scale: 0.0,
                    region: Region { x: 0, y: 0, width: 0, height: 0 },
                };
            }
            let scale = (cw as f64 / sw as f64).min(ch as f64 / sh as f64);
            let width = ((sw as f64 * scale).round() as u32).clamp(1, cw);
            let height = ((sh as f64 * scale).round() as u32).clamp(1, ch);
            Self {
                scale,
                region: Region {
                    x: (cw - width) / 2,
                    y: (ch - height) / 2,
                    width,
                    height,
                },
            }
        }
    }

    /// The sampleable canvas.
    pub struct Raster {
        canvas: RgbaImage,
        state: RasterState,
        generation: LoadGeneration,
        /// The decoded image of the current generation, kept for repaints.
        source: Option<RgbaImage>,
        placement: Option<Placement>,
    }

    impl Raster {
        pub fn new(width: u32, height: u32) -> Self {
            Self {
                canvas: RgbaImage::new(width, height),
                state: RasterState::Unready,
                generation: 0,
                source: None,
                placement: None,
            }
        }

        /// A ready raster holding `image` at its native size.
        pub fn from_image(image: RgbaImage) -> Self {
            let mut raster = Raster::new(image.width(), image.height());
            let ticket = raster.begin_load();
            raster.complete_load(ticket, image);
            raster
        }

        pub fn width(&self) -> u32 {
            self.canvas.width()
        }

        pub fn height(&self) -> u32 {
            self.canvas.height()
        }

        pub fn state(&self) -> RasterState {
            self.state
        }

        pub fn is_ready(&self) -> bool {
            self.state == RasterState::Ready
        }

        pub fn generation(&self) -> LoadGeneration {
            self.generation
        }

        pub fn placement(&self) -> Option<Placement> {
            self.placement
        }

        pub fn has_image(&self) -> bool {
            self.source.is_some()
        }

        /// Supersedes whatever is loaded or loading and returns the new ticket.
        pub fn begin_load(&mut self) -> LoadTicket {
            self.generation += 1;
            self.state = RasterState::Unready;
            self.source = None;
            self.placement = None;
            debug!(generation = self.generation, "raster load started");
            LoadTicket { generation: self.generation }
        }

        /// Paints `image` if `ticket` is still current. Returns whether it was painted.
        pub fn complete_load(&mut self, ticket: LoadTicket, image: RgbaImage) -> bool {
            if ticket.generation != self.generation {
                warn!(
                    stale = ticket.generation,
                    current = self.generation,
                    "discarding superseded image load"
                );
                return false;
            }
            self.source = Some(image);
            self.repaint();
            true
        }

        /// Records a failed load. The raster stays `Unready` if the ticket is current.
        pub fn fail_load(&mut self, ticket: LoadTicket) {
            if ticket.generation == self.generation {
                self.state = RasterState::Unready;
                self.source = None;
                self.placement = None;
            }
        }

        /// Changes the intrinsic canvas size and repaints the current image, if any.
        pub fn resize(&mut self, width: u32, height: u32) {
            self.state = RasterState::Unready;
            self.canvas = RgbaImage::new(width, height);
            self.repaint();
        }

        /// Drops the image entirely; later samples fail until the next load.
        pub fn clear(&mut self) {
            self.generation += 1;
            self.state = RasterState::Unready;
            self.source = None;
            self.placement = None;
            self.canvas.pixels_mut().for_each(|p| p.0 = [0; CHANNELS]);
        }

        fn repaint(&mut self) {
            self.state = RasterState::Unready;
            self.canvas.pixels_mut().for_each(|p| p.0 = [0; CHANNELS]);

            let Some(source) = self.source.as_ref() else {
                self.placement = None;
                return;
            };

            let placement = Placement::fit(source.dimensions(), self.canvas.dimensions());
            let region = placement.region;
            if region.width == 0 || region.height == 0 {
                self.placement = None;
                return;
            }

            if (region.width, region.height) == source.dimensions() {
                imageops::replace(&mut self.canvas, source, region.x as i64, region.y as i64);
            } else {
                let scaled = imageops::resize(source, region.width, region.height, imageops::FilterType::Triangle);
                imageops::replace(&mut self.canvas, &scaled, region.x as i64, region.y as i64);
            }

            self.placement = Some(placement);
            self.state = RasterState::Ready;
            debug!(
                generation = self.generation,
                width = region.width,
                height = region.height,
                scale = placement.scale,
                "raster painted"
            );
        }

        /// Reads the color at canvas cell `(x, y)`, ignoring alpha.
        pub fn sample_pixel(&self, x: u32, y: u32) -> Result<Color> {
            if self.state != RasterState::Ready {
                return Err(PickerError::RasterNotReady);
            }
            let width = self.width();
            let height = self.height();
            let out_of_bounds = || PickerError::SampleOutOfBounds {
                x: x as i64,
                y: y as i64,
                width,
                height,
            };
            if x >= width || y >= height {
                return Err(out_of_bounds());
            }
            match self.placement {
                Some(placement) if placement.region.contains(x, y) => {}
                _ => return Err(out_of_bounds()),
            }

            let byte_index = ((y as usize * width as usize) + x as usize) * CHANNELS;
            let buffer = self.canvas.as_raw();
            let bytes: [u8; CHANNELS] = buffer
                .get(byte_index..byte_index + CHANNELS)
                .and_then(|slice| slice.try_into().ok())
                .ok_or_else(out_of_bounds)?;
            Ok(Color::from_rgba(bytes))
        }

        /// The painted canvas, for previews and snapshots.
        pub fn canvas(&self) -> &RgbaImage {
            &self.canvas
        }
    }

    /// Free-function form of `Raster::sample_pixel`.
    pub fn sample_pixel(raster: &Raster, x: u32, y: u32) -> Result<Color> {
        raster.sample_pixel(x, y)
    }

}
