// THEORY:
// The `CoordinateMapper` bridges the two coordinate systems of a picker: where the
// pointer is on screen (viewport pixels) and which raster cell that corresponds to
// (canvas pixels). The two differ for three independent reasons:
//
// 1.  **Placement**: the canvas element sits somewhere in the viewport; its bounding
//     box origin must be subtracted first.
// 2.  **Display transform**: an active zoom/pan is applied on top of the element.
//     Inverting it means subtracting the pan offset, then dividing by the zoom.
// 3.  **CSS scaling**: the element may be displayed at a different size than its
//     intrinsic raster size; the ratio `intrinsic / displayed` rescales each axis.
//
// All three collapse into one per-axis affine map, `CanvasTransform`, so the hot
// path is a subtract and a multiply. The transform is recomputed whenever layout or
// view state changes and is otherwise read-only.
//
// Out-of-range results are handled in exactly one place, `to_raster_index`, behind a
// single `BoundsPolicy`: either clamp onto the edge cell or reject the point.

use crate::error::{PickerError, Result};
use serde::{Deserialize, Serialize};

/// Where the canvas element is and how big it is, on screen and in its raster.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DisplayLayout {
    /// Bounding box left edge in viewport pixels.
    pub left: f64,
    /// Bounding box top edge in viewport pixels.
    pub top: f64,
    /// Displayed (CSS) width in viewport pixels.
    pub displayed_width: f64,
    /// Displayed (CSS) height in viewport pixels.
    pub displayed_height: f64,
    /// Raster width in canvas pixels.
    pub intrinsic_width: u32,
    /// Raster height in canvas pixels.
    pub intrinsic_height: u32,
}

impl DisplayLayout {
    /// A canvas displayed at its intrinsic size at the viewport origin.
    pub fn unscaled(width: u32, height: u32) -> Self {
        Self {
            left: 0.0,
            top: 0.0,
            displayed_width: width as f64,
            displayed_height: height as f64,
            intrinsic_width: width,
            intrinsic_height: height,
        }
    }
}

/// Zoom/pan applied on top of the displayed canvas.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ViewState {
    pub zoom: f64,
    /// Pan offset in viewport pixels.
    pub pan_x: f64,
    pub pan_y: f64,
}

impl Default for ViewState {
    fn default() -> Self {
        Self { zoom: 1.0, pan_x: 0.0, pan_y: 0.0 }
    }
}

/// What to do with a point that maps outside the raster.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BoundsPolicy {
    /// Snap onto the nearest edge cell.
    #[default]
    Clamp,
    /// Report `SampleOutOfBounds`.
    Reject,
}

impl std::str::FromStr for BoundsPolicy {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "clamp" => Ok(BoundsPolicy::Clamp),
            "reject" => Ok(BoundsPolicy::Reject),
            other => Err(format!("unknown bounds policy `{other}`")),
        }
    }
}

/// `canvas = (viewport - offset) * scale`, per axis.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CanvasTransform {
    pub scale_x: f64,
    pub scale_y: f64,
    pub offset_x: f64,
    pub offset_y: f64,
}

impl Default for CanvasTransform {
    fn default() -> Self {
        Self { scale_x: 1.0, scale_y: 1.0, offset_x: 0.0, offset_y: 0.0 }
    }
}

impl CanvasTransform {
    pub fn new(layout: &DisplayLayout, view: &ViewState) -> Self {
        // A collapsed element or a non-positive zoom would divide by zero; treat
        // those axes as unscaled.
        let zoom = if view.zoom > 0.0 { view.zoom } else { 1.0 };
        let axis_scale = |intrinsic: u32, displayed: f64| {
            if displayed > 0.0 {
                intrinsic as f64 / (displayed * zoom)
            } else {
                1.0 / zoom
            }
        };
        Self {
            scale_x: axis_scale(layout.intrinsic_width, layout.displayed_width),
            scale_y: axis_scale(layout.intrinsic_height, layout.displayed_height),
            offset_x: layout.left + view.pan_x,
            offset_y: layout.top + view.pan_y,
        }
    }
}

/// Maps a viewport point into continuous canvas coordinates. No bounds handling.
pub fn viewport_to_canvas(pointer_x: f64, pointer_y: f64, transform: &CanvasTransform) -> (f64, f64) {
    (
        (pointer_x - transform.offset_x) * transform.scale_x,
        (pointer_y - transform.offset_y) * transform.scale_y,
    )
}

/// Turns continuous canvas coordinates into a cell index of a `width`x`height`
/// raster, applying `policy` to anything outside `[0, width-1]x[0, height-1]`.
pub fn to_raster_index(
    canvas: (f64, f64),
    width: u32,
    height: u32,
    policy: BoundsPolicy,
) -> Result<(u32, u32)> {
    let out_of_bounds = |x: f64, y: f64| PickerError::SampleOutOfBounds {
        x: x as i64,
        y: y as i64,
        width,
        height,
    };
    let (x, y) = (canvas.0.floor(), canvas.1.floor());
    if width == 0 || height == 0 || !x.is_finite() || !y.is_finite() {
        return Err(out_of_bounds(x, y));
    }
    let max_x = (width - 1) as f64;
    let max_y = (height - 1) as f64;
    let inside = (0.0..=max_x).contains(&x) && (0.0..=max_y).contains(&y);
    match policy {
        _ if inside => Ok((x as u32, y as u32)),
        BoundsPolicy::Clamp => Ok((x.clamp(0.0, max_x) as u32, y.clamp(0.0, max_y) as u32)),
        BoundsPolicy::Reject => Err(out_of_bounds(x, y)),
    }
}
