// THEORY:
// This file is the entry point for the `chroma_pick` library crate: the engine
// behind an image color picker. A shell (desktop window, web view, CLI) hands it
// uploaded files, pointer positions and chosen colors; it hands back colors,
// palettes, contrast grades and export artifacts.
//
// The public face is `PickerSession` and its `SessionConfig`. The
// `core_modules` underneath are pure building blocks (color math, coordinate
// mapping, history, palettes) plus the one stateful piece, the `Raster`, and are
// exposed for shells that want to compose them differently.

pub mod config;
pub mod core_modules;
pub mod error;
pub mod session;

pub use crate::config::SessionConfig;
pub use crate::core_modules::clipboard::{ClipboardSink, MemoryClipboard};
pub use crate::core_modules::color::color::Color;
pub use crate::core_modules::contrast::{AccessibilityTier, ContrastResult, TierPolicy};
pub use crate::core_modules::coordinate_mapper::{BoundsPolicy, DisplayLayout, ViewState};
pub use crate::core_modules::history::ColorHistory;
pub use crate::core_modules::image_loader::{DecodedImage, PendingLoad, Upload};
pub use crate::core_modules::palette::PaletteSet;
pub use crate::core_modules::storage::{FileStore, KeyValueStore, MemoryStore};
pub use crate::error::{PickerError, Result};
pub use crate::session::{LoadOutcome, PickerSession};
