// THEORY:
// `ColorHistory` is the picker's memory: the colors the user settled on, most
// recent first. It is a bounded, ordered value. Every mutation produces a new
// history rather than editing one in place, which keeps the derivation pure and
// lets the session persist exactly what it shows.
//
// Two knobs vary between products and are therefore policy, not constants:
// the maximum length, and whether re-picking a color moves it to the front
// (dedupe) or records it again.
//
// The hex-string JSON array is the only wire format. Import is strict: an array
// with a single entry that is not a `#rrggbb` color is rejected as a whole.

use crate::core_modules::color::color::Color;
use crate::error::{PickerError, Result};
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;

pub const DEFAULT_HISTORY_LENGTH: usize = 10;

/// Cap and duplicate handling for a history.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct HistoryPolicy {
    pub max_len: usize,
    pub dedupe: bool,
}

impl Default for HistoryPolicy {
    fn default() -> Self {
        Self {
            max_len: DEFAULT_HISTORY_LENGTH,
            dedupe: true,
        }
    }
}

/// Picked colors, most recent first.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ColorHistory {
    entries: VecDeque<Color>,
}

impl ColorHistory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a history from colors given most-recent-first, applying `policy`
    /// exactly as if they had been pushed oldest-first.
    pub fn from_colors(colors: impl IntoIterator<Item = Color>, policy: HistoryPolicy) -> Self {
        let colors: Vec<Color> = colors.into_iter().collect();
        colors
            .into_iter()
            .rev()
            .fold(ColorHistory::new(), |history, color| history.pushed(color, policy))
    }

    /// A new history with `color` at the front.
    pub fn pushed(&self, color: Color, policy: HistoryPolicy) -> Self {
        let mut entries = self.entries.clone();
        if policy.dedupe {
            entries.retain(|existing| *existing != color);
        }
        entries.push_front(color);
        entries.truncate(policy.max_len);
        Self { entries }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn latest(&self) -> Option<Color> {
        self.entries.front().copied()
    }

    pub fn contains(&self, color: &Color) -> bool {
        self.entries.contains(color)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Color> {
        self.entries.iter()
    }

    pub fn to_vec(&self) -> Vec<Color> {
        self.entries.iter().copied().collect()
    }

    pub fn to_json(&self, pretty: bool) -> Result<String> {
        let json = if pretty {
            serde_json::to_string_pretty(self)
        } else {
            serde_json::to_string(self)
        };
        json.map_err(|e| PickerError::Storage(e.into()))
    }
}

/// Free-function form of `ColorHistory::pushed`.
pub fn push_history(history: &ColorHistory, color: Color, max_len: usize, dedupe: bool) -> ColorHistory {
    history.pushed(color, HistoryPolicy { max_len, dedupe })
}

/// Parses a JSON array of `#rrggbb` strings. Anything else fails as a whole.
pub fn parse_history_json(json: &str) -> Result<Vec<Color>> {
    let raw: Vec<serde_json::Value> = serde_json::from_str(json)
        .map_err(|e| PickerError::ImportParseFailure(format!("expected a JSON array of hex strings: {e}")))?;
    raw.iter()
        .enumerate()
        .map(|(index, value)| {
            value
                .as_str()
                .and_then(|s| Color::from_hex(s).ok())
                .ok_or_else(|| {
                    PickerError::ImportParseFailure(format!("entry {index} ({value}) is not a #rrggbb color"))
                })
        })
        .collect()
}
