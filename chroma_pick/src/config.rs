// THEORY:
// Every behavior that differs between picker products is a field here rather
// than a constant in the code: history cap and dedupe, which WCAG grades are
// reported, ramp length, and what happens to a click past the raster edge.
//
// Sources, lowest precedence first: `Default`, a JSON document, then
// `CHROMA_PICK_*` environment variables layered on top.

use crate::core_modules::contrast::TierPolicy;
use crate::core_modules::coordinate_mapper::BoundsPolicy;
use crate::core_modules::history::{DEFAULT_HISTORY_LENGTH, HistoryPolicy};
use crate::core_modules::palette::DEFAULT_RAMP_STEPS;
use crate::core_modules::storage::DEFAULT_STORAGE_KEY;
use crate::error::{PickerError, Result};
use serde::{Deserialize, Serialize};
use std::str::FromStr;

const ENV_HISTORY_MAX: &str = "CHROMA_PICK_HISTORY_MAX";
const ENV_HISTORY_DEDUPE: &str = "CHROMA_PICK_HISTORY_DEDUPE";
const ENV_TIER_POLICY: &str = "CHROMA_PICK_TIER_POLICY";
const ENV_RAMP_STEPS: &str = "CHROMA_PICK_RAMP_STEPS";
const ENV_BOUNDS_POLICY: &str = "CHROMA_PICK_BOUNDS_POLICY";
const ENV_STORAGE_KEY: &str = "CHROMA_PICK_STORAGE_KEY";

/// Tunable behavior of a `PickerSession`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionConfig {
    /// Maximum number of colors kept in history. Must be at least 1.
    pub history_max_len: usize,
    /// Move a re-picked color to the front instead of recording it twice.
    pub history_dedupe: bool,
    pub tier_policy: TierPolicy,
    /// Number of samples in each shade/tint ramp, endpoints included.
    pub ramp_steps: usize,
    pub bounds_policy: BoundsPolicy,
    /// Name of the persisted history slot.
    pub storage_key: String,
    pub pretty_export: bool,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            history_max_len: DEFAULT_HISTORY_LENGTH,
            history_dedupe: true,
            tier_policy: TierPolicy::default(),
            ramp_steps: DEFAULT_RAMP_STEPS,
            bounds_policy: BoundsPolicy::default(),
            storage_key: DEFAULT_STORAGE_KEY.to_string(),
            pretty_export: true,
        }
    }
}

impl SessionConfig {
    pub fn from_json_str(json: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(json).map_err(|e| PickerError::Config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Defaults overlaid with any `CHROMA_PICK_*` variables that are set.
    pub fn from_env() -> Result<Self> {
        Self::default().overlay(|key| std::env::var(key).ok())
    }

    /// Overlays values from `lookup` (an environment-like source) onto `self`.
    pub fn overlay(mut self, lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        fn parse<T: FromStr>(key: &str, raw: &str) -> Result<T>
        where
            T::Err: std::fmt::Display,
        {
            raw.trim()
                .parse()
                .map_err(|e| PickerError::Config(format!("{key}={raw}: {e}")))
        }

        if let Some(raw) = lookup(ENV_HISTORY_MAX) {
            self.history_max_len = parse(ENV_HISTORY_MAX, &raw)?;
        }
        if let Some(raw) = lookup(ENV_HISTORY_DEDUPE) {
            self.history_dedupe = parse(ENV_HISTORY_DEDUPE, &raw)?;
        }
        if let Some(raw) = lookup(ENV_TIER_POLICY) {
            self.tier_policy = parse(ENV_TIER_POLICY, &raw)?;
        }
        if let Some(raw) = lookup(ENV_RAMP_STEPS) {
            self.ramp_steps = parse(ENV_RAMP_STEPS, &raw)?;
        }
        if let Some(raw) = lookup(ENV_BOUNDS_POLICY) {
            self.bounds_policy = parse(ENV_BOUNDS_POLICY, &raw)?;
        }
        if let Some(raw) = lookup(ENV_STORAGE_KEY).filter(|k| !k.is_empty()) {
            self.storage_key = raw;
        }
        self.validate()?;
        Ok(self)
    }

    pub fn validate(&self) -> Result<()> {
        if self.history_max_len == 0 {
            return Err(PickerError::Config("history_max_len must be at least 1".into()));
        }
        if self.storage_key.is_empty() {
            return Err(PickerError::Config("storage_key must not be empty".into()));
        }
        Ok(())
    }

    pub fn history_policy(&self) -> HistoryPolicy {
        HistoryPolicy {
            max_len: self.history_max_len,
            dedupe: self.history_dedupe,
        }
    }
}
