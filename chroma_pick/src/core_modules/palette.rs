// THEORY:
// A `PaletteSet` is everything derived from one base color: its shade ramp, its
// tint ramp and its complement. It is a pure composition of the `ramp` functions,
// recomputed on demand and never edited in place.

use crate::core_modules::color::color::Color;
use crate::core_modules::ramp::{complement_of, shades_of, tints_of};
use serde::{Deserialize, Serialize};

pub const DEFAULT_RAMP_STEPS: usize = 5;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaletteSet {
    /// Black first, base color last.
    pub shades: Vec<Color>,
    /// Base color first, white last.
    pub tints: Vec<Color>,
    pub complement: Option<Color>,
}

impl PaletteSet {
    /// The two-swatch complementary strip: base, then complement.
    pub fn complementary_pair(&self) -> Vec<Color> {
        self.tints
            .first()
            .or(self.shades.last())
            .copied()
            .into_iter()
            .chain(self.complement)
            .collect()
    }

    /// Shades from darkest to the base, then tints out to white, without
    /// repeating the base. This is the order a swatch strip renders in.
    pub fn strip(&self) -> Vec<Color> {
        let mut strip = self.shades.clone();
        strip.extend(self.tints.iter().skip(usize::from(!self.shades.is_empty())));
        strip
    }
}

pub fn build_palette_set(color: Color, steps: usize) -> PaletteSet {
    let mut shades = shades_of(color, steps);
    shades.reverse();
    PaletteSet {
        shades,
        tints: tints_of(color, steps),
        complement: Some(complement_of(color)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn palette_composes_ramps_and_complement() {
        let base = Color::new(255, 0, 0);
        let palette = build_palette_set(base, 5);
        assert_eq!(palette.shades.len(), 5);
        assert_eq!(palette.tints.len(), 5);
        assert_eq!(palette.shades.first(), Some(&Color::BLACK));
        assert_eq!(palette.shades.last(), Some(&base));
        assert_eq!(palette.tints[4], Color::WHITE);
        assert_eq!(palette.complement, Some(Color::new(0, 255, 255)));
        assert_eq!(palette.complementary_pair(), vec![base, Color::new(0, 255, 255)]);
    }

    #[test]
    fn strip_runs_black_to_white_through_base_once() {
        let base = Color::new(40, 120, 200);
        let strip = build_palette_set(base, 3).strip();
        assert_eq!(strip.len(), 5);
        assert_eq!(strip[0], Color::BLACK);
        assert_eq!(strip[2], base);
        assert_eq!(strip[4], Color::WHITE);
    }

    #[test]
    fn zero_steps_still_has_a_complement() {
        let palette = build_palette_set(Color::new(1, 2, 3), 0);
        assert!(palette.shades.is_empty() && palette.tints.is_empty());
        assert!(palette.complement.is_some());
        assert!(palette.strip().is_empty());
    }
}
