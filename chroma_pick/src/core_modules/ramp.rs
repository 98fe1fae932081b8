// THEORY:
// Ramps are the derived colors the user browses after a pick: shades (toward
// black), tints (toward white) and the complement (opposite hue).
//
// Shades and tints are sampled along a straight line in CIE-Lab between the base
// color and the target, `steps` samples evenly spaced and including both
// endpoints. The endpoints are returned exactly (the base color itself and pure
// black/white), never through a Lab round trip.

use crate::core_modules::color::color::{Color, Hsl};

/// `steps` colors from `color` (first) to `target` (last).
pub fn ramp_between(color: Color, target: Color, steps: usize) -> Vec<Color> {
    match steps {
        0 => Vec::new(),
        1 => vec![color],
        _ => {
            let start = color.to_lab();
            let end = target.to_lab();
            let last = steps - 1;
            (0..steps)
                .map(|i| match i {
                    0 => color,
                    i if i == last => target,
                    i => Color::from_lab(start.lerp(end, i as f64 / last as f64)),
                })
                .collect()
        }
    }
}

/// Base color first, black last.
pub fn shades_of(color: Color, steps: usize) -> Vec<Color> {
    ramp_between(color, Color::BLACK, steps)
}

/// Base color first, white last.
pub fn tints_of(color: Color, steps: usize) -> Vec<Color> {
    ramp_between(color, Color::WHITE, steps)
}

/// Rotates hue by 180° keeping HSL saturation and lightness. Grays map to themselves.
pub fn complement_of(color: Color) -> Color {
    let hsl = color.to_hsl();
    if hsl.saturation == 0.0 {
        return color;
    }
    Color::from_hsl(Hsl {
        hue: (hsl.hue + 180.0) % 360.0,
        ..hsl
    })
}
