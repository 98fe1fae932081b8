// THEORY:
// The `contrast` module is the comparative counterpart of `color`. A `Color` on
// its own knows its luminance; this module only ever looks at *pairs* of colors
// and quantifies how legible one is on top of the other.
//
// Key architectural principles:
// 1.  **Comparative Analysis**: every entry point takes two colors. The ratio is
//     symmetric, so callers never need to know which one is lighter.
// 2.  **Policy, not constants**: the grading thresholds are fixed by WCAG, but
//     which grades a product reports (AA only, AA and AAA, or the large-text A
//     grade as well) is a `TierPolicy` chosen by configuration.
// 3.  **Monotonic grading**: tiers are totally ordered, and a larger ratio can
//     never grade lower than a smaller one under the same policy.

use crate::core_modules::color::color::Color;
use serde::{Deserialize, Serialize};

pub type ContrastRatio = f64;

pub const AAA_THRESHOLD: ContrastRatio = 7.0;
pub const AA_THRESHOLD: ContrastRatio = 4.5;
pub const A_THRESHOLD: ContrastRatio = 3.0;

/// WCAG grade of a contrast ratio, ordered from worst to best.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum AccessibilityTier {
    Fail,
    A,
    AA,
    AAA,
}

/// Which tiers a grading reports.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TierPolicy {
    /// AA or FAIL.
    TwoTier,
    /// AAA, AA or FAIL.
    #[default]
    ThreeTier,
    /// AAA, AA, A or FAIL.
    FourTier,
}

impl std::str::FromStr for TierPolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "two_tier" | "2" => Ok(TierPolicy::TwoTier),
            "three_tier" | "3" => Ok(TierPolicy::ThreeTier),
            "four_tier" | "4" => Ok(TierPolicy::FourTier),
            other => Err(format!("unknown tier policy `{other}`")),
        }
    }
}

/// A graded contrast measurement between two colors.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ContrastResult {
    pub ratio: ContrastRatio,
    pub accessibility_tier: AccessibilityTier,
}

impl ContrastResult {
    pub fn between(a: &Color, b: &Color, policy: TierPolicy) -> Self {
        let ratio = contrast_ratio(a, b);
        Self {
            ratio,
            accessibility_tier: accessibility_tier(ratio, policy),
        }
    }

    pub fn is_accessible(&self) -> bool {
        self.accessibility_tier >= AccessibilityTier::AA
    }
}

/// `(L1 + 0.05) / (L2 + 0.05)` with `L1` the lighter luminance; always ≥ 1.
pub fn contrast_ratio(a: &Color, b: &Color) -> ContrastRatio {
    let la = a.relative_luminance();
    let lb = b.relative_luminance();
    let (lighter, darker) = if la >= lb { (la, lb) } else { (lb, la) };
    (lighter + 0.05) / (darker + 0.05)
}

pub fn accessibility_tier(ratio: ContrastRatio, policy: TierPolicy) -> AccessibilityTier {
    match policy {
        TierPolicy::TwoTier if ratio >= AA_THRESHOLD => AccessibilityTier::AA,
        TierPolicy::TwoTier => AccessibilityTier::Fail,
        _ if ratio >= AAA_THRESHOLD => AccessibilityTier::AAA,
        _ if ratio >= AA_THRESHOLD => AccessibilityTier::AA,
        TierPolicy::FourTier if ratio >= A_THRESHOLD => AccessibilityTier::A,
        _ => AccessibilityTier::Fail,
    }
}

/// Whichever of black or white reads better on `background`.
pub fn best_text_color(background: &Color) -> Color {
    if contrast_ratio(background, &Color::BLACK) >= contrast_ratio(background, &Color::WHITE) {
        Color::BLACK
    } else {
        Color::WHITE
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn white_on_black_is_maximal() {
        let ratio = contrast_ratio(&Color::WHITE, &Color::BLACK);
        assert!((ratio - 21.0).abs() < 1e-6);
    }

    #[test]
    fn known_reference_ratios() {
        // #767676 is the lightest gray that still passes AA on white.
        let gray = Color::new(0x76, 0x76, 0x76);
        let ratio = contrast_ratio(&gray, &Color::WHITE);
        assert!((ratio - 4.54).abs() < 0.01);

        let red = Color::new(255, 0, 0);
        assert!((contrast_ratio(&red, &Color::WHITE) - 4.0).abs() < 0.01);
    }

    #[test]
    fn ratio_is_symmetric() {
        let a = Color::new(30, 41, 59);
        let b = Color::new(250, 250, 250);
        assert_eq!(contrast_ratio(&a, &b), contrast_ratio(&b, &a));
    }

    #[test]
    fn tier_thresholds_per_policy() {
        assert_eq!(accessibility_tier(7.0, TierPolicy::ThreeTier), AccessibilityTier::AAA);
        assert_eq!(accessibility_tier(7.0, TierPolicy::TwoTier), AccessibilityTier::AA);
        assert_eq!(accessibility_tier(4.5, TierPolicy::ThreeTier), AccessibilityTier::AA);
        assert_eq!(accessibility_tier(3.5, TierPolicy::ThreeTier), AccessibilityTier::Fail);
        assert_eq!(accessibility_tier(3.5, TierPolicy::FourTier), AccessibilityTier::A);
        assert_eq!(accessibility_tier(2.9, TierPolicy::FourTier), AccessibilityTier::Fail);
    }

    #[test]
    fn contrast_result_flags_accessibility() {
        let result = ContrastResult::between(&Color::BLACK, &Color::WHITE, TierPolicy::TwoTier);
        assert!(result.is_accessible());
        let weak = ContrastResult::between(&Color::new(200, 200, 200), &Color::WHITE, TierPolicy::FourTier);
        assert!(!weak.is_accessible());
    }

    #[test]
    fn text_color_picks_the_readable_side() {
        assert_eq!(best_text_color(&Color::new(250, 240, 200)), Color::BLACK);
        assert_eq!(best_text_color(&Color::new(20, 20, 80)), Color::WHITE);
    }

    #[test]
    fn policy_parses_from_env_strings() {
        assert_eq!("FOUR_TIER".parse::<TierPolicy>().unwrap(), TierPolicy::FourTier);
        assert_eq!("2".parse::<TierPolicy>().unwrap(), TierPolicy::TwoTier);
        assert!("five".parse::<TierPolicy>().is_err());
    }

    proptest! {
        #[test]
        fn identical_colors_have_unit_ratio(r: u8, g: u8, b: u8) {
            let c = Color::new(r, g, b);
            prop_assert!((contrast_ratio(&c, &c) - 1.0).abs() < 1e-12);
        }

        #[test]
        fn ratio_stays_in_wcag_range(a: [u8; 3], b: [u8; 3]) {
            let ratio = contrast_ratio(&Color::new(a[0], a[1], a[2]), &Color::new(b[0], b[1], b[2]));
            prop_assert!((1.0..=21.0 + 1e-9).contains(&ratio));
        }

        #[test]
        fn tier_is_monotonic(x in 1.0f64..21.0, y in 1.0f64..21.0) {
            let (lo, hi) = if x <= y { (x, y) } else { (y, x) };
            for policy in [TierPolicy::TwoTier, TierPolicy::ThreeTier, TierPolicy::FourTier] {
                prop_assert!(accessibility_tier(lo, policy) <= accessibility_tier(hi, policy));
            }
        }
    }
}
