// THEORY (Color Space Math):
// The `Color` module is the leaf of the whole engine. It is a "dumb", immutable
// value type for a single sampled color plus the pure conversions every other
// module builds on. Nothing in here knows about canvases, history or palettes.
//
// What lives here:
// - The 8-bit RGB triple and its canonical lowercase `#rrggbb` encoding.
//   The hex string is the only serialized form: storage, import and export all
//   speak it, so `Color` (de)serializes as that string.
// - Three transforms of the channels:
//   • normalized (0..1 sRGB):  divide by 255.0, still gamma-encoded
//   • linearized (0..1 linear): sRGB → linear light, used for luminance and Lab
//   • HSL / CIE-Lab:           cylindrical and perceptual views of the same color
//
// Key principles:
// 1) Validation happens once, at the boundary: `rgb_to_hex` takes wide integers
//    and rejects anything outside [0, 255]; past that point the `u8` channels
//    make an invalid color unrepresentable.
// 2) Linearization goes through a 256-entry `OnceLock` LUT. The WCAG breakpoint
//    (0.03928) and the IEC 61966-2-1 breakpoint (0.04045) select the same branch
//    for every 8-bit input, so one table serves both luminance and Lab.
// 3) Every function is pure and total over its input domain.

pub mod color {
    use crate::error::{PickerError, Result};
    use serde::{Deserialize, Serialize};
    use std::fmt;
    use std::str::FromStr;
    use std::sync::OnceLock;

    pub type Channel = u8;
    pub type NormalizedChannel = f64;
    pub type LinearizedChannel = f64;
    pub type Hue = f64;
    pub type Saturation = f64;
    pub type Lightness = f64;
    pub type Luminance = f64;

    const CHANNEL_MAX: f64 = 255.0;

    /// WCAG 2.x sRGB linearization breakpoint.
    const WCAG_LINEAR_BREAKPOINT: f64 = 0.03928;
    const SRGB_ENCODE_BREAKPOINT: f64 = 0.003_130_8;

    // sRGB (D65) → XYZ and back.
    const RGB_TO_XYZ: [[f64; 3]; 3] = [
        [0.4124564, 0.3575761, 0.1804375],
        [0.2126729, 0.7151522, 0.0721750],
        [0.0193339, 0.1191920, 0.9503041],
    ];
    const XYZ_TO_RGB: [[f64; 3]; 3] = [
        [3.2404542, -1.5371385, -0.4985314],
        [-0.9692660, 1.8760108, 0.0415560],
        [0.0556434, -0.2040259, 1.0572252],
    ];

    // D65 reference white.
    const WHITE_X: f64 = 0.95047;
    const WHITE_Z: f64 = 1.08883;

    // (6/29)^3 and the slope of the linear segment of f(t).
    const LAB_EPSILON: f64 = 216.0 / 24389.0;
    const LAB_DELTA: f64 = 6.0 / 29.0;

    static SRGB_TO_LINEAR_LUT: OnceLock<[LinearizedChannel; 256]> = OnceLock::new();

    #[inline]
    fn linearize(channel: Channel) -> LinearizedChannel {
        let table = SRGB_TO_LINEAR_LUT.get_or_init(|| {
            let mut table = [0.0f64; 256];
            for (i, slot) in table.iter_mut().enumerate() {
                let srgb = i as f64 / CHANNEL_MAX;
                *slot = if srgb <= WCAG_LINEAR_BREAKPOINT {
                    srgb / 12.92
                } else {
                    ((srgb + 0.055) / 1.055).powf(2.4)
                };
            }
            table
        });
        table[channel as usize]
    }

    #[inline]
    fn delinearize(linear: LinearizedChannel) -> Channel {
        let l = linear.clamp(0.0, 1.0);
        let srgb = if l <= SRGB_ENCODE_BREAKPOINT {
            12.92 * l
        } else {
            1.055 * l.powf(1.0 / 2.4) - 0.055
        };
        to_channel(srgb * CHANNEL_MAX)
    }

    #[inline]
    fn to_channel(value: f64) -> Channel {
        value.round().clamp(0.0, CHANNEL_MAX) as Channel
    }

    /// An immutable 8-bit sRGB color. Alpha is never carried: samples drop it.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
    #[serde(try_from = "String", into = "String")]
    pub struct Color {
        /// The red channel value (0-255).
        pub red: Channel,
        /// The green channel value (0-255).
        pub green: Channel,
        /// The blue channel value (0-255).
        pub blue: Channel,
    }

    /// Cylindrical HSL view of a color.
    #[derive(Debug, Clone, Copy, PartialEq)]
    pub struct Hsl {
        /// Hue angle in degrees [0, 360).
        pub hue: Hue,
        /// Saturation (0.0-1.0).
        pub saturation: Saturation,
        /// Lightness (0.0-1.0).
        pub lightness: Lightness,
    }

    /// CIE L*a*b* (D65) view of a color.
    #[derive(Debug, Clone, Copy, PartialEq)]
    pub struct Lab {
        /// Perceptual lightness (0.0-100.0).
        pub l: f64,
        pub a: f64,
        pub b: f64,
    }

    impl Lab {
        /// Straight-line interpolation in Lab space, `t` clamped to [0, 1].
        pub fn lerp(self, other: Lab, t: f64) -> Lab {
            let t = t.clamp(0.0, 1.0);
            Lab {
                l: self.l + (other.l - self.l) * t,
                a: self.a + (other.a - self.a) * t,
                b: self.b + (other.b - self.b) * t,
            }
        }
    }

    impl Color {
        pub const BLACK: Color = Color::new(0, 0, 0);
        pub const WHITE: Color = Color::new(255, 255, 255);

        pub const fn new(red: Channel, green: Channel, blue: Channel) -> Self {
            Color { red, green, blue }
        }

        /// Builds a color from an RGBA byte quad, ignoring alpha.
        pub fn from_rgba(bytes: [u8; 4]) -> Self {
            Color::new(bytes[0], bytes[1], bytes[2])
        }

        /// Parses `#rrggbb` (either case). Shorthand and alpha forms are rejected.
        pub fn from_hex(hex: &str) -> Result<Self> {
            let invalid = || PickerError::InvalidHex(hex.to_string());
            let digits = hex.strip_prefix('#').ok_or_else(invalid)?;
            if digits.len() != 6 || !digits.bytes().all(|b| b.is_ascii_hexdigit()) {
                return Err(invalid());
            }
            let channel = |range: std::ops::Range<usize>| {
                u8::from_str_radix(&digits[range], 16).map_err(|_| invalid())
            };
            Ok(Color::new(channel(0..2)?, channel(2..4)?, channel(4..6)?))
        }

        /// Canonical lowercase, zero-padded `#rrggbb`.
        pub fn to_hex(&self) -> String {
            format!("#{:02x}{:02x}{:02x}", self.red, self.green, self.blue)
        }

        pub fn channels(&self) -> [Channel; 3] {
            [self.red, self.green, self.blue]
        }

        pub fn normalized(&self) -> [NormalizedChannel; 3] {
            self.channels().map(|c| c as NormalizedChannel / CHANNEL_MAX)
        }

        pub fn linearized(&self) -> [LinearizedChannel; 3] {
            self.channels().map(linearize)
        }

        /// WCAG relative luminance (0.0 for black, 1.0 for white).
        pub fn relative_luminance(&self) -> Luminance {
            let [r, g, b] = self.linearized();
            0.2126 * r + 0.7152 * g + 0.0722 * b
        }

        /// Hue / saturation / lightness from the normalized channels.
        pub fn to_hsl(&self) -> Hsl {
            let [red, green, blue] = self.normalized();
            let maximum_channel = red.max(green.max(blue));
            let minimum_channel = red.min(green.min(blue));
            let chroma = maximum_channel - minimum_channel;
            let lightness = (maximum_channel + minimum_channel) * 0.5;

            if chroma <= 1e-12 {
                return Hsl { hue: 0.0, saturation: 0.0, lightness };
            }

            let saturation = chroma / (1.0 - (2.0 * lightness - 1.0).abs());

            let (base_difference, sector_offset) = if maximum_channel == red {
                (green - blue, 0.0)
            } else if maximum_channel == green {
                (blue - red, 2.0)
            } else {
                (red - green, 4.0)
            };

            let mut hue = (base_difference / chroma + sector_offset) * 60.0;
            if hue < 0.0 {
                hue += 360.0;
            }
            Hsl { hue: hue % 360.0, saturation, lightness }
        }

        pub fn from_hsl(hsl: Hsl) -> Self {
            let hue = hsl.hue.rem_euclid(360.0);
            let saturation = hsl.saturation.clamp(0.0, 1.0);
            let lightness = hsl.lightness.clamp(0.0, 1.0);

            let chroma = (1.0 - (2.0 * lightness - 1.0).abs()) * saturation;
            let sector = hue / 60.0;
            let secondary = chroma * (1.0 - (sector % 2.0 - 1.0).abs());
            let (r, g, b) = match sector as u32 {
                0 => (chroma, secondary, 0.0),
                1 => (secondary, chroma, 0.0),
                2 => (0.0, chroma, secondary),
                3 => (0.0, secondary, chroma),
                4 => (secondary, 0.0, chroma),
                _ => (chroma, 0.0, secondary),
            };
            let m = lightness - chroma / 2.0;
            Color::new(
                to_channel((r + m) * CHANNEL_MAX),
                to_channel((g + m) * CHANNEL_MAX),
                to_channel((b + m) * CHANNEL_MAX),
            )
        }

        pub fn to_lab(&self) -> Lab {
            let [r, g, b] = self.linearized();
            let xyz = |row: [f64; 3]| row[0] * r + row[1] * g + row[2] * b;
            let fx = lab_f(xyz(RGB_TO_XYZ[0]) / WHITE_X);
            let fy = lab_f(xyz(RGB_TO_XYZ[1]));
            let fz = lab_f(xyz(RGB_TO_XYZ[2]) / WHITE_Z);
            Lab {
                l: 116.0 * fy - 16.0,
                a: 500.0 * (fx - fy),
                b: 200.0 * (fy - fz),
            }
        }

        /// Converts back from Lab, clipping out-of-gamut results to the sRGB cube.
        pub fn from_lab(lab: Lab) -> Self {
            let fy = (lab.l + 16.0) / 116.0;
            let fx = fy + lab.a / 500.0;
            let fz = fy - lab.b / 200.0;
            let x = lab_f_inv(fx) * WHITE_X;
            let y = lab_f_inv(fy);
            let z = lab_f_inv(fz) * WHITE_Z;
            let rgb = |row: [f64; 3]| row[0] * x + row[1] * y + row[2] * z;
            Color::new(
                delinearize(rgb(XYZ_TO_RGB[0])),
                delinearize(rgb(XYZ_TO_RGB[1])),
                delinearize(rgb(XYZ_TO_RGB[2])),
            )
        }
    }

    #[inline]
    fn lab_f(t: f64) -> f64 {
        if t > LAB_EPSILON {
            t.cbrt()
        } else {
            t / (3.0 * LAB_DELTA * LAB_DELTA) + 4.0 / 29.0
        }
    }

    #[inline]
    fn lab_f_inv(t: f64) -> f64 {
        if t > LAB_DELTA {
            t * t * t
        } else {
            3.0 * LAB_DELTA * LAB_DELTA * (t - 4.0 / 29.0)
        }
    }

    /// Validating constructor: any channel outside [0, 255] is a `ChannelOutOfRange`.
    pub fn rgb_to_hex(red: i32, green: i32, blue: i32) -> Result<Color> {
        let check = |channel: &'static str, value: i32| {
            Channel::try_from(value).map_err(|_| PickerError::ChannelOutOfRange { channel, value })
        };
        Ok(Color::new(check("red", red)?, check("green", green)?, check("blue", blue)?))
    }

    /// Inverse of `rgb_to_hex`.
    pub fn hex_to_rgb(hex: &str) -> Result<(Channel, Channel, Channel)> {
        let color = Color::from_hex(hex)?;
        Ok((color.red, color.green, color.blue))
    }

    pub fn relative_luminance(color: &Color) -> Luminance {
        color.relative_luminance()
    }

    impl fmt::Display for Color {
        fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            f.write_str(&self.to_hex())
        }
    }

    impl FromStr for Color {
        type Err = PickerError;

        fn from_str(s: &str) -> Result<Self> {
            Color::from_hex(s)
        }
    }

    impl TryFrom<String> for Color {
        type Error = PickerError;

        fn try_from(value: String) -> Result<Self> {
            Color::from_hex(&value)
        }
    }

    impl From<Color> for String {
        fn from(color: Color) -> Self {
            color.to_hex()
        }
    }

}

// -----------------------------------------------------------------------------
// Glossary
//
// - Hex color: `#rrggbb`, two lowercase hex digits per channel.
//
// - Linearized channel: gamma-decoded value proportional to light intensity.
//   Luminance and Lab are only meaningful on linear values.
//
// - Relative luminance: 0.2126 R + 0.7152 G + 0.0722 B over linear channels.
//
// - HSL: hue angle, saturation and lightness of the gamma-encoded channels.
//   Rotating hue by 180° gives the complement.
//
// - CIE L*a*b*: approximately perceptually uniform space (D65 white). Shade and
//   tint ramps are straight lines in Lab.
