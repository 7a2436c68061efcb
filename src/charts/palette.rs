//! Figure colours.

use plotters::style::RGBColor;

/// Hue colours for category values: 0 is blue, 1 is orange.
pub const HUE_PALETTE: [RGBColor; 4] = [
    RGBColor(31, 119, 180),  // Blue
    RGBColor(255, 127, 14),  // Orange
    RGBColor(44, 160, 44),   // Green
    RGBColor(214, 39, 40),   // Red
];

// Diverging map stops (cold end, neutral centre, warm end)
const COLD: (f64, f64, f64) = (59.0, 76.0, 192.0);
const NEUTRAL: (f64, f64, f64) = (221.0, 221.0, 221.0);
const WARM: (f64, f64, f64) = (180.0, 4.0, 38.0);

/// Colour for the `index`-th hue value.
pub fn hue_color(index: usize) -> RGBColor {
    HUE_PALETTE[index % HUE_PALETTE.len()]
}

/// Blue-white-red diverging colour for a position in `[0, 1]`.
/// Positions outside the range are clamped; NaN maps to the centre.
pub fn diverging_color(position: f64) -> RGBColor {
    let t = if position.is_nan() {
        0.5
    } else {
        position.clamp(0.0, 1.0)
    };
    let (from, to, local) = if t < 0.5 {
        (COLD, NEUTRAL, t * 2.0)
    } else {
        (NEUTRAL, WARM, (t - 0.5) * 2.0)
    };
    let mix = |a: f64, b: f64| (a + (b - a) * local).round() as u8;
    RGBColor(mix(from.0, to.0), mix(from.1, to.1), mix(from.2, to.2))
}

/// Perceived brightness in `[0, 1]`, for choosing annotation ink.
pub fn luminance(color: RGBColor) -> f64 {
    let RGBColor(r, g, b) = color;
    (0.299 * r as f64 + 0.587 * g as f64 + 0.114 * b as f64) / 255.0
}
