//! Colors shared by both figures.

use plotters::style::{RGBColor, BLACK, WHITE};

/// Hue colors for categorical levels 0, 1, ...
pub const HUE: [RGBColor; 4] = [
    RGBColor(31, 119, 180),
    RGBColor(255, 127, 14),
    RGBColor(44, 160, 44),
    RGBColor(214, 39, 40),
];

pub fn hue(level: usize) -> RGBColor {
    HUE[level % HUE.len()]
}

/// Anchor stops of the diverging map, light ice blue through near-black to light orange.
const DIVERGING: [(f64, (u8, u8, u8)); 5] = [
    (0.0, (189, 230, 235)),
    (0.25, (60, 125, 200)),
    (0.5, (26, 26, 30)),
    (0.75, (200, 64, 46)),
    (1.0, (255, 214, 168)),
];

/// Diverging color scale centered on `center`, spanning `center ± half_range`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DivergingScale {
    pub center: f64,
    pub half_range: f64,
}

impl DivergingScale {
    /// Resolves the span the way a centered heatmap does: the larger distance
    /// from `center` to either bound wins.
    pub fn new(center: f64, vmin: f64, vmax: f64) -> Self {
        let half_range = (vmax - center).max(center - vmin);
        DivergingScale { center, half_range }
    }

    pub fn vmin(&self) -> f64 {
        self.center - self.half_range
    }

    pub fn vmax(&self) -> f64 {
        self.center + self.half_range
    }

    /// Position of `value` on the scale, clamped to `[0, 1]`.
    pub fn normalize(&self, value: f64) -> f64 {
        if self.half_range <= 0.0 {
            return 0.5;
        }
        (0.5 + (value - self.center) / (2.0 * self.half_range)).clamp(0.0, 1.0)
    }

    pub fn color(&self, value: f64) -> RGBColor {
        let t = self.normalize(value);
        let upper = DIVERGING
            .iter()
            .position(|(stop, _)| *stop >= t)
            .unwrap_or(DIVERGING.len() - 1)
            .max(1);
        let (t0, c0) = DIVERGING[upper - 1];
        let (t1, c1) = DIVERGING[upper];
        let f = (t - t0) / (t1 - t0);
        RGBColor(lerp(c0.0, c1.0, f), lerp(c0.1, c1.1, f), lerp(c0.2, c1.2, f))
    }
}

fn lerp(a: u8, b: u8, f: f64) -> u8 {
    (a as f64 + (b as f64 - a as f64) * f).round() as u8
}

/// WCAG relative luminance of an sRGB color.
pub fn relative_luminance(color: RGBColor) -> f64 {
    let RGBColor(r, g, b) = color;
    0.2126 * linearize(r) + 0.7152 * linearize(g) + 0.0722 * linearize(b)
}

fn linearize(channel: u8) -> f64 {
    let c = channel as f64 / 255.0;
    if c <= 0.03928 {
        c / 12.92
    } else {
        ((c + 0.055) / 1.055).powf(2.4)
    }
}

/// Text color readable on top of `background`.
pub fn text_on(background: RGBColor) -> RGBColor {
    if relative_luminance(background) > 0.408 {
        BLACK
    } else {
        WHITE
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scale_takes_wider_side() {
        let scale = DivergingScale::new(0.0, -0.1, 0.32);
        assert_eq!(scale.half_range, 0.32);
        assert_eq!(scale.vmin(), -0.32);

        let scale = DivergingScale::new(0.0, -0.5, 0.32);
        assert_eq!(scale.vmax(), 0.5);
    }

    #[test]
    fn test_normalize_clamps() {
        let scale = DivergingScale::new(0.0, -0.32, 0.32);
        assert_eq!(scale.normalize(0.0), 0.5);
        assert_eq!(scale.normalize(1.0), 1.0);
        assert_eq!(scale.normalize(-1.0), 0.0);
    }

    #[test]
    fn test_color_stops() {
        let scale = DivergingScale::new(0.0, -1.0, 1.0);
        assert_eq!(scale.color(-1.0), RGBColor(189, 230, 235));
        assert_eq!(scale.color(0.0), RGBColor(26, 26, 30));
        assert_eq!(scale.color(1.0), RGBColor(255, 214, 168));
    }

    #[test]
    fn test_text_contrast() {
        assert_eq!(text_on(RGBColor(26, 26, 30)), WHITE);
        assert_eq!(text_on(RGBColor(255, 214, 168)), BLACK);
    }

    #[test]
    fn test_mid_blue_takes_white_text() {
        let blue = RGBColor(60, 125, 200);
        assert!((relative_luminance(blue) - 0.198).abs() < 0.005);
        assert_eq!(text_on(blue), WHITE);
    }

    #[test]
    fn test_luminance_extremes() {
        assert_eq!(relative_luminance(RGBColor(0, 0, 0)), 0.0);
        assert!((relative_luminance(RGBColor(255, 255, 255)) - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_hue_wraps() {
        assert_eq!(hue(0), hue(4));
        assert_ne!(hue(0), hue(1));
    }
}
