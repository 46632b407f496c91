//! Cluster color assignment
//!
//! Maps cluster ids to colors: a fixed qualitative palette for small
//! ids, a deterministic digest-derived color for larger ones, and the
//! two sentinel values (noise is black, unclustered is white). Every
//! real cluster gets four alpha-blended background variants plus a
//! contrast-correct foreground.

use serde::Serialize;
use sha1::{Digest, Sha1};

use dlens_common::types::ClusterValue;

/// Hand-picked qualitative palette. Indices below the palette size map
/// directly, which keeps colors for common cluster counts visually
/// distinct and stable.
const PALETTE: [Rgb; 17] = [
    Rgb::new(44, 160, 44),   // #2ca02c
    Rgb::new(255, 127, 14),  // #e57f0e
    Rgb::new(31, 119, 180),  // #1f77b4
    Rgb::new(227, 119, 194), // #e377c2
    Rgb::new(127, 127, 127), // #7f7f7f
    Rgb::new(0, 221, 175),   // #00ddaf
    Rgb::new(188, 189, 34),  // #ddc117
    Rgb::new(209, 23, 103),  // #d11767
    Rgb::new(150, 209, 23),  // #96d117
    Rgb::new(140, 86, 75),   // #8c564b
    Rgb::new(221, 14, 14),   // #dd0e0e
    Rgb::new(142, 45, 191),  // #8e2dbf
    Rgb::new(23, 190, 207),  // #17becf
    Rgb::new(209, 147, 23),  // #d19317
    Rgb::new(29, 23, 209),   // #1d17d1
    Rgb::new(251, 104, 233), // #fb68e9
    Rgb::new(148, 103, 189), // #9467bd
];

/// Contrast threshold for colors rendered at full opacity (flat hex
/// badges). Kept separate from [`FOREGROUND_THRESHOLD_BLENDED`]; the
/// two call sites intentionally disagree.
const FOREGROUND_THRESHOLD_FLAT: f64 = 150.0;

/// Contrast threshold for alpha-blended per-cluster colors.
const FOREGROUND_THRESHOLD_BLENDED: f64 = 186.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Rgb {
    const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    pub fn css(&self) -> String {
        format!("rgb({}, {}, {})", self.r, self.g, self.b)
    }

    /// Blend toward white: `out = round(channel*alpha + 255*(1-alpha))`
    pub fn with_alpha(&self, alpha: f64) -> Rgb {
        Rgb::new(
            apply_alpha(self.r, alpha),
            apply_alpha(self.g, alpha),
            apply_alpha(self.b, alpha),
        )
    }

    /// Perceived luminance of this color once blended at `alpha`
    fn luminance(&self, alpha: f64) -> f64 {
        f64::from(self.r) * 0.299
            + f64::from(self.g) * 0.587
            + f64::from(self.b) * 0.114
            + (1.0 - alpha) * 255.0
    }

    /// Black or white foreground for text drawn over this color at the
    /// given blend alpha (threshold 186)
    pub fn foreground(&self, alpha: f64) -> &'static str {
        if self.luminance(alpha) > FOREGROUND_THRESHOLD_BLENDED {
            "#000000"
        } else {
            "#ffffff"
        }
    }
}

fn apply_alpha(channel: u8, alpha: f64) -> u8 {
    (f64::from(channel) * alpha + 255.0 * (1.0 - alpha)).round() as u8
}

/// Parse a `#rrggbb` hex color
pub fn hex_to_rgb(hex: &str) -> Option<Rgb> {
    let hex = hex.strip_prefix('#')?;
    if hex.len() != 6 {
        return None;
    }
    let value = u32::from_str_radix(hex, 16).ok()?;
    Some(Rgb::new(
        ((value >> 16) & 255) as u8,
        ((value >> 8) & 255) as u8,
        (value & 255) as u8,
    ))
}

/// Black or white foreground for a flat hex color (threshold 150).
/// Used for model badges; unknown hex falls back to black text.
pub fn foreground_for_hex(hex: &str, alpha: f64) -> &'static str {
    match hex_to_rgb(hex) {
        Some(rgb) if rgb.luminance(alpha) <= FOREGROUND_THRESHOLD_FLAT => "#ffffff",
        _ => "#000000",
    }
}

/// Deterministic pseudo-random color for cluster ids beyond the
/// palette: the first 3 bytes of the SHA-1 digest of the decimal id.
/// Same id, same color, within and across sessions.
fn digest_color(text: &str) -> Rgb {
    let digest = Sha1::digest(text.as_bytes());
    Rgb::new(digest[0], digest[1], digest[2])
}

/// Base RGB for a cluster value: `-2` noise is black, `-1` unclustered
/// is white, small ids use the palette, large ids hash.
pub fn cluster_rgb(value: i64) -> Rgb {
    match value {
        -2 => Rgb::new(0, 0, 0),
        -1 => Rgb::new(255, 255, 255),
        v if (v as usize) < PALETTE.len() && v >= 0 => PALETTE[v as usize],
        v => digest_color(&v.to_string()),
    }
}

/// The full color record derived for one cluster value
#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ClusterColor {
    /// Text background (alpha 0.5, or 0.3 for unclustered)
    pub bg_text: String,
    /// Light background (alpha 0.1)
    pub bg_light: String,
    /// Neutral background (alpha 0.75)
    pub bg_neutral: String,
    /// Contrast foreground over `bg_text`
    pub fg: String,
    /// Solid fill (alpha 1.0)
    pub fill: String,
}

/// Known label models and their badge colors; unknown models render
/// on white
const MODEL_COLOR_MAP: &[(&str, &str)] = &[
    ("GPT3.5", "#6666c2"),
    ("T0", "#aeaeae"),
    ("OPT-66B", "#aeaeae"),
    ("GPT-NeoX", "#aeaeae"),
    ("BLOOM", "#aeaeae"),
    ("OASST", "#6666c2"),
    ("LLaMA-65B", "#99c299"),
    ("LLaMA-30B", "#99c299"),
    ("Pythia", "#6666c2"),
    ("Alpaca-7B", "#6666c2"),
    ("Baize-7B", "#99c299"),
    ("Baize-13B", "#99c299"),
    ("Falcon-40B", "#99c299"),
    ("Falcon-40B-Instruct", "#99c299"),
    ("LLaMA-30B-SuperCOT", "#6666c2"),
    ("Vicuna-13B", "#99c299"),
    ("Vicuna-7B", "#99c299"),
    ("ChatGPT", "#6666c2"),
    ("GPT-4", "#6666c2"),
];

/// Badge colors for one label model name
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct ModelBadge {
    pub name: String,
    pub color: String,
    pub fg: String,
}

/// Resolve the badge colors for a label model shown in thread lists
pub fn model_badge(model: &str) -> ModelBadge {
    let color = MODEL_COLOR_MAP
        .iter()
        .find(|(name, _)| *name == model)
        .map(|(_, color)| *color)
        .unwrap_or("#ffffff");
    ModelBadge {
        name: model.to_string(),
        color: color.to_string(),
        fg: foreground_for_hex(color, 1.0).to_string(),
    }
}

/// Derive the four background variants and foreground for a cluster
pub fn cluster_color(cluster: &ClusterValue) -> ClusterColor {
    let alpha = if cluster.true_value == -1 { 0.3 } else { 0.5 };
    let rgb = cluster_rgb(cluster.true_value);
    ClusterColor {
        bg_text: rgb.with_alpha(alpha).css(),
        bg_light: rgb.with_alpha(0.1).css(),
        bg_neutral: rgb.with_alpha(0.75).css(),
        fg: rgb.foreground(alpha).to_string(),
        fill: rgb.css(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn value(true_value: i64) -> ClusterValue {
        ClusterValue {
            value: true_value,
            true_value,
            probability: None,
        }
    }

    #[test]
    fn test_sentinel_colors() {
        assert_eq!(cluster_rgb(-1), Rgb::new(255, 255, 255));
        assert_eq!(cluster_rgb(-2), Rgb::new(0, 0, 0));
    }

    #[test]
    fn test_palette_is_duplicate_free() {
        for (i, a) in PALETTE.iter().enumerate() {
            for b in &PALETTE[i + 1..] {
                assert_ne!(a, b);
            }
        }
    }

    #[test]
    fn test_palette_indices_map_directly() {
        assert_eq!(cluster_rgb(0), Rgb::new(44, 160, 44));
        assert_eq!(cluster_rgb(16), Rgb::new(148, 103, 189));
    }

    #[test]
    fn test_large_ids_are_deterministic() {
        let first = cluster_rgb(17);
        let second = cluster_rgb(17);
        assert_eq!(first, second);
        // and distinct from a neighboring id with overwhelming likelihood
        assert_ne!(cluster_rgb(17), cluster_rgb(18));
    }

    #[test]
    fn test_alpha_blend_rounds_toward_white() {
        let rgb = Rgb::new(0, 0, 0).with_alpha(0.5);
        assert_eq!(rgb, Rgb::new(128, 128, 128)); // round(255 * 0.5) = 128
        let rgb = Rgb::new(200, 100, 0).with_alpha(1.0);
        assert_eq!(rgb, Rgb::new(200, 100, 0));
    }

    #[test]
    fn test_unclustered_uses_lighter_text_alpha() {
        let unclustered = cluster_color(&value(-1));
        // white at alpha 0.3 stays white and takes black text
        assert_eq!(unclustered.bg_text, "rgb(255, 255, 255)");
        assert_eq!(unclustered.fg, "#000000");

        let clustered = cluster_color(&value(0));
        assert_eq!(clustered.fill, "rgb(44, 160, 44)");
        assert_eq!(clustered.bg_text, "rgb(150, 208, 150)");
    }

    #[test]
    fn test_foreground_thresholds_differ() {
        // luminance of #a0a0a0 at alpha 1.0 is 160: above 150 (flat
        // call site -> black) but below 186 (blended call site -> white)
        assert_eq!(foreground_for_hex("#a0a0a0", 1.0), "#000000");
        assert_eq!(hex_to_rgb("#a0a0a0").unwrap().foreground(1.0), "#ffffff");
    }

    #[test]
    fn test_model_badges() {
        let badge = model_badge("GPT-4");
        assert_eq!(badge.color, "#6666c2");
        // #6666c2 has luminance 112.5, below the flat threshold
        assert_eq!(badge.fg, "#ffffff");

        let unknown = model_badge("some-new-model");
        assert_eq!(unknown.color, "#ffffff");
        assert_eq!(unknown.fg, "#000000");
    }

    #[test]
    fn test_hex_parsing() {
        assert_eq!(hex_to_rgb("#2ca02c"), Some(Rgb::new(44, 160, 44)));
        assert_eq!(hex_to_rgb("2ca02c"), None);
        assert_eq!(hex_to_rgb("#xyzxyz"), None);
    }
}
