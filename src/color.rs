//! Colour model: hex parsing, linear blends, and the score tier palette.

use crate::types::Color;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Rgb {
    pub const BLACK: Rgb = Rgb::new(0, 0, 0);
    pub const WHITE: Rgb = Rgb::new(255, 255, 255);

    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    pub fn to_hex(self) -> String {
        format!("#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
    }

    /// Per-channel linear blend; `ratio` is clamped to 0..=1.
    pub fn lerp(self, other: Rgb, ratio: f32) -> Rgb {
        let ratio = if ratio.is_finite() {
            ratio.clamp(0.0, 1.0)
        } else {
            0.0
        };
        Rgb::new(
            lerp_channel(self.r, other.r, ratio),
            lerp_channel(self.g, other.g, ratio),
            lerp_channel(self.b, other.b, ratio),
        )
    }

    /// Moves the colour toward white by `amount` (0 keeps it, 1 is white).
    pub fn tint(self, amount: f32) -> Rgb {
        self.lerp(Rgb::WHITE, amount)
    }

    /// Scales every channel by `factor`, used for drop shadows.
    pub fn shade(self, factor: f32) -> Rgb {
        let factor = factor.clamp(0.0, 1.0);
        let scale = |c: u8| (c as f32 * factor).round() as u8;
        Rgb::new(scale(self.r), scale(self.g), scale(self.b))
    }
}

impl From<Rgb> for Color {
    fn from(value: Rgb) -> Self {
        Color::rgb(
            value.r as f32 / 255.0,
            value.g as f32 / 255.0,
            value.b as f32 / 255.0,
        )
    }
}

fn lerp_channel(a: u8, b: u8, ratio: f32) -> u8 {
    let value = a as f32 + (b as f32 - a as f32) * ratio;
    (value + 0.5).floor().clamp(0.0, 255.0) as u8
}

/// Parses `#rrggbb` or `rrggbb` (case-insensitive).
///
/// Anything else yields black. This fallback is intentional: colours come
/// from the theme table, so a malformed entry degrades to black text or
/// fills instead of aborting a render.
pub fn hex_to_rgb(hex: &str) -> Rgb {
    let digits = hex.strip_prefix('#').unwrap_or(hex);
    if digits.len() != 6 || !digits.bytes().all(|b| b.is_ascii_hexdigit()) {
        return Rgb::BLACK;
    }
    let channel = |range: std::ops::Range<usize>| u8::from_str_radix(&digits[range], 16).ok();
    match (channel(0..2), channel(2..4), channel(4..6)) {
        (Some(r), Some(g), Some(b)) => Rgb::new(r, g, b),
        _ => Rgb::BLACK,
    }
}

pub fn rgb_to_hex(rgb: Rgb) -> String {
    rgb.to_hex()
}

/// Blends two hex colours and returns the result as lowercase hex.
pub fn interpolate(color_a: &str, color_b: &str, ratio: f32) -> String {
    hex_to_rgb(color_a).lerp(hex_to_rgb(color_b), ratio).to_hex()
}

/// Flat colours for `steps` horizontal strips, strip `i` at `ratio = i/(steps-1)`.
pub fn gradient_strips(from: Rgb, to: Rgb, steps: usize) -> Vec<Rgb> {
    match steps {
        0 => Vec::new(),
        1 => vec![from],
        _ => (0..steps)
            .map(|i| from.lerp(to, i as f32 / (steps - 1) as f32))
            .collect(),
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ColorToken {
    Primary,
    Secondary,
    Accent,
    Surface,
    CardBackground,
    Text,
    TextSecondary,
    TextMuted,
    Border,
    BorderDark,
    Success,
    Warning,
    Danger,
    Body,
    White,
}

impl ColorToken {
    pub const ALL: [ColorToken; 15] = [
        ColorToken::Primary,
        ColorToken::Secondary,
        ColorToken::Accent,
        ColorToken::Surface,
        ColorToken::CardBackground,
        ColorToken::Text,
        ColorToken::TextSecondary,
        ColorToken::TextMuted,
        ColorToken::Border,
        ColorToken::BorderDark,
        ColorToken::Success,
        ColorToken::Warning,
        ColorToken::Danger,
        ColorToken::Body,
        ColorToken::White,
    ];

    fn index(self) -> usize {
        self as usize
    }

    fn default_hex(self) -> &'static str {
        match self {
            ColorToken::Primary => "#a855f7",
            ColorToken::Secondary => "#3b82f6",
            ColorToken::Accent => "#10b981",
            ColorToken::Surface => "#f8fafc",
            ColorToken::CardBackground => "#f1f5f9",
            ColorToken::Text => "#1e293b",
            ColorToken::TextSecondary => "#475569",
            ColorToken::TextMuted => "#64748b",
            ColorToken::Border => "#e2e8f0",
            ColorToken::BorderDark => "#cbd5e1",
            ColorToken::Success => "#059669",
            ColorToken::Warning => "#d97706",
            ColorToken::Danger => "#dc2626",
            ColorToken::Body => "#000000",
            ColorToken::White => "#ffffff",
        }
    }
}

/// Every token resolved to a concrete triple once, at construction.
#[derive(Debug, Clone, PartialEq)]
pub struct Theme {
    colors: [Rgb; ColorToken::ALL.len()],
}

impl Default for Theme {
    fn default() -> Self {
        let mut colors = [Rgb::BLACK; ColorToken::ALL.len()];
        for token in ColorToken::ALL {
            colors[token.index()] = hex_to_rgb(token.default_hex());
        }
        Self { colors }
    }
}

impl Theme {
    pub fn with(mut self, token: ColorToken, color: Rgb) -> Self {
        self.colors[token.index()] = color;
        self
    }

    pub fn rgb(&self, token: ColorToken) -> Rgb {
        self.colors[token.index()]
    }

    pub fn color(&self, token: ColorToken) -> Color {
        self.rgb(token).into()
    }

    pub fn score_color(&self, score: u8) -> Rgb {
        self.rgb(ScoreTier::from_score(score).token())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScoreTier {
    Success,
    Warning,
    Danger,
}

impl ScoreTier {
    // Lower bounds are inclusive: 80 is Success, 60 is Warning.
    pub fn from_score(score: u8) -> Self {
        if score >= 80 {
            ScoreTier::Success
        } else if score >= 60 {
            ScoreTier::Warning
        } else {
            ScoreTier::Danger
        }
    }

    pub fn token(self) -> ColorToken {
        match self {
            ScoreTier::Success => ColorToken::Success,
            ScoreTier::Warning => ColorToken::Warning,
            ScoreTier::Danger => ColorToken::Danger,
        }
    }
}

pub fn score_to_color(score: u8) -> Rgb {
    Theme::default().score_color(score)
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn hex_parses_with_and_without_hash() {
        assert_eq!(hex_to_rgb("#a855f7"), Rgb::new(0xa8, 0x55, 0xf7));
        assert_eq!(hex_to_rgb("3B82F6"), Rgb::new(0x3b, 0x82, 0xf6));
    }

    #[test]
    fn malformed_hex_falls_back_to_black() {
        for input in ["", "#fff", "#12345", "#1234567", "zzzzzz", "#12 456", "#ééé"] {
            assert_eq!(hex_to_rgb(input), Rgb::BLACK, "input {input:?}");
        }
    }

    #[test]
    fn tier_boundaries_are_inclusive_on_lower_bound() {
        let theme = Theme::default();
        let success = theme.rgb(ColorToken::Success);
        let warning = theme.rgb(ColorToken::Warning);
        let danger = theme.rgb(ColorToken::Danger);
        assert_eq!(score_to_color(100), success);
        assert_eq!(score_to_color(80), success);
        assert_eq!(score_to_color(79), warning);
        assert_eq!(score_to_color(60), warning);
        assert_eq!(score_to_color(59), danger);
        assert_eq!(score_to_color(0), danger);
    }

    #[test]
    fn every_score_maps_to_exactly_one_tier_color() {
        let theme = Theme::default();
        let tiers = [
            theme.rgb(ColorToken::Success),
            theme.rgb(ColorToken::Warning),
            theme.rgb(ColorToken::Danger),
        ];
        for score in 0..=100u8 {
            let color = theme.score_color(score);
            assert_eq!(tiers.iter().filter(|c| **c == color).count(), 1);
        }
    }

    #[test]
    fn interpolate_hits_endpoints_and_midpoint() {
        assert_eq!(interpolate("#000000", "#ffffff", 0.0), "#000000");
        assert_eq!(interpolate("#000000", "#ffffff", 1.0), "#ffffff");
        assert_eq!(interpolate("#000000", "#ffffff", 0.5), "#808080");
        assert_eq!(interpolate("#000000", "#ffffff", 7.0), "#ffffff");
    }

    #[test]
    fn gradient_strips_span_both_endpoints() {
        let from = hex_to_rgb("#a855f7");
        let to = hex_to_rgb("#3b82f6");
        let strips = gradient_strips(from, to, 10);
        assert_eq!(strips.len(), 10);
        assert_eq!(strips[0], from);
        assert_eq!(strips[9], to);
        assert_eq!(gradient_strips(from, to, 1), vec![from]);
        assert!(gradient_strips(from, to, 0).is_empty());
    }

    #[test]
    fn theme_override_replaces_single_token() {
        let theme = Theme::default().with(ColorToken::Success, Rgb::new(1, 2, 3));
        assert_eq!(theme.score_color(95), Rgb::new(1, 2, 3));
        assert_eq!(theme.rgb(ColorToken::Primary), hex_to_rgb("#a855f7"));
    }

    #[test]
    fn tint_and_shade_move_toward_white_and_black() {
        let base = Rgb::new(100, 50, 200);
        assert_eq!(base.tint(0.0), base);
        assert_eq!(base.tint(1.0), Rgb::WHITE);
        assert_eq!(base.shade(0.0), Rgb::BLACK);
        assert_eq!(base.shade(1.0), base);
    }

    proptest! {
        #[test]
        fn hex_round_trip_is_exact(r in any::<u8>(), g in any::<u8>(), b in any::<u8>()) {
            let rgb = Rgb::new(r, g, b);
            let back = hex_to_rgb(&rgb_to_hex(rgb));
            prop_assert!((back.r as i16 - r as i16).abs() <= 1);
            prop_assert!((back.g as i16 - g as i16).abs() <= 1);
            prop_assert!((back.b as i16 - b as i16).abs() <= 1);
        }

        #[test]
        fn interpolating_a_color_with_itself_is_identity(
            r in any::<u8>(), g in any::<u8>(), b in any::<u8>(), ratio in 0.0f32..=1.0
        ) {
            let hex = Rgb::new(r, g, b).to_hex();
            prop_assert_eq!(interpolate(&hex, &hex, ratio), hex);
        }
    }
}
