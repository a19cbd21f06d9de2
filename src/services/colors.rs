// src/services/colors.rs
//! Tile coloring for the heat maps.
//!
//! Everything here is pure: a value and a scale go in, CSS-ready colors come
//! out. Price moves use a green/red polarity with a dark neutral band around
//! zero. Relative volume uses one hue (the sector's, when known) so volume
//! surges read differently from price moves.

use crate::models::PeriodKey;
use serde::{Serialize, Serializer};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Rgb {
    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Rgb { r, g, b }
    }

    fn lerp(low: Rgb, high: Rgb, t: f64) -> Rgb {
        let channel = |a: u8, b: u8| (a as f64 + (b as f64 - a as f64) * t).round() as u8;
        Rgb {
            r: channel(low.r, high.r),
            g: channel(low.g, high.g),
            b: channel(low.b, high.b),
        }
    }

    fn lighten(self, amount: u8) -> Rgb {
        Rgb {
            r: self.r.saturating_add(amount),
            g: self.g.saturating_add(amount),
            b: self.b.saturating_add(amount),
        }
    }

    fn darken(self, amount: u8) -> Rgb {
        Rgb {
            r: self.r.saturating_sub(amount),
            g: self.g.saturating_sub(amount),
            b: self.b.saturating_sub(amount),
        }
    }

    fn scaled(self, factor: f64) -> Rgb {
        let channel = |c: u8| (c as f64 * factor).round().clamp(0.0, 255.0) as u8;
        Rgb {
            r: channel(self.r),
            g: channel(self.g),
            b: channel(self.b),
        }
    }
}

impl fmt::Display for Rgb {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "rgb({}, {}, {})", self.r, self.g, self.b)
    }
}

/// Three-stop vertical gradient.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Gradient {
    pub top: Rgb,
    pub middle: Rgb,
    pub bottom: Rgb,
}

impl fmt::Display for Gradient {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(
            f,
            "linear-gradient(180deg, {} 0%, {} 50%, {} 100%)",
            self.top, self.middle, self.bottom
        )
    }
}

impl Serialize for Gradient {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

/// White text at a given opacity.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Foreground {
    pub opacity: f64,
}

impl fmt::Display for Foreground {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "rgba(255, 255, 255, {})", self.opacity)
    }
}

impl Serialize for Foreground {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct TileColor {
    pub background: Gradient,
    pub foreground: Foreground,
    pub intensity: f64,
}

pub const NEUTRAL_GRADIENT: Gradient = Gradient {
    top: Rgb::new(56, 56, 56),
    middle: Rgb::new(26, 26, 26),
    bottom: Rgb::new(10, 10, 10),
};

pub const NEUTRAL_FOREGROUND: Foreground = Foreground { opacity: 0.5 };

const UP_LOW: Rgb = Rgb::new(30, 80, 80);
const UP_HIGH: Rgb = Rgb::new(20, 200, 50);
const DOWN_LOW: Rgb = Rgb::new(80, 50, 70);
const DOWN_HIGH: Rgb = Rgb::new(220, 50, 50);
const VOLUME_DEFAULT: Rgb = Rgb::new(255, 170, 0);

const STOP_OFFSET: u8 = 30;

const REL_VOLUME_FLOOR: f64 = 1.0;
const REL_VOLUME_CEILING: f64 = 3.0;

/// Percent-change band of one period.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ColorScale {
    pub neutral_threshold: f64,
    pub max_up: f64,
    pub max_down: f64,
}

impl ColorScale {
    const fn new(neutral_threshold: f64, max_up: f64, max_down: f64) -> Self {
        ColorScale { neutral_threshold, max_up, max_down }
    }

    pub fn for_period(period: PeriodKey) -> ColorScale {
        match period {
            PeriodKey::OneDay => ColorScale::new(0.49, 5.0, 5.0),
            PeriodKey::OneWeek => ColorScale::new(1.0, 10.0, 10.0),
            PeriodKey::OneMonth => ColorScale::new(2.0, 20.0, 20.0),
            PeriodKey::ThreeMonths => ColorScale::new(3.0, 30.0, 30.0),
            PeriodKey::SixMonths => ColorScale::new(4.0, 40.0, 40.0),
            PeriodKey::YearToDate => ColorScale::new(4.0, 50.0, 40.0),
            PeriodKey::OneYear => ColorScale::new(5.0, 60.0, 50.0),
            PeriodKey::ThreeYears => ColorScale::new(10.0, 150.0, 60.0),
            PeriodKey::FiveYears => ColorScale::new(15.0, 250.0, 70.0),
            PeriodKey::TenYears => ColorScale::new(20.0, 500.0, 80.0),
        }
    }

    /// Scale by label, the 1D scale for anything unrecognised.
    pub fn for_key(key: &str) -> ColorScale {
        let period = key.parse().unwrap_or(PeriodKey::OneDay);
        ColorScale::for_period(period)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColorMode {
    Heat,
    /// `sector_color` replaces the default amber hue.
    RelativeVolume { sector_color: Option<Rgb> },
}

fn neutral() -> TileColor {
    TileColor {
        background: NEUTRAL_GRADIENT,
        foreground: NEUTRAL_FOREGROUND,
        intensity: 0.0,
    }
}

fn shaded(base: Rgb, intensity: f64) -> TileColor {
    TileColor {
        background: Gradient {
            top: base.lighten(STOP_OFFSET),
            middle: base,
            bottom: base.darken(STOP_OFFSET),
        },
        foreground: Foreground { opacity: 0.5 + 0.5 * intensity },
        intensity,
    }
}

fn ramp(excess: f64, span: f64) -> f64 {
    if span <= 0.0 {
        return 1.0;
    }
    (excess / span).clamp(0.0, 1.0)
}

/// Color of a tile showing `value` for `period`.
///
/// In heat mode `value` is a percent change. In relative-volume mode it is
/// the volume multiple and `period` is ignored.
pub fn color_for(value: f64, period: PeriodKey, mode: ColorMode) -> TileColor {
    if !value.is_finite() {
        return neutral();
    }

    match mode {
        ColorMode::Heat => {
            let scale = ColorScale::for_period(period);
            let magnitude = value.abs();
            if magnitude <= scale.neutral_threshold {
                return neutral();
            }

            let (max_threshold, low, high) = if value >= 0.0 {
                (scale.max_up, UP_LOW, UP_HIGH)
            } else {
                (scale.max_down, DOWN_LOW, DOWN_HIGH)
            };
            let intensity = ramp(
                magnitude - scale.neutral_threshold,
                max_threshold - scale.neutral_threshold,
            );
            shaded(Rgb::lerp(low, high, intensity), intensity)
        }
        ColorMode::RelativeVolume { sector_color } => {
            if value <= REL_VOLUME_FLOOR {
                return neutral();
            }
            let high = sector_color.unwrap_or(VOLUME_DEFAULT);
            let intensity = ramp(value - REL_VOLUME_FLOOR, REL_VOLUME_CEILING - REL_VOLUME_FLOOR);
            shaded(Rgb::lerp(high.scaled(0.35), high, intensity), intensity)
        }
    }
}

/// Saturated hue for the relative-volume view of a known sector.
pub fn sector_color(sector: &str) -> Option<Rgb> {
    let color = match sector {
        "Technology" => Rgb::new(64, 120, 255),
        "Financial" | "Financial Services" => Rgb::new(46, 184, 184),
        "Healthcare" => Rgb::new(214, 76, 160),
        "Consumer Cyclical" => Rgb::new(255, 140, 40),
        "Consumer Defensive" => Rgb::new(130, 200, 80),
        "Communication Services" => Rgb::new(160, 100, 255),
        "Energy" => Rgb::new(230, 200, 40),
        "Industrials" => Rgb::new(150, 150, 170),
        "Materials" | "Basic Materials" => Rgb::new(170, 120, 70),
        "Utilities" => Rgb::new(80, 200, 255),
        "Real Estate" => Rgb::new(240, 100, 100),
        _ => return None,
    };
    Some(color)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_neutral_band_ignores_sign() {
        for period in PeriodKey::ALL {
            let threshold = ColorScale::for_period(period).neutral_threshold;
            for value in [0.0, threshold, -threshold, threshold / 2.0, -threshold / 2.0] {
                let color = color_for(value, period, ColorMode::Heat);
                assert_eq!(color.background, NEUTRAL_GRADIENT, "{} {}", period, value);
                assert_eq!(color.foreground, NEUTRAL_FOREGROUND);
            }
        }
    }

    #[test]
    fn test_non_finite_is_neutral() {
        for value in [f64::NAN, f64::INFINITY, f64::NEG_INFINITY] {
            assert_eq!(color_for(value, PeriodKey::OneDay, ColorMode::Heat), neutral());
        }
    }

    #[test]
    fn test_clamp_at_and_beyond_max() {
        for period in PeriodKey::ALL {
            let scale = ColorScale::for_period(period);

            let at_up = color_for(scale.max_up, period, ColorMode::Heat);
            assert_eq!(at_up.intensity, 1.0);
            assert_eq!(at_up.foreground.opacity, 1.0);
            assert_eq!(color_for(scale.max_up * 3.0, period, ColorMode::Heat), at_up);

            let at_down = color_for(-scale.max_down, period, ColorMode::Heat);
            assert_eq!(at_down.intensity, 1.0);
            assert_eq!(color_for(-scale.max_down - 100.0, period, ColorMode::Heat), at_down);
        }
    }

    #[test]
    fn test_one_day_extremes_render_expected_css() {
        let up = color_for(5.0, PeriodKey::OneDay, ColorMode::Heat);
        assert_eq!(
            up.background.to_string(),
            "linear-gradient(180deg, rgb(50, 230, 80) 0%, rgb(20, 200, 50) 50%, rgb(0, 170, 20) 100%)"
        );
        assert_eq!(up.foreground.to_string(), "rgba(255, 255, 255, 1)");

        let down = color_for(-7.5, PeriodKey::OneDay, ColorMode::Heat);
        assert_eq!(
            down.background.to_string(),
            "linear-gradient(180deg, rgb(250, 80, 80) 0%, rgb(220, 50, 50) 50%, rgb(190, 20, 20) 100%)"
        );

        assert_eq!(
            NEUTRAL_GRADIENT.to_string(),
            "linear-gradient(180deg, rgb(56, 56, 56) 0%, rgb(26, 26, 26) 50%, rgb(10, 10, 10) 100%)"
        );
    }

    #[test]
    fn test_intensity_is_linear_between_threshold_and_max() {
        // 1W: neutral 1, max 10 -> 5.5 sits half way
        let color = color_for(5.5, PeriodKey::OneWeek, ColorMode::Heat);
        assert!((color.intensity - 0.5).abs() < 1e-9);
        assert!((color.foreground.opacity - 0.75).abs() < 1e-9);
        assert_eq!(color.background.middle, Rgb::new(25, 140, 65));

        let weaker = color_for(3.0, PeriodKey::OneWeek, ColorMode::Heat);
        assert!(weaker.intensity < color.intensity);
        assert!(weaker.background.middle.g < color.background.middle.g);
    }

    #[test]
    fn test_asymmetric_scale_uses_side_specific_max() {
        // 3Y: neutral 10, up to 150, down to 60
        let up = color_for(80.0, PeriodKey::ThreeYears, ColorMode::Heat);
        let down = color_for(-35.0, PeriodKey::ThreeYears, ColorMode::Heat);
        assert!((up.intensity - 0.5).abs() < 1e-9);
        assert!((down.intensity - 0.5).abs() < 1e-9);
    }

    #[test]
    fn test_unknown_scale_key_uses_one_day() {
        assert_eq!(ColorScale::for_key("2D"), ColorScale::for_period(PeriodKey::OneDay));
        assert_eq!(ColorScale::for_key("5Y"), ColorScale::for_period(PeriodKey::FiveYears));
    }

    #[test]
    fn test_relative_volume_mode() {
        let mode = ColorMode::RelativeVolume { sector_color: None };

        assert_eq!(color_for(1.0, PeriodKey::OneDay, mode), neutral());
        assert_eq!(color_for(0.4, PeriodKey::OneDay, mode), neutral());

        let half = color_for(2.0, PeriodKey::OneDay, mode);
        assert!((half.intensity - 0.5).abs() < 1e-9);

        let full = color_for(3.0, PeriodKey::OneDay, mode);
        assert_eq!(full.background.middle, VOLUME_DEFAULT);
        assert_eq!(color_for(9.0, PeriodKey::TenYears, mode), full);
    }

    #[test]
    fn test_relative_volume_uses_sector_hue() {
        let tech = sector_color("Technology");
        assert!(tech.is_some());
        assert!(sector_color("Unknown Sector").is_none());

        let color = color_for(
            3.0,
            PeriodKey::OneDay,
            ColorMode::RelativeVolume { sector_color: tech },
        );
        assert_eq!(color.background.middle, Rgb::new(64, 120, 255));
        assert_eq!(color.background.top, Rgb::new(94, 150, 255));
    }
}
