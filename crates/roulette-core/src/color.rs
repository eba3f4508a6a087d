//! RGBA color with CSS parsing/formatting.
//!
//! Theme and config files store colors as CSS strings, so `Color`
//! (de)serializes through its CSS form.

use std::fmt;

use serde::{Deserialize, Serialize};

/// RGBA color representation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

/// Error returned when a CSS color string cannot be parsed.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid css color: '{0}'")]
pub struct ParseColorError(pub String);

impl Color {
    pub const fn new(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }

    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self::new(r, g, b, 255)
    }

    pub const BLACK: Color = Color::rgb(0, 0, 0);
    pub const WHITE: Color = Color::rgb(255, 255, 255);
    pub const TRANSPARENT: Color = Color::new(0, 0, 0, 0);
    pub const GOLD: Color = Color::rgb(255, 215, 0);
    pub const ORANGE: Color = Color::rgb(255, 165, 0);

    /// Builds a color from an alpha in `0.0..=1.0`.
    pub fn rgba_f(r: u8, g: u8, b: u8, alpha: f64) -> Self {
        Self::new(r, g, b, unit_to_u8(alpha))
    }

    /// HSL color. `hue` in degrees (wrapped), saturation/lightness in percent.
    pub fn hsl(hue: f64, saturation: f64, lightness: f64) -> Self {
        Self::hsla(hue, saturation, lightness, 1.0)
    }

    /// HSL color with alpha in `0.0..=1.0`.
    pub fn hsla(hue: f64, saturation: f64, lightness: f64, alpha: f64) -> Self {
        let h = hue.rem_euclid(360.0) / 360.0;
        let s = (saturation / 100.0).clamp(0.0, 1.0);
        let l = (lightness / 100.0).clamp(0.0, 1.0);

        let q = if l < 0.5 { l * (1.0 + s) } else { l + s - l * s };
        let p = 2.0 * l - q;
        let channel = |t: f64| {
            let t = t.rem_euclid(1.0);
            let v = if t < 1.0 / 6.0 {
                p + (q - p) * 6.0 * t
            } else if t < 0.5 {
                q
            } else if t < 2.0 / 3.0 {
                p + (q - p) * (2.0 / 3.0 - t) * 6.0
            } else {
                p
            };
            unit_to_u8(v)
        };

        Self::new(
            channel(h + 1.0 / 3.0),
            channel(h),
            channel(h - 1.0 / 3.0),
            unit_to_u8(alpha),
        )
    }

    #[must_use]
    pub fn with_alpha(self, alpha: f64) -> Self {
        Self {
            a: unit_to_u8(alpha),
            ..self
        }
    }

    pub fn alpha(&self) -> f64 {
        f64::from(self.a) / 255.0
    }

    pub fn is_transparent(&self) -> bool {
        self.a == 0
    }

    /// CSS `rgba()` string, accepted by every canvas backend.
    pub fn to_css(&self) -> String {
        if self.a == 255 {
            format!("rgb({}, {}, {})", self.r, self.g, self.b)
        } else {
            format!(
                "rgba({}, {}, {}, {})",
                self.r,
                self.g,
                self.b,
                (self.alpha() * 1000.0).round() / 1000.0
            )
        }
    }

    /// Parses `#rgb`, `#rrggbb`, `#rrggbbaa`, `rgb()`, `rgba()`, `hsl()`,
    /// `hsla()` and a small set of named colors. The empty string is
    /// transparent.
    pub fn parse(input: &str) -> Result<Self, ParseColorError> {
        let s = input.trim().to_ascii_lowercase();
        let err = || ParseColorError(input.to_string());

        if s.is_empty() {
            return Ok(Self::TRANSPARENT);
        }
        if let Some(hex) = s.strip_prefix('#') {
            return parse_hex(hex).ok_or_else(err);
        }
        if let Some(args) = function_args(&s, "rgba").or_else(|| function_args(&s, "rgb")) {
            let parts = split_args(args);
            return match parts.as_slice() {
                [r, g, b] => Ok(Self::rgb(byte(r)?, byte(g)?, byte(b)?)),
                [r, g, b, a] => Ok(Self::rgba_f(byte(r)?, byte(g)?, byte(b)?, number(a)?)),
                _ => Err(err()),
            };
        }
        if let Some(args) = function_args(&s, "hsla").or_else(|| function_args(&s, "hsl")) {
            let parts = split_args(args);
            return match parts.as_slice() {
                [h, sat, l] => Ok(Self::hsl(number(h)?, percent(sat)?, percent(l)?)),
                [h, sat, l, a] => Ok(Self::hsla(
                    number(h)?,
                    percent(sat)?,
                    percent(l)?,
                    number(a)?,
                )),
                _ => Err(err()),
            };
        }

        named(&s).ok_or_else(err)
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_css())
    }
}

impl std::str::FromStr for Color {
    type Err = ParseColorError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl TryFrom<String> for Color {
    type Error = ParseColorError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<Color> for String {
    fn from(color: Color) -> Self {
        color.to_css()
    }
}

#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
fn unit_to_u8(v: f64) -> u8 {
    (v.clamp(0.0, 1.0) * 255.0).round() as u8
}

fn function_args<'a>(s: &'a str, name: &str) -> Option<&'a str> {
    s.strip_prefix(name)?
        .trim_start()
        .strip_prefix('(')?
        .strip_suffix(')')
}

fn split_args(args: &str) -> Vec<&str> {
    args.split([',', ' ', '/'])
        .map(str::trim)
        .filter(|p| !p.is_empty())
        .collect()
}

fn number(s: &str) -> Result<f64, ParseColorError> {
    s.trim_end_matches("deg")
        .parse::<f64>()
        .map_err(|_| ParseColorError(s.to_string()))
}

fn percent(s: &str) -> Result<f64, ParseColorError> {
    number(s.trim_end_matches('%'))
}

#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
fn byte(s: &str) -> Result<u8, ParseColorError> {
    number(s).map(|v| v.clamp(0.0, 255.0).round() as u8)
}

fn parse_hex(hex: &str) -> Option<Color> {
    let nibble = |i: usize| u8::from_str_radix(hex.get(i..=i)?, 16).ok();
    let pair = |i: usize| u8::from_str_radix(hex.get(i..i + 2)?, 16).ok();
    match hex.len() {
        3 => Some(Color::rgb(
            nibble(0)? * 17,
            nibble(1)? * 17,
            nibble(2)? * 17,
        )),
        6 => Some(Color::rgb(pair(0)?, pair(2)?, pair(4)?)),
        8 => Some(Color::new(pair(0)?, pair(2)?, pair(4)?, pair(6)?)),
        _ => None,
    }
}

fn named(name: &str) -> Option<Color> {
    Some(match name {
        "black" => Color::BLACK,
        "white" => Color::WHITE,
        "transparent" => Color::TRANSPARENT,
        "red" => Color::rgb(255, 0, 0),
        "yellow" => Color::rgb(255, 255, 0),
        "cyan" | "aqua" => Color::rgb(0, 255, 255),
        "gold" => Color::GOLD,
        "orange" => Color::ORANGE,
        "gray" | "grey" => Color::rgb(128, 128, 128),
        _ => return None,
    })
}
