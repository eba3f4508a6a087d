//! Theme provider: a static registry of color palettes keyed by name.
//!
//! A theme is an immutable value. Switching themes swaps the value handed
//! to the next frame; there is no transition.

use std::collections::HashMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::color::Color;
use crate::error::RenderError;

/// Built-in theme registry.
const THEMES_JSON: &str = include_str!("themes.json");

/// Key into the theme registry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ThemeKey {
    Light,
    #[default]
    Dark,
}

impl ThemeKey {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Light => "light",
            Self::Dark => "dark",
        }
    }
}

impl fmt::Display for ThemeKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for ThemeKey {
    type Err = RenderError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "light" => Ok(Self::Light),
            "dark" => Ok(Self::Dark),
            other => Err(RenderError::UnknownTheme(other.to_string())),
        }
    }
}

/// Map entity shape category, used to pick a per-shape style.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ShapeKind {
    Box,
    Circle,
    Polyline,
}

/// Per-shape styling.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EntityStyle {
    pub fill: Color,
    pub outline: Color,
    pub bloom: Color,
    /// Shadow blur at base zoom; zero disables the glow.
    #[serde(default)]
    pub bloom_radius: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EntityStyles {
    #[serde(rename = "box")]
    pub box_: EntityStyle,
    pub circle: EntityStyle,
    pub polyline: EntityStyle,
}

impl EntityStyles {
    pub fn get(&self, kind: ShapeKind) -> &EntityStyle {
        match kind {
            ShapeKind::Box => &self.box_,
            ShapeKind::Circle => &self.circle,
            ShapeKind::Polyline => &self.polyline,
        }
    }
}

/// Full palette for one theme.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ColorTheme {
    pub background: Color,
    /// Lightness (percent) of marble body colors.
    pub marble_lightness: f64,
    pub marble_winning_border: Color,
    pub skill_color: Color,
    pub cool_time_indicator: Color,
    pub entity: EntityStyles,
    /// Outline of rank text; transparent disables it.
    pub rank_stroke: Color,
    pub minimap_background: Color,
    pub minimap_viewport: Color,
    pub winner_background: Color,
    pub winner_outline: Color,
    pub winner_text: Color,
}

impl ColorTheme {
    pub fn light() -> Self {
        ThemeRegistry::builtin().theme(ThemeKey::Light).clone()
    }

    pub fn dark() -> Self {
        ThemeRegistry::builtin().theme(ThemeKey::Dark).clone()
    }

    pub fn style(&self, kind: ShapeKind) -> &EntityStyle {
        self.entity.get(kind)
    }
}

/// Lookup table from theme key to palette.
#[derive(Debug, Clone)]
pub struct ThemeRegistry {
    themes: HashMap<ThemeKey, ColorTheme>,
}

impl ThemeRegistry {
    /// Parses a registry from JSON (`{ "light": {...}, "dark": {...} }`).
    pub fn from_json(json: &str) -> Result<Self, RenderError> {
        let themes: HashMap<ThemeKey, ColorTheme> = serde_json::from_str(json)?;
        Ok(Self { themes })
    }

    /// The registry embedded in the crate.
    ///
    /// # Panics
    /// Only if the embedded `themes.json` is malformed, which the tests rule out.
    pub fn builtin() -> &'static Self {
        static BUILTIN: std::sync::OnceLock<ThemeRegistry> = std::sync::OnceLock::new();
        BUILTIN.get_or_init(|| {
            Self::from_json(THEMES_JSON).expect("embedded themes.json must be valid")
        })
    }

    /// Looks up a theme by its string key.
    pub fn get(&self, key: &str) -> Result<&ColorTheme, RenderError> {
        let key: ThemeKey = key.parse()?;
        self.themes
            .get(&key)
            .ok_or_else(|| RenderError::UnknownTheme(key.to_string()))
    }

    /// Looks up a theme by string key, falling back to the default theme.
    pub fn get_or_default(&self, key: &str) -> &ColorTheme {
        self.get(key).unwrap_or_else(|e| {
            tracing::warn!(error = %e, "Falling back to default theme");
            self.theme(ThemeKey::default())
        })
    }

    /// Looks up a theme by key; a registry missing the key falls back to the
    /// built-in palette for it.
    pub fn theme(&self, key: ThemeKey) -> &ColorTheme {
        match self.themes.get(&key) {
            Some(theme) => theme,
            None => Self::builtin().theme(key),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builtin_registry_has_both_themes() {
        let registry = ThemeRegistry::builtin();
        assert_eq!(registry.theme(ThemeKey::Light).background, Color::rgb(238, 238, 238));
        assert_eq!(registry.theme(ThemeKey::Dark).background, Color::BLACK);
    }

    #[test]
    fn test_dark_theme_entity_styles() {
        let dark = ColorTheme::dark();
        let style = dark.style(ShapeKind::Polyline);
        assert_eq!(style.fill, Color::rgb(0xb0, 0xb0, 0xb0));
        assert_eq!(style.bloom, Color::rgb(0, 255, 255));
        assert_eq!(style.bloom_radius, 15.0);
        assert!(dark.rank_stroke.is_transparent());
    }

    #[test]
    fn test_unknown_key_is_an_error() {
        let registry = ThemeRegistry::builtin();
        assert!(matches!(
            registry.get("sepia"),
            Err(RenderError::UnknownTheme(name)) if name == "sepia"
        ));
        assert_eq!(registry.get_or_default("sepia"), &ColorTheme::dark());
    }

    #[test]
    fn test_partial_registry_falls_back_to_builtin() {
        let json = serde_json::json!({ "light": ColorTheme::light() }).to_string();
        let registry = ThemeRegistry::from_json(&json).unwrap();
        assert_eq!(registry.theme(ThemeKey::Dark), &ColorTheme::dark());
    }
}
