//! Color handling for Diagen diagrams.
//!
//! Style records keep colors as the exact text written in the source so they
//! round-trip unchanged. [`Color`] is used where a color has to be understood:
//! validating configured and themed colors, and deriving SVG-safe values.

use std::{fmt, str::FromStr};

use color::DynamicColor;

/// Parsed CSS color, wrapping `DynamicColor` from the `color` crate.
#[derive(Clone, Copy, PartialEq, Debug)]
pub struct Color {
    color: DynamicColor,
}

impl Color {
    /// Parses a CSS color string such as `#4A90D9`, `rgba(0, 0, 0, 0.1)` or `white`.
    ///
    /// # Examples
    ///
    /// ```
    /// use diagen_core::color::Color;
    ///
    /// assert!(Color::new("#4A90D9").is_ok());
    /// assert!(Color::new("rgba(240, 240, 240, 0.5)").is_ok());
    /// assert!(Color::new("not-a-color").is_err());
    /// ```
    pub fn new(color_str: &str) -> Result<Self, String> {
        DynamicColor::from_str(color_str)
            .map(|color| Self { color })
            .map_err(|err| format!("invalid color `{color_str}`: {err}"))
    }

    /// Returns `true` if `color_str` parses as a CSS color.
    pub fn is_valid(color_str: &str) -> bool {
        Self::new(color_str).is_ok()
    }

    /// Returns a string usable inside an SVG id attribute.
    ///
    /// The result has only alphanumeric characters and underscores and never
    /// starts with a digit.
    pub fn to_id_safe_string(self) -> String {
        let mut sanitized = self
            .to_string()
            .replace('#', "hex")
            .replace(['(', ')', ',', ' ', ';', '.', '%'], "_");
        if sanitized.chars().next().is_some_and(|c| c.is_ascii_digit()) {
            sanitized = format!("c_{sanitized}");
        }
        sanitized
    }

    /// Returns the alpha component between 0.0 and 1.0.
    pub fn alpha(&self) -> f32 {
        self.color.components[3]
    }

    /// Returns `true` if the color is fully transparent.
    pub fn is_transparent(&self) -> bool {
        self.alpha() == 0.0
    }
}

impl Default for Color {
    fn default() -> Self {
        Self {
            color: DynamicColor::from_alpha_color(color::AlphaColor::<color::Srgb>::WHITE),
        }
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.color)
    }
}
