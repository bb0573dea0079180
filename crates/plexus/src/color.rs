//! CSS color values used by the SVG exporter.

use std::{fmt, str::FromStr};

use color::DynamicColor;

/// Wrapper around the `DynamicColor` type from the color crate.
///
/// Parses CSS color strings such as `"#ff0000"`, `"rgb(255, 0, 0)"` or
/// `"red"`.
#[derive(Clone, PartialEq, Debug)]
pub struct Color {
    color: DynamicColor,
}

impl Color {
    /// Create a new `Color` from a CSS color string.
    pub fn new(color_str: &str) -> Result<Self, String> {
        match DynamicColor::from_str(color_str) {
            Ok(color) => Ok(Color { color }),
            Err(err) => Err(format!("Invalid color '{color_str}': {err}")),
        }
    }

    /// Alpha component in `[0, 1]`.
    pub fn alpha(&self) -> f32 {
        self.color.components[3]
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.color)
    }
}

impl From<&Color> for svg::node::Value {
    fn from(color: &Color) -> Self {
        svg::node::Value::from(color.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_valid_colors() {
        assert!(Color::new("red").is_ok());
        assert!(Color::new("#00ff00").is_ok());
        assert!(Color::new("rgb(0, 0, 255)").is_ok());
    }

    #[test]
    fn test_invalid_color() {
        let err = Color::new("definitely-not-a-color").unwrap_err();
        assert!(err.contains("definitely-not-a-color"));
    }

    #[test]
    fn test_alpha() {
        assert_eq!(Color::new("black").unwrap().alpha(), 1.0);
        assert_eq!(Color::new("transparent").unwrap().alpha(), 0.0);
    }
}
