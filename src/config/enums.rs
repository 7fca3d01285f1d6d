//! Configuration enum types.

use image::Rgba;
use log::warn;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Physical shape of the device display.
///
/// Round displays get their off-screen corners masked in the stitched output.
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, JsonSchema)]
#[serde(rename_all = "kebab-case")]
pub enum DisplayShape {
    /// Circular display (most Wear OS watches)
    Round,
    /// Square or rectangular display
    Square,
}

impl DisplayShape {
    pub fn is_round(self) -> bool {
        matches!(self, DisplayShape::Round)
    }
}

/// A color given either by name or as RGB values.
///
/// # Examples
/// ```toml
/// # Named color
/// border_color = "black"
///
/// # Custom RGB color (0-255 per component)
/// border_color = [32, 32, 32]
/// ```
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq, JsonSchema)]
#[serde(untagged)]
pub enum ColorSpec {
    /// Named color: black, white, gray, red, green, blue
    Name(String),
    /// RGB color as [red, green, blue] where each component is 0-255
    Rgb([u8; 3]),
}

impl ColorSpec {
    /// Converts to an opaque RGBA pixel.
    ///
    /// Unknown color names fall back to black with a warning.
    pub fn to_rgba(&self) -> Rgba<u8> {
        match self {
            ColorSpec::Name(name) => name_to_rgba(name).unwrap_or_else(|| {
                warn!("Unknown color '{}', using black", name);
                Rgba([0, 0, 0, 255])
            }),
            ColorSpec::Rgb([r, g, b]) => Rgba([*r, *g, *b, 255]),
        }
    }
}

/// Maps a color name (case-insensitive) to an opaque pixel value.
pub fn name_to_rgba(name: &str) -> Option<Rgba<u8>> {
    let rgb = match name.to_lowercase().as_str() {
        "black" => [0, 0, 0],
        "white" => [255, 255, 255],
        "gray" | "grey" => [128, 128, 128],
        "red" => [255, 0, 0],
        "green" => [0, 255, 0],
        "blue" => [0, 0, 255],
        _ => return None,
    };
    Some(Rgba([rgb[0], rgb[1], rgb[2], 255]))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn named_colors_are_case_insensitive() {
        assert_eq!(
            ColorSpec::Name("White".into()).to_rgba(),
            Rgba([255, 255, 255, 255])
        );
        assert_eq!(name_to_rgba("GREY"), Some(Rgba([128, 128, 128, 255])));
    }

    #[test]
    fn unknown_name_falls_back_to_black() {
        assert_eq!(
            ColorSpec::Name("chartreuse".into()).to_rgba(),
            Rgba([0, 0, 0, 255])
        );
    }

    #[test]
    fn shape_parses_kebab_case() {
        #[derive(Deserialize)]
        struct Wrapper {
            shape: DisplayShape,
        }
        let parsed: Wrapper = toml::from_str("shape = \"square\"").unwrap();
        assert_eq!(parsed.shape, DisplayShape::Square);
        assert!(!parsed.shape.is_round());
    }
}
