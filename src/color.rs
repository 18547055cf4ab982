// src/color.rs

//! Defines color-related enums (`NamedColor`, `Color`) and RGB resolution.

use serde::{Deserialize, Serialize};

/// Named background colors.
///
/// A small decorative palette for the fill painted beneath the grain layer.
/// Anything else can be expressed with `Color::Rgb`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum NamedColor {
    White,
    Ivory,
    Linen,
    Gray,
    Charcoal,
    Black,
}

impl NamedColor {
    /// Returns the sRGB value of this named color.
    pub fn to_rgb(self) -> [u8; 3] {
        match self {
            NamedColor::White => [255, 255, 255],
            NamedColor::Ivory => [255, 255, 240],
            NamedColor::Linen => [250, 240, 230],
            NamedColor::Gray => [128, 128, 128],
            NamedColor::Charcoal => [54, 69, 79],
            NamedColor::Black => [0, 0, 0],
        }
    }
}

/// A background color value: a named palette entry or an RGB true color.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Color {
    /// A named decorative color.
    Named(NamedColor),
    /// An RGB true color, each component 0-255.
    Rgb(u8, u8, u8),
}

impl Color {
    /// Resolve to concrete sRGB components for the surface.
    pub fn to_rgb(self) -> [u8; 3] {
        match self {
            Color::Named(named) => named.to_rgb(),
            Color::Rgb(r, g, b) => [r, g, b],
        }
    }
}

impl Default for Color {
    /// White, matching the overlay's stock background.
    fn default() -> Self {
        Color::Named(NamedColor::White)
    }
}
