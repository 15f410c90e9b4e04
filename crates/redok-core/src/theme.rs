//! Theme model: semantic roles mapped to style attributes
//!
//! A theme is an immutable value handed to the pipeline, already parsed
//! by the caller. It maps role names ("title", "heading-1", "body",
//! "callout-warning", ...) to concrete visual attributes, plus a color
//! palette whose tokens may reference each other.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::error::ThemeResolutionError;

/// Paragraph alignment
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TextAlign {
    Left,
    Center,
    Right,
    Justify,
}

/// Resolved visual attributes for one semantic role
///
/// Spacing and indentation are in twentieths of a point, font sizes in
/// points, colors hex strings without a leading '#' (or palette tokens
/// until [`Theme::resolve_color`] has run).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct StyleAttributes {
    #[serde(default)]
    pub font_family: Option<String>,
    #[serde(default)]
    pub font_size: Option<f32>,
    #[serde(default)]
    pub bold: bool,
    #[serde(default)]
    pub italic: bool,
    #[serde(default)]
    pub all_caps: bool,
    #[serde(default)]
    pub color: Option<String>,
    #[serde(default)]
    pub background: Option<String>,
    #[serde(default)]
    pub spacing_before: Option<u32>,
    #[serde(default)]
    pub spacing_after: Option<u32>,
    #[serde(default)]
    pub indent: Option<u32>,
    #[serde(default)]
    pub align: Option<TextAlign>,
}

/// Immutable role -> style mapping with a color palette
///
/// Never mutated by the pipeline; may be shared across runs.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct Theme {
    /// Named color tokens; a value may be a hex color or another token
    #[serde(default)]
    pub palette: BTreeMap<String, String>,
    /// Style attributes per semantic role
    #[serde(default)]
    pub roles: BTreeMap<String, StyleAttributes>,
}

impl Theme {
    /// Look up the style for an exact role name
    pub fn get(&self, role: &str) -> Option<&StyleAttributes> {
        self.roles.get(role)
    }

    /// Resolve a color value to a concrete hex string
    ///
    /// Hex values pass through unchanged. Palette tokens are followed
    /// through chains of indirection; an unknown token or a cycle is a
    /// `ThemeResolutionError`.
    pub fn resolve_color(&self, value: &str) -> Result<String, ThemeResolutionError> {
        if is_hex_color(value) {
            return Ok(value.trim_start_matches('#').to_string());
        }
        let mut seen = Vec::new();
        let mut current = value;
        loop {
            if seen.iter().any(|s| s == current) {
                return Err(ThemeResolutionError::ColorCycle(value.to_string()));
            }
            seen.push(current.to_string());
            match self.palette.get(current) {
                Some(next) if is_hex_color(next) => {
                    return Ok(next.trim_start_matches('#').to_string());
                }
                Some(next) => current = next,
                None => return Err(ThemeResolutionError::UnknownColor(current.to_string())),
            }
        }
    }
}

fn is_hex_color(value: &str) -> bool {
    let digits = value.strip_prefix('#').unwrap_or(value);
    (digits.len() == 6 || digits.len() == 8) && digits.chars().all(|c| c.is_ascii_hexdigit())
}
