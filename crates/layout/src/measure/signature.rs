use crate::error::LayoutError;
use itertools::Itertools;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// A concrete font request: family, pixel size, weight, and slant.
///
/// Its textual form is the CSS font shorthand subset
/// `"[italic] [bold] <size>px <family>"`, e.g. `"italic bold 16px Times New Roman"`.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct FontSignature {
    pub family: String,
    /// Font size in pixels.
    pub size: f32,
    #[serde(default)]
    pub bold: bool,
    #[serde(default)]
    pub italic: bool,
}

impl FontSignature {
    pub fn new(family: impl Into<String>, size: f32) -> Self {
        Self {
            family: family.into(),
            size,
            bold: false,
            italic: false,
        }
    }

    pub fn bold(mut self, bold: bool) -> Self {
        self.bold = bold;
        self
    }

    pub fn italic(mut self, italic: bool) -> Self {
        self.italic = italic;
        self
    }

    pub fn validate(&self) -> Result<(), LayoutError> {
        if !self.size.is_finite() || self.size <= 0.0 || self.family.trim().is_empty() {
            return Err(LayoutError::InvalidFontSignature(self.to_string()));
        }
        Ok(())
    }
}

impl fmt::Display for FontSignature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.italic {
            write!(f, "italic ")?;
        }
        if self.bold {
            write!(f, "bold ")?;
        }
        write!(f, "{}px {}", self.size, self.family)
    }
}

impl FromStr for FontSignature {
    type Err = LayoutError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || LayoutError::InvalidFontSignature(s.to_string());
        let mut bold = false;
        let mut italic = false;
        let mut parts = s.split_whitespace();

        let size_token = loop {
            match parts.next() {
                Some("italic") => italic = true,
                Some("bold") => bold = true,
                Some("normal") => {}
                Some(token) => break token,
                None => return Err(invalid()),
            }
        };

        let size = size_token
            .strip_suffix("px")
            .and_then(|n| n.parse::<f32>().ok())
            .ok_or_else(invalid)?;

        let family = parts.join(" ");
        let family = family.trim_matches(|c| c == '"' || c == '\'');

        let signature = FontSignature {
            family: family.to_string(),
            size,
            bold,
            italic,
        };
        signature.validate().map_err(|_| invalid())?;
        Ok(signature)
    }
}
