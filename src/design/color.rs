use std::fmt;
use std::str::FromStr;

use crate::error::{DesignError, Result};

/// An sRGB colour.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct DesignColor {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl DesignColor {
    pub const BLACK: DesignColor = DesignColor::rgb(0, 0, 0);
    pub const WHITE: DesignColor = DesignColor::rgb(255, 255, 255);
    pub const RED: DesignColor = DesignColor::rgb(255, 0, 0);
    pub const GREEN: DesignColor = DesignColor::rgb(0, 128, 0);
    pub const BLUE: DesignColor = DesignColor::rgb(0, 0, 255);
    pub const GRAY: DesignColor = DesignColor::rgb(128, 128, 128);
    pub const LIGHT_GRAY: DesignColor = DesignColor::rgb(217, 217, 217);

    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        DesignColor { r, g, b }
    }

    /// Parses `#RRGGBB` or `RRGGBB`.
    pub fn from_hex(text: &str) -> Result<Self> {
        let hex = text.trim().trim_start_matches('#');
        if hex.len() != 6 || !hex.chars().all(|c| c.is_ascii_hexdigit()) {
            return Err(DesignError::InvalidDesign(format!(
                "invalid colour {:?}, expected #RRGGBB",
                text
            )));
        }
        let value = u32::from_str_radix(hex, 16)
            .map_err(|e| DesignError::InvalidDesign(format!("invalid colour {:?}: {}", text, e)))?;
        Ok(DesignColor::from_u32(value))
    }

    pub fn from_u32(value: u32) -> Self {
        DesignColor {
            r: ((value >> 16) & 0xFF) as u8,
            g: ((value >> 8) & 0xFF) as u8,
            b: (value & 0xFF) as u8,
        }
    }

    pub fn to_u32(self) -> u32 {
        ((self.r as u32) << 16) | ((self.g as u32) << 8) | (self.b as u32)
    }

    /// Six hex digits without `#`, as written in DrawingML `srgbClr`.
    pub fn to_hex(self) -> String {
        format!("{:06X}", self.to_u32())
    }
}

impl fmt::Display for DesignColor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.to_hex())
    }
}

impl FromStr for DesignColor {
    type Err = DesignError;

    fn from_str(s: &str) -> Result<Self> {
        DesignColor::from_hex(s)
    }
}

impl From<DesignColor> for rust_xlsxwriter::Color {
    fn from(color: DesignColor) -> Self {
        rust_xlsxwriter::Color::RGB(color.to_u32())
    }
}
