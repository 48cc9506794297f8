use crate::design::chart::LineDesign;
use crate::design::color::DesignColor;
use crate::design::effect::EffectDesign;
use crate::design::style::FontDesign;
use crate::error::{DesignError, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ShapeTextAlignment {
    #[default]
    Left,
    Center,
    Right,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ShapeTextAnchor {
    #[default]
    Top,
    Middle,
    Bottom,
}

/// A text box drawn over the grid.
#[derive(Debug, Clone, PartialEq)]
pub struct ShapeDesign {
    pub text: String,
    /// Pixels.
    pub width: u32,
    pub height: u32,
    pub offset: (u32, u32),
    pub fill: Option<DesignColor>,
    pub line: Option<LineDesign>,
    pub no_line: bool,
    pub font: FontDesign,
    pub alignment: ShapeTextAlignment,
    pub anchor: ShapeTextAnchor,
    pub effects: EffectDesign,
}

impl Default for ShapeDesign {
    fn default() -> Self {
        ShapeDesign {
            text: String::new(),
            width: 192,
            height: 120,
            offset: (0, 0),
            fill: None,
            line: None,
            no_line: false,
            font: FontDesign::default(),
            alignment: ShapeTextAlignment::Left,
            anchor: ShapeTextAnchor::Top,
            effects: EffectDesign::default(),
        }
    }
}

impl ShapeDesign {
    pub fn text_box(text: &str) -> Self {
        ShapeDesign {
            text: text.to_string(),
            ..Default::default()
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.width == 0 || self.height == 0 {
            return Err(DesignError::InvalidDesign(
                "shape width and height must be positive".to_string(),
            ));
        }
        if let Some(line) = &self.line {
            if line.width <= 0.0 {
                return Err(DesignError::InvalidDesign(format!(
                    "shape line width {} must be positive",
                    line.width
                )));
            }
        }
        self.effects.validate()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate() {
        assert!(ShapeDesign::text_box("Note").validate().is_ok());
        let flat = ShapeDesign {
            height: 0,
            ..ShapeDesign::text_box("Note")
        };
        assert!(flat.validate().is_err());
    }
}
