//! Cell style model.
//!
//! Every field is optional: an unset field means "inherit". Styles cascade
//! with [`Combine`], so a table column style can sit on top of the table's
//! body style, which sits on top of the designer's default style.

use crate::design::color::DesignColor;
use crate::error::{DesignError, Result};
use crate::number_format::DataType;

/// Shallow merge: fields set on `self` win, unset fields come from
/// `fallback`.
pub trait Combine {
    fn combine(&self, fallback: &Self) -> Self;
}

impl<T: Clone> Combine for Option<T> {
    fn combine(&self, fallback: &Self) -> Self {
        self.clone().or_else(|| fallback.clone())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Underline {
    Single,
    Double,
    SingleAccounting,
    DoubleAccounting,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct FontDesign {
    pub name: Option<String>,
    pub size: Option<f64>,
    pub bold: Option<bool>,
    pub italic: Option<bool>,
    pub underline: Option<Underline>,
    pub strikethrough: Option<bool>,
    pub color: Option<DesignColor>,
}

impl FontDesign {
    pub fn new(name: &str, size: f64) -> Self {
        FontDesign {
            name: Some(name.to_string()),
            size: Some(size),
            ..Default::default()
        }
    }

    pub fn bold() -> Self {
        FontDesign {
            bold: Some(true),
            ..Default::default()
        }
    }
}

impl Combine for FontDesign {
    fn combine(&self, fallback: &Self) -> Self {
        FontDesign {
            name: self.name.combine(&fallback.name),
            size: self.size.combine(&fallback.size),
            bold: self.bold.combine(&fallback.bold),
            italic: self.italic.combine(&fallback.italic),
            underline: self.underline.combine(&fallback.underline),
            strikethrough: self.strikethrough.combine(&fallback.strikethrough),
            color: self.color.combine(&fallback.color),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BorderStyle {
    None,
    Thin,
    Medium,
    Thick,
    Dashed,
    Dotted,
    Double,
    Hair,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BorderLine {
    pub style: BorderStyle,
    pub color: Option<DesignColor>,
}

impl BorderLine {
    pub fn new(style: BorderStyle) -> Self {
        BorderLine { style, color: None }
    }

    pub fn colored(style: BorderStyle, color: DesignColor) -> Self {
        BorderLine {
            style,
            color: Some(color),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct BorderDesign {
    pub top: Option<BorderLine>,
    pub bottom: Option<BorderLine>,
    pub left: Option<BorderLine>,
    pub right: Option<BorderLine>,
}

impl BorderDesign {
    /// The same line on all four edges.
    pub fn around(line: BorderLine) -> Self {
        BorderDesign {
            top: Some(line),
            bottom: Some(line),
            left: Some(line),
            right: Some(line),
        }
    }

    /// Explicitly no border, which overrides any inherited border.
    pub fn none() -> Self {
        BorderDesign::around(BorderLine::new(BorderStyle::None))
    }

    pub fn is_empty(&self) -> bool {
        self.top.is_none() && self.bottom.is_none() && self.left.is_none() && self.right.is_none()
    }
}

impl Combine for BorderDesign {
    fn combine(&self, fallback: &Self) -> Self {
        BorderDesign {
            top: self.top.combine(&fallback.top),
            bottom: self.bottom.combine(&fallback.bottom),
            left: self.left.combine(&fallback.left),
            right: self.right.combine(&fallback.right),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FillPattern {
    #[default]
    Solid,
    Gray125,
    Gray0625,
    LightHorizontal,
    LightVertical,
    LightGrid,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FillDesign {
    pub color: DesignColor,
    pub pattern: FillPattern,
}

impl FillDesign {
    pub fn solid(color: DesignColor) -> Self {
        FillDesign {
            color,
            pattern: FillPattern::Solid,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HorizontalAlignment {
    General,
    Left,
    Center,
    Right,
    Fill,
    Justify,
    CenterAcross,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VerticalAlignment {
    Top,
    Center,
    Bottom,
    Justify,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct CellStyle {
    pub font: FontDesign,
    pub fill: Option<FillDesign>,
    pub border: BorderDesign,
    pub horizontal: Option<HorizontalAlignment>,
    pub vertical: Option<VerticalAlignment>,
    pub wrap_text: Option<bool>,
    pub shrink_to_fit: Option<bool>,
    pub indent: Option<u8>,
    /// Degrees, -90 to 90, or 255 for vertical text.
    pub rotation: Option<i16>,
    pub data_type: Option<DataType>,
}

impl CellStyle {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_font(mut self, font: FontDesign) -> Self {
        self.font = font;
        self
    }

    pub fn with_fill(mut self, color: DesignColor) -> Self {
        self.fill = Some(FillDesign::solid(color));
        self
    }

    pub fn with_border(mut self, border: BorderDesign) -> Self {
        self.border = border;
        self
    }

    pub fn with_alignment(mut self, horizontal: HorizontalAlignment) -> Self {
        self.horizontal = Some(horizontal);
        self
    }

    pub fn with_data_type(mut self, data_type: DataType) -> Self {
        self.data_type = Some(data_type);
        self
    }

    pub fn is_empty(&self) -> bool {
        *self == CellStyle::default()
    }

    pub fn validate(&self) -> Result<()> {
        if let Some(size) = self.font.size {
            if !(1.0..=409.0).contains(&size) {
                return Err(DesignError::InvalidDesign(format!(
                    "font size {} must be between 1 and 409",
                    size
                )));
            }
        }
        if let Some(name) = &self.font.name {
            if name.trim().is_empty() || name.chars().count() > 31 {
                return Err(DesignError::InvalidDesign(format!(
                    "font name {:?} must be 1 to 31 characters",
                    name
                )));
            }
        }
        if let Some(rotation) = self.rotation {
            if !((-90..=90).contains(&rotation) || rotation == 255) {
                return Err(DesignError::InvalidDesign(format!(
                    "text rotation {} must be between -90 and 90, or 255",
                    rotation
                )));
            }
        }
        if let Some(indent) = self.indent {
            if indent > 250 {
                return Err(DesignError::InvalidDesign(format!(
                    "indent {} exceeds 250",
                    indent
                )));
            }
        }
        if let Some(data_type) = &self.data_type {
            data_type.validate()?;
        }
        Ok(())
    }
}

impl Combine for CellStyle {
    fn combine(&self, fallback: &Self) -> Self {
        CellStyle {
            font: self.font.combine(&fallback.font),
            fill: self.fill.combine(&fallback.fill),
            border: self.border.combine(&fallback.border),
            horizontal: self.horizontal.combine(&fallback.horizontal),
            vertical: self.vertical.combine(&fallback.vertical),
            wrap_text: self.wrap_text.combine(&fallback.wrap_text),
            shrink_to_fit: self.shrink_to_fit.combine(&fallback.shrink_to_fit),
            indent: self.indent.combine(&fallback.indent),
            rotation: self.rotation.combine(&fallback.rotation),
            data_type: self.data_type.combine(&fallback.data_type),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_combine_prefers_self() {
        let header = CellStyle::new()
            .with_font(FontDesign::bold())
            .with_fill(DesignColor::LIGHT_GRAY);
        let body = CellStyle::new()
            .with_font(FontDesign::new("Arial", 10.0))
            .with_fill(DesignColor::WHITE)
            .with_border(BorderDesign::around(BorderLine::new(BorderStyle::Thin)));

        let combined = header.combine(&body);
        assert_eq!(combined.font.bold, Some(true));
        assert_eq!(combined.font.name.as_deref(), Some("Arial"));
        assert_eq!(combined.font.size, Some(10.0));
        assert_eq!(combined.fill, Some(FillDesign::solid(DesignColor::LIGHT_GRAY)));
        assert_eq!(
            combined.border.top,
            Some(BorderLine::new(BorderStyle::Thin))
        );
    }

    #[test]
    fn test_border_combine_per_edge() {
        let bottom_only = BorderDesign {
            bottom: Some(BorderLine::new(BorderStyle::Double)),
            ..Default::default()
        };
        let combined = bottom_only.combine(&BorderDesign::around(BorderLine::new(BorderStyle::Thin)));
        assert_eq!(combined.bottom, Some(BorderLine::new(BorderStyle::Double)));
        assert_eq!(combined.left, Some(BorderLine::new(BorderStyle::Thin)));
        assert!(BorderDesign::default().is_empty());
    }

    #[test]
    fn test_explicit_none_border_wins() {
        let none = CellStyle::new().with_border(BorderDesign::none());
        let thin = CellStyle::new().with_border(BorderDesign::around(BorderLine::new(BorderStyle::Thin)));
        assert_eq!(
            none.combine(&thin).border.top,
            Some(BorderLine::new(BorderStyle::None))
        );
    }

    #[test]
    fn test_validate() {
        assert!(CellStyle::new().validate().is_ok());
        let mut style = CellStyle::new().with_font(FontDesign::new("Calibri", 500.0));
        assert!(style.validate().is_err());
        style.font.size = Some(11.0);
        style.rotation = Some(120);
        assert!(style.validate().is_err());
        style.rotation = Some(255);
        assert!(style.validate().is_ok());
        style.data_type = Some(DataType::number(40));
        assert!(style.validate().is_err());
    }
}
