use crate::design::color::DesignColor;
use crate::error::{DesignError, Result};
use crate::reference::SheetRange;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SparklineKind {
    #[default]
    Line,
    Column,
    WinLoss,
}

/// A sparkline drawn inside a single cell.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct SparklineDesign {
    pub kind: SparklineKind,
    pub data: Option<SheetRange>,
    pub markers: bool,
    pub high_point: bool,
    pub low_point: bool,
    pub first_point: bool,
    pub last_point: bool,
    pub negative_points: bool,
    pub show_axis: bool,
    pub right_to_left: bool,
    pub color: Option<DesignColor>,
    pub negative_color: Option<DesignColor>,
    /// Points, line sparklines only.
    pub line_weight: Option<f64>,
    /// Excel's built-in sparkline style, 1 to 36.
    pub style: Option<u8>,
}

impl SparklineDesign {
    pub fn new(kind: SparklineKind, data: SheetRange) -> Self {
        SparklineDesign {
            kind,
            data: Some(data),
            ..Default::default()
        }
    }

    pub fn validate(&self) -> Result<()> {
        let data = self.data.as_ref().ok_or_else(|| {
            DesignError::InvalidDesign("a sparkline needs a data range".to_string())
        })?;
        if data.range.rows() > 1 && data.range.columns() > 1 {
            return Err(DesignError::InvalidDesign(format!(
                "sparkline data {} must be a single row or column",
                data
            )));
        }
        if let Some(style) = self.style {
            if !(1..=36).contains(&style) {
                return Err(DesignError::InvalidDesign(format!(
                    "sparkline style {} must be between 1 and 36",
                    style
                )));
            }
        }
        if let Some(weight) = self.line_weight {
            if weight <= 0.0 {
                return Err(DesignError::InvalidDesign(format!(
                    "sparkline line weight {} must be positive",
                    weight
                )));
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate() {
        assert!(SparklineDesign::default().validate().is_err());
        let data = SheetRange::parse("Data!B2:G2").unwrap();
        let mut sparkline = SparklineDesign::new(SparklineKind::Column, data);
        assert!(sparkline.validate().is_ok());
        sparkline.style = Some(40);
        assert!(sparkline.validate().is_err());
        sparkline.style = None;
        sparkline.data = Some(SheetRange::parse("Data!B2:G3").unwrap());
        assert!(sparkline.validate().is_err());
    }
}
