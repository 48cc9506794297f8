//! Drawing effects for charts and shapes: outer shadow, glow and soft edges.
//!
//! `rust_xlsxwriter` has no API for these, so they are written into the
//! saved package by [`crate::ooxml`]. Units here are the ones Excel shows
//! in its UI (points, degrees, percent); conversion to DrawingML units
//! happens when the XML is written.

use crate::design::color::DesignColor;
use crate::error::{DesignError, Result};

/// Excel's outer shadow presets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ShadowPreset {
    #[default]
    OffsetBottomRight,
    OffsetBottom,
    OffsetBottomLeft,
    OffsetRight,
    OffsetCenter,
    OffsetLeft,
    OffsetTopRight,
    OffsetTop,
    OffsetTopLeft,
}

/// Anchor of the shadow relative to the shape (`algn` in DrawingML).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShadowAlignment {
    TopLeft,
    Top,
    TopRight,
    Left,
    Center,
    Right,
    BottomLeft,
    Bottom,
    BottomRight,
}

impl ShadowAlignment {
    pub fn as_ooxml(self) -> &'static str {
        match self {
            ShadowAlignment::TopLeft => "tl",
            ShadowAlignment::Top => "t",
            ShadowAlignment::TopRight => "tr",
            ShadowAlignment::Left => "l",
            ShadowAlignment::Center => "ctr",
            ShadowAlignment::Right => "r",
            ShadowAlignment::BottomLeft => "bl",
            ShadowAlignment::Bottom => "b",
            ShadowAlignment::BottomRight => "br",
        }
    }
}

/// Fully resolved shadow values.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ResolvedShadow {
    pub color: DesignColor,
    pub transparency: f64,
    pub blur: f64,
    pub distance: f64,
    pub angle: f64,
    pub alignment: ShadowAlignment,
    /// Percent scale of the shadow; only the centre preset enlarges it.
    pub scale: f64,
}

impl ShadowPreset {
    /// Distance, angle, alignment and scale of the preset.
    fn geometry(self) -> (f64, f64, ShadowAlignment, f64) {
        match self {
            ShadowPreset::OffsetBottomRight => (3.0, 45.0, ShadowAlignment::TopLeft, 100.0),
            ShadowPreset::OffsetBottom => (3.0, 90.0, ShadowAlignment::Top, 100.0),
            ShadowPreset::OffsetBottomLeft => (3.0, 135.0, ShadowAlignment::TopRight, 100.0),
            ShadowPreset::OffsetRight => (3.0, 0.0, ShadowAlignment::Left, 100.0),
            ShadowPreset::OffsetCenter => (0.0, 0.0, ShadowAlignment::Center, 102.0),
            ShadowPreset::OffsetLeft => (3.0, 180.0, ShadowAlignment::Right, 100.0),
            ShadowPreset::OffsetTopRight => (3.0, 315.0, ShadowAlignment::BottomLeft, 100.0),
            ShadowPreset::OffsetTop => (3.0, 270.0, ShadowAlignment::Bottom, 100.0),
            ShadowPreset::OffsetTopLeft => (3.0, 225.0, ShadowAlignment::BottomRight, 100.0),
        }
    }
}

/// An outer shadow. Unset fields fall back to the preset.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct ShadowDesign {
    pub preset: ShadowPreset,
    pub color: Option<DesignColor>,
    /// Percent, 0 (opaque) to 100.
    pub transparency: Option<f64>,
    /// Points.
    pub blur: Option<f64>,
    /// Points.
    pub distance: Option<f64>,
    /// Degrees clockwise from the positive x axis.
    pub angle: Option<f64>,
}

impl ShadowDesign {
    pub fn preset(preset: ShadowPreset) -> Self {
        ShadowDesign {
            preset,
            ..Default::default()
        }
    }

    pub fn resolve(&self) -> ResolvedShadow {
        let (distance, angle, alignment, scale) = self.preset.geometry();
        ResolvedShadow {
            color: self.color.unwrap_or(DesignColor::BLACK),
            transparency: self.transparency.unwrap_or(60.0),
            blur: self.blur.unwrap_or(4.0),
            distance: self.distance.unwrap_or(distance),
            angle: self.angle.unwrap_or(angle),
            alignment,
            scale,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GlowDesign {
    pub color: DesignColor,
    /// Points.
    pub size: f64,
    /// Percent, 0 (opaque) to 100.
    pub transparency: f64,
}

impl GlowDesign {
    pub fn new(color: DesignColor, size: f64) -> Self {
        GlowDesign {
            color,
            size,
            transparency: 60.0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct EffectDesign {
    pub shadow: Option<ShadowDesign>,
    pub glow: Option<GlowDesign>,
    /// Soft edge radius in points.
    pub soft_edge: Option<f64>,
}

impl EffectDesign {
    pub fn is_empty(&self) -> bool {
        self.shadow.is_none() && self.glow.is_none() && self.soft_edge.is_none()
    }

    pub fn validate(&self) -> Result<()> {
        let percent = |name: &str, value: f64| {
            if (0.0..=100.0).contains(&value) {
                Ok(())
            } else {
                Err(DesignError::InvalidDesign(format!(
                    "{} {} must be between 0 and 100 percent",
                    name, value
                )))
            }
        };
        let points = |name: &str, value: f64| {
            if (0.0..=150.0).contains(&value) {
                Ok(())
            } else {
                Err(DesignError::InvalidDesign(format!(
                    "{} {} must be between 0 and 150 points",
                    name, value
                )))
            }
        };
        if let Some(shadow) = &self.shadow {
            let shadow = shadow.resolve();
            percent("shadow transparency", shadow.transparency)?;
            points("shadow blur", shadow.blur)?;
            points("shadow distance", shadow.distance)?;
        }
        if let Some(glow) = &self.glow {
            percent("glow transparency", glow.transparency)?;
            points("glow size", glow.size)?;
        }
        if let Some(radius) = self.soft_edge {
            points("soft edge", radius)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_shadow_resolves_preset_defaults() {
        let resolved = ShadowDesign::preset(ShadowPreset::OffsetBottom).resolve();
        assert_eq!(resolved.angle, 90.0);
        assert_eq!(resolved.distance, 3.0);
        assert_eq!(resolved.alignment, ShadowAlignment::Top);
        assert_eq!(resolved.color, DesignColor::BLACK);
        assert_eq!(resolved.transparency, 60.0);
    }

    #[test]
    fn test_shadow_overrides_win() {
        let shadow = ShadowDesign {
            preset: ShadowPreset::OffsetCenter,
            color: Some(DesignColor::BLUE),
            blur: Some(10.0),
            ..Default::default()
        };
        let resolved = shadow.resolve();
        assert_eq!(resolved.color, DesignColor::BLUE);
        assert_eq!(resolved.blur, 10.0);
        assert_eq!(resolved.distance, 0.0);
        assert_eq!(resolved.scale, 102.0);
    }

    #[test]
    fn test_validate() {
        assert!(EffectDesign::default().is_empty());
        let glow = EffectDesign {
            glow: Some(GlowDesign {
                transparency: 120.0,
                ..GlowDesign::new(DesignColor::RED, 5.0)
            }),
            ..Default::default()
        };
        assert!(glow.validate().is_err());
        let soft = EffectDesign {
            soft_edge: Some(2.5),
            ..Default::default()
        };
        assert!(soft.validate().is_ok());
    }
}
