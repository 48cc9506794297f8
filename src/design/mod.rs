//! The declarative design model.
//!
//! Designs only hold configuration. They are turned into document changes
//! by the operations in [`crate::operation`] and into engine calls by
//! [`crate::render`].

pub mod chart;
pub mod color;
pub mod content;
pub mod effect;
pub mod image;
pub mod shape;
pub mod sparkline;
pub mod style;
pub mod table;

pub use chart::{
    AreaFormat, AxisCrossing, AxisDesign, ChartDesign, ChartKind, LegendDesign, LegendPosition,
    LineDesign, SeriesDesign,
};
pub use color::DesignColor;
pub use content::{CellValue, TextDesign};
pub use effect::{EffectDesign, GlowDesign, ShadowDesign, ShadowPreset};
pub use image::{ImageDesign, ImageSource};
pub use shape::{ShapeDesign, ShapeTextAlignment, ShapeTextAnchor};
pub use sparkline::{SparklineDesign, SparklineKind};
pub use style::{
    BorderDesign, BorderLine, BorderStyle, CellStyle, Combine, FillDesign, FillPattern,
    FontDesign, HorizontalAlignment, Underline, VerticalAlignment,
};
pub use table::{TableColumnDesign, TableDesign, TableStylePreset, TotalFunction};
