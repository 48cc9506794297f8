use crate::design::color::DesignColor;
use crate::design::effect::EffectDesign;
use crate::error::{DesignError, Result};
use crate::number_format::DataType;
use crate::reference::SheetRange;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ChartKind {
    Area,
    AreaStacked,
    Bar,
    BarStacked,
    BarPercentStacked,
    #[default]
    Column,
    ColumnStacked,
    ColumnPercentStacked,
    Line,
    LineStacked,
    Pie,
    Doughnut,
    Radar,
    Scatter,
    ScatterSmooth,
}

impl ChartKind {
    /// Pie and doughnut charts have no axes.
    pub fn has_axes(self) -> bool {
        !matches!(self, ChartKind::Pie | ChartKind::Doughnut)
    }
}

impl std::str::FromStr for ChartKind {
    type Err = DesignError;

    fn from_str(s: &str) -> Result<Self> {
        let kind = match s.trim().to_ascii_lowercase().replace(['-', '_'], "").as_str() {
            "area" => ChartKind::Area,
            "areastacked" => ChartKind::AreaStacked,
            "bar" => ChartKind::Bar,
            "barstacked" => ChartKind::BarStacked,
            "barpercentstacked" => ChartKind::BarPercentStacked,
            "column" => ChartKind::Column,
            "columnstacked" => ChartKind::ColumnStacked,
            "columnpercentstacked" => ChartKind::ColumnPercentStacked,
            "line" => ChartKind::Line,
            "linestacked" => ChartKind::LineStacked,
            "pie" => ChartKind::Pie,
            "doughnut" => ChartKind::Doughnut,
            "radar" => ChartKind::Radar,
            "scatter" => ChartKind::Scatter,
            "scattersmooth" => ChartKind::ScatterSmooth,
            _ => {
                return Err(DesignError::InvalidDesign(format!(
                    "unknown chart type: {}",
                    s
                )))
            }
        };
        Ok(kind)
    }
}

/// A line used for borders and series lines.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LineDesign {
    pub color: DesignColor,
    /// Points.
    pub width: f64,
}

impl LineDesign {
    pub fn new(color: DesignColor, width: f64) -> Self {
        LineDesign { color, width }
    }
}

/// Fill, border and effects of the chart area or the plot area.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct AreaFormat {
    pub fill: Option<DesignColor>,
    pub border: Option<LineDesign>,
    pub no_border: bool,
    pub effects: EffectDesign,
}

impl AreaFormat {
    pub fn has_format(&self) -> bool {
        self.fill.is_some() || self.border.is_some() || self.no_border
    }
}

/// Where the perpendicular axis crosses this one.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum AxisCrossing {
    #[default]
    Auto,
    Min,
    Max,
    Value(f64),
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct AxisDesign {
    pub title: Option<String>,
    pub min: Option<f64>,
    pub max: Option<f64>,
    pub major_unit: Option<f64>,
    pub data_type: Option<DataType>,
    pub crossing: AxisCrossing,
    pub reverse: bool,
    pub hidden: bool,
    pub major_gridlines: Option<bool>,
    pub log_base: Option<u16>,
}

impl AxisDesign {
    pub fn titled(title: &str) -> Self {
        AxisDesign {
            title: Some(title.to_string()),
            ..Default::default()
        }
    }

    pub fn validate(&self) -> Result<()> {
        if let (Some(min), Some(max)) = (self.min, self.max) {
            if min >= max {
                return Err(DesignError::InvalidDesign(format!(
                    "axis minimum {} must be below maximum {}",
                    min, max
                )));
            }
        }
        if let Some(unit) = self.major_unit {
            if unit <= 0.0 {
                return Err(DesignError::InvalidDesign(format!(
                    "axis major unit {} must be positive",
                    unit
                )));
            }
        }
        if let Some(base) = self.log_base {
            if base < 2 {
                return Err(DesignError::InvalidDesign(format!(
                    "axis log base {} must be at least 2",
                    base
                )));
            }
        }
        if let Some(data_type) = &self.data_type {
            data_type.validate()?;
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LegendPosition {
    Top,
    #[default]
    Right,
    Bottom,
    Left,
    TopRight,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct LegendDesign {
    pub position: LegendPosition,
    pub hidden: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SeriesDesign {
    pub name: Option<String>,
    pub values: SheetRange,
    pub categories: Option<SheetRange>,
    pub fill: Option<DesignColor>,
    pub line: Option<LineDesign>,
    pub data_labels: bool,
    /// Line and scatter series only.
    pub smooth: bool,
}

impl SeriesDesign {
    pub fn new(values: SheetRange) -> Self {
        SeriesDesign {
            name: None,
            values,
            categories: None,
            fill: None,
            line: None,
            data_labels: false,
            smooth: false,
        }
    }

    pub fn with_name(mut self, name: &str) -> Self {
        self.name = Some(name.to_string());
        self
    }

    pub fn with_categories(mut self, categories: SheetRange) -> Self {
        self.categories = Some(categories);
        self
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ChartDesign {
    pub kind: ChartKind,
    pub title: Option<String>,
    pub series: Vec<SeriesDesign>,
    pub x_axis: AxisDesign,
    pub y_axis: AxisDesign,
    pub legend: LegendDesign,
    /// Pixels.
    pub width: u32,
    pub height: u32,
    /// Pixel offset from the anchor cell.
    pub offset: (u32, u32),
    /// Excel's built-in chart style number, 1 to 48.
    pub style: Option<u8>,
    pub chart_area: AreaFormat,
    pub plot_area: AreaFormat,
}

impl Default for ChartDesign {
    /// Excel's default 480x288 column chart.
    fn default() -> Self {
        ChartDesign {
            kind: ChartKind::Column,
            title: None,
            series: Vec::new(),
            x_axis: AxisDesign::default(),
            y_axis: AxisDesign::default(),
            legend: LegendDesign::default(),
            width: 480,
            height: 288,
            offset: (0, 0),
            style: None,
            chart_area: AreaFormat::default(),
            plot_area: AreaFormat::default(),
        }
    }
}

impl ChartDesign {
    pub fn new(kind: ChartKind) -> Self {
        ChartDesign {
            kind,
            ..Default::default()
        }
    }

    pub fn with_title(mut self, title: &str) -> Self {
        self.title = Some(title.to_string());
        self
    }

    pub fn add_series(&mut self, series: SeriesDesign) {
        self.series.push(series);
    }

    /// Sheet names referenced by the series.
    pub fn referenced_sheets(&self) -> Vec<&str> {
        let mut sheets: Vec<&str> = self
            .series
            .iter()
            .flat_map(|s| {
                std::iter::once(s.values.sheet.as_str())
                    .chain(s.categories.iter().map(|c| c.sheet.as_str()))
            })
            .collect();
        sheets.sort_unstable();
        sheets.dedup();
        sheets
    }

    pub fn validate(&self) -> Result<()> {
        if self.series.is_empty() {
            return Err(DesignError::InvalidDesign(
                "a chart needs at least one series".to_string(),
            ));
        }
        if self.width == 0 || self.height == 0 {
            return Err(DesignError::InvalidDesign(
                "chart width and height must be positive".to_string(),
            ));
        }
        if let Some(style) = self.style {
            if !(1..=48).contains(&style) {
                return Err(DesignError::InvalidDesign(format!(
                    "chart style {} must be between 1 and 48",
                    style
                )));
            }
        }
        for series in &self.series {
            if series.values.range.rows() > 1 && series.values.range.columns() > 1 {
                return Err(DesignError::InvalidDesign(format!(
                    "series values {} must be a single row or column",
                    series.values
                )));
            }
        }
        self.x_axis.validate()?;
        self.y_axis.validate()?;
        self.chart_area.effects.validate()?;
        self.plot_area.effects.validate()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn series(text: &str) -> SeriesDesign {
        SeriesDesign::new(SheetRange::parse(text).unwrap())
    }

    #[test]
    fn test_referenced_sheets() {
        let mut chart = ChartDesign::new(ChartKind::Line);
        chart.add_series(series("Data!B2:B5").with_categories(SheetRange::parse("Labels!A2:A5").unwrap()));
        chart.add_series(series("Data!C2:C5"));
        assert_eq!(chart.referenced_sheets(), vec!["Data", "Labels"]);
    }

    #[test]
    fn test_validate() {
        let mut chart = ChartDesign::new(ChartKind::Column);
        assert!(chart.validate().is_err());
        chart.add_series(series("Data!B2:B5"));
        assert!(chart.validate().is_ok());

        chart.y_axis.min = Some(10.0);
        chart.y_axis.max = Some(5.0);
        assert!(chart.validate().is_err());
        chart.y_axis.max = None;

        chart.add_series(series("Data!B2:C5"));
        assert!(chart.validate().is_err());
    }

    #[test]
    fn test_parse_kind() -> Result<()> {
        assert_eq!("column".parse::<ChartKind>()?, ChartKind::Column);
        assert_eq!("bar-stacked".parse::<ChartKind>()?, ChartKind::BarStacked);
        assert!(!"pie".parse::<ChartKind>()?.has_axes());
        assert!("bubble".parse::<ChartKind>().is_err());
        Ok(())
    }
}
