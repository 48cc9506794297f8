//! Chart designs to `rust_xlsxwriter::Chart`.

use rust_xlsxwriter::{
    Chart, ChartAxis, ChartAxisCrossing, ChartDataLabel, ChartFormat, ChartLegendPosition,
    ChartLine, ChartSolidFill, ChartType,
};

use crate::culture::Culture;
use crate::design::{
    AreaFormat, AxisCrossing, AxisDesign, ChartDesign, ChartKind, LegendPosition, LineDesign,
    SeriesDesign,
};
use crate::error::Result;
use crate::render::format::number_format;

fn chart_type(kind: ChartKind) -> ChartType {
    match kind {
        ChartKind::Area => ChartType::Area,
        ChartKind::AreaStacked => ChartType::AreaStacked,
        ChartKind::Bar => ChartType::Bar,
        ChartKind::BarStacked => ChartType::BarStacked,
        ChartKind::BarPercentStacked => ChartType::BarPercentStacked,
        ChartKind::Column => ChartType::Column,
        ChartKind::ColumnStacked => ChartType::ColumnStacked,
        ChartKind::ColumnPercentStacked => ChartType::ColumnPercentStacked,
        ChartKind::Line => ChartType::Line,
        ChartKind::LineStacked => ChartType::LineStacked,
        ChartKind::Pie => ChartType::Pie,
        ChartKind::Doughnut => ChartType::Doughnut,
        ChartKind::Radar => ChartType::Radar,
        ChartKind::Scatter => ChartType::Scatter,
        ChartKind::ScatterSmooth => ChartType::ScatterSmooth,
    }
}

fn legend_position(position: LegendPosition) -> ChartLegendPosition {
    match position {
        LegendPosition::Top => ChartLegendPosition::Top,
        LegendPosition::Right => ChartLegendPosition::Right,
        LegendPosition::Bottom => ChartLegendPosition::Bottom,
        LegendPosition::Left => ChartLegendPosition::Left,
        LegendPosition::TopRight => ChartLegendPosition::TopRight,
    }
}

fn axis_crossing(crossing: AxisCrossing) -> ChartAxisCrossing {
    match crossing {
        AxisCrossing::Auto => ChartAxisCrossing::Automatic,
        AxisCrossing::Min => ChartAxisCrossing::Min,
        AxisCrossing::Max => ChartAxisCrossing::Max,
        AxisCrossing::Value(value) => ChartAxisCrossing::AxisValue(value),
    }
}

fn chart_line(line: &LineDesign) -> ChartLine {
    let mut chart_line = ChartLine::new();
    chart_line.set_color(line.color).set_width(line.width);
    chart_line
}

/// Fill and border of an area. `None` leaves the engine default alone.
fn area_format(area: &AreaFormat) -> Option<ChartFormat> {
    if !area.has_format() {
        return None;
    }
    let mut format = ChartFormat::new();
    if let Some(fill) = area.fill {
        format.set_solid_fill(ChartSolidFill::new().set_color(fill));
    }
    if area.no_border {
        format.set_no_border();
    } else if let Some(border) = &area.border {
        format.set_border(&chart_line(border));
    }
    Some(format)
}

fn apply_axis(
    axis: &mut ChartAxis,
    design: &AxisDesign,
    culture: &'static Culture,
) -> Result<()> {
    if let Some(title) = &design.title {
        axis.set_name(title.as_str());
    }
    if let Some(min) = design.min {
        axis.set_min(min);
    }
    if let Some(max) = design.max {
        axis.set_max(max);
    }
    if let Some(unit) = design.major_unit {
        axis.set_major_unit(unit);
    }
    if let Some(data_type) = &design.data_type {
        if let Some(code) = number_format(data_type, culture)? {
            axis.set_num_format(code.as_str());
        }
    }
    if design.crossing != AxisCrossing::Auto {
        axis.set_crossing(axis_crossing(design.crossing));
    }
    if design.reverse {
        axis.set_reverse();
    }
    if design.hidden {
        axis.set_hidden(true);
    }
    if let Some(gridlines) = design.major_gridlines {
        axis.set_major_gridlines(gridlines);
    }
    if let Some(base) = design.log_base {
        axis.set_log_base(base);
    }
    Ok(())
}

fn add_series(chart: &mut Chart, kind: ChartKind, design: &SeriesDesign) {
    let series = chart.add_series();
    series.set_values(design.values.absolute().as_str());
    if let Some(categories) = &design.categories {
        series.set_categories(categories.absolute().as_str());
    }
    if let Some(name) = &design.name {
        series.set_name(name.as_str());
    }

    let mut format = ChartFormat::new();
    let mut formatted = false;
    if let Some(fill) = design.fill {
        format.set_solid_fill(ChartSolidFill::new().set_color(fill));
        formatted = true;
    }
    if let Some(line) = &design.line {
        // Line and scatter series draw with `line`; filled series use it
        // as their border.
        match kind {
            ChartKind::Line
            | ChartKind::LineStacked
            | ChartKind::Scatter
            | ChartKind::ScatterSmooth => {
                format.set_line(&chart_line(line));
            }
            _ => {
                format.set_border(&chart_line(line));
            }
        }
        formatted = true;
    }
    if formatted {
        series.set_format(&mut format);
    }
    if design.data_labels {
        series.set_data_label(ChartDataLabel::new().show_value());
    }
    if design.smooth {
        series.set_smooth(true);
    }
}

/// Builds the engine chart for a design. Effects are not part of the
/// engine's model and are added to the saved package afterwards.
pub(crate) fn build_chart(design: &ChartDesign, culture: &'static Culture) -> Result<Chart> {
    let mut chart = Chart::new(chart_type(design.kind));
    if let Some(title) = &design.title {
        chart.title().set_name(title.as_str());
    }
    for series in &design.series {
        add_series(&mut chart, design.kind, series);
    }

    if design.kind.has_axes() {
        apply_axis(chart.x_axis(), &design.x_axis, culture)?;
        apply_axis(chart.y_axis(), &design.y_axis, culture)?;
    }

    if design.legend.hidden {
        chart.legend().set_hidden();
    } else {
        chart
            .legend()
            .set_position(legend_position(design.legend.position));
    }

    chart.set_width(design.width).set_height(design.height);
    if let Some(style) = design.style {
        chart.set_style(style);
    }
    if let Some(mut format) = area_format(&design.chart_area) {
        chart.chart_area().set_format(&mut format);
    }
    if let Some(mut format) = area_format(&design.plot_area) {
        chart.plot_area().set_format(&mut format);
    }
    Ok(chart)
}
