//! Text boxes, images and sparklines.

use rust_xlsxwriter::{
    Image, Shape, ShapeFont, ShapeFormat, ShapeLine, ShapeSolidFill, ShapeText,
    ShapeTextHorizontalAlignment, ShapeTextVerticalAlignment, Sparkline, SparklineType,
};

use crate::design::{
    ImageDesign, ImageSource, ShapeDesign, ShapeTextAlignment, ShapeTextAnchor, SparklineDesign,
    SparklineKind,
};
use crate::error::{DesignError, Result};

pub(crate) fn build_shape(design: &ShapeDesign) -> Shape {
    let mut format = ShapeFormat::new();
    if let Some(fill) = design.fill {
        format = format.set_solid_fill(&ShapeSolidFill::new().set_color(fill));
    }
    if design.no_line {
        format = format.set_no_line();
    } else if let Some(line) = &design.line {
        format = format.set_line(&ShapeLine::new().set_color(line.color).set_width(line.width));
    }

    let mut font = ShapeFont::new();
    if let Some(name) = &design.font.name {
        font = font.set_name(name);
    }
    if let Some(size) = design.font.size {
        font = font.set_size(size);
    }
    if design.font.bold == Some(true) {
        font = font.set_bold();
    }
    if design.font.italic == Some(true) {
        font = font.set_italic();
    }
    if design.font.underline.is_some() {
        font = font.set_underline();
    }
    if let Some(color) = design.font.color {
        font = font.set_color(color);
    }

    let horizontal = match design.alignment {
        ShapeTextAlignment::Left => ShapeTextHorizontalAlignment::Left,
        ShapeTextAlignment::Center => ShapeTextHorizontalAlignment::Center,
        ShapeTextAlignment::Right => ShapeTextHorizontalAlignment::Right,
    };
    let vertical = match design.anchor {
        ShapeTextAnchor::Top => ShapeTextVerticalAlignment::Top,
        ShapeTextAnchor::Middle => ShapeTextVerticalAlignment::Middle,
        ShapeTextAnchor::Bottom => ShapeTextVerticalAlignment::Bottom,
    };
    let text_options = ShapeText::new()
        .set_horizontal_alignment(horizontal)
        .set_vertical_alignment(vertical);

    Shape::textbox()
        .set_text(&design.text)
        .set_width(design.width)
        .set_height(design.height)
        .set_format(&format)
        .set_font(&font)
        .set_text_options(&text_options)
}

pub(crate) fn build_image(design: &ImageDesign) -> Result<Image> {
    let image = match &design.source {
        ImageSource::Path(path) => Image::new(path)?,
        ImageSource::Bytes(bytes) => Image::new_from_buffer(bytes)?,
    };
    let mut image = image
        .set_scale_width(design.scale_width)
        .set_scale_height(design.scale_height);
    if let Some(alt_text) = &design.alt_text {
        image = image.set_alt_text(alt_text);
    }
    Ok(image)
}

pub(crate) fn build_sparkline(design: &SparklineDesign) -> Result<Sparkline> {
    let data = design.data.as_ref().ok_or_else(|| {
        DesignError::InvalidDesign("a sparkline needs a data range".to_string())
    })?;
    let kind = match design.kind {
        SparklineKind::Line => SparklineType::Line,
        SparklineKind::Column => SparklineType::Column,
        SparklineKind::WinLoss => SparklineType::WinLose,
    };
    let mut sparkline = Sparkline::new()
        .set_range(data.absolute().as_str())
        .set_type(kind)
        .show_markers(design.markers)
        .show_high_point(design.high_point)
        .show_low_point(design.low_point)
        .show_first_point(design.first_point)
        .show_last_point(design.last_point)
        .show_negative_points(design.negative_points)
        .show_axis(design.show_axis)
        .set_right_to_left(design.right_to_left);
    if let Some(color) = design.color {
        sparkline = sparkline.set_sparkline_color(color);
    }
    if let Some(color) = design.negative_color {
        sparkline = sparkline.set_negative_points_color(color);
    }
    if let Some(weight) = design.line_weight {
        sparkline = sparkline.set_line_weight(weight);
    }
    if let Some(style) = design.style {
        sparkline = sparkline.set_style(style);
    }
    Ok(sparkline)
}
