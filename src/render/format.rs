//! Cell style to `rust_xlsxwriter::Format` conversion.

use rust_xlsxwriter::{Format, FormatAlign, FormatBorder, FormatPattern, FormatUnderline};

use crate::culture::Culture;
use crate::design::{
    BorderStyle, CellStyle, FillPattern, HorizontalAlignment, Underline, VerticalAlignment,
};
use crate::error::Result;
use crate::number_format::DataType;

fn border_style(style: BorderStyle) -> FormatBorder {
    match style {
        BorderStyle::None => FormatBorder::None,
        BorderStyle::Thin => FormatBorder::Thin,
        BorderStyle::Medium => FormatBorder::Medium,
        BorderStyle::Thick => FormatBorder::Thick,
        BorderStyle::Dashed => FormatBorder::Dashed,
        BorderStyle::Dotted => FormatBorder::Dotted,
        BorderStyle::Double => FormatBorder::Double,
        BorderStyle::Hair => FormatBorder::Hair,
    }
}

fn fill_pattern(pattern: FillPattern) -> FormatPattern {
    match pattern {
        FillPattern::Solid => FormatPattern::Solid,
        FillPattern::Gray125 => FormatPattern::Gray125,
        FillPattern::Gray0625 => FormatPattern::Gray0625,
        FillPattern::LightHorizontal => FormatPattern::LightHorizontal,
        FillPattern::LightVertical => FormatPattern::LightVertical,
        FillPattern::LightGrid => FormatPattern::LightGrid,
    }
}

fn underline(underline: Underline) -> FormatUnderline {
    match underline {
        Underline::Single => FormatUnderline::Single,
        Underline::Double => FormatUnderline::Double,
        Underline::SingleAccounting => FormatUnderline::SingleAccounting,
        Underline::DoubleAccounting => FormatUnderline::DoubleAccounting,
    }
}

fn horizontal(alignment: HorizontalAlignment) -> FormatAlign {
    match alignment {
        HorizontalAlignment::General => FormatAlign::General,
        HorizontalAlignment::Left => FormatAlign::Left,
        HorizontalAlignment::Center => FormatAlign::Center,
        HorizontalAlignment::Right => FormatAlign::Right,
        HorizontalAlignment::Fill => FormatAlign::Fill,
        HorizontalAlignment::Justify => FormatAlign::Justify,
        HorizontalAlignment::CenterAcross => FormatAlign::CenterAcross,
    }
}

fn vertical(alignment: VerticalAlignment) -> FormatAlign {
    match alignment {
        VerticalAlignment::Top => FormatAlign::Top,
        VerticalAlignment::Center => FormatAlign::VerticalCenter,
        VerticalAlignment::Bottom => FormatAlign::Bottom,
        VerticalAlignment::Justify => FormatAlign::VerticalJustify,
    }
}

/// Builds the number format code for a data type. `General` maps to no
/// code at all so the cell keeps Excel's default.
pub(crate) fn number_format(
    data_type: &DataType,
    culture: &'static Culture,
) -> Result<Option<String>> {
    data_type.validate()?;
    match data_type {
        DataType::General => Ok(None),
        other => other.format_code(culture).map(Some),
    }
}

/// Converts a fully combined cell style into an engine format.
pub(crate) fn cell_format(style: &CellStyle, culture: &'static Culture) -> Result<Format> {
    let mut format = Format::new();

    let font = &style.font;
    if let Some(name) = &font.name {
        format = format.set_font_name(name);
    }
    if let Some(size) = font.size {
        format = format.set_font_size(size);
    }
    if font.bold == Some(true) {
        format = format.set_bold();
    }
    if font.italic == Some(true) {
        format = format.set_italic();
    }
    if font.strikethrough == Some(true) {
        format = format.set_font_strikethrough();
    }
    if let Some(u) = font.underline {
        format = format.set_underline(underline(u));
    }
    if let Some(color) = font.color {
        format = format.set_font_color(color);
    }

    if let Some(fill) = style.fill {
        format = match fill.pattern {
            FillPattern::Solid => format
                .set_pattern(FormatPattern::Solid)
                .set_background_color(fill.color),
            pattern => format
                .set_pattern(fill_pattern(pattern))
                .set_foreground_color(fill.color),
        };
    }

    let border = &style.border;
    if let Some(line) = border.top {
        format = format.set_border_top(border_style(line.style));
        if let Some(color) = line.color {
            format = format.set_border_top_color(color);
        }
    }
    if let Some(line) = border.bottom {
        format = format.set_border_bottom(border_style(line.style));
        if let Some(color) = line.color {
            format = format.set_border_bottom_color(color);
        }
    }
    if let Some(line) = border.left {
        format = format.set_border_left(border_style(line.style));
        if let Some(color) = line.color {
            format = format.set_border_left_color(color);
        }
    }
    if let Some(line) = border.right {
        format = format.set_border_right(border_style(line.style));
        if let Some(color) = line.color {
            format = format.set_border_right_color(color);
        }
    }

    if let Some(h) = style.horizontal {
        format = format.set_align(horizontal(h));
    }
    if let Some(v) = style.vertical {
        format = format.set_align(vertical(v));
    }
    if style.wrap_text == Some(true) {
        format = format.set_text_wrap();
    }
    if style.shrink_to_fit == Some(true) {
        format = format.set_shrink();
    }
    if let Some(indent) = style.indent {
        format = format.set_indent(indent);
    }
    if let Some(rotation) = style.rotation {
        // Stacked (vertical) text is 255 in the file, 270 in the engine.
        format = format.set_rotation(if rotation == 255 { 270 } else { rotation });
    }

    if let Some(data_type) = &style.data_type {
        if let Some(code) = number_format(data_type, culture)? {
            format = format.set_num_format(&code);
        }
    }
    Ok(format)
}
