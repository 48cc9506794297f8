//! Post-processing of the saved package for drawing effects.
//!
//! The engine writes charts and text boxes without `a:effectLst`. After the
//! workbook is saved, each worksheet with effects is followed from
//! `xl/workbook.xml` to its drawing part and chart parts, and the effects
//! are spliced into the matching `spPr` elements.
//!
//! Charts and shapes are matched by ordinal within their kind. Both the
//! document and the engine keep them ordered by anchor cell, so the n-th
//! chart of a sheet is the n-th chart frame of its drawing.

pub mod effect;
pub mod package;
pub mod patch;

use std::collections::BTreeMap;

use tracing::debug;

use crate::document::{Document, Sheet};
use crate::error::{DesignError, Result};

use self::effect::effect_list;
use self::package::Package;
use self::patch::{patch_chart, patch_drawing};

/// Writes the effects of every chart and shape in `document` into the
/// rendered workbook `bytes`.
pub fn apply_effects(bytes: &[u8], document: &Document) -> Result<Vec<u8>> {
    let mut package = Package::from_bytes(bytes)?;
    let worksheets = package.worksheet_parts()?;

    for sheet in document.sheets().iter().filter(|s| s.has_effects()) {
        let sheet_part = worksheets
            .iter()
            .find(|(name, _)| name == sheet.name())
            .map(|(_, part)| part.clone())
            .ok_or_else(|| {
                DesignError::Ooxml(format!("worksheet {} is not in the package", sheet.name()))
            })?;
        let drawing = package.drawing_for(&sheet_part)?.ok_or_else(|| {
            DesignError::Ooxml(format!("worksheet {} has no drawing part", sheet.name()))
        })?;
        patch_charts(&mut package, sheet, &drawing)?;
        patch_shapes(&mut package, sheet, &drawing)?;
    }
    package.write_to_bytes()
}

fn patch_charts(package: &mut Package, sheet: &Sheet, drawing: &str) -> Result<()> {
    let chart_parts = package.chart_parts(drawing)?;
    for (index, placed) in sheet.charts().enumerate() {
        let design = &placed.design;
        if design.chart_area.effects.is_empty() && design.plot_area.effects.is_empty() {
            continue;
        }
        let part = chart_parts.get(index).ok_or_else(|| {
            DesignError::Ooxml(format!(
                "chart {} of worksheet {} is not in the package",
                index + 1,
                sheet.name()
            ))
        })?;
        let chart_area =
            (!design.chart_area.effects.is_empty()).then(|| effect_list(&design.chart_area.effects));
        let plot_area =
            (!design.plot_area.effects.is_empty()).then(|| effect_list(&design.plot_area.effects));
        let patched = patch_chart(
            package.part_str(part)?,
            chart_area.as_deref(),
            plot_area.as_deref(),
        )?;
        package.set_part(part, patched.into_bytes());
        debug!(part = part.as_str(), anchor = %placed.at, "chart effects written");
    }
    Ok(())
}

fn patch_shapes(package: &mut Package, sheet: &Sheet, drawing: &str) -> Result<()> {
    let shapes: BTreeMap<usize, String> = sheet
        .shapes()
        .enumerate()
        .filter(|(_, placed)| !placed.design.effects.is_empty())
        .map(|(index, placed)| (index, effect_list(&placed.design.effects)))
        .collect();
    if shapes.is_empty() {
        return Ok(());
    }
    let patched = patch_drawing(package.part_str(drawing)?, &shapes)?;
    package.set_part(drawing, patched.into_bytes());
    debug!(part = drawing, shapes = shapes.len(), "shape effects written");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::DesignerOptions;
    use crate::design::{
        CellValue, ChartDesign, ChartKind, DesignColor, EffectDesign, GlowDesign, SeriesDesign,
        ShadowDesign, ShapeDesign,
    };
    use crate::reference::{CellRef, SheetRange};
    use crate::render::Renderer;
    use tempfile::NamedTempFile;

    fn cell(text: &str) -> CellRef {
        CellRef::parse(text).unwrap()
    }

    fn document_with_effects() -> Result<Document> {
        let mut doc = Document::new();
        doc.add_sheet("Plain")?;
        let sheet = doc.add_sheet("Report")?;
        for (row, value) in [3.0, 5.0, 4.0].iter().enumerate() {
            sheet.set_value(cell("A1").offset(row as u32, 0)?, CellValue::Number(*value));
        }

        let series = SeriesDesign::new(SheetRange::parse("Report!A1:A3")?);
        let mut plain = ChartDesign::new(ChartKind::Column);
        plain.add_series(series.clone());
        sheet.add_chart(cell("C2"), plain)?;

        let mut shadowed = ChartDesign::new(ChartKind::Line);
        shadowed.add_series(series);
        shadowed.chart_area.effects = EffectDesign {
            shadow: Some(ShadowDesign::default()),
            ..Default::default()
        };
        sheet.add_chart(cell("C20"), shadowed)?;

        sheet.add_shape(cell("K2"), ShapeDesign::text_box("plain"))?;
        let mut glowing = ShapeDesign::text_box("glowing");
        glowing.effects.glow = Some(GlowDesign::new(DesignColor::rgb(0xFF, 0xC0, 0x00), 6.0));
        sheet.add_shape(cell("K12"), glowing)?;
        Ok(doc)
    }

    #[test]
    fn test_effects_land_in_the_right_parts() -> Result<()> {
        let doc = document_with_effects()?;
        let options = DesignerOptions::default();
        let rendered = Renderer::new(&options)?.render_to_bytes(&doc)?;
        let patched = apply_effects(&rendered, &doc)?;

        let package = Package::from_bytes(&patched)?;
        let sheets = package.worksheet_parts()?;
        assert_eq!(sheets[1].0, "Report");
        let drawing = package.drawing_for(&sheets[1].1)?.unwrap();
        let charts = package.chart_parts(&drawing)?;
        assert_eq!(charts.len(), 2);
        assert!(!package.part_str(&charts[0])?.contains("<a:outerShdw"));
        assert!(package.part_str(&charts[1])?.contains("<a:outerShdw"));

        let drawing_xml = package.part_str(&drawing)?;
        assert_eq!(drawing_xml.matches("<a:glow ").count(), 1);
        let glow = drawing_xml.find("<a:glow ").unwrap();
        assert!(drawing_xml.find("glowing").unwrap() > glow);
        assert!(drawing_xml.find("plain").unwrap() < glow);

        let temp_file = NamedTempFile::with_suffix(".xlsx").unwrap();
        std::fs::write(temp_file.path(), &patched)?;
        let book = umya_spreadsheet::reader::xlsx::read(temp_file.path()).unwrap();
        assert_eq!(book.get_sheet(&1).unwrap().get_value((1, 2)).as_str(), "5");
        Ok(())
    }

    #[test]
    fn test_no_effects_keeps_parts() -> Result<()> {
        let mut doc = Document::new();
        doc.add_sheet("Sheet1")?.set_value(cell("A1"), "x".into());
        let options = DesignerOptions::default();
        let rendered = Renderer::new(&options)?.render_to_bytes(&doc)?;
        let patched = apply_effects(&rendered, &doc)?;
        let before = Package::from_bytes(&rendered)?;
        let after = Package::from_bytes(&patched)?;
        assert!(before.part_names().eq(after.part_names()));
        Ok(())
    }
}
