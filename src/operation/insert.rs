use rust_xlsxwriter::ColNum;
use tracing::debug;

use crate::design::table::validate_table_name;
use crate::design::{
    CellStyle, CellValue, ChartDesign, Combine, ImageDesign, ShapeDesign, SparklineDesign,
    TableDesign, TableStylePreset, TextDesign,
};
use crate::document::{Document, PlacedTable};
use crate::error::{DesignError, Result};
use crate::operation::{Insert, Operation};
use crate::reference::{CellRange, CellRef, SheetRange, MAX_ROWS};

/// Adds an empty worksheet after the existing ones.
#[derive(Debug, Clone)]
pub struct InsertWorksheet {
    pub name: String,
}

impl InsertWorksheet {
    pub fn new(name: &str) -> Self {
        InsertWorksheet {
            name: name.to_string(),
        }
    }
}

impl Operation for InsertWorksheet {
    type Output = ();

    fn name(&self) -> &'static str {
        "insert_worksheet"
    }

    fn apply(&self, document: &mut Document) -> Result<()> {
        document.add_sheet(&self.name)?;
        Ok(())
    }
}

impl Insert for InsertWorksheet {}

/// Writes one value, optionally merged across a block.
#[derive(Debug, Clone)]
pub struct InsertText {
    pub sheet: String,
    pub at: CellRef,
    pub text: TextDesign,
}

impl InsertText {
    pub fn new(sheet: &str, at: CellRef, text: TextDesign) -> Self {
        InsertText {
            sheet: sheet.to_string(),
            at,
            text,
        }
    }
}

impl Operation for InsertText {
    type Output = CellRange;

    fn name(&self) -> &'static str {
        "insert_text"
    }

    fn apply(&self, document: &mut Document) -> Result<CellRange> {
        self.text.style.validate()?;
        let range = match self.text.merge_to {
            Some(last) => {
                let range = CellRange::new(self.at, last);
                if range.first != self.at {
                    return Err(DesignError::InvalidReference(format!(
                        "merge end {} lies above or left of {}",
                        last, self.at
                    )));
                }
                range
            }
            None => CellRange::single(self.at),
        };
        let sheet = document.sheet_mut(&self.sheet)?;
        if !range.is_single() {
            sheet.add_merge(range)?;
            // Border and fill must cover the whole block; only the anchor
            // keeps a value.
            for cell in range.cells() {
                sheet.set_cell(cell, CellValue::Empty, self.text.style.clone());
            }
        }
        sheet.set_cell(self.at, self.text.value.clone(), self.text.style.clone());
        Ok(range)
    }
}

impl Insert for InsertText {}

/// Where the parts of an inserted table ended up.
#[derive(Debug, Clone, PartialEq)]
pub struct TableLayout {
    pub sheet: String,
    pub name: Option<String>,
    pub range: CellRange,
    pub header: Option<CellRange>,
    pub body: Option<CellRange>,
    pub totals: Option<CellRange>,
}

impl TableLayout {
    /// Body cells of the column at `index`, for chart series and sparklines.
    pub fn column(&self, index: ColNum) -> Option<SheetRange> {
        let body = self.body?;
        if index >= body.columns() {
            return None;
        }
        let col = body.first.col + index;
        Some(SheetRange::new(
            &self.sheet,
            CellRange::new(
                CellRef {
                    row: body.first.row,
                    col,
                },
                CellRef {
                    row: body.last.row,
                    col,
                },
            ),
        ))
    }

    /// Header cell of the column at `index`.
    pub fn header_cell(&self, index: ColNum) -> Option<SheetRange> {
        let header = self.header?;
        if index >= header.columns() {
            return None;
        }
        let cell = CellRef {
            row: header.first.row,
            col: header.first.col + index,
        };
        Some(SheetRange::new(&self.sheet, CellRange::single(cell)))
    }
}

/// Writes a header row, data rows and an optional total row.
#[derive(Debug, Clone)]
pub struct InsertTable {
    pub sheet: String,
    pub at: CellRef,
    pub table: TableDesign,
}

impl InsertTable {
    pub fn new(sheet: &str, at: CellRef, table: TableDesign) -> Self {
        InsertTable {
            sheet: sheet.to_string(),
            at,
            table,
        }
    }

    fn table_name(&self, document: &Document) -> Result<Option<String>> {
        if self.table.preset == TableStylePreset::None {
            return Ok(None);
        }
        match &self.table.name {
            Some(name) => {
                validate_table_name(name)?;
                if document.has_table(name) {
                    return Err(DesignError::Conflict(format!(
                        "a table named {} already exists",
                        name
                    )));
                }
                Ok(Some(name.clone()))
            }
            None => {
                let mut n = document.table_count() + 1;
                while document.has_table(&format!("Table{}", n)) {
                    n += 1;
                }
                Ok(Some(format!("Table{}", n)))
            }
        }
    }
}

impl Operation for InsertTable {
    type Output = TableLayout;

    fn name(&self) -> &'static str {
        "insert_table"
    }

    fn apply(&self, document: &mut Document) -> Result<TableLayout> {
        let design = &self.table;
        design.validate()?;
        let name = self.table_name(document)?;

        let too_large = || {
            DesignError::InvalidReference(format!(
                "a table with {} columns and {} rows does not fit in a worksheet",
                design.columns.len(),
                design.rows.len()
            ))
        };
        let columns = ColNum::try_from(design.columns.len()).map_err(|_| too_large())?;
        let header_rows = u32::from(design.show_header);
        let body_rows = u32::try_from(design.rows.len())
            .ok()
            .filter(|r| *r <= MAX_ROWS)
            .ok_or_else(too_large)?;
        let total_rows = u32::from(design.has_total_row());
        let height = header_rows + body_rows + total_rows;
        if height == 0 {
            return Err(DesignError::InvalidDesign(
                "a table without header, rows or totals is empty".to_string(),
            ));
        }
        let range = CellRange::new(self.at, self.at.offset(height - 1, columns - 1)?);
        let row_range = |first: u32, count: u32| -> Result<Option<CellRange>> {
            if count == 0 {
                return Ok(None);
            }
            let top = self.at.offset(first, 0)?;
            Ok(Some(CellRange::new(top, top.offset(count - 1, columns - 1)?)))
        };
        let layout = TableLayout {
            sheet: self.sheet.clone(),
            name: name.clone(),
            range,
            header: row_range(0, header_rows)?,
            body: row_range(header_rows, body_rows)?,
            totals: row_range(header_rows + body_rows, total_rows)?,
        };

        let column_styles: Vec<CellStyle> = design
            .columns
            .iter()
            .map(|column| {
                let mut style = column.style.clone().unwrap_or_default();
                if column.data_type.is_some() {
                    style.data_type = column.data_type.clone();
                }
                style.combine(&design.body_style)
            })
            .collect();

        let sheet = document.sheet_mut(&self.sheet)?;

        if let Some(header) = layout.header {
            for (i, column) in design.columns.iter().enumerate() {
                let at = header.first.offset(0, i as ColNum)?;
                let style = column
                    .style
                    .as_ref()
                    .map_or_else(|| design.header_style.clone(), |s| {
                        let mut header_style = design.header_style.combine(s);
                        header_style.data_type = None;
                        header_style
                    });
                sheet.set_cell(at, CellValue::Text(column.header.clone()), style);
            }
        }

        if let Some(body) = layout.body {
            for (r, row) in design.rows.iter().enumerate() {
                for (i, style) in column_styles.iter().enumerate() {
                    let at = body.first.offset(r as u32, i as ColNum)?;
                    let value = row.get(i).cloned().unwrap_or_default();
                    sheet.set_cell(at, value, style.clone());
                }
            }
        }

        if let Some(totals) = layout.totals {
            for (i, column) in design.columns.iter().enumerate() {
                let at = totals.first.offset(0, i as ColNum)?;
                let value = match (&column.total_label, column.total, layout.column(i as ColNum)) {
                    (Some(label), _, _) => CellValue::Text(label.clone()),
                    (None, Some(function), Some(data)) => CellValue::Formula(format!(
                        "SUBTOTAL({},{})",
                        function.subtotal_code(),
                        data.range
                    )),
                    _ => CellValue::Empty,
                };
                let mut style = design.total_style.clone();
                if column.total.is_some() {
                    style.data_type = column_styles[i].data_type.clone();
                }
                sheet.set_cell(at, value, style.combine(&column_styles[i]));
            }
        }

        for (i, column) in design.columns.iter().enumerate() {
            if let Some(width) = column.width {
                sheet.set_column_width(self.at.col + i as ColNum, width)?;
            }
        }

        if let Some(name) = &name {
            sheet.add_table(PlacedTable {
                name: name.clone(),
                range,
                columns: design.columns.clone(),
                preset: design.preset,
                show_header: design.show_header,
                total_row: design.has_total_row(),
                autofilter: design.autofilter,
                banded_rows: design.banded_rows,
            })?;
        }

        debug!(sheet = %self.sheet, range = %range, "table laid out");
        Ok(layout)
    }
}

impl Insert for InsertTable {}

#[derive(Debug, Clone)]
pub struct InsertChart {
    pub sheet: String,
    pub at: CellRef,
    pub chart: ChartDesign,
}

impl InsertChart {
    pub fn new(sheet: &str, at: CellRef, chart: ChartDesign) -> Self {
        InsertChart {
            sheet: sheet.to_string(),
            at,
            chart,
        }
    }
}

impl Operation for InsertChart {
    type Output = ();

    fn name(&self) -> &'static str {
        "insert_chart"
    }

    fn apply(&self, document: &mut Document) -> Result<()> {
        self.chart.validate()?;
        for sheet in self.chart.referenced_sheets() {
            document.require_sheet(sheet)?;
        }
        document
            .sheet_mut(&self.sheet)?
            .add_chart(self.at, self.chart.clone())
    }
}

impl Insert for InsertChart {}

#[derive(Debug, Clone)]
pub struct InsertShape {
    pub sheet: String,
    pub at: CellRef,
    pub shape: ShapeDesign,
}

impl InsertShape {
    pub fn new(sheet: &str, at: CellRef, shape: ShapeDesign) -> Self {
        InsertShape {
            sheet: sheet.to_string(),
            at,
            shape,
        }
    }
}

impl Operation for InsertShape {
    type Output = ();

    fn name(&self) -> &'static str {
        "insert_shape"
    }

    fn apply(&self, document: &mut Document) -> Result<()> {
        self.shape.validate()?;
        document
            .sheet_mut(&self.sheet)?
            .add_shape(self.at, self.shape.clone())
    }
}

impl Insert for InsertShape {}

#[derive(Debug, Clone)]
pub struct InsertImage {
    pub sheet: String,
    pub at: CellRef,
    pub image: ImageDesign,
}

impl InsertImage {
    pub fn new(sheet: &str, at: CellRef, image: ImageDesign) -> Self {
        InsertImage {
            sheet: sheet.to_string(),
            at,
            image,
        }
    }
}

impl Operation for InsertImage {
    type Output = ();

    fn name(&self) -> &'static str {
        "insert_image"
    }

    fn apply(&self, document: &mut Document) -> Result<()> {
        self.image.validate()?;
        document
            .sheet_mut(&self.sheet)?
            .add_image(self.at, self.image.clone())
    }
}

impl Insert for InsertImage {}

#[derive(Debug, Clone)]
pub struct InsertSparkline {
    pub sheet: String,
    pub at: CellRef,
    pub sparkline: SparklineDesign,
}

impl InsertSparkline {
    pub fn new(sheet: &str, at: CellRef, sparkline: SparklineDesign) -> Self {
        InsertSparkline {
            sheet: sheet.to_string(),
            at,
            sparkline,
        }
    }
}

impl Operation for InsertSparkline {
    type Output = ();

    fn name(&self) -> &'static str {
        "insert_sparkline"
    }

    fn apply(&self, document: &mut Document) -> Result<()> {
        self.sparkline.validate()?;
        if let Some(data) = &self.sparkline.data {
            document.require_sheet(&data.sheet)?;
        }
        document
            .sheet_mut(&self.sheet)?
            .add_sparkline(self.at, self.sparkline.clone())
    }
}

impl Insert for InsertSparkline {}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::design::{
        DesignColor, FontDesign, SeriesDesign, SparklineKind, TableColumnDesign, TotalFunction,
    };
    use crate::number_format::DataType;

    fn document() -> Document {
        let mut doc = Document::new();
        doc.add_sheet("Data").unwrap();
        doc
    }

    fn cell(text: &str) -> CellRef {
        CellRef::parse(text).unwrap()
    }

    fn sales_table() -> TableDesign {
        let mut table = TableDesign::new(vec![
            TableColumnDesign::new("Region").with_total_label("Total"),
            TableColumnDesign::new("Sales")
                .with_data_type(DataType::currency(0))
                .with_total(TotalFunction::Sum)
                .with_width(14.0),
        ]);
        table.add_row(vec!["North".into(), 120.0.into()]);
        table.add_row(vec!["South".into(), 80.0.into()]);
        table
    }

    #[test]
    fn test_insert_text_merges_block() -> Result<()> {
        let mut doc = document();
        let text = TextDesign::new("Quarterly report")
            .with_style(CellStyle::new().with_font(FontDesign::bold()))
            .merged_to(cell("D1"));
        let range = InsertText::new("Data", cell("A1"), text).apply(&mut doc)?;
        assert_eq!(range.to_string(), "A1:D1");
        let sheet = doc.require_sheet("Data")?;
        assert_eq!(sheet.merges(), &[range]);
        assert_eq!(sheet.value(cell("A1")), &CellValue::text("Quarterly report"));
        assert_eq!(
            sheet.cell(cell("D1")).map(|c| c.style.font.bold),
            Some(Some(true))
        );
        Ok(())
    }

    #[test]
    fn test_insert_text_clears_covered_values() -> Result<()> {
        let mut doc = document();
        doc.sheet_mut("Data")?.set_value(cell("B1"), "stale".into());
        doc.sheet_mut("Data")?.set_value(cell("D1"), 42.0.into());
        let text = TextDesign::new("Title").merged_to(cell("C1"));
        InsertText::new("Data", cell("A1"), text).apply(&mut doc)?;
        let sheet = doc.require_sheet("Data")?;
        assert_eq!(sheet.value(cell("A1")), &CellValue::text("Title"));
        assert_eq!(sheet.value(cell("B1")), &CellValue::Empty);
        assert_eq!(sheet.value(cell("D1")), &CellValue::Number(42.0));
        Ok(())
    }

    #[test]
    fn test_insert_table_too_wide() {
        let mut doc = document();
        let columns = (0..65_536)
            .map(|i| TableColumnDesign::new(&format!("C{}", i)))
            .collect();
        let err = InsertTable::new("Data", cell("A1"), TableDesign::new(columns))
            .apply(&mut doc)
            .unwrap_err();
        assert!(matches!(err, DesignError::InvalidDesign(_)));

        let columns = (0..3).map(|i| TableColumnDesign::new(&format!("C{}", i))).collect();
        assert!(InsertTable::new("Data", cell("XFC1"), TableDesign::new(columns))
            .apply(&mut doc)
            .is_err());
    }

    #[test]
    fn test_insert_text_rejects_backwards_merge() {
        let mut doc = document();
        let text = TextDesign::new("x").merged_to(cell("A1"));
        assert!(InsertText::new("Data", cell("C3"), text)
            .apply(&mut doc)
            .is_err());
    }

    #[test]
    fn test_insert_table_layout() -> Result<()> {
        let mut doc = document();
        let layout = InsertTable::new("Data", cell("B2"), sales_table()).apply(&mut doc)?;
        assert_eq!(layout.range.to_string(), "B2:C5");
        assert_eq!(layout.header.map(|r| r.to_string()), Some("B2:C2".to_string()));
        assert_eq!(layout.body.map(|r| r.to_string()), Some("B3:C4".to_string()));
        assert_eq!(layout.totals.map(|r| r.to_string()), Some("B5:C5".to_string()));
        assert_eq!(layout.column(1).map(|r| r.to_string()), Some("Data!C3:C4".to_string()));
        assert_eq!(layout.column(2), None);
        assert_eq!(layout.name, None);

        let sheet = doc.require_sheet("Data")?;
        assert_eq!(sheet.value(cell("C2")), &CellValue::text("Sales"));
        assert_eq!(sheet.value(cell("B3")), &CellValue::text("North"));
        assert_eq!(sheet.value(cell("B5")), &CellValue::text("Total"));
        assert_eq!(
            sheet.value(cell("C5")),
            &CellValue::Formula("SUBTOTAL(109,C3:C4)".to_string())
        );
        let body_style = &sheet.cell(cell("C3")).unwrap().style;
        assert_eq!(body_style.data_type, Some(DataType::currency(0)));
        let total_style = &sheet.cell(cell("C5")).unwrap().style;
        assert_eq!(total_style.data_type, Some(DataType::currency(0)));
        assert_eq!(total_style.font.bold, Some(true));
        let header_style = &sheet.cell(cell("C2")).unwrap().style;
        assert_eq!(header_style.data_type, None);
        assert_eq!(sheet.column_widths().get(&2), Some(&14.0));
        assert!(sheet.tables().is_empty());
        Ok(())
    }

    #[test]
    fn test_insert_table_with_preset_registers_table() -> Result<()> {
        let mut doc = document();
        let mut table = sales_table();
        table.preset = TableStylePreset::Medium(9);
        let first = InsertTable::new("Data", cell("A1"), table.clone()).apply(&mut doc)?;
        assert_eq!(first.name.as_deref(), Some("Table1"));
        let second = InsertTable::new("Data", cell("F1"), table.clone()).apply(&mut doc)?;
        assert_eq!(second.name.as_deref(), Some("Table2"));

        table.name = Some("table1".to_string());
        assert!(matches!(
            InsertTable::new("Data", cell("J1"), table).apply(&mut doc),
            Err(DesignError::Conflict(_))
        ));
        Ok(())
    }

    #[test]
    fn test_insert_table_overlap() -> Result<()> {
        let mut doc = document();
        let mut table = sales_table();
        table.preset = TableStylePreset::Light(1);
        InsertTable::new("Data", cell("A1"), table.clone()).apply(&mut doc)?;
        assert!(InsertTable::new("Data", cell("B2"), table).apply(&mut doc).is_err());
        Ok(())
    }

    #[test]
    fn test_insert_chart_requires_series_sheet() {
        let mut doc = document();
        let mut chart = ChartDesign::default();
        chart.add_series(SeriesDesign::new(SheetRange::parse("Other!A1:A3").unwrap()));
        assert_eq!(
            InsertChart::new("Data", cell("E2"), chart).apply(&mut doc),
            Err(DesignError::SheetNotFound("Other".to_string()))
        );
    }

    #[test]
    fn test_insert_shape_and_sparkline() -> Result<()> {
        let mut doc = document();
        let mut shape = ShapeDesign::text_box("Note");
        shape.fill = Some(DesignColor::LIGHT_GRAY);
        InsertShape::new("Data", cell("H2"), shape).apply(&mut doc)?;
        let sparkline =
            SparklineDesign::new(SparklineKind::Line, SheetRange::parse("Data!B2:G2")?);
        InsertSparkline::new("Data", cell("H2"), sparkline.clone()).apply(&mut doc)?;
        assert!(InsertSparkline::new("Data", cell("H2"), sparkline)
            .apply(&mut doc)
            .is_err());
        let sheet = doc.require_sheet("Data")?;
        assert_eq!(sheet.shapes().count(), 1);
        assert_eq!(sheet.sparklines().count(), 1);
        Ok(())
    }
}
