//! Renders a [`Document`] through `rust_xlsxwriter`.
//!
//! Cell styles are combined with the designer's default style before they
//! become engine formats, so every written cell carries a complete format.
//! Merges are written before cell values; the engine fills merged blocks
//! with blanks and the top-left value is written over them afterwards.

pub(crate) mod chart;
pub(crate) mod drawing;
pub(crate) mod format;

use rust_xlsxwriter::{
    DocProperties, Table, TableColumn, TableFunction, TableStyle, Workbook, Worksheet,
};
use tracing::{debug, info};

use crate::config::DesignerOptions;
use crate::culture::Culture;
use crate::design::{CellStyle, CellValue, Combine, TableStylePreset, TotalFunction};
use crate::document::{Cell, Document, DocumentProperties, PlacedTable, Sheet};
use crate::error::Result;

use self::format::cell_format;

fn table_function(function: TotalFunction) -> TableFunction {
    match function {
        TotalFunction::Sum => TableFunction::Sum,
        TotalFunction::Average => TableFunction::Average,
        TotalFunction::Count => TableFunction::Count,
        TotalFunction::CountNumbers => TableFunction::CountNumbers,
        TotalFunction::Max => TableFunction::Max,
        TotalFunction::Min => TableFunction::Min,
        TotalFunction::StdDev => TableFunction::StdDev,
        TotalFunction::Var => TableFunction::Var,
    }
}

fn table_style(preset: TableStylePreset) -> TableStyle {
    match preset {
        TableStylePreset::None => TableStyle::None,
        TableStylePreset::Light(n) => match n {
            1 => TableStyle::Light1,
            2 => TableStyle::Light2,
            3 => TableStyle::Light3,
            4 => TableStyle::Light4,
            5 => TableStyle::Light5,
            6 => TableStyle::Light6,
            7 => TableStyle::Light7,
            8 => TableStyle::Light8,
            9 => TableStyle::Light9,
            10 => TableStyle::Light10,
            11 => TableStyle::Light11,
            12 => TableStyle::Light12,
            13 => TableStyle::Light13,
            14 => TableStyle::Light14,
            15 => TableStyle::Light15,
            16 => TableStyle::Light16,
            17 => TableStyle::Light17,
            18 => TableStyle::Light18,
            19 => TableStyle::Light19,
            20 => TableStyle::Light20,
            _ => TableStyle::Light21,
        },
        TableStylePreset::Medium(n) => match n {
            1 => TableStyle::Medium1,
            2 => TableStyle::Medium2,
            3 => TableStyle::Medium3,
            4 => TableStyle::Medium4,
            5 => TableStyle::Medium5,
            6 => TableStyle::Medium6,
            7 => TableStyle::Medium7,
            8 => TableStyle::Medium8,
            9 => TableStyle::Medium9,
            10 => TableStyle::Medium10,
            11 => TableStyle::Medium11,
            12 => TableStyle::Medium12,
            13 => TableStyle::Medium13,
            14 => TableStyle::Medium14,
            15 => TableStyle::Medium15,
            16 => TableStyle::Medium16,
            17 => TableStyle::Medium17,
            18 => TableStyle::Medium18,
            19 => TableStyle::Medium19,
            20 => TableStyle::Medium20,
            21 => TableStyle::Medium21,
            22 => TableStyle::Medium22,
            23 => TableStyle::Medium23,
            24 => TableStyle::Medium24,
            25 => TableStyle::Medium25,
            26 => TableStyle::Medium26,
            27 => TableStyle::Medium27,
            _ => TableStyle::Medium28,
        },
        TableStylePreset::Dark(n) => match n {
            1 => TableStyle::Dark1,
            2 => TableStyle::Dark2,
            3 => TableStyle::Dark3,
            4 => TableStyle::Dark4,
            5 => TableStyle::Dark5,
            6 => TableStyle::Dark6,
            7 => TableStyle::Dark7,
            8 => TableStyle::Dark8,
            9 => TableStyle::Dark9,
            10 => TableStyle::Dark10,
            _ => TableStyle::Dark11,
        },
    }
}

fn doc_properties(properties: &DocumentProperties) -> DocProperties {
    let mut props = DocProperties::new();
    if let Some(title) = &properties.title {
        props = props.set_title(title);
    }
    if let Some(subject) = &properties.subject {
        props = props.set_subject(subject);
    }
    if let Some(author) = &properties.author {
        props = props.set_author(author);
    }
    if let Some(company) = &properties.company {
        props = props.set_company(company);
    }
    if let Some(keywords) = &properties.keywords {
        props = props.set_keywords(keywords);
    }
    if let Some(comment) = &properties.comment {
        props = props.set_comment(comment);
    }
    props
}

/// Turns documents into workbooks using one set of designer options.
pub struct Renderer<'a> {
    options: &'a DesignerOptions,
    culture: &'static Culture,
}

impl<'a> Renderer<'a> {
    pub fn new(options: &'a DesignerOptions) -> Result<Self> {
        options.validate()?;
        Ok(Renderer {
            options,
            culture: options.culture()?,
        })
    }

    /// The style a cell is written with: its own style over the default,
    /// with a date format filled in for date values.
    fn effective_style(&self, value: &CellValue, style: &CellStyle) -> CellStyle {
        let mut combined = style.combine(&self.options.default_style);
        if combined.data_type.is_none() {
            combined.data_type = value.implied_data_type();
        }
        combined
    }

    pub fn render(&self, document: &Document) -> Result<Workbook> {
        let mut workbook = Workbook::new();
        let mut properties = self.options.properties.clone();
        properties.update(&document.properties);
        workbook.set_properties(&doc_properties(&properties));

        for sheet in document.sheets() {
            let worksheet = workbook.add_worksheet();
            self.render_sheet(worksheet, sheet)?;
        }
        info!(
            sheets = document.sheets().len(),
            culture = self.culture.name,
            "workbook rendered"
        );
        Ok(workbook)
    }

    /// Renders and serialises the workbook to `.xlsx` bytes.
    pub fn render_to_bytes(&self, document: &Document) -> Result<Vec<u8>> {
        let mut workbook = self.render(document)?;
        Ok(workbook.save_to_buffer()?)
    }

    fn render_sheet(&self, worksheet: &mut Worksheet, sheet: &Sheet) -> Result<()> {
        worksheet.set_name(sheet.name())?;

        let blank = Cell::default();
        for range in sheet.merges() {
            let anchor = sheet.cell(range.first).unwrap_or(&blank);
            let format = cell_format(
                &self.effective_style(&anchor.value, &anchor.style),
                self.culture,
            )?;
            worksheet.merge_range(
                range.first.row,
                range.first.col,
                range.last.row,
                range.last.col,
                "",
                &format,
            )?;
        }

        for (at, cell) in sheet.cells() {
            let style = self.effective_style(&cell.value, &cell.style);
            let format = cell_format(&style, self.culture)?;
            let (row, col) = (at.row, at.col);
            match &cell.value {
                CellValue::Empty => {
                    worksheet.write_blank(row, col, &format)?;
                }
                CellValue::Text(text) => {
                    worksheet.write_string_with_format(row, col, text, &format)?;
                }
                CellValue::Number(number) => {
                    worksheet.write_number_with_format(row, col, *number, &format)?;
                }
                CellValue::Bool(value) => {
                    worksheet.write_boolean_with_format(row, col, *value, &format)?;
                }
                CellValue::Formula(formula) => {
                    worksheet.write_formula_with_format(row, col, formula.as_str(), &format)?;
                }
                CellValue::Date(date) => {
                    worksheet.write_datetime_with_format(row, col, date, &format)?;
                }
                CellValue::DateTime(datetime) => {
                    worksheet.write_datetime_with_format(row, col, datetime, &format)?;
                }
                CellValue::Time(time) => {
                    worksheet.write_datetime_with_format(row, col, time, &format)?;
                }
            }
        }

        if sheet.options.autofit {
            worksheet.autofit();
        }
        for (&col, &width) in sheet.column_widths() {
            worksheet.set_column_width(col, width)?;
        }
        for (&row, &height) in sheet.row_heights() {
            worksheet.set_row_height(row, height)?;
        }
        if let Some(at) = sheet.freeze() {
            worksheet.set_freeze_panes(at.row, at.col)?;
        }
        self.apply_sheet_options(worksheet, sheet);

        for table in sheet.tables() {
            add_table(worksheet, table)?;
        }
        for placed in sheet.charts() {
            let chart = chart::build_chart(&placed.design, self.culture)?;
            let (x, y) = placed.design.offset;
            worksheet.insert_chart_with_offset(placed.at.row, placed.at.col, &chart, x, y)?;
        }
        for placed in sheet.shapes() {
            let shape = drawing::build_shape(&placed.design);
            let (x, y) = placed.design.offset;
            worksheet.insert_shape_with_offset(placed.at.row, placed.at.col, &shape, x, y)?;
        }
        for placed in sheet.images() {
            let image = drawing::build_image(&placed.design)?;
            let (x, y) = placed.design.offset;
            worksheet.insert_image_with_offset(placed.at.row, placed.at.col, &image, x, y)?;
        }
        for (at, design) in sheet.sparklines() {
            let sparkline = drawing::build_sparkline(design)?;
            worksheet.add_sparkline(at.row, at.col, &sparkline)?;
        }

        debug!(sheet = sheet.name(), "sheet rendered");
        Ok(())
    }

    fn apply_sheet_options(&self, worksheet: &mut Worksheet, sheet: &Sheet) {
        let options = &sheet.options;
        if let Some(color) = options.tab_color {
            worksheet.set_tab_color(color);
        }
        if options.hide_gridlines {
            worksheet.set_screen_gridlines(false);
        }
        if let Some(zoom) = options.zoom {
            worksheet.set_zoom(zoom);
        }
        if options.landscape {
            worksheet.set_landscape();
        }
    }
}

/// Declares an Excel table over cells that are already written. The engine
/// rewrites the header and total cells, so their look comes from the
/// table style.
fn add_table(worksheet: &mut Worksheet, table: &PlacedTable) -> Result<()> {
    let columns: Vec<TableColumn> = table
        .columns
        .iter()
        .map(|design| {
            let mut column = TableColumn::new().set_header(&design.header);
            if let Some(label) = &design.total_label {
                column = column.set_total_label(label);
            } else if let Some(function) = design.total {
                column = column.set_total_function(table_function(function));
            }
            column
        })
        .collect();
    let excel_table = Table::new()
        .set_name(&table.name)
        .set_columns(&columns)
        .set_style(table_style(table.preset))
        .set_header_row(table.show_header)
        .set_total_row(table.total_row)
        .set_autofilter(table.autofilter && table.show_header)
        .set_banded_rows(table.banded_rows);
    worksheet.add_table(
        table.range.first.row,
        table.range.first.col,
        table.range.last.row,
        table.range.last.col,
        &excel_table,
    )?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::design::{
        AxisCrossing, ChartDesign, ChartKind, DesignColor, FontDesign, ImageDesign, SeriesDesign,
        SparklineDesign, SparklineKind, TableColumnDesign, TableDesign,
    };
    use crate::document::SheetOptions;
    use crate::number_format::DataType;
    use crate::ooxml::package::Package;
    use crate::operation::{
        InsertChart, InsertImage, InsertSparkline, InsertTable, Operation, SetDocumentProperties,
        SetSheetOptions,
    };
    use crate::reference::{CellRange, CellRef, SheetRange};
    use tempfile::NamedTempFile;

    const PIXEL_PNG: [u8; 67] = [
        0x89, 0x50, 0x4E, 0x47, 0x0D, 0x0A, 0x1A, 0x0A, 0x00, 0x00, 0x00, 0x0D, 0x49, 0x48, 0x44,
        0x52, 0x00, 0x00, 0x00, 0x01, 0x00, 0x00, 0x00, 0x01, 0x08, 0x06, 0x00, 0x00, 0x00, 0x1F,
        0x15, 0xC4, 0x89, 0x00, 0x00, 0x00, 0x0A, 0x49, 0x44, 0x41, 0x54, 0x78, 0x9C, 0x63, 0x00,
        0x01, 0x00, 0x00, 0x05, 0x00, 0x01, 0x0D, 0x0A, 0x2D, 0xB4, 0x00, 0x00, 0x00, 0x00, 0x49,
        0x45, 0x4E, 0x44, 0xAE, 0x42, 0x60, 0x82,
    ];

    fn cell(text: &str) -> CellRef {
        CellRef::parse(text).unwrap()
    }

    fn sample_document() -> Document {
        let mut doc = Document::new();
        let sheet = doc.add_sheet("Summary").unwrap();
        sheet.set_cell(
            cell("A1"),
            "Quarterly report".into(),
            CellStyle::new().with_font(FontDesign::bold()),
        );
        sheet.add_merge(CellRange::parse("A1:C1").unwrap()).unwrap();
        sheet.set_value(cell("A2"), 1250.5.into());
        sheet.set_value(cell("B2"), true.into());
        sheet.set_value(cell("C2"), CellValue::Formula("=A2*2".to_string()));
        sheet.set_column_width(0, 24.0).unwrap();
        sheet.set_freeze(Some(cell("A2")));
        doc.add_sheet("Data").unwrap();
        doc
    }

    #[test]
    fn test_render_values_and_merges() -> Result<()> {
        let options = DesignerOptions::default();
        let renderer = Renderer::new(&options)?;
        let mut workbook = renderer.render(&sample_document())?;

        let temp_file = NamedTempFile::with_suffix(".xlsx").unwrap();
        let temp_path = temp_file.path().to_path_buf();
        workbook.save(&temp_path)?;

        let book = umya_spreadsheet::reader::xlsx::read(&temp_path).unwrap();
        let summary = book.get_sheet(&0).unwrap();
        assert_eq!(summary.get_name(), "Summary");
        assert_eq!(summary.get_value((1, 1)).as_str(), "Quarterly report");
        assert_eq!(summary.get_value((1, 2)).as_str(), "1250.5");
        let merges: Vec<String> = summary
            .get_merge_cells()
            .iter()
            .map(|m| m.get_range())
            .collect();
        assert_eq!(merges, vec!["A1:C1"]);
        assert_eq!(book.get_sheet(&1).unwrap().get_name(), "Data");
        Ok(())
    }

    #[test]
    fn test_render_dates_get_a_format() -> Result<()> {
        let options = DesignerOptions::default().with_culture("de-DE");
        let renderer = Renderer::new(&options)?;
        let date = chrono::NaiveDate::from_ymd_opt(2024, 3, 31).unwrap();
        let style = renderer.effective_style(&CellValue::Date(date), &CellStyle::default());
        assert!(matches!(style.data_type, Some(DataType::Date(_))));
        assert_eq!(style.font.name.as_deref(), Some("Calibri"));
        Ok(())
    }

    #[test]
    fn test_render_styled_table_to_bytes() -> Result<()> {
        let mut doc = Document::new();
        doc.add_sheet("Sales")?;
        let mut table = TableDesign::new(vec![
            TableColumnDesign::new("Region").with_total_label("Total"),
            TableColumnDesign::new("Amount")
                .with_data_type(DataType::number(0))
                .with_total(TotalFunction::Sum),
        ]);
        table.add_row(vec!["North".into(), 10.0.into()]);
        table.add_row(vec!["South".into(), 20.0.into()]);
        table.preset = TableStylePreset::Medium(2);
        InsertTable::new("Sales", cell("A1"), table).apply(&mut doc)?;

        let options = DesignerOptions::default();
        let bytes = Renderer::new(&options)?.render_to_bytes(&doc)?;

        let temp_file = NamedTempFile::with_suffix(".xlsx").unwrap();
        std::fs::write(temp_file.path(), &bytes)?;
        let book = umya_spreadsheet::reader::xlsx::read(temp_file.path()).unwrap();
        let sheet = book.get_sheet(&0).unwrap();
        assert_eq!(sheet.get_value((1, 1)).as_str(), "Region");
        assert_eq!(sheet.get_value((2, 3)).as_str(), "20");
        assert_eq!(sheet.get_value((1, 4)).as_str(), "Total");
        Ok(())
    }

    fn render_package(doc: &Document) -> Result<Package> {
        let options = DesignerOptions::default();
        let bytes = Renderer::new(&options)?.render_to_bytes(doc)?;
        Package::from_bytes(&bytes)
    }

    fn trend_document() -> Result<Document> {
        let mut doc = Document::new();
        let sheet = doc.add_sheet("Trend")?;
        for (col, value) in [3.0, 5.0, 4.0, 8.0].iter().enumerate() {
            sheet.set_value(cell("A1").offset(0, col as u16)?, CellValue::Number(*value));
        }
        Ok(doc)
    }

    #[test]
    fn test_render_image_and_sparkline() -> Result<()> {
        let mut doc = trend_document()?;
        InsertImage::new("Trend", cell("F3"), ImageDesign::from_bytes(PIXEL_PNG.to_vec()))
            .apply(&mut doc)?;
        let mut sparkline =
            SparklineDesign::new(SparklineKind::Column, SheetRange::parse("Trend!A1:D1")?);
        sparkline.high_point = true;
        InsertSparkline::new("Trend", cell("E1"), sparkline).apply(&mut doc)?;

        let package = render_package(&doc)?;
        assert!(package.part_names().any(|name| name.starts_with("xl/media/")));
        let sheets = package.worksheet_parts()?;
        let sheet_xml = package.part_str(&sheets[0].1)?;
        assert!(sheet_xml.contains("<x14:sparklineGroups"));
        assert!(sheet_xml.contains("Trend!A1:D1"));
        Ok(())
    }

    #[test]
    fn test_render_sheet_options_and_properties() -> Result<()> {
        let mut doc = trend_document()?;
        let options = SheetOptions {
            tab_color: Some(DesignColor::RED),
            hide_gridlines: true,
            zoom: Some(150),
            landscape: true,
            autofit: false,
        };
        SetSheetOptions::new("Trend", options).apply(&mut doc)?;
        SetDocumentProperties::new(DocumentProperties {
            title: Some("Quarterly trend".to_string()),
            ..Default::default()
        })
        .apply(&mut doc)?;

        let package = render_package(&doc)?;
        let sheets = package.worksheet_parts()?;
        let sheet_xml = package.part_str(&sheets[0].1)?;
        assert!(sheet_xml.contains("<tabColor"));
        assert!(sheet_xml.contains(r#"zoomScale="150""#));
        assert!(sheet_xml.contains(r#"showGridLines="0""#));
        assert!(sheet_xml.contains(r#"orientation="landscape""#));
        let core = package.part_str("docProps/core.xml")?;
        assert!(core.contains("<dc:title>Quarterly trend</dc:title>"));
        Ok(())
    }

    #[test]
    fn test_render_axis_crossing_and_log_base() -> Result<()> {
        let mut doc = trend_document()?;
        let mut chart = ChartDesign::new(ChartKind::Line);
        chart.add_series(SeriesDesign::new(SheetRange::parse("Trend!A1:D1")?));
        chart.y_axis.crossing = AxisCrossing::Value(2.0);
        chart.y_axis.log_base = Some(10);
        InsertChart::new("Trend", cell("A3"), chart).apply(&mut doc)?;

        let package = render_package(&doc)?;
        let sheets = package.worksheet_parts()?;
        let drawing = package.drawing_for(&sheets[0].1)?.unwrap();
        let charts = package.chart_parts(&drawing)?;
        assert_eq!(charts.len(), 1);
        let chart_xml = package.part_str(&charts[0])?;
        assert!(chart_xml.contains(r#"<c:crossesAt val="2"/>"#));
        assert!(chart_xml.contains(r#"<c:logBase val="10"/>"#));
        Ok(())
    }

    #[test]
    fn test_table_style_mapping() {
        assert!(table_style(TableStylePreset::Medium(9)) == TableStyle::Medium9);
        assert!(table_style(TableStylePreset::Dark(11)) == TableStyle::Dark11);
        assert!(table_style(TableStylePreset::None) == TableStyle::None);
    }
}
