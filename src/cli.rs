use std::io::Write;

use anyhow::{anyhow, bail, Result};
use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use clap::Args;
use csv::{ReaderBuilder, StringRecord, Trim};
use rust_xlsxwriter::ColNum;

use crate::config::DesignerOptions;
use crate::design::{
    CellStyle, CellValue, ChartDesign, ChartKind, FontDesign, SeriesDesign, TableColumnDesign,
    TableDesign, TableStylePreset, TextDesign, TotalFunction,
};
use crate::designer::WorkbookDesigner;
use crate::document::SheetOptions;
use crate::number_format::{DataType, NegativeNumberStyle};
use crate::operation::{
    InsertChart, InsertTable, InsertText, InsertWorksheet, SetFreezePanes, SetSheetOptions,
};
use crate::reference::CellRef;

#[derive(Debug, Clone, Args)]
pub struct TableExportOptions {
    /// Field delimiter of the input
    #[arg(short = 'd', long, default_value_t = ',')]
    pub delimiter: char,
    /// Name of the worksheet
    #[arg(long, default_value = "Sheet1")]
    pub sheet_name: String,
    /// Title written above the table
    #[arg(long)]
    pub title: Option<String>,
    /// Data type of the next column (e.g. text, number:2, currency:0, date, custom=0.0%).
    /// Repeat once per column; columns without a type are inferred.
    #[arg(long = "column-type", value_name = "TYPE")]
    pub column_types: Vec<DataType>,
    /// Excel table style (none, Light1..21, Medium1..28, Dark1..11)
    #[arg(long, default_value = "Medium2")]
    pub table_style: TableStylePreset,
    /// How negative numbers are shown (minus, red-minus, red, parentheses, red-parentheses)
    #[arg(long, default_value = "minus")]
    pub negative: NegativeNumberStyle,
    /// Add a total row summing the numeric columns
    #[arg(long)]
    pub totals: bool,
    /// Add a chart of the numeric columns (column, bar, line, pie, ...)
    #[arg(long, value_name = "KIND")]
    pub chart: Option<ChartKind>,
    /// Keep the header row visible while scrolling
    #[arg(long)]
    pub freeze_header: bool,
}

impl Default for TableExportOptions {
    fn default() -> Self {
        TableExportOptions {
            delimiter: ',',
            sheet_name: "Sheet1".to_string(),
            title: None,
            column_types: Vec::new(),
            table_style: TableStylePreset::Medium(2),
            negative: NegativeNumberStyle::Minus,
            totals: false,
            chart: None,
            freeze_header: false,
        }
    }
}

fn is_numeric(data_type: &DataType) -> bool {
    matches!(
        data_type,
        DataType::Number(_)
            | DataType::Currency(_)
            | DataType::Accounting(_)
            | DataType::Percent { .. }
            | DataType::Scientific { .. }
            | DataType::Fraction { .. }
    )
}

fn with_negative(data_type: DataType, negative: NegativeNumberStyle) -> DataType {
    match data_type {
        DataType::Number(mut number) => {
            number.negative = negative;
            DataType::Number(number)
        }
        DataType::Currency(mut currency) => {
            currency.negative = negative;
            DataType::Currency(currency)
        }
        other => other,
    }
}

/// Columns whose values are all numbers become numbers, with decimals only
/// when some value has a fraction.
fn infer_type<'a>(values: impl Iterator<Item = &'a str>) -> DataType {
    let mut seen = false;
    let mut fractional = false;
    for value in values.map(str::trim).filter(|v| !v.is_empty()) {
        match value.parse::<f64>() {
            Ok(number) => {
                seen = true;
                fractional |= number.fract() != 0.0;
            }
            Err(_) => return DataType::General,
        }
    }
    match (seen, fractional) {
        (false, _) => DataType::General,
        (true, false) => DataType::number(0),
        (true, true) => DataType::number(2),
    }
}

fn parse_value(text: &str, data_type: &DataType, line: u64) -> Result<CellValue> {
    let text = text.trim();
    if text.is_empty() {
        return Ok(CellValue::Empty);
    }
    let value = match data_type {
        DataType::Text => CellValue::text(text),
        DataType::Percent { .. } if text.ends_with('%') => {
            let number: f64 = text.trim_end_matches('%').trim().parse().map_err(|_| {
                anyhow!("line {}: {:?} is not a percentage", line, text)
            })?;
            CellValue::Number(number / 100.0)
        }
        t if is_numeric(t) => CellValue::Number(
            text.parse()
                .map_err(|_| anyhow!("line {}: {:?} is not a number", line, text))?,
        ),
        DataType::Date(_) => CellValue::Date(
            NaiveDate::parse_from_str(text, "%Y-%m-%d")
                .map_err(|e| anyhow!("line {}: {:?} is not a yyyy-mm-dd date: {}", line, text, e))?,
        ),
        DataType::DateTime => CellValue::DateTime(
            NaiveDateTime::parse_from_str(text, "%Y-%m-%d %H:%M:%S")
                .or_else(|_| NaiveDateTime::parse_from_str(text, "%Y-%m-%dT%H:%M:%S"))
                .map_err(|e| anyhow!("line {}: {:?} is not a date and time: {}", line, text, e))?,
        ),
        DataType::Time(_) => CellValue::Time(
            NaiveTime::parse_from_str(text, "%H:%M:%S")
                .or_else(|_| NaiveTime::parse_from_str(text, "%H:%M"))
                .map_err(|e| anyhow!("line {}: {:?} is not a time: {}", line, text, e))?,
        ),
        _ => text
            .parse::<f64>()
            .map(CellValue::Number)
            .unwrap_or_else(|_| CellValue::text(text)),
    };
    Ok(value)
}

/// Records of delimited text with their line numbers. Lines without any
/// content are skipped.
fn read_records(input_content: &str, delimiter: char) -> Result<Vec<(u64, StringRecord)>> {
    if !delimiter.is_ascii() {
        bail!("delimiter {:?} is not an ASCII character", delimiter);
    }
    let mut reader = ReaderBuilder::new()
        .delimiter(delimiter as u8)
        .has_headers(false)
        .flexible(true)
        .trim(Trim::All)
        .from_reader(input_content.as_bytes());
    let mut records = Vec::new();
    for result in reader.records() {
        let record = result.map_err(|e| anyhow!("Failed to read delimited input: {}", e))?;
        if record.iter().all(str::is_empty) {
            continue;
        }
        let line = record.position().map_or(0, |p| p.line());
        records.push((line, record));
    }
    Ok(records)
}

/// Reads delimited text whose first non-empty line is the header and
/// writes it as a styled table workbook.
pub fn run_table_export(
    input_content: &str,
    output_writer: &mut dyn Write,
    options: &TableExportOptions,
    designer_options: DesignerOptions,
) -> Result<()> {
    let all_records = read_records(input_content, options.delimiter)?;
    let ((_, header_record), records) = all_records
        .split_first()
        .ok_or_else(|| anyhow!("Input has no header line"))?;
    let headers: Vec<&str> = header_record.iter().collect();
    if let Some((line, fields)) = records.iter().find(|(_, f)| f.len() > headers.len()) {
        bail!(
            "line {} has {} fields but the header has {}",
            line,
            fields.len(),
            headers.len()
        );
    }

    let column_types: Vec<DataType> = (0..headers.len())
        .map(|i| {
            let data_type = options.column_types.get(i).cloned().unwrap_or_else(|| {
                infer_type(records.iter().map(|(_, f)| f.get(i).unwrap_or("")))
            });
            with_negative(data_type, options.negative)
        })
        .collect();

    let columns = headers
        .iter()
        .zip(&column_types)
        .enumerate()
        .map(|(i, (header, data_type))| {
            let mut column = TableColumnDesign::new(header);
            if *data_type != DataType::General {
                column = column.with_data_type(data_type.clone());
            }
            if options.totals {
                if is_numeric(data_type) {
                    column = column.with_total(TotalFunction::Sum);
                } else if i == 0 {
                    column = column.with_total_label("Total");
                }
            }
            column
        })
        .collect();
    let mut table = TableDesign::new(columns);
    table.preset = options.table_style;
    table.autofilter = options.table_style != TableStylePreset::None;
    for (line, fields) in records.iter() {
        let row = column_types
            .iter()
            .enumerate()
            .map(|(i, data_type)| parse_value(fields.get(i).unwrap_or(""), data_type, *line))
            .collect::<Result<Vec<_>>>()?;
        table.add_row(row);
    }

    let sheet = options.sheet_name.as_str();
    let mut designer = WorkbookDesigner::new(designer_options)?;
    designer.insert(InsertWorksheet::new(sheet))?;

    let mut at = CellRef { row: 0, col: 0 };
    if let Some(title) = &options.title {
        let font = FontDesign {
            size: Some(14.0),
            ..FontDesign::bold()
        };
        let mut text = TextDesign::new(title.as_str()).with_style(CellStyle::new().with_font(font));
        if headers.len() > 1 {
            let last = ColNum::try_from(headers.len() - 1)
                .map_err(|_| anyhow!("Input has too many columns: {}", headers.len()))?;
            text = text.merged_to(CellRef { row: 0, col: last });
        }
        designer.insert(InsertText::new(sheet, at, text))?;
        at = CellRef { row: 2, col: 0 };
    }
    let layout = designer.insert(InsertTable::new(sheet, at, table))?;
    designer.set(SetSheetOptions::new(
        sheet,
        SheetOptions {
            autofit: true,
            ..Default::default()
        },
    ))?;
    if options.freeze_header {
        if let Some(header) = layout.header {
            designer.set(SetFreezePanes::new(
                sheet,
                CellRef {
                    row: header.first.row + 1,
                    col: 0,
                },
            ))?;
        }
    }

    if let Some(kind) = options.chart {
        let mut chart = ChartDesign::new(kind);
        chart.title = options.title.clone();
        let categories = if is_numeric(&column_types[0]) {
            None
        } else {
            layout.column(0)
        };
        for (i, data_type) in column_types.iter().enumerate() {
            if !is_numeric(data_type) {
                continue;
            }
            let Some(values) = layout.column(i as ColNum) else {
                continue;
            };
            let mut series = SeriesDesign::new(values).with_name(headers[i]);
            series.categories = categories.clone();
            chart.add_series(series);
        }
        if chart.series.is_empty() {
            bail!("--chart needs at least one numeric column with data");
        }
        let anchor = CellRef {
            row: layout.range.first.row,
            col: layout.range.last.col + 2,
        };
        designer.insert(InsertChart::new(sheet, anchor, chart))?;
    }

    let result = designer.create_result();
    if !result.is_success() {
        let messages: Vec<String> = result.errors.iter().map(|e| e.to_string()).collect();
        bail!("Failed to create workbook: {}", messages.join("; "));
    }
    let content = result
        .content
        .ok_or_else(|| anyhow!("Workbook was not rendered"))?;
    output_writer.write_all(&content)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::number_format::DateStyle;
    use crate::ooxml::package::Package;
    use tempfile::NamedTempFile;

    const INPUT: &str = "Region,Units,Revenue\nNorth,12,1500.5\nSouth,8,-320\n\nWest,,990\n";

    fn export(options: &TableExportOptions) -> Result<Vec<u8>> {
        let mut buffer = Vec::new();
        run_table_export(INPUT, &mut buffer, options, DesignerOptions::default())?;
        Ok(buffer)
    }

    #[test]
    fn test_infer_type() {
        assert_eq!(infer_type(["1", "2", ""].into_iter()), DataType::number(0));
        assert_eq!(infer_type(["1", "2.5"].into_iter()), DataType::number(2));
        assert_eq!(infer_type(["1", "x"].into_iter()), DataType::General);
        assert_eq!(infer_type(["", " "].into_iter()), DataType::General);
    }

    #[test]
    fn test_parse_value() -> Result<()> {
        assert_eq!(parse_value("12.5%", &DataType::percent(1), 2)?, CellValue::Number(0.125));
        assert_eq!(parse_value("007", &DataType::Text, 2)?, CellValue::text("007"));
        assert_eq!(
            parse_value("2024-05-01", &DataType::Date(DateStyle::Short), 3)?,
            CellValue::Date(NaiveDate::from_ymd_opt(2024, 5, 1).unwrap())
        );
        let err = parse_value("n/a", &DataType::number(0), 7).unwrap_err();
        assert_eq!(err.to_string(), "line 7: \"n/a\" is not a number");
        Ok(())
    }

    #[test]
    fn test_table_export() -> Result<()> {
        let options = TableExportOptions {
            title: Some("Sales".to_string()),
            totals: true,
            negative: NegativeNumberStyle::RedParentheses,
            ..Default::default()
        };
        let bytes = export(&options)?;

        let temp_file = NamedTempFile::with_suffix(".xlsx").unwrap();
        std::fs::write(temp_file.path(), &bytes)?;
        let book = umya_spreadsheet::reader::xlsx::read(temp_file.path()).unwrap();
        let sheet = book.get_sheet(&0).unwrap();
        assert_eq!(sheet.get_name(), "Sheet1");
        assert_eq!(sheet.get_value((1, 1)).as_str(), "Sales");
        assert_eq!(sheet.get_value((1, 3)).as_str(), "Region");
        assert_eq!(sheet.get_value((3, 5)).as_str(), "-320");
        assert_eq!(sheet.get_value((1, 6)).as_str(), "West");
        assert_eq!(sheet.get_value((2, 6)).as_str(), "");
        assert_eq!(sheet.get_value((1, 7)).as_str(), "Total");
        assert!(sheet.get_cell((3, 7)).unwrap().get_formula().contains("SUBTOTAL(109"));

        let package = Package::from_bytes(&bytes)?;
        let styles = package.part_str("xl/styles.xml")?;
        assert!(styles.contains("#,##0.00_);[Red](#,##0.00)"));
        Ok(())
    }

    #[test]
    fn test_table_export_with_chart() -> Result<()> {
        let options = TableExportOptions {
            chart: Some(ChartKind::Column),
            freeze_header: true,
            ..Default::default()
        };
        let bytes = export(&options)?;
        let package = Package::from_bytes(&bytes)?;
        let chart = package.part_str("xl/charts/chart1.xml")?;
        assert_eq!(chart.matches("<c:ser>").count(), 2);
        assert!(chart.contains("Sheet1!$C$2:$C$4"));
        assert!(chart.contains("Sheet1!$A$2:$A$4"));
        Ok(())
    }

    #[test]
    fn test_rejects_bad_input() {
        let mut buffer = Vec::new();
        let options = TableExportOptions::default();
        let err = run_table_export("", &mut buffer, &options, DesignerOptions::default())
            .unwrap_err();
        assert_eq!(err.to_string(), "Input has no header line");

        let err = run_table_export("a,b\n1,2,3\n", &mut buffer, &options, DesignerOptions::default())
            .unwrap_err();
        assert_eq!(err.to_string(), "line 2 has 3 fields but the header has 2");
        assert!(buffer.is_empty());
    }

    #[test]
    fn test_quoted_fields() -> Result<()> {
        let input = "Name;Amount\n\"Smith; J\";10\n\n\"Line\nbreak \"\"quoted\"\"\";20\n";
        let options = TableExportOptions {
            delimiter: ';',
            ..Default::default()
        };
        let mut bytes = Vec::new();
        run_table_export(input, &mut bytes, &options, DesignerOptions::default())?;

        let temp_file = NamedTempFile::with_suffix(".xlsx").unwrap();
        std::fs::write(temp_file.path(), &bytes)?;
        let book = umya_spreadsheet::reader::xlsx::read(temp_file.path()).unwrap();
        let sheet = book.get_sheet(&0).unwrap();
        assert_eq!(sheet.get_value((1, 2)).as_str(), "Smith; J");
        assert_eq!(sheet.get_value((2, 2)).as_str(), "10");
        assert_eq!(sheet.get_value((1, 3)).as_str(), "Line\nbreak \"quoted\"");
        assert_eq!(sheet.get_value((2, 3)).as_str(), "20");
        Ok(())
    }

    #[test]
    fn test_line_numbers_follow_input() {
        let input = "Name,Amount\n\"Smith, J\",10\n\n\"Doe, A\",n/a\n";
        let options = TableExportOptions {
            column_types: vec![DataType::Text, DataType::number(0)],
            ..Default::default()
        };
        let mut buffer = Vec::new();
        let err = run_table_export(input, &mut buffer, &options, DesignerOptions::default())
            .unwrap_err();
        assert_eq!(err.to_string(), "line 4: \"n/a\" is not a number");

        let options = TableExportOptions {
            delimiter: '§',
            ..Default::default()
        };
        assert!(run_table_export(input, &mut buffer, &options, DesignerOptions::default()).is_err());
        assert!(buffer.is_empty());
    }
}
