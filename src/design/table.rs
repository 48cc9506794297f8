use crate::design::content::CellValue;
use crate::design::style::{BorderDesign, BorderLine, BorderStyle, CellStyle, FontDesign};
use crate::error::{DesignError, Result};
use crate::number_format::DataType;
use crate::reference::MAX_COLUMNS;

/// Aggregate shown in a table's total row.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TotalFunction {
    Sum,
    Average,
    Count,
    CountNumbers,
    Max,
    Min,
    StdDev,
    Var,
}

impl TotalFunction {
    /// Function number for `SUBTOTAL` that ignores hidden rows.
    pub fn subtotal_code(self) -> u32 {
        match self {
            TotalFunction::Average => 101,
            TotalFunction::CountNumbers => 102,
            TotalFunction::Count => 103,
            TotalFunction::Max => 104,
            TotalFunction::Min => 105,
            TotalFunction::StdDev => 107,
            TotalFunction::Sum => 109,
            TotalFunction::Var => 110,
        }
    }
}

/// Built-in Excel table styles.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TableStylePreset {
    /// Plain cells styled only by the design; no Excel table is created.
    #[default]
    None,
    Light(u8),
    Medium(u8),
    Dark(u8),
}

impl TableStylePreset {
    pub fn validate(&self) -> Result<()> {
        let (name, n, max) = match *self {
            TableStylePreset::None => return Ok(()),
            TableStylePreset::Light(n) => ("Light", n, 21),
            TableStylePreset::Medium(n) => ("Medium", n, 28),
            TableStylePreset::Dark(n) => ("Dark", n, 11),
        };
        if n == 0 || n > max {
            return Err(DesignError::InvalidDesign(format!(
                "table style {}{} does not exist (1 to {})",
                name, n, max
            )));
        }
        Ok(())
    }
}

impl std::str::FromStr for TableStylePreset {
    type Err = DesignError;

    /// Accepts `none`, `Medium9`, `TableStyleLight1` and similar.
    fn from_str(s: &str) -> Result<Self> {
        let raw = s.trim();
        let token = raw.strip_prefix("TableStyle").unwrap_or(raw).to_ascii_lowercase();
        if token == "none" || token.is_empty() {
            return Ok(TableStylePreset::None);
        }
        let split = token
            .find(|c: char| c.is_ascii_digit())
            .ok_or_else(|| DesignError::InvalidDesign(format!("unknown table style: {}", s)))?;
        let (name, number) = token.split_at(split);
        let n: u8 = number
            .parse()
            .map_err(|_| DesignError::InvalidDesign(format!("unknown table style: {}", s)))?;
        let preset = match name {
            "light" => TableStylePreset::Light(n),
            "medium" => TableStylePreset::Medium(n),
            "dark" => TableStylePreset::Dark(n),
            _ => {
                return Err(DesignError::InvalidDesign(format!(
                    "unknown table style: {}",
                    s
                )))
            }
        };
        preset.validate()?;
        Ok(preset)
    }
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct TableColumnDesign {
    pub header: String,
    pub data_type: Option<DataType>,
    /// Layered over the table's body style.
    pub style: Option<CellStyle>,
    pub width: Option<f64>,
    pub total: Option<TotalFunction>,
    /// Text shown in the total row instead of a function.
    pub total_label: Option<String>,
}

impl TableColumnDesign {
    pub fn new(header: &str) -> Self {
        TableColumnDesign {
            header: header.to_string(),
            ..Default::default()
        }
    }

    pub fn with_data_type(mut self, data_type: DataType) -> Self {
        self.data_type = Some(data_type);
        self
    }

    pub fn with_total(mut self, total: TotalFunction) -> Self {
        self.total = Some(total);
        self
    }

    pub fn with_total_label(mut self, label: &str) -> Self {
        self.total_label = Some(label.to_string());
        self
    }

    pub fn with_width(mut self, width: f64) -> Self {
        self.width = Some(width);
        self
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct TableDesign {
    /// Excel table name; generated when a preset is used and this is unset.
    pub name: Option<String>,
    pub columns: Vec<TableColumnDesign>,
    pub rows: Vec<Vec<CellValue>>,
    pub show_header: bool,
    pub header_style: CellStyle,
    pub body_style: CellStyle,
    pub total_style: CellStyle,
    pub preset: TableStylePreset,
    pub autofilter: bool,
    pub banded_rows: bool,
}

impl Default for TableDesign {
    /// Bold headers with a thin grid, as a plain-cell table.
    fn default() -> Self {
        let grid = BorderDesign::around(BorderLine::new(BorderStyle::Thin));
        TableDesign {
            name: None,
            columns: Vec::new(),
            rows: Vec::new(),
            show_header: true,
            header_style: CellStyle::new().with_font(FontDesign::bold()).with_border(grid),
            body_style: CellStyle::new().with_border(grid),
            total_style: CellStyle::new().with_font(FontDesign::bold()).with_border(grid),
            preset: TableStylePreset::None,
            autofilter: false,
            banded_rows: true,
        }
    }
}

impl TableDesign {
    pub fn new(columns: Vec<TableColumnDesign>) -> Self {
        TableDesign {
            columns,
            ..Default::default()
        }
    }

    pub fn add_row(&mut self, row: Vec<CellValue>) {
        self.rows.push(row);
    }

    pub fn has_total_row(&self) -> bool {
        self.columns
            .iter()
            .any(|c| c.total.is_some() || c.total_label.is_some())
    }

    pub fn validate(&self) -> Result<()> {
        if self.columns.is_empty() {
            return Err(DesignError::InvalidDesign(
                "a table needs at least one column".to_string(),
            ));
        }
        if self.columns.len() > usize::from(MAX_COLUMNS) {
            return Err(DesignError::InvalidDesign(format!(
                "a table has at most {} columns, not {}",
                MAX_COLUMNS,
                self.columns.len()
            )));
        }
        let mut headers: Vec<String> = Vec::new();
        for column in &self.columns {
            let key = column.header.trim().to_lowercase();
            if self.preset != TableStylePreset::None && key.is_empty() {
                return Err(DesignError::InvalidDesign(
                    "table columns need a header when a table style is used".to_string(),
                ));
            }
            if !key.is_empty() && headers.contains(&key) {
                return Err(DesignError::InvalidDesign(format!(
                    "duplicate table column header: {}",
                    column.header
                )));
            }
            headers.push(key);
            if let Some(data_type) = &column.data_type {
                data_type.validate()?;
            }
            if let Some(style) = &column.style {
                style.validate()?;
            }
            if let Some(width) = column.width {
                if !(0.0..=255.0).contains(&width) {
                    return Err(DesignError::InvalidDesign(format!(
                        "column width {} must be between 0 and 255",
                        width
                    )));
                }
            }
        }
        for (i, row) in self.rows.iter().enumerate() {
            if row.len() > self.columns.len() {
                return Err(DesignError::InvalidDesign(format!(
                    "row {} has {} values but the table has {} columns",
                    i + 1,
                    row.len(),
                    self.columns.len()
                )));
            }
        }
        if self.preset != TableStylePreset::None && self.rows.is_empty() {
            return Err(DesignError::InvalidDesign(
                "a styled table needs at least one data row".to_string(),
            ));
        }
        if let Some(name) = &self.name {
            validate_table_name(name)?;
        }
        self.preset.validate()?;
        self.header_style.validate()?;
        self.body_style.validate()?;
        self.total_style.validate()
    }
}

/// Excel table names start with a letter or `_`, contain no spaces and
/// must not look like a cell reference.
pub fn validate_table_name(name: &str) -> Result<()> {
    let valid_start = name
        .chars()
        .next()
        .is_some_and(|c| c.is_alphabetic() || c == '_' || c == '\\');
    let valid_chars = name
        .chars()
        .all(|c| c.is_alphanumeric() || c == '_' || c == '.' || c == '\\');
    let looks_like_cell = crate::reference::CellRef::parse(name).is_ok();
    if !valid_start || !valid_chars || looks_like_cell || name.chars().count() > 255 {
        return Err(DesignError::InvalidDesign(format!(
            "invalid table name: {:?}",
            name
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_preset() -> Result<()> {
        assert_eq!("Medium9".parse::<TableStylePreset>()?, TableStylePreset::Medium(9));
        assert_eq!(
            "TableStyleLight1".parse::<TableStylePreset>()?,
            TableStylePreset::Light(1)
        );
        assert_eq!("none".parse::<TableStylePreset>()?, TableStylePreset::None);
        assert!("Dark12".parse::<TableStylePreset>().is_err());
        assert!("Shiny3".parse::<TableStylePreset>().is_err());
        Ok(())
    }

    #[test]
    fn test_validate_headers() {
        let mut table = TableDesign::new(vec![
            TableColumnDesign::new("Region"),
            TableColumnDesign::new("region"),
        ]);
        table.add_row(vec!["North".into(), 1.0.into()]);
        assert!(table.validate().is_err());

        table.columns[1].header = "Sales".to_string();
        assert!(table.validate().is_ok());

        table.add_row(vec!["a".into(), "b".into(), "c".into()]);
        assert!(table.validate().is_err());
    }

    #[test]
    fn test_table_name_rules() {
        assert!(validate_table_name("Sales_2024").is_ok());
        assert!(validate_table_name("A1").is_err());
        assert!(validate_table_name("My Table").is_err());
        assert!(validate_table_name("2024Sales").is_err());
    }

    #[test]
    fn test_total_row_detection() {
        let mut table = TableDesign::new(vec![TableColumnDesign::new("Amount")]);
        assert!(!table.has_total_row());
        table.columns[0] = TableColumnDesign::new("Amount").with_total(TotalFunction::Sum);
        assert!(table.has_total_row());
        assert_eq!(TotalFunction::Sum.subtotal_code(), 109);
    }
}
