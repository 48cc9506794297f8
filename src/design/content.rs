use chrono::{NaiveDate, NaiveDateTime, NaiveTime};

use crate::design::style::CellStyle;
use crate::number_format::{DataType, DateStyle, TimeStyle};
use crate::reference::CellRef;

/// A typed cell value.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum CellValue {
    #[default]
    Empty,
    Text(String),
    Number(f64),
    Bool(bool),
    /// A formula, with or without the leading `=`.
    Formula(String),
    Date(NaiveDate),
    DateTime(NaiveDateTime),
    Time(NaiveTime),
}

impl CellValue {
    pub fn text(value: &str) -> Self {
        CellValue::Text(value.to_string())
    }

    pub fn is_empty(&self) -> bool {
        matches!(self, CellValue::Empty)
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            CellValue::Text(s) => Some(s),
            _ => None,
        }
    }

    /// Plain text form used when a value is spliced into a longer string.
    pub fn display_text(&self) -> String {
        match self {
            CellValue::Empty => String::new(),
            CellValue::Text(s) | CellValue::Formula(s) => s.clone(),
            CellValue::Number(n) => n.to_string(),
            CellValue::Bool(true) => "TRUE".to_string(),
            CellValue::Bool(false) => "FALSE".to_string(),
            CellValue::Date(d) => d.format("%Y-%m-%d").to_string(),
            CellValue::DateTime(dt) => dt.format("%Y-%m-%d %H:%M:%S").to_string(),
            CellValue::Time(t) => t.format("%H:%M:%S").to_string(),
        }
    }

    /// The format used when the cell's style does not name a data type.
    /// Dates would otherwise show up as serial numbers.
    pub fn implied_data_type(&self) -> Option<DataType> {
        match self {
            CellValue::Date(_) => Some(DataType::Date(DateStyle::Short)),
            CellValue::DateTime(_) => Some(DataType::DateTime),
            CellValue::Time(_) => Some(DataType::Time(TimeStyle::Long)),
            _ => None,
        }
    }
}

impl From<&str> for CellValue {
    fn from(value: &str) -> Self {
        CellValue::Text(value.to_string())
    }
}

impl From<String> for CellValue {
    fn from(value: String) -> Self {
        CellValue::Text(value)
    }
}

impl From<f64> for CellValue {
    fn from(value: f64) -> Self {
        CellValue::Number(value)
    }
}

impl From<i64> for CellValue {
    fn from(value: i64) -> Self {
        CellValue::Number(value as f64)
    }
}

impl From<bool> for CellValue {
    fn from(value: bool) -> Self {
        CellValue::Bool(value)
    }
}

impl From<NaiveDate> for CellValue {
    fn from(value: NaiveDate) -> Self {
        CellValue::Date(value)
    }
}

impl From<NaiveDateTime> for CellValue {
    fn from(value: NaiveDateTime) -> Self {
        CellValue::DateTime(value)
    }
}

/// A value with its style, optionally merged across a block of cells.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct TextDesign {
    pub value: CellValue,
    pub style: CellStyle,
    /// Bottom-right corner of the merged block starting at the anchor cell.
    pub merge_to: Option<CellRef>,
}

impl TextDesign {
    pub fn new(value: impl Into<CellValue>) -> Self {
        TextDesign {
            value: value.into(),
            ..Default::default()
        }
    }

    pub fn with_style(mut self, style: CellStyle) -> Self {
        self.style = style;
        self
    }

    pub fn merged_to(mut self, last: CellRef) -> Self {
        self.merge_to = Some(last);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_implied_data_type() {
        let date = NaiveDate::from_ymd_opt(2024, 2, 29).unwrap();
        assert_eq!(
            CellValue::from(date).implied_data_type(),
            Some(DataType::Date(DateStyle::Short))
        );
        assert_eq!(CellValue::from(1.5).implied_data_type(), None);
    }

    #[test]
    fn test_conversions() {
        assert_eq!(CellValue::from("x"), CellValue::Text("x".to_string()));
        assert_eq!(CellValue::from(3i64), CellValue::Number(3.0));
        assert_eq!(CellValue::from("x").as_text(), Some("x"));
        assert!(CellValue::default().is_empty());
    }

    #[test]
    fn test_display_text() {
        assert_eq!(CellValue::from(3.0).display_text(), "3");
        assert_eq!(CellValue::from(2.5).display_text(), "2.5");
        assert_eq!(CellValue::from(true).display_text(), "TRUE");
        let date = NaiveDate::from_ymd_opt(2024, 7, 1).unwrap();
        assert_eq!(CellValue::from(date).display_text(), "2024-07-01");
    }
}
