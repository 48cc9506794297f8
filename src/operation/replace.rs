use std::collections::BTreeMap;

use regex::{NoExpand, Regex};
use rust_xlsxwriter::ColNum;

use crate::design::{CellStyle, CellValue};
use crate::document::Document;
use crate::error::{DesignError, Result};
use crate::operation::{target_sheets, Operation, Replace};
use crate::reference::{CellRange, CellRef, MAX_COLUMNS, MAX_ROWS};

/// Replaces text in text cells. Returns the number of cells changed.
#[derive(Debug, Clone)]
pub struct ReplaceText {
    /// Limits the search to one sheet; all sheets when unset.
    pub sheet: Option<String>,
    pub find: String,
    pub replacement: String,
    pub match_case: bool,
    /// Only cells whose whole text equals `find` are replaced.
    pub whole_cell: bool,
}

impl ReplaceText {
    pub fn new(find: &str, replacement: &str) -> Self {
        ReplaceText {
            sheet: None,
            find: find.to_string(),
            replacement: replacement.to_string(),
            match_case: true,
            whole_cell: false,
        }
    }

    pub fn in_sheet(mut self, sheet: &str) -> Self {
        self.sheet = Some(sheet.to_string());
        self
    }

    pub fn ignore_case(mut self) -> Self {
        self.match_case = false;
        self
    }

    pub fn whole_cell(mut self) -> Self {
        self.whole_cell = true;
        self
    }

    fn replace(&self, text: &str, pattern: &Regex) -> Option<String> {
        if self.whole_cell {
            let equal = if self.match_case {
                text == self.find
            } else {
                text.to_lowercase() == self.find.to_lowercase()
            };
            return equal.then(|| self.replacement.clone());
        }
        pattern
            .is_match(text)
            .then(|| pattern.replace_all(text, NoExpand(&self.replacement)).into_owned())
    }
}

impl Operation for ReplaceText {
    type Output = usize;

    fn name(&self) -> &'static str {
        "replace_text"
    }

    fn apply(&self, document: &mut Document) -> Result<usize> {
        if self.find.is_empty() {
            return Err(DesignError::InvalidDesign(
                "the text to find is empty".to_string(),
            ));
        }
        let flags = if self.match_case { "" } else { "(?i)" };
        let pattern = Regex::new(&format!("{}{}", flags, regex::escape(&self.find)))
            .map_err(|e| DesignError::InvalidDesign(e.to_string()))?;

        let mut count = 0;
        for sheet in target_sheets(document, &self.sheet)? {
            for (_, cell) in sheet.cells_mut() {
                let Some(text) = cell.value.as_text() else {
                    continue;
                };
                if let Some(replaced) = self.replace(text, &pattern) {
                    cell.value = CellValue::Text(replaced);
                    count += 1;
                }
            }
        }
        Ok(count)
    }
}

impl Replace for ReplaceText {}

/// Fills `{{name}}` placeholders in text cells and text-box shapes.
///
/// A cell holding nothing but one placeholder takes the typed value, so a
/// number stays a number. Placeholders inside longer text are replaced by
/// the value's text form. Unknown names are left in place. Returns the
/// number of cells and shapes changed.
#[derive(Debug, Clone)]
pub struct ReplacePlaceholders {
    pub sheet: Option<String>,
    pub values: BTreeMap<String, CellValue>,
    pub open: String,
    pub close: String,
}

impl Default for ReplacePlaceholders {
    fn default() -> Self {
        ReplacePlaceholders {
            sheet: None,
            values: BTreeMap::new(),
            open: "{{".to_string(),
            close: "}}".to_string(),
        }
    }
}

impl ReplacePlaceholders {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_value(mut self, name: &str, value: impl Into<CellValue>) -> Self {
        self.values.insert(name.to_string(), value.into());
        self
    }

    pub fn with_delimiters(mut self, open: &str, close: &str) -> Self {
        self.open = open.to_string();
        self.close = close.to_string();
        self
    }

    pub fn in_sheet(mut self, sheet: &str) -> Self {
        self.sheet = Some(sheet.to_string());
        self
    }

    fn pattern(&self) -> Result<Regex> {
        if self.open.is_empty() || self.close.is_empty() {
            return Err(DesignError::InvalidDesign(
                "placeholder delimiters must not be empty".to_string(),
            ));
        }
        Regex::new(&format!(
            r"{}\s*([A-Za-z_][A-Za-z0-9_.\-]*)\s*{}",
            regex::escape(&self.open),
            regex::escape(&self.close)
        ))
        .map_err(|e| DesignError::InvalidDesign(e.to_string()))
    }

    /// The value for a cell that is exactly one known placeholder.
    fn whole_value(&self, text: &str, pattern: &Regex) -> Option<CellValue> {
        let trimmed = text.trim();
        let captures = pattern.captures(trimmed)?;
        if captures.get(0)?.as_str().len() != trimmed.len() {
            return None;
        }
        self.values.get(&captures[1]).cloned()
    }

    fn substitute(&self, text: &str, pattern: &Regex) -> Option<String> {
        let replaced = pattern.replace_all(text, |captures: &regex::Captures| {
            self.values
                .get(&captures[1])
                .map_or_else(|| captures[0].to_string(), CellValue::display_text)
        });
        (replaced != text).then(|| replaced.into_owned())
    }
}

impl Operation for ReplacePlaceholders {
    type Output = usize;

    fn name(&self) -> &'static str {
        "replace_placeholders"
    }

    fn apply(&self, document: &mut Document) -> Result<usize> {
        let pattern = self.pattern()?;
        let mut count = 0;
        for sheet in target_sheets(document, &self.sheet)? {
            for (_, cell) in sheet.cells_mut() {
                let Some(text) = cell.value.as_text() else {
                    continue;
                };
                if let Some(value) = self.whole_value(text, &pattern) {
                    cell.value = value;
                    count += 1;
                } else if let Some(replaced) = self.substitute(text, &pattern) {
                    cell.value = CellValue::Text(replaced);
                    count += 1;
                }
            }
            for shape in sheet.shapes_mut() {
                if let Some(replaced) = self.substitute(&shape.design.text, &pattern) {
                    shape.design.text = replaced;
                    count += 1;
                }
            }
        }
        Ok(count)
    }
}

impl Replace for ReplacePlaceholders {}

/// Overwrites a block of cells starting at `at` with new values.
#[derive(Debug, Clone)]
pub struct ReplaceRange {
    pub sheet: String,
    pub at: CellRef,
    pub rows: Vec<Vec<CellValue>>,
    /// Keep each cell's style; otherwise styles in the block are cleared.
    pub keep_style: bool,
}

impl ReplaceRange {
    pub fn new(sheet: &str, at: CellRef, rows: Vec<Vec<CellValue>>) -> Self {
        ReplaceRange {
            sheet: sheet.to_string(),
            at,
            rows,
            keep_style: true,
        }
    }
}

impl Operation for ReplaceRange {
    type Output = CellRange;

    fn name(&self) -> &'static str {
        "replace_range"
    }

    fn apply(&self, document: &mut Document) -> Result<CellRange> {
        let width = self.rows.iter().map(Vec::len).max().unwrap_or(0);
        if width == 0 {
            return Err(DesignError::InvalidDesign(
                "replacement block is empty".to_string(),
            ));
        }
        let too_large = || {
            DesignError::InvalidReference(format!(
                "a {}x{} block does not fit in a worksheet",
                self.rows.len(),
                width
            ))
        };
        let columns = ColNum::try_from(width)
            .ok()
            .filter(|c| *c <= MAX_COLUMNS)
            .ok_or_else(too_large)?;
        let height = u32::try_from(self.rows.len())
            .ok()
            .filter(|r| *r <= MAX_ROWS)
            .ok_or_else(too_large)?;
        let last = self.at.offset(height - 1, columns - 1)?;
        let range = CellRange::new(self.at, last);
        let sheet = document.sheet_mut(&self.sheet)?;
        for (r, row) in self.rows.iter().enumerate() {
            for c in 0..width {
                let at = self.at.offset(r as u32, c as ColNum)?;
                let value = row.get(c).cloned().unwrap_or_default();
                if self.keep_style {
                    sheet.set_value(at, value);
                } else {
                    sheet.set_cell(at, value, CellStyle::default());
                }
            }
        }
        Ok(range)
    }
}

impl Replace for ReplaceRange {}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::design::{FontDesign, ShapeDesign};

    fn cell(text: &str) -> CellRef {
        CellRef::parse(text).unwrap()
    }

    fn document() -> Document {
        let mut doc = Document::new();
        let sheet = doc.add_sheet("Report").unwrap();
        sheet.set_value(cell("A1"), "Sales for {{ region }}".into());
        sheet.set_value(cell("A2"), "{{total}}".into());
        sheet.set_value(cell("A3"), "{{unknown}}".into());
        sheet.set_value(cell("A4"), "North and north".into());
        sheet.set_value(cell("B4"), 7.0.into());
        sheet
            .add_shape(cell("D1"), ShapeDesign::text_box("Prepared by {{author}}"))
            .unwrap();
        doc.add_sheet("Notes").unwrap().set_value(cell("A1"), "north".into());
        doc
    }

    #[test]
    fn test_replace_text_substring() -> Result<()> {
        let mut doc = document();
        let count = ReplaceText::new("north", "South").apply(&mut doc)?;
        assert_eq!(count, 2);
        assert_eq!(
            doc.require_sheet("Report")?.value(cell("A4")),
            &CellValue::text("North and South")
        );

        let count = ReplaceText::new("SOUTH", "$0")
            .ignore_case()
            .in_sheet("Report")
            .apply(&mut doc)?;
        assert_eq!(count, 1);
        assert_eq!(
            doc.require_sheet("Report")?.value(cell("A4")),
            &CellValue::text("North and $0")
        );
        Ok(())
    }

    #[test]
    fn test_replace_text_whole_cell() -> Result<()> {
        let mut doc = document();
        let count = ReplaceText::new("NORTH", "N")
            .ignore_case()
            .whole_cell()
            .apply(&mut doc)?;
        assert_eq!(count, 1);
        assert_eq!(doc.require_sheet("Notes")?.value(cell("A1")), &CellValue::text("N"));
        assert!(ReplaceText::new("", "x").apply(&mut doc).is_err());
        Ok(())
    }

    #[test]
    fn test_placeholders() -> Result<()> {
        let mut doc = document();
        let count = ReplacePlaceholders::new()
            .with_value("region", "West")
            .with_value("total", 1250.5)
            .with_value("author", "Finance")
            .apply(&mut doc)?;
        assert_eq!(count, 3);
        let sheet = doc.require_sheet("Report")?;
        assert_eq!(sheet.value(cell("A1")), &CellValue::text("Sales for West"));
        assert_eq!(sheet.value(cell("A2")), &CellValue::Number(1250.5));
        assert_eq!(sheet.value(cell("A3")), &CellValue::text("{{unknown}}"));
        assert_eq!(
            sheet.shapes().next().map(|s| s.design.text.as_str()),
            Some("Prepared by Finance")
        );
        Ok(())
    }

    #[test]
    fn test_placeholder_delimiters() -> Result<()> {
        let mut doc = Document::new();
        doc.add_sheet("Sheet1")?
            .set_value(cell("A1"), "Total: <<sum>> ({{sum}})".into());
        let count = ReplacePlaceholders::new()
            .with_delimiters("<<", ">>")
            .with_value("sum", 10i64)
            .apply(&mut doc)?;
        assert_eq!(count, 1);
        assert_eq!(
            doc.require_sheet("Sheet1")?.value(cell("A1")),
            &CellValue::text("Total: 10 ({{sum}})")
        );
        Ok(())
    }

    #[test]
    fn test_replace_range() -> Result<()> {
        let mut doc = document();
        let bold = CellStyle::new().with_font(FontDesign::bold());
        *doc.sheet_mut("Report")?.style_mut(cell("B4")) = bold.clone();

        let rows = vec![vec![1.0.into(), 2.0.into()], vec![3.0.into()]];
        let range = ReplaceRange::new("Report", cell("A4"), rows.clone()).apply(&mut doc)?;
        assert_eq!(range.to_string(), "A4:B5");
        let sheet = doc.require_sheet("Report")?;
        assert_eq!(sheet.value(cell("B4")), &CellValue::Number(2.0));
        assert_eq!(sheet.value(cell("B5")), &CellValue::Empty);
        assert_eq!(sheet.cell(cell("B4")).map(|c| &c.style), Some(&bold));

        let mut clearing = ReplaceRange::new("Report", cell("A4"), rows);
        clearing.keep_style = false;
        clearing.apply(&mut doc)?;
        assert!(doc.require_sheet("Report")?.cell(cell("B4")).unwrap().style.is_empty());
        Ok(())
    }

    #[test]
    fn test_replace_range_wider_than_sheet() -> Result<()> {
        let mut doc = document();
        let row = vec![CellValue::Number(1.0); 65_536];
        let err = ReplaceRange::new("Report", cell("A1"), vec![row])
            .apply(&mut doc)
            .unwrap_err();
        assert!(matches!(err, DesignError::InvalidReference(_)));

        let row = vec![CellValue::Number(1.0); 3];
        assert!(ReplaceRange::new("Report", cell("XFC1"), vec![row])
            .apply(&mut doc)
            .is_err());
        Ok(())
    }
}
