use rust_xlsxwriter::{ColNum, RowNum};

use crate::design::{CellStyle, CellValue, Combine};
use crate::document::{Document, DocumentProperties, SheetOptions};
use crate::error::{DesignError, Result};
use crate::operation::{Operation, Set};
use crate::reference::{CellRange, CellRef};

/// Writes a value, keeping the cell's style unless a new one is given.
#[derive(Debug, Clone)]
pub struct SetCellValue {
    pub sheet: String,
    pub at: CellRef,
    pub value: CellValue,
    pub style: Option<CellStyle>,
}

impl SetCellValue {
    pub fn new(sheet: &str, at: CellRef, value: impl Into<CellValue>) -> Self {
        SetCellValue {
            sheet: sheet.to_string(),
            at,
            value: value.into(),
            style: None,
        }
    }

    pub fn with_style(mut self, style: CellStyle) -> Self {
        self.style = Some(style);
        self
    }
}

impl Operation for SetCellValue {
    type Output = ();

    fn name(&self) -> &'static str {
        "set_cell_value"
    }

    fn apply(&self, document: &mut Document) -> Result<()> {
        if let Some(style) = &self.style {
            style.validate()?;
        }
        let sheet = document.sheet_mut(&self.sheet)?;
        match &self.style {
            Some(style) => sheet.set_cell(self.at, self.value.clone(), style.clone()),
            None => sheet.set_value(self.at, self.value.clone()),
        }
        Ok(())
    }
}

impl Set for SetCellValue {}

/// How [`SetStyle`] treats the style already on a cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum StyleMode {
    /// Discard the existing style.
    Replace,
    /// Fields set on the new style win; the rest are kept.
    #[default]
    Combine,
}

#[derive(Debug, Clone)]
pub struct SetStyle {
    pub sheet: String,
    pub range: CellRange,
    pub style: CellStyle,
    pub mode: StyleMode,
}

impl SetStyle {
    pub fn new(sheet: &str, range: CellRange, style: CellStyle) -> Self {
        SetStyle {
            sheet: sheet.to_string(),
            range,
            style,
            mode: StyleMode::default(),
        }
    }

    pub fn replacing(mut self) -> Self {
        self.mode = StyleMode::Replace;
        self
    }
}

impl Operation for SetStyle {
    type Output = ();

    fn name(&self) -> &'static str {
        "set_style"
    }

    fn apply(&self, document: &mut Document) -> Result<()> {
        self.style.validate()?;
        let sheet = document.sheet_mut(&self.sheet)?;
        for at in self.range.cells() {
            let current = sheet.style_mut(at);
            *current = match self.mode {
                StyleMode::Replace => self.style.clone(),
                StyleMode::Combine => self.style.combine(current),
            };
        }
        Ok(())
    }
}

impl Set for SetStyle {}

/// Sets the width of columns `first..=last`, in character units.
#[derive(Debug, Clone)]
pub struct SetColumnWidth {
    pub sheet: String,
    pub first: ColNum,
    pub last: ColNum,
    pub width: f64,
}

impl SetColumnWidth {
    pub fn new(sheet: &str, col: ColNum, width: f64) -> Self {
        SetColumnWidth {
            sheet: sheet.to_string(),
            first: col,
            last: col,
            width,
        }
    }

    pub fn through(mut self, last: ColNum) -> Self {
        self.last = last;
        self
    }
}

impl Operation for SetColumnWidth {
    type Output = ();

    fn name(&self) -> &'static str {
        "set_column_width"
    }

    fn apply(&self, document: &mut Document) -> Result<()> {
        if self.last < self.first {
            return Err(DesignError::InvalidReference(format!(
                "column span {}..{} is reversed",
                self.first, self.last
            )));
        }
        let sheet = document.sheet_mut(&self.sheet)?;
        for col in self.first..=self.last {
            CellRef::new(0, col)?;
            sheet.set_column_width(col, self.width)?;
        }
        Ok(())
    }
}

impl Set for SetColumnWidth {}

/// Sets the height of rows `first..=last`, in points.
#[derive(Debug, Clone)]
pub struct SetRowHeight {
    pub sheet: String,
    pub first: RowNum,
    pub last: RowNum,
    pub height: f64,
}

impl SetRowHeight {
    pub fn new(sheet: &str, row: RowNum, height: f64) -> Self {
        SetRowHeight {
            sheet: sheet.to_string(),
            first: row,
            last: row,
            height,
        }
    }

    pub fn through(mut self, last: RowNum) -> Self {
        self.last = last;
        self
    }
}

impl Operation for SetRowHeight {
    type Output = ();

    fn name(&self) -> &'static str {
        "set_row_height"
    }

    fn apply(&self, document: &mut Document) -> Result<()> {
        if self.last < self.first {
            return Err(DesignError::InvalidReference(format!(
                "row span {}..{} is reversed",
                self.first, self.last
            )));
        }
        let sheet = document.sheet_mut(&self.sheet)?;
        for row in self.first..=self.last {
            CellRef::new(row, 0)?;
            sheet.set_row_height(row, self.height)?;
        }
        Ok(())
    }
}

impl Set for SetRowHeight {}

#[derive(Debug, Clone)]
pub struct SetMergedCells {
    pub sheet: String,
    pub range: CellRange,
}

impl SetMergedCells {
    pub fn new(sheet: &str, range: CellRange) -> Self {
        SetMergedCells {
            sheet: sheet.to_string(),
            range,
        }
    }
}

impl Operation for SetMergedCells {
    type Output = ();

    fn name(&self) -> &'static str {
        "set_merged_cells"
    }

    fn apply(&self, document: &mut Document) -> Result<()> {
        document.sheet_mut(&self.sheet)?.add_merge(self.range)
    }
}

impl Set for SetMergedCells {}

/// Freezes rows above and columns left of `at`; `None` unfreezes.
#[derive(Debug, Clone)]
pub struct SetFreezePanes {
    pub sheet: String,
    pub at: Option<CellRef>,
}

impl SetFreezePanes {
    pub fn new(sheet: &str, at: CellRef) -> Self {
        SetFreezePanes {
            sheet: sheet.to_string(),
            at: Some(at),
        }
    }

    pub fn unfreeze(sheet: &str) -> Self {
        SetFreezePanes {
            sheet: sheet.to_string(),
            at: None,
        }
    }
}

impl Operation for SetFreezePanes {
    type Output = ();

    fn name(&self) -> &'static str {
        "set_freeze_panes"
    }

    fn apply(&self, document: &mut Document) -> Result<()> {
        if self.at == Some(CellRef { row: 0, col: 0 }) {
            return Err(DesignError::InvalidDesign(
                "freezing at A1 freezes nothing".to_string(),
            ));
        }
        document.sheet_mut(&self.sheet)?.set_freeze(self.at);
        Ok(())
    }
}

impl Set for SetFreezePanes {}

#[derive(Debug, Clone)]
pub struct SetSheetOptions {
    pub sheet: String,
    pub options: SheetOptions,
}

impl SetSheetOptions {
    pub fn new(sheet: &str, options: SheetOptions) -> Self {
        SetSheetOptions {
            sheet: sheet.to_string(),
            options,
        }
    }
}

impl Operation for SetSheetOptions {
    type Output = ();

    fn name(&self) -> &'static str {
        "set_sheet_options"
    }

    fn apply(&self, document: &mut Document) -> Result<()> {
        self.options.validate()?;
        document.sheet_mut(&self.sheet)?.options = self.options.clone();
        Ok(())
    }
}

impl Set for SetSheetOptions {}

/// Updates the fields that are set; the others keep their value.
#[derive(Debug, Clone)]
pub struct SetDocumentProperties {
    pub properties: DocumentProperties,
}

impl SetDocumentProperties {
    pub fn new(properties: DocumentProperties) -> Self {
        SetDocumentProperties { properties }
    }
}

impl Operation for SetDocumentProperties {
    type Output = ();

    fn name(&self) -> &'static str {
        "set_document_properties"
    }

    fn apply(&self, document: &mut Document) -> Result<()> {
        document.properties.update(&self.properties);
        Ok(())
    }
}

impl Set for SetDocumentProperties {}
