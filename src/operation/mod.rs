//! Insert, Set and Replace operations.
//!
//! An operation validates its design and applies it to a [`Document`]. The
//! designer runs every operation against a draft copy, so an operation that
//! fails halfway leaves the workbook unchanged.

pub mod insert;
pub mod replace;
pub mod set;

use crate::document::Document;
use crate::error::Result;

pub use insert::{
    InsertChart, InsertImage, InsertShape, InsertSparkline, InsertTable, InsertText,
    InsertWorksheet, TableLayout,
};
pub use replace::{ReplacePlaceholders, ReplaceRange, ReplaceText};
pub use set::{
    SetCellValue, SetColumnWidth, SetDocumentProperties, SetFreezePanes, SetMergedCells,
    SetRowHeight, SetSheetOptions, SetStyle, StyleMode,
};

pub trait Operation {
    type Output;

    /// Short name used in logs.
    fn name(&self) -> &'static str;

    fn apply(&self, document: &mut Document) -> Result<Self::Output>;
}

/// Adds new content: worksheets, text, tables, charts, shapes, images,
/// sparklines.
pub trait Insert: Operation {}

/// Changes properties of existing content: values, styles, dimensions.
pub trait Set: Operation {}

/// Rewrites existing values in place.
pub trait Replace: Operation {}

/// Sheets an operation targets: one named sheet, or all of them.
pub(crate) fn target_sheets<'a>(
    document: &'a mut Document,
    sheet: &Option<String>,
) -> Result<Vec<&'a mut crate::document::Sheet>> {
    match sheet {
        Some(name) => Ok(vec![document.sheet_mut(name)?]),
        None => Ok(document.sheets_mut().collect()),
    }
}
