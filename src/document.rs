//! In-memory workbook that operations mutate and the renderer reads.

use std::collections::BTreeMap;

use rust_xlsxwriter::{ColNum, RowNum};

use crate::design::{
    CellStyle, CellValue, ChartDesign, DesignColor, ImageDesign, ShapeDesign, SparklineDesign,
    TableColumnDesign, TableStylePreset,
};
use crate::error::{DesignError, Result};
use crate::reference::{CellRange, CellRef};

/// Characters Excel rejects in worksheet names.
const INVALID_SHEET_CHARS: &[char] = &['[', ']', ':', '*', '?', '/', '\\'];

/// Checks Excel's worksheet naming rules.
pub fn validate_sheet_name(name: &str) -> Result<()> {
    let length = name.chars().count();
    if length == 0 || length > 31 {
        return Err(DesignError::InvalidDesign(format!(
            "worksheet name {:?} must be 1 to 31 characters",
            name
        )));
    }
    if name.contains(INVALID_SHEET_CHARS) {
        return Err(DesignError::InvalidDesign(format!(
            "worksheet name {:?} contains one of []:*?/\\",
            name
        )));
    }
    if name.starts_with('\'') || name.ends_with('\'') {
        return Err(DesignError::InvalidDesign(format!(
            "worksheet name {:?} cannot start or end with an apostrophe",
            name
        )));
    }
    if name.eq_ignore_ascii_case("History") {
        return Err(DesignError::InvalidDesign(
            "\"History\" is reserved by Excel".to_string(),
        ));
    }
    Ok(())
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct Cell {
    pub value: CellValue,
    pub style: CellStyle,
}

/// A design pinned to an anchor cell.
#[derive(Debug, Clone, PartialEq)]
pub struct Placed<T> {
    pub at: CellRef,
    pub design: T,
}

/// An Excel table registered on a sheet. Cell contents live in the sheet's
/// cells; this only carries what the engine needs to declare the table.
#[derive(Debug, Clone, PartialEq)]
pub struct PlacedTable {
    pub name: String,
    pub range: CellRange,
    pub columns: Vec<TableColumnDesign>,
    pub preset: TableStylePreset,
    pub show_header: bool,
    pub total_row: bool,
    pub autofilter: bool,
    pub banded_rows: bool,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct SheetOptions {
    pub tab_color: Option<DesignColor>,
    pub hide_gridlines: bool,
    /// Percent, 10 to 400.
    pub zoom: Option<u16>,
    pub landscape: bool,
    /// Size columns to their contents when rendering.
    pub autofit: bool,
}

impl SheetOptions {
    pub fn validate(&self) -> Result<()> {
        if let Some(zoom) = self.zoom {
            if !(10..=400).contains(&zoom) {
                return Err(DesignError::InvalidDesign(format!(
                    "zoom {} must be between 10 and 400",
                    zoom
                )));
            }
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Sheet {
    name: String,
    cells: BTreeMap<(RowNum, ColNum), Cell>,
    merges: Vec<CellRange>,
    column_widths: BTreeMap<ColNum, f64>,
    row_heights: BTreeMap<RowNum, f64>,
    freeze: Option<CellRef>,
    pub options: SheetOptions,
    tables: Vec<PlacedTable>,
    charts: BTreeMap<CellRef, Placed<ChartDesign>>,
    shapes: BTreeMap<CellRef, Placed<ShapeDesign>>,
    images: BTreeMap<CellRef, Placed<ImageDesign>>,
    sparklines: BTreeMap<CellRef, SparklineDesign>,
}

fn anchor_conflict(kind: &str, sheet: &str, at: CellRef) -> DesignError {
    DesignError::Conflict(format!("a {} is already anchored at {}!{}", kind, sheet, at))
}

impl Sheet {
    fn new(name: &str) -> Self {
        Sheet {
            name: name.to_string(),
            cells: BTreeMap::new(),
            merges: Vec::new(),
            column_widths: BTreeMap::new(),
            row_heights: BTreeMap::new(),
            freeze: None,
            options: SheetOptions::default(),
            tables: Vec::new(),
            charts: BTreeMap::new(),
            shapes: BTreeMap::new(),
            images: BTreeMap::new(),
            sparklines: BTreeMap::new(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn cell(&self, at: CellRef) -> Option<&Cell> {
        self.cells.get(&(at.row, at.col))
    }

    pub fn value(&self, at: CellRef) -> &CellValue {
        static EMPTY: CellValue = CellValue::Empty;
        self.cell(at).map_or(&EMPTY, |c| &c.value)
    }

    /// Iterates cells in row-major order.
    pub fn cells(&self) -> impl Iterator<Item = (CellRef, &Cell)> {
        self.cells
            .iter()
            .map(|(&(row, col), cell)| (CellRef { row, col }, cell))
    }

    pub fn cells_mut(&mut self) -> impl Iterator<Item = (CellRef, &mut Cell)> {
        self.cells
            .iter_mut()
            .map(|(&(row, col), cell)| (CellRef { row, col }, cell))
    }

    pub fn set_value(&mut self, at: CellRef, value: CellValue) {
        self.cells.entry((at.row, at.col)).or_default().value = value;
    }

    pub fn set_cell(&mut self, at: CellRef, value: CellValue, style: CellStyle) {
        self.cells.insert((at.row, at.col), Cell { value, style });
    }

    pub fn style_mut(&mut self, at: CellRef) -> &mut CellStyle {
        &mut self.cells.entry((at.row, at.col)).or_default().style
    }

    pub fn merges(&self) -> &[CellRange] {
        &self.merges
    }

    /// Merges a block; merged blocks must not overlap.
    pub fn add_merge(&mut self, range: CellRange) -> Result<()> {
        if range.is_single() {
            return Err(DesignError::InvalidDesign(format!(
                "cannot merge the single cell {}",
                range
            )));
        }
        if let Some(existing) = self.merges.iter().find(|m| m.intersects(&range)) {
            return Err(DesignError::Conflict(format!(
                "merge {} overlaps merged cells {} on {}",
                range, existing, self.name
            )));
        }
        self.merges.push(range);
        Ok(())
    }

    pub fn column_widths(&self) -> &BTreeMap<ColNum, f64> {
        &self.column_widths
    }

    pub fn set_column_width(&mut self, col: ColNum, width: f64) -> Result<()> {
        if !(0.0..=255.0).contains(&width) {
            return Err(DesignError::InvalidDesign(format!(
                "column width {} must be between 0 and 255",
                width
            )));
        }
        self.column_widths.insert(col, width);
        Ok(())
    }

    pub fn row_heights(&self) -> &BTreeMap<RowNum, f64> {
        &self.row_heights
    }

    pub fn set_row_height(&mut self, row: RowNum, height: f64) -> Result<()> {
        if !(0.0..=409.0).contains(&height) {
            return Err(DesignError::InvalidDesign(format!(
                "row height {} must be between 0 and 409",
                height
            )));
        }
        self.row_heights.insert(row, height);
        Ok(())
    }

    pub fn freeze(&self) -> Option<CellRef> {
        self.freeze
    }

    pub fn set_freeze(&mut self, at: Option<CellRef>) {
        self.freeze = at;
    }

    pub fn tables(&self) -> &[PlacedTable] {
        &self.tables
    }

    pub fn add_table(&mut self, table: PlacedTable) -> Result<()> {
        if let Some(existing) = self.tables.iter().find(|t| t.range.intersects(&table.range)) {
            return Err(DesignError::Conflict(format!(
                "table {} at {} overlaps table {} at {}",
                table.name, table.range, existing.name, existing.range
            )));
        }
        self.tables.push(table);
        Ok(())
    }

    pub fn charts(&self) -> impl Iterator<Item = &Placed<ChartDesign>> {
        self.charts.values()
    }

    pub fn add_chart(&mut self, at: CellRef, design: ChartDesign) -> Result<()> {
        if self.charts.contains_key(&at) {
            return Err(anchor_conflict("chart", &self.name, at));
        }
        self.charts.insert(at, Placed { at, design });
        Ok(())
    }

    pub fn shapes(&self) -> impl Iterator<Item = &Placed<ShapeDesign>> {
        self.shapes.values()
    }

    pub fn shapes_mut(&mut self) -> impl Iterator<Item = &mut Placed<ShapeDesign>> {
        self.shapes.values_mut()
    }

    pub fn add_shape(&mut self, at: CellRef, design: ShapeDesign) -> Result<()> {
        if self.shapes.contains_key(&at) {
            return Err(anchor_conflict("shape", &self.name, at));
        }
        self.shapes.insert(at, Placed { at, design });
        Ok(())
    }

    pub fn images(&self) -> impl Iterator<Item = &Placed<ImageDesign>> {
        self.images.values()
    }

    pub fn add_image(&mut self, at: CellRef, design: ImageDesign) -> Result<()> {
        if self.images.contains_key(&at) {
            return Err(anchor_conflict("image", &self.name, at));
        }
        self.images.insert(at, Placed { at, design });
        Ok(())
    }

    pub fn sparklines(&self) -> impl Iterator<Item = (CellRef, &SparklineDesign)> {
        self.sparklines.iter().map(|(at, s)| (*at, s))
    }

    pub fn add_sparkline(&mut self, at: CellRef, design: SparklineDesign) -> Result<()> {
        if self.sparklines.contains_key(&at) {
            return Err(anchor_conflict("sparkline", &self.name, at));
        }
        self.sparklines.insert(at, design);
        Ok(())
    }

    /// True when any chart or shape carries drawing effects.
    pub fn has_effects(&self) -> bool {
        self.charts.values().any(|c| {
            !c.design.chart_area.effects.is_empty() || !c.design.plot_area.effects.is_empty()
        })
            || self.shapes.values().any(|s| !s.design.effects.is_empty())
    }
}

/// Workbook metadata written to `docProps/core.xml` and `app.xml`.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct DocumentProperties {
    pub title: Option<String>,
    pub subject: Option<String>,
    pub author: Option<String>,
    pub company: Option<String>,
    pub keywords: Option<String>,
    pub comment: Option<String>,
}

impl DocumentProperties {
    /// Fields set on `other` replace the ones here.
    pub fn update(&mut self, other: &DocumentProperties) {
        let fields = [
            (&mut self.title, &other.title),
            (&mut self.subject, &other.subject),
            (&mut self.author, &other.author),
            (&mut self.company, &other.company),
            (&mut self.keywords, &other.keywords),
            (&mut self.comment, &other.comment),
        ];
        for (mine, theirs) in fields {
            if theirs.is_some() {
                *mine = theirs.clone();
            }
        }
    }
}

/// Sheet and table names compare without regard to case, including
/// non-ASCII letters (`Äpfel` and `äpfel` clash in Excel).
fn same_name(a: &str, b: &str) -> bool {
    a.to_lowercase() == b.to_lowercase()
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct Document {
    sheets: Vec<Sheet>,
    pub properties: DocumentProperties,
}

impl Document {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn sheets(&self) -> &[Sheet] {
        &self.sheets
    }

    pub fn sheets_mut(&mut self) -> impl Iterator<Item = &mut Sheet> {
        self.sheets.iter_mut()
    }

    /// Sheet lookup is case-insensitive, like Excel's.
    pub fn sheet(&self, name: &str) -> Option<&Sheet> {
        self.sheets.iter().find(|s| same_name(&s.name, name))
    }

    pub fn sheet_mut(&mut self, name: &str) -> Result<&mut Sheet> {
        self.sheets
            .iter_mut()
            .find(|s| same_name(&s.name, name))
            .ok_or_else(|| DesignError::SheetNotFound(name.to_string()))
    }

    pub fn require_sheet(&self, name: &str) -> Result<&Sheet> {
        self.sheet(name)
            .ok_or_else(|| DesignError::SheetNotFound(name.to_string()))
    }

    pub fn add_sheet(&mut self, name: &str) -> Result<&mut Sheet> {
        validate_sheet_name(name)?;
        if self.sheet(name).is_some() {
            return Err(DesignError::DuplicateSheet(name.to_string()));
        }
        self.sheets.push(Sheet::new(name));
        let index = self.sheets.len() - 1;
        Ok(&mut self.sheets[index])
    }

    /// Table names are unique across the workbook.
    pub fn has_table(&self, name: &str) -> bool {
        self.sheets
            .iter()
            .flat_map(|s| s.tables.iter())
            .any(|t| same_name(&t.name, name))
    }

    pub fn table_count(&self) -> usize {
        self.sheets.iter().map(|s| s.tables.len()).sum()
    }

    pub fn has_effects(&self) -> bool {
        self.sheets.iter().any(Sheet::has_effects)
    }
}
