//! A1-style cell and range references.
//!
//! Rows and columns are zero-based internally, matching the `RowNum` and
//! `ColNum` indices used by `rust_xlsxwriter`, and one-based in their A1 text
//! form.

use std::fmt;
use std::str::FromStr;
use std::sync::LazyLock;

use regex::Regex;
use rust_xlsxwriter::{ColNum, RowNum};

use crate::error::{DesignError, Result};

/// Number of rows in a worksheet.
pub const MAX_ROWS: RowNum = 1_048_576;
/// Number of columns in a worksheet (`A` to `XFD`).
pub const MAX_COLUMNS: ColNum = 16_384;

static CELL_REGEXP: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^\$?(?P<col>[A-Za-z]{1,3})\$?(?P<row>[0-9]{1,7})$").expect("valid cell regex")
});

/// Returns the A1 column letters for a zero-based column index.
pub fn column_name(col: ColNum) -> String {
    let mut n = col as u32 + 1;
    let mut letters = Vec::new();
    while n > 0 {
        let rem = (n - 1) % 26;
        letters.push((b'A' + rem as u8) as char);
        n = (n - 1) / 26;
    }
    letters.iter().rev().collect()
}

fn column_index(letters: &str) -> Option<u32> {
    letters.bytes().try_fold(0u32, |acc, b| {
        let digit = (b.to_ascii_uppercase() - b'A') as u32 + 1;
        acc.checked_mul(26)?.checked_add(digit)
    })
}

/// A single cell position.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct CellRef {
    pub row: RowNum,
    pub col: ColNum,
}

impl CellRef {
    /// Creates a reference, checking the worksheet bounds.
    pub fn new(row: RowNum, col: ColNum) -> Result<Self> {
        if row >= MAX_ROWS || col >= MAX_COLUMNS {
            return Err(DesignError::InvalidReference(format!(
                "row {} / column {} is outside the worksheet",
                row, col
            )));
        }
        Ok(CellRef { row, col })
    }

    /// Parses an A1 reference such as `B3` or `$B$3`.
    pub fn parse(text: &str) -> Result<Self> {
        let captures = CELL_REGEXP
            .captures(text.trim())
            .ok_or_else(|| DesignError::InvalidReference(text.to_string()))?;
        let col = column_index(&captures["col"])
            .filter(|c| *c >= 1 && *c <= MAX_COLUMNS as u32)
            .ok_or_else(|| DesignError::InvalidReference(text.to_string()))?;
        let row: u32 = captures["row"]
            .parse()
            .map_err(|_| DesignError::InvalidReference(text.to_string()))?;
        if row == 0 || row > MAX_ROWS {
            return Err(DesignError::InvalidReference(text.to_string()));
        }
        Ok(CellRef {
            row: row - 1,
            col: (col - 1) as ColNum,
        })
    }

    /// Returns the cell moved by the given number of rows and columns.
    pub fn offset(&self, rows: u32, cols: u16) -> Result<Self> {
        let row = self.row.checked_add(rows);
        let col = self.col.checked_add(cols);
        match (row, col) {
            (Some(row), Some(col)) => CellRef::new(row, col),
            _ => Err(DesignError::InvalidReference(format!(
                "{} moved by {} rows and {} columns",
                self, rows, cols
            ))),
        }
    }
}

impl fmt::Display for CellRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", column_name(self.col), self.row + 1)
    }
}

impl FromStr for CellRef {
    type Err = DesignError;

    fn from_str(s: &str) -> Result<Self> {
        CellRef::parse(s)
    }
}

/// A rectangular block of cells. `first` is always the top-left corner.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct CellRange {
    pub first: CellRef,
    pub last: CellRef,
}

impl CellRange {
    /// Creates a range from any two corners.
    pub fn new(a: CellRef, b: CellRef) -> Self {
        CellRange {
            first: CellRef {
                row: a.row.min(b.row),
                col: a.col.min(b.col),
            },
            last: CellRef {
                row: a.row.max(b.row),
                col: a.col.max(b.col),
            },
        }
    }

    pub fn single(cell: CellRef) -> Self {
        CellRange {
            first: cell,
            last: cell,
        }
    }

    /// Parses `A1:C4` or a single cell such as `B2`.
    pub fn parse(text: &str) -> Result<Self> {
        match text.split_once(':') {
            Some((a, b)) => Ok(CellRange::new(CellRef::parse(a)?, CellRef::parse(b)?)),
            None => Ok(CellRange::single(CellRef::parse(text)?)),
        }
    }

    pub fn rows(&self) -> u32 {
        self.last.row - self.first.row + 1
    }

    pub fn columns(&self) -> u16 {
        self.last.col - self.first.col + 1
    }

    pub fn is_single(&self) -> bool {
        self.first == self.last
    }

    pub fn contains(&self, cell: CellRef) -> bool {
        (self.first.row..=self.last.row).contains(&cell.row)
            && (self.first.col..=self.last.col).contains(&cell.col)
    }

    pub fn intersects(&self, other: &CellRange) -> bool {
        self.first.row <= other.last.row
            && other.first.row <= self.last.row
            && self.first.col <= other.last.col
            && other.first.col <= self.last.col
    }

    /// Iterates the cells row by row.
    pub fn cells(&self) -> impl Iterator<Item = CellRef> + '_ {
        (self.first.row..=self.last.row).flat_map(move |row| {
            (self.first.col..=self.last.col).map(move |col| CellRef { row, col })
        })
    }
}

impl fmt::Display for CellRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_single() {
            write!(f, "{}", self.first)
        } else {
            write!(f, "{}:{}", self.first, self.last)
        }
    }
}

impl FromStr for CellRange {
    type Err = DesignError;

    fn from_str(s: &str) -> Result<Self> {
        CellRange::parse(s)
    }
}

/// A range on a named worksheet, used by chart series and sparklines.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SheetRange {
    pub sheet: String,
    pub range: CellRange,
}

impl SheetRange {
    pub fn new(sheet: &str, range: CellRange) -> Self {
        SheetRange {
            sheet: sheet.to_string(),
            range,
        }
    }

    /// Parses `Sheet1!A1:B5` or `'My Sheet'!A1:B5`. Doubled quotes inside a
    /// quoted name stand for a single quote.
    pub fn parse(text: &str) -> Result<Self> {
        let (sheet, range) = text
            .rsplit_once('!')
            .ok_or_else(|| DesignError::InvalidReference(text.to_string()))?;
        let sheet = match sheet.strip_prefix('\'').and_then(|s| s.strip_suffix('\'')) {
            Some(quoted) => quoted.replace("''", "'"),
            None => sheet.to_string(),
        };
        if sheet.is_empty() {
            return Err(DesignError::InvalidReference(text.to_string()));
        }
        Ok(SheetRange {
            sheet,
            range: CellRange::parse(range)?,
        })
    }
}

impl SheetRange {
    fn quoted_sheet(&self) -> String {
        if self.sheet.chars().all(|c| c.is_ascii_alphanumeric() || c == '_') {
            self.sheet.clone()
        } else {
            format!("'{}'", self.sheet.replace('\'', "''"))
        }
    }

    /// Formula form with absolute references, e.g. `Data!$B$2:$B$9`.
    pub fn absolute(&self) -> String {
        let cell = |c: CellRef| format!("${}${}", column_name(c.col), c.row + 1);
        format!(
            "{}!{}:{}",
            self.quoted_sheet(),
            cell(self.range.first),
            cell(self.range.last)
        )
    }
}

impl fmt::Display for SheetRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}!{}", self.quoted_sheet(), self.range)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_column_name() {
        assert_eq!(column_name(0), "A");
        assert_eq!(column_name(25), "Z");
        assert_eq!(column_name(26), "AA");
        assert_eq!(column_name(701), "ZZ");
        assert_eq!(column_name(702), "AAA");
        assert_eq!(column_name(16_383), "XFD");
    }

    #[test]
    fn test_cell_ref_parse() -> Result<()> {
        assert_eq!(CellRef::parse("A1")?, CellRef { row: 0, col: 0 });
        assert_eq!(CellRef::parse("$c$10")?, CellRef { row: 9, col: 2 });
        assert_eq!(CellRef::parse("XFD1048576")?.to_string(), "XFD1048576");
        assert!(CellRef::parse("A0").is_err());
        assert!(CellRef::parse("XFE1").is_err());
        assert!(CellRef::parse("A1048577").is_err());
        assert!(CellRef::parse("1A").is_err());
        Ok(())
    }

    #[test]
    fn test_cell_ref_offset() -> Result<()> {
        let cell = CellRef::parse("B2")?;
        assert_eq!(cell.offset(2, 3)?.to_string(), "E4");
        assert!(CellRef::parse("XFD1")?.offset(0, 1).is_err());
        Ok(())
    }

    #[test]
    fn test_cell_range_normalises_corners() -> Result<()> {
        let range = CellRange::parse("C4:A1")?;
        assert_eq!(range.to_string(), "A1:C4");
        assert_eq!(range.rows(), 4);
        assert_eq!(range.columns(), 3);
        assert_eq!(CellRange::parse("B2")?.to_string(), "B2");
        Ok(())
    }

    #[test]
    fn test_cell_range_intersects_and_contains() -> Result<()> {
        let a = CellRange::parse("A1:C3")?;
        assert!(a.intersects(&CellRange::parse("C3:D4")?));
        assert!(!a.intersects(&CellRange::parse("D1:D9")?));
        assert!(a.contains(CellRef::parse("B2")?));
        assert!(!a.contains(CellRef::parse("B4")?));
        let cells: Vec<String> = CellRange::parse("A1:B2")?
            .cells()
            .map(|c| c.to_string())
            .collect();
        assert_eq!(cells, vec!["A1", "B1", "A2", "B2"]);
        Ok(())
    }

    #[test]
    fn test_sheet_range_parse() -> Result<()> {
        let plain = SheetRange::parse("Data!B2:B9")?;
        assert_eq!(plain.sheet, "Data");
        assert_eq!(plain.range.to_string(), "B2:B9");

        let quoted = SheetRange::parse("'Bob''s Sales'!A1:A3")?;
        assert_eq!(quoted.sheet, "Bob's Sales");
        assert_eq!(quoted.to_string(), "'Bob''s Sales'!A1:A3");

        assert_eq!(plain.absolute(), "Data!$B$2:$B$9");
        assert_eq!(
            SheetRange::parse("'My Data'!C3")?.absolute(),
            "'My Data'!$C$3:$C$3"
        );

        assert!(SheetRange::parse("A1:B2").is_err());
        assert!(SheetRange::parse("!A1").is_err());
        Ok(())
    }
}
