use thiserror::Error;

/// Errors raised while building or rendering a workbook design.
///
/// The type is `Clone` so a [`crate::designer::DesignResult`] can carry the
/// errors of every failed operation next to the rendered content.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum DesignError {
    /// A cell or range reference could not be parsed or is out of bounds.
    #[error("Invalid reference: {0}")]
    InvalidReference(String),
    /// The operation names a worksheet that does not exist.
    #[error("Worksheet not found: {0}")]
    SheetNotFound(String),
    /// A worksheet with the same (case-insensitive) name already exists.
    #[error("Worksheet already exists: {0}")]
    DuplicateSheet(String),
    /// A design value violates a constraint of the workbook format.
    #[error("Invalid design: {0}")]
    InvalidDesign(String),
    /// Two objects of the same kind were anchored at the same cell, or two
    /// ranges that must stay disjoint overlap.
    #[error("Conflict: {0}")]
    Conflict(String),
    /// The culture name is not in the culture table.
    #[error("Unknown culture: {0}")]
    UnknownCulture(String),
    /// The xlsx engine rejected a write.
    #[error("Xlsx error: {0}")]
    Xlsx(String),
    /// The saved package could not be read or patched.
    #[error("OOXML error: {0}")]
    Ooxml(String),
    #[error("I/O error: {0}")]
    Io(String),
}

impl From<rust_xlsxwriter::XlsxError> for DesignError {
    fn from(e: rust_xlsxwriter::XlsxError) -> Self {
        DesignError::Xlsx(e.to_string())
    }
}

impl From<std::io::Error> for DesignError {
    fn from(e: std::io::Error) -> Self {
        DesignError::Io(e.to_string())
    }
}

impl From<zip::result::ZipError> for DesignError {
    fn from(e: zip::result::ZipError) -> Self {
        DesignError::Ooxml(e.to_string())
    }
}

impl From<quick_xml::Error> for DesignError {
    fn from(e: quick_xml::Error) -> Self {
        DesignError::Ooxml(e.to_string())
    }
}

impl From<quick_xml::events::attributes::AttrError> for DesignError {
    fn from(e: quick_xml::events::attributes::AttrError) -> Self {
        DesignError::Ooxml(e.to_string())
    }
}

pub type Result<T, E = DesignError> = std::result::Result<T, E>;
