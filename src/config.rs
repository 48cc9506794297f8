use crate::culture::{find_culture, Culture};
use crate::design::{CellStyle, FontDesign};
use crate::document::DocumentProperties;
use crate::error::Result;

/// Options for configuring a [`crate::designer::WorkbookDesigner`].
#[derive(Debug, Clone, PartialEq)]
pub struct DesignerOptions {
    /// Culture used for currency symbols and date patterns.
    pub culture: String,
    /// Style every cell falls back to.
    pub default_style: CellStyle,
    /// Workbook metadata.
    pub properties: DocumentProperties,
    /// Write drawing effects (shadow, glow, soft edge) into the saved file.
    pub apply_effects: bool,
}

impl Default for DesignerOptions {
    /// Returns the default options.
    ///
    /// Default values:
    /// - `culture`: "en-US"
    /// - `default_style`: Calibri 11
    /// - `properties`: empty
    /// - `apply_effects`: true
    fn default() -> Self {
        DesignerOptions {
            culture: "en-US".to_string(),
            default_style: CellStyle::new().with_font(FontDesign::new("Calibri", 11.0)),
            properties: DocumentProperties::default(),
            apply_effects: true,
        }
    }
}

impl DesignerOptions {
    pub fn with_culture(mut self, culture: &str) -> Self {
        self.culture = culture.to_string();
        self
    }

    pub fn culture(&self) -> Result<&'static Culture> {
        find_culture(&self.culture)
    }

    pub fn validate(&self) -> Result<()> {
        self.culture()?;
        self.default_style.validate()
    }
}
