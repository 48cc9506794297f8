//! The entry point for building a workbook from designs.

use std::path::Path;

use tracing::{debug, info, warn};

use crate::config::DesignerOptions;
use crate::document::Document;
use crate::error::{DesignError, Result};
use crate::ooxml;
use crate::operation::{Insert, Operation, Replace, Set};
use crate::render::Renderer;

/// The rendered workbook together with every error recorded while it was
/// designed.
#[derive(Debug, Clone, PartialEq)]
pub struct DesignResult {
    /// `.xlsx` bytes; `None` when rendering failed.
    pub content: Option<Vec<u8>>,
    pub errors: Vec<DesignError>,
}

impl DesignResult {
    pub fn is_success(&self) -> bool {
        self.errors.is_empty() && self.content.is_some()
    }
}

/// Collects operations into a document and renders it.
///
/// Each operation runs against a draft copy of the document. The draft
/// replaces the document only when the operation succeeds, so a failed
/// operation leaves no partial changes behind. Its error is returned to the
/// caller and also kept for [`WorkbookDesigner::create_result`].
#[derive(Debug, Clone)]
pub struct WorkbookDesigner {
    options: DesignerOptions,
    document: Document,
    errors: Vec<DesignError>,
}

impl WorkbookDesigner {
    pub fn new(options: DesignerOptions) -> Result<Self> {
        options.validate()?;
        Ok(WorkbookDesigner {
            options,
            document: Document::new(),
            errors: Vec::new(),
        })
    }

    pub fn options(&self) -> &DesignerOptions {
        &self.options
    }

    pub fn document(&self) -> &Document {
        &self.document
    }

    /// Errors of the operations that failed so far.
    pub fn errors(&self) -> &[DesignError] {
        &self.errors
    }

    pub fn execute<O: Operation>(&mut self, operation: O) -> Result<O::Output> {
        let mut draft = self.document.clone();
        match operation.apply(&mut draft) {
            Ok(output) => {
                self.document = draft;
                debug!(operation = operation.name(), "operation applied");
                Ok(output)
            }
            Err(e) => {
                warn!(operation = operation.name(), error = %e, "operation failed");
                self.errors.push(e.clone());
                Err(e)
            }
        }
    }

    pub fn insert<O: Insert>(&mut self, operation: O) -> Result<O::Output> {
        self.execute(operation)
    }

    pub fn set<O: Set>(&mut self, operation: O) -> Result<O::Output> {
        self.execute(operation)
    }

    pub fn replace<O: Replace>(&mut self, operation: O) -> Result<O::Output> {
        self.execute(operation)
    }

    fn render(&self) -> Result<Vec<u8>> {
        let bytes = Renderer::new(&self.options)?.render_to_bytes(&self.document)?;
        if self.options.apply_effects && self.document.has_effects() {
            return ooxml::apply_effects(&bytes, &self.document);
        }
        Ok(bytes)
    }

    /// Renders the document. A rendering failure is added to the recorded
    /// errors instead of being returned.
    pub fn create_result(&self) -> DesignResult {
        let mut errors = self.errors.clone();
        let content = match self.render() {
            Ok(bytes) => Some(bytes),
            Err(e) => {
                warn!(error = %e, "rendering failed");
                errors.push(e);
                None
            }
        };
        DesignResult { content, errors }
    }

    /// Renders the document and writes it to `path`. Errors recorded by
    /// earlier operations do not prevent saving.
    pub fn save_to_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let bytes = self.render()?;
        std::fs::write(path.as_ref(), &bytes)?;
        info!(path = %path.as_ref().display(), bytes = bytes.len(), "workbook saved");
        Ok(())
    }
}
