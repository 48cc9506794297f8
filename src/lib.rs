pub mod cli;
pub mod config;
pub mod culture;
pub mod design;
pub mod designer;
pub mod document;
pub mod error;
pub mod number_format;
pub mod ooxml;
pub mod operation;
pub mod reference;
pub mod render;

pub use crate::config::DesignerOptions;
pub use crate::designer::{DesignResult, WorkbookDesigner};
pub use crate::error::{DesignError, Result};
