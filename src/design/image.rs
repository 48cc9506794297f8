use std::path::PathBuf;

use crate::error::{DesignError, Result};

#[derive(Debug, Clone, PartialEq)]
pub enum ImageSource {
    Path(PathBuf),
    Bytes(Vec<u8>),
}

#[derive(Debug, Clone, PartialEq)]
pub struct ImageDesign {
    pub source: ImageSource,
    pub scale_width: f64,
    pub scale_height: f64,
    pub alt_text: Option<String>,
    pub offset: (u32, u32),
}

impl ImageDesign {
    pub fn from_path(path: impl Into<PathBuf>) -> Self {
        ImageDesign::new(ImageSource::Path(path.into()))
    }

    pub fn from_bytes(bytes: Vec<u8>) -> Self {
        ImageDesign::new(ImageSource::Bytes(bytes))
    }

    fn new(source: ImageSource) -> Self {
        ImageDesign {
            source,
            scale_width: 1.0,
            scale_height: 1.0,
            alt_text: None,
            offset: (0, 0),
        }
    }

    pub fn validate(&self) -> Result<()> {
        match &self.source {
            ImageSource::Path(path) if !path.is_file() => {
                return Err(DesignError::Io(format!(
                    "image file not found: {}",
                    path.display()
                )))
            }
            ImageSource::Bytes(bytes) if bytes.is_empty() => {
                return Err(DesignError::InvalidDesign("image data is empty".to_string()))
            }
            _ => {}
        }
        if self.scale_width <= 0.0 || self.scale_height <= 0.0 {
            return Err(DesignError::InvalidDesign(format!(
                "image scale {}x{} must be positive",
                self.scale_width, self.scale_height
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate() {
        assert!(ImageDesign::from_path("/no/such/logo.png").validate().is_err());
        assert!(ImageDesign::from_bytes(Vec::new()).validate().is_err());
        let scaled = ImageDesign {
            scale_width: 0.0,
            ..ImageDesign::from_bytes(vec![0x89, b'P', b'N', b'G'])
        };
        assert!(scaled.validate().is_err());
    }
}
