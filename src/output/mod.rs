//! Output directory staging and run reporting module

use serde::{Deserialize, Serialize};

pub mod report;
pub mod stager;

pub use report::RunReport;
pub use stager::OutputStager;

/// Segment filenames in the output directory, in playback order
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct OutputListing {
    pub files: Vec<String>,
}

impl OutputListing {
    pub fn new(files: Vec<String>) -> Self {
        Self { files }
    }

    pub fn len(&self) -> usize {
        self.files.len()
    }

    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.files.iter().map(String::as_str)
    }
}
