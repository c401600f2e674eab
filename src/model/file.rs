use serde::Serialize;

/// A file picked for upload, held in memory until the form is submitted or reset.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectedFile {
    pub name: String,
    pub size: u64,
    pub content: Vec<u8>,
}

impl SelectedFile {
    pub fn new(name: impl Into<String>, content: Vec<u8>) -> Self {
        let size = content.len() as u64;
        Self {
            name: name.into(),
            size,
            content,
        }
    }

    /// Two selections are the same file when name and size match.
    pub fn same_as(&self, other: &SelectedFile) -> bool {
        self.name == other.name && self.size == other.size
    }

    pub fn summary(&self) -> FileSummary {
        FileSummary {
            name: self.name.clone(),
            size: self.size,
        }
    }
}

#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct FileSummary {
    pub name: String,
    pub size: u64,
}
