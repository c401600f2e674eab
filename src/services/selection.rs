use std::fs;
use std::path::Path;

use tracing::{debug, warn};

use crate::error::{Result, WebhookError};
use crate::model::file::SelectedFile;

pub const MAX_FILES: usize = 10;
pub const MAX_FILE_SIZE: u64 = 50 * 1024 * 1024;

/// Result of an add: files that were taken and per-file rejections.
#[derive(Debug, Default)]
pub struct AddReport {
    pub added: usize,
    pub skipped_duplicates: usize,
    pub rejected: Vec<WebhookError>,
}

/// Add files to the selection.
///
/// A batch that would push the selection past `MAX_FILES` is refused whole.
/// Otherwise oversize files are rejected one by one and the rest are added,
/// skipping any (name, size) pair already selected.
pub fn add(files: &mut Vec<SelectedFile>, incoming: Vec<SelectedFile>) -> Result<AddReport> {
    check_capacity(files.len(), incoming.len())?;

    let mut report = AddReport::default();

    for file in incoming {
        debug!(name = %file.name, size = file.size, "processing file");

        if file.size > MAX_FILE_SIZE {
            report.rejected.push(too_large(&file.name));
            continue;
        }

        if files.iter().any(|f| f.same_as(&file)) {
            report.skipped_duplicates += 1;
            continue;
        }

        files.push(file);
        report.added += 1;
    }

    Ok(report)
}

pub fn check_capacity(current: usize, incoming: usize) -> Result<()> {
    if current + incoming > MAX_FILES {
        return Err(WebhookError::validation(format!(
            "Chỉ được chọn tối đa {MAX_FILES} file."
        )));
    }
    Ok(())
}

/// Read files from disk, checking the size before loading any content.
pub fn read_paths(paths: &[String]) -> (Vec<SelectedFile>, Vec<WebhookError>) {
    let mut loaded = Vec::with_capacity(paths.len());
    let mut errors = Vec::new();

    for p in paths {
        match read_one(Path::new(p)) {
            Ok(f) => loaded.push(f),
            Err(e) => {
                warn!(path = %p, error = %e, "could not load file");
                errors.push(e);
            }
        }
    }

    (loaded, errors)
}

fn read_one(path: &Path) -> Result<SelectedFile> {
    let name = path
        .file_name()
        .and_then(|s| s.to_str())
        .map(str::to_string)
        .unwrap_or_else(|| path.to_string_lossy().to_string());

    let size = fs::metadata(path)?.len();
    if size > MAX_FILE_SIZE {
        return Err(too_large(&name));
    }

    let content = fs::read(path)?;
    Ok(SelectedFile::new(name, content))
}

pub fn remove(files: &mut Vec<SelectedFile>, index: usize) -> Result<SelectedFile> {
    if index >= files.len() {
        return Err(WebhookError::validation(format!(
            "Không tìm thấy file ở vị trí {index}."
        )));
    }
    let removed = files.remove(index);
    debug!(name = %removed.name, "removed file");
    Ok(removed)
}

fn too_large(name: &str) -> WebhookError {
    WebhookError::validation(format!(
        "File \"{name}\" quá lớn. Kích thước tối đa là 50MB."
    ))
}
