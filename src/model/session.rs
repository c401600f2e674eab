use std::cell::Cell;

use serde::Serialize;

use crate::error::{Result, WebhookError};
use crate::model::file::{FileSummary, SelectedFile};

/// State of the upload form, owned by the session and passed to every handler.
#[derive(Debug, Default)]
pub struct UploadForm {
    pub files: Vec<SelectedFile>,
    pub email: String,
    pub new_qr: bool,
    pub in_flight: Cell<bool>,
}

impl UploadForm {
    pub fn can_submit(&self) -> bool {
        !self.files.is_empty() && !self.email.is_empty() && !self.in_flight.get()
    }

    pub fn reset(&mut self) {
        self.files.clear();
        self.email.clear();
        self.new_qr = false;
    }

    pub fn total_size(&self) -> u64 {
        self.files.iter().map(|f| f.size).sum()
    }
}

#[derive(Debug, Default)]
pub struct Session {
    pub form: UploadForm,
    pub translating: Cell<bool>,
}

impl Session {
    pub fn snapshot(&self) -> SessionState {
        SessionState {
            files: self.form.files.iter().map(SelectedFile::summary).collect(),
            total_size: self.form.total_size(),
            email: self.form.email.clone(),
            new_qr: self.form.new_qr,
            uploading: self.form.in_flight.get(),
            translating: self.translating.get(),
            can_submit: self.form.can_submit(),
        }
    }
}

/// What the front-end needs to redraw the form controls.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct SessionState {
    pub files: Vec<FileSummary>,
    pub total_size: u64,
    pub email: String,
    pub new_qr: bool,
    pub uploading: bool,
    pub translating: bool,
    pub can_submit: bool,
}

/// Marks a request as outstanding; the flag is cleared when the guard drops.
pub struct InFlight<'a> {
    flag: &'a Cell<bool>,
}

impl<'a> InFlight<'a> {
    pub fn acquire(flag: &'a Cell<bool>) -> Result<Self> {
        if flag.replace(true) {
            return Err(WebhookError::Busy);
        }
        Ok(Self { flag })
    }
}

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        self.flag.set(false);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn guard_rejects_second_acquire_and_releases_on_drop() {
        let flag = Cell::new(false);
        {
            let _guard = InFlight::acquire(&flag).unwrap();
            assert!(flag.get());
            assert!(matches!(InFlight::acquire(&flag), Err(WebhookError::Busy)));
            // the failed acquire must not clear the flag held by the first guard
            assert!(flag.get());
        }
        assert!(!flag.get());
        assert!(InFlight::acquire(&flag).is_ok());
    }

    #[test]
    fn can_submit_needs_files_email_and_idle() {
        let mut form = UploadForm::default();
        assert!(!form.can_submit());
        form.files.push(SelectedFile::new("a.pdf", vec![1, 2, 3]));
        assert!(!form.can_submit());
        form.email = "a@b.co".into();
        assert!(form.can_submit());
        form.in_flight.set(true);
        assert!(!form.can_submit());
    }

    #[test]
    fn reset_clears_everything() {
        let mut form = UploadForm::default();
        form.files.push(SelectedFile::new("a.pdf", vec![1]));
        form.email = "a@b.co".into();
        form.new_qr = true;
        form.reset();
        assert!(form.files.is_empty());
        assert!(form.email.is_empty());
        assert!(!form.new_qr);
    }

    #[test]
    fn snapshot_reports_sizes() {
        let mut session = Session::default();
        session.form.files.push(SelectedFile::new("a", vec![0; 10]));
        session.form.files.push(SelectedFile::new("b", vec![0; 5]));
        let state = session.snapshot();
        assert_eq!(state.total_size, 15);
        assert_eq!(state.files.len(), 2);
        assert_eq!(state.files[1].name, "b");
    }
}
