use crate::content::{ContentFillError, ContentRequest, ContentSource};
use crate::lesson::{FieldValue, LessonContent, LessonField, LessonRecord};
use crate::preview::{render_html, render_text};
use crate::storage::{LessonSlot, StoreError};
use crate::store::{Confirm, RecordStore};
use log::{info, warn};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::{Duration, Instant};

pub const MISSING_TITLE_MESSAGE: &str = "يرجى إدخال عنوان الدرس واختيار المادة أولاً";
pub const COPY_CONFIRMATION: Duration = Duration::from_secs(2);
pub const PRINT_FILE_NAME: &str = "lesson_card.html";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FillState {
    Idle,
    Busy,
}

/// Where the message on screen came from. Edit and save problems go away with
/// the next good save; fill messages stay until the next fill or reset.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ErrorOrigin {
    Edit,
    Fill,
}

/// Form state that does not depend on the widget toolkit: the store, the
/// fill button's idle/busy state, the last error, and the copy indicator.
pub struct LessonSession<S> {
    store: RecordStore<S>,
    fill: FillState,
    error: Option<(ErrorOrigin, String)>,
    copied_at: Option<Instant>,
}

impl<S: LessonSlot> LessonSession<S> {
    pub fn new(store: RecordStore<S>) -> Self {
        Self {
            store,
            fill: FillState::Idle,
            error: None,
            copied_at: None,
        }
    }

    pub fn record(&self) -> Arc<LessonRecord> {
        self.store.current()
    }

    pub fn store(&self) -> &RecordStore<S> {
        &self.store
    }

    pub fn fill_state(&self) -> FillState {
        self.fill
    }

    pub fn is_busy(&self) -> bool {
        self.fill == FillState::Busy
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_ref().map(|(_, message)| message.as_str())
    }

    /// Hand the current message to a caller that shows it once.
    pub fn take_error(&mut self) -> Option<String> {
        self.error.take().map(|(_, message)| message)
    }

    fn set_error(&mut self, origin: ErrorOrigin, message: String) {
        self.error = Some((origin, message));
    }

    /// Apply one edit from the form. Returns whether the record changed.
    pub fn edit(&mut self, field: LessonField, value: FieldValue) -> bool {
        let before = self.store.current();
        match self.store.update(field, value) {
            Ok(()) => {
                if matches!(self.error, Some((ErrorOrigin::Edit, _))) {
                    self.error = None;
                }
            }
            Err(StoreError::Field(e)) => {
                self.set_error(ErrorOrigin::Edit, format!("قيمة غير صالحة: {e}"))
            }
            Err(e) => self.set_error(ErrorOrigin::Edit, format!("تعذر حفظ المسودة: {e}")),
        }
        !Arc::ptr_eq(&before, &self.store.current())
    }

    /// Validate and switch to busy. `None` means no request may be sent.
    pub fn begin_fill(&mut self) -> Option<ContentRequest> {
        if self.is_busy() {
            return None;
        }
        let record = self.store.current();
        // Subject is always one of the fixed choices, so only the title can be missing.
        if record.lesson_title.trim().is_empty() {
            self.set_error(ErrorOrigin::Fill, MISSING_TITLE_MESSAGE.to_string());
            return None;
        }
        self.error = None;
        self.fill = FillState::Busy;
        Some(ContentRequest::from_record(&record))
    }

    /// Merge a finished fill, or keep the record and show why it failed.
    /// Always returns to idle.
    pub fn finish_fill(&mut self, result: Result<LessonContent, ContentFillError>) {
        self.fill = FillState::Idle;
        match result {
            Ok(content) => {
                info!("[session] Merging generated content");
                if let Err(e) = self.store.apply_content(content) {
                    self.set_error(ErrorOrigin::Edit, format!("تعذر حفظ المسودة: {e}"));
                }
            }
            Err(e) => {
                warn!("[session] Content fill failed: {e}");
                self.set_error(ErrorOrigin::Fill, e.user_message());
            }
        }
    }

    /// Run a whole fill against `source`, for callers that can wait.
    pub async fn fill_with(&mut self, source: &dyn ContentSource) -> bool {
        let Some(request) = self.begin_fill() else {
            return false;
        };
        let result = source.generate(&request).await;
        let ok = result.is_ok();
        self.finish_fill(result);
        ok
    }

    pub fn reset(&mut self, confirm: &mut impl Confirm) -> bool {
        match self.store.reset(confirm) {
            Ok(done) => {
                if done {
                    self.error = None;
                }
                done
            }
            Err(e) => {
                self.set_error(ErrorOrigin::Edit, format!("تعذر حفظ المسودة: {e}"));
                true
            }
        }
    }

    /// Text for the clipboard; starts the confirmation indicator.
    pub fn copy_text(&mut self, now: Instant) -> String {
        self.copied_at = Some(now);
        render_text(&self.store.current())
    }

    pub fn copied_visible(&self, now: Instant) -> bool {
        self.copied_at
            .map(|at| now.saturating_duration_since(at) < COPY_CONFIRMATION)
            .unwrap_or(false)
    }

    /// Write the print view to `dir` and return its path.
    pub fn export_print(&self, dir: &Path) -> io::Result<PathBuf> {
        let html = render_html(&self.store.current())
            .map_err(|e| io::Error::new(io::ErrorKind::Other, format!("template error: {e}")))?;
        fs::create_dir_all(dir)?;
        let path = dir.join(PRINT_FILE_NAME);
        fs::write(&path, html)?;
        Ok(path)
    }
}
