use crate::lesson::{FieldValue, LessonContent, LessonField, LessonRecord};
use crate::storage::{LessonSlot, StoreError};
use log::{info, warn};
use std::sync::Arc;

pub const RESET_QUESTION: &str = "سيتم مسح البيانات المسودة حالياً، هل أنت متأكد؟";

/// Blocking yes/no prompt used before destructive actions.
pub trait Confirm {
    fn confirm(&mut self, question: &str) -> bool;
}

impl<F: FnMut(&str) -> bool> Confirm for F {
    fn confirm(&mut self, question: &str) -> bool {
        self(question)
    }
}

/// Owns the current lesson and mirrors every change into its slot.
///
/// Records are handed out as `Arc`s and never modified after creation; every
/// change swaps in a new record.
pub struct RecordStore<S> {
    slot: S,
    current: Arc<LessonRecord>,
}

impl<S: LessonSlot> RecordStore<S> {
    /// Restore the saved lesson, or start from the default card.
    pub fn open(slot: S) -> Self {
        let current = match slot.load() {
            Ok(Some(record)) => {
                info!("[store] Restored saved lesson \"{}\"", record.lesson_title);
                record
            }
            Ok(None) => LessonRecord::default(),
            Err(e) => {
                warn!("[store] Failed to load saved lesson, using defaults: {e}");
                LessonRecord::default()
            }
        };

        Self {
            slot,
            current: Arc::new(current),
        }
    }

    pub fn current(&self) -> Arc<LessonRecord> {
        Arc::clone(&self.current)
    }

    pub fn slot(&self) -> &S {
        &self.slot
    }

    /// Set one field and save the whole record.
    ///
    /// A value of the wrong kind changes nothing. A failed save keeps the new
    /// record in memory and returns the error.
    pub fn update(&mut self, field: LessonField, value: FieldValue) -> Result<(), StoreError> {
        let next = self.current.with_field(field, value)?;
        self.replace(next)
    }

    /// Merge generated content over the current record.
    pub fn apply_content(&mut self, content: LessonContent) -> Result<(), StoreError> {
        let next = self.current.with_content(content);
        self.replace(next)
    }

    /// Replace the record with a fresh default once the user agrees.
    ///
    /// Returns whether the reset happened. The slot is overwritten with the
    /// default rather than removed.
    pub fn reset(&mut self, confirm: &mut impl Confirm) -> Result<bool, StoreError> {
        if !confirm.confirm(RESET_QUESTION) {
            return Ok(false);
        }
        info!("[store] Lesson reset to defaults");
        self.replace(LessonRecord::default())?;
        Ok(true)
    }

    pub fn persist(&self, record: &LessonRecord) -> Result<(), StoreError> {
        self.slot.save(record).map_err(|e| {
            warn!("[store] Could not save lesson: {e}");
            e
        })
    }

    fn replace(&mut self, next: LessonRecord) -> Result<(), StoreError> {
        self.current = Arc::new(next);
        self.persist(&self.current)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lesson::Subject;
    use crate::storage::{encode_record, MemorySlot};
    use pretty_assertions::assert_eq;

    #[test]
    fn open_without_saved_lesson_uses_default() {
        let store = RecordStore::open(MemorySlot::new());
        assert_eq!(*store.current(), LessonRecord::default());
        assert_eq!(store.slot().writes(), 0);
    }

    #[test]
    fn open_restores_saved_lesson() {
        let saved = LessonRecord {
            lesson_title: "الجمع".into(),
            subject: Subject::Mathematics,
            ..LessonRecord::default()
        };
        let slot = MemorySlot::with_raw(encode_record(&saved).unwrap());
        let store = RecordStore::open(slot);
        assert_eq!(*store.current(), saved);
    }

    #[test]
    fn every_update_writes_the_whole_record() {
        let mut store = RecordStore::open(MemorySlot::new());
        for title in ["خ", "خص", "خصا"] {
            store
                .update(LessonField::LessonTitle, FieldValue::Text(title.into()))
                .unwrap();
        }
        assert_eq!(store.slot().writes(), 3);
        let saved = store.slot().load().unwrap().unwrap();
        assert_eq!(saved, *store.current());
        assert_eq!(saved.lesson_title, "خصا");
    }

    #[test]
    fn mismatched_value_changes_nothing() {
        let mut store = RecordStore::open(MemorySlot::new());
        let before = store.current();
        let err = store
            .update(LessonField::Homework, FieldValue::List(vec!["x".into()]))
            .unwrap_err();
        assert!(matches!(err, StoreError::Field(_)));
        assert!(Arc::ptr_eq(&before, &store.current()));
        assert_eq!(store.slot().writes(), 0);
    }

    #[test]
    fn reset_asks_the_question() {
        let mut store = RecordStore::open(MemorySlot::new());
        let mut asked = Vec::new();
        let done = store
            .reset(&mut |q: &str| {
                asked.push(q.to_string());
                false
            })
            .unwrap();
        assert!(!done);
        assert_eq!(asked, vec![RESET_QUESTION.to_string()]);
    }
}
