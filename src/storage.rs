use crate::lesson::LessonRecord;
use parking_lot::Mutex;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use thiserror::Error;

/// Name of the single slot holding the draft lesson.
pub const SLOT_NAME: &str = "last_lesson";

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("could not access {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("could not encode lesson: {0}")]
    Encode(#[source] serde_json::Error),
    #[error("stored lesson is malformed: {0}")]
    Decode(#[source] serde_json::Error),
    #[error(transparent)]
    Field(#[from] crate::lesson::FieldMismatch),
}

/// Where the current lesson lives between sessions.
///
/// `save` always writes the whole record; there are no field-level patches.
pub trait LessonSlot {
    fn load(&self) -> Result<Option<LessonRecord>, StoreError>;
    fn save(&self, record: &LessonRecord) -> Result<(), StoreError>;
}

impl<T: LessonSlot + ?Sized> LessonSlot for Arc<T> {
    fn load(&self) -> Result<Option<LessonRecord>, StoreError> {
        (**self).load()
    }

    fn save(&self, record: &LessonRecord) -> Result<(), StoreError> {
        (**self).save(record)
    }
}

pub fn encode_record(record: &LessonRecord) -> Result<String, StoreError> {
    serde_json::to_string_pretty(record).map_err(StoreError::Encode)
}

pub fn decode_record(raw: &str) -> Result<LessonRecord, StoreError> {
    serde_json::from_str(raw).map_err(StoreError::Decode)
}

/// Slot backed by `<base>/drafts/last_lesson.json`.
#[derive(Debug, Clone)]
pub struct JsonFileSlot {
    path: PathBuf,
}

impl JsonFileSlot {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn in_base(base: &Path) -> Self {
        Self::new(base.join("drafts").join(format!("{SLOT_NAME}.json")))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn io_error(&self, source: io::Error) -> StoreError {
        StoreError::Io {
            path: self.path.clone(),
            source,
        }
    }
}

impl LessonSlot for JsonFileSlot {
    fn load(&self) -> Result<Option<LessonRecord>, StoreError> {
        if !self.path.exists() {
            return Ok(None);
        }
        let contents = fs::read_to_string(&self.path).map_err(|e| self.io_error(e))?;
        decode_record(&contents).map(Some)
    }

    fn save(&self, record: &LessonRecord) -> Result<(), StoreError> {
        let json = encode_record(record)?;
        if let Some(dir) = self.path.parent() {
            fs::create_dir_all(dir).map_err(|e| self.io_error(e))?;
        }
        fs::write(&self.path, json).map_err(|e| self.io_error(e))
    }
}

/// In-memory slot holding the raw serialized text, for tests and dry runs.
#[derive(Debug, Default)]
pub struct MemorySlot {
    raw: Mutex<Option<String>>,
    writes: Mutex<usize>,
}

impl MemorySlot {
    pub fn new() -> Self {
        Self::default()
    }

    /// Slot pre-filled with arbitrary text, well-formed or not.
    pub fn with_raw(raw: impl Into<String>) -> Self {
        Self {
            raw: Mutex::new(Some(raw.into())),
            writes: Mutex::new(0),
        }
    }

    pub fn raw(&self) -> Option<String> {
        self.raw.lock().clone()
    }

    pub fn writes(&self) -> usize {
        *self.writes.lock()
    }
}

impl LessonSlot for MemorySlot {
    fn load(&self) -> Result<Option<LessonRecord>, StoreError> {
        match self.raw.lock().as_deref() {
            Some(raw) => decode_record(raw).map(Some),
            None => Ok(None),
        }
    }

    fn save(&self, record: &LessonRecord) -> Result<(), StoreError> {
        let json = encode_record(record)?;
        *self.raw.lock() = Some(json);
        *self.writes.lock() += 1;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lesson::{Grade, Subject};
    use pretty_assertions::assert_eq;

    fn sample() -> LessonRecord {
        LessonRecord {
            teacher_name: "أ. سارة".into(),
            subject: Subject::Science,
            grade: Grade::Intermediate2,
            lesson_title: "الخلية".into(),
            objectives: vec!["يعدد أجزاء الخلية".into(), "   ".into()],
            ..LessonRecord::default()
        }
    }

    #[test]
    fn file_slot_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let slot = JsonFileSlot::in_base(dir.path());
        assert!(slot.load().unwrap().is_none());

        let record = sample();
        slot.save(&record).unwrap();
        assert!(slot.path().ends_with("drafts/last_lesson.json"));
        assert_eq!(slot.load().unwrap(), Some(record));
    }

    #[test]
    fn file_slot_reports_malformed_payload() {
        let dir = tempfile::tempdir().unwrap();
        let slot = JsonFileSlot::in_base(dir.path());
        fs::create_dir_all(slot.path().parent().unwrap()).unwrap();
        fs::write(slot.path(), "{ not json").unwrap();
        assert!(matches!(slot.load(), Err(StoreError::Decode(_))));
    }

    #[test]
    fn memory_slot_counts_writes() {
        let slot = MemorySlot::new();
        slot.save(&sample()).unwrap();
        slot.save(&sample()).unwrap();
        assert_eq!(slot.writes(), 2);
        assert_eq!(slot.load().unwrap(), Some(sample()));
    }

    #[test]
    fn unknown_keys_survive_a_round_trip() {
        let raw = r#"{"id":"abc","lessonTitle":"الكسور","legacyFlag":true}"#;
        let record = decode_record(raw).unwrap();
        assert_eq!(record.lesson_title, "الكسور");
        assert_eq!(record.extra.get("id"), Some(&serde_json::json!("abc")));

        let again = decode_record(&encode_record(&record).unwrap()).unwrap();
        assert_eq!(again.extra.get("legacyFlag"), Some(&serde_json::json!(true)));
    }
}
