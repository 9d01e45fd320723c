use async_trait::async_trait;
use pretty_assertions::assert_eq;
use std::fs;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use tahdiri::content::{ContentFillError, ContentRequest, ContentSource};
use tahdiri::lesson::{FieldValue, LessonContent, LessonField, LessonRecord, Subject};
use tahdiri::session::{LessonSession, MISSING_TITLE_MESSAGE};
use tahdiri::storage::{JsonFileSlot, LessonSlot, MemorySlot};
use tahdiri::store::RecordStore;

/// Content source that counts calls and returns a fixed answer.
struct StubSource {
    calls: AtomicUsize,
    answer: fn() -> Result<LessonContent, ContentFillError>,
}

impl StubSource {
    fn new(answer: fn() -> Result<LessonContent, ContentFillError>) -> Self {
        Self {
            calls: AtomicUsize::new(0),
            answer,
        }
    }

    fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ContentSource for StubSource {
    async fn generate(&self, _request: &ContentRequest) -> Result<LessonContent, ContentFillError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        (self.answer)()
    }
}

fn generated() -> Result<LessonContent, ContentFillError> {
    Ok(LessonContent {
        objectives: vec!["أن يعدد الطالب خصائص الجمع".into()],
        materials: vec!["بطاقات الأعداد".into()],
        introduction: "لعبة سريعة بالبطاقات".into(),
        activities: vec!["نشاط جماعي".into(), "تمرين فردي".into()],
        assessment: vec!["سؤال شفهي".into()],
        homework: "حل تمارين الكتاب".into(),
    })
}

fn failing() -> Result<LessonContent, ContentFillError> {
    Err(ContentFillError::Api {
        status: 503,
        message: "overloaded".into(),
    })
}

fn malformed() -> Result<LessonContent, ContentFillError> {
    let err = serde_json::from_str::<LessonContent>(r#"{"objectives":["هدف"]}"#).unwrap_err();
    Err(ContentFillError::Malformed(err))
}

fn empty() -> Result<LessonContent, ContentFillError> {
    Err(ContentFillError::EmptyResponse)
}

fn titled_session(slot: MemorySlot) -> LessonSession<MemorySlot> {
    let mut session = LessonSession::new(RecordStore::open(slot));
    session.edit(LessonField::Subject, FieldValue::Subject(Subject::Mathematics));
    session.edit(
        LessonField::LessonTitle,
        FieldValue::Text("خصائص الجمع".into()),
    );
    session
}

#[test]
fn file_slot_survives_restart() {
    let dir = tempfile::tempdir().unwrap();
    let slot = JsonFileSlot::in_base(dir.path());

    let mut store = RecordStore::open(slot.clone());
    store
        .update(LessonField::TeacherName, FieldValue::Text("أ. نورة".into()))
        .unwrap();
    store
        .update(
            LessonField::Activities,
            FieldValue::List(vec!["أولاً".into(), "ثانياً".into()]),
        )
        .unwrap();
    let saved = store.current();
    drop(store);

    let reopened = RecordStore::open(JsonFileSlot::in_base(dir.path()));
    assert_eq!(*reopened.current(), *saved);
    assert!(slot.path().ends_with("drafts/last_lesson.json"));
}

#[test]
fn malformed_file_opens_as_default() {
    let dir = tempfile::tempdir().unwrap();
    let slot = JsonFileSlot::in_base(dir.path());
    fs::create_dir_all(slot.path().parent().unwrap()).unwrap();

    for payload in ["{not json", "[1,2,3]", "\"text\"", ""] {
        fs::write(slot.path(), payload).unwrap();
        let store = RecordStore::open(JsonFileSlot::in_base(dir.path()));
        assert_eq!(*store.current(), LessonRecord::default(), "payload {payload:?}");
    }
}

#[test]
fn handed_out_records_never_change() {
    let mut store = RecordStore::open(MemorySlot::new());
    let before = store.current();
    store
        .update(LessonField::Homework, FieldValue::Text("واجب".into()))
        .unwrap();

    assert_eq!(*before, LessonRecord::default());
    assert_eq!(store.current().homework, "واجب");
    assert!(!Arc::ptr_eq(&before, &store.current()));
}

#[tokio::test]
async fn blank_title_never_reaches_the_source() {
    let source = StubSource::new(generated);
    let mut session = LessonSession::new(RecordStore::open(MemorySlot::new()));
    session.edit(LessonField::LessonTitle, FieldValue::Text("  ".into()));

    assert!(!session.fill_with(&source).await);
    assert_eq!(source.calls(), 0);
    assert_eq!(session.error(), Some(MISSING_TITLE_MESSAGE));
}

#[tokio::test]
async fn generated_content_replaces_exactly_six_fields() {
    let source = StubSource::new(generated);
    let mut session = titled_session(MemorySlot::new());
    session.edit(LessonField::SchoolName, FieldValue::Text("مدرسة الرواد".into()));
    let before = session.record();

    assert!(session.fill_with(&source).await);
    assert_eq!(source.calls(), 1);

    let after = session.record();
    let content = generated().unwrap();
    let expected = LessonRecord {
        objectives: content.objectives,
        materials: content.materials,
        introduction: content.introduction,
        activities: content.activities,
        assessment: content.assessment,
        homework: content.homework,
        ..(*before).clone()
    };
    assert_eq!(*after, expected);
    assert_eq!(session.store().slot().load().unwrap().unwrap(), expected);
    assert!(!session.is_busy());
}

#[tokio::test]
async fn failed_fill_leaves_the_record_alone() {
    for answer in [failing, malformed, empty] {
        let source = StubSource::new(answer);
        let mut session = titled_session(MemorySlot::new());
        let before = session.record();
        let raw = session.store().slot().raw();
        let writes = session.store().slot().writes();

        assert!(!session.fill_with(&source).await);
        assert_eq!(source.calls(), 1);
        assert_eq!(*session.record(), *before);
        assert_eq!(session.store().slot().raw(), raw);
        assert_eq!(session.store().slot().writes(), writes);
        assert!(session.error().is_some());
        assert!(!session.is_busy());
    }
}

#[test]
fn declined_reset_keeps_everything() {
    let mut session = titled_session(MemorySlot::new());
    let before = session.record();
    let writes = session.store().slot().writes();

    assert!(!session.reset(&mut |_: &str| false));
    assert_eq!(*session.record(), *before);
    assert_eq!(session.store().slot().writes(), writes);
}

#[test]
fn accepted_reset_stores_a_fresh_card() {
    let mut session = titled_session(MemorySlot::new());

    assert!(session.reset(&mut |_: &str| true));
    assert_eq!(*session.record(), LessonRecord::default());
    assert_eq!(
        session.store().slot().load().unwrap().unwrap(),
        LessonRecord::default()
    );
}

#[test]
fn unknown_subject_falls_back_to_default() {
    let store = RecordStore::open(MemorySlot::with_raw(r#"{"subject":"X"}"#));
    assert_eq!(*store.current(), LessonRecord::default());
}

#[test]
fn partial_payload_merges_onto_defaults() {
    let store = RecordStore::open(MemorySlot::with_raw(r#"{"subject":"الرياضيات"}"#));
    let expected = LessonRecord {
        subject: Subject::Mathematics,
        ..LessonRecord::default()
    };
    assert_eq!(*store.current(), expected);
}
