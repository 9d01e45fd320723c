//! Property tests for the lesson record: persistence round trips, fallback on
//! bad payloads, snapshot immutability and blank filtering in every renderer.

use proptest::prelude::*;
use serde_json::{Map, Value};
use tahdiri::lesson::{FieldKind, FieldValue, Grade, LessonField, LessonRecord, Subject, Term};
use tahdiri::preview::{render_html, render_text, PreviewDocument};
use tahdiri::storage::{decode_record, JsonFileSlot, LessonSlot, MemorySlot};
use tahdiri::store::RecordStore;

// ============================================================================
// Strategies
// ============================================================================

fn arb_text() -> impl Strategy<Value = String> {
    "\\PC{0,24}"
}

fn arb_list() -> impl Strategy<Value = Vec<String>> {
    prop::collection::vec(arb_text(), 0..5)
}

/// Keys that never collide with a record field.
fn arb_extra() -> impl Strategy<Value = Map<String, Value>> {
    prop::collection::btree_map("x_[a-z]{1,8}", arb_text(), 0..3).prop_map(|entries| {
        entries
            .into_iter()
            .map(|(k, v)| (k, Value::String(v)))
            .collect()
    })
}

fn arb_record() -> impl Strategy<Value = LessonRecord> {
    let header = (
        arb_text(),
        arb_text(),
        arb_text(),
        arb_text(),
        prop::sample::select(Subject::ALL),
        prop::sample::select(Grade::ALL),
        prop::sample::select(Term::ALL),
        arb_text(),
        arb_text(),
        arb_text(),
        arb_text(),
    );
    let body = (
        arb_list(),
        arb_list(),
        arb_text(),
        arb_list(),
        arb_list(),
        arb_text(),
        arb_text(),
        arb_extra(),
    );
    (header, body).prop_map(
        |(
            (
                teacher_name,
                school_name,
                edu_department,
                edu_office,
                subject,
                grade,
                term,
                week,
                date,
                unit_title,
                lesson_title,
            ),
            (
                objectives,
                materials,
                introduction,
                activities,
                assessment,
                homework,
                vision_alignment,
                extra,
            ),
        )| LessonRecord {
            teacher_name,
            school_name,
            edu_department,
            edu_office,
            subject,
            grade,
            term,
            week,
            date,
            unit_title,
            lesson_title,
            objectives,
            materials,
            introduction,
            activities,
            assessment,
            homework,
            vision_alignment,
            extra,
        },
    )
}

/// Text that does not decode into a record.
fn arb_bad_payload() -> impl Strategy<Value = String> {
    prop_oneof![
        any::<String>().prop_filter("must not decode", |raw| decode_record(raw).is_err()),
        "[A-Za-z ]{0,12}".prop_map(|s| format!(r#"{{"subject":"{s}"}}"#)),
        "[A-Za-z ]{0,12}".prop_map(|s| format!(r#"{{"term":"{s}","week":"2"}}"#)),
        any::<i64>().prop_map(|n| format!(r#"{{"objectives":{n}}}"#)),
        any::<bool>().prop_map(|b| format!(r#"{{"lessonTitle":{b}}}"#)),
        prop::collection::vec(any::<i32>(), 0..4).prop_map(|v| format!("{v:?}")),
    ]
}

fn arb_text_field() -> impl Strategy<Value = LessonField> {
    let text_fields: Vec<LessonField> = LessonField::ALL
        .iter()
        .copied()
        .filter(|f| f.kind() == FieldKind::Text)
        .collect();
    prop::sample::select(text_fields)
}

/// List entries where roughly half are blank or whitespace only.
fn arb_padded_list() -> impl Strategy<Value = Vec<String>> {
    let entry = prop_oneof![
        "[ \t]{0,3}",
        ("[ \t]{0,3}", "[a-zء-ي]{1,8}", "[ \t]{0,3}").prop_map(|(l, w, r)| format!("{l}{w}{r}")),
    ];
    prop::collection::vec(entry, 0..6)
}

// ============================================================================
// Helpers
// ============================================================================

/// The default card, with the date taken from `record` so a test that runs
/// across midnight still compares equal.
fn default_like(record: &LessonRecord) -> LessonRecord {
    LessonRecord {
        date: record.date.clone(),
        ..LessonRecord::default()
    }
}

/// Text between every `open` and the following `close`.
fn segments<'a>(html: &'a str, open: &str, close: &str) -> Vec<&'a str> {
    html.split(open)
        .skip(1)
        .filter_map(|rest| rest.split(close).next())
        .collect()
}

/// Lines of the block that follows `heading` in the clipboard text.
fn text_block<'a>(text: &'a str, heading: &str, next: &str) -> &'a str {
    let start = text.find(heading).map(|i| i + heading.len()).unwrap_or(0);
    let rest = &text[start..];
    let end = rest.find(next).unwrap_or(rest.len());
    &rest[..end]
}

// ============================================================================
// Properties
// ============================================================================

proptest! {
    #[test]
    fn memory_slot_returns_what_was_saved(record in arb_record()) {
        let slot = MemorySlot::new();
        slot.save(&record).unwrap();
        prop_assert_eq!(slot.load().unwrap(), Some(record));
    }

    #[test]
    fn bad_payloads_open_as_the_default_card(raw in arb_bad_payload()) {
        let store = RecordStore::open(MemorySlot::with_raw(raw.clone()));
        let current = store.current();
        prop_assert_eq!(&*current, &default_like(&current), "payload {:?}", raw);
    }

    #[test]
    fn snapshots_survive_later_updates(
        field in arb_text_field(),
        value in arb_text(),
        record in arb_record(),
    ) {
        let slot = MemorySlot::new();
        slot.save(&record).unwrap();
        let mut store = RecordStore::open(slot);
        let snapshot = store.current();

        store.update(field, FieldValue::Text(value.clone())).unwrap();

        prop_assert_eq!(&*snapshot, &record);
        prop_assert_eq!(store.current().field(field), FieldValue::Text(value));
    }

    #[test]
    fn renderers_never_show_blank_entries(
        objectives in arb_padded_list(),
        materials in arb_padded_list(),
        activities in arb_padded_list(),
        assessment in arb_padded_list(),
    ) {
        let record = LessonRecord {
            objectives,
            materials,
            activities,
            assessment,
            ..LessonRecord::default()
        };

        let doc = PreviewDocument::from_record(&record);
        for list in [&doc.objectives, &doc.materials, &doc.activities, &doc.assessment] {
            for entry in list {
                prop_assert!(!entry.is_empty());
                prop_assert_eq!(entry.trim(), entry.as_str());
            }
        }

        let html = render_html(&record).unwrap();
        for item in segments(&html, "<li>", "</li>")
            .into_iter()
            .chain(segments(&html, "<span>", "</span>"))
        {
            prop_assert!(!item.trim().is_empty(), "blank entry in {}", html);
        }
        prop_assert_eq!(
            segments(&html, "<li>", "</li>").len(),
            doc.objectives.len() + doc.activities.len() + doc.assessment.len()
        );

        let text = render_text(&record);
        for block in [
            text_block(&text, "الأهداف:\n", "\n\nالتمهيد:"),
            text_block(&text, "الإجراءات:\n", "\n\nالواجب:"),
        ] {
            for line in block.lines() {
                prop_assert!(!line.trim().is_empty(), "blank line in {:?}", text);
            }
        }
    }
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(32))]

    #[test]
    fn file_slot_returns_what_was_saved(record in arb_record()) {
        let dir = tempfile::tempdir().unwrap();
        let slot = JsonFileSlot::in_base(dir.path());
        slot.save(&record).unwrap();
        prop_assert_eq!(JsonFileSlot::in_base(dir.path()).load().unwrap(), Some(record));
    }
}
