use crate::lesson::{filled_entries, LessonRecord};
use askama::Template;

pub const BLANK: &str = ".........";
pub const TITLE_PLACEHOLDER: &str = "حدد عنوان الدرس";
pub const INTRO_PLACEHOLDER: &str = "أدخل مقدمة الدرس هنا...";
pub const HOMEWORK_PLACEHOLDER: &str = "توليد الواجب...";
pub const OBJECTIVES_PLACEHOLDER: &str = "بانتظار توليد الأهداف...";

fn or_placeholder(value: &str, placeholder: &str) -> String {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        placeholder.to_string()
    } else {
        trimmed.to_string()
    }
}

/// Lesson card ready to print: scalars resolved, lists without blanks.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PreviewDocument {
    pub teacher_name: String,
    pub school_name: String,
    pub edu_department: String,
    pub edu_office: String,
    pub subject: String,
    pub grade: String,
    pub term: String,
    pub week: String,
    pub date: String,
    pub unit_title: String,
    pub lesson_title: String,
    pub objectives: Vec<String>,
    pub materials: Vec<String>,
    pub introduction: String,
    pub activities: Vec<String>,
    pub assessment: Vec<String>,
    pub homework: String,
    pub vision_alignment: String,
}

impl PreviewDocument {
    pub fn from_record(record: &LessonRecord) -> Self {
        Self {
            teacher_name: or_placeholder(&record.teacher_name, BLANK),
            school_name: or_placeholder(&record.school_name, BLANK),
            edu_department: or_placeholder(&record.edu_department, BLANK),
            edu_office: or_placeholder(&record.edu_office, BLANK),
            subject: record.subject.label().to_string(),
            grade: record.grade.label().to_string(),
            term: record.term.label().to_string(),
            week: or_placeholder(&record.week, BLANK),
            date: or_placeholder(&record.date, BLANK),
            unit_title: or_placeholder(&record.unit_title, BLANK),
            lesson_title: or_placeholder(&record.lesson_title, TITLE_PLACEHOLDER),
            objectives: filled_entries(&record.objectives),
            materials: filled_entries(&record.materials),
            introduction: or_placeholder(&record.introduction, INTRO_PLACEHOLDER),
            activities: filled_entries(&record.activities),
            assessment: filled_entries(&record.assessment),
            homework: or_placeholder(&record.homework, HOMEWORK_PLACEHOLDER),
            vision_alignment: or_placeholder(&record.vision_alignment, BLANK),
        }
    }
}

#[derive(Template)]
#[template(path = "lesson_card.html")]
struct LessonCardTemplate<'a> {
    doc: &'a PreviewDocument,
    objectives_placeholder: &'a str,
}

/// Standalone A4 page for the browser's print / save-as-PDF dialog.
pub fn render_html(record: &LessonRecord) -> Result<String, askama::Error> {
    let doc = PreviewDocument::from_record(record);
    LessonCardTemplate {
        doc: &doc,
        objectives_placeholder: OBJECTIVES_PLACEHOLDER,
    }
    .render()
}

/// Plain-text block for pasting into the school platform.
pub fn render_text(record: &LessonRecord) -> String {
    format!(
        "تحضير درس: {title}\n\
         المادة: {subject} | الصف: {grade} | {term}\n\
         \n\
         الأهداف:\n\
         {objectives}\n\
         \n\
         التمهيد:\n\
         {introduction}\n\
         \n\
         الإجراءات:\n\
         {activities}\n\
         \n\
         الواجب:\n\
         {homework}\n",
        title = record.lesson_title.trim(),
        subject = record.subject,
        grade = record.grade,
        term = record.term,
        objectives = filled_entries(&record.objectives).join("\n"),
        introduction = record.introduction.trim(),
        activities = filled_entries(&record.activities).join("\n"),
        homework = record.homework.trim(),
    )
}
