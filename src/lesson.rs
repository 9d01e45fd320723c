use chrono::Local;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;
use thiserror::Error;

macro_rules! choice_set {
    ($(#[$meta:meta])* $name:ident { $($variant:ident => $label:literal),+ $(,)? }) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
        pub enum $name {
            $(
                #[serde(rename = $label)]
                $variant,
            )+
        }

        impl $name {
            pub const ALL: &'static [$name] = &[$($name::$variant),+];

            pub fn label(self) -> &'static str {
                match self {
                    $($name::$variant => $label,)+
                }
            }

            pub fn from_label(label: &str) -> Option<Self> {
                let label = label.trim();
                Self::ALL.iter().copied().find(|c| c.label() == label)
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.label())
            }
        }
    };
}

choice_set! {
    /// School subjects offered by the form.
    Subject {
        Quran => "القرآن الكريم",
        IslamicStudies => "الدراسات الإسلامية",
        Arabic => "اللغة العربية",
        Mathematics => "الرياضيات",
        Science => "العلوم",
        English => "اللغة الإنجليزية",
        SocialStudies => "الدراسات الاجتماعية",
        DigitalSkills => "المهارات الرقمية",
        ArtEducation => "التربية الفنية",
        PhysicalEducation => "التربية البدنية",
    }
}

choice_set! {
    Grade {
        Primary1 => "الأول الابتدائي",
        Primary2 => "الثاني الابتدائي",
        Primary3 => "الثالث الابتدائي",
        Primary4 => "الرابع الابتدائي",
        Primary5 => "الخامس الابتدائي",
        Primary6 => "السادس الابتدائي",
        Intermediate1 => "الأول متوسط",
        Intermediate2 => "الثاني متوسط",
        Intermediate3 => "الثالث متوسط",
        Secondary1 => "الأول ثانوي",
        Secondary2 => "الثاني ثانوي",
        Secondary3 => "الثالث ثانوي",
    }
}

choice_set! {
    Term {
        First => "الفصل الدراسي الأول",
        Second => "الفصل الدراسي الثاني",
    }
}

pub const DEFAULT_WEEK: &str = "الأول";
pub const DEFAULT_MATERIALS: [&str; 2] = ["الكتاب المدرسي", "السبورة الذكية"];
pub const DEFAULT_VISION_ALIGNMENT: &str =
    "تطوير المهارات الحياتية وتعزيز القيم الإسلامية والهوية الوطنية وفق رؤية المملكة 2030.";

/// Today's date as shown on a fresh lesson card.
pub fn today_label() -> String {
    Local::now().format("%Y/%m/%d").to_string()
}

/// The lesson plan being prepared.
///
/// Stored as camelCase JSON. Keys missing from a stored payload fall back to
/// the defaults; keys this version does not know about are kept in `extra`
/// and written back untouched.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct LessonRecord {
    pub teacher_name: String,
    pub school_name: String,
    pub edu_department: String,
    pub edu_office: String,
    pub subject: Subject,
    pub grade: Grade,
    pub term: Term,
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
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Default for LessonRecord {
    fn default() -> Self {
        Self {
            teacher_name: String::new(),
            school_name: String::new(),
            edu_department: String::new(),
            edu_office: String::new(),
            subject: Subject::Arabic,
            grade: Grade::Primary1,
            term: Term::First,
            week: DEFAULT_WEEK.to_string(),
            date: today_label(),
            unit_title: String::new(),
            lesson_title: String::new(),
            objectives: vec![String::new()],
            materials: DEFAULT_MATERIALS.iter().map(|m| m.to_string()).collect(),
            introduction: String::new(),
            activities: vec![String::new()],
            assessment: vec![String::new()],
            homework: String::new(),
            vision_alignment: DEFAULT_VISION_ALIGNMENT.to_string(),
            extra: Map::new(),
        }
    }
}

/// The six fields produced by a content fill. Every field is required.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LessonContent {
    pub objectives: Vec<String>,
    pub materials: Vec<String>,
    pub introduction: String,
    pub activities: Vec<String>,
    pub assessment: Vec<String>,
    pub homework: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    Text,
    List,
    Choice,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LessonField {
    TeacherName,
    SchoolName,
    EduDepartment,
    EduOffice,
    Subject,
    Grade,
    Term,
    Week,
    Date,
    UnitTitle,
    LessonTitle,
    Objectives,
    Materials,
    Introduction,
    Activities,
    Assessment,
    Homework,
    VisionAlignment,
}

impl LessonField {
    pub const ALL: &'static [LessonField] = &[
        LessonField::TeacherName,
        LessonField::SchoolName,
        LessonField::EduDepartment,
        LessonField::EduOffice,
        LessonField::Subject,
        LessonField::Grade,
        LessonField::Term,
        LessonField::Week,
        LessonField::Date,
        LessonField::UnitTitle,
        LessonField::LessonTitle,
        LessonField::Objectives,
        LessonField::Materials,
        LessonField::Introduction,
        LessonField::Activities,
        LessonField::Assessment,
        LessonField::Homework,
        LessonField::VisionAlignment,
    ];

    /// JSON key, also accepted by the CLI.
    pub fn key(self) -> &'static str {
        match self {
            LessonField::TeacherName => "teacherName",
            LessonField::SchoolName => "schoolName",
            LessonField::EduDepartment => "eduDepartment",
            LessonField::EduOffice => "eduOffice",
            LessonField::Subject => "subject",
            LessonField::Grade => "grade",
            LessonField::Term => "term",
            LessonField::Week => "week",
            LessonField::Date => "date",
            LessonField::UnitTitle => "unitTitle",
            LessonField::LessonTitle => "lessonTitle",
            LessonField::Objectives => "objectives",
            LessonField::Materials => "materials",
            LessonField::Introduction => "introduction",
            LessonField::Activities => "activities",
            LessonField::Assessment => "assessment",
            LessonField::Homework => "homework",
            LessonField::VisionAlignment => "visionAlignment",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            LessonField::TeacherName => "اسم المعلم",
            LessonField::SchoolName => "اسم المدرسة",
            LessonField::EduDepartment => "إدارة التعليم",
            LessonField::EduOffice => "مكتب التعليم",
            LessonField::Subject => "المادة",
            LessonField::Grade => "الصف",
            LessonField::Term => "الفصل الدراسي",
            LessonField::Week => "الأسبوع",
            LessonField::Date => "التاريخ",
            LessonField::UnitTitle => "عنوان الوحدة",
            LessonField::LessonTitle => "عنوان الدرس",
            LessonField::Objectives => "الأهداف",
            LessonField::Materials => "الوسائل التعليمية",
            LessonField::Introduction => "التمهيد",
            LessonField::Activities => "إجراءات التدريس",
            LessonField::Assessment => "التقويم",
            LessonField::Homework => "الواجب",
            LessonField::VisionAlignment => "المواءمة مع رؤية 2030",
        }
    }

    pub fn kind(self) -> FieldKind {
        match self {
            LessonField::Subject | LessonField::Grade | LessonField::Term => FieldKind::Choice,
            LessonField::Objectives
            | LessonField::Materials
            | LessonField::Activities
            | LessonField::Assessment => FieldKind::List,
            _ => FieldKind::Text,
        }
    }

    pub fn from_key(key: &str) -> Option<Self> {
        let key = key.trim();
        Self::ALL
            .iter()
            .copied()
            .find(|f| f.key().eq_ignore_ascii_case(key))
    }
}

impl fmt::Display for LessonField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldValue {
    Text(String),
    List(Vec<String>),
    Subject(Subject),
    Grade(Grade),
    Term(Term),
}

impl FieldValue {
    fn describe(&self) -> &'static str {
        match self {
            FieldValue::Text(_) => "text",
            FieldValue::List(_) => "list",
            FieldValue::Subject(_) => "subject",
            FieldValue::Grade(_) => "grade",
            FieldValue::Term(_) => "term",
        }
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
#[error("field {field} does not accept a {given} value")]
pub struct FieldMismatch {
    pub field: LessonField,
    pub given: &'static str,
}

impl LessonRecord {
    pub fn field(&self, field: LessonField) -> FieldValue {
        match field {
            LessonField::TeacherName => FieldValue::Text(self.teacher_name.clone()),
            LessonField::SchoolName => FieldValue::Text(self.school_name.clone()),
            LessonField::EduDepartment => FieldValue::Text(self.edu_department.clone()),
            LessonField::EduOffice => FieldValue::Text(self.edu_office.clone()),
            LessonField::Subject => FieldValue::Subject(self.subject),
            LessonField::Grade => FieldValue::Grade(self.grade),
            LessonField::Term => FieldValue::Term(self.term),
            LessonField::Week => FieldValue::Text(self.week.clone()),
            LessonField::Date => FieldValue::Text(self.date.clone()),
            LessonField::UnitTitle => FieldValue::Text(self.unit_title.clone()),
            LessonField::LessonTitle => FieldValue::Text(self.lesson_title.clone()),
            LessonField::Objectives => FieldValue::List(self.objectives.clone()),
            LessonField::Materials => FieldValue::List(self.materials.clone()),
            LessonField::Introduction => FieldValue::Text(self.introduction.clone()),
            LessonField::Activities => FieldValue::List(self.activities.clone()),
            LessonField::Assessment => FieldValue::List(self.assessment.clone()),
            LessonField::Homework => FieldValue::Text(self.homework.clone()),
            LessonField::VisionAlignment => FieldValue::Text(self.vision_alignment.clone()),
        }
    }

    /// Copy of this record with one field replaced.
    pub fn with_field(
        &self,
        field: LessonField,
        value: FieldValue,
    ) -> Result<LessonRecord, FieldMismatch> {
        let mut next = self.clone();
        let given = value.describe();
        let mismatch = FieldMismatch { field, given };

        match (field, value) {
            (LessonField::Subject, FieldValue::Subject(s)) => next.subject = s,
            (LessonField::Grade, FieldValue::Grade(g)) => next.grade = g,
            (LessonField::Term, FieldValue::Term(t)) => next.term = t,
            (f, FieldValue::List(items)) if f.kind() == FieldKind::List => {
                *next.list_mut(f).ok_or(mismatch)? = items;
            }
            (f, FieldValue::Text(text)) if f.kind() == FieldKind::Text => {
                *next.text_mut(f).ok_or(mismatch)? = text;
            }
            _ => return Err(mismatch),
        }

        Ok(next)
    }

    /// Copy of this record with the six generated fields taken from `content`.
    pub fn with_content(&self, content: LessonContent) -> LessonRecord {
        LessonRecord {
            objectives: content.objectives,
            materials: content.materials,
            introduction: content.introduction,
            activities: content.activities,
            assessment: content.assessment,
            homework: content.homework,
            ..self.clone()
        }
    }

    fn text_mut(&mut self, field: LessonField) -> Option<&mut String> {
        Some(match field {
            LessonField::TeacherName => &mut self.teacher_name,
            LessonField::SchoolName => &mut self.school_name,
            LessonField::EduDepartment => &mut self.edu_department,
            LessonField::EduOffice => &mut self.edu_office,
            LessonField::Week => &mut self.week,
            LessonField::Date => &mut self.date,
            LessonField::UnitTitle => &mut self.unit_title,
            LessonField::LessonTitle => &mut self.lesson_title,
            LessonField::Introduction => &mut self.introduction,
            LessonField::Homework => &mut self.homework,
            LessonField::VisionAlignment => &mut self.vision_alignment,
            _ => return None,
        })
    }

    fn list_mut(&mut self, field: LessonField) -> Option<&mut Vec<String>> {
        Some(match field {
            LessonField::Objectives => &mut self.objectives,
            LessonField::Materials => &mut self.materials,
            LessonField::Activities => &mut self.activities,
            LessonField::Assessment => &mut self.assessment,
            _ => return None,
        })
    }
}

/// Entries of a list field that are worth showing.
pub fn filled_entries(items: &[String]) -> Vec<String> {
    items
        .iter()
        .map(|s| s.trim())
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}
