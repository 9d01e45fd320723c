//! One-shot lesson content generation against the Generative Language API.
//!
//! A request carries the lesson context, the response is constrained to a
//! six-field JSON object and decoded strictly. Nothing is retried or cached.

use crate::lesson::{Grade, LessonContent, LessonRecord, Subject, Term};
use crate::settings::ApiConfig;
use async_trait::async_trait;
use log::{info, warn};
use reqwest::{Client, StatusCode};
use serde::Deserialize;
use serde_json::{json, Value};
use thiserror::Error;

/// Everything the generator needs to know about the lesson.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContentRequest {
    pub subject: Subject,
    pub grade: Grade,
    pub lesson_title: String,
    pub unit_title: String,
    pub term: Term,
}

impl ContentRequest {
    pub fn from_record(record: &LessonRecord) -> Self {
        Self {
            subject: record.subject,
            grade: record.grade,
            lesson_title: record.lesson_title.trim().to_string(),
            unit_title: record.unit_title.trim().to_string(),
            term: record.term,
        }
    }
}

#[derive(Debug, Error)]
pub enum ContentFillError {
    #[error("API key is not configured (environment variable {0})")]
    MissingCredential(String),
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("model or API key rejected ({env}): {message}")]
    Credential { env: String, message: String },
    #[error("API error: {status} - {message}")]
    Api { status: u16, message: String },
    #[error("content service returned no text")]
    EmptyResponse,
    #[error("malformed lesson content: {0}")]
    Malformed(#[source] serde_json::Error),
    #[error("content request was dropped before it finished")]
    Cancelled,
}

impl ContentFillError {
    /// Message shown next to the fill button.
    pub fn user_message(&self) -> String {
        match self {
            ContentFillError::MissingCredential(var) => {
                format!("فشل الاتصال بالذكاء الاصطناعي. تأكد من ضبط {var}.")
            }
            ContentFillError::Credential { env, .. } => {
                format!("تعذر الوصول إلى نموذج التوليد. تأكد من صحة مفتاح {env} وإعدادات النموذج.")
            }
            ContentFillError::Http(_) | ContentFillError::Cancelled => {
                "تعذر الاتصال بخدمة التوليد. تحقق من الاتصال بالإنترنت ثم حاول مجدداً.".to_string()
            }
            ContentFillError::Api { status, .. } => {
                format!("رفضت خدمة التوليد الطلب (رمز {status}). حاول مجدداً لاحقاً.")
            }
            ContentFillError::EmptyResponse | ContentFillError::Malformed(_) => {
                "لم تُرجع خدمة التوليد محتوى صالحاً. حاول مجدداً.".to_string()
            }
        }
    }
}

/// Anything that can turn a lesson context into generated content.
#[async_trait]
pub trait ContentSource: Send + Sync {
    async fn generate(&self, request: &ContentRequest) -> Result<LessonContent, ContentFillError>;
}

pub fn build_prompt(request: &ContentRequest) -> String {
    format!(
        "أنت خبير تربوي في المناهج السعودية لعام 1447 هـ. قم بإعداد تحضير درس احترافي ومفصل للموضوع التالي:\n\
         المادة: {subject}\n\
         الصف: {grade}\n\
         الفصل الدراسي: {term}\n\
         الوحدة: {unit}\n\
         عنوان الدرس: {title}\n\
         \n\
         يجب أن يتضمن التحضير:\n\
         1. أهداف الدرس (قائمة من 3-5 أهداف سلوكية تراعي مهارات التفكير).\n\
         2. الوسائل التعليمية المقترحة.\n\
         3. تمهيد مشوق للدرس.\n\
         4. إجراءات التدريس (خطوات عملية للمعلم).\n\
         5. أساليب التقويم.\n\
         6. الواجب المنزلي.\n\
         \n\
         يرجى تقديم النتيجة بتنسيق JSON حصراً.",
        subject = request.subject,
        grade = request.grade,
        term = request.term,
        unit = request.unit_title,
        title = request.lesson_title,
    )
}

/// Schema the model output must follow. All six properties are required.
pub fn response_schema() -> Value {
    let string_list = json!({ "type": "ARRAY", "items": { "type": "STRING" } });
    json!({
        "type": "OBJECT",
        "properties": {
            "objectives": string_list,
            "materials": string_list,
            "introduction": { "type": "STRING" },
            "activities": string_list,
            "assessment": string_list,
            "homework": { "type": "STRING" },
        },
        "required": ["objectives", "materials", "introduction", "activities", "assessment", "homework"],
    })
}

pub fn request_body(request: &ContentRequest) -> Value {
    json!({
        "contents": [{
            "role": "user",
            "parts": [{ "text": build_prompt(request) }]
        }],
        "generationConfig": {
            "responseMimeType": "application/json",
            "responseSchema": response_schema(),
        }
    })
}

/// Strict decode of the model's JSON text into the six content fields.
pub fn decode_content(text: &str) -> Result<LessonContent, ContentFillError> {
    if text.trim().is_empty() {
        return Err(ContentFillError::EmptyResponse);
    }
    serde_json::from_str(text).map_err(ContentFillError::Malformed)
}

#[derive(Debug, Default, Deserialize)]
struct GenerateResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    #[serde(default)]
    content: Option<CandidateContent>,
}

#[derive(Debug, Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<Part>,
}

#[derive(Debug, Deserialize)]
struct Part {
    #[serde(default)]
    text: Option<String>,
}

impl GenerateResponse {
    fn first_text(&self) -> Option<String> {
        let parts = &self.candidates.first()?.content.as_ref()?.parts;
        let text: String = parts.iter().filter_map(|p| p.text.as_deref()).collect();
        if text.trim().is_empty() {
            None
        } else {
            Some(text)
        }
    }
}

#[derive(Debug, Deserialize)]
struct ErrorEnvelope {
    error: ApiErrorBody,
}

#[derive(Debug, Deserialize)]
struct ApiErrorBody {
    #[serde(default)]
    message: String,
    #[serde(default)]
    status: String,
}

/// `env` names the variable the key came from, for the user message.
fn classify_failure(status: StatusCode, body: &str, env: &str) -> ContentFillError {
    let parsed = serde_json::from_str::<ErrorEnvelope>(body).ok();
    let message = parsed
        .as_ref()
        .map(|e| e.error.message.clone())
        .filter(|m| !m.is_empty())
        .unwrap_or_else(|| body.trim().to_string());
    let not_found = parsed
        .as_ref()
        .map(|e| e.error.status == "NOT_FOUND")
        .unwrap_or(false);

    if not_found
        || matches!(
            status,
            StatusCode::NOT_FOUND | StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN
        )
    {
        ContentFillError::Credential {
            env: env.to_string(),
            message,
        }
    } else {
        ContentFillError::Api {
            status: status.as_u16(),
            message,
        }
    }
}

/// Generative Language API client (API key auth).
pub struct GeminiClient {
    client: Client,
    config: ApiConfig,
}

impl GeminiClient {
    pub fn new(config: ApiConfig) -> Result<Self, ContentFillError> {
        let client = Client::builder().build()?;
        Ok(Self { client, config })
    }

    pub fn model(&self) -> &str {
        &self.config.model
    }

    fn url(&self) -> String {
        format!(
            "{}/v1beta/models/{}:generateContent",
            self.config.endpoint.trim_end_matches('/'),
            self.config.model
        )
    }
}

#[async_trait]
impl ContentSource for GeminiClient {
    async fn generate(&self, request: &ContentRequest) -> Result<LessonContent, ContentFillError> {
        let api_key = self
            .config
            .api_key()
            .ok_or_else(|| ContentFillError::MissingCredential(self.config.api_key_env.clone()))?;

        info!(
            "[content] Requesting lesson content for \"{}\" ({}, {})",
            request.lesson_title, request.subject, request.grade
        );

        let resp = self
            .client
            .post(self.url())
            .header("content-type", "application/json")
            .header("x-goog-api-key", api_key)
            .json(&request_body(request))
            .send()
            .await?;

        let status = resp.status();
        let text = resp.text().await?;

        if !status.is_success() {
            let err = classify_failure(status, &text, &self.config.api_key_env);
            warn!("[content] Generation failed: {err}");
            return Err(err);
        }

        let envelope: GenerateResponse = if text.trim().is_empty() {
            GenerateResponse::default()
        } else {
            serde_json::from_str(&text).map_err(ContentFillError::Malformed)?
        };
        let content_text = envelope.first_text().ok_or(ContentFillError::EmptyResponse)?;
        decode_content(&content_text)
    }
}
