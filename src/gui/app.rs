use crate::content::{ContentFillError, ContentSource, GeminiClient};
use crate::gui::preview;
use crate::lesson::{
    FieldValue, Grade, LessonContent, LessonField, LessonRecord, Subject, Term,
};
use crate::preview::PreviewDocument;
use crate::runtime;
use crate::session::LessonSession;
use crate::settings::{print_dir, save_settings, Settings};
use crate::storage::JsonFileSlot;
use crate::store::RecordStore;
use crate::theme::{
    apply_theme, ensure_theme_files, install_fonts, load_presets, pick_theme, ThemeConfig,
};
use eframe::{
    egui::{
        self, menu, Align, CentralPanel, Context, Layout, RichText, ScrollArea, SidePanel,
        TextEdit, TopBottomPanel, Ui,
    },
    App, CreationContext,
};
use log::{error, info, warn};
use rfd::{MessageButtons, MessageDialog, MessageDialogResult, MessageLevel};
use std::path::PathBuf;
use std::time::{Duration, Instant};
use tokio::sync::oneshot::{self, error::TryRecvError};

type FillResult = Result<LessonContent, ContentFillError>;
type Edit = (LessonField, FieldValue);

const HEADER_FIELDS: [LessonField; 4] = [
    LessonField::TeacherName,
    LessonField::SchoolName,
    LessonField::EduDepartment,
    LessonField::EduOffice,
];

const LIST_FIELDS: [LessonField; 4] = [
    LessonField::Objectives,
    LessonField::Materials,
    LessonField::Activities,
    LessonField::Assessment,
];

pub struct TahdiriApp {
    settings: Settings,
    base_path: PathBuf,
    session: LessonSession<JsonFileSlot>,
    theme: ThemeConfig,
    presets: Vec<ThemeConfig>,
    pending_fill: Option<oneshot::Receiver<FillResult>>,
    status: Option<String>,
}

impl TahdiriApp {
    pub fn new(cc: &CreationContext<'_>, base_path: PathBuf, settings: Settings) -> Self {
        if let Err(e) = ensure_theme_files(&base_path) {
            warn!("[gui] Could not write theme presets: {e}");
        }
        let presets = load_presets(&base_path);
        let theme = pick_theme(&presets, settings.ui.last_theme.as_deref());
        install_fonts(&cc.egui_ctx, settings.ui.font_path.as_deref());
        apply_theme(&theme, &cc.egui_ctx);

        let store = RecordStore::open(JsonFileSlot::in_base(&base_path));
        Self {
            settings,
            base_path,
            session: LessonSession::new(store),
            theme,
            presets,
            pending_fill: None,
            status: None,
        }
    }

    fn switch_theme(&mut self, name: &str, ctx: &Context) {
        self.theme = pick_theme(&self.presets, Some(name));
        apply_theme(&self.theme, ctx);
        self.settings.ui.last_theme = Some(self.theme.name.clone());
        if let Err(e) = save_settings(&self.settings, &self.base_path) {
            warn!("[gui] Could not save settings: {e}");
        }
    }

    fn start_fill(&mut self) {
        let Some(request) = self.session.begin_fill() else {
            return;
        };
        let client = match GeminiClient::new(self.settings.api.clone()) {
            Ok(client) => client,
            Err(e) => {
                self.session.finish_fill(Err(e));
                return;
            }
        };
        let rt = match runtime::shared() {
            Ok(rt) => rt,
            Err(e) => {
                error!("[gui] Could not start the request runtime: {e}");
                self.session.finish_fill(Err(ContentFillError::Cancelled));
                return;
            }
        };

        info!("[gui] Content fill started with model {}", client.model());
        let (tx, rx) = oneshot::channel();
        rt.spawn(async move {
            let result = client.generate(&request).await;
            let _ = tx.send(result);
        });
        self.pending_fill = Some(rx);
    }

    fn poll_fill(&mut self, ctx: &Context) {
        let Some(rx) = self.pending_fill.as_mut() else {
            return;
        };
        match rx.try_recv() {
            Ok(result) => {
                self.pending_fill = None;
                self.session.finish_fill(result);
            }
            Err(TryRecvError::Empty) => ctx.request_repaint_after(Duration::from_millis(100)),
            Err(TryRecvError::Closed) => {
                self.pending_fill = None;
                self.session.finish_fill(Err(ContentFillError::Cancelled));
            }
        }
    }

    fn copy_card(&mut self, ctx: &Context) {
        let text = self.session.copy_text(Instant::now());
        ctx.output_mut(|o| o.copied_text = text);
    }

    fn print_card(&mut self) {
        let dir = print_dir(&self.base_path);
        match self.session.export_print(&dir) {
            Ok(path) => {
                info!("[gui] Print view written to {}", path.display());
                self.status = match open::that(&path) {
                    Ok(()) => None,
                    Err(e) => {
                        warn!("[gui] Could not open browser: {e}");
                        Some(format!("تم حفظ البطاقة في {}", path.display()))
                    }
                };
            }
            Err(e) => {
                error!("[gui] Could not write print view: {e}");
                self.status = Some(format!("تعذر تجهيز الطباعة: {e}"));
            }
        }
    }

    fn confirm_reset(&mut self) {
        let mut ask = |question: &str| {
            let answer = MessageDialog::new()
                .set_level(MessageLevel::Warning)
                .set_title("إعادة تعيين")
                .set_description(question)
                .set_buttons(MessageButtons::YesNo)
                .show();
            matches!(answer, MessageDialogResult::Yes)
        };
        if self.session.reset(&mut ask) {
            self.status = None;
        }
    }

    fn render_menu_bar(&mut self, ctx: &Context, ui: &mut Ui) {
        menu::bar(ui, |ui| {
            ui.menu_button("ملف", |ui| {
                if ui.button("طباعة / حفظ PDF").clicked() {
                    self.print_card();
                    ui.close_menu();
                }
                if ui.button("نسخ النص").clicked() {
                    self.copy_card(ctx);
                    ui.close_menu();
                }
                if ui.button("إعادة تعيين").clicked() {
                    ui.close_menu();
                    self.confirm_reset();
                }
                ui.separator();
                if ui.button("خروج").clicked() {
                    ctx.send_viewport_cmd(egui::ViewportCommand::Close);
                }
            });

            ui.menu_button("عرض", |ui| {
                let names: Vec<String> = self.presets.iter().map(|p| p.name.clone()).collect();
                for name in names {
                    let selected = self.theme.name == name;
                    if ui.selectable_label(selected, name.as_str()).clicked() {
                        self.switch_theme(&name, ctx);
                        ui.close_menu();
                    }
                }
            });
        });
    }

    fn render_actions(&mut self, ctx: &Context, ui: &mut Ui) {
        ui.with_layout(Layout::right_to_left(Align::Center), |ui| {
            let busy = self.session.is_busy();
            let label = if busy {
                "جاري التوليد..."
            } else {
                "توليد المحتوى بالذكاء الاصطناعي"
            };
            if ui
                .add_enabled(!busy, egui::Button::new(RichText::new(label).strong()))
                .clicked()
            {
                self.start_fill();
            }
            if busy {
                ui.spinner();
            }

            ui.separator();
            if ui.button("طباعة").clicked() {
                self.print_card();
            }
            let now = Instant::now();
            if self.session.copied_visible(now) {
                ui.label(RichText::new("تم النسخ").color(self.theme.accent()));
                ctx.request_repaint_after(Duration::from_millis(250));
            } else if ui.button("نسخ النص").clicked() {
                self.copy_card(ctx);
            }
            if ui.button("إعادة تعيين").clicked() {
                self.confirm_reset();
            }

            if let Some(message) = self.session.error().or(self.status.as_deref()) {
                ui.label(RichText::new(message).color(self.theme.danger()));
            }
        });
    }

    fn render_form(&mut self, ui: &mut Ui) {
        let record = self.session.record();
        let mut edits: Vec<Edit> = Vec::new();

        ScrollArea::vertical()
            .auto_shrink([false; 2])
            .show(ui, |ui| {
                ui.with_layout(Layout::top_down(Align::Max), |ui| {
                    ui.heading("بيانات المدرسة");
                    for field in HEADER_FIELDS {
                        text_row(ui, field, &record, &mut edits);
                    }

                    ui.separator();
                    ui.heading("بيانات الدرس");
                    if let Some(s) = choice_row(ui, "المادة", record.subject, Subject::ALL, Subject::label) {
                        edits.push((LessonField::Subject, FieldValue::Subject(s)));
                    }
                    if let Some(g) = choice_row(ui, "الصف", record.grade, Grade::ALL, Grade::label) {
                        edits.push((LessonField::Grade, FieldValue::Grade(g)));
                    }
                    if let Some(t) = choice_row(ui, "الفصل الدراسي", record.term, Term::ALL, Term::label) {
                        edits.push((LessonField::Term, FieldValue::Term(t)));
                    }
                    for field in [
                        LessonField::Week,
                        LessonField::Date,
                        LessonField::UnitTitle,
                        LessonField::LessonTitle,
                    ] {
                        text_row(ui, field, &record, &mut edits);
                    }

                    ui.separator();
                    ui.heading("محتوى الدرس");
                    for field in LIST_FIELDS {
                        if let FieldValue::List(items) = record.field(field) {
                            if let Some(next) = list_editor(ui, field, &items) {
                                edits.push((field, FieldValue::List(next)));
                            }
                        }
                    }
                    for field in [
                        LessonField::Introduction,
                        LessonField::Homework,
                        LessonField::VisionAlignment,
                    ] {
                        text_area(ui, field, &record, &mut edits);
                    }
                });
            });

        for (field, value) in edits {
            self.session.edit(field, value);
        }
    }
}

fn text_of(record: &LessonRecord, field: LessonField) -> String {
    match record.field(field) {
        FieldValue::Text(text) => text,
        _ => String::new(),
    }
}

fn text_row(ui: &mut Ui, field: LessonField, record: &LessonRecord, edits: &mut Vec<Edit>) {
    let mut value = text_of(record, field);
    ui.with_layout(Layout::right_to_left(Align::Center), |ui| {
        ui.label(field.label());
        if ui
            .add(TextEdit::singleline(&mut value).desired_width(f32::INFINITY))
            .changed()
        {
            edits.push((field, FieldValue::Text(value.clone())));
        }
    });
}

fn text_area(ui: &mut Ui, field: LessonField, record: &LessonRecord, edits: &mut Vec<Edit>) {
    let mut value = text_of(record, field);
    ui.label(RichText::new(field.label()).strong());
    if ui
        .add(
            TextEdit::multiline(&mut value)
                .desired_rows(3)
                .desired_width(f32::INFINITY),
        )
        .changed()
    {
        edits.push((field, FieldValue::Text(value)));
    }
}

fn choice_row<T: Copy + PartialEq>(
    ui: &mut Ui,
    label: &str,
    current: T,
    all: &[T],
    name: fn(T) -> &'static str,
) -> Option<T> {
    let mut selected = current;
    ui.with_layout(Layout::right_to_left(Align::Center), |ui| {
        ui.label(label);
        egui::ComboBox::from_id_source(label)
            .selected_text(name(current))
            .show_ui(ui, |ui| {
                for choice in all {
                    ui.selectable_value(&mut selected, *choice, name(*choice));
                }
            });
    });
    (selected != current).then_some(selected)
}

/// One row per entry with a remove button, plus an add button.
fn list_editor(ui: &mut Ui, field: LessonField, items: &[String]) -> Option<Vec<String>> {
    let mut next = items.to_vec();
    let mut changed = false;
    let mut remove = None;

    ui.label(RichText::new(field.label()).strong());
    for (i, item) in next.iter_mut().enumerate() {
        ui.with_layout(Layout::right_to_left(Align::Center), |ui| {
            if ui.small_button("✕").on_hover_text("حذف").clicked() {
                remove = Some(i);
            }
            changed |= ui
                .add(TextEdit::singleline(item).desired_width(f32::INFINITY))
                .changed();
        });
    }
    if let Some(i) = remove {
        next.remove(i);
        changed = true;
    }
    if ui.small_button("+ إضافة").clicked() {
        next.push(String::new());
        changed = true;
    }

    changed.then_some(next)
}

impl App for TahdiriApp {
    fn update(&mut self, ctx: &Context, _frame: &mut eframe::Frame) {
        self.poll_fill(ctx);

        TopBottomPanel::top("menu_bar").show(ctx, |ui| self.render_menu_bar(ctx, ui));
        TopBottomPanel::top("actions").show(ctx, |ui| self.render_actions(ctx, ui));

        SidePanel::right("form")
            .resizable(true)
            .default_width(440.0)
            .show(ctx, |ui| self.render_form(ui));

        let doc = PreviewDocument::from_record(&self.session.record());
        CentralPanel::default().show(ctx, |ui| {
            ScrollArea::vertical()
                .auto_shrink([false; 2])
                .show(ui, |ui| preview::show(ui, &doc, &self.theme));
        });
    }
}
