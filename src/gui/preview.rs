use crate::preview::{PreviewDocument, OBJECTIVES_PLACEHOLDER};
use crate::theme::ThemeConfig;
use eframe::egui::{self, Align, Frame, Layout, Margin, RichText, Rounding, Stroke, Ui};

/// Draw the lesson card the way it will print, right-aligned.
pub fn show(ui: &mut Ui, doc: &PreviewDocument, theme: &ThemeConfig) {
    Frame::none()
        .fill(theme.paper())
        .stroke(Stroke::new(1.0, theme.border()))
        .rounding(Rounding::same(theme.radius))
        .inner_margin(Margin::same(24.0))
        .show(ui, |ui| {
            ui.set_width(ui.available_width());
            ui.with_layout(Layout::top_down(Align::Max), |ui| {
                header(ui, doc, theme);
                ui.separator();
                info_table(ui, doc, theme);
                ui.add_space(10.0);

                section(ui, theme, "الأهداف التعليمية", |ui| {
                    if doc.objectives.is_empty() {
                        ui.label(RichText::new(OBJECTIVES_PLACEHOLDER).italics().color(theme.muted()));
                    }
                    for objective in &doc.objectives {
                        ui.label(format!("{objective} •"));
                    }
                });

                section(ui, theme, "التمهيد والوسائل", |ui| {
                    ui.label(doc.introduction.as_str());
                    ui.with_layout(Layout::right_to_left(Align::Center).with_main_wrap(true), |ui| {
                        for material in &doc.materials {
                            chip(ui, theme, material);
                        }
                    });
                });

                section(ui, theme, "عرض الدرس وإجراءات التدريس", |ui| {
                    for (i, activity) in doc.activities.iter().enumerate() {
                        ui.label(format!("{activity} .{}", i + 1));
                    }
                });

                section(ui, theme, "التقويم والقياس", |ui| {
                    for item in &doc.assessment {
                        ui.label(format!("{item} •"));
                    }
                });

                section(ui, theme, "الواجب والنشاط الإثرائي", |ui| {
                    ui.label(doc.homework.as_str());
                });

                ui.separator();
                footer(ui, doc, theme);
            });
        });
}

fn header(ui: &mut Ui, doc: &PreviewDocument, theme: &ThemeConfig) {
    ui.columns(3, |cols| {
        cols[2].with_layout(Layout::top_down(Align::Max), |ui| {
            ui.label(RichText::new("المملكة العربية السعودية").strong());
            ui.label("وزارة التعليم");
            ui.label(format!("إدارة: {}", doc.edu_department));
            ui.label(format!("مكتب التعليم: {}", doc.edu_office));
            ui.label(format!("مدرسة: {}", doc.school_name));
        });
        cols[1].vertical_centered(|ui| {
            ui.heading("بطاقة تحضير درس");
            ui.label(RichText::new("نظام المسارات").small().color(theme.accent()));
        });
        cols[0].with_layout(Layout::top_down(Align::Min), |ui| {
            ui.label(format!("Date: {}", doc.date));
            ui.label(format!("Week: {}", doc.week));
        });
    });
}

fn info_table(ui: &mut Ui, doc: &PreviewDocument, theme: &ThemeConfig) {
    let rows = [
        ("المادة", doc.subject.as_str(), "الصف", doc.grade.as_str(), false),
        ("الفصل", doc.term.as_str(), "الأسبوع", doc.week.as_str(), false),
        ("الوحدة", doc.unit_title.as_str(), "موضوع الدرس", doc.lesson_title.as_str(), true),
    ];
    egui::Grid::new("preview_info")
        .num_columns(4)
        .striped(true)
        .spacing([16.0, 6.0])
        .show(ui, |ui| {
            for (label_a, value_a, label_b, value_b, emphasize) in rows {
                // Columns are laid out left to right, so the pairs go in reverse.
                if emphasize {
                    ui.label(RichText::new(value_b).strong().color(theme.accent()));
                } else {
                    ui.label(value_b);
                }
                ui.label(RichText::new(label_b).color(theme.muted()));
                ui.label(value_a);
                ui.label(RichText::new(label_a).color(theme.muted()));
                ui.end_row();
            }
        });
}

fn section(ui: &mut Ui, theme: &ThemeConfig, title: &str, body: impl FnOnce(&mut Ui)) {
    ui.add_space(6.0);
    ui.label(RichText::new(title).strong().color(theme.accent()));
    ui.with_layout(Layout::top_down(Align::Max), body);
}

fn chip(ui: &mut Ui, theme: &ThemeConfig, text: &str) {
    Frame::none()
        .stroke(Stroke::new(1.0, theme.accent_soft()))
        .rounding(Rounding::same(999.0))
        .inner_margin(Margin::symmetric(8.0, 2.0))
        .show(ui, |ui| {
            ui.label(RichText::new(text).small().color(theme.accent()));
        });
}

fn footer(ui: &mut Ui, doc: &PreviewDocument, theme: &ThemeConfig) {
    ui.columns(2, |cols| {
        cols[1].with_layout(Layout::top_down(Align::Max), |ui| {
            ui.label(RichText::new("المواءمة مع رؤية 2030:").strong());
            ui.label(RichText::new(&doc.vision_alignment).small());
            ui.label(format!("المعلم/ة: {}", doc.teacher_name));
        });
        cols[0].vertical_centered(|ui| {
            ui.label(RichText::new("يعتمد من مدير/ة المدرسة").strong());
            ui.add_space(24.0);
            ui.label(RichText::new("________________").color(theme.muted()));
        });
    });
}
