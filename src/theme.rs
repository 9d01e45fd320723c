use eframe::egui::{self, Color32, Context, FontData, FontDefinitions, FontFamily, Rounding};
use log::warn;
use serde::{Deserialize, Serialize};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

pub const DEFAULT_THEME: &str = "emerald_light";

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ThemeConfig {
    pub name: String,
    pub surface: String,
    pub panel: String,
    pub text: String,
    pub muted_text: String,
    pub accent: String,
    pub accent_soft: String,
    pub danger: String,
    pub border: String,
    pub radius: f32,
    pub font_size_base: f32,
}

impl ThemeConfig {
    pub fn accent(&self) -> Color32 {
        parse_color(&self.accent)
    }

    pub fn accent_soft(&self) -> Color32 {
        parse_color(&self.accent_soft)
    }

    pub fn muted(&self) -> Color32 {
        parse_color(&self.muted_text)
    }

    pub fn danger(&self) -> Color32 {
        parse_color(&self.danger)
    }

    pub fn border(&self) -> Color32 {
        parse_color(&self.border)
    }

    pub fn paper(&self) -> Color32 {
        parse_color(&self.surface)
    }
}

pub fn presets_file(base: &Path) -> PathBuf {
    base.join("themes").join("presets.json")
}

/// Write the built-in presets on first run so they can be edited by hand.
pub fn ensure_theme_files(base: &Path) -> io::Result<()> {
    let path = presets_file(base);
    if let Some(dir) = path.parent() {
        fs::create_dir_all(dir)?;
    }
    if !path.exists() {
        let json = serde_json::to_string_pretty(&default_presets())?;
        fs::write(&path, json)?;
    }
    Ok(())
}

pub fn load_presets(base: &Path) -> Vec<ThemeConfig> {
    match fs::read_to_string(presets_file(base)) {
        Ok(contents) => match serde_json::from_str::<Vec<ThemeConfig>>(&contents) {
            Ok(list) if !list.is_empty() => list,
            Ok(_) => default_presets(),
            Err(e) => {
                warn!("[theme] Ignoring malformed presets.json: {e}");
                default_presets()
            }
        },
        Err(_) => default_presets(),
    }
}

/// Preset called `preferred`, else the emerald default.
pub fn pick_theme(presets: &[ThemeConfig], preferred: Option<&str>) -> ThemeConfig {
    preferred
        .and_then(|name| presets.iter().find(|p| p.name == name))
        .or_else(|| presets.iter().find(|p| p.name == DEFAULT_THEME))
        .or_else(|| presets.first())
        .cloned()
        .unwrap_or_else(|| default_presets().remove(0))
}

pub fn apply_theme(theme: &ThemeConfig, ctx: &Context) {
    let mut style = (*ctx.style()).clone();
    let mut visuals = if is_dark(theme) {
        egui::Visuals::dark()
    } else {
        egui::Visuals::light()
    };

    let surface = parse_color(&theme.surface);
    let text = parse_color(&theme.text);
    let rounding = Rounding::same(theme.radius);

    visuals.panel_fill = parse_color(&theme.panel);
    visuals.extreme_bg_color = surface;
    visuals.selection.bg_fill = theme.accent_soft();
    visuals.selection.stroke.color = theme.accent();
    visuals.hyperlink_color = theme.accent();
    visuals.error_fg_color = theme.danger();

    for widget in [
        &mut visuals.widgets.noninteractive,
        &mut visuals.widgets.inactive,
    ] {
        widget.bg_fill = surface;
        widget.weak_bg_fill = surface;
        widget.fg_stroke.color = text;
        widget.bg_stroke.color = theme.border();
        widget.rounding = rounding;
    }
    for widget in [&mut visuals.widgets.hovered, &mut visuals.widgets.active] {
        widget.bg_fill = theme.accent_soft();
        widget.weak_bg_fill = theme.accent_soft();
        widget.bg_stroke.color = theme.accent();
        widget.fg_stroke.color = text;
        widget.rounding = rounding;
    }
    visuals.window_rounding = rounding;

    style.text_styles = [
        (
            egui::TextStyle::Small,
            egui::FontId::proportional(theme.font_size_base - 3.0),
        ),
        (
            egui::TextStyle::Body,
            egui::FontId::proportional(theme.font_size_base),
        ),
        (
            egui::TextStyle::Button,
            egui::FontId::proportional(theme.font_size_base),
        ),
        (
            egui::TextStyle::Heading,
            egui::FontId::proportional(theme.font_size_base + 5.0),
        ),
        (
            egui::TextStyle::Monospace,
            egui::FontId::monospace(theme.font_size_base - 1.0),
        ),
    ]
    .into();
    style.spacing.item_spacing = egui::vec2(8.0, 6.0);
    style.visuals = visuals;
    ctx.set_style(style);
}

/// Put a font with Arabic coverage first in both families. The built-in
/// egui fonts carry no Arabic glyphs.
pub fn install_fonts(ctx: &Context, font_path: Option<&str>) {
    let Some(path) = font_path else {
        return;
    };
    let bytes = match fs::read(path) {
        Ok(b) => b,
        Err(e) => {
            warn!("[theme] Could not read font {path}: {e}");
            return;
        }
    };

    let mut fonts = FontDefinitions::default();
    fonts
        .font_data
        .insert("arabic".to_owned(), FontData::from_owned(bytes));
    for family in [FontFamily::Proportional, FontFamily::Monospace] {
        fonts
            .families
            .entry(family)
            .or_default()
            .insert(0, "arabic".to_owned());
    }
    ctx.set_fonts(fonts);
}

fn is_dark(theme: &ThemeConfig) -> bool {
    let bg = parse_color(&theme.panel);
    let luminance =
        0.2126 * (bg.r() as f32) + 0.7152 * (bg.g() as f32) + 0.0722 * (bg.b() as f32);
    luminance < 128.0
}

/// `#rrggbb` or `#rrggbbaa`; anything else comes back grey.
pub fn parse_color(hex: &str) -> Color32 {
    let h = hex.trim().trim_start_matches('#');
    let Ok(value) = u32::from_str_radix(h, 16) else {
        return Color32::GRAY;
    };
    match h.len() {
        6 => Color32::from_rgb((value >> 16) as u8, (value >> 8) as u8, value as u8),
        8 => Color32::from_rgba_unmultiplied(
            (value >> 24) as u8,
            (value >> 16) as u8,
            (value >> 8) as u8,
            value as u8,
        ),
        _ => Color32::GRAY,
    }
}

pub fn default_presets() -> Vec<ThemeConfig> {
    vec![
        ThemeConfig {
            name: DEFAULT_THEME.to_string(),
            surface: "#f8fafc".to_string(),
            panel: "#fcfdfe".to_string(),
            text: "#1e293b".to_string(),
            muted_text: "#94a3b8".to_string(),
            accent: "#059669".to_string(),
            accent_soft: "#d1fae5".to_string(),
            danger: "#ef4444".to_string(),
            border: "#e2e8f0".to_string(),
            radius: 10.0,
            font_size_base: 15.0,
        },
        ThemeConfig {
            name: "slate_dark".to_string(),
            surface: "#1e293b".to_string(),
            panel: "#0f172a".to_string(),
            text: "#e2e8f0".to_string(),
            muted_text: "#94a3b8".to_string(),
            accent: "#34d399".to_string(),
            accent_soft: "#064e3b".to_string(),
            danger: "#f87171".to_string(),
            border: "#334155".to_string(),
            radius: 10.0,
            font_size_base: 15.0,
        },
        ThemeConfig {
            name: "high_contrast".to_string(),
            surface: "#000000".to_string(),
            panel: "#0d0d0d".to_string(),
            text: "#ffffff".to_string(),
            muted_text: "#c7c7c7".to_string(),
            accent: "#ffcc00".to_string(),
            accent_soft: "#4d3b00".to_string(),
            danger: "#ff5555".to_string(),
            border: "#ffffff".to_string(),
            radius: 0.0,
            font_size_base: 18.0,
        },
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_hex_colors() {
        assert_eq!(parse_color("#059669"), Color32::from_rgb(0x05, 0x96, 0x69));
        assert_eq!(parse_color("ffffff"), Color32::WHITE);
        assert_eq!(parse_color("#12"), Color32::GRAY);
        assert_eq!(parse_color("not a colour"), Color32::GRAY);
    }

    #[test]
    fn presets_are_written_once_and_reloaded() {
        let dir = tempfile::tempdir().unwrap();
        ensure_theme_files(dir.path()).unwrap();
        let presets = load_presets(dir.path());
        assert_eq!(presets, default_presets());

        fs::write(presets_file(dir.path()), "[]").unwrap();
        ensure_theme_files(dir.path()).unwrap();
        assert_eq!(load_presets(dir.path()), default_presets());
    }

    #[test]
    fn pick_theme_falls_back_to_default() {
        let presets = default_presets();
        assert_eq!(pick_theme(&presets, Some("slate_dark")).name, "slate_dark");
        assert_eq!(pick_theme(&presets, Some("missing")).name, DEFAULT_THEME);
        assert_eq!(pick_theme(&[], None).name, DEFAULT_THEME);
        assert!(!is_dark(&presets[0]));
        assert!(is_dark(&presets[1]));
    }
}
