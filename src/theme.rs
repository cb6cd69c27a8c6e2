//! Static workbench style table and its application to the window.
//!
//! Styles are keyed by component identifier and loaded once from the
//! embedded `config/theme.toml`. Missing or malformed entries resolve to the
//! built-in fallback colors so a bad table never blocks startup.

use std::{collections::HashMap, sync::OnceLock};

use log::warn;

use crate::{AppWindow, ButtonTheme};

pub const OPEN_PDF_BUTTON_ID: &str = "open_pdf_button";
pub const TRANSLATE_BUTTON_ID: &str = "translate_button";
pub const SAVE_BUTTON_ID: &str = "save_button";
pub const EXPORT_BUTTON_ID: &str = "export_button";
pub const DISABLED_BUTTON_ID: &str = "disabled_button";
pub const PROGRESS_BAR_ID: &str = "progress_bar";
pub const TEXT_PANE_ID: &str = "text_pane";
pub const STATUS_BAR_ID: &str = "status_bar";

const HOVER_DARKEN_AMOUNT: u8 = 10;
const PRESSED_DARKEN_AMOUNT: u8 = 20;

/// 8-bit RGB color parsed from `#rrggbb` notation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ThemeColor {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl ThemeColor {
    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// Parses `#rrggbb` (leading `#` optional).
    pub fn parse_hex(text: &str) -> Option<Self> {
        let hex = text.trim().trim_start_matches('#');
        if hex.len() != 6 || !hex.chars().all(|c| c.is_ascii_hexdigit()) {
            return None;
        }
        let channel = |range: std::ops::Range<usize>| u8::from_str_radix(&hex[range], 16).ok();
        Some(Self {
            r: channel(0..2)?,
            g: channel(2..4)?,
            b: channel(4..6)?,
        })
    }

    /// Subtracts `amount` from every channel, saturating at zero.
    pub fn darken(self, amount: u8) -> Self {
        Self {
            r: self.r.saturating_sub(amount),
            g: self.g.saturating_sub(amount),
            b: self.b.saturating_sub(amount),
        }
    }

    pub fn to_hex(self) -> String {
        format!("#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
    }

    fn to_slint(self) -> slint::Color {
        slint::Color::from_rgb_u8(self.r, self.g, self.b)
    }
}

#[derive(Debug, Clone, serde::Deserialize)]
struct ComponentStyleWire {
    id: String,
    #[serde(default)]
    background: Option<String>,
    #[serde(default)]
    foreground: Option<String>,
    #[serde(default)]
    border: Option<String>,
}

#[derive(Debug, serde::Deserialize)]
struct ThemeTableWire {
    #[serde(default)]
    component: Vec<ComponentStyleWire>,
}

/// Resolved style of one component.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ComponentStyle {
    pub background: ThemeColor,
    pub foreground: ThemeColor,
    pub border: ThemeColor,
}

/// Base, hover, pressed and text colors of one action button.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ButtonPalette {
    pub base: ThemeColor,
    pub hover: ThemeColor,
    pub pressed: ThemeColor,
    pub text: ThemeColor,
}

impl ButtonPalette {
    pub fn from_style(style: &ComponentStyle) -> Self {
        Self {
            base: style.background,
            hover: style.background.darken(HOVER_DARKEN_AMOUNT),
            pressed: style.background.darken(PRESSED_DARKEN_AMOUNT),
            text: style.foreground,
        }
    }

    fn to_slint(self) -> ButtonTheme {
        ButtonTheme {
            base: self.base.to_slint(),
            hover: self.hover.to_slint(),
            pressed: self.pressed.to_slint(),
            text: self.text.to_slint(),
        }
    }
}

fn fallback_style(id: &str) -> ComponentStyle {
    let white = ThemeColor::rgb(0xff, 0xff, 0xff);
    let light_border = ThemeColor::rgb(0xdd, 0xdd, 0xdd);
    let (background, foreground, border) = match id {
        OPEN_PDF_BUTTON_ID => (ThemeColor::rgb(0x60, 0x7d, 0x8b), white, light_border),
        TRANSLATE_BUTTON_ID => (ThemeColor::rgb(0x4c, 0xaf, 0x50), white, light_border),
        SAVE_BUTTON_ID => (ThemeColor::rgb(0x21, 0x96, 0xf3), white, light_border),
        EXPORT_BUTTON_ID => (ThemeColor::rgb(0xff, 0x98, 0x00), white, light_border),
        DISABLED_BUTTON_ID => (
            ThemeColor::rgb(0xcc, 0xcc, 0xcc),
            ThemeColor::rgb(0x66, 0x66, 0x66),
            light_border,
        ),
        PROGRESS_BAR_ID => (ThemeColor::rgb(0x4c, 0xaf, 0x50), white, light_border),
        STATUS_BAR_ID => (
            ThemeColor::rgb(0xf1, 0xf1, 0xf1),
            ThemeColor::rgb(0x33, 0x33, 0x33),
            light_border,
        ),
        _ => (white, ThemeColor::rgb(0x00, 0x00, 0x00), light_border),
    };
    ComponentStyle {
        background,
        foreground,
        border,
    }
}

/// Parsed component style table.
#[derive(Debug)]
pub struct ThemeTable {
    styles: HashMap<String, ComponentStyle>,
}

impl ThemeTable {
    /// Parses a style table; entries with a blank id are skipped and bad
    /// color values fall back per field.
    pub fn parse(text: &str) -> Result<Self, String> {
        let wire: ThemeTableWire =
            toml::from_str(text).map_err(|err| format!("failed to parse theme table: {err}"))?;
        let mut styles = HashMap::new();
        for entry in wire.component {
            let id = entry.id.trim().to_ascii_lowercase();
            if id.is_empty() {
                continue;
            }
            let fallback = fallback_style(&id);
            let resolve = |field: &Option<String>, fallback_color: ThemeColor, name: &str| {
                match field.as_deref() {
                    None => fallback_color,
                    Some(raw) => ThemeColor::parse_hex(raw).unwrap_or_else(|| {
                        warn!("Ignoring invalid {name} color '{raw}' for theme component '{id}'");
                        fallback_color
                    }),
                }
            };
            let style = ComponentStyle {
                background: resolve(&entry.background, fallback.background, "background"),
                foreground: resolve(&entry.foreground, fallback.foreground, "foreground"),
                border: resolve(&entry.border, fallback.border, "border"),
            };
            styles.entry(id).or_insert(style);
        }
        Ok(Self { styles })
    }

    pub fn style(&self, id: &str) -> ComponentStyle {
        self.styles
            .get(id)
            .copied()
            .unwrap_or_else(|| fallback_style(id))
    }

    pub fn button_palette(&self, id: &str) -> ButtonPalette {
        ButtonPalette::from_style(&self.style(id))
    }
}

static THEME_TABLE: OnceLock<ThemeTable> = OnceLock::new();

/// Returns the embedded style table.
pub fn theme_table() -> &'static ThemeTable {
    THEME_TABLE.get_or_init(|| {
        ThemeTable::parse(include_str!("../config/theme.toml")).unwrap_or_else(|err| {
            warn!("Falling back to built-in theme: {}", err);
            ThemeTable {
                styles: HashMap::new(),
            }
        })
    })
}

/// Pushes the style table into the window; called once at construction.
pub fn apply_theme_to_ui(ui: &AppWindow, table: &ThemeTable) {
    ui.set_open_button_theme(table.button_palette(OPEN_PDF_BUTTON_ID).to_slint());
    ui.set_translate_button_theme(table.button_palette(TRANSLATE_BUTTON_ID).to_slint());
    ui.set_save_button_theme(table.button_palette(SAVE_BUTTON_ID).to_slint());
    ui.set_export_button_theme(table.button_palette(EXPORT_BUTTON_ID).to_slint());

    let disabled = table.style(DISABLED_BUTTON_ID);
    ui.set_disabled_background(disabled.background.to_slint());
    ui.set_disabled_text(disabled.foreground.to_slint());

    let progress = table.style(PROGRESS_BAR_ID);
    ui.set_progress_chunk_color(progress.background.to_slint());
    ui.set_progress_border_color(progress.border.to_slint());

    let pane = table.style(TEXT_PANE_ID);
    ui.set_pane_background(pane.background.to_slint());
    ui.set_pane_border_color(pane.border.to_slint());

    let status_bar = table.style(STATUS_BAR_ID);
    ui.set_status_bar_background(status_bar.background.to_slint());
    ui.set_status_bar_text(status_bar.foreground.to_slint());
}

#[cfg(test)]
mod tests {
    use super::{
        ThemeColor, ThemeTable, DISABLED_BUTTON_ID, EXPORT_BUTTON_ID, OPEN_PDF_BUTTON_ID,
        SAVE_BUTTON_ID, TRANSLATE_BUTTON_ID,
    };

    #[test]
    fn test_parse_hex_accepts_with_and_without_hash() {
        assert_eq!(
            ThemeColor::parse_hex("#607D8B"),
            Some(ThemeColor::rgb(0x60, 0x7d, 0x8b))
        );
        assert_eq!(
            ThemeColor::parse_hex("4caf50"),
            Some(ThemeColor::rgb(0x4c, 0xaf, 0x50))
        );
        assert_eq!(ThemeColor::parse_hex("#12345"), None);
        assert_eq!(ThemeColor::parse_hex("#zzzzzz"), None);
    }

    #[test]
    fn test_darken_saturates_at_zero() {
        let color = ThemeColor::rgb(0xff, 0x98, 0x05);
        assert_eq!(color.darken(10).to_hex(), "#f58e00");
        assert_eq!(color.darken(20).to_hex(), "#eb8400");
    }

    #[test]
    fn test_embedded_table_resolves_button_palettes() {
        let table = super::theme_table();
        let translate = table.button_palette(TRANSLATE_BUTTON_ID);
        assert_eq!(translate.base.to_hex(), "#4caf50");
        assert_eq!(translate.hover.to_hex(), "#42a546");
        assert_eq!(translate.pressed.to_hex(), "#389b3c");
        assert_eq!(translate.text.to_hex(), "#ffffff");

        let disabled = table.style(DISABLED_BUTTON_ID);
        assert_eq!(disabled.background.to_hex(), "#cccccc");
        assert_eq!(disabled.foreground.to_hex(), "#666666");
    }

    #[test]
    fn test_invalid_and_missing_entries_fall_back() {
        let table = ThemeTable::parse(
            "[[component]]\nid = \"open_pdf_button\"\nbackground = \"not-a-color\"\n",
        )
        .expect("table should parse");
        assert_eq!(
            table.style(OPEN_PDF_BUTTON_ID).background.to_hex(),
            "#607d8b"
        );
        assert_eq!(table.style(EXPORT_BUTTON_ID).background.to_hex(), "#ff9800");
    }

    #[test]
    fn test_layout_defaults_match_embedded_table() {
        let slint_ui = include_str!("papertrans.slint");
        let table = super::theme_table();
        for (property, id) in [
            ("open_button_theme", OPEN_PDF_BUTTON_ID),
            ("translate_button_theme", TRANSLATE_BUTTON_ID),
            ("save_button_theme", SAVE_BUTTON_ID),
            ("export_button_theme", EXPORT_BUTTON_ID),
        ] {
            let palette = table.button_palette(id);
            let line = slint_ui
                .lines()
                .find(|line| line.contains(&format!("property <ButtonTheme> {property}:")))
                .expect("layout should declare button theme");
            let line = line.to_ascii_lowercase();
            assert!(line.contains(&format!("base: {}", palette.base.to_hex())));
            assert!(line.contains(&format!("hover: {}", palette.hover.to_hex())));
            assert!(line.contains(&format!("pressed: {}", palette.pressed.to_hex())));
        }
    }
}
