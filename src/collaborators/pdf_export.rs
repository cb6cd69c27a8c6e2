//! Translated-text PDF export backed by `printpdf`.
//!
//! Output is an A4 document: a title line and a section heading followed by
//! the translated text, word-wrapped to the printable width and paginated.
//! Built-in PDF fonts cover Latin text only, so CJK output uses
//! `export.font_path` or a known system CJK font, and fails without one.

use std::{
    fs::File,
    io::BufWriter,
    path::{Path, PathBuf},
};

use log::info;
use printpdf::{BuiltinFont, IndirectFontRef, Mm, PdfDocument, PdfDocumentReference};

use super::{with_default_extension, PdfExporter};
use crate::config::ExportConfig;
use crate::languages::TargetLanguage;

const PAGE_WIDTH_MM: f32 = 210.0;
const PAGE_HEIGHT_MM: f32 = 297.0;
const MARGIN_MM: f32 = 20.0;
const PT_TO_MM: f32 = 0.3528;
const LINE_SPACING: f32 = 1.4;
const TITLE_SIZE_BONUS_PT: f32 = 6.0;
const LAYER_NAME: &str = "Text";

/// True for East Asian wide characters, which occupy two width units.
fn is_wide(c: char) -> bool {
    matches!(
        c as u32,
        0x1100..=0x115F
            | 0x2E80..=0xA4CF
            | 0xAC00..=0xD7A3
            | 0xF900..=0xFAFF
            | 0xFE30..=0xFE4F
            | 0xFF00..=0xFF60
            | 0xFFE0..=0xFFE6
            | 0x20000..=0x3FFFD
    )
}

fn char_units(c: char) -> usize {
    if is_wide(c) {
        2
    } else {
        1
    }
}

struct Token {
    text: String,
    units: usize,
    space_before: bool,
}

// Latin words stay whole; every wide character is its own break opportunity.
fn tokenize(paragraph: &str) -> Vec<Token> {
    let mut tokens = Vec::new();
    let mut word = String::new();
    let mut word_units = 0;
    let mut word_space_before = false;
    let mut pending_space = false;

    for c in paragraph.chars() {
        if c.is_whitespace() {
            if !word.is_empty() {
                tokens.push(Token {
                    text: std::mem::take(&mut word),
                    units: word_units,
                    space_before: word_space_before,
                });
                word_units = 0;
            }
            pending_space = true;
            continue;
        }
        if is_wide(c) {
            if !word.is_empty() {
                tokens.push(Token {
                    text: std::mem::take(&mut word),
                    units: word_units,
                    space_before: word_space_before,
                });
                word_units = 0;
            }
            tokens.push(Token {
                text: c.to_string(),
                units: 2,
                space_before: pending_space,
            });
            pending_space = false;
            continue;
        }
        if word.is_empty() {
            word_space_before = pending_space;
            pending_space = false;
        }
        word.push(c);
        word_units += 1;
    }
    if !word.is_empty() {
        tokens.push(Token {
            text: word,
            units: word_units,
            space_before: word_space_before,
        });
    }
    tokens
}

fn wrap_paragraph(paragraph: &str, max_units: usize, lines: &mut Vec<String>) {
    let mut line = String::new();
    let mut width = 0usize;

    for token in tokenize(paragraph) {
        let gap = usize::from(token.space_before && !line.is_empty());
        if !line.is_empty() && width + gap + token.units > max_units {
            lines.push(std::mem::take(&mut line));
            width = 0;
        }

        if line.is_empty() && token.units > max_units {
            for c in token.text.chars() {
                let units = char_units(c);
                if !line.is_empty() && width + units > max_units {
                    lines.push(std::mem::take(&mut line));
                    width = 0;
                }
                line.push(c);
                width += units;
            }
            continue;
        }

        if token.space_before && !line.is_empty() {
            line.push(' ');
            width += 1;
        }
        line.push_str(&token.text);
        width += token.units;
    }

    if !line.is_empty() {
        lines.push(line);
    }
}

/// Wraps `text` so no line exceeds `max_units` width units. Blank input
/// lines are kept as empty lines.
pub fn wrap_text(text: &str, max_units: usize) -> Vec<String> {
    let max_units = max_units.max(2);
    let mut lines = Vec::new();
    for paragraph in text.lines() {
        if paragraph.trim().is_empty() {
            lines.push(String::new());
            continue;
        }
        wrap_paragraph(paragraph, max_units, &mut lines);
    }
    lines
}

/// Splits `lines` into pages; the first page holds fewer lines because of
/// the title.
pub fn paginate(
    lines: Vec<String>,
    first_page_capacity: usize,
    page_capacity: usize,
) -> Vec<Vec<String>> {
    let first_page_capacity = first_page_capacity.max(1);
    let page_capacity = page_capacity.max(1);
    let mut pages = Vec::new();
    let mut remaining = lines.into_iter();

    pages.push(remaining.by_ref().take(first_page_capacity).collect());
    loop {
        let page: Vec<String> = remaining.by_ref().take(page_capacity).collect();
        if page.is_empty() {
            break;
        }
        pages.push(page);
    }
    pages
}

fn line_height_mm(font_size_pt: f32) -> f32 {
    font_size_pt * LINE_SPACING * PT_TO_MM
}

/// Width units that fit across the printable area at `font_size_pt`.
/// A narrow glyph is assumed to be half an em wide.
pub fn max_line_units(font_size_pt: f32) -> usize {
    let printable_width = PAGE_WIDTH_MM - 2.0 * MARGIN_MM;
    let unit_width = font_size_pt * PT_TO_MM * 0.5;
    (printable_width / unit_width).floor().max(2.0) as usize
}

fn lines_per_page(font_size_pt: f32, reserved_mm: f32) -> usize {
    let printable_height = PAGE_HEIGHT_MM - 2.0 * MARGIN_MM - reserved_mm;
    (printable_height / line_height_mm(font_size_pt))
        .floor()
        .max(1.0) as usize
}

/// TrueType fonts with CJK coverage shipped by common desktop systems.
const SYSTEM_CJK_FONTS: &[&str] = &[
    "C:\\Windows\\Fonts\\simhei.ttf",
    "C:\\Windows\\Fonts\\simkai.ttf",
    "C:\\Windows\\Fonts\\simfang.ttf",
    "/System/Library/Fonts/Supplemental/Arial Unicode.ttf",
    "/Library/Fonts/Arial Unicode.ttf",
    "/usr/share/fonts/truetype/droid/DroidSansFallbackFull.ttf",
    "/usr/share/fonts/truetype/arphic-gbsn00lp/gbsn00lp.ttf",
    "/usr/share/fonts/truetype/arphic-gkai00mp/gkai00mp.ttf",
    "/usr/share/fonts/google-droid-sans-fonts/DroidSansFallbackFull.ttf",
];

/// Heading drawn between the title and the body.
pub fn section_heading(target: TargetLanguage) -> &'static str {
    if target.needs_cjk_font() {
        "译文:"
    } else {
        "Translation:"
    }
}

/// Lines drawn above the body on the first page, with their font sizes.
pub fn first_page_header(
    title: &str,
    target: TargetLanguage,
    font_size_pt: f32,
) -> Vec<(String, f32)> {
    vec![
        (title.to_string(), font_size_pt + TITLE_SIZE_BONUS_PT),
        (section_heading(target).to_string(), font_size_pt),
    ]
}

/// Exporter configured from the `[export]` config section.
#[derive(Debug, Clone)]
pub struct PrintPdfExporter {
    font_path: Option<PathBuf>,
    font_size_pt: f32,
    cjk_font_candidates: Vec<PathBuf>,
}

impl PrintPdfExporter {
    pub fn new(config: &ExportConfig) -> Self {
        Self {
            font_path: config.font_path.clone(),
            font_size_pt: config.font_size_pt,
            cjk_font_candidates: SYSTEM_CJK_FONTS.iter().map(PathBuf::from).collect(),
        }
    }

    /// Replaces the system font locations searched when CJK output has no
    /// configured font.
    pub fn with_cjk_font_candidates(mut self, candidates: Vec<PathBuf>) -> Self {
        self.cjk_font_candidates = candidates;
        self
    }

    /// Font file to embed, or `None` for built-in Helvetica. CJK output
    /// without a usable font is an error.
    fn resolve_font_path(&self, needs_cjk: bool) -> Result<Option<PathBuf>, String> {
        if let Some(font_path) = &self.font_path {
            return Ok(Some(font_path.clone()));
        }
        if !needs_cjk {
            return Ok(None);
        }
        match self
            .cjk_font_candidates
            .iter()
            .find(|candidate| candidate.is_file())
        {
            Some(found) => {
                info!("Using system font {} for CJK export", found.display());
                Ok(Some(found.clone()))
            }
            None => Err(
                "Chinese output needs export.font_path set to a CJK TrueType font".to_string(),
            ),
        }
    }

    fn load_font(
        document: &PdfDocumentReference,
        font_path: Option<&Path>,
    ) -> Result<IndirectFontRef, String> {
        match font_path {
            Some(font_path) => {
                let file = File::open(font_path).map_err(|err| {
                    format!("failed to open font {}: {err}", font_path.display())
                })?;
                document
                    .add_external_font(file)
                    .map_err(|err| format!("failed to load font {}: {err}", font_path.display()))
            }
            None => document
                .add_builtin_font(BuiltinFont::Helvetica)
                .map_err(|err| format!("failed to load built-in font: {err}")),
        }
    }
}

impl PdfExporter for PrintPdfExporter {
    fn export_pdf(
        &self,
        path: &Path,
        title: &str,
        text: &str,
        target: TargetLanguage,
    ) -> Result<PathBuf, String> {
        let path = with_default_extension(path, "pdf");
        // Helvetica silently drops glyphs it cannot encode.
        let needs_cjk = target.needs_cjk_font() || title.chars().chain(text.chars()).any(is_wide);
        let font_path = self.resolve_font_path(needs_cjk)?;

        let (document, first_page, first_layer) = PdfDocument::new(
            title,
            Mm(PAGE_WIDTH_MM),
            Mm(PAGE_HEIGHT_MM),
            LAYER_NAME,
        );
        let font = Self::load_font(&document, font_path.as_deref())?;

        let header = first_page_header(title, target, self.font_size_pt);
        let header_block_mm: f32 = header
            .iter()
            .map(|(_, size)| line_height_mm(*size))
            .sum::<f32>()
            + line_height_mm(self.font_size_pt);
        let body_lines = wrap_text(text, max_line_units(self.font_size_pt));
        let pages = paginate(
            body_lines,
            lines_per_page(self.font_size_pt, header_block_mm),
            lines_per_page(self.font_size_pt, 0.0),
        );
        let page_count = pages.len();

        let top = PAGE_HEIGHT_MM - MARGIN_MM;
        let line_height = line_height_mm(self.font_size_pt);
        for (page_index, lines) in pages.into_iter().enumerate() {
            let layer = if page_index == 0 {
                document.get_page(first_page).get_layer(first_layer)
            } else {
                let (page, layer) =
                    document.add_page(Mm(PAGE_WIDTH_MM), Mm(PAGE_HEIGHT_MM), LAYER_NAME);
                document.get_page(page).get_layer(layer)
            };

            let mut y = top;
            if page_index == 0 {
                for (line, size) in &header {
                    y -= line_height_mm(*size);
                    layer.use_text(line.as_str(), *size, Mm(MARGIN_MM), Mm(y), &font);
                }
                y -= line_height;
            }
            for line in lines {
                y -= line_height;
                if !line.is_empty() {
                    layer.use_text(line, self.font_size_pt, Mm(MARGIN_MM), Mm(y), &font);
                }
            }
        }

        let file = File::create(&path)
            .map_err(|err| format!("failed to create {}: {err}", path.display()))?;
        document
            .save(&mut BufWriter::new(file))
            .map_err(|err| format!("failed to write {}: {err}", path.display()))?;
        info!("Exported {} page(s) to {}", page_count, path.display());
        Ok(path)
    }
}
