//! Paragraph classification for academic text.
//!
//! Figure and table captions and formulas are carried into the output
//! untranslated; only plain text paragraphs go to a translation service.

use std::sync::OnceLock;

use regex::Regex;

/// Kind of a blank-line separated paragraph.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ElementKind {
    Text,
    Figure,
    Table,
    Formula,
}

impl ElementKind {
    pub fn id(self) -> &'static str {
        match self {
            Self::Text => "text",
            Self::Figure => "figure",
            Self::Table => "table",
            Self::Formula => "formula",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DocumentElement {
    pub kind: ElementKind,
    pub content: String,
}

impl DocumentElement {
    /// Output form of a paragraph kept in its original language.
    pub fn preserved_block(&self) -> String {
        format!("【保留{}】\n{}", self.kind.id(), self.content)
    }
}

struct ElementPatterns {
    figure: Vec<Regex>,
    table: Vec<Regex>,
    formula: Vec<Regex>,
}

fn compile(sources: &[&str]) -> Vec<Regex> {
    sources
        .iter()
        .map(|source| Regex::new(source).expect("element pattern should compile"))
        .collect()
}

fn patterns() -> &'static ElementPatterns {
    static PATTERNS: OnceLock<ElementPatterns> = OnceLock::new();
    PATTERNS.get_or_init(|| ElementPatterns {
        // Captions are matched at the start of a paragraph only, so body text
        // that refers to "Figure 2." is still translated.
        figure: compile(&[r"(?i)^(figure|fig\.?)\s+\d+[:.]", r"^(图|图表)\s*\d+[:：]"]),
        table: compile(&[r"(?i)^table\s+\d+[:.]", r"^表\s*\d+[:：]"]),
        formula: compile(&[
            r"\$[^$\n]+\$",
            r"(?s)\\begin\{equation\}.*?\\end\{equation\}",
            r"(?s)\\\[.*?\\\]",
        ]),
    })
}

pub fn classify(paragraph: &str) -> ElementKind {
    let patterns = patterns();
    let matches_any = |set: &[Regex]| set.iter().any(|pattern| pattern.is_match(paragraph));
    if matches_any(&patterns.figure) {
        ElementKind::Figure
    } else if matches_any(&patterns.table) {
        ElementKind::Table
    } else if matches_any(&patterns.formula) {
        ElementKind::Formula
    } else {
        ElementKind::Text
    }
}

/// Splits `text` at blank lines into trimmed, non-empty paragraphs.
pub fn split_paragraphs(text: &str) -> Vec<String> {
    let mut paragraphs = Vec::new();
    let mut current: Vec<&str> = Vec::new();
    for line in text.lines().map(str::trim_end) {
        if line.trim().is_empty() {
            if !current.is_empty() {
                paragraphs.push(current.join("\n").trim().to_string());
                current.clear();
            }
            continue;
        }
        current.push(line);
    }
    if !current.is_empty() {
        paragraphs.push(current.join("\n").trim().to_string());
    }
    paragraphs
}

pub fn classify_paragraphs(text: &str) -> Vec<DocumentElement> {
    split_paragraphs(text)
        .into_iter()
        .map(|content| DocumentElement {
            kind: classify(&content),
            content,
        })
        .collect()
}
