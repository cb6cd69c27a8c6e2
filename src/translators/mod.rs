//! Machine-translation service abstraction and the registry of configured
//! services.

pub mod baidu;
pub mod elements;

use log::{debug, info, warn};

use crate::config::Config;
use crate::languages::{SourceLanguage, TargetLanguage};
use elements::ElementKind;

/// Interface implemented by concrete translation services.
pub trait Translator: Send {
    /// Display name shown in the service selector.
    fn name(&self) -> &str;

    /// Translates `text`, reporting raw percentages through `progress`.
    fn translate(
        &self,
        text: &str,
        source: SourceLanguage,
        target: TargetLanguage,
        progress: &mut dyn FnMut(i32),
    ) -> Result<String, String>;
}

/// Named translation services in registration order.
#[derive(Default)]
pub struct TranslationEngine {
    translators: Vec<Box<dyn Translator>>,
}

impl TranslationEngine {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds the registry from configuration; unconfigured services are skipped.
    pub fn from_config(config: &Config) -> Self {
        let mut engine = Self::new();
        if config.baidu.is_configured() {
            match baidu::BaiduTranslator::from_config(&config.baidu, &config.translation) {
                Ok(translator) => engine.register(Box::new(translator)),
                Err(err) => warn!("Baidu Translate unavailable: {}", err),
            }
        } else {
            info!("Baidu Translate not configured; set [baidu] app_id and secret_key");
        }
        engine
    }

    /// Adds a service; a later registration with the same name replaces the earlier one.
    pub fn register(&mut self, translator: Box<dyn Translator>) {
        if let Some(existing) = self
            .translators
            .iter_mut()
            .find(|existing| existing.name() == translator.name())
        {
            *existing = translator;
            return;
        }
        self.translators.push(translator);
    }

    pub fn service_names(&self) -> Vec<String> {
        self.translators
            .iter()
            .map(|translator| translator.name().to_string())
            .collect()
    }

    pub fn get(&self, name: &str) -> Option<&dyn Translator> {
        self.translators
            .iter()
            .find(|translator| translator.name() == name)
            .map(|translator| translator.as_ref())
    }

    pub fn is_empty(&self) -> bool {
        self.translators.is_empty()
    }
}

/// Joins lines of one paragraph.
pub const LINE_SEPARATOR: &str = "\n";
/// Joins paragraphs.
pub const PARAGRAPH_SEPARATOR: &str = "\n\n";

/// Request-sized piece of text and the separator that joins it to the
/// previous piece in the output.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextChunk {
    pub text: String,
    pub separator: &'static str,
}

impl TextChunk {
    fn new(text: String, separator: &'static str) -> Self {
        Self { text, separator }
    }
}

fn split_long_line(
    line: &str,
    max_chars: usize,
    separator: &'static str,
    chunks: &mut Vec<TextChunk>,
) {
    let chars: Vec<char> = line.chars().collect();
    for (index, piece) in chars.chunks(max_chars).enumerate() {
        let piece_separator = if index == 0 { separator } else { LINE_SEPARATOR };
        chunks.push(TextChunk::new(piece.iter().collect(), piece_separator));
    }
}

/// Splits `text` into request-sized chunks at line boundaries. Blank-line
/// paragraph breaks are kept, either inside a chunk or as the separator of
/// the chunk that follows them. A line longer than `max_chars` characters
/// is split on character boundaries.
pub fn split_into_chunks(text: &str, max_chars: usize) -> Vec<TextChunk> {
    let max_chars = max_chars.max(1);
    let mut chunks = Vec::new();
    let mut current = String::new();
    let mut current_chars = 0usize;
    let mut current_separator = "";
    let mut seen_content = false;
    let mut blank_pending = false;

    for line in text.split('\n').map(str::trim_end) {
        if line.trim().is_empty() {
            blank_pending = seen_content;
            continue;
        }
        let separator = match (seen_content, blank_pending) {
            (false, _) => "",
            (true, true) => PARAGRAPH_SEPARATOR,
            (true, false) => LINE_SEPARATOR,
        };
        seen_content = true;
        blank_pending = false;
        let line_chars = line.chars().count();

        if !current.is_empty() && current_chars + separator.len() + line_chars <= max_chars {
            current.push_str(separator);
            current.push_str(line);
            current_chars += separator.len() + line_chars;
            continue;
        }

        if !current.is_empty() {
            chunks.push(TextChunk::new(std::mem::take(&mut current), current_separator));
            current_chars = 0;
        }
        if line_chars > max_chars {
            split_long_line(line, max_chars, separator, &mut chunks);
        } else {
            current.push_str(line);
            current_chars = line_chars;
            current_separator = separator;
        }
    }
    if !current.is_empty() {
        chunks.push(TextChunk::new(current, current_separator));
    }
    chunks
}

/// Percentage of `completed` out of `total` chunks.
pub fn chunk_progress(completed: usize, total: usize) -> i32 {
    if total == 0 {
        return 100;
    }
    (completed.min(total) * 100 / total) as i32
}

/// Translates `chunks` in order with `translate_chunk`, reporting progress
/// after each one. The first failure aborts the whole translation.
pub fn translate_chunks<F>(
    chunks: &[TextChunk],
    progress: &mut dyn FnMut(i32),
    mut translate_chunk: F,
) -> Result<String, String>
where
    F: FnMut(&str) -> Result<String, String>,
{
    if chunks.is_empty() {
        return Err("nothing to translate".to_string());
    }
    progress(0);
    let mut translated = String::new();
    for (index, chunk) in chunks.iter().enumerate() {
        let text = translate_chunk(&chunk.text).map_err(|err| {
            warn!("Chunk {}/{} failed: {}", index + 1, chunks.len(), err);
            err
        })?;
        translated.push_str(chunk.separator);
        translated.push_str(&text);
        progress(chunk_progress(index + 1, chunks.len()));
    }
    Ok(translated)
}

/// Translates a document paragraph by paragraph. Text paragraphs go to
/// `translator`; captions and formulas are kept verbatim under a marker.
/// Paragraphs are joined with a blank line and progress is weighted by
/// paragraph length.
pub fn translate_document(
    translator: &dyn Translator,
    text: &str,
    source: SourceLanguage,
    target: TargetLanguage,
    progress: &mut dyn FnMut(i32),
) -> Result<String, String> {
    let elements = elements::classify_paragraphs(text);
    if elements.is_empty() {
        return Err("nothing to translate".to_string());
    }
    let total_chars: usize = elements
        .iter()
        .filter(|element| element.kind == ElementKind::Text)
        .map(|element| element.content.chars().count())
        .sum();
    debug!(
        "Translating {} paragraph(s), {} kept verbatim",
        elements.len(),
        elements
            .iter()
            .filter(|element| element.kind != ElementKind::Text)
            .count()
    );

    let mut done_chars = 0usize;
    let mut output = Vec::with_capacity(elements.len());
    for element in &elements {
        if element.kind != ElementKind::Text {
            output.push(element.preserved_block());
            continue;
        }
        let element_chars = element.content.chars().count();
        let mut element_progress = |percent: i32| {
            let percent = percent.clamp(0, 100) as usize;
            progress(((done_chars * 100 + percent * element_chars) / total_chars) as i32);
        };
        output.push(translator.translate(&element.content, source, target, &mut element_progress)?);
        done_chars += element_chars;
    }
    if total_chars == 0 {
        progress(100);
    }
    Ok(output.join(PARAGRAPH_SEPARATOR))
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use super::{
        chunk_progress, split_into_chunks, translate_chunks, translate_document, TextChunk,
        TranslationEngine, Translator,
    };
    use crate::config::Config;
    use crate::languages::{SourceLanguage, TargetLanguage};

    #[derive(Default)]
    struct UppercaseStub {
        seen: Mutex<Vec<String>>,
    }

    impl Translator for UppercaseStub {
        fn name(&self) -> &str {
            "Uppercase"
        }

        fn translate(
            &self,
            text: &str,
            _source: SourceLanguage,
            _target: TargetLanguage,
            progress: &mut dyn FnMut(i32),
        ) -> Result<String, String> {
            self.seen
                .lock()
                .expect("seen lock poisoned")
                .push(text.to_string());
            progress(100);
            Ok(text.to_uppercase())
        }
    }

    struct FailingStub;

    impl Translator for FailingStub {
        fn name(&self) -> &str {
            "Failing"
        }

        fn translate(
            &self,
            _text: &str,
            _source: SourceLanguage,
            _target: TargetLanguage,
            _progress: &mut dyn FnMut(i32),
        ) -> Result<String, String> {
            Err("service unavailable".to_string())
        }
    }

    struct NamedStub(&'static str, &'static str);

    impl Translator for NamedStub {
        fn name(&self) -> &str {
            self.0
        }

        fn translate(
            &self,
            _text: &str,
            _source: SourceLanguage,
            _target: TargetLanguage,
            progress: &mut dyn FnMut(i32),
        ) -> Result<String, String> {
            progress(100);
            Ok(self.1.to_string())
        }
    }

    fn texts(chunks: &[TextChunk]) -> Vec<(&str, &str)> {
        chunks
            .iter()
            .map(|chunk| (chunk.text.as_str(), chunk.separator))
            .collect()
    }

    #[test]
    fn test_chunks_pack_lines_up_to_limit() {
        let chunks = split_into_chunks("aaaa\nbbbb\ncccc", 9);
        assert_eq!(texts(&chunks), vec![("aaaa\nbbbb", ""), ("cccc", "\n")]);
    }

    #[test]
    fn test_oversized_line_splits_on_char_boundaries() {
        let chunks = split_into_chunks("你好世界你好", 4);
        assert_eq!(texts(&chunks), vec![("你好世界", ""), ("你好", "\n")]);
    }

    #[test]
    fn test_paragraph_breaks_survive_chunking() {
        let chunks = split_into_chunks("Abstract text.\n\nPage two first paragraph.", 1800);
        assert_eq!(
            texts(&chunks),
            vec![("Abstract text.\n\nPage two first paragraph.", "")]
        );

        let chunks = split_into_chunks("first\n\n\nsecond", 6);
        assert_eq!(texts(&chunks), vec![("first", ""), ("second", "\n\n")]);
    }

    #[test]
    fn test_leading_and_trailing_blank_lines_are_dropped() {
        assert_eq!(
            texts(&split_into_chunks("\n\n  first\nsecond  \n\n", 100)),
            vec![("  first\nsecond", "")]
        );
        assert!(split_into_chunks("   \n\t", 100).is_empty());
    }

    #[test]
    fn test_chunk_failure_after_partial_progress_aborts() {
        let chunks = split_into_chunks("one\ntwo\nthree", 5);
        assert_eq!(chunks.len(), 3);
        let mut reported = Vec::new();
        let mut calls = 0;
        let result = translate_chunks(&chunks, &mut |percent| reported.push(percent), |chunk| {
            calls += 1;
            if chunk == "two" {
                Err("quota exceeded".to_string())
            } else {
                Ok(chunk.to_uppercase())
            }
        });
        assert_eq!(result, Err("quota exceeded".to_string()));
        assert_eq!(reported, vec![0, 33]);
        assert_eq!(calls, 2);
    }

    #[test]
    fn test_translated_chunks_rejoin_with_their_separators() {
        let chunks = split_into_chunks("one\n\ntwo\nthree", 5);
        let result = translate_chunks(&chunks, &mut |_| {}, |chunk| Ok(chunk.to_uppercase()));
        assert_eq!(result, Ok("ONE\n\nTWO\nTHREE".to_string()));
    }

    #[test]
    fn test_document_keeps_paragraph_breaks_and_preserved_elements() {
        let translator = UppercaseStub::default();
        let mut reported = Vec::new();
        let result = translate_document(
            &translator,
            "Abstract text.\n\nFigure 1: Overview of the model.\n\nPage two first paragraph.",
            SourceLanguage::English,
            TargetLanguage::ChineseSimplified,
            &mut |percent| reported.push(percent),
        );
        assert_eq!(
            result,
            Ok("ABSTRACT TEXT.\n\n【保留figure】\nFigure 1: Overview of the model.\n\nPAGE TWO FIRST PARAGRAPH.".to_string())
        );
        assert_eq!(
            translator.seen.lock().expect("seen lock poisoned").as_slice(),
            &["Abstract text.".to_string(), "Page two first paragraph.".to_string()]
        );
        assert_eq!(reported.last(), Some(&100));
        assert!(reported.windows(2).all(|pair| pair[0] <= pair[1]));
    }

    #[test]
    fn test_document_of_only_formulas_needs_no_service() {
        let translator = UppercaseStub::default();
        let mut reported = Vec::new();
        let result = translate_document(
            &translator,
            "\\[ E = mc^2 \\]",
            SourceLanguage::English,
            TargetLanguage::ChineseSimplified,
            &mut |percent| reported.push(percent),
        );
        assert_eq!(result, Ok("【保留formula】\n\\[ E = mc^2 \\]".to_string()));
        assert!(translator.seen.lock().expect("seen lock poisoned").is_empty());
        assert_eq!(reported, vec![100]);
    }

    #[test]
    fn test_document_failure_propagates() {
        let translator = NamedStub("Stub", "unused");
        let failing = FailingStub;
        assert!(translate_document(
            &failing,
            "Hello",
            SourceLanguage::English,
            TargetLanguage::ChineseSimplified,
            &mut |_| {},
        )
        .is_err());
        assert!(translate_document(
            &translator,
            " \n ",
            SourceLanguage::English,
            TargetLanguage::ChineseSimplified,
            &mut |_| {},
        )
        .is_err());
    }

    #[test]
    fn test_chunk_progress_reports_whole_percentages() {
        assert_eq!(chunk_progress(0, 3), 0);
        assert_eq!(chunk_progress(1, 3), 33);
        assert_eq!(chunk_progress(3, 3), 100);
        assert_eq!(chunk_progress(0, 0), 100);
    }

    #[test]
    fn test_registry_lists_and_replaces_services_by_name() {
        let mut engine = TranslationEngine::new();
        assert!(engine.is_empty());
        engine.register(Box::new(NamedStub("Stub", "first")));
        engine.register(Box::new(NamedStub("Other", "other")));
        engine.register(Box::new(NamedStub("Stub", "second")));

        assert_eq!(engine.service_names(), vec!["Stub", "Other"]);
        let translator = engine.get("Stub").expect("service should exist");
        let mut last_progress = 0;
        let result = translator.translate(
            "Hello",
            SourceLanguage::English,
            TargetLanguage::ChineseSimplified,
            &mut |percent| last_progress = percent,
        );
        assert_eq!(result, Ok("second".to_string()));
        assert_eq!(last_progress, 100);
        assert!(engine.get("Missing").is_none());
    }

    #[test]
    fn test_unconfigured_config_registers_nothing() {
        let engine = TranslationEngine::from_config(&Config::default());
        assert!(engine.service_names().is_empty());
    }
}
