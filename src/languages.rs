//! Closed language sets offered by the workbench selectors.
//!
//! Selector indexes in the Slint layout follow the declaration order of
//! `SourceLanguage::ALL` and `TargetLanguage::ALL`.

/// Language of the text in the source pane.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, serde::Deserialize, serde::Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SourceLanguage {
    #[default]
    English,
    ChineseSimplified,
    Japanese,
    French,
}

/// Language the translation service should produce.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, serde::Deserialize, serde::Serialize)]
#[serde(rename_all = "snake_case")]
pub enum TargetLanguage {
    #[default]
    ChineseSimplified,
    English,
}

impl SourceLanguage {
    /// Selector order.
    pub const ALL: [SourceLanguage; 4] = [
        SourceLanguage::English,
        SourceLanguage::ChineseSimplified,
        SourceLanguage::Japanese,
        SourceLanguage::French,
    ];

    pub fn label(self) -> &'static str {
        match self {
            Self::English => "English",
            Self::ChineseSimplified => "Chinese (Simplified)",
            Self::Japanese => "Japanese",
            Self::French => "French",
        }
    }

    /// Short language code shown in logs and status text.
    pub fn code(self) -> &'static str {
        match self {
            Self::English => "en",
            Self::ChineseSimplified => "zh",
            Self::Japanese => "ja",
            Self::French => "fr",
        }
    }

    /// Language code understood by the Baidu Translate API.
    pub fn baidu_code(self) -> &'static str {
        match self {
            Self::English => "en",
            Self::ChineseSimplified => "zh",
            Self::Japanese => "jp",
            Self::French => "fra",
        }
    }

    pub fn index(self) -> usize {
        Self::ALL
            .iter()
            .position(|language| *language == self)
            .unwrap_or(0)
    }

    /// Maps a selector index back to a language. Negative or out-of-range
    /// indexes yield `None`.
    pub fn from_index(index: i32) -> Option<Self> {
        usize::try_from(index)
            .ok()
            .and_then(|index| Self::ALL.get(index).copied())
    }
}

impl TargetLanguage {
    /// Selector order.
    pub const ALL: [TargetLanguage; 2] = [TargetLanguage::ChineseSimplified, TargetLanguage::English];

    pub fn label(self) -> &'static str {
        match self {
            Self::ChineseSimplified => "Chinese (Simplified)",
            Self::English => "English",
        }
    }

    pub fn code(self) -> &'static str {
        match self {
            Self::ChineseSimplified => "zh",
            Self::English => "en",
        }
    }

    pub fn baidu_code(self) -> &'static str {
        match self {
            Self::ChineseSimplified => "zh",
            Self::English => "en",
        }
    }

    /// Whether rendered output needs a CJK-capable font.
    pub fn needs_cjk_font(self) -> bool {
        matches!(self, Self::ChineseSimplified)
    }

    pub fn index(self) -> usize {
        Self::ALL
            .iter()
            .position(|language| *language == self)
            .unwrap_or(0)
    }

    pub fn from_index(index: i32) -> Option<Self> {
        usize::try_from(index)
            .ok()
            .and_then(|index| Self::ALL.get(index).copied())
    }
}

/// Selector labels in display order.
pub fn source_language_labels() -> Vec<&'static str> {
    SourceLanguage::ALL.iter().map(|language| language.label()).collect()
}

/// Selector labels in display order.
pub fn target_language_labels() -> Vec<&'static str> {
    TargetLanguage::ALL.iter().map(|language| language.label()).collect()
}
