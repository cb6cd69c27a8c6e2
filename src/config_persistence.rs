use std::path::Path;

use log::warn;
use toml_edit::{value, DocumentMut, Item, Table};

use crate::languages::{SourceLanguage, TargetLanguage};

fn set_table_value_preserving_decor(table: &mut Table, key: &str, item: Item) {
    let existing_value_decor = table
        .get(key)
        .and_then(|current| current.as_value().map(|value| value.decor().clone()));
    table[key] = item;
    if let Some(existing_value_decor) = existing_value_decor {
        if let Some(next_value) = table[key].as_value_mut() {
            *next_value.decor_mut() = existing_value_decor;
        }
    }
}

fn ensure_section_table(document: &mut DocumentMut, key: &str) {
    let root = document.as_table_mut();
    let should_replace = !matches!(root.get(key), Some(item) if item.is_table());
    if should_replace {
        root.insert(key, Item::Table(Table::new()));
    }
}

fn serialized_enum_value<T: serde::Serialize>(variant: &T) -> Option<String> {
    #[derive(serde::Serialize)]
    struct Probe<'a, T: serde::Serialize> {
        value: &'a T,
    }
    let probe_text = toml::to_string(&Probe { value: variant }).ok()?;
    let parsed: toml::Table = toml::from_str(&probe_text).ok()?;
    parsed.get("value")?.as_str().map(ToOwned::to_owned)
}

/// Rewrites the `[translation]` language keys of `config_text`, keeping
/// comments and unrelated formatting intact.
pub fn update_language_selection(
    config_text: &str,
    source: SourceLanguage,
    target: TargetLanguage,
) -> Result<String, String> {
    let mut document = config_text
        .parse::<DocumentMut>()
        .map_err(|err| format!("failed to parse config document: {err}"))?;
    ensure_section_table(&mut document, "translation");

    let source_value = serialized_enum_value(&source)
        .ok_or_else(|| format!("failed to serialize source language {source:?}"))?;
    let target_value = serialized_enum_value(&target)
        .ok_or_else(|| format!("failed to serialize target language {target:?}"))?;

    let translation = document["translation"]
        .as_table_mut()
        .ok_or_else(|| "translation section should be a table".to_string())?;
    set_table_value_preserving_decor(translation, "source_language", value(source_value));
    set_table_value_preserving_decor(translation, "target_language", value(target_value));
    Ok(document.to_string())
}

/// Persists the selected languages into the config file at `path`.
pub fn persist_language_selection(path: &Path, source: SourceLanguage, target: TargetLanguage) {
    let existing = std::fs::read_to_string(path).unwrap_or_default();
    match update_language_selection(&existing, source, target) {
        Ok(next_text) => {
            if next_text == existing {
                return;
            }
            if let Err(err) = std::fs::write(path, next_text) {
                log::error!(
                    "Failed to persist language selection to {}: {}",
                    path.display(),
                    err
                );
            }
        }
        Err(err) => {
            warn!(
                "Skipping language persistence for {}: {}",
                path.display(),
                err
            );
        }
    }
}
